use std::process::ExitCode;

use minimal_dfa::{formats, prelude::*};

use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgMatches, Command};

fn cli() -> clap::Command {
    Command::new("minimize-dfa")
        .about("Reads a DFA, minimizes it and writes the result")
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("file to read the automaton from, `.jff` files are read as JFLAP")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT")
                .help("file to write the minimized automaton to, `.jff` files are written as JFLAP")
                .required(true),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("info") => filter::LevelFilter::INFO,
        _ => filter::LevelFilter::WARN,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn run(input: &str, output: &str) -> Result<(), FormatError> {
    let dfa = formats::read_file(input)?;
    debug!("read automaton with {} states from {input}", dfa.size());

    let start = std::time::Instant::now();
    let minimized = Minimizer::default().run(&dfa);
    info!(
        "minimization took {}µs: {}",
        start.elapsed().as_micros(),
        minimized.report()
    );

    formats::write_file(output, minimized.dfa())?;
    debug!("wrote minimized automaton to {output}");
    Ok(())
}

pub fn main() -> ExitCode {
    let matches = cli().get_matches();
    setup_logging(&matches);

    let input = matches
        .get_one::<String>("input")
        .expect("input is a required argument");
    let output = matches
        .get_one::<String>("output")
        .expect("output is a required argument");

    match run(input, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("could not minimize {input}: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
