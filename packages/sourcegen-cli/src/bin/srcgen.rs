/**
 * srcgen - regenerate source from composer AST documents
 */
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{value_parser, Arg, ArgAction, Command};
use composer_sourcegen_cli::perform_generate::expand_inputs;
use composer_sourcegen_cli::{
    init_tracing, perform_generation, LogLevel, OutputTarget, SourcegenConfig,
};

fn main() {
    let matches = Command::new("srcgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Regenerates Ballerina source from composer AST documents")
        .arg(
            Arg::new("inputs")
                .value_name("INPUT")
                .num_args(1..)
                .required(true)
                .help("AST documents (JSON) or glob patterns"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Path to sourcegen.json"),
        )
        .arg(
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory for generated files (default: next to each input)"),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .action(ArgAction::SetTrue)
                .conflicts_with("out-dir")
                .help("Print generated source instead of writing files"),
        )
        .arg(
            Arg::new("source-map")
                .long("source-map")
                .action(ArgAction::SetTrue)
                .help("Also write a .map file for each output"),
        )
        .arg(
            Arg::new("argument-separator")
                .long("argument-separator")
                .value_name("SEP")
                .help("Separator between invocation arguments"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(value_parser!(LogLevel))
                .default_value("warn")
                .help("Log verbosity (RUST_LOG overrides)"),
        )
        .get_matches();

    let level = matches
        .get_one::<LogLevel>("log-level")
        .copied()
        .unwrap_or_default();
    init_tracing(level);

    let mut config = match SourcegenConfig::resolve(
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };
    if matches.get_flag("source-map") {
        config.source_map = true;
    }
    if let Some(separator) = matches.get_one::<String>("argument-separator") {
        config.options.argument_separator = separator.clone();
    }

    let patterns: Vec<String> = matches
        .get_many::<String>("inputs")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let inputs = match expand_inputs(&patterns) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    let target = if matches.get_flag("stdout") {
        OutputTarget::Stdout
    } else {
        OutputTarget::Files(matches.get_one::<PathBuf>("out-dir").cloned())
    };

    let results = perform_generation(&inputs, &config, &target);

    let mut failed = false;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for result in &results {
        match &result.outcome {
            Ok(source) => {
                if target == OutputTarget::Stdout {
                    let _ = writeln!(out, "{}", source);
                }
            }
            Err(e) => {
                failed = true;
                eprintln!("Error: {}: {:#}", result.input.display(), e);
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
