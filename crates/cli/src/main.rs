use clap::Parser;
use std::process::ExitCode;

use keyed_stats_cli::args::Args;
use keyed_stats_cli::config::{Mode, mode_from_args};
use keyed_stats_cli::presentation;
use keyed_stats_engine::error::EngineError;

fn main() -> ExitCode {
    let args = Args::parse();
    let mode = match mode_from_args(args) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("warning: {e}");
            return ExitCode::FAILURE;
        }
    };

    match mode {
        Mode::Merge(options) => match keyed_stats_engine::merge::merge_tables(&options) {
            Ok(table) => {
                presentation::print_table(&table, &options.delimiter);
                ExitCode::SUCCESS
            }
            Err(e) => report(&e),
        },
        Mode::Build(config) => {
            if config.input.path.is_none() && atty::is(atty::Stream::Stdin) {
                return report(&EngineError::EmptyInput);
            }
            match keyed_stats_engine::run(&config) {
                Ok(result) => {
                    for err in &result.errors {
                        eprintln!("warning: {err}");
                    }
                    presentation::print_table(&result.table, &config.input.delimiter);
                    ExitCode::SUCCESS
                }
                Err(e) => report(&e),
            }
        }
    }
}

fn report(e: &EngineError) -> ExitCode {
    eprintln!("warning: {e}");
    match e {
        EngineError::EmptyInput => ExitCode::from(1),
        EngineError::FieldNotFound(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
