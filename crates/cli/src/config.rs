// crates/cli/src/config.rs
use std::path::{Path, PathBuf};

use keyed_stats_engine::config::{
    Config, ConfigBuilder, DateOptionsBuilder, InputOptionsBuilder, KeyField, MergeOptions,
    MergeOptionsBuilder, StatSelectionBuilder,
};

use crate::args::Args;
use crate::error::{AppError, Result};

/// What a single invocation does: build a table from records, or merge
/// previously built tables.
#[derive(Debug)]
pub enum Mode {
    Build(Config),
    Merge(MergeOptions),
}

pub fn mode_from_args(args: Args) -> Result<Mode> {
    let progress_every = (args.print_every > 0).then_some(args.print_every);

    if !args.merge.is_empty() {
        let options = MergeOptionsBuilder::default()
            .inputs(args.merge)
            .delimiter(args.delimiter)
            .progress_every(progress_every)
            .build()
            .expect("Failed to build merge options");
        return Ok(Mode::Merge(options));
    }

    let Some(field) = args.field else {
        return Err(AppError::Usage(
            "at least one of --field or --merge is required".to_string(),
        ));
    };

    // Date-flagged specifiers are windowed, not used as plain keys; any
    // backoff attached to them is dropped.
    let keys: Vec<KeyField> = args
        .keys
        .into_iter()
        .filter(|key| !args.dates.contains(&key.spec))
        .map(|key| KeyField {
            spec: key.spec,
            backoff: key.backoff,
        })
        .collect();

    let input = InputOptionsBuilder::default()
        .path(stdin_or_path(args.infile))
        .delimiter(args.delimiter)
        .header(args.header)
        .build()
        .expect("Failed to build input options");

    let dates = DateOptionsBuilder::default()
        .fields(args.dates)
        .lag(args.lag)
        .width(args.width)
        .build()
        .expect("Failed to build date options");

    let stats = StatSelectionBuilder::default()
        .count(args.count)
        .min(args.min)
        .max(args.max)
        .mean(args.mean)
        .mode(args.mode)
        .percentiles(args.percentiles)
        .numeric_percentiles(args.numeric_percentile)
        .build()
        .expect("Failed to build stat selection");

    let jobs = if args.cores == 0 {
        num_cpus::get()
    } else {
        args.cores
    };

    let config = ConfigBuilder::default()
        .input(input)
        .value_field(field)
        .keys(keys)
        .dates(dates)
        .stats(stats)
        .jobs(jobs)
        .progress_every(progress_every)
        .build()
        .expect("Failed to build config");
    Ok(Mode::Build(config))
}

/// `-` is the conventional spelling for stdin.
fn stdin_or_path(infile: Option<PathBuf>) -> Option<PathBuf> {
    infile.filter(|path| path != Path::new("-"))
}
