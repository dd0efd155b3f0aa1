//! Keyed aggregation engine: builds tables of per-group summary statistics
//! from delimited records, expanding each record across backoff hierarchies
//! and date windows, and re-merges already-built tables.

use std::collections::BTreeMap;

use rayon::prelude::*;

pub mod backoff;
pub mod config;
pub mod dates;
pub mod error;
pub mod expand;
pub mod fields;
pub mod input;
pub mod merge;
pub mod record;
pub mod stats;

use crate::backoff::BackoffTable;
use crate::config::{Config, StatSelection};
use crate::dates::DateWindower;
use crate::error::{EngineError, Result};
use crate::expand::{GroupKey, KeyExpander};
use crate::fields::FieldResolver;
use crate::input::{RecordLayout, RecordReader};
use crate::record::fmt_float;
use crate::stats::StatList;

/// A finished table: header names plus rows of cells, ready to be joined
/// with the output delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The outcome of a build run: the table, and any rows that were skipped
/// with a non-fatal error during the build pass.
#[derive(Debug)]
pub struct RunResult {
    pub table: Table,
    pub errors: Vec<EngineError>,
}

/// Run the aggregation engine: one sequential build pass that fans each
/// record out to its group accumulators, then a parallel map over the
/// finished groups to compute the statistic columns.
///
/// # Errors
///
/// Returns an error for unresolvable fields, unreadable input, or a
/// thread-pool failure. Rows with unparseable date values are skipped and
/// collected in `RunResult::errors` instead.
pub fn run(config: &Config) -> Result<RunResult> {
    if config.keys.is_empty() && config.dates.fields.is_empty() {
        return Err(EngineError::FieldNotFound("0 keys specified".to_string()));
    }

    let mut reader = input::open(config.input.path.as_deref())?;
    let names = if config.input.header {
        input::read_header(&mut reader, &config.input.delimiter)?
    } else {
        Vec::new()
    };
    let resolver = FieldResolver::new(names);

    let value_col = resolver.resolve(&config.value_field)?;
    let key_cols = config
        .keys
        .iter()
        .map(|key| resolver.resolve(&key.spec))
        .collect::<Result<Vec<_>>>()?;
    let date_cols = config
        .dates
        .fields
        .iter()
        .map(|spec| resolver.resolve(spec))
        .collect::<Result<Vec<_>>>()?;

    let backoffs: Vec<BackoffTable> = config
        .keys
        .iter()
        .map(|key| BackoffTable::load(key.backoff.as_deref()))
        .collect();
    let expander = KeyExpander::new(
        backoffs,
        DateWindower::new(config.dates.lag, config.dates.width),
    );

    let layout = RecordLayout {
        delimiter: config.input.delimiter.clone(),
        value_col,
        key_cols,
        date_cols,
    };
    let first_line = if config.input.header { 2 } else { 1 };

    // Build pass: sequential by design, the accumulators are mutated in
    // encounter order.
    let mut table: BTreeMap<GroupKey, StatList> = BTreeMap::new();
    let mut errors = Vec::new();
    let mut recnum: u64 = 0;
    for item in RecordReader::new(reader, layout, first_line) {
        match item {
            Ok(record) => {
                recnum += 1;
                for key in expander.expansions(&record) {
                    table.entry(key).or_default().add(record.value.clone());
                }
                if let Some(every) = config.progress_every
                    && recnum % every == 0
                {
                    eprint!("rec: {recnum}\tunique_keys: {}\r", table.len());
                }
            }
            Err(err @ EngineError::InvalidDate { .. }) => errors.push(err),
            Err(err) => return Err(err),
        }
    }
    if config.progress_every.is_some() {
        eprintln!();
    }

    // Computation phase: each group's value list is finished and owned
    // exclusively by its slot, so the per-group work fans out freely. The
    // BTreeMap already fixed ascending key order and the indexed collect
    // keeps it, whatever order workers finish in.
    let mut groups: Vec<(GroupKey, StatList)> = table.into_iter().collect();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.max(1))
        .build()?;
    let rows: Vec<Vec<String>> = pool.install(|| {
        groups
            .par_iter_mut()
            .map(|(key, stats)| render_row(key, stats, &config.stats))
            .collect()
    });

    Ok(RunResult {
        table: Table {
            header: header_row(config),
            rows,
        },
        errors,
    })
}

fn header_row(config: &Config) -> Vec<String> {
    let mut header: Vec<String> = config.keys.iter().map(|key| key.spec.clone()).collect();
    header.extend(config.dates.fields.iter().cloned());
    let field = &config.value_field;
    let sel = &config.stats;
    if sel.count {
        header.push(format!("{field}_count"));
    }
    if sel.min {
        header.push(format!("{field}_min"));
    }
    if sel.max {
        header.push(format!("{field}_max"));
    }
    if sel.mean {
        header.push(format!("{field}_mean"));
    }
    if sel.mode {
        header.push(format!("{field}_mode"));
    }
    for p in &sel.percentiles {
        header.push(format!("{field}_percentile_{}", fmt_percentile(*p)));
    }
    header
}

fn render_row(key: &GroupKey, stats: &mut StatList, sel: &StatSelection) -> Vec<String> {
    let mut cells = key.clone();
    if sel.count {
        cells.push(stats.count().to_string());
    }
    if sel.min {
        cells.push(fmt_float(stats.min()));
    }
    if sel.max {
        cells.push(fmt_float(stats.max()));
    }
    if sel.mean {
        cells.push(fmt_float(stats.mean()));
    }
    if sel.mode {
        cells.push(
            stats
                .mode()
                .map(|(value, _)| value.to_string())
                .unwrap_or_default(),
        );
    }
    if !sel.percentiles.is_empty() {
        for value in stats.percentiles(&sel.percentiles, sel.numeric_percentiles) {
            cells.push(value.to_string());
        }
    }
    cells
}

/// Percentile column labels keep integral percentiles free of a trailing
/// ".0" (`_percentile_50`, not `_percentile_50.0`).
fn fmt_percentile(p: f64) -> String {
    if p.fract() == 0.0 {
        format!("{}", p as i64)
    } else {
        format!("{p}")
    }
}
