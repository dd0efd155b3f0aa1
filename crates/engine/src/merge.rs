use std::collections::BTreeMap;
use std::io::BufRead;

use crate::Table;
use crate::config::MergeOptions;
use crate::error::{EngineError, Result};
use crate::record::fmt_float;

/// Column roles detected from a table header. Statistic columns are
/// recognized by their name suffix; everything else is a key column.
/// Positions in `count`/`min`/... index into `val_cols`.
#[derive(Debug, Default)]
struct Schema {
    key_cols: Vec<usize>,
    val_cols: Vec<usize>,
    count: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
    mean: Option<usize>,
    mode: Option<usize>,
    percentiles: Vec<usize>,
}

impl Schema {
    fn detect(header: &[String]) -> Self {
        let mut schema = Self::default();
        for (col, name) in header.iter().enumerate() {
            if name.ends_with("_count") {
                schema.count = Some(schema.val_cols.len());
                schema.val_cols.push(col);
            } else if name.ends_with("_min") {
                schema.min = Some(schema.val_cols.len());
                schema.val_cols.push(col);
            } else if name.ends_with("_max") {
                schema.max = Some(schema.val_cols.len());
                schema.val_cols.push(col);
            } else if name.ends_with("_mean") {
                schema.mean = Some(schema.val_cols.len());
                schema.val_cols.push(col);
            } else if name.ends_with("_mode") {
                schema.mode = Some(schema.val_cols.len());
                schema.val_cols.push(col);
            } else if name.contains("_percentile_") {
                schema.percentiles.push(schema.val_cols.len());
                schema.val_cols.push(col);
            } else {
                schema.key_cols.push(col);
            }
        }
        schema
    }

    /// Recombine the per-table statistic rows of one group.
    fn combine(&self, sources: &[Vec<String>]) -> Result<Vec<String>> {
        let mut out = vec![String::new(); self.val_cols.len()];
        let column = |vi: usize| {
            sources
                .iter()
                .map(move |row| row.get(vi).map_or("", String::as_str))
        };

        // Counts are parsed once; they also weight the mean and the mode.
        let counts: Option<Vec<i64>> = match self.count {
            Some(ci) => {
                let mut parsed = Vec::with_capacity(sources.len());
                for cell in column(ci) {
                    let n: i64 = cell
                        .trim()
                        .parse()
                        .map_err(|_| EngineError::InvalidCount(cell.to_string()))?;
                    parsed.push(n);
                }
                out[ci] = parsed.iter().sum::<i64>().to_string();
                Some(parsed)
            }
            None => None,
        };

        if let Some(vi) = self.min {
            out[vi] = match numeric_cells(column(vi)) {
                Some(nums) if !nums.is_empty() => {
                    fmt_float(nums.iter().copied().fold(f64::INFINITY, f64::min))
                }
                _ => String::new(),
            };
        }
        if let Some(vi) = self.max {
            out[vi] = match numeric_cells(column(vi)) {
                Some(nums) if !nums.is_empty() => {
                    fmt_float(nums.iter().copied().fold(f64::NEG_INFINITY, f64::max))
                }
                _ => String::new(),
            };
        }

        if let Some(vi) = self.mean {
            // Count-weighted when counts exist, otherwise equal weights.
            // Weights of tables with a blank mean are dropped, not
            // redistributed, and a weighted sum of exactly zero collapses
            // to the empty "no information" cell.
            let total: f64 = counts
                .as_ref()
                .map_or(0.0, |c| c.iter().sum::<i64>() as f64);
            let mut sum = 0.0;
            let mut bad = false;
            for (i, cell) in column(vi).enumerate() {
                if cell.is_empty() || cell == "nan" {
                    continue;
                }
                let Ok(mean) = cell.parse::<f64>() else {
                    bad = true;
                    break;
                };
                let weight = match &counts {
                    Some(c) => c[i] as f64 / total,
                    None => 1.0 / sources.len() as f64,
                };
                sum += weight * mean;
            }
            out[vi] = if bad || sum == 0.0 {
                String::new()
            } else {
                fmt_float(sum)
            };
        }

        if let Some(vi) = self.mode {
            let mut tally: Vec<(&str, i64)> = Vec::new();
            for (i, cell) in column(vi).enumerate() {
                let weight = counts.as_ref().map_or(1, |c| c[i]);
                match tally.iter_mut().find(|(value, _)| *value == cell) {
                    Some((_, w)) => *w += weight,
                    None => tally.push((cell, weight)),
                }
            }
            let mut best: Option<(&str, i64)> = None;
            for &(value, weight) in &tally {
                if best.is_none_or(|(_, bw)| weight > bw) {
                    best = Some((value, weight));
                }
            }
            out[vi] = best.map(|(value, _)| value.to_string()).unwrap_or_default();
        }

        // Percentiles cannot be recombined from summaries alone; take the
        // median of the per-table values as a monitoring-grade estimate.
        for &vi in &self.percentiles {
            let mut nums: Vec<f64> = column(vi)
                .filter(|cell| !cell.is_empty() && *cell != "nan")
                .filter_map(|cell| cell.parse().ok())
                .collect();
            out[vi] = if nums.is_empty() {
                String::new()
            } else {
                nums.sort_by(f64::total_cmp);
                fmt_float(nums[nums.len() / 2])
            };
        }

        Ok(out)
    }
}

/// Parse a statistic column's cells, ignoring empty and "nan" markers.
/// Any other unparseable cell voids the whole column (`None`).
fn numeric_cells<'a>(cells: impl Iterator<Item = &'a str>) -> Option<Vec<f64>> {
    let mut nums = Vec::new();
    for cell in cells {
        if cell.is_empty() || cell == "nan" {
            continue;
        }
        match cell.parse() {
            Ok(n) => nums.push(n),
            Err(_) => return None,
        }
    }
    Some(nums)
}

/// Merge already-built tables sharing one schema into a single table. The
/// schema comes from the first table's header; later headers are skipped
/// unchecked. Groups present in only one table pass through untouched.
pub fn merge_tables(options: &MergeOptions) -> Result<Table> {
    let mut header: Option<Vec<String>> = None;
    let mut schema = Schema::default();
    let mut groups: BTreeMap<Vec<String>, Vec<Vec<String>>> = BTreeMap::new();

    for path in &options.inputs {
        let reader = crate::input::open_path(path).map_err(|source| EngineError::InputRead {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let cells: Vec<String> = line
                .trim_end_matches('\r')
                .split(options.delimiter.as_str())
                .map(str::to_string)
                .collect();
            if idx == 0 {
                if header.is_none() {
                    schema = Schema::detect(&cells);
                    header = Some(cells);
                }
                continue;
            }
            if let Some(every) = options.progress_every
                && idx as u64 % every == 0
            {
                eprint!("file: {name}\trec: {idx}\r");
            }
            let key = schema
                .key_cols
                .iter()
                .map(|&col| cells.get(col).cloned().unwrap_or_default())
                .collect::<Vec<_>>();
            let vals = schema
                .val_cols
                .iter()
                .map(|&col| cells.get(col).cloned().unwrap_or_default())
                .collect::<Vec<_>>();
            groups.entry(key).or_default().push(vals);
        }
    }
    if options.progress_every.is_some() {
        eprintln!();
    }

    let header = header.ok_or(EngineError::EmptyInput)?;
    let mut rows = Vec::with_capacity(groups.len());
    for (key, sources) in groups {
        let mut cells = key;
        let combined = if sources.len() == 1 {
            sources.into_iter().next().unwrap_or_default()
        } else {
            schema.combine(&sources)?
        };
        cells.extend(combined);
        rows.push(cells);
    }
    Ok(Table { header, rows })
}
