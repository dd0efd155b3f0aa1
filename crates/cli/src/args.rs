use std::path::PathBuf;

use clap::{Parser, ValueHint};

use crate::parsers::{KeyArg, parse_percentile};

const DEFAULT_PERCENTILES: [f64; 7] = [1.0, 5.0, 25.0, 50.0, 75.0, 95.0, 99.0];

/// Top-level CLI arguments parsed via clap.
#[derive(Parser, Debug)]
#[command(
    name = "keyed_stats",
    version = crate::VERSION,
    about = "Construct indexed tables of statistics according to various types of keys"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Use DELIM as the field separator (instead of TAB)
    #[arg(short = 'd', long = "delimiter", default_value = "\t")]
    pub delimiter: String,

    /// First line of the input is a header naming the fields
    #[arg(short = 'H', long)]
    pub header: bool,

    /// Add a field name or offset to index by, optionally followed by a
    /// comma and a backoff lookup file
    #[arg(short = 'k', long = "key", value_name = "FIELD[,BACKOFF]")]
    pub keys: Vec<KeyArg>,

    /// Calculate statistics over the field name/offset given
    #[arg(short = 'f', long)]
    pub field: Option<String>,

    /// Add a percentile value to the field statistics (may repeat)
    #[arg(
        short = 'p',
        long = "percentile",
        value_parser = parse_percentile,
        default_values_t = DEFAULT_PERCENTILES
    )]
    pub percentiles: Vec<f64>,

    /// Strip missing/non-numeric values before selecting percentiles
    #[arg(short = 'n', long = "numeric-percentile")]
    pub numeric_percentile: bool,

    /// Add the mean of numeric values to the field statistics
    #[arg(short = 'm', long)]
    pub mean: bool,

    /// Add the most common value to the field statistics
    #[arg(short = 'M', long)]
    pub mode: bool,

    /// Add the record count to the field statistics
    #[arg(short = 'c', long)]
    pub count: bool,

    /// Add the minimum numeric value to the field statistics
    #[arg(short = 'x', long)]
    pub min: bool,

    /// Add the maximum numeric value to the field statistics
    #[arg(short = 'X', long)]
    pub max: bool,

    /// Treat the key field name/offset as a YYYYMM[DD] date (may repeat)
    #[arg(short = 'D', long = "date", value_name = "FIELD")]
    pub dates: Vec<String>,

    /// Compute date indices with a lag of this many months
    #[arg(short = 'l', long, default_value_t = 0)]
    pub lag: u32,

    /// Include date values from this many prior months in each period
    #[arg(short = 'w', long, default_value_t = 0)]
    pub width: u32,

    /// Write progress to stderr every N records (0 disables)
    #[arg(short = 'P', long = "print-every", default_value_t = 0, value_name = "N")]
    pub print_every: u64,

    /// Compute per-group statistics with this many worker threads
    /// (0 uses every core)
    #[arg(short = 'C', long, default_value_t = 1)]
    pub cores: usize,

    /// Merge the given already-built tables instead of creating one
    /// (may repeat)
    #[arg(short = 'R', long = "merge", value_name = "TABLE", value_hint = ValueHint::FilePath)]
    pub merge: Vec<PathBuf>,

    /// Construct the table from INFILE instead of stdin; `.gz` files are
    /// decompressed transparently
    #[arg(value_name = "INFILE", value_hint = ValueHint::FilePath)]
    pub infile: Option<PathBuf>,
}
