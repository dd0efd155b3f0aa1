use derive_builder::Builder;
use std::path::PathBuf;

/// Where records come from and how lines are split.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct InputOptions {
    /// Input file; `None` reads stdin. A `.gz` suffix is decompressed.
    #[builder(default)]
    pub path: Option<PathBuf>,
    #[builder(default = "String::from(\"\\t\")")]
    pub delimiter: String,
    /// Whether the first line names the fields.
    #[builder(default)]
    pub header: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: "\t".to_string(),
            header: false,
        }
    }
}

/// One key field: its specifier (header name or 1-based offset) and an
/// optional backoff rollup file.
#[derive(Debug, Clone)]
pub struct KeyField {
    pub spec: String,
    pub backoff: Option<PathBuf>,
}

impl KeyField {
    pub fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            backoff: None,
        }
    }

    pub fn with_backoff(spec: impl Into<String>, backoff: impl Into<PathBuf>) -> Self {
        Self {
            spec: spec.into(),
            backoff: Some(backoff.into()),
        }
    }
}

/// Date-flagged key fields and the windowing parameters applied to them.
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into))]
pub struct DateOptions {
    #[builder(default)]
    pub fields: Vec<String>,
    /// Months between a record's date and the period it is reported under.
    #[builder(default)]
    pub lag: u32,
    /// Additional prior months grouped into each period.
    #[builder(default)]
    pub width: u32,
}

/// Which statistic columns to emit.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct StatSelection {
    #[builder(default)]
    pub count: bool,
    #[builder(default)]
    pub min: bool,
    #[builder(default)]
    pub max: bool,
    #[builder(default)]
    pub mean: bool,
    #[builder(default)]
    pub mode: bool,
    #[builder(default)]
    pub percentiles: Vec<f64>,
    /// Restrict percentile selection to the numeric span.
    #[builder(default)]
    pub numeric_percentiles: bool,
}

impl Default for StatSelection {
    fn default() -> Self {
        Self {
            count: false,
            min: false,
            max: false,
            mean: false,
            mode: false,
            percentiles: Vec::new(),
            numeric_percentiles: false,
        }
    }
}

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    #[builder(default)]
    pub input: InputOptions,
    /// Specifier of the field statistics are computed over.
    #[builder(default)]
    pub value_field: String,
    #[builder(default)]
    pub keys: Vec<KeyField>,
    #[builder(default)]
    pub dates: DateOptions,
    #[builder(default)]
    pub stats: StatSelection,
    /// Worker threads for the per-group computation phase.
    #[builder(default = "1")]
    pub jobs: usize,
    /// Emit a progress line to stderr every N records.
    #[builder(default)]
    pub progress_every: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputOptions::default(),
            value_field: String::new(),
            keys: Vec::new(),
            dates: DateOptions::default(),
            stats: StatSelection::default(),
            jobs: 1,
            progress_every: None,
        }
    }
}

/// Configuration for merge mode, which bypasses record reading entirely.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct MergeOptions {
    #[builder(default)]
    pub inputs: Vec<PathBuf>,
    #[builder(default = "String::from(\"\\t\")")]
    pub delimiter: String,
    #[builder(default)]
    pub progress_every: Option<u64>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            delimiter: "\t".to_string(),
            progress_every: None,
        }
    }
}
