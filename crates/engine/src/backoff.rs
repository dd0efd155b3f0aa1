use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Per-key-field rollup dictionary: value -> broader/alternate values,
/// loaded once from a two-column file (key TAB space-separated alternates).
///
/// Backoff files are best-effort enrichment: a missing or unreadable file
/// yields an empty table, a read error mid-file keeps whatever was loaded,
/// and malformed lines are skipped.
#[derive(Debug, Default, Clone)]
pub struct BackoffTable {
    map: HashMap<String, Vec<String>>,
}

impl BackoffTable {
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        let Ok(reader) = crate::input::open_path(path) else {
            return Self::default();
        };
        let mut map = HashMap::new();
        for line in reader.lines() {
            let Ok(line) = line else { break };
            let line = line.trim_end_matches('\r');
            let Some((key, alternates)) = line.split_once('\t') else {
                continue;
            };
            if !alternates.is_empty() {
                map.insert(
                    key.to_string(),
                    alternates.split(' ').map(str::to_string).collect(),
                );
            }
        }
        Self { map }
    }

    pub fn alternates(&self, value: &str) -> &[String] {
        self.map.get(value).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
