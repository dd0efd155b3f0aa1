use crate::backoff::BackoffTable;
use crate::dates::DateWindower;
use crate::record::Record;

/// A fully resolved group key: one label per configured key field (plain
/// keys first, then date fields), compared slot by slot.
pub type GroupKey = Vec<String>;

/// Expands one record into every group key it contributes to: per plain
/// key field the exact value, the wildcard (when the value is non-empty)
/// and any backoff alternates; per date field the windowed period labels.
/// The cartesian product across fields is iterated lazily, so wide backoff
/// tables and date windows never materialize the whole key set at once.
#[derive(Debug)]
pub struct KeyExpander {
    backoffs: Vec<BackoffTable>,
    windower: DateWindower,
}

impl KeyExpander {
    pub fn new(backoffs: Vec<BackoffTable>, windower: DateWindower) -> Self {
        Self { backoffs, windower }
    }

    pub fn expansions(&self, record: &Record) -> KeyProduct {
        let mut axes = Vec::with_capacity(record.keys.len() + record.dates.len());
        for (idx, key) in record.keys.iter().enumerate() {
            let alternates = self
                .backoffs
                .get(idx)
                .map_or(&[][..], |table| table.alternates(key));
            let mut candidates = Vec::with_capacity(2 + alternates.len());
            candidates.push(key.clone());
            if !key.is_empty() {
                candidates.push(String::new());
            }
            candidates.extend(alternates.iter().cloned());
            axes.push(candidates);
        }
        for ym in &record.dates {
            axes.push(self.windower.labels(*ym));
        }
        KeyProduct::new(axes)
    }
}

/// Odometer-style iterator over the cartesian product of candidate labels.
/// Duplicate candidates on an axis yield duplicate keys, which is the
/// intended multi-membership behavior, not something to dedupe.
#[derive(Debug)]
pub struct KeyProduct {
    axes: Vec<Vec<String>>,
    cursor: Vec<usize>,
    done: bool,
}

impl KeyProduct {
    fn new(axes: Vec<Vec<String>>) -> Self {
        let done = axes.iter().any(Vec::is_empty);
        let cursor = vec![0; axes.len()];
        Self { axes, cursor, done }
    }
}

impl Iterator for KeyProduct {
    type Item = GroupKey;

    fn next(&mut self) -> Option<GroupKey> {
        if self.done {
            return None;
        }
        let key: GroupKey = self
            .cursor
            .iter()
            .zip(&self.axes)
            .map(|(&i, axis)| axis[i].clone())
            .collect();
        // Advance the rightmost slot, carrying leftwards.
        let mut pos = self.axes.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.axes[pos].len() {
                break;
            }
            self.cursor[pos] = 0;
        }
        Some(key)
    }
}
