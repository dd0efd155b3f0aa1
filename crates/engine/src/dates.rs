use chrono::{Datelike, Months, NaiveDate};

/// A year-month key value. Parsed from `YYYYMM` or `YYYYMMDD` text (after
/// stripping `-` and spaces); any day component is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw.chars().filter(|c| *c != '-' && *c != ' ').collect();
        if !(cleaned.len() == 6 || cleaned.len() == 8) || !cleaned.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let year: i32 = cleaned[..4].parse().ok()?;
        let month: u32 = cleaned[4..6].parse().ok()?;
        Self::new(year, month)
    }

    /// Shift by a signed number of months.
    pub fn shift(self, months: i32) -> Self {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months as u32))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        shifted.map_or(self, Self)
    }

    pub fn label(self) -> String {
        format!("{:04}{:02}", self.0.year(), self.0.month())
    }
}

/// Produces the period labels a record's date value is credited to: the
/// wildcard, then the lagged month, then each of `width` months before it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateWindower {
    lag: u32,
    width: u32,
}

impl DateWindower {
    pub fn new(lag: u32, width: u32) -> Self {
        Self { lag, width }
    }

    pub fn labels(&self, ym: YearMonth) -> Vec<String> {
        let reported = ym.shift(self.lag as i32);
        let mut out = Vec::with_capacity(self.width as usize + 2);
        out.push(String::new());
        for back in 0..=self.width {
            out.push(reported.shift(-(back as i32)).label());
        }
        out
    }
}
