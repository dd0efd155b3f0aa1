use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::dates::YearMonth;
use crate::error::{EngineError, Result};
use crate::record::{Record, Value};

/// Open an input stream, reading stdin when no path is given. Files ending
/// in `.gz` are decompressed transparently.
pub fn open(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(path) => open_path(path).map_err(|source| EngineError::InputRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn open_path(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(BufReader::new(
            file,
        )))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read and split the header line. Returns an empty name list at EOF.
pub fn read_header(reader: &mut dyn BufRead, delimiter: &str) -> Result<Vec<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(Vec::new());
    }
    let line = line.trim_end_matches('\n').trim_end_matches('\r');
    Ok(line.split(delimiter).map(str::to_string).collect())
}

/// Resolved column positions (1-based) for record extraction.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    pub delimiter: String,
    pub value_col: usize,
    pub key_cols: Vec<usize>,
    pub date_cols: Vec<usize>,
}

/// Lazy record sequence over an already-opened input stream. Missing
/// fields are treated as empty; a date field that fails to parse yields a
/// row-level error instead of a record.
pub struct RecordReader<R: BufRead> {
    lines: io::Lines<R>,
    layout: RecordLayout,
    line_no: u64,
}

impl<R: BufRead> RecordReader<R> {
    /// `first_line` is the 1-based number of the first data line (2 when a
    /// header was consumed), used in row-level diagnostics.
    pub fn new(reader: R, layout: RecordLayout, first_line: u64) -> Self {
        Self {
            lines: reader.lines(),
            layout,
            line_no: first_line.saturating_sub(1),
        }
    }

    fn parse_line(&self, line: &str) -> Result<Record> {
        let line = line.trim_end_matches('\r');
        let fields: Vec<&str> = line.split(self.layout.delimiter.as_str()).collect();
        let cell = |col: usize| fields.get(col - 1).copied().unwrap_or("");

        let value = Value::parse(cell(self.layout.value_col));
        let keys = self
            .layout
            .key_cols
            .iter()
            .map(|&col| cell(col).to_string())
            .collect();
        let mut dates = Vec::with_capacity(self.layout.date_cols.len());
        for &col in &self.layout.date_cols {
            let raw = cell(col);
            let ym = YearMonth::parse(raw).ok_or_else(|| EngineError::InvalidDate {
                line: self.line_no,
                value: raw.to_string(),
            })?;
            dates.push(ym);
        }
        Ok(Record { keys, value, dates })
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e.into())),
        };
        self.line_no += 1;
        Some(self.parse_line(&line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read, Write};
    use tempfile::NamedTempFile;

    fn layout() -> RecordLayout {
        RecordLayout {
            delimiter: "\t".into(),
            value_col: 3,
            key_cols: vec![1],
            date_cols: vec![2],
        }
    }

    #[test]
    fn yields_parsed_records() {
        let input = Cursor::new("94110\t201308\t12.5\n10001\t2013-09\tn/a\n");
        let mut reader = RecordReader::new(input, layout(), 1);

        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.keys, ["94110"]);
        assert_eq!(rec.value, Value::Num(12.5));
        assert_eq!(rec.dates[0].label(), "201308");

        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.value, Value::Text("n/a".into()));
        assert_eq!(rec.dates[0].label(), "201309");

        assert!(reader.next().is_none());
    }

    #[test]
    fn short_rows_fill_missing_fields_with_blanks() {
        let input = Cursor::new("94110\t201308\n");
        let mut reader = RecordReader::new(input, layout(), 1);
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.value, Value::Text(String::new()));
    }

    #[test]
    fn bad_date_is_a_row_level_error_with_line_number() {
        let input = Cursor::new("a\t201308\t1\nb\tlater\t2\n");
        let mut reader = RecordReader::new(input, layout(), 2);
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(EngineError::InvalidDate { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "later");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn gzip_inputs_are_decompressed_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(b"k\tv\n").unwrap();
        file.write_all(&enc.finish().unwrap()).unwrap();
        file.flush().unwrap();

        let mut reader = open_path(file.path()).unwrap();
        let mut contents = String::new();
        reader.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "k\tv\n");
    }

    #[test]
    fn read_header_splits_on_delimiter() {
        let mut cursor = Cursor::new("zip,month,amount\n1,2,3\n");
        let names = read_header(&mut cursor, ",").unwrap();
        assert_eq!(names, ["zip", "month", "amount"]);
        // The header line is consumed, data remains.
        let mut rest = String::new();
        cursor.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "1,2,3\n");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = open(Some(Path::new("/no/such/input.tsv"))).err().unwrap();
        assert!(matches!(err, EngineError::InputRead { .. }));
    }

    #[test]
    fn plain_files_open_uncompressed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a\tb\n").unwrap();
        let mut reader = open_path(file.path()).unwrap();
        let mut contents = String::new();
        reader.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "a\tb\n");
    }
}
