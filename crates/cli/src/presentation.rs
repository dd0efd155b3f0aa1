// crates/cli/src/presentation.rs
use std::io::{self, Write};

use keyed_stats_engine::Table;

/// Write the finished table to stdout, one delimited line per row. Write
/// errors are swallowed: a closed pipe downstream just ends the output.
pub fn print_table(table: &Table, delimiter: &str) {
    let stdout = io::stdout().lock();
    let mut out = io::BufWriter::new(stdout);
    if write_table(&mut out, table, delimiter).is_err() {
        return;
    }
    let _ = out.flush();
}

fn write_table(out: &mut impl Write, table: &Table, delimiter: &str) -> io::Result<()> {
    writeln!(out, "{}", table.header.join(delimiter))?;
    for row in &table.rows {
        writeln!(out, "{}", row.join(delimiter))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_joined_with_the_delimiter() {
        let table = Table {
            header: vec!["k".into(), "x_count".into()],
            rows: vec![
                vec!["".into(), "3".into()],
                vec!["a".into(), "2".into()],
            ],
        };
        let mut buf = Vec::new();
        write_table(&mut buf, &table, ",").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "k,x_count\n,3\na,2\n");
    }
}
