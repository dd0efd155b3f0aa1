//! End-to-end tests driving the `keyed_stats` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn keyed_stats() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("keyed_stats").unwrap()
}

fn fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn builds_a_table_from_a_headered_file() {
    let input = fixture("city\tamount\nSF\t3\nSF\t5\nNY\t10\n");
    keyed_stats()
        .args(["-H", "-k", "city", "-f", "amount", "-c", "-m", "-p", "50"])
        .arg(input.path())
        .assert()
        .success()
        .stdout(
            "city\tamount_count\tamount_mean\tamount_percentile_50\n\
             \t3\t6\t5\n\
             NY\t1\t10\t10\n\
             SF\t2\t4\t5\n",
        );
}

#[test]
fn reads_records_from_stdin() {
    keyed_stats()
        .args(["-k", "1", "-f", "2", "-c"])
        .write_stdin("a\t1\nb\t2\na\t3\n")
        .assert()
        .success()
        .stdout("1\t2_count\n\t3\na\t2\nb\t1\n");
}

#[test]
fn custom_delimiter_applies_to_input_and_output() {
    let input = fixture("city,amount\nSF,3\nSF,5\n");
    keyed_stats()
        .args(["-d", ",", "-H", "-k", "city", "-f", "amount", "-c", "-x", "-X"])
        .arg(input.path())
        .assert()
        .success()
        .stdout("city,amount_count,amount_min,amount_max\n,2,3,5\nSF,2,3,5\n");
}

#[test]
fn backoff_files_roll_values_up() {
    let backoff = fixture("94110\tCA US\n");
    let input = fixture("94110\t10\n94110\t20\n10001\t5\n");
    keyed_stats()
        .args([
            "-k",
            &format!("1,{}", backoff.path().display()),
            "-f",
            "2",
            "-c",
            "-m",
        ])
        .arg(input.path())
        .assert()
        .success()
        .stdout(
            "1\t2_count\t2_mean\n\
             \t3\t11.666666666666666\n\
             10001\t1\t5\n\
             94110\t2\t15\n\
             CA\t2\t15\n\
             US\t2\t15\n",
        );
}

#[test]
fn date_keys_are_windowed_with_lag_and_width() {
    let input = fixture("201308\t5\n");
    keyed_stats()
        .args(["-D", "1", "-l", "2", "-w", "1", "-f", "2", "-c"])
        .arg(input.path())
        .assert()
        .success()
        .stdout("1\t2_count\n\t1\n201309\t1\n201310\t1\n");
}

#[test]
fn gzip_inputs_are_read_transparently() {
    let mut file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(b"a\t1\na\t3\n").unwrap();
    file.write_all(&enc.finish().unwrap()).unwrap();
    file.flush().unwrap();

    keyed_stats()
        .args(["-k", "1", "-f", "2", "-c", "-m"])
        .arg(file.path())
        .assert()
        .success()
        .stdout("1\t2_count\t2_mean\n\t2\t2\na\t2\t2\n");
}

#[test]
fn merge_mode_recombines_built_tables() {
    let a = fixture("k\tx_count\tx_mean\nA\t3\t10\n");
    let b = fixture("k\tx_count\tx_mean\nA\t1\t2\nB\t1\t7\n");
    keyed_stats()
        .arg("-R")
        .arg(a.path())
        .arg("-R")
        .arg(b.path())
        .assert()
        .success()
        .stdout("k\tx_count\tx_mean\nA\t4\t8\nB\t1\t7\n");
}

#[test]
fn build_then_merge_round_trip() {
    let input = fixture("a\t1\na\t3\nb\t2\n");
    let built = keyed_stats()
        .args(["-k", "1", "-f", "2", "-c", "-x", "-X"])
        .arg(input.path())
        .assert()
        .success();
    let table = String::from_utf8_lossy(&built.get_output().stdout).into_owned();

    let mut half = NamedTempFile::new().unwrap();
    write!(half, "{table}").unwrap();

    keyed_stats()
        .arg("-R")
        .arg(half.path())
        .arg("-R")
        .arg(half.path())
        .assert()
        .success()
        .stdout(
            "1\t2_count\t2_min\t2_max\n\
             \t6\t1\t3\n\
             a\t4\t1\t3\n\
             b\t2\t2\t2\n",
        );
}

#[test]
fn unknown_field_exits_with_code_two() {
    let input = fixture("city\tamount\nSF\t3\n");
    keyed_stats()
        .args(["-H", "-k", "city", "-f", "missing"])
        .arg(input.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid field name/offset"))
        .stdout("");
}

#[test]
fn missing_field_and_merge_is_a_usage_error() {
    keyed_stats()
        .args(["-k", "city"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "at least one of --field or --merge is required",
        ));
}

#[test]
fn bad_date_rows_warn_but_do_not_fail() {
    let input = fixture("201308\t1\njunk\t2\n");
    keyed_stats()
        .args(["-D", "1", "-f", "2", "-c"])
        .arg(input.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid date value 'junk'"))
        .stdout("1\t2_count\n\t1\n201308\t1\n");
}

#[test]
fn worker_count_does_not_change_the_output() {
    let input = fixture("a\t1\nb\t2\na\t3\nc\t9\nb\t4\n");
    let serial = keyed_stats()
        .args(["-k", "1", "-f", "2", "-c", "-m", "-M"])
        .arg(input.path())
        .assert()
        .success();
    let expected = String::from_utf8_lossy(&serial.get_output().stdout).into_owned();

    keyed_stats()
        .args(["-k", "1", "-f", "2", "-c", "-m", "-M", "-C", "4"])
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::diff(expected));
}
