use std::path::PathBuf;
use std::str::FromStr;

/// Wrapper type to parse a key specifier with an optional backoff file
/// attached after a comma (`FIELD[,BACKOFF]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyArg {
    pub spec: String,
    pub backoff: Option<PathBuf>,
}

impl FromStr for KeyArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (spec, backoff) = match s.split_once(',') {
            Some((spec, backoff)) => (spec, Some(PathBuf::from(backoff))),
            None => (s, None),
        };
        if spec.is_empty() {
            return Err(format!("empty key field in '{s}'"));
        }
        Ok(Self {
            spec: spec.to_string(),
            backoff,
        })
    }
}

/// Parse a percentile, constrained to the open interval (0, 100).
///
/// # Errors
/// Returns an error if the input is not a number or is out of range.
pub fn parse_percentile(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|err| format!("invalid percentile '{s}': {err}"))?;
    if !(value > 0.0 && value < 100.0) {
        return Err(format!("percentile must be between 0 and 100: {s}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_arg_splits_off_the_backoff_file() {
        let arg: KeyArg = "zip,backoff/zip.tsv".parse().unwrap();
        assert_eq!(arg.spec, "zip");
        assert_eq!(arg.backoff, Some(PathBuf::from("backoff/zip.tsv")));
    }

    #[test]
    fn key_arg_without_comma_has_no_backoff() {
        let arg: KeyArg = "zip".parse().unwrap();
        assert_eq!(arg.spec, "zip");
        assert_eq!(arg.backoff, None);
    }

    #[test]
    fn key_arg_rejects_empty_spec() {
        assert!(",file".parse::<KeyArg>().is_err());
        assert!("".parse::<KeyArg>().is_err());
    }

    #[test]
    fn percentiles_must_sit_strictly_inside_the_range() {
        assert_eq!(parse_percentile("50").unwrap(), 50.0);
        assert_eq!(parse_percentile("99.9").unwrap(), 99.9);
        assert!(parse_percentile("0").is_err());
        assert!(parse_percentile("100").is_err());
        assert!(parse_percentile("half").is_err());
    }
}
