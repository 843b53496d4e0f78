//! A line based log of recorded position fixes, so a walk can be replayed
//! through the tracker later. Each line is one fix:
//!
//! ```text
//! FIX:<latitude>,<longitude>,<timestamp_ms>
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use nom::{
    bytes::complete::tag,
    character::complete::{space0, u64},
    combinator::{all_consuming, map, verify},
    error::Error,
    number::complete::double,
    sequence::{delimited, preceded, tuple},
    Finish, IResult,
};

use std::{
    fmt::{self, Display},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use crate::position::Fix;

fn parse_field<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(space0, inner, space0)
}

/// A coordinate in degrees. `double` also takes `nan` and `inf`, which no
/// receiver reports.
fn parse_degrees(s: &str) -> IResult<&str, f64> {
    verify(double, |degrees: &f64| degrees.is_finite())(s)
}

fn parse_fix(s: &str) -> IResult<&str, Fix> {
    map(
        tuple((
            preceded(tag("FIX:"), parse_field(parse_degrees)),
            preceded(tag(","), parse_field(parse_degrees)),
            preceded(tag(","), parse_field(u64)),
        )),
        |(latitude, longitude, timestamp_ms)| Fix::new(latitude, longitude, timestamp_ms),
    )(s)
}

impl FromStr for Fix {
    type Err = Error<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match all_consuming(parse_fix)(s.trim()).finish() {
            Ok((_remaining, fix)) => Ok(fix),
            Err(Error { input, code }) => Err(Error {
                input: input.to_string(),
                code,
            }),
        }
    }
}

impl Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FIX:{},{},{}",
            self.coordinate.latitude, self.coordinate.longitude, self.timestamp_ms
        )
    }
}

/// Returned when a fix log cannot be read.
#[derive(Debug)]
pub enum FixLogError {
    /// Returned when io fails when reading the log.
    IoError(std::io::Error),

    /// A line that is neither blank, a comment, nor a fix. Lines count from 1.
    Malformed { line: usize, error: Error<String> },
}

impl Display for FixLogError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FixLogError::IoError(error) => write!(f, "io error: {}", error),
            FixLogError::Malformed { line, error } => {
                write!(f, "line {}: cannot parse fix: {}", line, error)
            }
        }
    }
}

impl std::error::Error for FixLogError {}

impl From<std::io::Error> for FixLogError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}

/// Reads every fix in `reader`, stopping at the first malformed line.
pub fn read_fix_log(reader: impl BufRead) -> Result<Vec<Fix>, FixLogError> {
    let mut fixes = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fix = trimmed.parse::<Fix>().map_err(|error| FixLogError::Malformed {
            line: number + 1,
            error,
        })?;
        fixes.push(fix);
    }
    Ok(fixes)
}

/// Read a fix log from the path provided.
pub fn read_fix_log_path(path: impl AsRef<Path>) -> Result<Vec<Fix>, FixLogError> {
    let handle = File::open(path)?;
    read_fix_log(BufReader::new(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_a_fix() {
        let (leftover, fix) = parse_fix("FIX:39.9042,116.4074,1700000000000").unwrap();
        assert_eq!(leftover, "");
        assert_eq!(fix, Fix::new(39.9042, 116.4074, 1_700_000_000_000));
    }

    #[test]
    fn tolerates_spaces_and_signs() {
        let fix: Fix = "  FIX: -33.8688 , 151.2093 ,42 ".parse().unwrap();
        assert_eq!(fix, Fix::new(-33.8688, 151.2093, 42));

        let fix: Fix = "FIX:0,-0.5,0".parse().unwrap();
        assert_eq!(fix, Fix::new(0.0, -0.5, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!("FIX:1.0,2.0".parse::<Fix>().is_err());
        assert!("FIX:1.0,2.0,-5".parse::<Fix>().is_err());
        assert!("POS:1.0,2.0,3".parse::<Fix>().is_err());
        assert!("FIX:1.0,2.0,3 trailing".parse::<Fix>().is_err());
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        assert!("FIX:nan,nan,0".parse::<Fix>().is_err());
        assert!("FIX:39.9,inf,0".parse::<Fix>().is_err());
        assert!("FIX:-infinity,116.4,0".parse::<Fix>().is_err());

        let log = "FIX:39.9042,116.4074,0\nFIX:NaN,116.4074,5000\n";
        match read_fix_log(Cursor::new(log)) {
            Err(FixLogError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a malformed line, got {:?}", other),
        }
    }

    #[test]
    fn display_parses_back() {
        let fix = Fix::new(39.9052, 116.4084, 5000);
        assert_eq!(fix.to_string().parse::<Fix>().unwrap(), fix);
    }

    #[test]
    fn reads_a_log() {
        let log = "# recorded walk\nFIX:39.9042,116.4074,0\n\nFIX:39.9047,116.4079,5000\n";
        let fixes = read_fix_log(Cursor::new(log)).unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[1].timestamp_ms, 5000);
    }

    #[test]
    fn reports_the_bad_line() {
        let log = "FIX:1,1,1\n# ok\nnot a fix\n";
        match read_fix_log(Cursor::new(log)) {
            Err(FixLogError::Malformed { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a malformed line, got {:?}", other),
        }
    }
}
