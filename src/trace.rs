//! Branch trace reader
//!
//! A trace is a text file with one branch record per line:
//!
//! ```text
//! B from 00008008 to 00008040 F * taken
//! B from 0000800c to 00008000 B   not taken
//! R from 00008070               ? not taken
//! ```
//!
//! `B` records are conditional branches with a target and a direction
//! (`F`orward or `B`ackward). `R` records are returns, whose target is not
//! encoded in the trace.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ParseErrorKind, SimulatorResult, TraceError};

/// Kind of control-flow instruction behind a record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchKind {
    Conditional,
    Return,
}

/// Direction of a branch relative to its own address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    /// Returns carry no direction in the trace
    Unknown,
}

/// A single branch record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchEvent {
    pub address: u32,
    pub target: Option<u32>,
    pub kind: BranchKind,
    pub direction: Direction,
    pub taken: bool,
}

impl BranchEvent {
    /// Conditional branch; the direction is derived from the target
    pub fn conditional(address: u32, target: u32, taken: bool) -> Self {
        let direction = if target < address {
            Direction::Backward
        } else {
            Direction::Forward
        };
        Self {
            address,
            target: Some(target),
            kind: BranchKind::Conditional,
            direction,
            taken,
        }
    }

    pub fn ret(address: u32, taken: bool) -> Self {
        Self {
            address,
            target: None,
            kind: BranchKind::Return,
            direction: Direction::Unknown,
            taken,
        }
    }
}

/// Lazily reads [`BranchEvent`]s from a trace file.
///
/// The reader stops after the first error; a run is expected to abort on it.
pub struct TraceReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_num: usize,
    failed: bool,
}

impl TraceReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|e| ConfigError::TraceUnreadable(path.clone(), e))?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_num: 0,
            failed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for TraceReader {
    type Item = Result<BranchEvent, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = self.lines.next()?;
            self.line_num += 1;

            let result = match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    parse_record(&line).map_err(|kind| TraceError::ParseError {
                        path: self.path.clone(),
                        line: self.line_num,
                        kind,
                    })
                }
                Err(e) => {
                    Err(TraceError::ReadError(self.path.clone(), self.line_num, e))
                }
            };

            self.failed = result.is_err();
            return Some(result);
        }
    }
}

/// Read the whole trace into memory
pub fn fetch_events(trace_path: impl AsRef<Path>) -> SimulatorResult<Vec<BranchEvent>> {
    let reader = TraceReader::open(trace_path)?;
    let events = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}

/// Parse a single non-empty trace line
pub fn parse_record(line: &str) -> Result<BranchEvent, ParseErrorKind> {
    let mut tokens = line.split_whitespace().peekable();

    let kind = match tokens.next() {
        Some("B") => BranchKind::Conditional,
        Some("R") => BranchKind::Return,
        Some(other) => {
            return Err(ParseErrorKind::UnknownRecordKind(other.to_string()))
        }
        None => return Err(ParseErrorKind::MissingField("record kind")),
    };

    expect_keyword(tokens.next(), "from")?;
    let address = parse_address(tokens.next(), "source address")?;

    let (target, direction) = match kind {
        BranchKind::Conditional => {
            expect_keyword(tokens.next(), "to")?;
            let target = parse_address(tokens.next(), "target address")?;
            let direction = match tokens.next() {
                Some("F") => Direction::Forward,
                Some("B") => Direction::Backward,
                Some(other) => {
                    return Err(ParseErrorKind::InvalidDirection(other.to_string()))
                }
                None => return Err(ParseErrorKind::MissingField("direction")),
            };
            // Optional single '*' marker
            if tokens.peek() == Some(&"*") {
                tokens.next();
            }
            (Some(target), direction)
        }
        BranchKind::Return => {
            expect_keyword(tokens.next(), "?")?;
            (None, Direction::Unknown)
        }
    };

    let outcome: Vec<&str> = tokens.collect();
    let taken = match outcome.as_slice() {
        ["taken"] => true,
        ["not", "taken"] => false,
        [] => return Err(ParseErrorKind::MissingField("outcome")),
        other => return Err(ParseErrorKind::InvalidOutcome(other.join(" "))),
    };

    Ok(BranchEvent {
        address,
        target,
        kind,
        direction,
        taken,
    })
}

fn expect_keyword(
    token: Option<&str>,
    expected: &'static str,
) -> Result<(), ParseErrorKind> {
    match token {
        Some(t) if t == expected => Ok(()),
        Some(t) => Err(ParseErrorKind::UnexpectedToken {
            expected,
            found: t.to_string(),
        }),
        None => Err(ParseErrorKind::MissingField(expected)),
    }
}

fn parse_address(
    token: Option<&str>,
    field: &'static str,
) -> Result<u32, ParseErrorKind> {
    let token = token.ok_or(ParseErrorKind::MissingField(field))?;
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16)
        .map_err(|_| ParseErrorKind::InvalidAddress(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_trace(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_taken_forward_branch() {
        let event = parse_record("B from 00008008 to 00008040 F * taken").unwrap();
        assert_eq!(event.address, 0x8008);
        assert_eq!(event.target, Some(0x8040));
        assert_eq!(event.kind, BranchKind::Conditional);
        assert_eq!(event.direction, Direction::Forward);
        assert!(event.taken);
    }

    #[test]
    fn test_parse_not_taken_backward_branch() {
        let event = parse_record("B from 0000800c to 00008000 B   not taken").unwrap();
        assert_eq!(event.direction, Direction::Backward);
        assert!(!event.taken);
    }

    #[test]
    fn test_parse_return() {
        let event = parse_record("R from 00008070               ? not taken").unwrap();
        assert_eq!(event.address, 0x8070);
        assert_eq!(event.target, None);
        assert_eq!(event.kind, BranchKind::Return);
        assert_eq!(event.direction, Direction::Unknown);
        assert!(!event.taken);

        let event = parse_record("R from 00008070 ? taken").unwrap();
        assert!(event.taken);
    }

    #[test]
    fn test_parse_prefixed_address() {
        let event = parse_record("B from 0x10 to 0x8 B taken").unwrap();
        assert_eq!(event.address, 0x10);
        assert_eq!(event.target, Some(0x8));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_record("X from 00008008"),
            Err(ParseErrorKind::UnknownRecordKind("X".to_string()))
        );
        assert_eq!(
            parse_record("B at 00008008 to 00008040 F taken"),
            Err(ParseErrorKind::UnexpectedToken {
                expected: "from",
                found: "at".to_string()
            })
        );
        assert_eq!(
            parse_record("B from 0000zz08 to 00008040 F taken"),
            Err(ParseErrorKind::InvalidAddress("0000zz08".to_string()))
        );
        assert_eq!(
            parse_record("B from 100000000 to 00008040 F taken"),
            Err(ParseErrorKind::InvalidAddress("100000000".to_string()))
        );
        assert_eq!(
            parse_record("B from 00008008 to 00008040 X taken"),
            Err(ParseErrorKind::InvalidDirection("X".to_string()))
        );
        assert_eq!(
            parse_record("B from 00008008 to 00008040 F *"),
            Err(ParseErrorKind::MissingField("outcome"))
        );
        assert_eq!(
            parse_record("B from 00008008 to 00008040 F * maybe"),
            Err(ParseErrorKind::InvalidOutcome("maybe".to_string()))
        );
        assert_eq!(
            parse_record("B from 00008008"),
            Err(ParseErrorKind::MissingField("to"))
        );
    }

    #[test]
    fn test_parse_marker_errors() {
        assert_eq!(
            parse_record("B from 1 to 2 F ? taken"),
            Err(ParseErrorKind::InvalidOutcome("? taken".to_string()))
        );
        assert_eq!(
            parse_record("B from 1 to 2 F * * ? taken"),
            Err(ParseErrorKind::InvalidOutcome("* ? taken".to_string()))
        );
        assert_eq!(
            parse_record("R from 00008070 taken"),
            Err(ParseErrorKind::UnexpectedToken {
                expected: "?",
                found: "taken".to_string()
            })
        );
        assert_eq!(
            parse_record("R from 00008070 * taken"),
            Err(ParseErrorKind::UnexpectedToken {
                expected: "?",
                found: "*".to_string()
            })
        );
        assert_eq!(
            parse_record("R from 00008070 ? ? taken"),
            Err(ParseErrorKind::InvalidOutcome("? taken".to_string()))
        );
        assert_eq!(
            parse_record("R from 00008070"),
            Err(ParseErrorKind::MissingField("?"))
        );
    }

    #[test]
    fn test_reader_skips_blank_lines() {
        let file = write_trace(
            "B from 00008008 to 00008040 F * taken\n\n   \nR from 00008070 ? not taken\n",
        );
        let events = fetch_events(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, BranchKind::Return);
    }

    #[test]
    fn test_reader_reports_line_number() {
        let file = write_trace(
            "B from 00008008 to 00008040 F * taken\n\nB from 00008008 to 00008040 Q taken\n",
        );
        let mut reader = TraceReader::open(file.path()).unwrap();
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(TraceError::ParseError { line, kind, .. })) => {
                assert_eq!(line, 3);
                assert_eq!(kind, ParseErrorKind::InvalidDirection("Q".to_string()));
            }
            _ => panic!("expected a parse error"),
        }
        // Fused after the first error
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_missing_trace_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = TraceReader::open(dir.path().join("missing.trace"));
        assert!(matches!(result, Err(ConfigError::TraceUnreadable(_, _))));
    }

    #[test]
    fn test_conditional_direction() {
        assert_eq!(
            BranchEvent::conditional(0x100, 0x80, true).direction,
            Direction::Backward
        );
        assert_eq!(
            BranchEvent::conditional(0x100, 0x180, true).direction,
            Direction::Forward
        );
    }
}
