//! Parsing of raw search dumps
//!
//! A dump holds one JSON search response per line. A line that is not a JSON
//! object (bad syntax, invalid UTF-8, a write cut short mid-line) is logged
//! with its text and dropped; the rest of the file is still used. Only failing
//! to open or read the file itself fails the parse.

use railfare_common::{RailfareError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::{BufRead, BufReader};
use std::string::FromUtf8Error;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// One search response, kept as untyped JSON
///
/// Journeys inside a response are decoded one at a time by the flattener, so a
/// single odd journey cannot spoil its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse(Map<String, Value>);

impl RawResponse {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// `data.searchJourney`, if the response has that shape
    pub fn journeys(&self) -> Option<&Vec<Value>> {
        self.0
            .get("data")
            .and_then(|data| data.get("searchJourney"))
            .and_then(Value::as_array)
    }

    /// Leading characters of the serialized response, for log context
    pub fn prefix(&self, max_chars: usize) -> String {
        let text = Value::Object(self.0.clone()).to_string();
        text.chars().take(max_chars).collect()
    }
}

impl<'de> Deserialize<'de> for RawResponse {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Map::deserialize(deserializer).map(RawResponse)
    }
}

/// Why a line was rejected
#[derive(Debug, Error)]
pub enum LineError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// A line that could not be parsed as a JSON object
#[derive(Debug, Error)]
#[error("line {line_number} couldn't be parsed: {source}")]
pub struct MalformedLine {
    /// 1-based line number within the file (0 when parsed standalone)
    pub line_number: usize,
    /// The offending text, verbatim (lossily decoded when not UTF-8)
    pub text: String,
    #[source]
    pub source: LineError,
}

/// Surviving responses of one dump file plus the lines that were dropped
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub responses: Vec<RawResponse>,
    pub rejected: Vec<MalformedLine>,
}

/// Parse one dump line
pub fn parse_line(text: &str) -> std::result::Result<RawResponse, MalformedLine> {
    parse_numbered_line(text, 0)
}

fn parse_numbered_line(
    text: &str,
    line_number: usize,
) -> std::result::Result<RawResponse, MalformedLine> {
    serde_json::from_str::<RawResponse>(text).map_err(|source| {
        warn!(line_number, error = %source, "Couldn't parse response line: {}", text);
        MalformedLine {
            line_number,
            text: text.to_string(),
            source: source.into(),
        }
    })
}

fn decode_line(bytes: Vec<u8>, line_number: usize) -> std::result::Result<String, MalformedLine> {
    String::from_utf8(bytes).map_err(|source| {
        let text = String::from_utf8_lossy(source.as_bytes()).into_owned();
        warn!(line_number, error = %source, "Couldn't decode response line: {}", text);
        MalformedLine {
            line_number,
            text,
            source: source.into(),
        }
    })
}

fn strip_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}

/// Parse every line of a dump file, keeping the well-formed responses
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedFile> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| RailfareError::file_access(path, e))?;

    let mut reader = BufReader::new(file);
    let mut parsed = ParsedFile::default();
    let mut buf = Vec::new();
    let mut line_number = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| RailfareError::file_access(path, e))?;
        if read == 0 {
            break;
        }
        line_number += 1;
        strip_line_ending(&mut buf);

        let line = match decode_line(std::mem::take(&mut buf), line_number) {
            Ok(line) => line,
            Err(malformed) => {
                parsed.rejected.push(malformed);
                continue;
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_numbered_line(&line, line_number) {
            Ok(response) => parsed.responses.push(response),
            Err(malformed) => parsed.rejected.push(malformed),
        }
    }

    debug!(
        path = %path.display(),
        responses = parsed.responses.len(),
        rejected = parsed.rejected.len(),
        "Parsed dump file"
    );

    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"{"data":{"searchJourney":[]}}"#;

    #[test]
    fn test_parse_line_accepts_objects() {
        let response = parse_line(VALID).unwrap();
        assert_eq!(response.journeys().unwrap().len(), 0);
    }

    #[test]
    fn test_parse_line_rejects_truncated_and_non_objects() {
        let truncated = r#"{"data":{"searchJourney":[{"id":"J1""#;
        let err = parse_line(truncated).unwrap_err();
        assert_eq!(err.text, truncated);

        assert!(parse_line("[1, 2, 3]").is_err());
        assert!(parse_line("42").is_err());
    }

    #[test]
    fn test_journeys_missing_when_shape_differs() {
        let response = parse_line(r#"{"errors":[{"message":"rate limited"}]}"#).unwrap();
        assert!(response.journeys().is_none());
    }

    #[test]
    fn test_parse_file_drops_malformed_lines() {
        let broken = r#"{"data": {"searchJourney": ["#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line_number in 1..=10 {
            let line = if line_number == 5 { broken } else { VALID };
            writeln!(file, "{}", line).unwrap();
        }

        let parsed = parse_file(file.path()).unwrap();
        assert_eq!(parsed.responses.len(), 9);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].line_number, 5);
        assert_eq!(parsed.rejected[0].text, broken);
    }

    #[test]
    fn test_parse_file_drops_invalid_utf8_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", VALID).unwrap();
        file.write_all(b"{\"data\":\"\xc3\n").unwrap();
        writeln!(file, "{}", VALID).unwrap();

        let parsed = parse_file(file.path()).unwrap();
        assert_eq!(parsed.responses.len(), 2);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].line_number, 2);
        assert_eq!(parsed.rejected[0].text, "{\"data\":\"\u{FFFD}");
        assert!(matches!(parsed.rejected[0].source, LineError::Encoding(_)));
    }

    #[test]
    fn test_parse_file_accepts_crlf_line_endings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}\r\n{}\r\n", VALID, VALID).unwrap();

        let parsed = parse_file(file.path()).unwrap();
        assert_eq!(parsed.responses.len(), 2);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_parse_file_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}\n\n   \n{}\n", VALID, VALID).unwrap();

        let parsed = parse_file(file.path()).unwrap();
        assert_eq!(parsed.responses.len(), 2);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_parse_file_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_file(dir.path().join("2024-01-01.txt"));
        assert!(matches!(result, Err(RailfareError::FileAccess { .. })));
    }
}
