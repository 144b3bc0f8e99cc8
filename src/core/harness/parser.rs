//! Parses the spectrum file a test harness writes.
//!
//! The format, one test record per line:
//!
//! - Blank and whitespace-only lines are ignored; other lines are trimmed
//!   before parsing.
//! - A record is a whitespace-delimited token list starting with `passed` or
//!   `failed` (case-insensitive).
//! - The remaining tokens pair up as `file line-number`, one pair per
//!   statement the test executed. Repeating a pair is allowed and records the
//!   statement once.
//!
//! Example:
//!
//! ```text
//! passed app.rb 1 app.rb 2 app.rb 4 app.rb 6 utility.rb 23 app.rb 11
//! passed app.rb 1 app.rb 1 app.rb 2 app.rb 3 utility.rb 25 app.rb 11
//! failed app.rb 1 app.rb 2 app.rb 4 app.rb 5 utility.rb 24 app.rb 11
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::types::{AppError, AppResult, ExecutionSpectrum, Statement, TestCase};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpectrumFormatError {
    #[error("line {line}: expected \"passed\" or \"failed\", found {token:?}")]
    UnknownOutcome { line: usize, token: String },

    #[error("line {line}: invalid statement line number {token:?}")]
    InvalidLineNumber { line: usize, token: String },
}

/// Reads and parses a harness output file, tagging any format error with the
/// file path.
pub fn parse_spectrum_file(path: &Path) -> AppResult<ExecutionSpectrum> {
    let contents = fs::read_to_string(path)?;
    parse_spectrum(&contents).map_err(|source| AppError::Spectrum {
        path: path.display().to_string(),
        source,
    })
}

/// Parses the full contents of a harness output file.
pub fn parse_spectrum(input: &str) -> Result<ExecutionSpectrum, SpectrumFormatError> {
    let mut spectrum = ExecutionSpectrum::new();

    for (index, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        spectrum.add_test(parse_test_record(line, index + 1)?);
    }

    Ok(spectrum)
}

/// Parses a single non-blank, trimmed record line.
fn parse_test_record(line: &str, line_number: usize) -> Result<TestCase, SpectrumFormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let outcome = tokens[0];
    let passed = if outcome.eq_ignore_ascii_case("passed") {
        true
    } else if outcome.eq_ignore_ascii_case("failed") {
        false
    } else {
        return Err(SpectrumFormatError::UnknownOutcome {
            line: line_number,
            token: outcome.to_string(),
        });
    };

    // A trailing file token with no line number after it is dropped.
    let mut statements = Vec::new();
    for pair in tokens[1..].chunks_exact(2) {
        let number: u32 =
            pair[1]
                .parse()
                .map_err(|_| SpectrumFormatError::InvalidLineNumber {
                    line: line_number,
                    token: pair[1].to_string(),
                })?;
        statements.push(Statement::new(pair[0], number));
    }

    Ok(TestCase::new(passed, statements))
}
