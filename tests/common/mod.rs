#![allow(dead_code)]

use faultline::types::{ExecutionSpectrum, Statement, TestCase};

/// The thirteen statements of the single-file example program used by the
/// proximity-based weighting paper's worked example.
pub fn program_statements() -> Vec<Statement> {
    (1..=13).map(|line| Statement::new("program.c", line)).collect()
}

/// The worked example: five tests over thirteen statements, where the third
/// test is the only failing one and covers everything.
pub fn worked_example() -> ExecutionSpectrum {
    let statements = program_statements();

    let mut spectrum = ExecutionSpectrum::new();
    spectrum.add_statements(statements.iter().cloned());
    spectrum.add_tests([
        TestCase::new(true, pick(&statements, [6, 8, 9, 10, 11, 12, 13])),
        TestCase::new(true, pick(&statements, [6, 7, 8, 9, 10, 11, 12, 13])),
        TestCase::new(false, statements.clone()),
        TestCase::new(true, pick(&statements, [1, 2, 3, 4, 5, 7, 8, 9, 10, 11, 12, 13])),
        TestCase::new(true, pick(&statements, [1, 2, 3, 4, 5, 7, 8, 9, 10, 11, 12, 13])),
    ]);

    spectrum
}

/// The worked example plus a second failing test covering statements 1-6.
pub fn worked_example_with_extra_failure() -> ExecutionSpectrum {
    let mut spectrum = worked_example();
    spectrum.add_test(TestCase::new(false, pick(&program_statements(), [1, 2, 3, 4, 5, 6])));
    spectrum
}

fn pick(statements: &[Statement], lines: impl IntoIterator<Item = u32>) -> Vec<Statement> {
    lines
        .into_iter()
        .map(|line| statements[(line - 1) as usize].clone())
        .collect()
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual} (tolerance {tolerance})"
    );
}
