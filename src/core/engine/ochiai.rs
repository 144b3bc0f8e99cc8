use crate::core::engine::SuspiciousnessCalculator;
use crate::types::{ExecutionSpectrum, Statement, SuspiciousnessScore};

/// The Ochiai similarity coefficient applied to fault localization:
///
/// ```text
/// suspiciousness(s) = failing(s) / sqrt(total_failing * (failing(s) + passing(s)))
/// ```
///
/// Scores fall in [0, 1]. The shared-contract precondition guarantees
/// `total_failing >= 1`, and every statement in a well-formed spectrum was
/// executed by at least one test, so the denominator is never zero.
pub struct OchiaiCalculator;

impl SuspiciousnessCalculator for OchiaiCalculator {
    fn score_mixed_spectrum(&self, spectrum: &ExecutionSpectrum) -> Vec<SuspiciousnessScore> {
        let total_failing = spectrum.test_ids(false).len();

        spectrum
            .statements()
            .map(|statement| statement_score(spectrum, statement, total_failing))
            .collect()
    }
}

fn statement_score(
    spectrum: &ExecutionSpectrum,
    statement: &Statement,
    total_failing: usize,
) -> SuspiciousnessScore {
    let failing = spectrum.tests_covering_with_outcome(statement, false).len();
    let passing = spectrum.tests_covering_with_outcome(statement, true).len();
    debug_assert!(
        failing + passing > 0,
        "statement {statement} was not executed by any test"
    );

    let numerator = failing as f64;
    let denominator = (total_failing as f64 * (failing + passing) as f64).sqrt();

    SuspiciousnessScore::new(statement.clone(), numerator / denominator)
}
