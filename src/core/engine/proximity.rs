//! Proximity-based weighting, after Bandyopadhyay and Ghosh, "Proximity Based
//! Weighting of Test Cases to Improve Spectrum Based Fault Localization"
//! (ASE 2011).
//!
//! Passing tests whose coverage looks like the failing tests' coverage carry
//! more evidence than passing tests that wandered elsewhere, so each passing
//! test is weighted by its mean coverage similarity to the failing tests
//! before the per-statement scores are computed. The pipeline runs in seven
//! stages, each a pure function exported on its own so it can be pinned to
//! the worked example from the paper.

use strum::{Display, EnumString};

use crate::core::engine::SuspiciousnessCalculator;
use crate::types::{ExecutionSpectrum, Statement, SuspiciousnessScore, TestCase, TestId};

/// How to pick the cutoff below/above which a weighting counts as an outlier
/// and gets dampened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum ThresholdPolicy {
    /// No threshold on this side; no weighting is adjusted because of it.
    #[strum(serialize = "none")]
    Ignored,
    /// The first (lower) or third (upper) quartile of the weightings.
    #[strum(serialize = "quartile")]
    Quartile,
    /// Tukey's outlier fence: quartile -/+ 1.5 times the interquartile range.
    #[strum(serialize = "tail")]
    Tail,
}

/// Which end of the weighting distribution a threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// A test paired with a weight. The same shape passes through three pipeline
/// stages (unadjusted, adjusted, final); only the meaning of the number
/// changes, so one type serves all three.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weighting {
    pub test: TestId,
    pub weight: f64,
}

/// Stage 1: code-coverage proximity between two tests, the Jaccard similarity
/// of their executed-statement sets. Symmetric; 1.0 for identical coverage,
/// 0.0 for disjoint coverage. When both sets are empty the result is NaN and
/// stays NaN; an empty coverage set never occurs in harness-produced spectra.
pub fn coverage_proximity(a: &TestCase, b: &TestCase) -> f64 {
    let intersection = a
        .statements_executed()
        .intersection(b.statements_executed())
        .count();
    let union = a.statements_executed().len() + b.statements_executed().len() - intersection;

    intersection as f64 / union as f64
}

/// Stage 2: the weighting of a passing test before outlier adjustment and
/// scaling, the arithmetic mean of its proximity to every failing test.
///
/// # Panics
///
/// Panics if `test` refers to a failing test; proximity weighting is defined
/// only for passing tests, and being handed a failing one is a caller bug.
pub fn unadjusted_weight(
    spectrum: &ExecutionSpectrum,
    test: TestId,
    failing_tests: &[TestId],
) -> Weighting {
    let candidate = &spectrum.tests()[test];
    assert!(
        candidate.passed(),
        "proximity weighting is only defined for passing tests"
    );

    let sum: f64 = failing_tests
        .iter()
        .map(|&failing| coverage_proximity(candidate, &spectrum.tests()[failing]))
        .sum();

    Weighting {
        test,
        weight: sum / failing_tests.len() as f64,
    }
}

/// Stage 3: the cutoff value for one side of the weighting distribution.
pub fn threshold(weightings: &[Weighting], policy: ThresholdPolicy, bound: Bound) -> f64 {
    match policy {
        ThresholdPolicy::Ignored => match bound {
            Bound::Lower => f64::NEG_INFINITY,
            Bound::Upper => f64::INFINITY,
        },
        ThresholdPolicy::Quartile => quartile(weightings, bound),
        ThresholdPolicy::Tail => {
            let lower_quartile = quartile(weightings, Bound::Lower);
            let upper_quartile = quartile(weightings, Bound::Upper);
            let interquartile_range = upper_quartile - lower_quartile;
            match bound {
                Bound::Lower => lower_quartile - interquartile_range * 1.5,
                Bound::Upper => upper_quartile + interquartile_range * 1.5,
            }
        }
    }
}

/// First or third quartile of the weighting values.
///
/// This is a specific nearest-rank variant, kept bit-for-bit: sort ascending,
/// index `n/4 - 1` (lower) or `3n/4 - 1` (upper) with integer division; when
/// `n` is even, average the indexed value with its successor; when `n` is
/// odd, take the indexed value alone. Do not swap in an interpolating
/// quartile, existing results depend on this one.
///
/// # Panics
///
/// Panics when given fewer than four weightings; the index formulas reach
/// before the start of the list below that.
pub fn quartile(weightings: &[Weighting], bound: Bound) -> f64 {
    assert!(
        weightings.len() >= 4,
        "quartile thresholds require at least four weightings"
    );

    let mut values: Vec<f64> = weightings.iter().map(|w| w.weight).collect();
    values.sort_by(f64::total_cmp);

    let n = values.len();
    let index = match bound {
        Bound::Lower => n / 4 - 1,
        Bound::Upper => n * 3 / 4 - 1,
    };

    if n % 2 == 1 {
        values[index]
    } else {
        (values[index] + values[index + 1]) / 2.0
    }
}

/// Stage 4: dampens weightings that fall outside the thresholds. A weight
/// strictly below the lower threshold or strictly above the upper one is
/// replaced with `1 - weight`; the same reflection on both sides is how the
/// published algorithm defines it, not an oversight.
pub fn adjust_weightings(
    unadjusted: &[Weighting],
    lower_threshold: f64,
    upper_threshold: f64,
) -> Vec<Weighting> {
    unadjusted
        .iter()
        .map(|w| {
            let weight = if w.weight < lower_threshold || w.weight > upper_threshold {
                1.0 - w.weight
            } else {
                w.weight
            };
            Weighting {
                test: w.test,
                weight,
            }
        })
        .collect()
}

/// Stage 5: the factor that renormalizes the adjusted weights so their mean
/// is exactly 1.
pub fn scaling_factor(adjusted: &[Weighting]) -> f64 {
    let sum: f64 = adjusted.iter().map(|w| w.weight).sum();
    adjusted.len() as f64 / sum
}

/// Stage 6: applies the scaling factor to every adjusted weighting.
pub fn scale_weightings(adjusted: &[Weighting], factor: f64) -> Vec<Weighting> {
    adjusted
        .iter()
        .map(|w| Weighting {
            test: w.test,
            weight: w.weight * factor,
        })
        .collect()
}

/// Stage 7: the suspiciousness of one statement,
///
/// ```text
/// failing(s) / (total_failing * (weighted_passing_sum(s) + failing(s)))
/// ```
///
/// where `weighted_passing_sum(s)` adds up the final weights of the passing
/// tests that executed `s`. Unlike Ochiai the result is a relative ranking
/// signal, not a probability.
pub fn statement_score(
    spectrum: &ExecutionSpectrum,
    statement: &Statement,
    total_failing: usize,
    final_weightings: &[Weighting],
) -> SuspiciousnessScore {
    let failing = spectrum.tests_covering_with_outcome(statement, false).len();
    debug_assert!(
        failing > 0 || !spectrum.tests_covering_with_outcome(statement, true).is_empty(),
        "statement {statement} was not executed by any test"
    );

    // Final weightings only ever describe passing tests, so coverage alone
    // decides membership here.
    let weighted_passing_sum: f64 = final_weightings
        .iter()
        .filter(|w| spectrum.tests()[w.test].covers(statement))
        .map(|w| w.weight)
        .sum();

    let suspiciousness =
        failing as f64 / (total_failing as f64 * (weighted_passing_sum + failing as f64));

    SuspiciousnessScore::new(statement.clone(), suspiciousness)
}

/// Runs the seven stages in order for every statement in the spectrum.
pub struct ProximityCalculator {
    lower: ThresholdPolicy,
    upper: ThresholdPolicy,
}

impl ProximityCalculator {
    pub fn new(lower: ThresholdPolicy, upper: ThresholdPolicy) -> Self {
        Self { lower, upper }
    }

    pub fn lower(&self) -> ThresholdPolicy {
        self.lower
    }

    pub fn upper(&self) -> ThresholdPolicy {
        self.upper
    }
}

impl SuspiciousnessCalculator for ProximityCalculator {
    fn score_mixed_spectrum(&self, spectrum: &ExecutionSpectrum) -> Vec<SuspiciousnessScore> {
        let passing_tests = spectrum.test_ids(true);
        let failing_tests = spectrum.test_ids(false);

        let unadjusted: Vec<Weighting> = passing_tests
            .iter()
            .map(|&test| unadjusted_weight(spectrum, test, &failing_tests))
            .collect();

        let lower_threshold = threshold(&unadjusted, self.lower, Bound::Lower);
        let upper_threshold = threshold(&unadjusted, self.upper, Bound::Upper);

        let adjusted = adjust_weightings(&unadjusted, lower_threshold, upper_threshold);
        let factor = scaling_factor(&adjusted);
        let final_weightings = scale_weightings(&adjusted, factor);

        spectrum
            .statements()
            .map(|statement| {
                statement_score(spectrum, statement, failing_tests.len(), &final_weightings)
            })
            .collect()
    }
}
