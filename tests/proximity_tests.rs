mod common;

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use faultline::engine::proximity::{
    Bound, ProximityCalculator, ThresholdPolicy, Weighting, adjust_weightings, coverage_proximity,
    quartile, scale_weightings, scaling_factor, statement_score, threshold, unadjusted_weight,
};
use faultline::engine::SuspiciousnessCalculator;
use faultline::types::{ExecutionSpectrum, Statement, TestCase};

use common::{assert_close, worked_example, worked_example_with_extra_failure};

const TOLERANCE: f64 = 0.000005;

fn unadjusted_weightings(spectrum: &ExecutionSpectrum) -> Vec<Weighting> {
    let failing = spectrum.test_ids(false);
    spectrum
        .test_ids(true)
        .into_iter()
        .map(|test| unadjusted_weight(spectrum, test, &failing))
        .collect()
}

fn final_weightings(spectrum: &ExecutionSpectrum) -> Vec<Weighting> {
    let unadjusted = unadjusted_weightings(spectrum);
    let adjusted = adjust_weightings(&unadjusted, f64::NEG_INFINITY, f64::INFINITY);
    scale_weightings(&adjusted, scaling_factor(&adjusted))
}

fn sorted_weights(weightings: &[Weighting]) -> Vec<f64> {
    let mut weights: Vec<f64> = weightings.iter().map(|w| w.weight).collect();
    weights.sort_by(f64::total_cmp);
    weights
}

fn weightings_from(values: &[f64]) -> Vec<Weighting> {
    values
        .iter()
        .enumerate()
        .map(|(test, &weight)| Weighting { test, weight })
        .collect()
}

#[test]
fn coverage_proximity_on_the_worked_example() {
    let spectrum = worked_example();
    let tests = spectrum.tests();

    assert_close(coverage_proximity(&tests[0], &tests[1]), 7.0 / 8.0, 0.0);
    assert_close(coverage_proximity(&tests[0], &tests[2]), 7.0 / 13.0, 0.0);
    assert_close(coverage_proximity(&tests[1], &tests[2]), 8.0 / 13.0, 0.0);
    assert_close(coverage_proximity(&tests[1], &tests[3]), 7.0 / 13.0, 0.0);

    // Neither test's coverage is a subset of the other's here, so the union
    // is larger than either set.
    assert_close(coverage_proximity(&tests[0], &tests[3]), 6.0 / 13.0, 0.0);
    assert_close(coverage_proximity(&tests[3], &tests[0]), 6.0 / 13.0, 0.0);
}

#[test]
fn coverage_proximity_is_one_for_identical_coverage() {
    let spectrum = worked_example();
    let tests = spectrum.tests();

    assert_close(coverage_proximity(&tests[3], &tests[4]), 1.0, 0.0);
    assert_close(coverage_proximity(&tests[4], &tests[3]), 1.0, 0.0);
}

#[test]
fn coverage_proximity_is_zero_for_disjoint_coverage() {
    let left = TestCase::new(true, [Statement::new("a.rb", 1), Statement::new("a.rb", 2)]);
    let right = TestCase::new(false, [Statement::new("b.rb", 7)]);

    assert_close(coverage_proximity(&left, &right), 0.0, 0.0);
    assert_close(coverage_proximity(&right, &left), 0.0, 0.0);
}

#[test]
fn unadjusted_weight_averages_proximity_to_failing_tests() {
    let spectrum = worked_example_with_extra_failure();
    let failing = spectrum.test_ids(false);

    let weighting = unadjusted_weight(&spectrum, 0, &failing);
    assert_eq!(weighting.test, 0);
    assert_close(weighting.weight, (7.0 / 13.0 + 1.0 / 12.0) / 2.0, TOLERANCE);

    let weighting = unadjusted_weight(&spectrum, 1, &failing);
    assert_eq!(weighting.test, 1);
    assert_close(weighting.weight, (8.0 / 13.0 + 1.0 / 13.0) / 2.0, TOLERANCE);

    let weighting = unadjusted_weight(&spectrum, 3, &failing);
    assert_eq!(weighting.test, 3);
    assert_close(weighting.weight, (12.0 / 13.0 + 5.0 / 13.0) / 2.0, TOLERANCE);

    let weighting = unadjusted_weight(&spectrum, 4, &failing);
    assert_eq!(weighting.test, 4);
    assert_close(weighting.weight, (12.0 / 13.0 + 5.0 / 13.0) / 2.0, TOLERANCE);
}

#[test]
fn unadjusted_weight_rejects_every_failing_test() {
    let spectrum = worked_example_with_extra_failure();
    let failing = spectrum.test_ids(false);
    assert_eq!(failing.len(), 2);

    for &failing_test in &failing {
        let result = catch_unwind(AssertUnwindSafe(|| {
            unadjusted_weight(&spectrum, failing_test, &failing)
        }));
        assert!(
            result.is_err(),
            "weighting failing test {failing_test} should panic"
        );
    }
}

#[test]
fn ignored_thresholds_are_infinite() {
    let weightings = unadjusted_weightings(&worked_example());

    let lower = threshold(&weightings, ThresholdPolicy::Ignored, Bound::Lower);
    assert_eq!(lower, f64::NEG_INFINITY);

    let upper = threshold(&weightings, ThresholdPolicy::Ignored, Bound::Upper);
    assert_eq!(upper, f64::INFINITY);
}

#[test]
fn quartile_thresholds_on_the_worked_example() {
    let weightings = unadjusted_weightings(&worked_example());

    let lower = threshold(&weightings, ThresholdPolicy::Quartile, Bound::Lower);
    assert_close(lower, 0.57692, TOLERANCE);

    let upper = threshold(&weightings, ThresholdPolicy::Quartile, Bound::Upper);
    assert_close(upper, 0.92308, TOLERANCE);
}

#[test]
fn tail_thresholds_on_the_worked_example() {
    let weightings = unadjusted_weightings(&worked_example());

    let lower = threshold(&weightings, ThresholdPolicy::Tail, Bound::Lower);
    assert_close(lower, 0.05769, TOLERANCE);

    let upper = threshold(&weightings, ThresholdPolicy::Tail, Bound::Upper);
    assert_close(upper, 1.44231, TOLERANCE);
}

#[test]
fn quartile_on_an_even_count_averages_adjacent_values() {
    let weightings = weightings_from(&[0.9, 0.1, 0.5, 0.3]);

    assert_close(quartile(&weightings, Bound::Lower), 0.2, 0.0);
    assert_close(quartile(&weightings, Bound::Upper), 0.7, 0.0);
}

#[test]
fn quartile_on_an_odd_count_takes_a_single_value() {
    let weightings = weightings_from(&[1.6, 0.2, 0.1, 0.8, 0.4]);

    assert_close(quartile(&weightings, Bound::Lower), 0.1, 0.0);
    assert_close(quartile(&weightings, Bound::Upper), 0.4, 0.0);
}

#[test]
fn tail_thresholds_derive_from_the_same_quartiles() {
    let weightings = weightings_from(&[1.6, 0.2, 0.1, 0.8, 0.4]);

    // Q1 = 0.1 and Q3 = 0.4, so the interquartile range is 0.3
    let lower = threshold(&weightings, ThresholdPolicy::Tail, Bound::Lower);
    assert_close(lower, -0.35, TOLERANCE);

    let upper = threshold(&weightings, ThresholdPolicy::Tail, Bound::Upper);
    assert_close(upper, 0.85, TOLERANCE);
}

#[test]
fn quartile_rejects_fewer_than_four_weightings() {
    let weightings = weightings_from(&[0.2, 0.4, 0.9]);
    let result = catch_unwind(AssertUnwindSafe(|| quartile(&weightings, Bound::Lower)));
    assert!(result.is_err());
}

#[test]
fn adjustment_is_the_identity_under_infinite_thresholds() {
    let unadjusted = unadjusted_weightings(&worked_example());

    let adjusted = adjust_weightings(&unadjusted, f64::NEG_INFINITY, f64::INFINITY);
    let weights = sorted_weights(&adjusted);

    assert_eq!(weights.len(), 4);
    assert_close(weights[0], 0.53846, TOLERANCE);
    assert_close(weights[1], 0.61538, TOLERANCE);
    assert_close(weights[2], 0.92308, TOLERANCE);
    assert_close(weights[3], 0.92308, TOLERANCE);
}

#[test]
fn adjustment_reflects_weights_outside_the_thresholds() {
    let unadjusted = unadjusted_weightings(&worked_example());

    // Any threshold values work, not just computed ones
    let adjusted = adjust_weightings(&unadjusted, 0.55, 0.90);
    let weights = sorted_weights(&adjusted);
    assert_eq!(weights.len(), 4);
    assert_close(weights[0], 0.07692, TOLERANCE);
    assert_close(weights[1], 0.07692, TOLERANCE);
    assert_close(weights[2], 0.46154, TOLERANCE);
    assert_close(weights[3], 0.61538, TOLERANCE);

    let adjusted = adjust_weightings(&unadjusted, 0.50, 0.60);
    let weights = sorted_weights(&adjusted);
    assert_eq!(weights.len(), 4);
    assert_close(weights[0], 0.07692, TOLERANCE);
    assert_close(weights[1], 0.07692, TOLERANCE);
    assert_close(weights[2], 0.38462, TOLERANCE);
    assert_close(weights[3], 0.53846, TOLERANCE);
}

#[test]
fn scaling_factor_on_the_worked_example() {
    let unadjusted = unadjusted_weightings(&worked_example());
    let adjusted = adjust_weightings(&unadjusted, f64::NEG_INFINITY, f64::INFINITY);

    assert_close(scaling_factor(&adjusted), 4.0 / 3.0, TOLERANCE);
}

#[test]
fn scaling_normalizes_the_mean_weight_to_one() {
    let unadjusted = unadjusted_weightings(&worked_example());
    let adjusted = adjust_weightings(&unadjusted, f64::NEG_INFINITY, f64::INFINITY);
    let scaled = scale_weightings(&adjusted, scaling_factor(&adjusted));

    let mean: f64 = scaled.iter().map(|w| w.weight).sum::<f64>() / scaled.len() as f64;
    assert_close(mean, 1.0, TOLERANCE);
}

#[test]
fn final_weightings_on_the_worked_example() {
    let finals = final_weightings(&worked_example());
    let weights = sorted_weights(&finals);

    assert_eq!(weights.len(), 4);
    assert_close(weights[0], 0.538462 * 4.0 / 3.0, TOLERANCE);
    assert_close(weights[1], 0.615385 * 4.0 / 3.0, TOLERANCE);
    assert_close(weights[2], 0.923077 * 4.0 / 3.0, TOLERANCE);
    assert_close(weights[3], 0.923077 * 4.0 / 3.0, TOLERANCE);
}

#[test]
fn statement_scores_on_the_worked_example() {
    let spectrum = worked_example();
    let finals = final_weightings(&spectrum);
    let num_failing = spectrum.test_ids(false).len();

    let expectations: &[(u32, f64)] = &[
        (1, 13.0 / 45.0),
        (2, 13.0 / 45.0),
        (3, 13.0 / 45.0),
        (4, 13.0 / 45.0),
        (5, 13.0 / 45.0),
        (6, 13.0 / 33.0),
        (7, 39.0 / 167.0),
        (8, 0.2),
        (9, 0.2),
        (10, 0.2),
        (11, 0.2),
        (12, 0.2),
        (13, 0.2),
    ];

    for &(line, expected) in expectations {
        let statement = Statement::new("program.c", line);
        let score = statement_score(&spectrum, &statement, num_failing, &finals);
        assert_eq!(score.statement, statement);
        assert_close(score.suspiciousness, expected, 0.0005);
    }
}

#[test]
fn full_pipeline_matches_the_stagewise_results() {
    let spectrum = worked_example();
    let calculator = ProximityCalculator::new(ThresholdPolicy::Ignored, ThresholdPolicy::Ignored);

    let scores = calculator.calculate_suspiciousness(&spectrum);
    assert_eq!(scores.len(), 13);

    let by_line: HashMap<u32, f64> = scores
        .iter()
        .map(|s| (s.statement.line, s.suspiciousness))
        .collect();

    for line in 1..=5 {
        assert_close(by_line[&line], 13.0 / 45.0, 0.0005);
    }
    assert_close(by_line[&6], 13.0 / 33.0, 0.0005);
    assert_close(by_line[&7], 39.0 / 167.0, 0.0005);
    for line in 8..=13 {
        assert_close(by_line[&line], 0.2, 0.0005);
    }

    // The faulty statement of the example program is line 6, and it ranks
    // first.
    let top = scores
        .iter()
        .max_by(|a, b| a.suspiciousness.total_cmp(&b.suspiciousness))
        .unwrap();
    assert_eq!(top.statement, Statement::new("program.c", 6));
}

#[test]
fn full_pipeline_with_a_second_failing_test() {
    let spectrum = worked_example_with_extra_failure();
    let calculator = ProximityCalculator::new(ThresholdPolicy::Ignored, ThresholdPolicy::Ignored);

    let scores = calculator.calculate_suspiciousness(&spectrum);
    let by_line: HashMap<u32, f64> = scores
        .iter()
        .map(|s| (s.statement.line, s.suspiciousness))
        .collect();

    for line in 1..=5 {
        assert_close(by_line[&line], 613.0 / 2858.0, 0.0005);
    }
    assert_close(by_line[&6], 613.0 / 2046.0, 0.0005);
    assert_close(by_line[&7], 613.0 / 2677.0, 0.0005);
    // Statements covered by every passing test keep their score: the final
    // weights always sum to the number of passing tests.
    for line in 8..=13 {
        assert_close(by_line[&line], 0.2, 0.0005);
    }
}

#[test]
fn tail_policy_changes_nothing_when_no_weight_is_an_outlier() {
    let spectrum = worked_example();

    // The worked example's weights all sit inside the Tukey fences, so Tail
    // and Ignored agree on it.
    let tail = ProximityCalculator::new(ThresholdPolicy::Tail, ThresholdPolicy::Tail)
        .calculate_suspiciousness(&spectrum);
    let ignored = ProximityCalculator::new(ThresholdPolicy::Ignored, ThresholdPolicy::Ignored)
        .calculate_suspiciousness(&spectrum);

    for (a, b) in tail.iter().zip(ignored.iter()) {
        assert_eq!(a.statement, b.statement);
        assert_close(a.suspiciousness, b.suspiciousness, TOLERANCE);
    }
}

#[test]
fn quartile_policy_reflects_the_outer_weights() {
    let spectrum = worked_example();
    let calculator = ProximityCalculator::new(ThresholdPolicy::Quartile, ThresholdPolicy::Quartile);

    // Q1 = 15/26 and Q3 = 12/13: the lowest weight (7/13) reflects to 6/13,
    // the rest sit inside the closed interval and stay.
    let scores = calculator.calculate_suspiciousness(&spectrum);
    let by_line: HashMap<u32, f64> = scores
        .iter()
        .map(|s| (s.statement.line, s.suspiciousness))
        .collect();

    // Statements 8-13 are covered by all passing tests, so their weighted
    // sum is exactly 4 and the score stays 1/5.
    assert_close(by_line[&8], 0.2, 0.0005);
    // Adjusted weights are 6/13, 8/13, 12/13, 12/13 (factor 26/19), so
    // statement 6's covering pair weighs 12/19 + 16/19 and its score is
    // 1 / (28/19 + 1) = 19/47.
    assert_close(by_line[&6], 19.0 / 47.0, 0.0005);
}
