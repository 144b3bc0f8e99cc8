use crate::types::{ExecutionSpectrum, SuspiciousnessScore};

/// Spectrum-based fault localization techniques differ entirely in how they
/// score statements, so the shared entry point lives in a trait and concrete
/// algorithms only supply the interesting part.
pub trait SuspiciousnessCalculator {
    /// Scores every statement in the spectrum.
    ///
    /// A spectrum with no passing tests scores every statement 1.0 (all the
    /// evidence is failure), and one with no failing tests scores every
    /// statement 0.0. Both algorithms would otherwise divide by zero on such
    /// input, so those cases are handled here and never reach
    /// [`score_mixed_spectrum`](Self::score_mixed_spectrum).
    fn calculate_suspiciousness(&self, spectrum: &ExecutionSpectrum) -> Vec<SuspiciousnessScore> {
        let any_passing = spectrum.tests().iter().any(|t| t.passed());
        let any_failing = spectrum.tests().iter().any(|t| !t.passed());

        if !any_passing {
            return uniform_scores(spectrum, 1.0);
        }
        if !any_failing {
            return uniform_scores(spectrum, 0.0);
        }

        self.score_mixed_spectrum(spectrum)
    }

    /// Algorithm-specific scoring. Implementations may assume the spectrum
    /// holds at least one passing and at least one failing test.
    fn score_mixed_spectrum(&self, spectrum: &ExecutionSpectrum) -> Vec<SuspiciousnessScore>;
}

fn uniform_scores(spectrum: &ExecutionSpectrum, value: f64) -> Vec<SuspiciousnessScore> {
    spectrum
        .statements()
        .map(|statement| SuspiciousnessScore::new(statement.clone(), value))
        .collect()
}
