use serde::Serialize;

use crate::types::Statement;

/// A statement paired with the suspiciousness a calculator assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct SuspiciousnessScore {
    pub statement: Statement,
    pub suspiciousness: f64,
}

impl SuspiciousnessScore {
    pub fn new(statement: Statement, suspiciousness: f64) -> Self {
        Self {
            statement,
            suspiciousness,
        }
    }
}

/// Sorts scores most-suspicious first. Ties keep their existing relative
/// order, which follows the spectrum's stable statement order.
pub fn rank_descending(scores: &mut [SuspiciousnessScore]) {
    scores.sort_by(|a, b| b.suspiciousness.total_cmp(&a.suspiciousness));
}

/// The scores computed for one analyzed commit, tagged with the commit hash
/// and its position in the processing order.
#[derive(Debug, Serialize)]
pub struct CommitScores {
    pub commit_hash: String,
    pub order_processed: usize,
    pub scores: Vec<SuspiciousnessScore>,
}

impl CommitScores {
    pub fn new(commit_hash: impl Into<String>, order_processed: usize, scores: Vec<SuspiciousnessScore>) -> Self {
        Self {
            commit_hash: commit_hash.into(),
            order_processed,
            scores,
        }
    }
}
