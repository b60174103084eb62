// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Aggregate decision statistics.
//!
//! Computed on demand from the store's current contents rather than
//! incrementally cached, so the rollup can never drift from the records.

use crate::domain::decision::{Decision, DecisionOutcome};
use serde::{Deserialize, Serialize};

/// Rollup over a set of decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionStats {
    pub total_decisions: usize,
    pub successful_decisions: usize,
    pub failed_decisions: usize,
    pub partial_decisions: usize,
    pub pending_decisions: usize,

    /// `successful / total`; 0.0 exactly when there are no decisions.
    pub success_rate: f64,

    /// Mean luck score over all decisions, pending included — luck is
    /// assigned at evaluation time, not at outcome time.
    pub avg_luck_score: f64,

    /// Mean of the chosen candidate's pre-noise score.
    pub avg_confidence: f64,

    /// High luck that panned out (luck > 0.7, success).
    pub lucky_decisions: usize,

    /// Low luck that went wrong (luck < 0.4, terminal non-success).
    pub unlucky_decisions: usize,
}

impl DecisionStats {
    /// Derive the rollup from a snapshot of decisions.
    pub fn compute(decisions: &[Decision]) -> Self {
        let total = decisions.len();
        if total == 0 {
            return Self::default();
        }

        let mut stats = Self {
            total_decisions: total,
            ..Self::default()
        };

        for decision in decisions {
            match &decision.outcome {
                DecisionOutcome::Success { .. } => stats.successful_decisions += 1,
                DecisionOutcome::Failure { .. } => stats.failed_decisions += 1,
                DecisionOutcome::Partial { .. } => stats.partial_decisions += 1,
                DecisionOutcome::Pending => stats.pending_decisions += 1,
            }
            if decision.was_lucky() {
                stats.lucky_decisions += 1;
            }
            if decision.was_unlucky() {
                stats.unlucky_decisions += 1;
            }
        }

        stats.success_rate = stats.successful_decisions as f64 / total as f64;
        stats.avg_luck_score =
            decisions.iter().map(|d| d.luck_score).sum::<f64>() / total as f64;
        stats.avg_confidence =
            decisions.iter().map(|d| d.chosen_score).sum::<f64>() / total as f64;

        stats
    }
}
