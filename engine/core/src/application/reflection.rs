// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Reflection: mining the decision history for insights.
//!
//! A reflection pass scans completed decisions and produces [`Insight`]s
//! about peer reliability, luck calibration, and per-intent behavior. The
//! pass is triggered explicitly (POST /conscious/reflect) rather than on a
//! timer so its latency is observable per run.

use crate::domain::conscious::{ConsciousState, Insight};
use crate::domain::decision::Decision;
use crate::infrastructure::decision_store::InMemoryDecisionStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Minimum completed decisions before a per-peer or per-intent pattern is
/// worth reporting.
const MIN_SAMPLE: usize = 5;

/// Stateless analyzer over a slice of decisions.
pub struct ReflectionAnalyzer;

impl ReflectionAnalyzer {
    pub fn analyze(decisions: &[Decision]) -> Vec<Insight> {
        let completed: Vec<&Decision> =
            decisions.iter().filter(|d| d.outcome.is_terminal()).collect();
        if completed.is_empty() {
            return Vec::new();
        }

        let mut insights = Vec::new();
        insights.extend(Self::peer_reliability(&completed));
        insights.extend(Self::luck_calibration(&completed));
        insights.extend(Self::intent_patterns(&completed));
        insights
    }

    /// Peers whose completed decisions skew strongly toward one outcome.
    fn peer_reliability(completed: &[&Decision]) -> Vec<Insight> {
        let mut per_peer: HashMap<&str, (usize, f64)> = HashMap::new();
        for decision in completed {
            let entry = per_peer.entry(decision.chosen_peer.as_str()).or_default();
            entry.0 += 1;
            entry.1 += decision.outcome.success_score();
        }

        let mut insights = Vec::new();
        for (peer, (count, score_sum)) in per_peer {
            if count < MIN_SAMPLE {
                continue;
            }
            let rate = score_sum / count as f64;
            if rate >= 0.9 {
                insights.push(Insight::new(
                    format!("Peer {peer} resolves {:.0}% of routed work ({count} decisions); a strong default choice", rate * 100.0),
                    "peer_reliability",
                    0.7,
                ));
            } else if rate <= 0.3 {
                insights.push(Insight::new(
                    format!("Peer {peer} fails most routed work ({:.0}% success over {count} decisions); consider demoting", rate * 100.0),
                    "peer_reliability",
                    0.9,
                ));
            }
        }
        insights
    }

    /// How well the luck score predicted outcomes.
    fn luck_calibration(completed: &[&Decision]) -> Vec<Insight> {
        if completed.len() < MIN_SAMPLE {
            return Vec::new();
        }

        let mean_error = completed
            .iter()
            .map(|d| d.outcome.success_score() - d.luck_score)
            .sum::<f64>()
            / completed.len() as f64;

        let lucky = completed.iter().filter(|d| d.was_lucky()).count();
        let unlucky = completed.iter().filter(|d| d.was_unlucky()).count();

        let mut insights = Vec::new();
        if mean_error.abs() > 0.2 {
            let direction = if mean_error > 0.0 {
                "underestimates"
            } else {
                "overestimates"
            };
            insights.push(Insight::new(
                format!(
                    "Luck scoring {direction} outcomes by {:.2} on average over {} decisions",
                    mean_error.abs(),
                    completed.len()
                ),
                "luck_calibration",
                0.8,
            ));
        } else {
            insights.push(Insight::new(
                format!(
                    "Luck scoring is well calibrated: {lucky} confident successes, {unlucky} anticipated failures, mean error {:.2}",
                    mean_error.abs()
                ),
                "luck_calibration",
                0.4,
            ));
        }
        insights
    }

    /// Intent kinds with unusually poor outcomes.
    fn intent_patterns(completed: &[&Decision]) -> Vec<Insight> {
        let mut per_intent: HashMap<String, (usize, f64)> = HashMap::new();
        for decision in completed {
            let entry = per_intent
                .entry(decision.intent_kind.as_str().to_string())
                .or_default();
            entry.0 += 1;
            entry.1 += decision.outcome.success_score();
        }

        let mut insights = Vec::new();
        for (intent, (count, score_sum)) in per_intent {
            if count < MIN_SAMPLE {
                continue;
            }
            let rate = score_sum / count as f64;
            if rate <= 0.5 {
                insights.push(Insight::new(
                    format!(
                        "Intent '{intent}' succeeds only {:.0}% of the time ({count} decisions); candidate pool may be mismatched",
                        rate * 100.0
                    ),
                    "intent_pattern",
                    0.75,
                ));
            }
        }
        insights
    }
}

/// Runs reflection passes and folds results into the conscious state.
pub struct ReflectionService {
    store: Arc<InMemoryDecisionStore>,
    conscious: Arc<RwLock<ConsciousState>>,
}

impl ReflectionService {
    pub fn new(
        store: Arc<InMemoryDecisionStore>,
        conscious: Arc<RwLock<ConsciousState>>,
    ) -> Self {
        Self { store, conscious }
    }

    /// Run one reflection pass. Returns the insights it produced.
    pub fn reflect(&self) -> Vec<Insight> {
        let started = Instant::now();
        let insights = ReflectionAnalyzer::analyze(&self.store.all());
        let latency_ms = started.elapsed().as_millis() as u64;

        let mut conscious = self.conscious.write();
        for insight in &insights {
            conscious.add_insight(insight.clone());
        }
        conscious.complete_cycle(latency_ms);

        info!(
            cycle = conscious.cycle_count,
            insights = insights.len(),
            latency_ms,
            "reflection pass complete"
        );
        metrics::histogram!("reflection_latency_ms").record(latency_ms as f64);

        insights
    }
}
