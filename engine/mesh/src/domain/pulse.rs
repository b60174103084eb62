// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Cognitive pulses and semantic overlap.
//!
//! A pulse is a node's periodic broadcast of its current goal: an [`Intent`],
//! a confidence in that intent, and a set of context tags. Two pulses are
//! compared with [`overlap`], a symmetric score in `[0, 1]` that blends a
//! fixed intent-similarity heuristic with the Jaccard index of the tag sets.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Default blend weight given to intent similarity (the rest goes to tags).
pub const DEFAULT_INTENT_WEIGHT: f64 = 0.6;

/// Similarity floor for intents with no heuristic relation.
const UNRELATED_INTENT_SIMILARITY: f64 = 0.1;

/// A symbolic goal a node can declare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Stabilize the system.
    Stabilize,
    /// Balance load across nodes.
    BalanceLoad,
    /// Adaptive healing / recovery.
    AdaptiveHealing,
    /// Explore new patterns.
    Explore,
    /// Optimize resource usage.
    Optimize,
    /// Free-form intent.
    Custom(String),
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Intent::Stabilize => "stabilize",
            Intent::BalanceLoad => "balance_load",
            Intent::AdaptiveHealing => "adaptive_healing",
            Intent::Explore => "explore",
            Intent::Optimize => "optimize",
            Intent::Custom(s) => s,
        }
    }

    /// Heuristic similarity with another intent.
    ///
    /// Identical intents score 1.0. A small table rates related pairs
    /// (stabilizing and healing pursue the same end state; balancing and
    /// optimizing both move load around). Everything else gets a low floor.
    pub fn similarity(&self, other: &Intent) -> f64 {
        if self == other {
            return 1.0;
        }
        match (self, other) {
            (Intent::Stabilize, Intent::AdaptiveHealing)
            | (Intent::AdaptiveHealing, Intent::Stabilize) => 0.6,
            (Intent::BalanceLoad, Intent::Optimize)
            | (Intent::Optimize, Intent::BalanceLoad) => 0.7,
            _ => UNRELATED_INTENT_SIMILARITY,
        }
    }

    /// Default context tags broadcast alongside this intent.
    pub fn context_tags(&self) -> Vec<String> {
        match self {
            Intent::Stabilize => vec!["stability".into(), "homeostasis".into()],
            Intent::BalanceLoad => vec!["load_balancing".into(), "distribution".into()],
            Intent::AdaptiveHealing => {
                vec!["healing".into(), "recovery".into(), "adaptation".into()]
            }
            Intent::Explore => vec!["exploration".into(), "discovery".into()],
            Intent::Optimize => vec!["optimization".into(), "efficiency".into()],
            Intent::Custom(s) => vec![s.clone()],
        }
    }
}

/// Errors raised when constructing or ingesting a pulse.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// A single broadcast of a node's declared intent.
///
/// Pulses are immutable; the next pulse from the same node supersedes this
/// one. No historical pulse chain is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitivePulse {
    /// Identifier of the broadcasting node.
    pub node_id: String,

    /// Declared intent.
    pub intent: Intent,

    /// Confidence in the declared intent (0.0 - 1.0).
    pub confidence: f64,

    /// Context tags qualifying the intent.
    pub context: Vec<String>,

    /// When the pulse was broadcast.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CognitivePulse {
    /// Create a pulse with the intent's default context tags.
    pub fn new(
        node_id: impl Into<String>,
        intent: Intent,
        confidence: f64,
    ) -> Result<Self, PulseError> {
        let context = intent.context_tags();
        Self::with_context(node_id, intent, confidence, context)
    }

    /// Create a pulse with explicit context tags.
    pub fn with_context(
        node_id: impl Into<String>,
        intent: Intent,
        confidence: f64,
        context: Vec<String>,
    ) -> Result<Self, PulseError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(PulseError::ConfidenceOutOfRange(confidence));
        }
        Ok(Self {
            node_id: node_id.into(),
            intent,
            confidence,
            context,
            timestamp: chrono::Utc::now(),
        })
    }

    /// Semantic overlap with another pulse using the default blend weight.
    pub fn overlap(&self, other: &CognitivePulse) -> f64 {
        overlap(self, other, DEFAULT_INTENT_WEIGHT)
    }
}

/// Semantic overlap between two pulses.
///
/// `alpha` weights intent similarity; `1 - alpha` weights the Jaccard index
/// of the context tag sets. Symmetric in its pulse arguments, and 1.0 for a
/// pulse compared with an identical copy of itself.
pub fn overlap(a: &CognitivePulse, b: &CognitivePulse, alpha: f64) -> f64 {
    let intent_sim = a.intent.similarity(&b.intent);
    let tag_sim = jaccard(&a.context, &b.context);
    alpha * intent_sim + (1.0 - alpha) * tag_sim
}

/// Jaccard index of two tag sets. Two empty sets count as identical.
fn jaccard(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_similarity_table() {
        assert_eq!(Intent::Stabilize.similarity(&Intent::Stabilize), 1.0);
        assert_eq!(Intent::Stabilize.similarity(&Intent::AdaptiveHealing), 0.6);
        assert_eq!(Intent::BalanceLoad.similarity(&Intent::Optimize), 0.7);
        assert_eq!(Intent::Stabilize.similarity(&Intent::Explore), 0.1);
    }

    #[test]
    fn test_intent_similarity_symmetric() {
        let intents = [
            Intent::Stabilize,
            Intent::BalanceLoad,
            Intent::AdaptiveHealing,
            Intent::Explore,
            Intent::Optimize,
            Intent::Custom("special".to_string()),
        ];
        for a in &intents {
            for b in &intents {
                assert_eq!(a.similarity(b), b.similarity(a));
            }
        }
    }

    #[test]
    fn test_pulse_confidence_range() {
        assert!(CognitivePulse::new("node_a", Intent::Stabilize, 0.8).is_ok());
        assert!(CognitivePulse::new("node_a", Intent::Stabilize, 1.2).is_err());
        assert!(CognitivePulse::new("node_a", Intent::Stabilize, -0.1).is_err());
    }

    #[test]
    fn test_overlap_symmetric_and_self_identical() {
        let a = CognitivePulse::new("node_a", Intent::Stabilize, 0.8).unwrap();
        let b = CognitivePulse::new("node_b", Intent::AdaptiveHealing, 0.9).unwrap();

        assert_eq!(a.overlap(&b), b.overlap(&a));

        let a_copy = CognitivePulse::with_context(
            "node_c",
            a.intent.clone(),
            0.7,
            a.context.clone(),
        )
        .unwrap();
        assert!((a.overlap(&a_copy) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlap_identical_intent_full_tags() {
        let a = CognitivePulse::new("node_a", Intent::Stabilize, 0.8).unwrap();
        let b = CognitivePulse::new("node_b", Intent::Stabilize, 0.9).unwrap();

        // Same intent, same default tags: full overlap.
        assert!((a.overlap(&b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlap_blend_weights() {
        let a = CognitivePulse::with_context(
            "node_a",
            Intent::Stabilize,
            0.8,
            vec!["x".into()],
        )
        .unwrap();
        let b = CognitivePulse::with_context(
            "node_b",
            Intent::Stabilize,
            0.9,
            vec!["y".into()],
        )
        .unwrap();

        // Same intent (1.0), disjoint tags (0.0): overlap == alpha.
        let score = overlap(&a, &b, 0.6);
        assert!((score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_empty_sets() {
        let a = CognitivePulse::with_context("node_a", Intent::Explore, 0.5, vec![]).unwrap();
        let b = CognitivePulse::with_context("node_b", Intent::Explore, 0.5, vec![]).unwrap();
        assert!((a.overlap(&b) - 1.0).abs() < f64::EPSILON);

        let c = CognitivePulse::with_context("node_c", Intent::Explore, 0.5, vec!["t".into()])
            .unwrap();
        // One side empty: tag similarity is 0, only the intent term remains.
        assert!((a.overlap(&c) - DEFAULT_INTENT_WEIGHT).abs() < 1e-9);
    }
}
