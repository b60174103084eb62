// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Decision records and their outcome lifecycle.
//!
//! A [`Decision`] is a single ranking/selection act. It is created with a
//! pending outcome and completed later by exactly one terminal outcome
//! report; repeats of the same terminal outcome are accepted as idempotent
//! retries, anything else is rejected.

use crate::domain::candidate::RankedPeer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub Uuid);

impl DecisionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Classification tag for the request a decision served.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentKind {
    Routing,
    TaskScheduling,
    UserRequest,
    Custom(String),
}

impl IntentKind {
    pub fn as_str(&self) -> &str {
        match self {
            IntentKind::Routing => "routing",
            IntentKind::TaskScheduling => "task_scheduling",
            IntentKind::UserRequest => "user_request",
            IntentKind::Custom(s) => s,
        }
    }
}

impl From<String> for IntentKind {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "routing" => IntentKind::Routing,
            "task_scheduling" => IntentKind::TaskScheduling,
            "user_request" => IntentKind::UserRequest,
            _ => IntentKind::Custom(value),
        }
    }
}

impl From<IntentKind> for String {
    fn from(value: IntentKind) -> Self {
        value.as_str().to_string()
    }
}

/// Result of executing a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// Not yet known; every decision starts here.
    Pending,
    /// The chosen peer served the request.
    Success {
        actual_latency_ms: f64,
        actual_quality: f64,
    },
    /// The chosen peer failed (timeout, error, refusal).
    Failure { reason: String },
    /// Partially served.
    Partial {
        completed_ratio: f64,
        issues: Vec<String>,
    },
}

impl DecisionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DecisionOutcome::Success { .. })
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DecisionOutcome::Pending)
    }

    /// Numeric success estimate in `[0, 1]`.
    pub fn success_score(&self) -> f64 {
        match self {
            DecisionOutcome::Success { .. } => 1.0,
            DecisionOutcome::Partial {
                completed_ratio, ..
            } => *completed_ratio,
            DecisionOutcome::Failure { .. } => 0.0,
            DecisionOutcome::Pending => 0.5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DecisionOutcome::Pending => "pending",
            DecisionOutcome::Success { .. } => "success",
            DecisionOutcome::Failure { .. } => "failure",
            DecisionOutcome::Partial { .. } => "partial",
        }
    }

    /// Validates the numeric fields of a reported outcome.
    ///
    /// `success_score` and the causal-trace delta assume these ranges hold,
    /// so out-of-range values (including NaN) are an input error, never
    /// stored.
    pub fn validate(&self) -> Result<(), DecisionError> {
        match self {
            DecisionOutcome::Success {
                actual_latency_ms,
                actual_quality,
            } => {
                if !(0.0..=1.0).contains(actual_quality) {
                    return Err(DecisionError::InvalidInput(format!(
                        "actual_quality {actual_quality} outside [0, 1]"
                    )));
                }
                if !actual_latency_ms.is_finite() || *actual_latency_ms < 0.0 {
                    return Err(DecisionError::InvalidInput(format!(
                        "actual_latency_ms {actual_latency_ms} must be a finite non-negative number"
                    )));
                }
                Ok(())
            }
            DecisionOutcome::Partial {
                completed_ratio, ..
            } => {
                if !(0.0..=1.0).contains(completed_ratio) {
                    return Err(DecisionError::InvalidInput(format!(
                        "completed_ratio {completed_ratio} outside [0, 1]"
                    )));
                }
                Ok(())
            }
            DecisionOutcome::Pending | DecisionOutcome::Failure { .. } => Ok(()),
        }
    }
}

/// Errors surfaced by decision evaluation and outcome reporting.
///
/// All variants are recoverable, caller-visible conditions; nothing here is
/// fatal to the process.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decision {0} not found")]
    NotFound(DecisionId),

    #[error("Decision {decision_id} already has a terminal outcome")]
    RejectedTransition { decision_id: DecisionId },
}

/// A single ranking/selection act with a mutable-once outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Unique id, generated at creation, immutable.
    pub id: DecisionId,

    /// Classification of the request being served.
    pub intent_kind: IntentKind,

    /// Node that made the decision.
    pub node_id: String,

    /// Candidates ranked best-first with their scores.
    pub ranking: Vec<RankedPeer>,

    /// Peer at the top of the ranking.
    pub chosen_peer: String,

    /// The chosen peer's deterministic score (pre-noise).
    pub chosen_score: f64,

    /// Bounded noisy confidence estimate assigned at evaluation time.
    pub luck_score: f64,

    /// Context tags from the request.
    pub context_tags: Vec<String>,

    /// Human-readable explanation of the pick.
    pub explanation: String,

    pub outcome: DecisionOutcome,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Decision {
    /// Apply an outcome report.
    ///
    /// Last write wins while still pending. Once terminal, only an identical
    /// repeat is accepted (idempotent retry); a different outcome is rejected
    /// and the stored outcome is left untouched.
    pub fn apply_outcome(&mut self, outcome: DecisionOutcome) -> Result<(), DecisionError> {
        match &self.outcome {
            DecisionOutcome::Pending => {
                if outcome.is_terminal() {
                    self.completed_at = Some(Utc::now());
                }
                self.outcome = outcome;
                Ok(())
            }
            current if *current == outcome => Ok(()),
            _ => Err(DecisionError::RejectedTransition {
                decision_id: self.id,
            }),
        }
    }

    /// High luck estimate that panned out.
    pub fn was_lucky(&self) -> bool {
        self.luck_score > 0.7 && self.outcome.is_success()
    }

    /// Low luck estimate that indeed went wrong.
    pub fn was_unlucky(&self) -> bool {
        self.luck_score < 0.4 && self.outcome.is_terminal() && !self.outcome.is_success()
    }
}
