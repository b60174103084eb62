// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod candidate;
pub mod config;
pub mod conscious;
pub mod decision;
pub mod metrics;
pub mod stats;

pub use candidate::{PeerCandidate, RankedPeer, ScoreWeights};
pub use config::EngineConfig;
pub use conscious::{CausalTrace, ConsciousState, Insight};
pub use decision::{Decision, DecisionError, DecisionId, DecisionOutcome, IntentKind};
pub use metrics::MetricSnapshot;
pub use stats::DecisionStats;
