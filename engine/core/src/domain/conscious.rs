// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Conscious state: causal traces, insights, and the reflection cycle.
//!
//! The engine records a causal trace per completed decision and appends the
//! insights the reflection analyzer produces. The HTTP surface exposes this
//! state read-only.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const MAX_TRACES: usize = 1000;
const MAX_INSIGHTS: usize = 200;

/// A recorded cause/effect observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalTrace {
    pub cause: String,
    pub effect: String,

    /// Signed magnitude of the observed change.
    pub delta: f64,

    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl CausalTrace {
    pub fn new(cause: impl Into<String>, effect: impl Into<String>, delta: f64) -> Self {
        Self {
            cause: cause.into(),
            effect: effect.into(),
            delta,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// A generated observation about system behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub insight: String,
    pub category: String,

    /// Relative importance in `[0, 1]`.
    pub importance: f64,

    pub timestamp: i64,
}

impl Insight {
    pub fn new(insight: impl Into<String>, category: impl Into<String>, importance: f64) -> Self {
        Self {
            insight: insight.into(),
            category: category.into(),
            importance,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Per-node conscious state with bounded trace and insight histories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsciousState {
    pub node_id: String,

    /// Monotonically increasing reflection cycle counter.
    pub cycle_count: u64,

    /// Timestamp of the last completed cycle (ms since epoch).
    pub last_cycle: i64,

    /// Latency of the most recent reflection pass, externally measured.
    pub self_reflection_latency_ms: u64,

    traces: VecDeque<CausalTrace>,
    insights: VecDeque<Insight>,
}

impl ConsciousState {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            cycle_count: 0,
            last_cycle: 0,
            self_reflection_latency_ms: 0,
            traces: VecDeque::new(),
            insights: VecDeque::new(),
        }
    }

    pub fn record_trace(&mut self, trace: CausalTrace) {
        if self.traces.len() >= MAX_TRACES {
            self.traces.pop_front();
        }
        self.traces.push_back(trace);
    }

    /// Most recent traces first.
    pub fn recent_traces(&self, limit: usize) -> Vec<CausalTrace> {
        self.traces.iter().rev().take(limit).cloned().collect()
    }

    pub fn add_insight(&mut self, insight: Insight) {
        if self.insights.len() >= MAX_INSIGHTS {
            self.insights.pop_front();
        }
        self.insights.push_back(insight);
    }

    /// Most recent insights first.
    pub fn recent_insights(&self, limit: usize) -> Vec<Insight> {
        self.insights.iter().rev().take(limit).cloned().collect()
    }

    /// Mark a reflection cycle as finished, recording its latency.
    pub fn complete_cycle(&mut self, latency_ms: u64) {
        self.cycle_count += 1;
        self.last_cycle = Utc::now().timestamp_millis();
        self.self_reflection_latency_ms = latency_ms;
    }

    pub fn traces_count(&self) -> usize {
        self.traces.len()
    }

    pub fn insights_count(&self) -> usize {
        self.insights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_counter_monotone() {
        let mut state = ConsciousState::new("node_1");
        state.complete_cycle(12);
        state.complete_cycle(8);
        assert_eq!(state.cycle_count, 2);
        assert_eq!(state.self_reflection_latency_ms, 8);
        assert!(state.last_cycle > 0);
    }

    #[test]
    fn test_traces_bounded() {
        let mut state = ConsciousState::new("node_1");
        for i in 0..(MAX_TRACES + 10) {
            state.record_trace(CausalTrace::new(format!("c{i}"), "weight_up", 0.01));
        }
        assert_eq!(state.traces_count(), MAX_TRACES);
    }

    #[test]
    fn test_recent_insights_order() {
        let mut state = ConsciousState::new("node_1");
        state.add_insight(Insight::new("first", "stability", 0.5));
        state.add_insight(Insight::new("second", "stability", 0.5));

        let recent = state.recent_insights(10);
        assert_eq!(recent[0].insight, "second");
        assert_eq!(recent[1].insight, "first");
    }
}
