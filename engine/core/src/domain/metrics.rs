// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Metric snapshots and their scrape-format rendering.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Read-only view combining mesh and decision metrics for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Unix timestamp (seconds) when the snapshot was taken.
    pub timestamp: i64,

    /// Mean semantic overlap across the recent observation window.
    pub cognitive_overlap_avg: f64,

    /// Connected groups of strongly linked nodes.
    pub clusters_active_total: usize,

    /// Success fraction of collective-inference tasks.
    pub braid_success_rate: f64,

    /// Latency of the most recent reflection pass.
    pub self_reflection_latency_ms: u64,

    /// Distinct nodes observed pulsing.
    pub nodes_total: usize,

    /// Braid tasks still pending.
    pub braids_active: usize,
}

impl MetricSnapshot {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            cognitive_overlap_avg: 0.0,
            clusters_active_total: 0,
            braid_success_rate: 0.0,
            self_reflection_latency_ms: 0,
            nodes_total: 0,
            braids_active: 0,
        }
    }

    /// Render the snapshot in the Prometheus text exposition format.
    pub fn to_prometheus(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP cognitive_overlap_avg Average semantic overlap between nodes\n");
        out.push_str("# TYPE cognitive_overlap_avg gauge\n");
        out.push_str(&format!(
            "cognitive_overlap_avg {}\n",
            self.cognitive_overlap_avg
        ));

        out.push_str("# HELP clusters_active_total Number of active cognitive clusters\n");
        out.push_str("# TYPE clusters_active_total gauge\n");
        out.push_str(&format!(
            "clusters_active_total {}\n",
            self.clusters_active_total
        ));

        out.push_str("# HELP braid_success_rate Success rate of collective inference\n");
        out.push_str("# TYPE braid_success_rate gauge\n");
        out.push_str(&format!("braid_success_rate {}\n", self.braid_success_rate));

        out.push_str(
            "# HELP self_reflection_latency_ms Reflection pass latency in milliseconds\n",
        );
        out.push_str("# TYPE self_reflection_latency_ms gauge\n");
        out.push_str(&format!(
            "self_reflection_latency_ms {}\n",
            self.self_reflection_latency_ms
        ));

        out
    }
}

impl Default for MetricSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prometheus_rendering() {
        let snapshot = MetricSnapshot {
            cognitive_overlap_avg: 0.82,
            clusters_active_total: 4,
            braid_success_rate: 0.75,
            self_reflection_latency_ms: 12,
            ..MetricSnapshot::new()
        };

        let text = snapshot.to_prometheus();
        assert!(text.contains("cognitive_overlap_avg 0.82"));
        assert!(text.contains("clusters_active_total 4"));
        assert!(text.contains("braid_success_rate 0.75"));
        assert!(text.contains("self_reflection_latency_ms 12"));
        assert!(text.contains("# TYPE cognitive_overlap_avg gauge"));
    }
}
