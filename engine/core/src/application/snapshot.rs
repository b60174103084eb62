// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Metric snapshot assembly.

use crate::domain::conscious::ConsciousState;
use crate::domain::metrics::MetricSnapshot;
use parking_lot::RwLock;
use std::sync::Arc;
use synapse_mesh::{BraidTracker, ClusterDetector};

/// Assembles a [`MetricSnapshot`] from the live mesh and conscious state.
///
/// Also mirrors the values into the process-wide metrics recorder so any
/// installed exporter sees the same numbers the scrape endpoint renders.
pub struct SnapshotService {
    detector: Arc<ClusterDetector>,
    braids: Arc<BraidTracker>,
    conscious: Arc<RwLock<ConsciousState>>,
}

impl SnapshotService {
    pub fn new(
        detector: Arc<ClusterDetector>,
        braids: Arc<BraidTracker>,
        conscious: Arc<RwLock<ConsciousState>>,
    ) -> Self {
        Self {
            detector,
            braids,
            conscious,
        }
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        let snapshot = MetricSnapshot {
            cognitive_overlap_avg: self.detector.recent_overlap_avg(),
            clusters_active_total: self.detector.active_cluster_count(),
            braid_success_rate: self.braids.success_rate(),
            self_reflection_latency_ms: self.conscious.read().self_reflection_latency_ms,
            nodes_total: self.detector.node_count(),
            braids_active: self.braids.active_count(),
            ..MetricSnapshot::new()
        };

        metrics::gauge!("cognitive_overlap_avg").set(snapshot.cognitive_overlap_avg);
        metrics::gauge!("clusters_active_total").set(snapshot.clusters_active_total as f64);
        metrics::gauge!("braid_success_rate").set(snapshot.braid_success_rate);
        metrics::gauge!("self_reflection_latency_ms")
            .set(snapshot.self_reflection_latency_ms as f64);

        snapshot
    }
}
