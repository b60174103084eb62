// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Link reinforcement and cluster detection.
//!
//! The [`ClusterDetector`] keeps the latest pulse per node. Each ingested
//! pulse is compared against every other node's latest pulse; overlaps above
//! the semantic threshold reinforce the link between the two nodes. Clusters
//! are connected components of the active-link subgraph, recomputed lazily —
//! link updates are infrequent relative to stats queries.

use crate::domain::braid::DEFAULT_BRAID_CAPACITY;
use crate::domain::pulse::{self, CognitivePulse, DEFAULT_INTENT_WEIGHT};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Tunables for overlap scoring and clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Blend weight for intent similarity in the overlap score.
    pub intent_weight: f64,

    /// Overlap above this threshold reinforces the link between two nodes.
    pub semantic_threshold: f64,

    /// Fraction of the overlap added to the link weight on reinforcement.
    pub reinforcement: f64,

    /// Links at or above this weight count toward cluster membership.
    /// Kept separate from `semantic_threshold` so reporting does not flap.
    pub active_edge_threshold: f64,

    /// How many recent overlap scores feed `cognitive_overlap_avg`.
    pub overlap_window: usize,

    /// Maximum braid tasks retained; the oldest is evicted beyond this.
    pub braid_capacity: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            intent_weight: DEFAULT_INTENT_WEIGHT,
            semantic_threshold: 0.7,
            reinforcement: 0.02,
            active_edge_threshold: 0.1,
            overlap_window: 256,
            braid_capacity: DEFAULT_BRAID_CAPACITY,
        }
    }
}

/// Unordered node pair identifying a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkKey {
    pub a: String,
    pub b: String,
}

impl LinkKey {
    /// Normalizes the pair so `(x, y)` and `(y, x)` address the same link.
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        let (x, y) = (x.into(), y.into());
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }
}

/// Detects clusters of nodes with aligned intents.
///
/// All internal state is safe for concurrent access: the link map uses
/// per-entry read-modify-write so concurrent reinforcements never lose
/// increments.
pub struct ClusterDetector {
    config: MeshConfig,
    latest: DashMap<String, CognitivePulse>,
    links: DashMap<LinkKey, f64>,
    recent_overlaps: Mutex<VecDeque<f64>>,
}

impl ClusterDetector {
    pub fn new(config: MeshConfig) -> Self {
        Self {
            config,
            latest: DashMap::new(),
            links: DashMap::new(),
            recent_overlaps: Mutex::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Ingest a pulse, superseding the node's previous one.
    ///
    /// The pulse is compared against every other node's latest pulse; each
    /// overlap is recorded in the rolling window, and overlaps above the
    /// semantic threshold reinforce the corresponding link. Returns the
    /// per-peer overlap scores computed during ingestion.
    pub fn ingest(&self, pulse: CognitivePulse) -> Vec<(String, f64)> {
        let mut scores = Vec::new();

        for entry in self.latest.iter() {
            if entry.key() == &pulse.node_id {
                continue;
            }
            let score = pulse::overlap(&pulse, entry.value(), self.config.intent_weight);
            self.record_overlap(score);

            if score > self.config.semantic_threshold {
                let key = LinkKey::new(pulse.node_id.clone(), entry.key().clone());
                let increment = self.config.reinforcement * score;
                *self.links.entry(key.clone()).or_insert(0.0) += increment;
                debug!(
                    link = ?key,
                    overlap = score,
                    increment,
                    "link reinforced"
                );
            }
            scores.push((entry.key().clone(), score));
        }

        self.latest.insert(pulse.node_id.clone(), pulse);
        scores
    }

    /// Current weight of the link between two nodes (0.0 if never reinforced).
    pub fn link_weight(&self, x: &str, y: &str) -> f64 {
        self.links
            .get(&LinkKey::new(x, y))
            .map(|w| *w)
            .unwrap_or(0.0)
    }

    /// Snapshot of all links and their weights.
    pub fn links(&self) -> Vec<(LinkKey, f64)> {
        self.links
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Number of distinct nodes that have pulsed.
    pub fn node_count(&self) -> usize {
        self.latest.len()
    }

    /// Mean of the overlap scores in the rolling window (0.0 when empty).
    pub fn recent_overlap_avg(&self) -> f64 {
        let window = self.recent_overlaps.lock();
        if window.is_empty() {
            return 0.0;
        }
        window.iter().sum::<f64>() / window.len() as f64
    }

    /// Count of connected components with at least two members among links
    /// at or above the active-edge threshold. Recomputed on every call.
    pub fn active_cluster_count(&self) -> usize {
        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        for entry in self.links.iter() {
            if *entry.value() >= self.config.active_edge_threshold {
                let key = entry.key();
                adjacency
                    .entry(key.a.clone())
                    .or_default()
                    .push(key.b.clone());
                adjacency
                    .entry(key.b.clone())
                    .or_default()
                    .push(key.a.clone());
            }
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut clusters = 0;

        for node in adjacency.keys() {
            if visited.contains(node) {
                continue;
            }
            let mut members = 0;
            let mut queue = VecDeque::from([node.clone()]);
            while let Some(current) = queue.pop_front() {
                if !visited.insert(current.clone()) {
                    continue;
                }
                members += 1;
                if let Some(neighbors) = adjacency.get(&current) {
                    for neighbor in neighbors {
                        if !visited.contains(neighbor) {
                            queue.push_back(neighbor.clone());
                        }
                    }
                }
            }
            // Active edges always join two nodes, but guard anyway.
            if members >= 2 {
                clusters += 1;
            }
        }

        clusters
    }

    fn record_overlap(&self, score: f64) {
        let mut window = self.recent_overlaps.lock();
        if window.len() >= self.config.overlap_window {
            window.pop_front();
        }
        window.push_back(score);
    }
}

impl Default for ClusterDetector {
    fn default() -> Self {
        Self::new(MeshConfig::default())
    }
}
