// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `synapse-mesh` — Cognitive Mesh Crate
//!
//! Semantic-overlap and clustering primitives consumed by the decision engine.
//! Nodes periodically broadcast a [`CognitivePulse`] declaring their current
//! [`Intent`]; overlapping pulses reinforce weighted links between nodes, and
//! groups of strongly linked nodes surface as **clusters**.
//!
//! ## Crate Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`domain::pulse`] | `Intent`, `CognitivePulse`, semantic overlap scoring |
//! | [`domain::cluster`] | `ClusterDetector` — link reinforcement and cluster counting |
//! | [`domain::braid`] | `BraidTracker` — collective-inference task outcomes |
//!
//! ## Key Concepts
//!
//! - **Overlap**: a symmetric score in `[0, 1]` blending intent similarity with
//!   the Jaccard index of context tags.
//! - **Link**: an undirected weighted edge between two nodes, reinforced each
//!   time their pulses overlap above the semantic threshold.
//! - **Cluster**: a connected component of nodes whose link weights exceed the
//!   active-edge threshold, with at least two members.
//!
//! Link weights are reinforcement-only in this phase; decay is deferred.

pub mod domain;

pub use domain::*;
