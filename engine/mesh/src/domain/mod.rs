// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod braid;
pub mod cluster;
pub mod pulse;

pub use braid::{
    BraidError, BraidOutcome, BraidTask, BraidTaskId, BraidTracker, DEFAULT_BRAID_CAPACITY,
};
pub use cluster::{ClusterDetector, LinkKey, MeshConfig};
pub use pulse::{CognitivePulse, Intent, PulseError};
