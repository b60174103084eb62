// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `synapse-core` — Conscious Routing Decision Engine
//!
//! Given a set of candidate peers annotated with health, quality, and
//! intent-match scores, the engine produces a ranked choice, a probabilistic
//! "luck" score, and a durable decision record. Decisions start pending and
//! are completed later by an asynchronous outcome report, after which the
//! aggregate statistics reflect the update.
//!
//! # Architecture
//!
//! - **Layer:** `domain` — decisions, candidates, stats, conscious state
//! - **Layer:** `application` — decision service, reflection, metric snapshots
//! - **Layer:** `infrastructure` — bounded decision store, randomness source
//! - **Layer:** `presentation` — axum HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
