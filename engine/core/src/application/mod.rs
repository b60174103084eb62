// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod decision_service;
pub mod reflection;
pub mod snapshot;

pub use decision_service::{DecisionService, EvaluationRequest, StandardDecisionService};
pub use reflection::{ReflectionAnalyzer, ReflectionService};
pub use snapshot::SnapshotService;
