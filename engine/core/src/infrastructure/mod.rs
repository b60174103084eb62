// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod decision_store;
pub mod luck;

pub use decision_store::InMemoryDecisionStore;
pub use luck::{FixedLuck, LuckSource, ThreadRngLuck};
