// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Collective-inference task tracking.
//!
//! A braid task is a short-lived multi-node inference: one node proposes,
//! others validate and aggregate. The tracker records each task's outcome
//! with the same pending-then-terminal state machine decisions use, scoped
//! separately, and derives the `braid_success_rate` metric from it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use uuid::Uuid;

/// Default number of tasks retained before the oldest is evicted.
pub const DEFAULT_BRAID_CAPACITY: usize = 1000;

/// Unique identifier for a braid task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BraidTaskId(pub Uuid);

impl BraidTaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BraidTaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BraidTaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of a braid task. Transitions only from `Pending` to a terminal
/// variant; a terminal outcome is never overwritten by a different one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BraidOutcome {
    Pending,
    Completed { confidence: f64 },
    Failed { reason: String },
}

impl BraidOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BraidOutcome::Pending)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, BraidOutcome::Completed { .. })
    }
}

/// A single collective-inference task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BraidTask {
    pub id: BraidTaskId,
    pub description: String,
    pub initiator: String,
    pub participants: Vec<String>,
    pub outcome: BraidOutcome,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl BraidTask {
    pub fn new(description: impl Into<String>, initiator: impl Into<String>) -> Self {
        Self {
            id: BraidTaskId::new(),
            description: description.into(),
            initiator: initiator.into(),
            participants: Vec::new(),
            outcome: BraidOutcome::Pending,
            created_at: chrono::Utc::now(),
            completed_at: None,
        }
    }

    pub fn add_participant(&mut self, node_id: impl Into<String>) {
        let node_id = node_id.into();
        if !self.participants.contains(&node_id) {
            self.participants.push(node_id);
        }
    }
}

/// Errors raised by braid outcome reports.
#[derive(Debug, Error)]
pub enum BraidError {
    #[error("Braid task {0} not found")]
    NotFound(BraidTaskId),

    #[error("Braid task {0} already has a terminal outcome")]
    RejectedTransition(BraidTaskId),
}

struct TrackerInner {
    /// Registration order, oldest first.
    order: VecDeque<BraidTaskId>,
    tasks: HashMap<BraidTaskId, BraidTask>,

    /// Evicted tasks fold into these so `success_rate` keeps counting them.
    evicted_total: usize,
    evicted_completed: usize,
}

/// Bounded, lock-protected registry of braid tasks.
///
/// Registration beyond the capacity evicts the oldest task; its outcome is
/// folded into running counters first, so the success rate reflects every
/// task ever tracked, not just the retained window.
pub struct BraidTracker {
    capacity: usize,
    inner: RwLock<TrackerInner>,
}

impl BraidTracker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BRAID_CAPACITY)
    }

    /// `capacity` must be at least 1; config validation enforces this.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(TrackerInner {
                order: VecDeque::new(),
                tasks: HashMap::new(),
                evicted_total: 0,
                evicted_completed: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Register a task, returning its id. Evicts the oldest task when full.
    pub fn register(&self, task: BraidTask) -> BraidTaskId {
        let id = task.id;
        let mut inner = self.inner.write();

        if inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                if let Some(evicted) = inner.tasks.remove(&oldest) {
                    inner.evicted_total += 1;
                    if evicted.outcome.is_completed() {
                        inner.evicted_completed += 1;
                    }
                }
            }
        }

        inner.order.push_back(id);
        inner.tasks.insert(id, task);
        id
    }

    pub fn get(&self, id: BraidTaskId) -> Option<BraidTask> {
        self.inner.read().tasks.get(&id).cloned()
    }

    /// Report the outcome of a task.
    ///
    /// A pending task accepts any outcome. A terminal task accepts only an
    /// identical repeat (idempotent retry); anything else is rejected.
    /// Evicted tasks report `NotFound`.
    pub fn report_outcome(
        &self,
        id: BraidTaskId,
        outcome: BraidOutcome,
    ) -> Result<(), BraidError> {
        let mut inner = self.inner.write();
        let task = inner.tasks.get_mut(&id).ok_or(BraidError::NotFound(id))?;

        match &task.outcome {
            BraidOutcome::Pending => {
                if outcome.is_terminal() {
                    task.completed_at = Some(chrono::Utc::now());
                }
                task.outcome = outcome;
                Ok(())
            }
            current if *current == outcome => Ok(()),
            _ => Err(BraidError::RejectedTransition(id)),
        }
    }

    /// Fraction of every tracked task (retained or evicted) that completed
    /// successfully. 0.0 when nothing has been tracked.
    pub fn success_rate(&self) -> f64 {
        let inner = self.inner.read();
        let total = inner.tasks.len() + inner.evicted_total;
        if total == 0 {
            return 0.0;
        }
        let completed = inner
            .tasks
            .values()
            .filter(|t| t.outcome.is_completed())
            .count()
            + inner.evicted_completed;
        completed as f64 / total as f64
    }

    /// Number of retained tasks still pending.
    pub fn active_count(&self) -> usize {
        self.inner
            .read()
            .tasks
            .values()
            .filter(|t| !t.outcome.is_terminal())
            .count()
    }

    /// Number of retained tasks.
    pub fn len(&self) -> usize {
        self.inner.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().tasks.is_empty()
    }
}

impl Default for BraidTracker {
    fn default() -> Self {
        Self::new()
    }
}
