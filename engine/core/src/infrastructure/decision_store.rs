// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Bounded in-memory decision history.
//!
//! The store owns every decision record exclusively; outcome mutation goes
//! through [`InMemoryDecisionStore::update_outcome`] only. A single lock
//! around the inner state serializes writes and keeps reads linearizable —
//! a reader sees a write fully applied or not at all, and the capacity bound
//! is never exceeded, even transiently.

use crate::domain::decision::{Decision, DecisionError, DecisionId, DecisionOutcome, IntentKind};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

struct StoreInner {
    /// Insertion order, oldest first.
    order: VecDeque<DecisionId>,
    by_id: HashMap<DecisionId, Decision>,
}

/// Ring-buffer decision history with id lookup.
pub struct InMemoryDecisionStore {
    capacity: usize,
    inner: RwLock<StoreInner>,
}

impl InMemoryDecisionStore {
    /// `capacity` must be at least 1; config validation enforces this.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(StoreInner {
                order: VecDeque::with_capacity(capacity),
                by_id: HashMap::with_capacity(capacity),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a decision, evicting the oldest entry when full.
    pub fn insert(&self, decision: Decision) -> DecisionId {
        let id = decision.id;
        let mut inner = self.inner.write();

        if inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.by_id.remove(&oldest);
                debug!(%oldest, "evicted oldest decision");
            }
        }

        inner.order.push_back(id);
        inner.by_id.insert(id, decision);
        id
    }

    pub fn get(&self, id: DecisionId) -> Option<Decision> {
        self.inner.read().by_id.get(&id).cloned()
    }

    /// Apply an outcome report to a stored decision.
    ///
    /// Fails with `NotFound` for unknown (possibly evicted) ids and with
    /// `RejectedTransition` when a terminal outcome would be overwritten by a
    /// different one.
    pub fn update_outcome(
        &self,
        id: DecisionId,
        outcome: DecisionOutcome,
    ) -> Result<Decision, DecisionError> {
        let mut inner = self.inner.write();
        let decision = inner
            .by_id
            .get_mut(&id)
            .ok_or(DecisionError::NotFound(id))?;
        decision.apply_outcome(outcome)?;
        Ok(decision.clone())
    }

    /// The `n` most recently inserted decisions, most recent first.
    pub fn recent(&self, n: usize) -> Vec<Decision> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .rev()
            .take(n)
            .filter_map(|id| inner.by_id.get(id).cloned())
            .collect()
    }

    /// Every retained decision in insertion order, oldest first.
    pub fn all(&self) -> Vec<Decision> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.by_id.get(id).cloned())
            .collect()
    }

    /// Retained decisions whose chosen peer matches.
    pub fn by_peer(&self, peer_id: &str) -> Vec<Decision> {
        self.all()
            .into_iter()
            .filter(|d| d.chosen_peer == peer_id)
            .collect()
    }

    /// Retained decisions for a given intent kind.
    pub fn by_intent(&self, kind: &IntentKind) -> Vec<Decision> {
        self.all()
            .into_iter()
            .filter(|d| &d.intent_kind == kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.order.clear();
        inner.by_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn decision(peer: &str, kind: IntentKind) -> Decision {
        Decision {
            id: DecisionId::new(),
            intent_kind: kind,
            node_id: "node_1".to_string(),
            ranking: vec![],
            chosen_peer: peer.to_string(),
            chosen_score: 0.8,
            luck_score: 0.8,
            context_tags: vec![],
            explanation: String::new(),
            outcome: DecisionOutcome::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = InMemoryDecisionStore::new(10);
        let id = store.insert(decision("peer_a", IntentKind::Routing));

        let fetched = store.get(id).unwrap();
        assert_eq!(fetched.chosen_peer, "peer_a");
        assert!(store.get(DecisionId::new()).is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = InMemoryDecisionStore::new(3);
        let first = store.insert(decision("peer_0", IntentKind::Routing));
        for i in 1..5 {
            store.insert(decision(&format!("peer_{i}"), IntentKind::Routing));
        }

        assert_eq!(store.len(), 3);
        assert!(store.get(first).is_none());

        let all = store.all();
        let peers: Vec<&str> = all.iter().map(|d| d.chosen_peer.as_str()).collect();
        assert_eq!(peers, vec!["peer_2", "peer_3", "peer_4"]);
    }

    #[test]
    fn test_recent_most_recent_first() {
        let store = InMemoryDecisionStore::new(10);
        for i in 0..4 {
            store.insert(decision(&format!("peer_{i}"), IntentKind::Routing));
        }

        let recent = store.recent(2);
        assert_eq!(recent[0].chosen_peer, "peer_3");
        assert_eq!(recent[1].chosen_peer, "peer_2");
    }

    #[test]
    fn test_update_outcome_not_found_after_eviction() {
        let store = InMemoryDecisionStore::new(1);
        let first = store.insert(decision("peer_a", IntentKind::Routing));
        store.insert(decision("peer_b", IntentKind::Routing));

        let err = store
            .update_outcome(
                first,
                DecisionOutcome::Failure {
                    reason: "late".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, DecisionError::NotFound(_)));
    }

    #[test]
    fn test_filters() {
        let store = InMemoryDecisionStore::new(10);
        store.insert(decision("peer_a", IntentKind::Routing));
        store.insert(decision("peer_b", IntentKind::TaskScheduling));
        store.insert(decision("peer_a", IntentKind::Routing));

        assert_eq!(store.by_peer("peer_a").len(), 2);
        assert_eq!(store.by_intent(&IntentKind::TaskScheduling).len(), 1);
    }

    #[test]
    fn test_concurrent_inserts_lose_nothing() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryDecisionStore::new(10_000));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        store.insert(decision(&format!("peer_{t}_{i}"), IntentKind::Routing));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 4000);
    }
}
