// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Decision evaluation and outcome reporting.
//!
//! This is the write path of the engine: rank candidates, assign a luck
//! score, persist the record, and later fold the reported outcome back into
//! the conscious state as a causal trace.

use crate::domain::candidate::{explain_ranking, rank_candidates, PeerCandidate, ScoreWeights};
use crate::domain::conscious::{CausalTrace, ConsciousState};
use crate::domain::decision::{Decision, DecisionError, DecisionId, DecisionOutcome, IntentKind};
use crate::domain::stats::DecisionStats;
use crate::infrastructure::decision_store::InMemoryDecisionStore;
use crate::infrastructure::luck::LuckSource;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input for one evaluation call.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub intent_kind: IntentKind,
    pub candidates: Vec<PeerCandidate>,
    pub context_tags: Vec<String>,
}

#[async_trait]
pub trait DecisionService: Send + Sync {
    /// Rank candidates, pick the best, and persist a pending decision.
    async fn evaluate(&self, request: EvaluationRequest) -> Result<Decision, DecisionError>;

    /// Report what actually happened to a previously evaluated decision.
    async fn report_outcome(
        &self,
        id: DecisionId,
        outcome: DecisionOutcome,
    ) -> Result<Decision, DecisionError>;

    async fn get(&self, id: DecisionId) -> Result<Decision, DecisionError>;

    /// Most recent decisions first.
    async fn recent(&self, limit: usize) -> Vec<Decision>;

    /// All retained decisions, optionally filtered by chosen peer and intent.
    async fn list(&self, peer: Option<String>, intent: Option<IntentKind>) -> Vec<Decision>;

    async fn stats(&self) -> DecisionStats;
}

/// Default implementation over the in-memory store.
pub struct StandardDecisionService {
    store: Arc<InMemoryDecisionStore>,
    luck: Arc<dyn LuckSource>,
    conscious: Arc<RwLock<ConsciousState>>,
    weights: ScoreWeights,
    noise_amplitude: f64,
    node_id: String,
}

impl StandardDecisionService {
    pub fn new(
        store: Arc<InMemoryDecisionStore>,
        luck: Arc<dyn LuckSource>,
        conscious: Arc<RwLock<ConsciousState>>,
        weights: ScoreWeights,
        noise_amplitude: f64,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            luck,
            conscious,
            weights,
            noise_amplitude,
            node_id: node_id.into(),
        }
    }

    pub fn store(&self) -> &Arc<InMemoryDecisionStore> {
        &self.store
    }
}

#[async_trait]
impl DecisionService for StandardDecisionService {
    async fn evaluate(&self, request: EvaluationRequest) -> Result<Decision, DecisionError> {
        if request.candidates.is_empty() {
            return Err(DecisionError::InvalidInput(
                "candidate list is empty".into(),
            ));
        }
        for candidate in &request.candidates {
            candidate.validate()?;
        }

        let ranking = rank_candidates(&request.candidates, &self.weights);
        // First entry is guaranteed: the list was non-empty above.
        let top = ranking[0].clone();

        let noise = self.luck.noise(self.noise_amplitude);
        let luck_score = (top.score + noise).clamp(0.0, 1.0);
        let explanation = explain_ranking(&ranking, luck_score);

        let decision = Decision {
            id: DecisionId::new(),
            intent_kind: request.intent_kind,
            node_id: self.node_id.clone(),
            ranking,
            chosen_peer: top.peer_id,
            chosen_score: top.score,
            luck_score,
            context_tags: request.context_tags,
            explanation,
            outcome: DecisionOutcome::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };

        info!(
            decision_id = %decision.id,
            chosen_peer = %decision.chosen_peer,
            score = decision.chosen_score,
            luck = decision.luck_score,
            "decision evaluated"
        );
        metrics::counter!("decisions_evaluated_total").increment(1);

        self.store.insert(decision.clone());
        Ok(decision)
    }

    async fn report_outcome(
        &self,
        id: DecisionId,
        outcome: DecisionOutcome,
    ) -> Result<Decision, DecisionError> {
        // Reports describe what happened; a pending report carries no
        // information and is refused rather than silently no-opped.
        if !outcome.is_terminal() {
            return Err(DecisionError::InvalidInput(
                "outcome report must be terminal (success, failure, or partial)".into(),
            ));
        }
        outcome.validate()?;

        let decision = self.store.update_outcome(id, outcome).map_err(|e| {
            warn!(decision_id = %id, error = %e, "outcome report rejected");
            e
        })?;

        metrics::counter!("decision_outcomes_total", "outcome" => decision.outcome.label())
            .increment(1);

        // Completed decisions feed the conscious state: the delta captures how
        // far reality landed from the luck estimate.
        if decision.outcome.is_terminal() {
            let delta = decision.outcome.success_score() - decision.luck_score;
            let trace = CausalTrace::new(
                format!("decision:{}:{}", decision.chosen_peer, decision.id),
                format!("outcome:{}", decision.outcome.label()),
                delta,
            );
            self.conscious.write().record_trace(trace);
            debug!(decision_id = %id, delta, "causal trace recorded");
        }

        Ok(decision)
    }

    async fn get(&self, id: DecisionId) -> Result<Decision, DecisionError> {
        self.store.get(id).ok_or(DecisionError::NotFound(id))
    }

    async fn recent(&self, limit: usize) -> Vec<Decision> {
        self.store.recent(limit)
    }

    async fn list(&self, peer: Option<String>, intent: Option<IntentKind>) -> Vec<Decision> {
        let mut decisions = match peer {
            Some(peer_id) => self.store.by_peer(&peer_id),
            None => self.store.all(),
        };
        if let Some(kind) = intent {
            decisions.retain(|d| d.intent_kind == kind);
        }
        decisions
    }

    async fn stats(&self) -> DecisionStats {
        DecisionStats::compute(&self.store.all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::luck::FixedLuck;

    fn service(noise: f64) -> StandardDecisionService {
        StandardDecisionService::new(
            Arc::new(InMemoryDecisionStore::new(100)),
            Arc::new(FixedLuck(noise)),
            Arc::new(RwLock::new(ConsciousState::new("node_1"))),
            ScoreWeights::default(),
            0.05,
            "node_1",
        )
    }

    fn candidate(peer_id: &str, health: f64, quality: f64, intent_match: f64) -> PeerCandidate {
        PeerCandidate {
            peer_id: peer_id.to_string(),
            health,
            quality,
            intent_match,
        }
    }

    #[tokio::test]
    async fn test_evaluate_picks_top_candidate() {
        let service = service(0.0);
        let decision = service
            .evaluate(EvaluationRequest {
                intent_kind: IntentKind::Routing,
                candidates: vec![
                    candidate("beta", 0.75, 0.70, 0.65),
                    candidate("alpha", 0.95, 0.88, 0.92),
                ],
                context_tags: vec!["latency_sensitive".into()],
            })
            .await
            .unwrap();

        assert_eq!(decision.chosen_peer, "alpha");
        assert!((decision.chosen_score - 0.917).abs() < 1e-9);
        // Zero noise makes luck equal the top score.
        assert!((decision.luck_score - 0.917).abs() < 1e-9);
        assert_eq!(decision.ranking.len(), 2);
        assert!(decision.explanation.contains("alpha"));
    }

    #[tokio::test]
    async fn test_luck_clamped_to_unit_range() {
        let service = service(0.05);
        let decision = service
            .evaluate(EvaluationRequest {
                intent_kind: IntentKind::Routing,
                candidates: vec![candidate("alpha", 1.0, 1.0, 1.0)],
                context_tags: vec![],
            })
            .await
            .unwrap();
        assert_eq!(decision.luck_score, 1.0);
    }

    #[tokio::test]
    async fn test_empty_candidates_rejected() {
        let service = service(0.0);
        let err = service
            .evaluate(EvaluationRequest {
                intent_kind: IntentKind::Routing,
                candidates: vec![],
                context_tags: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_candidate_rejected() {
        let service = service(0.0);
        let err = service
            .evaluate(EvaluationRequest {
                intent_kind: IntentKind::Routing,
                candidates: vec![candidate("alpha", 1.2, 0.5, 0.5)],
                context_tags: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_outcome_rejected() {
        let service = service(0.0);
        let decision = service
            .evaluate(EvaluationRequest {
                intent_kind: IntentKind::Routing,
                candidates: vec![candidate("alpha", 0.9, 0.9, 0.9)],
                context_tags: vec![],
            })
            .await
            .unwrap();

        let err = service
            .report_outcome(
                decision.id,
                DecisionOutcome::Partial {
                    completed_ratio: 7.5,
                    issues: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::InvalidInput(_)));

        let err = service
            .report_outcome(
                decision.id,
                DecisionOutcome::Success {
                    actual_latency_ms: 10.0,
                    actual_quality: 1.5,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::InvalidInput(_)));

        // The stored record is untouched by rejected reports.
        let stored = service.get(decision.id).await.unwrap();
        assert_eq!(stored.outcome, DecisionOutcome::Pending);
    }

    #[tokio::test]
    async fn test_pending_report_rejected() {
        let service = service(0.0);
        let decision = service
            .evaluate(EvaluationRequest {
                intent_kind: IntentKind::Routing,
                candidates: vec![candidate("alpha", 0.9, 0.9, 0.9)],
                context_tags: vec![],
            })
            .await
            .unwrap();

        let err = service
            .report_outcome(decision.id, DecisionOutcome::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_outcome_report_records_trace() {
        let service = service(0.0);
        let decision = service
            .evaluate(EvaluationRequest {
                intent_kind: IntentKind::Routing,
                candidates: vec![candidate("alpha", 0.9, 0.9, 0.9)],
                context_tags: vec![],
            })
            .await
            .unwrap();

        service
            .report_outcome(
                decision.id,
                DecisionOutcome::Success {
                    actual_latency_ms: 40.0,
                    actual_quality: 0.95,
                },
            )
            .await
            .unwrap();

        let conscious = service.conscious.read();
        assert_eq!(conscious.traces_count(), 1);
        let trace = &conscious.recent_traces(1)[0];
        assert!((trace.delta - (1.0 - decision.luck_score)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_report_unknown_decision() {
        let service = service(0.0);
        let err = service
            .report_outcome(
                DecisionId::new(),
                DecisionOutcome::Failure {
                    reason: "timeout".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_peer_and_intent() {
        let service = service(0.0);
        for (peer, kind) in [
            ("alpha", IntentKind::Routing),
            ("beta", IntentKind::TaskScheduling),
            ("alpha", IntentKind::TaskScheduling),
        ] {
            service
                .evaluate(EvaluationRequest {
                    intent_kind: kind,
                    candidates: vec![candidate(peer, 0.9, 0.9, 0.9)],
                    context_tags: vec![],
                })
                .await
                .unwrap();
        }

        assert_eq!(service.list(Some("alpha".into()), None).await.len(), 2);
        assert_eq!(
            service
                .list(Some("alpha".into()), Some(IntentKind::TaskScheduling))
                .await
                .len(),
            1
        );
        assert_eq!(service.list(None, None).await.len(), 3);
    }
}
