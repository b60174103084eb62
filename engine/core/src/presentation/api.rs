// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP surface of the engine.
//!
//! Thin handlers over the application services: deserialize, delegate, map
//! domain errors to status codes. No business logic lives here.

use crate::application::decision_service::{
    DecisionService, EvaluationRequest, StandardDecisionService,
};
use crate::application::reflection::ReflectionService;
use crate::application::snapshot::SnapshotService;
use crate::domain::candidate::PeerCandidate;
use crate::domain::config::EngineConfig;
use crate::domain::conscious::ConsciousState;
use crate::domain::decision::{DecisionError, DecisionId, DecisionOutcome, IntentKind};
use crate::infrastructure::decision_store::InMemoryDecisionStore;
use crate::infrastructure::luck::LuckSource;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use synapse_mesh::{
    BraidError, BraidOutcome, BraidTask, BraidTaskId, BraidTracker, ClusterDetector,
    CognitivePulse, Intent, PulseError,
};
use uuid::Uuid;

pub struct AppState {
    pub decisions: Arc<dyn DecisionService>,
    pub reflection: ReflectionService,
    pub snapshot: SnapshotService,
    pub detector: Arc<ClusterDetector>,
    pub braids: Arc<BraidTracker>,
    pub conscious: Arc<RwLock<ConsciousState>>,
}

impl AppState {
    /// Wire every service from a config and a luck source.
    pub fn new(config: EngineConfig, luck: Arc<dyn LuckSource>) -> Self {
        let store = Arc::new(InMemoryDecisionStore::new(config.history_capacity));
        let conscious = Arc::new(RwLock::new(ConsciousState::new(config.node_id.clone())));
        let detector = Arc::new(ClusterDetector::new(config.mesh.clone()));
        let braids = Arc::new(BraidTracker::with_capacity(config.mesh.braid_capacity));

        let decisions = Arc::new(StandardDecisionService::new(
            Arc::clone(&store),
            luck,
            Arc::clone(&conscious),
            config.weights,
            config.luck_noise_amplitude,
            config.node_id,
        ));
        let reflection = ReflectionService::new(Arc::clone(&store), Arc::clone(&conscious));
        let snapshot = SnapshotService::new(
            Arc::clone(&detector),
            Arc::clone(&braids),
            Arc::clone(&conscious),
        );

        Self {
            decisions,
            reflection,
            snapshot,
            detector,
            braids,
            conscious,
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/decisions/evaluate", post(evaluate_decision))
        .route("/decisions/outcome", post(report_decision_outcome))
        .route("/decisions", get(list_decisions))
        .route("/decisions/recent", get(recent_decisions))
        .route("/decisions/stats", get(decision_stats))
        .route("/decisions/{id}", get(get_decision))
        .route("/conscious/state", get(conscious_state))
        .route("/conscious/reflect", post(run_reflection))
        .route("/conscious/insights", get(conscious_insights))
        .route("/mesh/pulse", post(ingest_pulse))
        .route("/mesh/clusters", get(mesh_clusters))
        .route("/braids/tasks", post(create_braid_task))
        .route("/braids/tasks/outcome", post(report_braid_outcome))
        .route("/metrics", get(scrape_metrics))
        .with_state(state)
}

/// Error envelope mapped from domain errors.
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DecisionError> for ApiError {
    fn from(err: DecisionError) -> Self {
        match err {
            DecisionError::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            DecisionError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DecisionError::RejectedTransition { .. } => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<BraidError> for ApiError {
    fn from(err: BraidError) -> Self {
        match err {
            BraidError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BraidError::RejectedTransition(_) => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<PulseError> for ApiError {
    fn from(err: PulseError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Deserialize)]
struct EvaluateRequest {
    intent_kind: String,
    candidates: Vec<PeerCandidate>,
    #[serde(default)]
    context_tags: Vec<String>,
}

async fn evaluate_decision(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let decision = state
        .decisions
        .evaluate(EvaluationRequest {
            intent_kind: IntentKind::from(payload.intent_kind),
            candidates: payload.candidates,
            context_tags: payload.context_tags,
        })
        .await?;
    Ok(Json(decision))
}

#[derive(Deserialize)]
struct OutcomeRequest {
    decision_id: Uuid,
    outcome: DecisionOutcome,
}

async fn report_decision_outcome(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OutcomeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let decision = state
        .decisions
        .report_outcome(DecisionId(payload.decision_id), payload.outcome)
        .await?;
    Ok(Json(decision))
}

#[derive(Deserialize)]
struct ListQuery {
    peer: Option<String>,
    intent: Option<String>,
}

async fn list_decisions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let intent = query.intent.map(IntentKind::from);
    let decisions = state.decisions.list(query.peer, intent).await;
    Json(json!({ "count": decisions.len(), "decisions": decisions }))
}

#[derive(Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

async fn recent_decisions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> impl IntoResponse {
    let decisions = state.decisions.recent(query.limit.unwrap_or(20)).await;
    Json(json!({ "count": decisions.len(), "decisions": decisions }))
}

async fn get_decision(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let decision = state.decisions.get(DecisionId(id)).await?;
    Ok(Json(decision))
}

async fn decision_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.decisions.stats().await)
}

async fn conscious_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let conscious = state.conscious.read();
    Json(json!({
        "node_id": conscious.node_id,
        "cycle_count": conscious.cycle_count,
        "last_cycle": conscious.last_cycle,
        "self_reflection_latency_ms": conscious.self_reflection_latency_ms,
        "traces_count": conscious.traces_count(),
        "insights_count": conscious.insights_count(),
        "recent_traces": conscious.recent_traces(20),
    }))
}

async fn run_reflection(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let insights = state.reflection.reflect();
    Json(json!({ "insights_generated": insights.len(), "insights": insights }))
}

#[derive(Deserialize)]
struct InsightsQuery {
    limit: Option<usize>,
}

async fn conscious_insights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InsightsQuery>,
) -> impl IntoResponse {
    let insights = state
        .conscious
        .read()
        .recent_insights(query.limit.unwrap_or(20));
    Json(json!({ "count": insights.len(), "insights": insights }))
}

#[derive(Deserialize)]
struct PulseRequest {
    node_id: String,
    intent: Intent,
    confidence: f64,
    context: Option<Vec<String>>,
}

async fn ingest_pulse(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PulseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pulse = match payload.context {
        Some(context) => CognitivePulse::with_context(
            payload.node_id,
            payload.intent,
            payload.confidence,
            context,
        )?,
        None => CognitivePulse::new(payload.node_id, payload.intent, payload.confidence)?,
    };

    let scores = state.detector.ingest(pulse);
    let overlaps: Vec<_> = scores
        .into_iter()
        .map(|(node_id, score)| json!({ "node_id": node_id, "overlap": score }))
        .collect();
    Ok(Json(json!({ "overlaps": overlaps })))
}

async fn mesh_clusters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let links: Vec<_> = state
        .detector
        .links()
        .into_iter()
        .map(|(key, weight)| json!({ "a": key.a, "b": key.b, "weight": weight }))
        .collect();
    Json(json!({
        "nodes_total": state.detector.node_count(),
        "clusters_active": state.detector.active_cluster_count(),
        "recent_overlap_avg": state.detector.recent_overlap_avg(),
        "links": links,
    }))
}

#[derive(Deserialize)]
struct BraidTaskRequest {
    description: String,
    initiator: String,
    #[serde(default)]
    participants: Vec<String>,
}

async fn create_braid_task(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BraidTaskRequest>,
) -> impl IntoResponse {
    let mut task = BraidTask::new(payload.description, payload.initiator);
    for participant in payload.participants {
        task.add_participant(participant);
    }
    let id = state.braids.register(task);
    (StatusCode::CREATED, Json(json!({ "task_id": id.0 })))
}

#[derive(Deserialize)]
struct BraidOutcomeRequest {
    task_id: Uuid,
    outcome: BraidOutcome,
}

async fn report_braid_outcome(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BraidOutcomeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .braids
        .report_outcome(BraidTaskId(payload.task_id), payload.outcome.clone())?;
    Ok(Json(json!({ "task_id": payload.task_id, "outcome": payload.outcome })))
}

async fn scrape_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.snapshot.snapshot().to_prometheus();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}
