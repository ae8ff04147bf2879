//! Secondary-side HTTP surface: replication delivery, anti-entropy sync,
//! liveness probe, and read.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::errors::BoundaryError;
use super::state::AppState;
use crate::config::ArtificialDelayConfig;
use crate::log::{Log, ReconcileOutcome, Record};

#[derive(Clone)]
pub struct SlaveState {
    pub app: AppState,
    pub delay: ArtificialDelayConfig,
}

pub fn router(state: SlaveState) -> Router {
    Router::new()
        .route("/", get(read))
        .route("/internal/post", post(post_replicate))
        .route("/internal/post/sync", post(post_sync))
        .route("/internal/health", get(internal_health))
        .with_state(state)
}

#[derive(Deserialize)]
struct PostBody {
    records: Vec<Record>,
}

#[derive(Serialize)]
struct PostResponse {
    offset: u64,
}

async fn post_replicate(
    State(state): State<SlaveState>,
    Json(body): Json<PostBody>,
) -> Result<Json<PostResponse>, BoundaryError> {
    if body.records.len() == 1 && state.delay.enabled {
        let millis = OsRng.gen_range(0..=state.delay.max().as_millis() as u64);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
    reconcile_all(&state.app.log, body.records)
}

async fn post_sync(
    State(state): State<SlaveState>,
    Json(body): Json<PostBody>,
) -> Result<Json<PostResponse>, BoundaryError> {
    reconcile_all(&state.app.log, body.records)
}

fn reconcile_all(log: &Log, records: Vec<Record>) -> Result<Json<PostResponse>, BoundaryError> {
    let mut last_offset = 0;
    for record in records {
        let offset = record.offset;
        match log.reconcile(record) {
            ReconcileOutcome::Appended | ReconcileOutcome::DuplicateIgnored => {
                last_offset = offset;
            }
            ReconcileOutcome::Gap { have, wanted } => {
                return Err(BoundaryError::Gap { have, wanted });
            }
            ReconcileOutcome::Diverged { offset, .. } => {
                return Err(BoundaryError::Divergence { offset });
            }
        }
    }
    Ok(Json(PostResponse {
        offset: last_offset,
    }))
}

async fn internal_health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn read(State(state): State<SlaveState>) -> Json<Value> {
    Json(json!({ "records": state.app.log.read() }))
}
