//! Primary-side HTTP surface: produce, health, read.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::BoundaryError;
use super::state::AppState;
use crate::log::Record;
use crate::replication::ReplicationOutcome;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(produce).get(read))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Deserialize)]
struct ProduceRequest {
    record: ProduceRecord,
    w: usize,
}

#[derive(Deserialize)]
struct ProduceRecord {
    value: String,
}

#[derive(Serialize)]
struct ProduceResponse {
    offset: u64,
}

async fn produce(
    State(state): State<AppState>,
    Json(req): Json<ProduceRequest>,
) -> Result<Json<ProduceResponse>, BoundaryError> {
    let replicator = state
        .replicator
        .as_ref()
        .expect("master route mounted without a replicator");

    replicator.validate_write_concern(req.w)?;

    if !state.quorum.admits_writes() {
        return Err(BoundaryError::NotAdmitted);
    }

    let stamped = state.log.append(Record::new(req.record.value));
    match replicator.replicate(stamped.clone(), req.w).await {
        ReplicationOutcome::Satisfied => Ok(Json(ProduceResponse {
            offset: stamped.offset,
        })),
        ReplicationOutcome::Unmet { needed, acked } => Err(BoundaryError::WriteConcernUnmet {
            offset: stamped.offset,
            needed,
            acked,
        }),
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let mut map = Map::new();
    for (peer, peer_state) in state.health.snapshot() {
        map.insert(peer, Value::from(peer_state.code()));
    }
    Json(Value::Object(map))
}

#[derive(Serialize)]
struct ReadResponse {
    records: Vec<Record>,
}

async fn read(State(state): State<AppState>) -> Json<ReadResponse> {
    Json(ReadResponse {
        records: state.log.read(),
    })
}
