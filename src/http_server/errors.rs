//! Maps component errors onto HTTP status codes (400/406/500) via a single
//! `IntoResponse` impl, so handlers never match on error kinds themselves.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::replication::ReplicationError;

/// A boundary-layer error, tagged with the status code it maps to.
#[derive(Debug)]
pub enum BoundaryError {
    /// Body does not decode, or `w` is out of range.
    MalformedInput(String),
    /// Produce received while the Consensus Flag is false.
    NotAdmitted,
    /// A secondary rejected a record it cannot place without creating a
    /// hole; the caller should retry once anti-entropy fills the prefix.
    Gap { have: u64, wanted: u64 },
    /// A secondary holds a different value at an offset than the one being
    /// delivered. Not automatically recoverable.
    Divergence { offset: u64 },
    /// The record was appended locally and fanned out, but fewer than
    /// `w - 1` peers acknowledged before every attempt resolved. The
    /// record is NOT lost — it holds offset `offset` at the primary and
    /// possibly at `acked` peers — but the caller's requested durability
    /// was not met.
    WriteConcernUnmet {
        offset: u64,
        needed: usize,
        acked: usize,
    },
}

impl From<ReplicationError> for BoundaryError {
    fn from(e: ReplicationError) -> Self {
        BoundaryError::MalformedInput(e.to_string())
    }
}

impl IntoResponse for BoundaryError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            BoundaryError::MalformedInput(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "malformed_input", "message": msg }),
            ),
            BoundaryError::NotAdmitted => (
                StatusCode::NOT_ACCEPTABLE,
                json!({ "error": "not_admitted", "message": "primary has no quorum" }),
            ),
            BoundaryError::Gap { have, wanted } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "gap",
                    "message": format!("log has {have} records, refusing offset {wanted}"),
                }),
            ),
            BoundaryError::Divergence { offset } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "divergence",
                    "message": format!("value at offset {offset} diverges from the incoming record"),
                }),
            ),
            BoundaryError::WriteConcernUnmet {
                offset,
                needed,
                acked,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "write_concern_unmet",
                    "message": format!(
                        "record at offset {offset} was appended but only {acked} of {needed} required peer acks arrived"
                    ),
                    "offset": offset,
                    "needed": needed,
                    "acked": acked,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
