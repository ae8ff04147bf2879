//! Anti-entropy: ships the primary's full log to a peer that has just
//! become healthy.
//!
//! The payload is always the entire current log, wrapped as a records
//! list rather than just the latest record, since the secondary's
//! idempotent reconciliation makes resending a safe no-op for records
//! it already holds.

use std::sync::Arc;

use super::client::{DeliveryOutcome, PeerClient};
use crate::health::HealthMap;
use crate::log::Log;
use crate::observability::Logger;

/// Ships `log`'s full contents to `peer`. On failure, demotes `peer` back
/// to *suspected* so the next recovery transition retries.
pub async fn sync_peer(client: &PeerClient, map: &Arc<HealthMap>, log: &Log, peer: &str) {
    let records = log.read();
    match client.post_sync(peer, &records).await {
        DeliveryOutcome::Success => {
            Logger::info(
                "anti_entropy_succeeded",
                &[("peer", peer), ("records", &records.len().to_string())],
            );
        }
        DeliveryOutcome::Rejected { status } => {
            Logger::warn(
                "anti_entropy_failed",
                &[("peer", peer), ("status", &status.to_string())],
            );
            map.demote_to_suspected(peer);
        }
        DeliveryOutcome::Transport { reason } => {
            Logger::warn(
                "anti_entropy_failed",
                &[("peer", peer), ("reason", reason.as_str())],
            );
            map.demote_to_suspected(peer);
        }
    }
}
