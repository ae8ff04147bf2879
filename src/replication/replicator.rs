//! Fan-out of a single produce to every secondary, with write-concern
//! accounting and unbounded, backoff-spaced retry.
//!
//! A naive retry path would recurse on peer rejection with no backoff;
//! here each retry re-checks health first and backs off exponentially
//! between rejections (100ms .. 5s).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::client::{DeliveryOutcome, PeerClient};
use super::errors::{ReplicationError, ReplicationResult};
use crate::health::HealthMap;
use crate::log::Record;
use crate::observability::Logger;

/// Exponential backoff bounds for the unbounded retry path.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(5),
        }
    }
}

/// Fans a produced record out to every secondary.
#[derive(Clone)]
pub struct Replicator {
    map: Arc<HealthMap>,
    client: PeerClient,
    peers: Vec<String>,
    admission_window: Duration,
    backoff: BackoffConfig,
}

impl Replicator {
    pub fn new(
        map: Arc<HealthMap>,
        peers: Vec<String>,
        admission_window: Duration,
        backoff: BackoffConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            map,
            client: PeerClient::new(request_timeout),
            peers,
            admission_window,
            backoff,
        }
    }

    /// Number of secondaries configured (`N`).
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Validates `w` against the configured peer count. This
    /// MUST happen before the local append, so the boundary handler calls
    /// this ahead of `Log::append`.
    pub fn validate_write_concern(&self, w: usize) -> ReplicationResult<()> {
        let n = self.peers.len();
        if w < 1 || w > n + 1 {
            return Err(ReplicationError::invalid_write_concern(format!(
                "w={w} is out of range 1..={}",
                n + 1
            )));
        }
        Ok(())
    }

    /// Replicates `record` (already stamped with its offset) to every peer,
    /// returning once `w - 1` distinct peers have acknowledged, or once
    /// every attempt has resolved (succeeded or been abandoned) without
    /// reaching that count. `w = 1` returns immediately; replication
    /// continues in the background.
    ///
    /// Callers MUST have validated `w` with [`Self::validate_write_concern`]
    /// first.
    pub async fn replicate(&self, record: Record, w: usize) -> ReplicationOutcome {
        let needed = w.saturating_sub(1);
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        for peer in &self.peers {
            let peer = peer.clone();
            let record = record.clone();
            let map = self.map.clone();
            let client = self.client.clone();
            let admission_window = self.admission_window;
            let backoff = self.backoff;
            let tx = tx.clone();
            tokio::spawn(async move {
                deliver_with_retry(peer, record, map, client, admission_window, backoff, tx).await;
            });
        }
        drop(tx);

        let mut acked = 0usize;
        while acked < needed {
            match rx.recv().await {
                Some(()) => acked += 1,
                // Every per-peer task has finished without acking: no further
                // progress toward `needed` is possible for this produce.
                None => break,
            }
        }

        if acked >= needed {
            ReplicationOutcome::Satisfied
        } else {
            ReplicationOutcome::Unmet { needed, acked }
        }
    }
}

/// Result of a single [`Replicator::replicate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationOutcome {
    /// `w - 1` distinct peers acknowledged the record.
    Satisfied,
    /// Every dispatched attempt resolved (acked, rejected-then-abandoned, or
    /// timed out waiting for health) without reaching `needed` acks.
    Unmet { needed: usize, acked: usize },
}

/// One peer's replication attempt for one record.
async fn deliver_with_retry(
    peer: String,
    record: Record,
    map: Arc<HealthMap>,
    client: PeerClient,
    admission_window: Duration,
    backoff: BackoffConfig,
    acked: mpsc::UnboundedSender<()>,
) {
    let mut delay = backoff.initial;

    loop {
        if !map.wait_healthy(&peer, admission_window).await {
            Logger::warn(
                "replication_attempt_abandoned",
                &[
                    ("peer", peer.as_str()),
                    ("reason", "peer did not become healthy within admission window"),
                ],
            );
            return;
        }

        match client.post(&peer, std::slice::from_ref(&record)).await {
            DeliveryOutcome::Success => {
                Logger::info(
                    "replication_ack",
                    &[("peer", peer.as_str()), ("offset", &record.offset.to_string())],
                );
                let _ = acked.send(());
                return;
            }
            DeliveryOutcome::Transport { reason } => {
                Logger::warn(
                    "replication_attempt_abandoned",
                    &[("peer", peer.as_str()), ("reason", reason.as_str())],
                );
                return;
            }
            DeliveryOutcome::Rejected { status } => {
                Logger::warn(
                    "replication_rejected_retrying",
                    &[
                        ("peer", peer.as_str()),
                        ("status", &status.to_string()),
                        ("backoff_ms", &delay.as_millis().to_string()),
                    ],
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(backoff.max);
            }
        }
    }
}
