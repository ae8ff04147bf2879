//! Periodic probe loop that drives a [`super::HealthMap`].
//!
//! Sleep for the probe period, issue a bounded-timeout probe
//! to every peer concurrently, apply the per-peer transition rules, and only
//! then recompute the Consensus Flag — so a tick's intermediate per-peer
//! transitions are never observed half-applied.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::HealthMap;
use crate::observability::Logger;

/// Emitted when a peer transitions into *healthy* from *suspected* or
/// *unhealthy*. The receiver is expected to trigger anti-entropy for that
/// peer; the detector itself has no notion of anti-entropy.
#[derive(Debug, Clone)]
pub struct RecoveryEvent {
    pub peer: String,
}

/// Drives probing of `/internal/health` on every configured peer.
pub struct FailureDetector {
    map: Arc<HealthMap>,
    peers: Vec<String>,
    client: reqwest::Client,
    probe_period: Duration,
    probe_timeout: Duration,
}

impl FailureDetector {
    pub fn new(
        map: Arc<HealthMap>,
        peers: Vec<String>,
        probe_period: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            map,
            peers,
            client: reqwest::Client::new(),
            probe_period,
            probe_timeout,
        }
    }

    /// Runs the probe loop forever. Intended to be spawned as a background
    /// task; recovery events are sent on `events` for the caller to act on.
    pub async fn run(self, events: mpsc::Sender<RecoveryEvent>) {
        loop {
            tokio::time::sleep(self.probe_period).await;
            self.tick(&events).await;
        }
    }

    /// Runs exactly one probe sweep across every peer. Exposed separately
    /// so tests can drive ticks deterministically instead of waiting on the
    /// probe period.
    pub async fn tick(&self, events: &mpsc::Sender<RecoveryEvent>) {
        let handles: Vec<_> = self
            .peers
            .iter()
            .map(|peer| {
                let client = self.client.clone();
                let peer = peer.clone();
                let timeout = self.probe_timeout;
                tokio::spawn(async move { Self::probe_with(&client, &peer, timeout).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(outcome) = handle.await {
                outcomes.push(outcome);
            }
        }

        for (peer, ok) in outcomes {
            if let Some(event) = self.map.apply_probe(&peer, ok) {
                Logger::info("peer_recovered", &[("peer", event.peer.as_str())]);
                let _ = events.send(event).await;
            } else if !ok {
                Logger::warn("peer_probe_failed", &[("peer", peer.as_str())]);
            }
        }

        self.map.settle_tick();
    }

    async fn probe_with(client: &reqwest::Client, peer: &str, timeout: Duration) -> (String, bool) {
        let url = format!("http://{peer}/internal/health");
        let result = tokio::time::timeout(timeout, client.get(&url).send()).await;
        let ok = matches!(result, Ok(Ok(resp)) if resp.status().is_success());
        (peer.to_string(), ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::PeerState;

    #[tokio::test]
    async fn tick_with_no_peers_settles_with_consensus_true() {
        // N=0: floor((0+1)/2) = 0, and healthy(0)+1 = 1 > 0.
        let map = Arc::new(HealthMap::new(&[]));
        let detector = FailureDetector::new(
            map.clone(),
            vec![],
            Duration::from_millis(1),
            Duration::from_millis(1),
        );
        let (tx, _rx) = mpsc::channel(1);
        detector.tick(&tx).await;
        assert!(map.admits_writes());
    }

    #[tokio::test]
    async fn probe_against_unreachable_peer_degrades_and_reports_no_recovery() {
        let map = Arc::new(HealthMap::new(&["127.0.0.1:1".into()]));
        let detector = FailureDetector::new(
            map.clone(),
            vec!["127.0.0.1:1".into()],
            Duration::from_millis(1),
            Duration::from_millis(50),
        );
        let (tx, mut rx) = mpsc::channel(1);
        detector.tick(&tx).await;
        assert_eq!(map.state_of("127.0.0.1:1"), Some(PeerState::Unhealthy));
        assert!(rx.try_recv().is_err());
    }
}
