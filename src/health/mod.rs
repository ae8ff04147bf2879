//! Failure detector and health map.
//!
//! - Every peer starts *suspected*.
//! - Degradation is one step per tick (healthy -> suspected -> unhealthy);
//!   recovery is immediate (any state -> healthy on a single success).
//! - The Consensus Flag is recomputed once per tick, after every probe in
//!   that tick has resolved.
//!
//! The detector itself never calls into the Replicator or Anti-Entropy: it
//! only classifies peers and publishes `RecoveryEvent`s on a channel. The
//! caller (the boundary layer) is the one that owns both the detector and
//! the anti-entropy shipper, and wires the two together — keeping the
//! dependency order "Log -> Failure Detector -> Quorum Gate -> Replicator
//! -> Anti-Entropy -> Boundary Handlers" a straight line, not a cycle.

mod detector;

pub use detector::{FailureDetector, RecoveryEvent};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::time::timeout;

/// Health classification of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerState {
    Healthy,
    Suspected,
    Unhealthy,
}

impl PeerState {
    /// Numeric encoding for `GET /health`.
    pub fn code(&self) -> u8 {
        match self {
            PeerState::Healthy => 0,
            PeerState::Suspected => 1,
            PeerState::Unhealthy => 2,
        }
    }

    /// Applies the degradation step for a failed/timed-out probe.
    fn degrade(self) -> PeerState {
        match self {
            PeerState::Healthy => PeerState::Suspected,
            PeerState::Suspected => PeerState::Unhealthy,
            PeerState::Unhealthy => PeerState::Unhealthy,
        }
    }
}

/// Shared, synchronized view of every peer's health plus the derived
/// Consensus Flag. Owned by the [`FailureDetector`]; read by the Quorum
/// Gate, the Replicator, and the health HTTP route.
pub struct HealthMap {
    states: Mutex<HashMap<String, PeerState>>,
    consensus: AtomicBool,
    changed: Notify,
    peer_count: usize,
}

impl HealthMap {
    /// Creates a map with every peer initialized to *suspected*.
    pub fn new(peers: &[String]) -> Self {
        let states = peers
            .iter()
            .map(|p| (p.clone(), PeerState::Suspected))
            .collect();
        Self {
            states: Mutex::new(states),
            consensus: AtomicBool::new(false),
            changed: Notify::new(),
            peer_count: peers.len(),
        }
    }

    /// Current state of one peer, or `None` if it isn't a configured peer.
    pub fn state_of(&self, peer: &str) -> Option<PeerState> {
        self.states.lock().expect("health mutex poisoned").get(peer).copied()
    }

    /// A snapshot of every peer's state, for `GET /health`.
    pub fn snapshot(&self) -> HashMap<String, PeerState> {
        self.states.lock().expect("health mutex poisoned").clone()
    }

    /// The Consensus Flag: true iff healthy peers + 1 (the
    /// primary) is strictly greater than floor((N+1)/2).
    pub fn admits_writes(&self) -> bool {
        self.consensus.load(Ordering::Acquire)
    }

    /// Blocks until `peer` is observed *healthy*, or `window` elapses.
    /// Returns `true` if it became healthy in time.
    pub async fn wait_healthy(&self, peer: &str, window: Duration) -> bool {
        if self.state_of(peer) == Some(PeerState::Healthy) {
            return true;
        }
        let wait = async {
            loop {
                let notified = self.changed.notified();
                if self.state_of(peer) == Some(PeerState::Healthy) {
                    return;
                }
                notified.await;
                if self.state_of(peer) == Some(PeerState::Healthy) {
                    return;
                }
            }
        };
        timeout(window, wait).await.is_ok()
    }

    /// Applies one probe outcome for `peer`, returning the transition that
    /// occurred, if any became-healthy recovery event is warranted.
    pub(crate) fn apply_probe(&self, peer: &str, probe_ok: bool) -> Option<RecoveryEvent> {
        let mut states = self.states.lock().expect("health mutex poisoned");
        let prev = *states.get(peer)?;
        let next = if probe_ok {
            PeerState::Healthy
        } else {
            prev.degrade()
        };
        states.insert(peer.to_string(), next);
        drop(states);

        let recovered = probe_ok && prev != PeerState::Healthy;
        if recovered {
            Some(RecoveryEvent {
                peer: peer.to_string(),
            })
        } else {
            None
        }
    }

    /// Demotes `peer` to *suspected* outside of a probe tick.
    ///
    /// When an anti-entropy shipment fails, the peer is
    /// demoted so the next recovery transition re-triggers anti-entropy,
    /// and the Consensus Flag is recomputed to reflect the demotion.
    pub fn demote_to_suspected(&self, peer: &str) {
        {
            let mut states = self.states.lock().expect("health mutex poisoned");
            if let Some(state) = states.get_mut(peer) {
                *state = PeerState::Suspected;
            }
        }
        self.settle_tick();
    }

    /// Recomputes the Consensus Flag from the current map and broadcasts
    /// the tick's settlement to anyone waiting in [`Self::wait_healthy`].
    fn settle_tick(&self) {
        let healthy = self
            .states
            .lock()
            .expect("health mutex poisoned")
            .values()
            .filter(|s| **s == PeerState::Healthy)
            .count();
        let n = self.peer_count;
        let quorum = healthy + 1 > (n + 1) / 2;
        self.consensus.store(quorum, Ordering::Release);
        self.changed.notify_waiters();
    }
}

/// Shared handle passed to tasks that need read access to health state.
pub type SharedHealthMap = Arc<HealthMap>;
