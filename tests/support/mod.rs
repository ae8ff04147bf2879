//! Shared scaffolding for spinning up real in-process nodes on ephemeral
//! ports and driving them with `reqwest`, the same pairing the Replicator
//! uses against its peers.

use std::sync::Arc;
use std::time::Duration;

use ledgerd::config::ArtificialDelayConfig;
use ledgerd::health::{FailureDetector, HealthMap};
use ledgerd::http_server::{AppState, HttpServer};
use ledgerd::log::Log;
use ledgerd::replication::{BackoffConfig, Replicator};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub struct Secondary {
    pub addr: String,
    pub log: Arc<Log>,
    _task: tokio::task::JoinHandle<()>,
}

pub async fn spawn_secondary(delay: ArtificialDelayConfig) -> Secondary {
    let log = Arc::new(Log::new());
    let health = Arc::new(HealthMap::new(&[]));
    let state = AppState::secondary(log.clone(), health);
    let router = HttpServer::secondary(state, delay, &[]).router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let task = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Secondary {
        addr,
        log,
        _task: task,
    }
}

pub struct Primary {
    pub addr: String,
    pub health: Arc<HealthMap>,
    pub detector: FailureDetector,
    _task: tokio::task::JoinHandle<()>,
}

/// Spawns a primary wired to `peers` but does not yet run the failure
/// detector loop — call [`Primary::settle`] to drive ticks deterministically
/// instead of waiting on the real probe period.
pub async fn spawn_primary(peers: Vec<String>) -> Primary {
    let log = Arc::new(Log::new());
    let health = Arc::new(HealthMap::new(&peers));
    let replicator = Replicator::new(
        health.clone(),
        peers.clone(),
        Duration::from_secs(2),
        BackoffConfig {
            initial: Duration::from_millis(20),
            max: Duration::from_millis(200),
        },
        Duration::from_secs(2),
    );
    let detector = FailureDetector::new(
        health.clone(),
        peers,
        Duration::from_secs(3600),
        Duration::from_millis(500),
    );

    let state = AppState::primary(log, health.clone(), replicator);
    let router = HttpServer::primary(state, &[]).router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let task = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Primary {
        addr,
        health,
        detector,
        _task: task,
    }
}

impl Primary {
    /// Runs exactly one probe sweep, discarding any recovery events.
    pub async fn settle(&self) {
        let (tx, _rx) = mpsc::channel(8);
        self.detector.tick(&tx).await;
    }
}
