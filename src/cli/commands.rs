//! Dispatches parsed CLI commands: loads configuration, wires the Log,
//! Health Map, Replicator, and Failure Detector together, and serves.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::args::{CliRole, Command};
use super::errors::{CliError, CliResult};
use crate::config::{NodeConfig, Role};
use crate::health::{FailureDetector, HealthMap};
use crate::http_server::{AppState, HttpServer};
use crate::log::Log;
use crate::observability::Logger;
use crate::replication::{anti_entropy, PeerClient, Replicator};

pub async fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Start {
            config,
            role,
            listen,
        } => start(config, role, listen).await,
    }
}

async fn start(
    config_path: PathBuf,
    role_override: Option<CliRole>,
    listen_override: Option<String>,
) -> CliResult<()> {
    let mut config = NodeConfig::from_file(&config_path)?;

    if let Some(role) = role_override {
        config.role = match role {
            CliRole::Master => Role::Master,
            CliRole::Slave => Role::Slave,
        };
    }
    if let Some(listen) = listen_override {
        config.listen = listen;
    }

    Logger::info(
        "node_starting",
        &[
            ("role", config.role.to_string().as_str()),
            ("listen", config.listen.as_str()),
        ],
    );

    let log = Arc::new(Log::new());

    match config.role {
        Role::Master => run_primary(config, log).await,
        Role::Slave => run_secondary(config, log).await,
    }
}

/// Wires "Log -> Failure Detector -> Quorum Gate -> Replicator ->
/// Anti-Entropy -> Boundary Handlers" and serves the primary's HTTP surface.
async fn run_primary(config: NodeConfig, log: Arc<Log>) -> CliResult<()> {
    let health = Arc::new(HealthMap::new(&config.peers));
    let replicator = Replicator::new(
        health.clone(),
        config.peers.clone(),
        config.admission_window(),
        config.backoff(),
        config.replication_timeout(),
    );

    let detector = FailureDetector::new(
        health.clone(),
        config.peers.clone(),
        config.probe_period(),
        config.probe_timeout(),
    );
    let (recovered_tx, mut recovered_rx) = mpsc::channel(16);
    tokio::spawn(detector.run(recovered_tx));

    // `client` is bounded by `replication_timeout`, so a peer that accepts
    // the sync connection and never responds still lets this loop move on
    // to the next recovery event instead of blocking forever.
    tokio::spawn({
        let log = log.clone();
        let health = health.clone();
        let replication_timeout = config.replication_timeout();
        async move {
            let client = PeerClient::new(replication_timeout);
            while let Some(event) = recovered_rx.recv().await {
                anti_entropy::sync_peer(&client, &health, &log, &event.peer).await;
            }
        }
    });

    let state = AppState::primary(log, health, replicator);
    HttpServer::primary(state, &config.cors_origins)
        .listen_on(config.listen.clone())
        .serve()
        .await
        .map_err(|e| CliError::boot_failed(e.to_string()))
}

async fn run_secondary(config: NodeConfig, log: Arc<Log>) -> CliResult<()> {
    let health = Arc::new(HealthMap::new(&[]));
    let state = AppState::secondary(log, health);
    HttpServer::secondary(state, config.artificial_delay.clone(), &config.cors_origins)
        .listen_on(config.listen.clone())
        .serve()
        .await
        .map_err(|e| CliError::boot_failed(e.to_string()))
}
