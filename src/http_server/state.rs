//! Shared application state threaded through every HTTP handler.

use std::sync::Arc;

use crate::config::Role;
use crate::health::SharedHealthMap;
use crate::log::Log;
use crate::quorum::QuorumGate;
use crate::replication::Replicator;

/// State shared by every handler on this node. `replicator` is only
/// populated on a primary; a secondary never replicates.
#[derive(Clone)]
pub struct AppState {
    pub role: Role,
    pub log: Arc<Log>,
    pub health: SharedHealthMap,
    pub quorum: QuorumGate,
    pub replicator: Option<Replicator>,
}

impl AppState {
    pub fn primary(log: Arc<Log>, health: SharedHealthMap, replicator: Replicator) -> Self {
        let quorum = QuorumGate::new(health.clone());
        Self {
            role: Role::Master,
            log,
            health,
            quorum,
            replicator: Some(replicator),
        }
    }

    pub fn secondary(log: Arc<Log>, health: SharedHealthMap) -> Self {
        let quorum = QuorumGate::new(health.clone());
        Self {
            role: Role::Slave,
            log,
            health,
            quorum,
            replicator: None,
        }
    }
}
