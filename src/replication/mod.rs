//! Replication Subsystem
//!
//! - The Replicator fans a produced record out to every secondary and
//!   unblocks the caller once `w - 1` peers have acknowledged.
//! - Anti-Entropy ships the full log to a peer that has just become
//!   healthy again.

pub mod anti_entropy;
pub mod client;
mod errors;
mod replicator;

pub use client::PeerClient;
pub use errors::{ReplicationError, ReplicationErrorKind, ReplicationResult};
pub use replicator::{BackoffConfig, Replicator, ReplicationOutcome};
