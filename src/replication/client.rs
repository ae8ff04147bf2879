//! Thin HTTP client wrapper for talking to a secondary's replication
//! endpoints. Shared by the Replicator (`/internal/post`) and Anti-Entropy
//! (`/internal/post/sync`).

use std::time::Duration;

use serde::Serialize;

use crate::log::Record;

/// Fallback request timeout for a [`PeerClient`] built with [`Default`]
/// (tests and call sites that don't thread a configured timeout through).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one delivery attempt to a peer.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// 2xx response.
    Success,
    /// Non-2xx response; the body/status is kept for logging only.
    Rejected { status: u16 },
    /// Could not even complete the request (DNS, connect, timeout, ...).
    Transport { reason: String },
}

#[derive(Serialize)]
struct PostBody<'a> {
    records: &'a [Record],
}

/// A small, cloneable handle around a [`reqwest::Client`] scoped to the
/// replication endpoints of a single peer address.
///
/// Every request — replication delivery and anti-entropy sync alike — is
/// bounded by `timeout`, so a peer that accepts a connection and never
/// responds is reported as a [`DeliveryOutcome::Transport`] failure instead
/// of hanging the caller forever.
#[derive(Clone)]
pub struct PeerClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// POSTs `records` to `peer`'s `/internal/post`.
    pub async fn post(&self, peer: &str, records: &[Record]) -> DeliveryOutcome {
        self.post_path(peer, "/internal/post", records).await
    }

    /// POSTs the full log to `peer`'s `/internal/post/sync` (anti-entropy).
    pub async fn post_sync(&self, peer: &str, records: &[Record]) -> DeliveryOutcome {
        self.post_path(peer, "/internal/post/sync", records).await
    }

    async fn post_path(&self, peer: &str, path: &str, records: &[Record]) -> DeliveryOutcome {
        let url = format!("http://{peer}{path}");
        let body = PostBody { records };
        let request = self.http.post(&url).json(&body).send();

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(resp)) if resp.status().is_success() => DeliveryOutcome::Success,
            Ok(Ok(resp)) => DeliveryOutcome::Rejected {
                status: resp.status().as_u16(),
            },
            Ok(Err(e)) => DeliveryOutcome::Transport {
                reason: e.to_string(),
            },
            Err(_) => DeliveryOutcome::Transport {
                reason: format!("request to {peer}{path} timed out after {:?}", self.timeout),
            },
        }
    }
}

impl Default for PeerClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sync_to_an_unresponsive_peer_times_out_as_a_transport_failure() {
        // 10.255.255.1 is a non-routable address: the connection attempt
        // stalls rather than failing fast, exercising the timeout path
        // rather than a connection-refused error.
        let client = PeerClient::new(Duration::from_millis(50));
        let records = vec![Record::with_offset("a", 0)];
        let outcome = client.post_sync("10.255.255.1:9", &records).await;
        assert!(matches!(outcome, DeliveryOutcome::Transport { .. }));
    }
}
