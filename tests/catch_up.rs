//! A peer offline during several produces, once it recovers, anti-entropy
//! ships it the primary's full log with no manual intervention.

mod support;

use std::sync::Arc;
use std::time::Duration;

use ledgerd::config::ArtificialDelayConfig;
use ledgerd::health::{FailureDetector, HealthMap};
use ledgerd::log::{Log, Record};
use ledgerd::replication::{anti_entropy, PeerClient};
use support::spawn_secondary;
use tokio::sync::mpsc;

#[tokio::test]
async fn recovered_peer_catches_up_to_the_primarys_full_log() {
    let secondary = spawn_secondary(ArtificialDelayConfig::default()).await;

    let primary_log = Arc::new(Log::new());
    primary_log.append(Record::new("a"));
    primary_log.append(Record::new("b"));
    primary_log.append(Record::new("c"));

    let peers = vec![secondary.addr.clone()];
    let health = Arc::new(HealthMap::new(&peers));
    let detector = FailureDetector::new(
        health.clone(),
        peers,
        Duration::from_secs(3600),
        Duration::from_millis(500),
    );

    let (tx, mut rx) = mpsc::channel(8);
    detector.tick(&tx).await;
    let event = rx.recv().await.expect("peer should have been observed recovering");
    assert_eq!(event.peer, secondary.addr);

    let client = PeerClient::new(Duration::from_secs(2));
    anti_entropy::sync_peer(&client, &health, &primary_log, &event.peer).await;

    let body: serde_json::Value = reqwest::get(format!("http://{}/", secondary.addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["value"], "a");
    assert_eq!(records[1]["value"], "b");
    assert_eq!(records[2]["value"], "c");
}

#[tokio::test]
async fn unreachable_peer_never_emits_a_recovery_event() {
    let dead_peer = "127.0.0.1:1".to_string();
    let health = Arc::new(HealthMap::new(&[dead_peer.clone()]));
    let detector = FailureDetector::new(
        health.clone(),
        vec![dead_peer.clone()],
        Duration::from_secs(3600),
        Duration::from_millis(50),
    );

    let (tx, mut rx) = mpsc::channel(1);
    detector.tick(&tx).await;

    assert_eq!(
        health.state_of(&dead_peer),
        Some(ledgerd::health::PeerState::Unhealthy)
    );
    assert!(rx.try_recv().is_err());
}
