use std::sync::Arc;
use std::time::Duration;

use kinefeed_core::datalog::{read_csv, write_csv, ReplayConnector};
use kinefeed_core::feed::{open_with, FeedConfig, FeedState, Sample};
use pretty_assertions::assert_eq;

#[tokio::test(start_paused = true)]
async fn test_replay_then_export() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("session.csv");
    std::fs::write(&source, "time_s,angle_deg\n0.0,10\n0.1,20\n0.2,30\n0.3,40\n").unwrap();

    let replay = ReplayConnector::from_csv(&source, Duration::from_millis(50)).unwrap();
    let handle = open_with("live", FeedConfig::default().with_capacity(3), Arc::new(replay)).unwrap();

    assert_eq!(handle.wait_for(FeedState::is_terminal).await, FeedState::Closed);
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.angles(), vec![20.0, 30.0, 40.0]);

    let export = dir.path().join("export.csv");
    write_csv(&export, &snapshot).unwrap();
    assert_eq!(
        read_csv(&export).unwrap(),
        vec![
            Sample::new(0.1, 20.0),
            Sample::new(0.2, 30.0),
            Sample::new(0.3, 40.0),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_replay_for_other_recording_is_ignored() {
    let samples = vec![Sample::new(0.0, 1.0), Sample::new(0.1, 2.0)];
    let replay = ReplayConnector::new(samples, Duration::from_millis(10)).with_id("r2");
    let handle = open_with("r1", FeedConfig::default(), Arc::new(replay)).unwrap();

    handle.wait_for(FeedState::is_terminal).await;

    assert!(handle.snapshot().is_empty());
    assert_eq!(handle.stats().ignored, 2);
}
