use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

// The global subscriber can only be installed once per process, so this
// binary holds a single test.
#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("extractor.log");

    subtitle_extractor::logging::init(true, Some(&path));
    tracing::info!("upload started");
    // a second init must not panic or replace the subscriber
    subtitle_extractor::logging::init(false, None);
    tracing::info!("still logging");

    sleep(Duration::from_millis(200));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("upload started"));
    assert!(contents.contains("still logging"));
}
