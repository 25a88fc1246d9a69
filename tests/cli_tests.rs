//! End-to-end tests for the ddscalc binary
//!
//! Configuration mode always passes `--mtu` and analysis mode always passes
//! `--log-file` so nothing depends on the host's interfaces or journal.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn ddscalc() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("ddscalc")
}

/// Receiver lines with cycle times around `cycle_us` and small corrections
fn receiver_log(cycle_us: f64, count: usize) -> String {
    let mut log = String::from("-- Journal begins --\nservice started\n");
    for i in 0..count {
        let jitter = [-0.5, 0.0, 0.5, 0.25][i % 4];
        let correction = [0.0016, 0.0020, 0.0024][i % 3];
        let cy_ps = ((cycle_us + jitter) * 1_000_000.0).round() as u64;
        log.push_str(&format!(
            "Oct 16 10:00:{:02} host dds[42]: info rcv 2 -0.0110 -0.0105 {:.4} cy={}\n",
            i % 60,
            correction,
            cy_ps
        ));
    }
    log
}

fn write_log(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("receiver.log");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_config_only_dsd_at_jumbo_mtu() {
    ddscalc()
        .args(["--mtu", "9024", "--config-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[global]"))
        .stdout(predicate::str::contains("CycleTime=2930\n"))
        .stdout(predicate::str::contains("CycleMinTime=2915\n"))
        .stdout(predicate::str::contains("Interface=enp5s0\n"))
        .stdout(predicate::str::contains("NEXT STEPS").not())
        .stdout(predicate::str::contains("CONFIGURATION SUMMARY").not());
}

#[test]
fn test_config_only_pcm() {
    ddscalc()
        .args(["--mtu", "9024", "--pcm", "--config-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CycleTime=3905\n"))
        .stdout(predicate::str::contains("CycleMinTime=3885\n"));
}

#[test]
fn test_full_configuration_output() {
    ddscalc()
        .args(["--mtu", "9024", "--interface", "eth1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIGURATION SUMMARY"))
        .stdout(predicate::str::contains("Format: DSD"))
        .stdout(predicate::str::contains("Samples per frame: 36,000"))
        .stdout(predicate::str::contains("Target CycleTime: 2930 μs"))
        .stdout(predicate::str::contains("Using recommended optimized settings (4/8/6)"))
        .stdout(predicate::str::contains("Interface=eth1\n"))
        .stdout(predicate::str::contains("NEXT STEPS"));
}

#[test]
fn test_configuration_notes_for_custom_buffers() {
    ddscalc()
        .args([
            "--mtu",
            "1500",
            "--period-min",
            "2",
            "--period-max",
            "8",
            "--sync-buffer",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIGURATION NOTES"))
        .stdout(predicate::str::contains("Large periodMin/Max ratio (2:8 = 4.0:1)"))
        .stdout(predicate::str::contains("syncBufferCount (1) < periodMin (2)"))
        .stdout(predicate::str::contains("Total buffering (9 periods) is aggressive"));
}

#[test]
fn test_configuration_json() {
    let output = ddscalc()
        .args(["--mtu", "1500", "--pcm", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["mtu"], 1500);
    assert_eq!(json["encoding"], "pcm");
    assert_eq!(json["frame"]["samples_per_frame"], 246);
    assert_eq!(json["frame"]["audio_bytes"], 1476);
    assert!(json["settings_file"].as_str().unwrap().contains("CycleTime="));
}

#[test]
fn test_mtu_without_room_for_audio_is_rejected() {
    ddscalc()
        .args(["--mtu", "20", "--config-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid MTU"));
}

#[test]
fn test_analyze_sync_from_log_file() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, &receiver_log(2930.0, 40));

    ddscalc()
        .args(["--analyze-sync", "--cycle-time", "2930"])
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("INTERPRETATION GUIDE"))
        .stdout(predicate::str::contains("Service: diretta_sync_host"))
        .stdout(predicate::str::contains("LAST 1,000 LOG ENTRIES"))
        .stdout(predicate::str::contains("Expected CycleTime: 2930.0 μs"))
        .stdout(predicate::str::contains("Parsed 40 log entries"))
        .stdout(predicate::str::contains("1. NETWORK TIMING JITTER"))
        .stdout(predicate::str::contains("2. BUFFER MANAGEMENT STABILITY"));
}

#[test]
fn test_analyze_memory_honors_line_count() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, &receiver_log(2930.0, 40));

    ddscalc()
        .args(["--analyze-memory", "5", "--cycle-time", "2930"])
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Service: diretta_memoryplay_host"))
        .stdout(predicate::str::contains("Parsed 5 log entries"))
        .stdout(predicate::str::contains("2. BUFFER STABILITY: Insufficient data"));
}

#[test]
fn test_analyze_without_log_lines() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "");

    ddscalc()
        .args(["--analyze-sync", "--cycle-time", "2930"])
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("No logs found for service 'diretta_sync_host'"));
}

#[test]
fn test_analyze_unparseable_logs() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "nothing\nto see\nhere\n");

    ddscalc()
        .args(["--analyze-sync", "--cycle-time", "2930"])
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("none of 3 lines matched"));
}

#[test]
fn test_analyze_reads_reference_from_configured_settings_file() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, &receiver_log(2930.0, 20));

    let settings = dir.path().join("setting.inf");
    fs::write(&settings, "[global]\nCycleTime=2930\nCycleMinTime=2915\n").unwrap();

    let config = dir.path().join("ddscalc.toml");
    fs::write(
        &config,
        format!("settings_paths = [{:?}]\n", settings.display().to_string()),
    )
    .unwrap();

    ddscalc()
        .arg("--analyze-sync")
        .arg("--config")
        .arg(&config)
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Expected CycleTime: 2930.0 μs"));
}

#[test]
fn test_analyze_json_report() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, &receiver_log(2930.0, 24));

    let output = ddscalc()
        .args(["--analyze-sync", "--cycle-time", "2930", "--format", "json"])
        .arg("--log-file")
        .arg(&log)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["service"], "diretta_sync_host");
    assert_eq!(json["outcome"]["status"], "complete");
    assert_eq!(json["outcome"]["detail"]["sample_count"], 24);
    assert_eq!(json["outcome"]["detail"]["jitter"]["status"], "graded");
    assert_eq!(json["outcome"]["detail"]["correction"]["status"], "graded");
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("ddscalc.toml");
    fs::write(&config, "default_log_lines = 0\n").unwrap();

    ddscalc()
        .arg("--analyze-sync")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("default_log_lines"));
}

#[test]
fn test_analyze_modes_are_exclusive() {
    ddscalc()
        .args(["--analyze-sync", "--analyze-memory"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_cycle_time_is_rejected() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, &receiver_log(2930.0, 20));

    for value in ["0", "-5", "nan"] {
        ddscalc()
            .args(["--analyze-sync", "--cycle-time", value])
            .arg("--log-file")
            .arg(&log)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cycle time"));
    }
}

#[test]
fn test_zero_line_count_is_rejected() {
    ddscalc()
        .args(["--analyze-sync", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line count must be at least 1"));
}

#[test]
fn test_log_file_with_invalid_utf8_is_analyzed() {
    let dir = TempDir::new().unwrap();
    let mut bytes = receiver_log(2930.0, 12).into_bytes();
    bytes.extend_from_slice(b"binary blob \xff\xfe\n");
    let log = dir.path().join("receiver.log");
    fs::write(&log, bytes).unwrap();

    ddscalc()
        .args(["--analyze-sync", "--cycle-time", "2930"])
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed 12 log entries"))
        .stdout(predicate::str::contains("No logs found").not());
}
