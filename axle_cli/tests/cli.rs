use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn bin() -> Command {
    Command::cargo_bin("axle_cli").expect("binary builds")
}

// Same calibration as the built-in sample model.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[model]
d_angle_d_speed = 171600
d_angle_d_current = 715820000
d_angle_d_voltage = 1789560000
d_angle_d_torque = -2147000
d_speed_d_speed = 867
d_speed_d_current = 1432
d_speed_d_voltage = 17895600
d_speed_d_torque = -42940
d_current_d_speed = -858000
d_current_d_current = 143164
d_current_d_voltage = 1789560
d_current_d_torque = 2147000000
d_torque_d_speed = 5720
d_torque_d_acceleration = 42900
d_voltage_d_torque = 85880
d_torque_d_voltage = 4474
torque_friction = 30000

[observer]
stall_speed_limit = 20000
stall_time = 200
feedback_gain = 1500
"#;
    let path = dir.path().join("axle.toml");
    fs::write(&path, toml).expect("write config");
    path
}

#[test]
fn observe_emits_a_json_summary() {
    let output = bin()
        .args(["observe", "--duration-ms", "300", "--json"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let v: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is one JSON object");
    assert_eq!(v["stalled"], serde_json::json!(false));
    assert!(v["speed_mdeg_s"].as_i64().expect("speed field") > 100_000);
    assert!(v["angle_mdeg"].as_i64().expect("angle field") > 0);
}

#[test]
fn observe_reports_a_stall_when_the_shaft_is_blocked() {
    let output = bin()
        .args([
            "observe",
            "--duration-ms",
            "1500",
            "--block-at-ms",
            "0",
            "--json",
        ])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json summary");
    assert_eq!(v["stalled"], serde_json::json!(true));
    // Debounce: never before stall_time has elapsed.
    assert!(v["stall_at_ms"].as_u64().expect("stall time") >= 200);
}

#[test]
fn observe_accepts_a_config_file() {
    let dir = tempdir().expect("tempdir");
    let path = write_valid_config(&dir);
    bin()
        .args(["observe", "--duration-ms", "200"])
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("deg/s"));
}

#[rstest]
#[case("d_speed_d_speed = 867", "d_speed_d_speed = 0")]
#[case("stall_time = 200", "stall_time = 0")]
fn observe_rejects_invalid_config(#[case] from: &str, #[case] to: &str) {
    let dir = tempdir().expect("tempdir");
    let path = write_valid_config(&dir);
    let text = fs::read_to_string(&path).expect("read config");
    fs::write(&path, text.replace(from, to)).expect("rewrite config");
    bin()
        .args(["observe", "--duration-ms", "100"])
        .arg("--config")
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn observe_fails_on_missing_config() {
    bin()
        .args(["observe", "--config", "/nonexistent/axle.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn connect_succeeds_and_reports_json() {
    let output = bin()
        .args(["connect", "--handshake-polls", "3", "--json"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json result");
    assert_eq!(v["connected"], serde_json::json!(true));
}

#[test]
fn connect_fails_when_the_peer_is_unreachable() {
    bin()
        .args(["connect", "--unreachable", "--handshake-polls", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("connection failed"));
}

#[test]
fn connect_times_out_after_draining_the_teardown() {
    bin()
        .args([
            "connect",
            "--handshake-polls",
            "100000",
            "--teardown-polls",
            "2",
            "--timeout-ms",
            "100",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timed out"));
}
