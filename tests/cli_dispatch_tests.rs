use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_dpscalc")
}

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env("DPSCALC_DATA_DIR", data_dir())
        .env("RUST_LOG", "warn")
        .env_remove("DPSCALC_CONFIG")
        .env_remove("DPSCALC_DATA_URL")
        .env_remove("DPSCALC_CALCULATOR_URL")
        .env_remove("DPSCALC_SEED_ALPHABET")
        .output()
        .expect("dpscalc should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("command should emit json")
}

fn encode_fixture(setup: &str) -> String {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("setup.json");
    fs::write(&path, setup).expect("fixture should be written");
    let output = run(&["encode", path.to_string_lossy().as_ref()]);
    assert_eq!(output.status.code(), Some(0));
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn missing_command_prints_usage() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: dpscalc"));
}

#[test]
fn decode_without_seed_is_a_usage_error() {
    let output = run(&["decode"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: dpscalc decode"));
}

#[test]
fn encoded_setup_decodes_with_resolved_items() {
    let seed = encode_fixture(
        r#"{"parameters": {"attack_level": 99}, "equipment": {"weapon": 4151, "ring": 6737}}"#,
    );
    let output = run(&["decode", &seed]);
    assert_eq!(output.status.code(), Some(0));
    let payload = stdout_json(&output);
    assert_eq!(payload["parameters"]["attack_level"], 99);
    assert_eq!(payload["equipment"]["weapon"]["name"], "Abyssal whip");
    assert_eq!(payload["equipment"]["ring"]["name"], "Berserker ring");
    assert!(payload["equipment"]["head"].is_null());
}

#[test]
fn bonuses_command_reports_totals_for_the_seed_style() {
    let seed = encode_fixture(
        r#"{"parameters": {"combat_style": "melee"}, "equipment": {"weapon": 4151, "ring": 6737, "spec": 11802}}"#,
    );
    let output = run(&["bonuses", &seed]);
    assert_eq!(output.status.code(), Some(0));
    let payload = stdout_json(&output);
    assert_eq!(payload["combat_style"], "melee");
    assert_eq!(payload["totals"]["melee_attack"], 82.0);
    assert_eq!(payload["patch"]["melee_strength_bonus"], 86.0);
}

#[test]
fn malformed_seed_exits_with_failure() {
    let output = run(&["decode", "definitely not a seed"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid seed"));
}

#[test]
fn status_command_loads_reference_data() {
    let output = run(&["status"]);
    assert_eq!(output.status.code(), Some(0));
    let payload = stdout_json(&output);
    assert_eq!(payload["state"]["phase"], "ready");
    assert_eq!(payload["data"]["bosses"], 3);
    assert_eq!(payload["data"]["special_attacks"], 3);
}

#[test]
fn status_command_fails_on_missing_data() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = Command::new(bin())
        .arg("status")
        .env("DPSCALC_DATA_DIR", dir.path())
        .env_remove("DPSCALC_CONFIG")
        .env_remove("DPSCALC_DATA_URL")
        .output()
        .expect("dpscalc should run");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["state"]["phase"], "failed");
}
