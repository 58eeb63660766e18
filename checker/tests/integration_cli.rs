// Integration tests for the kpc command line.
//
// Exit codes: 0 when the pattern passed, 1 when problems were found,
// 2 when the pattern could not be checked at all.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn kpc_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_kpc"))
}

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    project_root().join("patterns").join(name)
}

fn kpc(pattern: &str, args: &[&str]) -> Output {
    Command::new(kpc_binary())
        .args(args)
        .arg(fixture(pattern))
        .output()
        .expect("failed to run kpc")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ── Exit status ─────────────────────────────────────────────────────────────

#[test]
fn clean_pattern_exits_zero() {
    let output = kpc("single_jersey.kp", &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "ok: 24 loops");
}

#[test]
fn cable_pattern_exits_zero() {
    let output = kpc("cable.kp", &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "ok: 30 loops");
}

#[test]
fn warnings_exit_one() {
    let output = kpc("tuck_warning.kp", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output).trim(), "1 problem(s)");
    let err = stderr(&output);
    assert!(
        err.contains("kpc: warning[W0100]: too many loops held in needle (course 2, needle 1)"),
        "stderr: {}",
        err
    );
}

#[test]
fn allow_warnings_exits_zero() {
    let output = kpc("tuck_warning.kp", &["--allow-warnings"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
}

#[test]
fn syntax_problems_block_even_with_allow_warnings() {
    let output = kpc("incomplete_cable.kp", &["--allow-warnings"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("syntax error"));
}

#[test]
fn config_raises_thresholds() {
    let config = fixture("thresholds.json");
    let output = kpc(
        "tuck_warning.kp",
        &["--config", config.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "ok: 9 loops");
}

#[test]
fn tile_checks_the_motif_as_a_repeat() {
    let alone = kpc("edge_move.kp", &[]);
    assert_eq!(alone.status.code(), Some(1));
    assert!(stderr(&alone).contains("(course 1, needle 1)"));

    let tiled = kpc("edge_move.kp", &["--tile"]);
    assert_eq!(tiled.status.code(), Some(0), "stderr: {}", stderr(&tiled));
    assert_eq!(stdout(&tiled).trim(), "ok: 144 loops");
}

// ── Fatal errors ────────────────────────────────────────────────────────────

#[test]
fn parse_errors_exit_two() {
    let output = kpc("bad_code.kp", &[]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("kpc: parse error: line 2: code 300 is out of range (0-255)"), "stderr: {}", err);
    assert!(err.contains("kpc: parse error: line 3: course has 2 codes, expected 3"), "stderr: {}", err);
    assert!(stdout(&output).is_empty());
}

#[test]
fn unimplemented_code_exits_two() {
    let output = kpc("unimplemented.kp", &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("kpc: error:"));
}

#[test]
fn missing_file_exits_two() {
    let output = kpc("no_such_pattern.kp", &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no_such_pattern.kp"));
}

// ── Emit targets ────────────────────────────────────────────────────────────

#[test]
fn emit_resolved_shows_moves() {
    let output = kpc("cable.kp", &["--emit", "resolved"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[3], "  1  72  72  62  62   1");
    assert_eq!(lines[4], "  1   1   1   1   1   1");
}

#[test]
fn emit_loops_lists_every_loop() {
    let output = kpc("single_jersey.kp", &["--emit", "loops"]);
    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 24);
    assert_eq!(out.lines().filter(|l| l.contains(" -> held")).count(), 6);
}

#[test]
fn emit_report_is_json() {
    let output = kpc("tuck_warning.kp", &["--emit", "report"]);
    assert_eq!(output.status.code(), Some(1));
    // Problems go into the report rather than to stderr.
    assert!(!stderr(&output).contains("(course 2, needle 1)"));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["provenance"]["width"], 3);
    assert_eq!(json["provenance"]["height"], 3);
    assert_eq!(json["problems"].as_array().unwrap().len(), 1);
    assert_eq!(json["problems"][0]["kind"], "NumberOfLoopsInNeedleWarning");
    assert_eq!(json["problems"][0]["course"], 2);
    assert_eq!(json["loops"].as_array().unwrap().len(), 9);
}

#[test]
fn report_hash_is_reproducible() {
    let first = kpc("cable.kp", &["--emit", "report"]);
    let second = kpc("cable.kp", &["--emit", "report"]);
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn verbose_prints_stage_timing() {
    let output = kpc("single_jersey.kp", &["--verbose"]);
    assert_eq!(output.status.code(), Some(0));
    let err = stderr(&output);
    assert!(err.contains("kpc: resolve_cables complete"), "stderr: {}", err);
    assert!(err.contains("kpc: scan_pickups complete"), "stderr: {}", err);
}
