//! Smoke tests for the command line tool.

mod common;

use c3d_anim::prelude::*;
use common::{recording, sample};
use std::process::Command;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_c3d-anim"))
}

#[test]
fn test_version() {
    let out = cli().arg("version").output().expect("run c3d-anim");
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.starts_with(&format!("c3d-anim {}", env!("CARGO_PKG_VERSION"))), "{}", text);
}

#[test]
fn test_import_then_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("gait.json");
    let scene = dir.path().join("scene.json");
    let output = dir.path().join("gait_out.json");
    recording(&["P1:LASI", "P1:RASI", "Wand"], 100.0, 1, 20, sample)
        .save(&input)
        .expect("save recording");

    let status = cli()
        .args(["-q", "import"])
        .arg(&input)
        .arg("-o")
        .arg(&scene)
        .status()
        .expect("run import");
    assert!(status.success());
    let loaded = Scene::load(&scene).expect("load scene");
    assert_eq!(loaded.actions.len(), 2);
    assert_eq!(loaded.settings.frame_end, 20);

    let status = cli()
        .args(["-q", "export"])
        .arg(&scene)
        .arg(&output)
        .args(["--select", "gait.P1"])
        .status()
        .expect("run export");
    assert!(status.success());
    let back = MemoryRecording::load(&output).expect("load export");
    assert_eq!(back.info.point_count, 2);
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let status = cli()
        .current_dir(dir.path())
        .args(["-q", "info", "nope.json"])
        .status()
        .expect("run info");
    assert!(!status.success());
}

#[test]
fn test_unknown_command_fails() {
    let out = cli().arg("frobnicate").output().expect("run c3d-anim");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown command"));
}

#[test]
fn test_bad_frame_flag_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scene = dir.path().join("scene.json");
    let output = dir.path().join("out.json");
    Scene::new().save(&scene).expect("save scene");

    let out = cli()
        .args(["-q", "export"])
        .arg(&scene)
        .arg(&output)
        .args(["--start", "abc"])
        .output()
        .expect("run export");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--start expects a frame number"));
    assert!(!output.exists());

    let out = cli().args(["export", "--end"]).output().expect("run export");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--end requires a frame number"));
}
