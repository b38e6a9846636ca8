use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;

fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let decoder = png::Decoder::new(bytes);
    let reader = decoder.read_info().expect("png header");
    let info = reader.info();
    (info.width, info.height)
}

#[test]
fn zero_arguments_write_avd_architecture_png() {
    let tmp = tempfile::tempdir().expect("tempdir");

    let exe = assert_cmd::cargo_bin!("archdiag");
    let output = Command::new(&exe)
        .current_dir(tmp.path())
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert_eq!(stdout.trim_end(), "Diagram generated: avd-architecture.png");

    let bytes = fs::read(tmp.path().join("avd-architecture.png")).expect("read png");
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "output is not a PNG"
    );
    let (w, h) = png_dimensions(&bytes);
    assert!(w > 0 && h > 0, "empty raster ({w}x{h})");
}

#[test]
fn rerunning_overwrites_the_artifact() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let target = tmp.path().join("avd-architecture.png");
    fs::write(&target, b"stale").expect("seed file");

    let exe = assert_cmd::cargo_bin!("archdiag");
    for _ in 0..2 {
        Command::new(&exe)
            .current_dir(tmp.path())
            .assert()
            .success();
        let bytes = fs::read(&target).expect("read png");
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }
}

#[test]
fn format_flag_changes_the_extension() {
    let tmp = tempfile::tempdir().expect("tempdir");

    let exe = assert_cmd::cargo_bin!("archdiag");
    Command::new(&exe)
        .args(["render", "--format", "svg", "--out-dir"])
        .arg(tmp.path())
        .assert()
        .success();

    let svg = fs::read_to_string(tmp.path().join("avd-architecture.svg")).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Session Host"));
    assert!(!tmp.path().join("avd-architecture.png").exists());
}

#[test]
fn out_path_with_extension_writes_into_its_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let work = tempfile::tempdir().expect("tempdir");
    let target = tmp.path().join("lab.svg");

    let exe = assert_cmd::cargo_bin!("archdiag");
    Command::new(&exe)
        .current_dir(work.path())
        .arg("--out")
        .arg(&target)
        .assert()
        .success();

    let svg = fs::read_to_string(&target).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert!(!work.path().join("lab.svg").exists());
}

#[test]
fn print_commands_write_to_stdout() {
    let exe = assert_cmd::cargo_bin!("archdiag");

    let output = Command::new(&exe).arg("dot").assert().success().get_output().clone();
    let dot = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(dot.starts_with("digraph \"Azure Virtual Desktop - RemoteApp Lab\" {"));
    assert_eq!(dot.matches(" -> ").count(), 9);

    let output = Command::new(&exe).arg("layout").assert().success().get_output().clone();
    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).expect("layout json");
    assert_eq!(layout["nodes"].as_array().map(Vec::len), Some(10));
    assert_eq!(layout["clusters"].as_array().map(Vec::len), Some(8));

    let output = Command::new(&exe).arg("scene").assert().success().get_output().clone();
    let scene: serde_json::Value = serde_json::from_slice(&output.stdout).expect("scene json");
    assert_eq!(scene["edges"].as_array().map(Vec::len), Some(9));
}

#[test]
fn usage_errors_exit_with_code_2() {
    let exe = assert_cmd::cargo_bin!("archdiag");
    Command::new(&exe)
        .args(["--format", "gif"])
        .assert()
        .code(2);
}

#[test]
fn unwritable_output_fails_with_code_1() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let exe = assert_cmd::cargo_bin!("archdiag");
    Command::new(&exe)
        .arg("--out-dir")
        .arg(tmp.path().join("missing"))
        .assert()
        .code(1);
}
