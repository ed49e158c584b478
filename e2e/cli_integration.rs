// e2e/cli_integration.rs: the `lz4pack` binary as a black box.
//
// Covers mode selection (flags and the .lz4p extension), output naming,
// overwrite protection, standard streams, exit codes and bench mode.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Locate the `lz4pack` binary produced by Cargo.
fn lz4pack_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_lz4pack") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("lz4pack");
    p
}

fn make_temp_input() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, "Hello, lz4pack!\n".repeat(5000)).unwrap();
    (dir, input)
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(lz4pack_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run lz4pack")
}

fn run_with_stdin(dir: &Path, args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(lz4pack_bin())
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn lz4pack");
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

// ── Round trips ──────────────────────────────────────────────────────────────

#[test]
fn explicit_names_round_trip() {
    let (dir, input) = make_temp_input();
    let original = fs::read(&input).unwrap();

    let out = run(dir.path(), &["-z", "input.txt", "packed.bin"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let packed = fs::read(dir.path().join("packed.bin")).unwrap();
    assert!(packed.len() < original.len());
    assert_eq!(lz4pack::decompress(&packed).unwrap(), original);

    let out = run(dir.path(), &["-d", "packed.bin", "restored.txt"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(dir.path().join("restored.txt")).unwrap(), original);
}

#[test]
fn extension_drives_default_names() {
    let (dir, input) = make_temp_input();
    let original = fs::read(&input).unwrap();

    assert!(run(dir.path(), &["input.txt"]).status.success());
    let packed = dir.path().join("input.txt.lz4p");
    assert!(packed.exists());

    fs::remove_file(&input).unwrap();
    assert!(run(dir.path(), &["input.txt.lz4p"]).status.success());
    assert_eq!(fs::read(&input).unwrap(), original);
}

#[test]
fn stdin_to_stdout_round_trip() {
    let dir = TempDir::new().unwrap();
    let data = b"piped through standard streams ".repeat(3000);

    let packed = run_with_stdin(dir.path(), &["-z"], &data);
    assert!(packed.status.success());
    assert_eq!(lz4pack::decompress(&packed.stdout).unwrap(), data);

    let unpacked = run_with_stdin(dir.path(), &["-d"], &packed.stdout);
    assert!(unpacked.status.success());
    assert_eq!(unpacked.stdout, data);
}

#[test]
fn stdout_flag_writes_no_file() {
    let (dir, input) = make_temp_input();
    let original = fs::read(&input).unwrap();
    let out = run(dir.path(), &["-c", "input.txt"]);
    assert!(out.status.success());
    assert!(!dir.path().join("input.txt.lz4p").exists());
    assert_eq!(lz4pack::decompress(&out.stdout).unwrap(), original);
}

#[test]
fn tuning_flags_still_round_trip() {
    let (dir, input) = make_temp_input();
    let original = fs::read(&input).unwrap();
    let out = run(
        dir.path(),
        &["-z", "--block-size", "1000", "--memory-usage", "12", "--wide", "input.txt", "tuned.lz4p"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let packed = fs::read(dir.path().join("tuned.lz4p")).unwrap();
    let (first_block, _) = lz4pack::packed_lengths(&packed);
    assert_eq!(first_block, 1000);
    assert_eq!(lz4pack::decompress(&packed).unwrap(), original);
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[test]
fn existing_output_needs_force() {
    let (dir, _input) = make_temp_input();
    fs::write(dir.path().join("input.txt.lz4p"), b"keep me").unwrap();

    let out = run(dir.path(), &["input.txt"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(fs::read(dir.path().join("input.txt.lz4p")).unwrap(), b"keep me");

    let out = run(dir.path(), &["-f", "input.txt"]);
    assert!(out.status.success());
    assert_ne!(fs::read(dir.path().join("input.txt.lz4p")).unwrap(), b"keep me");
}

#[test]
fn corrupt_input_fails_and_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let mut packed = lz4pack::compress(&b"abcdefgh".repeat(1000)).unwrap();
    packed.truncate(packed.len() - 4);
    fs::write(dir.path().join("bad.lz4p"), &packed).unwrap();

    let out = run(dir.path(), &["bad.lz4p"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("bad").exists());
    assert!(!out.stderr.is_empty());
}

#[test]
fn unpack_without_extension_needs_output_name() {
    let (dir, _input) = make_temp_input();
    let out = run(dir.path(), &["-d", "input.txt"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &["no-such-file"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn out_of_range_memory_usage_is_a_usage_error() {
    let (dir, _input) = make_temp_input();
    let out = run(dir.path(), &["--memory-usage", "30", "input.txt"]);
    assert_eq!(out.status.code(), Some(2));
}

// ── Bench mode ───────────────────────────────────────────────────────────────

#[test]
fn bench_reports_and_writes_nothing() {
    let (dir, _input) = make_temp_input();
    let out = run(dir.path(), &["-b", "-i", "1", "input.txt"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stderr).contains("MB/s"));
    assert!(!dir.path().join("input.txt.lz4p").exists());
}
