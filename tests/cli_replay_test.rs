//! Runs the `mudmap` binary over a small transcript
//!
//! The transcript format is the one the binary documents: lines starting with
//! "> " are commands, everything else is game output.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

const TRANSCRIPT: &str = "\
\x1b[1;36mTemple Square\x1b[0m
You stand in a quiet square.
[Exits: north]
> north
Market Street
Stalls line the street.
[Exits: north south]
> north
City Gate
The gate is shut.
[Exits: south]
> east
You can't go that way.
";

fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mudmap-cli-{}-{}", std::process::id(), name))
}

#[test]
fn test_replay_transcript() {
    let transcript = temp_file("session.log");
    let map_path = temp_file("map.json");
    fs::write(&transcript, TRANSCRIPT).unwrap();
    fs::remove_file(&map_path).ok();

    let output = Command::new(env!("CARGO_BIN_EXE_mudmap"))
        .arg(&transcript)
        .args(["--map"])
        .arg(&map_path)
        .args(["--goto", "1", "--nearby", "1"])
        .output()
        .expect("Failed to run mudmap");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "mudmap failed: {}", stdout);
    assert!(stdout.contains("[1] Temple Square"), "Missing first room:\n{}", stdout);
    assert!(stdout.contains("[2] Market Street"), "Missing second room:\n{}", stdout);
    assert!(stdout.contains("[3] City Gate"), "Missing third room:\n{}", stdout);
    assert!(stdout.contains("[-] no exit east"), "Missing failed move:\n{}", stdout);
    assert!(stdout.contains("south, south"), "Missing route:\n{}", stdout);
    assert!(stdout.contains("Market Street\n"), "Missing nearby room:\n{}", stdout);

    let saved = fs::read_to_string(&map_path).unwrap();
    assert!(saved.contains("room_numbering"));
    assert!(saved.contains("city gate|the gate is shut.|south|2"));

    fs::remove_file(&transcript).ok();
    fs::remove_file(&map_path).ok();
}

#[test]
fn test_missing_transcript_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_mudmap"))
        .arg(temp_file("no-such-transcript.log"))
        .output()
        .expect("Failed to run mudmap");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot read transcript"));
}

#[test]
fn test_no_arguments_prints_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_mudmap"))
        .output()
        .expect("Failed to run mudmap");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage:"));
}
