//! End-to-end runs of the `xidlog` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;

fn xidlog(ledger: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xidlog"))
        .arg("--path")
        .arg(ledger)
        .args(args)
        .output()
        .expect("failed to run xidlog")
}

fn ledger_bytes(counter: u64, body: &[u8]) -> Vec<u8> {
    let mut data = counter.to_be_bytes().to_vec();
    data.extend_from_slice(body);
    data
}

fn write_ledger(dir: &Path, counter: u64, body: &[u8]) -> PathBuf {
    let path = dir.join("tm.xid");
    fs::write(&path, ledger_bytes(counter, body)).unwrap();
    path
}

#[test]
fn commit_on_mismatched_ledger_exits_fatally() {
    let dir = tempdir().unwrap();
    let path = write_ledger(dir.path(), 3, &[1, 1]);

    let output = xidlog(&path, &["commit", "1"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fatal:"), "stderr: {stderr}");
    assert!(stderr.contains("structural corruption"), "stderr: {stderr}");
    assert_eq!(fs::read(&path).unwrap(), ledger_bytes(3, &[1, 1]));
}

#[test]
fn lifecycle_commands_update_the_ledger() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tm.xid");

    assert!(xidlog(&path, &["create"]).status.success());

    let begin = xidlog(&path, &["begin"]);
    assert!(begin.status.success());
    assert_eq!(String::from_utf8_lossy(&begin.stdout).trim(), "1");

    assert!(xidlog(&path, &["begin"]).status.success());
    assert!(xidlog(&path, &["commit", "2"]).status.success());
    assert!(xidlog(&path, &["abort", "1"]).status.success());

    let status = xidlog(&path, &["status", "2"]);
    assert!(status.status.success());
    assert_eq!(String::from_utf8_lossy(&status.stdout).trim(), "xid:2: committed");

    assert_eq!(fs::read(&path).unwrap(), ledger_bytes(2, &[2, 1]));
}

#[test]
fn commit_of_unallocated_xid_exits_fatally() {
    let dir = tempdir().unwrap();
    let path = write_ledger(dir.path(), 1, &[0]);

    let output = xidlog(&path, &["commit", "5"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(fs::read(&path).unwrap(), ledger_bytes(1, &[0]));
}

#[cfg(unix)]
#[test]
fn read_commands_accept_an_unwritable_ledger() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = write_ledger(dir.path(), 2, &[1, 0]);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

    assert!(xidlog(&path, &["verify"]).status.success());

    let inspect = xidlog(&path, &["inspect", "--format", "json"]);
    assert!(inspect.status.success());
    let report: serde_json::Value = serde_json::from_slice(&inspect.stdout).unwrap();
    assert_eq!(report["counter"], 2);
    assert_eq!(report["committed"], 1);
    assert_eq!(report["active"], 1);

    let status = xidlog(&path, &["status", "1"]);
    assert_eq!(String::from_utf8_lossy(&status.stdout).trim(), "xid:1: committed");
}
