use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

fn make_vault_dir(root: &std::path::Path) -> std::path::PathBuf {
    let v = root.join("v");
    fs::create_dir(&v).unwrap();
    fs::write(v.join("a.txt"), b"hello").unwrap();
    fs::create_dir(v.join("sub")).unwrap();
    fs::write(v.join("sub").join("b.bin"), [0x00, 0xFF, 0x7F, 0x80]).unwrap();
    v
}

#[test]
fn plain_round_trip() {
    let dir = tempdir().unwrap();
    let v = make_vault_dir(dir.path());

    Command::cargo_bin("vault").unwrap()
        .arg("close").arg("--vault").arg(&v)
        .assert().success();

    let archive = dir.path().join("v.vlt");
    assert!(archive.exists());
    assert!(!v.exists());
    assert_eq!(&fs::read(&archive).unwrap()[..7], b"<vault ");

    Command::cargo_bin("vault").unwrap()
        .arg("open").arg("--vault").arg(&archive)
        .assert().success();

    assert!(!archive.exists());
    assert_eq!(fs::read(v.join("a.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(v.join("sub").join("b.bin")).unwrap(), vec![0x00, 0xFF, 0x7F, 0x80]);
}

#[test]
fn encrypted_round_trip() {
    let dir = tempdir().unwrap();
    let v_root = dir.path().join("v");
    fs::create_dir(&v_root).unwrap();
    fs::write(v_root.join("a"), b"secret").unwrap();

    Command::cargo_bin("vault").unwrap()
        .arg("close").arg("--vault").arg(&v_root).arg("--encrypt")
        .env("VAULT_PASSWORD", "P@ss")
        .assert().success();

    let archive = dir.path().join("v.vlt");
    assert_eq!(&fs::read(&archive).unwrap()[..11], b"<encrypted ");

    Command::cargo_bin("vault").unwrap()
        .arg("open").arg("--vault").arg(&archive)
        .env("VAULT_PASSWORD", "P@ss")
        .assert().success();

    assert_eq!(fs::read(v_root.join("a")).unwrap(), b"secret");
}

#[test]
fn wrong_password_fails_with_nonzero_exit() {
    let dir = tempdir().unwrap();
    let v_root = dir.path().join("v");
    fs::create_dir(&v_root).unwrap();
    fs::write(v_root.join("a"), b"secret").unwrap();

    Command::cargo_bin("vault").unwrap()
        .arg("close").arg("--vault").arg(&v_root).arg("--encrypt")
        .env("VAULT_PASSWORD", "correct")
        .assert().success();

    let archive = dir.path().join("v.vlt");
    Command::cargo_bin("vault").unwrap()
        .arg("open").arg("--vault").arg(&archive)
        .env("VAULT_PASSWORD", "wrong")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    assert!(archive.exists());
}

#[test]
fn bad_base64_fails_and_leaves_archive_unchanged() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("bad.vlt");
    let content = br#"<vault name="x"><file name="f" data="@@@@"/></vault>"#;
    fs::write(&archive, content).unwrap();

    Command::cargo_bin("vault").unwrap()
        .arg("open").arg("--vault").arg(&archive)
        .assert()
        .failure();

    assert_eq!(fs::read(&archive).unwrap(), content);
}

#[test]
fn unknown_tag_fails() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("bad.vlt");
    fs::write(&archive, br#"<vault name="x"><link name="l"/></vault>"#).unwrap();

    Command::cargo_bin("vault").unwrap()
        .arg("open").arg("--vault").arg(&archive)
        .assert()
        .failure();
}

#[cfg(unix)]
#[test]
fn symlink_rejected_and_directory_unchanged() {
    let dir = tempdir().unwrap();
    let v = make_vault_dir(dir.path());
    std::os::unix::fs::symlink(v.join("a.txt"), v.join("l")).unwrap();

    Command::cargo_bin("vault").unwrap()
        .arg("close").arg("--vault").arg(&v)
        .assert()
        .failure();

    assert!(v.exists());
    assert!(v.join("l").exists());
}

#[test]
fn refuses_open_on_directory_and_close_on_file() {
    let dir = tempdir().unwrap();
    let v = make_vault_dir(dir.path());

    Command::cargo_bin("vault").unwrap()
        .arg("open").arg("--vault").arg(&v)
        .assert()
        .failure();

    Command::cargo_bin("vault").unwrap()
        .arg("close").arg("--vault").arg(&v)
        .assert().success();

    let archive = dir.path().join("v.vlt");
    Command::cargo_bin("vault").unwrap()
        .arg("close").arg("--vault").arg(&archive)
        .assert()
        .failure();
}

#[test]
fn no_args_prints_usage() {
    Command::cargo_bin("vault").unwrap()
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE"));
}

#[test]
fn version_flag_prints_version() {
    Command::cargo_bin("vault").unwrap()
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn positional_vault_argument_round_trip() {
    let dir = tempdir().unwrap();
    let v = make_vault_dir(dir.path());

    Command::cargo_bin("vault").unwrap()
        .arg("close").arg(&v)
        .assert()
        .success();

    let archive = dir.path().join("v.vlt");
    assert!(archive.exists());
    assert!(!v.exists());

    Command::cargo_bin("vault").unwrap()
        .arg("open").arg(&archive)
        .assert()
        .success();

    assert!(!archive.exists());
    assert_eq!(fs::read(v.join("a.txt")).unwrap(), b"hello");
}

#[test]
fn empty_destination_treated_as_source_directory() {
    let dir = tempdir().unwrap();
    let v = make_vault_dir(dir.path());

    Command::cargo_bin("vault").unwrap()
        .arg("close").arg("--vault").arg(&v).arg("--destination").arg("")
        .assert()
        .success();

    let archive = dir.path().join("v.vlt");
    assert!(archive.exists());

    Command::cargo_bin("vault").unwrap()
        .arg("open").arg("--vault").arg(&archive).arg("--destination").arg("")
        .assert()
        .success();

    assert_eq!(fs::read(v.join("a.txt")).unwrap(), b"hello");
}
