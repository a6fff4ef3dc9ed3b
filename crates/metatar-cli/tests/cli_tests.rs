//! Integration tests for metatar-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn metatar_cmd() -> Command {
    cargo_bin_cmd!("metatar")
}

fn append(builder: &mut tar::Builder<Vec<u8>>, path: &str, kind: tar::EntryType, mode: u32, data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(kind);
    header.set_mode(mode);
    header.set_size(data.len() as u64);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root").unwrap();
    header.set_groupname("root").unwrap();
    builder.append_data(&mut header, path, data).unwrap();
}

/// Writes a small root filesystem tarball and returns its path.
fn rootfs(dir: &Path) -> PathBuf {
    let mut builder = tar::Builder::new(Vec::new());
    append(&mut builder, "etc/", tar::EntryType::Directory, 0o755, &[]);
    append(&mut builder, "etc/motd", tar::EntryType::Regular, 0o644, b"hello\n");
    append(&mut builder, "bin/init", tar::EntryType::Regular, 0o755, b"#!/bin/sh\n");
    let path = dir.join("rootfs.tar");
    fs::write(&path, builder.into_inner().unwrap()).unwrap();
    path
}

fn save(archive: &Path, yaml: &Path) {
    metatar_cmd()
        .arg("save")
        .arg(archive)
        .arg(yaml)
        .assert()
        .success();
}

fn tar_names(path: &Path) -> Vec<String> {
    let bytes = fs::read(path).unwrap();
    let mut archive = tar::Archive::new(io::Cursor::new(bytes));
    archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_version_flag() {
    metatar_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("metatar"));
}

#[test]
fn test_help_lists_subcommands() {
    metatar_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("save"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("merge"));
}

#[test]
fn test_apply_help() {
    metatar_cmd()
        .arg("apply")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--cpio"))
        .stdout(predicate::str::contains("--noskip"));
}

#[test]
fn test_save_writes_yaml() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());
    let yaml = temp.path().join("rootfs.yml");

    metatar_cmd()
        .arg("save")
        .arg(&archive)
        .arg(&yaml)
        .assert()
        .success()
        .stdout(predicate::str::contains("Metadata saved"));

    let doc: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&yaml).unwrap()).unwrap();
    let contents = doc["Contents"].as_sequence().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[1]["Filename"].as_str(), Some("etc/motd"));
}

#[test]
fn test_save_refuses_overwrite_without_force() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());
    let yaml = temp.path().join("rootfs.yml");
    fs::write(&yaml, "keep").unwrap();

    metatar_cmd()
        .arg("save")
        .arg(&archive)
        .arg(&yaml)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(&yaml).unwrap(), "keep");

    metatar_cmd()
        .arg("save")
        .arg("-f")
        .arg(&archive)
        .arg(&yaml)
        .assert()
        .success();
    assert!(fs::read_to_string(&yaml).unwrap().contains("etc/motd"));
}

#[test]
fn test_yaml_prints_document() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());

    metatar_cmd()
        .arg("yaml")
        .arg("-d")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Filename: etc/motd"))
        .stdout(predicate::str::contains("aGVsbG8K"));
}

#[test]
fn test_yaml_nouser_omits_owner() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());

    metatar_cmd()
        .arg("yaml")
        .arg("-n")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Username").not());
}

#[test]
fn test_apply_round_trip_tar() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());
    let yaml = temp.path().join("rootfs.yml");
    save(&archive, &yaml);

    let output = temp.path().join("out.tar");
    metatar_cmd()
        .arg("apply")
        .arg(&archive)
        .arg(&yaml)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive written"));

    let names = tar_names(&output);
    assert!(names.contains(&"etc/motd".to_string()));
    assert!(names.contains(&"bin/init".to_string()));
}

#[test]
fn test_apply_skip_and_cpio_listing() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());
    let yaml = temp.path().join("rootfs.yml");
    fs::write(
        &yaml,
        "SkipList:\n- bin/*\nContents:\n- Filename: etc/motd\n  Mode: \"0600\"\n",
    )
    .unwrap();

    let output = temp.path().join("initrd.cpio");
    metatar_cmd()
        .arg("apply")
        .arg("-c")
        .arg("--mtime")
        .arg("0")
        .arg(&archive)
        .arg(&yaml)
        .arg(&output)
        .assert()
        .success();

    metatar_cmd()
        .arg("list")
        .arg("-l")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("-0600"))
        .stdout(predicate::str::contains("etc/motd"))
        .stdout(predicate::str::contains("bin/").not());
}

#[test]
fn test_apply_size_mismatch_fails_with_hint() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());
    let yaml = temp.path().join("bad.yml");
    fs::write(&yaml, "Contents:\n- Filename: a\n  Body: aGk=\n  Size: 9\n").unwrap();
    let output = temp.path().join("out.tar");

    metatar_cmd()
        .arg("apply")
        .arg("-d")
        .arg(&archive)
        .arg(&yaml)
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("HINT"));
    assert!(!output.exists());
}

#[test]
fn test_generate_cpio() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let yaml = temp.path().join("gen.yml");
    fs::write(
        &yaml,
        "Contents:\n- Filename: etc/hostname\n  Mode: \"0644\"\n  Body: Ym94Cg==\n",
    )
    .unwrap();
    let output = temp.path().join("gen.cpio");

    metatar_cmd()
        .arg("generate")
        .arg("-c")
        .arg(&yaml)
        .arg(&output)
        .assert()
        .success();

    metatar_cmd()
        .arg("list")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::eq("etc/\netc/hostname\n"));
}

#[test]
fn test_merge_overlay_wins() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let base = temp.path().join("base.yml");
    let overlay = temp.path().join("overlay.yml");
    fs::write(
        &base,
        "Contents:\n- Filename: a\n  Mode: \"0644\"\n- Filename: b\n  Mode: \"0644\"\n",
    )
    .unwrap();
    fs::write(
        &overlay,
        "Contents:\n- Filename: b\n  Mode: \"0600\"\n- Filename: c\n  Mode: \"0644\"\n",
    )
    .unwrap();
    let output = temp.path().join("merged.yml");

    metatar_cmd()
        .arg("merge")
        .arg(&base)
        .arg(&overlay)
        .arg(&output)
        .assert()
        .success();

    let doc: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let contents = doc["Contents"].as_sequence().unwrap();
    let names: Vec<_> = contents
        .iter()
        .map(|e| e["Filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert_eq!(contents[1]["Mode"].as_str(), Some("0600"));
}

#[test]
fn test_list_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());

    let output = metatar_cmd()
        .arg("--json")
        .arg("list")
        .arg("-l")
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "list");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["format"], "tar");
    assert_eq!(json["data"]["total_entries"], 3);
    assert_eq!(json["data"]["entries"][0]["kind"], "directory");
}

#[test]
fn test_json_error_output() {
    let temp = TempDir::new().expect("failed to create temp dir");

    let output = metatar_cmd()
        .arg("-j")
        .arg("list")
        .arg(temp.path().join("missing.tar"))
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().contains("I/O error"));
}

#[test]
fn test_quiet_suppresses_summary() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = rootfs(temp.path());
    let yaml = temp.path().join("rootfs.yml");

    metatar_cmd()
        .arg("-q")
        .arg("save")
        .arg(&archive)
        .arg(&yaml)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    metatar_cmd()
        .args(["-v", "-q", "list", "a.tar"])
        .assert()
        .failure();
}

#[test]
fn test_completion_bash() {
    metatar_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("metatar"));
}
