//! Integration tests for the roguebox CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Binary running inside `dir`, so logs and proof files land there
fn roguebox(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("roguebox").unwrap();
    cmd.current_dir(dir)
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG")
        .env_remove("ROGUEBOX_ROOT")
        .env_remove("ROGUEBOX_REPO_NAME");
    cmd
}

fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("ws");
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/main.c"), "int main(void) { return 0; }\n").unwrap();
    fs::write(root.join("README.txt"), "hello\n").unwrap();
    temp
}

#[test]
fn test_cli_help() {
    let temp = TempDir::new().unwrap();
    roguebox(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("init-repo"))
        .stdout(predicate::str::contains("push-all"))
        .stdout(predicate::str::contains("full-run"));
}

#[test]
fn test_cli_version() {
    let temp = TempDir::new().unwrap();
    roguebox(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("roguebox"));
}

#[test]
fn test_no_command_exits_1() {
    let temp = TempDir::new().unwrap();
    roguebox(temp.path()).assert().code(1);
}

#[test]
fn test_invalid_subcommand() {
    let temp = TempDir::new().unwrap();
    roguebox(temp.path())
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_scan_prints_inventory_json() {
    let temp = workspace();
    let output = roguebox(temp.path())
        .args(["scan", "--root", "ws"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let paths: Vec<&str> = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, ["README.txt", "src/main.c"]);
    assert_eq!(json["total_size"], 6 + 29);
}

#[test]
fn test_scan_honours_rogueignore_and_secrets() {
    let temp = workspace();
    let root = temp.path().join("ws");
    fs::write(root.join(".rogueignore"), "# build output\n*.o\n").unwrap();
    fs::write(root.join("main.o"), "obj").unwrap();
    fs::write(root.join("server.pem"), "-----BEGIN-----").unwrap();

    roguebox(temp.path())
        .args(["scan", "--root", "ws"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main.o").not())
        .stdout(predicate::str::contains("server.pem").not())
        .stdout(predicate::str::contains(".rogueignore"));

    roguebox(temp.path())
        .args(["scan", "--root", "ws", "--include-secrets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("server.pem"));
}

#[test]
fn test_scan_max_size() {
    let temp = workspace();
    fs::write(temp.path().join("ws/big.bin"), vec![0u8; 2 * 1024 * 1024]).unwrap();

    roguebox(temp.path())
        .args(["scan", "--root", "ws", "--max-size-mb", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("big.bin").not());
}

#[test]
fn test_scan_missing_root_exits_2() {
    let temp = TempDir::new().unwrap();
    roguebox(temp.path())
        .args(["scan", "--root", "does-not-exist"])
        .assert()
        .code(2);
}

#[test]
fn test_scan_writes_event_log() {
    let temp = workspace();
    roguebox(temp.path()).args(["scan", "--root", "ws"]).assert().success();

    let log = fs::read_to_string(temp.path().join("logs/roguebox.log")).unwrap();
    for line in log.lines() {
        let entry: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(entry["ts"].is_string());
        assert!(entry["level"].is_string());
    }
    assert!(log.contains("\"ctx\":\"scan\""));
}

#[test]
fn test_root_from_config_file() {
    let temp = workspace();
    fs::write(temp.path().join("rogue.conf"), "root=ws\nnonsense line\n").unwrap();

    roguebox(temp.path())
        .args(["--config", "rogue.conf", "scan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("src/main.c"));
}

#[test]
fn test_missing_root_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    roguebox(temp.path())
        .arg("scan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no root given"));
}

#[test]
fn test_init_repo_dry_run_touches_nothing() {
    let temp = workspace();
    roguebox(temp.path())
        .args(["init-repo", "--root", "ws", "--repo-name", "workshop", "--org", "acme", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("https://github.com/acme/workshop.git"));

    assert!(!temp.path().join("ws/.git").exists());
    assert!(!temp.path().join("ws/LICENSE").exists());
}

#[test]
fn test_init_repo_requires_repo_name() {
    let temp = workspace();
    roguebox(temp.path())
        .args(["init-repo", "--root", "ws", "--no-remote"])
        .assert()
        .code(1);
}

#[test]
fn test_private_and_public_conflict() {
    let temp = workspace();
    roguebox(temp.path())
        .args(["init-repo", "--root", "ws", "--repo-name", "w", "--private", "--public"])
        .assert()
        .failure();
}

#[test]
fn test_init_repo_local_only() {
    if which::which("git").is_err() {
        return;
    }
    let temp = workspace();
    roguebox(temp.path())
        .args(["init-repo", "--root", "ws", "--repo-name", "workshop", "--no-remote"])
        .assert()
        .success();

    let root = temp.path().join("ws");
    assert!(root.join(".git").is_dir());
    for name in [".gitignore", ".rogueignore", "LICENSE", "README.md"] {
        assert!(root.join(name).is_file(), "{name} missing");
    }
    assert!(fs::read_to_string(root.join(".rogueignore")).unwrap().contains("*.pem"));
}

#[test]
fn test_init_repo_outside_directory_exits_3() {
    if which::which("git").is_err() {
        return;
    }
    let temp = TempDir::new().unwrap();
    roguebox(temp.path())
        .args(["init-repo", "--root", "missing/dir", "--repo-name", "w", "--no-remote"])
        .assert()
        .code(3);
}

#[test]
fn test_push_all_dry_run_reports_single_mode() {
    let temp = workspace();
    roguebox(temp.path())
        .args(["push-all", "--root", "ws", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("single"))
        .stderr(predicate::str::contains("origin/main"));
}

#[test]
fn test_push_all_dry_run_lists_chunks() {
    let temp = workspace();
    fs::write(
        temp.path().join("rogue.conf"),
        "chunk_ceiling_mb=1\nchunk_trigger_mb=1\n",
    )
    .unwrap();
    let root = temp.path().join("ws");
    for name in ["a.bin", "b.bin", "c.bin"] {
        fs::write(root.join(name), vec![7u8; 700 * 1024]).unwrap();
    }

    roguebox(temp.path())
        .args(["--config", "rogue.conf", "push-all", "--root", "ws", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("chunked (~1MB)"))
        .stderr(predicate::str::contains("chunk 1: 3 files"))
        .stderr(predicate::str::contains("chunk 2: 2 files"));
}

#[test]
fn test_push_without_remote_exits_8() {
    if which::which("git").is_err() {
        return;
    }
    let temp = workspace();
    let root = temp.path().join("ws");
    std::process::Command::new("git")
        .arg("-C")
        .arg(&root)
        .arg("init")
        .output()
        .unwrap();

    roguebox(temp.path())
        .args(["push-all", "--root", "ws", "--commit-message", "import"])
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .assert()
        .code(8);
}

/// Git repository at `ws` with chunking forced at 1 MiB and two 700 KiB files
fn chunked_repo() -> TempDir {
    let temp = workspace();
    let root = temp.path().join("ws");
    std::process::Command::new("git")
        .arg("-C")
        .arg(&root)
        .arg("init")
        .output()
        .unwrap();
    fs::write(
        temp.path().join("rogue.conf"),
        "chunk_ceiling_mb=1\nchunk_trigger_mb=1\n",
    )
    .unwrap();
    for name in ["a.bin", "b.bin"] {
        fs::write(root.join(name), vec![7u8; 700 * 1024]).unwrap();
    }
    temp
}

fn chunked_push(dir: &Path) -> assert_cmd::assert::Assert {
    roguebox(dir)
        .args(["--config", "rogue.conf", "push-all", "--root", "ws", "--commit-message", "import"])
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .assert()
}

fn tracked_files(root: &Path) -> Vec<String> {
    let output = std::process::Command::new("git")
        .arg("-C")
        .arg(root)
        .arg("ls-files")
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout).lines().map(str::to_string).collect()
}

#[test]
fn test_chunked_push_skips_gitignored_files() {
    if which::which("git").is_err() {
        return;
    }
    let temp = chunked_repo();
    let root = temp.path().join("ws");
    fs::write(root.join(".gitignore"), "*.log\n").unwrap();
    fs::write(root.join("debug.log"), "noise\n").unwrap();

    // Staging succeeds; only the push fails for lack of a remote
    chunked_push(temp.path()).code(8);

    let tracked = tracked_files(&root);
    assert!(tracked.contains(&"a.bin".to_string()));
    assert!(tracked.contains(&"b.bin".to_string()));
    assert!(!tracked.contains(&"debug.log".to_string()));
}

#[cfg(unix)]
#[test]
fn test_chunked_push_with_non_utf8_name() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    if which::which("git").is_err() {
        return;
    }
    let temp = chunked_repo();
    let root = temp.path().join("ws");
    if fs::write(root.join(OsStr::from_bytes(b"caf\xe9.txt")), "x").is_err() {
        return;
    }

    chunked_push(temp.path()).code(8);
    assert!(tracked_files(&root).iter().any(|p| p == "a.bin"));
}

#[test]
fn test_full_run_dry_run() {
    let temp = workspace();
    roguebox(temp.path())
        .args(["full-run", "--root", "ws", "--repo-name", "workshop", "--org", "acme", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Would append proof of work"));

    assert!(!temp.path().join("docs/PROOF_OF_WORK.md").exists());
    assert!(!temp.path().join("ws/.git").exists());
}

#[test]
fn test_full_run_scan_failure_exits_2() {
    let temp = TempDir::new().unwrap();
    roguebox(temp.path())
        .args(["full-run", "--root", "nope", "--repo-name", "workshop", "--no-remote"])
        .assert()
        .code(2);
}

#[test]
fn test_full_run_appends_proof_even_when_push_fails() {
    if which::which("git").is_err() {
        return;
    }
    let temp = workspace();
    roguebox(temp.path())
        .args(["full-run", "--root", "ws", "--repo-name", "workshop", "--no-remote"])
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .assert()
        .code(8);

    let proof = fs::read_to_string(temp.path().join("docs/PROOF_OF_WORK.md")).unwrap();
    assert!(proof.starts_with("# PROOF OF WORK\n\nGenerated at: "));
    assert!(proof.contains("src/main.c"));
}
