// End-to-end tests for the `bonsai` binary: node counting, benchmark runs
// for both engines, and usage errors, all against temp files.

use std::path::PathBuf;
use std::process::{Command, Output};

use bonsai_tries::keyset::count_trie_nodes;
use tempfile::TempDir;

/// Locate the `bonsai` binary produced by Cargo.
fn bonsai_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_bonsai") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("bonsai");
    p
}

fn run_bonsai(args: &[&str]) -> Output {
    Command::new(bonsai_bin())
        .args(args)
        .output()
        .expect("failed to run bonsai")
}

/// 200 synthetic keys, a query file mixing 30 members with 20 strangers,
/// and the exact node count of the key set.
fn make_corpus(dir: &TempDir) -> (PathBuf, PathBuf, u64) {
    let keys: Vec<String> = (0..200).map(|i| format!("key{i:04}")).collect();
    let keys_path = dir.path().join("keys.txt");
    std::fs::write(&keys_path, keys.join("\n") + "\n").unwrap();

    let mut queries: Vec<String> = (0..60).step_by(2).map(|i| format!("key{i:04}")).collect();
    queries.extend((0..20).map(|i| format!("nokey{i:03}")));
    let queries_path = dir.path().join("queries.txt");
    std::fs::write(&queries_path, queries.join("\n") + "\n").unwrap();

    let mut key_bytes: Vec<Vec<u8>> = keys.iter().map(|k| k.as_bytes().to_vec()).collect();
    let num_nodes = count_trie_nodes(&mut key_bytes);
    (keys_path, queries_path, num_nodes)
}

#[test]
fn single_argument_prints_the_node_count() {
    let dir = TempDir::new().unwrap();
    let (keys_path, _, num_nodes) = make_corpus(&dir);

    let out = run_bonsai(&[keys_path.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout, format!("#nodes: {num_nodes}\n"));
}

fn assert_benchmark_output(out: Output, banner: &str) {
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains(banner), "missing banner in: {stdout}");
    assert!(stdout.contains("insert time:"), "missing insert timing: {stdout}");
    // Membership is exact: 30 members hit, 20 strangers miss.
    assert!(stdout.contains("OK: 30, NG: 20"), "wrong hit counts in: {stdout}");
    assert!(stdout.contains("search time:"), "missing search timing: {stdout}");
    assert!(stdout.contains("num slots:"), "missing stats in: {stdout}");
}

#[test]
fn dcw_benchmark_runs_end_to_end() {
    let dir = TempDir::new().unwrap();
    let (keys_path, queries_path, num_nodes) = make_corpus(&dir);

    let out = run_bonsai(&[
        keys_path.to_str().unwrap(),
        queries_path.to_str().unwrap(),
        "1",
        &num_nodes.to_string(),
        "0.5",
        "4",
    ]);
    assert_benchmark_output(out, "----- DcwTrie -----");
}

#[test]
fn pr_benchmark_runs_end_to_end() {
    let dir = TempDir::new().unwrap();
    let (keys_path, queries_path, num_nodes) = make_corpus(&dir);

    let out = run_bonsai(&[
        keys_path.to_str().unwrap(),
        queries_path.to_str().unwrap(),
        "2",
        &num_nodes.to_string(),
        "0.5",
        "4",
    ]);
    assert_benchmark_output(out, "----- PrTrie -----");
}

#[test]
fn dash_skips_the_query_phase() {
    let dir = TempDir::new().unwrap();
    let (keys_path, _, num_nodes) = make_corpus(&dir);

    let out = run_bonsai(&[
        keys_path.to_str().unwrap(),
        "-",
        "1",
        &num_nodes.to_string(),
        "0.5",
        "4",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("insert time:"));
    assert!(!stdout.contains("search time:"));
    assert!(stdout.contains("num nodes:"));
}

#[test]
fn no_arguments_is_a_usage_error() {
    let out = run_bonsai(&[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("bad usage:"));
    assert!(stderr.contains("usage:"));
}

#[test]
fn unknown_engine_type_is_a_usage_error() {
    let out = run_bonsai(&["k", "q", "9", "100", "0.5", "2"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("type must be 1 (DCW) or 2 (PR)"));
}

#[test]
fn missing_key_file_fails_cleanly() {
    let out = run_bonsai(&["/no/such/keys.txt"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("failed to open"));
}
