use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn fin_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fin"))
}

fn setup_test_env(with_feedback: bool) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let mut config_content = format!(
        r#"[index]
path = "{}/data/vector_store"

[retrieval]
top_k = 6
"#,
        root.display()
    );
    if with_feedback {
        config_content.push_str(&format!(
            "\n[feedback]\npath = \"{}/data/feedback.sqlite\"\n",
            root.display()
        ));
    }

    let config_path = config_dir.join("fin.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_fin(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = fin_binary();
    let output = Command::new(&binary)
        .current_dir(config_path.parent().unwrap())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("GROQ_API_KEY")
        .env_remove("TAVILY_API_KEY")
        .env_remove("FINNHUB_API_KEY")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run fin binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_help_lists_commands() {
    let output = Command::new(fin_binary()).arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for command in ["ask", "chat", "ingest", "docs", "feedback"] {
        assert!(stdout.contains(command), "missing {} in help:\n{}", command, stdout);
    }
}

#[test]
fn test_docs_without_index_fails_cleanly() {
    let (_tmp, config) = setup_test_env(false);
    let (_stdout, stderr, success) = run_fin(&config, &["docs", "What is Section 11?"]);
    assert!(!success);
    assert!(stderr.contains("run ingestion first"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_is_rejected() {
    let (_tmp, config) = setup_test_env(false);
    fs::write(&config, "[chunking]\nchunk_size = 100\nchunk_overlap = 200\n").unwrap();
    let (_stdout, stderr, success) = run_fin(&config, &["feedback", "count"]);
    assert!(!success);
    assert!(stderr.contains("chunk_overlap"), "stderr: {}", stderr);
}

#[test]
fn test_feedback_disabled_without_path() {
    let (_tmp, config) = setup_test_env(false);
    let (_stdout, stderr, success) = run_fin(&config, &["feedback", "count"]);
    assert!(!success);
    assert!(stderr.contains("Feedback logging is disabled"), "stderr: {}", stderr);
}

#[test]
fn test_feedback_add_then_count() {
    let (_tmp, config) = setup_test_env(true);
    let (stdout, stderr, success) = run_fin(
        &config,
        &[
            "feedback",
            "add",
            "--query",
            "budget for 50k",
            "--answer",
            "Save 10,000 a month.",
            "--rating",
            "up",
        ],
    );
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("Recorded feedback"));

    let (stdout, _stderr, success) = run_fin(&config, &["feedback", "count"]);
    assert!(success);
    assert_eq!(stdout.trim(), "1");
}

#[test]
fn test_ask_degrades_without_credentials() {
    let (_tmp, config) = setup_test_env(false);
    let (stdout, stderr, success) = run_fin(&config, &["ask", "my salary is 60000"]);
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("\"income\": 60000.0"), "stdout: {}", stdout);
    assert!(stdout.contains("(Formatting unavailable:"));
    assert!(stderr.contains("GROQ_API_KEY missing"));
}
