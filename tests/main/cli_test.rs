//! CLI contract tests against the built binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;

fn stylesim(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stylesim").expect("binary should build");
    cmd.current_dir(workdir)
        .env_remove("STYLESIM_CONFIG")
        .env_remove("STYLESIM_BASE_MODEL")
        .env_remove("STYLESIM_EDIT_MODEL")
        .env_remove("STYLESIM_OUTPUT_DIR")
        .env_remove("STYLESIM_NUM_EXAMPLES")
        .env_remove("OPENAI_API_KEY");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("command should run");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let stdout = stdout_of(stylesim(dir.path()).arg("--help"));
    for sub in ["run", "stats", "prompt"] {
        assert!(stdout.contains(sub), "missing {sub} in help");
    }
}

#[test]
fn prompt_prints_direct_and_base_prompts() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let stdout = stdout_of(stylesim(dir.path()).args([
        "prompt",
        "--task",
        "summarization",
        "--dataset",
        "cnn_dailymail",
        "--user",
        "user1",
        "--text",
        "The council approved the budget.",
    ]));

    assert!(stdout.contains("=== direct prompt (user1) ==="));
    assert!(stdout.contains("=== base prompt ==="));
    assert!(stdout.contains("Article:\nThe council approved the budget."));
    assert!(stdout.contains("following the dataset guidelines."));
}

#[test]
fn prompt_reads_document_from_file() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let input = dir.path().join("notes.txt");
    fs::write(&input, "Standup moved to 10am.").expect("input should be written");

    let stdout = stdout_of(stylesim(dir.path()).args([
        "prompt",
        "--task",
        "email-writing",
        "--dataset",
        "slf5k",
        "--user",
        "user2",
        "--input",
    ]).arg(&input));
    assert!(stdout.contains("Notes:\nStandup moved to 10am."));
}

#[test]
fn prompt_rejects_unknown_user() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let output = stylesim(dir.path())
        .args([
            "prompt", "--task", "summarization", "--dataset", "cnn_dailymail", "--user",
            "nobody", "--text", "x",
        ])
        .output()
        .expect("command should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown user 'nobody'"));
}

#[test]
fn prompt_uses_users_from_config_file() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    fs::write(
        dir.path().join("stylesim.toml"),
        "[preferences.users]\nuser9 = [\"formal\"]\n",
    )
    .expect("config should be written");

    let stdout = stdout_of(stylesim(dir.path()).args([
        "prompt", "--task", "summarization", "--dataset", "xsum", "--user", "user9", "--text",
        "Body.",
    ]));
    assert!(stdout.contains("=== direct prompt (user9) ==="));
}

#[test]
fn stats_reads_local_jsonl() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let input = dir.path().join("docs.jsonl");
    fs::write(
        &input,
        "{\"id\": 1, \"text\": \"one two three\"}\n{\"id\": 2, \"text\": \"four five\"}\n{\"id\": 3, \"text\": \"six\"}\n",
    )
    .expect("input should be written");

    let stdout = stdout_of(
        stylesim(dir.path())
            .args(["stats", "--dataset", "local", "--samples", "3", "--input"])
            .arg(&input),
    );
    assert!(stdout.contains("Dataset: local"));
    assert!(stdout.contains("Examples: 3"));
    assert!(stdout.contains("min 1, max 3, mean 2.0"));
    assert!(stdout.contains("user3: 1"));
}

#[test]
fn stats_rejects_unknown_dataset_without_input() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let output = stylesim(dir.path())
        .args(["stats", "--dataset", "nope"])
        .output()
        .expect("command should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown dataset 'nope'"));
    assert!(stderr.contains("cnn_dailymail"));
}

#[test]
fn run_without_api_key_fails_fast() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let output = stylesim(dir.path())
        .args(["run", "--single-stage", "--test-samples", "1", "--env-file", "missing.env"])
        .output()
        .expect("command should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("OPENAI_API_KEY"));
}

#[test]
fn run_with_unreachable_model_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    fs::write(
        dir.path().join("stylesim.toml"),
        "[providers]\nollama_base_url = \"http://127.0.0.1:9\"\n\n[tasks]\nsummarization = [\"cnn_dailymail\"]\n",
    )
    .expect("config should be written");
    let input = dir.path().join("docs.jsonl");
    fs::write(&input, "{\"id\": \"a\", \"text\": \"Body.\"}\n").expect("input should be written");

    let output = stylesim(dir.path())
        .args([
            "run",
            "--single-stage",
            "--edit-model",
            "ollama/phi4-mini",
            "--test-samples",
            "1",
            "--env-file",
            "missing.env",
            "--input",
        ])
        .arg(&input)
        .output()
        .expect("command should run");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total: 0 records, 1 failed examples"));
    assert!(!dir.path().join("synthesized").exists());
    assert!(dir.path().join("logs").exists());
}
