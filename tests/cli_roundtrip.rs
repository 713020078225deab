use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCE: &str = concat!(
    r#"{"type":"user","id":"u1","streamId":"s1","timestamp":"2025-01-20T10:00:00Z","parentId":null,"message":{"role":"user","content":"fix the build"},"workingDirectory":"/home/alice/proj","clientVersion":"1.4.0"}"#,
    "\n",
    r#"{"type":"assistant","id":"a1","streamId":"s1","timestamp":"2025-01-20T10:00:05Z","parentId":"u1","snapshot":{"reasoning":"think hard","entries":[{"role":"assistant","text":"/home/alice/proj/src/a.ts contains api_key: \"abcdef12345678\""}]}}"#,
    "\n",
    "{broken\n",
    r#"{"type":"assistant","id":"a2","streamId":"s1","timestamp":"2025-01-20T10:00:09Z","parentId":"a1","response":{"model":"m","id":"r1","stopReason":"end","usage":{"inputTokens":3,"outputTokens":4},"blocks":[{"tag":"reasoning","text":"hidden"},{"tag":"text","text":"done"},{"tag":"tool-use","name":"shell","input":{"cmd":"ls"}}]}}"#,
    "\n",
    r#"{"type":"file-snapshot","id":"f1","streamId":"s1","timestamp":"2025-01-20T10:00:10Z","parentId":"a2","isUpdate":false,"snapshot":{"entries":[{"path":"/home/alice/proj/src/a.ts"}]}}"#,
    "\n",
);

struct CliTestEnv {
    temp_dir: TempDir,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        fs::write(temp_dir.path().join("source.jsonl"), SOURCE).expect("failed to seed source");
        Self { temp_dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tshare").expect("binary builds");
        cmd.env("HOME", self.path("home"))
            .env("TSHARE_STORE", self.path("shares"))
            .env("TSHARE_PROJECTS_DIR", self.path("projects"))
            .env_remove("RUST_LOG");
        cmd
    }
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

fn read_lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("file exists")
        .lines()
        .map(|line| serde_json::from_str(line).expect("line is JSON"))
        .collect()
}

#[test]
fn export_to_file_sanitizes() {
    let env = CliTestEnv::new();
    let out = env.path("out/shared.jsonl");

    let assert = env
        .cmd()
        .args(["export", "--json", "--output"])
        .arg(&out)
        .arg(env.path("source.jsonl"))
        .assert()
        .success();
    let result = stdout_json(&assert.get_output().stdout);
    assert_eq!(result["stats"]["messages"], 4);
    assert_eq!(result["stats"]["skipped_lines"], 1);

    let text = fs::read_to_string(&out).unwrap();
    assert!(!text.contains("/home/alice"));
    assert!(!text.contains("think hard"));
    assert!(!text.contains("hidden"));
    assert!(!text.contains("abcdef12345678"));

    let lines = read_lines(&out);
    assert_eq!(lines[0]["workingDirectory"], ".");
    assert_eq!(lines[1]["snapshot"]["reasoning"], Value::Null);
    assert_eq!(
        lines[1]["snapshot"]["entries"][0]["text"],
        r#"src/a.ts contains api_key: "[REDACTED]""#
    );
    let blocks = lines[2]["response"]["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1]["input"]["cmd"], "ls");
    assert_eq!(lines[3]["snapshot"]["entries"][0]["path"], "src/a.ts");

    let meta: Value =
        serde_json::from_str(&fs::read_to_string(env.path("out/shared.meta.json")).unwrap())
            .unwrap();
    assert_eq!(meta["messageCount"], 4);
    assert_eq!(meta["streamId"], "s1");
}

#[test]
fn export_then_import_share() {
    let env = CliTestEnv::new();

    let assert = env
        .cmd()
        .args(["export", "--json", "--name", "session"])
        .arg(env.path("source.jsonl"))
        .assert()
        .success();
    let exported = stdout_json(&assert.get_output().stdout);
    let id = exported["id"].as_str().unwrap().to_string();

    let assert = env
        .cmd()
        .args(["import", "--json", &id, "--target-dir", "/work/bob_proj"])
        .assert()
        .success();
    let imported = stdout_json(&assert.get_output().stdout);
    assert_eq!(imported["stats"]["hash_verified"], true);

    let path = PathBuf::from(imported["stats"]["path"].as_str().unwrap());
    assert!(path.starts_with(env.path("projects").join("-work-bob-proj")));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 4);
    assert_ne!(lines[0]["id"], "u1");
    assert_ne!(lines[0]["streamId"], "s1");
    assert_eq!(lines[0]["parentId"], Value::Null);
    for pair in lines.windows(2) {
        assert_eq!(pair[1]["parentId"], pair[0]["id"]);
    }
}

#[test]
fn import_file_directly() {
    let env = CliTestEnv::new();
    let projects = env.path("elsewhere");

    let assert = env
        .cmd()
        .args(["import", "--json", "--target-dir", "/p", "--projects-dir"])
        .arg(&projects)
        .arg("--file")
        .arg(env.path("source.jsonl"))
        .assert()
        .success();
    let imported = stdout_json(&assert.get_output().stdout);
    assert_eq!(imported["stats"]["messages"], 4);
    assert_eq!(imported["stats"]["skipped_lines"], 1);
    assert!(projects.join("-p").is_dir());
}

#[test]
fn import_unknown_share_fails() {
    let env = CliTestEnv::new();
    let assert = env
        .cmd()
        .args(["import", "--json", "no-such-share", "--target-dir", "/p"])
        .assert()
        .code(3);
    let error = stdout_json(&assert.get_output().stderr);
    assert_eq!(error["error"]["code"], "SHARE_NOT_FOUND");
}

#[test]
fn export_empty_input_fails() {
    let env = CliTestEnv::new();
    let empty = env.path("empty.jsonl");
    fs::write(&empty, "\n\n").unwrap();

    env.cmd()
        .args(["export", "--json"])
        .arg(&empty)
        .assert()
        .code(2);
}

#[test]
fn redact_filters_stdin() {
    let env = CliTestEnv::new();
    let assert = env
        .cmd()
        .args(["redact", "--base-path", "/home/alice/proj"])
        .write_stdin("see /home/alice/proj/.env: API_TOKEN=supersecretvalue\n")
        .assert()
        .success();
    assert_eq!(
        String::from_utf8_lossy(&assert.get_output().stdout),
        "see .env: API_TOKEN=[REDACTED]\n"
    );
}
