// tests/integration_test.rs
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

use git2::Repository;
use release_plan::cli::{run_release_plan, ReleaseSources};
use release_plan::config::Config;
use release_plan::domain::{Flow, PipelineSource, RunContext, RunFacts};
use release_plan::sources::{GitTagHistory, Lookup, TagHistorySource};
use serial_test::serial;
use tempfile::TempDir;

const CI_VARS: &[(&str, &str)] = &[
    ("CI_PIPELINE_SOURCE", "push"),
    ("CI_COMMIT_REF_NAME", "main"),
    ("CI_COMMIT_BRANCH", "main"),
    ("CI_COMMIT_SHA", "c0ffee0123456789abcdef"),
    ("CI_DEFAULT_BRANCH", "main"),
    ("CI_REGISTRY_IMAGE", "registry.example.com/group/svc"),
    ("CI_PROJECT_PATH", "group/svc"),
    ("CI_PIPELINE_ID", "1001"),
];

const MERGE_REQUEST_VARS: &[(&str, &str)] = &[
    ("CI_PIPELINE_SOURCE", "merge_request_event"),
    ("CI_COMMIT_REF_NAME", "feature/x"),
    ("CI_COMMIT_BRANCH", ""),
    ("CI_MERGE_REQUEST_SOURCE_BRANCH_NAME", "feature/x"),
    ("CI_MERGE_REQUEST_TARGET_BRANCH_NAME", "main"),
    ("CI_MERGE_REQUEST_IID", "12"),
    (
        "CI_MERGE_REQUEST_DESCRIPTION",
        "<!-- release-plan:bump -->\n- [x] **Minor**\n",
    ),
];

fn feature_push_vars() -> Vec<(&'static str, &'static str)> {
    CI_VARS
        .iter()
        .copied()
        .map(|(key, value)| match key {
            "CI_COMMIT_REF_NAME" | "CI_COMMIT_BRANCH" => (key, "feature/x"),
            _ => (key, value),
        })
        .collect()
}

fn run_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("Failed to execute command");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn release_plan_command(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_release-plan"));
    cmd.env_clear()
        .current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"));
    cmd
}

fn repo_with_tags(tags: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    fs::write(dir.path().join("Dockerfile"), b"FROM scratch\n").unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("Dockerfile")).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = repo.signature().unwrap();
    let commit_id = repo
        .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();
    let object = repo.find_object(commit_id, None).unwrap();
    for tag in tags {
        repo.tag_lightweight(tag, &object, false).unwrap();
    }
    dir
}

#[test]
fn test_release_plan_help() {
    let dir = TempDir::new().unwrap();
    let output = release_plan_command(dir.path())
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("release-plan"));
    assert!(stdout.contains("--latest-tag"));
}

#[test]
fn test_binary_prints_build_options_json() {
    let dir = TempDir::new().unwrap();
    let output = release_plan_command(dir.path())
        .envs(CI_VARS.iter().copied())
        .args(["--latest-tag", "1.2.3", "--json", "--bump", "minor"])
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let refs: Vec<&str> = json["refs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap())
        .collect();
    assert_eq!(
        refs,
        vec![
            "registry.example.com/group/svc/svc:c0ffee01",
            "registry.example.com/group/svc/svc:1.3.0-rc.1",
            "registry.example.com/group/svc/svc:main",
        ]
    );
    assert_eq!(json["push"], serde_json::Value::Bool(true));
}

#[test]
fn test_binary_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("build.json");
    let output = release_plan_command(dir.path())
        .envs(CI_VARS.iter().copied())
        .args(["--latest-tag", "0.0.0", "--dry-run", "--output"])
        .arg(&out)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["dry_run"], serde_json::Value::Bool(true));
    assert!(json["refs"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r.as_str() == Some("registry.example.com/group/svc/svc:0.0.1-rc.1")));
}

#[test]
fn test_binary_fails_without_registry() {
    let dir = TempDir::new().unwrap();
    let output = release_plan_command(dir.path())
        .env("CI_COMMIT_REF_NAME", "main")
        .args(["--latest-tag", "1.0.0"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("registry base"), "stderr: {}", stderr);
}

#[test]
fn test_binary_rejects_invalid_flow_env() {
    let dir = TempDir::new().unwrap();
    let output = release_plan_command(dir.path())
        .envs(CI_VARS.iter().copied())
        .env("RELEASE_PLAN_FLOW", "nightly")
        .args(["--latest-tag", "1.0.0"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid flow"));
}

#[test]
fn test_binary_accepts_numeric_publish_feature_env() {
    let dir = TempDir::new().unwrap();
    for value in ["1", "yes", "on", "true"] {
        let json = run_json(
            release_plan_command(dir.path())
                .envs(feature_push_vars())
                .env("RELEASE_PLAN_PUSH_FEATURE", value)
                .args(["--latest-tag", "1.0.0", "--json"]),
        );
        assert_eq!(json["push"], serde_json::Value::Bool(true), "{}", value);
    }
}

#[test]
fn test_binary_can_turn_off_config_opt_ins() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("releaseplan.toml"),
        "[publish]\nfeature = true\n\n[tags]\nlatest_on_default = true\n",
    )
    .unwrap();

    let json = run_json(
        release_plan_command(dir.path())
            .envs(feature_push_vars())
            .args(["--latest-tag", "1.0.0", "--json"]),
    );
    assert_eq!(json["push"], serde_json::Value::Bool(true));

    let json = run_json(
        release_plan_command(dir.path())
            .envs(feature_push_vars())
            .args(["--latest-tag", "1.0.0", "--json", "--publish-feature=false"]),
    );
    assert_eq!(json["push"], serde_json::Value::Bool(false));

    let json = run_json(
        release_plan_command(dir.path())
            .envs(feature_push_vars())
            .env("RELEASE_PLAN_PUSH_FEATURE", "no")
            .args(["--latest-tag", "1.0.0", "--json"]),
    );
    assert_eq!(json["push"], serde_json::Value::Bool(false));

    let json = run_json(
        release_plan_command(dir.path())
            .envs(CI_VARS.iter().copied())
            .args(["--latest-tag", "1.0.0", "--json", "--latest-on-default=0"]),
    );
    assert!(!json["refs"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r.as_str() == Some("registry.example.com/group/svc/svc:latest")));
}

#[test]
fn test_binary_newest_marked_note_beats_description() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes");
    fs::create_dir(&notes).unwrap();
    fs::write(
        notes.join("001.md"),
        "<!-- release-plan:bump -->\n- [x] **Patch**\n",
    )
    .unwrap();
    fs::write(notes.join("002.md"), "LGTM, ship it\n").unwrap();
    fs::write(
        notes.join("003.md"),
        "<!-- release-plan:bump -->\n- [ ] **Patch**\n- [x] **Major**\n",
    )
    .unwrap();

    let json = run_json(
        release_plan_command(dir.path())
            .envs(CI_VARS.iter().copied())
            .envs(MERGE_REQUEST_VARS.iter().copied())
            .args(["--latest-tag", "1.2.3", "--json", "--mr-notes-dir"])
            .arg(&notes),
    );
    assert_eq!(
        json["refs"][1],
        "registry.example.com/group/svc/svc:2.0.0-rc.1"
    );

    // without the notes, the description decides
    let json = run_json(
        release_plan_command(dir.path())
            .envs(CI_VARS.iter().copied())
            .envs(MERGE_REQUEST_VARS.iter().copied())
            .args(["--latest-tag", "1.2.3", "--json"]),
    );
    assert_eq!(
        json["refs"][1],
        "registry.example.com/group/svc/svc:1.3.0-rc.1"
    );
}

#[test]
fn test_binary_reads_tags_from_repository() {
    let repo = repo_with_tags(&["0.3.0", "0.10.0", "v5.0.0"]);
    let output = release_plan_command(repo.path())
        .envs(CI_VARS.iter().copied())
        .arg("--json")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["refs"][1], "registry.example.com/group/svc/svc:0.10.1-rc.1");
}

#[test]
fn test_git_tag_history_drives_forecast() {
    let repo = repo_with_tags(&["1.0.0", "1.1.0", "release-candidate"]);
    let history = GitTagHistory::open(repo.path()).unwrap();
    assert_eq!(
        history.latest_semantic_tag(),
        Lookup::Found("1.1.0".to_string())
    );

    let sources = ReleaseSources {
        tag_history: &history,
        manual_bump: None,
        latest_tag: None,
    };
    let facts = RunFacts {
        source: PipelineSource::Push,
        ref_name: "main".to_string(),
        sha: "0123456789abcdef".to_string(),
        default_branch: "main".to_string(),
        registry_base: "reg.io/team/api".to_string(),
        ..RunFacts::default()
    };
    let outcome = run_release_plan(facts, &Config::default(), &sources).unwrap();
    assert_eq!(outcome.flow, Flow::Default);
    assert_eq!(outcome.forecast.next_version.as_deref(), Some("1.1.1"));
}

#[test]
#[serial]
fn test_run_facts_from_process_env() {
    let keys = [
        "CI_PIPELINE_SOURCE",
        "CI_COMMIT_REF_NAME",
        "CI_MERGE_REQUEST_SOURCE_BRANCH_NAME",
        "CI_MERGE_REQUEST_IID",
        "CI_REGISTRY_IMAGE",
        "CI_DEFAULT_BRANCH",
    ];
    let saved: Vec<Option<String>> = keys.iter().map(|k| env::var(k).ok()).collect();

    env::set_var("CI_PIPELINE_SOURCE", "merge_request_event");
    env::set_var("CI_COMMIT_REF_NAME", "feature/pay");
    env::set_var("CI_MERGE_REQUEST_SOURCE_BRANCH_NAME", "feature/pay");
    env::set_var("CI_MERGE_REQUEST_IID", "77");
    env::set_var("CI_REGISTRY_IMAGE", "reg.io/team/pay/");
    env::set_var("CI_DEFAULT_BRANCH", "main");

    let ctx = RunContext::new(RunFacts::from_env(&Config::default()));

    for (key, value) in keys.iter().zip(saved) {
        match value {
            Some(v) => env::set_var(key, v),
            None => env::remove_var(key),
        }
    }

    assert!(ctx.is_merge_request());
    assert!(ctx.is_feature_branch());
    assert_eq!(ctx.merge_request_id(), Some("77"));
    assert_eq!(ctx.application_name(), "pay");
}

#[test]
#[serial]
fn test_merge_request_description_from_env() {
    let saved = env::var(release_plan::env::MERGE_REQUEST_DESCRIPTION_VAR).ok();

    env::set_var(release_plan::env::MERGE_REQUEST_DESCRIPTION_VAR, "   ");
    assert_eq!(release_plan::env::merge_request_description(), None);
    env::set_var(
        release_plan::env::MERGE_REQUEST_DESCRIPTION_VAR,
        "- [x] **Major**",
    );
    assert_eq!(
        release_plan::env::merge_request_description().as_deref(),
        Some("- [x] **Major**")
    );

    match saved {
        Some(v) => env::set_var(release_plan::env::MERGE_REQUEST_DESCRIPTION_VAR, v),
        None => env::remove_var(release_plan::env::MERGE_REQUEST_DESCRIPTION_VAR),
    }
}
