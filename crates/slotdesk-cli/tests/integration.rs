#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn slotdesk(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("slotdesk").unwrap();
    cmd.current_dir(dir.path())
        .env("SLOTDESK_ROOT", dir.path())
        .env_remove("SLOTDESK_USER")
        .env_remove("SLOTDESK_PASSWORD");
    cmd
}

fn init_project(dir: &TempDir) {
    slotdesk(dir).arg("init").assert().success();
}

fn add_user(dir: &TempDir, username: &str) {
    slotdesk(dir)
        .args(["user", "add", username, "--password", "secret"])
        .assert()
        .success();
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// slotdesk init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_data_dir() {
    let dir = TempDir::new().unwrap();
    slotdesk(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: slotdesk.yaml"));

    assert!(dir.path().join("slotdesk.yaml").is_file());
    assert!(dir.path().join(".slotdesk").is_dir());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  slotdesk.yaml"));

    // The existing account survives a second init.
    let raw = std::fs::read_to_string(dir.path().join("slotdesk.yaml")).unwrap();
    assert!(raw.contains("ada"));
}

#[test]
fn commands_before_init_fail() {
    let dir = TempDir::new().unwrap();
    slotdesk(&dir)
        .args(["slots", "list", "flutter-webview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("slotdesk init"));
}

// ---------------------------------------------------------------------------
// slotdesk user
// ---------------------------------------------------------------------------

#[test]
fn user_add_and_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    slotdesk(&dir)
        .args(["user", "add", "ada", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added user 'ada'"));

    slotdesk(&dir)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("USERNAME").and(predicate::str::contains("ada")));
}

#[test]
fn user_add_reads_password_from_stdin() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    slotdesk(&dir)
        .args(["user", "add", "bob"])
        .write_stdin("hunter2\n")
        .assert()
        .success();

    let raw = std::fs::read_to_string(dir.path().join("slotdesk.yaml")).unwrap();
    let config: serde_yaml::Value = serde_yaml::from_str(&raw).unwrap();
    let users = config["auth"]["users"].as_sequence().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"].as_str(), Some("bob"));
    // Only the hash is stored.
    assert!(!raw.contains("hunter2"));
}

#[test]
fn user_add_rejects_duplicate() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["user", "add", "ada", "--password", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user already exists: ada"));
}

#[test]
fn user_list_json() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    let users = json_stdout(slotdesk(&dir).args(["--json", "user", "list"]));
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "ada");
    assert!(users[0]["user_id"].as_str().is_some_and(|id| !id.is_empty()));
}

// ---------------------------------------------------------------------------
// slotdesk config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_warns_without_users() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    slotdesk(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning] no users configured"));
}

#[test]
fn config_validate_clean_after_user_add() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No warnings"));
}

#[test]
fn config_show_redacts_password_hashes() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<redacted>").and(predicate::str::contains("ada")));
}

// ---------------------------------------------------------------------------
// slotdesk slots
// ---------------------------------------------------------------------------

#[test]
fn slots_list_shows_twenty_default_labels() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "list", "lovable-prompts"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Prompt 1")
                .and(predicate::str::contains("Prompt 20"))
                .and(predicate::str::contains("LABEL")),
        );
}

#[test]
fn slots_save_then_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "save", "flutter-webview", "3", "https://example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Saved successfully: Config 3 has been saved",
        ));

    let views = json_stdout(slotdesk(&dir).args(["--json", "slots", "list", "flutter-webview"]));
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 20);
    assert_eq!(views[2]["number"], 3);
    assert_eq!(views[2]["text"], "https://example.com");
    assert_eq!(views[0]["text"], "");
}

#[test]
fn slots_save_reads_stdin() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "save", "lovable-prompts", "1"])
        .write_stdin("Build a landing page\nwith a hero section\n")
        .assert()
        .success();

    let views = json_stdout(slotdesk(&dir).args(["-j", "slots", "list", "lovable-prompts"]));
    assert_eq!(
        views[0]["text"],
        "Build a landing page\nwith a hero section\n"
    );
}

#[test]
fn slots_save_rejects_blank_text() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "save", "lovable-prompts", "2", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Empty prompt: Please enter some text before saving",
        ));
}

#[test]
fn slots_save_without_account_requires_authentication() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    slotdesk(&dir)
        .args(["slots", "save", "flutter-webview", "1", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please log in to save configs"));
}

#[test]
fn slots_save_out_of_range_slot() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "save", "flutter-webview", "21", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid slot"));
}

#[test]
fn slots_unknown_page() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "list", "odoo-hosting"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown page: odoo-hosting"));
}

#[test]
fn slots_label_set_and_clear() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "label", "flutter-webview", "5", "Staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Label saved: Config label has been updated",
        ));

    let views = json_stdout(slotdesk(&dir).args(["--json", "slots", "list", "flutter-webview"]));
    assert_eq!(views[4]["display_label"], "Staging");
    assert_eq!(views[4]["text"], "");

    slotdesk(&dir)
        .args(["slots", "label", "flutter-webview", "5", ""])
        .assert()
        .success();

    let views = json_stdout(slotdesk(&dir).args(["--json", "slots", "list", "flutter-webview"]));
    assert_eq!(views[4]["display_label"], "Config 5");
}

#[test]
fn slots_label_keeps_saved_text() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "save", "lovable-prompts", "7", "keep me"])
        .assert()
        .success();
    slotdesk(&dir)
        .args(["slots", "label", "lovable-prompts", "7", "Hero"])
        .assert()
        .success();

    let views = json_stdout(slotdesk(&dir).args(["--json", "slots", "list", "lovable-prompts"]));
    assert_eq!(views[6]["text"], "keep me");
    assert_eq!(views[6]["display_label"], "Hero");
}

#[test]
fn slots_copy_print_writes_text() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "save", "flutter-webview", "1", "copy this"])
        .assert()
        .success();

    slotdesk(&dir)
        .args(["slots", "copy", "flutter-webview", "1", "--print"])
        .assert()
        .success()
        .stdout("copy this\n");
}

#[test]
fn slots_copy_wait_conflicts_with_print() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "copy", "flutter-webview", "1", "--print", "--wait"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn slots_are_scoped_per_user() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");
    add_user(&dir, "bob");

    slotdesk(&dir)
        .args(["slots", "save", "flutter-webview", "1", "ada's", "--user", "ada"])
        .assert()
        .success();

    let bob = json_stdout(slotdesk(&dir).args([
        "--json",
        "slots",
        "list",
        "flutter-webview",
        "--user",
        "bob",
    ]));
    assert_eq!(bob[0]["text"], "");

    let ada = json_stdout(
        slotdesk(&dir)
            .env("SLOTDESK_USER", "ada")
            .args(["--json", "slots", "list", "flutter-webview"]),
    );
    assert_eq!(ada[0]["text"], "ada's");
}

#[test]
fn slots_unknown_user() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    slotdesk(&dir)
        .args(["slots", "list", "flutter-webview", "--user", "carol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user not found: carol"));
}

#[test]
fn slots_save_json_reports_notifications() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "ada");

    let out = json_stdout(slotdesk(&dir).args([
        "--json",
        "slots",
        "save",
        "lovable-prompts",
        "4",
        "hello",
    ]));
    assert_eq!(out["ok"], true);
    assert_eq!(out["slot"]["number"], 4);
    assert_eq!(out["slot"]["saved"], true);
    assert_eq!(out["notifications"][0]["title"], "Saved successfully");
    assert_eq!(out["notifications"][0]["variant"], "default");
}
