//! Integration tests for the liftlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Draft editing across separate invocations
//! - Draft persistence and corruption recovery
//! - Macro calculation output
//! - Submission failure keeping the draft

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory with an empty config file
fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("config.toml"), "").expect("Failed to write config");
    temp_dir
}

/// CLI command pinned to the temp dir's data and config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("liftlog"));
    cmd.arg("--data-dir")
        .arg(dir)
        .arg("--config")
        .arg(dir.join("config.toml"))
        .env_remove("LIFTLOG_GATEWAY_URL")
        .env_remove("LIFTLOG_GATEWAY_KEY")
        .env_remove("LIFTLOG_GATEWAY_TOKEN");
    cmd
}

fn draft_json(dir: &Path) -> serde_json::Value {
    let output = cli(dir)
        .args(["draft", "show", "--json"])
        .output()
        .expect("Failed to run draft show");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("draft show --json is not JSON")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("liftlog"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout and nutrition tracker"));
}

#[test]
fn test_add_exercise_persists_draft() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir)
        .args(["draft", "add", "bench_press", "--sets", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added bench_press"));

    assert!(dir.join("drafts/workout-draft.json").exists());

    let draft = draft_json(dir);
    assert_eq!(draft[0]["exercise"]["name"], "Bench Press");
    assert_eq!(draft[0]["sets"].as_array().unwrap().len(), 3);
    assert_eq!(draft[0]["rest_time"], 90);
}

#[test]
fn test_duplicate_add_keeps_one_exercise() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["draft", "add", "deadlift"]).assert().success();
    cli(dir)
        .args(["draft", "add", "deadlift", "--sets", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in the draft"));

    cli(dir)
        .args(["draft", "count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_unknown_exercise_needs_name() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["draft", "add", "zercher_squat"]).assert().failure();

    cli(dir)
        .args(["draft", "add", "zercher_squat", "--name", "Zercher Squat", "--rest", "150"])
        .assert()
        .success();

    let draft = draft_json(dir);
    assert_eq!(draft[0]["exercise"]["name"], "Zercher Squat");
    assert_eq!(draft[0]["rest_time"], 150);
}

#[test]
fn test_edit_sets_by_position() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["draft", "add", "back_squat", "--sets", "2"]).assert().success();
    cli(dir)
        .args(["draft", "set", "back_squat", "2", "--weight", "102.5", "--reps", "5"])
        .assert()
        .success();
    cli(dir).args(["draft", "toggle", "back_squat", "2"]).assert().success();
    cli(dir).args(["draft", "add-set", "back_squat"]).assert().success();

    let draft = draft_json(dir);
    let sets = draft[0]["sets"].as_array().unwrap();
    assert_eq!(sets.len(), 3);
    assert_eq!(sets[1]["weight"], 102.5);
    assert_eq!(sets[1]["reps"], 5);
    assert_eq!(sets[1]["completed"], true);
    assert_eq!(sets[0]["completed"], false);

    cli(dir)
        .args(["draft", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/3 sets completed"));
}

#[test]
fn test_remove_unknown_set_keeps_sets() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["draft", "add", "pullup", "--sets", "2"]).assert().success();
    cli(dir)
        .args(["draft", "remove-set", "pullup", "no-such-set"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No set of pullup matches"));

    assert_eq!(draft_json(dir)[0]["sets"].as_array().unwrap().len(), 2);

    cli(dir)
        .args(["draft", "remove-set", "pullup", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Removed set 1 from pullup"));
    assert_eq!(draft_json(dir)[0]["sets"].as_array().unwrap().len(), 1);
}

#[test]
fn test_draft_edits_report_outcome() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["draft", "add", "barbell_row", "--sets", "1"]).assert().success();

    cli(dir)
        .args(["draft", "set", "barbell_row", "1", "--weight", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Updated set 1 of barbell_row"));
    cli(dir)
        .args(["draft", "toggle", "barbell_row", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marked done"));
    cli(dir)
        .args(["draft", "add-set", "barbell_row"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Added set 2 to barbell_row"));

    // Unknown references change nothing and say so
    cli(dir)
        .args(["draft", "toggle", "barbell_row", "seventh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No set of barbell_row matches \"seventh\""));
    cli(dir)
        .args(["draft", "remove", "squat_jump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercise in the draft matches"));
    cli(dir)
        .args(["draft", "set", "barbell_row", "1"])
        .assert()
        .failure();

    let draft = draft_json(dir);
    let sets = draft[0]["sets"].as_array().unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0]["weight"], 60.0);
    assert_eq!(sets[0]["completed"], true);

    cli(dir)
        .args(["draft", "remove", "barbell_row"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Removed barbell_row from the draft"));
    cli(dir).args(["draft", "count"]).assert().stdout("0\n");
}

#[test]
fn test_remove_and_clear() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["draft", "add", "dip"]).assert().success();
    cli(dir).args(["draft", "add", "plank"]).assert().success();
    cli(dir).args(["draft", "remove", "dip"]).assert().success();
    cli(dir).args(["draft", "count"]).assert().stdout("1\n");

    cli(dir)
        .args(["draft", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Draft cleared"));
    cli(dir).args(["draft", "count"]).assert().stdout("0\n");
    cli(dir)
        .args(["draft", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("empty"));
}

#[test]
fn test_corrupted_draft_file_starts_empty() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    fs::create_dir_all(dir.join("drafts")).unwrap();
    fs::write(dir.join("drafts/workout-draft.json"), "{ invalid json }}}}").unwrap();

    cli(dir).args(["draft", "count"]).assert().success().stdout("0\n");

    // The next mutation overwrites the corrupted file
    cli(dir).args(["draft", "add", "leg_press"]).assert().success();
    cli(dir).args(["draft", "count"]).assert().stdout("1\n");
}

#[test]
fn test_custom_namespace_from_config() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    fs::write(dir.join("config.toml"), "[draft]\nnamespace = \"leg-day\"\n").unwrap();

    cli(dir).args(["draft", "add", "leg_curl"]).assert().success();

    assert!(dir.join("drafts/leg-day.json").exists());
    assert!(!dir.join("drafts/workout-draft.json").exists());
}

#[test]
fn test_invalid_namespace_fails_fast() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    fs::write(dir.join("config.toml"), "[draft]\nnamespace = \"../escape\"\n").unwrap();

    cli(dir)
        .args(["draft", "add", "deadlift"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Added").not())
        .stderr(predicate::str::contains("invalid namespace"));

    assert!(!dir.join("escape.json").exists());
}

#[test]
fn test_macros_reference_example() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args([
            "macros",
            "--weight",
            "80",
            "--height",
            "180",
            "--age",
            "30",
            "--gender",
            "Man",
            "--activity",
            "Medel (3-4 pass/vecka)",
            "--goal",
            "Bygga muskler",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("BMR:      1880 kcal"))
        .stdout(predicate::str::contains("Calories: 3203 kcal"))
        .stdout(predicate::str::contains("Protein:  160 g"));
}

#[test]
fn test_macros_json_and_validation() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let output = cli(dir)
        .args([
            "macros", "--weight", "60", "--height", "165", "--age", "25", "--gender", "female",
            "--activity", "sedentary", "--goal", "lose_weight", "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let targets: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(targets["protein"], 120);
    assert_eq!(targets["calories"], 1291);

    cli(dir)
        .args([
            "macros", "--weight", "5", "--height", "165", "--age", "25", "--gender", "female",
            "--activity", "sedentary", "--goal", "maintain",
        ])
        .assert()
        .failure();

    cli(dir)
        .args([
            "macros", "--weight", "60", "--height", "165", "--age", "25", "--gender", "female",
            "--activity", "sometimes", "--goal", "maintain",
        ])
        .assert()
        .failure();
}

#[test]
fn test_submit_empty_draft_is_noop() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["submit", "--name", "Push"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to submit"));
}

#[test]
fn test_submit_without_backend_keeps_draft() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli(dir).args(["draft", "add", "overhead_press"]).assert().success();
    cli(dir)
        .args(["submit", "--name", "Push"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gateway.url"));

    cli(dir).args(["draft", "count"]).assert().stdout("1\n");
}

#[test]
fn test_catalog_search() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["catalog", "back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deadlift"))
        .stdout(predicate::str::contains("lat_pulldown"));
}
