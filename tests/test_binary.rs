//! End-to-end tests that run the capstat binary

use predicates::prelude::*;

#[path = "common/mod.rs"]
mod common;

fn capstat() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("capstat")
}

#[test]
fn test_clean_writes_output() {
    let mut df = common::create_player_dataframe(30);
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let output = temp_dir.path().join("clean.csv");

    capstat()
        .arg("clean")
        .arg(&csv_path)
        .arg(&output)
        .arg("--no-confirm")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned table written"));

    let written = std::fs::read_to_string(&output).unwrap();
    let header = written.lines().next().unwrap();
    assert!(header.starts_with("Age,GP,G,A,PTS,plus_minus"));
    assert!(header.ends_with("canada,west,Salary"));
}

#[test]
fn test_clean_derives_output_path() {
    let mut df = common::create_player_dataframe(12);
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);

    capstat()
        .arg("clean")
        .arg(&csv_path)
        .arg("--no-confirm")
        .assert()
        .success();

    assert!(temp_dir.path().join("test_data_clean.csv").exists());
}

#[test]
fn test_missing_input_file_fails() {
    capstat()
        .args(["-i", "/nonexistent/players.csv", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}

#[test]
fn test_no_input_fails() {
    capstat()
        .arg("--no-confirm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file is required"));
}

#[test]
fn test_schema_mismatch_reported() {
    let mut df = common::create_player_dataframe(8).drop_many(["Tm"]);
    let (_temp_dir, csv_path) = common::create_temp_csv(&mut df);

    capstat()
        .arg("clean")
        .arg(&csv_path)
        .arg("--no-confirm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tm"));
}

#[test]
fn test_describe_requires_field_without_prompts() {
    let mut df = common::create_player_dataframe(20);
    let (_temp_dir, csv_path) = common::create_temp_csv(&mut df);

    capstat()
        .arg("describe")
        .arg(&csv_path)
        .arg("--no-confirm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("A field is required"));
}

#[test]
fn test_describe_writes_svg() {
    let mut df = common::create_player_dataframe(40);
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let svg = temp_dir.path().join("salary.svg");

    capstat()
        .arg("describe")
        .arg(&csv_path)
        .args(["--field", "salary", "--no-confirm", "--svg"])
        .arg(&svg)
        .assert()
        .success()
        .stdout(predicate::str::contains("DENSITY OF SALARY"));

    let content = std::fs::read_to_string(&svg).unwrap();
    assert!(content.starts_with("<svg"));
}

#[test]
fn test_fit_regression_tree_with_dot() {
    let mut df = common::create_player_dataframe(60);
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let dot = temp_dir.path().join("salary.dot");

    capstat()
        .arg("fit")
        .arg(&csv_path)
        .args(["--family", "regression-tree", "--min-split", "10", "--no-confirm", "--dot"])
        .arg(&dot)
        .assert()
        .success()
        .stdout(predicate::str::contains("1) root 60"));

    let content = std::fs::read_to_string(&dot).unwrap();
    assert!(content.starts_with("digraph tree {"));
}

#[test]
fn test_fit_unknown_predictor_fails() {
    let mut df = common::create_player_dataframe(30);
    let (_temp_dir, csv_path) = common::create_temp_csv(&mut df);

    capstat()
        .arg("fit")
        .arg(&csv_path)
        .args(["--predictors", "Age,Shoe_Size", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Shoe_Size"));
}

#[test]
fn test_full_analysis_writes_report() {
    let mut df = common::create_player_dataframe(60);
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let report = temp_dir.path().join("report.json");
    let svg_dir = temp_dir.path().join("plots");
    let dot_dir = temp_dir.path().join("trees");

    capstat()
        .arg("-i")
        .arg(&csv_path)
        .arg("--report")
        .arg(&report)
        .arg("--svg-dir")
        .arg(&svg_dir)
        .arg("--dot-dir")
        .arg(&dot_dir)
        .arg("--no-confirm")
        .assert()
        .success()
        .stdout(predicate::str::contains("ols_full"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["cleaning"]["output_rows"], 60);
    assert_eq!(json["distributions"].as_array().unwrap().len(), 4);

    let models = json["models"].as_array().unwrap();
    assert_eq!(models.len(), 6);
    assert!(models.iter().all(|m| m["status"] == "fitted"));

    assert!(svg_dir.join("salary_density.svg").exists());
    assert!(dot_dir.join("tree_conference.dot").exists());
    assert!(!dot_dir.join("ols_full.dot").exists());
}
