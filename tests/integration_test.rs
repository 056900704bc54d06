//! Integration tests for the wealth engine CLI.
//!
//! These tests run the actual binary and verify its CSV output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Get path to test data file
fn test_data_path(filename: &str) -> String {
    format!("tests/data/{}", filename)
}

/// Run the binary with the given arguments and return stdout
fn run_engine(args: &[&str]) -> String {
    let mut cmd = Command::cargo_bin("wealth-engine").unwrap();
    let assert = cmd.args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

fn lines(csv: &str) -> Vec<String> {
    csv.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[test]
fn test_ledger_matches_expected_output() {
    let ledger = test_data_path("ledger.csv");
    let output = run_engine(&["ledger", &ledger, "1000"]);
    let expected = fs::read_to_string(test_data_path("expected_ledger.csv")).unwrap();

    assert_eq!(lines(&output), lines(&expected));
}

#[test]
fn test_ledger_defaults_initial_capital_to_zero() {
    let ledger = test_data_path("ledger.csv");
    let output = run_engine(&["ledger", &ledger]);

    assert!(output.contains("2025,1,Gen,2000.00,2800.00,500.00,1500.00,1500.00"));
}

#[test]
fn test_ledger_sorted_across_year_boundary() {
    let ledger = test_data_path("unsorted_ledger.csv");
    let output = lines(&run_engine(&["ledger", &ledger]));

    assert_eq!(output.len(), 4);
    assert!(output[1].starts_with("2025,11,Nov,"));
    assert!(output[2].starts_with("2025,12,Dic,"));
    assert!(output[3].starts_with("2026,1,Gen,"));
    assert!(output[3].ends_with(",2700.00"));
}

#[test]
fn test_messy_ledger_skips_bad_rows() {
    let ledger = test_data_path("messy_ledger.csv");
    let output = lines(&run_engine(&["ledger", &ledger]));

    assert_eq!(output.len(), 3);
    assert_eq!(output[1], "2025,1,Gen,1500.00,2100.00,700.00,800.00,800.00");
    assert_eq!(output[2], "2025,4,Apr,1500.00,2100.00,50.00,1450.00,2250.00");
}

#[test]
fn test_project_compounds_after_contribution() {
    let plan = test_data_path("plan.json");
    let output = lines(&run_engine(&["project", &plan]));

    assert_eq!(output.len(), 13);
    assert_eq!(output[0], "year,month,total_invested,portfolio_value,returns");
    assert_eq!(output[1], "2025,Gen,100.00,101.00,1.00");
    assert_eq!(output[2], "2025,Feb,200.00,203.01,3.01");
    assert_eq!(output[12], "2025,Dic,1200.00,1280.93,80.93");
}

#[test]
fn test_project_with_start_year() {
    let plan = test_data_path("flat_plan.json");
    let output = lines(&run_engine(&["project", &plan, "2030"]));

    assert_eq!(output.len(), 25);
    assert_eq!(output[1], "2030,Gen,1100.00,1100.00,0.00");
    assert_eq!(output[24], "2031,Dic,3400.00,3400.00,0.00");
}

#[test]
fn test_project_rejects_invalid_plan() {
    let plan = test_data_path("invalid_plan.json");
    let mut cmd = Command::cargo_bin("wealth-engine").unwrap();
    cmd.args(["project", &plan])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Validation failed"));
}

#[test]
fn test_wealth_positional() {
    let ledger = test_data_path("ledger.csv");
    let plan = test_data_path("plan.json");
    let output = lines(&run_engine(&["wealth", &ledger, &plan, "1000"]));

    assert_eq!(output.len(), 13);
    assert_eq!(
        output[0],
        "year,month,liquid_capital,invested_capital,total_wealth"
    );
    assert_eq!(output[1], "2025,Gen,2500.00,101.00,2601.00");
    assert!(output[4].starts_with("2025,Apr,0.00,"));
    assert_eq!(output[12], "2025,Dic,0.00,1280.93,1280.93");
}

#[test]
fn test_wealth_by_date_covers_both_calendars() {
    let ledger = test_data_path("unsorted_ledger.csv");
    let plan = test_data_path("plan.json");

    let positional = lines(&run_engine(&["wealth", &ledger, &plan]));
    assert_eq!(positional.len(), 13);
    assert_eq!(positional[1], "2025,Nov,1000.00,101.00,1101.00");

    let by_date = lines(&run_engine(&["wealth", &ledger, &plan, "--by-date"]));
    assert_eq!(by_date.len(), 14);
    assert_eq!(by_date[1], "2025,Gen,0.00,101.00,101.00");
    assert_eq!(by_date[13], "2026,Gen,2700.00,0.00,2700.00");
}

#[test]
fn test_demo_prints_a_year() {
    let output = lines(&run_engine(&["demo"]));

    assert_eq!(output.len(), 13);
    assert!(output[1].starts_with("2025,1,Gen,2200.00,3100.00,"));
    assert!(output[12].starts_with("2025,12,Dic,4200.00,5900.00,"));
}

#[test]
fn test_ledger_from_temp_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "year,month,net_salary,gross_salary,category,amount").unwrap();
    writeln!(file, "2025,6,1000,1400,Vacanze,1500").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let output = lines(&run_engine(&["ledger", &path, "100"]));
    assert_eq!(output[1], "2025,6,Giu,1000.00,1400.00,1500.00,-500.00,-400.00");
}

#[test]
fn test_missing_file_error() {
    let mut cmd = Command::cargo_bin("wealth-engine").unwrap();
    cmd.args(["ledger", "nonexistent_file.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_missing_command_error() {
    let mut cmd = Command::cargo_bin("wealth-engine").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing command"))
        .stderr(predicate::str::contains("usage:"));
}

#[test]
fn test_unknown_command_error() {
    let mut cmd = Command::cargo_bin("wealth-engine").unwrap();
    cmd.arg("forecast")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command: forecast"));
}

#[test]
fn test_invalid_initial_capital_error() {
    let ledger = test_data_path("ledger.csv");
    let mut cmd = Command::cargo_bin("wealth-engine").unwrap();
    cmd.args(["ledger", &ledger, "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid initial capital"));
}

#[test]
fn test_project_rejects_out_of_range_start_year() {
    let plan = test_data_path("plan.json");
    let mut cmd = Command::cargo_bin("wealth-engine").unwrap();
    cmd.args(["project", &plan, "2147483647"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid start year: 2147483647"));
}

#[test]
fn test_project_extreme_plan_over_a_century() {
    let plan = test_data_path("extreme_plan.json");
    let output = lines(&run_engine(&["project", &plan]));

    assert_eq!(output.len(), 1201);
    assert_eq!(output[1], "2025,Gen,1200.00,1300.00,100.00");
    assert!(output[1200].starts_with("2124,Dic,241000.00,"));
}
