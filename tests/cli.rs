//! E2E tests for the calculator commands

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn grtax(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grtax"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout_of(args: &[&str]) -> String {
    let output = grtax(args);
    assert!(output.status.success(), "Command failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json_of(args: &[&str]) -> serde_json::Value {
    serde_json::from_str(&stdout_of(args)).expect("valid JSON output")
}

fn number(value: &serde_json::Value) -> f64 {
    value.as_f64().expect("numeric field")
}

/// Reference salary from a request file: 1000 x 14, no children
#[test]
fn income_tax_from_request_file() {
    let stdout = stdout_of(&["income-tax", "-r", "tests/data/income_request.json"]);

    assert!(stdout.contains("INCOME TAX 2025 (employed, 14 payments)"));
    assert!(stdout.contains("€14000.00"));
    assert!(stdout.contains("€1871.80"));
    assert!(stdout.contains("€777.00"));
    assert!(stdout.contains("€591.20"));
    assert!(stdout.contains("€11537.00"));
}

#[test]
fn income_tax_json_output() {
    let json = json_of(&["income-tax", "--yearly", "14000", "--json"]);

    assert!((number(&json["employee_contributions"]) - 1871.8).abs() < 0.001);
    assert!((number(&json["income_tax"]) - 591.204).abs() < 0.001);
    assert!((number(&json["net_income"]) - 11534.0).abs() < 10.0);
    assert_eq!(json["payments"], 14);
    assert_eq!(json["category"], "employed");
}

#[test]
fn income_tax_request_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_grtax"))
        .args(["income-tax", "-r", "-", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(br#"{"yearlyIncome": 30000, "children": "2"}"#)
        .expect("write request");
    let output = child.wait_with_output().expect("command output");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!((number(&json["gross_salary"]) - 30000.0).abs() < 0.001);
}

#[test]
fn withholding_monthly_view() {
    let stdout = stdout_of(&["withholding", "--salary", "1000"]);

    assert!(stdout.contains("WITHHOLDING 2025 (14 payments)"));
    assert!(stdout.contains("€133.70"));
    assert!(stdout.contains("€49.27"));
    assert!(stdout.contains("Insurance 13.4%"));
}

#[test]
fn residence_transfer_halves_tax() {
    let normal = json_of(&["income-tax", "--yearly", "40000", "--json"]);
    let transfer = json_of(&[
        "income-tax",
        "--yearly",
        "40000",
        "--residence-transfer",
        "--json",
    ]);
    let normal_tax = number(&normal["income_tax"]);
    let transfer_tax = number(&transfer["income_tax"]);
    assert!((transfer_tax - normal_tax / 2.0).abs() < 0.001);
}

/// Easter bonus for an employee who started on March 1
#[test]
fn easter_bonus_from_request() {
    let stdout = stdout_of(&["bonus", "-r", "tests/data/easter_bonus.json"]);

    assert!(stdout.contains("EASTER BONUS 2025"));
    assert!(stdout.contains("61/120"));
    assert!(stdout.contains("€381.25"));
    assert!(stdout.contains("€57.19"));
    assert!(stdout.contains("€324.06"));
}

#[test]
fn christmas_bonus_full_period() {
    let json = json_of(&[
        "bonus",
        "--salary",
        "1200",
        "--start",
        "2024-06-01",
        "--type",
        "christmas",
        "--json",
    ]);
    assert_eq!(number(&json["gross_amount"]), 1200.0);
    assert_eq!(number(&json["tax"]), 180.0);
    assert_eq!(number(&json["net_amount"]), 1020.0);
}

#[test]
fn all_bonuses_report() {
    let json = json_of(&[
        "bonus",
        "--salary",
        "1200",
        "--start",
        "2024-01-01",
        "--all",
        "--json",
    ]);
    assert_eq!(json["bonuses"].as_array().map(Vec::len), Some(3));
    assert_eq!(number(&json["totals"]["gross"]), 2400.0);
    assert_eq!(number(&json["totals"]["tax"]), 360.0);
}

#[test]
fn bonus_rejects_unknown_type() {
    let output = grtax(&[
        "bonus",
        "--salary",
        "1200",
        "--start",
        "2025-01-01",
        "--type",
        "birthday",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown bonus type 'birthday'"));
}

#[test]
fn gift_tax_with_previous_gifts() {
    let stdout = stdout_of(&["gift-tax", "-r", "tests/data/gift.json"]);

    assert!(stdout.contains("GIFT TAX 2025 (category A)"));
    assert!(stdout.contains("€100000.00"));
    // 2000 on the total, 1000 already due on the earlier gifts
    assert!(stdout.contains("Tax on total"));
    assert!(stdout.contains("€2000.00"));
    assert!(stdout.contains("Tax due on this gift"));
    assert!(stdout.contains("€1000.00"));
}

#[test]
fn freelancer_engineer_in_athens() {
    let json = json_of(&[
        "freelancer",
        "--revenue",
        "50000",
        "--profession",
        "engineers_architects",
        "--city",
        "athens",
        "--json",
    ]);
    assert_eq!(number(&json["social_insurance"]), 8130.0);
    assert_eq!(number(&json["business_tax"]), 1000.0);
    assert!((number(&json["net_income"]) - 17843.4).abs() < 0.001);
}

#[test]
fn freelancer_residence_transfer_halves_income_tax() {
    let json = json_of(&[
        "freelancer",
        "--revenue",
        "50000",
        "--profession",
        "engineers_architects",
        "--city",
        "athens",
        "--residence-transfer",
        "--json",
    ]);
    assert!((number(&json["income_tax"]) - 1513.3).abs() < 0.001);
    assert_eq!(number(&json["business_tax"]), 1000.0);
}

#[test]
fn withholding_for_freelancer_keeps_salary() {
    let json = json_of(&[
        "withholding",
        "--salary",
        "1000",
        "--employment-type",
        "freelancer",
        "--json",
    ]);
    assert_eq!(number(&json["monthly_salary"]), 1000.0);
    assert_eq!(number(&json["annual_gross"]), 12000.0);
}

#[test]
fn gross_from_net_round_trip() {
    let solved = json_of(&["gross-from-net", "--net", "1200", "--json"]);
    assert_eq!(solved["converged"], true);

    let monthly_net = number(&solved["result"]["breakdown"]["monthly_net"]);
    assert!((monthly_net - 1200.0).abs() < 0.01);
}

#[test]
fn batch_csv_output() {
    let stdout = stdout_of(&["batch", "-i", "tests/data/salaries.csv"]);
    let mut lines = stdout.lines();

    let header = lines.next().unwrap();
    assert!(header.starts_with("id,category,gross_salary"));
    assert!(header.contains("income_tax"));

    let rows: Vec<_> = lines.collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with("alice,employed,"));
    assert!(rows[2].starts_with("carol,rental,"));
}

#[test]
fn batch_json_summary() {
    let json = json_of(&["batch", "-i", "tests/data/salaries.csv", "--json"]);
    assert_eq!(json["summary"]["rows"], 4);
    assert_eq!(json["tax_year"], "2025");
}

#[test]
fn rates_for_2026_include_youth_relief() {
    let stdout = stdout_of(&["rates", "--year", "2026"]);

    assert!(stdout.contains("RATES 2026"));
    assert!(stdout.contains("Ages 0-25"));
    assert!(stdout.contains("Ages 26-30"));
    assert!(stdout.contains("44.00%"));
}

#[test]
fn unsupported_year_fails() {
    let output = grtax(&["income-tax", "--yearly", "14000", "--year", "2019"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no rate table for tax year 2019"));
}

#[test]
fn custom_rates_file_round_trip() {
    let rates = stdout_of(&["rates", "--json"]);
    let path = std::env::temp_dir().join(format!("grtax-rates-{}.json", std::process::id()));
    std::fs::write(&path, rates).unwrap();

    let path_arg = path.to_string_lossy().into_owned();
    let custom = json_of(&["income-tax", "--yearly", "25000", "--rates", &path_arg, "--json"]);
    let builtin = json_of(&["income-tax", "--yearly", "25000", "--json"]);
    std::fs::remove_file(&path).ok();

    assert_eq!(custom, builtin);
}

#[test]
fn schema_csv_header() {
    let stdout = stdout_of(&["schema", "csv-header"]);
    assert_eq!(
        stdout.trim(),
        "id,gross_annual,monthly_salary,payments,dependents,age,category,residence_transfer"
    );
}

#[test]
fn schema_for_bonus_request() {
    let json = json_of(&["schema", "json-schema", "-r", "bonus"]);
    let properties = &json["properties"];
    assert!(properties.get("startDate").is_some());
    assert!(properties.get("monthlySalary").is_some());
    assert!(properties.get("taxResidenceTransfer").is_some());
}
