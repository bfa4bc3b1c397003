//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STUDENT: &str = "1212603034";

/// A command isolated to `dir`: no inherited database override or config.
fn costgrade(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("costgrade").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("COSTGRADE_DATABASE")
        .env_remove("RUST_LOG")
        .env("HOME", dir.path());
    cmd
}

/// A temp dir with an initialized database holding the example roster.
fn seeded() -> TempDir {
    let dir = TempDir::new().unwrap();
    costgrade(&dir).arg("init").assert().success();
    costgrade(&dir)
        .args(["seed", "--roster", "roster.example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 student(s), 2 invoice(s)"));
    dir
}

fn submit_all(dir: &TempDir, invoice: &str, values: [&str; 6]) -> Command {
    let mut cmd = costgrade(dir);
    cmd.args(["submit", STUDENT, "--invoice", invoice])
        .args(["--logistics-cost", values[0]])
        .args(["--shipping-cost", values[1]])
        .args(["--customs-duty", values[2]])
        .args(["--excise-tax", values[3]])
        .args(["--vat", values[4]])
        .args(["--total-cost", values[5]]);
    cmd
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    costgrade(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logistics-cost grading tool"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    costgrade(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("costgrade"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    costgrade(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created costgrade.toml"))
        .stdout(predicate::str::contains("Created roster.example.toml"))
        .stdout(predicate::str::contains("Created database"));

    assert!(dir.path().join("costgrade.toml").exists());
    assert!(dir.path().join("roster.example.toml").exists());
    assert!(dir.path().join("data/database/logistics.db").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    costgrade(&dir).arg("init").assert().success();

    costgrade(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_example_roster() {
    let dir = TempDir::new().unwrap();
    costgrade(&dir).arg("init").assert().success();

    costgrade(&dir)
        .args(["validate", "--roster", "roster.example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 student(s), 2 invoice(s)"))
        .stdout(predicate::str::contains("Roster is valid."));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    costgrade(&dir)
        .args(["validate", "--roster", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn student_details() {
    let dir = seeded();
    costgrade(&dir)
        .args(["student", STUDENT])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ayşe Yılmaz"))
        .stdout(predicate::str::contains("2025-09-15"))
        .stdout(predicate::str::contains("Invoices:      2"));
}

#[test]
fn student_not_found() {
    let dir = seeded();
    costgrade(&dir)
        .args(["student", "9999999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("student not found"));
}

#[test]
fn malformed_student_id() {
    let dir = seeded();
    costgrade(&dir)
        .args(["student", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid student id"));
}

#[test]
fn missing_database_is_unavailable() {
    let dir = TempDir::new().unwrap();
    costgrade(&dir)
        .args(["student", STUDENT])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unavailable"));
}

#[test]
fn invoices_with_answers() {
    let dir = seeded();
    costgrade(&dir)
        .args(["invoices", STUDENT, "--with-answers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"))
        .stdout(predicate::str::contains("Hazelnuts"))
        .stdout(predicate::str::contains("Reference answers"))
        .stdout(predicate::str::contains("1150.00"));
}

#[test]
fn submit_perfect() {
    let dir = seeded();
    submit_all(&dir, "1", ["500", "300", "120", "80", "150", "1150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Perfect! Score: 100%"))
        .stdout(predicate::str::contains("✔ Total cost: 1150.00 TL"))
        .stdout(predicate::str::contains("saved"));
}

#[test]
fn submit_within_tolerance_with_one_wrong() {
    let dir = seeded();
    submit_all(
        &dir,
        "1",
        ["500.30", "299.60", "121.00", "80.00", "150.00", "1150.40"],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("Passed. Score: 83%"))
    .stdout(predicate::str::contains(
        "✘ Customs duty: 121.00 TL (expected: 120.00 TL)",
    ));
}

#[test]
fn submit_with_missing_field_is_graded() {
    let dir = seeded();
    costgrade(&dir)
        .args(["submit", STUDENT, "--invoice", "1"])
        .args(["--logistics-cost", "500", "--shipping-cost", "300"])
        .args(["--customs-duty", "120", "--excise-tax", "80"])
        .args(["--total-cost", "1150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✘ VAT: missing"))
        .stdout(predicate::str::contains("Score: 83%"));
}

#[test]
fn submit_require_all_blocks_empty_fields() {
    let dir = seeded();
    costgrade(&dir)
        .args(["submit", STUDENT, "--invoice", "1", "--vat", "150", "--require-all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("please fill in all fields"));
}

#[test]
fn submit_require_all_treats_infinity_as_empty() {
    let dir = seeded();
    submit_all(&dir, "1", ["500", "300", "120", "80", "inf", "1150"])
        .arg("--require-all")
        .assert()
        .failure()
        .stderr(predicate::str::contains("please fill in all fields (missing: vat)"));

    costgrade(&dir)
        .args(["submissions", STUDENT])
        .assert()
        .success()
        .stdout(predicate::str::contains("No submissions recorded yet."));
}

#[test]
fn submit_infinity_is_stored_as_empty() {
    let dir = seeded();
    submit_all(&dir, "1", ["500", "300", "120", "80", "inf", "1150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✘ VAT: missing"));

    costgrade(&dir)
        .args(["submissions", STUDENT])
        .assert()
        .success()
        .stdout(predicate::str::contains("5/6"))
        .stdout(predicate::str::contains("6/6").not());
}

#[test]
fn submit_unknown_invoice_scores_zero() {
    let dir = seeded();
    submit_all(&dir, "99", ["1", "1", "1", "1", "1", "1"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("No answer key"))
        .stdout(predicate::str::contains("Score: 0%"));
}

#[test]
fn submit_json_output() {
    let dir = seeded();
    submit_all(&dir, "2", ["90", "60", "20", "0", "64", "494"])
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"recorded\""))
        .stdout(predicate::str::contains("\"correct_count\": 6"));
}

#[test]
fn resubmission_overwrites() {
    let dir = seeded();
    submit_all(&dir, "1", ["500", "300", "120", "80", "150", "1150"])
        .assert()
        .success();
    submit_all(&dir, "1", ["500", "300", "120", "0", "0", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 50%"));

    costgrade(&dir)
        .args(["submissions", STUDENT])
        .assert()
        .success()
        .stdout(predicate::str::contains("50.00%"))
        .stdout(predicate::str::contains("100.00%").not())
        .stdout(predicate::str::contains("Submitted 1/2 invoice(s)"));
}

#[test]
fn submissions_empty() {
    let dir = seeded();
    costgrade(&dir)
        .args(["submissions", STUDENT])
        .assert()
        .success()
        .stdout(predicate::str::contains("No submissions recorded yet."));
}
