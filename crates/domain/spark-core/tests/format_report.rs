use spark_core::formats::{validate, RecordKind};

#[test]
fn clean_project_text_is_valid() {
    let raw = "\
=== PROJECT RECOMMENDATIONS ===
Project #1:
Title: Portfolio
Description: Personal site
Skills: HTML, CSS
Difficulty: beginner
";
    let report = validate(RecordKind::Project, raw);
    assert!(report.is_valid());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.summary(), "Format is valid");
}

#[test]
fn short_project_header_is_accepted() {
    let raw = "=== PROJECT ===\nProject #1:\nTitle: T\nDescription: D\nSkills: S\nDifficulty: advanced\n";
    assert!(validate(RecordKind::Project, raw).is_valid());
}

#[test]
fn missing_project_section_is_an_error() {
    let report = validate(RecordKind::Project, "Project #1:\nTitle: T");
    assert!(!report.is_valid());
    assert_eq!(
        report.errors,
        vec!["Missing required section: === PROJECT RECOMMENDATIONS ==="]
    );
    assert!(report.summary().starts_with("Format is invalid: 1 errors"));
}

#[test]
fn missing_fields_and_bad_difficulty_are_warnings() {
    let raw = "\
=== PROJECT RECOMMENDATIONS ===
Project #1:
Title: Half done
Difficulty: impossible
";
    let report = validate(RecordKind::Project, raw);
    assert!(report.is_valid());
    assert!(report
        .warnings
        .contains(&"Project #1 missing field: Description".to_string()));
    assert!(report
        .warnings
        .contains(&"Project #1 missing field: Skills".to_string()));
    assert!(report.warnings.iter().any(|w| w.contains("invalid difficulty")));
    assert_eq!(report.summary(), "Format is valid (with 3 warnings)");
}

#[test]
fn job_market_reports_each_missing_section() {
    let raw = "=== JOB LISTINGS ===\nJob #1:\nTitle: Dev\nCompany: Co\nLocation: Remote\nType: Contract\nSkills: Rust\n";
    let report = validate(RecordKind::JobMarket, raw);
    assert_eq!(report.errors.len(), 4);
    assert!(report
        .errors
        .contains(&"Missing required section: === HOT ROLES ===".to_string()));
    assert!(report.warnings.is_empty());
}

#[test]
fn job_market_flags_malformed_bullets() {
    let raw = "\
=== JOB LISTINGS ===
=== HOT ROLES ===
- Engineer lots of openings
=== IN-DEMAND SKILLS ===
- Rust (high demand, 10 listings)
=== TOP EMPLOYERS ===
- Acme (3 openings)
=== MARKET TRENDS ===
[POSITIVE] Growth
";
    let report = validate(RecordKind::JobMarket, raw);
    assert!(report.is_valid());
    assert!(report.warnings.contains(&"No job entries found".to_string()));
    assert!(report
        .warnings
        .contains(&"No properly formatted hot roles found".to_string()));
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn course_report_checks_catalog_fields() {
    let raw = "\
=== COURSE CATALOG ===
Course #1:
Code: CS 1337
Name: CS I
Credits: 3
Difficulty: beginner
Course #2:
Code: CS 2336
Difficulty: hard
=== SEMESTER PLAN ===
- Fall (3 credits): CS 1337
=== PREREQUISITES ===
- CS 1337 (required for: CS 2336)
=== SKILL AREAS ===
- Programming (high importance): CS 1337
=== ACADEMIC RESOURCES ===
[workshop] Git basics
";
    let report = validate(RecordKind::Course, raw);
    assert!(report.is_valid(), "{:?}", report.errors);
    assert_eq!(
        report.warnings,
        vec![
            "Course #2 missing field: Name".to_string(),
            "Course #2 missing field: Credits".to_string(),
            "Course #2 has invalid difficulty level (must be beginner/intermediate/advanced)"
                .to_string(),
        ]
    );
}
