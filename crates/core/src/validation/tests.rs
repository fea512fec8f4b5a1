use proptest::prelude::*;

use super::{ValidationError, ValidationWarning, validate, validate_batch, validate_rows};
use crate::iso::{IsoCode, IsoRegion};
use crate::record::{CellValue, ProjectRecord, SourceRow};

fn named(name: &str) -> ProjectRecord {
    ProjectRecord::default().with_project_name(name)
}

fn has_capacity_error(record: &ProjectRecord) -> bool {
    validate(record, 2).errors.contains(&ValidationError::InvalidCapacity)
}

#[test]
fn test_missing_both_names_is_error() {
    let outcome = validate(&ProjectRecord::default(), 2);
    assert_eq!(outcome.errors, vec![ValidationError::MissingName]);
    assert!(outcome.warnings.is_empty());
    assert!(outcome.normalized.is_none());
    assert!(!outcome.is_accepted());
}

#[test]
fn test_whitespace_names_count_as_missing() {
    let record = ProjectRecord::default().with_project_name("   ").with_project_codename("\t");
    assert_eq!(validate(&record, 2).errors, vec![ValidationError::MissingName]);
}

#[test]
fn test_codename_alone_is_enough() {
    let record = ProjectRecord::default().with_project_codename("Heron");
    let outcome = validate(&record, 5);
    assert!(outcome.is_accepted());
    assert_eq!(outcome.normalized.map(|n| n.name).as_deref(), Some("Heron"));
}

#[test]
fn test_capacity_rules() {
    assert!(has_capacity_error(&named("A").with_capacity_mw(-1.0)));
    assert!(has_capacity_error(&named("A").with_capacity_mw("-0.5")));
    assert!(has_capacity_error(&named("A").with_capacity_mw("n/a")));
    assert!(has_capacity_error(&named("A").with_capacity_mw(true)));
    assert!(!has_capacity_error(&named("A").with_capacity_mw(0.0)));
    assert!(!has_capacity_error(&named("A").with_capacity_mw("0")));
    assert!(!has_capacity_error(&named("A").with_capacity_mw(" 412.5 ")));
    assert!(!has_capacity_error(&named("A").with_capacity_mw("")));
    assert!(!has_capacity_error(&named("A")));
}

#[test]
fn test_iso_rules() {
    let known = validate(&named("A").with_iso("PJM"), 2);
    assert!(known.warnings.is_empty());
    assert_eq!(
        known.normalized.and_then(|n| n.iso),
        Some(IsoCode::Known(IsoRegion::Pjm))
    );

    let unknown = validate(&named("A").with_iso("FAKE"), 2);
    assert_eq!(unknown.warnings, vec![ValidationWarning::UnusualIso("FAKE".to_owned())]);
    assert!(unknown.is_accepted());

    let other = validate(&named("A").with_iso("Other"), 2);
    assert!(other.warnings.is_empty());

    let blank = validate(&named("A").with_iso(" "), 2);
    assert!(blank.warnings.is_empty());
}

#[test]
fn test_score_rules() {
    let high = validate(&named("A").with_overall_score(5.5), 2);
    assert_eq!(high.warnings, vec![ValidationWarning::ScoreOutOfRange(5.5)]);
    assert_eq!(high.warnings[0].to_string(), "Score 5.5 outside typical range 0-5");

    let negative = validate(&named("A").with_overall_score("-2"), 2);
    assert_eq!(negative.warnings.len(), 1);

    for ok in [0.0, 3.0, 5.0] {
        assert!(validate(&named("A").with_overall_score(ok), 2).warnings.is_empty());
    }
}

#[test]
fn test_unparseable_score_is_ignored() {
    let outcome = validate(&named("A").with_overall_score("excellent"), 2);
    assert!(outcome.errors.is_empty());
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.normalized.and_then(|n| n.overall_score), None);
}

#[test]
fn test_whole_number_score_formats_without_fraction() {
    let outcome = validate(&named("A").with_overall_score(6.0), 2);
    assert_eq!(outcome.warnings[0].to_string(), "Score 6 outside typical range 0-5");
}

#[test]
fn test_normalized_values() {
    let record = named("  Alpha Peaker ")
        .with_project_codename("AP")
        .with_capacity_mw("250")
        .with_iso(" ERCOT ")
        .with_overall_score(4.1);
    let normalized = validate(&record, 7).normalized;
    let Some(normalized) = normalized else {
        panic!("valid row should be normalized");
    };
    assert_eq!(normalized.row_index, 7);
    assert_eq!(normalized.name, "Alpha Peaker");
    assert_eq!(normalized.capacity_mw, Some(250.0));
    assert_eq!(normalized.iso, Some(IsoCode::Known(IsoRegion::Ercot)));
    assert_eq!(normalized.overall_score, Some(4.1));
}

#[test]
fn test_row_index_does_not_affect_rules() {
    let record = named("A").with_iso("FAKE");
    let a = validate(&record, 2);
    let b = validate(&record, 9000);
    assert_eq!(a.errors, b.errors);
    assert_eq!(a.warnings, b.warnings);
}

#[test]
fn test_rows_keep_physical_numbering() {
    let rows = vec![
        SourceRow::new(2, named("A")),
        SourceRow::new(5, ProjectRecord::default()),
        SourceRow::new(6, named("C").with_capacity_mw(-3.0)),
    ];
    let batch = validate_rows(&rows);
    let indexes: Vec<usize> = batch.outcomes.iter().map(|o| o.row_index).collect();
    assert_eq!(indexes, vec![2, 5, 6]);
    assert_eq!(
        batch.report().errors,
        vec!["Row 5: Missing Project Name or Codename", "Row 6: Invalid capacity value"]
    );
}

#[test]
fn test_hundred_row_batch() {
    let records: Vec<ProjectRecord> = (0..100)
        .map(|i| match i {
            3 | 21 | 40 | 77 | 98 => ProjectRecord::default().with_capacity_mw(10.0),
            10 | 50 | 90 => named(&format!("Project {i}")).with_overall_score(7.25),
            _ => named(&format!("Project {i}"))
                .with_capacity_mw(f64::from(i))
                .with_iso("MISO")
                .with_overall_score(2.5),
        })
        .collect();
    let batch = validate_batch(&records);
    let report = batch.report();
    assert_eq!(report.errors.len(), 5);
    assert_eq!(report.warnings.len(), 3);
    assert_eq!(batch.accepted_count(), 95);
    assert_eq!(batch.rejected_count(), 5);
    assert_eq!(report.errors[0], "Row 5: Missing Project Name or Codename");
    assert_eq!(report.warnings[0], "Row 12: Score 7.25 outside typical range 0-5");
}

fn name_cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        "[ \t]{0,3}".prop_map(CellValue::Text),
        "[A-Za-z][A-Za-z0-9 ]{0,20}".prop_map(CellValue::Text),
    ]
}

proptest! {
    #[test]
    fn prop_missing_names_always_error(
        capacity in proptest::option::of(0.0f64..10_000.0),
        iso in proptest::sample::select(vec!["PJM", "CAISO", "Other"]),
        score in 0.0f64..=5.0,
    ) {
        let record = ProjectRecord::default()
            .with_capacity_mw(capacity)
            .with_iso(iso)
            .with_overall_score(score);
        let outcome = validate(&record, 2);
        prop_assert!(outcome.errors.contains(&ValidationError::MissingName));
        prop_assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn prop_negative_capacity_always_error(capacity in -1.0e9f64..-1.0e-9) {
        prop_assert!(has_capacity_error(&named("A").with_capacity_mw(capacity)));
        prop_assert!(has_capacity_error(&named("A").with_capacity_mw(capacity.to_string())));
    }

    #[test]
    fn prop_non_negative_capacity_never_error(capacity in 0.0f64..1.0e9) {
        prop_assert!(!has_capacity_error(&named("A").with_capacity_mw(capacity)));
    }

    #[test]
    fn prop_out_of_range_score_single_warning(
        score in prop_oneof![-1.0e6f64..-1.0e-6, 5.000_001f64..1.0e6],
    ) {
        let outcome = validate(&named("A").with_overall_score(score), 2);
        prop_assert_eq!(outcome.warnings.len(), 1);
        prop_assert!(outcome.errors.is_empty());
    }

    #[test]
    fn prop_accepted_iff_no_errors(
        name in name_cell(),
        codename in name_cell(),
        capacity in proptest::option::of(-100.0f64..100.0),
    ) {
        let record = ProjectRecord {
            project_name: name,
            project_codename: codename,
            capacity_mw: capacity.into(),
            ..ProjectRecord::default()
        };
        let outcome = validate(&record, 2);
        prop_assert_eq!(outcome.normalized.is_some(), outcome.errors.is_empty());
    }
}
