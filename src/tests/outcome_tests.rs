use super::*;

#[test]
fn success_holds_value() {
    let outcome = make_success(42);
    assert!(outcome.is_success());
    assert!(!outcome.is_failure());
    assert!(!outcome.is_failure_transient());
    assert_eq!(outcome.success_value_or_panic(), 42);
}

#[test]
fn failure_reports_kind_and_transience() {
    let outcome: Outcome<()> = make_failure(FailureKind::Unrecognized, "throttled", true);
    assert!(outcome.is_failure());
    assert!(outcome.is_failure_of_kind(&FailureKind::Unrecognized));
    assert!(!outcome.is_failure_of_kind(&FailureKind::NotFound));
    assert!(outcome.is_failure_transient());
}

#[test]
fn kind_constructors_fix_transience() {
    assert!(!Failure::invalid_arguments("x").transient);
    assert!(!Failure::duplicate_event("x").transient);
    assert!(!Failure::not_found("x").transient);
    assert!(!Failure::corrupted("x").transient);
    assert!(Failure::unrecognized("x").transient);
}

#[test]
fn domain_kinds_compare_by_name() {
    let outcome: Outcome<()> = Err(Failure::new(
        FailureKind::Domain("ModelRefused".to_string()),
        "content policy",
        false,
    ));
    assert!(outcome.is_failure_of_kind(&FailureKind::Domain("ModelRefused".to_string())));
    assert!(!outcome.is_failure_of_kind(&FailureKind::Domain("Other".to_string())));
}

#[test]
fn display_includes_kind_and_detail() {
    let failure = Failure::not_found("no snapshots for wf-123456");
    assert_eq!(
        failure.to_string(),
        "NotFound (permanent): no snapshots for wf-123456"
    );
}

#[test]
fn failure_kind_serializes_snake_case() {
    let json = serde_json::to_string(&FailureKind::InvalidArguments).unwrap();
    assert_eq!(json, "\"invalid_arguments\"");
}

#[test]
#[should_panic(expected = "expected a successful outcome")]
fn success_value_or_panic_panics_on_failure() {
    let outcome: Outcome<u8> = Err(Failure::corrupted("bad body"));
    outcome.success_value_or_panic();
}
