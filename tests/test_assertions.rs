// The assertion vocabulary: ok, same, instance_of, matches, throws_ok.

use tapir::errors::AbortError;
use tapir::report::{OutputBuffer, ReportConfig, TapReporter};
use tapir::suite::{Suite, SuiteReport, SuiteValue};
use tapir::value::{Object, Pattern, PatternFlags, Value};

fn run_one(
    name: &str,
    f: impl Fn(&mut tapir::assert::CaseContext) -> tapir::suite::CaseResult + 'static,
) -> (SuiteReport, String) {
    let mut buf = OutputBuffer::new();
    let report = {
        let mut rep = TapReporter::new(&mut buf, ReportConfig::plain());
        Suite::from_entries("suite", vec![(name.to_string(), SuiteValue::case(f))])
            .run(&mut rep)
            .unwrap()
    };
    (report, buf.as_str().to_string())
}

#[test]
fn assertion_helpers_return_the_recorded_outcome() {
    let (report, _) = run_one("test_returns", |t| {
        let passed = t.ok(true, "truthy");
        let failed = t.ok(false, "falsy");
        t.ok(passed && !failed, "helpers report their own outcome");
        Ok(())
    });
    assert_eq!(report.total_asserts, 3);
    assert_eq!(report.failed_asserts, 1);
}

#[test]
fn same_with_fewer_than_two_values_is_trivially_true() {
    let (report, _) = run_one("test_trivial", |t| {
        t.same(&[], "empty");
        t.same(&[Value::Number(7.0)], "single");
        Ok(())
    });
    assert!(report.all_passed());
    assert_eq!(report.total_asserts, 2);
}

#[test]
fn same_checks_adjacent_pairs_only() {
    let (report, _) = run_one("test_chain", |t| {
        let ones = [Value::Number(1.0), Value::Number(1.0), Value::Number(1.0)];
        t.ok(t.name() == "test_chain", "context knows its case");
        t.same(&ones, "all adjacent pairs equal");
        let broken = [Value::Number(1.0), Value::Number(1.0), Value::Number(2.0)];
        let r = t.same(&broken, None);
        t.ok(!r, "a broken last pair fails the chain");
        Ok(())
    });
    assert_eq!(report.failed_asserts, 1);
}

#[test]
fn same_compares_structures_deeply() {
    let (report, _) = run_one("test_deep", |t| {
        let a = Value::Object(
            Object::of_class("Point")
                .with("x", 1.0)
                .with("tags", Value::Seq(vec!["a".into(), "b".into()])),
        );
        let b = Value::Object(
            Object::of_class("Point")
                .with("tags", Value::Seq(vec!["a".into(), "b".into()]))
                .with("x", 1.0),
        );
        t.same(&[a, b], "same class, same props");
        Ok(())
    });
    assert!(report.all_passed());
}

#[test]
fn instance_of_checks_the_nominal_type() {
    let (report, _) = run_one("test_instance", |t| {
        let point = Value::Object(Object::of_class("Point").with("x", 1.0));
        let plain = Value::Object(Object::plain());
        t.instance_of(&point, "Point", "right class");
        t.instance_of(&point, "Object", "everything composite is an Object");
        t.instance_of(&plain, "Object", "plain objects too");
        let wrong = t.instance_of(&point, "Vec2", None);
        t.ok(!wrong, "wrong class fails");
        let scalar = t.instance_of(&Value::Number(1.0), "Object", None);
        t.ok(!scalar, "scalars are no instance of anything");
        Ok(())
    });
    assert_eq!(report.failed_asserts, 2);
    assert_eq!(report.total_asserts, 7);
}

#[test]
fn matches_runs_the_pattern_against_the_text() {
    let (report, out) = run_one("test_matches", |t| {
        t.matches("hello world", &Pattern::new("wor"), "substring");
        let flags = PatternFlags {
            ignore_case: true,
            ..PatternFlags::default()
        };
        t.matches("HELLO", &Pattern::with_flags("hello", flags), "case folded");
        let miss = t.matches("hello", &Pattern::new("^world$"), None);
        t.ok(!miss, "anchored miss fails");
        Ok(())
    });
    assert_eq!(report.failed_asserts, 1);
    assert!(out.contains("1 ok - substring"));
}

#[test]
fn uncompilable_pattern_fails_with_a_diagnostic() {
    let (report, out) = run_one("test_bad_pattern", |t| {
        t.matches("anything", &Pattern::new("(unclosed"), "bad pattern");
        Ok(())
    });
    assert_eq!(report.failed_asserts, 1);
    assert!(
        out.contains("# pattern failed to compile:"),
        "missing compile diagnostic:\n{}",
        out
    );
}

#[test]
fn throws_ok_passes_on_err_and_on_panic() {
    let (report, out) = run_one("test_throws", |t| {
        t.throws_ok(|| Err(AbortError::new("expected failure")), "explicit err");
        t.throws_ok(
            || {
                panic!("loud failure");
            },
            "panic",
        );
        Ok(())
    });
    assert!(report.all_passed());
    assert!(out.contains("# caught: expected failure"));
    assert!(out.contains("# caught: loud failure"));
}

#[test]
fn throws_ok_fails_when_nothing_goes_wrong() {
    let (report, _) = run_one("test_no_throw", |t| {
        let r = t.throws_ok(|| Ok(()), "should have failed");
        t.ok(!r, "quiet closure fails throws_ok");
        Ok(())
    });
    assert_eq!(report.failed_asserts, 1);
}

#[test]
fn default_messages_kick_in_when_none_is_supplied() {
    let (_, out) = run_one("test_defaults", |t| {
        t.same(&[Value::Bool(true), Value::Bool(true)], None);
        t.instance_of(&Value::Object(Object::plain()), "Object", None);
        Ok(())
    });
    assert!(out.contains("1 ok - arguments are the same"));
    assert!(out.contains("2 ok - object is instance of type"));
}
