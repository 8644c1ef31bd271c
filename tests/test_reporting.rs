// Report text: TAP shape, indentation, colorization, summaries.

use tapir::report::{OutputBuffer, ReportConfig, TapReporter};
use tapir::suite::{Suite, SuiteReport, SuiteValue};
use tapir::value::Value;

fn run_with(config: ReportConfig, entries: Vec<(String, SuiteValue)>) -> (SuiteReport, String) {
    let mut buf = OutputBuffer::new();
    let report = {
        let mut rep = TapReporter::new(&mut buf, config);
        Suite::from_entries("suite", entries).run(&mut rep).unwrap()
    };
    (report, buf.as_str().to_string())
}

fn entry(name: &str, value: SuiteValue) -> (String, SuiteValue) {
    (name.to_string(), value)
}

#[test]
fn full_transcript_of_a_small_suite() {
    let (_, out) = run_with(
        ReportConfig::plain(),
        vec![
            entry(
                "test_planned",
                SuiteValue::case(|t| {
                    t.expect(2)?;
                    t.ok(true, "first");
                    t.ok(true, "second");
                    Ok(())
                }),
            ),
            entry(
                "test_unplanned",
                SuiteValue::case(|t| {
                    t.ok(true, None);
                    Ok(())
                }),
            ),
        ],
    );
    let expected = "\
1..2
test_planned:
1..2
1 ok - first
2 ok - second
test_unplanned:
1 ok
All tests successful
";
    assert_eq!(out, expected);
}

#[test]
fn nested_suites_indent_their_whole_run() {
    let (_, out) = run_with(
        ReportConfig::plain(),
        vec![entry(
            "test_outer",
            SuiteValue::suite(vec![entry(
                "test_inner",
                SuiteValue::case(|t| {
                    t.expect(1)?;
                    t.ok(true, "deep");
                    Ok(())
                }),
            )]),
        )],
    );
    let expected = "\
1..1
test_outer:
  1..1
  test_inner:
  1..1
  1 ok - deep
All tests successful
";
    assert_eq!(out, expected);
}

#[test]
fn plan_line_follows_the_case_header_immediately() {
    let (_, out) = run_with(
        ReportConfig::plain(),
        vec![entry(
            "test_planned",
            SuiteValue::case(|t| {
                t.expect(1)?;
                t.ok(true, "a");
                Ok(())
            }),
        )],
    );
    let lines: Vec<&str> = out.lines().collect();
    let header = lines.iter().position(|l| *l == "test_planned:").unwrap();
    assert_eq!(lines[header + 1], "1..1");
}

#[test]
fn failed_same_attaches_wanted_got_diagnostics() {
    let (_, out) = run_with(
        ReportConfig::plain(),
        vec![entry(
            "test_fail",
            SuiteValue::case(|t| {
                t.same(
                    &[Value::Number(1.0), Value::Number(2.0)],
                    "numbers line up",
                );
                Ok(())
            }),
        )],
    );
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.contains(&"1 not ok - numbers line up"));
    assert!(lines.contains(&"# wanted: 1"));
    assert!(lines.contains(&"# got: 2"));
}

#[test]
fn diag_emits_comments_without_recording_assertions() {
    let (report, out) = run_with(
        ReportConfig::plain(),
        vec![entry(
            "test_notes",
            SuiteValue::case(|t| {
                t.diag("setting up fixtures");
                t.ok(true, "done");
                Ok(())
            }),
        )],
    );
    assert_eq!(report.total_asserts, 1);
    assert!(out.contains("# setting up fixtures\n"));
}

#[test]
fn colorization_decorates_without_changing_outcomes() {
    let entries = || {
        vec![
            entry(
                "test_pass",
                SuiteValue::case(|t| {
                    t.ok(true, "good");
                    Ok(())
                }),
            ),
            entry(
                "test_fail",
                SuiteValue::case(|t| {
                    t.ok(false, "bad");
                    Ok(())
                }),
            ),
        ]
    };
    let (plain_report, plain_out) = run_with(ReportConfig::plain(), entries());
    let colored = ReportConfig {
        use_colors: true,
        ..ReportConfig::plain()
    };
    let (colored_report, colored_out) = run_with(colored, entries());

    assert_eq!(plain_report.total_cases, colored_report.total_cases);
    assert_eq!(plain_report.failed_cases, colored_report.failed_cases);
    assert_eq!(plain_report.total_asserts, colored_report.total_asserts);
    assert_eq!(plain_report.failed_asserts, colored_report.failed_asserts);

    assert!(colored_out.contains("\x1b[32mok\x1b[0m"));
    assert!(colored_out.contains("\x1b[31mnot ok\x1b[0m"));
    assert!(!plain_out.contains('\x1b'));

    // Same text once the escapes are stripped.
    let stripped = colored_out.replace("\x1b[32m", "").replace("\x1b[31m", "").replace("\x1b[0m", "");
    assert_eq!(stripped, plain_out);
}

#[test]
fn success_summary_is_unqualified() {
    let (_, out) = run_with(
        ReportConfig::plain(),
        vec![entry(
            "test_only",
            SuiteValue::case(|t| {
                t.ok(true, "fine");
                Ok(())
            }),
        )],
    );
    assert!(out.ends_with("All tests successful\n"));
}

#[test]
fn failure_summary_counts_cases_and_asserts() {
    let (_, out) = run_with(
        ReportConfig::plain(),
        vec![
            entry(
                "test_good",
                SuiteValue::case(|t| {
                    t.ok(true, "a");
                    t.ok(true, "b");
                    Ok(())
                }),
            ),
            entry(
                "test_bad",
                SuiteValue::case(|t| {
                    t.ok(false, "c");
                    Ok(())
                }),
            ),
        ],
    );
    assert!(out.ends_with("1/2 tests (1/3 asserts) failed\n"));
}

#[test]
fn nested_suite_emits_no_summary_of_its_own() {
    let (_, out) = run_with(
        ReportConfig::plain(),
        vec![entry(
            "test_outer",
            SuiteValue::suite(vec![entry(
                "test_inner",
                SuiteValue::case(|t| {
                    t.ok(true, "deep");
                    Ok(())
                }),
            )]),
        )],
    );
    assert_eq!(out.matches("All tests successful").count(), 1);
}
