//! Suite construction and the case execution state machine.
//!
//! A suite is built once from an ordered name→value mapping; entries whose
//! names don't follow the `test_` convention are dropped, and the
//! leaf-versus-nested decision is made at construction, not per run. A run
//! walks the included entries strictly in declaration order, one case at a
//! time: execute the body, contain any abort at the case boundary,
//! reconcile the declared plan against the recorded assertion count, and
//! fold the case into the suite aggregates. Per-case failures never
//! propagate; only harness misuse ([`ConfigError`]) escapes `run`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::assert::{AssertKind, Assertion, CaseContext, CaseState};
use crate::errors::{AbortError, ConfigError};
use crate::report::TapReporter;

/// Names that mark a mapping entry as a test case (or nested suite).
const TEST_PREFIX: &str = "test_";

/// What a case body returns. `Err` aborts the case; the suite contains it.
pub type CaseResult = Result<(), AbortError>;

/// A case body, invoked with an explicit handle onto its own record.
pub type TestFn = Box<dyn Fn(&mut CaseContext) -> CaseResult>;

/// Construction input: the value side of a name→value mapping entry.
pub enum SuiteValue {
    Case(TestFn),
    Suite(Vec<(String, SuiteValue)>),
}

impl SuiteValue {
    pub fn case(f: impl Fn(&mut CaseContext) -> CaseResult + 'static) -> Self {
        SuiteValue::Case(Box::new(f))
    }

    pub fn suite(entries: Vec<(String, SuiteValue)>) -> Self {
        SuiteValue::Suite(entries)
    }
}

/// An included entry, tagged once at construction time.
enum SuiteEntry {
    Leaf(TestFn),
    Nested(Suite),
}

/// An ordered collection of test cases and nested suites.
pub struct Suite {
    name: String,
    entries: Vec<(String, SuiteEntry)>,
}

impl Suite {
    /// Builds a suite from an ordered name→value mapping. Only entries
    /// whose names start with `test_` are included; a callable value
    /// becomes a leaf case, a mapping becomes a nested suite. The suite's
    /// plan is the number of included entries.
    pub fn from_entries(name: impl Into<String>, entries: Vec<(String, SuiteValue)>) -> Self {
        let mut included = Vec::new();
        for (entry_name, value) in entries {
            if !entry_name.starts_with(TEST_PREFIX) {
                continue;
            }
            let entry = match value {
                SuiteValue::Case(f) => SuiteEntry::Leaf(f),
                SuiteValue::Suite(nested) => {
                    SuiteEntry::Nested(Suite::from_entries(entry_name.clone(), nested))
                }
            };
            included.push((entry_name, entry));
        }
        Suite {
            name: name.into(),
            entries: included,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of included entries, which is also the suite's plan.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every included case in declaration order and emits the final
    /// summary. Fails fast on an empty suite.
    pub fn run(&self, reporter: &mut TapReporter<'_>) -> Result<SuiteReport, ConfigError> {
        self.run_scoped(reporter, false)
    }

    fn run_scoped(
        &self,
        reporter: &mut TapReporter<'_>,
        nested: bool,
    ) -> Result<SuiteReport, ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::EmptySuite {
                name: self.name.clone(),
            });
        }

        let mut report = SuiteReport::default();
        reporter.plan(self.entries.len());

        for (name, entry) in &self.entries {
            let record = match entry {
                SuiteEntry::Leaf(f) => run_case(name, f, reporter, &mut report)?,
                SuiteEntry::Nested(suite) => run_nested(name, suite, reporter)?,
            };
            report.total_cases += 1;
            if !record.outcome.passed() {
                report.failed_cases += 1;
            }
            report.cases.push(record);
        }

        if !nested {
            finalize(&report, reporter);
        }
        Ok(report)
    }
}

/// Terminal classification of one case.
#[derive(Debug, Clone)]
pub enum CaseOutcome {
    Passed,
    /// Count of failed assertions, including implicit plan-mismatch
    /// failures. For a nested-suite case this is the nested failed-case
    /// count instead.
    FailedAssertions(usize),
    Aborted(AbortError),
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, CaseOutcome::Passed)
    }
}

/// Immutable record of a finalized case.
#[derive(Debug)]
pub struct CaseRecord {
    pub name: String,
    pub plan: Option<usize>,
    pub asserts: Vec<Assertion>,
    pub outcome: CaseOutcome,
    /// Present when this case delegated to a nested suite.
    pub nested: Option<SuiteReport>,
}

/// Aggregate result of one suite run.
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub cases: Vec<CaseRecord>,
    pub total_cases: usize,
    pub failed_cases: usize,
    pub total_asserts: usize,
    pub failed_asserts: usize,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.failed_cases == 0
    }
}

fn run_case(
    name: &str,
    f: &TestFn,
    reporter: &mut TapReporter<'_>,
    report: &mut SuiteReport,
) -> Result<CaseRecord, ConfigError> {
    reporter.case_header(name);
    let mut state = CaseState::new(name);

    let exec = {
        let mut ctx = CaseContext::new(&mut state, reporter);
        catch_unwind(AssertUnwindSafe(|| f(&mut ctx)))
    };

    // Harness misuse inside the body outranks the case outcome.
    if let Some(err) = state.config_error.take() {
        return Err(err);
    }

    Ok(match exec {
        Ok(Ok(())) => reconcile_plan(state, reporter, report),
        Ok(Err(e)) => record_abort(state, e, reporter, report),
        Err(payload) => record_abort(state, AbortError::from_panic(payload), reporter, report),
    })
}

/// Plan reconciliation for a case that ran to completion. An undeclared
/// plan is taken to be the recorded assertion count; a shortfall or surplus
/// against a declared plan is counted as that many implicit failures.
fn reconcile_plan(
    state: CaseState,
    reporter: &mut TapReporter<'_>,
    report: &mut SuiteReport,
) -> CaseRecord {
    let actual = state.asserts.len();
    let plan = state.plan.unwrap_or(actual);
    let plural = if plan == 1 { "assert" } else { "asserts" };

    let outcome = if actual < plan {
        let text = format!(
            "{} expected {} {} only got {}",
            state.name, plan, plural, actual
        );
        let text = reporter.config().red(&text);
        reporter.line(&text);
        report.total_asserts += plan;
        report.failed_asserts += state.asserts_failed + (plan - actual);
        CaseOutcome::FailedAssertions(state.asserts_failed + (plan - actual))
    } else if actual > plan {
        let text = format!(
            "{} expected {} {} but got {}",
            state.name, plan, plural, actual
        );
        let text = reporter.config().red(&text);
        reporter.line(&text);
        report.total_asserts += actual;
        report.failed_asserts += state.asserts_failed + (actual - plan);
        CaseOutcome::FailedAssertions(state.asserts_failed + (actual - plan))
    } else {
        report.total_asserts += plan;
        report.failed_asserts += state.asserts_failed;
        if state.asserts_failed == 0 {
            CaseOutcome::Passed
        } else {
            CaseOutcome::FailedAssertions(state.asserts_failed)
        }
    };

    CaseRecord {
        name: state.name,
        plan: state.plan,
        asserts: state.asserts,
        outcome,
        nested: None,
    }
}

/// Containment of an aborted case body: whatever was recorded before the
/// abort still counts, then exactly one synthetic failed "case" assertion
/// describes the death, carrying the error text and capture location.
fn record_abort(
    mut state: CaseState,
    error: AbortError,
    reporter: &mut TapReporter<'_>,
    report: &mut SuiteReport,
) -> CaseRecord {
    report.total_asserts += state.asserts.len();
    report.failed_asserts += state.asserts_failed;

    let mut diagnostic = error.message().to_string();
    if let Some(loc) = error.location() {
        diagnostic.push_str("\nat ");
        diagnostic.push_str(loc);
    }
    let headline = error.message().lines().next().unwrap_or("").to_string();
    let synthetic = Assertion {
        num: state.asserts.len() + 1,
        kind: AssertKind::Case,
        ok: false,
        message: Some(format!("{} died: {}", state.name, headline)),
        default_msg: None,
        diagnostic: Some(diagnostic.clone()),
    };
    reporter.assertion(&synthetic);
    reporter.diagnostic(&diagnostic);
    state.asserts.push(synthetic);
    report.total_asserts += 1;
    report.failed_asserts += 1;

    CaseRecord {
        name: state.name,
        plan: state.plan,
        asserts: state.asserts,
        outcome: CaseOutcome::Aborted(error),
        nested: None,
    }
}

/// A nested-suite case delegates entirely: the nested suite runs one level
/// deeper, and this case passes exactly when the nested run had zero
/// failed cases. Nested assertion tallies are not folded into the parent.
fn run_nested(
    name: &str,
    suite: &Suite,
    reporter: &mut TapReporter<'_>,
) -> Result<CaseRecord, ConfigError> {
    reporter.case_header(name);
    let nested = reporter.with_indent(|rep| suite.run_scoped(rep, true))?;
    let outcome = if nested.all_passed() {
        CaseOutcome::Passed
    } else {
        CaseOutcome::FailedAssertions(nested.failed_cases)
    };
    Ok(CaseRecord {
        name: name.to_string(),
        plan: None,
        asserts: Vec::new(),
        outcome,
        nested: Some(nested),
    })
}

/// Summary line for a top-level run.
fn finalize(report: &SuiteReport, reporter: &mut TapReporter<'_>) {
    if report.failed_cases == 0 {
        let text = reporter.config().green("All tests successful");
        reporter.line(&text);
        return;
    }
    let text = format!(
        "{}/{} tests ({}/{} asserts) failed",
        report.failed_cases, report.total_cases, report.failed_asserts, report.total_asserts
    );
    let text = reporter.config().red(&text);
    reporter.line(&text);
}
