//! Assertion recording.
//!
//! A running case gets a [`CaseContext`]: an explicit handle onto its own
//! record and the reporter. Every assertion helper lives here, records one
//! outcome against the case, and returns the recorded boolean so callers
//! can branch on it.

use std::panic::{catch_unwind, AssertUnwindSafe};

use difference::{Changeset, Difference};

use crate::equiv::all_equivalent;
use crate::errors::{AbortError, ConfigError};
use crate::report::TapReporter;
use crate::value::{Nominal, Pattern, Value};

/// What kind of check produced an [`Assertion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertKind {
    Ok,
    Same,
    InstanceOf,
    Matches,
    ThrowsOk,
    /// Synthetic record describing a whole case, used when a case aborts.
    Case,
}

/// One recorded assertion outcome.
#[derive(Debug, Clone)]
pub struct Assertion {
    /// Ordinal within the case, starting at 1.
    pub num: usize,
    pub kind: AssertKind,
    pub ok: bool,
    pub message: Option<String>,
    pub default_msg: Option<&'static str>,
    /// Extra human-readable context, emitted as `#` comment lines.
    pub diagnostic: Option<String>,
}

/// Mutable record of the case currently executing. Owned by the suite;
/// frozen into a `CaseRecord` once the case finalizes.
pub(crate) struct CaseState {
    pub name: String,
    pub plan: Option<usize>,
    pub asserts: Vec<Assertion>,
    pub asserts_failed: usize,
    pub config_error: Option<ConfigError>,
}

impl CaseState {
    pub fn new(name: &str) -> Self {
        CaseState {
            name: name.to_string(),
            plan: None,
            asserts: Vec::new(),
            asserts_failed: 0,
            config_error: None,
        }
    }
}

/// The handle a case body asserts through. Holds the case record and the
/// reporter for exactly as long as the case is current.
pub struct CaseContext<'c, 'o> {
    case: &'c mut CaseState,
    reporter: &'c mut TapReporter<'o>,
}

impl<'c, 'o> CaseContext<'c, 'o> {
    pub(crate) fn new(case: &'c mut CaseState, reporter: &'c mut TapReporter<'o>) -> Self {
        CaseContext { case, reporter }
    }

    /// Name of the case this context belongs to.
    pub fn name(&self) -> &str {
        &self.case.name
    }

    /// Declares the expected number of assertions for this case and emits
    /// the plan line. Legal at most once, and only before any assertion.
    pub fn expect(&mut self, count: usize) -> Result<(), ConfigError> {
        if !self.case.asserts.is_empty() {
            return Err(self.config_error(ConfigError::PlanAfterAssertion {
                case: self.case.name.clone(),
            }));
        }
        if self.case.plan.is_some() {
            return Err(self.config_error(ConfigError::PlanRedeclared {
                case: self.case.name.clone(),
            }));
        }
        self.case.plan = Some(count);
        self.reporter.plan(count);
        Ok(())
    }

    /// Records `test` as an assertion outcome.
    pub fn ok<'m>(&mut self, test: bool, msg: impl Into<Option<&'m str>>) -> bool {
        self.do_assert(Assertion {
            num: 0,
            kind: AssertKind::Ok,
            ok: test,
            message: msg.into().map(str::to_string),
            default_msg: None,
            diagnostic: None,
        })
    }

    /// Records whether every adjacent pair of `values` is deeply
    /// equivalent. Fewer than two values passes trivially. On failure the
    /// first two values are rendered as a wanted/got diagnostic.
    pub fn same<'m>(&mut self, values: &[Value], msg: impl Into<Option<&'m str>>) -> bool {
        let ok = all_equivalent(values);
        let diagnostic = if !ok && values.len() >= 2 {
            Some(same_diagnostic(&values[0], &values[1]))
        } else {
            None
        };
        self.do_assert(Assertion {
            num: 0,
            kind: AssertKind::Same,
            ok,
            message: msg.into().map(str::to_string),
            default_msg: Some("arguments are the same"),
            diagnostic,
        })
    }

    /// Records whether `value` is a composite of the named nominal type.
    /// Every composite is an instance of the object root type `"Object"`.
    pub fn instance_of<'m>(
        &mut self,
        value: &Value,
        class: &str,
        msg: impl Into<Option<&'m str>>,
    ) -> bool {
        let ok = match value {
            Value::Object(obj) => match &obj.class {
                Nominal::Class(name) => &**name == class || class == "Object",
                Nominal::Plain => class == "Object",
            },
            _ => false,
        };
        self.do_assert(Assertion {
            num: 0,
            kind: AssertKind::InstanceOf,
            ok,
            message: msg.into().map(str::to_string),
            default_msg: Some("object is instance of type"),
            diagnostic: None,
        })
    }

    /// Records whether `text` matches `pattern`. A pattern that fails to
    /// compile records a failure with the compile error as diagnostic; it
    /// never escapes the case.
    pub fn matches<'m>(
        &mut self,
        text: &str,
        pattern: &Pattern,
        msg: impl Into<Option<&'m str>>,
    ) -> bool {
        let (ok, diagnostic) = match pattern.to_regex() {
            Ok(re) => (re.is_match(text), None),
            Err(e) => (false, Some(format!("pattern failed to compile: {}", e))),
        };
        self.do_assert(Assertion {
            num: 0,
            kind: AssertKind::Matches,
            ok,
            message: msg.into().map(str::to_string),
            default_msg: Some("text matches pattern"),
            diagnostic,
        })
    }

    /// Records whether `f` failed: returned `Err` or panicked. The caught
    /// error text is attached as a diagnostic.
    pub fn throws_ok<'m, F>(&mut self, f: F, msg: impl Into<Option<&'m str>>) -> bool
    where
        F: FnOnce() -> Result<(), AbortError>,
    {
        let result = catch_unwind(AssertUnwindSafe(f));
        let (ok, diagnostic) = match result {
            Ok(Ok(())) => (false, None),
            Ok(Err(e)) => (true, Some(format!("caught: {}", e))),
            Err(payload) => {
                let e = AbortError::from_panic(payload);
                (true, Some(format!("caught: {}", e)))
            }
        };
        self.do_assert(Assertion {
            num: 0,
            kind: AssertKind::ThrowsOk,
            ok,
            message: msg.into().map(str::to_string),
            default_msg: Some("code failed as expected"),
            diagnostic,
        })
    }

    /// Emits comment lines without recording an assertion.
    pub fn diag(&mut self, text: &str) {
        self.reporter.diagnostic(text);
    }

    /// Records and emits one assertion. Ordinals are strictly increasing
    /// from 1 within the case.
    fn do_assert(&mut self, mut a: Assertion) -> bool {
        a.num = self.case.asserts.len() + 1;
        let ok = a.ok;
        if !ok {
            self.case.asserts_failed += 1;
        }
        self.reporter.assertion(&a);
        if let Some(diag) = &a.diagnostic {
            self.reporter.diagnostic(diag);
        }
        self.case.asserts.push(a);
        ok
    }

    fn config_error(&mut self, err: ConfigError) -> ConfigError {
        self.case.config_error = Some(err.clone());
        err
    }
}

/// Wanted/got rendering for a failed `same`. Multi-line renderings (nested
/// sequences and composites) additionally get a line diff.
fn same_diagnostic(wanted: &Value, got: &Value) -> String {
    let w = wanted.pretty();
    let g = got.pretty();
    let mut out = format!("wanted: {}\ngot: {}", w, g);
    if w.contains('\n') || g.contains('\n') {
        out.push_str("\ndiff:");
        let changeset = Changeset::new(&w, &g, "\n");
        for diff in &changeset.diffs {
            let (prefix, chunk) = match diff {
                Difference::Same(x) => (' ', x),
                Difference::Rem(x) => ('-', x),
                Difference::Add(x) => ('+', x),
            };
            for line in chunk.lines() {
                out.push('\n');
                out.push(prefix);
                out.push_str(line);
            }
        }
    }
    out
}
