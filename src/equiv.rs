//! Deep structural equivalence over [`Value`] trees.
//!
//! This is the predicate behind the `same` assertion. It is deliberately
//! stricter than coercive equality: only the identity rule equates values,
//! never type coercion. Rules are checked in order, first match wins:
//!
//! 1. Identity: scalar values equal by value, callables by handle identity.
//! 2. Either side is `Null` or `Undefined` (and rule 1 did not fire): false.
//! 3. Coarse type tags differ: false.
//! 4. Sequences: same length, elementwise recursion.
//! 5. Dates: same instant.
//! 6. Patterns: same source text and same flag set, flag by flag.
//! 7. Composites: same nominal type, then every property of `a` against the
//!    same-named property of `b` (missing properties compare as
//!    `Undefined`), then the sorted property-name sets of both sides as
//!    string sequences. The name-set pass is what catches `b` carrying
//!    extra properties `a` lacks.
//! 8. Callables not caught by rule 1: equal only when the comparison is
//!    currently inside a composite of a genuine user-defined nominal type
//!    (methods of class instances are not compared). At top level, or
//!    inside a plain object, the result is indeterminate and reported as
//!    not equal.
//! 9. Both numbers and both NaN: true.
//! 10. Otherwise: false.
//!
//! The nominal-type stack consulted by rule 8 is internal to a single
//! comparison; there is no shared or global state.

use crate::value::{Nominal, Object, Value};

/// True iff `a` and `b` are deeply structurally equivalent.
///
/// # Examples
///
/// ```rust
/// use tapir::equiv::equivalent;
/// use tapir::value::Value;
/// assert!(equivalent(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
/// assert!(!equivalent(&Value::Null, &Value::Undefined));
/// ```
pub fn equivalent(a: &Value, b: &Value) -> bool {
    Comparator::default().eq_values(a, b)
}

/// Chained form: true iff every adjacent pair of `values` is equivalent.
/// Fewer than two values is trivially true. Equivalence is checked pairwise
/// only; no claim is made beyond adjacency.
pub fn all_equivalent(values: &[Value]) -> bool {
    let mut cmp = Comparator::default();
    values.windows(2).all(|pair| cmp.eq_values(&pair[0], &pair[1]))
}

static UNDEFINED: Value = Value::Undefined;

/// Recursion state for one comparison: the nominal types of the composites
/// currently being recursed into. Consulted only by the callable rule; this
/// is not a cycle guard.
#[derive(Default)]
struct Comparator {
    enclosing: Vec<Nominal>,
}

impl Comparator {
    fn eq_values(&mut self, a: &Value, b: &Value) -> bool {
        if identical(a, b) {
            return true;
        }

        if a.is_null() || a.is_undefined() || b.is_null() || b.is_undefined() {
            return false;
        }

        match (a, b) {
            (Value::Seq(xs), Value::Seq(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(x, y)| self.eq_values(x, y))
            }
            (Value::Date(x), Value::Date(y)) => x == y,
            (Value::Pattern(x), Value::Pattern(y)) => {
                x.source == y.source
                    && x.flags.global == y.flags.global
                    && x.flags.ignore_case == y.flags.ignore_case
                    && x.flags.multiline == y.flags.multiline
            }
            (Value::Object(x), Value::Object(y)) => self.eq_objects(x, y),
            (Value::Callable(_), Value::Callable(_)) => {
                // Methods of class instances are skipped rather than
                // compared; anywhere else two distinct callables cannot be
                // proven equal, so they are not.
                matches!(self.enclosing.last(), Some(n) if n.is_class())
            }
            (Value::Number(x), Value::Number(y)) => x.is_nan() && y.is_nan(),
            _ => false,
        }
    }

    fn eq_objects(&mut self, a: &Object, b: &Object) -> bool {
        if a.class != b.class {
            return false;
        }

        self.enclosing.push(a.class.clone());
        for (name, av) in a.props.iter() {
            let bv = b.props.get(name).unwrap_or(&UNDEFINED);
            if !self.eq_values(av, bv) {
                self.enclosing.pop();
                return false;
            }
        }
        self.enclosing.pop();

        // Property names compared as two sorted string sequences, which
        // independently catches extra properties on b.
        let a_names = name_seq(a);
        let b_names = name_seq(b);
        self.eq_values(&a_names, &b_names)
    }
}

/// The identity rule: value equality for scalars, handle identity for
/// callables. Sequences, dates, patterns and composites have no identity
/// short-circuit here; the structural rules cover them.
fn identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Undefined, Value::Undefined) => true,
        // f64 equality, so NaN falls through to the NaN rule.
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Callable(x), Value::Callable(y)) => x.ptr_eq(y),
        _ => false,
    }
}

fn name_seq(obj: &Object) -> Value {
    Value::Seq(
        obj.sorted_prop_names()
            .into_iter()
            .map(Value::String)
            .collect(),
    )
}
