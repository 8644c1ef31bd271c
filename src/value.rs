use std::fmt;
use std::sync::Arc;

use im::HashMap;

/// Represents a value in a Tapir value tree.
///
/// Value trees are what the harness compares with [`crate::equiv::equivalent`]
/// and renders in assertion diagnostics. `Null` and `Undefined` are distinct
/// values: they are identical to themselves but never to each other.
///
/// # Examples
///
/// ```rust
/// use tapir::value::Value;
/// let n = Value::Number(3.14);
/// assert_eq!(n.type_name(), "Number");
/// let s = Value::String("hello".to_string());
/// assert_eq!(s.type_name(), "String");
/// let null = Value::default();
/// assert!(null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Undefined,
    Number(f64),
    Bool(bool),
    String(String),
    /// An instant, as milliseconds since the epoch.
    Date(i64),
    Pattern(Pattern),
    Seq(Vec<Value>),
    Object(Object),
    Callable(Callable),
}

impl Value {
    /// Returns the type name of the value as a string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tapir::value::Value;
    /// let v = Value::Bool(true);
    /// assert_eq!(v.type_name(), "Bool");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Undefined => "Undefined",
            Value::Number(_) => "Number",
            Value::Bool(_) => "Bool",
            Value::String(_) => "String",
            Value::Date(_) => "Date",
            Value::Pattern(_) => "Pattern",
            Value::Seq(_) => "Seq",
            Value::Object(_) => "Object",
            Value::Callable(_) => "Callable",
        }
    }

    /// Returns true if the value is Null.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tapir::value::Value;
    /// assert!(Value::Null.is_null());
    /// assert!(!Value::Undefined.is_null());
    /// ```
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value is Undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns the contained number if this is a Number value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tapir::value::Value;
    /// let v = Value::Number(2.0);
    /// assert_eq!(v.as_number(), Some(2.0));
    /// let v2 = Value::String("nope".to_string());
    /// assert_eq!(v2.as_number(), None);
    /// ```
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained bool if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained string if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Multi-line rendering used in assertion diagnostics. Scalars render as
    /// in [`fmt::Display`]; sequences and objects get one entry per line so
    /// mismatches can be shown as a line diff.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, 0);
        out
    }

    fn pretty_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Value::Seq(items) if !items.is_empty() => {
                out.push_str("[\n");
                for item in items {
                    out.push_str(&pad);
                    out.push_str("  ");
                    item.pretty_into(out, depth + 1);
                    out.push_str(",\n");
                }
                out.push_str(&pad);
                out.push(']');
            }
            Value::Object(obj) if !obj.props.is_empty() => {
                if let Nominal::Class(name) = &obj.class {
                    out.push_str(name);
                    out.push(' ');
                }
                out.push_str("{\n");
                for name in obj.sorted_prop_names() {
                    out.push_str(&pad);
                    out.push_str("  ");
                    out.push_str(&name);
                    out.push_str(": ");
                    obj.props[&name].pretty_into(out, depth + 1);
                    out.push_str(",\n");
                }
                out.push_str(&pad);
                out.push('}');
            }
            other => {
                out.push_str(&other.to_string());
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Number(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Date(ms) => write!(f, "Date({})", ms),
            Value::Pattern(p) => write!(f, "{}", p),
            Value::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(obj) => write!(f, "{}", obj),
            Value::Callable(c) => write!(f, "{}", c),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

/// The nominal type of a composite value: either the bare object root type
/// or a named, user-defined constructor identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nominal {
    Plain,
    Class(Arc<str>),
}

impl Nominal {
    pub fn class(name: impl AsRef<str>) -> Self {
        Nominal::Class(Arc::from(name.as_ref()))
    }

    /// True for a genuine user-defined type, false for the bare object root.
    pub fn is_class(&self) -> bool {
        matches!(self, Nominal::Class(_))
    }
}

impl Default for Nominal {
    fn default() -> Self {
        Nominal::Plain
    }
}

/// A composite value: a nominal type plus enumerable properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    pub class: Nominal,
    pub props: HashMap<String, Value>,
}

impl Object {
    /// A plain object with no nominal type beyond the object root.
    pub fn plain() -> Self {
        Self::default()
    }

    /// An instance of the named user-defined type.
    pub fn of_class(name: impl AsRef<str>) -> Self {
        Object {
            class: Nominal::class(name),
            props: HashMap::new(),
        }
    }

    /// Adds a property, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Property names in sorted order. The backing map does not keep
    /// insertion order, so every rendering and comparison site sorts.
    pub fn sorted_prop_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.props.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Nominal::Class(name) = &self.class {
            write!(f, "{} ", name)?;
        }
        write!(f, "{{")?;
        for (i, name) in self.sorted_prop_names().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: {}", name, self.props[name])?;
        }
        write!(f, " }}")
    }
}

/// Flag set carried by a [`Pattern`] value. Each flag is compared
/// independently during equivalence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternFlags {
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
}

/// A pattern value: source text plus a flag set.
///
/// Equivalence looks only at the source text and flags; the source is
/// compiled (lazily, via the `regex` crate) only when the `matches`
/// assertion needs to run it against a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub source: String,
    pub flags: PatternFlags,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Pattern {
            source: source.into(),
            flags: PatternFlags::default(),
        }
    }

    pub fn with_flags(source: impl Into<String>, flags: PatternFlags) -> Self {
        Pattern {
            source: source.into(),
            flags,
        }
    }

    /// Compiles the pattern for matching. The `global` flag affects search
    /// iteration, not matching, so it does not participate here.
    pub fn to_regex(&self) -> Result<regex::Regex, regex::Error> {
        let mut prefixed = String::new();
        if self.flags.ignore_case {
            prefixed.push_str("(?i)");
        }
        if self.flags.multiline {
            prefixed.push_str("(?m)");
        }
        prefixed.push_str(&self.source);
        regex::Regex::new(&prefixed)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)?;
        if self.flags.global {
            write!(f, "g")?;
        }
        if self.flags.ignore_case {
            write!(f, "i")?;
        }
        if self.flags.multiline {
            write!(f, "m")?;
        }
        Ok(())
    }
}

/// An opaque callable value. The harness never invokes these; they exist so
/// value trees can hold function-typed properties, and so two handles cloned
/// from the same `Callable` compare identical while independently created
/// ones never do.
#[derive(Clone)]
pub struct Callable {
    name: Option<String>,
    token: Arc<()>,
}

impl Callable {
    pub fn new() -> Self {
        Callable {
            name: None,
            token: Arc::new(()),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Callable {
            name: Some(name.into()),
            token: Arc::new(()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Identity: true iff both handles were cloned from the same `Callable`.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }
}

impl Default for Callable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Callable({})", name),
            None => write!(f, "Callable"),
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "function {}", name),
            None => write!(f, "function"),
        }
    }
}
