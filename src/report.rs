//! TAP output: sinks, colorization and the line formatter.
//!
//! All report text flows through the [`OutputSink`] trait, so the same run
//! can print to stdout or collect into a buffer for inspection. The
//! reporter owns no test semantics; it formats and indents what it is told.

use crate::assert::Assertion;

// Color constants for terminal output
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";

/// Destination for pre-formatted report lines.
pub trait OutputSink {
    fn line(&mut self, text: &str);
}

/// Collects report lines into a String for testing or programmatic capture.
#[derive(Default)]
pub struct OutputBuffer {
    buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines().collect()
    }
}

impl OutputSink for OutputBuffer {
    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

/// Writes report lines to stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn line(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Discards all output.
pub struct NullSink;

impl OutputSink for NullSink {
    fn line(&mut self, _text: &str) {}
}

/// Report appearance. Colors default to on when stdout is a terminal;
/// toggling them never changes what passes or fails, only the decoration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub use_colors: bool,
    pub indent_unit: &'static str,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
            indent_unit: "  ",
        }
    }
}

impl ReportConfig {
    /// Colors off, for buffers and tests.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors && !text.is_empty() {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    pub fn green(&self, text: &str) -> String {
        self.colorize(text, GREEN)
    }

    pub fn red(&self, text: &str) -> String {
        self.colorize(text, RED)
    }
}

/// Formats and writes plan markers, assertion lines and diagnostics, with
/// one indent unit per nesting depth.
pub struct TapReporter<'o> {
    sink: &'o mut dyn OutputSink,
    config: ReportConfig,
    depth: usize,
}

impl<'o> TapReporter<'o> {
    pub fn new(sink: &'o mut dyn OutputSink, config: ReportConfig) -> Self {
        TapReporter {
            sink,
            config,
            depth: 0,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Writes one line at the current depth.
    pub fn line(&mut self, text: &str) {
        let indent = self.config.indent_unit.repeat(self.depth);
        self.sink.line(&format!("{}{}", indent, text));
    }

    /// The `1..<plan>` marker for the scope about to run.
    pub fn plan(&mut self, count: usize) {
        self.line(&format!("1..{}", count));
    }

    /// The `<name>:` header that opens a case.
    pub fn case_header(&mut self, name: &str) {
        self.line(&format!("{}:", name));
    }

    /// One assertion: ordinal, ok/not-ok tag, then the supplied message or
    /// the assertion kind's default, if either exists.
    pub fn assertion(&mut self, a: &Assertion) {
        let tag = if a.ok {
            self.config.green("ok")
        } else {
            self.config.red("not ok")
        };
        let mut text = format!("{} {}", a.num, tag);
        if let Some(msg) = a.message.as_deref().or(a.default_msg) {
            text.push_str(" - ");
            text.push_str(msg);
        }
        self.line(&text);
    }

    /// Comment-prefixed diagnostic lines, one `#` per input line.
    pub fn diagnostic(&mut self, text: &str) {
        for part in text.lines() {
            self.line(&format!("# {}", part));
        }
    }

    /// Runs `f` one level deeper, restoring the depth on the way out. Case
    /// bodies are contained at the case boundary, so nothing unwinds
    /// through here.
    pub fn with_indent<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
