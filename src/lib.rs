pub use crate::errors::{AbortError, ConfigError};
pub use crate::report::{OutputBuffer, OutputSink, ReportConfig, StdoutSink, TapReporter};
pub use crate::suite::{CaseOutcome, CaseRecord, CaseResult, Suite, SuiteReport, SuiteValue};
pub use crate::value::Value;

pub mod assert;
pub mod equiv;
pub mod errors;
pub mod report;
pub mod suite;
pub mod value;
