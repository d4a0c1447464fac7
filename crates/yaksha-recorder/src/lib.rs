//! Yaksha result recorder
//!
//! Records pass/fail outcomes of a test run in the files a downstream grader
//! reads:
//!
//! - one `identifier=true|false` line per test in a per-category text file
//! - one JSON result bundle per test in a combined JSON-lines log
//! - an XML manifest with one `<cases>` element per test, written at run end
//!
//! Results may also be forwarded to a remote grading endpoint through a
//! [`ResultSink`].
//!
//! # Example
//!
//! ```no_run
//! use yaksha_recorder::{RecorderOptions, ResultRecorder, TestStatus};
//!
//! let mut recorder = ResultRecorder::new(RecorderOptions::new("."));
//! recorder.initialize()?;
//! recorder.record_result(["TS-1", "Boundary", "returns correct sum"], TestStatus::Passed, None)?;
//! recorder.finalize()?;
//! # Ok::<(), yaksha_recorder::RecorderError>(())
//! ```

pub mod error;
pub mod host;
pub mod manifest;
pub mod outputs;
pub mod record;
pub mod recorder;
pub mod sink;
pub mod title;

pub use error::{RecorderError, RecorderResult};
pub use host::{EventStream, HostEvent, HostSession, SessionStep};
pub use manifest::Manifest;
pub use outputs::OutputFiles;
pub use record::{RecordShape, ResultBundle, TestCaseResult, TestStatus};
pub use recorder::{
    RecordOutcome, RecordedCase, RecorderOptions, RecorderState, ResultRecorder, RunSummary,
};
pub use sink::{Dispatcher, HttpSink, ResultSink, SinkOutcome};
pub use title::{Category, RawTitle, TestTitle, TitleError};
