//! The result recorder.
//!
//! A [`ResultRecorder`] owns every piece of run state: the side-channel
//! data, the manifest accumulator, the running summary and the optional
//! remote dispatcher. Its lifecycle is
//!
//! ```text
//! new -> initialize -> record_result* -> finalize -> dispose
//! ```
//!
//! `record_result` and `finalize` are rejected outside a run. Initializing
//! again starts a fresh run in the same working directory.

use crate::error::{RecorderError, RecorderResult};
use crate::manifest::Manifest;
use crate::outputs::{append_line, OutputFiles};
use crate::record::{RecordShape, TestCaseResult, TestStatus};
use crate::sink::{Dispatcher, ResultSink, SinkOutcome};
use crate::title::{Category, RawTitle, TitleError};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use yaksha_config::{Config, Paths};

/// Where a recorder reads and writes, and how it shapes records
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    /// Working directory every relative path is resolved against
    pub root: PathBuf,
    pub paths: Paths,
    pub shape: RecordShape,
}

impl RecorderOptions {
    /// Default layout under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paths: Paths::default(),
            shape: RecordShape::default(),
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            root: root.into(),
            paths: config.paths(),
            shape: RecordShape::from_config(config),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Uninitialized,
    Recording,
    Finalized,
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecorderState::Uninitialized => "uninitialized",
            RecorderState::Recording => "recording",
            RecorderState::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// A result that made it into the output files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCase {
    pub category: Category,
    pub identifier: String,
    pub category_file: PathBuf,
    pub result: TestCaseResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(RecordedCase),
    /// The title was unusable; nothing was written
    Skipped(TitleError),
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded(_))
    }
}

/// Counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub recorded: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub struct ResultRecorder {
    root: PathBuf,
    outputs: OutputFiles,
    shape: RecordShape,
    state: RecorderState,
    custom_data: String,
    manifest: Manifest,
    summary: RunSummary,
    dispatcher: Option<Dispatcher>,
}

impl ResultRecorder {
    pub fn new(options: RecorderOptions) -> Self {
        Self {
            outputs: OutputFiles::resolve(&options.root, &options.paths),
            root: options.root,
            shape: options.shape,
            state: RecorderState::Uninitialized,
            custom_data: String::new(),
            manifest: Manifest::new(),
            summary: RunSummary::default(),
            dispatcher: None,
        }
    }

    /// Forward every recorded bundle to `sink` without waiting for it
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.dispatcher = Some(Dispatcher::new(sink));
        self
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn custom_data(&self) -> &str {
        &self.custom_data
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn outputs(&self) -> &OutputFiles {
        &self.outputs
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Start a run: load side-channel data, then delete previous outputs
    pub fn initialize(&mut self) -> RecorderResult<()> {
        self.custom_data = self.outputs.read_custom_data().unwrap_or_default();
        self.outputs.clear()?;
        self.manifest.clear();
        self.summary = RunSummary::default();
        self.state = RecorderState::Recording;
        info!("Recorder initialized in {}", self.root.display());
        Ok(())
    }

    /// Record one completed test.
    ///
    /// Appends the JSON bundle to the combined log and `identifier=<bool>` to
    /// the category file, then adds a manifest case. An unusable title is
    /// reported as [`RecordOutcome::Skipped`] and touches nothing.
    pub fn record_result(
        &mut self,
        title: impl Into<RawTitle>,
        status: TestStatus,
        error: Option<&str>,
    ) -> RecorderResult<RecordOutcome> {
        self.require_recording("record a result")?;

        let raw = title.into();
        let title = match raw.resolve() {
            Ok(title) => title,
            Err(reason) => {
                error!("Test title is not a valid string: {:?} ({})", raw, reason);
                self.summary.skipped += 1;
                return Ok(RecordOutcome::Skipped(reason));
            }
        };

        let category = title.category();
        let result = self.shape.build_result(&title, status, error);
        let identifier = result.identifier.clone();
        let bundle = self.shape.build_bundle(result.clone(), &self.custom_data);
        let payload = bundle.to_line()?;

        append_line(&self.outputs.combined_log, &payload)?;

        let category_file = self.outputs.category_file(category).to_path_buf();
        let line = format!("{}={}", identifier, status.is_passed());
        append_line(&category_file, &line)?;
        info!(
            "Writing to file: {} with content: {}",
            category_file.display(),
            line
        );

        self.manifest.push(category, identifier.clone());

        if let Some(dispatcher) = self.dispatcher.as_mut() {
            dispatcher.dispatch(payload);
        }

        self.summary.recorded += 1;
        if status.is_passed() {
            self.summary.passed += 1;
        } else {
            self.summary.failed += 1;
        }

        Ok(RecordOutcome::Recorded(RecordedCase {
            category,
            identifier,
            category_file,
            result,
        }))
    }

    /// End the run: write the manifest. Does not wait for remote sends.
    pub fn finalize(&mut self) -> RecorderResult<RunSummary> {
        self.require_recording("finalize")?;

        let path = &self.outputs.manifest;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| RecorderError::io(parent, e))?;
            }
        }
        self.manifest.write_to(path)?;
        info!("XML file written: {}", path.display());

        self.state = RecorderState::Finalized;
        info!(
            "Test suite completed: {} recorded ({} passed, {} failed), {} skipped",
            self.summary.recorded, self.summary.passed, self.summary.failed, self.summary.skipped
        );
        Ok(self.summary)
    }

    /// Sends dispatched so far and not yet collected
    pub fn pending_sends(&self) -> usize {
        self.dispatcher.as_ref().map_or(0, Dispatcher::pending)
    }

    /// Release the recorder, waiting for any outstanding remote sends
    pub fn dispose(self) -> Vec<SinkOutcome> {
        match self.dispatcher {
            Some(dispatcher) => dispatcher.wait(),
            None => Vec::new(),
        }
    }

    fn require_recording(&self, operation: &'static str) -> RecorderResult<()> {
        if self.state == RecorderState::Recording {
            Ok(())
        } else {
            Err(RecorderError::invalid_state(operation, self.state))
        }
    }
}
