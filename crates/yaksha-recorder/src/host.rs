//! Host lifecycle adapter.
//!
//! A test runner reports its lifecycle as JSON lines, one event per line:
//!
//! ```text
//! {"event":"run-start"}
//! {"event":"test-end","title":["TS-1","Boundary","returns correct sum"],"state":"passed"}
//! {"event":"test-end","title":"TS-2 Business adds","state":"failed","error":"expected 3"}
//! {"event":"run-end"}
//! ```
//!
//! Cypress hook names (`before:run`, `test:after:run`, `after:run`) are
//! accepted as aliases.

use crate::error::{RecorderError, RecorderResult};
use crate::record::TestStatus;
use crate::recorder::{RecordOutcome, ResultRecorder, RunSummary};
use crate::title::RawTitle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum HostEvent {
    #[serde(alias = "before:run")]
    RunStart,
    #[serde(alias = "test:after:run")]
    TestEnd {
        /// Absent titles arrive as `null` and are skipped when recorded
        #[serde(default)]
        title: Value,
        state: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    #[serde(alias = "after:run")]
    RunEnd,
}

/// What handling one event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    Initialized,
    Recorded(RecordOutcome),
    Finalized(RunSummary),
}

/// Drives a recorder from host events
pub struct HostSession {
    recorder: ResultRecorder,
}

impl HostSession {
    pub fn new(recorder: ResultRecorder) -> Self {
        Self { recorder }
    }

    pub fn recorder(&self) -> &ResultRecorder {
        &self.recorder
    }

    pub fn handle(&mut self, event: HostEvent) -> RecorderResult<SessionStep> {
        match event {
            HostEvent::RunStart => {
                self.recorder.initialize()?;
                Ok(SessionStep::Initialized)
            }
            HostEvent::TestEnd {
                title,
                state,
                error,
            } => {
                let outcome = self.recorder.record_result(
                    RawTitle::from_value(&title),
                    TestStatus::from_state(&state),
                    error.as_deref(),
                )?;
                Ok(SessionStep::Recorded(outcome))
            }
            HostEvent::RunEnd => {
                let summary = self.recorder.finalize()?;
                Ok(SessionStep::Finalized(summary))
            }
        }
    }

    pub fn into_recorder(self) -> ResultRecorder {
        self.recorder
    }
}

/// Iterator over the events of a JSON-lines stream; blank lines are skipped
pub struct EventStream<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = RecorderResult<HostEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(RecorderError::EventStream(e))),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            let line = self.line;
            return Some(
                serde_json::from_str(&text).map_err(|error| RecorderError::InvalidEvent { line, error }),
            );
        }
    }
}
