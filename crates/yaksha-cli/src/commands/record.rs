//! Record command - feed host lifecycle events into a recorder

use crate::commands::load_config;
use crate::reporter::{report_json, RunReport, RunReporter};
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use yaksha_recorder::{
    EventStream, HostEvent, HostSession, HttpSink, OutputFiles, RecordOutcome, RecordedCase,
    RecorderOptions, RecorderState, ResultRecorder, RunSummary, SessionStep,
    SinkOutcome, TitleError,
};

/// Arguments for the record command
pub struct RecordArgs {
    /// Event stream; `None` or `-` reads stdin
    pub events: Option<PathBuf>,
    /// Working directory outputs are written under
    pub dir: PathBuf,
    /// Explicit yaksha.toml
    pub config: Option<PathBuf>,
    /// Forward bundles to the remote endpoint even if not enabled in config
    pub remote: bool,
    /// Verbose output (show every case)
    pub verbose: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Output in JSON format
    pub json: bool,
}

impl Default for RecordArgs {
    fn default() -> Self {
        Self {
            events: None,
            dir: PathBuf::from("."),
            config: None,
            remote: false,
            verbose: false,
            no_color: false,
            json: false,
        }
    }
}

/// Run the record command
pub fn run(args: RecordArgs) -> Result<()> {
    let config = load_config(&args.dir, args.config.as_deref())?;
    let mut recorder = ResultRecorder::new(RecorderOptions::from_config(&args.dir, &config));

    let remote = config.remote();
    if args.remote || remote.enabled {
        match HttpSink::from_remote(&remote)? {
            Some(sink) => recorder = recorder.with_sink(Arc::new(sink)),
            None => bail!("Remote sending requested but remote.code is not configured"),
        }
    }

    let reader = open_events(args.events.as_ref())?;
    let recorded = record_stream(recorder, reader)?;

    let report = RunReport {
        summary: recorded.summary,
        cases: &recorded.cases,
        skipped: &recorded.skipped,
        outputs: &recorded.outputs,
        sends: &recorded.sends,
    };
    if args.json {
        println!("{}", report_json(&report));
    } else {
        RunReporter::new(args.verbose)
            .with_no_color(args.no_color)
            .report(&report);
    }

    Ok(())
}

/// Everything a completed stream produced
pub struct Recorded {
    pub summary: RunSummary,
    pub cases: Vec<RecordedCase>,
    pub skipped: Vec<TitleError>,
    pub outputs: OutputFiles,
    pub sends: Vec<SinkOutcome>,
}

/// Drive `recorder` through an event stream and dispose it.
///
/// The recorder is disposed on every path, so sends already queued finish
/// even when the stream turns out to be unusable.
pub fn record_stream(recorder: ResultRecorder, reader: impl BufRead) -> Result<Recorded> {
    let mut session = HostSession::new(recorder);
    let mut cases = Vec::new();
    let mut skipped = Vec::new();
    let streamed = drive(&mut session, reader, &mut cases, &mut skipped);

    let recorder = session.into_recorder();
    let outputs = recorder.outputs().clone();
    let sends = recorder.dispose();

    match streamed {
        Ok(summary) => Ok(Recorded {
            summary,
            cases,
            skipped,
            outputs,
            sends,
        }),
        Err(e) => {
            if !sends.is_empty() {
                let delivered = sends.iter().filter(|o| o.is_delivered()).count();
                warn!(
                    "Recording aborted after {} send(s) completed ({} delivered)",
                    sends.len(),
                    delivered
                );
            }
            Err(e)
        }
    }
}

fn drive(
    session: &mut HostSession,
    reader: impl BufRead,
    cases: &mut Vec<RecordedCase>,
    skipped: &mut Vec<TitleError>,
) -> Result<RunSummary> {
    let mut summary = None;
    for event in EventStream::new(reader) {
        match session.handle(event?)? {
            SessionStep::Initialized => {}
            SessionStep::Recorded(RecordOutcome::Recorded(case)) => cases.push(case),
            SessionStep::Recorded(RecordOutcome::Skipped(reason)) => skipped.push(reason),
            SessionStep::Finalized(run) => summary = Some(run),
        }
    }

    match summary {
        Some(summary) => Ok(summary),
        None if session.recorder().state() == RecorderState::Recording => {
            warn!("Event stream ended before run-end; writing the manifest now");
            match session.handle(HostEvent::RunEnd)? {
                SessionStep::Finalized(summary) => Ok(summary),
                _ => bail!("Recorder did not finalize"),
            }
        }
        None => bail!("Event stream contained no run-start event"),
    }
}

fn open_events(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event stream {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}
