//! Remote result sinks.
//!
//! A sink receives serialized result bundles. The recorder never waits on a
//! sink while a run is in progress: each payload is queued on a
//! [`Dispatcher`] whose worker thread sends it, and outcomes are only
//! collected when the recorder is disposed.

use crate::error::{RecorderError, RecorderResult};
use reqwest::header::CONTENT_TYPE;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};
use yaksha_config::Remote;

/// What happened to one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    /// Endpoint answered 200
    Delivered { status: u16 },
    /// Endpoint answered with any other status
    Rejected { status: u16 },
    /// No response (connection, timeout, TLS, ...)
    Failed { reason: String },
}

impl SinkOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SinkOutcome::Delivered { .. })
    }

    /// Classify an HTTP status
    pub fn from_status(status: u16) -> Self {
        if status == 200 {
            SinkOutcome::Delivered { status }
        } else {
            SinkOutcome::Rejected { status }
        }
    }

    /// Log the outcome; delivery at info, everything else at error
    pub fn log(&self) {
        match self {
            SinkOutcome::Delivered { status } => {
                info!("Successfully sent data to the server (status {})", status)
            }
            SinkOutcome::Rejected { status } => {
                error!("Failed to send data to the server: status {}", status)
            }
            SinkOutcome::Failed { reason } => {
                error!("Failed to send data to the server: {}", reason)
            }
        }
    }
}

/// Destination for result bundles
pub trait ResultSink: Send + Sync {
    /// Deliver one JSON payload; blocking, no retry
    fn send(&self, payload: &str) -> SinkOutcome;
}

/// POSTs payloads to the grading endpoint
pub struct HttpSink {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(url: &str, code: &str, timeout: Duration) -> RecorderResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecorderError::Sink(format!("failed to create client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint_url(url, code),
        })
    }

    /// Build a sink from resolved remote settings; `None` when no credential is set
    pub fn from_remote(remote: &Remote) -> RecorderResult<Option<Self>> {
        match &remote.code {
            Some(code) => Self::new(&remote.url, code, remote.timeout).map(Some),
            None => Ok(None),
        }
    }
}

impl ResultSink for HttpSink {
    fn send(&self, payload: &str) -> SinkOutcome {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send();

        match response {
            Ok(response) => SinkOutcome::from_status(response.status().as_u16()),
            Err(e) => {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                SinkOutcome::Failed { reason }
            }
        }
    }
}

fn endpoint_url(url: &str, code: &str) -> String {
    format!("{}?code={}", url, urlencoding::encode(code))
}

/// Fire-and-forget delivery of payloads to a sink.
///
/// A single worker thread drains a queue of payloads in dispatch order, so at
/// most one request is in flight however many results a run records.
pub struct Dispatcher {
    queue: Option<Sender<String>>,
    worker: Option<JoinHandle<Vec<SinkOutcome>>>,
    dispatched: usize,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn ResultSink>) -> Self {
        let (queue, payloads) = mpsc::channel::<String>();
        let spawned = thread::Builder::new()
            .name("yaksha-sink".to_string())
            .spawn(move || drain(sink.as_ref(), payloads));

        let worker = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to start sink thread: {}", e);
                None
            }
        };
        Self {
            queue: worker.as_ref().map(|_| queue),
            worker,
            dispatched: 0,
        }
    }

    /// Queue `payload` for sending and return immediately
    pub fn dispatch(&mut self, payload: String) {
        let queued = match &self.queue {
            Some(queue) => queue.send(payload).is_ok(),
            None => false,
        };
        if queued {
            self.dispatched += 1;
        } else {
            error!("Sink worker is not running; result was not sent");
        }
    }

    /// Sends queued and not yet collected
    pub fn pending(&self) -> usize {
        self.dispatched
    }

    /// Block until every queued send finishes; outcomes are in dispatch order
    pub fn wait(mut self) -> Vec<SinkOutcome> {
        debug!("Waiting for {} pending send(s)", self.dispatched);
        // Closing the queue lets the worker finish once it is drained
        self.queue.take();
        match self.worker.take() {
            Some(worker) => worker.join().unwrap_or_else(|_| {
                vec![
                    SinkOutcome::Failed {
                        reason: "sink worker panicked".to_string(),
                    };
                    self.dispatched
                ]
            }),
            None => Vec::new(),
        }
    }
}

fn drain(sink: &dyn ResultSink, payloads: Receiver<String>) -> Vec<SinkOutcome> {
    let mut outcomes = Vec::new();
    for payload in payloads {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.send(&payload)))
            .unwrap_or_else(|_| SinkOutcome::Failed {
                reason: "sink panicked".to_string(),
            });
        outcome.log();
        outcomes.push(outcome);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collecting {
        payloads: Mutex<Vec<String>>,
    }

    impl ResultSink for Collecting {
        fn send(&self, payload: &str) -> SinkOutcome {
            self.payloads.lock().unwrap().push(payload.to_string());
            SinkOutcome::from_status(200)
        }
    }

    struct Panicking;

    impl ResultSink for Panicking {
        fn send(&self, _payload: &str) -> SinkOutcome {
            panic!("boom");
        }
    }

    #[test]
    fn test_status_classification() {
        assert!(SinkOutcome::from_status(200).is_delivered());
        assert_eq!(
            SinkOutcome::from_status(202),
            SinkOutcome::Rejected { status: 202 }
        );
        assert_eq!(
            SinkOutcome::from_status(500),
            SinkOutcome::Rejected { status: 500 }
        );
    }

    #[test]
    fn test_endpoint_encodes_code() {
        assert_eq!(
            endpoint_url("https://grader.example.com/api/enqueue", "ab/c=="),
            "https://grader.example.com/api/enqueue?code=ab%2Fc%3D%3D"
        );
    }

    #[test]
    fn test_dispatcher_collects_outcomes() {
        let sink = Arc::new(Collecting::default());
        let mut dispatcher = Dispatcher::new(sink.clone());

        dispatcher.dispatch("{\"a\":1}".to_string());
        dispatcher.dispatch("{\"b\":2}".to_string());
        assert_eq!(dispatcher.pending(), 2);

        let outcomes = dispatcher.wait();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(SinkOutcome::is_delivered));

        assert_eq!(
            *sink.payloads.lock().unwrap(),
            vec!["{\"a\":1}", "{\"b\":2}"]
        );
    }

    #[test]
    fn test_panicking_sink_reports_failure() {
        let mut dispatcher = Dispatcher::new(Arc::new(Panicking));
        dispatcher.dispatch("{}".to_string());
        dispatcher.dispatch("{}".to_string());

        let failed = SinkOutcome::Failed {
            reason: "sink panicked".to_string(),
        };
        assert_eq!(dispatcher.wait(), vec![failed.clone(), failed]);
    }

    /// Records the peak number of concurrent `send` calls
    #[derive(Default)]
    struct Concurrency {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ResultSink for Concurrency {
        fn send(&self, _payload: &str) -> SinkOutcome {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
            self.active.fetch_sub(1, Ordering::SeqCst);
            SinkOutcome::from_status(200)
        }
    }

    #[test]
    fn test_dispatcher_sends_one_at_a_time() {
        let sink = Arc::new(Concurrency::default());
        let mut dispatcher = Dispatcher::new(sink.clone());
        for i in 0..50 {
            dispatcher.dispatch(format!("{{\"n\":{}}}", i));
        }

        assert_eq!(dispatcher.wait().len(), 50);
        assert_eq!(sink.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wait_without_dispatch_is_empty() {
        let dispatcher = Dispatcher::new(Arc::new(Collecting::default()));
        assert_eq!(dispatcher.pending(), 0);
        assert!(dispatcher.wait().is_empty());
    }

    #[test]
    fn test_unreachable_endpoint_fails() {
        let sink = HttpSink::new("http://127.0.0.1:9", "code", Duration::from_secs(2)).unwrap();
        assert!(matches!(sink.send("{}"), SinkOutcome::Failed { .. }));
    }

    #[test]
    fn test_from_remote_without_code() {
        let remote = Remote {
            enabled: true,
            url: "https://grader.example.com/api".to_string(),
            code: None,
            timeout: Duration::from_secs(1),
        };
        assert!(HttpSink::from_remote(&remote).unwrap().is_none());
    }
}
