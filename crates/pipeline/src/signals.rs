//! Run lifecycle events and the sinks they are delivered to.
//!
//! Each run emits exactly two events in program order: `Start` before it
//! reads its input, `Done` after its output is written. A failed run
//! never emits `Done`. Events from different runs may interleave.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::run_id::{InvalidRunId, RunId};

const LEGACY_PREFIX: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunEventKind {
    Start,
    Done,
}

impl RunEventKind {
    fn legacy_tag(self) -> &'static str {
        match self {
            RunEventKind::Start => "run-start",
            RunEventKind::Done => "run-done",
        }
    }
}

/// A lifecycle event of one run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunEvent {
    pub kind: RunEventKind,
    pub run_id: RunId,
}

impl RunEvent {
    pub fn start(run_id: RunId) -> Self {
        Self {
            kind: RunEventKind::Start,
            run_id,
        }
    }

    pub fn done(run_id: RunId) -> Self {
        Self {
            kind: RunEventKind::Done,
            run_id,
        }
    }
}

/// Renders the line format used across process boundaries:
/// `main:run-start:<run_id>` / `main:run-done:<run_id>`
impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", LEGACY_PREFIX, self.kind.legacy_tag(), self.run_id)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("Not a run event line: {0:?}")]
    Malformed(String),

    #[error(transparent)]
    RunId(#[from] InvalidRunId),
}

impl FromStr for RunEvent {
    type Err = ParseEventError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseEventError::Malformed(line.to_string());

        let mut parts = line.trim().splitn(3, ':');
        let (prefix, tag, run_id) = match (parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(tag), Some(run_id)) => (prefix, tag, run_id),
            _ => return Err(malformed()),
        };
        if prefix != LEGACY_PREFIX {
            return Err(malformed());
        }
        let kind = match tag {
            "run-start" => RunEventKind::Start,
            "run-done" => RunEventKind::Done,
            _ => return Err(malformed()),
        };

        Ok(Self {
            kind,
            run_id: RunId::new(run_id)?,
        })
    }
}

/// Destination for run events.
///
/// Shared by every worker, so implementations must accept concurrent
/// `emit` calls. Delivery is best effort: a sink whose consumer has gone
/// away drops the event and logs it.
pub trait SignalSink: Send + Sync {
    fn emit(&self, event: RunEvent);
}

impl SignalSink for tokio::sync::mpsc::UnboundedSender<RunEvent> {
    fn emit(&self, event: RunEvent) {
        if let Err(e) = self.send(event) {
            warn!("Dropping run event, receiver closed: {}", e.0);
        }
    }
}

impl SignalSink for std::sync::mpsc::Sender<RunEvent> {
    fn emit(&self, event: RunEvent) {
        if let Err(e) = self.send(event) {
            warn!("Dropping run event, receiver closed: {}", e.0);
        }
    }
}

impl<S: SignalSink + ?Sized> SignalSink for Arc<S> {
    fn emit(&self, event: RunEvent) {
        (**self).emit(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_id(value: &str) -> RunId {
        RunId::new(value).unwrap()
    }

    #[test]
    fn test_legacy_line_format() {
        assert_eq!(RunEvent::start(run_id("r1")).to_string(), "main:run-start:r1");
        assert_eq!(RunEvent::done(run_id("r1")).to_string(), "main:run-done:r1");
    }

    #[test]
    fn test_parse_legacy_line() {
        let event: RunEvent = "main:run-done:abc-1\n".parse().unwrap();
        assert_eq!(event, RunEvent::done(run_id("abc-1")));

        assert!("main:run-paused:abc".parse::<RunEvent>().is_err());
        assert!("worker:run-done:abc".parse::<RunEvent>().is_err());
        assert!("main:run-done".parse::<RunEvent>().is_err());
        assert!(matches!(
            "main:run-done:../x".parse::<RunEvent>(),
            Err(ParseEventError::RunId(_))
        ));
    }

    #[test]
    fn test_std_channel_sink() {
        let (tx, rx) = std::sync::mpsc::channel();
        tx.emit(RunEvent::start(run_id("r1")));
        tx.emit(RunEvent::done(run_id("r1")));

        let kinds: Vec<RunEventKind> = rx.try_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![RunEventKind::Start, RunEventKind::Done]);
    }

    #[test]
    fn test_tokio_sink_survives_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        // Must not panic
        tx.emit(RunEvent::start(run_id("r1")));
    }

    #[test]
    fn test_shared_sink() {
        let (tx, rx) = std::sync::mpsc::channel();
        let sink: Arc<dyn SignalSink> = Arc::new(tx);
        sink.emit(RunEvent::start(run_id("r2")));
        assert_eq!(rx.recv().unwrap().run_id, run_id("r2"));
    }
}
