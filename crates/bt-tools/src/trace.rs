use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Mutex};

use bt_core::{Status, LIFECYCLE_TARGET};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// One lifecycle transition of one node.
///
/// `tag` is the transition name emitted by `TaskNode` (`check`, `start`, `update`,
/// `end`, `abort`, `reset`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub task: String,
    pub status: Option<Status>,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>, task: impl Into<String>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            task: task.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// `(task, tag)` pairs in emission order.
    pub fn transitions(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .map(|e| (e.task.as_str(), e.tag.as_ref()))
            .collect()
    }

    pub fn for_task<'a>(&'a self, task: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.task == task)
    }
}

impl TraceSink for TraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// `tracing_subscriber` layer that forwards lifecycle events to a [`TraceSink`].
///
/// Events on other targets are ignored.
#[derive(Clone)]
pub struct TraceLayer {
    sink: Arc<Mutex<dyn TraceSink + Send>>,
}

impl TraceLayer {
    pub fn new(sink: impl TraceSink + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// A layer recording into a [`TraceLog`], plus a handle to read it back.
    pub fn with_log() -> (Self, Arc<Mutex<TraceLog>>) {
        let log = Arc::new(Mutex::new(TraceLog::default()));
        let sink: Arc<Mutex<dyn TraceSink + Send>> = log.clone();
        (Self { sink }, log)
    }
}

impl fmt::Debug for TraceLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceLayer").finish_non_exhaustive()
    }
}

impl<S> Layer<S> for TraceLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != LIFECYCLE_TARGET {
            return;
        }

        let mut visitor = LifecycleVisitor::default();
        event.record(&mut visitor);
        let Some(tag) = visitor.tag else {
            return;
        };

        let event = TraceEvent {
            tick: visitor.tick,
            tag: Cow::Owned(tag),
            task: visitor.task,
            status: visitor.status,
        };
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        sink.emit(event);
    }
}

#[derive(Default)]
struct LifecycleVisitor {
    tick: u64,
    tag: Option<String>,
    task: String,
    status: Option<Status>,
}

impl Visit for LifecycleVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "tick" {
            self.tick = value;
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "task" => self.task = value.to_string(),
            "status" => self.status = parse_status(value),
            "message" => self.tag = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "task" => self.task = format!("{value:?}"),
            "message" => self.tag = Some(format!("{value:?}")),
            _ => {}
        }
    }
}

fn parse_status(value: &str) -> Option<Status> {
    match value {
        "success" => Some(Status::Success),
        "running" => Some(Status::Running),
        "failure" => Some(Status::Failure),
        _ => None,
    }
}
