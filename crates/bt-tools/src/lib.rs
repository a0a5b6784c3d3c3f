//! Tooling for behaviour trees: lifecycle trace capture and logging bootstrap.
//!
//! Lifecycle events are plain `tracing` events emitted by `bt_core::TaskNode` when a
//! tree runs with `debug_behaviours` enabled. This crate turns them into data that
//! inspectors and tests can read back.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod logging;
pub mod trace;

pub use trace::{NullTraceSink, TraceEvent, TraceLayer, TraceLog, TraceSink, VecTraceSink};
