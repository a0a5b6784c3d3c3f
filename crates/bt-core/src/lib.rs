//! Task contract and shared blackboard for tick-driven behaviour trees.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod config;
pub mod error;
pub mod status;
pub mod task;
pub mod tick;

pub use blackboard::{BbKey, BbType, BbValue, Blackboard, ValueKind};
#[cfg(feature = "serde")]
pub use config::ConfigError;
pub use config::TreeConfig;
pub use error::{BlackboardError, TaskError, TaskResult};
pub use status::Status;
pub use task::{Phase, Task, TaskNode, LIFECYCLE_TARGET};
pub use tick::TickContext;
