use thiserror::Error;

use crate::{Status, ValueKind};

/// Misuse of the blackboard: bad keys or reads with the wrong type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlackboardError {
    #[error("blackboard key must not be empty")]
    EmptyKey,

    #[error("blackboard key `{0}` already exists")]
    DuplicateKey(String),

    #[error("blackboard type mismatch for key `{key}`: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("blackboard value {value} for key `{key}` does not fit in {target}")]
    OutOfRange {
        key: String,
        value: i64,
        target: &'static str,
    },
}

/// Lifecycle protocol violations. These indicate a malformed tree or a driver bug;
/// a task failing in the domain sense returns [`Status::Failure`] instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error("task `{0}` was updated or ended before it was started")]
    NotStarted(String),

    #[error("task `{0}` was started while already active")]
    AlreadyStarted(String),

    #[error("task `{task}` was updated after it returned {status}")]
    AlreadyFinished { task: String, status: Status },

    #[error("task `{0}` has ended; reset it before reuse")]
    Ended(String),

    #[error("task `{task}` has {len} children, index {index} is out of range")]
    IndexOutOfRange {
        task: String,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Blackboard(#[from] BlackboardError),
}

pub type TaskResult<T> = Result<T, TaskError>;
