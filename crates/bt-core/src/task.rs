use std::fmt;

use crate::{Blackboard, Status, TaskError, TaskResult, TickContext};

/// `tracing` target for lifecycle events emitted when [`TickContext::debug`] is set.
pub const LIFECYCLE_TARGET: &str = "behaviour::lifecycle";

/// Overridable hooks of a behaviour tree node.
///
/// Variants implement only the hooks they need; the defaults describe a leaf that
/// is always ready and succeeds immediately. The lifecycle bookkeeping (started
/// flag, terminal status, start/end pairing) is owned by [`TaskNode`], so hooks
/// never toggle it themselves.
///
/// Composite variants own their children as `TaskNode`s, expose them through
/// [`Task::children`] / [`Task::children_mut`], and persist the child they are
/// waiting on through [`Task::curr_index`] so a `Running` child is re-entered on
/// the next tick.
pub trait Task: 'static {
    /// Readiness gate evaluated before activation. Must not have side effects.
    fn check(&self, _ctx: &TickContext, _blackboard: &Blackboard) -> bool {
        true
    }

    fn start(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<Status> {
        Ok(Status::Success)
    }

    fn end(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        Ok(())
    }

    /// Clear activation-scoped state. Children are reset by [`TaskNode::reset`]
    /// before this hook runs.
    fn reset(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        Ok(())
    }

    fn children(&self) -> &[TaskNode] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [TaskNode] {
        &mut []
    }

    /// Child the composite is currently waiting on; `None` for leaves and for
    /// composites with no child pending.
    fn curr_index(&self) -> Option<usize> {
        None
    }

    /// Move the cursor. Composites must ignore an index past their last child.
    fn set_curr_index(&mut self, _index: usize) {}

    /// Diagnostic recorded by [`TaskNode`] when `update` returns `Failure`.
    fn fail_reason(&self) -> Option<&str> {
        None
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Where a node is in its current activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed or reset; `start` is the only valid transition.
    Idle,
    /// Started, `update` has not returned a terminal status yet.
    Active,
    /// `update` returned a terminal status; `end` is pending.
    Finished(Status),
    /// `end` ran; the node must be reset before reuse.
    Ended,
}

/// A named node of the tree: a [`Task`] plus the lifecycle state it must obey.
pub struct TaskNode {
    name: String,
    phase: Phase,
    last_status: Option<Status>,
    fail_reason: Option<String>,
    task: Box<dyn Task>,
}

impl TaskNode {
    /// Wrap `task`, naming it after its type.
    pub fn new(task: impl Task) -> Self {
        Self::named("", task)
    }

    /// Wrap `task` under `name`; an empty name falls back to the type name.
    pub fn named(name: impl Into<String>, task: impl Task) -> Self {
        Self::from_boxed(name, Box::new(task))
    }

    pub fn from_boxed(name: impl Into<String>, task: Box<dyn Task>) -> Self {
        let mut name = name.into();
        if name.is_empty() {
            name = short_type_name(task.type_name()).to_string();
        }
        Self {
            name,
            phase: Phase::Idle,
            last_status: None,
            fail_reason: None,
            task,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True between a successful `start` and the matching `end`.
    pub fn is_started(&self) -> bool {
        matches!(self.phase, Phase::Active | Phase::Finished(_))
    }

    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    pub fn fail_reason(&self) -> Option<&str> {
        self.fail_reason.as_deref()
    }

    pub fn task(&self) -> &dyn Task {
        self.task.as_ref()
    }

    pub fn children(&self) -> &[TaskNode] {
        self.task.children()
    }

    pub fn is_leaf(&self) -> bool {
        self.task.children().is_empty()
    }

    pub fn curr_index(&self) -> Option<usize> {
        self.task.curr_index()
    }

    /// Point the composite's cursor at `index`. A no-op on leaves.
    ///
    /// Written while the node is idle, the cursor chooses the child the next
    /// activation begins with.
    pub fn set_curr_index(&mut self, index: usize) -> TaskResult<()> {
        let len = self.task.children().len();
        if len == 0 {
            return Ok(());
        }
        if index >= len {
            return Err(self.violation(TaskError::IndexOutOfRange {
                task: self.name.clone(),
                index,
                len,
            }));
        }
        self.task.set_curr_index(index);
        Ok(())
    }

    /// The deepest leaf currently executing in this subtree.
    pub fn current_child_task(&self) -> Option<&TaskNode> {
        if self.phase != Phase::Active {
            return None;
        }
        let children = self.task.children();
        if children.is_empty() {
            return Some(self);
        }
        let index = self.task.curr_index()?;
        children.get(index)?.current_child_task()
    }

    pub fn check(&self, ctx: &TickContext, blackboard: &Blackboard) -> bool {
        let ready = self.task.check(ctx, blackboard);
        if ctx.debug {
            tracing::debug!(
                target: LIFECYCLE_TARGET,
                tick = ctx.tick,
                task = %self.name,
                ready,
                "check"
            );
        }
        ready
    }

    pub fn start(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<()> {
        match self.phase {
            Phase::Idle => {}
            Phase::Active | Phase::Finished(_) => {
                return Err(self.violation(TaskError::AlreadyStarted(self.name.clone())));
            }
            Phase::Ended => return Err(self.violation(TaskError::Ended(self.name.clone()))),
        }

        self.fail_reason = None;
        self.task.start(ctx, blackboard)?;
        self.phase = Phase::Active;
        self.trace(ctx, "start", None);
        Ok(())
    }

    pub fn update(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<Status> {
        match self.phase {
            Phase::Active => {}
            Phase::Idle => return Err(self.violation(TaskError::NotStarted(self.name.clone()))),
            Phase::Finished(status) => {
                return Err(self.violation(TaskError::AlreadyFinished {
                    task: self.name.clone(),
                    status,
                }));
            }
            Phase::Ended => return Err(self.violation(TaskError::Ended(self.name.clone()))),
        }

        let status = self.task.update(ctx, blackboard)?;
        self.last_status = Some(status);
        if status.is_terminal() {
            self.phase = Phase::Finished(status);
        }
        if status == Status::Failure {
            self.fail_reason = self.task.fail_reason().map(str::to_string);
        }
        self.trace(ctx, "update", Some(status));
        Ok(status)
    }

    /// Leave the activation. On a node that is still `Active` this is a cancellation:
    /// started descendants are ended first.
    pub fn end(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<()> {
        let aborted = match self.phase {
            Phase::Active => true,
            Phase::Finished(_) => false,
            Phase::Idle | Phase::Ended => {
                return Err(self.violation(TaskError::NotStarted(self.name.clone())));
            }
        };

        for child in self.task.children_mut() {
            child.abort(ctx, blackboard)?;
        }
        self.task.end(ctx, blackboard)?;
        self.phase = Phase::Ended;
        self.trace(ctx, if aborted { "abort" } else { "end" }, self.last_status);
        Ok(())
    }

    /// End the node if it is started; otherwise do nothing.
    pub fn abort(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<()> {
        if self.is_started() {
            self.end(ctx, blackboard)?;
        }
        Ok(())
    }

    /// Return the subtree to `Idle` so it can be activated again.
    pub fn reset(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<()> {
        self.abort(ctx, blackboard)?;
        for child in self.task.children_mut() {
            child.reset(ctx, blackboard)?;
        }
        self.task.reset(ctx, blackboard)?;
        self.phase = Phase::Idle;
        self.last_status = None;
        self.fail_reason = None;
        self.trace(ctx, "reset", None);
        Ok(())
    }

    /// Run one tick of the driver protocol: gate and start an idle node, update it,
    /// and end it once it reports a terminal status.
    ///
    /// An idle node whose `check` is false is not started and reports `Failure`.
    pub fn step(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<Status> {
        if self.phase == Phase::Idle {
            if !self.check(ctx, blackboard) {
                self.last_status = Some(Status::Failure);
                self.fail_reason = Some("not ready".to_string());
                return Ok(Status::Failure);
            }
            self.start(ctx, blackboard)?;
        }

        let status = self.update(ctx, blackboard)?;
        if status.is_terminal() {
            self.end(ctx, blackboard)?;
        }
        Ok(status)
    }

    fn trace(&self, ctx: &TickContext, tag: &'static str, status: Option<Status>) {
        if !ctx.debug {
            return;
        }
        match status {
            Some(status) => tracing::debug!(
                target: LIFECYCLE_TARGET,
                tick = ctx.tick,
                task = %self.name,
                status = status.as_str(),
                "{tag}"
            ),
            None => tracing::debug!(
                target: LIFECYCLE_TARGET,
                tick = ctx.tick,
                task = %self.name,
                "{tag}"
            ),
        }
    }

    fn violation(&self, err: TaskError) -> TaskError {
        tracing::warn!(task = %self.name, error = %err, "behaviour protocol violation");
        err
    }
}

impl fmt::Display for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("last_status", &self.last_status)
            .field("children", &self.task.children())
            .finish_non_exhaustive()
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}
