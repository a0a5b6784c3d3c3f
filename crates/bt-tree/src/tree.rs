use bt_core::{Blackboard, Phase, Status, TaskNode, TaskResult, TreeConfig};

/// Owns a root node and its blackboard and advances them one tick at a time.
pub struct BehaviourTree {
    root: TaskNode,
    blackboard: Blackboard,
    config: TreeConfig,
    tick: u64,
    last: Option<Status>,
}

impl BehaviourTree {
    pub fn new(root: TaskNode) -> Self {
        Self::with_config(root, TreeConfig::default())
    }

    pub fn with_config(root: TaskNode, config: TreeConfig) -> Self {
        Self {
            root,
            blackboard: Blackboard::new(),
            config,
            tick: 0,
            last: None,
        }
    }

    pub fn with_blackboard(mut self, blackboard: Blackboard) -> Self {
        self.blackboard = blackboard;
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root(&self) -> &TaskNode {
        &self.root
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn last_status(&self) -> Option<Status> {
        self.last
    }

    /// Number of ticks driven so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The leaf currently executing, if any.
    pub fn current_task(&self) -> Option<&TaskNode> {
        self.root.current_child_task()
    }

    /// Advance the tree using its own blackboard.
    pub fn tick(&mut self, delta: f32) -> TaskResult<Status> {
        let mut blackboard = std::mem::take(&mut self.blackboard);
        let result = self.tick_with(delta, &mut blackboard);
        self.blackboard = blackboard;
        result
    }

    /// Advance the tree against an external blackboard, for trees that share one.
    ///
    /// With `reset_on_completion`, a root that ended on the previous tick is reset
    /// here, before it is stepped again. Its last status and fail reason stay
    /// readable between the two ticks.
    pub fn tick_with(&mut self, delta: f32, blackboard: &mut Blackboard) -> TaskResult<Status> {
        let ctx = self.config.context(self.tick, delta);
        self.tick = self.tick.wrapping_add(1);

        if self.config.reset_on_completion && self.root.phase() == Phase::Ended {
            self.root.reset(&ctx, blackboard)?;
        }

        let status = self.root.step(&ctx, blackboard)?;
        self.last = Some(status);

        if status.is_terminal() && ctx.debug {
            tracing::debug!(
                tick = ctx.tick,
                root = %self.root,
                status = status.as_str(),
                "behaviour tree completed"
            );
        }
        Ok(status)
    }

    /// Return the whole tree to its pre-start state, ending anything still running.
    pub fn reset(&mut self) -> TaskResult<()> {
        let ctx = self.config.context(self.tick, 0.0);
        self.root.reset(&ctx, &mut self.blackboard)?;
        self.last = None;
        Ok(())
    }

    pub fn into_parts(self) -> (TaskNode, Blackboard) {
        (self.root, self.blackboard)
    }
}
