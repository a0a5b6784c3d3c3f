use bt_core::{Blackboard, BlackboardError, Status, Task, TaskNode, TaskResult, TickContext};

/// Runs children in order until one fails.
///
/// The cursor survives across ticks: a `Running` child is re-entered on the next tick
/// and earlier children are not restarted. A cursor set while idle picks the first
/// child of the next activation. Out-of-range cursor writes are ignored.
pub struct Sequence {
    children: Vec<TaskNode>,
    index: Option<usize>,
}

impl Sequence {
    pub fn new(children: Vec<TaskNode>) -> Self {
        Self {
            children,
            index: None,
        }
    }
}

impl Task for Sequence {
    fn start(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.index = first_child(&self.children, self.index);
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<Status> {
        while let Some(index) = self.index {
            match self.children[index].step(ctx, blackboard)? {
                Status::Running => return Ok(Status::Running),
                Status::Failure => {
                    self.index = None;
                    return Ok(Status::Failure);
                }
                Status::Success => {
                    self.index = (index + 1 < self.children.len()).then_some(index + 1);
                }
            }
        }

        Ok(Status::Success)
    }

    fn reset(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.index = None;
        Ok(())
    }

    fn children(&self) -> &[TaskNode] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [TaskNode] {
        &mut self.children
    }

    fn curr_index(&self) -> Option<usize> {
        self.index
    }

    fn set_curr_index(&mut self, index: usize) {
        if index < self.children.len() {
            self.index = Some(index);
        }
    }
}

/// Tries children in order until one succeeds, resuming a `Running` child.
///
/// Cursor writes behave as for [`Sequence`].
pub struct Selector {
    children: Vec<TaskNode>,
    index: Option<usize>,
}

impl Selector {
    pub fn new(children: Vec<TaskNode>) -> Self {
        Self {
            children,
            index: None,
        }
    }
}

impl Task for Selector {
    fn start(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.index = first_child(&self.children, self.index);
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<Status> {
        while let Some(index) = self.index {
            match self.children[index].step(ctx, blackboard)? {
                Status::Running => return Ok(Status::Running),
                Status::Success => {
                    self.index = None;
                    return Ok(Status::Success);
                }
                Status::Failure => {
                    self.index = (index + 1 < self.children.len()).then_some(index + 1);
                }
            }
        }

        Ok(Status::Failure)
    }

    fn reset(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.index = None;
        Ok(())
    }

    fn children(&self) -> &[TaskNode] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [TaskNode] {
        &mut self.children
    }

    fn curr_index(&self) -> Option<usize> {
        self.index
    }

    fn set_curr_index(&mut self, index: usize) {
        if index < self.children.len() {
            self.index = Some(index);
        }
    }

    fn fail_reason(&self) -> Option<&str> {
        Some("every child failed")
    }
}

/// Where an activation begins: a cursor written while idle, else the first child.
fn first_child(children: &[TaskNode], preset: Option<usize>) -> Option<usize> {
    preset
        .filter(|&i| i < children.len())
        .or_else(|| (!children.is_empty()).then_some(0))
}

/// Swaps the child's `Success` and `Failure`.
pub struct Inverter {
    child: TaskNode,
}

impl Inverter {
    pub fn new(child: TaskNode) -> Self {
        Self { child }
    }
}

impl Task for Inverter {
    fn update(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<Status> {
        Ok(self.child.step(ctx, blackboard)?.invert())
    }

    fn children(&self) -> &[TaskNode] {
        std::slice::from_ref(&self.child)
    }

    fn children_mut(&mut self) -> &mut [TaskNode] {
        std::slice::from_mut(&mut self.child)
    }

    fn curr_index(&self) -> Option<usize> {
        Some(0)
    }
}

/// Leaf that succeeds when its predicate holds.
pub struct Condition<F> {
    cond: F,
}

impl<F> Condition<F>
where
    F: FnMut(&TickContext, &Blackboard) -> Result<bool, BlackboardError> + 'static,
{
    pub fn new(cond: F) -> Self {
        Self { cond }
    }
}

impl<F> Task for Condition<F>
where
    F: FnMut(&TickContext, &Blackboard) -> Result<bool, BlackboardError> + 'static,
{
    fn update(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<Status> {
        if (self.cond)(ctx, &*blackboard)? {
            Ok(Status::Success)
        } else {
            Ok(Status::Failure)
        }
    }

    fn fail_reason(&self) -> Option<&str> {
        Some("condition not met")
    }
}

/// Leaf whose update is a closure.
pub struct Action<F> {
    run: F,
}

impl<F> Action<F>
where
    F: FnMut(&TickContext, &mut Blackboard) -> TaskResult<Status> + 'static,
{
    pub fn new(run: F) -> Self {
        Self { run }
    }
}

impl<F> Task for Action<F>
where
    F: FnMut(&TickContext, &mut Blackboard) -> TaskResult<Status> + 'static,
{
    fn update(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> TaskResult<Status> {
        (self.run)(ctx, blackboard)
    }
}

/// Leaf that stays `Running` until `seconds` of tick time have elapsed.
pub struct Wait {
    seconds: f32,
    elapsed: f32,
}

impl Wait {
    pub fn new(seconds: f32) -> Self {
        Self {
            seconds,
            elapsed: 0.0,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Task for Wait {
    fn start(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.elapsed = 0.0;
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<Status> {
        self.elapsed += ctx.delta.max(0.0);
        if self.elapsed >= self.seconds {
            Ok(Status::Success)
        } else {
            Ok(Status::Running)
        }
    }

    fn reset(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.elapsed = 0.0;
        Ok(())
    }
}
