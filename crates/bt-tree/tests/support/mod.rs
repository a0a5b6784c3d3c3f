#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use bt_core::{Blackboard, Status, Task, TaskNode, TaskResult, TickContext};

/// Shared record of `(node, hook)` calls across a tree of recorders.
pub type Journal = Rc<RefCell<Vec<(&'static str, &'static str)>>>;

/// Leaf that replays a status script and journals every hook.
pub struct Recorder {
    name: &'static str,
    journal: Journal,
    script: Vec<Status>,
    cursor: usize,
}

impl Recorder {
    pub fn node(name: &'static str, journal: &Journal, script: &[Status]) -> TaskNode {
        TaskNode::named(
            name,
            Recorder {
                name,
                journal: journal.clone(),
                script: script.to_vec(),
                cursor: 0,
            },
        )
    }

    fn log(&self, hook: &'static str) {
        self.journal.borrow_mut().push((self.name, hook));
    }
}

impl Task for Recorder {
    fn start(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.log("start");
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<Status> {
        self.log("update");
        let status = self.script[self.cursor.min(self.script.len() - 1)];
        self.cursor += 1;
        Ok(status)
    }

    fn end(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.log("end");
        Ok(())
    }

    fn reset(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.cursor = 0;
        Ok(())
    }
}

pub fn calls(journal: &Journal, name: &str, hook: &str) -> usize {
    journal
        .borrow()
        .iter()
        .filter(|(n, h)| *n == name && *h == hook)
        .count()
}

pub fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 0.1)
}
