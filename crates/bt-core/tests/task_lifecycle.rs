use std::cell::RefCell;
use std::rc::Rc;

use bt_core::{
    Blackboard, Phase, Status, Task, TaskError, TaskNode, TaskResult, TickContext,
};

type Calls = Rc<RefCell<Vec<&'static str>>>;

/// Leaf that plays back a script of statuses and records every hook.
struct Scripted {
    calls: Calls,
    script: Vec<Status>,
    cursor: usize,
    ready: bool,
}

impl Scripted {
    fn new(calls: &Calls, script: Vec<Status>) -> Self {
        Self {
            calls: calls.clone(),
            script,
            cursor: 0,
            ready: true,
        }
    }
}

impl Task for Scripted {
    fn check(&self, _ctx: &TickContext, _blackboard: &Blackboard) -> bool {
        self.ready
    }

    fn start(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.calls.borrow_mut().push("start");
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<Status> {
        self.calls.borrow_mut().push("update");
        let status = self.script[self.cursor.min(self.script.len() - 1)];
        self.cursor += 1;
        Ok(status)
    }

    fn end(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.calls.borrow_mut().push("end");
        Ok(())
    }

    fn reset(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> TaskResult<()> {
        self.calls.borrow_mut().push("reset");
        self.cursor = 0;
        Ok(())
    }

    fn fail_reason(&self) -> Option<&str> {
        Some("script said so")
    }
}

struct Noop;

impl Task for Noop {}

fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 0.1)
}

fn count(calls: &Calls, name: &str) -> usize {
    calls.borrow().iter().filter(|c| **c == name).count()
}

#[test]
fn running_then_success_starts_and_ends_once() {
    let calls = Calls::default();
    let mut node = TaskNode::new(Scripted::new(
        &calls,
        vec![Status::Running, Status::Success],
    ));
    let mut bb = Blackboard::new();

    assert_eq!(node.step(&ctx(0), &mut bb), Ok(Status::Running));
    assert_eq!(*calls.borrow(), vec!["start", "update"]);
    assert!(node.is_started());

    assert_eq!(node.step(&ctx(1), &mut bb), Ok(Status::Success));
    assert_eq!(*calls.borrow(), vec!["start", "update", "update", "end"]);
    assert!(!node.is_started());
    assert_eq!(node.phase(), Phase::Ended);
}

#[test]
fn started_flag_follows_start_end_and_reset() {
    let calls = Calls::default();
    let mut node = TaskNode::new(Scripted::new(&calls, vec![Status::Success]));
    let mut bb = Blackboard::new();
    let c = ctx(0);

    assert!(!node.is_started());
    node.start(&c, &mut bb).unwrap();
    assert!(node.is_started());

    // Terminal but not yet ended: still started.
    assert_eq!(node.update(&c, &mut bb), Ok(Status::Success));
    assert!(node.is_started());
    assert_eq!(node.phase(), Phase::Finished(Status::Success));

    node.end(&c, &mut bb).unwrap();
    assert!(!node.is_started());

    node.reset(&c, &mut bb).unwrap();
    assert!(!node.is_started());
    assert_eq!(node.phase(), Phase::Idle);
    assert_eq!(node.last_status(), None);
}

#[test]
fn reset_allows_a_fresh_activation() {
    let calls = Calls::default();
    let mut node = TaskNode::new(Scripted::new(&calls, vec![Status::Success]));
    let mut bb = Blackboard::new();

    assert_eq!(node.step(&ctx(0), &mut bb), Ok(Status::Success));
    assert_eq!(
        node.step(&ctx(1), &mut bb),
        Err(TaskError::Ended("Scripted".to_string()))
    );

    node.reset(&ctx(1), &mut bb).unwrap();
    assert_eq!(node.step(&ctx(2), &mut bb), Ok(Status::Success));
    assert_eq!(count(&calls, "start"), 2);
    assert_eq!(count(&calls, "end"), 2);
}

#[test]
fn protocol_violations_fail_fast() {
    let calls = Calls::default();
    let mut node = TaskNode::named("patrol", Scripted::new(&calls, vec![Status::Failure]));
    let mut bb = Blackboard::new();
    let c = ctx(0);

    assert_eq!(
        node.update(&c, &mut bb),
        Err(TaskError::NotStarted("patrol".to_string()))
    );
    assert_eq!(
        node.end(&c, &mut bb),
        Err(TaskError::NotStarted("patrol".to_string()))
    );

    node.start(&c, &mut bb).unwrap();
    assert_eq!(
        node.start(&c, &mut bb),
        Err(TaskError::AlreadyStarted("patrol".to_string()))
    );

    assert_eq!(node.update(&c, &mut bb), Ok(Status::Failure));
    assert_eq!(
        node.update(&c, &mut bb),
        Err(TaskError::AlreadyFinished {
            task: "patrol".to_string(),
            status: Status::Failure,
        })
    );
    // The hooks never ran for the rejected calls.
    assert_eq!(*calls.borrow(), vec!["start", "update"]);
}

#[test]
fn failure_records_the_task_fail_reason() {
    let calls = Calls::default();
    let mut node = TaskNode::new(Scripted::new(&calls, vec![Status::Failure]));
    let mut bb = Blackboard::new();

    assert_eq!(node.step(&ctx(0), &mut bb), Ok(Status::Failure));
    assert_eq!(node.fail_reason(), Some("script said so"));

    node.reset(&ctx(1), &mut bb).unwrap();
    assert_eq!(node.fail_reason(), None);
}

#[test]
fn unready_node_is_not_started() {
    let calls = Calls::default();
    let mut leaf = Scripted::new(&calls, vec![Status::Success]);
    leaf.ready = false;
    let mut node = TaskNode::new(leaf);
    let mut bb = Blackboard::new();

    assert_eq!(node.step(&ctx(0), &mut bb), Ok(Status::Failure));
    assert!(calls.borrow().is_empty());
    assert_eq!(node.phase(), Phase::Idle);
    assert_eq!(node.fail_reason(), Some("not ready"));
}

#[test]
fn resetting_an_active_node_ends_it_first() {
    let calls = Calls::default();
    let mut node = TaskNode::new(Scripted::new(&calls, vec![Status::Running]));
    let mut bb = Blackboard::new();

    assert_eq!(node.step(&ctx(0), &mut bb), Ok(Status::Running));
    node.reset(&ctx(1), &mut bb).unwrap();

    assert_eq!(*calls.borrow(), vec!["start", "update", "end", "reset"]);
    assert!(!node.is_started());
}

#[test]
fn leaf_is_its_own_current_task_only_while_active() {
    let calls = Calls::default();
    let mut node = TaskNode::new(Scripted::new(
        &calls,
        vec![Status::Running, Status::Success],
    ));
    let mut bb = Blackboard::new();

    assert!(node.current_child_task().is_none());
    node.step(&ctx(0), &mut bb).unwrap();
    assert_eq!(node.current_child_task().map(TaskNode::name), Some("Scripted"));
    node.step(&ctx(1), &mut bb).unwrap();
    assert!(node.current_child_task().is_none());
}

#[test]
fn leaves_report_no_children_and_ignore_cursor_writes() {
    let mut node = TaskNode::new(Noop);

    assert!(node.is_leaf());
    assert!(node.children().is_empty());
    assert_eq!(node.curr_index(), None);
    assert_eq!(node.set_curr_index(3), Ok(()));
    assert_eq!(node.curr_index(), None);
}

#[test]
fn names_default_to_the_type_name() {
    assert_eq!(TaskNode::new(Noop).name(), "Noop");
    assert_eq!(TaskNode::named("", Noop).name(), "Noop");
    assert_eq!(TaskNode::named("idle", Noop).to_string(), "idle");
}

#[test]
fn default_hooks_succeed_immediately() {
    let mut node = TaskNode::new(Noop);
    let mut bb = Blackboard::new();

    assert_eq!(node.step(&ctx(0), &mut bb), Ok(Status::Success));
    assert_eq!(node.last_status(), Some(Status::Success));
    assert_eq!(node.fail_reason(), None);
}
