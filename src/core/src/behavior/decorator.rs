use crate::behavior::{Behavior, Blackboard, Status, TickContext};

/// Flips SUCCESS and FAILURE; RUNNING passes through.
pub struct Inverter {
    name: String,
    child: Box<dyn Behavior + Send>,
}

impl Inverter {
    pub fn new(name: &str, child: Box<dyn Behavior + Send>) -> Self {
        Inverter {
            name: name.to_string(),
            child,
        }
    }
}

impl Behavior for Inverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        match self.child.tick(ctx, blackboard) {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        }
    }

    fn reset(&mut self) {
        self.child.reset();
    }
}
