use crate::behavior::{Behavior, Blackboard, Status, TickContext};

/// Pure predicate over the world and blackboard: SUCCESS when it holds,
/// FAILURE otherwise.
pub struct Condition<F>
where
    F: Fn(&TickContext, &Blackboard) -> bool + Send,
{
    name: String,
    predicate: F,
}

impl<F> Condition<F>
where
    F: Fn(&TickContext, &Blackboard) -> bool + Send,
{
    pub fn new(name: &str, predicate: F) -> Self {
        Condition {
            name: name.to_string(),
            predicate,
        }
    }
}

impl<F> Behavior for Condition<F>
where
    F: Fn(&TickContext, &Blackboard) -> bool + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        if (self.predicate)(ctx, blackboard) {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Leaf that may mutate the blackboard, typically by writing robot commands
/// into the command map.
pub struct Action<F>
where
    F: FnMut(&TickContext, &mut Blackboard) -> Status + Send,
{
    name: String,
    action: F,
}

impl<F> Action<F>
where
    F: FnMut(&TickContext, &mut Blackboard) -> Status + Send,
{
    pub fn new(name: &str, action: F) -> Self {
        Action {
            name: name.to_string(),
            action,
        }
    }
}

impl<F> Behavior for Action<F>
where
    F: FnMut(&TickContext, &mut Blackboard) -> Status + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        (self.action)(ctx, blackboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Namespace;
    use crate::entities::{GameFrame, PresentFutureGame, ProximityLookup, RobotCommand};
    use crate::planning::MotionController;

    #[test]
    fn test_action_writes_into_cmd_map() {
        let game = PresentFutureGame::new(GameFrame::empty(0.0, true, false));
        let motion = MotionController::new();
        let proximity = ProximityLookup::from_frame(&game.current);
        let ctx = TickContext {
            game: &game,
            motion: &motion,
            proximity: &proximity,
        };
        let mut blackboard = Blackboard::new(Namespace::My);
        blackboard.reset_cmd_map([3].into_iter());

        let mut action = Action::new("halt_robot_3", |_ctx, bb: &mut Blackboard| {
            bb.set_command(3, RobotCommand::halt());
            Status::Success
        });

        assert_eq!(action.tick(&ctx, &mut blackboard), Status::Success);
        assert_eq!(blackboard.cmd_map[&3], Some(RobotCommand::halt()));
    }
}
