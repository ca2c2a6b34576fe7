use crate::behavior::{Behavior, Blackboard, Status, TickContext};

/// Ticks children in order. Fails on the first FAILURE, returns RUNNING on
/// the first RUNNING, succeeds when every child passed. With `memory` the
/// next tick resumes at the child that was running.
pub struct Sequence {
    name: String,
    children: Vec<Box<dyn Behavior + Send>>,
    memory: bool,
    current: usize,
}

impl Sequence {
    pub fn new(name: &str, children: Vec<Box<dyn Behavior + Send>>) -> Self {
        Sequence {
            name: name.to_string(),
            children,
            memory: false,
            current: 0,
        }
    }

    pub fn with_memory(name: &str, children: Vec<Box<dyn Behavior + Send>>) -> Self {
        Sequence {
            memory: true,
            ..Self::new(name, children)
        }
    }
}

impl Behavior for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let start = if self.memory { self.current } else { 0 };

        for index in start..self.children.len() {
            match self.children[index].tick(ctx, blackboard) {
                Status::Success => continue,
                Status::Running => {
                    self.current = index;
                    return Status::Running;
                }
                Status::Failure => {
                    self.current = 0;
                    return Status::Failure;
                }
            }
        }

        self.current = 0;
        Status::Success
    }

    fn reset(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }
}

/// Ticks children in order. Succeeds on the first SUCCESS, returns RUNNING
/// on the first RUNNING, fails when every child failed.
pub struct Selector {
    name: String,
    children: Vec<Box<dyn Behavior + Send>>,
    memory: bool,
    current: usize,
}

impl Selector {
    pub fn new(name: &str, children: Vec<Box<dyn Behavior + Send>>) -> Self {
        Selector {
            name: name.to_string(),
            children,
            memory: false,
            current: 0,
        }
    }

    pub fn with_memory(name: &str, children: Vec<Box<dyn Behavior + Send>>) -> Self {
        Selector {
            memory: true,
            ..Self::new(name, children)
        }
    }
}

impl Behavior for Selector {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let start = if self.memory { self.current } else { 0 };

        for index in start..self.children.len() {
            match self.children[index].tick(ctx, blackboard) {
                Status::Failure => continue,
                Status::Running => {
                    self.current = index;
                    return Status::Running;
                }
                Status::Success => {
                    self.current = 0;
                    return Status::Success;
                }
            }
        }

        self.current = 0;
        Status::Failure
    }

    fn reset(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Namespace;
    use crate::entities::{GameFrame, PresentFutureGame, ProximityLookup};
    use crate::planning::MotionController;

    /// Leaf that returns a scripted run of statuses, then repeats the last.
    struct Scripted {
        name: String,
        script: Vec<Status>,
        calls: usize,
    }

    impl Scripted {
        fn boxed(name: &str, script: Vec<Status>) -> Box<dyn Behavior + Send> {
            Box::new(Scripted {
                name: name.to_string(),
                script,
                calls: 0,
            })
        }
    }

    impl Behavior for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        fn tick(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> Status {
            let status = *self
                .script
                .get(self.calls)
                .unwrap_or_else(|| self.script.last().unwrap());
            self.calls += 1;
            status
        }
    }

    fn run(tree: &mut dyn Behavior, ticks: usize) -> Vec<Status> {
        let game = PresentFutureGame::new(GameFrame::empty(0.0, true, false));
        let motion = MotionController::new();
        let proximity = ProximityLookup::from_frame(&game.current);
        let ctx = TickContext {
            game: &game,
            motion: &motion,
            proximity: &proximity,
        };
        let mut blackboard = Blackboard::new(Namespace::My);
        (0..ticks).map(|_| tree.tick(&ctx, &mut blackboard)).collect()
    }

    #[test]
    fn test_sequence_fails_fast() {
        let mut seq = Sequence::new(
            "seq",
            vec![
                Scripted::boxed("a", vec![Status::Success]),
                Scripted::boxed("b", vec![Status::Failure]),
                Scripted::boxed("c", vec![Status::Success]),
            ],
        );
        assert_eq!(run(&mut seq, 1), vec![Status::Failure]);
    }

    #[test]
    fn test_sequence_success_when_all_pass() {
        let mut seq = Sequence::new(
            "seq",
            vec![
                Scripted::boxed("a", vec![Status::Success]),
                Scripted::boxed("b", vec![Status::Success]),
            ],
        );
        assert_eq!(run(&mut seq, 1), vec![Status::Success]);
    }

    #[test]
    fn test_sequence_with_memory_resumes_at_running_child() {
        // First child succeeds once, then would fail if re-ticked; with
        // memory it is never re-ticked while the second child runs.
        let mut seq = Sequence::with_memory(
            "seq",
            vec![
                Scripted::boxed("a", vec![Status::Success, Status::Failure]),
                Scripted::boxed("b", vec![Status::Running, Status::Success]),
            ],
        );
        assert_eq!(
            run(&mut seq, 2),
            vec![Status::Running, Status::Success]
        );
    }

    #[test]
    fn test_sequence_without_memory_restarts() {
        let mut seq = Sequence::new(
            "seq",
            vec![
                Scripted::boxed("a", vec![Status::Success, Status::Failure]),
                Scripted::boxed("b", vec![Status::Running, Status::Success]),
            ],
        );
        // Second tick re-runs child a, which now fails.
        assert_eq!(run(&mut seq, 2), vec![Status::Running, Status::Failure]);
    }

    #[test]
    fn test_selector_returns_first_success() {
        let mut sel = Selector::new(
            "sel",
            vec![
                Scripted::boxed("a", vec![Status::Failure]),
                Scripted::boxed("b", vec![Status::Success]),
                Scripted::boxed("c", vec![Status::Failure]),
            ],
        );
        assert_eq!(run(&mut sel, 1), vec![Status::Success]);
    }

    #[test]
    fn test_selector_fails_when_all_fail() {
        let mut sel = Selector::new(
            "sel",
            vec![
                Scripted::boxed("a", vec![Status::Failure]),
                Scripted::boxed("b", vec![Status::Failure]),
            ],
        );
        assert_eq!(run(&mut sel, 1), vec![Status::Failure]);
    }

    #[test]
    fn test_selector_running_holds_position() {
        let mut sel = Selector::with_memory(
            "sel",
            vec![
                Scripted::boxed("a", vec![Status::Failure, Status::Success]),
                Scripted::boxed("b", vec![Status::Running, Status::Failure]),
            ],
        );
        // Tick 1: a fails, b runs. Tick 2 resumes at b, which fails; the
        // selector is exhausted and fails overall.
        assert_eq!(run(&mut sel, 2), vec![Status::Running, Status::Failure]);
    }
}
