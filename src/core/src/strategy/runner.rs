use crate::behavior::{Behavior, Blackboard, Namespace, TickContext};
use crate::entities::{
    GameFrame, PresentFutureGame, ProximityLookup, RawVisionData, RobotCommand, RobotResponse,
};
use crate::error::{InvariantError, RunnerError};
use crate::planning::MotionController;
use crate::referee::{CustomReferee, RefereeCommand, RefereeData};
use crate::refiners::{PositionRefiner, RefereeRefiner, RobotInfoRefiner, VelocityRefiner};
use crate::run::CommandSink;
use crate::strategy::Strategy;
use itertools::Itertools;
use log::{debug, error, info, warn};
use nalgebra::Vector3;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Poll cadence while waiting for the first valid frame.
const GATER_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub my_team_is_yellow: bool,
    pub my_team_is_right: bool,
    pub expected_friendly: usize,
    pub expected_enemy: usize,
    pub expect_ball: bool,
    /// Enables the ball teleport on the STOP edge and the fatal gater
    /// timeout; both only make sense against a simulator.
    pub simulator_mode: bool,
    pub tick_rate_hz: f64,
    pub gater_warn_seconds: f64,
    pub gater_timeout_seconds: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            my_team_is_yellow: true,
            my_team_is_right: false,
            expected_friendly: 6,
            expected_enemy: 6,
            expect_ball: true,
            simulator_mode: false,
            tick_rate_hz: 60.0,
            gater_warn_seconds: 3.0,
            gater_timeout_seconds: 10.0,
        }
    }
}

/// The top-level control loop: refines vision into validated frames, steps
/// the referee, ticks the strategy tree, and dispatches the resulting
/// commands in one batch per tick.
pub struct StrategyRunner {
    config: RunnerConfig,
    position_refiner: PositionRefiner,
    robot_info_refiner: RobotInfoRefiner,
    velocity_refiner: VelocityRefiner,
    referee_refiner: RefereeRefiner,
    custom_referee: Option<CustomReferee>,
    strategy: Box<dyn Strategy>,
    tree: Box<dyn Behavior + Send>,
    blackboard: Blackboard,
    motion: MotionController,
    sink: Box<dyn CommandSink>,
    game: Option<PresentFutureGame>,
    pending_responses: Vec<RobotResponse>,
    previous_command: Option<RefereeCommand>,
    clock_origin: Instant,
}

impl StrategyRunner {
    pub fn new(
        config: RunnerConfig,
        strategy: Box<dyn Strategy>,
        sink: Box<dyn CommandSink>,
        custom_referee: Option<CustomReferee>,
    ) -> Result<Self, RunnerError> {
        strategy.check_expected_robots(config.expected_friendly, config.expected_enemy)?;
        let tree = strategy.build_tree();
        info!(
            "strategy '{}' ready ({} friendly / {} enemy expected)",
            strategy.name(),
            config.expected_friendly,
            config.expected_enemy
        );
        Ok(StrategyRunner {
            config,
            position_refiner: PositionRefiner::new(),
            robot_info_refiner: RobotInfoRefiner::new(),
            velocity_refiner: VelocityRefiner::new(),
            referee_refiner: RefereeRefiner::new(),
            custom_referee,
            strategy,
            tree,
            blackboard: Blackboard::new(Namespace::My),
            motion: MotionController::new(),
            sink,
            game: None,
            pending_responses: Vec::new(),
            previous_command: None,
            clock_origin: Instant::now(),
        })
    }

    /// Monotonic seconds since the runner came up.
    pub fn now(&self) -> f64 {
        self.clock_origin.elapsed().as_secs_f64()
    }

    /// Manual referee override, forwarded to the custom referee.
    pub fn set_referee_command(&mut self, command: RefereeCommand, timestamp: f64) {
        if let Some(referee) = self.custom_referee.as_mut() {
            referee.set_command(command, timestamp);
        }
    }

    pub fn game(&self) -> Option<&PresentFutureGame> {
        self.game.as_ref()
    }

    /// Block until the expected robots (and ball) are visible. Warns every
    /// `gater_warn_seconds`; in simulator mode a silent feed is fatal
    /// because nothing will change until the simulator is stepped.
    pub fn wait_until_game_valid(
        &mut self,
        poll: &mut dyn FnMut() -> Vec<Option<RawVisionData>>,
    ) -> Result<(), RunnerError> {
        let mut frame = GameFrame::empty(
            0.0,
            self.config.my_team_is_yellow,
            self.config.my_team_is_right,
        );
        let start = Instant::now();
        let mut last_warn = Instant::now();

        loop {
            frame = self.position_refiner.refine(&frame, &poll());
            self.check_not_overfull(&frame)?;

            let valid = frame.friendly_robots.len() >= self.config.expected_friendly
                && frame.enemy_robots.len() >= self.config.expected_enemy
                && (frame.ball.is_some() || !self.config.expect_ball);
            if valid {
                frame.check_disjoint_ids()?;
                info!(
                    "game valid after {:.2} s ({} friendly, {} enemy)",
                    start.elapsed().as_secs_f64(),
                    frame.friendly_robots.len(),
                    frame.enemy_robots.len()
                );
                self.game = Some(PresentFutureGame::new(frame));
                return Ok(());
            }

            if last_warn.elapsed().as_secs_f64() >= self.config.gater_warn_seconds {
                last_warn = Instant::now();
                warn!(
                    "waiting for valid game frame: {}/{} friendly, {}/{} enemy, ball {} (expected {})",
                    frame.friendly_robots.len(),
                    self.config.expected_friendly,
                    frame.enemy_robots.len(),
                    self.config.expected_enemy,
                    frame.ball.is_some(),
                    self.config.expect_ball
                );
            }
            if self.config.simulator_mode
                && start.elapsed().as_secs_f64() >= self.config.gater_timeout_seconds
            {
                return Err(InvariantError::GaterTimeout {
                    waited_seconds: start.elapsed().as_secs_f64(),
                }
                .into());
            }

            std::thread::sleep(GATER_POLL);
        }
    }

    fn check_not_overfull(&self, frame: &GameFrame) -> Result<(), InvariantError> {
        if frame.friendly_robots.len() > self.config.expected_friendly {
            return Err(InvariantError::TooManyRobots {
                team: "friendly",
                seen: frame.friendly_robots.len(),
                expected: self.config.expected_friendly,
            });
        }
        if frame.enemy_robots.len() > self.config.expected_enemy {
            return Err(InvariantError::TooManyRobots {
                team: "enemy",
                seen: frame.enemy_robots.len(),
                expected: self.config.expected_enemy,
            });
        }
        Ok(())
    }

    /// One control step: refine, referee, tick the tree, dispatch.
    pub fn tick(
        &mut self,
        vision: Vec<Option<RawVisionData>>,
        upstream_referee: Option<RefereeData>,
        now: f64,
    ) -> Result<(), RunnerError> {
        // 1-2. Refine the raw inputs against the latest completed frame.
        if self.game.is_none() {
            let empty = GameFrame::empty(
                0.0,
                self.config.my_team_is_yellow,
                self.config.my_team_is_right,
            );
            self.game = Some(PresentFutureGame::new(empty));
        }
        let previous = &self.game.as_ref().unwrap().current;
        let frame = self.position_refiner.refine(previous, &vision);
        let frame = self.robot_info_refiner.refine(frame, &self.pending_responses);
        let mut frame = self
            .velocity_refiner
            .refine(self.game.as_ref().unwrap(), frame);

        // 3. Referee: the custom referee generates the data, otherwise the
        // upstream snapshot (if any) is taken as-is.
        let referee_data = match self.custom_referee.as_mut() {
            Some(referee) => Some(referee.step(&frame, now)),
            None => upstream_referee,
        };
        let mut frame = self.referee_refiner.refine(frame, referee_data);

        // 4. Ball teleport on the STOP edge, simulator only: the simulated
        // ball jumps to the designated position so play can resume without
        // a human placing it.
        let command = frame.referee.as_ref().map(|r| r.command);
        if self.config.simulator_mode
            && command == Some(RefereeCommand::Stop)
            && self.previous_command != Some(RefereeCommand::Stop)
        {
            if let Some((x, y)) = frame.referee.as_ref().and_then(|r| r.designated_position) {
                if let Some(ball) = frame.ball.as_mut() {
                    debug!("teleporting ball to designated position ({x}, {y})");
                    ball.position = Vector3::new(x, y, 0.0);
                    ball.velocity = Vector3::zeros();
                    ball.acceleration = Vector3::zeros();
                }
            }
        }
        self.previous_command = command;

        // 5. Validate and commit the frame.
        frame.check_disjoint_ids().map_err(RunnerError::from)?;
        self.check_not_overfull(&frame)?;
        let game = self.game.as_mut().unwrap();
        game.advance(frame);

        // 6. Tick the tree.
        let game = self.game.as_ref().unwrap();
        let proximity = ProximityLookup::from_frame(&game.current);
        self.blackboard
            .reset_cmd_map(game.current.friendly_robots.keys().copied());
        let ctx = TickContext {
            game,
            motion: &self.motion,
            proximity: &proximity,
        };
        self.tree.tick(&ctx, &mut self.blackboard);

        // 7. Drain the command map; robots the tree skipped fall back to
        // their role's default action.
        for id in self.blackboard.cmd_map.keys().copied().sorted() {
            match self.blackboard.cmd_map[&id] {
                Some(command) => self.sink.queue(id, command),
                None => {
                    let role = self.blackboard.role_of(id);
                    if let Some(command) = self.strategy.default_action(&ctx, role, id) {
                        self.sink.queue(id, command);
                    }
                }
            }
        }

        // 8. One batched send, with the retry-once policy.
        self.flush_commands();
        Ok(())
    }

    /// Flush the queued batch. First failure: retry. Second failure: fall
    /// back to zero commands for every robot and keep the loop alive.
    fn flush_commands(&mut self) {
        let game = self.game.as_ref().unwrap();
        match self.sink.flush(&game.current) {
            Ok(responses) => self.pending_responses = responses,
            Err(first) => {
                warn!("transport flush failed, retrying once: {first}");
                match self.sink.flush(&game.current) {
                    Ok(responses) => self.pending_responses = responses,
                    Err(second) => {
                        error!("transport flush failed twice, zeroing commands: {second}");
                        for id in game.current.friendly_robots.keys() {
                            self.sink.queue(*id, RobotCommand::halt());
                        }
                        let _ = self.sink.flush(&game.current);
                        self.pending_responses.clear();
                    }
                }
            }
        }
    }

    /// The wall-clock paced outer loop. Runs until the shared flag clears
    /// or an invariant breaks.
    pub fn run(
        &mut self,
        mut vision_poll: impl FnMut() -> Vec<Option<RawVisionData>>,
        mut referee_poll: impl FnMut() -> Option<RefereeData>,
        running: &AtomicBool,
    ) -> Result<(), RunnerError> {
        self.wait_until_game_valid(&mut vision_poll)?;

        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate_hz);
        while running.load(Ordering::Relaxed) {
            let tick_start = Instant::now();

            let vision = vision_poll();
            let upstream = referee_poll();
            let now = self.now();
            self.tick(vision, upstream, now)?;

            let elapsed = tick_start.elapsed();
            debug!("tick finished in {} us", elapsed.as_micros());
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!("tick overran the {:?} budget: {:?}", tick_duration, elapsed);
            }
        }
        info!("strategy runner stopping");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{RawBallData, RawRobotData, RawVisionData};
    use crate::error::TransportError;
    use crate::strategy::FormationStrategy;
    use std::sync::Arc;
    use std::sync::Mutex;

    /// Sink that records every queued command and can be told to fail.
    #[derive(Clone, Default)]
    struct RecordingSink {
        state: Arc<Mutex<RecordingState>>,
    }

    #[derive(Default)]
    struct RecordingState {
        queued: Vec<(u8, RobotCommand)>,
        flushed: Vec<Vec<(u8, RobotCommand)>>,
        failures_remaining: usize,
        responses: Vec<RobotResponse>,
    }

    impl CommandSink for RecordingSink {
        fn queue(&mut self, robot_id: u8, command: RobotCommand) {
            self.state.lock().unwrap().queued.push((robot_id, command));
        }

        fn flush(&mut self, _frame: &GameFrame) -> Result<Vec<RobotResponse>, TransportError> {
            let mut state = self.state.lock().unwrap();
            if state.failures_remaining > 0 {
                state.failures_remaining -= 1;
                return Err(TransportError::SimulatorSend {
                    reason: "injected".to_string(),
                });
            }
            let batch = std::mem::take(&mut state.queued);
            state.flushed.push(batch);
            Ok(state.responses.clone())
        }
    }

    fn vision_frame(ts: f64, ball: (f32, f32)) -> RawVisionData {
        RawVisionData {
            timestamp_capture: ts,
            yellow_robots: vec![RawRobotData {
                id: 0,
                x: 1.0,
                y: 0.0,
                orientation: 0.0,
                confidence: 0.9,
            }],
            blue_robots: vec![RawRobotData {
                id: 1,
                x: -1.0,
                y: 0.0,
                orientation: 0.0,
                confidence: 0.9,
            }],
            balls: vec![RawBallData {
                x: ball.0,
                y: ball.1,
                z: 0.0,
                confidence: 0.95,
            }],
            camera_id: 0,
        }
    }

    fn runner(simulator_mode: bool, sink: RecordingSink) -> StrategyRunner {
        let config = RunnerConfig {
            expected_friendly: 1,
            expected_enemy: 1,
            simulator_mode,
            ..RunnerConfig::default()
        };
        let referee = CustomReferee::from_profile_name("strict_ai", 1, 1).unwrap();
        StrategyRunner::new(
            config,
            Box::new(FormationStrategy::new()),
            Box::new(sink),
            Some(referee),
        )
        .unwrap()
    }

    #[test]
    fn test_gater_accepts_complete_frame() {
        let sink = RecordingSink::default();
        let mut runner = runner(false, sink);
        let mut polls = 0;
        runner
            .wait_until_game_valid(&mut || {
                polls += 1;
                vec![Some(vision_frame(polls as f64, (0.0, 0.0)))]
            })
            .unwrap();
        let game = runner.game().unwrap();
        assert_eq!(game.current.friendly_robots.len(), 1);
        assert_eq!(game.current.enemy_robots.len(), 1);
    }

    #[test]
    fn test_gater_rejects_too_many_robots() {
        let sink = RecordingSink::default();
        let mut runner = runner(false, sink);
        let result = runner.wait_until_game_valid(&mut || {
            let mut frame = vision_frame(1.0, (0.0, 0.0));
            frame.yellow_robots.push(RawRobotData {
                id: 2,
                x: 2.0,
                y: 0.0,
                orientation: 0.0,
                confidence: 0.9,
            });
            vec![Some(frame)]
        });
        assert!(matches!(
            result,
            Err(RunnerError::Invariant(InvariantError::TooManyRobots { .. }))
        ));
    }

    #[test]
    fn test_tick_dispatches_one_batch() {
        let sink = RecordingSink::default();
        let state = sink.state.clone();
        let mut runner = runner(false, sink);
        runner
            .tick(vec![Some(vision_frame(1.0, (0.0, 0.0)))], None, 0.1)
            .unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.flushed.len(), 1);
        // The single friendly robot received exactly one command.
        assert_eq!(state.flushed[0].len(), 1);
        assert_eq!(state.flushed[0][0].0, 0);
    }

    #[test]
    fn test_goal_through_the_whole_chain() {
        // Yellow plays left here; a raw ball at (5, 0) is in the right
        // goal, which blue defends, so yellow scores.
        let sink = RecordingSink::default();
        let mut runner = runner(false, sink);
        runner.set_referee_command(RefereeCommand::NormalStart, 0.0);

        runner
            .tick(vec![Some(vision_frame(1.0, (5.0, 0.0)))], None, 1.0)
            .unwrap();

        let referee = runner.game().unwrap().current.referee.clone().unwrap();
        assert_eq!(referee.command, RefereeCommand::Stop);
        assert_eq!(referee.yellow_team.score, 1);
        assert_eq!(referee.next_command, Some(RefereeCommand::PrepareKickoffBlue));
    }

    #[test]
    fn test_ball_teleports_on_stop_edge_in_simulator_mode() {
        let sink = RecordingSink::default();
        let mut runner = runner(true, sink);
        runner.set_referee_command(RefereeCommand::NormalStart, 0.0);

        runner
            .tick(vec![Some(vision_frame(1.0, (5.0, 0.0)))], None, 1.0)
            .unwrap();

        // The goal put the referee in STOP with a centre designated
        // position; the ball must have been moved there.
        let ball = runner.game().unwrap().current.ball.unwrap();
        assert_eq!(ball.position.x, 0.0);
        assert_eq!(ball.position.y, 0.0);
    }

    #[test]
    fn test_ball_not_teleported_outside_simulator_mode() {
        let sink = RecordingSink::default();
        let mut runner = runner(false, sink);
        runner.set_referee_command(RefereeCommand::NormalStart, 0.0);
        runner
            .tick(vec![Some(vision_frame(1.0, (5.0, 0.0)))], None, 1.0)
            .unwrap();
        let ball = runner.game().unwrap().current.ball.unwrap();
        assert_eq!(ball.position.x, 5.0);
    }

    #[test]
    fn test_transport_failure_retries_then_zeroes() {
        let sink = RecordingSink::default();
        let state = sink.state.clone();
        state.lock().unwrap().failures_remaining = 2;
        let mut runner = runner(false, sink);

        // Both attempts fail, the runner zeroes commands and continues.
        runner
            .tick(vec![Some(vision_frame(1.0, (0.0, 0.0)))], None, 0.1)
            .unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.flushed.len(), 1);
        let batch = &state.flushed[0];
        assert!(batch.iter().any(|(_, cmd)| *cmd == RobotCommand::halt()));
    }

    #[test]
    fn test_robot_responses_feed_next_tick() {
        let sink = RecordingSink::default();
        let state = sink.state.clone();
        state.lock().unwrap().responses = vec![RobotResponse {
            robot_id: 0,
            has_ball: true,
        }];
        let mut runner = runner(false, sink);

        runner
            .tick(vec![Some(vision_frame(1.0, (0.0, 0.0)))], None, 0.1)
            .unwrap();
        // The response from tick 1 lands on the robot during tick 2.
        runner
            .tick(vec![Some(vision_frame(1.02, (0.0, 0.0)))], None, 0.12)
            .unwrap();
        let robot = runner.game().unwrap().current.friendly(0).unwrap();
        assert!(robot.has_ball);
    }
}
