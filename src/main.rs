mod bridge;

use bridge::{DeviceLink, UdpSimSender, VisionBridgeSource};
use clap::{Args, Parser, Subcommand, ValueEnum};
use core::error::{ConfigError, RunnerError};
use core::referee::CustomReferee;
use core::run::{CommandSink, FrameConsumer, ReceiverHandle, frame_ring, spawn_receiver};
use core::strategy::{RunnerConfig, StrategyRunner, strategy_by_name};
use env_logger::Env;
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use transport::{GrSimSink, RSimSink, SerialSink};

/// Receiver threads get this long to notice shutdown before detaching.
const RECEIVER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "ssl_coordinator", about = "SSL team decision core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control loop against a transport.
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Built-in strategy name.
    #[arg(long, default_value = "formation")]
    strategy: String,

    #[arg(long, value_enum)]
    mode: Mode,

    /// Play as the yellow team (blue otherwise).
    #[arg(long)]
    yellow: bool,

    /// Defend the right goal (left otherwise).
    #[arg(long)]
    right: bool,

    /// Accepted for launcher parity; the core never renders anyway.
    #[arg(long)]
    headless: bool,

    /// Referee profile: built-in name or YAML path.
    #[arg(long, default_value = "strict_ai")]
    profile: String,

    /// Robots per team.
    #[arg(long, default_value_t = 6)]
    robots: u8,

    /// Cameras to listen on (bridge ports are consecutive).
    #[arg(long, default_value_t = 4)]
    cameras: usize,

    /// First vision-bridge port; camera N binds port + N.
    #[arg(long, default_value_t = 10020)]
    vision_port: u16,

    /// Simulator bridge address (grsim / rsim modes).
    #[arg(long, default_value = "127.0.0.1:20011")]
    sim_addr: String,

    /// Serial device of the base station (real mode).
    #[arg(long, default_value = "/dev/ttyACM0")]
    serial_port: String,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Real,
    Grsim,
    Rsim,
}

fn main() {
    color_eyre::install().unwrap();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args),
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &RunnerError) -> i32 {
    match err {
        RunnerError::Config(_) => 1,
        RunnerError::Transport(_) => 2,
        RunnerError::Invariant(_) => 3,
    }
}

fn run(args: RunArgs) -> Result<(), RunnerError> {
    if args.robots == 0 || args.robots > 6 {
        return Err(ConfigError::BadThreshold {
            what: format!("robots per team must be 1..=6, got {}", args.robots),
        }
        .into());
    }
    if args.cameras == 0 || args.cameras > 4 {
        return Err(ConfigError::BadThreshold {
            what: format!("cameras must be 1..=4, got {}", args.cameras),
        }
        .into());
    }

    let strategy = strategy_by_name(&args.strategy)?;
    let referee = CustomReferee::from_profile_name(&args.profile, args.robots, args.robots)?;
    info!(
        "starting '{}' as {} on the {}, profile '{}'",
        args.strategy,
        if args.yellow { "yellow" } else { "blue" },
        if args.right { "right" } else { "left" },
        args.profile
    );
    if args.headless {
        info!("headless run");
    }

    let sink: Box<dyn CommandSink> = match args.mode {
        Mode::Real => Box::new(SerialSink::new(
            DeviceLink::open(&args.serial_port)?,
            args.robots as usize,
        )),
        Mode::Grsim => Box::new(GrSimSink::new(connect_sim(&args.sim_addr)?)),
        Mode::Rsim => Box::new(RSimSink::new(connect_sim(&args.sim_addr)?)),
    };

    let config = RunnerConfig {
        my_team_is_yellow: args.yellow,
        my_team_is_right: args.right,
        expected_friendly: args.robots as usize,
        expected_enemy: args.robots as usize,
        expect_ball: true,
        simulator_mode: args.mode != Mode::Real,
        ..RunnerConfig::default()
    };
    let mut runner = StrategyRunner::new(config, strategy, sink, Some(referee))?;

    // One receiver thread per camera, each feeding a capacity-1 ring.
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            warn!("interrupt received, shutting down");
            running.store(false, Ordering::Relaxed);
        })
        .expect("failed to install interrupt handler");
    }

    let mut consumers = Vec::new();
    let mut receivers: Vec<ReceiverHandle> = Vec::new();
    for camera in 0..args.cameras {
        let addr = format!("0.0.0.0:{}", args.vision_port + camera as u16);
        let source = VisionBridgeSource::bind(&addr, running.clone()).map_err(|err| {
            ConfigError::ResourceUnavailable {
                what: format!("vision bridge socket {addr}: {err}"),
            }
        })?;
        let (publisher, consumer) = frame_ring();
        receivers.push(spawn_receiver(
            &format!("vision-{camera}"),
            source,
            publisher,
            running.clone(),
        ));
        consumers.push(consumer);
    }

    let result = runner.run(
        || poll_all(&consumers),
        || None, // the custom referee replaces the upstream feed
        &running,
    );

    running.store(false, Ordering::Relaxed);
    for receiver in receivers {
        receiver.join_with_timeout(RECEIVER_JOIN_TIMEOUT);
    }
    info!("shutdown complete");
    result
}

fn connect_sim(addr: &str) -> Result<UdpSimSender, RunnerError> {
    UdpSimSender::connect(addr).map_err(|err| {
        core::error::TransportError::SimulatorSend {
            reason: format!("cannot reach simulator bridge at {addr}: {err}"),
        }
        .into()
    })
}

fn poll_all(
    consumers: &[FrameConsumer<core::entities::RawVisionData>],
) -> Vec<Option<core::entities::RawVisionData>> {
    consumers.iter().map(|consumer| consumer.poll()).collect()
}
