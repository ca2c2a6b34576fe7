use thiserror::Error;

/// Fatal at startup: the system refuses to run with a broken configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown referee profile '{name}' (not a built-in name or readable file)")]
    UnknownProfile { name: String },

    #[error("malformed referee profile '{name}': {source}")]
    MalformedProfile {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown strategy '{name}'")]
    UnknownStrategy { name: String },

    #[error("unknown mode '{name}', expected one of: real, grsim, rsim")]
    UnknownMode { name: String },

    #[error("nonsensical threshold: {what}")]
    BadThreshold { what: String },

    #[error("no starting formation for {n_robots} robots")]
    MissingFormation { n_robots: usize },

    #[error("required resource unavailable: {what}")]
    ResourceUnavailable { what: String },
}

/// Fatal at runtime: the world no longer matches what we were configured
/// for, and continuing would act on garbage.
#[derive(Debug, Error)]
pub enum InvariantError {
    #[error("robot id {id} present in both friendly and enemy maps")]
    DuplicateRobotId { id: u8 },

    #[error("too many {team} robots detected: {seen} > {expected}")]
    TooManyRobots {
        team: &'static str,
        seen: usize,
        expected: usize,
    },

    #[error("no valid game frame after {waited_seconds:.1} s in simulator mode")]
    GaterTimeout { waited_seconds: f64 },
}

/// Anything that can take the control loop down.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Invariant(#[from] InvariantError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Transport failures. The runner retries once; a second failure downgrades
/// the affected robots to zero commands for the tick.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("serial write failed: {reason}")]
    SerialWrite { reason: String },

    #[error("simulator rejected command batch: {reason}")]
    SimulatorSend { reason: String },

    #[error("robot id {id} out of range (max {max})")]
    RobotIdOutOfRange { id: u8, max: u8 },
}
