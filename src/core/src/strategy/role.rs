/// Role a strategy assigns to a friendly robot for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Striker,
    Unassigned,
}
