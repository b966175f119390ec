use strata_world::ChunkCoord;

/// Lifecycle notifications delivered to manager observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Loaded(ChunkCoord),
    Unloaded(ChunkCoord),
    /// A streaming pass finished; `initial` only for the first one.
    Updated { initial: bool },
}
