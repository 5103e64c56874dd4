/// Events emitted while applying a move.
/// The presentation layer consumes these for sound and the status line.

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum GameEvent {
    TilesMerged { x: usize, y: usize, value: u32 },
    TileSpawned { x: usize, y: usize, value: u32 },
    BoardUnchanged,
    GameOver,
}
