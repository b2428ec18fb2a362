/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound cues.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    LevelStart { world: u32, level: u32 },
    Jump,
    Stomp,
    Hurt,
    LevelCleared,
    GameOver,
    Win,
}
