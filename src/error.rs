/// Platform-level failures. Game logic itself never fails; it clamps.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Terminal setup/drawing, or reading the config file.
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    Config(#[from] toml::de::Error),
}
