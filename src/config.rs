/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or
/// `~/.config/koopa-engine`, first match wins.
/// Missing files, missing keys and malformed files all fall back to
/// defaults; a malformed file is logged, never fatal.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub rules: RulesConfig,
    pub sound: SoundConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    /// Wall-clock pacing target. Game logic always counts frames.
    pub fps: u32,
    /// Largest upscale, in logical pixels per terminal column.
    pub max_scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub start_lives: u32,
    pub time_limit: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SoundConfig {
    pub enabled: bool,
    pub volume: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub run: Vec<String>,
    pub start: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig { start_lives: default_start_lives(), time_limit: default_time_limit() }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    sound: TomlSound,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default = "default_max_scale")]
    max_scale: f32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_start_lives")]
    start_lives: u32,
    #[serde(default = "default_time_limit")]
    time_limit: u32,
}

#[derive(Deserialize, Debug)]
struct TomlSound {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_volume")]
    volume: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_run")]
    run: Vec<String>,
    #[serde(default = "default_start")]
    start: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_fps() -> u32 { 60 }
fn default_max_scale() -> f32 { 1.0 }
fn default_start_lives() -> u32 { 3 }
fn default_time_limit() -> u32 { 400 }
fn default_true() -> bool { true }
fn default_volume() -> f32 { 0.5 }

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_run() -> Vec<String> { vec!["B".into(), "X".into()] }
fn default_start() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { fps: default_fps(), max_scale: default_max_scale() }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules { start_lives: default_start_lives(), time_limit: default_time_limit() }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: true, volume: default_volume() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            run: default_run(),
            start: default_start(),
            quit: default_quit(),
        }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            display: DisplayConfig {
                fps: t.display.fps.clamp(1, 240),
                max_scale: if t.display.max_scale.is_finite() && t.display.max_scale > 0.0 {
                    t.display.max_scale
                } else {
                    default_max_scale()
                },
            },
            rules: RulesConfig {
                start_lives: t.rules.start_lives.max(1),
                time_limit: t.rules.time_limit.max(1),
            },
            sound: SoundConfig {
                enabled: t.sound.enabled,
                volume: if t.sound.volume.is_nan() { default_volume() } else { t.sound.volume.clamp(0.0, 1.0) },
            },
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                run: t.gamepad.run,
                start: t.gamepad.start,
                quit: t.gamepad.quit,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.config/koopa-engine`.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            return match load_file(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "config loaded");
                    cfg
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "config unusable, using defaults");
                    GameConfig::default()
                }
            };
        }
        tracing::info!("no config.toml found, using defaults");
        GameConfig::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let parsed: TomlConfig = toml::from_str(text)?;
        Ok(parsed.into())
    }
}

fn load_file(path: &Path) -> Result<GameConfig, EngineError> {
    let text = std::fs::read_to_string(path)?;
    GameConfig::from_toml_str(&text)
}

/// Candidate directories to search: exe dir + CWD + user config dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user = PathBuf::from(&home).join(".config/koopa-engine");
        if user.is_dir() && !dirs.iter().any(|d| d == &user) {
            dirs.push(user);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
