/// Sound engine: APU-style waveform synthesis plus fire-and-forget playback.
///
/// Every cue is synthesized once at startup as signed 8-bit samples at
/// 11025 Hz, wrapped into an in-memory WAV buffer and handed to rodio on
/// demand. Starting a cue never blocks and never stops an earlier one.
///
/// Compile without the "sound" feature to disable audio entirely (the
/// stub SoundEngine does nothing). The synthesizer itself is always built.

use crate::sim::event::GameEvent;

pub const SAMPLE_RATE: u32 = 11025;

const NOTE_LENGTH: f32 = 0.2;

/// C4 D4 E4 F4 G4 A4
const LEVEL_START_NOTES: [f32; 6] = [261.63, 293.66, 329.63, 349.23, 392.0, 440.0];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Waveform {
    /// `duty` is the high fraction of each period, 0.0..=1.0.
    Square { duty: f32 },
    Triangle,
    /// 15-bit LFSR clocked once every `divisor` samples.
    Noise { divisor: u32 },
}

// ════════════════════════════════════════════════════════════
//  Waveform generators
// ════════════════════════════════════════════════════════════

/// Render `duration` seconds of one waveform. Noise ignores `freq`.
pub fn synthesize(wave: Waveform, freq: f32, duration: f32) -> Vec<i8> {
    let n = (SAMPLE_RATE as f64 * duration.max(0.0) as f64).round() as usize;
    match wave {
        Waveform::Square { duty } => tone(n, freq, |p| if p < duty { 127 } else { -128 }),
        Waveform::Triangle => tone(n, freq, |p| (((4.0 * p - 2.0).abs() - 1.0) * 64.0) as i8),
        Waveform::Noise { divisor } => noise(n, divisor.max(1)),
    }
}

/// Periodic waveform sampled by phase in 0.0..1.0.
fn tone(n: usize, freq: f32, shape: impl Fn(f32) -> i8) -> Vec<i8> {
    if !(freq > 0.0) {
        return vec![0; n];
    }
    let period = ((SAMPLE_RATE as f32 / freq) as usize).max(1);
    (0..n)
        .map(|i| shape((i % period) as f32 / period as f32))
        .collect()
}

fn noise(n: usize, divisor: u32) -> Vec<i8> {
    let mut lfsr: u16 = 1;
    let mut counter = 0;
    (0..n)
        .map(|_| {
            counter += 1;
            if counter >= divisor {
                counter = 0;
                let feedback = (lfsr ^ (lfsr >> 1)) & 1;
                lfsr >>= 1;
                if feedback != 0 {
                    lfsr |= 0x4000;
                }
            }
            if lfsr & 1 != 0 { 64 } else { -64 }
        })
        .collect()
}

fn sequence(wave: Waveform, notes: &[f32], note_len: f32) -> Vec<i8> {
    notes
        .iter()
        .flat_map(|&f| synthesize(wave, f, note_len))
        .collect()
}

// ════════════════════════════════════════════════════════════
//  Cues
// ════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    LevelStart,
    Jump,
    Stomp,
    Hurt,
    GameOver,
    Win,
}

impl Cue {
    pub const ALL: [Cue; 6] = [Cue::LevelStart, Cue::Jump, Cue::Stomp, Cue::Hurt, Cue::GameOver, Cue::Win];

    /// `LevelCleared` is always followed by `LevelStart` or `Win` in the
    /// same frame, so it has no cue of its own.
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::LevelStart { .. } => Some(Cue::LevelStart),
            GameEvent::Jump => Some(Cue::Jump),
            GameEvent::Stomp => Some(Cue::Stomp),
            GameEvent::Hurt => Some(Cue::Hurt),
            GameEvent::GameOver => Some(Cue::GameOver),
            GameEvent::Win => Some(Cue::Win),
            GameEvent::LevelCleared => None,
        }
    }

    pub fn samples(self) -> Vec<i8> {
        match self {
            Cue::LevelStart => sequence(Waveform::Square { duty: 0.5 }, &LEVEL_START_NOTES, NOTE_LENGTH),
            Cue::Jump => sequence(Waveform::Square { duty: 0.25 }, &[523.25, 783.99], 0.05),
            Cue::Stomp => synthesize(Waveform::Noise { divisor: 4 }, 0.0, 0.08),
            Cue::Hurt => sequence(Waveform::Triangle, &[440.0, 370.0, 311.0], 0.1),
            Cue::GameOver => sequence(Waveform::Triangle, &[392.0, 329.63, 261.63, 196.0], 0.25),
            Cue::Win => sequence(Waveform::Square { duty: 0.5 }, &[523.25, 659.25, 783.99, 1046.5], 0.15),
        }
    }
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: wraps 8-bit samples into a 16-bit PCM WAV buffer
// ════════════════════════════════════════════════════════════

pub fn make_wav(samples: &[i8]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        let val = (s as i16) << 8;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

// ════════════════════════════════════════════════════════════
//  Playback
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{make_wav, Cue};
    use crate::config::SoundConfig;
    use crate::sim::event::GameEvent;

    struct Output {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    pub struct SoundEngine {
        output: Option<Output>,
        volume: f32,
        /// Pre-rendered WAV per cue, indexed like `Cue::ALL`.
        cues: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        /// Never fails: an unavailable device yields a disabled engine.
        pub fn new(cfg: &SoundConfig) -> Self {
            let output = if cfg.enabled {
                match OutputStream::try_default() {
                    Ok((stream, handle)) => Some(Output { _stream: stream, handle }),
                    Err(e) => {
                        tracing::warn!(error = %e, "audio output unavailable, sound disabled");
                        None
                    }
                }
            } else {
                tracing::info!("sound disabled by config");
                None
            };

            let cues = if output.is_some() {
                Cue::ALL.iter().map(|c| Arc::new(make_wav(&c.samples()))).collect()
            } else {
                Vec::new()
            };

            SoundEngine { output, volume: cfg.volume, cues }
        }

        pub fn is_enabled(&self) -> bool {
            self.output.is_some()
        }

        pub fn play_event(&self, event: &GameEvent) {
            if let Some(cue) = Cue::for_event(event) {
                self.play(cue);
            }
        }

        pub fn play(&self, cue: Cue) {
            let Some(out) = &self.output else { return };
            let Some(idx) = Cue::ALL.iter().position(|&c| c == cue) else { return };
            let Some(buf) = self.cues.get(idx) else { return };

            if let Ok(sink) = Sink::try_new(&out.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                match rodio::Decoder::new(cursor) {
                    Ok(src) => {
                        sink.set_volume(self.volume);
                        sink.append(src);
                        sink.detach(); // fire-and-forget
                    }
                    Err(e) => tracing::debug!(error = %e, ?cue, "cue decode failed"),
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_cfg: &crate::config::SoundConfig) -> Self {
        tracing::info!("built without sound support");
        SoundEngine
    }
    pub fn is_enabled(&self) -> bool { false }
    pub fn play_event(&self, _event: &GameEvent) {}
    pub fn play(&self, _cue: Cue) {}
}
