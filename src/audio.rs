//! Tone output
//!
//! The simulation never plays sound itself. It hands tone indices to a
//! [`ToneSink`]; the host decides how (or whether) to make noise.

use crate::consts::TONE_COUNT;

/// Receiver for "play tone N" requests (fire-and-forget)
pub trait ToneSink {
    /// `index` is always in `0..TONE_COUNT`, 0 being the lowest note
    fn play_tone(&mut self, index: u8);
}

impl ToneSink for Vec<u8> {
    fn play_tone(&mut self, index: u8) {
        self.push(index);
    }
}

/// Major-scale semitone offsets within one octave
const MAJOR_SCALE: [u32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Frequency (Hz) of tone `index`: a major scale rising from C4
pub fn tone_frequency(index: u8) -> f32 {
    const C4: f32 = 261.63;
    let index = u32::from(index.min(TONE_COUNT - 1));
    let semitones = (index / 7) * 12 + MAJOR_SCALE[(index % 7) as usize];
    C4 * 2f32.powf(semitones as f32 / 12.0)
}

/// One recorded tone request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonePlay {
    pub index: u8,
    pub frequency: f32,
    pub volume: f32,
}

/// Recording sink for headless runs and tests
#[derive(Debug, Clone)]
pub struct ToneLog {
    volume: f32,
    muted: bool,
    plays: Vec<TonePlay>,
}

impl Default for ToneLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneLog {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            plays: Vec::new(),
        }
    }

    /// Set volume (0.0 - 1.0)
    pub fn set_volume(&mut self, vol: f32) {
        self.volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    pub fn plays(&self) -> &[TonePlay] {
        &self.plays
    }

    /// Tone indices in the order they were requested
    pub fn indices(&self) -> Vec<u8> {
        self.plays.iter().map(|p| p.index).collect()
    }

    pub fn clear(&mut self) {
        self.plays.clear();
    }
}

impl ToneSink for ToneLog {
    fn play_tone(&mut self, index: u8) {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return;
        }
        let frequency = tone_frequency(index);
        log::debug!("tone {index} ({frequency:.1} Hz)");
        self.plays.push(TonePlay {
            index,
            frequency,
            volume,
        });
    }
}
