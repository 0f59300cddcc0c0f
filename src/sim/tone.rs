//! Segment length to tone index
//!
//! Longer bars sing lower: every `TONE_STEP` of collider width drops one
//! tone, bottoming out at tone 0.

use super::world::Contact;
use crate::audio::ToneSink;
use crate::consts::{TONE_COUNT, TONE_STEP};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMapper {
    tone_count: u8,
    step: f32,
}

impl Default for ToneMapper {
    fn default() -> Self {
        Self {
            tone_count: TONE_COUNT,
            step: TONE_STEP,
        }
    }
}

impl ToneMapper {
    pub fn tone_count(&self) -> u8 {
        self.tone_count
    }

    /// `clamp(top - floor(width / step), 0, top)` with `top = tone_count - 1`
    pub fn tone_index(&self, width: f32) -> u8 {
        let top = f32::from(self.tone_count.saturating_sub(1));
        // NaN widths fall through `max` as 0 and land on the top tone
        let steps = (width.max(0.0) / self.step).floor();
        (top - steps).clamp(0.0, top) as u8
    }

    /// Play the tone for a segment contact; returns the index played
    pub fn on_contact<S: ToneSink + ?Sized>(&self, contact: &Contact, sink: &mut S) -> u8 {
        let index = self.tone_index(contact.other_size.x);
        sink.play_tone(index);
        index
    }
}
