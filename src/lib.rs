//! Ball Drop - a ball-drop music toy
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics world, segments, gestures, emitter, tones)
//! - `audio`: Tone sink abstraction and note table
//! - `settings`: Data-driven configuration

pub mod audio;
pub mod settings;
pub mod sim;

pub use audio::{ToneLog, ToneSink};
pub use settings::{Settings, SpinMode};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Segments shorter than this have no collider
    pub const MIN_SEGMENT_LENGTH: f32 = 10.0;
    /// Collider/visual thickness of every segment
    pub const SEGMENT_THICKNESS: f32 = 2.0;
    /// Segment bounce (> 1 adds energy on every hit)
    pub const SEGMENT_RESTITUTION: f32 = 1.2;
    pub const SEGMENT_FRICTION: f32 = 0.6;

    /// Pointer travel needed before a drag on empty space authors a segment
    pub const DRAG_THRESHOLD: f32 = 30.0;
    /// Grab radius of an endpoint handle
    pub const ENDPOINT_RADIUS: f32 = 10.0;
    /// Grab radius of the emitter source
    pub const EMITTER_RADIUS: f32 = 12.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 1.1;
    pub const BALL_MASS: f32 = 10.0;
    pub const BALL_RESTITUTION: f32 = 0.0;
    pub const BALL_FRICTION: f32 = 0.6;
    /// Spin bound (radians/sec) for freshly dropped balls
    pub const MAX_SPIN: f32 = std::f32::consts::TAU;

    /// Seconds between drops
    pub const EMIT_PERIOD: f32 = 1.5;

    /// Number of distinct tones
    pub const TONE_COUNT: u8 = 17;
    /// Collider width covered by one tone step
    pub const TONE_STEP: f32 = 30.0;
}

/// Midpoint of two points
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}

/// Distance between two points
#[inline]
pub fn segment_length(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_midpoint_and_length() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(6.0, 8.0);
        assert_eq!(midpoint(a, b), Vec2::new(3.0, 4.0));
        assert!((segment_length(a, b) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::X, FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }
}
