//! Simulation settings
//!
//! Loaded from a JSON file; every field falls back to its default when missing.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How freshly dropped balls get their spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpinMode {
    /// Uniform in [-MAX_SPIN, MAX_SPIN]
    #[default]
    Random,
    /// Always MAX_SPIN (deterministic spin)
    Fixed,
}

impl SpinMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpinMode::Random => "random",
            SpinMode::Fixed => "fixed",
        }
    }
}

/// Axis-aligned rectangle outside of which balls are discarded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Simulation settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    /// Gravity before any tilt input arrives (points/s²)
    pub gravity: Vec2,
    /// Balls leaving this box are removed (None = keep forever)
    pub cull_bounds: Option<Bounds>,

    // === Emitter ===
    pub emitter_position: Vec2,
    /// Seconds between drops
    pub emit_period: f32,
    /// Start with emission running
    pub emitting: bool,
    pub spin_mode: SpinMode,
    /// Seed for the spin RNG
    pub seed: u64,

    // === Balls ===
    pub ball_radius: f32,
    pub ball_mass: f32,
    pub ball_friction: f32,

    // === Tilt ===
    /// Accelerometer g -> points/s²
    pub tilt_scale: f32,
    /// Largest gravity magnitude tilt may produce
    pub tilt_max: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // 1 m/s² at 150 points per meter
            gravity: Vec2::new(0.0, -150.0),
            cull_bounds: Some(Bounds::new(
                Vec2::new(-1000.0, -1000.0),
                Vec2::new(1000.0, 1000.0),
            )),

            emitter_position: Vec2::ZERO,
            emit_period: EMIT_PERIOD,
            emitting: true,
            spin_mode: SpinMode::Random,
            seed: 0x5eed_ba11,

            ball_radius: BALL_RADIUS,
            ball_mass: BALL_MASS,
            ball_friction: BALL_FRICTION,

            tilt_scale: 150.0,
            tilt_max: 450.0,

            master_volume: 0.8,
            muted: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!(
                        "Loaded settings from {} (spin: {})",
                        path.display(),
                        settings.spin_mode.as_str()
                    );
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Replace values that would stall or break the simulation
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.emit_period.is_finite() && self.emit_period > 0.0) {
            log::warn!("emit_period {} rejected", self.emit_period);
            self.emit_period = defaults.emit_period;
        }
        if !(self.ball_radius.is_finite() && self.ball_radius > 0.0) {
            log::warn!("ball_radius {} rejected", self.ball_radius);
            self.ball_radius = defaults.ball_radius;
        }
        if !(self.ball_mass.is_finite() && self.ball_mass > 0.0) {
            log::warn!("ball_mass {} rejected", self.ball_mass);
            self.ball_mass = defaults.ball_mass;
        }
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.tilt_max = self.tilt_max.max(0.0);
        self
    }

    /// Effective output volume (respects mute)
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }
}
