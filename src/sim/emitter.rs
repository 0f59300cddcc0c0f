//! Ball emitter: drops a ball at its source on a fixed cadence

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::world::{Body, Collider, category};
use crate::consts::*;
use crate::settings::{Settings, SpinMode};

#[derive(Debug, Clone)]
pub struct Emitter {
    pub pos: Vec2,
    /// Seconds between drops
    period: f32,
    /// Seconds since the last drop
    elapsed: f32,
    enabled: bool,
    spin_mode: SpinMode,
    rng: Pcg32,
    /// Total balls handed out
    drops: u64,
}

impl Emitter {
    pub fn new(pos: Vec2, period: f32, spin_mode: SpinMode, seed: u64) -> Self {
        let period = period.max(1e-3);
        Self {
            pos,
            period,
            // Primed so the first ball drops right away
            elapsed: period,
            enabled: true,
            spin_mode,
            rng: Pcg32::seed_from_u64(seed),
            drops: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut emitter = Self::new(
            settings.emitter_position,
            settings.emit_period,
            settings.spin_mode,
            settings.seed,
        );
        emitter.enabled = settings.emitting;
        emitter
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn drops(&self) -> u64 {
        self.drops
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start or stop emission; balls already dropped are unaffected
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.elapsed = self.period;
        }
        self.enabled = enabled;
        log::debug!("emitter {}", if enabled { "on" } else { "off" });
    }

    /// Flip emission (double-tap); returns the new state
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Whether `pos` is on the emitter's source handle
    pub fn contains(&self, pos: Vec2) -> bool {
        self.pos.distance(pos) <= EMITTER_RADIUS
    }

    /// Advance the cadence clock; returns how many balls are due
    ///
    /// Non-finite or negative frames are ignored. A long frame catches up
    /// by at most `MAX_SUBSTEPS` drops.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.enabled || !dt.is_finite() || dt < 0.0 {
            return 0;
        }
        let elapsed = self.elapsed + dt;
        if !elapsed.is_finite() {
            self.elapsed = 0.0;
            return MAX_SUBSTEPS;
        }
        let due = (elapsed / self.period).floor();
        self.elapsed = elapsed.rem_euclid(self.period);
        due.min(MAX_SUBSTEPS as f32) as u32
    }

    /// Spin for the next ball
    pub fn next_spin(&mut self) -> f32 {
        match self.spin_mode {
            SpinMode::Random => self.rng.random_range(-MAX_SPIN..=MAX_SPIN),
            SpinMode::Fixed => MAX_SPIN,
        }
    }

    /// A fresh ball at the source, at rest, ready to add to the world
    pub fn make_ball(&mut self, radius: f32, mass: f32, friction: f32) -> Body {
        let collider = Collider::circle(radius)
            .with_restitution(BALL_RESTITUTION)
            .with_friction(friction)
            .with_category(category::BALL, category::SEGMENT, category::SEGMENT);
        let mut ball = Body::dynamic(self.pos, mass, collider);
        ball.angular_vel = self.next_spin();
        self.drops += 1;
        ball
    }
}
