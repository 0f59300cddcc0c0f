//! Fixed timestep simulation tick
//!
//! Core loop that advances the simulation deterministically.

use glam::Vec2;

use super::drag::PointerEvent;
use super::state::SimulationState;
use crate::audio::ToneSink;
use crate::consts::*;

/// Input collected by the host for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// New gravity, if the host sets one directly this frame
    pub gravity: Option<Vec2>,
    /// Axis-corrected accelerometer reading (in g); scaled and clamped by
    /// the tilt settings, and wins over `gravity`
    pub tilt: Option<Vec2>,
    /// Pointer events in arrival order
    pub pointer: Vec<PointerEvent>,
    /// Single tap position (fires the emitter when on it)
    pub tap: Option<Vec2>,
    /// Double tap: start/stop emission
    pub toggle_emission: bool,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub dropped: u32,
    pub tones: u32,
    pub culled: u32,
}

/// Advance the simulation by one fixed timestep
///
/// Input is applied first, so segment colliders always reflect the latest
/// drag before the world steps.
pub fn tick<S: ToneSink + ?Sized>(
    state: &mut SimulationState,
    input: &TickInput,
    dt: f32,
    sink: &mut S,
) -> TickReport {
    let mut report = TickReport::default();

    if let Some(gravity) = input.gravity {
        state.world.set_gravity(gravity);
    }
    if let Some(accel) = input.tilt {
        let gravity = tilt_to_gravity(accel, state.settings.tilt_scale, state.settings.tilt_max);
        state.world.set_gravity(gravity);
    }
    if input.toggle_emission {
        state.emitter.toggle();
    }

    for event in &input.pointer {
        state.handle_pointer(*event);
    }

    if let Some(pos) = input.tap {
        if state.tap(pos).is_some() {
            report.dropped += 1;
        }
    }

    for _ in 0..state.emitter.advance(dt) {
        state.drop_ball();
        report.dropped += 1;
    }

    for contact in state.world.step(dt) {
        state.tones.on_contact(&contact, sink);
        report.tones += 1;
    }

    report.culled = state.cull_balls() as u32;
    state.time_ticks += 1;
    report
}

/// Convert an axis-corrected accelerometer reading (in g) to gravity,
/// clamped to `max` points/s²
pub fn tilt_to_gravity(accel: Vec2, scale: f32, max: f32) -> Vec2 {
    let gravity = accel * scale;
    if !gravity.is_finite() {
        return Vec2::ZERO;
    }
    gravity.clamp_length_max(max)
}

/// Accumulates frame time into whole simulation steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's elapsed time; returns how many `SIM_DT` steps to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ToneLog;
    use crate::settings::{Settings, SpinMode};

    fn settings(gravity: Vec2) -> Settings {
        Settings {
            gravity,
            emitting: false,
            spin_mode: SpinMode::Fixed,
            ..Settings::default()
        }
    }

    fn drag(from: Vec2, to: Vec2) -> TickInput {
        TickInput {
            pointer: vec![
                PointerEvent::Down { pos: from },
                PointerEvent::Move { pos: to, prev: from },
                PointerEvent::Up { pos: to },
            ],
            ..Default::default()
        }
    }

    fn run(state: &mut SimulationState, ticks: usize, sink: &mut ToneLog) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(state, &input, SIM_DT, sink);
        }
    }

    #[test]
    fn test_ball_on_long_segment_plays_tone_six() {
        let mut state = SimulationState::new(settings(Vec2::new(0.0, -150.0)));
        let mut sink = ToneLog::new();

        // 300-long bar 40 below the emitter, drawn right to left
        tick(&mut state, &drag(Vec2::new(150.0, -40.0), Vec2::new(-150.0, -40.0)), SIM_DT, &mut sink);
        assert_eq!(state.segments.len(), 1);

        state.drop_ball();
        run(&mut state, 60, &mut sink);
        assert_eq!(sink.indices().first(), Some(&6));
    }

    #[test]
    fn test_short_segment_is_ignored_by_balls() {
        let mut state = SimulationState::new(settings(Vec2::new(0.0, -150.0)));
        let mut sink = ToneLog::new();

        // Long enough to draw, then shrunk below the collider minimum
        tick(&mut state, &drag(Vec2::new(0.0, -40.0), Vec2::new(0.0, -80.0)), SIM_DT, &mut sink);
        let end = state.segments.endpoints()[1].id;
        state
            .segments
            .set_endpoint_position(&mut state.world, end, Vec2::new(0.0, -45.0));
        assert_eq!(state.segments.segments()[0].geometry.length, 5.0);

        let ball = state.drop_ball();
        run(&mut state, 90, &mut sink);
        assert!(sink.plays().is_empty());
        let body = state.world.body(ball).unwrap();
        assert!(body.pos.y < -45.0);
        assert!(body.vel.y < 0.0);
        assert_eq!(body.pos.x, 0.0);
    }

    #[test]
    fn test_free_fall_has_no_drift() {
        let mut state = SimulationState::new(settings(Vec2::new(0.0, -9.8)));
        let mut sink = ToneLog::new();
        let ball = state.drop_ball();

        let mut last_y = state.world.body(ball).unwrap().pos.y;
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), SIM_DT, &mut sink);
            let body = state.world.body(ball).unwrap();
            assert!(body.pos.y < last_y);
            assert_eq!(body.pos.x, 0.0);
            last_y = body.pos.y;
        }
    }

    #[test]
    fn test_gravity_input_steers_balls() {
        let mut state = SimulationState::new(settings(Vec2::ZERO));
        let mut sink = ToneLog::new();
        let ball = state.drop_ball();
        let input = TickInput {
            gravity: Some(Vec2::new(50.0, 0.0)),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT, &mut sink);
        assert_eq!(state.world.gravity(), Vec2::new(50.0, 0.0));
        assert!(state.world.body(ball).unwrap().pos.x > 0.0);
    }

    #[test]
    fn test_emitter_cadence_and_toggle() {
        let mut s = settings(Vec2::ZERO);
        s.emitting = true;
        s.cull_bounds = None;
        let mut state = SimulationState::new(s);
        let mut sink = ToneLog::new();

        // Just under 3 seconds: drops at t=0 and t=1.5 only
        let mut dropped = 0;
        for _ in 0..179 {
            dropped += tick(&mut state, &TickInput::default(), SIM_DT, &mut sink).dropped;
        }
        assert_eq!(dropped, 2);

        let off = TickInput {
            toggle_emission: true,
            ..Default::default()
        };
        tick(&mut state, &off, SIM_DT, &mut sink);
        run(&mut state, 600, &mut sink);
        assert_eq!(state.ball_count(), 2);
    }

    #[test]
    fn test_tap_on_emitter_drops_ball() {
        let mut state = SimulationState::new(settings(Vec2::ZERO));
        let mut sink = ToneLog::new();
        let input = TickInput {
            tap: Some(Vec2::new(1.0, -1.0)),
            ..Default::default()
        };
        let report = tick(&mut state, &input, SIM_DT, &mut sink);
        assert_eq!(report.dropped, 1);
        assert_eq!(state.ball_count(), 1);
    }

    #[test]
    fn test_fallen_balls_are_culled() {
        let mut state = SimulationState::new(settings(Vec2::new(0.0, -3000.0)));
        let mut sink = ToneLog::new();
        state.drop_ball();
        let mut culled = 0;
        for _ in 0..120 {
            culled += tick(&mut state, &TickInput::default(), SIM_DT, &mut sink).culled;
        }
        assert_eq!(culled, 1);
        assert_eq!(state.ball_count(), 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = SimulationState::new(Settings::default());
        let mut b = SimulationState::new(Settings::default());
        let mut sink_a = ToneLog::new();
        let mut sink_b = ToneLog::new();

        let inputs = [
            drag(Vec2::new(-80.0, -60.0), Vec2::new(80.0, -90.0)),
            TickInput::default(),
            TickInput {
                gravity: Some(Vec2::new(20.0, -150.0)),
                ..Default::default()
            },
        ];
        for input in &inputs {
            tick(&mut a, input, SIM_DT, &mut sink_a);
            tick(&mut b, input, SIM_DT, &mut sink_b);
        }
        run(&mut a, 300, &mut sink_a);
        run(&mut b, 300, &mut sink_b);

        assert_eq!(sink_a.indices(), sink_b.indices());
        let pa: Vec<Vec2> = a.balls().map(|x| x.pos).collect();
        let pb: Vec<Vec2> = b.balls().map(|x| x.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_tilt_to_gravity_clamps() {
        let g = tilt_to_gravity(Vec2::new(0.0, -1.0), 150.0, 450.0);
        assert_eq!(g, Vec2::new(0.0, -150.0));
        let g = tilt_to_gravity(Vec2::new(10.0, 0.0), 150.0, 450.0);
        assert!((g.length() - 450.0).abs() < 1e-3);
        assert_eq!(tilt_to_gravity(Vec2::new(f32::NAN, 0.0), 150.0, 450.0), Vec2::ZERO);
    }

    #[test]
    fn test_tilt_input_uses_settings() {
        let mut s = settings(Vec2::new(0.0, -150.0));
        s.tilt_scale = 100.0;
        s.tilt_max = 120.0;
        let mut state = SimulationState::new(s);
        let mut sink = ToneLog::new();

        let gentle = TickInput {
            tilt: Some(Vec2::new(0.5, -1.0)),
            ..Default::default()
        };
        tick(&mut state, &gentle, SIM_DT, &mut sink);
        assert_eq!(state.world.gravity(), Vec2::new(50.0, -100.0));

        // Hard shake: clamped to tilt_max, and wins over direct gravity
        let shake = TickInput {
            gravity: Some(Vec2::new(0.0, -9.8)),
            tilt: Some(Vec2::new(3.0, -4.0)),
            ..Default::default()
        };
        tick(&mut state, &shake, SIM_DT, &mut sink);
        let g = state.world.gravity();
        assert!((g.length() - 120.0).abs() < 1e-3);
        assert!((g - Vec2::new(72.0, -96.0)).length() < 1e-3);
    }

    #[test]
    fn test_bad_frame_time_is_ignored() {
        let mut s = settings(Vec2::new(0.0, -150.0));
        s.emitting = true;
        let mut state = SimulationState::new(s);
        let mut sink = ToneLog::new();
        let ball = state.drop_ball();
        let before = state.world.body(ball).unwrap().pos;

        for dt in [f32::INFINITY, f32::NAN, -1.0] {
            tick(&mut state, &TickInput::default(), dt, &mut sink);
        }
        let body = state.world.body(ball).unwrap();
        assert_eq!(body.pos, before);
        assert_eq!(body.vel, Vec2::ZERO);
        assert_eq!(state.ball_count(), 1);
    }

    #[test]
    fn test_fixed_step_accumulates_and_caps() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
        assert_eq!(clock.advance(10.0), MAX_SUBSTEPS);
        assert!(clock.advance(0.0) <= 1);
    }
}
