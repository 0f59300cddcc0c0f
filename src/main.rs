//! Ball Drop headless driver
//!
//! Loads settings (optional JSON path as the first argument), draws a small
//! layout with scripted drag gestures, runs the simulation at a fixed frame
//! rate and logs every tone it would play.

use std::path::Path;

use glam::Vec2;

use ball_drop::consts::*;
use ball_drop::sim::{FixedStep, PointerEvent, SimulationState, TickInput, tick};
use ball_drop::{Settings, ToneLog};

/// Seconds of simulated time to run
const RUN_SECONDS: f32 = 20.0;
/// Host frame time (slightly off the sim rate to exercise the accumulator)
const FRAME_DT: f32 = 1.0 / 58.0;

/// Press, drag in a few moves, release
fn stroke(from: Vec2, to: Vec2) -> Vec<PointerEvent> {
    let mut events = vec![PointerEvent::Down { pos: from }];
    let mut prev = from;
    for i in 1..=4 {
        let pos = from.lerp(to, i as f32 / 4.0);
        events.push(PointerEvent::Move { pos, prev });
        prev = pos;
    }
    events.push(PointerEvent::Up { pos: to });
    events
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    let emitter = settings.emitter_position;
    let mut tones = ToneLog::new();
    tones.set_volume(settings.master_volume);
    tones.set_muted(settings.muted);
    let mut state = SimulationState::new(settings);

    // A ramp under the emitter, a long catcher and a short chime
    let mut layout = stroke(emitter + Vec2::new(-60.0, -40.0), emitter + Vec2::new(60.0, -70.0));
    layout.extend(stroke(emitter + Vec2::new(140.0, -120.0), emitter + Vec2::new(-200.0, -220.0)));
    layout.extend(stroke(emitter + Vec2::new(-150.0, -300.0), emitter + Vec2::new(-100.0, -330.0)));
    let first = TickInput {
        pointer: layout,
        ..Default::default()
    };
    tick(&mut state, &first, SIM_DT, &mut tones);
    log::info!("{} segment(s) drawn", state.segments.len());
    for segment in state.segments.segments() {
        log::info!(
            "  segment {}: length {:.1}, tone {}",
            segment.id.0,
            segment.geometry.length,
            state.tones.tone_index(segment.geometry.length)
        );
    }

    let mut clock = FixedStep::new();
    let mut elapsed = 0.0;
    let idle = TickInput::default();
    // Halfway through, lean the device a little to the right
    let lean = TickInput {
        tilt: Some(Vec2::new(0.3, -1.0)),
        ..Default::default()
    };
    let mut leaned = false;
    while elapsed < RUN_SECONDS {
        for _ in 0..clock.advance(FRAME_DT) {
            let input = if !leaned && elapsed >= RUN_SECONDS / 2.0 {
                leaned = true;
                &lean
            } else {
                &idle
            };
            let report = tick(&mut state, input, SIM_DT, &mut tones);
            if input.tilt.is_some() {
                log::info!("tilt: gravity now {:?}", state.world.gravity());
            }
            if report.tones > 0 {
                log::debug!("tick {}: {} tone(s)", state.time_ticks, report.tones);
            }
        }
        elapsed += FRAME_DT;
    }

    log::info!(
        "{} ticks, {} balls dropped, {} in flight, {} tones played",
        state.time_ticks,
        state.emitter.drops(),
        state.ball_count(),
        tones.plays().len()
    );
    if !tones.plays().is_empty() {
        let melody: Vec<String> = tones.indices().iter().map(|i| i.to_string()).collect();
        log::info!("tones: {}", melody.join(" "));
    }
}
