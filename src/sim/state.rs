//! Simulation state
//!
//! One explicitly owned [`SimulationState`] holds everything the core
//! mutates: the physics world, the drawn segments, the emitter and the
//! gesture in progress.

use glam::Vec2;

use super::drag::{DragScene, DragSession, Draggable, PointerEvent};
use super::emitter::Emitter;
use super::segment::{EndpointId, SegmentId, SegmentStore};
use super::tone::ToneMapper;
use super::world::{Body, BodyId, PhysicsWorld, Shape};
use crate::consts::ENDPOINT_RADIUS;
use crate::settings::Settings;

/// Handle for anything a hit test can find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneObject {
    Emitter,
    Endpoint(EndpointId),
    Segment(SegmentId),
    Ball(BodyId),
}

/// Complete simulation state (deterministic for a given seed and input)
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub settings: Settings,
    pub world: PhysicsWorld,
    pub segments: SegmentStore,
    pub emitter: Emitter,
    pub drag: DragSession,
    pub tones: ToneMapper,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl SimulationState {
    pub fn new(settings: Settings) -> Self {
        Self {
            world: PhysicsWorld::new(settings.gravity),
            segments: SegmentStore::new(),
            emitter: Emitter::from_settings(&settings),
            drag: DragSession::new(),
            tones: ToneMapper::default(),
            time_ticks: 0,
            settings,
        }
    }

    /// Feed one pointer event to the gesture in progress
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let mut scene = Scene {
            world: &mut self.world,
            segments: &mut self.segments,
            emitter: &mut self.emitter,
        };
        self.drag.handle(event, &mut scene);
    }

    /// Everything under `pos`, topmost first
    pub fn objects_at(&self, pos: Vec2) -> Vec<SceneObject> {
        objects_at(&self.world, &self.segments, &self.emitter, pos)
    }

    /// Tap: firing the emitter drops a ball immediately
    pub fn tap(&mut self, pos: Vec2) -> Option<BodyId> {
        if self.objects_at(pos).contains(&SceneObject::Emitter) {
            Some(self.drop_ball())
        } else {
            None
        }
    }

    /// Drop one ball at the emitter
    pub fn drop_ball(&mut self) -> BodyId {
        let ball = self.emitter.make_ball(
            self.settings.ball_radius,
            self.settings.ball_mass,
            self.settings.ball_friction,
        );
        self.world.add_body(ball)
    }

    pub fn balls(&self) -> impl Iterator<Item = &Body> {
        self.world.dynamic_bodies()
    }

    pub fn ball_count(&self) -> usize {
        self.balls().count()
    }

    /// Remove balls outside the configured bounds; returns how many went
    pub fn cull_balls(&mut self) -> usize {
        let Some(bounds) = self.settings.cull_bounds else {
            return 0;
        };
        let gone: Vec<BodyId> = self
            .world
            .dynamic_bodies()
            .filter(|b| !bounds.contains(b.pos))
            .map(|b| b.id)
            .collect();
        for id in &gone {
            self.world.remove_body(*id);
        }
        gone.len()
    }
}

fn objects_at(
    world: &PhysicsWorld,
    segments: &SegmentStore,
    emitter: &Emitter,
    pos: Vec2,
) -> Vec<SceneObject> {
    let mut found = Vec::new();
    found.extend(
        world
            .dynamic_bodies()
            .filter(|b| b.pos.distance(pos) <= radius_of(b))
            .map(|b| SceneObject::Ball(b.id)),
    );
    found.extend(
        segments
            .endpoints()
            .iter()
            .rev()
            .filter(|e| e.pos.distance(pos) <= ENDPOINT_RADIUS)
            .map(|e| SceneObject::Endpoint(e.id)),
    );
    found.extend(
        segments
            .segments()
            .iter()
            .rev()
            .filter(|s| s.geometry.contains_point(pos))
            .map(|s| SceneObject::Segment(s.id)),
    );
    if emitter.contains(pos) {
        found.push(SceneObject::Emitter);
    }
    found
}

fn radius_of(body: &Body) -> f32 {
    match body.collider.map(|c| c.shape) {
        Some(Shape::Circle { radius }) => radius,
        _ => 0.0,
    }
}

/// Mutable view of the parts of the state a gesture edits
pub struct Scene<'a> {
    pub world: &'a mut PhysicsWorld,
    pub segments: &'a mut SegmentStore,
    pub emitter: &'a mut Emitter,
}

impl DragScene for Scene<'_> {
    fn draggable_at(&self, pos: Vec2) -> Option<Draggable> {
        // Endpoints are drawn above the emitter
        if let Some(id) = self.segments.endpoint_at(pos) {
            return Some(Draggable::Endpoint(id));
        }
        self.emitter.contains(pos).then_some(Draggable::Emitter)
    }

    fn is_occupied(&self, pos: Vec2) -> bool {
        !objects_at(&*self.world, &*self.segments, &*self.emitter, pos).is_empty()
    }

    fn translate(&mut self, target: Draggable, delta: Vec2) {
        match target {
            Draggable::Emitter => self.emitter.pos += delta,
            Draggable::Endpoint(id) => {
                self.segments.move_endpoint_by(self.world, id, delta);
            }
        }
    }

    fn create_segment(&mut self, start: Vec2, end: Vec2) -> EndpointId {
        let (_, [_, end_id]) = self.segments.create(self.world, start, end);
        end_id
    }

    fn move_endpoint_to(&mut self, endpoint: EndpointId, pos: Vec2) {
        self.segments.set_endpoint_position(self.world, endpoint, pos);
    }

    fn refresh(&mut self, target: Draggable) {
        if let Draggable::Endpoint(id) = target {
            if let Some(segment) = self.segments.endpoint(id).map(|e| e.segment) {
                self.segments.sync(self.world, segment);
            }
        }
    }
}
