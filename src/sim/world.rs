//! Physics world: dynamic balls against static segment bars
//!
//! Integration is semi-implicit Euler. Contacts are edge-triggered: a
//! (dynamic, static) pair reports once when it starts touching and stays
//! silent until it has separated for at least one step.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{ball_rect_collision, mix_friction, mix_restitution, resolve_velocity};

/// Collision category bits
pub mod category {
    pub const BALL: u32 = 1 << 0;
    pub const SEGMENT: u32 = 1 << 1;
    pub const ALL: u32 = u32::MAX;
}

/// Upper bound on sweep subdivisions for one body in one step
pub const MAX_SWEEP_STEPS: u32 = 32;

/// Stable body handle; never reused within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    /// Full extents before rotation
    Rect { size: Vec2 },
}

/// Collision shape plus surface and filtering properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    pub restitution: f32,
    pub friction: f32,
    /// Which category this collider belongs to
    pub category: u32,
    /// Categories this collider bounces off
    pub collision_mask: u32,
    /// Categories whose touches are reported
    pub contact_mask: u32,
}

impl Collider {
    pub fn circle(radius: f32) -> Self {
        Self {
            shape: Shape::Circle { radius },
            restitution: 0.2,
            friction: 0.2,
            category: category::ALL,
            collision_mask: category::ALL,
            contact_mask: 0,
        }
    }

    pub fn rect(size: Vec2) -> Self {
        Self {
            shape: Shape::Rect { size },
            ..Self::circle(0.0)
        }
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_category(mut self, category: u32, collision_mask: u32, contact_mask: u32) -> Self {
        self.category = category;
        self.collision_mask = collision_mask;
        self.contact_mask = contact_mask;
        self
    }

    /// Rectangle extents, if this is a rectangle
    pub fn size(&self) -> Option<Vec2> {
        match self.shape {
            Shape::Rect { size } => Some(size),
            Shape::Circle { .. } => None,
        }
    }

    /// Either side wants to bounce off the other
    pub fn collides_with(&self, other: &Collider) -> bool {
        self.collision_mask & other.category != 0 || other.collision_mask & self.category != 0
    }

    /// Either side wants to hear about touching the other
    pub fn reports_contact_with(&self, other: &Collider) -> bool {
        self.contact_mask & other.category != 0 || other.contact_mask & self.category != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moved by gravity and contacts
    Dynamic,
    /// Infinite mass, never moves on its own
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Orientation (radians)
    pub rotation: f32,
    pub angular_vel: f32,
    pub mass: f32,
    pub affected_by_gravity: bool,
    /// `None` = present in the world but not collidable
    pub collider: Option<Collider>,
}

impl Body {
    /// A dynamic body at rest; the world assigns the id on insertion
    pub fn dynamic(pos: Vec2, mass: f32, collider: Collider) -> Self {
        Self {
            id: BodyId(0),
            kind: BodyKind::Dynamic,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            angular_vel: 0.0,
            mass,
            affected_by_gravity: true,
            collider: Some(collider),
        }
    }

    /// A static body, initially without a collider
    pub fn fixed(pos: Vec2, rotation: f32) -> Self {
        Self {
            id: BodyId(0),
            kind: BodyKind::Static,
            pos,
            vel: Vec2::ZERO,
            rotation,
            angular_vel: 0.0,
            mass: f32::INFINITY,
            affected_by_gravity: false,
            collider: None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }
}

/// A newly begun touch between a dynamic body and a static one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// The dynamic body (ball)
    pub body: BodyId,
    /// The static body (segment)
    pub other: BodyId,
    pub point: Vec2,
    /// Points from the static surface toward the dynamic body
    pub normal: Vec2,
    /// Collider extents of `other` at the moment of contact
    pub other_size: Vec2,
}

/// Receives contact-begin notifications from [`PhysicsWorld::step_with`]
pub trait ContactListener {
    fn contact_began(&mut self, contact: &Contact);
}

impl ContactListener for Vec<Contact> {
    fn contact_began(&mut self, contact: &Contact) {
        self.push(*contact);
    }
}

/// Snapshot of a collidable static body taken at the start of a step
struct StaticShape {
    id: BodyId,
    pos: Vec2,
    rotation: f32,
    size: Vec2,
    collider: Collider,
}

#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    gravity: Vec2,
    /// Sorted by id for deterministic iteration
    bodies: Vec<Body>,
    next_id: u32,
    /// (dynamic, static) pairs touching at the end of the last step
    touching: BTreeSet<(BodyId, BodyId)>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            next_id: 1,
            touching: BTreeSet::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Replace gravity for this and later steps (no clamping here)
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Insert a body, returning its freshly assigned id
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        body.id = id;
        // Ids are monotonic, so pushing keeps the list sorted
        self.bodies.push(body);
        id
    }

    /// Remove a body; unknown or already removed ids are a no-op
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let idx = self.index_of(id)?;
        self.touching.retain(|&(a, b)| a != id && b != id);
        Some(self.bodies.remove(idx))
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(move |i| &mut self.bodies[i])
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn dynamic_bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.is_dynamic())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Place a body; returns false if it no longer exists
    pub fn set_transform(&mut self, id: BodyId, pos: Vec2, rotation: f32) -> bool {
        match self.body_mut(id) {
            Some(body) => {
                body.pos = pos;
                body.rotation = rotation;
                true
            }
            None => false,
        }
    }

    /// Swap a body's collider (`None` makes it non-collidable)
    pub fn set_collider(&mut self, id: BodyId, collider: Option<Collider>) -> bool {
        let Some(body) = self.body_mut(id) else {
            return false;
        };
        let cleared = collider.is_none();
        body.collider = collider;
        if cleared {
            self.touching.retain(|&(a, b)| a != id && b != id);
        }
        true
    }

    /// Whether the pair was touching at the end of the last step
    pub fn is_touching(&self, body: BodyId, other: BodyId) -> bool {
        self.touching.contains(&(body, other))
    }

    /// Advance the world and return the contacts that began this step
    pub fn step(&mut self, dt: f32) -> Vec<Contact> {
        let mut began = Vec::new();
        self.step_with(dt, &mut began);
        began
    }

    /// Advance every dynamic body by `dt`, resolving contacts against
    /// collidable static bodies, then notify `listener` once per newly
    /// begun contact (in body id order)
    pub fn step_with<L: ContactListener + ?Sized>(&mut self, dt: f32, listener: &mut L) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let statics: Vec<StaticShape> = self
            .bodies
            .iter()
            .filter(|b| !b.is_dynamic())
            .filter_map(|b| {
                let collider = b.collider?;
                let size = collider.size()?;
                Some(StaticShape {
                    id: b.id,
                    pos: b.pos,
                    rotation: b.rotation,
                    size,
                    collider,
                })
            })
            .collect();

        let gravity = self.gravity;
        let mut now_touching = BTreeSet::new();
        let mut began = Vec::new();

        for body in self.bodies.iter_mut().filter(|b| b.is_dynamic()) {
            if body.affected_by_gravity {
                body.vel += gravity * dt;
            }

            let radius = match body.collider {
                Some(Collider {
                    shape: Shape::Circle { radius },
                    ..
                }) if radius > 0.0 => radius,
                _ => {
                    // Nothing we can collide: plain integration
                    body.pos += body.vel * dt;
                    body.rotation += body.angular_vel * dt;
                    continue;
                }
            };
            let Some(collider) = body.collider else {
                continue;
            };

            // Sub-divide so no single move exceeds the ball radius
            let travel = body.vel.length() * dt;
            let sweeps = if travel.is_finite() {
                ((travel / radius).ceil() as u32).clamp(1, MAX_SWEEP_STEPS)
            } else {
                1
            };
            let h = dt / sweeps as f32;

            for _ in 0..sweeps {
                body.pos += body.vel * h;

                for shape in &statics {
                    let reports = collider.reports_contact_with(&shape.collider);
                    let collides = collider.collides_with(&shape.collider);
                    if !reports && !collides {
                        continue;
                    }

                    let hit =
                        ball_rect_collision(body.pos, radius, shape.pos, shape.size, shape.rotation);
                    if !hit.hit {
                        continue;
                    }

                    if collides {
                        if hit.penetration > 0.0 {
                            body.pos += hit.normal * hit.penetration;
                        }
                        body.vel = resolve_velocity(
                            body.vel,
                            hit.normal,
                            mix_restitution(collider.restitution, shape.collider.restitution),
                            mix_friction(collider.friction, shape.collider.friction),
                        );
                    }

                    let key = (body.id, shape.id);
                    if reports && now_touching.insert(key) && !self.touching.contains(&key) {
                        began.push(Contact {
                            body: body.id,
                            other: shape.id,
                            point: hit.point,
                            normal: hit.normal,
                            other_size: shape.size,
                        });
                    }
                }
            }

            body.rotation += body.angular_vel * dt;
        }

        self.touching = now_touching;

        if !began.is_empty() {
            log::trace!("{} contact(s) began", began.len());
        }
        for contact in &began {
            listener.contact_began(contact);
        }
    }
}
