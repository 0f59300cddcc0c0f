//! Deterministic simulation module
//!
//! All interaction and physics logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body/segment ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod drag;
pub mod emitter;
pub mod segment;
pub mod state;
pub mod tick;
pub mod tone;
pub mod world;

pub use collision::{CollisionResult, ball_rect_collision};
pub use drag::{DragPhase, DragScene, DragSession, Draggable, PointerEvent};
pub use emitter::Emitter;
pub use segment::{Endpoint, EndpointId, LineSegment, SegmentGeometry, SegmentId, SegmentStore};
pub use state::{Scene, SceneObject, SimulationState};
pub use tick::{FixedStep, TickInput, TickReport, tick, tilt_to_gravity};
pub use tone::ToneMapper;
pub use world::{
    Body, BodyId, BodyKind, Collider, Contact, ContactListener, PhysicsWorld, Shape, category,
};
