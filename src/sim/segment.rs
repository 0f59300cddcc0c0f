//! User-drawn line segments and their endpoint handles
//!
//! Endpoints and segments live side by side in a [`SegmentStore`] and refer
//! to each other by id. Every segment owns exactly two endpoints and one
//! static body in the [`PhysicsWorld`]; whenever an endpoint moves, the
//! segment's geometry and collider are rebuilt before control returns.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{Body, BodyId, Collider, PhysicsWorld, category};
use crate::consts::*;
use crate::{midpoint, rotate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndpointId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

/// Placement derived from a segment's two endpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentGeometry {
    pub midpoint: Vec2,
    pub length: f32,
    /// Radians; from `atan2`, so vertical bars are fine
    pub rotation: f32,
}

impl SegmentGeometry {
    pub fn from_endpoints(p0: Vec2, p1: Vec2) -> Self {
        let run = p0.x - p1.x;
        let rise = p0.y - p1.y;
        let length = (run * run + rise * rise).sqrt();
        let rotation = rise.atan2(run);
        Self {
            midpoint: midpoint(p0, p1),
            length,
            rotation: if rotation.is_finite() { rotation } else { 0.0 },
        }
    }

    /// Bar extents: the full length by a fixed thickness
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.length, SEGMENT_THICKNESS)
    }

    /// Long enough to be bounced off
    pub fn is_collidable(&self) -> bool {
        self.length >= MIN_SEGMENT_LENGTH
    }

    /// The static collider this geometry calls for, if any
    pub fn collider(&self) -> Option<Collider> {
        if !self.is_collidable() {
            return None;
        }
        Some(
            Collider::rect(self.size())
                .with_restitution(SEGMENT_RESTITUTION)
                .with_friction(SEGMENT_FRICTION)
                .with_category(category::SEGMENT, category::ALL, category::BALL),
        )
    }

    /// Whether `p` lies on the bar (thickness included)
    pub fn contains_point(&self, p: Vec2) -> bool {
        let local = rotate(p - self.midpoint, -self.rotation);
        let half = self.size() * 0.5;
        local.x.abs() <= half.x && local.y.abs() <= half.y
    }
}

/// A draggable control point at one end of a segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub pos: Vec2,
    /// Owning segment (lookup only, never lifetime)
    pub segment: SegmentId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSegment {
    pub id: SegmentId,
    /// [start, end] as drawn
    pub endpoints: [EndpointId; 2],
    /// Static body carrying the collider
    pub body: BodyId,
    pub geometry: SegmentGeometry,
}

impl LineSegment {
    pub fn is_collidable(&self) -> bool {
        self.geometry.is_collidable()
    }
}

/// Arena of all segments and endpoints (both sorted by id)
#[derive(Debug, Clone, Default)]
pub struct SegmentStore {
    endpoints: Vec<Endpoint>,
    segments: Vec<LineSegment>,
    next_id: u32,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Create a segment from `start` to `end` with its pair of endpoints
    ///
    /// Returns the segment id and `[start, end]` endpoint ids.
    pub fn create(
        &mut self,
        world: &mut PhysicsWorld,
        start: Vec2,
        end: Vec2,
    ) -> (SegmentId, [EndpointId; 2]) {
        let segment_id = SegmentId(self.next_id());
        let start_id = EndpointId(self.next_id());
        let end_id = EndpointId(self.next_id());

        let geometry = SegmentGeometry::from_endpoints(start, end);
        let body = world.add_body(Body::fixed(geometry.midpoint, geometry.rotation));

        self.endpoints.push(Endpoint {
            id: start_id,
            pos: start,
            segment: segment_id,
        });
        self.endpoints.push(Endpoint {
            id: end_id,
            pos: end,
            segment: segment_id,
        });
        self.segments.push(LineSegment {
            id: segment_id,
            endpoints: [start_id, end_id],
            body,
            geometry,
        });
        self.sync(world, segment_id);

        log::debug!(
            "segment {} created: length {:.1}, collidable {}",
            segment_id.0,
            geometry.length,
            geometry.is_collidable()
        );
        (segment_id, [start_id, end_id])
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.endpoints[i])
    }

    pub fn segment(&self, id: SegmentId) -> Option<&LineSegment> {
        self.segments
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &self.segments[i])
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The other endpoint of the same segment
    pub fn partner(&self, id: EndpointId) -> Option<EndpointId> {
        let segment = self.segment(self.endpoint(id)?.segment)?;
        segment.endpoints.iter().copied().find(|&e| e != id)
    }

    /// Segment whose static body is `body`
    pub fn segment_for_body(&self, body: BodyId) -> Option<&LineSegment> {
        self.segments.iter().find(|s| s.body == body)
    }

    /// Translate an endpoint and rebuild its segment
    pub fn move_endpoint_by(&mut self, world: &mut PhysicsWorld, id: EndpointId, delta: Vec2) -> bool {
        let Some(pos) = self.endpoint(id).map(|e| e.pos) else {
            return false;
        };
        self.set_endpoint_position(world, id, pos + delta)
    }

    /// Place an endpoint and rebuild its segment
    pub fn set_endpoint_position(&mut self, world: &mut PhysicsWorld, id: EndpointId, pos: Vec2) -> bool {
        let Ok(idx) = self.endpoints.binary_search_by_key(&id, |e| e.id) else {
            return false;
        };
        self.endpoints[idx].pos = pos;
        let segment = self.endpoints[idx].segment;
        self.sync(world, segment)
    }

    /// Recompute geometry from the endpoints and push it into the world
    ///
    /// Short segments lose their collider but keep their geometry.
    pub fn sync(&mut self, world: &mut PhysicsWorld, id: SegmentId) -> bool {
        let Ok(idx) = self.segments.binary_search_by_key(&id, |s| s.id) else {
            return false;
        };
        let [a, b] = self.segments[idx].endpoints;
        let (Some(p0), Some(p1)) = (
            self.endpoint(a).map(|e| e.pos),
            self.endpoint(b).map(|e| e.pos),
        ) else {
            return false;
        };

        let geometry = SegmentGeometry::from_endpoints(p0, p1);
        let segment = &mut self.segments[idx];
        segment.geometry = geometry;

        world.set_transform(segment.body, geometry.midpoint, geometry.rotation);
        world.set_collider(segment.body, geometry.collider());
        true
    }

    /// Topmost endpoint whose handle covers `pos`
    pub fn endpoint_at(&self, pos: Vec2) -> Option<EndpointId> {
        self.endpoints
            .iter()
            .rev()
            .find(|e| e.pos.distance(pos) <= ENDPOINT_RADIUS)
            .map(|e| e.id)
    }

    /// Topmost segment bar under `pos`
    pub fn segment_at(&self, pos: Vec2) -> Option<SegmentId> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.geometry.contains_point(pos))
            .map(|s| s.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::Shape;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_horizontal_segment_geometry() {
        let g = SegmentGeometry::from_endpoints(Vec2::ZERO, Vec2::new(300.0, 0.0));
        assert_eq!(g.length, 300.0);
        assert_eq!(g.midpoint, Vec2::new(150.0, 0.0));
        assert_eq!(g.size(), Vec2::new(300.0, SEGMENT_THICKNESS));
        assert!(g.is_collidable());
    }

    #[test]
    fn test_vertical_segment_has_finite_rotation() {
        let g = SegmentGeometry::from_endpoints(Vec2::ZERO, Vec2::new(0.0, 40.0));
        assert!((g.rotation.abs() - FRAC_PI_2).abs() < 1e-6);
        assert!(g.contains_point(Vec2::new(0.0, 20.0)));
        assert!(!g.contains_point(Vec2::new(5.0, 20.0)));
    }

    #[test]
    fn test_degenerate_segment() {
        let g = SegmentGeometry::from_endpoints(Vec2::ONE, Vec2::ONE);
        assert_eq!(g.length, 0.0);
        assert!(g.rotation.is_finite());
        assert!(g.collider().is_none());
    }

    #[test]
    fn test_short_segment_has_no_collider() {
        let mut world = PhysicsWorld::default();
        let mut store = SegmentStore::new();
        let (id, _) = store.create(&mut world, Vec2::ZERO, Vec2::new(0.0, 5.0));
        let segment = store.segment(id).unwrap();
        assert_eq!(segment.geometry.length, 5.0);
        assert!(world.body(segment.body).unwrap().collider.is_none());
    }

    #[test]
    fn test_collider_follows_endpoint_moves() {
        let mut world = PhysicsWorld::default();
        let mut store = SegmentStore::new();
        let (id, [start, end]) = store.create(&mut world, Vec2::ZERO, Vec2::new(5.0, 0.0));
        let body = store.segment(id).unwrap().body;
        assert!(world.body(body).unwrap().collider.is_none());

        // Stretch past the minimum: collider appears with the new size
        assert!(store.move_endpoint_by(&mut world, end, Vec2::new(95.0, 0.0)));
        let collider = world.body(body).unwrap().collider.unwrap();
        assert_eq!(collider.shape, Shape::Rect { size: Vec2::new(100.0, SEGMENT_THICKNESS) });
        assert_eq!(collider.restitution, SEGMENT_RESTITUTION);
        assert_eq!(world.body(body).unwrap().pos, Vec2::new(50.0, 0.0));

        // Squash it again: collider goes away
        assert!(store.set_endpoint_position(&mut world, start, Vec2::new(95.0, 0.0)));
        assert!(world.body(body).unwrap().collider.is_none());
        assert_eq!(store.segment(id).unwrap().geometry.length, 5.0);
    }

    #[test]
    fn test_partner_and_lookup() {
        let mut world = PhysicsWorld::default();
        let mut store = SegmentStore::new();
        let (id, [start, end]) = store.create(&mut world, Vec2::ZERO, Vec2::new(50.0, 0.0));
        assert_eq!(store.partner(start), Some(end));
        assert_eq!(store.partner(end), Some(start));
        assert_eq!(store.endpoint(end).unwrap().segment, id);
        let body = store.segment(id).unwrap().body;
        assert_eq!(store.segment_for_body(body).unwrap().id, id);
        assert_eq!(store.endpoint_at(Vec2::new(48.0, 3.0)), Some(end));
        assert_eq!(store.segment_at(Vec2::new(25.0, 0.5)), Some(id));
        assert_eq!(store.segment_at(Vec2::new(25.0, 8.0)), None);
    }

    #[test]
    fn test_stale_ids_are_ignored() {
        let mut world = PhysicsWorld::default();
        let mut store = SegmentStore::new();
        assert!(!store.move_endpoint_by(&mut world, EndpointId(99), Vec2::ONE));
        assert!(!store.sync(&mut world, SegmentId(99)));
        assert!(store.partner(EndpointId(99)).is_none());
    }

    proptest! {
        #[test]
        fn prop_length_is_translation_invariant(
            x0 in -500.0f32..500.0, y0 in -500.0f32..500.0,
            x1 in -500.0f32..500.0, y1 in -500.0f32..500.0,
            dx in -500.0f32..500.0, dy in -500.0f32..500.0,
        ) {
            let p0 = Vec2::new(x0, y0);
            let p1 = Vec2::new(x1, y1);
            let d = Vec2::new(dx, dy);
            let a = SegmentGeometry::from_endpoints(p0, p1);
            let b = SegmentGeometry::from_endpoints(p0 + d, p1 + d);
            prop_assert!((a.length - b.length).abs() <= 1e-3 * a.length.max(1.0));
        }

        #[test]
        fn prop_collider_present_iff_long_enough(
            len in 0.0f32..40.0,
            angle in -3.2f32..3.2,
        ) {
            let p0 = Vec2::new(12.0, -7.0);
            let p1 = p0 + Vec2::from_angle(angle) * len;
            let g = SegmentGeometry::from_endpoints(p0, p1);
            match g.collider() {
                Some(c) => {
                    prop_assert!(g.length >= MIN_SEGMENT_LENGTH);
                    prop_assert_eq!(c.size(), Some(Vec2::new(g.length, SEGMENT_THICKNESS)));
                }
                None => prop_assert!(g.length < MIN_SEGMENT_LENGTH),
            }
        }
    }
}
