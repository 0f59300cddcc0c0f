//! Collision detection and response for balls against segment bars
//!
//! Segments are thin rotated rectangles, so the check works in the
//! rectangle's local frame: clamp the ball center to the box, then measure.

use glam::Vec2;

use crate::rotate;

/// Separation (world units) still counted as touching, so a ball resting
/// on a bar stays in contact after position correction pushes it clear
pub const CONTACT_SLOP: f32 = 0.01;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the rectangle (if hit)
    pub point: Vec2,
    /// Surface normal at collision (pointing toward ball center, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction); may be slightly negative
    /// inside the contact slop
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a rotated rectangle
///
/// `center` is the rectangle's center, `size` its full extents before
/// rotation, `rotation` its angle in radians.
pub fn ball_rect_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    center: Vec2,
    size: Vec2,
    rotation: f32,
) -> CollisionResult {
    let half = size * 0.5;
    let local = rotate(ball_pos - center, -rotation);
    let closest = local.clamp(-half, half);

    if closest == local {
        // Ball center inside the box: push out along the shallowest axis
        let depth_x = half.x - local.x.abs();
        let depth_y = half.y - local.y.abs();
        let (normal, surface) = if depth_x < depth_y {
            let sx = local.x.signum();
            (Vec2::new(sx, 0.0), Vec2::new(sx * half.x, local.y))
        } else {
            let sy = local.y.signum();
            (Vec2::new(0.0, sy), Vec2::new(local.x, sy * half.y))
        };
        return CollisionResult {
            hit: true,
            point: center + rotate(surface, rotation),
            normal: rotate(normal, rotation),
            penetration: ball_radius + depth_x.min(depth_y),
        };
    }

    let offset = local - closest;
    let dist = offset.length();
    if dist >= ball_radius + CONTACT_SLOP {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        point: center + rotate(closest, rotation),
        normal: rotate(offset / dist, rotation),
        penetration: ball_radius - dist,
    }
}

/// Combined bounce of two surfaces (the livelier one wins)
#[inline]
pub fn mix_restitution(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// Combined friction of two surfaces
#[inline]
pub fn mix_friction(a: f32, b: f32) -> f32 {
    (a * b).max(0.0).sqrt()
}

/// Velocity after hitting a static surface
///
/// The normal component is reflected and scaled by `restitution`; the
/// tangential component loses at most `friction` times the normal impulse.
/// Separating velocities are returned unchanged.
pub fn resolve_velocity(velocity: Vec2, normal: Vec2, restitution: f32, friction: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }

    let normal_vel = normal * vn;
    let tangent_vel = velocity - normal_vel;

    let normal_impulse = -(1.0 + restitution) * vn;
    let tangent_speed = tangent_vel.length();
    let tangent_after = if tangent_speed > 0.0 {
        let slowed = (tangent_speed - friction * normal_impulse).max(0.0);
        tangent_vel * (slowed / tangent_speed)
    } else {
        Vec2::ZERO
    };

    tangent_after - normal_vel * restitution
}
