//! # Narrow-Phase Geometry
//!
//! Exact intersection tests and push descriptors for circle and rectangle
//! hitboxes. Rectangles are oriented; everything is done in the
//! rectangle's local frame or by separating-axis projection.
//!
//! Touching shapes do not intersect. A hard push moves a hitbox exactly to
//! contact, so re-testing the pair right after resolution reports no
//! collision.

use std::f32::consts::PI;

use thicket_shared::Point;

use crate::hitbox::{Hitbox, HitboxShape};

/// How one hitbox must move to stop overlapping another.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PushInfo {
    /// Direction to move the pushed hitbox, world-convention radians.
    pub direction: f32,
    /// Penetration depth along `direction`.
    pub amount_in: f32,
}

/// An oriented rectangle in world space.
#[derive(Clone, Copy, Debug)]
struct OrientedRect {
    center: Point,
    half_width: f32,
    half_height: f32,
    /// Unit vector of the local X axis.
    axis_x: Point,
    /// Unit vector of the local Y axis.
    axis_y: Point,
}

impl OrientedRect {
    fn new(center: Point, width: f32, height: f32, rotation: f32) -> Self {
        Self {
            center,
            half_width: width * 0.5,
            half_height: height * 0.5,
            axis_x: Point::new(1.0, 0.0).rotated(rotation),
            axis_y: Point::new(0.0, 1.0).rotated(rotation),
        }
    }

    fn from_hitbox(hitbox: &Hitbox) -> Option<Self> {
        match hitbox.shape() {
            HitboxShape::Rectangle { width, height, .. } => Some(Self::new(
                hitbox.position(),
                width,
                height,
                hitbox.rotation(),
            )),
            HitboxShape::Circle { .. } => None,
        }
    }

    /// World point expressed in the rectangle's frame.
    fn to_local(&self, point: Point) -> Point {
        let d = point - self.center;
        Point::new(d.dot(self.axis_x), d.dot(self.axis_y))
    }

    fn vertices(&self) -> [Point; 4] {
        let x = self.axis_x * self.half_width;
        let y = self.axis_y * self.half_height;
        [
            self.center - x - y,
            self.center + x - y,
            self.center + x + y,
            self.center - x + y,
        ]
    }

    /// `(min, max)` of the vertices projected onto `axis`.
    fn project(&self, axis: Point) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for vertex in self.vertices() {
            let p = vertex.dot(axis);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }
}

// ============================================================================
// INTERSECTION
// ============================================================================

/// True if two circles overlap.
#[inline]
#[must_use]
pub fn circles_intersect(a: Point, radius_a: f32, b: Point, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    (b - a).length_squared() < reach * reach
}

fn circle_rect_intersect(center: Point, radius: f32, rect: &OrientedRect) -> bool {
    let local = rect.to_local(center);
    let closest = Point::new(
        local.x.clamp(-rect.half_width, rect.half_width),
        local.y.clamp(-rect.half_height, rect.half_height),
    );
    (local - closest).length_squared() < radius * radius
}

/// Smallest overlap over the separating axes of both rectangles, with the
/// axis it occurs on. `None` if some axis separates them.
fn rect_min_overlap(a: &OrientedRect, b: &OrientedRect) -> Option<(f32, Point)> {
    let mut best: Option<(f32, Point)> = None;
    for axis in [a.axis_x, a.axis_y, b.axis_x, b.axis_y] {
        let (min_a, max_a) = a.project(axis);
        let (min_b, max_b) = b.project(axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return None;
        }
        if best.map_or(true, |(current, _)| overlap < current) {
            best = Some((overlap, axis));
        }
    }
    best
}

/// True if two hitboxes overlap geometrically.
///
/// Layer filtering is the caller's job.
#[must_use]
pub fn hitboxes_intersect(a: &Hitbox, b: &Hitbox) -> bool {
    match (a.shape(), b.shape()) {
        (HitboxShape::Circle { radius: ra }, HitboxShape::Circle { radius: rb }) => {
            circles_intersect(a.position(), ra, b.position(), rb)
        }
        (HitboxShape::Circle { radius }, HitboxShape::Rectangle { .. }) => {
            OrientedRect::from_hitbox(b)
                .is_some_and(|rect| circle_rect_intersect(a.position(), radius, &rect))
        }
        (HitboxShape::Rectangle { .. }, HitboxShape::Circle { radius }) => {
            OrientedRect::from_hitbox(a)
                .is_some_and(|rect| circle_rect_intersect(b.position(), radius, &rect))
        }
        (HitboxShape::Rectangle { .. }, HitboxShape::Rectangle { .. }) => {
            match (OrientedRect::from_hitbox(a), OrientedRect::from_hitbox(b)) {
                (Some(ra), Some(rb)) => rect_min_overlap(&ra, &rb).is_some(),
                _ => false,
            }
        }
    }
}

// ============================================================================
// PUSH INFO
// ============================================================================

/// Push that moves a circle out of a rectangle.
fn circle_out_of_rect(center: Point, radius: f32, rect: &OrientedRect) -> PushInfo {
    let local = rect.to_local(center);
    let closest = Point::new(
        local.x.clamp(-rect.half_width, rect.half_width),
        local.y.clamp(-rect.half_height, rect.half_height),
    );

    if local != closest {
        // Center outside: push along the closest-point normal
        let diff = local - closest;
        let normal = rect.axis_x * diff.x + rect.axis_y * diff.y;
        return PushInfo {
            direction: normal.angle(),
            amount_in: radius - diff.length(),
        };
    }

    // Center inside: leave through the nearest face
    let depth_x = rect.half_width - local.x.abs();
    let depth_y = rect.half_height - local.y.abs();
    let sign = |v: f32| if v < 0.0 { -1.0 } else { 1.0 };
    let (normal, depth) = if depth_x < depth_y {
        (rect.axis_x * sign(local.x), depth_x)
    } else {
        (rect.axis_y * sign(local.y), depth_y)
    };
    PushInfo {
        direction: normal.angle(),
        amount_in: depth + radius,
    }
}

/// Computes how `pushed` must move to stop overlapping `pushing`.
///
/// Meaningful only for intersecting hitboxes; for separated ones
/// `amount_in` is zero or negative.
#[must_use]
pub fn push_info(pushed: &Hitbox, pushing: &Hitbox) -> PushInfo {
    match (pushed.shape(), pushing.shape()) {
        (HitboxShape::Circle { radius: r1 }, HitboxShape::Circle { radius: r2 }) => {
            let distance = pushed.position().distance_to(pushing.position());
            PushInfo {
                direction: pushing.position().angle_to(pushed.position()),
                amount_in: r1 + r2 - distance,
            }
        }
        (HitboxShape::Circle { radius }, HitboxShape::Rectangle { .. }) => {
            match OrientedRect::from_hitbox(pushing) {
                Some(rect) => circle_out_of_rect(pushed.position(), radius, &rect),
                None => PushInfo::default(),
            }
        }
        (HitboxShape::Rectangle { .. }, HitboxShape::Circle { radius }) => {
            match OrientedRect::from_hitbox(pushed) {
                Some(rect) => {
                    let push = circle_out_of_rect(pushing.position(), radius, &rect);
                    PushInfo {
                        direction: push.direction + PI,
                        amount_in: push.amount_in,
                    }
                }
                None => PushInfo::default(),
            }
        }
        (HitboxShape::Rectangle { .. }, HitboxShape::Rectangle { .. }) => {
            match (OrientedRect::from_hitbox(pushed), OrientedRect::from_hitbox(pushing)) {
                (Some(a), Some(b)) => match rect_min_overlap(&a, &b) {
                    Some((overlap, axis)) => {
                        let away = if axis.dot(a.center - b.center) < 0.0 {
                            -axis
                        } else {
                            axis
                        };
                        PushInfo {
                            direction: away.angle(),
                            amount_in: overlap,
                        }
                    }
                    None => PushInfo::default(),
                },
                _ => PushInfo::default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hitbox::HitboxData;
    use std::f32::consts::FRAC_PI_2;

    fn circle(x: f32, y: f32, radius: f32) -> Hitbox {
        Hitbox::new(HitboxData::circle(0, Point::ZERO, radius), Point::new(x, y), 0.0)
    }

    fn rect(x: f32, y: f32, width: f32, height: f32, rotation: f32) -> Hitbox {
        Hitbox::new(
            HitboxData::rectangle(0, Point::ZERO, width, height, 0.0),
            Point::new(x, y),
            rotation,
        )
    }

    fn unit(push: PushInfo) -> Point {
        Point::from_vector_form(1.0, push.direction)
    }

    #[test]
    fn test_circle_circle() {
        let a = circle(0.0, 0.0, 10.0);
        let b = circle(15.0, 0.0, 10.0);
        let touching = circle(20.0, 0.0, 10.0);

        assert!(hitboxes_intersect(&a, &b));
        assert!(!hitboxes_intersect(&a, &touching));

        let push = push_info(&a, &b);
        assert!((push.amount_in - 5.0).abs() < 1e-5);
        assert!((unit(push).x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_outside_rect_edge() {
        let wall = rect(160.0, 96.0, 64.0, 64.0, 0.0);
        let ball = circle(121.0, 96.0, 8.0);
        assert!(hitboxes_intersect(&ball, &wall));

        let push = push_info(&ball, &wall);
        assert!((push.amount_in - 1.0).abs() < 1e-4);
        assert!((unit(push).x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_inside_rect() {
        let wall = rect(0.0, 0.0, 100.0, 20.0, 0.0);
        let ball = circle(10.0, 6.0, 2.0);

        // Nearest face is the top one, 4 units away
        let push = push_info(&ball, &wall);
        assert!((push.amount_in - 6.0).abs() < 1e-4);
        assert!((unit(push).y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rect_pushed_by_circle_is_flipped() {
        let wall = rect(160.0, 96.0, 64.0, 64.0, 0.0);
        let ball = circle(121.0, 96.0, 8.0);

        let push = push_info(&wall, &ball);
        assert!((push.amount_in - 1.0).abs() < 1e-4);
        assert!((unit(push).x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotated_rect_sat() {
        let a = rect(0.0, 0.0, 10.0, 10.0, 0.0);
        // A diamond whose corner pokes into a's right edge
        let diamond = rect(12.0, 0.0, 10.0, 10.0, FRAC_PI_2 * 0.5);
        assert!(hitboxes_intersect(&a, &diamond));

        let apart = rect(13.0, 0.0, 10.0, 10.0, FRAC_PI_2 * 0.5);
        assert!(!hitboxes_intersect(&a, &apart));
    }

    #[test]
    fn test_rect_rect_push_points_away() {
        let a = rect(0.0, 0.0, 10.0, 10.0, 0.0);
        let b = rect(8.0, 1.0, 10.0, 10.0, 0.0);

        let push = push_info(&a, &b);
        assert!((push.amount_in - 2.0).abs() < 1e-4);
        assert!((unit(push).x + 1.0).abs() < 1e-5);
    }
}
