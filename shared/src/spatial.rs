//! Obstacle footprints and point collision.
//!
//! Obstacles block a full vertical column: only X/Z matter. Footprints are computed once
//! when the scene is bound and never move.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

use crate::registry::Obstacle;

/// Direction used when the spawn point sits exactly on an obstacle's center.
const FALLBACK_PUSH: Vec2 = Vec2::X;

/// An axis-aligned footprint on the XZ plane (`Vec2::y` holds world Z).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub min: Vec2,
    pub max: Vec2,
}

impl Footprint {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// XZ projection of world bounds, shrunk on every side by `margin`.
    ///
    /// A margin larger than half the size leaves an inverted footprint that contains
    /// nothing, like an empty box.
    pub fn from_bounds(bounds: &Aabb3d, margin: f32) -> Self {
        let min = Vec3::from(bounds.min).xz() + Vec2::splat(margin);
        let max = Vec3::from(bounds.max).xz() - Vec2::splat(margin);
        Self { min, max }
    }

    /// Footprint grown by `radius` on X and Z.
    pub fn inflated(&self, radius: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(radius),
            max: self.max + Vec2::splat(radius),
        }
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Distance along `dir` (unit) from an inside `point` to the footprint edge.
    fn exit_distance(&self, point: Vec2, dir: Vec2) -> f32 {
        let axis = |p: f32, d: f32, lo: f32, hi: f32| -> f32 {
            if d > 0.0 {
                (hi - p) / d
            } else if d < 0.0 {
                (lo - p) / d
            } else {
                f32::INFINITY
            }
        };
        axis(point.x, dir.x, self.min.x, self.max.x)
            .min(axis(point.y, dir.y, self.min.y, self.max.y))
            .max(0.0)
    }
}

/// Would a player of `radius` standing at `point` overlap any obstacle?
pub fn point_blocked(point: Vec3, obstacles: &[Obstacle], radius: f32) -> bool {
    let p = point.xz();
    obstacles
        .iter()
        .any(|obstacle| obstacle.footprint.inflated(radius).contains(p))
}

/// Push a spawn point out of every obstacle footprint it starts inside.
///
/// The point moves along (footprint center -> point) until it clears the inflated
/// footprint, by at least `radius + clearance`. Pushes repeat while the point is still
/// blocked; obstacles too close together to separate fall back to a ring search for
/// the nearest free spot.
pub fn resolve_spawn_overlap(spawn: Vec3, obstacles: &[Obstacle], radius: f32, clearance: f32) -> Vec3 {
    let mut pos = spawn;

    for _ in 0..MAX_SPAWN_PASSES {
        if !point_blocked(pos, obstacles, radius) {
            return pos;
        }
        pos = push_out_once(pos, obstacles, radius, clearance);
    }
    if !point_blocked(pos, obstacles, radius) {
        return pos;
    }

    match nearest_free_point(spawn, obstacles, radius + clearance) {
        Some(free) => {
            debug!("Spawn pushes did not settle; using free spot ({:.2}, {:.2})", free.x, free.z);
            free
        }
        None => {
            warn!("No free spawn point near ({:.2}, {:.2}); player starts blocked", spawn.x, spawn.z);
            pos
        }
    }
}

/// Passes of per-obstacle pushes before falling back to the ring search
const MAX_SPAWN_PASSES: usize = 8;

const RING_STEP: f32 = 0.25;
const RING_DIRECTIONS: usize = 16;
const MAX_RINGS: usize = 400;

/// One push out of each obstacle the point is inside, in registry order.
fn push_out_once(mut pos: Vec3, obstacles: &[Obstacle], radius: f32, clearance: f32) -> Vec3 {
    for obstacle in obstacles {
        let inflated = obstacle.footprint.inflated(radius);
        let p = pos.xz();
        if !inflated.contains(p) {
            continue;
        }

        let dir = (p - obstacle.footprint.center()).try_normalize().unwrap_or(FALLBACK_PUSH);
        let push = inflated.exit_distance(p, dir).max(radius) + clearance;
        let moved = p + dir * push;

        debug!(
            "Spawn overlaps obstacle footprint {:?}; pushed {:.2} to ({:.2}, {:.2})",
            obstacle.footprint, push, moved.x, moved.y
        );
        pos.x = moved.x;
        pos.z = moved.y;
    }
    pos
}

/// Closest point on expanding rings around `center` that clears every footprint
/// inflated by `reach`.
fn nearest_free_point(center: Vec3, obstacles: &[Obstacle], reach: f32) -> Option<Vec3> {
    (1..=MAX_RINGS).find_map(|ring| {
        let distance = ring as f32 * RING_STEP;
        (0..RING_DIRECTIONS).find_map(|k| {
            let angle = k as f32 * std::f32::consts::TAU / RING_DIRECTIONS as f32;
            let candidate = center + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance;
            (!point_blocked(candidate, obstacles, reach)).then_some(candidate)
        })
    })
}
