//! Walkable ground surface for vertical probes.
//!
//! Ground triangles are bucketed by their XZ footprint into a spatial hash, so a
//! downward probe only tests the handful of triangles under the player instead of the
//! whole mesh.

use bevy::prelude::*;
use std::collections::HashMap;

/// Size of each spatial grid cell in world units.
pub const GROUND_CELL_SIZE: f32 = 4.0;

/// Tolerance for points lying exactly on a triangle edge.
const EDGE_EPSILON: f32 = 1e-5;

#[derive(Clone, Copy, Debug)]
struct GroundTriangle {
    a: Vec3,
    b: Vec3,
    c: Vec3,
}

impl GroundTriangle {
    /// Height of the triangle plane under `p` (XZ), if `p` is inside the projected triangle.
    fn height_at(&self, p: Vec2) -> Option<f32> {
        let a = self.a.xz();
        let v0 = self.b.xz() - a;
        let v1 = self.c.xz() - a;
        let v2 = p - a;

        let den = v0.x * v1.y - v1.x * v0.y;
        // Vertical triangles (walls) have no walkable area
        if den.abs() < 1e-8 {
            return None;
        }

        let v = (v2.x * v1.y - v1.x * v2.y) / den;
        let w = (v0.x * v2.y - v2.x * v0.y) / den;
        let u = 1.0 - v - w;
        if u < -EDGE_EPSILON || v < -EDGE_EPSILON || w < -EDGE_EPSILON {
            return None;
        }

        Some(u * self.a.y + v * self.b.y + w * self.c.y)
    }

    fn min_xz(&self) -> Vec2 {
        self.a.xz().min(self.b.xz()).min(self.c.xz())
    }

    fn max_xz(&self) -> Vec2 {
        self.a.xz().max(self.b.xz()).max(self.c.xz())
    }
}

/// World-space ground triangles with a spatial hash over XZ.
#[derive(Clone, Debug, Default)]
pub struct GroundMesh {
    /// Map from grid cell (x, z) to triangles overlapping that cell.
    cells: HashMap<(i32, i32), Vec<usize>>,
    triangles: Vec<GroundTriangle>,
}

impl GroundMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triangles(triangles: impl IntoIterator<Item = [Vec3; 3]>) -> Self {
        let mut mesh = Self::new();
        for tri in triangles {
            mesh.insert(tri);
        }
        mesh
    }

    /// Convert world position to grid cell coordinates.
    #[inline]
    fn world_to_cell(pos: Vec2) -> (i32, i32) {
        (
            (pos.x / GROUND_CELL_SIZE).floor() as i32,
            (pos.y / GROUND_CELL_SIZE).floor() as i32,
        )
    }

    pub fn insert(&mut self, [a, b, c]: [Vec3; 3]) {
        let tri = GroundTriangle { a, b, c };
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            return;
        }

        let min_cell = Self::world_to_cell(tri.min_xz());
        let max_cell = Self::world_to_cell(tri.max_xz());

        let idx = self.triangles.len();
        self.triangles.push(tri);

        for cx in min_cell.0..=max_cell.0 {
            for cz in min_cell.1..=max_cell.1 {
                self.cells.entry((cx, cz)).or_default().push(idx);
            }
        }
    }

    /// Cast a ray straight down from `origin` and return the height of the first surface
    /// it hits (the highest surface at or below `origin.y`).
    pub fn probe_down(&self, origin: Vec3) -> Option<f32> {
        let p = origin.xz();
        let indices = self.cells.get(&Self::world_to_cell(p))?;

        indices
            .iter()
            .filter_map(|&idx| self.triangles[idx].height_at(p))
            .filter(|&h| h <= origin.y)
            .fold(None, |best: Option<f32>, h| Some(best.map_or(h, |b| b.max(h))))
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(half: f32, y: f32) -> [[Vec3; 3]; 2] {
        let a = Vec3::new(-half, y, -half);
        let b = Vec3::new(half, y, -half);
        let c = Vec3::new(half, y, half);
        let d = Vec3::new(-half, y, half);
        [[a, b, c], [a, c, d]]
    }

    #[test]
    fn test_flat_ground_probe() {
        let ground = GroundMesh::from_triangles(quad(20.0, 0.5));
        assert_eq!(ground.probe_down(Vec3::new(3.0, 2.0, -7.0)), Some(0.5));
        // Ray starts below the surface: nothing underneath
        assert_eq!(ground.probe_down(Vec3::new(3.0, 0.0, -7.0)), None);
        // Outside the mesh
        assert_eq!(ground.probe_down(Vec3::new(30.0, 2.0, 0.0)), None);
    }

    #[test]
    fn test_slope_interpolates_height() {
        // Ramp rising 1 unit per unit along +X
        let ground = GroundMesh::from_triangles([[
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(5.0, 5.0, -5.0),
            Vec3::new(0.0, 0.0, 5.0),
        ]]);
        let h = ground.probe_down(Vec3::new(1.0, 10.0, -4.0)).expect("hit");
        assert!((h - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_probe_returns_first_surface_below_origin() {
        let mut tris: Vec<[Vec3; 3]> = quad(10.0, 0.0).to_vec();
        tris.extend(quad(2.0, 3.0));
        let ground = GroundMesh::from_triangles(tris);

        assert_eq!(ground.probe_down(Vec3::new(0.0, 5.0, 0.0)), Some(3.0));
        assert_eq!(ground.probe_down(Vec3::new(0.0, 2.0, 0.0)), Some(0.0));
    }

    #[test]
    fn test_vertical_triangles_are_ignored() {
        let ground = GroundMesh::from_triangles([[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ]]);
        assert_eq!(ground.probe_down(Vec3::new(0.5, 10.0, 0.0)), None);
    }
}
