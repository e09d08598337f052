//! Scene graph snapshot used by the simulation.
//!
//! The client walks the spawned glTF hierarchy once and copies names, local transforms
//! and mesh geometry into a [`SceneGraph`]. From then on the simulation owns the
//! hierarchy: it moves the player root, reparents carried items, and reports which nodes
//! changed so the renderer can mirror them.

use bevy::math::bounding::Aabb3d;
use bevy::math::{Affine3A, Vec3A};
use bevy::prelude::*;

/// Index of a node inside a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Vertex data of a mesh, in the owning node's local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    /// Triangle list indices. `None` means every three positions form a triangle.
    pub indices: Option<Vec<u32>>,
}

impl MeshGeometry {
    pub fn new(positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Self {
        Self { positions, indices }
    }

    /// Triangles in local space. Out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let count = match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        };
        (0..count).filter_map(move |tri| {
            let corner = |k: usize| -> Option<Vec3> {
                let i = match &self.indices {
                    Some(indices) => indices[tri * 3 + k] as usize,
                    None => tri * 3 + k,
                };
                self.positions.get(i).copied()
            };
            Some([corner(0)?, corner(1)?, corner(2)?])
        })
    }
}

/// A single node of the scene.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub local: Transform,
    pub mesh: Option<MeshGeometry>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, parent: Option<NodeId>, local: Transform) -> Self {
        Self {
            name: name.into(),
            parent,
            local,
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: MeshGeometry) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of scene nodes with parent/child links.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    dirty: Vec<bool>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Its parent (if any) must already exist.
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = node.parent.filter(|p| p.0 < self.nodes.len());
        if node.parent.is_some() && parent.is_none() {
            warn!("Scene node {:?} references a missing parent; attaching to world", node.name);
        }
        self.nodes.push(SceneNode { parent, ..node });
        self.dirty.push(true);
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes.get(id.0).map(|n| n.name.as_str()).unwrap_or("")
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn local(&self, id: NodeId) -> Transform {
        self.nodes.get(id.0).map(|n| n.local).unwrap_or_default()
    }

    /// Nodes in depth-first pre-order: roots in insertion order, then each subtree.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if node.parent.is_none() {
                self.push_subtree(NodeId(i), &mut out);
            }
        }
        out
    }

    /// `id` and everything below it, in pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if id.0 < self.nodes.len() {
            self.push_subtree(id, &mut out);
        }
        out
    }

    fn push_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
    }

    /// First node in pre-order whose name equals `name`, ignoring ASCII case.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.pre_order()
            .into_iter()
            .find(|id| self.nodes[id.0].name.eq_ignore_ascii_case(name))
    }

    pub fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.parent(node) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Node-to-world matrix.
    pub fn world_affine(&self, id: NodeId) -> Affine3A {
        let mut affine = Affine3A::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c.0)) {
            affine = node.local.compute_affine() * affine;
            current = node.parent;
        }
        affine
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_affine(id).translation.into()
    }

    pub fn set_local(&mut self, id: NodeId, local: Transform) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.local = local;
            self.dirty[id.0] = true;
        }
    }

    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            if node.local.translation != translation {
                node.local.translation = translation;
                self.dirty[id.0] = true;
            }
        }
    }

    /// Move `id` under `new_parent` (or into world space for `None`) keeping its world
    /// transform: `local = inverse(new_parent_world) * old_world`.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if id.0 >= self.nodes.len() {
            return;
        }
        if let Some(parent) = new_parent {
            if parent == id || parent.0 >= self.nodes.len() || self.is_ancestor(id, parent) {
                warn!(
                    "Refusing to reparent {:?} under {:?}: would break the hierarchy",
                    self.name(id),
                    self.name(parent)
                );
                return;
            }
        }

        let world = self.world_affine(id);
        let parent_world = new_parent
            .map(|p| self.world_affine(p))
            .unwrap_or(Affine3A::IDENTITY);
        let local = parent_world.inverse() * world;

        if let Some(old) = self.nodes[id.0].parent {
            self.nodes[old.0].children.retain(|c| *c != id);
        }
        if let Some(parent) = new_parent {
            self.nodes[parent.0].children.push(id);
        }

        let node = &mut self.nodes[id.0];
        node.parent = new_parent;
        node.local = Transform::from_matrix(Mat4::from(local));
        self.dirty[id.0] = true;
    }

    /// World-space bounds of every mesh in the subtree rooted at `id`.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb3d> {
        let mut min = Vec3A::splat(f32::INFINITY);
        let mut max = Vec3A::splat(f32::NEG_INFINITY);
        let mut any = false;

        for node_id in self.subtree(id) {
            let Some(mesh) = &self.nodes[node_id.0].mesh else { continue };
            let affine = self.world_affine(node_id);
            for p in &mesh.positions {
                let w = affine.transform_point3a(Vec3A::from(*p));
                min = min.min(w);
                max = max.max(w);
                any = true;
            }
        }

        any.then_some(Aabb3d { min, max })
    }

    /// World-space triangles of every mesh in the subtree rooted at `id`.
    pub fn world_triangles(&self, id: NodeId) -> Vec<[Vec3; 3]> {
        let mut out = Vec::new();
        for node_id in self.subtree(id) {
            let Some(mesh) = &self.nodes[node_id.0].mesh else { continue };
            let affine = self.world_affine(node_id);
            out.extend(mesh.triangles().map(|tri| tri.map(|p| affine.transform_point3(p))));
        }
        out
    }

    /// Nodes changed since the last call (including newly added ones).
    pub fn take_dirty(&mut self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for (i, flag) in self.dirty.iter_mut().enumerate() {
            if std::mem::take(flag) {
                out.push(NodeId(i));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn cube(half: f32) -> MeshGeometry {
        let mut positions = Vec::new();
        for x in [-half, half] {
            for y in [-half, half] {
                for z in [-half, half] {
                    positions.push(Vec3::new(x, y, z));
                }
            }
        }
        MeshGeometry::new(positions, None)
    }

    #[test]
    fn test_world_position_composes_parents() {
        let mut graph = SceneGraph::new();
        let root = graph.add(SceneNode::new(
            "root",
            None,
            Transform::from_xyz(1.0, 0.0, 0.0).with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
        ));
        let child = graph.add(SceneNode::new("child", Some(root), Transform::from_xyz(0.0, 0.0, 2.0)));

        // +Z rotated a quarter turn around Y points along +X
        let p = graph.world_position(child);
        assert!((p - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5, "got {p:?}");
    }

    #[test]
    fn test_reparent_preserves_world_transform() {
        let mut graph = SceneGraph::new();
        let a = graph.add(SceneNode::new(
            "a",
            None,
            Transform::from_xyz(2.0, 1.0, -3.0)
                .with_rotation(Quat::from_rotation_y(0.7))
                .with_scale(Vec3::splat(2.0)),
        ));
        let b = graph.add(SceneNode::new(
            "b",
            None,
            Transform::from_xyz(-1.0, 0.5, 4.0).with_rotation(Quat::from_rotation_y(-1.2)),
        ));
        let item = graph.add(SceneNode::new(
            "item",
            Some(a),
            Transform::from_xyz(0.5, 0.25, 0.0).with_rotation(Quat::from_rotation_x(0.3)),
        ));

        let before = graph.world_affine(item);
        graph.reparent(item, Some(b));
        let after = graph.world_affine(item);

        assert_eq!(graph.parent(item), Some(b));
        assert!(graph.get(a).unwrap().children().is_empty());
        assert_eq!(graph.get(b).unwrap().children(), &[item]);
        assert!(before.abs_diff_eq(after, 1e-4), "{before:?} vs {after:?}");

        graph.reparent(item, None);
        let in_world = graph.world_affine(item);
        assert!(before.abs_diff_eq(in_world, 1e-4));
        assert!((graph.local(item).translation - graph.world_position(item)).length() < 1e-5);
    }

    #[test]
    fn test_reparent_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let a = graph.add(SceneNode::new("a", None, Transform::IDENTITY));
        let b = graph.add(SceneNode::new("b", Some(a), Transform::IDENTITY));
        graph.reparent(a, Some(b));
        assert_eq!(graph.parent(a), None);
        assert_eq!(graph.parent(b), Some(a));
    }

    #[test]
    fn test_world_bounds_cover_subtree() {
        let mut graph = SceneGraph::new();
        let parent = graph.add(
            SceneNode::new("tree", None, Transform::from_xyz(10.0, 0.0, 0.0)).with_mesh(cube(0.5)),
        );
        graph.add(
            SceneNode::new("leaves", Some(parent), Transform::from_xyz(0.0, 2.0, 0.0))
                .with_mesh(cube(1.0)),
        );

        let bounds = graph.world_bounds(parent).expect("has meshes");
        assert!((Vec3::from(bounds.min) - Vec3::new(9.0, -0.5, -1.0)).length() < 1e-5);
        assert!((Vec3::from(bounds.max) - Vec3::new(11.0, 3.0, 1.0)).length() < 1e-5);

        let empty = graph.add(SceneNode::new("empty", None, Transform::IDENTITY));
        assert!(graph.world_bounds(empty).is_none());
    }

    #[test]
    fn test_find_by_name_prefers_pre_order() {
        let mut graph = SceneGraph::new();
        let root = graph.add(SceneNode::new("Scene", None, Transform::IDENTITY));
        let avatar = graph.add(SceneNode::new("Alquimista", Some(root), Transform::IDENTITY));
        graph.add(SceneNode::new("alquimista", Some(avatar), Transform::IDENTITY));
        assert_eq!(graph.find_by_name("ALQUIMISTA"), Some(avatar));
        assert_eq!(graph.find_by_name("missing"), None);
    }

    #[test]
    fn test_take_dirty_reports_changes_once() {
        let mut graph = SceneGraph::new();
        let a = graph.add(SceneNode::new("a", None, Transform::IDENTITY));
        let b = graph.add(SceneNode::new("b", None, Transform::IDENTITY));
        assert_eq!(graph.take_dirty(), vec![a, b]);
        assert!(graph.take_dirty().is_empty());

        graph.set_translation(b, Vec3::X);
        graph.set_translation(a, Vec3::ZERO);
        assert_eq!(graph.take_dirty(), vec![b]);
    }

    #[test]
    fn test_indexed_triangles_skip_bad_indices() {
        let mesh = MeshGeometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            Some(vec![0, 1, 2, 0, 2, 9]),
        );
        assert_eq!(mesh.triangles().count(), 1);
    }
}
