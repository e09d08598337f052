//! Collectibles, obstacles and the other scene bindings
//!
//! The glTF scene only carries names. Right after load we walk it once, classify nodes by
//! name and produce typed handles; gameplay never looks nodes up by name again.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SceneNames;
use crate::scene::{NodeId, SceneGraph};
use crate::spatial::Footprint;

/// Kinds of collectible ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Crystal,
    Mushroom,
}

impl CollectibleKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            CollectibleKind::Crystal => "crystal",
            CollectibleKind::Mushroom => "mushroom",
        }
    }
}

/// A pickable scene object. Never removed, only flagged.
#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub id: usize,
    pub kind: CollectibleKind,
    pub node: NodeId,
    pub taken: bool,
    pub deposited: bool,
}

impl Collectible {
    /// Still lying around in the world.
    pub fn is_available(&self) -> bool {
        !self.taken && !self.deposited
    }
}

/// A static blocker with its precomputed footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub node: NodeId,
    pub footprint: Footprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Collectible(CollectibleKind),
    Obstacle,
}

fn classify_name(name: &str, names: &SceneNames) -> Option<Category> {
    let n = name.to_lowercase();
    if n.is_empty() {
        return None;
    }
    if !names.crystal_prefix.is_empty() && n.starts_with(&names.crystal_prefix.to_lowercase()) {
        return Some(Category::Collectible(CollectibleKind::Crystal));
    }
    if !names.mushroom_prefix.is_empty() && n.starts_with(&names.mushroom_prefix.to_lowercase()) {
        return Some(Category::Collectible(CollectibleKind::Mushroom));
    }
    let is_obstacle = names
        .obstacle_prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && n.starts_with(&prefix.to_lowercase()))
        || names.obstacle_names.iter().any(|exact| exact.eq_ignore_ascii_case(&n));
    is_obstacle.then_some(Category::Obstacle)
}

/// Collectibles and obstacles found in the scene. Read-only after construction except
/// for the collectible flags, which only the interaction controller touches.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    collectibles: Vec<Collectible>,
    obstacles: Vec<Obstacle>,
}

impl Registry {
    /// Classify every named node.
    ///
    /// A node nested under a node already registered in the same category is skipped:
    /// mesh primitives often repeat their parent's name.
    pub fn classify(graph: &SceneGraph, names: &SceneNames, footprint_margin: f32) -> Self {
        let mut registry = Registry::default();
        let mut inherited: Vec<Option<Category>> = vec![None; graph.len()];

        for id in graph.pre_order() {
            let from_parent = graph.parent(id).and_then(|p| inherited[p.0]);
            inherited[id.0] = from_parent;

            let Some(category) = classify_name(graph.name(id), names) else { continue };
            if from_parent == Some(category) {
                continue;
            }

            match category {
                Category::Collectible(kind) => {
                    registry.collectibles.push(Collectible {
                        id: registry.collectibles.len(),
                        kind,
                        node: id,
                        taken: false,
                        deposited: false,
                    });
                }
                Category::Obstacle => {
                    let Some(bounds) = graph.world_bounds(id) else {
                        warn!("Obstacle {:?} has no geometry; it will not block movement", graph.name(id));
                        continue;
                    };
                    registry.obstacles.push(Obstacle {
                        node: id,
                        footprint: Footprint::from_bounds(&bounds, footprint_margin),
                    });
                }
            }
            inherited[id.0] = Some(category);
        }

        registry
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn collectible(&self, id: usize) -> Option<&Collectible> {
        self.collectibles.get(id)
    }

    pub(crate) fn collectible_mut(&mut self, id: usize) -> Option<&mut Collectible> {
        self.collectibles.get_mut(id)
    }
}

/// Scene binding failures that make gameplay impossible.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("required scene node \"{name}\" (player avatar) not found among {node_count} nodes")]
    MissingAvatar { name: String, node_count: usize },
}

/// Typed handles produced by the post-load binding step.
#[derive(Debug, Clone)]
pub struct SceneBindings {
    pub ground: Option<NodeId>,
    pub deposit_target: Option<NodeId>,
    pub avatar: NodeId,
    pub registry: Registry,
}

impl SceneBindings {
    pub fn bind(graph: &SceneGraph, names: &SceneNames, footprint_margin: f32) -> Result<Self, BindingError> {
        let avatar = graph
            .find_by_name(&names.avatar)
            .ok_or_else(|| BindingError::MissingAvatar {
                name: names.avatar.clone(),
                node_count: graph.len(),
            })?;

        let ground = graph.find_by_name(&names.ground);
        if ground.is_none() {
            warn!("Ground node {:?} not found; gravity and ground snapping are disabled", names.ground);
        }
        let deposit_target = graph.find_by_name(&names.deposit_target);
        if deposit_target.is_none() {
            warn!("Deposit target {:?} not found; items cannot be dropped", names.deposit_target);
        }

        let registry = Registry::classify(graph, names, footprint_margin);
        info!(
            "Scene bound: {} collectibles, {} obstacles",
            registry.collectibles().len(),
            registry.obstacles().len()
        );

        Ok(Self {
            ground,
            deposit_target,
            avatar,
            registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshGeometry, SceneNode};

    fn unit_box() -> MeshGeometry {
        MeshGeometry::new(vec![Vec3::splat(-0.5), Vec3::splat(0.5)], None)
    }

    fn sample_graph() -> SceneGraph {
        let mut graph = SceneGraph::new();
        let root = graph.add(SceneNode::new("Scene", None, Transform::IDENTITY));
        graph.add(SceneNode::new("alquimista", Some(root), Transform::IDENTITY));
        graph.add(SceneNode::new("Piso", Some(root), Transform::IDENTITY));
        let crystal = graph.add(SceneNode::new("Cristal_01", Some(root), Transform::from_xyz(2.0, 0.0, 0.0)));
        graph.add(SceneNode::new("cristal_01.0", Some(crystal), Transform::IDENTITY).with_mesh(unit_box()));
        graph.add(SceneNode::new("seta.002", Some(root), Transform::from_xyz(-2.0, 0.0, 0.0)));
        graph.add(
            SceneNode::new("Arbol_grande", Some(root), Transform::from_xyz(5.0, 0.0, 5.0)).with_mesh(unit_box()),
        );
        graph.add(SceneNode::new("caldero", Some(root), Transform::from_xyz(0.0, 0.0, 4.0)).with_mesh(unit_box()));
        graph.add(SceneNode::new("calderon", Some(root), Transform::IDENTITY).with_mesh(unit_box()));
        graph.add(SceneNode::new("arbusto", Some(root), Transform::IDENTITY));
        graph
    }

    #[test]
    fn test_classify_by_prefix_and_exact_name() {
        let graph = sample_graph();
        let registry = Registry::classify(&graph, &SceneNames::default(), 0.05);

        let kinds: Vec<_> = registry.collectibles().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![CollectibleKind::Crystal, CollectibleKind::Mushroom]);
        assert_eq!(registry.collectibles()[0].id, 0);
        assert_eq!(registry.collectibles()[1].id, 1);
        assert!(registry.collectibles().iter().all(Collectible::is_available));

        let obstacle_names: Vec<_> = registry.obstacles().iter().map(|o| graph.name(o.node)).collect();
        assert_eq!(obstacle_names, vec!["Arbol_grande", "caldero"]);
    }

    #[test]
    fn test_obstacle_footprint_is_world_space_and_shrunk() {
        let graph = sample_graph();
        let registry = Registry::classify(&graph, &SceneNames::default(), 0.05);
        let tree = &registry.obstacles()[0];
        assert!((tree.footprint.min - Vec2::new(4.55, 4.55)).length() < 1e-5);
        assert!((tree.footprint.max - Vec2::new(5.45, 5.45)).length() < 1e-5);
    }

    #[test]
    fn test_bind_resolves_required_and_optional_nodes() {
        let graph = sample_graph();
        let bindings = SceneBindings::bind(&graph, &SceneNames::default(), 0.05).expect("avatar present");
        assert_eq!(graph.name(bindings.avatar), "alquimista");
        assert_eq!(bindings.ground.map(|g| graph.name(g)), Some("Piso"));
        assert_eq!(bindings.deposit_target.map(|g| graph.name(g)), Some("caldero"));
    }

    #[test]
    fn test_bind_without_avatar_fails() {
        let mut graph = SceneGraph::new();
        graph.add(SceneNode::new("piso", None, Transform::IDENTITY));
        let err = SceneBindings::bind(&graph, &SceneNames::default(), 0.05).unwrap_err();
        match err {
            BindingError::MissingAvatar { name, node_count } => {
                assert_eq!(name, "alquimista");
                assert_eq!(node_count, 1);
            }
        }
    }
}
