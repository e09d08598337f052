//! Pickup and drop interaction
//!
//! Runs only on discrete key presses. Unmet preconditions are not errors: they come back
//! as outcomes the caller turns into hints, and leave every piece of state untouched.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::InteractionTuning;
use crate::player::{PlayerRig, PlayerState};
use crate::registry::{CollectibleKind, Registry};
use crate::scene::{NodeId, SceneGraph};

/// Deposited collectibles per kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedCounts {
    pub crystals: u32,
    pub mushrooms: u32,
}

impl CollectedCounts {
    pub fn record(&mut self, kind: CollectibleKind) {
        match kind {
            CollectibleKind::Crystal => self.crystals += 1,
            CollectibleKind::Mushroom => self.mushrooms += 1,
        }
    }

    pub fn get(&self, kind: CollectibleKind) -> u32 {
        match kind {
            CollectibleKind::Crystal => self.crystals,
            CollectibleKind::Mushroom => self.mushrooms,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PickupOutcome {
    PickedUp { id: usize, kind: CollectibleKind },
    AlreadyCarrying { kind: CollectibleKind },
    NothingNearby,
}

impl PickupOutcome {
    pub fn hint(&self) -> String {
        match self {
            PickupOutcome::PickedUp { kind, .. } => format!("Picked up a {}", kind.display_name()),
            PickupOutcome::AlreadyCarrying { kind } => {
                format!("Your hands are full: drop the {} first", kind.display_name())
            }
            PickupOutcome::NothingNearby => "Nothing nearby to pick up".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DropOutcome {
    Deposited {
        id: usize,
        kind: CollectibleKind,
        position: Vec3,
    },
    NotCarrying,
    NoTarget,
    TooFar { distance: f32 },
}

impl DropOutcome {
    pub fn hint(&self) -> String {
        match self {
            DropOutcome::Deposited { kind, .. } => format!("Dropped a {} into the cauldron", kind.display_name()),
            DropOutcome::NotCarrying => "You are not carrying anything".to_string(),
            DropOutcome::NoTarget => "There is nowhere to drop it".to_string(),
            DropOutcome::TooFar { distance } => {
                format!("Get closer to the cauldron ({distance:.1} m away)")
            }
        }
    }
}

/// Nearest available collectible within `max_distance` of `from`.
///
/// Only a strictly smaller distance replaces the current best, so the first one found
/// wins exact ties.
pub fn nearest_collectible(registry: &Registry, graph: &SceneGraph, from: Vec3, max_distance: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for collectible in registry.collectibles().iter().filter(|c| c.is_available()) {
        let distance = graph.world_position(collectible.node).distance(from);
        if distance > max_distance {
            continue;
        }
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((collectible.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

pub fn try_pickup(
    player: &mut PlayerState,
    registry: &mut Registry,
    graph: &mut SceneGraph,
    rig: &PlayerRig,
    tuning: &InteractionTuning,
) -> PickupOutcome {
    if let Some(carried) = player.carrying.and_then(|id| registry.collectible(id)) {
        return PickupOutcome::AlreadyCarrying { kind: carried.kind };
    }

    let from = graph.world_position(rig.root);
    let Some(id) = nearest_collectible(registry, graph, from, tuning.pickup_radius) else {
        return PickupOutcome::NothingNearby;
    };
    let Some(collectible) = registry.collectible_mut(id) else {
        return PickupOutcome::NothingNearby;
    };

    graph.reparent(collectible.node, Some(rig.hand));
    collectible.taken = true;
    player.carrying = Some(id);

    info!("Picked up {} #{}", collectible.kind.display_name(), id);
    PickupOutcome::PickedUp {
        id,
        kind: collectible.kind,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn try_drop(
    player: &mut PlayerState,
    registry: &mut Registry,
    graph: &mut SceneGraph,
    rig: &PlayerRig,
    target: Option<NodeId>,
    counts: &mut CollectedCounts,
    tuning: &InteractionTuning,
    rng: &mut impl Rng,
) -> DropOutcome {
    let Some(id) = player.carrying else {
        return DropOutcome::NotCarrying;
    };
    let Some(target) = target else {
        return DropOutcome::NoTarget;
    };

    let target_pos = graph.world_position(target);
    let distance = graph.world_position(rig.root).distance(target_pos);
    if distance > tuning.drop_radius {
        return DropOutcome::TooFar { distance };
    }

    let Some(collectible) = registry.collectible_mut(id) else {
        warn!("Carried collectible #{} is not registered; clearing", id);
        player.carrying = None;
        return DropOutcome::NotCarrying;
    };

    let top = graph
        .world_bounds(target)
        .map(|bounds| bounds.max.y)
        .unwrap_or(target_pos.y);
    let half = tuning.drop_jitter * 0.5;
    let (jx, jz) = if half > 0.0 {
        (rng.gen_range(-half..half), rng.gen_range(-half..half))
    } else {
        (0.0, 0.0)
    };
    let position = Vec3::new(target_pos.x + jx, top + tuning.drop_lift, target_pos.z + jz);

    graph.reparent(collectible.node, None);
    graph.set_translation(collectible.node, position);
    collectible.deposited = true;
    counts.record(collectible.kind);
    player.carrying = None;

    info!(
        "Deposited {} #{} at ({:.2}, {:.2}, {:.2})",
        collectible.kind.display_name(),
        id,
        position.x,
        position.y,
        position.z
    );
    DropOutcome::Deposited {
        id,
        kind: collectible.kind,
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneNames;
    use crate::scene::{MeshGeometry, SceneNode};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Fixture {
        graph: SceneGraph,
        registry: Registry,
        player: PlayerState,
        rig: PlayerRig,
        cauldron: NodeId,
        counts: CollectedCounts,
        tuning: InteractionTuning,
    }

    impl Fixture {
        /// Player at the origin, a crystal 1.0 away on +X, a mushroom at (-1.2, 0, 0) and
        /// a 1x1x1 cauldron centered at (0, 0.5, 2).
        fn new() -> Self {
            let mut graph = SceneGraph::new();
            let scene = graph.add(SceneNode::new("Scene", None, Transform::IDENTITY));
            graph.add(SceneNode::new("cristal_a", Some(scene), Transform::from_xyz(1.0, 0.0, 0.0)));
            graph.add(SceneNode::new("seta_a", Some(scene), Transform::from_xyz(-1.2, 0.0, 0.0)));
            let cauldron = graph.add(
                SceneNode::new("caldero", Some(scene), Transform::from_xyz(0.0, 0.5, 2.0))
                    .with_mesh(MeshGeometry::new(vec![Vec3::splat(-0.5), Vec3::splat(0.5)], None)),
            );
            let root = graph.add(SceneNode::new("PlayerRoot", None, Transform::IDENTITY));
            let avatar = graph.add(SceneNode::new("alquimista", Some(root), Transform::IDENTITY));
            let hand = graph.add(SceneNode::new("HandAnchor", Some(root), Transform::from_xyz(0.25, 1.4, 0.35)));

            let registry = Registry::classify(&graph, &SceneNames::default(), 0.05);
            Self {
                graph,
                registry,
                player: PlayerState::new(Vec3::ZERO, &Default::default()),
                rig: PlayerRig { root, avatar, hand },
                cauldron,
                counts: CollectedCounts::default(),
                tuning: InteractionTuning::default(),
            }
        }

        fn pickup(&mut self) -> PickupOutcome {
            try_pickup(&mut self.player, &mut self.registry, &mut self.graph, &self.rig, &self.tuning)
        }

        fn drop_with(&mut self, rng: &mut StdRng) -> DropOutcome {
            try_drop(
                &mut self.player,
                &mut self.registry,
                &mut self.graph,
                &self.rig,
                Some(self.cauldron),
                &mut self.counts,
                &self.tuning,
                rng,
            )
        }

        fn move_player(&mut self, position: Vec3) {
            self.player.position = position;
            self.graph.set_translation(self.rig.root, position);
        }
    }

    #[test]
    fn test_nearest_prefers_strictly_closer() {
        let f = Fixture::new();
        assert_eq!(nearest_collectible(&f.registry, &f.graph, Vec3::ZERO, 1.5), Some(0));
        assert_eq!(nearest_collectible(&f.registry, &f.graph, Vec3::new(-0.5, 0.0, 0.0), 1.5), Some(1));
        assert_eq!(nearest_collectible(&f.registry, &f.graph, Vec3::new(0.0, 0.0, 9.0), 1.5), None);
    }

    #[test]
    fn test_nearest_tie_goes_to_first_registered() {
        let mut graph = SceneGraph::new();
        let scene = graph.add(SceneNode::new("Scene", None, Transform::IDENTITY));
        graph.add(SceneNode::new("cristal_a", Some(scene), Transform::from_xyz(1.0, 0.0, 0.0)));
        graph.add(SceneNode::new("seta_a", Some(scene), Transform::from_xyz(-1.0, 0.0, 0.0)));
        let mut registry = Registry::classify(&graph, &SceneNames::default(), 0.05);

        assert_eq!(nearest_collectible(&registry, &graph, Vec3::ZERO, 1.5), Some(0));

        registry.collectible_mut(1).expect("mushroom").taken = true;
        assert_eq!(nearest_collectible(&registry, &graph, Vec3::ZERO, 1.5), Some(0));

        registry.collectible_mut(1).expect("mushroom").taken = false;
        registry.collectible_mut(0).expect("crystal").taken = true;
        assert_eq!(nearest_collectible(&registry, &graph, Vec3::ZERO, 1.5), Some(1));
    }

    #[test]
    fn test_pickup_attaches_to_hand_and_keeps_world_position() {
        let mut f = Fixture::new();
        let node = f.registry.collectibles()[0].node;
        let before = f.graph.world_position(node);

        assert_eq!(
            f.pickup(),
            PickupOutcome::PickedUp {
                id: 0,
                kind: CollectibleKind::Crystal
            }
        );
        assert_eq!(f.player.carrying, Some(0));
        assert_eq!(f.graph.parent(node), Some(f.rig.hand));
        assert!((f.graph.world_position(node) - before).length() < 1e-5);
        assert!(f.registry.collectibles()[0].taken);
        assert_eq!(f.counts.crystals, 0);
    }

    #[test]
    fn test_second_pickup_is_rejected() {
        let mut f = Fixture::new();
        f.pickup();
        let outcome = f.pickup();
        assert_eq!(
            outcome,
            PickupOutcome::AlreadyCarrying {
                kind: CollectibleKind::Crystal
            }
        );
        assert_eq!(f.player.carrying, Some(0));
        assert!(!f.registry.collectibles()[1].taken);
    }

    #[test]
    fn test_nothing_nearby() {
        let mut f = Fixture::new();
        f.move_player(Vec3::new(10.0, 0.0, 10.0));
        assert_eq!(f.pickup(), PickupOutcome::NothingNearby);
        assert_eq!(f.player.carrying, None);
    }

    #[test]
    fn test_drop_preconditions_leave_state_alone() {
        let mut f = Fixture::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(f.drop_with(&mut rng), DropOutcome::NotCarrying);

        f.pickup();
        f.move_player(Vec3::new(0.0, 0.0, -1.0));
        match f.drop_with(&mut rng) {
            DropOutcome::TooFar { distance } => assert!(distance > 2.2),
            other => panic!("expected TooFar, got {other:?}"),
        }
        assert_eq!(f.player.carrying, Some(0));
        assert!(!f.registry.collectibles()[0].deposited);
        assert_eq!(f.counts, CollectedCounts::default());

        let outcome = try_drop(
            &mut f.player,
            &mut f.registry,
            &mut f.graph,
            &f.rig,
            None,
            &mut f.counts,
            &f.tuning,
            &mut rng,
        );
        assert_eq!(outcome, DropOutcome::NoTarget);
        assert_eq!(f.player.carrying, Some(0));
    }

    #[test]
    fn test_round_trip_deposits_above_target() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut f = Fixture::new();
            f.pickup();
            f.move_player(Vec3::new(0.0, 0.0, 0.5));

            let DropOutcome::Deposited { id, kind, position } = f.drop_with(&mut rng) else {
                panic!("drop should succeed within range");
            };
            assert_eq!((id, kind), (0, CollectibleKind::Crystal));

            let node = f.registry.collectibles()[0].node;
            assert_eq!(f.graph.parent(node), None);
            let world = f.graph.world_position(node);
            assert!((world - position).length() < 1e-5);
            // Cauldron top is at y = 1.0
            assert!((world.y - 1.15).abs() < 1e-5);
            assert!(world.x.abs() <= 0.2 && (world.z - 2.0).abs() <= 0.2);

            let c = &f.registry.collectibles()[0];
            assert!(c.taken && c.deposited);
            assert_eq!(f.player.carrying, None);
            assert_eq!(f.counts, CollectedCounts { crystals: 1, mushrooms: 0 });

            // Deposited objects are never offered again
            f.move_player(position);
            assert_ne!(nearest_collectible(&f.registry, &f.graph, position, 1.5), Some(0));
        }
    }

    #[test]
    fn test_mushroom_increments_its_own_counter() {
        let mut f = Fixture::new();
        let mut rng = StdRng::seed_from_u64(1);
        f.move_player(Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(
            f.pickup(),
            PickupOutcome::PickedUp {
                id: 1,
                kind: CollectibleKind::Mushroom
            }
        );
        f.move_player(Vec3::new(0.0, 0.0, 1.0));
        assert!(matches!(f.drop_with(&mut rng), DropOutcome::Deposited { .. }));
        assert_eq!(f.counts, CollectedCounts { crystals: 0, mushrooms: 1 });
    }
}
