//! Mirror simulation changes back onto the spawned scene.

use bevy::prelude::*;
use cauldron_shared::GameState;

use super::world::{LevelRoot, NodeEntities};

/// Copy the local transform of every node the simulation touched, and move entities
/// whose parent changed (picked-up and dropped collectibles).
pub fn sync_scene_nodes(
    mut commands: Commands,
    mut state: ResMut<GameState>,
    mut nodes: ResMut<NodeEntities>,
    roots: Query<Entity, With<LevelRoot>>,
    mut transforms: Query<&mut Transform>,
) {
    let dirty = state.take_dirty();
    if dirty.is_empty() {
        return;
    }
    let Ok(root) = roots.single() else { return };
    let graph = state.graph();

    for id in dirty {
        let Some(entity) = nodes.entity(id) else { continue };
        let local = graph.local(id);

        let parent = graph.parent(id);
        if nodes.set_parent(id, parent) {
            let parent_entity = parent.and_then(|p| nodes.entity(p)).unwrap_or(root);
            commands.entity(entity).insert((ChildOf(parent_entity), local));
            continue;
        }

        if let Ok(mut transform) = transforms.get_mut(entity) {
            *transform = local;
        }
    }
}
