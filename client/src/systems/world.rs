//! Level loading and binding
//!
//! The level glTF is spawned once. When its hierarchy exists we copy it into a
//! [`SceneGraph`], bind the game state, and remember which entity backs every node so
//! simulation changes can be mirrored back.

use bevy::image::{ImageAddressMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor};
use bevy::math::Affine2;
use bevy::mesh::{Indices, VertexAttributeValues};
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use cauldron_shared::{GameConfig, GameState, MeshGeometry, NodeId, SceneGraph, SceneNode, SCENE_PATH};

use crate::audio::GameAudio;
use crate::loading::{is_settled, load_percent, refresh_status, AssetStatus};
use crate::states::AppState;

pub const GROUND_TEXTURE_PATH: &str = "textures/terreno.jpg";

/// Ground texture tiles this many times across each ground mesh.
pub const GROUND_TEXTURE_REPEAT: f32 = 4.0;

// =============================================================================
// COMPONENTS & RESOURCES
// =============================================================================

/// The entity the level `SceneRoot` is spawned onto. Nodes without a parent in the
/// scene graph hang off this entity.
#[derive(Component)]
pub struct LevelRoot;

#[derive(Resource)]
pub struct LevelAssets {
    pub scene: Handle<Scene>,
    pub ground_texture: Handle<Image>,
}

/// Load progress and the status line shown in the HUD
#[derive(Resource, Default)]
pub struct LevelStatus {
    pub scene: AssetStatus,
    pub ground_texture: AssetStatus,
    pub ground_texture_done: bool,
    pub message: String,
}

/// Entity backing each scene node, indexed by [`NodeId`].
#[derive(Resource, Default)]
pub struct NodeEntities {
    entities: Vec<Entity>,
    /// Parent of each entity in the ECS hierarchy, as last synced
    parents: Vec<Option<NodeId>>,
}

impl NodeEntities {
    pub fn entity(&self, id: NodeId) -> Option<Entity> {
        self.entities.get(id.0).copied()
    }

    /// Record a parent change. Returns true if the ECS hierarchy needs updating.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> bool {
        match self.parents.get_mut(id.0) {
            Some(current) if *current != parent => {
                *current = parent;
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

pub fn load_level(mut commands: Commands, asset_server: Res<AssetServer>, mut status: ResMut<LevelStatus>) {
    let scene: Handle<Scene> = asset_server.load(format!("{SCENE_PATH}#Scene0"));
    let ground_texture: Handle<Image> =
        asset_server.load_with_settings(GROUND_TEXTURE_PATH, |settings: &mut ImageLoaderSettings| {
            settings.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
                address_mode_u: ImageAddressMode::Repeat,
                address_mode_v: ImageAddressMode::Repeat,
                ..default()
            });
        });

    commands.spawn((LevelRoot, SceneRoot(scene.clone()), Transform::default(), Visibility::default()));
    commands.insert_resource(LevelAssets { scene, ground_texture });

    status.message = "Loading scene… 0%".to_string();
    info!("Loading level scene {}", SCENE_PATH);
}

/// Show how many level and audio assets have finished while the scene is pending.
pub fn report_load_progress(
    asset_server: Res<AssetServer>,
    assets: Res<LevelAssets>,
    audio: Option<Res<GameAudio>>,
    mut status: ResMut<LevelStatus>,
) {
    if status.scene.is_settled() {
        return;
    }
    let mut ids = vec![assets.scene.id().untyped(), assets.ground_texture.id().untyped()];
    if let Some(audio) = audio {
        ids.extend(audio.handles().map(|handle| handle.id().untyped()));
    }
    let settled = ids.iter().filter(|&&id| is_settled(&asset_server, id)).count();

    let message = format!("Loading scene… {}%", load_percent(settled, ids.len()));
    if status.message != message {
        status.message = message;
    }
}

/// Wait for the level to load and spawn, then bind the game state.
#[allow(clippy::too_many_arguments)]
pub fn bind_level(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    assets: Res<LevelAssets>,
    config: Res<GameConfig>,
    meshes: Res<Assets<Mesh>>,
    mut status: ResMut<LevelStatus>,
    mut next_state: ResMut<NextState<AppState>>,
    roots: Query<Entity, With<LevelRoot>>,
    children_q: Query<&Children>,
    nodes_q: Query<(Option<&Name>, Option<&Transform>, Option<&Mesh3d>)>,
) {
    refresh_status(&mut status.scene, &asset_server, &assets.scene, SCENE_PATH);
    match status.scene {
        AssetStatus::Pending => return,
        AssetStatus::Failed => {
            error!("Level scene {} failed to load; gameplay is unavailable", SCENE_PATH);
            status.message = "Scene failed to load".to_string();
            next_state.set(AppState::Unavailable);
            return;
        }
        AssetStatus::Loaded => {}
    }

    let Ok(root) = roots.single() else { return };
    // The scene asset is loaded but its instance may not be spawned yet.
    let Ok(top_level) = children_q.get(root) else { return };

    let (graph, mut entities) = mirror_hierarchy(top_level, &children_q, &nodes_q, &meshes);
    let mut parents: Vec<Option<NodeId>> = (0..graph.len()).map(|i| graph.parent(NodeId(i))).collect();
    info!("Level hierarchy mirrored: {} nodes", graph.len());

    let state = match GameState::bind(graph, config.clone()) {
        Ok(state) => state,
        Err(err) => {
            error!("Cannot start gameplay: {}", err);
            status.message = "Avatar node not found".to_string();
            next_state.set(AppState::Unavailable);
            return;
        }
    };

    // Nodes created by the binding (player root, hand anchor) need entities too.
    let graph = state.graph();
    for index in entities.len()..graph.len() {
        let id = NodeId(index);
        let parent = graph.parent(id);
        let parent_entity = parent.and_then(|p| entities.get(p.0).copied()).unwrap_or(root);
        let entity = commands
            .spawn((
                Name::new(graph.name(id).to_string()),
                graph.local(id),
                Visibility::default(),
                ChildOf(parent_entity),
            ))
            .id();
        entities.push(entity);
        parents.push(parent);
    }

    commands.insert_resource(NodeEntities { entities, parents });
    commands.insert_resource(state);
    status.message = "Ready: move around and collect ingredients".to_string();
    next_state.set(AppState::Playing);
}

/// Depth-first copy of the spawned scene below `top_level`.
fn mirror_hierarchy(
    top_level: &Children,
    children_q: &Query<&Children>,
    nodes_q: &Query<(Option<&Name>, Option<&Transform>, Option<&Mesh3d>)>,
    meshes: &Assets<Mesh>,
) -> (SceneGraph, Vec<Entity>) {
    let mut graph = SceneGraph::new();
    let mut entities = Vec::new();
    let mut stack: Vec<(Entity, Option<NodeId>)> = top_level.iter().rev().map(|e| (e, None)).collect();

    while let Some((entity, parent)) = stack.pop() {
        let Ok((name, transform, mesh3d)) = nodes_q.get(entity) else { continue };

        let mut node = SceneNode::new(
            name.map(|n| n.as_str()).unwrap_or_default(),
            parent,
            transform.copied().unwrap_or_default(),
        );
        if let Some(geometry) = mesh3d.and_then(|m| meshes.get(&m.0)).and_then(mesh_geometry) {
            node = node.with_mesh(geometry);
        }

        let id = graph.add(node);
        entities.push(entity);

        if let Ok(children) = children_q.get(entity) {
            stack.extend(children.iter().rev().map(|child| (child, Some(id))));
        }
    }

    (graph, entities)
}

fn mesh_geometry(mesh: &Mesh) -> Option<MeshGeometry> {
    let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION) else {
        return None;
    };
    let positions: Vec<Vec3> = positions.iter().map(|p| Vec3::from_array(*p)).collect();

    let indices = if mesh.primitive_topology() == PrimitiveTopology::TriangleList {
        mesh.indices().map(|indices| match indices {
            Indices::U16(values) => values.iter().map(|&i| u32::from(i)).collect(),
            Indices::U32(values) => values.clone(),
        })
    } else {
        // Lines and points still count for bounds but have no walkable triangles
        Some(Vec::new())
    };

    Some(MeshGeometry::new(positions, indices))
}

// =============================================================================
// GROUND TEXTURE
// =============================================================================

/// Put the tiled ground texture on every mesh under the ground node once it loads.
/// A failed load leaves the scene's own material.
#[allow(clippy::too_many_arguments)]
pub fn apply_ground_texture(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    assets: Res<LevelAssets>,
    state: Res<GameState>,
    nodes: Res<NodeEntities>,
    mut status: ResMut<LevelStatus>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mesh_entities: Query<(), With<Mesh3d>>,
) {
    if status.ground_texture_done {
        return;
    }
    refresh_status(&mut status.ground_texture, &asset_server, &assets.ground_texture, GROUND_TEXTURE_PATH);
    match status.ground_texture {
        AssetStatus::Pending => return,
        AssetStatus::Failed => {
            status.ground_texture_done = true;
            return;
        }
        AssetStatus::Loaded => {}
    }
    status.ground_texture_done = true;

    let Some(ground) = state.bindings().ground else { return };

    let material = materials.add(StandardMaterial {
        base_color_texture: Some(assets.ground_texture.clone()),
        perceptual_roughness: 1.0,
        metallic: 0.0,
        uv_transform: Affine2::from_scale(Vec2::splat(GROUND_TEXTURE_REPEAT)),
        ..default()
    });

    let mut applied = 0;
    for id in state.graph().subtree(ground) {
        let Some(entity) = nodes.entity(id) else { continue };
        if mesh_entities.contains(entity) {
            commands.entity(entity).insert(MeshMaterial3d(material.clone()));
            applied += 1;
        }
    }

    info!("Ground texture applied to {} meshes", applied);
    status.message = "Ground texture applied".to_string();
}
