//! Third-person and top-down cameras
//!
//! Two cameras exist for the whole session; only the active one renders and carries the
//! audio listener. Their transforms are copied from the simulation's [`CameraRig`].

use bevy::audio::SpatialListener;
use bevy::prelude::*;
use cauldron_shared::{CameraMode, GameConfig, GameEvent};

use crate::systems::sky_view;

#[derive(Component)]
pub struct ThirdPersonCamera;

#[derive(Component)]
pub struct TopDownCamera;

const FOV: f32 = 60.0_f32.to_radians();

/// Spawn both cameras. The follow camera starts at the configured offset looking at the origin.
pub fn setup_cameras(mut commands: Commands, config: Res<GameConfig>) {
    let offset = Vec3::from_array(config.camera.initial_offset);
    let projection = Projection::Perspective(PerspectiveProjection { fov: FOV, ..default() });

    commands.spawn((
        ThirdPersonCamera,
        Name::new("ThirdPersonCamera"),
        Camera3d::default(),
        projection.clone(),
        sky_view(),
        Transform::from_translation(offset).looking_at(Vec3::ZERO, Vec3::Y),
        SpatialListener::new(0.1),
    ));

    commands.spawn((
        TopDownCamera,
        Name::new("TopDownCamera"),
        Camera3d::default(),
        Camera {
            is_active: false,
            ..default()
        },
        projection,
        sky_view(),
        Transform::from_xyz(0.0, config.camera.top_down_height, 0.0).looking_at(Vec3::ZERO, Vec3::NEG_Z),
    ));

    info!("Cameras spawned (third-person active)");
}

/// Copy both rig placements onto their cameras.
pub fn apply_camera_rig(
    state: Res<cauldron_shared::GameState>,
    mut third_person: Query<&mut Transform, (With<ThirdPersonCamera>, Without<TopDownCamera>)>,
    mut top_down: Query<&mut Transform, (With<TopDownCamera>, Without<ThirdPersonCamera>)>,
) {
    let rig = state.camera();
    if let Ok(mut transform) = third_person.single_mut() {
        *transform = rig.third_person();
    }
    if let Ok(mut transform) = top_down.single_mut() {
        *transform = rig.top_down();
    }
}

/// Swap the rendering camera (and the listener) when the mode changes.
pub fn switch_active_camera(
    mut commands: Commands,
    mut events: MessageReader<GameEvent>,
    mut third_person: Query<(Entity, &mut Camera), (With<ThirdPersonCamera>, Without<TopDownCamera>)>,
    mut top_down: Query<(Entity, &mut Camera), (With<TopDownCamera>, Without<ThirdPersonCamera>)>,
) {
    let Some(mode) = events
        .read()
        .filter_map(|event| match event {
            GameEvent::CameraModeChanged(mode) => Some(*mode),
            _ => None,
        })
        .last()
    else {
        return;
    };

    let (Ok((tp_entity, mut tp_camera)), Ok((td_entity, mut td_camera))) =
        (third_person.single_mut(), top_down.single_mut())
    else {
        return;
    };

    let top_down_active = mode == CameraMode::TopDown;
    tp_camera.is_active = !top_down_active;
    td_camera.is_active = top_down_active;

    let (listener, silent) = if top_down_active { (td_entity, tp_entity) } else { (tp_entity, td_entity) };
    commands.entity(silent).remove::<SpatialListener>();
    commands.entity(listener).insert(SpatialListener::new(0.1));

    info!("Camera mode: {:?}", mode);
}
