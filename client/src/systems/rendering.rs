//! Rendering systems
//!
//! Procedural sky with atmosphere-driven environment light, a white sun and a bluish
//! ambient fill.

use bevy::camera::Exposure;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::light::{light_consts::lux, AtmosphereEnvironmentMapLight, DirectionalLightShadowMap};
use bevy::pbr::{Atmosphere, AtmosphereMode, AtmosphereSettings};
use bevy::prelude::*;
use bevy::render::view::Msaa;

/// Marker for the sun directional light
#[derive(Component)]
pub struct SunLight;

/// Sky-tinted ambient fill (stands in for a hemisphere light)
const AMBIENT_COLOR: Color = Color::srgb(0.694, 0.882, 1.0);
const AMBIENT_BRIGHTNESS: f32 = 80.0;

/// Sun position; it always aims at the origin.
const SUN_POSITION: Vec3 = Vec3::new(5.0, 10.0, 5.0);

/// Atmosphere LUT settings tuned for realtime gameplay on modest GPUs.
fn atmosphere_settings_perf() -> AtmosphereSettings {
    AtmosphereSettings {
        transmittance_lut_size: UVec2::new(128, 64),
        transmittance_lut_samples: 20,
        multiscattering_lut_size: UVec2::new(16, 16),
        multiscattering_lut_dirs: 32,
        multiscattering_lut_samples: 10,
        sky_view_lut_size: UVec2::new(192, 96),
        sky_view_lut_samples: 8,
        aerial_view_lut_size: UVec3::new(16, 16, 16),
        aerial_view_lut_samples: 4,
        // The level is small: no aerial perspective past 1km
        aerial_view_lut_max_distance: 1.0e3,
        // 1 unit = 1 meter
        scene_units_to_m: 1.0,
        sky_max_samples: 8,
        rendering_method: AtmosphereMode::LookupTexture,
    }
}

/// Sky, exposure and environment light shared by every gameplay camera.
pub fn sky_view() -> impl Bundle {
    (
        // Performance: Disable MSAA
        Msaa::Off,
        Tonemapping::AcesFitted,
        // Physical light levels (RAW_SUNLIGHT) need a sunlight exposure
        Exposure::SUNLIGHT,
        Atmosphere::EARTH,
        atmosphere_settings_perf(),
        AtmosphereEnvironmentMapLight {
            intensity: 0.8,
            affects_lightmapped_mesh_diffuse: true,
            size: UVec2::new(64, 64),
        },
    )
}

/// One-time rendering setup.
pub fn setup_rendering(mut commands: Commands) {
    // Performance: a single level does not need a large shadow map.
    commands.insert_resource(DirectionalLightShadowMap { size: 1024 });
    // The atmosphere draws the sky; ClearColor is only a fallback.
    commands.insert_resource(ClearColor(Color::BLACK));
    commands.insert_resource(AmbientLight {
        color: AMBIENT_COLOR,
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });

    commands.spawn((
        SunLight,
        Name::new("Sun"),
        DirectionalLight {
            color: Color::WHITE,
            illuminance: lux::RAW_SUNLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!("Client rendering initialized with procedural sky");
}
