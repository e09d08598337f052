//! Gameplay tuning
//!
//! Every value has a default matching the shipped scene, so a missing config file is fine.
//! The client reads `assets/config/game.ron` when present.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::player::{
    GRAVITY, GROUND_SNAP_MAX, HAND_ANCHOR_OFFSET, PLAYER_RADIUS, PLAYER_SPEED, RUN_MULTIPLIER,
    TURN_SMOOTHING,
};

/// Errors while loading a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Root config resource.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerTuning,
    pub camera: CameraTuning,
    pub interaction: InteractionTuning,
    pub scene: SceneNames,
}

impl GameConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }
}

/// Character controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Walk speed in units per second
    pub speed: f32,
    pub run_multiplier: f32,
    /// How fast the facing yaw catches up with the movement direction (1/s)
    pub turn_smoothing: f32,
    /// Collision radius used to inflate obstacle footprints
    pub radius: f32,
    /// Maximum drop below the current height that still counts as grounded
    pub ground_snap_max: f32,
    /// Vertical acceleration (negative is down)
    pub gravity: f32,
    /// Hand anchor offset in player-root space
    pub hand_offset: [f32; 3],
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            run_multiplier: RUN_MULTIPLIER,
            turn_smoothing: TURN_SMOOTHING,
            radius: PLAYER_RADIUS,
            ground_snap_max: GROUND_SNAP_MAX,
            gravity: GRAVITY,
            hand_offset: HAND_ANCHOR_OFFSET,
        }
    }
}

/// Camera rig tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub distance_step: f32,
    pub yaw_step: f32,
    /// Third-person eye height above the player root
    pub height: f32,
    /// Height of the look-at point above the player root
    pub target_height: f32,
    /// Per-frame lerp factor toward the desired third-person position
    pub smoothing: f32,
    pub top_down_height: f32,
    /// Third-person camera offset used for the very first frame
    pub initial_offset: [f32; 3],
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            distance: 6.0,
            min_distance: 2.0,
            max_distance: 12.0,
            distance_step: 0.5,
            yaw_step: 0.1,
            height: 3.0,
            target_height: 1.2,
            smoothing: 0.25,
            top_down_height: 10.0,
            initial_offset: [4.0, 3.0, 6.0],
        }
    }
}

/// Pickup/drop and obstacle tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTuning {
    pub pickup_radius: f32,
    /// Max player-root to target-root distance for a drop
    pub drop_radius: f32,
    /// Full width of the random horizontal jitter around the target
    pub drop_jitter: f32,
    /// Height above the target's bounding-box top where dropped items land
    pub drop_lift: f32,
    /// Inward shrink applied to every obstacle footprint
    pub footprint_margin: f32,
    /// Extra distance past an obstacle edge when pushing the spawn out
    pub spawn_clearance: f32,
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self {
            pickup_radius: 1.5,
            drop_radius: 2.2,
            drop_jitter: 0.4,
            drop_lift: 0.15,
            footprint_margin: 0.05,
            spawn_clearance: 0.3,
        }
    }
}

/// Node names the scene asset is expected to carry. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneNames {
    pub ground: String,
    pub deposit_target: String,
    pub avatar: String,
    pub crystal_prefix: String,
    pub mushroom_prefix: String,
    pub obstacle_prefixes: Vec<String>,
    pub obstacle_names: Vec<String>,
}

impl Default for SceneNames {
    fn default() -> Self {
        Self {
            ground: "piso".to_string(),
            deposit_target: "caldero".to_string(),
            avatar: "alquimista".to_string(),
            crystal_prefix: "cristal".to_string(),
            mushroom_prefix: "seta".to_string(),
            obstacle_prefixes: vec!["arbol".to_string()],
            obstacle_names: vec!["caldero".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = GameConfig::from_ron_str("(player: (speed: 5.0), camera: (distance: 8.0))")
            .expect("valid ron");
        assert_eq!(config.player.speed, 5.0);
        assert_eq!(config.player.run_multiplier, RUN_MULTIPLIER);
        assert_eq!(config.camera.distance, 8.0);
        assert_eq!(config.camera.max_distance, 12.0);
        assert_eq!(config.scene, SceneNames::default());
    }

    #[test]
    fn test_malformed_ron_is_an_error() {
        let err = GameConfig::from_ron_str("(player: (speed: \"fast\"))").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::load_from_file("definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
