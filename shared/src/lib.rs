//! Gameplay core for Cauldron
//!
//! Headless simulation: scene graph, movement, collision, interaction and camera rig.
//! The client crate renders it and feeds it input; nothing in here needs a window.

pub mod camera;
pub mod config;
pub mod game;
pub mod ground;
pub mod interaction;
pub mod movement;
pub mod physics;
pub mod player;
pub mod registry;
pub mod scene;
pub mod spatial;

pub use camera::{CameraBasis, CameraMode, CameraRig};
pub use config::{ConfigError, GameConfig};
pub use game::{Cue, FrameInput, GameEvent, GameState, PlayerAction};
pub use interaction::CollectedCounts;
pub use movement::{MovementInput, MovementKeys};
pub use registry::{BindingError, CollectibleKind};
pub use scene::{MeshGeometry, NodeId, SceneGraph, SceneNode};

/// Default location of the tuning file, relative to the asset folder.
pub const CONFIG_PATH: &str = "config/game.ron";

/// glTF scene with the level, the avatar and every collectible.
pub const SCENE_PATH: &str = "models/escenario.glb";
