//! Player-related constants and types

use bevy::prelude::*;

use crate::config::PlayerTuning;
use crate::scene::NodeId;

/// Player movement speed (units per second)
pub const PLAYER_SPEED: f32 = 3.0;

/// Speed multiplier while the run modifier is held
pub const RUN_MULTIPLIER: f32 = 1.7;

/// Facing interpolation rate (1/s)
pub const TURN_SMOOTHING: f32 = 3.0;

/// Player radius (for obstacle footprints)
pub const PLAYER_RADIUS: f32 = 0.25;

/// How far below the player the ground may be and still snap
pub const GROUND_SNAP_MAX: f32 = 0.3;

/// Gravity in units/s^2 (negative Y)
pub const GRAVITY: f32 = -9.8;

/// Where carried items sit relative to the player root
pub const HAND_ANCHOR_OFFSET: [f32; 3] = [0.25, 1.4, 0.35];

/// Simulation-side player state. Mutated once per frame by the movement controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    /// Horizontal facing, 0 looks down +Z
    pub facing_yaw: f32,
    pub velocity_y: f32,
    /// Index of the carried collectible, if any
    pub carrying: Option<usize>,
    pub speed: f32,
    pub run_multiplier: f32,
    pub turn_smoothing: f32,
    pub radius: f32,
    pub ground_snap_max: f32,
    /// Footstep loop currently requested
    pub footsteps: bool,
}

impl PlayerState {
    pub fn new(position: Vec3, tuning: &PlayerTuning) -> Self {
        Self {
            position,
            facing_yaw: 0.0,
            velocity_y: 0.0,
            carrying: None,
            speed: tuning.speed,
            run_multiplier: tuning.run_multiplier,
            turn_smoothing: tuning.turn_smoothing,
            radius: tuning.radius,
            ground_snap_max: tuning.ground_snap_max,
            footsteps: false,
        }
    }
}

/// Scene nodes that make up the player: a synthetic root that moves, the avatar model
/// (rotated to the facing yaw) and the hand anchor carried items are parented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRig {
    pub root: NodeId,
    pub avatar: NodeId,
    pub hand: NodeId,
}
