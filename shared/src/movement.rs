//! Movement controller: held keys to horizontal displacement and facing.
//!
//! Two steering schemes are summed: W/A/S/D move relative to the camera, arrow keys move
//! relative to the character's own facing. Collision is resolved by axis-decomposed
//! sliding against obstacle footprints.

use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

use crate::camera::CameraBasis;
use crate::player::PlayerState;
use crate::registry::Obstacle;
use crate::spatial::point_blocked;

/// Directional keys of one steering scheme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementKeys {
    /// Sum of unit contributions along the given basis.
    fn direction(&self, forward: Vec3, right: Vec3) -> Vec3 {
        let mut direction = Vec3::ZERO;
        if self.forward {
            direction += forward;
        }
        if self.backward {
            direction -= forward;
        }
        if self.right {
            direction += right;
        }
        if self.left {
            direction -= right;
        }
        direction
    }
}

/// Held movement input for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementInput {
    /// Camera-relative scheme (W/A/S/D)
    pub camera: MovementKeys,
    /// Facing-relative scheme (arrow keys)
    pub facing: MovementKeys,
    pub run: bool,
}

/// Footstep loop transitions requested by a movement step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FootstepChange {
    Start,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementOutcome {
    /// Displacement the input asked for, before collision
    pub attempted: Vec3,
    /// Whether the position actually changed
    pub moved: bool,
    pub footstep: Option<FootstepChange>,
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Character forward and right for a facing yaw. Yaw 0 looks down +Z.
pub fn facing_basis(yaw: f32) -> (Vec3, Vec3) {
    let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
    (forward, forward.cross(Vec3::Y))
}

/// Advance the player's horizontal position and facing by one frame.
pub fn step_movement(
    input: &MovementInput,
    basis: CameraBasis,
    player: &mut PlayerState,
    obstacles: &[Obstacle],
    dt: f32,
) -> MovementOutcome {
    let (facing_forward, facing_right) = facing_basis(player.facing_yaw);
    let facing_dir = input.facing.direction(facing_forward, facing_right);
    let desired = input.camera.direction(basis.forward, basis.right) + facing_dir;

    let mut outcome = MovementOutcome {
        attempted: Vec3::ZERO,
        moved: false,
        footstep: None,
    };

    if let Some(dir) = desired.try_normalize() {
        let speed = player.speed * if input.run { player.run_multiplier } else { 1.0 };
        let displacement = dir * speed * dt;
        outcome.attempted = displacement;

        let start = player.position;
        let candidate = start + displacement;
        if !point_blocked(candidate, obstacles, player.radius) {
            player.position = candidate;
        } else {
            let x_only = player.position + Vec3::new(displacement.x, 0.0, 0.0);
            if !point_blocked(x_only, obstacles, player.radius) {
                player.position = x_only;
            }
            let z_only = player.position + Vec3::new(0.0, 0.0, displacement.z);
            if !point_blocked(z_only, obstacles, player.radius) {
                player.position = z_only;
            }
        }
        outcome.moved = player.position != start;

        let target_yaw = displacement.x.atan2(displacement.z);
        let t = (player.turn_smoothing * dt).min(1.0);
        let delta = wrap_angle(target_yaw - player.facing_yaw);
        player.facing_yaw = wrap_angle(player.facing_yaw + delta * t);
    }

    // Only the facing-relative keys drive the footstep loop
    let walking = facing_dir != Vec3::ZERO && desired != Vec3::ZERO;
    if walking && !player.footsteps {
        player.footsteps = true;
        outcome.footstep = Some(FootstepChange::Start);
    } else if facing_dir == Vec3::ZERO && player.footsteps {
        player.footsteps = false;
        outcome.footstep = Some(FootstepChange::Stop);
    }

    outcome
}
