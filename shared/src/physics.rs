//! Vertical character physics: ground snapping and gravity.
//!
//! Deliberately minimal: one downward probe per frame against the ground mesh, no
//! terminal velocity, no slope limits, no jumping.

use crate::ground::GroundMesh;
use crate::player::PlayerState;

/// The ground probe starts this far above the player's feet.
pub const GROUND_PROBE_HEIGHT: f32 = 1.0;

/// Snap the player to the ground when it is close enough below, otherwise fall.
///
/// Without a ground surface the vertical axis is left alone.
pub fn apply_gravity_and_ground(player: &mut PlayerState, ground: Option<&GroundMesh>, gravity: f32, dt: f32) {
    let Some(ground) = ground else { return };

    let mut origin = player.position;
    origin.y += GROUND_PROBE_HEIGHT;

    if let Some(hit_y) = ground.probe_down(origin) {
        let delta_y = player.position.y - hit_y;
        if delta_y <= player.ground_snap_max {
            player.position.y = hit_y;
            player.velocity_y = 0.0;
            return;
        }
    }

    player.velocity_y += gravity * dt;
    player.position.y += player.velocity_y * dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerTuning;
    use bevy::prelude::*;

    fn flat_ground(y: f32) -> GroundMesh {
        let a = Vec3::new(-50.0, y, -50.0);
        let b = Vec3::new(50.0, y, -50.0);
        let c = Vec3::new(50.0, y, 50.0);
        let d = Vec3::new(-50.0, y, 50.0);
        GroundMesh::from_triangles([[a, b, c], [a, c, d]])
    }

    #[test]
    fn test_snaps_when_within_tolerance() {
        let ground = flat_ground(0.0);
        let mut player = PlayerState::new(Vec3::new(0.0, 0.2, 0.0), &PlayerTuning::default());
        player.velocity_y = -3.0;
        apply_gravity_and_ground(&mut player, Some(&ground), -9.8, 1.0 / 60.0);
        assert_eq!(player.position.y, 0.0);
        assert_eq!(player.velocity_y, 0.0);
    }

    #[test]
    fn test_snaps_up_onto_slightly_higher_ground() {
        let ground = flat_ground(0.5);
        let mut player = PlayerState::new(Vec3::new(0.0, 0.0, 0.0), &PlayerTuning::default());
        apply_gravity_and_ground(&mut player, Some(&ground), -9.8, 1.0 / 60.0);
        assert_eq!(player.position.y, 0.5);
    }

    #[test]
    fn test_falls_and_accumulates_velocity() {
        let ground = flat_ground(0.0);
        let mut player = PlayerState::new(Vec3::new(0.0, 5.0, 0.0), &PlayerTuning::default());
        let dt = 0.1;

        apply_gravity_and_ground(&mut player, Some(&ground), -10.0, dt);
        assert!((player.velocity_y + 1.0).abs() < 1e-6);
        assert!((player.position.y - 4.9).abs() < 1e-6);

        apply_gravity_and_ground(&mut player, Some(&ground), -10.0, dt);
        assert!((player.velocity_y + 2.0).abs() < 1e-6);
        assert!((player.position.y - 4.7).abs() < 1e-6);

        for _ in 0..100 {
            apply_gravity_and_ground(&mut player, Some(&ground), -10.0, dt);
        }
        assert_eq!(player.position.y, 0.0);
        assert_eq!(player.velocity_y, 0.0);
    }

    #[test]
    fn test_no_ground_binding_leaves_height_alone() {
        let mut player = PlayerState::new(Vec3::new(0.0, 5.0, 0.0), &PlayerTuning::default());
        apply_gravity_and_ground(&mut player, None, -9.8, 0.5);
        assert_eq!(player.position.y, 5.0);
        assert_eq!(player.velocity_y, 0.0);
    }

    #[test]
    fn test_off_the_edge_keeps_falling() {
        let ground = flat_ground(0.0);
        let mut player = PlayerState::new(Vec3::new(80.0, 0.0, 0.0), &PlayerTuning::default());
        apply_gravity_and_ground(&mut player, Some(&ground), -9.8, 0.5);
        assert!(player.position.y < 0.0);
    }
}
