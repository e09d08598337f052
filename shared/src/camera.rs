//! Camera rig: third-person follow and top-down views.
//!
//! Only one camera is active at a time, but both transforms are kept so switching back
//! resumes from where the inactive camera was left.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CameraTuning;

/// Camera view mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    ThirdPerson,
    TopDown,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::ThirdPerson => CameraMode::TopDown,
            CameraMode::TopDown => CameraMode::ThirdPerson,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CameraMode::ThirdPerson => "Third-person camera",
            CameraMode::TopDown => "Top-down camera",
        }
    }
}

/// Eye position plus look-at point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPlacement {
    pub eye: Vec3,
    pub target: Vec3,
}

/// Where the third-person camera wants to be: behind the character (facing yaw plus the
/// user's yaw offset), `distance` away and `height` above the player root.
pub fn third_person_placement(
    player_pos: Vec3,
    facing_yaw: f32,
    yaw_offset: f32,
    distance: f32,
    height: f32,
    target_height: f32,
) -> CameraPlacement {
    let yaw = facing_yaw + yaw_offset;
    let back = Vec3::new(yaw.sin(), 0.0, yaw.cos()) * -distance;
    CameraPlacement {
        eye: player_pos + back + Vec3::new(0.0, height, 0.0),
        target: player_pos + Vec3::new(0.0, target_height, 0.0),
    }
}

/// Straight above the player, looking down.
pub fn top_down_placement(player_pos: Vec3, height: f32) -> CameraPlacement {
    CameraPlacement {
        eye: player_pos + Vec3::new(0.0, height, 0.0),
        target: player_pos,
    }
}

/// Top-down view is oriented with world -Z at the top of the screen.
fn top_down_transform(placement: CameraPlacement) -> Transform {
    Transform::from_translation(placement.eye).looking_at(placement.target, Vec3::NEG_Z)
}

/// Horizontal camera axes used for camera-relative steering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl CameraBasis {
    /// Flatten the camera's view direction onto the ground plane. A camera looking
    /// straight down steers by its screen-up vector instead.
    pub fn from_rotation(rotation: Quat) -> Self {
        let flat = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
        let mut forward = flat(rotation * Vec3::NEG_Z);
        if forward == Vec3::ZERO {
            forward = flat(rotation * Vec3::Y);
        }
        Self {
            forward,
            right: forward.cross(Vec3::Y),
        }
    }
}

/// The camera state machine.
#[derive(Clone, Debug)]
pub struct CameraRig {
    mode: CameraMode,
    yaw_offset: f32,
    distance: f32,
    tuning: CameraTuning,
    third_person: Transform,
    top_down: Transform,
}

impl CameraRig {
    /// Initial placement around a freshly spawned player.
    pub fn new(tuning: &CameraTuning, player_pos: Vec3) -> Self {
        let target = player_pos + Vec3::new(0.0, tuning.target_height, 0.0);
        let third_person = Transform::from_translation(player_pos + Vec3::from(tuning.initial_offset))
            .looking_at(target, Vec3::Y);
        let top_down = top_down_transform(top_down_placement(player_pos, tuning.top_down_height));

        Self {
            mode: CameraMode::ThirdPerson,
            yaw_offset: 0.0,
            distance: tuning.distance.clamp(tuning.min_distance, tuning.max_distance),
            tuning: tuning.clone(),
            third_person,
            top_down,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn yaw_offset(&self) -> f32 {
        self.yaw_offset
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn third_person(&self) -> Transform {
        self.third_person
    }

    pub fn top_down(&self) -> Transform {
        self.top_down
    }

    pub fn active_transform(&self) -> Transform {
        match self.mode {
            CameraMode::ThirdPerson => self.third_person,
            CameraMode::TopDown => self.top_down,
        }
    }

    /// Orbit free-look is only accepted while following from behind.
    pub fn orbit_enabled(&self) -> bool {
        self.mode == CameraMode::ThirdPerson
    }

    pub fn basis(&self) -> CameraBasis {
        CameraBasis::from_rotation(self.active_transform().rotation)
    }

    pub fn toggle(&mut self) -> CameraMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn adjust_distance(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(self.tuning.min_distance, self.tuning.max_distance);
    }

    pub fn adjust_yaw(&mut self, delta: f32) {
        self.yaw_offset += delta;
    }

    /// Apply a free-look yaw delta. Returns false when the current mode ignores it.
    pub fn orbit(&mut self, delta_yaw: f32) -> bool {
        if !self.orbit_enabled() {
            return false;
        }
        self.yaw_offset += delta_yaw;
        true
    }

    /// Move the active camera for this frame.
    ///
    /// Third-person eases toward its desired spot with a fixed lerp factor; top-down snaps.
    pub fn update(&mut self, player_pos: Vec3, facing_yaw: f32) {
        match self.mode {
            CameraMode::ThirdPerson => {
                let placement = third_person_placement(
                    player_pos,
                    facing_yaw,
                    self.yaw_offset,
                    self.distance,
                    self.tuning.height,
                    self.tuning.target_height,
                );
                let eye = self.third_person.translation.lerp(placement.eye, self.tuning.smoothing);
                self.third_person = Transform::from_translation(eye).looking_at(placement.target, Vec3::Y);
            }
            CameraMode::TopDown => {
                self.top_down = top_down_transform(top_down_placement(player_pos, self.tuning.top_down_height));
            }
        }
    }
}
