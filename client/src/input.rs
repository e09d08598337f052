//! Player input handling
//!
//! Keyboard and mouse are sampled once per frame into [`InputState`]; the frame system
//! turns it into a [`FrameInput`] plus queued discrete actions.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use cauldron_shared::{FrameInput, MovementInput, MovementKeys, PlayerAction};

/// Radians of orbit per pixel of mouse drag
pub const MOUSE_SENSITIVITY: f32 = 0.003;

/// Music volume change per key press
pub const MUSIC_VOLUME_STEP: f32 = 0.05;

/// Client-side input state
#[derive(Resource, Default)]
pub struct InputState {
    /// W/A/S/D, relative to the active camera
    pub camera_keys: MovementKeys,
    /// Arrow keys, relative to the character's facing
    pub facing_keys: MovementKeys,
    pub run: bool,
    /// Free-look yaw accumulated since the last frame tick
    pub orbit_yaw: f32,
    /// Edge-triggered actions waiting for the next frame tick
    pub actions: Vec<PlayerAction>,
    pub music_toggle: bool,
    pub music_volume_delta: f32,
    /// Any key went down this frame (starts the ambient music)
    pub any_key_pressed: bool,
}

impl InputState {
    /// Held input for this frame. Consumes the accumulated orbit delta.
    pub fn take_frame_input(&mut self) -> FrameInput {
        FrameInput {
            movement: MovementInput {
                camera: self.camera_keys,
                facing: self.facing_keys,
                run: self.run,
            },
            orbit_yaw: std::mem::take(&mut self.orbit_yaw),
        }
    }
}

const ACTION_KEYS: [(KeyCode, PlayerAction); 7] = [
    (KeyCode::KeyE, PlayerAction::Pickup),
    (KeyCode::KeyF, PlayerAction::Drop),
    (KeyCode::KeyC, PlayerAction::ToggleCamera),
    (KeyCode::KeyJ, PlayerAction::YawLeft),
    (KeyCode::KeyK, PlayerAction::YawRight),
    (KeyCode::KeyU, PlayerAction::ZoomOut),
    (KeyCode::KeyI, PlayerAction::ZoomIn),
];

/// Handle keyboard input for movement and actions
pub fn handle_keyboard_input(keyboard: Res<ButtonInput<KeyCode>>, mut input_state: ResMut<InputState>) {
    input_state.camera_keys = MovementKeys {
        forward: keyboard.pressed(KeyCode::KeyW),
        backward: keyboard.pressed(KeyCode::KeyS),
        left: keyboard.pressed(KeyCode::KeyA),
        right: keyboard.pressed(KeyCode::KeyD),
    };
    input_state.facing_keys = MovementKeys {
        forward: keyboard.pressed(KeyCode::ArrowUp),
        backward: keyboard.pressed(KeyCode::ArrowDown),
        left: keyboard.pressed(KeyCode::ArrowLeft),
        right: keyboard.pressed(KeyCode::ArrowRight),
    };
    input_state.run = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    for (key, action) in ACTION_KEYS {
        if keyboard.just_pressed(key) {
            input_state.actions.push(action);
        }
    }

    input_state.music_toggle = keyboard.just_pressed(KeyCode::KeyM);
    input_state.music_volume_delta = 0.0;
    if keyboard.just_pressed(KeyCode::Minus) {
        input_state.music_volume_delta -= MUSIC_VOLUME_STEP;
    }
    if keyboard.just_pressed(KeyCode::Equal) {
        input_state.music_volume_delta += MUSIC_VOLUME_STEP;
    }
    input_state.any_key_pressed = keyboard.get_just_pressed().next().is_some();
}

/// Right-mouse drag orbits the follow camera
pub fn handle_mouse_input(
    mut mouse_motion: MessageReader<MouseMotion>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut input_state: ResMut<InputState>,
) {
    let mut delta = Vec2::ZERO;
    for motion in mouse_motion.read() {
        delta += motion.delta;
    }

    if mouse_button.pressed(MouseButton::Right) && delta.x != 0.0 {
        input_state.orbit_yaw -= delta.x * MOUSE_SENSITIVITY;
    }
}
