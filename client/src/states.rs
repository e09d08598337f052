//! Game state machine

use bevy::prelude::*;

/// Top-level client states
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    /// Waiting for the level scene to load and bind
    #[default]
    Loading,
    Playing,
    /// The scene failed to load or is missing the avatar; the window stays up
    Unavailable,
}
