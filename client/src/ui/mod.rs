//! UI module

pub mod hud;
pub mod styles;

pub use hud::HudPlugin;
