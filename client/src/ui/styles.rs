//! Shared UI styles - warm cauldron palette

use bevy::prelude::*;

/// Translucent backing for HUD panels
pub const PANEL_BACKGROUND: Color = Color::srgba(0.06, 0.05, 0.04, 0.6);

/// Accent color - potion green
pub const ACCENT_COLOR: Color = Color::srgb(0.45, 0.80, 0.40);

/// Text colors
pub const TEXT_COLOR: Color = Color::srgb(0.92, 0.88, 0.82); // Warm off-white
pub const TEXT_MUTED: Color = Color::srgb(0.60, 0.56, 0.50);

/// Hint text alpha right after it appears, and once it settles
pub const HINT_ALPHA_FRESH: f32 = 1.0;
pub const HINT_ALPHA_SETTLED: f32 = 0.85;

pub fn panel_style() -> Node {
    Node {
        position_type: PositionType::Absolute,
        top: Val::Px(12.0),
        left: Val::Px(12.0),
        flex_direction: FlexDirection::Column,
        row_gap: Val::Px(4.0),
        padding: UiRect::all(Val::Px(10.0)),
        ..default()
    }
}

pub fn body_text_style() -> TextFont {
    TextFont {
        font_size: 18.0,
        ..default()
    }
}

pub fn small_text_style() -> TextFont {
    TextFont {
        font_size: 14.0,
        ..default()
    }
}

pub fn hint_text_style() -> TextFont {
    TextFont {
        font_size: 24.0,
        ..default()
    }
}
