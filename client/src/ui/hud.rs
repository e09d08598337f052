//! In-game HUD: load status, score, camera mode, music and the action hint

use bevy::prelude::*;
use cauldron_shared::{CameraMode, CollectedCounts, GameEvent};

use super::styles::*;
use crate::audio::MusicSettings;
use crate::systems::LevelStatus;

/// Seconds before a fresh hint dims to its settled alpha
const HINT_SETTLE_SECS: f32 = 1.5;

const CONTROLS_HELP: &str = "WASD move (camera) · Arrows move (facing) · Shift run · Right-drag orbit\n\
E pick up · F drop · C camera · J/K turn · U/I zoom · M music · -/= volume";

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HintFade>();
        app.add_systems(Startup, spawn_hud);
        app.add_systems(
            Update,
            (update_status_text, update_music_text, handle_hud_events, fade_hint)
                .chain()
                .in_set(crate::AppSet::Present),
        );
    }
}

/// Which line a HUD text entity shows
#[derive(Component, Clone, Copy, PartialEq, Eq, Debug)]
enum HudText {
    Status,
    Score,
    Camera,
    Music,
    Hint,
}

#[derive(Resource)]
struct HintFade(Timer);

impl Default for HintFade {
    fn default() -> Self {
        let mut timer = Timer::from_seconds(HINT_SETTLE_SECS, TimerMode::Once);
        timer.tick(timer.duration());
        Self(timer)
    }
}

fn score_line(counts: CollectedCounts) -> String {
    format!("Crystals: {} · Mushrooms: {}", counts.crystals, counts.mushrooms)
}

fn camera_line(mode: CameraMode) -> String {
    format!("{} (C to switch)", mode.label())
}

fn music_line(music: &MusicSettings) -> String {
    let state = if music.enabled { "on" } else { "off" };
    format!("Music: {} · volume {:.0}%", state, music.volume * 100.0)
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((Name::new("Hud"), panel_style(), BackgroundColor(PANEL_BACKGROUND)))
        .with_children(|panel| {
            panel.spawn((HudText::Status, Text::new(""), body_text_style(), TextColor(TEXT_COLOR)));
            panel.spawn((
                HudText::Score,
                Text::new(score_line(CollectedCounts::default())),
                body_text_style(),
                TextColor(ACCENT_COLOR),
            ));
            panel.spawn((
                HudText::Camera,
                Text::new(camera_line(CameraMode::default())),
                small_text_style(),
                TextColor(TEXT_MUTED),
            ));
            panel.spawn((
                HudText::Music,
                Text::new(music_line(&MusicSettings::default())),
                small_text_style(),
                TextColor(TEXT_MUTED),
            ));
            panel.spawn((Text::new(CONTROLS_HELP), small_text_style(), TextColor(TEXT_MUTED)));
        });

    commands.spawn((
        HudText::Hint,
        Text::new(""),
        hint_text_style(),
        TextColor(TEXT_COLOR),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(40.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        TextLayout::new_with_justify(Justify::Center),
    ));
}

fn set_line(texts: &mut Query<(&HudText, &mut Text, &mut TextColor)>, line: HudText, value: String) {
    for (kind, mut text, _) in texts.iter_mut() {
        if *kind == line {
            text.0 = value.clone();
        }
    }
}

fn update_status_text(status: Res<LevelStatus>, mut texts: Query<(&HudText, &mut Text, &mut TextColor)>) {
    if status.is_changed() {
        set_line(&mut texts, HudText::Status, status.message.clone());
    }
}

fn update_music_text(music: Res<MusicSettings>, mut texts: Query<(&HudText, &mut Text, &mut TextColor)>) {
    if music.is_changed() {
        set_line(&mut texts, HudText::Music, music_line(&music));
    }
}

fn handle_hud_events(
    mut events: MessageReader<GameEvent>,
    mut fade: ResMut<HintFade>,
    mut texts: Query<(&HudText, &mut Text, &mut TextColor)>,
) {
    for event in events.read() {
        match event {
            GameEvent::Hint(message) => {
                set_line(&mut texts, HudText::Hint, message.clone());
                for (kind, _, mut color) in texts.iter_mut() {
                    if *kind == HudText::Hint {
                        color.0 = color.0.with_alpha(HINT_ALPHA_FRESH);
                    }
                }
                fade.0.reset();
            }
            GameEvent::ScoreChanged(counts) => set_line(&mut texts, HudText::Score, score_line(*counts)),
            GameEvent::CameraModeChanged(mode) => set_line(&mut texts, HudText::Camera, camera_line(*mode)),
            _ => {}
        }
    }
}

fn fade_hint(time: Res<Time>, mut fade: ResMut<HintFade>, mut texts: Query<(&HudText, &mut TextColor)>) {
    if fade.0.is_finished() {
        return;
    }
    fade.0.tick(time.delta());
    if !fade.0.just_finished() {
        return;
    }
    for (kind, mut color) in texts.iter_mut() {
        if *kind == HudText::Hint {
            color.0 = color.0.with_alpha(HINT_ALPHA_SETTLED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_line_lists_both_kinds() {
        let counts = CollectedCounts {
            crystals: 2,
            mushrooms: 1,
        };
        assert_eq!(score_line(counts), "Crystals: 2 · Mushrooms: 1");
    }

    #[test]
    fn test_music_line_shows_state_and_volume() {
        let music = MusicSettings {
            enabled: false,
            volume: 0.5,
            started: true,
        };
        assert_eq!(music_line(&music), "Music: off · volume 50%");
    }
}
