//! Audio: ambient music, footstep loop and pickup/drop one-shots
//!
//! Each sound loads independently; a sound that is missing or fails to decode is
//! skipped and the rest keep working.

use bevy::audio::Volume;
use bevy::prelude::*;
use cauldron_shared::{Cue, GameEvent, GameState};

use crate::input::InputState;
use crate::loading::{refresh_status, AssetStatus};

const CUES: [Cue; 4] = [Cue::Ambient, Cue::Pickup, Cue::Drop, Cue::Footstep];

const ONE_SHOT_VOLUME: f32 = 0.8;
const FOOTSTEP_VOLUME: f32 = 0.6;
const DEFAULT_MUSIC_VOLUME: f32 = 0.35;

fn cue_path(cue: Cue) -> &'static str {
    match cue {
        Cue::Ambient => "sounds/fondo.ogg",
        Cue::Pickup => "sounds/recoger.ogg",
        Cue::Drop => "sounds/soltar.ogg",
        Cue::Footstep => "sounds/caminar.ogg",
    }
}

fn cue_index(cue: Cue) -> usize {
    match cue {
        Cue::Ambient => 0,
        Cue::Pickup => 1,
        Cue::Drop => 2,
        Cue::Footstep => 3,
    }
}

/// Resource holding all audio handles
#[derive(Resource)]
pub struct GameAudio {
    handles: [Handle<AudioSource>; 4],
}

impl GameAudio {
    pub fn handle(&self, cue: Cue) -> &Handle<AudioSource> {
        &self.handles[cue_index(cue)]
    }

    pub fn handles(&self) -> impl Iterator<Item = &Handle<AudioSource>> {
        self.handles.iter()
    }
}

/// Load status per cue plus which loop entities exist
#[derive(Resource, Default)]
pub struct AudioState {
    status: [AssetStatus; 4],
    pub music_spawned: bool,
    pub footstep_spawned: bool,
}

impl AudioState {
    pub fn is_loaded(&self, cue: Cue) -> bool {
        self.status[cue_index(cue)] == AssetStatus::Loaded
    }
}

/// Player-controlled music settings
#[derive(Resource)]
pub struct MusicSettings {
    pub enabled: bool,
    pub volume: f32,
    /// Music waits for the first key press
    pub started: bool,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_MUSIC_VOLUME,
            started: false,
        }
    }
}

impl MusicSettings {
    pub fn should_play(&self) -> bool {
        self.enabled && self.started
    }
}

#[derive(Component)]
pub struct AmbientMusic;

#[derive(Component)]
pub struct FootstepLoop;

#[derive(Component)]
pub struct CueSound;

/// Load all audio assets on startup
pub fn setup_audio(mut commands: Commands, asset_server: Res<AssetServer>) {
    info!("Audio system: loading audio assets...");
    let handles = CUES.map(|cue| asset_server.load(cue_path(cue)));
    commands.insert_resource(GameAudio { handles });
}

pub fn check_audio_assets_loaded(
    audio: Option<Res<GameAudio>>,
    mut audio_state: ResMut<AudioState>,
    asset_server: Res<AssetServer>,
) {
    let Some(audio) = audio else { return };
    for cue in CUES {
        let path = cue_path(cue);
        if refresh_status(&mut audio_state.status[cue_index(cue)], &asset_server, audio.handle(cue), path)
            && audio_state.is_loaded(cue)
        {
            info!("Audio loaded: {}", path);
        }
    }
}

/// Spawn the looping sounds once their assets are ready. They start paused.
pub fn ensure_loop_entities(
    mut commands: Commands,
    audio: Option<Res<GameAudio>>,
    mut audio_state: ResMut<AudioState>,
    music: Res<MusicSettings>,
    game: Option<Res<GameState>>,
) {
    let Some(audio) = audio else { return };

    if !audio_state.music_spawned && audio_state.is_loaded(Cue::Ambient) {
        let mut settings = PlaybackSettings::LOOP.with_volume(Volume::Linear(music.volume));
        if !music.should_play() {
            settings = settings.paused();
        }
        commands.spawn((AmbientMusic, AudioPlayer::new(audio.handle(Cue::Ambient).clone()), settings));
        audio_state.music_spawned = true;
    }

    if !audio_state.footstep_spawned && audio_state.is_loaded(Cue::Footstep) {
        let mut settings = PlaybackSettings::LOOP.with_volume(Volume::Linear(FOOTSTEP_VOLUME));
        // Footsteps may have started before the loop was ready
        if !game.is_some_and(|g| g.player().footsteps) {
            settings = settings.paused();
        }
        commands.spawn((FootstepLoop, AudioPlayer::new(audio.handle(Cue::Footstep).clone()), settings));
        audio_state.footstep_spawned = true;
    }
}

/// M toggles the music, -/= change its volume, and the first key press starts it.
pub fn handle_music_controls(
    input: Res<InputState>,
    mut music: ResMut<MusicSettings>,
    mut sinks: Query<&mut AudioSink, With<AmbientMusic>>,
) {
    let mut changed = false;
    if input.any_key_pressed && !music.started {
        music.started = true;
        changed = true;
    }
    if input.music_toggle {
        music.enabled = !music.enabled;
        info!("Music {}", if music.enabled { "on" } else { "off" });
        changed = true;
    }
    if input.music_volume_delta != 0.0 {
        music.volume = (music.volume + input.music_volume_delta).clamp(0.0, 1.0);
        changed = true;
    }
    if !changed {
        return;
    }

    for mut sink in sinks.iter_mut() {
        sink.set_volume(Volume::Linear(music.volume));
        sync_loop(&sink, music.should_play());
    }
}

/// React to gameplay sound cues.
pub fn play_game_cues(
    mut commands: Commands,
    mut events: MessageReader<GameEvent>,
    audio: Option<Res<GameAudio>>,
    audio_state: Res<AudioState>,
    footsteps: Query<&AudioSink, With<FootstepLoop>>,
) {
    let Some(audio) = audio else {
        events.clear();
        return;
    };

    for event in events.read() {
        match event {
            GameEvent::PlayCue(cue @ (Cue::Pickup | Cue::Drop)) => {
                if !audio_state.is_loaded(*cue) {
                    continue;
                }
                commands.spawn((
                    CueSound,
                    AudioPlayer::new(audio.handle(*cue).clone()),
                    PlaybackSettings::DESPAWN.with_volume(Volume::Linear(ONE_SHOT_VOLUME)),
                ));
            }
            GameEvent::PlayCue(Cue::Footstep) => footsteps.iter().for_each(|sink| sink.play()),
            GameEvent::StopCue(Cue::Footstep) => footsteps.iter().for_each(|sink| sink.pause()),
            _ => {}
        }
    }
}

/// Keep the footstep loop in step with the player's footstep flag. Covers cues that
/// arrived before the loop's sink existed.
pub fn reconcile_footsteps(game: Option<Res<GameState>>, footsteps: Query<&AudioSink, With<FootstepLoop>>) {
    let walking = game.is_some_and(|g| g.player().footsteps);
    for sink in footsteps.iter() {
        sync_loop(sink, walking);
    }
}

/// A loop must flip when its paused state disagrees with whether it should play.
fn needs_toggle(should_play: bool, paused: bool) -> bool {
    should_play == paused
}

fn sync_loop(sink: &AudioSink, should_play: bool) {
    if !needs_toggle(should_play, sink.is_paused()) {
        return;
    }
    if should_play {
        sink.play();
    } else {
        sink.pause();
    }
}

/// Silence the footstep loop when gameplay stops.
pub fn stop_footsteps(footsteps: Query<&AudioSink, With<FootstepLoop>>) {
    for sink in footsteps.iter() {
        sink.pause();
    }
}

/// Audio plugin for easy integration
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioState>();
        app.init_resource::<MusicSettings>();
        app.add_systems(Startup, setup_audio);
        app.add_systems(OnExit(crate::states::AppState::Playing), stop_footsteps);
        app.add_systems(
            Update,
            (
                check_audio_assets_loaded,
                ensure_loop_entities,
                handle_music_controls,
                play_game_cues,
                reconcile_footsteps,
            )
                .chain()
                .in_set(crate::AppSet::Present),
        );
    }
}
