//! Per-frame simulation driver

use bevy::prelude::*;
use cauldron_shared::{GameEvent, GameState};

use crate::input::InputState;

/// Apply queued actions, then advance the simulation by this frame's delta.
pub fn run_game_frame(
    time: Res<Time>,
    mut input: ResMut<InputState>,
    mut state: ResMut<GameState>,
    mut events: MessageWriter<GameEvent>,
) {
    let mut rng = rand::thread_rng();
    for action in std::mem::take(&mut input.actions) {
        let emitted = state.apply_action(action, &mut rng);
        events.write_batch(emitted);
    }

    let frame = input.take_frame_input();
    events.write_batch(state.tick(&frame, time.delta_secs()));
}

/// Actions pressed before the level is playable are answered with a hint.
/// Free-look dragged meanwhile is discarded.
pub fn reject_actions_until_ready(mut input: ResMut<InputState>, mut events: MessageWriter<GameEvent>) {
    input.orbit_yaw = 0.0;
    if input.actions.is_empty() {
        return;
    }
    input.actions.clear();
    events.write(GameEvent::Hint("The level is not ready yet".to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::Messages;
    use cauldron_shared::PlayerAction;

    fn loading_app() -> App {
        let mut app = App::new();
        app.add_message::<GameEvent>();
        app.init_resource::<InputState>();
        app.add_systems(Update, reject_actions_until_ready);
        app
    }

    fn drain_hints(app: &mut App) -> usize {
        app.world_mut()
            .resource_mut::<Messages<GameEvent>>()
            .drain()
            .filter(|event| matches!(event, GameEvent::Hint(_)))
            .count()
    }

    #[test]
    fn test_orbit_drag_while_loading_is_discarded() {
        let mut app = loading_app();
        app.world_mut().resource_mut::<InputState>().orbit_yaw = 1.5;
        app.update();

        let input = app.world().resource::<InputState>();
        assert_eq!(input.orbit_yaw, 0.0);
        assert!(input.actions.is_empty());
        assert_eq!(drain_hints(&mut app), 0);
    }

    #[test]
    fn test_actions_while_loading_produce_a_hint() {
        let mut app = loading_app();
        app.world_mut().resource_mut::<InputState>().actions.push(PlayerAction::Pickup);
        app.update();

        assert!(app.world().resource::<InputState>().actions.is_empty());
        assert_eq!(drain_hints(&mut app), 1);
    }
}
