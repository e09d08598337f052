//! Frame orchestrator: the explicit game state and its per-frame tick.
//!
//! `GameState` owns everything the simulation mutates. The client builds it once the
//! scene is loaded, feeds it input every frame and mirrors the resulting scene graph
//! changes and events onto entities, audio and HUD.

use bevy::prelude::*;
use rand::Rng;

use crate::camera::{CameraMode, CameraRig};
use crate::config::GameConfig;
use crate::ground::GroundMesh;
use crate::interaction::{self, CollectedCounts, DropOutcome, PickupOutcome};
use crate::movement::{self, FootstepChange, MovementInput};
use crate::physics;
use crate::player::{PlayerRig, PlayerState};
use crate::registry::{BindingError, Registry, SceneBindings};
use crate::scene::{NodeId, SceneGraph, SceneNode};
use crate::spatial;

/// Name of the synthetic node that moves the player.
pub const PLAYER_ROOT_NAME: &str = "PlayerRoot";
/// Name of the node carried items are attached to.
pub const HAND_ANCHOR_NAME: &str = "HandAnchor";

/// Discrete, edge-triggered player actions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    Pickup,
    Drop,
    ToggleCamera,
    YawLeft,
    YawRight,
    ZoomOut,
    ZoomIn,
}

/// Audio cues the simulation asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Ambient,
    Pickup,
    Drop,
    Footstep,
}

/// Everything the presentation layer should react to.
#[derive(Message, Clone, Debug, PartialEq)]
pub enum GameEvent {
    PlayCue(Cue),
    StopCue(Cue),
    Hint(String),
    ScoreChanged(CollectedCounts),
    CameraModeChanged(CameraMode),
}

/// Input sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub movement: MovementInput,
    /// Free-look yaw delta (radians) accumulated this frame
    pub orbit_yaw: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    graph: SceneGraph,
    bindings: SceneBindings,
    ground: Option<GroundMesh>,
    player: PlayerState,
    rig: PlayerRig,
    camera: CameraRig,
    collected: CollectedCounts,
}

impl GameState {
    /// Bind a freshly loaded scene and set up the player.
    ///
    /// The avatar is moved under a new player root (with the hand anchor as a sibling),
    /// then the root is pushed out of any obstacle it spawned inside.
    pub fn bind(mut graph: SceneGraph, config: GameConfig) -> Result<Self, BindingError> {
        let bindings = SceneBindings::bind(&graph, &config.scene, config.interaction.footprint_margin)?;

        let ground = bindings.ground.map(|id| GroundMesh::from_triangles(graph.world_triangles(id)));
        if let Some(ground) = &ground {
            if ground.is_empty() {
                warn!("Ground node {:?} has no triangles to stand on", config.scene.ground);
            } else {
                debug!("Ground mesh: {} triangles", ground.len());
            }
        }

        let spawn = graph.world_position(bindings.avatar);
        let root = graph.add(SceneNode::new(PLAYER_ROOT_NAME, None, Transform::from_translation(spawn)));
        let hand = graph.add(SceneNode::new(
            HAND_ANCHOR_NAME,
            Some(root),
            Transform::from_translation(Vec3::from(config.player.hand_offset)),
        ));
        graph.reparent(bindings.avatar, Some(root));
        let rig = PlayerRig {
            root,
            avatar: bindings.avatar,
            hand,
        };

        let resolved = spatial::resolve_spawn_overlap(
            spawn,
            bindings.registry.obstacles(),
            config.player.radius,
            config.interaction.spawn_clearance,
        );
        if resolved != spawn {
            info!(
                "Spawn moved out of obstacles: ({:.2}, {:.2}) -> ({:.2}, {:.2})",
                spawn.x, spawn.z, resolved.x, resolved.z
            );
        }
        graph.set_translation(root, resolved);

        let player = PlayerState::new(resolved, &config.player);
        let camera = CameraRig::new(&config.camera, resolved);

        Ok(Self {
            config,
            graph,
            bindings,
            ground,
            player,
            rig,
            camera,
            collected: CollectedCounts::default(),
        })
    }

    /// One simulation frame: movement, vertical physics, then the camera.
    pub fn tick(&mut self, input: &FrameInput, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !(dt > 0.0 && dt.is_finite()) {
            return events;
        }

        let outcome = movement::step_movement(
            &input.movement,
            self.camera.basis(),
            &mut self.player,
            self.bindings.registry.obstacles(),
            dt,
        );
        if outcome.attempted != Vec3::ZERO {
            self.apply_avatar_yaw();
        }
        match outcome.footstep {
            Some(FootstepChange::Start) => events.push(GameEvent::PlayCue(Cue::Footstep)),
            Some(FootstepChange::Stop) => events.push(GameEvent::StopCue(Cue::Footstep)),
            None => {}
        }

        physics::apply_gravity_and_ground(&mut self.player, self.ground.as_ref(), self.config.player.gravity, dt);
        self.graph.set_translation(self.rig.root, self.player.position);

        if input.orbit_yaw != 0.0 {
            self.camera.orbit(input.orbit_yaw);
        }
        self.camera.update(self.player.position, self.player.facing_yaw);

        events
    }

    /// Set the avatar's yaw, keeping whatever pitch/roll the model came with.
    fn apply_avatar_yaw(&mut self) {
        let mut local = self.graph.local(self.rig.avatar);
        let (_, pitch, roll) = local.rotation.to_euler(EulerRot::YXZ);
        local.rotation = Quat::from_euler(EulerRot::YXZ, self.player.facing_yaw, pitch, roll);
        self.graph.set_local(self.rig.avatar, local);
    }

    pub fn apply_action(&mut self, action: PlayerAction, rng: &mut impl Rng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match action {
            PlayerAction::Pickup => {
                let outcome = interaction::try_pickup(
                    &mut self.player,
                    &mut self.bindings.registry,
                    &mut self.graph,
                    &self.rig,
                    &self.config.interaction,
                );
                if matches!(outcome, PickupOutcome::PickedUp { .. }) {
                    events.push(GameEvent::PlayCue(Cue::Pickup));
                }
                events.push(GameEvent::Hint(outcome.hint()));
            }
            PlayerAction::Drop => {
                let outcome = interaction::try_drop(
                    &mut self.player,
                    &mut self.bindings.registry,
                    &mut self.graph,
                    &self.rig,
                    self.bindings.deposit_target,
                    &mut self.collected,
                    &self.config.interaction,
                    rng,
                );
                if matches!(outcome, DropOutcome::Deposited { .. }) {
                    events.push(GameEvent::PlayCue(Cue::Drop));
                    events.push(GameEvent::ScoreChanged(self.collected));
                }
                events.push(GameEvent::Hint(outcome.hint()));
            }
            PlayerAction::ToggleCamera => {
                let mode = self.camera.toggle();
                info!("Camera mode: {:?}", mode);
                events.push(GameEvent::CameraModeChanged(mode));
                events.push(GameEvent::Hint(mode.label().to_string()));
            }
            PlayerAction::YawLeft => self.camera.adjust_yaw(-self.config.camera.yaw_step),
            PlayerAction::YawRight => self.camera.adjust_yaw(self.config.camera.yaw_step),
            PlayerAction::ZoomOut => self.camera.adjust_distance(self.config.camera.distance_step),
            PlayerAction::ZoomIn => self.camera.adjust_distance(-self.config.camera.distance_step),
        }
        events
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Scene nodes changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<NodeId> {
        self.graph.take_dirty()
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn rig(&self) -> &PlayerRig {
        &self.rig
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn bindings(&self) -> &SceneBindings {
        &self.bindings
    }

    pub fn registry(&self) -> &Registry {
        &self.bindings.registry
    }

    pub fn collected(&self) -> CollectedCounts {
        self.collected
    }

    pub fn has_ground(&self) -> bool {
        self.ground.is_some()
    }
}
