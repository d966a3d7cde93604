use std::fmt;
use std::mem;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, LevelSpeeds};
use crate::constants::{
    AGENT_RADIUS, PELLET_POINTS, PICKUP_RADIUS, POWER_FLASH_MS, POWER_ITEM_POINTS,
    PURSUER_POINTS,
};
use crate::error::EngineError;
use crate::maze::{snap_to_center, Maze};
use crate::mover::Mobile;
use crate::player::Player;
use crate::pursuer::{ModeCycle, Pursuer, Quarry};
use crate::types::{
    Direction, GameState, Intent, PursuerKind, RuntimeEvent, ScoreUpdate, Snapshot, Vec2,
};

mod collision_system;
mod movement_system;
mod timer_system;

type ScoreListener = Box<dyn FnMut(ScoreUpdate)>;
type StateListener = Box<dyn FnMut(GameState)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TransitionKind {
    Respawn,
    NextLevel,
}

/// Delayed state change owned by the engine clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingTransition {
    kind: TransitionKind,
    remaining_ms: u64,
}

/// What a call to [`GameEngine::frame`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Arrived sooner than the frame interval; nothing ran.
    Throttled,
    /// The clock is stopped (ready, paused by the user, game over, torn down).
    Idle,
    /// Only a respawn or level delay advanced.
    Waiting,
    /// A gameplay tick ran.
    Ticked,
}

pub struct GameEngine {
    config: EngineConfig,
    level_speeds: LevelSpeeds,
    maze: Maze,
    player: Player,
    pursuers: Vec<Pursuer>,
    pellets: Vec<Vec2>,
    power_items: Vec<Vec2>,

    score: u32,
    level: u32,
    lives: u32,
    state: GameState,
    pending_intent: Option<Direction>,
    transition: Option<PendingTransition>,

    rng: StdRng,
    events: Vec<RuntimeEvent>,
    score_listeners: Vec<ScoreListener>,
    state_listeners: Vec<StateListener>,

    last_frame_at: Option<f64>,
    tick_counter: u64,
    fault: Option<String>,
    torn_down: bool,
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("score", &self.score)
            .field("level", &self.level)
            .field("lives", &self.lives)
            .field("state", &self.state)
            .field("tick", &self.tick_counter)
            .field("pellets", &self.pellets.len())
            .field("power_items", &self.power_items.len())
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let level_speeds = config.level_speeds()?;
        let maze = Maze::parse(config.layout.as_slice())?;
        let player = Player::new(maze.player_start(), config.player_speed, AGENT_RADIUS);

        let mut engine = Self {
            rng: StdRng::seed_from_u64(config.seed),
            lives: config.starting_lives,
            config,
            level_speeds,
            maze,
            player,
            pursuers: Vec::new(),
            pellets: Vec::new(),
            power_items: Vec::new(),
            score: 0,
            level: 1,
            state: GameState::Ready,
            pending_intent: None,
            transition: None,
            events: Vec::new(),
            score_listeners: Vec::new(),
            state_listeners: Vec::new(),
            last_frame_at: None,
            tick_counter: 0,
            fault: None,
            torn_down: false,
        };
        engine.populate_level();
        info!(
            width = engine.maze.width(),
            height = engine.maze.height(),
            pellets = engine.pellets.len(),
            power_items = engine.power_items.len(),
            seed = engine.config.seed,
            "engine ready"
        );
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn score_update(&self) -> ScoreUpdate {
        ScoreUpdate {
            score: self.score,
            level: self.level,
            lives: self.lives,
        }
    }

    pub fn on_score_update<F>(&mut self, listener: F)
    where
        F: FnMut(ScoreUpdate) + 'static,
    {
        self.score_listeners.push(Box::new(listener));
    }

    pub fn on_game_state_change<F>(&mut self, listener: F)
    where
        F: FnMut(GameState) + 'static,
    {
        self.state_listeners.push(Box::new(listener));
    }

    /// READY or a user pause → PLAYING. Ignored everywhere else, including
    /// while a respawn or level delay is pending.
    pub fn start(&mut self) {
        if self.torn_down {
            return;
        }
        let resumable = match self.state {
            GameState::Ready => true,
            GameState::Paused => self.transition.is_none(),
            _ => false,
        };
        if !resumable {
            debug!(state = ?self.state, "start ignored");
            return;
        }
        self.last_frame_at = None;
        self.set_state(GameState::Playing);
    }

    pub fn pause(&mut self) {
        if self.torn_down || self.state != GameState::Playing || self.transition.is_some() {
            debug!(state = ?self.state, "pause ignored");
            return;
        }
        self.last_frame_at = None;
        self.set_state(GameState::Paused);
    }

    /// Back to level 1 with a fresh maze population. Clears any latched fault.
    pub fn reset(&mut self) {
        if self.torn_down {
            return;
        }
        self.score = 0;
        self.level = 1;
        self.lives = self.config.starting_lives;
        self.transition = None;
        self.last_frame_at = None;
        self.tick_counter = 0;
        self.fault = None;
        self.events.clear();
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.populate_level();
        self.notify_score();
        self.set_state(GameState::Ready);
    }

    pub fn submit_intent(&mut self, intent: Intent) {
        if self.torn_down {
            return;
        }
        match intent {
            Intent::Move { dir } => {
                if self.state == GameState::Playing && self.transition.is_none() {
                    self.pending_intent = Some(dir);
                } else {
                    debug!(?dir, state = ?self.state, "move intent ignored");
                }
            }
            Intent::TogglePause => match self.state {
                GameState::Playing => self.pause(),
                GameState::Paused => self.start(),
                _ => debug!(state = ?self.state, "pause toggle ignored"),
            },
        }
    }

    /// Frame callback for an external scheduler. Throttles to the target
    /// rate and feeds the elapsed wall time into [`GameEngine::step`].
    pub fn frame(&mut self, timestamp_ms: f64) -> Result<FrameOutcome, EngineError> {
        if let Some(reason) = &self.fault {
            return Err(EngineError::Halted {
                reason: reason.clone(),
            });
        }
        if self.torn_down || !self.clock_running() {
            self.last_frame_at = None;
            return Ok(FrameOutcome::Idle);
        }

        let interval = self.config.frame_interval_ms();
        // A timestamp behind the last frame means the caller's clock
        // restarted; treat it as a first frame.
        let elapsed = match self.last_frame_at {
            Some(last) if timestamp_ms >= last => {
                let elapsed = timestamp_ms - last;
                if elapsed < interval {
                    return Ok(FrameOutcome::Throttled);
                }
                elapsed
            }
            Some(last) => {
                debug!(last, timestamp_ms, "frame clock went backwards");
                interval
            }
            None => interval,
        };
        self.last_frame_at = Some(timestamp_ms);

        let gameplay = self.transition.is_none();
        self.step(elapsed.round().max(0.0) as u64)?;
        if gameplay {
            Ok(FrameOutcome::Ticked)
        } else {
            Ok(FrameOutcome::Waiting)
        }
    }

    /// Advances the session by `dt_ms` of engine time. Outside PLAYING only
    /// a pending respawn or level delay moves.
    pub fn step(&mut self, dt_ms: u64) -> Result<(), EngineError> {
        if let Some(reason) = &self.fault {
            return Err(EngineError::Halted {
                reason: reason.clone(),
            });
        }
        if self.torn_down {
            return Ok(());
        }
        if self.transition.is_some() {
            self.advance_transition(dt_ms);
            return Ok(());
        }
        if self.state != GameState::Playing {
            return Ok(());
        }

        self.tick_counter += 1;
        self.advance_gameplay_timers(dt_ms);
        self.apply_pending_intent();
        self.move_player();
        self.player.update_mouth();
        self.move_pursuers();
        self.resolve_collisions();
        self.verify_footprints()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            score: self.score,
            level: self.level,
            lives: self.lives,
            state: self.state,
            player: self.player.view(),
            pursuers: self.pursuers.iter().map(Pursuer::view).collect(),
            pellets: self.pellets.clone(),
            power_items: self.power_items.clone(),
            power_flashing: self.player.is_powered()
                && self.player.power_remaining_ms() < POWER_FLASH_MS,
            respawning: matches!(
                self.transition,
                Some(PendingTransition {
                    kind: TransitionKind::Respawn,
                    ..
                })
            ),
            torn_down: self.torn_down,
        }
    }

    pub fn drain_events(&mut self) -> Vec<RuntimeEvent> {
        mem::take(&mut self.events)
    }

    /// Stops the clock and drops every pending timer. Safe to call twice.
    /// The state is left as it was; snapshots report `torn_down` from here on.
    pub fn cleanup(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.transition = None;
        self.pending_intent = None;
        self.last_frame_at = None;
        self.player.cancel_power();
        info!(
            score = self.score,
            level = self.level,
            ticks = self.tick_counter,
            "engine torn down"
        );
    }

    fn clock_running(&self) -> bool {
        self.transition.is_some() || self.state == GameState::Playing
    }

    /// Refills consumables, rebuilds pursuers at the current level speed and
    /// returns the player to its start.
    fn populate_level(&mut self) {
        self.pellets = self.maze.pellets().to_vec();
        self.power_items = self.maze.power_items().to_vec();
        let speed = self.level_speeds.for_level(self.level);
        self.pursuers = build_pursuers(&self.maze, &self.config, speed);
        self.player.reset(self.maze.player_start());
        self.pending_intent = None;
    }

    fn set_state(&mut self, next: GameState) {
        if self.state == next {
            return;
        }
        info!(from = ?self.state, to = ?next, level = self.level, "game state changed");
        self.state = next;
        for listener in &mut self.state_listeners {
            listener(next);
        }
    }

    fn notify_score(&mut self) {
        let update = self.score_update();
        for listener in &mut self.score_listeners {
            listener(update);
        }
    }
}

fn build_pursuers(maze: &Maze, config: &EngineConfig, speed: f32) -> Vec<Pursuer> {
    PursuerKind::ALL
        .into_iter()
        .map(|kind| {
            Pursuer::new(
                kind,
                maze.pursuer_start(kind),
                maze.home_corner(kind),
                AGENT_RADIUS,
                speed,
                config.scared_speed,
                ModeCycle::new(config.scatter_ms, config.chase_ms),
            )
        })
        .collect()
}
