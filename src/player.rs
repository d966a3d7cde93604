use crate::constants::{MOUTH_MAX, MOUTH_START, MOUTH_STEP};
use crate::mover::{Mobile, Mover};
use crate::types::{Direction, PlayerView, Vec2};

#[derive(Clone, Debug)]
pub struct Player {
    mover: Mover,
    mouth_angle: f32,
    mouth_opening: bool,
    powered: bool,
    power_remaining_ms: u64,
}

impl Player {
    pub fn new(spawn: Vec2, speed: f32, radius: f32) -> Self {
        Self {
            mover: Mover::new(spawn, speed, radius),
            mouth_angle: MOUTH_START,
            mouth_opening: true,
            powered: false,
            power_remaining_ms: 0,
        }
    }

    /// Cosmetic triangle wave in `[0, MOUTH_MAX]`.
    pub fn update_mouth(&mut self) {
        if self.mouth_opening {
            self.mouth_angle += MOUTH_STEP;
        } else {
            self.mouth_angle -= MOUTH_STEP;
        }
        if self.mouth_angle >= MOUTH_MAX {
            self.mouth_angle = MOUTH_MAX;
            self.mouth_opening = false;
        } else if self.mouth_angle <= 0.0 {
            self.mouth_angle = 0.0;
            self.mouth_opening = true;
        }
    }

    pub fn mouth_angle(&self) -> f32 {
        self.mouth_angle
    }

    /// (Re)starts the power countdown. A second activation replaces the
    /// remaining time instead of adding to it.
    pub fn activate_power_mode(&mut self, duration_ms: u64) {
        self.powered = duration_ms > 0;
        self.power_remaining_ms = duration_ms;
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn power_remaining_ms(&self) -> u64 {
        self.power_remaining_ms
    }

    /// Advances the power countdown. Returns true on the tick it runs out.
    pub fn tick_power(&mut self, dt_ms: u64) -> bool {
        if !self.powered {
            return false;
        }
        self.power_remaining_ms = self.power_remaining_ms.saturating_sub(dt_ms);
        if self.power_remaining_ms > 0 {
            return false;
        }
        self.powered = false;
        true
    }

    pub fn cancel_power(&mut self) {
        self.powered = false;
        self.power_remaining_ms = 0;
    }

    pub fn reset(&mut self, spawn: Vec2) {
        self.mover.pos = spawn;
        self.mover.dir = Direction::Right;
        self.cancel_power();
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            x: self.mover.pos.x,
            y: self.mover.pos.y,
            dir: self.mover.dir,
            powered: self.powered,
            mouth_angle: self.mouth_angle,
        }
    }
}

impl Mobile for Player {
    fn mover(&self) -> &Mover {
        &self.mover
    }

    fn mover_mut(&mut self) -> &mut Mover {
        &mut self.mover
    }
}
