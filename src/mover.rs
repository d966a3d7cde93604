use crate::types::{Direction, Vec2};

/// Motion and hitbox state shared by the player and the pursuers.
#[derive(Clone, Debug, PartialEq)]
pub struct Mover {
    pub pos: Vec2,
    pub dir: Direction,
    pub speed: f32,
    pub radius: f32,
}

impl Mover {
    pub fn new(pos: Vec2, speed: f32, radius: f32) -> Self {
        Self {
            pos,
            dir: Direction::Right,
            speed,
            radius,
        }
    }

    /// Where one step along `dir` would land.
    pub fn candidate(&self, dir: Direction) -> Vec2 {
        self.pos.offset(dir, self.speed)
    }

    /// Moves one step along the current heading if the landing spot is
    /// traversable. A blocked step leaves the position untouched.
    pub fn step(&mut self, traversable: &dyn Fn(Vec2) -> bool) -> bool {
        let next = self.candidate(self.dir);
        if !traversable(next) {
            return false;
        }
        self.pos = next;
        true
    }

    pub fn collides_with(&self, other: &Mover, hitbox_factor: f32) -> bool {
        self.pos.distance(other.pos) < (self.radius + other.radius) * hitbox_factor
    }
}

/// Anything the engine can advance along the grid.
pub trait Mobile {
    fn mover(&self) -> &Mover;

    fn mover_mut(&mut self) -> &mut Mover;

    fn advance(&mut self, traversable: &dyn Fn(Vec2) -> bool) -> bool {
        self.mover_mut().step(traversable)
    }

    fn pos(&self) -> Vec2 {
        self.mover().pos
    }

    fn dir(&self) -> Direction {
        self.mover().dir
    }

    fn collides_with<O: Mobile + ?Sized>(&self, other: &O, hitbox_factor: f32) -> bool {
        self.mover().collides_with(other.mover(), hitbox_factor)
    }
}
