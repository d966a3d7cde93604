use rand::Rng;

use crate::constants::{AMBUSH_LOOKAHEAD, FLANK_LOOKAHEAD, SHY_DISTANCE_IN_DIAMETERS};
use crate::mover::{Mobile, Mover};
use crate::types::{BehaviorMode, Direction, PursuerKind, PursuerView, Vec2};

/// Repeating scatter/chase timer driven by engine time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeCycle {
    mode: BehaviorMode,
    elapsed_ms: u64,
    scatter_ms: u64,
    chase_ms: u64,
}

impl ModeCycle {
    pub fn new(scatter_ms: u64, chase_ms: u64) -> Self {
        Self {
            mode: BehaviorMode::Scatter,
            elapsed_ms: 0,
            scatter_ms: scatter_ms.max(1),
            chase_ms: chase_ms.max(1),
        }
    }

    pub fn mode(&self) -> BehaviorMode {
        self.mode
    }

    fn phase_length(&self) -> u64 {
        match self.mode {
            BehaviorMode::Scatter => self.scatter_ms,
            BehaviorMode::Chase => self.chase_ms,
        }
    }

    /// Returns the new mode if at least one phase boundary was crossed.
    pub fn advance(&mut self, dt_ms: u64) -> Option<BehaviorMode> {
        let mut crossed = false;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        while self.elapsed_ms >= self.phase_length() {
            self.elapsed_ms -= self.phase_length();
            self.mode = match self.mode {
                BehaviorMode::Scatter => BehaviorMode::Chase,
                BehaviorMode::Chase => BehaviorMode::Scatter,
            };
            crossed = true;
        }
        crossed.then_some(self.mode)
    }
}

/// What a pursuer knows about the player when choosing a heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quarry {
    pub pos: Vec2,
    pub dir: Direction,
}

#[derive(Clone, Debug)]
pub struct Pursuer {
    kind: PursuerKind,
    mover: Mover,
    spawn: Vec2,
    home: Vec2,
    cycle: ModeCycle,
    scared: bool,
    level_speed: f32,
    scared_speed: f32,
}

impl Pursuer {
    pub fn new(
        kind: PursuerKind,
        spawn: Vec2,
        home: Vec2,
        radius: f32,
        level_speed: f32,
        scared_speed: f32,
        cycle: ModeCycle,
    ) -> Self {
        Self {
            kind,
            mover: Mover::new(spawn, level_speed, radius),
            spawn,
            home,
            cycle,
            scared: false,
            level_speed,
            scared_speed,
        }
    }

    pub fn kind(&self) -> PursuerKind {
        self.kind
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn mode(&self) -> BehaviorMode {
        self.cycle.mode()
    }

    pub fn is_scared(&self) -> bool {
        self.scared
    }

    pub fn advance_cycle(&mut self, dt_ms: u64) -> Option<BehaviorMode> {
        self.cycle.advance(dt_ms)
    }

    /// Chase/scatter target, or `None` while scared.
    pub fn target(&self, quarry: &Quarry) -> Option<Vec2> {
        if self.scared {
            return None;
        }
        if self.cycle.mode() == BehaviorMode::Scatter {
            return Some(self.home);
        }
        let target = match self.kind {
            PursuerKind::Direct => quarry.pos,
            PursuerKind::Ambush => quarry.pos.offset(quarry.dir, AMBUSH_LOOKAHEAD),
            PursuerKind::Flank => quarry.pos.offset(quarry.dir, FLANK_LOOKAHEAD),
            PursuerKind::Shy => {
                let diameter = self.mover.radius * 2.0;
                if self.mover.pos.distance(quarry.pos) > SHY_DISTANCE_IN_DIAMETERS * diameter {
                    quarry.pos
                } else {
                    self.home
                }
            }
        };
        Some(target)
    }

    /// Picks and stores the heading for this tick.
    pub fn choose_heading<R: Rng>(
        &mut self,
        quarry: &Quarry,
        traversable: &dyn Fn(Vec2) -> bool,
        rng: &mut R,
    ) -> Direction {
        let options = legal_headings(&self.mover, traversable);
        let next = match self.target(quarry) {
            Some(target) => closest_heading(&self.mover, &options, target),
            None if options.is_empty() => None,
            None => Some(options[rng.random_range(0..options.len())]),
        };
        if let Some(dir) = next {
            self.mover.dir = dir;
        }
        self.mover.dir
    }

    pub fn scare(&mut self) {
        self.scared = true;
        self.mover.speed = self.scared_speed;
    }

    pub fn unscare(&mut self) {
        self.scared = false;
        self.mover.speed = self.level_speed;
    }

    /// Back to spawn, unscared. The mode cycle keeps running.
    pub fn reset(&mut self) {
        self.mover.pos = self.spawn;
        self.mover.dir = Direction::Right;
        self.unscare();
    }

    pub fn view(&self) -> PursuerView {
        PursuerView {
            kind: self.kind,
            x: self.mover.pos.x,
            y: self.mover.pos.y,
            dir: self.mover.dir,
            scared: self.scared,
            mode: self.cycle.mode(),
        }
    }
}

impl Mobile for Pursuer {
    fn mover(&self) -> &Mover {
        &self.mover
    }

    fn mover_mut(&mut self) -> &mut Mover {
        &mut self.mover
    }
}

/// Legal headings in declaration order, never the reverse of the current
/// heading unless it is the only way out.
fn legal_headings(mover: &Mover, traversable: &dyn Fn(Vec2) -> bool) -> Vec<Direction> {
    let back = mover.dir.reverse();
    let forward: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|dir| *dir != back && traversable(mover.candidate(*dir)))
        .collect();
    if !forward.is_empty() {
        return forward;
    }
    if traversable(mover.candidate(back)) {
        return vec![back];
    }
    Vec::new()
}

fn closest_heading(mover: &Mover, options: &[Direction], target: Vec2) -> Option<Direction> {
    let mut best: Option<(Direction, f32)> = None;
    for dir in options {
        let dist = mover.candidate(*dir).distance_sq(target);
        if best.map(|(_, best_dist)| dist < best_dist).unwrap_or(true) {
            best = Some((*dir, dist));
        }
    }
    best.map(|(dir, _)| dir)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::constants::{CHASE_MS, SCATTER_MS};
    use crate::maze::Maze;
    use crate::mover::Mobile;
    use crate::types::{BehaviorMode, Direction, PursuerKind, Vec2};

    use super::{ModeCycle, Pursuer, Quarry};

    fn make_pursuer(kind: PursuerKind, pos: Vec2) -> Pursuer {
        Pursuer::new(
            kind,
            pos,
            Vec2::new(400.0, 0.0),
            10.0,
            1.5,
            1.0,
            ModeCycle::new(SCATTER_MS, CHASE_MS),
        )
    }

    fn chasing(kind: PursuerKind, pos: Vec2) -> Pursuer {
        let mut pursuer = make_pursuer(kind, pos);
        pursuer.advance_cycle(SCATTER_MS);
        assert_eq!(pursuer.mode(), BehaviorMode::Chase);
        pursuer
    }

    fn quarry(x: f32, y: f32, dir: Direction) -> Quarry {
        Quarry {
            pos: Vec2::new(x, y),
            dir,
        }
    }

    #[test]
    fn cycle_alternates_scatter_and_chase() {
        let mut cycle = ModeCycle::new(SCATTER_MS, CHASE_MS);
        assert_eq!(cycle.mode(), BehaviorMode::Scatter);
        assert_eq!(cycle.advance(6_999), None);
        assert_eq!(cycle.advance(1), Some(BehaviorMode::Chase));
        assert_eq!(cycle.advance(19_999), None);
        assert_eq!(cycle.advance(1), Some(BehaviorMode::Scatter));
        assert_eq!(cycle.advance(7_000), Some(BehaviorMode::Chase));
    }

    #[test]
    fn direct_tie_breaks_to_right() {
        let mut pursuer = chasing(PursuerKind::Direct, Vec2::new(0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);
        let dir = pursuer.choose_heading(
            &quarry(100.0, 100.0, Direction::Left),
            &|_| true,
            &mut rng,
        );
        assert_eq!(dir, Direction::Right);
    }

    #[test]
    fn direct_picks_strictly_closer_heading() {
        let mut pursuer = chasing(PursuerKind::Direct, Vec2::new(0.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);
        let dir = pursuer.choose_heading(
            &quarry(100.0, 200.0, Direction::Left),
            &|_| true,
            &mut rng,
        );
        assert_eq!(dir, Direction::Down);
    }

    #[test]
    fn ambush_and_flank_lead_the_player() {
        let q = quarry(100.0, 100.0, Direction::Up);
        let ambush = chasing(PursuerKind::Ambush, Vec2::new(0.0, 0.0));
        let flank = chasing(PursuerKind::Flank, Vec2::new(0.0, 0.0));
        assert_eq!(ambush.target(&q), Some(Vec2::new(100.0, 20.0)));
        assert_eq!(flank.target(&q), Some(Vec2::new(100.0, 60.0)));
    }

    #[test]
    fn shy_retreats_when_close() {
        let far = chasing(PursuerKind::Shy, Vec2::new(0.0, 0.0));
        let near = chasing(PursuerKind::Shy, Vec2::new(100.0, 50.0));
        let q = quarry(100.0, 200.0, Direction::Left);
        assert_eq!(far.target(&q), Some(q.pos));
        assert_eq!(near.target(&q), Some(near.home()));
    }

    #[test]
    fn scatter_targets_home_corner() {
        let pursuer = make_pursuer(PursuerKind::Direct, Vec2::new(0.0, 0.0));
        let q = quarry(10.0, 10.0, Direction::Right);
        assert_eq!(pursuer.target(&q), Some(Vec2::new(400.0, 0.0)));
    }

    #[test]
    fn never_reverses_while_another_heading_is_legal() {
        let maze = Maze::parse(&[
            "########",
            "#P.....#",
            "########",
            "#BKIC###",
            "########",
        ])
        .expect("valid");
        let traversable = |pos: Vec2| maze.footprint_clear(pos, 10.0);
        let mut pursuer = chasing(PursuerKind::Direct, Vec2::new(90.0, 30.0));
        let mut rng = StdRng::seed_from_u64(9);
        // target directly behind, corridor continues ahead
        let dir = pursuer.choose_heading(
            &quarry(30.0, 30.0, Direction::Right),
            &traversable,
            &mut rng,
        );
        assert_eq!(dir, Direction::Right);
    }

    #[test]
    fn dead_end_forces_reversal() {
        let maze = Maze::parse(&["########", "#P.....#", "#BKIC###", "########"])
            .expect("valid");
        let traversable = |pos: Vec2| maze.footprint_clear(pos, 10.0);
        let mut pursuer = chasing(PursuerKind::Direct, Vec2::new(130.0, 30.0));
        let mut rng = StdRng::seed_from_u64(9);
        let dir = pursuer.choose_heading(
            &quarry(200.0, 30.0, Direction::Right),
            &traversable,
            &mut rng,
        );
        assert_eq!(dir, Direction::Left);
    }

    #[test]
    fn scared_moves_randomly_without_reversing() {
        let maze = Maze::parse(&[
            "#######",
            "###.###",
            "#..P..#",
            "###.###",
            "#BKIC##",
            "#######",
        ])
        .expect("valid");
        let traversable = |pos: Vec2| maze.footprint_clear(pos, 10.0);
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = Vec::new();
        for _ in 0..64 {
            let mut pursuer = make_pursuer(PursuerKind::Direct, Vec2::new(70.0, 50.0));
            pursuer.scare();
            let dir = pursuer.choose_heading(
                &quarry(70.0, 50.0, Direction::Right),
                &traversable,
                &mut rng,
            );
            assert_ne!(dir, Direction::Left);
            if !seen.contains(&dir) {
                seen.push(dir);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn scare_changes_speed_but_not_cycle() {
        let mut pursuer = make_pursuer(PursuerKind::Flank, Vec2::new(0.0, 0.0));
        pursuer.advance_cycle(3_000);
        pursuer.scare();
        assert!(pursuer.is_scared());
        assert_eq!(pursuer.mover().speed, 1.0);
        assert_eq!(pursuer.advance_cycle(4_000), Some(BehaviorMode::Chase));
        pursuer.unscare();
        assert_eq!(pursuer.mover().speed, 1.5);
        assert_eq!(pursuer.mode(), BehaviorMode::Chase);
    }

    #[test]
    fn reset_returns_to_spawn_and_keeps_cycle() {
        let mut pursuer = chasing(PursuerKind::Ambush, Vec2::new(30.0, 30.0));
        pursuer.mover_mut().pos = Vec2::new(90.0, 90.0);
        pursuer.mover_mut().dir = Direction::Up;
        pursuer.scare();
        pursuer.reset();
        assert_eq!(pursuer.pos(), Vec2::new(30.0, 30.0));
        assert_eq!(pursuer.dir(), Direction::Right);
        assert!(!pursuer.is_scared());
        assert_eq!(pursuer.mover().speed, 1.5);
        assert_eq!(pursuer.mode(), BehaviorMode::Chase);
    }
}
