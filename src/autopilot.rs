use std::collections::{HashSet, VecDeque};

use crate::maze::{cell_of, Maze};
use crate::types::{Direction, Intent, Snapshot, Vec2};

type CellKey = (i64, i64);

/// Intent source that walks the player toward the nearest consumable,
/// routing around cells held by pursuers that are not scared.
#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    last: Option<Direction>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an intent only when it would change something.
    pub fn next_intent(&mut self, snapshot: &Snapshot, maze: &Maze) -> Option<Intent> {
        let dir = choose_direction(snapshot, maze)?;
        if snapshot.player.dir == dir && self.last == Some(dir) {
            return None;
        }
        self.last = Some(dir);
        Some(Intent::Move { dir })
    }
}

/// First heading of a shortest cell path from the player to any pellet or
/// power item. Falls back to ignoring pursuers when every route is covered.
pub fn choose_direction(snapshot: &Snapshot, maze: &Maze) -> Option<Direction> {
    let start = cell_of(Vec2::new(snapshot.player.x, snapshot.player.y));
    let goals: HashSet<CellKey> = snapshot
        .pellets
        .iter()
        .chain(snapshot.power_items.iter())
        .map(|item| cell_of(*item))
        .collect();
    if goals.is_empty() {
        return None;
    }

    let threats: HashSet<CellKey> = snapshot
        .pursuers
        .iter()
        .filter(|pursuer| !pursuer.scared)
        .map(|pursuer| cell_of(Vec2::new(pursuer.x, pursuer.y)))
        .filter(|cell| *cell != start)
        .collect();

    first_step(maze, start, &goals, &threats)
        .or_else(|| first_step(maze, start, &goals, &HashSet::new()))
}

fn first_step(
    maze: &Maze,
    start: CellKey,
    goals: &HashSet<CellKey>,
    blocked: &HashSet<CellKey>,
) -> Option<Direction> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);

    for dir in Direction::ALL {
        let next = neighbor(start, dir);
        if !maze.is_open_cell(next.0, next.1) || blocked.contains(&next) || !visited.insert(next)
        {
            continue;
        }
        if goals.contains(&next) {
            return Some(dir);
        }
        queue.push_back((next, dir));
    }

    while let Some((cell, first)) = queue.pop_front() {
        for dir in Direction::ALL {
            let next = neighbor(cell, dir);
            if !maze.is_open_cell(next.0, next.1)
                || blocked.contains(&next)
                || !visited.insert(next)
            {
                continue;
            }
            if goals.contains(&next) {
                return Some(first);
            }
            queue.push_back((next, first));
        }
    }

    None
}

fn neighbor((col, row): CellKey, dir: Direction) -> CellKey {
    let (dx, dy) = dir.unit();
    (col + dx as i64, row + dy as i64)
}
