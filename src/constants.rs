pub const TARGET_FPS: u32 = 60;

pub const CELL_SIZE: f32 = 20.0;
pub const AGENT_RADIUS: f32 = CELL_SIZE / 2.0;
pub const PICKUP_RADIUS: f32 = CELL_SIZE / 2.0;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_ITEM_POINTS: u32 = 50;
pub const PURSUER_POINTS: u32 = 200;

pub const STARTING_LIVES: u32 = 3;
pub const POWER_DURATION_MS: u64 = 8_000;
pub const POWER_FLASH_MS: u64 = 3_000;
pub const RESPAWN_DELAY_MS: u64 = 1_000;
pub const LEVEL_TRANSITION_MS: u64 = 2_000;
pub const SCATTER_MS: u64 = 7_000;
pub const CHASE_MS: u64 = 20_000;

pub const PLAYER_SPEED: f32 = 5.0;
pub const SCARED_SPEED: f32 = 1.0;
pub const LEVEL_PURSUER_SPEEDS: [f32; 5] = [1.5, 1.7, 1.9, 2.1, 2.3];

pub const AMBUSH_LOOKAHEAD: f32 = 4.0 * CELL_SIZE;
pub const FLANK_LOOKAHEAD: f32 = 2.0 * CELL_SIZE;
pub const SHY_DISTANCE_IN_DIAMETERS: f32 = 8.0;

pub const MOUTH_START: f32 = 0.2;
pub const MOUTH_STEP: f32 = 0.02;
pub const MOUTH_MAX: f32 = 0.5;

pub const WALL_MARKER: char = '#';
pub const PELLET_MARKER: char = '.';
pub const POWER_ITEM_MARKER: char = 'o';
pub const PLAYER_MARKER: char = 'P';

pub const DEFAULT_LAYOUT: [&str; 20] = [
    "####################",
    "#P...........#.....#",
    "#.####.#####.#.###.#",
    "#o####.#####.#.###o#",
    "#.####.#####.#.###.#",
    "#..................#",
    "#.####.#.######.##.#",
    "#.####.#.######.##.#",
    "#......#...BIKC#...#",
    "######.### # ###.###",
    "     #.#   #   #.#  ",
    "     #.# ##### #.#  ",
    "######.### ###.#####",
    "#............#.....#",
    "#.####.#####.#.###.#",
    "#o..##.......##..o.#",
    "###.##.#####.##.####",
    "###.##.#####.##.####",
    "#......#.....#.....#",
    "####################",
];

/// Pursuer speed for a 1-based level, clamped to the last table entry.
/// `None` only for an empty table.
pub fn get_level_pursuer_speed(table: &[f32], level: u32) -> Option<f32> {
    let index = level.saturating_sub(1) as usize;
    table.get(index).or(table.last()).copied()
}

pub fn get_frame_interval_ms(target_fps: u32) -> f64 {
    if target_fps == 0 {
        return 1000.0 / TARGET_FPS as f64;
    }
    1000.0 / target_fps as f64
}
