use std::collections::BTreeMap;

use crate::constants::{
    CELL_SIZE, PELLET_MARKER, PLAYER_MARKER, POWER_ITEM_MARKER, WALL_MARKER,
};
use crate::error::ConfigError;
use crate::types::{PursuerKind, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Open,
}

/// Immutable maze parsed from a text layout. Positions handed out by the
/// maze are cell centers in continuous coordinates.
#[derive(Clone, Debug)]
pub struct Maze {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    rows: Vec<String>,
    player_start: Vec2,
    /// One start per kind, indexed by `PursuerKind` discriminant.
    pursuer_starts: [Vec2; 4],
    pellets: Vec<Vec2>,
    power_items: Vec<Vec2>,
}

impl Maze {
    pub fn parse<S: AsRef<str>>(layout: &[S]) -> Result<Self, ConfigError> {
        let Some(first) = layout.first() else {
            return Err(ConfigError::EmptyLayout);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(ConfigError::EmptyLayout);
        }
        let height = layout.len();

        let mut cells = Vec::with_capacity(width * height);
        let mut player_start = None;
        let mut found_pursuers = BTreeMap::new();
        let mut pellets = Vec::new();
        let mut power_items = Vec::new();

        for (row, line) in layout.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(ConfigError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }

            for (col, marker) in line.chars().enumerate() {
                let center = cell_center(col as i64, row as i64);
                if marker == WALL_MARKER {
                    cells.push(Cell::Wall);
                    continue;
                }
                cells.push(Cell::Open);

                match marker {
                    PELLET_MARKER => pellets.push(center),
                    POWER_ITEM_MARKER => power_items.push(center),
                    PLAYER_MARKER => {
                        if player_start.replace(center).is_some() {
                            return Err(ConfigError::DuplicateMarker { marker, row, col });
                        }
                    }
                    other => {
                        if let Some(kind) = PursuerKind::from_marker(other) {
                            if found_pursuers.insert(kind, center).is_some() {
                                return Err(ConfigError::DuplicateMarker { marker, row, col });
                            }
                        }
                    }
                }
            }
        }

        let player_start = player_start.ok_or(ConfigError::MissingPlayerStart)?;
        let mut pursuer_starts = [player_start; 4];
        for (slot, kind) in pursuer_starts.iter_mut().zip(PursuerKind::ALL) {
            *slot = found_pursuers
                .get(&kind)
                .copied()
                .ok_or(ConfigError::MissingPursuerStart { kind })?;
        }

        Ok(Self {
            width,
            height,
            cells,
            rows: layout.iter().map(|row| row.as_ref().to_string()).collect(),
            player_start,
            pursuer_starts,
            pellets,
            power_items,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * CELL_SIZE
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * CELL_SIZE
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn player_start(&self) -> Vec2 {
        self.player_start
    }

    pub fn pursuer_start(&self, kind: PursuerKind) -> Vec2 {
        self.pursuer_starts[kind as usize]
    }

    pub fn pellets(&self) -> &[Vec2] {
        &self.pellets
    }

    pub fn power_items(&self) -> &[Vec2] {
        &self.power_items
    }

    /// Scatter corner for each pursuer identity.
    pub fn home_corner(&self, kind: PursuerKind) -> Vec2 {
        let w = self.pixel_width();
        let h = self.pixel_height();
        match kind {
            PursuerKind::Direct => Vec2::new(w, 0.0),
            PursuerKind::Ambush => Vec2::new(0.0, 0.0),
            PursuerKind::Flank => Vec2::new(w, h),
            PursuerKind::Shy => Vec2::new(0.0, h),
        }
    }

    pub fn cell_at(&self, col: i64, row: i64) -> Option<Cell> {
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return None;
        }
        self.cells
            .get(row as usize * self.width + col as usize)
            .copied()
    }

    pub fn is_open_cell(&self, col: i64, row: i64) -> bool {
        self.cell_at(col, row) == Some(Cell::Open)
    }

    /// Single-point traversability check.
    pub fn can_occupy(&self, x: f32, y: f32) -> bool {
        let (col, row) = cell_of(Vec2::new(x, y));
        self.is_open_cell(col, row)
    }

    /// Footprint check: the center plus four points `radius - 1` out along
    /// each axis must all be open.
    pub fn footprint_clear(&self, pos: Vec2, radius: f32) -> bool {
        let reach = radius - 1.0;
        [
            (pos.x, pos.y),
            (pos.x + reach, pos.y),
            (pos.x - reach, pos.y),
            (pos.x, pos.y + reach),
            (pos.x, pos.y - reach),
        ]
        .into_iter()
        .all(|(x, y)| self.can_occupy(x, y))
    }
}

pub fn cell_of(pos: Vec2) -> (i64, i64) {
    (
        (pos.x / CELL_SIZE).floor() as i64,
        (pos.y / CELL_SIZE).floor() as i64,
    )
}

pub fn cell_center(col: i64, row: i64) -> Vec2 {
    Vec2::new(
        (col as f32 + 0.5) * CELL_SIZE,
        (row as f32 + 0.5) * CELL_SIZE,
    )
}

/// Center of the cell containing `pos`.
pub fn snap_to_center(pos: Vec2) -> Vec2 {
    let (col, row) = cell_of(pos);
    cell_center(col, row)
}

#[cfg(test)]
mod tests {
    use crate::constants::DEFAULT_LAYOUT;
    use crate::error::ConfigError;
    use crate::types::{PursuerKind, Vec2};

    use super::{cell_of, snap_to_center, Maze};

    const SMALL: [&str; 5] = [
        "#######",
        "#P.o..#",
        "#.###.#",
        "#BKIC.#",
        "#######",
    ];

    #[test]
    fn default_layout_parses() {
        let maze = Maze::parse(&DEFAULT_LAYOUT).expect("default layout is valid");
        assert_eq!(maze.width(), 20);
        assert_eq!(maze.height(), 20);
        assert_eq!(maze.player_start(), Vec2::new(30.0, 30.0));
        assert_eq!(maze.power_items().len(), 4);
        assert!(!maze.pellets().is_empty());
        assert_eq!(maze.pursuer_start(PursuerKind::Direct), Vec2::new(230.0, 170.0));
    }

    #[test]
    fn each_pursuer_starts_on_its_own_marker() {
        let maze = Maze::parse(&SMALL).expect("small layout is valid");
        assert_eq!(maze.pursuer_start(PursuerKind::Direct), Vec2::new(30.0, 70.0));
        assert_eq!(maze.pursuer_start(PursuerKind::Ambush), Vec2::new(50.0, 70.0));
        assert_eq!(maze.pursuer_start(PursuerKind::Flank), Vec2::new(70.0, 70.0));
        assert_eq!(maze.pursuer_start(PursuerKind::Shy), Vec2::new(90.0, 70.0));
    }

    #[test]
    fn missing_player_start_is_config_error() {
        let layout = ["#####", "#.BK#", "#IC.#", "#####"];
        assert!(matches!(
            Maze::parse(&layout),
            Err(ConfigError::MissingPlayerStart)
        ));
    }

    #[test]
    fn missing_pursuer_start_names_the_kind() {
        let layout = ["#####", "#PBK#", "#I..#", "#####"];
        assert!(matches!(
            Maze::parse(&layout),
            Err(ConfigError::MissingPursuerStart {
                kind: PursuerKind::Shy
            })
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let layout = ["#####", "#PBKIC#", "#####"];
        assert!(matches!(
            Maze::parse(&layout),
            Err(ConfigError::RaggedRow { row: 1, .. })
        ));
    }

    #[test]
    fn duplicate_start_marker_is_rejected() {
        let layout = ["#######", "#PBKIC#", "#P....#", "#######"];
        assert!(matches!(
            Maze::parse(&layout),
            Err(ConfigError::DuplicateMarker { marker: 'P', row: 2, col: 1 })
        ));
    }

    #[test]
    fn empty_layout_is_rejected() {
        let layout: [&str; 0] = [];
        assert!(matches!(Maze::parse(&layout), Err(ConfigError::EmptyLayout)));
    }

    #[test]
    fn walls_and_out_of_bounds_are_not_occupiable() {
        let maze = Maze::parse(&SMALL).expect("valid");
        assert!(!maze.can_occupy(5.0, 5.0));
        assert!(!maze.can_occupy(-1.0, 30.0));
        assert!(!maze.can_occupy(30.0, -0.5));
        assert!(!maze.can_occupy(140.0, 30.0));
        assert!(!maze.can_occupy(30.0, 100.0));
        assert!(!maze.can_occupy(50.0, 50.0));
    }

    #[test]
    fn open_cell_interiors_are_occupiable() {
        let maze = Maze::parse(&SMALL).expect("valid");
        for row in 0..maze.height() as i64 {
            for col in 0..maze.width() as i64 {
                if !maze.is_open_cell(col, row) {
                    continue;
                }
                for (fx, fy) in [(0.01, 0.01), (0.5, 0.5), (0.99, 0.99), (0.2, 0.8)] {
                    let x = (col as f32 + fx) * 20.0;
                    let y = (row as f32 + fy) * 20.0;
                    assert!(maze.can_occupy(x, y), "({x}, {y}) should be open");
                }
            }
        }
    }

    #[test]
    fn footprint_rejects_positions_overlapping_walls() {
        let maze = Maze::parse(&SMALL).expect("valid");
        assert!(maze.footprint_clear(Vec2::new(30.0, 30.0), 10.0));
        assert!(maze.footprint_clear(Vec2::new(35.0, 30.0), 10.0));
        // one step down from the top corridor would put the bottom edge in a wall
        assert!(!maze.footprint_clear(Vec2::new(50.0, 32.0), 10.0));
        assert!(!maze.footprint_clear(Vec2::new(20.5, 30.0), 10.0));
    }

    #[test]
    fn snapping_returns_containing_cell_center() {
        assert_eq!(cell_of(Vec2::new(39.9, 20.0)), (1, 1));
        assert_eq!(snap_to_center(Vec2::new(32.4, 27.6)), Vec2::new(30.0, 30.0));
    }

    #[test]
    fn home_corners_follow_maze_extent() {
        let maze = Maze::parse(&SMALL).expect("valid");
        assert_eq!(maze.home_corner(PursuerKind::Direct), Vec2::new(140.0, 0.0));
        assert_eq!(maze.home_corner(PursuerKind::Ambush), Vec2::new(0.0, 0.0));
        assert_eq!(maze.home_corner(PursuerKind::Flank), Vec2::new(140.0, 100.0));
        assert_eq!(maze.home_corner(PursuerKind::Shy), Vec2::new(0.0, 100.0));
    }
}
