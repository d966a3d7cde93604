use std::fmt;

use serde::{Deserialize, Serialize};

/// Cardinal heading. Declaration order is the tie-break order used by
/// pursuer direction selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            Self::Right => 0,
            Self::Down => 90,
            Self::Left => 180,
            Self::Up => 270,
        }
    }

    pub fn radians(self) -> f32 {
        (self.degrees() as f32).to_radians()
    }

    /// Unit step in screen space (y grows downward).
    pub fn unit(self) -> (f32, f32) {
        match self {
            Self::Right => (1.0, 0.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Up => (0.0, -1.0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
        }
    }

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Signal pushed by an input adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    Move { dir: Direction },
    TogglePause,
}

impl Intent {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" => Some(Self::Move {
                dir: Direction::Left,
            }),
            "ArrowRight" | "d" => Some(Self::Move {
                dir: Direction::Right,
            }),
            "ArrowUp" | "w" => Some(Self::Move { dir: Direction::Up }),
            "ArrowDown" | "s" => Some(Self::Move {
                dir: Direction::Down,
            }),
            "p" => Some(Self::TogglePause),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Ready,
    Playing,
    Paused,
    LevelComplete,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerKind {
    Direct,
    Ambush,
    Flank,
    Shy,
}

impl PursuerKind {
    pub const ALL: [PursuerKind; 4] = [
        PursuerKind::Direct,
        PursuerKind::Ambush,
        PursuerKind::Flank,
        PursuerKind::Shy,
    ];

    pub fn marker(self) -> char {
        match self {
            Self::Direct => 'B',
            Self::Ambush => 'K',
            Self::Flank => 'I',
            Self::Shy => 'C',
        }
    }

    pub fn from_marker(marker: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == marker)
    }
}

impl fmt::Display for PursuerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "direct",
            Self::Ambush => "ambush",
            Self::Flank => "flank",
            Self::Shy => "shy",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorMode {
    Scatter,
    Chase,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Vec2) -> f32 {
        self.distance_sq(other).sqrt()
    }

    pub fn offset(self, dir: Direction, amount: f32) -> Vec2 {
        let (ux, uy) = dir.unit();
        Vec2 {
            x: self.x + ux * amount,
            y: self.y + uy * amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub powered: bool,
    #[serde(rename = "mouthAngle")]
    pub mouth_angle: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PursuerView {
    pub kind: PursuerKind,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub scared: bool,
    pub mode: BehaviorMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreUpdate {
    pub score: u32,
    pub level: u32,
    pub lives: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub state: GameState,
    pub player: PlayerView,
    pub pursuers: Vec<PursuerView>,
    pub pellets: Vec<Vec2>,
    #[serde(rename = "powerItems")]
    pub power_items: Vec<Vec2>,
    #[serde(rename = "powerFlashing")]
    pub power_flashing: bool,
    pub respawning: bool,
    /// Set once the engine is cleaned up. Nothing in the snapshot changes
    /// after that.
    #[serde(rename = "tornDown")]
    pub torn_down: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten {
        x: f32,
        y: f32,
    },
    PowerItemEaten {
        x: f32,
        y: f32,
    },
    PursuerEaten {
        kind: PursuerKind,
    },
    PowerEnded,
    PlayerDied {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    LevelCompleted {
        #[serde(rename = "clearedLevel")]
        cleared_level: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_pairs_are_symmetric() {
        for dir in Direction::ALL {
            assert_eq!(dir.reverse().reverse(), dir);
            assert_ne!(dir.reverse(), dir);
            assert_eq!((dir.degrees() + 180) % 360, dir.reverse().degrees());
        }
    }

    #[test]
    fn unit_matches_heading_angle() {
        for dir in Direction::ALL {
            let (ux, uy) = dir.unit();
            assert!((ux - dir.radians().cos()).abs() < 1e-6);
            assert!((uy - dir.radians().sin()).abs() < 1e-6);
        }
    }

    #[test]
    fn keys_map_to_intents() {
        assert_eq!(
            Intent::from_key("ArrowUp"),
            Some(Intent::Move { dir: Direction::Up })
        );
        assert_eq!(
            Intent::from_key("a"),
            Some(Intent::Move {
                dir: Direction::Left
            })
        );
        assert_eq!(Intent::from_key("p"), Some(Intent::TogglePause));
        assert_eq!(Intent::from_key("x"), None);
        assert_eq!(Direction::parse_move("down"), Some(Direction::Down));
        assert_eq!(Direction::parse_move("none"), None);
    }

    #[test]
    fn intents_use_tagged_json() {
        let intent: Intent =
            serde_json::from_str(r#"{"type":"move","dir":"left"}"#).expect("valid intent");
        assert_eq!(
            intent,
            Intent::Move {
                dir: Direction::Left
            }
        );
        let event = serde_json::to_value(RuntimeEvent::PlayerDied { lives_left: 2 })
            .expect("serializes");
        assert_eq!(event["type"], "player_died");
        assert_eq!(event["livesLeft"], 2);
    }

    #[test]
    fn markers_round_trip_through_kind() {
        for kind in PursuerKind::ALL {
            assert_eq!(PursuerKind::from_marker(kind.marker()), Some(kind));
        }
        assert_eq!(PursuerKind::from_marker('P'), None);
    }
}
