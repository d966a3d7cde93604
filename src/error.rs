use std::path::PathBuf;

use crate::types::PursuerKind;

/// Problems detected while building a session. None of these leave a
/// partially started game behind.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("maze layout is empty")]
    EmptyLayout,

    #[error("maze row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("maze has no player start marker")]
    MissingPlayerStart,

    #[error("maze has no start marker for the {kind} pursuer")]
    MissingPursuerStart { kind: PursuerKind },

    #[error("start marker '{marker}' appears more than once (again at row {row}, column {col})")]
    DuplicateMarker { marker: char, row: usize, col: usize },

    #[error("invalid engine configuration: {reason}")]
    Invalid { reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{agent} footprint entered a wall at ({x:.2}, {y:.2})")]
    AgentClipped { agent: String, x: f32, y: f32 },

    #[error("session halted after fault: {reason}")]
    Halted { reason: String },
}
