pub mod autopilot;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod maze;
pub mod mover;
pub mod player;
pub mod pursuer;
pub mod types;
