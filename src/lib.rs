//! Space Shooter — a fixed-rate arcade shooter simulation.
//!
//! Core modules:
//! - `entities`: pure data (rects, ids, player, projectiles, adversaries)
//! - `compute`: per-tick world rules
//! - `collision`: projectile ↔ adversary resolution
//! - `game`: round state machine, command surface, render boundary
//! - `score` / `store`: scoring, leaderboard and their persistence ports
//! - `clock` / `input`: timing and held-control sampling

pub mod clock;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod game;
pub mod input;
pub mod score;
pub mod spawn;
pub mod store;

pub use config::Rules;
pub use error::{Error, Result};
pub use game::{Game, RenderSink, RoundSummary, Snapshot, TickOutcome};
