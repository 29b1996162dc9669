//! # stackfall
//!
//! Simulation engine for a falling-block puzzle game.
//!
//! ## Overview
//!
//! The `stackfall` library owns everything that decides how the game plays:
//! the grid of locked cells, the falling piece, rotation and collision rules,
//! gravity with a lock delay, and line clearing. It has no notion of a screen
//! or a clock; a front end calls [`Engine::tick`] at a fixed rate and draws
//! the returned [`RenderState`].
//!
//! ## Key Features
//!
//! - Headless, deterministic simulation driven one tick at a time
//! - Injected piece kind source for seeded or scripted games
//! - Silent rejection of illegal moves and rotations
//! - Serializable snapshots for renderers and tooling
//!
//! ## Example
//!
//! ```rust
//! use stackfall::{Engine, EngineConfig, Flow, InputIntents};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::seeded(EngineConfig::default(), 7)?;
//!
//!     let outcome = engine.tick(InputIntents::left());
//!     assert_eq!(outcome.flow, Flow::Continue);
//!     assert!(outcome.state.piece.is_some());
//!
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod input;
pub mod kinds;
pub mod piece;
pub mod state;

// Re-exports for convenience
pub use config::EngineConfig;
pub use engine::{Engine, Flow, TickEvents, TickOutcome};
pub use error::{Result, StackfallError};
pub use grid::{CellType, Grid};
pub use input::InputIntents;
pub use kinds::{KindSource, RandomKinds, SequenceKinds};
pub use piece::{check_collision, rotate, FallSpeed, Piece, PieceKind, Position, Shape};
pub use state::{PieceView, RenderState};
