//! Move legality referee for chess games recorded in algebraic notation.
//!
//! This crate provides:
//! - [`Board`] - 8x8 board of pieces with moved flags
//! - [`movement`] - per-piece movement and capture rules
//! - [`attacks`] - the king-safety oracle
//! - [`RuleSet`] / [`StandardRules`] - move resolution and execution
//! - [`Game`] - replays a move list and reports the first violation
//! - [`san`] - SAN decoding into move descriptors
//!
//! # Example
//!
//! ```
//! use chess_referee::Game;
//!
//! let mut game = Game::new();
//! let report = game.evaluate_san(&["f3", "e5", "g4", "Qh4#"]).unwrap();
//! assert!(report.is_clean());
//!
//! let report = game.evaluate_san(&["e4", "e5", "Ke3"]).unwrap();
//! assert_eq!(report.plies_applied, 2);
//! println!("{}", report);
//! ```

pub mod attacks;
mod board;
mod game;
pub mod movement;
pub mod rules;
pub mod san;
mod simulate;
mod violation;

pub use board::{Board, Occupancy, Occupant, Vacated};
pub use game::{Game, GameReport, GameStatus};
pub use rules::{AppliedMove, RuleSet, StandardRules};
pub use san::{decode, decode_game, DecodeError, SanError};
pub use simulate::Simulation;
pub use violation::{CastlingFault, MoveCategory, PromotionFault, Violation};
