//! PGN Audit - checks recorded chess games for illegal moves.
//!
//! This crate wraps the `chess-referee` engine with everything needed to
//! audit PGN files in bulk.
//!
//! # Modules
//!
//! - [`pgn`] - splits PGN text into games and SAN move lists
//! - [`batch`] - audits games on worker threads, one board per worker
//! - [`config`] - TOML configuration
//! - [`json_output`] - JSON report generation

pub mod batch;
pub mod config;
pub mod json_output;
pub mod pgn;
