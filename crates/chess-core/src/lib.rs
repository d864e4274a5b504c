//! Core types for chess.
//!
//! This crate provides the fundamental types shared by the referee and its
//! collaborators:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates (row 0 = rank 8)
//! - [`MoveDescriptor`] for decoded, not yet verified moves
//! - [`Placement`] for piece placement strings

mod color;
mod mov;
mod piece;
mod placement;
mod square;

pub use color::Color;
pub use mov::MoveDescriptor;
pub use piece::Piece;
pub use placement::{Placement, PlacementError};
pub use square::{File, Rank, Square};
