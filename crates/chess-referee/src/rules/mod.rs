//! Rule set abstraction.
//!
//! A [`RuleSet`] resolves a [`MoveDescriptor`] against a board and applies it.
//! The referee itself keeps no board: it receives a mutable borrow per call,
//! so whoever owns the board decides how it is shared.

mod standard;

pub use standard::StandardRules;

use crate::board::Board;
use crate::violation::Violation;
use chess_core::{MoveDescriptor, Piece, Square};

/// What a successfully applied move did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    /// Resolved source square of the moving piece (the king when castling).
    pub from: Square,
    pub to: Square,
    /// Piece removed from the destination, if any.
    pub captured: Option<Piece>,
    /// Piece placed on the destination when a pawn promoted.
    pub promoted: Option<Piece>,
}

/// Trait for rule sets that can referee a sequence of decoded moves.
pub trait RuleSet {
    /// Returns the board a game under these rules starts from.
    fn initial_board(&self) -> Board;

    /// Resolves `mv` on `board` and applies it.
    ///
    /// On success the board reflects the move and `mv.from` holds the
    /// resolved source square. On failure the board is left untouched.
    fn apply(&self, board: &mut Board, mv: &mut MoveDescriptor) -> Result<AppliedMove, Violation>;
}
