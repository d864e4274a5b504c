//! Rule violations recorded while replaying a game.
//!
//! Violations are data, not faults: the referee returns them, the game
//! evaluator stops at the first one and reports it.

use chess_core::{Color, Piece, Square};
use std::fmt;
use thiserror::Error;

/// Declared category of a move, used to explain why no candidate qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveCategory {
    Capture,
    Promotion,
    Castling,
    Check,
    Plain,
}

impl MoveCategory {
    /// Explanation attached to a failed move of this category.
    pub const fn hint(self) -> &'static str {
        match self {
            MoveCategory::Capture => "no valid capture found at target square",
            MoveCategory::Promotion => "cannot promote at the specified position",
            MoveCategory::Castling => "castling not possible in current position",
            MoveCategory::Check => "move would not result in check",
            MoveCategory::Plain => "no legal path to destination",
        }
    }
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveCategory::Capture => "capture",
            MoveCategory::Promotion => "promotion",
            MoveCategory::Castling => "castling",
            MoveCategory::Check => "check",
            MoveCategory::Plain => "move",
        };
        write!(f, "{}", name)
    }
}

/// Why a promotion was rejected before any candidate was tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PromotionFault {
    #[error("only pawns can promote, not a {0}")]
    NotAPawn(Piece),
    #[error("{0} is not on the promotion rank")]
    WrongRank(Square),
    #[error("cannot promote to a {0}")]
    InvalidTarget(Piece),
}

/// Why castling was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CastlingFault {
    #[error("{0} is not a castling destination")]
    InvalidDestination(Square),
    #[error("no king on {0}")]
    KingMissing(Square),
    #[error("the king has already moved")]
    KingMoved,
    #[error("no rook on {0}")]
    RookMissing(Square),
    #[error("the rook has already moved")]
    RookMoved,
    #[error("{0} lies between king and rook and is occupied")]
    PathBlocked(Square),
    #[error("the king would pass through or land on attacked square {0}")]
    SquareAttacked(Square),
}

/// A rule violation found while applying one move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// No piece of the declared kind and color is on the board at all.
    #[error("no {color} {piece} found on the board for {notation}")]
    NoCandidate {
        notation: String,
        color: Color,
        piece: Piece,
    },

    /// Candidates exist, but none satisfies the rule for the declared category.
    #[error("invalid move {notation} for {color} {piece}: {}", .category.hint())]
    NoLegalCandidate {
        notation: String,
        color: Color,
        piece: Piece,
        category: MoveCategory,
    },

    #[error("illegal promotion {notation}: {fault}")]
    IllegalPromotion {
        notation: String,
        fault: PromotionFault,
    },

    #[error("illegal castling {notation}: {fault}")]
    IllegalCastling {
        notation: String,
        fault: CastlingFault,
    },

    /// Check could not be verified because the board does not hold exactly
    /// one king of `color`.
    #[error("cannot verify {notation}: expected one {color} king, found {found}")]
    AmbiguousKingLookup {
        notation: String,
        color: Color,
        found: usize,
    },
}

impl Violation {
    /// Returns the notation of the offending move.
    pub fn notation(&self) -> &str {
        match self {
            Violation::NoCandidate { notation, .. }
            | Violation::NoLegalCandidate { notation, .. }
            | Violation::IllegalPromotion { notation, .. }
            | Violation::IllegalCastling { notation, .. }
            | Violation::AmbiguousKingLookup { notation, .. } => notation,
        }
    }
}
