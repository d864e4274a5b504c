//! Structured move descriptors.
//!
//! A [`MoveDescriptor`] is what a notation decoder produces for one ply: the
//! declared piece, destination, optional disambiguation hints and the flags
//! carried by the notation. The source square is usually unknown until a
//! referee resolves it against a board.

use crate::{Color, File, Piece, Rank, Square};
use std::fmt;

/// One decoded ply, prior to being checked against a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDescriptor {
    /// The notation this descriptor was decoded from (e.g. "Nbd7+").
    pub notation: String,
    /// Side making the move.
    pub color: Color,
    /// Declared piece kind (Pawn when the notation has no piece letter).
    pub piece: Piece,
    /// Destination square.
    pub to: Square,
    /// Source square. `None` until resolved, except for castling where the
    /// decoder presets the king's home square.
    pub from: Option<Square>,
    /// File hint from the notation (`Nbd7`, `exd5`).
    pub from_file: Option<File>,
    /// Rank hint from the notation (`R1e2`).
    pub from_rank: Option<Rank>,
    pub capture: bool,
    pub check: bool,
    pub checkmate: bool,
    pub castling: bool,
    pub promotion: bool,
    /// Declared promotion piece; see [`MoveDescriptor::promotion_target`].
    pub promotion_piece: Option<Piece>,
}

impl MoveDescriptor {
    /// Creates a quiet move descriptor with no flags set.
    pub fn new(notation: impl Into<String>, color: Color, piece: Piece, to: Square) -> Self {
        MoveDescriptor {
            notation: notation.into(),
            color,
            piece,
            to,
            from: None,
            from_file: None,
            from_rank: None,
            capture: false,
            check: false,
            checkmate: false,
            castling: false,
            promotion: false,
            promotion_piece: None,
        }
    }

    /// Returns the piece a promotion produces, Queen unless declared.
    #[inline]
    pub fn promotion_target(&self) -> Piece {
        self.promotion_piece.unwrap_or(Piece::Queen)
    }

    /// Returns true if the notation claims the move gives check or mate.
    #[inline]
    pub fn claims_check(&self) -> bool {
        self.check || self.checkmate
    }

    /// Returns true if a candidate on `square` survives the disambiguation hints.
    #[inline]
    pub fn matches_hints(&self, square: Square) -> bool {
        self.from_file.map_or(true, |f| f.col() == square.col())
            && self.from_rank.map_or(true, |r| r.row() == square.row())
    }
}

impl fmt::Display for MoveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.notation, self.color, self.piece)
    }
}
