//! Piece placement notation (the first field of a FEN record).
//!
//! Placement strings describe which piece stands on which square, rank 8
//! first, using the usual FEN letters. They are used to set up arbitrary
//! boards and to serialize final positions.

use crate::{Color, Piece, Square};
use thiserror::Error;

/// Errors that can occur when parsing placement strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("invalid placement: expected 8 ranks, got {0}")]
    InvalidRankCount(usize),

    #[error("invalid character '{found}' in rank {rank}")]
    InvalidCharacter { found: char, rank: usize },

    #[error("rank {rank} has {squares} squares, expected 8")]
    InvalidRankLength { rank: usize, squares: u32 },
}

/// A validated piece placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pieces: Vec<(Square, Piece, Color)>,
}

impl Placement {
    /// The standard starting arrangement.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    /// Parses a placement string. A full FEN record is accepted as well; only
    /// its first field is read.
    pub fn parse(text: &str) -> Result<Self, PlacementError> {
        let field = text.split_whitespace().next().unwrap_or("");
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(PlacementError::InvalidRankCount(ranks.len()));
        }

        let mut pieces = Vec::new();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0u32;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip;
                } else if let Some((piece, color)) = Piece::from_placement_char(c) {
                    if let Some(sq) = Square::new(row as u8, col as u8) {
                        pieces.push((sq, piece, color));
                    }
                    col += 1;
                } else {
                    return Err(PlacementError::InvalidCharacter {
                        found: c,
                        rank: 8 - row,
                    });
                }
            }
            if col != 8 {
                return Err(PlacementError::InvalidRankLength {
                    rank: 8 - row,
                    squares: col,
                });
            }
        }

        Ok(Placement { pieces })
    }

    /// Returns the pieces in row-major order of their squares.
    pub fn pieces(&self) -> &[(Square, Piece, Color)] {
        &self.pieces
    }

    /// Writes a placement string from a per-square lookup.
    pub fn render<F>(mut lookup: F) -> String
    where
        F: FnMut(Square) -> Option<(Piece, Color)>,
    {
        let mut out = String::with_capacity(72);
        for row in 0..8u8 {
            let mut empty = 0;
            for col in 0..8u8 {
                let occupant = Square::new(row, col).and_then(&mut lookup);
                match occupant {
                    Some((piece, color)) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.to_placement_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if row < 7 {
                out.push('/');
            }
        }
        out
    }
}
