//! Board state.
//!
//! The [`Board`] is an 8x8 grid of optional [`Occupant`]s addressed by
//! [`Square`] (row 0 = rank 8). It owns every piece standing on it: moving a
//! piece transfers it between squares and a captured piece is overwritten.

use chess_core::{Color, Piece, Placement, PlacementError, Square};
use std::fmt;

/// A piece standing on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupant {
    pub piece: Piece,
    pub color: Color,
    /// Set on the first successful move of this piece, never cleared.
    pub moved: bool,
}

impl Occupant {
    /// Creates an occupant that has not moved yet.
    #[inline]
    pub const fn new(piece: Piece, color: Color) -> Self {
        Occupant {
            piece,
            color,
            moved: false,
        }
    }

    /// Returns true if this is a `piece` of `color`.
    #[inline]
    pub fn is(&self, piece: Piece, color: Color) -> bool {
        self.piece == piece && self.color == color
    }
}

/// Read access to which piece stands where.
///
/// The movement rules and the king-safety oracle are written against this
/// trait so they can run on a [`Board`] or on a [`Vacated`] view of one.
pub trait Occupancy {
    /// Returns the occupant of `sq`, if any.
    fn occupant(&self, sq: Square) -> Option<Occupant>;

    /// Returns true if nothing stands on `sq`.
    #[inline]
    fn is_empty(&self, sq: Square) -> bool {
        self.occupant(sq).is_none()
    }

    /// Returns the color of the piece on `sq`, if any.
    #[inline]
    fn color_at(&self, sq: Square) -> Option<Color> {
        self.occupant(sq).map(|o| o.color)
    }
}

/// An 8x8 board of optional occupants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Occupant>; 8]; 8],
}

impl Board {
    /// Creates a board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Creates the standard starting arrangement.
    pub fn startpos() -> Self {
        Self::from_placement(Placement::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a board from a placement string (rank 8 first). Every piece
    /// starts with its moved flag cleared.
    pub fn from_placement(text: &str) -> Result<Self, PlacementError> {
        let placement = Placement::parse(text)?;
        let mut board = Board::empty();
        for &(sq, piece, color) in placement.pieces() {
            board.put(sq, Some(Occupant::new(piece, color)));
        }
        Ok(board)
    }

    /// Restores the standard starting arrangement in place.
    pub fn reset(&mut self) {
        *self = Self::startpos();
    }

    /// Returns the occupant of `sq`, if any.
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Occupant> {
        self.squares[sq.row() as usize][sq.col() as usize]
    }

    /// Places `occupant` on `sq`, returning whatever stood there before.
    #[inline]
    pub fn put(&mut self, sq: Square, occupant: Option<Occupant>) -> Option<Occupant> {
        std::mem::replace(
            &mut self.squares[sq.row() as usize][sq.col() as usize],
            occupant,
        )
    }

    /// Removes and returns the occupant of `sq`.
    #[inline]
    pub fn take(&mut self, sq: Square) -> Option<Occupant> {
        self.put(sq, None)
    }

    /// Iterates over occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Occupant)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|o| (sq, o)))
    }

    /// Returns every square holding a `piece` of `color`, in row-major order.
    pub fn find(&self, color: Color, piece: Piece) -> Vec<Square> {
        self.pieces()
            .filter(|(_, o)| o.is(piece, color))
            .map(|(sq, _)| sq)
            .collect()
    }

    /// Returns the compact placement string of this board.
    pub fn to_placement(&self) -> String {
        Placement::render(|sq| self.get(sq).map(|o| (o.piece, o.color)))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Occupancy for Board {
    #[inline]
    fn occupant(&self, sq: Square) -> Option<Occupant> {
        self.get(sq)
    }
}

/// A read-only view that hides the piece on one square.
///
/// Used to look past the piece whose own square is being tested for safety,
/// so it does not block a slider that would otherwise reach it.
#[derive(Debug, Clone, Copy)]
pub struct Vacated<'a, B: Occupancy + ?Sized> {
    inner: &'a B,
    hole: Square,
}

impl<'a, B: Occupancy + ?Sized> Vacated<'a, B> {
    pub fn new(inner: &'a B, hole: Square) -> Self {
        Vacated { inner, hole }
    }
}

impl<B: Occupancy + ?Sized> Occupancy for Vacated<'_, B> {
    #[inline]
    fn occupant(&self, sq: Square) -> Option<Occupant> {
        if sq == self.hole {
            None
        } else {
            self.inner.occupant(sq)
        }
    }
}

impl fmt::Display for Board {
    /// Renders the board as a diagram, rank 8 at the top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8u8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8u8 {
                let symbol = Square::new(row, col)
                    .and_then(|sq| self.get(sq))
                    .map_or('.', |o| o.piece.to_placement_char(o.color));
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in 'a'..='h' {
            write!(f, " {}", file)?;
        }
        writeln!(f)
    }
}
