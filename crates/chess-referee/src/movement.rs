//! Piece movement rules.
//!
//! Pure predicates answering "can a `piece` of `color` standing on `from`
//! reach `to`" on a given board. They only read the board.
//!
//! Quiet moves and captures are separate entry points because pawns move and
//! capture differently; every other piece captures the way it moves, since
//! its quiet rule only forbids landing on a piece of its own color.

use crate::attacks::is_square_safe;
use crate::board::Occupancy;
use chess_core::{Color, Piece, Square};

/// Returns true if the piece can make a non-capturing move from `from` to `to`.
///
/// For kings this includes the destination being safe.
pub fn can_move<B: Occupancy + ?Sized>(
    board: &B,
    piece: Piece,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    match piece {
        Piece::Pawn => pawn_push(board, color, from, to),
        Piece::Knight => knight_move(board, color, from, to),
        Piece::Bishop => bishop_move(board, color, from, to),
        Piece::Rook => rook_move(board, color, from, to),
        Piece::Queen => queen_move(board, color, from, to),
        Piece::King => king_step(board, color, from, to) && is_square_safe(board, color, to),
    }
}

/// Returns true if the piece can capture on `to`.
pub fn can_capture<B: Occupancy + ?Sized>(
    board: &B,
    piece: Piece,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    match piece {
        Piece::Pawn => pawn_capture(board, color, from, to),
        Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen | Piece::King => {
            can_move(board, piece, color, from, to)
        }
    }
}

/// Straight pawn advance: one square, or two from a pawn that never moved.
pub fn pawn_push<B: Occupancy + ?Sized>(board: &B, color: Color, from: Square, to: Square) -> bool {
    if from.col() != to.col() {
        return false;
    }
    let Some(pawn) = board.occupant(from) else {
        return false;
    };

    let distance = (to.row() as i8 - from.row() as i8) * color.forward();
    match distance {
        1 => board.is_empty(to),
        2 if !pawn.moved => from
            .offset(color.forward(), 0)
            .is_some_and(|mid| board.is_empty(mid) && board.is_empty(to)),
        _ => false,
    }
}

/// Diagonal pawn capture onto an opposing piece. En passant is not modelled.
pub fn pawn_capture<B: Occupancy + ?Sized>(
    board: &B,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    let (d_row, d_col) = delta(from, to);
    d_row == color.forward() && d_col.abs() == 1 && board.color_at(to) == Some(color.opposite())
}

pub fn knight_move<B: Occupancy + ?Sized>(
    board: &B,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    let (d_row, d_col) = delta(from, to);
    let shape = (d_row.abs(), d_col.abs());
    matches!(shape, (2, 1) | (1, 2)) && !holds_own_piece(board, color, to)
}

pub fn bishop_move<B: Occupancy + ?Sized>(
    board: &B,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    let (d_row, d_col) = delta(from, to);
    d_row != 0
        && d_row.abs() == d_col.abs()
        && path_is_clear(board, from, to)
        && !holds_own_piece(board, color, to)
}

pub fn rook_move<B: Occupancy + ?Sized>(
    board: &B,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    let (d_row, d_col) = delta(from, to);
    (d_row == 0) != (d_col == 0)
        && path_is_clear(board, from, to)
        && !holds_own_piece(board, color, to)
}

pub fn queen_move<B: Occupancy + ?Sized>(
    board: &B,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    bishop_move(board, color, from, to) || rook_move(board, color, from, to)
}

/// Geometric part of a king move; safety of `to` is checked separately.
pub fn king_step<B: Occupancy + ?Sized>(
    board: &B,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    let (d_row, d_col) = delta(from, to);
    d_row.abs() <= 1 && d_col.abs() <= 1 && from != to && !holds_own_piece(board, color, to)
}

#[inline]
fn delta(from: Square, to: Square) -> (i8, i8) {
    (
        to.row() as i8 - from.row() as i8,
        to.col() as i8 - from.col() as i8,
    )
}

#[inline]
fn holds_own_piece<B: Occupancy + ?Sized>(board: &B, color: Color, sq: Square) -> bool {
    board.color_at(sq) == Some(color)
}

/// Every square strictly between `from` and `to` is empty.
///
/// Callers guarantee the two squares share a row, column, or diagonal.
fn path_is_clear<B: Occupancy + ?Sized>(board: &B, from: Square, to: Square) -> bool {
    let (d_row, d_col) = delta(from, to);
    let step = (d_row.signum(), d_col.signum());
    let mut current = from.offset(step.0, step.1);
    while let Some(sq) = current {
        if sq == to {
            return true;
        }
        if !board.is_empty(sq) {
            return false;
        }
        current = sq.offset(step.0, step.1);
    }
    false
}
