//! King safety.
//!
//! [`is_square_safe`] answers whether any enemy piece reaches a square. It is
//! used for king moves, for castling through check, and for verifying that a
//! move delivers check.

use crate::board::{Occupancy, Vacated};
use crate::movement::{bishop_move, knight_move, queen_move, rook_move};
use chess_core::{Color, Piece, Square};

/// Returns true if no piece of `color`'s opponent attacks `sq`.
///
/// Checked in order, stopping at the first attacker found:
/// 1. an enemy king on `sq` or any neighbouring square;
/// 2. an enemy pawn one row ahead of `sq` (from `color`'s point of view) on
///    an adjacent file;
/// 3. any other enemy piece whose movement rule reaches `sq`, evaluated with
///    `sq` itself treated as empty.
pub fn is_square_safe<B: Occupancy + ?Sized>(board: &B, color: Color, sq: Square) -> bool {
    let enemy = color.opposite();

    for d_row in -1..=1 {
        for d_col in -1..=1 {
            let king_near = sq
                .offset(d_row, d_col)
                .and_then(|s| board.occupant(s))
                .is_some_and(|o| o.is(Piece::King, enemy));
            if king_near {
                return false;
            }
        }
    }

    for d_col in [-1, 1] {
        let pawn_attacks = sq
            .offset(color.forward(), d_col)
            .and_then(|s| board.occupant(s))
            .is_some_and(|o| o.is(Piece::Pawn, enemy));
        if pawn_attacks {
            return false;
        }
    }

    let view = Vacated::new(board, sq);
    for from in Square::all() {
        let Some(attacker) = board.occupant(from) else {
            continue;
        };
        if attacker.color != enemy || matches!(attacker.piece, Piece::King | Piece::Pawn) {
            continue;
        }
        if reaches(&view, attacker.piece, enemy, from, sq) {
            return false;
        }
    }

    true
}

/// Movement rule of a piece attacking `to`. Kings and pawns are covered by
/// the earlier steps of [`is_square_safe`], so they never reach here.
fn reaches<B: Occupancy + ?Sized>(
    board: &B,
    piece: Piece,
    color: Color,
    from: Square,
    to: Square,
) -> bool {
    match piece {
        Piece::Knight => knight_move(board, color, from, to),
        Piece::Bishop => bishop_move(board, color, from, to),
        Piece::Rook => rook_move(board, color, from, to),
        Piece::Queen => queen_move(board, color, from, to),
        Piece::King | Piece::Pawn => false,
    }
}

/// Returns the square of `color`'s king, or the number of kings found when
/// there is not exactly one.
pub fn locate_king<B: Occupancy + ?Sized>(board: &B, color: Color) -> Result<Square, usize> {
    let mut kings = Square::all().filter(|&sq| {
        board
            .occupant(sq)
            .is_some_and(|o| o.is(Piece::King, color))
    });
    match (kings.next(), kings.next()) {
        (Some(sq), None) => Ok(sq),
        (None, _) => Err(0),
        (Some(_), Some(_)) => Err(2 + kings.count()),
    }
}
