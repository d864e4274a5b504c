//! Scoped board mutation with guaranteed rollback.

use crate::board::{Board, Occupant};
use chess_core::Square;
use std::ops::Deref;

/// Temporarily edits a board and restores it when dropped.
///
/// The first time a square is touched its previous occupant is saved; on drop
/// every touched square gets that occupant back. Rollback happens on every
/// exit path, including early returns and panics.
pub struct Simulation<'a> {
    board: &'a mut Board,
    saved: Vec<(Square, Option<Occupant>)>,
}

impl<'a> Simulation<'a> {
    pub fn new(board: &'a mut Board) -> Self {
        Simulation {
            board,
            saved: Vec::with_capacity(4),
        }
    }

    /// Places `occupant` on `sq` for the lifetime of the simulation.
    pub fn put(&mut self, sq: Square, occupant: Option<Occupant>) {
        if !self.saved.iter().any(|(s, _)| *s == sq) {
            self.saved.push((sq, self.board.get(sq)));
        }
        self.board.put(sq, occupant);
    }

    /// Moves whatever stands on `from` to `to`, overwriting `to`.
    pub fn relocate(&mut self, from: Square, to: Square) {
        let occupant = self.board.get(from);
        self.put(from, None);
        self.put(to, occupant);
    }
}

impl Deref for Simulation<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        for (sq, occupant) in self.saved.drain(..) {
            self.board.put(sq, occupant);
        }
    }
}
