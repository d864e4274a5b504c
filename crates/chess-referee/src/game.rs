//! Game evaluation.
//!
//! A [`Game`] owns one board and a rule set and replays decoded move lists
//! against them. Each evaluation runs `Ready -> Continue* -> Halted? ->
//! Reported`: moves are applied in order, the first violation stops the
//! replay, and the board (complete or partial) is always reported.
//!
//! A `Game` is not meant to be shared between threads; give every worker its
//! own instance.

use crate::board::Board;
use crate::rules::{RuleSet, StandardRules};
use crate::san::{decode_game, DecodeError};
use crate::violation::Violation;
use chess_core::MoveDescriptor;
use std::fmt;

/// How an evaluation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStatus {
    /// Every move was applied.
    Clean,
    /// Replay stopped at the first violation.
    Halted {
        /// 1-based ply number of the offending move.
        ply: usize,
        notation: String,
        violation: Violation,
    },
}

/// Outcome of evaluating one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReport {
    pub status: GameStatus,
    /// Number of moves applied before the game ended or halted.
    pub plies_applied: usize,
    /// Placement string of the final board.
    pub final_placement: String,
    /// Rendered diagram of the final board.
    pub diagram: String,
}

impl GameReport {
    /// Returns true if no violation was found.
    pub fn is_clean(&self) -> bool {
        matches!(self.status, GameStatus::Clean)
    }

    /// Returns the violation that halted the game, if any.
    pub fn violation(&self) -> Option<&Violation> {
        match &self.status {
            GameStatus::Clean => None,
            GameStatus::Halted { violation, .. } => Some(violation),
        }
    }
}

impl fmt::Display for GameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            GameStatus::Clean => write!(f, "no violations"),
            GameStatus::Halted { ply, violation, .. } => write!(f, "ply {}: {}", ply, violation),
        }
    }
}

/// A board plus the rules that referee it.
#[derive(Debug, Clone)]
pub struct Game<R: RuleSet = StandardRules> {
    rules: R,
    board: Board,
    reset_after: bool,
}

impl Game<StandardRules> {
    /// Creates a game under standard rules that resets after every evaluation.
    pub fn new() -> Self {
        Self::with_rules(StandardRules)
    }
}

impl Default for Game<StandardRules> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RuleSet> Game<R> {
    /// Creates a game using the given rule set.
    pub fn with_rules(rules: R) -> Self {
        let board = rules.initial_board();
        Game {
            rules,
            board,
            reset_after: true,
        }
    }

    /// Sets whether the board returns to the initial position after each
    /// evaluation. When disabled, the next game continues from the final
    /// board of the previous one.
    pub fn reset_after_game(mut self, reset: bool) -> Self {
        self.reset_after = reset;
        self
    }

    /// Replaces the current board, e.g. to evaluate from a custom position.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Puts the rule set's initial board back.
    pub fn reset(&mut self) {
        self.board = self.rules.initial_board();
    }

    /// Replays `moves` in order, stopping at the first violation.
    ///
    /// Resolved source squares are written back into the applied descriptors.
    pub fn evaluate(&mut self, moves: &mut [MoveDescriptor]) -> GameReport {
        let mut status = GameStatus::Clean;
        let mut plies_applied = 0;

        for (index, mv) in moves.iter_mut().enumerate() {
            match self.rules.apply(&mut self.board, mv) {
                Ok(_) => plies_applied += 1,
                Err(violation) => {
                    tracing::warn!(
                        ply = index + 1,
                        notation = %mv.notation,
                        %violation,
                        "game halted"
                    );
                    status = GameStatus::Halted {
                        ply: index + 1,
                        notation: mv.notation.clone(),
                        violation,
                    };
                    break;
                }
            }
        }

        if status == GameStatus::Clean {
            tracing::info!(plies = plies_applied, "game completed without violations");
        }

        let report = GameReport {
            status,
            plies_applied,
            final_placement: self.board.to_placement(),
            diagram: self.board.to_string(),
        };
        tracing::debug!("final board\n{}", report.diagram);

        if self.reset_after {
            self.reset();
        }
        report
    }

    /// Decodes a SAN move list and evaluates it.
    ///
    /// Nothing is applied when a token fails to decode.
    pub fn evaluate_san<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<GameReport, DecodeError> {
        let mut moves = decode_game(tokens)?;
        Ok(self.evaluate(&mut moves))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::MoveCategory;
    use chess_core::{Placement, Square};

    #[test]
    fn clean_game_reports_no_violations() {
        let mut game = Game::new();
        let report = game.evaluate_san(&["e4", "e5", "Nf3", "Nc6"]).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.plies_applied, 4);
        assert_eq!(report.to_string(), "no violations");
        assert_eq!(
            report.final_placement,
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R"
        );
    }

    #[test]
    fn violation_halts_remaining_moves() {
        let mut game = Game::new().reset_after_game(false);
        let report = game.evaluate_san(&["e4", "e5", "Ba3", "Nc6"]).unwrap();
        assert_eq!(report.plies_applied, 2);
        match &report.status {
            GameStatus::Halted {
                ply,
                notation,
                violation,
            } => {
                assert_eq!(*ply, 3);
                assert_eq!(notation, "Ba3");
                assert!(matches!(
                    violation,
                    Violation::NoLegalCandidate {
                        category: MoveCategory::Plain,
                        ..
                    }
                ));
            }
            GameStatus::Clean => panic!("expected a violation"),
        }
        // Nc6 was never played.
        let b8 = Square::from_algebraic("b8").unwrap();
        assert!(game.board().get(b8).is_some());
        assert!(report.to_string().starts_with("ply 3: invalid move Ba3"));
    }

    #[test]
    fn board_resets_between_games_by_default() {
        let mut game = Game::new();
        game.evaluate_san(&["d4"]).unwrap();
        assert_eq!(game.board(), &Board::startpos());
    }

    #[test]
    fn keep_board_continues_from_previous_game() {
        let mut game = Game::new().reset_after_game(false);
        game.evaluate_san(&["d4"]).unwrap();
        let report = game.evaluate_san(&["d5"]).unwrap();
        assert!(report.is_clean());
        assert_eq!(
            report.final_placement,
            "rnbqkbnr/pppppppp/8/3P4/8/8/PPP1PPPP/RNBQKBNR"
        );
    }

    #[test]
    fn resolved_sources_are_written_back() {
        let mut moves = decode_game(&["Nf3", "Nf6"]).unwrap();
        let mut game = Game::new();
        game.evaluate(&mut moves);
        assert_eq!(moves[0].from, Square::from_algebraic("g1"));
        assert_eq!(moves[1].from, Square::from_algebraic("g8"));
    }

    #[test]
    fn undecodable_token_applies_nothing() {
        let mut game = Game::new().reset_after_game(false);
        let err = game.evaluate_san(&["e4", "??"]).unwrap_err();
        assert_eq!(err.ply, 2);
        assert_eq!(game.board(), &Board::startpos());
    }

    #[test]
    fn custom_start_board() {
        let mut game = Game::new().reset_after_game(false);
        game.set_board(Board::from_placement("4k3/8/8/8/8/8/8/4K2R").unwrap());
        let report = game.evaluate_san(&["O-O", "Kd7"]).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.final_placement, "8/3k4/8/8/8/8/8/5RK1");
        assert_ne!(report.final_placement, Placement::STARTPOS);
    }
}
