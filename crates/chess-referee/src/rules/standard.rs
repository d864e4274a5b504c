//! Standard chess rules.
//!
//! Resolution works on one descriptor at a time:
//! 1. collect every piece of the declared kind and color, in row-major order;
//! 2. drop candidates that contradict the file/rank hints;
//! 3. take the first candidate whose move satisfies the rule for the declared
//!    category (castling, then capture, then plain move, with promotion and
//!    check layered on top) and apply it.
//!
//! The search is first-match: if the hints still leave two legal candidates
//! the first one in scan order is used. En passant is not supported.

use super::{AppliedMove, RuleSet};
use crate::attacks::{is_square_safe, locate_king};
use crate::board::{Board, Occupant};
use crate::movement::{can_capture, can_move};
use crate::simulate::Simulation;
use crate::violation::{CastlingFault, MoveCategory, PromotionFault, Violation};
use chess_core::{File, MoveDescriptor, Piece, Square};

/// Standard chess rules (FIDE, minus en passant).
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RuleSet for StandardRules {
    fn initial_board(&self) -> Board {
        Board::startpos()
    }

    fn apply(&self, board: &mut Board, mv: &mut MoveDescriptor) -> Result<AppliedMove, Violation> {
        let candidates = board.find(mv.color, mv.piece);
        if candidates.is_empty() {
            return Err(Violation::NoCandidate {
                notation: mv.notation.clone(),
                color: mv.color,
                piece: mv.piece,
            });
        }

        if mv.castling {
            return castle(board, mv);
        }
        if mv.promotion {
            check_promotion(mv).map_err(|fault| Violation::IllegalPromotion {
                notation: mv.notation.clone(),
                fault,
            })?;
        }

        let mut missed_check = false;
        for from in candidates {
            if !mv.matches_hints(from) {
                continue;
            }
            let Some(mover) = board.get(from) else {
                continue;
            };
            if !base_rule_holds(board, mv, from) {
                continue;
            }
            if mv.claims_check() && !delivers_check(board, mv, from, mover)? {
                missed_check = true;
                continue;
            }
            return Ok(execute(board, mv, from, mover));
        }

        let category = if missed_check {
            MoveCategory::Check
        } else {
            declared_category(mv)
        };
        Err(Violation::NoLegalCandidate {
            notation: mv.notation.clone(),
            color: mv.color,
            piece: mv.piece,
            category,
        })
    }
}

/// Category used to explain a failed move, in the order the flags are
/// reported: capture, promotion, castling, check, plain.
fn declared_category(mv: &MoveDescriptor) -> MoveCategory {
    if mv.capture {
        MoveCategory::Capture
    } else if mv.promotion {
        MoveCategory::Promotion
    } else if mv.castling {
        MoveCategory::Castling
    } else if mv.claims_check() {
        MoveCategory::Check
    } else {
        MoveCategory::Plain
    }
}

fn base_rule_holds(board: &Board, mv: &MoveDescriptor, from: Square) -> bool {
    if mv.capture {
        can_capture(board, mv.piece, mv.color, from, mv.to)
    } else {
        can_move(board, mv.piece, mv.color, from, mv.to)
    }
}

fn check_promotion(mv: &MoveDescriptor) -> Result<(), PromotionFault> {
    if mv.piece != Piece::Pawn {
        return Err(PromotionFault::NotAPawn(mv.piece));
    }
    if mv.to.row() != mv.color.promotion_row() {
        return Err(PromotionFault::WrongRank(mv.to));
    }
    let target = mv.promotion_target();
    if !target.is_promotion_target() {
        return Err(PromotionFault::InvalidTarget(target));
    }
    Ok(())
}

/// The piece that ends up on the destination square.
fn landing(mv: &MoveDescriptor, mover: Occupant) -> Occupant {
    if mv.promotion {
        Occupant {
            piece: mv.promotion_target(),
            color: mv.color,
            moved: true,
        }
    } else {
        Occupant {
            moved: true,
            ..mover
        }
    }
}

/// Plays the move on a simulation and tests the opposing king's square.
fn delivers_check(
    board: &mut Board,
    mv: &MoveDescriptor,
    from: Square,
    mover: Occupant,
) -> Result<bool, Violation> {
    let defender = mv.color.opposite();
    let king = locate_king(&*board, defender).map_err(|found| Violation::AmbiguousKingLookup {
        notation: mv.notation.clone(),
        color: defender,
        found,
    })?;

    let mut sim = Simulation::new(board);
    sim.put(from, None);
    sim.put(mv.to, Some(landing(mv, mover)));
    Ok(!is_square_safe(&*sim, defender, king))
}

fn execute(board: &mut Board, mv: &mut MoveDescriptor, from: Square, mover: Occupant) -> AppliedMove {
    let placed = landing(mv, mover);
    board.take(from);
    let captured = board.put(mv.to, Some(placed)).map(|o| o.piece);
    mv.from = Some(from);

    tracing::debug!(
        notation = %mv.notation,
        color = %mv.color,
        %from,
        to = %mv.to,
        captured = ?captured,
        "move applied"
    );

    AppliedMove {
        from,
        to: mv.to,
        captured,
        promoted: mv.promotion.then_some(placed.piece),
    }
}

/// King and rook squares of a validated castling move.
#[derive(Debug, Clone, Copy)]
struct CastlingPlan {
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    rook_to: Square,
}

fn castle(board: &mut Board, mv: &mut MoveDescriptor) -> Result<AppliedMove, Violation> {
    let plan = plan_castling(board, mv).map_err(|fault| Violation::IllegalCastling {
        notation: mv.notation.clone(),
        fault,
    })?;

    if mv.claims_check() && !castling_gives_check(board, mv, &plan)? {
        return Err(Violation::NoLegalCandidate {
            notation: mv.notation.clone(),
            color: mv.color,
            piece: mv.piece,
            category: MoveCategory::Check,
        });
    }

    for (from, to) in [(plan.king_from, plan.king_to), (plan.rook_from, plan.rook_to)] {
        if let Some(mut piece) = board.take(from) {
            piece.moved = true;
            board.put(to, Some(piece));
        }
    }
    mv.from = Some(plan.king_from);

    tracing::debug!(
        notation = %mv.notation,
        color = %mv.color,
        king = %plan.king_to,
        rook = %plan.rook_to,
        "castled"
    );

    Ok(AppliedMove {
        from: plan.king_from,
        to: plan.king_to,
        captured: None,
        promoted: None,
    })
}

fn plan_castling(board: &Board, mv: &MoveDescriptor) -> Result<CastlingPlan, CastlingFault> {
    let bad_destination = CastlingFault::InvalidDestination(mv.to);
    let king_from = match mv.from {
        Some(sq) => sq,
        None => Square::new(mv.color.back_row(), File::E.col()).ok_or(bad_destination)?,
    };
    let king_to = mv.to;
    if king_to.row() != king_from.row() {
        return Err(bad_destination);
    }

    // Rook offsets relative to the king's destination.
    let (rook_from, rook_to) = match king_to.file() {
        File::G => (king_to.offset(0, 1), king_to.offset(0, -1)),
        File::C => (king_to.offset(0, -2), king_to.offset(0, 1)),
        _ => return Err(bad_destination),
    };
    let rook_from = rook_from.ok_or(bad_destination)?;
    let rook_to = rook_to.ok_or(bad_destination)?;

    match board.get(king_from) {
        Some(king) if king.is(Piece::King, mv.color) => {
            if king.moved {
                return Err(CastlingFault::KingMoved);
            }
        }
        _ => return Err(CastlingFault::KingMissing(king_from)),
    }
    match board.get(rook_from) {
        Some(rook) if rook.is(Piece::Rook, mv.color) => {
            if rook.moved {
                return Err(CastlingFault::RookMoved);
            }
        }
        _ => return Err(CastlingFault::RookMissing(rook_from)),
    }

    let row = king_from.row();
    let (low, high) = if king_from.col() < rook_from.col() {
        (king_from.col(), rook_from.col())
    } else {
        (rook_from.col(), king_from.col())
    };
    for col in low + 1..high {
        if let Some(sq) = Square::new(row, col) {
            if board.get(sq).is_some() {
                return Err(CastlingFault::PathBlocked(sq));
            }
        }
    }

    // Transit squares are judged with the king still standing on its start.
    let step = if king_to.col() > king_from.col() { 1 } else { -1 };
    let mut sq = king_from;
    loop {
        if !is_square_safe(board, mv.color, sq) {
            return Err(CastlingFault::SquareAttacked(sq));
        }
        if sq == king_to {
            break;
        }
        match sq.offset(0, step) {
            Some(next) => sq = next,
            None => break,
        }
    }

    Ok(CastlingPlan {
        king_from,
        king_to,
        rook_from,
        rook_to,
    })
}

fn castling_gives_check(
    board: &mut Board,
    mv: &MoveDescriptor,
    plan: &CastlingPlan,
) -> Result<bool, Violation> {
    let defender = mv.color.opposite();
    let king = locate_king(&*board, defender).map_err(|found| Violation::AmbiguousKingLookup {
        notation: mv.notation.clone(),
        color: defender,
        found,
    })?;

    let mut sim = Simulation::new(board);
    sim.relocate(plan.king_from, plan.king_to);
    sim.relocate(plan.rook_from, plan.rook_to);
    Ok(!is_square_safe(&*sim, defender, king))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::san::decode;
    use chess_core::Color;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn board(placement: &str) -> Board {
        Board::from_placement(placement).unwrap()
    }

    fn play(board: &mut Board, san: &str, color: Color) -> Result<AppliedMove, Violation> {
        let mut mv = decode(san, color).unwrap();
        StandardRules.apply(board, &mut mv)
    }

    fn castling_fault(result: Result<AppliedMove, Violation>) -> CastlingFault {
        match result {
            Err(Violation::IllegalCastling { fault, .. }) => fault,
            other => panic!("expected castling fault, got {:?}", other),
        }
    }

    #[test]
    fn plain_move_resolves_source() {
        let mut board = Board::startpos();
        let mut mv = decode("Nf3", Color::White).unwrap();
        let applied = StandardRules.apply(&mut board, &mut mv).unwrap();
        assert_eq!(applied.from, sq("g1"));
        assert_eq!(mv.from, Some(sq("g1")));
        assert_eq!(board.get(sq("g1")), None);
        let knight = board.get(sq("f3")).unwrap();
        assert!(knight.is(Piece::Knight, Color::White));
        assert!(knight.moved);
    }

    #[test]
    fn missing_piece_kind_is_reported() {
        let mut board = board("4k3/8/8/8/8/8/8/4K3");
        let result = play(&mut board, "Qd4", Color::White);
        assert!(matches!(result, Err(Violation::NoCandidate { piece: Piece::Queen, .. })));
    }

    #[test]
    fn file_hint_selects_rook() {
        let placement = "4k3/8/8/8/8/8/8/R4RK1";
        let mut b = board(placement);
        assert_eq!(play(&mut b, "Rad1", Color::White).unwrap().from, sq("a1"));

        let mut b = board(placement);
        assert_eq!(play(&mut b, "Rfd1", Color::White).unwrap().from, sq("f1"));
        assert!(b.get(sq("a1")).is_some());
    }

    #[test]
    fn rank_hint_selects_rook() {
        let placement = "4k3/8/8/R7/8/8/8/R3K3";
        let mut b = board(placement);
        assert_eq!(play(&mut b, "R1a3", Color::White).unwrap().from, sq("a1"));

        let mut b = board(placement);
        assert_eq!(play(&mut b, "R5a3", Color::White).unwrap().from, sq("a5"));
    }

    #[test]
    fn unhinted_ambiguity_takes_first_in_scan_order() {
        let mut b = board("4k3/8/8/8/8/8/8/R4RK1");
        assert_eq!(play(&mut b, "Rd1", Color::White).unwrap().from, sq("a1"));
    }

    #[test]
    fn capture_replaces_defender() {
        let mut b = board("4k3/8/8/3p4/4P3/8/8/4K3");
        let applied = play(&mut b, "exd5", Color::White).unwrap();
        assert_eq!(applied.captured, Some(Piece::Pawn));
        assert!(b.get(sq("d5")).unwrap().is(Piece::Pawn, Color::White));
        assert_eq!(b.get(sq("e4")), None);
    }

    #[test]
    fn pawn_capture_onto_empty_square_fails() {
        let mut b = board("4k3/8/8/8/4P3/8/8/4K3");
        let before = b.clone();
        let result = play(&mut b, "exd5", Color::White);
        assert!(matches!(
            result,
            Err(Violation::NoLegalCandidate {
                category: MoveCategory::Capture,
                ..
            })
        ));
        assert_eq!(b, before);
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let mut b = board("7k/4P3/8/8/8/8/8/4K3");
        let mut mv = MoveDescriptor::new("e8", Color::White, Piece::Pawn, sq("e8"));
        mv.promotion = true;
        let applied = StandardRules.apply(&mut b, &mut mv).unwrap();
        assert_eq!(applied.promoted, Some(Piece::Queen));
        assert!(b.get(sq("e8")).unwrap().is(Piece::Queen, Color::White));
        assert_eq!(b.get(sq("e7")), None);
        assert_eq!(mv.from, Some(sq("e7")));
    }

    #[test]
    fn underpromotion_and_capture_promotion() {
        let mut b = board("3r3k/4P3/8/8/8/8/8/4K3");
        play(&mut b, "e8=N", Color::White).unwrap();
        assert!(b.get(sq("e8")).unwrap().is(Piece::Knight, Color::White));

        let mut b = board("3r3k/4P3/8/8/8/8/8/4K3");
        let applied = play(&mut b, "exd8=R", Color::White).unwrap();
        assert_eq!(applied.captured, Some(Piece::Rook));
        assert!(b.get(sq("d8")).unwrap().is(Piece::Rook, Color::White));
    }

    #[test]
    fn black_promotes_on_the_first_rank() {
        let mut b = board("4k3/8/8/8/8/8/p7/4K3");
        play(&mut b, "a1=Q", Color::Black).unwrap();
        assert!(b.get(sq("a1")).unwrap().is(Piece::Queen, Color::Black));
    }

    #[test]
    fn promotion_faults_are_specific() {
        let mut b = board("7k/8/8/4P3/8/8/8/4K3");
        let result = play(&mut b, "e6=Q", Color::White);
        assert!(matches!(
            result,
            Err(Violation::IllegalPromotion {
                fault: PromotionFault::WrongRank(_),
                ..
            })
        ));

        let mut b = board("7k/8/8/8/8/8/8/4KN2");
        let mut mv = MoveDescriptor::new("Ne8", Color::White, Piece::Knight, sq("e8"));
        mv.promotion = true;
        let result = StandardRules.apply(&mut b, &mut mv);
        assert!(matches!(
            result,
            Err(Violation::IllegalPromotion {
                fault: PromotionFault::NotAPawn(Piece::Knight),
                ..
            })
        ));

        let mut b = board("7k/4P3/8/8/8/8/8/4K3");
        let mut mv = MoveDescriptor::new("e8=K", Color::White, Piece::Pawn, sq("e8"));
        mv.promotion = true;
        mv.promotion_piece = Some(Piece::King);
        let result = StandardRules.apply(&mut b, &mut mv);
        assert!(matches!(
            result,
            Err(Violation::IllegalPromotion {
                fault: PromotionFault::InvalidTarget(Piece::King),
                ..
            })
        ));
    }

    #[test]
    fn white_kingside_castling() {
        let mut b = board("4k3/8/8/8/8/8/8/4K2R");
        let applied = play(&mut b, "O-O", Color::White).unwrap();
        assert_eq!((applied.from, applied.to), (sq("e1"), sq("g1")));
        let king = b.get(sq("g1")).unwrap();
        let rook = b.get(sq("f1")).unwrap();
        assert!(king.is(Piece::King, Color::White) && king.moved);
        assert!(rook.is(Piece::Rook, Color::White) && rook.moved);
        assert_eq!(b.get(sq("e1")), None);
        assert_eq!(b.get(sq("h1")), None);
    }

    #[test]
    fn kingside_castling_needs_empty_path() {
        for (placement, blocked) in [("4k3/8/8/8/8/8/8/4KB1R", "f1"), ("4k3/8/8/8/8/8/8/4K1NR", "g1")] {
            let mut b = board(placement);
            let fault = castling_fault(play(&mut b, "O-O", Color::White));
            assert_eq!(fault, CastlingFault::PathBlocked(sq(blocked)));
        }
    }

    #[test]
    fn castling_needs_unmoved_king_and_rook() {
        let mut b = board("4k3/8/8/8/8/8/8/4K2R");
        let mut king = b.get(sq("e1")).unwrap();
        king.moved = true;
        b.put(sq("e1"), Some(king));
        assert_eq!(
            castling_fault(play(&mut b, "O-O", Color::White)),
            CastlingFault::KingMoved
        );

        let mut b = board("4k3/8/8/8/8/8/8/4K2R");
        let mut rook = b.get(sq("h1")).unwrap();
        rook.moved = true;
        b.put(sq("h1"), Some(rook));
        assert_eq!(
            castling_fault(play(&mut b, "O-O", Color::White)),
            CastlingFault::RookMoved
        );

        let mut b = board("4k3/8/8/8/8/8/8/4K3");
        assert_eq!(
            castling_fault(play(&mut b, "O-O", Color::White)),
            CastlingFault::RookMissing(sq("h1"))
        );
    }

    #[test]
    fn castling_cannot_cross_attacked_squares() {
        for (placement, attacked) in [
            ("4k3/8/8/4r3/8/8/8/4K2R", "e1"),
            ("4k3/8/8/5r2/8/8/8/4K2R", "f1"),
            ("4k3/8/8/6r1/8/8/8/4K2R", "g1"),
        ] {
            let mut b = board(placement);
            let before = b.clone();
            let fault = castling_fault(play(&mut b, "O-O", Color::White));
            assert_eq!(fault, CastlingFault::SquareAttacked(sq(attacked)));
            assert_eq!(b, before);
        }

        // An attacked rook does not prevent castling.
        let mut b = board("4k3/8/8/7r/8/8/8/4K2R");
        assert!(play(&mut b, "O-O", Color::White).is_ok());
    }

    #[test]
    fn black_queenside_castling() {
        let mut b = board("r3k3/8/8/8/8/8/8/4K3");
        play(&mut b, "O-O-O", Color::Black).unwrap();
        assert!(b.get(sq("c8")).unwrap().is(Piece::King, Color::Black));
        assert!(b.get(sq("d8")).unwrap().is(Piece::Rook, Color::Black));
        assert_eq!(b.get(sq("a8")), None);
        assert_eq!(b.get(sq("e8")), None);
    }

    #[test]
    fn declared_check_is_verified() {
        let mut b = board("4k3/8/8/8/8/8/8/4KB2");
        let applied = play(&mut b, "Bb5+", Color::White).unwrap();
        assert_eq!(applied.from, sq("f1"));

        let mut b = board("4k3/3p4/8/8/8/8/8/4KB2");
        let before = b.clone();
        let result = play(&mut b, "Bb5+", Color::White);
        assert!(matches!(
            result,
            Err(Violation::NoLegalCandidate {
                category: MoveCategory::Check,
                ..
            })
        ));
        assert_eq!(b, before, "simulation must leave the board untouched");
    }

    #[test]
    fn pawn_push_delivers_check() {
        let mut b = board("5k2/8/4P3/8/8/8/8/4K3");
        assert_eq!(play(&mut b, "e7+", Color::White).unwrap().from, sq("e6"));

        // A pawn on e7 covers d8 and f8, not the squares behind it.
        for placement in ["k7/8/4P3/8/8/8/8/4K3", "8/8/4Pk2/8/8/8/8/4K3"] {
            let mut b = board(placement);
            let result = play(&mut b, "e7+", Color::White);
            assert!(
                matches!(
                    result,
                    Err(Violation::NoLegalCandidate {
                        category: MoveCategory::Check,
                        ..
                    })
                ),
                "{}: {:?}",
                placement,
                result
            );
        }
    }

    #[test]
    fn discovered_check_is_recognised() {
        // The knight leaves the e-file and uncovers the rook on e1.
        let mut b = board("4k3/8/8/8/4N3/8/8/K3R3");
        let applied = play(&mut b, "Nc3+", Color::White).unwrap();
        assert_eq!(applied.from, sq("e4"));
        assert!(b.get(sq("c3")).unwrap().is(Piece::Knight, Color::White));
    }

    #[test]
    fn check_needs_exactly_one_enemy_king() {
        let mut b = board("8/8/8/8/8/8/8/4KB2");
        let result = play(&mut b, "Bb5+", Color::White);
        assert!(matches!(
            result,
            Err(Violation::AmbiguousKingLookup {
                color: Color::Black,
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn castling_with_check_moves_the_rook_in_simulation() {
        // After O-O the rook on f1 checks the king on f8.
        let mut b = board("5k2/8/8/8/8/8/8/4K2R");
        assert!(play(&mut b, "O-O+", Color::White).is_ok());

        let mut b = board("6k1/8/8/8/8/8/8/4K2R");
        let result = play(&mut b, "O-O+", Color::White);
        assert!(matches!(
            result,
            Err(Violation::NoLegalCandidate {
                category: MoveCategory::Check,
                ..
            })
        ));
    }

    #[test]
    fn king_may_not_step_next_to_enemy_king() {
        let mut b = board("8/8/8/3k4/8/3K4/8/8");
        let result = play(&mut b, "Kd4", Color::White);
        assert!(matches!(
            result,
            Err(Violation::NoLegalCandidate {
                category: MoveCategory::Plain,
                ..
            })
        ));
        assert!(play(&mut b, "Kc2", Color::White).is_ok());
    }
}
