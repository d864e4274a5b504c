//! Standard Algebraic Notation (SAN) decoding.
//!
//! Turns move text such as "e4", "Nbd2", "exd8=Q+" or "O-O" into a
//! [`MoveDescriptor`]. Decoding is purely syntactic: apart from castling, the
//! source square is left for the referee to resolve against a board.

use chess_core::{Color, File, MoveDescriptor, Piece, Rank, Square};
use thiserror::Error;

/// Error type for SAN decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    /// The SAN string is empty.
    #[error("empty SAN string")]
    Empty,
    /// The SAN string has invalid format.
    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),
}

/// A token of a game's move list that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ply {ply} ({notation}): {source}")]
pub struct DecodeError {
    /// 1-based ply number of the failing token.
    pub ply: usize,
    pub notation: String,
    #[source]
    pub source: SanError,
}

/// Decodes one SAN token played by `color`.
///
/// Check (`+`) and mate (`#`) suffixes become flags; trailing annotation
/// glyphs (`!`, `?`) are ignored. The descriptor keeps the trimmed token as
/// its notation.
pub fn decode(notation: &str, color: Color) -> Result<MoveDescriptor, SanError> {
    let notation = notation.trim();
    if notation.is_empty() {
        return Err(SanError::Empty);
    }

    let body = notation.trim_end_matches(|c: char| c == '!' || c == '?');
    let (body, check, checkmate) = if let Some(rest) = body.strip_suffix('#') {
        (rest, false, true)
    } else if let Some(rest) = body.strip_suffix('+') {
        (rest, true, false)
    } else {
        (body, false, false)
    };
    if body.is_empty() {
        return Err(SanError::InvalidFormat(format!("no move in {}", notation)));
    }

    let mut mv = match body {
        "O-O" | "0-0" => castling(notation, color, File::G),
        "O-O-O" | "0-0-0" => castling(notation, color, File::C),
        _ => parse_components(notation, body, color)?,
    };
    mv.check = check;
    mv.checkmate = checkmate;
    Ok(mv)
}

/// Decodes a game's move list, alternating White and Black from White.
pub fn decode_game<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<MoveDescriptor>, DecodeError> {
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let token = token.as_ref();
            let color = if index % 2 == 0 {
                Color::White
            } else {
                Color::Black
            };
            decode(token, color).map_err(|source| DecodeError {
                ply: index + 1,
                notation: token.to_string(),
                source,
            })
        })
        .collect()
}

fn home_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

fn castling(notation: &str, color: Color, king_file: File) -> MoveDescriptor {
    let rank = home_rank(color);
    let mut mv = MoveDescriptor::new(notation, color, Piece::King, Square::at(king_file, rank));
    mv.castling = true;
    mv.from = Some(Square::at(File::E, rank));
    mv
}

fn parse_components(notation: &str, body: &str, color: Color) -> Result<MoveDescriptor, SanError> {
    let invalid = |what: &str| SanError::InvalidFormat(format!("{}: {}", what, notation));
    let mut chars: Vec<char> = body.chars().collect();

    // Piece letter, pawn when absent
    let piece = match chars.first() {
        Some(&c) if c.is_ascii_uppercase() => {
            let piece = Piece::from_san_char(c).ok_or_else(|| invalid("invalid piece character"))?;
            chars.remove(0);
            piece
        }
        _ => Piece::Pawn,
    };

    // Promotion suffix
    let promotion_piece = match chars.iter().position(|&c| c == '=') {
        Some(at) => {
            let suffix = chars.split_off(at);
            match suffix[1..] {
                [c] => Some(
                    Piece::from_san_char(c)
                        .filter(|p| p.is_promotion_target())
                        .ok_or_else(|| invalid("invalid promotion piece"))?,
                ),
                _ => return Err(invalid("invalid promotion")),
            }
        }
        None => None,
    };

    // The last two characters are the destination square
    if chars.len() < 2 {
        return Err(invalid("too short"));
    }
    let dest = chars.split_off(chars.len() - 2);
    let to_file = File::from_char(dest[0]).ok_or_else(|| invalid("invalid file"))?;
    let to_rank = Rank::from_char(dest[1]).ok_or_else(|| invalid("invalid rank"))?;

    let capture = chars.last() == Some(&'x');
    if capture {
        chars.pop();
    }

    // Anything left is disambiguation
    let (from_file, from_rank) = match chars[..] {
        [] => (None, None),
        [c] => match (File::from_char(c), Rank::from_char(c)) {
            (Some(file), _) => (Some(file), None),
            (None, Some(rank)) => (None, Some(rank)),
            (None, None) => return Err(invalid("invalid disambiguation")),
        },
        [f, r] => (
            Some(File::from_char(f).ok_or_else(|| invalid("invalid disambiguation file"))?),
            Some(Rank::from_char(r).ok_or_else(|| invalid("invalid disambiguation rank"))?),
        ),
        _ => return Err(invalid("disambiguation too long")),
    };

    let mut mv = MoveDescriptor::new(notation, color, piece, Square::at(to_file, to_rank));
    mv.from_file = from_file;
    mv.from_rank = from_rank;
    mv.capture = capture;
    mv.promotion = promotion_piece.is_some();
    mv.promotion_piece = promotion_piece;
    Ok(mv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn parse_san_pawn_push() {
        let mv = decode("e4", Color::White).unwrap();
        assert_eq!(mv.piece, Piece::Pawn);
        assert_eq!(mv.to, sq("e4"));
        assert_eq!(mv.to.row(), 4);
        assert_eq!(mv.to.col(), 4);
        assert_eq!(mv.from, None);
        assert!(!mv.capture && !mv.check && !mv.promotion);
    }

    #[test]
    fn parse_san_knight_with_file_hint() {
        let mv = decode("Nbd7", Color::Black).unwrap();
        assert_eq!(mv.piece, Piece::Knight);
        assert_eq!(mv.color, Color::Black);
        assert_eq!(mv.from_file, Some(File::B));
        assert_eq!(mv.from_rank, None);
        assert_eq!(mv.to, sq("d7"));
    }

    #[test]
    fn parse_san_rank_and_square_hints() {
        let mv = decode("R1e2", Color::White).unwrap();
        assert_eq!(mv.from_rank, Some(Rank::R1));
        assert_eq!(mv.from_file, None);

        let mv = decode("Qh4xe1", Color::Black).unwrap();
        assert_eq!(mv.from_file, Some(File::H));
        assert_eq!(mv.from_rank, Some(Rank::R4));
        assert!(mv.capture);
    }

    #[test]
    fn parse_san_pawn_capture() {
        let mv = decode("exd5", Color::White).unwrap();
        assert_eq!(mv.piece, Piece::Pawn);
        assert_eq!(mv.from_file, Some(File::E));
        assert!(mv.capture);
        assert_eq!(mv.to, sq("d5"));
    }

    #[test]
    fn parse_san_castling() {
        let mv = decode("O-O", Color::White).unwrap();
        assert!(mv.castling);
        assert_eq!(mv.piece, Piece::King);
        assert_eq!(mv.from, Some(sq("e1")));
        assert_eq!(mv.to, sq("g1"));

        let mv = decode("0-0-0", Color::Black).unwrap();
        assert!(mv.castling);
        assert_eq!(mv.from, Some(sq("e8")));
        assert_eq!(mv.to, sq("c8"));
    }

    #[test]
    fn parse_san_suffixes() {
        let mv = decode("Qh2+", Color::White).unwrap();
        assert!(mv.check && !mv.checkmate);

        let mv = decode("Rd8#", Color::White).unwrap();
        assert!(mv.checkmate && !mv.check);
        assert!(mv.claims_check());

        let mv = decode("O-O-O+", Color::White).unwrap();
        assert!(mv.castling && mv.check);

        let mv = decode("Nf3!?", Color::White).unwrap();
        assert_eq!(mv.to, sq("f3"));
        assert_eq!(mv.notation, "Nf3!?");
    }

    #[test]
    fn parse_san_promotion() {
        let mv = decode("e8=Q", Color::White).unwrap();
        assert!(mv.promotion);
        assert_eq!(mv.promotion_piece, Some(Piece::Queen));

        let mv = decode("bxa1=N+", Color::Black).unwrap();
        assert!(mv.promotion && mv.capture && mv.check);
        assert_eq!(mv.from_file, Some(File::B));
        assert_eq!(mv.promotion_piece, Some(Piece::Knight));
        assert_eq!(mv.to, sq("a1"));
    }

    #[test]
    fn parse_san_invalid() {
        assert_eq!(decode("", Color::White), Err(SanError::Empty));
        assert_eq!(decode("   ", Color::White), Err(SanError::Empty));
        for bad in ["xyz", "Pe4", "e9", "i4", "e8=K", "e8=", "Nabc3", "+", "Ne"] {
            assert!(
                matches!(decode(bad, Color::White), Err(SanError::InvalidFormat(_))),
                "{} should not decode",
                bad
            );
        }
    }

    #[test]
    fn decode_game_alternates_colors() {
        let moves = decode_game(&["e4", "e5", "Nf3"]).unwrap();
        let colors: Vec<Color> = moves.iter().map(|m| m.color).collect();
        assert_eq!(colors, vec![Color::White, Color::Black, Color::White]);
    }

    #[test]
    fn decode_game_reports_failing_ply() {
        let err = decode_game(&["e4", "e5", "Zz9"]).unwrap_err();
        assert_eq!(err.ply, 3);
        assert_eq!(err.notation, "Zz9");
        assert!(err.to_string().starts_with("ply 3 (Zz9)"));
    }
}
