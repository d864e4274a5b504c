//! PGN (Portable Game Notation) game splitting.
//!
//! Splits a PGN file into games and reduces each game's movetext to a plain
//! list of SAN tokens. Comments, variations, NAGs and move numbers are
//! removed; the moves themselves are not checked here.
//!
//! The splitter is a line-based state machine:
//!
//! ```text
//! BetweenGames --[Tag "..."]--> InHeaders --movetext--> InMoves
//!      ^                                                   |
//!      +--------------- result token (1-0, 0-1, ...) ------+
//! ```
//!
//! A header line seen while in moves also closes the current game, and a
//! game still open at the end of the text is emitted as well.

use thiserror::Error;

/// Game termination markers.
const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Why a game's movetext could not be turned into a move list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// A move number carries the wrong number of moves.
    #[error("move {number} has {found} moves, expected {expected}")]
    InconsistentMoveNumber {
        number: u32,
        found: usize,
        expected: &'static str,
    },
    /// Movetext starts without a move number.
    #[error("move {token} appears before any move number")]
    MissingMoveNumber { token: String },
}

/// One game found in a PGN file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    /// Header tags in file order, e.g. `("White", "Morphy")`.
    pub headers: Vec<(String, String)>,
    /// SAN tokens in play order, or why they could not be extracted.
    pub moves: Result<Vec<String>, SplitError>,
    /// Result token that terminated the game, if any.
    pub result: Option<String>,
}

impl PgnGame {
    /// Returns the value of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BetweenGames,
    InHeaders,
    InMoves,
}

/// Splits `text` into games.
pub fn split_games(text: &str) -> Vec<PgnGame> {
    let mut games = Vec::new();
    let mut state = State::BetweenGames;
    let mut headers = Vec::new();
    let mut movetext = Movetext::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }

        if !movetext.in_comment && line.starts_with('[') && line.ends_with(']') {
            if state == State::InMoves {
                games.push(finish(&mut headers, &mut movetext));
            }
            if let Some(tag) = parse_header(line) {
                headers.push(tag);
            }
            state = State::InHeaders;
            continue;
        }

        state = State::InMoves;
        if movetext.feed(line) {
            games.push(finish(&mut headers, &mut movetext));
            state = State::BetweenGames;
        }
    }

    if state != State::BetweenGames && (!headers.is_empty() || !movetext.tokens.is_empty()) {
        games.push(finish(&mut headers, &mut movetext));
    }
    games
}

fn finish(headers: &mut Vec<(String, String)>, movetext: &mut Movetext) -> PgnGame {
    let Movetext { tokens, result, .. } = std::mem::take(movetext);
    PgnGame {
        headers: std::mem::take(headers),
        moves: pair_moves(&tokens),
        result,
    }
}

/// Parses `[Tag "Value"]`.
fn parse_header(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    let (name, rest) = inner.split_once(char::is_whitespace)?;
    let value = rest.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((name.to_string(), value.replace("\\\"", "\"")))
}

/// Movetext tokens of the game being read, with comment and variation state
/// carried across lines.
#[derive(Debug, Default)]
struct Movetext {
    tokens: Vec<String>,
    result: Option<String>,
    in_comment: bool,
    variation_depth: usize,
}

impl Movetext {
    /// Consumes one line. Returns true once a result token closes the game.
    fn feed(&mut self, line: &str) -> bool {
        let mut word = String::new();
        for c in line.chars() {
            if self.in_comment {
                if c == '}' {
                    self.in_comment = false;
                }
                continue;
            }
            match c {
                '{' => {
                    if self.flush(&mut word) {
                        return true;
                    }
                    self.in_comment = true;
                }
                // Rest-of-line comment
                ';' => break,
                '(' => {
                    if self.flush(&mut word) {
                        return true;
                    }
                    self.variation_depth += 1;
                }
                ')' => {
                    word.clear();
                    self.variation_depth = self.variation_depth.saturating_sub(1);
                }
                c if c.is_whitespace() => {
                    if self.flush(&mut word) {
                        return true;
                    }
                }
                c => {
                    if self.variation_depth == 0 {
                        word.push(c);
                    }
                }
            }
        }
        self.flush(&mut word)
    }

    fn flush(&mut self, word: &mut String) -> bool {
        if word.is_empty() {
            return false;
        }
        let token = std::mem::take(word);
        if RESULTS.contains(&token.as_str()) {
            self.result = Some(token);
            return true;
        }
        if !token.starts_with('$') {
            self.tokens.push(token);
        }
        false
    }
}

/// Splits a leading move number (`12.`, `12...`) off a token.
///
/// Returns the number and whatever follows it, or `None` if the token does
/// not start with one. Castling written with zeros (`0-0`) is not a number.
fn split_move_number(token: &str) -> Option<(u32, &str)> {
    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let (number, rest) = token.split_at(digits);
    let after_dots = rest.trim_start_matches('.');
    if after_dots.len() == rest.len() {
        return None;
    }
    Some((number.parse().ok()?, after_dots))
}

/// Groups tokens by move number and checks that every number carries two
/// moves, except the last which may carry one.
fn pair_moves(tokens: &[String]) -> Result<Vec<String>, SplitError> {
    let mut groups: Vec<(u32, Vec<&str>)> = Vec::new();

    for token in tokens {
        let mv = match split_move_number(token) {
            Some((number, rest)) => {
                // `12...` repeats the number of the move it continues.
                if groups.last().map(|(n, _)| *n) != Some(number) {
                    groups.push((number, Vec::new()));
                }
                rest
            }
            None => token.as_str(),
        };
        if mv.is_empty() {
            continue;
        }
        match groups.last_mut() {
            Some((_, moves)) => moves.push(mv),
            None => {
                return Err(SplitError::MissingMoveNumber {
                    token: mv.to_string(),
                })
            }
        }
    }

    let last = groups.len().saturating_sub(1);
    for (i, (number, moves)) in groups.iter().enumerate() {
        let (ok, expected) = if i == last {
            (matches!(moves.len(), 1 | 2), "1 or 2")
        } else {
            (moves.len() == 2, "2")
        };
        if !ok {
            return Err(SplitError::InconsistentMoveNumber {
                number: *number,
                found: moves.len(),
                expected,
            });
        }
    }

    Ok(groups
        .into_iter()
        .flat_map(|(_, moves)| moves)
        .map(str::to_string)
        .collect())
}
