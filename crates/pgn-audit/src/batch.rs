//! Batch auditing with game-level sharding.
//!
//! Games are independent, moves within a game are not. Each worker thread
//! owns its own [`Game`] (board plus referee) and replays the games assigned
//! to it one after another; job `i` always goes to worker `i % workers`.
//! Results travel back over a channel and are returned in job order.

use crate::pgn::{PgnGame, SplitError};
use chess_referee::{Game, GameReport};
use crossbeam_channel::unbounded;
use std::fmt;
use std::path::PathBuf;
use std::thread;

/// One game queued for auditing.
#[derive(Debug, Clone)]
pub struct GameJob {
    /// File the game was read from.
    pub source: Option<PathBuf>,
    pub headers: Vec<(String, String)>,
    pub moves: Result<Vec<String>, SplitError>,
    /// Result token recorded in the file.
    pub result: Option<String>,
}

impl GameJob {
    pub fn new(source: Option<PathBuf>, game: PgnGame) -> Self {
        GameJob {
            source,
            headers: game.headers,
            moves: game.moves,
            result: game.result,
        }
    }
}

/// What auditing one game produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The moves were decoded and replayed.
    Evaluated(GameReport),
    /// The movetext could not be split or decoded; nothing was replayed.
    Undecodable(String),
}

/// Audit result for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameAudit {
    /// Position of the game in the batch.
    pub index: usize,
    pub source: Option<PathBuf>,
    pub headers: Vec<(String, String)>,
    /// Result token recorded in the file, e.g. `1-0`.
    pub result: Option<String>,
    pub outcome: AuditOutcome,
}

impl GameAudit {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the replay report, if the game could be replayed.
    pub fn report(&self) -> Option<&GameReport> {
        match &self.outcome {
            AuditOutcome::Evaluated(report) => Some(report),
            AuditOutcome::Undecodable(_) => None,
        }
    }

    /// Short status label: `clean`, `violation` or `undecodable`.
    pub fn status(&self) -> &'static str {
        match &self.outcome {
            AuditOutcome::Evaluated(report) if report.is_clean() => "clean",
            AuditOutcome::Evaluated(_) => "violation",
            AuditOutcome::Undecodable(_) => "undecodable",
        }
    }
}

impl fmt::Display for GameAudit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index + 1)?;
        if let Some(source) = &self.source {
            write!(f, " {}", source.display())?;
        }
        if let (Some(white), Some(black)) = (self.header("White"), self.header("Black")) {
            write!(f, " [{} - {}]", white, black)?;
        }
        match &self.outcome {
            AuditOutcome::Evaluated(report) => {
                write!(f, ": {} ({} plies)", report, report.plies_applied)
            }
            AuditOutcome::Undecodable(reason) => write!(f, ": undecodable: {}", reason),
        }
    }
}

/// Counts of audit outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Tally {
    pub games: usize,
    pub clean: usize,
    pub violations: usize,
    pub undecodable: usize,
}

impl Tally {
    pub fn from_audits(audits: &[GameAudit]) -> Self {
        let mut tally = Tally {
            games: audits.len(),
            ..Tally::default()
        };
        for audit in audits {
            match audit.status() {
                "clean" => tally.clean += 1,
                "violation" => tally.violations += 1,
                _ => tally.undecodable += 1,
            }
        }
        tally
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games: {} clean, {} with violations, {} undecodable",
            self.games, self.clean, self.violations, self.undecodable
        )
    }
}

/// Audits `jobs` on up to `workers` threads and returns one audit per job,
/// in job order.
///
/// The worker count is clamped to `1..=jobs.len()`. With
/// `reset_between_games` disabled each worker continues from the final board
/// of its previous game.
pub fn audit_games(jobs: Vec<GameJob>, workers: usize, reset_between_games: bool) -> Vec<GameAudit> {
    if jobs.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, jobs.len());
    tracing::info!(games = jobs.len(), workers, "Auditing games");

    let (sender, receiver) = unbounded::<GameAudit>();
    let jobs = &jobs;
    thread::scope(|scope| {
        for worker in 0..workers {
            let sender = sender.clone();
            scope.spawn(move || {
                let mut game = Game::new().reset_after_game(reset_between_games);
                for (index, job) in jobs.iter().enumerate().skip(worker).step_by(workers) {
                    if sender.send(audit_one(&mut game, index, job)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(sender);

    let mut audits: Vec<GameAudit> = receiver.into_iter().collect();
    audits.sort_by_key(|audit| audit.index);
    audits
}

fn audit_one(game: &mut Game, index: usize, job: &GameJob) -> GameAudit {
    // Engine events emitted while replaying carry the game's identity.
    let _span = tracing::info_span!("game", index = index + 1, source = ?job.source).entered();
    let outcome = match &job.moves {
        Err(err) => {
            tracing::warn!(game = index + 1, "Skipping game: {}", err);
            AuditOutcome::Undecodable(err.to_string())
        }
        Ok(tokens) => match game.evaluate_san(tokens.as_slice()) {
            Ok(report) => AuditOutcome::Evaluated(report),
            Err(err) => {
                tracing::warn!(game = index + 1, "Skipping game: {}", err);
                AuditOutcome::Undecodable(err.to_string())
            }
        },
    };
    GameAudit {
        index,
        source: job.source.clone(),
        headers: job.headers.clone(),
        result: job.result.clone(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::split_games;

    fn jobs(text: &str) -> Vec<GameJob> {
        split_games(text)
            .into_iter()
            .map(|game| GameJob::new(None, game))
            .collect()
    }

    const GAMES: &str = r#"
[White "A"]
[Black "B"]

1. e4 e5 2. Nf3 Nc6 1-0

1. e4 e5 2. Ke3 Nc6 0-1

1. e4 e5 Nf3 2. Nc6 *

1. d4 Zz9 *
"#;

    #[test]
    fn outcomes_are_classified() {
        let audits = audit_games(jobs(GAMES), 2, true);
        let statuses: Vec<&str> = audits.iter().map(GameAudit::status).collect();
        assert_eq!(
            statuses,
            vec!["clean", "violation", "undecodable", "undecodable"]
        );
        assert_eq!(audits[1].report().unwrap().plies_applied, 2);
        assert_eq!(audits[0].result.as_deref(), Some("1-0"));
        assert_eq!(audits[1].result.as_deref(), Some("0-1"));
        assert_eq!(
            Tally::from_audits(&audits),
            Tally {
                games: 4,
                clean: 1,
                violations: 1,
                undecodable: 2
            }
        );
    }

    #[test]
    fn results_come_back_in_job_order() {
        let audits = audit_games(jobs(GAMES), 8, true);
        let indices: Vec<usize> = audits.iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn zero_workers_still_runs() {
        let audits = audit_games(jobs(GAMES), 0, true);
        assert_eq!(audits.len(), 4);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn engine_events_carry_the_game_identity() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let job = GameJob::new(
            Some(PathBuf::from("club.pgn")),
            split_games("1. e4 e5 2. Ke3 *").remove(0),
        );
        tracing::subscriber::with_default(subscriber, || {
            let mut game = Game::new();
            audit_one(&mut game, 6, &job);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let engine_lines: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("move applied") || line.contains("game halted"))
            .collect();
        assert_eq!(engine_lines.len(), 3, "{}", output);
        for line in engine_lines {
            assert!(line.contains("game{index=7"), "{}", line);
            assert!(line.contains("club.pgn"), "{}", line);
        }
    }

    #[test]
    fn empty_batch() {
        assert!(audit_games(Vec::new(), 4, true).is_empty());
    }

    #[test]
    fn summary_line_names_players_and_outcome() {
        let audits = audit_games(jobs(GAMES), 1, true);
        assert_eq!(audits[0].to_string(), "#1 [A - B]: no violations (4 plies)");
        assert!(audits[3].to_string().starts_with("#4: undecodable: ply 2 (Zz9)"));
    }
}
