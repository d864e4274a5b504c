//! JSON report generation for audited games.
//!
//! One entry per game, in batch order, followed by the outcome totals.

use crate::batch::{AuditOutcome, GameAudit, Tally};
use chess_referee::GameStatus;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    WriteError(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    SerializeError(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct ReportJson<'a> {
    /// ISO 8601 timestamp when the report was created.
    created_at: String,
    games: Vec<GameJson<'a>>,
    totals: Tally,
}

impl<'a> ReportJson<'a> {
    fn new(audits: &'a [GameAudit]) -> Self {
        ReportJson {
            created_at: Utc::now().to_rfc3339(),
            games: audits.iter().map(GameJson::new).collect(),
            totals: Tally::from_audits(audits),
        }
    }
}

#[derive(Serialize)]
struct GameJson<'a> {
    /// 1-based position of the game in the batch.
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    white: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    black: Option<&'a str>,
    /// Result token recorded in the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a str>,
    /// "clean", "violation" or "undecodable".
    status: &'static str,
    plies_applied: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    violation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    halted_at_ply: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    halted_notation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decode_error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_placement: Option<&'a str>,
}

impl<'a> GameJson<'a> {
    fn new(audit: &'a GameAudit) -> Self {
        let mut json = GameJson {
            index: audit.index + 1,
            source: audit.source.as_deref(),
            event: audit.header("Event"),
            white: audit.header("White"),
            black: audit.header("Black"),
            result: audit.result.as_deref(),
            status: audit.status(),
            plies_applied: 0,
            violation: None,
            halted_at_ply: None,
            halted_notation: None,
            decode_error: None,
            final_placement: None,
        };
        match &audit.outcome {
            AuditOutcome::Evaluated(report) => {
                json.plies_applied = report.plies_applied;
                json.final_placement = Some(report.final_placement.as_str());
                if let GameStatus::Halted {
                    ply,
                    notation,
                    violation,
                } = &report.status
                {
                    json.violation = Some(violation.to_string());
                    json.halted_at_ply = Some(*ply);
                    json.halted_notation = Some(notation.as_str());
                }
            }
            AuditOutcome::Undecodable(reason) => json.decode_error = Some(reason.as_str()),
        }
        json
    }
}

/// Renders the report for `audits` as pretty-printed JSON.
pub fn to_json(audits: &[GameAudit]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(&ReportJson::new(audits))?)
}

/// Writes the report for `audits` to `path`.
///
/// # File Format
///
/// ```json
/// {
///   "created_at": "2024-01-15T12:00:00+00:00",
///   "games": [
///     {
///       "index": 1,
///       "source": "games/opera.pgn",
///       "white": "Morphy",
///       "black": "Duke Karl / Count Isouard",
///       "result": "1-0",
///       "status": "violation",
///       "plies_applied": 12,
///       "violation": "invalid move Bd4 for White Bishop: no legal path to destination",
///       "halted_at_ply": 13,
///       "halted_notation": "Bd4",
///       "final_placement": "rn1qkb1r/..."
///     }
///   ],
///   "totals": { "games": 1, "clean": 0, "violations": 1, "undecodable": 0 }
/// }
/// ```
pub fn write_json<P: AsRef<Path>>(path: P, audits: &[GameAudit]) -> Result<(), ReportError> {
    std::fs::write(path, to_json(audits)?)?;
    Ok(())
}
