//! Legacy Leaderboard Transform
//!
//! Pure transform from the legacy flat file (a JSON array of loosely typed
//! records) to canonical, deduplicated leaderboard entries. Applying the
//! result is the repository's job; see
//! [`LeaderboardRepository::apply_migration`](crate::domain::repository::LeaderboardRepository).

use crate::domain::entities::LeaderboardEntry;
use crate::domain::value_objects::{Difficulty, GameMode, PlayerName};
use crate::error::{GameError, GameResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use kernel::id::EntryId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unix timestamps above this are taken as milliseconds
const MILLIS_THRESHOLD: f64 = 1e12;

/// Text timestamp layout used by the flat file besides RFC 3339
const LEGACY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator for dedup keys; cannot occur in a valid name
const KEY_SEPARATOR: char = '\u{1f}';

/// One record of the legacy file as written by the old tooling
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyRecord {
    pub name: String,
    pub score: serde_json::Number,
    #[serde(alias = "game_mode", alias = "gameMode")]
    pub mode: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub timestamp: LegacyTimestamp,
}

/// Legacy timestamps are either Unix time or text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LegacyTimestamp {
    Unix(serde_json::Number),
    Text(String),
}

impl LegacyTimestamp {
    fn raw(&self) -> String {
        match self {
            LegacyTimestamp::Unix(n) => n.to_string(),
            LegacyTimestamp::Text(s) => s.clone(),
        }
    }

    fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            LegacyTimestamp::Unix(n) => {
                let value = n.as_f64()?;
                if !value.is_finite() || value < 0.0 {
                    return None;
                }
                let millis = if value > MILLIS_THRESHOLD {
                    value
                } else {
                    value * 1000.0
                };
                DateTime::from_timestamp_millis(millis.round() as i64)
            }
            LegacyTimestamp::Text(s) => {
                let s = s.trim();
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
                    .or_else(|| {
                        NaiveDateTime::parse_from_str(s, LEGACY_DATETIME_FORMAT)
                            .ok()
                            .map(|naive| naive.and_utc())
                    })
            }
        }
    }
}

/// Marker stored with the leaderboard once a legacy file has been applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMarker {
    /// SHA-256 of the legacy file bytes
    pub source_digest: String,
    pub source_path: String,
    pub backup_path: String,
    pub migrated_entries: usize,
    pub migrated_at: DateTime<Utc>,
}

/// Result of applying a canonical batch to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationOutcome {
    pub inserted: usize,
    /// Entries already present in the store (same deterministic id)
    pub skipped_existing: usize,
    /// The marker for this source was found; nothing was written
    pub already_applied: bool,
}

/// Canonical entries produced from a legacy file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBatch {
    pub entries: Vec<LeaderboardEntry>,
    pub duplicates: usize,
}

/// Parse the legacy file contents
pub fn parse_legacy(bytes: &[u8]) -> GameResult<Vec<LegacyRecord>> {
    serde_json::from_slice(bytes)
        .map_err(|e| GameError::MigrationFailed(format!("legacy file is not readable: {e}")))
}

/// Validate and deduplicate legacy records.
///
/// Records identical in name, score, mode and timestamp collapse into the
/// first occurrence. Any invalid record fails the whole batch.
pub fn canonicalize(
    records: Vec<LegacyRecord>,
    name_max_length: usize,
) -> GameResult<CanonicalBatch> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(records.len());
    let mut duplicates = 0;

    for (index, record) in records.into_iter().enumerate() {
        let key = dedup_key(&record);
        if !seen.insert(key.clone()) {
            duplicates += 1;
            continue;
        }
        let entry = canonical_entry(&record, &key, name_max_length)
            .map_err(|reason| GameError::MigrationFailed(format!("record {index}: {reason}")))?;
        entries.push(entry);
    }

    Ok(CanonicalBatch { entries, duplicates })
}

fn dedup_key(record: &LegacyRecord) -> String {
    [
        record.name.as_str(),
        &record.score.to_string(),
        record.mode.as_str(),
        &record.timestamp.raw(),
    ]
    .join(&KEY_SEPARATOR.to_string())
}

fn canonical_entry(
    record: &LegacyRecord,
    key: &str,
    name_max_length: usize,
) -> Result<LeaderboardEntry, String> {
    let name = PlayerName::new(&record.name, name_max_length).map_err(|e| e.to_string())?;
    let game_mode: GameMode = record.mode.parse().map_err(|e: GameError| e.to_string())?;
    let difficulty = match &record.difficulty {
        Some(raw) => raw.parse::<Difficulty>().map_err(|e| e.to_string())?,
        None => Difficulty::Medium,
    };

    let score = record
        .score
        .as_f64()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .ok_or_else(|| format!("score {} is not a non-negative number", record.score))?
        .round() as i64;

    let timestamp = record
        .timestamp
        .to_utc()
        .ok_or_else(|| format!("timestamp '{}' is not recognized", record.timestamp.raw()))?;

    Ok(LeaderboardEntry {
        id: EntryId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())),
        name,
        score,
        game_mode,
        difficulty,
        timestamp,
    })
}
