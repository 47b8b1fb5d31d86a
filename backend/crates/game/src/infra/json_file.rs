//! JSON File Leaderboard Repository
//!
//! The whole leaderboard lives in one versioned JSON document. Every write
//! replaces the file atomically (tmp file, fsync, rename) while the write
//! lock is held. Changes are staged on a copy of the document and swapped in
//! only after the file write succeeds, so a failed or cancelled write leaves
//! readers on the last durable state.

use crate::domain::entities::LeaderboardEntry;
use crate::domain::migration::{MigrationMarker, MigrationOutcome};
use crate::domain::repository::LeaderboardRepository;
use crate::domain::services::ranking;
use crate::domain::value_objects::{Difficulty, GameMode};
use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Current on-disk schema version
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LeaderboardDocument {
    schema_version: u32,
    #[serde(default)]
    entries: Vec<LeaderboardEntry>,
    #[serde(default)]
    migrations: Vec<MigrationMarker>,
}

impl Default for LeaderboardDocument {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            entries: Vec::new(),
            migrations: Vec::new(),
        }
    }
}

/// JSON-file backed leaderboard
#[derive(Debug)]
pub struct JsonLeaderboardRepository {
    path: PathBuf,
    document: RwLock<LeaderboardDocument>,
}

impl JsonLeaderboardRepository {
    /// Open the store at `path`; a missing file is an empty leaderboard
    pub async fn open(path: impl Into<PathBuf>) -> GameResult<Self> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => decode(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => LeaderboardDocument::default(),
            Err(e) => {
                return Err(GameError::PersistenceFailure(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        tracing::info!(
            path = %path.display(),
            entries = document.entries.len(),
            migrations = document.migrations.len(),
            "Leaderboard store opened"
        );

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total stored entries across all boards
    pub async fn len(&self) -> usize {
        self.document.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn persist(&self, document: &LeaderboardDocument) -> GameResult<()> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| GameError::Internal(format!("cannot encode leaderboard: {e}")))?;
        platform::fs::write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| {
                GameError::PersistenceFailure(format!("cannot write {}: {e}", self.path.display()))
            })
    }
}

fn decode(bytes: &[u8]) -> GameResult<LeaderboardDocument> {
    #[derive(Deserialize)]
    struct VersionProbe {
        schema_version: u32,
    }

    let probe: VersionProbe = serde_json::from_slice(bytes)
        .map_err(|e| GameError::Internal(format!("leaderboard file is corrupt: {e}")))?;
    if probe.schema_version > SCHEMA_VERSION {
        return Err(GameError::UnsupportedSchema {
            found: probe.schema_version,
            supported: SCHEMA_VERSION,
        });
    }
    serde_json::from_slice(bytes)
        .map_err(|e| GameError::Internal(format!("leaderboard file is corrupt: {e}")))
}

impl LeaderboardRepository for JsonLeaderboardRepository {
    async fn insert(&self, entry: LeaderboardEntry) -> GameResult<usize> {
        let mut document = self.document.write().await;
        let mut next = document.clone();
        next.entries.push(entry.clone());

        self.persist(&next).await?;
        *document = next;

        Ok(ranking::rank_of(&document.entries, &entry))
    }

    async fn board(
        &self,
        mode: GameMode,
        difficulty: Difficulty,
    ) -> GameResult<Vec<LeaderboardEntry>> {
        let document = self.document.read().await;
        Ok(ranking::ranked_board(&document.entries, mode, difficulty))
    }

    async fn is_migrated(&self, source_digest: &str) -> GameResult<bool> {
        let document = self.document.read().await;
        Ok(document
            .migrations
            .iter()
            .any(|m| m.source_digest == source_digest))
    }

    async fn apply_migration(
        &self,
        entries: Vec<LeaderboardEntry>,
        marker: MigrationMarker,
    ) -> GameResult<MigrationOutcome> {
        let mut document = self.document.write().await;
        if document
            .migrations
            .iter()
            .any(|m| m.source_digest == marker.source_digest)
        {
            return Ok(MigrationOutcome {
                already_applied: true,
                ..Default::default()
            });
        }

        let existing: HashSet<_> = document.entries.iter().map(|e| e.id).collect();
        let total = entries.len();
        let fresh: Vec<_> = entries
            .into_iter()
            .filter(|e| !existing.contains(&e.id))
            .collect();
        let inserted = fresh.len();

        let mut next = document.clone();
        next.entries.extend(fresh);
        next.migrations.push(MigrationMarker {
            migrated_entries: inserted,
            ..marker
        });

        self.persist(&next).await?;
        *document = next;

        Ok(MigrationOutcome {
            inserted,
            skipped_existing: total - inserted,
            already_applied: false,
        })
    }
}
