//! Migrate Legacy Leaderboard Use Case

use crate::application::config::GameConfig;
use crate::domain::migration::{self, MigrationMarker};
use crate::domain::repository::LeaderboardRepository;
use crate::error::{GameError, GameResult};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Timestamp format appended to backup file names
const BACKUP_STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Output DTO for a migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Entries written by this run
    pub migrated: usize,
    /// Identical records collapsed inside the legacy file
    pub duplicates_skipped: usize,
    /// Entries that were already in the store
    pub already_present: usize,
    /// This exact file had been migrated before; nothing was done
    pub already_migrated: bool,
    pub backup_path: Option<PathBuf>,
}

/// Migrate Legacy Use Case
///
/// Reads the flat file, canonicalizes it, keeps a timestamped backup copy
/// and applies the batch once per distinct file content.
pub struct MigrateLegacyUseCase<B>
where
    B: LeaderboardRepository,
{
    leaderboard: Arc<B>,
    config: Arc<GameConfig>,
}

impl<B> MigrateLegacyUseCase<B>
where
    B: LeaderboardRepository,
{
    pub fn new(leaderboard: Arc<B>, config: Arc<GameConfig>) -> Self {
        Self { leaderboard, config }
    }

    pub async fn execute(&self, source: &Path) -> GameResult<MigrationReport> {
        let bytes = tokio::fs::read(source).await.map_err(|e| {
            GameError::MigrationFailed(format!("cannot read {}: {e}", source.display()))
        })?;
        let digest = platform::crypto::sha256_hex(&bytes);

        if self.leaderboard.is_migrated(&digest).await? {
            tracing::info!(
                source = %source.display(),
                digest = %digest,
                "Legacy leaderboard already migrated"
            );
            return Ok(MigrationReport {
                already_migrated: true,
                ..Default::default()
            });
        }

        let batch = migration::parse_legacy(&bytes)
            .and_then(|records| {
                migration::canonicalize(records, self.config.player_name_max_length)
            })
            .inspect_err(|e| {
                tracing::error!(
                    source = %source.display(),
                    error = %e,
                    "Legacy leaderboard rejected"
                );
            })?;

        let stamp = Utc::now().format(BACKUP_STAMP_FORMAT).to_string();
        let backup_path = platform::fs::backup_copy(source, &stamp).await.map_err(|e| {
            GameError::MigrationFailed(format!("cannot back up {}: {e}", source.display()))
        })?;

        let marker = MigrationMarker {
            source_digest: digest,
            source_path: source.display().to_string(),
            backup_path: backup_path.display().to_string(),
            migrated_entries: batch.entries.len(),
            migrated_at: Utc::now(),
        };
        let outcome = self.leaderboard.apply_migration(batch.entries, marker).await?;

        if outcome.already_applied {
            tracing::info!(source = %source.display(), "Legacy leaderboard migrated concurrently");
            return Ok(MigrationReport {
                already_migrated: true,
                backup_path: Some(backup_path),
                ..Default::default()
            });
        }

        tracing::info!(
            source = %source.display(),
            backup = %backup_path.display(),
            migrated = outcome.inserted,
            duplicates = batch.duplicates,
            already_present = outcome.skipped_existing,
            "Legacy leaderboard migrated"
        );

        Ok(MigrationReport {
            migrated: outcome.inserted,
            duplicates_skipped: batch.duplicates,
            already_present: outcome.skipped_existing,
            already_migrated: false,
            backup_path: Some(backup_path),
        })
    }
}
