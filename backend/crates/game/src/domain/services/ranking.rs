//! Leaderboard Ranking
//!
//! Order is a pure function of the stored entries: score (direction depends
//! on the mode), then earliest timestamp, then entry id.

use crate::domain::entities::LeaderboardEntry;
use crate::domain::value_objects::{Difficulty, GameMode};
use crate::error::{GameError, GameResult};
use std::cmp::Ordering;

/// Total order used on every board
pub fn compare_entries(mode: GameMode, a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    let by_score = if mode.lower_is_better() {
        a.score.cmp(&b.score)
    } else {
        b.score.cmp(&a.score)
    };
    by_score
        .then_with(|| a.timestamp.cmp(&b.timestamp))
        .then_with(|| a.id.cmp(&b.id))
}

/// Entries of one (mode, difficulty) board in rank order
pub fn ranked_board<'a, I>(
    entries: I,
    mode: GameMode,
    difficulty: Difficulty,
) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a LeaderboardEntry>,
{
    let mut board: Vec<LeaderboardEntry> = entries
        .into_iter()
        .filter(|e| e.game_mode == mode && e.difficulty == difficulty)
        .cloned()
        .collect();
    board.sort_by(|a, b| compare_entries(mode, a, b));
    board
}

/// 1-based rank of `entry` among `entries` of the same board
pub fn rank_of<'a, I>(entries: I, entry: &LeaderboardEntry) -> usize
where
    I: IntoIterator<Item = &'a LeaderboardEntry>,
{
    1 + entries
        .into_iter()
        .filter(|e| e.game_mode == entry.game_mode && e.difficulty == entry.difficulty)
        .filter(|e| e.id != entry.id)
        .filter(|e| compare_entries(entry.game_mode, e, entry) == Ordering::Less)
        .count()
}

/// Highest score a finished session of `mode` can legitimately reach, if bounded
pub fn max_score(
    mode: GameMode,
    challenge_max_points: i64,
    challenge_listings: u32,
) -> Option<i64> {
    match mode {
        GameMode::Challenge => {
            Some(challenge_max_points.saturating_mul(i64::from(challenge_listings)))
        }
        GameMode::Zero | GameMode::Streak => None,
    }
}

/// Validate a submitted score for `mode`
pub fn validate_score(mode: GameMode, score: i64, upper_bound: Option<i64>) -> GameResult<()> {
    if score < 0 {
        return Err(GameError::InvalidEntry(format!(
            "{mode} score cannot be negative"
        )));
    }
    if let Some(max) = upper_bound
        && score > max
    {
        return Err(GameError::InvalidEntry(format!(
            "{mode} score cannot exceed {max}"
        )));
    }
    Ok(())
}
