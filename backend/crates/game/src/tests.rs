//! Use-case tests for the game crate, grouped by concern

#[cfg(test)]
mod fixtures {
    use crate::application::config::GameConfig;
    use crate::domain::entities::{Listing, test_listing};
    use crate::infra::catalog::CatalogListingProvider;
    use crate::infra::json_file::JsonLeaderboardRepository;
    use crate::infra::memory::{InMemoryChallengeStore, InMemorySessionStore};
    use std::sync::Arc;

    pub struct Harness {
        pub listings: Arc<CatalogListingProvider>,
        pub leaderboard: Arc<JsonLeaderboardRepository>,
        pub challenges: Arc<InMemoryChallengeStore>,
        pub sessions: Arc<InMemorySessionStore>,
        pub config: Arc<GameConfig>,
        pub dir: tempfile::TempDir,
    }

    /// Listings 1..=n, all priced 10_000
    pub fn catalog(n: u128) -> Vec<Listing> {
        (1..=n).map(|i| test_listing(i, 10_000)).collect()
    }

    pub async fn harness(listings: Vec<Listing>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let leaderboard = JsonLeaderboardRepository::open(dir.path().join("leaderboard.json"))
            .await
            .unwrap();
        Harness {
            listings: Arc::new(CatalogListingProvider::new(listings)),
            leaderboard: Arc::new(leaderboard),
            challenges: Arc::new(InMemoryChallengeStore::new()),
            sessions: Arc::new(InMemorySessionStore::new()),
            config: Arc::new(GameConfig::default()),
            dir,
        }
    }
}

#[cfg(test)]
mod session_tests {
    use super::fixtures::*;
    use crate::application::begin_session::{BeginSessionInput, BeginSessionUseCase};
    use crate::application::end_session::EndSessionUseCase;
    use crate::application::get_next_listing::GetNextListingUseCase;
    use crate::application::submit_guess::{SubmitGuessInput, SubmitGuessUseCase};
    use crate::domain::value_objects::{Difficulty, GameMode, SessionId, SessionState};
    use crate::error::GameError;
    use crate::infra::catalog::CatalogListingProvider;
    use crate::infra::memory::InMemoryChallengeStore;
    use kernel::id::ListingId;
    use std::collections::VecDeque;

    fn sid(raw: &str) -> SessionId {
        SessionId::new(raw).unwrap()
    }

    struct Player {
        next: GetNextListingUseCase<CatalogListingProvider>,
        guess: SubmitGuessUseCase<CatalogListingProvider, InMemoryChallengeStore>,
    }

    fn player(h: &Harness) -> Player {
        Player {
            next: GetNextListingUseCase::new(
                h.listings.clone(),
                h.sessions.clone(),
                h.config.clone(),
            ),
            guess: SubmitGuessUseCase::new(
                h.listings.clone(),
                h.challenges.clone(),
                h.sessions.clone(),
                h.config.clone(),
            ),
        }
    }

    async fn begin(h: &Harness, id: &str, mode: GameMode) {
        BeginSessionUseCase::new(h.challenges.clone(), h.sessions.clone(), h.config.clone())
            .execute(BeginSessionInput {
                session_id: sid(id),
                mode: Some(mode),
                difficulty: Some(Difficulty::Medium),
                challenge_code: None,
            })
            .await
            .unwrap();
    }

    fn guess(id: &str, listing_id: ListingId, guessed_price: i64) -> SubmitGuessInput {
        SubmitGuessInput {
            session_id: sid(id),
            listing_id,
            guessed_price,
        }
    }

    #[tokio::test]
    async fn test_unknown_session_starts_zero_mode() {
        let h = harness(catalog(5)).await;
        let p = player(&h);
        let out = p.next.execute(sid("fresh"), Some(Difficulty::Medium)).await.unwrap();
        assert_eq!(out.mode, GameMode::Zero);
        assert_eq!(out.state, SessionState::InProgress);
        assert_eq!(out.ordinal, 0);
    }

    #[tokio::test]
    async fn test_rerequest_is_idempotent() {
        let h = harness(catalog(5)).await;
        let p = player(&h);
        let first = p.next.execute(sid("s"), None).await.unwrap();
        let second = p.next.execute(sid("s"), None).await.unwrap();
        assert_eq!(first.listing.id, second.listing.id);
        assert_eq!(second.ordinal, 0);
    }

    #[tokio::test]
    async fn test_no_repeat_within_history_window() {
        let h = harness(catalog(12)).await;
        let p = player(&h);
        begin(&h, "s", GameMode::Zero).await;

        let window = h.config.history_window;
        let mut recent: VecDeque<ListingId> = VecDeque::new();
        let mut current = p.next.execute(sid("s"), None).await.unwrap().listing.id;

        for _ in 0..60 {
            assert!(!recent.contains(&current), "listing repeated within window");
            recent.push_back(current);
            if recent.len() >= window {
                recent.pop_front();
            }
            let out = p.guess.execute(guess("s", current, 9_000)).await.unwrap();
            current = out.next_listing.unwrap().id;
        }
    }

    #[tokio::test]
    async fn test_zero_mode_sums_differences() {
        let h = harness(catalog(12)).await;
        let p = player(&h);
        begin(&h, "z", GameMode::Zero).await;

        let guesses = [10_000, 12_500, 0, 9_999, 30_000];
        let mut expected = 0;
        let mut current = p.next.execute(sid("z"), None).await.unwrap().listing.id;
        for g in guesses {
            let out = p.guess.execute(guess("z", current, g)).await.unwrap();
            expected += (g - 10_000_i64).abs();
            assert_eq!(out.cumulative_score, expected);
            assert!(out.cumulative_score >= 0);
            assert!(out.continues);
            current = out.next_listing.unwrap().id;
        }

        let summary = EndSessionUseCase::new(h.sessions.clone())
            .execute(sid("z"))
            .await
            .unwrap();
        assert_eq!(summary.state, SessionState::Complete);
        assert_eq!(summary.cumulative_score, expected);
        assert!(matches!(
            p.next.execute(sid("z"), None).await,
            Err(GameError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn test_streak_ends_on_first_miss() {
        let h = harness(catalog(12)).await;
        let p = player(&h);
        begin(&h, "st", GameMode::Streak).await;

        let mut current = p.next.execute(sid("st"), None).await.unwrap().listing.id;
        for _ in 0..4 {
            let out = p.guess.execute(guess("st", current, 10_500)).await.unwrap();
            assert!(out.continues);
            current = out.next_listing.unwrap().id;
        }
        let out = p.guess.execute(guess("st", current, 20_000)).await.unwrap();
        assert!(!out.continues);
        assert_eq!(out.state, SessionState::Complete);
        assert_eq!(out.cumulative_score, 4);
        assert!(out.next_listing.is_none());

        // ending a finished session just reports it
        let summary = EndSessionUseCase::new(h.sessions.clone())
            .execute(sid("st"))
            .await
            .unwrap();
        assert_eq!(summary.cumulative_score, 4);
    }

    #[tokio::test]
    async fn test_streak_cannot_be_ended_early() {
        let h = harness(catalog(3)).await;
        begin(&h, "st", GameMode::Streak).await;
        assert!(matches!(
            EndSessionUseCase::new(h.sessions.clone()).execute(sid("st")).await,
            Err(GameError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_challenge_completes_after_ten_guesses() {
        let h = harness(catalog(15)).await;
        let p = player(&h);
        begin(&h, "ch", GameMode::Challenge).await;

        let mut current = p.next.execute(sid("ch"), None).await.unwrap().listing.id;
        for n in 1..=10u32 {
            let out = p.guess.execute(guess("ch", current, 10_000)).await.unwrap();
            assert_eq!(out.ordinal, n);
            if n < 10 {
                assert!(out.continues);
                current = out.next_listing.unwrap().id;
            } else {
                assert!(!out.continues);
                assert_eq!(out.state, SessionState::Complete);
                assert_eq!(out.cumulative_score, 10_000);
            }
        }

        assert!(matches!(
            p.guess.execute(guess("ch", current, 10_000)).await,
            Err(GameError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn test_stale_guess_rejected_even_if_exact() {
        let h = harness(catalog(5)).await;
        let p = player(&h);
        begin(&h, "s", GameMode::Streak).await;
        let current = p.next.execute(sid("s"), None).await.unwrap().listing.id;
        let other = (1..=5)
            .map(ListingId::from_u128)
            .find(|id| *id != current)
            .unwrap();

        assert!(matches!(
            p.guess.execute(guess("s", other, 10_000)).await,
            Err(GameError::StaleGuess)
        ));

        // replaying an accepted guess is stale too
        let out = p.guess.execute(guess("s", current, 10_000)).await.unwrap();
        assert_eq!(out.ordinal, 1);
        assert!(matches!(
            p.guess.execute(guess("s", current, 10_000)).await,
            Err(GameError::StaleGuess)
        ));
    }

    #[tokio::test]
    async fn test_guess_for_unknown_session() {
        let h = harness(catalog(2)).await;
        let p = player(&h);
        assert!(matches!(
            p.guess
                .execute(guess("ghost", ListingId::from_u128(1), 1))
                .await,
            Err(GameError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_guesses_are_serialized() {
        let h = harness(catalog(12)).await;
        let p = std::sync::Arc::new(player(&h));
        begin(&h, "race", GameMode::Zero).await;
        let current = p.next.execute(sid("race"), None).await.unwrap().listing.id;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let p = p.clone();
                tokio::spawn(async move { p.guess.execute(guess("race", current, 10_000)).await })
            })
            .collect();

        let mut accepted = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(e) => assert!(matches!(e, GameError::StaleGuess)),
            }
        }
        assert_eq!(accepted, 1);
    }

    #[tokio::test]
    async fn test_empty_tier_relaxes_and_empty_catalog_fails() {
        let h = harness(catalog(3)).await;
        let p = player(&h);
        // catalog is all medium; hard relaxes to the whole catalog
        let out = p.next.execute(sid("hard"), Some(Difficulty::Hard)).await.unwrap();
        assert_eq!(out.difficulty, Difficulty::Hard);

        let empty = harness(Vec::new()).await;
        let p = player(&empty);
        assert!(matches!(
            p.next.execute(sid("none"), None).await,
            Err(GameError::NoListingsAvailable)
        ));
    }

    #[tokio::test]
    async fn test_begin_replaces_session() {
        let h = harness(catalog(5)).await;
        let p = player(&h);
        begin(&h, "r", GameMode::Zero).await;
        let current = p.next.execute(sid("r"), None).await.unwrap().listing.id;
        p.guess.execute(guess("r", current, 1)).await.unwrap();

        begin(&h, "r", GameMode::Streak).await;
        let out = p.next.execute(sid("r"), None).await.unwrap();
        assert_eq!(out.mode, GameMode::Streak);
        assert_eq!(out.ordinal, 0);
        assert_eq!(out.cumulative_score, 0);
    }
}

#[cfg(test)]
mod challenge_tests {
    use super::fixtures::*;
    use crate::application::begin_session::{BeginSessionInput, BeginSessionUseCase};
    use crate::application::challenge::{ChallengeStandingsUseCase, CreateChallengeUseCase};
    use crate::application::get_next_listing::GetNextListingUseCase;
    use crate::application::submit_guess::{SubmitGuessInput, SubmitGuessUseCase};
    use crate::domain::value_objects::{Difficulty, GameMode, SessionId};
    use crate::error::GameError;
    use kernel::id::ListingId;

    #[tokio::test]
    async fn test_shared_challenge_plays_same_sequence() {
        let h = harness(catalog(20)).await;
        let challenge = CreateChallengeUseCase::new(
            h.listings.clone(),
            h.challenges.clone(),
            h.config.clone(),
        )
        .execute(Difficulty::Medium)
        .await
        .unwrap();
        assert_eq!(challenge.listing_ids.len(), 10);

        let begin =
            BeginSessionUseCase::new(h.challenges.clone(), h.sessions.clone(), h.config.clone());
        let next =
            GetNextListingUseCase::new(h.listings.clone(), h.sessions.clone(), h.config.clone());
        let guess = SubmitGuessUseCase::new(
            h.listings.clone(),
            h.challenges.clone(),
            h.sessions.clone(),
            h.config.clone(),
        );

        let mut sequences: Vec<Vec<ListingId>> = Vec::new();
        for (player, price) in [("p1", 10_000), ("p2", 12_000)] {
            let summary = begin
                .execute(BeginSessionInput {
                    session_id: SessionId::new(player).unwrap(),
                    mode: None,
                    difficulty: None,
                    challenge_code: Some(challenge.code.as_str().to_lowercase()),
                })
                .await
                .unwrap();
            assert_eq!(summary.mode, GameMode::Challenge);
            assert_eq!(summary.target_listings, Some(10));

            let sid = SessionId::new(player).unwrap();
            let mut seen = Vec::new();
            let mut current = next.execute(sid.clone(), None).await.unwrap().listing.id;
            loop {
                seen.push(current);
                let out = guess
                    .execute(SubmitGuessInput {
                        session_id: sid.clone(),
                        listing_id: current,
                        guessed_price: price,
                    })
                    .await
                    .unwrap();
                match out.next_listing {
                    Some(view) => current = view.id,
                    None => break,
                }
            }
            sequences.push(seen);
        }

        assert_eq!(sequences[0], challenge.listing_ids);
        assert_eq!(sequences[0], sequences[1]);

        let standings = ChallengeStandingsUseCase::new(h.challenges.clone())
            .execute(challenge.code.as_str())
            .await
            .unwrap();
        assert_eq!(standings.standings.len(), 2);
        assert_eq!(standings.standings[0].session_id.as_str(), "p1");
        assert_eq!(standings.standings[0].score, 10_000);
        assert!(standings.standings[1].score < 10_000);
    }

    #[tokio::test]
    async fn test_challenge_needs_enough_listings() {
        let h = harness(catalog(4)).await;
        assert!(matches!(
            CreateChallengeUseCase::new(h.listings.clone(), h.challenges.clone(), h.config.clone())
                .execute(Difficulty::Easy)
                .await,
            Err(GameError::NoListingsAvailable)
        ));
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let h = harness(catalog(4)).await;
        let begin =
            BeginSessionUseCase::new(h.challenges.clone(), h.sessions.clone(), h.config.clone());
        let result = begin
            .execute(BeginSessionInput {
                session_id: SessionId::new("p").unwrap(),
                mode: None,
                difficulty: None,
                challenge_code: Some("ABCDEF".into()),
            })
            .await;
        assert!(matches!(result, Err(GameError::ChallengeNotFound)));

        let result = begin
            .execute(BeginSessionInput {
                session_id: SessionId::new("p").unwrap(),
                mode: Some(GameMode::Streak),
                difficulty: None,
                challenge_code: Some("ABCDEF".into()),
            })
            .await;
        assert!(matches!(result, Err(GameError::InvalidInput(_))));
    }
}

#[cfg(test)]
mod leaderboard_tests {
    use super::fixtures::*;
    use crate::application::begin_session::{BeginSessionInput, BeginSessionUseCase};
    use crate::application::get_next_listing::GetNextListingUseCase;
    use crate::application::query_leaderboard::QueryLeaderboardUseCase;
    use crate::application::submit_guess::{SubmitGuessInput, SubmitGuessUseCase};
    use crate::application::submit_score::{SubmitScoreInput, SubmitScoreUseCase};
    use crate::domain::value_objects::{Difficulty, GameMode, SessionId};
    use crate::domain::entities::LeaderboardEntry;
    use crate::domain::repository::LeaderboardRepository;
    use crate::domain::services::ranking;
    use crate::domain::value_objects::PlayerName;
    use crate::error::GameError;
    use crate::infra::json_file::JsonLeaderboardRepository;
    use std::cmp::Ordering;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn entry(name: &str, score: i64, mode: GameMode) -> SubmitScoreInput {
        SubmitScoreInput {
            name: name.to_string(),
            score,
            mode,
            difficulty: Difficulty::Medium,
            session_id: None,
        }
    }

    async fn scores(h: &Harness, mode: GameMode, limit: Option<usize>) -> Vec<i64> {
        QueryLeaderboardUseCase::new(h.leaderboard.clone(), h.config.clone())
            .execute(mode, Difficulty::Medium, limit)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.score)
            .collect()
    }

    #[tokio::test]
    async fn test_ranking_direction_per_mode() {
        let h = harness(catalog(1)).await;
        let submit =
            SubmitScoreUseCase::new(h.leaderboard.clone(), h.sessions.clone(), h.config.clone());
        for (name, score) in [("a", 50), ("b", 90), ("c", 70)] {
            submit.execute(entry(name, score, GameMode::Streak)).await.unwrap();
            submit.execute(entry(name, score, GameMode::Zero)).await.unwrap();
        }

        assert_eq!(scores(&h, GameMode::Streak, None).await, vec![90, 70, 50]);
        assert_eq!(scores(&h, GameMode::Zero, None).await, vec![50, 70, 90]);
        assert_eq!(scores(&h, GameMode::Streak, Some(1)).await, vec![90]);
        assert!(scores(&h, GameMode::Challenge, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_returns_rank() {
        let h = harness(catalog(1)).await;
        let submit =
            SubmitScoreUseCase::new(h.leaderboard.clone(), h.sessions.clone(), h.config.clone());
        assert_eq!(submit.execute(entry("a", 100, GameMode::Zero)).await.unwrap().rank, 1);
        assert_eq!(submit.execute(entry("b", 50, GameMode::Zero)).await.unwrap().rank, 1);
        assert_eq!(submit.execute(entry("c", 75, GameMode::Zero)).await.unwrap().rank, 2);
        // ties go to the earlier entry
        assert_eq!(submit.execute(entry("d", 50, GameMode::Zero)).await.unwrap().rank, 2);
    }

    #[tokio::test]
    async fn test_invalid_entries() {
        let h = harness(catalog(1)).await;
        let submit =
            SubmitScoreUseCase::new(h.leaderboard.clone(), h.sessions.clone(), h.config.clone());
        for bad in [
            entry("", 1, GameMode::Streak),
            entry("a name that is far too long", 1, GameMode::Streak),
            entry("<img>", 1, GameMode::Streak),
            entry("tab\there", 1, GameMode::Streak),
            entry("neg", -1, GameMode::Zero),
            entry("max", 10_001, GameMode::Challenge),
        ] {
            assert!(matches!(
                submit.execute(bad).await,
                Err(GameError::InvalidEntry(_))
            ));
        }
        assert!(scores(&h, GameMode::Streak, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_session_bound_submission() {
        let h = harness(catalog(12)).await;
        let sid = SessionId::new("bound").unwrap();
        BeginSessionUseCase::new(h.challenges.clone(), h.sessions.clone(), h.config.clone())
            .execute(BeginSessionInput {
                session_id: sid.clone(),
                mode: Some(GameMode::Streak),
                difficulty: Some(Difficulty::Medium),
                challenge_code: None,
            })
            .await
            .unwrap();
        let submit =
            SubmitScoreUseCase::new(h.leaderboard.clone(), h.sessions.clone(), h.config.clone());
        let bound = |score| SubmitScoreInput {
            session_id: Some(sid.clone()),
            ..entry("player", score, GameMode::Streak)
        };

        // still in progress
        assert!(matches!(
            submit.execute(bound(0)).await,
            Err(GameError::InvalidEntry(_))
        ));

        let listing = GetNextListingUseCase::new(
            h.listings.clone(),
            h.sessions.clone(),
            h.config.clone(),
        )
        .execute(sid.clone(), None)
        .await
        .unwrap()
        .listing;
        let out = SubmitGuessUseCase::new(
            h.listings.clone(),
            h.challenges.clone(),
            h.sessions.clone(),
            h.config.clone(),
        )
        .execute(SubmitGuessInput {
            session_id: sid.clone(),
            listing_id: listing.id,
            guessed_price: 1,
        })
        .await
        .unwrap();
        assert!(!out.continues);

        // claimed score must match
        assert!(matches!(
            submit.execute(bound(5)).await,
            Err(GameError::InvalidEntry(_))
        ));
        assert_eq!(submit.execute(bound(0)).await.unwrap().rank, 1);
        // only once
        assert!(matches!(
            submit.execute(bound(0)).await,
            Err(GameError::InvalidEntry(_))
        ));
    }

    fn assert_consistent(board: &[LeaderboardEntry]) {
        for pair in board.windows(2) {
            assert_eq!(
                ranking::compare_entries(GameMode::Streak, &pair[0], &pair[1]),
                Ordering::Less
            );
        }
        let ids: HashSet<_> = board.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), board.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_and_readers() {
        let h = harness(catalog(1)).await;
        let board = h.leaderboard.clone();

        let mut writers = Vec::new();
        for i in 0..24_i64 {
            let board = board.clone();
            writers.push(tokio::spawn(async move {
                let name = PlayerName::new(&format!("p{i}"), 20).unwrap();
                let entry =
                    LeaderboardEntry::new(name, i % 7, GameMode::Streak, Difficulty::Medium);
                if i % 4 == 0 {
                    // abandoned by its caller; stored only if the write already finished
                    tokio::time::timeout(Duration::ZERO, board.insert(entry))
                        .await
                        .is_ok()
                } else {
                    board.insert(entry).await.unwrap();
                    true
                }
            }));
        }

        let mut readers = Vec::new();
        for _ in 0..8 {
            let board = board.clone();
            readers.push(tokio::spawn(async move {
                let mut seen = 0;
                for _ in 0..20 {
                    let snapshot = board
                        .board(GameMode::Streak, Difficulty::Medium)
                        .await
                        .unwrap();
                    assert_consistent(&snapshot);
                    // entries never disappear between snapshots
                    assert!(snapshot.len() >= seen);
                    seen = snapshot.len();
                    tokio::task::yield_now().await;
                }
            }));
        }

        let mut stored = 0;
        for writer in writers {
            if writer.await.unwrap() {
                stored += 1;
            }
        }
        for reader in readers {
            reader.await.unwrap();
        }
        assert!(stored >= 18);

        let in_memory = board.board(GameMode::Streak, Difficulty::Medium).await.unwrap();
        assert_consistent(&in_memory);
        assert_eq!(in_memory.len(), stored);

        let reopened = JsonLeaderboardRepository::open(board.path()).await.unwrap();
        let on_disk = reopened.board(GameMode::Streak, Difficulty::Medium).await.unwrap();
        assert_eq!(on_disk, in_memory);
    }

    #[tokio::test]
    async fn test_persistence_failure_leaves_submission_retryable() {
        let h = harness(catalog(12)).await;
        let sid = SessionId::new("retry").unwrap();

        // a store whose parent directory turns into a file after opening
        let parent = h.dir.path().join("nested");
        let failing = Arc::new(
            JsonLeaderboardRepository::open(parent.join("board.json"))
                .await
                .unwrap(),
        );
        std::fs::write(&parent, b"not a directory").unwrap();

        BeginSessionUseCase::new(h.challenges.clone(), h.sessions.clone(), h.config.clone())
            .execute(BeginSessionInput {
                session_id: sid.clone(),
                mode: Some(GameMode::Streak),
                difficulty: Some(Difficulty::Medium),
                challenge_code: None,
            })
            .await
            .unwrap();
        let listing = GetNextListingUseCase::new(
            h.listings.clone(),
            h.sessions.clone(),
            h.config.clone(),
        )
        .execute(sid.clone(), None)
        .await
        .unwrap()
        .listing;
        SubmitGuessUseCase::new(
            h.listings.clone(),
            h.challenges.clone(),
            h.sessions.clone(),
            h.config.clone(),
        )
        .execute(SubmitGuessInput {
            session_id: sid.clone(),
            listing_id: listing.id,
            guessed_price: 1,
        })
        .await
        .unwrap();

        let input = SubmitScoreInput {
            session_id: Some(sid.clone()),
            ..entry("retry", 0, GameMode::Streak)
        };

        let err = SubmitScoreUseCase::new(failing.clone(), h.sessions.clone(), h.config.clone())
            .execute(input.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::PersistenceFailure(_)));
        assert!(failing.is_empty().await);

        // the session was not consumed; a healthy store accepts the retry
        let out = SubmitScoreUseCase::new(
            h.leaderboard.clone(),
            h.sessions.clone(),
            h.config.clone(),
        )
        .execute(input)
        .await
        .unwrap();
        assert_eq!(out.rank, 1);
    }
}

#[cfg(test)]
mod migration_tests {
    use super::fixtures::*;
    use crate::application::migrate_legacy::MigrateLegacyUseCase;
    use crate::application::query_leaderboard::QueryLeaderboardUseCase;
    use crate::domain::value_objects::{Difficulty, GameMode};
    use crate::error::GameError;

    const LEGACY: &str = r#"[
        {"name": "old timer", "score": 12, "mode": "streak", "timestamp": 1600000000},
        {"name": "old timer", "score": 12, "mode": "streak", "timestamp": 1600000000},
        {"name": "sharp eye", "score": 9, "mode": "streak", "timestamp": "2021-01-01 10:00:00"},
        {"name": "penny", "score": 4200, "mode": "zero", "difficulty": "hard", "timestamp": 1650000000}
    ]"#;

    async fn board(h: &Harness, mode: GameMode, difficulty: Difficulty) -> Vec<(String, i64)> {
        QueryLeaderboardUseCase::new(h.leaderboard.clone(), h.config.clone())
            .execute(mode, difficulty, Some(100))
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.name.to_string(), e.score))
            .collect()
    }

    #[tokio::test]
    async fn test_migration_is_idempotent() {
        let h = harness(catalog(1)).await;
        let source = h.dir.path().join("scores.json");
        std::fs::write(&source, LEGACY).unwrap();
        let migrate = MigrateLegacyUseCase::new(h.leaderboard.clone(), h.config.clone());

        let first = migrate.execute(&source).await.unwrap();
        assert_eq!(first.migrated, 3);
        assert_eq!(first.duplicates_skipped, 1);
        assert!(!first.already_migrated);
        let backup = first.backup_path.unwrap();
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), LEGACY);
        assert!(source.exists());

        let streak_once = board(&h, GameMode::Streak, Difficulty::Medium).await;
        assert_eq!(
            streak_once,
            vec![("old timer".to_string(), 12), ("sharp eye".to_string(), 9)]
        );

        let second = migrate.execute(&source).await.unwrap();
        assert!(second.already_migrated);
        assert_eq!(second.migrated, 0);
        assert_eq!(board(&h, GameMode::Streak, Difficulty::Medium).await, streak_once);
        assert_eq!(board(&h, GameMode::Zero, Difficulty::Hard).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rewritten_file_does_not_duplicate() {
        let h = harness(catalog(1)).await;
        let source = h.dir.path().join("scores.json");
        std::fs::write(&source, LEGACY).unwrap();
        let migrate = MigrateLegacyUseCase::new(h.leaderboard.clone(), h.config.clone());
        migrate.execute(&source).await.unwrap();

        // same records, different bytes
        let reformatted: serde_json::Value = serde_json::from_str(LEGACY).unwrap();
        std::fs::write(&source, reformatted.to_string()).unwrap();
        let report = migrate.execute(&source).await.unwrap();
        assert!(!report.already_migrated);
        assert_eq!(report.migrated, 0);
        assert_eq!(report.already_present, 3);
        assert_eq!(board(&h, GameMode::Streak, Difficulty::Medium).await.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_file_aborts_without_changes() {
        let h = harness(catalog(1)).await;
        let source = h.dir.path().join("broken.json");
        std::fs::write(
            &source,
            r#"[{"name": "fine", "score": 1, "mode": "streak", "timestamp": 1},
                {"name": "broken", "score": "lots", "mode": "streak", "timestamp": 2}]"#,
        )
        .unwrap();

        let migrate = MigrateLegacyUseCase::new(h.leaderboard.clone(), h.config.clone());
        assert!(matches!(
            migrate.execute(&source).await,
            Err(GameError::MigrationFailed(_))
        ));
        assert!(h.leaderboard.is_empty().await);

        let backups = std::fs::read_dir(h.dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".bak-"))
            .count();
        assert_eq!(backups, 0);

        assert!(matches!(
            migrate.execute(&h.dir.path().join("missing.json")).await,
            Err(GameError::MigrationFailed(_))
        ));
    }
}
