//! In-memory Stores
//!
//! Live sessions and shared challenges. Neither survives a restart.

use crate::domain::entities::{Challenge, ChallengeStanding, PlaySession};
use crate::domain::repository::ChallengeRepository;
use crate::domain::value_objects::{ChallengeCode, SessionId};
use crate::error::{GameError, GameResult};
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

type SessionSlot = Arc<Mutex<Option<PlaySession>>>;

/// Exclusive access to one session id; `None` until a session is created
pub type SessionGuard = OwnedMutexGuard<Option<PlaySession>>;

/// Per-session locked session store
///
/// Each session id maps to its own async mutex, so operations on one id are
/// serialized while different ids never wait on each other. The map itself
/// is only touched briefly to fetch or create a slot.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slots: DashMap<SessionId, SessionSlot>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the slot for `id`, creating an empty one if needed
    pub async fn lock(&self, id: &SessionId) -> SessionGuard {
        let slot = self.slots.entry(id.clone()).or_default().clone();
        slot.lock_owned().await
    }

    /// Lock an existing session; `None` when the id is unknown
    pub async fn lock_existing(&self, id: &SessionId) -> Option<SessionGuard> {
        let slot = self.slots.get(id).map(|s| s.value().clone())?;
        let guard = slot.lock_owned().await;
        guard.is_some().then_some(guard)
    }

    /// Number of tracked slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop sessions idle for longer than `max_idle`; returns how many were removed.
    ///
    /// Slots that are locked or referenced by an in-flight operation are kept.
    pub fn cleanup_idle(&self, max_idle: Duration) -> usize {
        let max_idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();
        let before = self.slots.len();

        self.slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(guard) => match guard.as_ref() {
                    Some(session) => session.idle_for(now) <= max_idle,
                    None => false,
                },
                Err(_) => true,
            }
        });

        let removed = before.saturating_sub(self.slots.len());
        if removed > 0 {
            tracing::info!(removed, remaining = self.slots.len(), "Reaped idle sessions");
        }
        removed
    }
}

/// In-memory challenge repository
#[derive(Debug, Default)]
pub struct InMemoryChallengeStore {
    challenges: DashMap<ChallengeCode, Challenge>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeRepository for InMemoryChallengeStore {
    async fn create(&self, challenge: Challenge) -> GameResult<bool> {
        match self.challenges.entry(challenge.code.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(challenge);
                Ok(true)
            }
        }
    }

    async fn get(&self, code: &ChallengeCode) -> GameResult<Option<Challenge>> {
        Ok(self.challenges.get(code).map(|c| c.value().clone()))
    }

    async fn record_result(
        &self,
        code: &ChallengeCode,
        standing: ChallengeStanding,
    ) -> GameResult<()> {
        let mut challenge = self
            .challenges
            .get_mut(code)
            .ok_or(GameError::ChallengeNotFound)?;
        challenge.record(standing);
        Ok(())
    }
}
