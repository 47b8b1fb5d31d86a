//! Anti-Repetition Selector
//!
//! Picks a listing the session has not seen recently. The recent window is
//! a bounded FIFO of listing ids owned by each session.

use crate::domain::entities::Listing;
use kernel::id::ListingId;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::VecDeque;

/// Number of recently served listings remembered per session
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Bounded FIFO of recently served listing ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHistory {
    window: usize,
    ids: VecDeque<ListingId>,
}

impl SessionHistory {
    /// A zero window is treated as 1 so the current listing is always remembered.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            ids: VecDeque::with_capacity(window),
        }
    }

    /// Append, evicting the oldest id once the window is full
    pub fn push(&mut self, id: ListingId) {
        if self.ids.len() == self.window {
            self.ids.pop_front();
        }
        self.ids.push_back(id);
    }

    pub fn contains(&self, id: &ListingId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &ListingId> {
        self.ids.iter()
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

/// Select a listing not present in `history`, uniformly at random.
///
/// Falls back to the whole candidate set when every candidate was seen
/// recently. Returns `None` only for an empty candidate set. The chosen
/// id is pushed onto `history`.
pub fn select_listing<'a, R>(
    candidates: &'a [Listing],
    history: &mut SessionHistory,
    rng: &mut R,
) -> Option<&'a Listing>
where
    R: Rng + ?Sized,
{
    let fresh: Vec<&Listing> = candidates
        .iter()
        .filter(|listing| !history.contains(&listing.id))
        .collect();

    let chosen = match fresh.choose(rng) {
        Some(listing) => *listing,
        None => {
            if !candidates.is_empty() {
                tracing::debug!(
                    candidates = candidates.len(),
                    window = history.len(),
                    "Every candidate seen recently; relaxing anti-repetition"
                );
            }
            candidates.choose(rng)?
        }
    };

    history.push(chosen.id);
    Some(chosen)
}
