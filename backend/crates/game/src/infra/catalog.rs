//! Listing Catalog
//!
//! Read-only, in-memory listing provider loaded once at startup.

use crate::domain::entities::Listing;
use crate::domain::repository::ListingProvider;
use crate::domain::value_objects::Difficulty;
use crate::error::{GameError, GameResult};
use kernel::id::ListingId;
use std::collections::HashMap;
use std::path::Path;

/// In-memory listing provider
#[derive(Debug, Clone, Default)]
pub struct CatalogListingProvider {
    listings: Vec<Listing>,
    by_id: HashMap<ListingId, usize>,
}

impl CatalogListingProvider {
    /// Build a catalog; listings with a non-positive price are dropped
    pub fn new(listings: Vec<Listing>) -> Self {
        let total = listings.len();
        let mut catalog = Self::default();
        for listing in listings {
            if listing.price <= 0 {
                tracing::warn!(
                    listing_id = %listing.id,
                    price = listing.price,
                    "Skipping unpriced listing"
                );
                continue;
            }
            if catalog.by_id.contains_key(&listing.id) {
                tracing::warn!(listing_id = %listing.id, "Skipping duplicate listing id");
                continue;
            }
            catalog.by_id.insert(listing.id, catalog.listings.len());
            catalog.listings.push(listing);
        }
        tracing::debug!(total, kept = catalog.listings.len(), "Listing catalog built");
        catalog
    }

    /// Load a JSON array of listings
    pub async fn from_json_file(path: &Path) -> GameResult<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            GameError::Internal(format!("cannot read listing catalog {}: {e}", path.display()))
        })?;
        let listings: Vec<Listing> = serde_json::from_slice(&bytes).map_err(|e| {
            GameError::Internal(format!("invalid listing catalog {}: {e}", path.display()))
        })?;
        let catalog = Self::new(listings);
        tracing::info!(path = %path.display(), listings = catalog.len(), "Listing catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

impl ListingProvider for CatalogListingProvider {
    async fn candidates(&self, difficulty: Option<Difficulty>) -> GameResult<Vec<Listing>> {
        Ok(self
            .listings
            .iter()
            .filter(|l| difficulty.is_none_or(|d| l.difficulty == d))
            .cloned()
            .collect())
    }

    async fn get(&self, id: ListingId) -> GameResult<Option<Listing>> {
        Ok(self.by_id.get(&id).map(|&i| self.listings[i].clone()))
    }
}
