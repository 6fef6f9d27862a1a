//! Card sources consumed by the session driver.
//!
//! Providers may fail; [`fetch_or_placeholder`] is the single place where
//! those failures are turned into something the round engine can play with.

use crate::load::load_catalog;
use crate::schema::{Catalog, CatalogEntry, Category};
use recall_core::{CardRecord, RngState};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("card source not configured: {0}")]
    NotConfigured(String),
    #[error("card catalog is empty")]
    EmptyCatalog,
    #[error("http error: {0}")]
    Http(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ProviderError {
    /// Configuration problems cannot be papered over with placeholders; the
    /// driver has to surface them and offer a retry.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }
}

pub trait CardProvider {
    fn name(&self) -> &str;

    /// Returns up to `count` cards with distinct ids, preferring `category`
    /// when one is given.
    fn fetch(
        &mut self,
        count: usize,
        category: Option<Category>,
    ) -> Result<Vec<CardRecord>, ProviderError>;
}

/// Draws cards from a local catalog file.
#[derive(Debug, Clone)]
pub struct CatalogProvider {
    catalog: Catalog,
    rng: RngState,
}

impl CatalogProvider {
    pub fn new(catalog: Catalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: RngState::from_seed(seed),
        }
    }

    pub fn from_assets(dir: &Path, seed: u64) -> anyhow::Result<Self> {
        Ok(Self::new(load_catalog(dir)?, seed))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl CardProvider for CatalogProvider {
    fn name(&self) -> &str {
        "catalog"
    }

    fn fetch(
        &mut self,
        count: usize,
        category: Option<Category>,
    ) -> Result<Vec<CardRecord>, ProviderError> {
        if self.catalog.cards.is_empty() {
            return Err(ProviderError::EmptyCatalog);
        }
        let (mut matching, mut rest): (Vec<&CatalogEntry>, Vec<&CatalogEntry>) =
            match category {
                Some(category) => self
                    .catalog
                    .cards
                    .iter()
                    .partition(|entry| entry.tags.contains(&category)),
                None => (self.catalog.cards.iter().collect(), Vec::new()),
            };
        self.rng.shuffle(&mut matching);
        self.rng.shuffle(&mut rest);
        // Too few cards in the category: top up from the rest of the catalog.
        Ok(matching
            .into_iter()
            .chain(rest)
            .take(count)
            .map(CatalogEntry::to_record)
            .collect())
    }
}

pub fn placeholder_cards(count: usize) -> Vec<CardRecord> {
    (0..count)
        .map(|idx| {
            CardRecord::new(
                format!("fallback-{idx}"),
                format!("/placeholder.svg?height=300&width=300&query=placeholder-{idx}"),
                format!("Placeholder image {}", idx + 1),
            )
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub cards: Vec<CardRecord>,
    pub error: Option<String>,
}

impl FetchReport {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Fetches from `provider`, substituting `count` placeholders on any failure
/// other than a configuration error. A configuration error yields no cards.
pub fn fetch_or_placeholder(
    provider: &mut dyn CardProvider,
    count: usize,
    category: Option<Category>,
) -> FetchReport {
    match provider.fetch(count, category) {
        Ok(cards) => FetchReport { cards, error: None },
        Err(err) if err.is_configuration() => {
            warn!(provider = provider.name(), error = %err, "card source unavailable");
            FetchReport {
                cards: Vec::new(),
                error: Some(err.to_string()),
            }
        }
        Err(err) => {
            warn!(provider = provider.name(), error = %err, "fetch failed; using placeholders");
            FetchReport {
                cards: placeholder_cards(count),
                error: Some(err.to_string()),
            }
        }
    }
}
