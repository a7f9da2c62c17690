//! Research source providers.
//!
//! Each provider answers `search(keyword)` with items of one kind. Providers
//! that consult several backends absorb per-backend failures and return what
//! the remaining backends produced.

pub mod api;
pub mod factory;
pub mod mock;
pub mod paper;
pub mod tech;
pub mod web;

use async_trait::async_trait;

use crate::error::Result;
use crate::research::{ResearchItem, ResearchKind};

pub use api::ApiProvider;
pub use factory::{create_providers, ProviderSet};
pub use mock::{FailingProvider, MockProvider, StaticProvider};
pub use paper::PaperProvider;
pub use tech::TechProvider;
pub use web::WebProvider;

#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// The bucket this provider fills
    fn kind(&self) -> ResearchKind;

    async fn search(&self, keyword: &str) -> Result<Vec<ResearchItem>>;
}

/// Stable descending sort on a float key.
pub(crate) fn sort_desc_by<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}
