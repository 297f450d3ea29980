//! Collaborator traits for the site and meal listing backends.

use async_trait::async_trait;
use mealsite_core::{Aggregator, CanonicalSite, MealPayload, RawSiteRecord};
use tracing::info;

/// Lists every raw site record known to the crawl backend.
#[async_trait]
pub trait SiteSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn list_sites(&self) -> Result<Vec<RawSiteRecord>, Self::Error>;
}

/// Lists the meals crawled for a single raw site id.
#[async_trait]
pub trait MealSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn meals_for_site(&self, site_id: &str) -> Result<Vec<MealPayload>, Self::Error>;
}

/// Fetch all raw site records and aggregate them into canonical sites.
///
/// A listing failure is returned to the caller; there is nothing to show
/// without it.
pub async fn load_sites<S>(
    source: &S,
    aggregator: &Aggregator,
) -> Result<Vec<CanonicalSite>, S::Error>
where
    S: SiteSource + ?Sized,
{
    let records = source.list_sites().await?;
    info!(count = records.len(), "loaded raw site records");
    Ok(aggregator.aggregate(&records))
}
