//! Concurrent meal collection for a canonical site.
//!
//! A canonical site may merge several raw site ids. Meals are fetched for
//! every constituent id at once and the collector waits for all of them to
//! settle. A failed fetch contributes no meals and never fails the whole
//! collection. Results are concatenated in constituent order, not completion
//! order, so the output does not depend on network timing.
//!
//! There is no timeout here; the [`MealSource`] owns request timeouts.
//! Discarding results for a superseded selection is up to the caller.

use futures::future::join_all;
use mealsite_core::{CanonicalSite, Meal};
use tracing::{info, warn};

use crate::source::MealSource;

/// Settled result of fetching one constituent id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Succeeded { source_id: String, meals: Vec<Meal> },
    Failed { source_id: String, reason: String },
}

impl FetchOutcome {
    pub fn source_id(&self) -> &str {
        match self {
            FetchOutcome::Succeeded { source_id, .. } | FetchOutcome::Failed { source_id, .. } => {
                source_id
            }
        }
    }
}

/// Meals collected for a canonical site, with the ids whose fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub meals: Vec<Meal>,
    /// In constituent order.
    pub failed_source_ids: Vec<String>,
}

impl Collection {
    fn from_outcomes(outcomes: Vec<FetchOutcome>) -> Self {
        let mut collection = Collection::default();
        for outcome in outcomes {
            match outcome {
                FetchOutcome::Succeeded { meals, .. } => collection.meals.extend(meals),
                FetchOutcome::Failed { source_id, .. } => {
                    collection.failed_source_ids.push(source_id)
                }
            }
        }
        collection
    }
}

async fn fetch<S>(source: &S, source_id: &str, site_name: &str) -> FetchOutcome
where
    S: MealSource + ?Sized,
{
    match source.meals_for_site(source_id).await {
        Ok(payloads) => FetchOutcome::Succeeded {
            source_id: source_id.to_string(),
            meals: payloads
                .into_iter()
                .map(|p| Meal::from_payload(p, source_id, site_name))
                .collect(),
        },
        Err(e) => {
            warn!(source_id, error = %e, "meal fetch failed, skipping source");
            FetchOutcome::Failed {
                source_id: source_id.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Fetch every constituent id concurrently and return the settled outcomes
/// in constituent order.
pub async fn fetch_all<S>(source: &S, site: &CanonicalSite) -> Vec<FetchOutcome>
where
    S: MealSource + ?Sized,
{
    let ids = site.source_ids();
    join_all(ids.iter().map(|id| fetch(source, id, &site.display_name))).await
}

/// Collect meals for a canonical site, reporting failed sources.
pub async fn collect_with_report<S>(source: &S, site: &CanonicalSite) -> Collection
where
    S: MealSource + ?Sized,
{
    let collection = Collection::from_outcomes(fetch_all(source, site).await);
    info!(
        site = %site.site_id,
        meals = collection.meals.len(),
        failed = collection.failed_source_ids.len(),
        "collected meals"
    );
    collection
}

/// Collect meals for a canonical site. Failed sources contribute nothing.
pub async fn collect<S>(source: &S, site: &CanonicalSite) -> Vec<Meal>
where
    S: MealSource + ?Sized,
{
    collect_with_report(source, site).await.meals
}
