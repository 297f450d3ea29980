//! Backend collaborators and concurrent meal collection.

pub mod collect;
pub mod source;

#[cfg(feature = "http")]
pub mod config;
#[cfg(feature = "http")]
pub mod http;

pub use collect::{Collection, FetchOutcome, collect, collect_with_report, fetch_all};
pub use source::{MealSource, SiteSource, load_sites};

#[cfg(feature = "http")]
pub use config::ClientConfig;
#[cfg(feature = "http")]
pub use http::{SitesClient, SourceError};
