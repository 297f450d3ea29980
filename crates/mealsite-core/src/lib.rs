//! Site identity resolution and aggregation for crawled meal sites.

pub mod aggregate;
pub mod alias;
pub mod csv;
pub mod host;
pub mod key;
pub mod model;
pub mod name;
pub mod select;

pub use aggregate::{AggregateReport, Aggregator, Resolution, SiteIdentity, aggregate};
pub use alias::{AliasMatch, AliasRule, AliasTable, AliasTableError, descriptor};
pub use csv::{DEFAULT_FIELDS, MealField, to_csv, write_csv};
pub use host::{HostInfo, parse_host};
pub use key::{humanize, normalize_key};
pub use model::{CanonicalSite, Meal, MealPayload, RawSiteRecord};
pub use name::derive_name;
pub use select::{csv_file_name, default_selection, find_site, total_meals};
