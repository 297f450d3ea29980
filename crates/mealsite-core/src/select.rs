//! Helpers for picking and presenting a canonical site.

use crate::key::normalize_key;
use crate::model::CanonicalSite;

/// Total meals across all canonical sites, saturating at `u64::MAX`.
pub fn total_meals(sites: &[CanonicalSite]) -> u64 {
    sites.iter().map(|s| s.meal_count).fold(0, u64::saturating_add)
}

/// Look up a canonical site by key.
pub fn find_site<'a>(sites: &'a [CanonicalSite], key: &str) -> Option<&'a CanonicalSite> {
    sites.iter().find(|s| s.site_id == key)
}

/// Keep `current` if it still names a site, else fall back to the first
/// (largest) site.
pub fn default_selection(sites: &[CanonicalSite], current: Option<&str>) -> Option<String> {
    current
        .filter(|key| find_site(sites, key).is_some())
        .map(str::to_string)
        .or_else(|| sites.first().map(|s| s.site_id.clone()))
}

/// File name for a site's CSV export.
pub fn csv_file_name(site: &CanonicalSite) -> String {
    let stem = normalize_key(&site.display_name);
    if stem.is_empty() {
        "meals.csv".to_string()
    } else {
        format!("{stem}.csv")
    }
}
