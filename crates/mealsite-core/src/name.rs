//! Display-name fallback chain for records without an alias hit.

use crate::host::{HostInfo, parse_host};
use crate::key::humanize;
use crate::model::RawSiteRecord;

/// Derive a human-readable name for a raw record.
///
/// Tried in order, first non-empty wins:
/// 1. trimmed display name
/// 2. humanised trimmed site id
/// 3. humanised domain base of the source page
/// 4. humanised host of the source page
/// 5. humanised raw source page
///
/// An empty result means the name is undeterminable.
pub fn derive_name(record: &RawSiteRecord) -> String {
    let host = parse_host(record.source_page.as_deref().unwrap_or_default());
    derive_name_with_host(record, &host)
}

/// [`derive_name`] with the source page already parsed.
pub(crate) fn derive_name_with_host(record: &RawSiteRecord, host: &HostInfo) -> String {
    let display = record.display_name.as_deref().unwrap_or_default().trim();
    if !display.is_empty() {
        return display.to_string();
    }

    let site_id = record.site_id.as_deref().unwrap_or_default().trim();
    let candidates = [
        site_id,
        host.domain_base.as_str(),
        host.host.as_str(),
        record.source_page.as_deref().unwrap_or_default(),
    ];
    candidates
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(humanize)
        .find(|name| !name.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(display: Option<&str>, id: Option<&str>, page: Option<&str>) -> RawSiteRecord {
        RawSiteRecord {
            site_id: id.map(Into::into),
            display_name: display.map(Into::into),
            source_page: page.map(Into::into),
            meal_count: 0,
        }
    }

    #[test]
    fn display_name_is_trimmed() {
        let rec = record(Some("  Home Chef  "), Some("home_chef"), None);
        assert_eq!(derive_name(&rec), "Home Chef");
    }

    #[test]
    fn site_id_is_humanised() {
        let rec = record(Some("   "), Some(" home_chef-us "), None);
        assert_eq!(derive_name(&rec), "Home Chef Us");
    }

    #[test]
    fn domain_base_from_source_page() {
        let rec = record(None, None, Some("https://www.factor75.com/menu"));
        assert_eq!(derive_name(&rec), "Factor75");
    }

    #[test]
    fn domain_base_with_hyphen() {
        let rec = record(Some(""), Some(""), Some("https://every-plate.com"));
        assert_eq!(derive_name(&rec), "Every Plate");
    }

    #[test]
    fn unparseable_source_page_used_verbatim() {
        let rec = record(None, None, Some("sunbasket_recipes"));
        assert_eq!(derive_name(&rec), "Sunbasket Recipes");
    }

    #[test]
    fn nothing_to_derive_from() {
        assert_eq!(derive_name(&record(None, None, None)), "");
        assert_eq!(derive_name(&record(Some(" "), Some("--"), Some("  "))), "");
    }

    #[test]
    fn separator_only_site_id_falls_through() {
        let rec = record(None, Some("__"), Some("https://tovala.com"));
        assert_eq!(derive_name(&rec), "Tovala");
    }
}
