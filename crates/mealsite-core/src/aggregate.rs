//! Canonical site aggregation.
//!
//! Raw site records from independent crawl runs are resolved to a canonical
//! key and display name, then merged so each real-world site appears once
//! with the summed meal count of every record that referred to it.
//!
//! # Resolution
//!
//! 1. Build the lowercase descriptor and try the alias table
//! 2. Without an alias hit, derive a name and take the first non-empty of
//!    `normalize_key` over name, display name, domain base, host, site id,
//!    source page
//! 3. A record left without key or name is rejected and contributes nothing
//!
//! # Ordering
//!
//! Output is sorted by meal count, descending. Equal counts keep the order in
//! which their key was first seen.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::alias::{AliasTable, descriptor};
use crate::host::parse_host;
use crate::key::normalize_key;
use crate::model::{CanonicalSite, RawSiteRecord};
use crate::name::derive_name_with_host;

/// Canonical identity resolved for one raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    pub key: String,
    pub name: String,
    pub alias_hit: bool,
}

/// Per-record resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Accepted(SiteIdentity),
    /// No key or name could be derived.
    Rejected,
}

/// Diagnostics for one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateReport {
    pub accepted: usize,
    pub rejected: usize,
    pub alias_hits: usize,
    /// Number of canonical sites produced.
    pub sites: usize,
}

/// Groups raw site records into canonical sites using an alias table.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    aliases: AliasTable,
}

impl Aggregator {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Resolve the canonical key and name of a single record.
    pub fn resolve(&self, record: &RawSiteRecord) -> Resolution {
        let source_page = record.source_page.as_deref().unwrap_or_default();
        let host = parse_host(source_page);

        if let Some(alias) = self.aliases.resolve(&descriptor(record, &host)) {
            return Resolution::Accepted(SiteIdentity {
                key: alias.key,
                name: alias.name,
                alias_hit: alias.alias_hit,
            });
        }

        let name = derive_name_with_host(record, &host);
        let key = [
            name.as_str(),
            record.display_name.as_deref().unwrap_or_default(),
            host.domain_base.as_str(),
            host.host.as_str(),
            record.site_id.as_deref().unwrap_or_default(),
            source_page,
        ]
        .into_iter()
        .map(normalize_key)
        .find(|k| !k.is_empty())
        .unwrap_or_default();

        if key.is_empty() || name.is_empty() {
            return Resolution::Rejected;
        }
        Resolution::Accepted(SiteIdentity {
            key,
            name,
            alias_hit: false,
        })
    }

    /// Merge raw records into canonical sites.
    pub fn aggregate(&self, records: &[RawSiteRecord]) -> Vec<CanonicalSite> {
        self.aggregate_with_report(records).0
    }

    /// [`Aggregator::aggregate`] plus counts of accepted and rejected records.
    pub fn aggregate_with_report(
        &self,
        records: &[RawSiteRecord],
    ) -> (Vec<CanonicalSite>, AggregateReport) {
        let mut sites: Vec<CanonicalSite> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut report = AggregateReport::default();

        for (row, record) in records.iter().enumerate() {
            let identity = match self.resolve(record) {
                Resolution::Accepted(identity) => identity,
                Resolution::Rejected => {
                    debug!(
                        row,
                        site_id = ?record.site_id,
                        meal_count = record.meal_count,
                        "dropping site record with no derivable key"
                    );
                    report.rejected += 1;
                    continue;
                }
            };
            report.accepted += 1;
            if identity.alias_hit {
                report.alias_hits += 1;
            }

            let slot = *index.entry(identity.key.clone()).or_insert_with(|| {
                sites.push(CanonicalSite {
                    site_id: identity.key,
                    display_name: identity.name,
                    meal_count: 0,
                    source_page: None,
                    constituent_site_ids: Vec::new(),
                    primary_site_id: record.site_id.clone(),
                });
                sites.len() - 1
            });
            merge(&mut sites[slot], record);
        }

        // Stable: equal counts keep first-seen order.
        sites.sort_by(|a, b| b.meal_count.cmp(&a.meal_count));

        report.sites = sites.len();
        info!(
            records = records.len(),
            sites = report.sites,
            rejected = report.rejected,
            alias_hits = report.alias_hits,
            "aggregated site records"
        );
        (sites, report)
    }
}

fn merge(site: &mut CanonicalSite, record: &RawSiteRecord) {
    site.meal_count = site.meal_count.saturating_add(record.meal_count);

    if site.source_page.is_none()
        && let Some(page) = record.source_page.as_deref().filter(|p| !p.is_empty())
    {
        site.source_page = Some(page.to_string());
    }

    if let Some(id) = record.site_id.as_deref().filter(|id| !id.is_empty())
        && !site.constituent_site_ids.iter().any(|existing| existing == id)
    {
        site.constituent_site_ids.push(id.to_string());
    }
}

/// Merge raw records into canonical sites using the built-in alias table.
pub fn aggregate(records: &[RawSiteRecord]) -> Vec<CanonicalSite> {
    Aggregator::default().aggregate(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasRule;

    fn record(
        id: Option<&str>,
        display: Option<&str>,
        page: Option<&str>,
        meal_count: u64,
    ) -> RawSiteRecord {
        RawSiteRecord {
            site_id: id.map(Into::into),
            display_name: display.map(Into::into),
            source_page: page.map(Into::into),
            meal_count,
        }
    }

    #[test]
    fn hellofresh_merge_scenario() {
        let records = vec![
            record(
                Some("hellofresh-1"),
                None,
                Some("https://www.hellofresh.com/x"),
                5,
            ),
            record(Some("hf2"), Some(""), Some("https://hellofresh.com/y"), 3),
        ];
        let sites = aggregate(&records);
        assert_eq!(sites.len(), 1);
        let hf = &sites[0];
        assert_eq!(hf.site_id, "hellofresh");
        assert_eq!(hf.display_name, "HelloFresh");
        assert_eq!(hf.meal_count, 8);
        assert_eq!(hf.constituent_site_ids, vec!["hellofresh-1", "hf2"]);
        assert_eq!(hf.primary_site_id.as_deref(), Some("hellofresh-1"));
        assert_eq!(hf.source_page.as_deref(), Some("https://www.hellofresh.com/x"));
    }

    #[test]
    fn alias_beats_display_name() {
        let records = vec![record(
            Some("kit-7"),
            Some("Weekly Boxes by Dinnerly"),
            None,
            4,
        )];
        let sites = aggregate(&records);
        assert_eq!(sites[0].site_id, "dinnerly");
        assert_eq!(sites[0].display_name, "Dinnerly");
    }

    #[test]
    fn fallback_to_domain_base() {
        let records = vec![record(None, Some(""), Some("https://www.homechef.com/menu"), 9)];
        let sites = aggregate(&records);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].site_id, "homechef");
        assert_eq!(sites[0].display_name, "Homechef");
        assert!(sites[0].constituent_site_ids.is_empty());
        assert_eq!(sites[0].primary_site_id, None);
    }

    #[test]
    fn empty_record_is_dropped() {
        let records = vec![
            record(None, None, None, 50),
            record(Some(""), Some("  "), Some(""), 7),
            record(Some("tovala"), None, None, 2),
        ];
        let (sites, report) = Aggregator::default().aggregate_with_report(&records);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].meal_count, 2);
        assert_eq!(report.rejected, 2);
        assert_eq!(report.accepted, 1);
        assert_eq!(report.sites, 1);
    }

    #[test]
    fn canonical_input_is_unchanged() {
        let records = vec![
            record(Some("tovala"), Some("Tovala"), None, 10),
            record(Some("factor"), Some("Factor"), None, 6),
            record(Some("sunbasket"), Some("Sunbasket"), None, 1),
        ];
        let sites = Aggregator::new(AliasTable::empty()).aggregate(&records);
        assert_eq!(sites.len(), 3);
        for (site, rec) in sites.iter().zip(&records) {
            assert_eq!(site.site_id, normalize_key(rec.display_name.as_deref().unwrap()));
            assert_eq!(site.display_name, rec.display_name.clone().unwrap());
            assert_eq!(site.meal_count, rec.meal_count);
            assert_eq!(site.constituent_site_ids, vec![rec.site_id.clone().unwrap()]);
        }
    }

    #[test]
    fn meal_counts_are_conserved() {
        let records = vec![
            record(Some("hellofresh-1"), None, None, 5),
            record(None, None, None, 100),
            record(Some("green_chef"), None, None, 3),
            record(Some("a"), Some("Alpha"), None, 0),
            record(Some("hello-fresh"), Some("HF"), None, 11),
            record(Some("b"), Some("alpha"), None, 4),
            record(Some("--"), None, Some("::"), 8),
        ];
        let aggregator = Aggregator::default();
        let expected: u64 = records
            .iter()
            .filter(|r| matches!(aggregator.resolve(r), Resolution::Accepted(_)))
            .map(|r| r.meal_count)
            .sum();
        let sites = aggregator.aggregate(&records);
        let total: u64 = sites.iter().map(|s| s.meal_count).sum();
        assert_eq!(total, expected);
        assert_eq!(total, 23);
    }

    #[test]
    fn meal_count_saturates_instead_of_overflowing() {
        let records = vec![
            record(Some("a"), Some("Same"), None, u64::MAX),
            record(Some("b"), Some("Same"), None, 1),
        ];
        let sites = Aggregator::new(AliasTable::empty()).aggregate(&records);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].meal_count, u64::MAX);
        assert_eq!(sites[0].constituent_site_ids, vec!["a", "b"]);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let records = vec![
            record(Some("c"), Some("Charlie"), None, 2),
            record(Some("a"), Some("Alpha"), None, 5),
            record(Some("b"), Some("Bravo"), None, 2),
            record(Some("d"), Some("Delta"), None, 5),
            record(Some("e"), Some("Echo"), None, 2),
        ];
        let keys: Vec<String> = Aggregator::new(AliasTable::empty())
            .aggregate(&records)
            .into_iter()
            .map(|s| s.site_id)
            .collect();
        assert_eq!(keys, vec!["alpha", "delta", "charlie", "bravo", "echo"]);
    }

    #[test]
    fn tie_order_follows_first_seen_key() {
        // "charlie" is first seen before "alpha" but only reaches 4 after a later merge.
        let records = vec![
            record(Some("c1"), Some("Charlie"), None, 1),
            record(Some("a1"), Some("Alpha"), None, 4),
            record(Some("c2"), Some("charlie"), None, 3),
        ];
        let sites = Aggregator::new(AliasTable::empty()).aggregate(&records);
        assert_eq!(sites[0].site_id, "charlie");
        assert_eq!(sites[0].constituent_site_ids, vec!["c1", "c2"]);
        assert_eq!(sites[1].site_id, "alpha");
    }

    #[test]
    fn constituent_ids_are_deduplicated() {
        let records = vec![
            record(Some("bp-1"), Some("Blue Apron"), None, 1),
            record(Some("bp-2"), Some("blue apron"), None, 1),
            record(Some("bp-1"), Some("Blue-Apron"), None, 1),
            record(None, Some("BlueApron"), None, 1),
        ];
        let sites = aggregate(&records);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].constituent_site_ids, vec!["bp-1", "bp-2"]);
        assert_eq!(sites[0].meal_count, 4);
    }

    #[test]
    fn first_source_page_wins() {
        let records = vec![
            record(Some("x1"), Some("Xfood"), Some(""), 1),
            record(Some("x2"), Some("Xfood"), Some("https://xfood.test/a"), 1),
            record(Some("x3"), Some("Xfood"), Some("https://xfood.test/b"), 1),
        ];
        let sites = Aggregator::new(AliasTable::empty()).aggregate(&records);
        assert_eq!(sites[0].source_page.as_deref(), Some("https://xfood.test/a"));
    }

    #[test]
    fn primary_site_id_is_never_reassigned() {
        let records = vec![
            record(None, Some("Xfood"), None, 1),
            record(Some("x2"), Some("Xfood"), None, 1),
        ];
        let sites = Aggregator::new(AliasTable::empty()).aggregate(&records);
        assert_eq!(sites[0].primary_site_id, None);
        assert_eq!(sites[0].constituent_site_ids, vec!["x2"]);
    }

    #[test]
    fn custom_alias_table() {
        let table = AliasTable::new(vec![AliasRule::new("tovala", "Tovala", &["tovala"])]);
        let aggregator = Aggregator::new(table);
        let records = vec![
            record(Some("tv-1"), None, Some("https://www.tovala.com"), 2),
            record(Some("hellofresh-1"), None, None, 3),
        ];
        let (sites, report) = aggregator.aggregate_with_report(&records);
        assert_eq!(sites[0].site_id, "hellofresh1");
        assert_eq!(sites[0].display_name, "Hellofresh 1");
        assert_eq!(sites[1].site_id, "tovala");
        assert_eq!(report.alias_hits, 1);
    }

    #[test]
    fn resolve_reports_alias_hit() {
        let aggregator = Aggregator::default();
        let hit = aggregator.resolve(&record(Some("GreenChef_US"), None, None, 0));
        assert_eq!(
            hit,
            Resolution::Accepted(SiteIdentity {
                key: "greenchef".into(),
                name: "GreenChef".into(),
                alias_hit: true,
            })
        );
        assert_eq!(
            aggregator.resolve(&record(None, None, None, 0)),
            Resolution::Rejected
        );
    }
}
