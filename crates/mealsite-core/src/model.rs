//! Site and meal records exchanged with the crawl backend.

use serde::{Deserialize, Deserializer, Serialize};

/// A site record as produced by a single crawl run.
///
/// Different runs may describe the same real-world site under different ids,
/// with missing or inconsistent display names and varying source URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSiteRecord {
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub source_page: Option<String>,
    /// Lenient: missing, `null`, negative or non-numeric reads as zero and
    /// fractions are truncated.
    #[serde(default, deserialize_with = "lenient_count")]
    pub meal_count: u64,
}

/// One deduplicated site, merged from every raw record sharing its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalSite {
    /// Canonical key; unique across an aggregation result.
    pub site_id: String,
    pub display_name: String,
    /// Sum over exactly the raw records that mapped to this key.
    pub meal_count: u64,
    /// First non-empty source page seen.
    pub source_page: Option<String>,
    /// Raw site ids in first-seen order, without duplicates.
    #[serde(alias = "siteIds")]
    pub constituent_site_ids: Vec<String>,
    /// Raw site id of the record that created this entry.
    pub primary_site_id: Option<String>,
}

impl CanonicalSite {
    /// Ids to fan meal fetches out to: the constituents, or the canonical key
    /// when no raw record carried an id.
    pub fn source_ids(&self) -> Vec<&str> {
        if self.constituent_site_ids.is_empty() {
            vec![self.site_id.as_str()]
        } else {
            self.constituent_site_ids.iter().map(String::as_str).collect()
        }
    }
}

/// A meal as returned by the meal listing endpoint for one source id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPayload {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub title: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source_page: Option<String>,
}

/// A meal attributed to the source id it was fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub source_page: Option<String>,
    pub site_id: String,
    pub site_name: String,
}

impl Meal {
    /// Stamp a fetched payload with the source id and canonical site name.
    pub fn from_payload(payload: MealPayload, site_id: &str, site_name: &str) -> Self {
        Self {
            id: payload.id,
            title: payload.title,
            description: payload.description,
            category: payload.category,
            source_page: payload.source_page,
            site_id: site_id.to_string(),
            site_name: site_name.to_string(),
        }
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Text(String),
        Other(#[allow(dead_code)] serde::de::IgnoredAny),
    }

    Ok(match Option::<Count>::deserialize(de)? {
        Some(Count::Unsigned(n)) => n,
        Some(Count::Signed(n)) => n.max(0) as u64,
        Some(Count::Float(n)) => float_count(n),
        Some(Count::Text(s)) => s.trim().parse::<f64>().map(float_count).unwrap_or(0),
        Some(Count::Other(_)) | None => 0,
    })
}

/// NaN and negatives clamp to zero; `as` saturates at `u64::MAX`.
fn float_count(n: f64) -> u64 {
    if n.is_finite() && n > 0.0 {
        n.trunc() as u64
    } else {
        0
    }
}

fn empty_if_null<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Unsigned(u64),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Id>::deserialize(de)?.map(|id| match id {
        Id::Text(s) => s,
        Id::Unsigned(n) => n.to_string(),
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    }))
}
