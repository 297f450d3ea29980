//! Known-site alias table.
//!
//! Crawl runs name the same meal-kit provider in many ways ("hello-fresh",
//! "HelloFresh US", `https://www.hellofresh.com/...`). The alias table maps
//! any record whose combined descriptor contains one of a rule's patterns to
//! that rule's fixed key and display name, ahead of name derivation.
//!
//! Rules are checked in declaration order and the first hit wins, so a rule
//! with a generic pattern must come after any rule whose patterns contain it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::HostInfo;
use crate::model::RawSiteRecord;

#[derive(Debug, Error)]
pub enum AliasTableError {
    #[error("failed to read alias table {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("alias table JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("alias rule #{index} is invalid: {reason}")]
    InvalidRule { index: usize, reason: &'static str },
}

/// One known site and the substrings that identify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub key: String,
    pub name: String,
    /// Lowercase substrings; any one of them matching is enough.
    pub patterns: Vec<String>,
}

impl AliasRule {
    pub fn new(key: &str, name: &str, patterns: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn matches(&self, descriptor: &str) -> bool {
        self.patterns.iter().any(|p| descriptor.contains(p.as_str()))
    }
}

/// Result of a successful alias lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMatch {
    pub key: String,
    pub name: String,
    pub alias_hit: bool,
}

/// Ordered list of alias rules. First match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    rules: Vec<AliasRule>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(vec![
            AliasRule::new("hellofresh", "HelloFresh", &["hellofresh", "hello-fresh"]),
            AliasRule::new(
                "greenchef",
                "GreenChef",
                &["greenchef", "green-chef", "green chef"],
            ),
            AliasRule::new("dinnerly", "Dinnerly", &["dinnerly"]),
            AliasRule::new(
                "blueapron",
                "Blue Apron",
                &["blueapron", "blue-apron", "blue apron"],
            ),
            AliasRule::new(
                "makegood",
                "MakeGood",
                &[
                    "makegood",
                    "make-good",
                    "make good",
                    "makeforgood",
                    "make-for-good",
                ],
            ),
        ])
    }
}

impl AliasTable {
    /// Build a table from rules in match order.
    pub fn new(rules: Vec<AliasRule>) -> Self {
        Self { rules }
    }

    /// A table that never matches.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse a JSON array of `{ "key", "name", "patterns" }` rules.
    ///
    /// Patterns are lowercased on load since descriptors are lowercase.
    pub fn from_json(json: &str) -> Result<Self, AliasTableError> {
        let mut rules: Vec<AliasRule> = serde_json::from_str(json)?;
        for (index, rule) in rules.iter_mut().enumerate() {
            if rule.key.trim().is_empty() {
                return Err(AliasTableError::InvalidRule {
                    index,
                    reason: "empty key",
                });
            }
            if rule.name.trim().is_empty() {
                return Err(AliasTableError::InvalidRule {
                    index,
                    reason: "empty name",
                });
            }
            rule.patterns.retain(|p| !p.is_empty());
            if rule.patterns.is_empty() {
                return Err(AliasTableError::InvalidRule {
                    index,
                    reason: "no patterns",
                });
            }
            for p in &mut rule.patterns {
                *p = p.to_lowercase();
            }
        }
        Ok(Self { rules })
    }

    /// Load a table from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, AliasTableError> {
        let json = std::fs::read_to_string(path).map_err(|source| AliasTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn rules(&self) -> &[AliasRule] {
        &self.rules
    }

    /// Find the first rule with a pattern contained in `descriptor`.
    ///
    /// `descriptor` must already be lowercase; see [`descriptor`].
    pub fn resolve(&self, descriptor: &str) -> Option<AliasMatch> {
        self.rules
            .iter()
            .find(|rule| rule.matches(descriptor))
            .map(|rule| AliasMatch {
                key: rule.key.clone(),
                name: rule.name.clone(),
                alias_hit: true,
            })
    }
}

/// Build the lowercase alias descriptor for a record.
///
/// Display name, site id, source page, host, and domain base joined by
/// single spaces, missing values contributing empty strings.
pub fn descriptor(record: &RawSiteRecord, host: &HostInfo) -> String {
    [
        record.display_name.as_deref().unwrap_or_default(),
        record.site_id.as_deref().unwrap_or_default(),
        record.source_page.as_deref().unwrap_or_default(),
        host.host.as_str(),
        host.domain_base.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}
