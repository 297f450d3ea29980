//! HTTP client for the crawl backend's site and meal listing endpoints.

use async_trait::async_trait;
use mealsite_core::{MealPayload, RawSiteRecord};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::ClientConfig;
use crate::source::{MealSource, SiteSource};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("base URL cannot carry a path: {0}")]
    NotABase(String),
}

/// HTTP client for `/api/sites` and `/api/sites/{id}/meals`.
pub struct SitesClient {
    client: reqwest::Client,
    base_url: Url,
}

impl SitesClient {
    /// Create a client for the configured backend.
    ///
    /// The timeout applies to each request; the collector itself never
    /// times out.
    pub fn new(config: &ClientConfig) -> Result<Self, SourceError> {
        let base_url = Url::parse(config.base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::NotABase(config.base_url.clone()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Build an endpoint URL, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::NotABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned + Send>(&self, url: Url) -> Result<T, SourceError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl SiteSource for SitesClient {
    type Error = SourceError;

    async fn list_sites(&self) -> Result<Vec<RawSiteRecord>, SourceError> {
        let url = self.endpoint(&["api", "sites"])?;
        info!(url = %url, "listing sites");
        // A `null` body is an empty listing.
        let sites: Option<Vec<RawSiteRecord>> = self.get_json(url).await?;
        let sites = sites.unwrap_or_default();
        info!(count = sites.len(), "listed sites");
        Ok(sites)
    }
}

#[async_trait]
impl MealSource for SitesClient {
    type Error = SourceError;

    async fn meals_for_site(&self, site_id: &str) -> Result<Vec<MealPayload>, SourceError> {
        let url = self.endpoint(&["api", "sites", site_id, "meals"])?;
        info!(url = %url, "fetching meals");
        let meals: Option<Vec<MealPayload>> = self.get_json(url).await?;
        Ok(meals.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> SitesClient {
        SitesClient::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn sites_client_trims_trailing_slash() {
        assert_eq!(client("http://localhost:8080/").base_url(), "http://localhost:8080");
    }

    #[test]
    fn endpoint_urls() {
        let c = client("http://localhost:8080");
        assert_eq!(
            c.endpoint(&["api", "sites"]).unwrap().as_str(),
            "http://localhost:8080/api/sites"
        );
        assert_eq!(
            c.endpoint(&["api", "sites", "hf2", "meals"]).unwrap().as_str(),
            "http://localhost:8080/api/sites/hf2/meals"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let c = client("https://crawl.example.test/backend/");
        assert_eq!(
            c.endpoint(&["api", "sites"]).unwrap().as_str(),
            "https://crawl.example.test/backend/api/sites"
        );
    }

    #[test]
    fn site_id_is_one_path_segment() {
        let c = client("http://localhost:8080");
        assert_eq!(
            c.endpoint(&["api", "sites", "green chef/us", "meals"])
                .unwrap()
                .as_str(),
            "http://localhost:8080/api/sites/green%20chef%2Fus/meals"
        );
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(matches!(
            SitesClient::new(&ClientConfig::new("localhost:8080/api")),
            Err(SourceError::NotABase(_)) | Err(SourceError::BaseUrl(_))
        ));
        assert!(matches!(
            SitesClient::new(&ClientConfig::new("not a url")),
            Err(SourceError::BaseUrl(_))
        ));
        assert!(matches!(
            SitesClient::new(&ClientConfig::new("mailto:chef@example.test")),
            Err(SourceError::NotABase(_))
        ));
    }

    #[test]
    fn site_listing_json() {
        let json = r#"[
            {"siteId": "hellofresh-1", "displayName": null, "sourcePage": "https://www.hellofresh.com/x", "mealCount": 5},
            {"siteId": "hf2", "displayName": "", "sourcePage": "https://hellofresh.com/y", "mealCount": 3}
        ]"#;
        let records: Vec<RawSiteRecord> = serde_json::from_str(json).unwrap();
        let sites = mealsite_core::aggregate(&records);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].meal_count, 8);
    }
}
