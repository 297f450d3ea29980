//! Hostname extraction from crawl source URLs.

use url::Url;

/// Hostname information extracted from a source page URL.
///
/// Both fields are empty when the URL could not be parsed or has no host;
/// callers treat that as "no information", not as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostInfo {
    /// Hostname without a leading `www.`.
    pub host: String,
    /// First dot-separated label of `host`.
    pub domain_base: String,
}

/// Parse a source URL into its host and first domain label.
///
/// "https://www.hellofresh.co.uk/recipes" → host "hellofresh.co.uk",
/// domain base "hellofresh". Strings without a scheme do not parse.
pub fn parse_host(url: &str) -> HostInfo {
    let Ok(parsed) = Url::parse(url) else {
        return HostInfo::default();
    };
    let Some(hostname) = parsed.host_str() else {
        return HostInfo::default();
    };

    let host = hostname.strip_prefix("www.").unwrap_or(hostname).to_string();
    let domain_base = host.split('.').next().unwrap_or_default().to_string();
    HostInfo { host, domain_base }
}
