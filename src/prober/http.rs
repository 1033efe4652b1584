//! HTTP prober implementation
//!
//! This module handles all outbound requests, including:
//! - Building the shared HTTP client with timeout and redirect limits
//! - Choosing which scheme variants of a URL to try
//! - Classifying the final response status

use crate::config::ProberConfig;
use crate::prober::Prober;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The prober configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ProberConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(redirect_policy(config.max_redirects))
        .build()
}

/// Follows up to `max_redirects` hops and fails the request on the next one
///
/// `Attempt::previous` already holds the originally requested URL, so after
/// `n` redirects it has `n` entries.
fn redirect_policy(max_redirects: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            attempt.error(format!("exceeded {} redirects", max_redirects))
        } else {
            attempt.follow()
        }
    })
}

/// Lists the URLs to try, in order, for a submitted link
///
/// A link that already names `http` or `https` is tried as-is. Anything
/// else is tried as `https://<link>` first and then `http://<link>`.
/// Candidates that do not parse are dropped, so an empty result means the
/// link cannot be probed at all.
///
/// # Examples
///
/// ```
/// use linkstat::prober::candidate_urls;
///
/// let urls = candidate_urls("example.com");
/// assert_eq!(urls[0].as_str(), "https://example.com/");
/// assert_eq!(urls[1].as_str(), "http://example.com/");
/// ```
pub fn candidate_urls(link: &str) -> Vec<Url> {
    let link = link.trim();
    if link.is_empty() {
        return Vec::new();
    }

    if let Ok(url) = Url::parse(link) {
        if matches!(url.scheme(), "http" | "https") {
            return vec![url];
        }
    }

    ["https", "http"]
        .iter()
        .filter_map(|scheme| Url::parse(&format!("{}://{}", scheme, link)).ok())
        .collect()
}

/// Returns true for the 200-399 status range
fn is_reachable_status(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

/// Reachability checker backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(config: &ProberConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Sends one GET and classifies the outcome
    async fn check_url(&self, url: &Url) -> bool {
        match self.client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!("Probe {} -> HTTP {}", url, status.as_u16());
                is_reachable_status(status)
            }
            Err(e) => {
                // Classify for the log only; every failure means unavailable
                let reason = if e.is_timeout() {
                    "timeout"
                } else if e.is_redirect() {
                    "too many redirects"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request error"
                };
                tracing::debug!("Probe {} failed: {} ({})", url, reason, e);
                false
            }
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> bool {
        for candidate in candidate_urls(url) {
            if self.check_url(&candidate).await {
                return true;
            }
        }
        false
    }
}
