//! Prober module for link reachability checks
//!
//! A probe answers one question: did this URL respond with a success or
//! redirection status in time? Every failure mode (DNS, TLS, timeout,
//! redirect limit, 4xx/5xx) collapses into `false`; probes never error.

mod http;

pub use http::{build_http_client, candidate_urls, HttpProber};

use async_trait::async_trait;

/// Something that can check whether a URL is reachable
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns true if the URL is reachable
    async fn probe(&self, url: &str) -> bool;
}
