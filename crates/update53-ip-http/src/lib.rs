// # HTTP Address Sources
//
// This crate provides the network-backed address sources for update53.
//
// ## Sources
//
// - [`HttpAddressSource`]: GET an operator supplied URL that answers with the
//   caller's address as plain text (e.g. https://checkip.amazonaws.com)
// - [`MetadataAddressSource`]: ask the EC2 instance metadata service for the
//   instance's `public-ipv4` attribute
//
// Both return the trimmed body text. Parsing happens in
// `update53_core::AddressResolver` so every source fails the same way.

use async_trait::async_trait;
use std::time::Duration;
use update53_core::config::DEFAULT_HTTP_TIMEOUT_SECS;
use update53_core::{AddressSource, Error, Result};

/// Default EC2 instance metadata endpoint
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://169.254.169.254";

/// Path of the public IPv4 attribute
const PUBLIC_IPV4_PATH: &str = "/latest/meta-data/public-ipv4";

/// Path of the IMDSv2 session token
const TOKEN_PATH: &str = "/latest/api/token";

/// Lifetime requested for IMDSv2 session tokens
const TOKEN_TTL_SECS: u32 = 21600;

/// Upper bound for the IMDSv2 token request, independent of the fetch timeout
const TOKEN_TIMEOUT: Duration = Duration::from_secs(1);

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Send a request and return the trimmed body of a 2xx response
async fn fetch_text(request: reqwest::RequestBuilder, source: &str) -> Result<String> {
    let response = request.send().await.map_err(|e| {
        Error::network(source, format!("unable to get public ip details: {}", e))
    })?;

    if !response.status().is_success() {
        return Err(Error::network(
            source,
            format!("HTTP error: {}", response.status()),
        ));
    }

    let body = response.text().await.map_err(|e| {
        Error::network(source, format!("unable to read public ip in response: {}", e))
    })?;

    Ok(body.trim().to_string())
}

/// Plain-text address from an arbitrary URL
pub struct HttpAddressSource {
    url: String,
    client: reqwest::Client,
}

impl HttpAddressSource {
    /// Create a source with the default timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    /// Create a source with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client: build_client(timeout),
        }
    }

}

#[async_trait]
impl AddressSource for HttpAddressSource {
    async fn fetch(&self) -> Result<String> {
        tracing::debug!("Fetching public ip from {}", self.url);
        fetch_text(self.client.get(&self.url), &self.url).await
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// EC2 instance metadata `public-ipv4` attribute
///
/// Uses an IMDSv2 session token when the service hands one out and falls
/// back to a plain IMDSv1 request when it does not.
pub struct MetadataAddressSource {
    endpoint: String,
    client: reqwest::Client,
}

impl MetadataAddressSource {
    /// Create a source for the standard metadata endpoint
    pub fn new() -> Self {
        Self::with_endpoint(
            DEFAULT_METADATA_ENDPOINT,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        )
    }

    /// Create a source for a custom endpoint (e.g. a local metadata mock)
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            endpoint,
            client: build_client(timeout),
        }
    }

    async fn session_token(&self) -> Option<String> {
        let url = format!("{}{}", self.endpoint, TOKEN_PATH);
        let request = self
            .client
            .put(&url)
            .timeout(TOKEN_TIMEOUT)
            .header("X-aws-ec2-metadata-token-ttl-seconds", TOKEN_TTL_SECS.to_string());

        match fetch_text(request, &url).await {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("No IMDSv2 token, falling back to IMDSv1: {}", e);
                None
            }
        }
    }
}

impl Default for MetadataAddressSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AddressSource for MetadataAddressSource {
    async fn fetch(&self) -> Result<String> {
        let url = format!("{}{}", self.endpoint, PUBLIC_IPV4_PATH);

        let mut request = self.client.get(&url);
        if let Some(token) = self.session_token().await {
            request = request.header("X-aws-ec2-metadata-token", token);
        }

        fetch_text(request, &self.describe()).await
    }

    fn describe(&self) -> String {
        format!("instance metadata ({})", self.endpoint)
    }
}
