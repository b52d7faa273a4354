use crate::config::PlatformFlags;
use crate::matcher::Platform;
use crate::media::Resolution;

use super::error::ResolveError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use std::str::FromStr;
use tracing::debug;

/// Shared HTTP state of a resolver: the link being resolved, the client and
/// the headers every request of the platform carries.
///
/// The user-agent comes from the client unless a platform overrides it.
#[derive(Debug, Clone)]
pub struct Extractor {
    // normalized link, e.g. "https://www.reddit.com/r/rust/comments/1abcdef"
    pub url: String,
    pub platform: Platform,
    pub client: Client,
    platform_headers: HeaderMap,
}

impl Extractor {
    pub fn new<S: Into<String>>(platform: Platform, url: S, client: Client) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        Self {
            url: url.into(),
            platform,
            client,
            platform_headers: default_headers,
        }
    }

    /// Insert an arbitrary header. Invalid names or values are skipped.
    pub fn add_header_str<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderName::from_str(key.as_ref()) {
            Ok(name) => match HeaderValue::from_str(value.as_ref()) {
                Ok(value) => {
                    self.platform_headers.insert(name, value);
                }
                Err(e) => {
                    debug!(error = %e, "Invalid header value; skipping");
                }
            },
            Err(e) => {
                debug!(error = %e, "Invalid header name; skipping");
            }
        }
    }

    pub fn add_header_typed<K: Into<HeaderName>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderValue::from_str(value.as_ref()) {
            Ok(value) => {
                self.platform_headers.insert(key.into(), value);
            }
            Err(e) => {
                debug!(error = %e, "Invalid header value; skipping");
            }
        }
    }

    pub fn set_origin_and_referer(&mut self, base_url: &str) {
        self.add_header_typed(reqwest::header::ORIGIN, base_url);
        self.add_header_typed(reqwest::header::REFERER, format!("{base_url}/"));
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Create an HTTP request carrying the platform headers.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .headers(self.platform_headers.clone())
    }
}

#[async_trait]
pub trait PlatformResolver: Send + Sync {
    fn get_extractor(&self) -> &Extractor;

    fn platform(&self) -> Platform {
        self.get_extractor().platform
    }

    /// Resolve the link into a caption and media descriptors, honouring `flags`
    /// for which kinds of output to produce.
    async fn resolve(&self, flags: &PlatformFlags) -> Result<Resolution, ResolveError>;
}
