//! HTTP client with rate limiting for the Pandora APIs.
//!
//! Wraps `reqwest::Client` to add:
//! * token-bucket admission control shared by every call this client
//!   issues ([`crate::rate::RateLimiter`])
//! * consistent timeouts and headers
//!
//! The limiter is the sole admission checkpoint: every rate-limited request
//! goes through [`Client::execute`], and no request path bypasses it. The
//! metadata lookup clients layered on top of this crate construct their own
//! instance each, so unrelated clients never share a bucket.

use std::time::Duration;

use reqwest::{self, Body, Method, Request, Url};

use crate::{config::Config, error::Result, rate::RateLimiter};

/// HTTP client with built-in rate limiting.
pub struct Client {
    /// Underlying client, reached only through [`Client::execute`] so no
    /// request escapes the rate limiter.
    inner: reqwest::Client,

    /// Token bucket for API quota compliance.
    rate_limiter: RateLimiter,
}

impl Client {
    /// Duration to keep idle connections alive.
    ///
    /// Prevents frequent reconnection overhead for subsequent requests.
    const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Duration to wait for individual network reads.
    const READ_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a new client with the configured rate limits.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .tcp_keepalive(Self::KEEPALIVE_TIMEOUT)
            .read_timeout(Self::READ_TIMEOUT)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            inner: http_client,
            rate_limiter: RateLimiter::new(config.requests_per_sec, config.burst),
        })
    }

    /// The token bucket guarding this client's requests.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Builds a request with the specified method, URL and body.
    pub fn request<U, T>(&self, method: Method, url: U, body: T) -> Request
    where
        U: Into<Url>,
        T: Into<Body>,
    {
        let mut request = Request::new(method, url.into());
        *request.body_mut() = Some(body.into());
        request
    }

    /// Builds a POST request.
    ///
    /// Convenience method for [`Client::request`] with the POST method.
    pub fn post<U, T>(&self, url: U, body: T) -> Request
    where
        U: Into<Url>,
        T: Into<Body>,
    {
        self.request(Method::POST, url, body)
    }

    /// Executes a request, suspending first until the rate limiter admits
    /// it.
    ///
    /// # Errors
    ///
    /// Returns an error if request execution fails or a network error
    /// occurs.
    pub async fn execute(&self, request: Request) -> Result<reqwest::Response> {
        self.rate_limiter.acquire().await;
        self.inner.execute(request).await.map_err(Into::into)
    }
}
