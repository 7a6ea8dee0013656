//! The authenticated call pipeline and the handshake flow.
//!
//! [`Pandora`] owns the transport (and through it the rate limiter) but no
//! session state: sessions are plain values the caller passes into every
//! call, so one client can serve any number of sessions concurrently.
//!
//! A call runs through a fixed sequence: encrypt the body (merging in the
//! corrected `syncTime`), build the method URL with the session tokens,
//! pass the rate limiter, exchange with the transport, then decrypt/parse
//! the response envelope. Server-signaled throttling (HTTP 429/503) is the
//! only failure retried internally, with exponential backoff and a bounded
//! attempt count; everything else surfaces immediately as a typed error.

use exponential_backoff::Backoff;
use http::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{
    config::{Config, Credentials},
    crypt,
    error::{Error, Result},
    protocol::{auth, classify_failure, Envelope, Method},
    rate::RateLimiterStats,
    session::{PartnerSession, Session},
    transport::Transport,
    util,
};

/// Client for the Pandora JSON API.
pub struct Pandora {
    config: Config,
    transport: Transport,
}

impl Pandora {
    /// Creates a client in the configured transport mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the fixture store cannot be opened in
    /// replay mode, or an HTTP client construction error.
    pub fn new(config: Config) -> Result<Self> {
        let transport = Transport::new(&config)?;
        Ok(Self { config, transport })
    }

    /// Snapshot of this client's rate limiter, for diagnostics.
    #[must_use]
    pub fn limiter_stats(&self) -> RateLimiterStats {
        self.transport.limiter().stats()
    }

    /// Runs the full two-phase handshake and returns the session.
    ///
    /// Neither phase is retried internally; on failure the caller decides
    /// whether to run the whole flow again.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let partner = self.partner_login().await?;
        self.user_login(&partner, credentials).await
    }

    /// Phase one: the partner (device) handshake.
    ///
    /// The body travels unencrypted. The response's `syncTime` field is
    /// decrypted with the partner decrypt key and turned into a clock
    /// offset; the raw server time is never stored.
    pub async fn partner_login(&self) -> Result<PartnerSession> {
        let partner = &self.config.partner;
        let request = auth::PartnerLoginRequest {
            username: &partner.username,
            password: &partner.password,
            device_model: &partner.device_model,
            version: &partner.version,
        };
        let body = serde_json::to_string(&request).map_err(|e| Error::partner_login(e.into()))?;

        let url = self.method_url(auth::PartnerLogin::NAME);
        let response: auth::PartnerLogin =
            self.send(url, body).await.map_err(Error::partner_login)?;

        let server_time =
            crypt::decrypt_sync_time(partner.decrypt_key.as_bytes(), &response.sync_time)
                .map_err(Error::partner_login)?;
        let sync_time_offset = Self::clock_offset(server_time, util::now_from_epoch());
        debug!("negotiated clock offset: {sync_time_offset}s");

        Ok(PartnerSession {
            partner_id: response.partner_id,
            partner_auth_token: response.partner_auth_token,
            sync_time_offset,
        })
    }

    /// Phase two: the user handshake, encrypted with the partner key.
    pub async fn user_login(
        &self,
        partner: &PartnerSession,
        credentials: &Credentials,
    ) -> Result<Session> {
        let request = auth::UserLoginRequest {
            login_type: "user",
            username: &credentials.username,
            password: &credentials.password,
            partner_auth_token: &partner.partner_auth_token,
            sync_time: partner.sync_time(),
        };
        let body = self.encrypt_body(&request).map_err(Error::user_login)?;

        let mut url = self.method_url(auth::UserLogin::NAME);
        url.query_pairs_mut()
            .append_pair("auth_token", &partner.partner_auth_token)
            .append_pair("partner_id", &partner.partner_id);

        let response: auth::UserLogin = self.send(url, body).await.map_err(Error::user_login)?;

        Ok(Session {
            sync_time_offset: partner.sync_time_offset,
            partner_id: partner.partner_id.clone(),
            partner_auth_token: partner.partner_auth_token.clone(),
            user_id: response.user_id,
            user_auth_token: response.user_auth_token,
        })
    }

    /// Calls an authenticated API method.
    ///
    /// The session is read, never written; two calls with the same session
    /// always embed the same clock offset.
    pub async fn call<T, R>(&self, session: &Session, request: &R) -> Result<T>
    where
        T: Method + DeserializeOwned,
        R: Serialize,
    {
        let body = if T::ENCRYPTED {
            let mut value = serde_json::to_value(request)
                .map_err(|e| Error::api_call_source(T::NAME, e.into()))?;
            match value.as_object_mut() {
                Some(map) => {
                    map.insert("syncTime".to_string(), session.sync_time().into());
                }
                None => {
                    return Err(Error::api_call(T::NAME, "request body must be a JSON object"))
                }
            }
            self.encrypt_body(&value)
                .map_err(|e| Error::api_call_source(T::NAME, e))?
        } else {
            serde_json::to_string(request).map_err(|e| Error::api_call_source(T::NAME, e.into()))?
        };

        let mut url = self.method_url(T::NAME);
        url.query_pairs_mut()
            .append_pair("auth_token", &session.user_auth_token)
            .append_pair("partner_id", &session.partner_id)
            .append_pair("user_id", &session.user_id);

        self.send(url, body).await
    }

    /// Serializes and encrypts a request body into its hex wire form.
    fn encrypt_body<R>(&self, request: &R) -> Result<String>
    where
        R: Serialize,
    {
        let plaintext = serde_json::to_vec(request)?;
        crypt::encrypt(self.config.partner.encrypt_key.as_bytes(), &plaintext)
    }

    /// Sends a request and parses the response envelope, retrying throttled
    /// attempts within the overall call deadline.
    async fn send<T>(&self, url: Url, body: String) -> Result<T>
    where
        T: Method + DeserializeOwned,
    {
        match tokio::time::timeout(self.config.call_timeout, self.send_with_retry::<T>(url, body))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::timed_out(T::NAME)),
        }
    }

    async fn send_with_retry<T>(&self, url: Url, body: String) -> Result<T>
    where
        T: Method + DeserializeOwned,
    {
        let backoff = Backoff::new(
            self.config.max_retries,
            self.config.backoff_min,
            self.config.backoff_max,
        );

        for duration in &backoff {
            let reply = self
                .transport
                .exchange(T::NAME, url.clone(), body.clone())
                .await?;

            if Self::is_throttled(reply.status) {
                self.transport.limiter().on_rate_limited();
                match duration {
                    Some(delay) => {
                        warn!("{} throttled by server, retrying in {delay:?}", T::NAME);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    None => {
                        return Err(Error::api_call(
                            T::NAME,
                            format!(
                                "still throttled after {} attempts",
                                self.config.max_retries
                            ),
                        ))
                    }
                }
            }

            if !reply.status.is_success() {
                return Err(Error::api_call(
                    T::NAME,
                    format!("HTTP {}", reply.status),
                ));
            }

            return Self::parse::<T>(&reply.body);
        }

        Err(Error::api_call(T::NAME, "retry budget exhausted"))
    }

    /// Parses the response envelope and extracts the typed result.
    fn parse<T>(body: &str) -> Result<T>
    where
        T: Method + DeserializeOwned,
    {
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| Error::api_call_source(T::NAME, e.into()))?;

        match envelope {
            Envelope::Ok { result } => {
                // Handshake payloads carry tokens; do not log them.
                if T::NAME.starts_with("auth.") {
                    trace!("{}: {{ ... }}", T::NAME);
                } else {
                    trace!("{}: {result:#?}", T::NAME);
                }
                serde_json::from_value(result).map_err(|e| Error::api_call_source(T::NAME, e.into()))
            }
            Envelope::Fail { code, message } => Err(classify_failure(T::NAME, code, message)),
        }
    }

    fn method_url(&self, method: &str) -> Url {
        let mut url = self.config.api_url.clone();
        url.query_pairs_mut().append_pair("method", method);
        url
    }

    fn is_throttled(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
    }

    fn clock_offset(server_time: u64, local_time: u64) -> i64 {
        let server = i64::try_from(server_time).unwrap_or(i64::MAX);
        let local = i64::try_from(local_time).unwrap_or(i64::MAX);
        server - local
    }
}
