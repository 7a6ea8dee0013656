//! Raw request/response exchange with record and replay support.
//!
//! The transport intercepts exactly one thing: the network exchange. In
//! [`Mode::Live`] it issues the request; in [`Mode::Record`] it issues the
//! request and best-effort persists successful response bodies, keyed by
//! method name; in [`Mode::Replay`] it serves responses from the fixture
//! file without any network access and fails hard on a missing fixture.
//!
//! Encryption and rate limiting are layered elsewhere, so the same call
//! pipeline code path runs in every mode. The mode is chosen by the
//! configuration (one environment switch read at construction), never by
//! the call site.

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use http::StatusCode;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    http::Client as HttpClient,
    rate::RateLimiter,
};

/// Transport mode, fixed for the lifetime of a client.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Mode {
    /// Issue real network requests.
    #[default]
    Live,

    /// Issue real requests and persist the responses as fixtures.
    Record,

    /// Serve responses from the fixture store; never touch the network.
    Replay,
}

impl Mode {
    /// Reads the mode from [`Config::FIXTURE_MODE_ENV`].
    ///
    /// Unrecognized or absent values mean [`Mode::Live`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(env::var(Config::FIXTURE_MODE_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("record") => Self::Record,
            Some(v) if v.eq_ignore_ascii_case("replay") => Self::Replay,
            _ => Self::Live,
        }
    }
}

/// One raw exchange result: HTTP status plus the response text.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

/// File-backed mapping from method name to recorded response envelope.
///
/// Keys are unique per method: re-recording a method overwrites its
/// fixture.
#[derive(Debug)]
pub struct FixtureStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl FixtureStore {
    /// Opens a store for replaying. The file must exist and parse.
    pub fn open(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "fixture file {}: {e}; run once in record mode first",
                path.display()
            ))
        })?;
        let entries: HashMap<String, serde_json::Value> = serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("fixture file {}: {e}", path.display())))?;

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    /// Creates a store for recording, seeded from the file when present so
    /// that partial recordings accumulate.
    #[must_use]
    pub fn create(path: &Path) -> Self {
        let entries = fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        }
    }

    /// Looks up the recorded response for a method.
    #[must_use]
    pub fn get(&self, method: &str) -> Option<serde_json::Value> {
        self.lock().get(method).cloned()
    }

    /// Persists a response body under its method name, best effort.
    ///
    /// A response that does not parse as JSON, or a file that cannot be
    /// written, is logged and ignored; recording must never fail the live
    /// call it piggybacks on.
    pub fn record(&self, method: &str, body: &str) {
        let value = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => value,
            Err(e) => {
                warn!("not recording {method}: response is not JSON: {e}");
                return;
            }
        };

        self.lock().insert(method.to_string(), value);
        if let Err(e) = self.save() {
            warn!("failed to save fixture for {method}: {e}");
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::Config(e.to_string()))?;
            }
        }
        let contents = serde_json::to_string_pretty(&*self.lock())?;
        fs::write(&self.path, contents).map_err(|e| Error::Config(e.to_string()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, serde_json::Value>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Network I/O wrapper combining the HTTP client with the fixture store.
pub struct Transport {
    mode: Mode,
    store: Option<FixtureStore>,
    http: HttpClient,
}

impl Transport {
    /// The `Content-Type` of all API requests. The bodies are JSON (or hex
    /// ciphertext of JSON), but the protocol wants them as plain text.
    const PLAIN_TEXT_CONTENT: HeaderValue = HeaderValue::from_static("text/plain;charset=UTF-8");

    /// Creates a transport in the configured mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] in replay mode when the fixture file is
    /// missing or malformed, and any HTTP client construction error.
    pub fn new(config: &Config) -> Result<Self> {
        let store = match config.mode {
            Mode::Live => None,
            Mode::Record => Some(FixtureStore::create(&config.fixture_file)),
            Mode::Replay => Some(FixtureStore::open(&config.fixture_file)?),
        };

        Ok(Self {
            mode: config.mode,
            store,
            http: HttpClient::new(config)?,
        })
    }

    /// The rate limiter guarding this transport's network requests.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        self.http.limiter()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Performs one exchange: POST `body` to `url`, or replay the fixture
    /// recorded for `method`.
    ///
    /// Replay serves straight from the store without passing the rate
    /// limiter; admission control applies to network requests only.
    pub async fn exchange(&self, method: &str, url: Url, body: String) -> Result<Reply> {
        if self.mode == Mode::Replay {
            let store = self.store.as_ref().expect("replay mode without a store");
            return match store.get(method) {
                Some(value) => Ok(Reply {
                    status: StatusCode::OK,
                    body: value.to_string(),
                }),
                None => Err(Error::NotFound(format!(
                    "no fixture for {method}; run once in record mode first"
                ))),
            };
        }

        let mut request = self.http.post(url, body);
        request
            .headers_mut()
            .try_insert(CONTENT_TYPE, Self::PLAIN_TEXT_CONTENT)?;

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if self.mode == Mode::Record && status.is_success() {
            if let Some(store) = &self.store {
                store.record(method, &body);
            }
        }

        Ok(Reply { status, body })
    }
}
