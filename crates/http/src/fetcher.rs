//! HTTP client fetching keys from a remote peer

use meshcache::PeerFetcher;
use meshcache_core::BoxError;
use once_cell::sync::OnceCell;
use std::time::Duration;
use url::Url;

/// Fetches group values from one peer via
/// `GET {peer}{base_path}{group}/{key}`.
///
/// Uses a blocking client: peer fetches happen inside the synchronous
/// load path of a group, never on an async worker thread. The client
/// itself is built lazily on the first fetch — constructing a blocking
/// client on an async worker panics, and fetchers are typically wired
/// up (via `set_peers`) from the same async context that serves
/// traffic.
pub struct HttpFetcher {
    base: Url,
    client: OnceCell<reqwest::blocking::Client>,
}

impl HttpFetcher {
    /// `base` is the peer address joined with the pool's base path,
    /// e.g. `http://10.0.0.2:8000/_meshcache/`. Validates the address
    /// but opens no connection.
    pub fn new(base: &str) -> Result<Self, BoxError> {
        let base = Url::parse(base)?;
        Ok(Self {
            base,
            client: OnceCell::new(),
        })
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, BoxError> {
        self.client
            .get_or_try_init(|| {
                reqwest::blocking::Client::builder()
                    .timeout(Duration::from_secs(10))
                    .build()
            })
            .map_err(Into::into)
    }

    fn key_url(&self, group: &str, key: &str) -> Result<Url, BoxError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| "peer URL cannot be a base")?
            .pop_if_empty()
            .push(group)
            .push(key);
        Ok(url)
    }
}

impl PeerFetcher for HttpFetcher {
    fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>, BoxError> {
        let url = self.key_url(group, key)?;
        let response = self.client()?.get(url.clone()).send()?;
        if !response.status().is_success() {
            return Err(format!("peer returned {} for {url}", response.status()).into());
        }
        Ok(response.bytes()?.to_vec())
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher").field("base", &self.base).finish()
    }
}
