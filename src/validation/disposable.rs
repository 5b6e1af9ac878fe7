use crate::config::DisposableListConfig;
use crate::models::address::Address;
use crate::outcome::{ErrorKind, Outcome, ValidationFailure};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Raw response from a list download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status_ok: bool,
    /// Status code and reason phrase, e.g. `"404 : Not Found"`
    pub status_reason: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// HTTP fetch capability used to download the temporary-domain list.
///
/// Implementations own their timeouts; a request that never completes
/// stalls the step that triggered the refresh.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// [`ListFetcher`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpListFetcher {
    client: reqwest::Client,
}

impl HttpListFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ListFetcher for HttpListFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let status_reason = format!(
            "{} : {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );

        if !status.is_success() {
            return Ok(FetchResponse {
                status_ok: false,
                status_reason,
                body: String::new(),
            });
        }

        Ok(FetchResponse {
            status_ok: true,
            status_reason,
            body: response.text().await?,
        })
    }
}

/// Parses a newline-delimited domain list.
///
/// Blank lines are skipped; entries are trimmed and lower-cased.
///
/// # Examples
/// ```
/// use email_sanitizer::validation::disposable::parse_domain_list;
///
/// let domains = parse_domain_list("Mailinator.com\r\n\n  10minutemail.com  \n");
/// assert_eq!(domains.len(), 2);
/// assert!(domains.contains("mailinator.com"));
/// ```
pub fn parse_domain_list(body: &str) -> HashSet<String> {
    body.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Minutes a stale list keeps being served after a failed refresh
pub const RETRY_BACKOFF_MINUTES: i64 = 5;

#[derive(Debug, Default)]
struct CachedBlocklist {
    domains: HashSet<String>,
    /// `None` until the first successful download
    expires_at: Option<DateTime<Utc>>,
}

impl CachedBlocklist {
    fn is_loaded(&self) -> bool {
        self.expires_at.is_some()
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| now > expires_at)
    }
}

/// # Temporary Domain Cache
///
/// TTL-bounded cache of a downloaded list of disposable email domains. Share
/// one instance (behind an `Arc`) between every pipeline in the process.
///
/// - Starts empty; the first lookup downloads the list.
/// - After `cache_hours` the next lookup downloads it again and swaps the
///   whole set in one write.
/// - Refreshes are serialized: concurrent lookups on an expired cache wait
///   for a single download instead of starting their own.
/// - A failed download never clears the cache. If an earlier list exists it
///   keeps being served and the next download is put off for
///   [`RETRY_BACKOFF_MINUTES`]; if none exists the lookup fails.
/// - Lookups on a loaded but expired list do not wait for a refresh that
///   another caller already started; they read the current list.
pub struct DisposableDomainCache {
    config: DisposableListConfig,
    fetcher: Arc<dyn ListFetcher>,
    state: RwLock<CachedBlocklist>,
    refresh: Mutex<()>,
}

impl DisposableDomainCache {
    pub fn new(config: DisposableListConfig, fetcher: Arc<dyn ListFetcher>) -> Self {
        Self {
            config,
            fetcher,
            state: RwLock::new(CachedBlocklist::default()),
            refresh: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &DisposableListConfig {
        &self.config
    }

    /// Number of cached domains
    pub async fn len(&self) -> usize {
        self.state.read().await.domains.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// When the current list expires, `None` if nothing was loaded yet
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.expires_at
    }

    /// Case-insensitive membership test against the cached list
    pub async fn contains(&self, domain: &str) -> bool {
        self.state
            .read()
            .await
            .domains
            .contains(&domain.to_lowercase())
    }

    /// Makes sure the cache is loaded and not expired.
    pub async fn ensure_fresh(&self) -> Result<(), ValidationFailure> {
        self.ensure_fresh_at(Utc::now()).await
    }

    /// [`DisposableDomainCache::ensure_fresh`] evaluated at `now`
    pub async fn ensure_fresh_at(&self, now: DateTime<Utc>) -> Result<(), ValidationFailure> {
        let loaded = {
            let state = self.state.read().await;
            if !state.is_stale(now) {
                return Ok(());
            }
            state.is_loaded()
        };

        // with a list to fall back on, never queue behind a refresh in flight
        let _refresh = if loaded {
            match self.refresh.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    debug!("List refresh already in progress, serving the current list");
                    return Ok(());
                }
            }
        } else {
            self.refresh.lock().await
        };

        // another caller may have refreshed while we waited for the lock
        if !self.state.read().await.is_stale(now) {
            return Ok(());
        }

        let domains = match self.download().await {
            Ok(domains) => domains,
            Err(message) => {
                let mut state = self.state.write().await;
                if !state.is_loaded() {
                    return Err(ValidationFailure::new(ErrorKind::Empty, message));
                }

                let retry_at = now
                    .checked_add_signed(TimeDelta::minutes(RETRY_BACKOFF_MINUTES))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                state.expires_at = Some(retry_at);
                warn!(
                    "{}; serving the previously loaded list until {}",
                    message, retry_at
                );
                return Ok(());
            }
        };

        let ttl = TimeDelta::hours(i64::from(self.config.cache_hours));
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let count = domains.len();

        *self.state.write().await = CachedBlocklist {
            domains,
            expires_at: Some(expires_at),
        };

        info!(
            "Loaded {} temporary service domains from {}, next refresh after {}",
            count, self.config.list_url, expires_at
        );
        Ok(())
    }

    async fn download(&self) -> Result<HashSet<String>, String> {
        debug!("Downloading temporary service list from {}", self.config.list_url);

        let response = self
            .fetcher
            .get(&self.config.list_url)
            .await
            .map_err(|e| format!("Unable to load temporary services list - {}", e))?;

        if !response.status_ok {
            return Err(format!(
                "Unable to load temporary services list - {}",
                response.status_reason
            ));
        }

        Ok(parse_domain_list(&response.body))
    }
}

impl Outcome<Address> {
    /// Fails with `NotAllowed` when the domain is a known temporary email
    /// service, refreshing `cache` first if needed.
    pub async fn disallow_temporary_domains(self, cache: &DisposableDomainCache) -> Self {
        self.disallow_temporary_domains_at(cache, Utc::now()).await
    }

    /// [`Outcome::disallow_temporary_domains`] evaluated at `now`
    pub async fn disallow_temporary_domains_at(
        self,
        cache: &DisposableDomainCache,
        now: DateTime<Utc>,
    ) -> Self {
        self.then_async(|address| async move {
            let Some(domain) = address.domain() else {
                return Outcome::failure(
                    ErrorKind::Empty,
                    "No domain parsed from email, cannot check against temporary services",
                );
            };

            if let Err(failure) = cache.ensure_fresh_at(now).await {
                return Outcome::Failure(failure);
            }

            if cache.contains(domain).await {
                return Outcome::failure(
                    ErrorKind::NotAllowed,
                    format!("'{}' is not an allowed domain", domain),
                );
            }

            Outcome::success(address)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    const LIST: &str = "mailinator.com\n10MinuteMail.com\r\n\n   \nguerrillamail.com\n";

    fn ok_response(body: &str) -> Result<FetchResponse, FetchError> {
        Ok(FetchResponse {
            status_ok: true,
            status_reason: "200 : OK".to_string(),
            body: body.to_string(),
        })
    }

    fn not_found() -> Result<FetchResponse, FetchError> {
        Ok(FetchResponse {
            status_ok: false,
            status_reason: "404 : Not Found".to_string(),
            body: String::new(),
        })
    }

    /// Replays scripted responses and counts calls
    struct ScriptedFetcher {
        responses: StdMutex<VecDeque<Result<FetchResponse, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<FetchResponse, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: StdMutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ListFetcher for ScriptedFetcher {
        async fn get(&self, _url: &str) -> Result<FetchResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("no scripted response".to_string())))
        }
    }

    fn config() -> DisposableListConfig {
        DisposableListConfig::new("https://lists.example.test/disposable.txt", 1)
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn parsed(input: &str) -> Outcome<Address> {
        Address::validator(input).validate_format().parse()
    }

    #[test]
    fn test_parse_domain_list() {
        let domains = parse_domain_list(LIST);

        assert_eq!(domains.len(), 3);
        assert!(domains.contains("10minutemail.com"));
        assert!(!domains.contains(""));
    }

    #[tokio::test]
    async fn test_blocks_listed_domain() {
        let fetcher = ScriptedFetcher::new(vec![ok_response(LIST)]);
        let cache = DisposableDomainCache::new(config(), fetcher.clone());

        let blocked = parsed("someone@mailinator.com")
            .disallow_temporary_domains_at(&cache, t0())
            .await;
        assert_eq!(blocked.error_kind(), Some(ErrorKind::NotAllowed));
        assert_eq!(
            blocked.error_message(),
            Some("'mailinator.com' is not an allowed domain")
        );

        let allowed = parsed("someone@example.com")
            .disallow_temporary_domains_at(&cache, t0())
            .await;
        assert!(allowed.is_success());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_ttl_controls_refetch() {
        let fetcher = ScriptedFetcher::new(vec![ok_response(LIST), ok_response("new.example\n")]);
        let cache = DisposableDomainCache::new(config(), fetcher.clone());

        assert_ok!(cache.ensure_fresh_at(t0()).await);
        assert_eq!(fetcher.calls(), 1);

        // within the hour: cached
        assert_ok!(cache.ensure_fresh_at(t0() + TimeDelta::minutes(30)).await);
        assert_eq!(fetcher.calls(), 1);

        // past the hour: downloaded again and replaced wholesale
        assert_ok!(cache.ensure_fresh_at(t0() + TimeDelta::minutes(61)).await);
        assert_eq!(fetcher.calls(), 2);
        assert!(cache.contains("new.example").await);
        assert!(!cache.contains("mailinator.com").await);
        assert_eq!(
            cache.expires_at().await,
            Some(t0() + TimeDelta::minutes(61) + TimeDelta::hours(1))
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_list() {
        let fetcher = ScriptedFetcher::new(vec![ok_response(LIST), not_found()]);
        let cache = DisposableDomainCache::new(config(), fetcher.clone());
        assert_ok!(cache.ensure_fresh_at(t0()).await);

        let later = t0() + TimeDelta::minutes(61);
        let blocked = parsed("x@guerrillamail.com")
            .disallow_temporary_domains_at(&cache, later)
            .await;
        assert_eq!(blocked.error_kind(), Some(ErrorKind::NotAllowed));

        let allowed = parsed("x@example.com")
            .disallow_temporary_domains_at(&cache, later)
            .await;
        assert!(allowed.is_success());
        assert_eq!(cache.len().await, 3);
    }

    #[tokio::test]
    async fn test_outage_on_stale_list_fetches_once() {
        let fetcher = ScriptedFetcher::new(vec![
            ok_response(LIST),
            Err(FetchError::Timeout),
            Err(FetchError::Timeout),
        ]);
        let cache = DisposableDomainCache::new(config(), fetcher.clone());
        assert_ok!(cache.ensure_fresh_at(t0()).await);

        let later = t0() + TimeDelta::minutes(61);
        let lookups = (0..8).map(|_| {
            parsed("x@mailinator.com").disallow_temporary_domains_at(&cache, later)
        });
        let outcomes = futures::future::join_all(lookups).await;

        assert!(outcomes
            .iter()
            .all(|outcome| outcome.error_kind() == Some(ErrorKind::NotAllowed)));
        assert_eq!(fetcher.calls(), 2);

        // the retry is put off, so a lookup right after does not fetch again
        assert_ok!(cache.ensure_fresh_at(later + TimeDelta::minutes(1)).await);
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(
            cache.expires_at().await,
            Some(later + TimeDelta::minutes(RETRY_BACKOFF_MINUTES))
        );

        // once the backoff passes the download is retried
        assert_ok!(cache.ensure_fresh_at(later + TimeDelta::minutes(6)).await);
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(cache.len().await, 3);
    }

    #[tokio::test]
    async fn test_failure_without_prior_list() {
        let fetcher = ScriptedFetcher::new(vec![not_found()]);
        let cache = DisposableDomainCache::new(config(), fetcher);

        let outcome = parsed("x@example.com")
            .disallow_temporary_domains_at(&cache, t0())
            .await;

        assert_eq!(outcome.error_kind(), Some(ErrorKind::Empty));
        assert_eq!(
            outcome.error_message(),
            Some("Unable to load temporary services list - 404 : Not Found")
        );
        assert!(cache.is_empty().await);
        assert_eq!(cache.expires_at().await, None);
    }

    #[tokio::test]
    async fn test_transport_error_is_translated() {
        let mut fetcher = MockListFetcher::new();
        fetcher
            .expect_get()
            .times(1)
            .returning(|_| Err(FetchError::Timeout));
        let cache = DisposableDomainCache::new(config(), Arc::new(fetcher));

        let failure = assert_err!(cache.ensure_fresh_at(t0()).await);
        assert_eq!(failure.kind, ErrorKind::Empty);
        assert_eq!(
            failure.message,
            "Unable to load temporary services list - request timed out"
        );
    }

    #[tokio::test]
    async fn test_concurrent_lookups_download_once() {
        let fetcher = ScriptedFetcher::new(vec![ok_response(LIST)]);
        let cache = DisposableDomainCache::new(config(), fetcher.clone());

        let lookups = (0..8).map(|_| {
            parsed("x@mailinator.com").disallow_temporary_domains_at(&cache, t0())
        });
        let outcomes = futures::future::join_all(lookups).await;

        assert!(outcomes
            .iter()
            .all(|outcome| outcome.error_kind() == Some(ErrorKind::NotAllowed)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_prior_failure_skips_download() {
        let mut fetcher = MockListFetcher::new();
        fetcher.expect_get().never();
        let cache = DisposableDomainCache::new(config(), Arc::new(fetcher));

        let outcome = Address::validator("no-at")
            .validate_format()
            .disallow_temporary_domains_at(&cache, t0())
            .await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidFormat));
    }

    #[tokio::test]
    async fn test_requires_parsed_domain() {
        let mut fetcher = MockListFetcher::new();
        fetcher.expect_get().never();
        let cache = DisposableDomainCache::new(config(), Arc::new(fetcher));

        let outcome = Address::validator("a@b.com")
            .disallow_temporary_domains_at(&cache, t0())
            .await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Empty));
    }
}
