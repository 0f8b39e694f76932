//! Rate sources: per-host HTTP access and the primary-to-fallback combinator.

use async_trait::async_trait;
use chrono::NaiveDate;
use curex_common::{CurrencyCatalog, CurrencyCode, RateDocument, WireRateDocument};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::error::{ClientError, ClientResult};

/// Endpoint path for the currency catalog.
pub fn catalog_path() -> String {
    "/currencies.json".to_string()
}

/// Endpoint path for a per-base rate document.
pub fn rates_path(base: &CurrencyCode) -> String {
    format!("/currencies/{}.json", base.code())
}

/// A source of currency catalogs and rate documents.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Fetch the code to display-name catalog.
    async fn catalog(&self) -> ClientResult<CurrencyCatalog>;

    /// Fetch the latest rate document for `base`.
    async fn latest(&self, base: &CurrencyCode) -> ClientResult<RateDocument>;

    /// Fetch the rate document for `base` as published on `date`.
    async fn dated(&self, base: &CurrencyCode, date: NaiveDate) -> ClientResult<RateDocument>;
}

/// One HTTP host serving the currency API.
///
/// No retries and no explicit timeout; the effective timeout is whatever
/// the transport enforces by default.
pub struct HttpRateSource {
    client: reqwest::Client,
    name: String,
    base_url: String,
    /// Versioned host template for historical snapshots, when this host
    /// publishes them.
    historical_url: Option<String>,
}

impl HttpRateSource {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            historical_url: None,
        }
    }

    /// Enable historical lookups through a versioned host template with a
    /// `{date}` placeholder.
    pub fn with_historical(mut self, template: impl Into<String>) -> Self {
        self.historical_url = Some(template.into());
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> ClientResult<T> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::DocumentMissing { url });
        }
        if !status.is_success() {
            return Err(ClientError::Transport {
                url,
                detail: format!("unexpected status {status}"),
            });
        }

        response.json::<T>().await.map_err(|e| ClientError::Transport {
            url: url.clone(),
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn catalog(&self) -> ClientResult<CurrencyCatalog> {
        let url = format!("{}{}", self.base_url, catalog_path());
        debug!(source = self.name(), url = %url, "Fetching currency catalog");
        self.get_json(url).await
    }

    async fn latest(&self, base: &CurrencyCode) -> ClientResult<RateDocument> {
        let url = format!("{}{}", self.base_url, rates_path(base));
        debug!(source = self.name(), url = %url, "Fetching latest rates");
        let wire: WireRateDocument = self.get_json(url).await?;
        Ok(RateDocument::from_wire(base.clone(), wire))
    }

    async fn dated(&self, base: &CurrencyCode, date: NaiveDate) -> ClientResult<RateDocument> {
        let path = rates_path(base);
        let template = self.historical_url.as_ref().ok_or_else(|| {
            ClientError::Transport {
                url: format!("{}{}", self.base_url, path),
                detail: "no versioned host configured for historical lookups".to_string(),
            }
        })?;

        let host = template.replace("{date}", &date.format("%Y-%m-%d").to_string());
        let url = format!("{}{}", host.trim_end_matches('/'), path);
        debug!(source = self.name(), url = %url, "Fetching dated rates");
        let wire: WireRateDocument = self.get_json(url).await?;
        Ok(RateDocument::from_wire(base.clone(), wire))
    }
}

/// Ordered sources: first success wins, last failure surfaces as
/// `SourceUnavailable`. There is exactly one hand-off per request, no
/// backoff and no repeated attempts.
///
/// Historical lookups are not spread across hosts; they go to the first
/// source only, preserving the live/historical asymmetry of the API.
pub struct FallbackSource {
    sources: Vec<Arc<dyn RateSource>>,
}

impl FallbackSource {
    pub fn new(sources: Vec<Arc<dyn RateSource>>) -> Self {
        Self { sources }
    }

    /// Build the primary/fallback chain from configuration. Only the
    /// primary host carries the versioned template.
    pub fn from_config(config: &SourceConfig) -> Self {
        let primary: Arc<dyn RateSource> = Arc::new(
            HttpRateSource::new("primary", &config.primary_url)
                .with_historical(&config.historical_url),
        );
        let fallback: Arc<dyn RateSource> =
            Arc::new(HttpRateSource::new("fallback", &config.fallback_url));

        Self::new(vec![primary, fallback])
    }
}

#[async_trait]
impl RateSource for FallbackSource {
    fn name(&self) -> &str {
        "fallback-chain"
    }

    async fn catalog(&self) -> ClientResult<CurrencyCatalog> {
        for source in &self.sources {
            match source.catalog().await {
                Ok(catalog) => {
                    debug!(source = source.name(), "Currency catalog fetched");
                    return Ok(catalog);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Source failed, trying next");
                }
            }
        }

        Err(ClientError::SourceUnavailable {
            path: catalog_path(),
        })
    }

    async fn latest(&self, base: &CurrencyCode) -> ClientResult<RateDocument> {
        for source in &self.sources {
            match source.latest(base).await {
                Ok(document) => {
                    debug!(source = source.name(), base = %base, "Rate document fetched");
                    return Ok(document);
                }
                Err(e) => {
                    warn!(source = source.name(), base = %base, error = %e, "Source failed, trying next");
                }
            }
        }

        Err(ClientError::SourceUnavailable {
            path: rates_path(base),
        })
    }

    async fn dated(&self, base: &CurrencyCode, date: NaiveDate) -> ClientResult<RateDocument> {
        match self.sources.first() {
            Some(source) => source.dated(base, date).await,
            None => Err(ClientError::SourceUnavailable {
                path: rates_path(base),
            }),
        }
    }
}

/// In-memory rate source for tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    name: String,
    catalog: parking_lot::Mutex<Option<CurrencyCatalog>>,
    latest_docs: dashmap::DashMap<String, RateDocument>,
    dated_docs: dashmap::DashMap<(String, NaiveDate), RateDocument>,
    fail_dates: dashmap::DashMap<NaiveDate, ()>,
    requests: parking_lot::Mutex<Vec<String>>,
    fail_all: bool,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog: parking_lot::Mutex::new(None),
            latest_docs: dashmap::DashMap::new(),
            dated_docs: dashmap::DashMap::new(),
            fail_dates: dashmap::DashMap::new(),
            requests: parking_lot::Mutex::new(Vec::new()),
            fail_all: false,
        }
    }

    /// A source whose every request fails at the transport level.
    pub fn failing(name: impl Into<String>) -> Self {
        let mut source = Self::new(name);
        source.fail_all = true;
        source
    }

    pub fn set_catalog(&self, catalog: CurrencyCatalog) {
        *self.catalog.lock() = Some(catalog);
    }

    /// Serve `document` for latest-rate requests on its base.
    pub fn set_latest(&self, document: RateDocument) {
        self.latest_docs
            .insert(document.base.code().to_string(), document);
    }

    /// Serve `document` for dated requests on its (base, date).
    pub fn set_dated(&self, document: RateDocument) {
        self.dated_docs.insert(
            (document.base.code().to_string(), document.date),
            document,
        );
    }

    /// Inject a transport failure for one historical day.
    pub fn fail_on(&self, date: NaiveDate) {
        self.fail_dates.insert(date, ());
    }

    /// Logical paths requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn record(&self, path: &str) {
        self.requests.lock().push(path.to_string());
    }

    fn transport_failure(&self, path: &str) -> ClientError {
        ClientError::Transport {
            url: format!("mock://{}{}", self.name, path),
            detail: "injected failure".to_string(),
        }
    }

    fn missing(&self, path: &str) -> ClientError {
        ClientError::DocumentMissing {
            url: format!("mock://{}{}", self.name, path),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn catalog(&self) -> ClientResult<CurrencyCatalog> {
        let path = catalog_path();
        self.record(&path);
        if self.fail_all {
            return Err(self.transport_failure(&path));
        }
        self.catalog.lock().clone().ok_or_else(|| self.missing(&path))
    }

    async fn latest(&self, base: &CurrencyCode) -> ClientResult<RateDocument> {
        let path = rates_path(base);
        self.record(&path);
        if self.fail_all {
            return Err(self.transport_failure(&path));
        }
        self.latest_docs
            .get(base.code())
            .map(|doc| doc.clone())
            .ok_or_else(|| self.missing(&path))
    }

    async fn dated(&self, base: &CurrencyCode, date: NaiveDate) -> ClientResult<RateDocument> {
        let path = format!("{}@{}", rates_path(base), date);
        self.record(&path);
        if self.fail_all || self.fail_dates.contains_key(&date) {
            return Err(self.transport_failure(&path));
        }
        self.dated_docs
            .get(&(base.code().to_string(), date))
            .map(|doc| doc.clone())
            .ok_or_else(|| self.missing(&path))
    }
}
