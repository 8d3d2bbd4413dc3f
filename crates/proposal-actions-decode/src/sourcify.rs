//! Sourcify 4byte signature lookup with caching
//!
//! Uses Sourcify's Signature Database API:
//! https://docs.sourcify.dev/docs/api/#/Signature%20Database/get_signature_database_v1_lookup

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use proposal_actions_core::{PortError, SignatureMap, SignatureSource};

use super::config::DecodeConfig;
use super::decode_log;

/// Maximum cached selectors (to prevent unbounded growth)
const MAX_CACHED_SELECTORS: usize = 1000;

/// Acquire mutex lock, recovering from poisoned state if necessary.
macro_rules! lock_or_recover {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("signature cache mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    };
}

/// Response from Sourcify Signature Database API
#[derive(Debug, Deserialize)]
struct SourcifyResponse {
    ok: bool,
    result: SourcifyResult,
}

#[derive(Debug, Deserialize)]
struct SourcifyResult {
    #[serde(default)]
    function: HashMap<String, Vec<SignatureEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureEntry {
    name: String,
    has_verified_contract: Option<bool>,
}

/// A signature with its verification status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub verified: bool,
}

/// Cached 4byte signature lookup client with spurious connection detection
///
/// Tracks failed requests and stops calling the API after
/// `max_failed_requests` consecutive failures (timeout, network error, 5xx).
#[derive(Clone)]
pub struct SourcifyLookup {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_failed_requests: usize,
    cache: Arc<Mutex<HashMap<String, Vec<SignatureInfo>>>>,
    is_spurious: Arc<AtomicBool>,
    failed_count: Arc<AtomicUsize>,
}

impl Default for SourcifyLookup {
    fn default() -> Self {
        Self::from_config(&DecodeConfig::default())
    }
}

impl SourcifyLookup {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        max_failed_requests: usize,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
            max_failed_requests: max_failed_requests.max(1),
            cache: Arc::new(Mutex::new(HashMap::new())),
            is_spurious: Arc::new(AtomicBool::new(false)),
            failed_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_config(config: &DecodeConfig) -> Self {
        Self::new(
            config.sourcify_base_url.clone(),
            Duration::from_millis(config.sourcify_timeout_ms),
            config.sourcify_max_failed_requests,
        )
    }

    /// Check if the API appears to be down
    pub fn is_spurious(&self) -> bool {
        self.is_spurious.load(Ordering::Relaxed)
    }

    pub fn reset_spurious(&self) {
        self.is_spurious.store(false, Ordering::Relaxed);
        self.failed_count.store(0, Ordering::Relaxed);
    }

    pub fn is_cached(&self, selector: &str) -> bool {
        let selector = normalize_selector(selector);
        lock_or_recover!(self.cache).contains_key(&selector)
    }

    fn on_success(&self) {
        self.failed_count.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self, reason: &dyn std::fmt::Display) {
        let count = self.failed_count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::warn!(
            "sourcify request failed ({}/{}): {}",
            count,
            self.max_failed_requests,
            reason
        );
        if count >= self.max_failed_requests {
            tracing::warn!("marking sourcify as unavailable after {} failures", count);
            self.is_spurious.store(true, Ordering::Relaxed);
        }
    }

    fn on_failure(&self, err: &reqwest::Error) {
        let is_connectivity_error = err.is_timeout()
            || err.is_connect()
            || err.status().is_some_and(|s| s.is_server_error())
            || err.is_request();
        if is_connectivity_error {
            self.record_failure(err);
        }
    }

    /// Batch lookup (deduplicates, uses cache). Selectors the API does not
    /// know are absent from the result.
    pub async fn lookup_batch(
        &self,
        selectors: &[String],
    ) -> Result<HashMap<String, Vec<SignatureInfo>>> {
        let mut results = HashMap::new();
        let mut to_fetch = Vec::new();

        {
            let cache = lock_or_recover!(self.cache);
            for sel in selectors {
                let normalized = normalize_selector(sel);
                if let Some(sigs) = cache.get(&normalized) {
                    decode_log!("cache hit for {}", normalized);
                    if !sigs.is_empty() {
                        results.insert(normalized, sigs.clone());
                    }
                } else if !to_fetch.contains(&normalized) {
                    to_fetch.push(normalized);
                }
            }
        }

        if to_fetch.is_empty() {
            return Ok(results);
        }

        // Only reached after an `ok: true` response, so misses are real misses
        let fetched = self.fetch_batch(&to_fetch).await?;
        let mut cache = lock_or_recover!(self.cache);
        for sel in to_fetch {
            let sigs = fetched.get(&sel).cloned().unwrap_or_default();
            if cache.len() < MAX_CACHED_SELECTORS {
                cache.insert(sel.clone(), sigs.clone());
            }
            if !sigs.is_empty() {
                results.insert(sel, sigs);
            }
        }

        Ok(results)
    }

    async fn fetch_batch(
        &self,
        selectors: &[String],
    ) -> Result<HashMap<String, Vec<SignatureInfo>>> {
        if self.is_spurious() {
            eyre::bail!("Sourcify API marked as unavailable");
        }

        // e.g. ?function=0xa9059cbb,0x095ea7b3&filter=true
        let url = format!(
            "{}?function={}&filter=true",
            self.base_url,
            selectors.join(",")
        );
        decode_log!("fetching {}", url);

        let response = match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.on_failure(&e);
                return Err(e).wrap_err("Failed to fetch from Sourcify API");
            }
        };

        let status = response.status();
        if !status.is_success() {
            if status.is_server_error() {
                self.record_failure(&status);
            }
            eyre::bail!("Sourcify API error: {}", status);
        }

        let api_response: SourcifyResponse = response
            .json()
            .await
            .wrap_err("Failed to parse Sourcify response")?;

        if !api_response.ok {
            eyre::bail!("Sourcify API returned ok=false");
        }

        self.on_success();

        let mut results = HashMap::new();
        for (selector, entries) in api_response.result.function {
            let mut sigs: Vec<SignatureInfo> = entries
                .into_iter()
                .map(|e| SignatureInfo {
                    signature: e.name,
                    verified: e.has_verified_contract.unwrap_or(false),
                })
                .collect();
            // Verified first
            sigs.sort_by(|a, b| b.verified.cmp(&a.verified));
            decode_log!("selector {}: {:?}", selector, sigs);
            results.insert(normalize_selector(&selector), sigs);
        }

        Ok(results)
    }
}

impl SignatureSource for SourcifyLookup {
    async fn lookup_signatures(&self, selectors: &[String]) -> Result<SignatureMap, PortError> {
        if self.is_spurious() {
            return Err(PortError::Unavailable("sourcify"));
        }
        let found = self
            .lookup_batch(selectors)
            .await
            .map_err(|e| PortError::Transport(format!("{e:#}")))?;
        Ok(found
            .into_iter()
            .map(|(sel, sigs)| (sel, sigs.into_iter().map(|s| s.signature).collect()))
            .collect())
    }
}

/// Normalize selector to lowercase with 0x prefix
fn normalize_selector(selector: &str) -> String {
    let sel = selector.trim().to_lowercase();
    if sel.starts_with("0x") {
        sel
    } else {
        format!("0x{}", sel)
    }
}
