use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{IneError, IneResult};
use crate::upstream::{Payload, Upstream, UpstreamRequest, classify};

pub mod catalog;
pub mod data;
pub mod latest;
pub mod search;

const DEFAULT_MAX_CONCURRENCY: usize = 4;
const DEFAULT_LATEST_TABLE_LIMIT: usize = 3;
const DEFAULT_MAX_RESULTS: usize = 10;

/// Tuning for operations that fan out into several upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOptions {
    pub max_concurrency: usize,
    pub latest_table_limit: usize,
    pub default_max_results: usize,
}

impl ControlOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            latest_table_limit: DEFAULT_LATEST_TABLE_LIMIT,
            default_max_results: DEFAULT_MAX_RESULTS,
        }
    }

    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = if max_concurrency == 0 { 1 } else { max_concurrency };
        self
    }

    #[must_use]
    pub const fn with_latest_table_limit(mut self, latest_table_limit: usize) -> Self {
        self.latest_table_limit = latest_table_limit;
        self
    }

    #[must_use]
    pub const fn with_default_max_results(mut self, default_max_results: usize) -> Self {
        self.default_max_results = default_max_results;
        self
    }
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point for every tool operation against one upstream.
pub struct IneControlPlane<U: Upstream> {
    upstream: Arc<U>,
    options: ControlOptions,
}

impl<U: Upstream> Clone for IneControlPlane<U> {
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            options: self.options,
        }
    }
}

impl<U: Upstream> IneControlPlane<U> {
    #[must_use]
    pub fn new(upstream: U) -> Self {
        Self::from_arc(Arc::new(upstream))
    }

    #[must_use]
    pub const fn from_arc(upstream: Arc<U>) -> Self {
        Self {
            upstream,
            options: ControlOptions::new(),
        }
    }

    #[must_use]
    pub const fn with_options(mut self, options: ControlOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &ControlOptions {
        &self.options
    }

    #[must_use]
    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    async fn fetch_payload(&self, request: &UpstreamRequest) -> IneResult<Payload> {
        let path = request.path();
        let response = self.upstream.fetch(request).await?;
        classify(&path, response)
    }

    /// Fetches a collection endpoint. "Not found" is an empty list; a single
    /// record object is treated as a one-element list.
    pub(crate) async fn fetch_list<T: DeserializeOwned>(
        &self,
        request: UpstreamRequest,
    ) -> IneResult<Vec<T>> {
        let path = request.path();
        match self.fetch_payload(&request).await? {
            Payload::NotFound => Ok(Vec::new()),
            Payload::Found(Value::Array(items)) => items
                .into_iter()
                .map(|item| decode_record(&path, item))
                .collect(),
            Payload::Found(item) => Ok(vec![decode_record(&path, item)?]),
        }
    }

    /// Fetches a single-entity endpoint. An array reply yields its first record.
    pub(crate) async fn fetch_one<T: DeserializeOwned>(
        &self,
        request: UpstreamRequest,
    ) -> IneResult<Option<T>> {
        let path = request.path();
        match self.fetch_payload(&request).await? {
            Payload::NotFound => Ok(None),
            Payload::Found(Value::Array(items)) => items
                .into_iter()
                .next()
                .map(|item| decode_record(&path, item))
                .transpose(),
            Payload::Found(item) => decode_record(&path, item).map(Some),
        }
    }
}

fn decode_record<T: DeserializeOwned>(path: &str, item: Value) -> IneResult<T> {
    serde_json::from_value(item).map_err(|err| IneError::decode(path, err))
}
