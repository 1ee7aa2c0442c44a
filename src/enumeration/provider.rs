/// Enumeration provider interface
///
/// The orchestrator only ever talks to a `SubdomainProvider`. The actual
/// discovery work (querying passive data sources) lives behind this trait,
/// which keeps retry, recursion and fallback logic testable in-process.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use thiserror::Error;

use crate::enumeration::context::{ContextError, EnumerationContext};

/// Discovered subdomain mapped to the names of the sources that reported it
pub type ResultSet = BTreeMap<String, BTreeSet<String>>;

/// Per-source result counts, used only for diagnostics
pub type SourceStats = BTreeMap<String, usize>;

/// Options handed to the provider for one enumeration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderOptions {
    /// Time budget for the pass, in seconds
    pub timeout_secs: u64,
    /// Sources to use; `None` means all sources
    pub sources_filter: Option<String>,
    /// Sources to skip
    pub exclude_sources_filter: Option<String>,
}

impl ProviderOptions {
    /// Parsed form of `sources_filter`
    pub fn sources(&self) -> Vec<String> {
        self.sources_filter.as_deref().map(split_source_list).unwrap_or_default()
    }

    /// Parsed form of `exclude_sources_filter`
    pub fn excluded_sources(&self) -> Vec<String> {
        self.exclude_sources_filter
            .as_deref()
            .map(split_source_list)
            .unwrap_or_default()
    }
}

/// Split a comma-separated source list, trimming blanks
pub fn split_source_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|source| !source.is_empty())
        .map(str::to_string)
        .collect()
}

/// Errors that can occur while a provider runs
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to launch {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read provider output: {0}")]
    Io(#[from] std::io::Error),

    #[error("provider exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("{0}")]
    Other(String),
}

/// A source of passive subdomain discoveries
///
/// Implementations may be shared across the passes of one orchestration
/// call. The orchestrator never calls a provider concurrently from a single
/// request, but separate requests may.
#[async_trait]
pub trait SubdomainProvider: Send + Sync {
    /// Enumerate subdomains of `domain` within the given context
    async fn enumerate(
        &self,
        ctx: &EnumerationContext,
        domain: &str,
        options: &ProviderOptions,
    ) -> Result<ResultSet, ProviderError>;

    /// Per-source statistics from the most recent call, if tracked
    fn statistics(&self) -> Option<SourceStats> {
        None
    }
}
