/// Subdomain enumeration: provider interface and orchestration
///
/// This module wraps a pluggable `SubdomainProvider` with retries,
/// depth-limited recursive expansion, deduplication and a fallback list of
/// common subdomain guesses.

pub mod context;
pub mod orchestrator;
pub mod provider;
pub mod subfinder;

pub use context::{ContextError, EnumerationContext};
pub use orchestrator::*;
pub use provider::{
    split_source_list, ProviderError, ProviderOptions, ResultSet, SourceStats, SubdomainProvider,
};
pub use subfinder::SubfinderCliProvider;

use thiserror::Error;

/// Errors returned by the orchestrator
#[derive(Error, Debug)]
pub enum EnumerationError {
    #[error("enumeration stopped: {0}")]
    Cancelled(#[from] ContextError),

    #[error("enumeration error after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: ProviderError,
    },
}

/// Per-call enumeration settings derived from tool arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationConfig {
    /// Time budget in seconds; zero means "use the orchestrator default"
    pub timeout_secs: u64,
    /// Recursion only happens when this is greater than one
    pub max_depth: u32,
    pub sources_filter: Option<String>,
    pub exclude_sources_filter: Option<String>,
    pub recursive: bool,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            max_depth: DEFAULT_MAX_DEPTH,
            sources_filter: None,
            exclude_sources_filter: None,
            recursive: false,
        }
    }
}

impl EnumerationConfig {
    /// Timeout with the orchestrator floor applied
    pub fn effective_timeout_secs(&self) -> u64 {
        if self.timeout_secs == 0 {
            FALLBACK_TIMEOUT_SECS
        } else {
            self.timeout_secs
        }
    }

    /// Provider options for a pass with the given time budget
    pub fn provider_options(&self, timeout_secs: u64) -> ProviderOptions {
        ProviderOptions {
            timeout_secs,
            sources_filter: self.sources_filter.clone(),
            exclude_sources_filter: self.exclude_sources_filter.clone(),
        }
    }
}
