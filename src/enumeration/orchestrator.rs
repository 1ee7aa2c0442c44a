/// Enumeration orchestrator
///
/// Drives a `SubdomainProvider` through bounded retries, an optional
/// single-level recursive pass over the discovered subdomains, and a
/// fallback list of common subdomain guesses when nothing was found.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::enumeration::context::{ContextError, EnumerationContext};
use crate::enumeration::provider::{
    ProviderError, ProviderOptions, ResultSet, SourceStats, SubdomainProvider,
};
use crate::enumeration::{EnumerationConfig, EnumerationError};

/// Timeout applied when a tool call does not pass one
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 60;
/// Depth applied when a tool call does not pass one
pub const DEFAULT_MAX_DEPTH: u32 = 1;
/// Timeout used by the orchestrator when the configured one is zero
pub const FALLBACK_TIMEOUT_SECS: u64 = 120;
/// Provider attempts for the primary pass
pub const MAX_ATTEMPTS: u32 = 3;
/// Pause between failed or empty attempts
pub const RETRY_DELAY: Duration = Duration::from_secs(2);
/// Number of first-pass subdomains that get re-queried during recursion
pub const RECURSIVE_FRONTIER_LIMIT: usize = 10;
/// Lower bound for the per-probe timeout during recursion
pub const MIN_RECURSIVE_TIMEOUT_SECS: u64 = 30;
/// Prefixes suggested when passive enumeration finds nothing
pub const COMMON_SUBDOMAIN_PREFIXES: [&str; 10] = [
    "www", "mail", "api", "dev", "blog", "shop", "app", "support", "help", "portal",
];

/// Enumerate subdomains of `domain`, returning a sorted, deduplicated list.
///
/// The queried domain itself is never part of the result. When every pass
/// comes back empty the result is a list of common subdomain guesses built
/// from [`COMMON_SUBDOMAIN_PREFIXES`]; those entries are suggestions that
/// were not observed by any source, and the returned list does not mark
/// them differently from verified discoveries.
pub async fn enumerate_subdomains<P>(
    provider: &P,
    domain: &str,
    config: &EnumerationConfig,
    ctx: &EnumerationContext,
) -> Result<Vec<String>, EnumerationError>
where
    P: SubdomainProvider + ?Sized,
{
    let timeout_secs = config.effective_timeout_secs();

    let derived;
    let ctx = match ctx.deadline() {
        Some(_) => ctx,
        None => {
            derived = ctx.child_with_timeout(Duration::from_secs(timeout_secs));
            &derived
        }
    };

    let options = config.provider_options(timeout_secs);
    let results = run_with_retries(provider, domain, &options, config.recursive, ctx).await?;
    // Taken before recursion, whose probes overwrite the provider's statistics
    let primary_stats = provider.statistics();

    let mut subdomains = collect_subdomains(&results, domain);
    for subdomain in &subdomains {
        if let Some(sources) = results.get(subdomain) {
            let names: Vec<&str> = sources.iter().map(String::as_str).collect();
            debug!(subdomain = %subdomain, sources = %names.join(","), "Subdomain sources");
        }
    }

    if config.recursive && !subdomains.is_empty() && config.max_depth > 1 {
        subdomains = expand_recursively(provider, domain, subdomains, config, timeout_secs, ctx).await;
    }

    if subdomains.is_empty() {
        warn!(domain = %domain, "No subdomains found via passive enumeration");
        info!(
            prefixes = %COMMON_SUBDOMAIN_PREFIXES.join(", "),
            "Suggesting common subdomains to check"
        );
        subdomains = suggest_common_subdomains(domain);
    }

    info!(domain = %domain, subdomains_found = subdomains.len(), "Enumeration complete");
    if let Some(stats) = &primary_stats {
        log_statistics(stats);
    }

    Ok(subdomains)
}

/// `<prefix>.<domain>` for every entry of [`COMMON_SUBDOMAIN_PREFIXES`]
pub fn suggest_common_subdomains(domain: &str) -> Vec<String> {
    COMMON_SUBDOMAIN_PREFIXES
        .iter()
        .map(|prefix| format!("{prefix}.{domain}"))
        .collect()
}

/// Sorted subdomains from `results`, minus `domain`, unique ignoring case
pub fn collect_subdomains(results: &ResultSet, domain: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    results
        .keys()
        .filter(|subdomain| !subdomain.eq_ignore_ascii_case(domain))
        .filter(|subdomain| seen.insert(subdomain.to_ascii_lowercase()))
        .cloned()
        .collect()
}

async fn run_with_retries<P>(
    provider: &P,
    domain: &str,
    options: &ProviderOptions,
    recursive: bool,
    ctx: &EnumerationContext,
) -> Result<ResultSet, EnumerationError>
where
    P: SubdomainProvider + ?Sized,
{
    let mut results = ResultSet::new();
    let mut last_error: Option<ProviderError> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        if let Some(ctx_err) = ctx.err() {
            warn!(attempt, "Context cancelled, stopping retries");
            return Err(interrupted(last_error, ctx_err));
        }

        info!(domain = %domain, attempt, recursive, "Starting subdomain enumeration");
        let started = Instant::now();

        let outcome = match ctx.run(provider.enumerate(ctx, domain, options)).await {
            Ok(outcome) => outcome,
            Err(ctx_err) => Err(ProviderError::from(ctx_err)),
        };

        let results_count = outcome.as_ref().map_or(0, |found| found.len());
        info!(
            domain = %domain,
            attempt,
            duration_ms = started.elapsed().as_millis() as u64,
            results_count,
            "Enumeration attempt completed"
        );

        match outcome {
            Ok(found) if !found.is_empty() => return Ok(found),
            Ok(found) => {
                results = found;
                last_error = None;
            }
            Err(err) => last_error = Some(err),
        }

        if let Some(ctx_err) = ctx.err() {
            warn!(attempt, "Context cancelled, stopping retries");
            return Err(interrupted(last_error, ctx_err));
        }

        if attempt < MAX_ATTEMPTS {
            match &last_error {
                Some(err) => warn!(attempt, error = %err, "Retry attempt failed, trying again"),
                None => warn!(attempt, results_count, "Retry attempt found nothing, trying again"),
            }
            if let Err(ctx_err) = ctx.sleep(RETRY_DELAY).await {
                warn!(attempt, "Context cancelled, stopping retries");
                return Err(interrupted(last_error, ctx_err));
            }
        }
    }

    match last_error {
        Some(source) => Err(EnumerationError::Exhausted {
            attempts: MAX_ATTEMPTS,
            source,
        }),
        None => Ok(results),
    }
}

/// Error for a retry loop stopped by its context.
///
/// A real provider failure is kept and reported against the full attempt
/// budget; otherwise the context's own error wins.
fn interrupted(last_error: Option<ProviderError>, ctx_err: ContextError) -> EnumerationError {
    match last_error {
        None | Some(ProviderError::Context(_)) => EnumerationError::Cancelled(ctx_err),
        Some(source) => EnumerationError::Exhausted {
            attempts: MAX_ATTEMPTS,
            source,
        },
    }
}

async fn expand_recursively<P>(
    provider: &P,
    domain: &str,
    subdomains: Vec<String>,
    config: &EnumerationConfig,
    timeout_secs: u64,
    parent: &EnumerationContext,
) -> Vec<String>
where
    P: SubdomainProvider + ?Sized,
{
    info!(found_subdomains = subdomains.len(), "Starting recursive enumeration");

    if subdomains.len() > RECURSIVE_FRONTIER_LIMIT {
        info!(
            total = subdomains.len(),
            processing = RECURSIVE_FRONTIER_LIMIT,
            "Limiting recursive processing"
        );
    }

    let probe_timeout = Duration::from_secs((timeout_secs / 2).max(MIN_RECURSIVE_TIMEOUT_SECS));
    let options = config.provider_options(probe_timeout.as_secs());

    let mut seen: HashSet<String> = subdomains.iter().map(|s| s.to_ascii_lowercase()).collect();
    let mut all: BTreeSet<String> = subdomains.iter().cloned().collect();
    let mut failed_probes = 0usize;

    for subdomain in subdomains.iter().take(RECURSIVE_FRONTIER_LIMIT) {
        if parent.token().is_cancelled() {
            warn!("Context cancelled, stopping recursive enumeration");
            break;
        }

        info!(subdomain = %subdomain, "Recursively checking");

        // Each probe gets its own full budget, independent of the parent's deadline.
        let probe_ctx = parent.child_with_timeout(probe_timeout);
        let outcome = match probe_ctx.run(provider.enumerate(&probe_ctx, subdomain, &options)).await {
            Ok(outcome) => outcome,
            Err(ctx_err) => Err(ProviderError::from(ctx_err)),
        };

        let found = match outcome {
            Ok(found) => found,
            Err(err) => {
                warn!(subdomain = %subdomain, error = %err, "Error in recursive enumeration");
                failed_probes += 1;
                continue;
            }
        };

        for candidate in found.into_keys() {
            if candidate.eq_ignore_ascii_case(subdomain) || candidate.eq_ignore_ascii_case(domain) {
                continue;
            }
            if seen.insert(candidate.to_ascii_lowercase()) {
                info!(subdomain = %candidate, "Found recursive subdomain");
                all.insert(candidate);
            }
        }
    }

    info!(total = all.len(), failed_probes, "Recursive enumeration finished");
    all.into_iter().collect()
}

fn log_statistics(stats: &SourceStats) {
    info!(total_sources = stats.len(), "Enumeration statistics");

    let successful: Vec<String> = stats
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(source, count)| format!("{source}:{count}"))
        .collect();
    if !successful.is_empty() {
        info!(sources = %successful.join(", "), "Successful sources");
    }
}
