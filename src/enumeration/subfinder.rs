/// Provider backed by the `subfinder` command line tool
///
/// Runs `subfinder` as a child process in JSON-lines mode with source
/// capture enabled and folds its output into a `ResultSet`. The child is
/// killed when the enumeration context finishes first.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::enumeration::context::EnumerationContext;
use crate::enumeration::provider::{
    ProviderError, ProviderOptions, ResultSet, SourceStats, SubdomainProvider,
};

/// One line of `subfinder -oJ` output.
///
/// With `-cs` the line carries a `sources` array; older releases emit a
/// single `source` per line instead.
#[derive(Debug, Deserialize)]
struct SubfinderLine {
    host: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    sources: Vec<String>,
}

/// Parse one JSON output line into a host and its sources
pub fn parse_output_line(line: &str) -> Result<(String, Vec<String>), serde_json::Error> {
    let parsed: SubfinderLine = serde_json::from_str(line)?;
    let mut sources = parsed.sources;
    sources.extend(parsed.source);
    Ok((parsed.host.trim().to_string(), sources))
}

/// Fold subfinder's stdout into a result set
pub fn parse_output(stdout: &str) -> ResultSet {
    let mut results = ResultSet::new();
    for line in stdout.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match parse_output_line(line) {
            Ok((host, _)) if host.is_empty() => {}
            Ok((host, sources)) => results.entry(host).or_default().extend(sources),
            Err(e) => debug!(line = %line, error = %e, "Skipping unparseable subfinder output"),
        }
    }
    results
}

/// Count how many hosts each source contributed
pub fn source_statistics(results: &ResultSet) -> SourceStats {
    let mut stats = SourceStats::new();
    for source in results.values().flatten() {
        *stats.entry(source.clone()).or_default() += 1;
    }
    stats
}

/// `SubdomainProvider` that shells out to `subfinder`
pub struct SubfinderCliProvider {
    binary: PathBuf,
    provider_config: PathBuf,
    last_stats: Mutex<Option<SourceStats>>,
}

impl SubfinderCliProvider {
    /// Create a provider running `binary` with the given provider-config file
    pub fn new(binary: impl Into<PathBuf>, provider_config: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            provider_config: provider_config.into(),
            last_stats: Mutex::new(None),
        }
    }

    /// Command line arguments for one enumeration pass
    pub fn command_args(&self, domain: &str, options: &ProviderOptions) -> Vec<String> {
        // -max-time is expressed in minutes
        let max_minutes = options.timeout_secs.div_ceil(60).max(1);

        let mut args = vec![
            "-d".to_string(),
            domain.to_string(),
            "-silent".to_string(),
            "-oJ".to_string(),
            "-cs".to_string(),
            "-timeout".to_string(),
            options.timeout_secs.to_string(),
            "-max-time".to_string(),
            max_minutes.to_string(),
            "-pc".to_string(),
            self.provider_config.display().to_string(),
        ];

        let sources = options.sources();
        if sources.is_empty() {
            args.push("-all".to_string());
        } else {
            args.push("-s".to_string());
            args.push(sources.join(","));
        }

        let excluded = options.excluded_sources();
        if !excluded.is_empty() {
            args.push("-es".to_string());
            args.push(excluded.join(","));
        }

        args
    }
}

#[async_trait]
impl SubdomainProvider for SubfinderCliProvider {
    async fn enumerate(
        &self,
        ctx: &EnumerationContext,
        domain: &str,
        options: &ProviderOptions,
    ) -> Result<ResultSet, ProviderError> {
        let args = self.command_args(domain, options);
        info!(
            binary = %self.binary.display(),
            domain = %domain,
            timeout = options.timeout_secs,
            all_sources = options.sources().is_empty(),
            "Launching subfinder"
        );

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProviderError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let output = ctx.run(child.wait_with_output()).await??;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let last_line = stderr
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .last()
                .unwrap_or("no diagnostic output");
            return Err(ProviderError::Failed {
                status: output.status.to_string(),
                stderr: last_line.to_string(),
            });
        }
        if !stderr.trim().is_empty() {
            debug!(output = %stderr.trim(), "Subfinder output");
        }

        let results = parse_output(&String::from_utf8_lossy(&output.stdout));
        if let Ok(mut last) = self.last_stats.lock() {
            *last = Some(source_statistics(&results));
        }

        Ok(results)
    }

    fn statistics(&self) -> Option<SourceStats> {
        self.last_stats.lock().ok().and_then(|stats| stats.clone())
    }
}
