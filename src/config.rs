/// Provider-config file location and preparation

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// File name subfinder reads API keys from
pub const PROVIDER_CONFIG_FILE: &str = "provider-config.yaml";

/// Default provider-config path.
///
/// Uses the working directory, falling back to the platform config
/// directory and finally the temp directory.
pub fn default_provider_config_path() -> PathBuf {
    let base = std::env::current_dir()
        .ok()
        .or_else(|| dirs::config_dir().map(|dir| dir.join("subfinder")))
        .unwrap_or_else(std::env::temp_dir);
    base.join(PROVIDER_CONFIG_FILE)
}

/// Make sure the provider-config file exists.
///
/// A missing file is created empty so subfinder runs with keyless
/// sources only. Existing files are left untouched.
pub fn ensure_provider_config(path: &Path) -> io::Result<()> {
    if path.exists() {
        debug!(path = %path.display(), "Using existing provider config");
        return Ok(());
    }

    warn!(
        path = %path.display(),
        "Provider config not found, creating an empty one; sources needing API keys will be skipped"
    );
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, "")
}
