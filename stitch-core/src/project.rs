//! Per-project config and on-disk state locations.
//!
//! # Storage layout
//!
//! ```text
//! <project root>/
//!   .stitch/                 (mode 0700, created on init)
//!     config.yaml            (ProjectConfig, mode 0600)
//!     file-hashes.json       (hash cache, owned by stitch-sync)
//!   src/
//!     objects/ backend/ reports/ pages/
//! ```
//!
//! # API pattern
//!
//! Functions take the project root explicitly (`*_at(root, …)`); the CLI resolves
//! the root once via [`find_root`] and passes it down. Tests always use a
//! `TempDir` root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

/// Hidden per-project state directory.
pub const STITCH_DIR: &str = ".stitch";
pub const CONFIG_FILE: &str = "config.yaml";
pub const HASH_CACHE_FILE: &str = "file-hashes.json";

/// Env var that overrides `base_url` from the config file.
pub const BASE_URL_ENV: &str = "STITCH_BASE_URL";
/// Default name of the env var holding the API token.
pub const DEFAULT_TOKEN_ENV: &str = "STITCH_TOKEN";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// `.stitch/config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Root of the remote customization API.
    pub base_url: String,
    /// Name of the env var the API token is read from.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            token_env: default_token_env(),
        }
    }

    /// Apply `STITCH_BASE_URL` if set.
    pub fn with_env_overrides(self) -> Self {
        let base_url = std::env::var(BASE_URL_ENV).ok();
        self.with_base_url_override(base_url)
    }

    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        self
    }

    /// API token from the configured env var, if present and non-empty.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<root>/.stitch`. Pure, no I/O.
pub fn stitch_dir(root: &Path) -> PathBuf {
    root.join(STITCH_DIR)
}

/// `<root>/.stitch/config.yaml`
pub fn config_path(root: &Path) -> PathBuf {
    stitch_dir(root).join(CONFIG_FILE)
}

/// `<root>/.stitch/file-hashes.json`
pub fn hash_cache_path(root: &Path) -> PathBuf {
    stitch_dir(root).join(HASH_CACHE_FILE)
}

/// Create `<root>/.stitch` (mode `0700`) if it does not yet exist.
pub fn ensure_stitch_dir(root: &Path) -> Result<PathBuf, CoreError> {
    let dir = stitch_dir(root);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

/// Walk from `start` upward until a directory containing `.stitch/config.yaml`
/// is found.
pub fn find_root(start: &Path) -> Result<PathBuf, CoreError> {
    start
        .ancestors()
        .find(|dir| config_path(dir).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| CoreError::ProjectNotFound {
            start: start.to_path_buf(),
        })
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load `<root>/.stitch/config.yaml`.
///
/// Returns `CoreError::ProjectNotFound` if absent,
/// `CoreError::Parse` (with path + line context) if malformed YAML.
pub fn load_config_at(root: &Path) -> Result<ProjectConfig, CoreError> {
    let path = config_path(root);
    if !path.exists() {
        return Err(CoreError::ProjectNotFound {
            start: root.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse { path, source: e })
}

/// Atomically save the project config.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_config_at(root: &Path, config: &ProjectConfig) -> Result<(), CoreError> {
    ensure_stitch_dir(root)?;
    let path = config_path(root);
    let tmp_path = path.with_file_name(format!("{CONFIG_FILE}.tmp"));

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Initialize a project at `root`.
///
/// Idempotent: if a config already exists it is loaded and returned unchanged.
pub fn init_at(root: &Path, name: &str, base_url: &str) -> Result<ProjectConfig, CoreError> {
    if config_path(root).exists() {
        return load_config_at(root);
    }
    let config = ProjectConfig::new(name, base_url);
    save_config_at(root, &config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
