//! Subcommand implementations and the bits they share.

pub mod cache;
pub mod diff;
pub mod init;
pub mod pull;
pub mod push;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use stitch_core::{project, ProjectConfig};
use stitch_sync::{LogScope, RunStatus};

use crate::http::HttpRemote;

/// Global options resolved once in `main`.
#[derive(Debug)]
pub struct Context {
    start: Option<PathBuf>,
    pub scope: LogScope,
}

impl Context {
    pub fn new(start: Option<PathBuf>) -> Self {
        Self {
            start,
            scope: LogScope::default(),
        }
    }

    /// Where project discovery starts: `-C <dir>` or the current directory.
    pub fn start_dir(&self) -> Result<PathBuf> {
        match &self.start {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("could not determine current directory"),
        }
    }

    /// Root of the enclosing stitch project.
    pub fn root(&self) -> Result<PathBuf> {
        let start = self.start_dir()?;
        let start = start
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", start.display()))?;
        Ok(project::find_root(&start)?)
    }

    pub fn config(&self, root: &Path) -> Result<ProjectConfig> {
        let config = project::load_config_at(root)
            .with_context(|| format!("failed to load project config in '{}'", root.display()))?;
        Ok(config.with_env_overrides())
    }

    /// HTTP remote built from the project config.
    pub fn remote(&self, root: &Path) -> Result<HttpRemote> {
        let config = self.config(root)?;
        if config.token().is_none() {
            warn_missing_token(&config);
        }
        Ok(HttpRemote::new(&config))
    }
}

fn warn_missing_token(config: &ProjectConfig) {
    eprintln!(
        "warning: ${} is not set; requests will be sent without a token",
        config.token_env
    );
}

/// Turn a run status into the process outcome.
pub fn finish(status: RunStatus, what: &str) -> Result<()> {
    if status.is_failure() {
        anyhow::bail!("{what} finished with errors");
    }
    Ok(())
}
