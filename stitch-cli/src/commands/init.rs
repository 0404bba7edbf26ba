//! `stitch init [PATH] --name <name> --base-url <url>`

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use stitch_core::project;
use stitch_sync::HashCache;

use super::Context;

/// Initialize a stitch project.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project root (default: the `-C` directory or the current directory).
    pub path: Option<PathBuf>,

    /// Project name. Defaults to the directory name.
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Root URL of the platform's customization API.
    #[arg(long, value_name = "URL")]
    pub base_url: String,
}

impl InitArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let path = match self.path {
            Some(path) => path,
            None => ctx.start_dir()?,
        };
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create '{}'", path.display()))?;
        let root = path
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", path.display()))?;

        let name = match self.name {
            Some(name) => name,
            None => root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("cannot derive a project name from the path; pass --name")?,
        };

        let existed = project::config_path(&root).exists();
        let config = project::init_at(&root, &name, &self.base_url)
            .with_context(|| format!("failed to init '{}'", root.display()))?;

        let cache = HashCache::open(&root, &ctx.scope);
        if !cache.path().exists() && !cache.save() {
            anyhow::bail!("could not create hash cache at '{}'", cache.path().display());
        }

        if existed {
            println!("✓ '{}' is already a stitch project", config.name);
        } else {
            println!("✓ Initialized '{}' at {}", config.name, root.display());
        }
        println!("  Config: {}", project::config_path(&root).display());
        println!("  Remote: {}", config.base_url);
        Ok(())
    }
}
