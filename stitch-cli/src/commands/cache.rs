//! `stitch cache clear`

use anyhow::Result;
use clap::Subcommand;

use stitch_sync::HashCache;

use super::Context;

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Forget every stored hash; every file will show up as new.
    Clear,
}

pub fn run(command: CacheCommand, ctx: &Context) -> Result<()> {
    match command {
        CacheCommand::Clear => {
            let root = ctx.root()?;
            let mut cache = HashCache::open(&root, &ctx.scope);
            let forgotten = cache.len();
            if !cache.clear() {
                anyhow::bail!("could not write '{}'", cache.path().display());
            }
            println!("✓ Cleared {forgotten} cached hash(es)");
            Ok(())
        }
    }
}
