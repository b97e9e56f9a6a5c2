//! `berth cache` command

use anyhow::Result;

use crate::cli::{CacheArgs, CacheCleanArgs, CacheCommands};
use berth::ops::{cache_clean, cache_path, CleanOptions};
use berth::util::shell::{Shell, Status};
use berth::util::BerthContext;

pub fn execute(args: CacheArgs, shell: &Shell) -> Result<()> {
    let ctx = BerthContext::new()?;
    match args.command {
        CacheCommands::Path(path_args) => {
            let path = cache_path(&ctx, &path_args.reference, path_args.folder.map(Into::into))?;
            shell.print_line(path.display());
            Ok(())
        }
        CacheCommands::Clean(clean_args) => clean(&ctx, clean_args, shell),
    }
}

fn clean(ctx: &BerthContext, args: CacheCleanArgs, shell: &Shell) -> Result<()> {
    let opts = CleanOptions {
        pattern: args.pattern,
        package_query: args.package_query,
        source: args.source,
        build: args.build,
        download: args.download,
        only_recipe: args.only_recipe,
    };

    let removed = cache_clean(ctx, &opts)?;
    for folder in &removed {
        shell.status(Status::Removed, folder.display());
    }
    if removed.is_empty() {
        shell.note("nothing to clean");
    } else {
        shell.note(format!("cleaned {} folder(s)", removed.len()));
    }
    Ok(())
}
