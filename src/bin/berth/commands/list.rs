//! `berth list` command

use anyhow::Result;

use crate::cli::ListArgs;
use crate::commands::print_results;
use berth::ops::{list, ListOptions};
use berth::util::shell::Shell;
use berth::util::BerthContext;

pub fn execute(args: ListArgs, shell: &Shell) -> Result<()> {
    let ctx = BerthContext::new()?;

    let opts = ListOptions {
        pattern: args.pattern,
        package_query: args.package_query,
        remotes: args.remote,
        cache: args.cache,
        lru: args.lru,
    };

    let results = list(&ctx, &opts, shell)?;
    print_results(shell, &results);

    Ok(())
}
