//! Implementation of `berth list`.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::MultiPackagesList;
use crate::select::{ListApi, PatternDefaults, QueryConflict, SelectError};
use crate::sources::{IndexRemote, MetadataStore, RemoteIndex};
use crate::util::context::{BerthContext, RemoteEntry, LOCAL_CACHE};
use crate::util::shell::{Shell, Status};

/// Options for listing references.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Selection pattern
    pub pattern: String,

    /// Configuration query for packages
    pub package_query: Option<String>,

    /// Remote names or globs to list from
    pub remotes: Vec<String>,

    /// Also list the local cache when remotes are given
    pub cache: bool,

    /// Only references not used within this duration
    pub lru: Option<Duration>,
}

/// Resolve remote names (globs allowed) against the configured remotes.
pub fn matching_remotes<'a>(ctx: &'a BerthContext, names: &[String]) -> Result<Vec<&'a RemoteEntry>> {
    let mut selected: Vec<&RemoteEntry> = Vec::new();
    for name in names {
        if !name.contains('*') {
            let remote = ctx.remotes().get(name)?;
            if !selected.iter().any(|r| r.name == remote.name) {
                selected.push(remote);
            }
            continue;
        }
        for remote in ctx.remotes().enabled() {
            if crate::select::pattern::glob_match(name, &remote.name, true)
                && !selected.iter().any(|r| r.name == remote.name)
            {
                selected.push(remote);
            }
        }
    }
    Ok(selected)
}

/// List references matching a pattern in the local cache and remotes.
///
/// A failure on the local cache aborts. A failure on a remote (unreachable,
/// bad index, or a selection error) is recorded under the remote's name.
pub fn list(ctx: &BerthContext, opts: &ListOptions, shell: &Shell) -> Result<MultiPackagesList> {
    let pattern = super::selection_pattern(&opts.pattern, PatternDefaults::default())
        .map_err(SelectError::from)?;
    let remotes = matching_remotes(ctx, &opts.remotes)?;

    if opts.lru.is_some() && !remotes.is_empty() {
        return Err(SelectError::InvalidQueryCombination(QueryConflict::LruWithRemote).into());
    }

    let store = MetadataStore::load(&ctx.metadata_path())
        .with_context(|| format!("failed to read {}", ctx.metadata_path().display()))?;
    let api = ListApi::new(&store);
    let mut results = MultiPackagesList::new();

    if opts.cache || remotes.is_empty() {
        debug!(pattern = pattern.raw(), "listing local cache");
        let selected = api.select(&pattern, opts.package_query.as_deref(), None, opts.lru)?;
        results.add(LOCAL_CACHE, selected);
    }

    for entry in remotes {
        let spinner = shell.spinner(
            Status::Querying,
            format!("remote '{}' for '{}'", entry.name, pattern.raw()),
        );
        let outcome = IndexRemote::open(entry, ctx.home()).and_then(|remote| {
            api.select(
                &pattern,
                opts.package_query.as_deref(),
                Some(&remote as &dyn RemoteIndex),
                None,
            )
            .map_err(anyhow::Error::from)
        });
        spinner.finish();

        match outcome {
            Ok(selected) => results.add(entry.name.clone(), selected),
            Err(err) => {
                warn!(remote = %entry.name, "listing failed: {:#}", err);
                results.add_error(entry.name.clone(), format!("{:#}", err));
            }
        }
    }

    info!(pattern = pattern.raw(), "listed references");
    Ok(results)
}
