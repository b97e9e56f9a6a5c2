//! Implementation of `berth cache clean`.
//!
//! Deletes temporary folders (sources, builds, downloads) of the selected
//! recipe and package revisions. The metadata store is not modified.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::core::PackagesList;
use crate::ops::cache_path::{package_layout, recipe_layout};
use crate::select::{ListApi, PatternDefaults, QueryConflict, SelectError};
use crate::sources::MetadataStore;
use crate::util::context::BerthContext;

/// Options for cleaning the cache.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub pattern: String,
    pub package_query: Option<String>,
    /// Recipe source folders
    pub source: bool,
    /// Package build folders
    pub build: bool,
    /// Recipe and package download folders
    pub download: bool,
    /// Leave package folders alone
    pub only_recipe: bool,
}

/// Clean the cache folders of everything matching the pattern. Returns the
/// folders that were deleted.
pub fn cache_clean(ctx: &BerthContext, opts: &CleanOptions) -> Result<Vec<PathBuf>> {
    if !opts.source && !opts.build && !opts.download {
        bail!("define at least one of --source, --build, --download");
    }

    let defaults = PatternDefaults::all_revisions()
        .with_package_id("*")
        .with_only_recipe(opts.only_recipe);
    let pattern = super::selection_pattern(&opts.pattern, defaults).map_err(SelectError::from)?;
    if pattern.only_recipe() && opts.package_query.is_some() {
        return Err(
            SelectError::InvalidQueryCombination(QueryConflict::PackageQueryWithoutPackages).into(),
        );
    }

    let store = MetadataStore::load(&ctx.metadata_path())?;
    let selected = ListApi::new(&store).select(&pattern, opts.package_query.as_deref(), None, None)?;
    debug!(pattern = pattern.raw(), "cleaning cache folders");

    let mut removed = Vec::new();
    for folder in folders(ctx, &selected, opts) {
        if remove_folder(&folder)? {
            removed.push(folder);
        }
    }
    Ok(removed)
}

fn folders(ctx: &BerthContext, list: &PackagesList, opts: &CleanOptions) -> Vec<PathBuf> {
    let mut folders = Vec::new();
    for (rrev, bundle) in list.refs() {
        let layout = recipe_layout(ctx, &rrev);
        if opts.source {
            folders.push(layout.join("s"));
        }
        if opts.download {
            folders.push(layout.join("d"));
        }
        for (pref, _) in PackagesList::prefs(&rrev, bundle) {
            let layout = package_layout(ctx, &pref);
            if opts.build {
                folders.push(layout.join("b"));
            }
            if opts.download {
                folders.push(layout.join("d"));
            }
        }
    }
    folders
}

fn remove_folder(folder: &Path) -> Result<bool> {
    if !folder.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(folder)
        .with_context(|| format!("failed to remove {}", folder.display()))?;
    debug!(folder = %folder.display(), "removed");
    Ok(true)
}
