//! Implementation of `berth pkglist merge`.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::MultiPackagesList;

/// Merge package list files, in order, into one list.
pub fn merge_lists(paths: &[PathBuf]) -> Result<MultiPackagesList> {
    if paths.is_empty() {
        bail!("no package list files to merge");
    }

    let mut merged = MultiPackagesList::new();
    for path in paths {
        let list = MultiPackagesList::load(path)?;
        tracing::debug!(path = %path.display(), "merging package list");
        merged.merge(list);
    }
    Ok(merged)
}
