//! Result bundles.
//!
//! A [`PackagesList`] is what a selection produces and what `remove` and
//! `pkglist` consume. It nests recipe → revision → package id → package
//! revision, in the order entries were added:
//!
//! ```json
//! {
//!   "zlib/1.2.13": {
//!     "revisions": {
//!       "r1": {
//!         "timestamp": 10,
//!         "packages": {
//!           "abc": { "revisions": { "p1": { "timestamp": 11 } }, "info": { ... } }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! [`MultiPackagesList`] groups lists by source (`"Local Cache"` or a remote
//! name) and is the on-disk package list format.

use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::query::{PackageConfiguration, PackageConfigurations};
use crate::core::{PkgReference, RecipeReference};

/// Everything selected for one recipe reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeBundle {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub revisions: IndexMap<String, RevisionBundle>,
}

/// One recipe revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// `None` when the selection stopped at recipe scope; `Some` (possibly
    /// empty) once packages were looked at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<IndexMap<String, PackageBundle>>,
}

/// One package id of a recipe revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageBundle {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub revisions: IndexMap<String, PackageRevisionBundle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<PackageConfiguration>,
}

/// One package revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRevisionBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Single-source result bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackagesList {
    recipes: IndexMap<RecipeReference, RecipeBundle>,
}

impl PackagesList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes keyed by reference without revision.
    pub fn recipes(&self) -> &IndexMap<RecipeReference, RecipeBundle> {
        &self.recipes
    }

    fn revision_entry(&mut self, rrev: &RecipeReference) -> &mut RevisionBundle {
        let revision = rrev
            .revision()
            .unwrap_or_else(|| panic!("reference `{}` has no revision", rrev));
        self.recipes
            .entry(rrev.without_revision())
            .or_default()
            .revisions
            .entry(revision.to_string())
            .or_default()
    }

    /// Add recipe references. References with a revision also add that
    /// revision; adding an existing entry is a no-op apart from filling in a
    /// missing timestamp.
    pub fn add_refs<'a>(&mut self, refs: impl IntoIterator<Item = &'a RecipeReference>) {
        for r in refs {
            if r.revision().is_none() {
                self.recipes.entry(r.without_revision()).or_default();
                continue;
            }
            let entry = self.revision_entry(r);
            if r.timestamp().is_some() {
                entry.timestamp = r.timestamp();
            }
        }
    }

    /// Add package references under a recipe revision.
    ///
    /// Marks the revision as package-scoped even when `prefs` is empty.
    pub fn add_prefs<'a>(
        &mut self,
        rrev: &RecipeReference,
        prefs: impl IntoIterator<Item = &'a PkgReference>,
    ) {
        let packages = self
            .revision_entry(rrev)
            .packages
            .get_or_insert_with(IndexMap::new);

        for pref in prefs {
            let package = packages.entry(pref.package_id().to_string()).or_default();
            if let Some(prev) = pref.revision() {
                let entry = package.revisions.entry(prev.to_string()).or_default();
                if pref.timestamp().is_some() {
                    entry.timestamp = pref.timestamp();
                }
            }
        }
    }

    /// Attach configurations to packages already in the list. Packages not
    /// in the list are ignored.
    pub fn add_configurations(&mut self, configurations: &PackageConfigurations) {
        for (pref, config) in configurations {
            let Some(revision) = pref.reference().revision() else {
                continue;
            };
            let package = self
                .recipes
                .get_mut(&pref.reference().without_revision())
                .and_then(|recipe| recipe.revisions.get_mut(&revision.to_string()))
                .and_then(|rev| rev.packages.as_mut())
                .and_then(|packages| packages.get_mut(&pref.package_id().to_string()));
            if let Some(package) = package {
                package.info = Some(config.clone());
            }
        }
    }

    /// Recipe revisions in insertion order, each with its bundle.
    pub fn refs(&self) -> Vec<(RecipeReference, &RevisionBundle)> {
        let mut result = Vec::new();
        for (reference, recipe) in self.recipes.iter() {
            for (revision, bundle) in recipe.revisions.iter() {
                let rrev = reference
                    .with_revision(Some(revision.as_str()))
                    .with_timestamp(bundle.timestamp);
                result.push((rrev, bundle));
            }
        }
        result
    }

    /// Package revisions of one recipe revision, in insertion order.
    ///
    /// Package ids listed without revisions are skipped.
    pub fn prefs<'a>(
        rrev: &RecipeReference,
        bundle: &'a RevisionBundle,
    ) -> Vec<(PkgReference, &'a PackageRevisionBundle)> {
        let mut result = Vec::new();
        let Some(packages) = &bundle.packages else {
            return result;
        };
        for (package_id, package) in packages.iter() {
            for (prev, prev_bundle) in package.revisions.iter() {
                let pref = PkgReference::new(rrev.clone(), package_id.as_str())
                    .with_revision(Some(prev.as_str()))
                    .with_timestamp(prev_bundle.timestamp);
                result.push((pref, prev_bundle));
            }
        }
        result
    }

    /// Union with another list. Existing entries keep their position and
    /// values; entries only in `other` are appended.
    pub fn merge(&mut self, other: PackagesList) {
        for (reference, recipe) in other.recipes {
            let mine = self.recipes.entry(reference).or_default();
            for (revision, bundle) in recipe.revisions {
                let target = mine.revisions.entry(revision).or_default();
                merge_revision(target, bundle);
            }
        }
    }
}

fn merge_revision(target: &mut RevisionBundle, other: RevisionBundle) {
    if target.timestamp.is_none() {
        target.timestamp = other.timestamp;
    }
    let Some(other_packages) = other.packages else {
        return;
    };
    let packages = target.packages.get_or_insert_with(IndexMap::new);
    for (package_id, package) in other_packages {
        let mine = packages.entry(package_id).or_default();
        if mine.info.is_none() {
            mine.info = package.info;
        }
        for (prev, prev_bundle) in package.revisions {
            let entry = mine.revisions.entry(prev).or_default();
            if entry.timestamp.is_none() {
                entry.timestamp = prev_bundle.timestamp;
            }
        }
    }
}

/// A per-source entry of a [`MultiPackagesList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    /// The selection failed for this source.
    Error { error: String },
    Packages(PackagesList),
}

/// Result bundles grouped by source label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiPackagesList {
    lists: IndexMap<String, SourceEntry>,
}

impl MultiPackagesList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Set the list for a source, replacing a previous one.
    pub fn add(&mut self, source: impl Into<String>, list: PackagesList) {
        self.lists.insert(source.into(), SourceEntry::Packages(list));
    }

    /// Record that selecting from a source failed.
    pub fn add_error(&mut self, source: impl Into<String>, error: impl Into<String>) {
        self.lists.insert(
            source.into(),
            SourceEntry::Error {
                error: error.into(),
            },
        );
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &SourceEntry)> {
        self.lists.iter()
    }

    /// The list for a source; a missing source or a recorded error is an
    /// error.
    pub fn get(&self, source: &str) -> Result<&PackagesList> {
        match self.lists.get(source) {
            Some(SourceEntry::Packages(list)) => Ok(list),
            Some(SourceEntry::Error { error }) => {
                bail!("'{}' has an error in the package list: {}", source, error)
            }
            None => bail!("'{}' doesn't exist in package list", source),
        }
    }

    /// The list for a source, or an empty one with a warning.
    pub fn get_or_empty(&self, source: &str) -> PackagesList {
        match self.get(source) {
            Ok(list) => list.clone(),
            Err(e) => {
                tracing::warn!("{:#}; nothing selected", e);
                PackagesList::new()
            }
        }
    }

    /// Merge another multi-list, source by source. A recorded error is
    /// replaced by real results from `other`.
    pub fn merge(&mut self, other: MultiPackagesList) {
        for (source, entry) in other.lists {
            match (self.lists.get_mut(&source), entry) {
                (Some(SourceEntry::Packages(mine)), SourceEntry::Packages(theirs)) => {
                    mine.merge(theirs)
                }
                (Some(slot @ SourceEntry::Error { .. }), entry @ SourceEntry::Packages(_)) => {
                    *slot = entry
                }
                (Some(_), SourceEntry::Error { .. }) => {}
                (None, entry) => {
                    self.lists.insert(source, entry);
                }
            }
        }
    }

    /// JSON document in the package list file format.
    pub fn serialize(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Parse a package list document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context(
            "expected an object mapping each source to a package list or to {\"error\": ...}",
        )
    }

    /// Load a package list file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read package list: {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("failed to parse package list: {}", path.display()))
    }

    /// Write a package list file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write package list: {}", path.display()))
    }
}
