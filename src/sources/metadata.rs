//! Local cache metadata store.
//!
//! One JSON document records every recipe revision and package revision in
//! the cache, with its last-used time and, for packages, the binary
//! configuration:
//!
//! ```json
//! {
//!   "recipes":  [{ "reference": "zlib/1.2.13#r1%10", "lru": 100 }],
//!   "packages": [{ "reference": "zlib/1.2.13#r1:abc#p1%11", "lru": 100,
//!                  "info": { "settings": { "os": "Linux" } } }]
//! }
//! ```
//!
//! Lookups return newest-first, as the selection engine expects.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::query::{PackageConfiguration, PackageConfigurations};
use crate::core::{PkgReference, RecipeReference};
use crate::select::pattern::glob_match;

/// A recipe revision in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Full reference, with revision and timestamp
    pub reference: RecipeReference,

    /// Last time the revision was used (epoch seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lru: Option<i64>,
}

/// A package revision in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Full reference, with recipe revision, package revision and timestamp
    pub reference: PkgReference,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lru: Option<i64>,

    #[serde(default)]
    pub info: PackageConfiguration,
}

/// The cache metadata store.
///
/// Every record carries its revisions; documents with a record that does
/// not are rejected when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoreDocument")]
pub struct MetadataStore {
    recipes: Vec<RecipeRecord>,
    packages: Vec<PackageRecord>,
}

/// Unchecked on-disk form of [`MetadataStore`].
#[derive(Deserialize)]
struct StoreDocument {
    #[serde(default)]
    recipes: Vec<RecipeRecord>,

    #[serde(default)]
    packages: Vec<PackageRecord>,
}

impl TryFrom<StoreDocument> for MetadataStore {
    type Error = String;

    fn try_from(doc: StoreDocument) -> Result<Self, Self::Error> {
        if let Some(record) = doc
            .recipes
            .iter()
            .find(|r| r.reference.revision().is_none())
        {
            return Err(format!(
                "recipe record `{}` has no recipe revision",
                record.reference
            ));
        }
        if let Some(record) = doc.packages.iter().find(|p| {
            p.reference.reference().revision().is_none() || p.reference.revision().is_none()
        }) {
            return Err(format!(
                "package record `{}` needs both a recipe and a package revision",
                record.reference.repr_notime()
            ));
        }
        Ok(MetadataStore {
            recipes: doc.recipes,
            packages: doc.packages,
        })
    }
}

fn newest_first<T>(items: &mut [T], timestamp: impl Fn(&T) -> Option<i64>) {
    // Stable: equal timestamps keep store order, later records first.
    items.reverse();
    items.sort_by_key(|item| std::cmp::Reverse(timestamp(item).unwrap_or(0)));
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store. A missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no metadata at {}, cache is empty", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cache metadata: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse cache metadata: {}", path.display()))
    }

    /// Write the store, creating its folder if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create cache folder: {}", parent.display())
            })?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write cache metadata: {}", path.display()))
    }

    pub fn recipe_records(&self) -> &[RecipeRecord] {
        &self.recipes
    }

    pub fn package_records(&self) -> &[PackageRecord] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.packages.is_empty()
    }

    /// Recipe references (without revision) matching a glob, sorted.
    pub fn search_recipes(&self, pattern: &str) -> Vec<RecipeReference> {
        let mut refs: Vec<RecipeReference> = Vec::new();
        for record in &self.recipes {
            let reference = record.reference.without_revision();
            if !refs.contains(&reference) && glob_match(pattern, &reference.to_string(), false) {
                refs.push(reference);
            }
        }
        refs.sort();
        refs
    }

    /// Newest revision of a recipe, if any.
    pub fn get_latest_recipe_reference(&self, reference: &RecipeReference) -> Option<RecipeReference> {
        self.get_recipe_revisions_references(reference)
            .into_iter()
            .next()
    }

    /// Every revision of a recipe, newest first.
    pub fn get_recipe_revisions_references(
        &self,
        reference: &RecipeReference,
    ) -> Vec<RecipeReference> {
        let mut revisions: Vec<RecipeReference> = self
            .recipes
            .iter()
            .filter(|r| r.reference.same_recipe(reference))
            .map(|r| r.reference.clone())
            .collect();
        newest_first(&mut revisions, RecipeReference::timestamp);
        revisions
    }

    fn package_revisions(&self, pref: &PkgReference) -> Vec<&PackageRecord> {
        let mut records: Vec<&PackageRecord> = self
            .packages
            .iter()
            .filter(|p| {
                p.reference.reference() == pref.reference()
                    && p.reference.package_id() == pref.package_id()
            })
            .collect();
        newest_first(&mut records, |p| p.reference.timestamp());
        records
    }

    /// Newest revision of a package, if any.
    pub fn get_latest_package_reference(&self, pref: &PkgReference) -> Option<PkgReference> {
        self.package_revisions(pref)
            .first()
            .map(|p| p.reference.clone())
    }

    /// Revisions of a package, newest first.
    pub fn get_package_revisions_references(
        &self,
        pref: &PkgReference,
        only_latest_prev: bool,
    ) -> Vec<PkgReference> {
        let records = self.package_revisions(pref);
        let take = if only_latest_prev { 1 } else { records.len() };
        records
            .into_iter()
            .take(take)
            .map(|p| p.reference.clone())
            .collect()
    }

    /// Package ids of a recipe revision, without package revisions.
    pub fn get_package_references(&self, rrev: &RecipeReference) -> Vec<PkgReference> {
        let mut prefs: Vec<PkgReference> = Vec::new();
        for record in &self.packages {
            if record.reference.reference() != rrev {
                continue;
            }
            let pref = record.reference.with_revision(None::<String>);
            if !prefs.contains(&pref) {
                prefs.push(pref);
            }
        }
        prefs
    }

    /// Configuration of each package, taken from its newest revision.
    pub fn get_packages_binary_info(&self, prefs: &[PkgReference]) -> PackageConfigurations {
        prefs
            .iter()
            .map(|pref| {
                let info = self
                    .package_revisions(pref)
                    .first()
                    .map(|p| p.info.clone())
                    .unwrap_or_default();
                (pref.clone(), info)
            })
            .collect()
    }

    /// Last-used time of a recipe revision.
    pub fn get_recipe_lru(&self, rrev: &RecipeReference) -> Option<i64> {
        self.recipes
            .iter()
            .find(|r| &r.reference == rrev)
            .and_then(|r| r.lru)
    }

    /// Last-used time of a package revision. Without a package revision,
    /// the newest one is used.
    pub fn get_package_lru(&self, pref: &PkgReference) -> Option<i64> {
        match pref.revision() {
            Some(_) => self
                .packages
                .iter()
                .find(|p| &p.reference == pref)
                .and_then(|p| p.lru),
            None => self.package_revisions(pref).first().and_then(|p| p.lru),
        }
    }

    /// Record a recipe revision, replacing an existing record.
    pub fn add_recipe(&mut self, rrev: RecipeReference, lru: i64) {
        assert!(rrev.revision().is_some(), "add_recipe: `{}` has no revision", rrev);
        self.recipes.retain(|r| r.reference != rrev);
        self.recipes.push(RecipeRecord {
            reference: rrev,
            lru: Some(lru),
        });
    }

    /// Record a package revision, replacing an existing record.
    pub fn add_package(&mut self, pref: PkgReference, lru: i64, info: PackageConfiguration) {
        assert!(
            pref.reference().revision().is_some() && pref.revision().is_some(),
            "add_package: `{}` needs both revisions",
            pref.repr()
        );
        self.packages.retain(|p| p.reference != pref);
        self.packages.push(PackageRecord {
            reference: pref,
            lru: Some(lru),
            info,
        });
    }

    /// Forget a recipe revision and all of its packages. Returns whether
    /// anything was removed.
    pub fn remove_recipe(&mut self, rrev: &RecipeReference) -> bool {
        let before = self.recipes.len() + self.packages.len();
        self.recipes.retain(|r| &r.reference != rrev);
        self.packages.retain(|p| p.reference.reference() != rrev);
        before != self.recipes.len() + self.packages.len()
    }

    /// Forget one package revision. Returns whether it existed.
    pub fn remove_package(&mut self, pref: &PkgReference) -> bool {
        let before = self.packages.len();
        self.packages.retain(|p| &p.reference != pref);
        before != self.packages.len()
    }
}
