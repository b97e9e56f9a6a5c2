//! Remote indexes.

use anyhow::{Context, Result};

use crate::core::query::PackageConfigurations;
use crate::core::{PkgReference, RecipeReference};
use crate::sources::backend::PackageBackend;

/// A remote package index.
///
/// Failures (unreachable, malformed answers) are returned as errors and
/// never retried here.
pub trait RemoteIndex: Sync {
    /// Remote name as configured.
    fn name(&self) -> &str;

    /// Recipe references (without revision) matching a glob.
    fn search_recipes(&self, pattern: &str) -> Result<Vec<RecipeReference>>;

    fn get_latest_recipe_reference(
        &self,
        reference: &RecipeReference,
    ) -> Result<Option<RecipeReference>>;

    /// Revisions of a recipe, newest first.
    fn get_recipe_revisions_references(
        &self,
        reference: &RecipeReference,
    ) -> Result<Vec<RecipeReference>>;

    fn get_latest_package_reference(&self, pref: &PkgReference) -> Result<Option<PkgReference>>;

    /// Revisions of a package, newest first.
    fn get_package_revisions_references(&self, pref: &PkgReference) -> Result<Vec<PkgReference>>;

    /// Binary search: packages of a recipe revision with configurations.
    fn search_packages(&self, rrev: &RecipeReference) -> Result<PackageConfigurations>;
}

/// Adapts a [`RemoteIndex`] to the selection engine.
pub struct RemoteBackend<'a> {
    remote: &'a dyn RemoteIndex,
}

impl<'a> RemoteBackend<'a> {
    pub fn new(remote: &'a dyn RemoteIndex) -> Self {
        RemoteBackend { remote }
    }
}

impl PackageBackend for RemoteBackend<'_> {
    fn name(&self) -> &str {
        self.remote.name()
    }

    fn search_recipes(&self, pattern: &str) -> Result<Vec<RecipeReference>> {
        self.remote.search_recipes(pattern)
    }

    fn latest_recipe_revision(
        &self,
        reference: &RecipeReference,
    ) -> Result<Option<RecipeReference>> {
        self.remote.get_latest_recipe_reference(reference)
    }

    fn recipe_revisions(&self, reference: &RecipeReference) -> Result<Vec<RecipeReference>> {
        self.remote.get_recipe_revisions_references(reference)
    }

    fn latest_package_revision(&self, pref: &PkgReference) -> Result<Option<PkgReference>> {
        self.remote.get_latest_package_reference(pref)
    }

    fn package_revisions(&self, pref: &PkgReference) -> Result<Vec<PkgReference>> {
        self.remote.get_package_revisions_references(pref)
    }

    fn package_configurations(&self, rrev: &RecipeReference) -> Result<PackageConfigurations> {
        if rrev.is_latest_marker() {
            let resolved = self
                .remote
                .get_latest_recipe_reference(&rrev.without_revision())?
                .with_context(|| format!("Recipe '{}' not found in '{}'", rrev, self.name()))?;
            return self.remote.search_packages(&resolved);
        }
        self.remote.search_packages(rrev)
    }
}
