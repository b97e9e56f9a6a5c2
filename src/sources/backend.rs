//! The revision enumerator interface the selection engine runs against.

use anyhow::{bail, Result};

use crate::core::query::PackageConfigurations;
use crate::core::{PkgReference, RecipeReference};
use crate::sources::metadata::MetadataStore;

/// Where references are looked up: the local cache or a remote index.
///
/// Calls taking a package reference or asking for configurations require a
/// recipe revision on the input. Lookups of a single latest revision return
/// `None` when nothing exists.
pub trait PackageBackend: Sync {
    /// Source label used in results and messages.
    fn name(&self) -> &str;

    /// Recipe references (without revision) matching a glob.
    fn search_recipes(&self, pattern: &str) -> Result<Vec<RecipeReference>>;

    fn latest_recipe_revision(&self, reference: &RecipeReference)
        -> Result<Option<RecipeReference>>;

    /// All revisions of a recipe, newest first.
    fn recipe_revisions(&self, reference: &RecipeReference) -> Result<Vec<RecipeReference>>;

    fn latest_package_revision(&self, pref: &PkgReference) -> Result<Option<PkgReference>>;

    /// All revisions of a package, newest first.
    fn package_revisions(&self, pref: &PkgReference) -> Result<Vec<PkgReference>>;

    /// Packages of a recipe revision with their configurations.
    fn package_configurations(&self, rrev: &RecipeReference) -> Result<PackageConfigurations>;

    /// Last-used time of a recipe revision.
    fn recipe_lru(&self, rrev: &RecipeReference) -> Result<Option<i64>> {
        bail!(
            "cannot get the last-used time of '{}' from '{}'",
            rrev.repr_notime(),
            self.name()
        )
    }

    /// Last-used time of a package revision.
    fn package_lru(&self, pref: &PkgReference) -> Result<Option<i64>> {
        bail!(
            "cannot get the last-used time of '{}' from '{}'",
            pref.repr_notime(),
            self.name()
        )
    }
}

/// The local cache, read through its metadata store.
pub struct CacheBackend<'a> {
    store: &'a MetadataStore,
}

impl<'a> CacheBackend<'a> {
    pub fn new(store: &'a MetadataStore) -> Self {
        CacheBackend { store }
    }
}

impl PackageBackend for CacheBackend<'_> {
    fn name(&self) -> &str {
        crate::util::context::LOCAL_CACHE
    }

    fn search_recipes(&self, pattern: &str) -> Result<Vec<RecipeReference>> {
        Ok(self.store.search_recipes(pattern))
    }

    fn latest_recipe_revision(
        &self,
        reference: &RecipeReference,
    ) -> Result<Option<RecipeReference>> {
        Ok(self.store.get_latest_recipe_reference(reference))
    }

    fn recipe_revisions(&self, reference: &RecipeReference) -> Result<Vec<RecipeReference>> {
        Ok(self.store.get_recipe_revisions_references(reference))
    }

    fn latest_package_revision(&self, pref: &PkgReference) -> Result<Option<PkgReference>> {
        Ok(self.store.get_latest_package_reference(pref))
    }

    fn package_revisions(&self, pref: &PkgReference) -> Result<Vec<PkgReference>> {
        Ok(self.store.get_package_revisions_references(pref, false))
    }

    fn package_configurations(&self, rrev: &RecipeReference) -> Result<PackageConfigurations> {
        let prefs = self.store.get_package_references(rrev);
        Ok(self.store.get_packages_binary_info(&prefs))
    }

    fn recipe_lru(&self, rrev: &RecipeReference) -> Result<Option<i64>> {
        Ok(self.store.get_recipe_lru(rrev))
    }

    fn package_lru(&self, pref: &PkgReference) -> Result<Option<i64>> {
        Ok(self.store.get_package_lru(pref))
    }
}
