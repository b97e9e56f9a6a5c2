//! Test utilities and mocks for berth unit tests.
//!
//! [`StoreBuilder`] builds metadata stores from reference strings, and the
//! remote mocks stand in for network indexes.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::{RecordingRemote, StoreBuilder};
//!
//! #[test]
//! fn test_example() {
//!     let store = StoreBuilder::new()
//!         .recipe("zlib/1.2.13#r1%10")
//!         .package("zlib/1.2.13#r1:abc#p1%11", &[("os", "Linux")])
//!         .build();
//!
//!     let remote = RecordingRemote::new(IndexRemote::from_store("center", store));
//!     // Run a selection against `remote`, then inspect `remote.calls()`...
//! }
//! ```

pub mod fixtures;

use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::core::query::{PackageConfiguration, PackageConfigurations};
use crate::core::{PkgReference, RecipeReference};
use crate::sources::{MetadataStore, RemoteIndex};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Builds a [`MetadataStore`] from reference strings.
///
/// References carry their timestamp as `#rev%timestamp`. Without an
/// explicit last-used time, the timestamp is used.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    store: MetadataStore,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe revision.
    pub fn recipe(self, text: &str) -> Self {
        let rrev = RecipeReference::parse(text).unwrap();
        let lru = rrev.timestamp().unwrap_or(0);
        self.recipe_used(text, lru)
    }

    /// Add a recipe revision with a last-used time.
    pub fn recipe_used(mut self, text: &str, lru: i64) -> Self {
        let rrev = RecipeReference::parse(text).unwrap();
        self.store.add_recipe(rrev, lru);
        self
    }

    /// Add a package revision with settings.
    pub fn package(self, text: &str, settings: &[(&str, &str)]) -> Self {
        let pref = PkgReference::parse(text).unwrap();
        let lru = pref.timestamp().unwrap_or(0);
        self.package_used(text, lru, settings)
    }

    /// Add a package revision with a last-used time and settings.
    pub fn package_used(self, text: &str, lru: i64, settings: &[(&str, &str)]) -> Self {
        let config = settings
            .iter()
            .fold(PackageConfiguration::new(), |c, (k, v)| c.with_setting(*k, *v));
        self.package_with_config(text, lru, config)
    }

    /// Add a package revision with a full configuration.
    pub fn package_with_config(mut self, text: &str, lru: i64, config: PackageConfiguration) -> Self {
        let pref = PkgReference::parse(text).unwrap();
        self.store.add_package(pref, lru, config);
        self
    }

    pub fn build(self) -> MetadataStore {
        self.store
    }
}

/// A remote that records which index calls were made.
pub struct RecordingRemote<R> {
    inner: R,
    calls: Mutex<Vec<String>>,
}

impl<R: RemoteIndex> RecordingRemote<R> {
    pub fn new(inner: R) -> Self {
        RecordingRemote {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    /// Names of the calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl<R: RemoteIndex> RemoteIndex for RecordingRemote<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn search_recipes(&self, pattern: &str) -> Result<Vec<RecipeReference>> {
        self.record("search_recipes");
        self.inner.search_recipes(pattern)
    }

    fn get_latest_recipe_reference(
        &self,
        reference: &RecipeReference,
    ) -> Result<Option<RecipeReference>> {
        self.record("get_latest_recipe_reference");
        self.inner.get_latest_recipe_reference(reference)
    }

    fn get_recipe_revisions_references(
        &self,
        reference: &RecipeReference,
    ) -> Result<Vec<RecipeReference>> {
        self.record("get_recipe_revisions_references");
        self.inner.get_recipe_revisions_references(reference)
    }

    fn get_latest_package_reference(&self, pref: &PkgReference) -> Result<Option<PkgReference>> {
        self.record("get_latest_package_reference");
        self.inner.get_latest_package_reference(pref)
    }

    fn get_package_revisions_references(&self, pref: &PkgReference) -> Result<Vec<PkgReference>> {
        self.record("get_package_revisions_references");
        self.inner.get_package_revisions_references(pref)
    }

    fn search_packages(&self, rrev: &RecipeReference) -> Result<PackageConfigurations> {
        self.record("search_packages");
        self.inner.search_packages(rrev)
    }
}

/// A remote whose every call fails, like an unreachable server.
#[derive(Debug, Clone)]
pub struct FailingRemote {
    name: String,
}

impl FailingRemote {
    pub fn new(name: impl Into<String>) -> Self {
        FailingRemote { name: name.into() }
    }
}

impl RemoteIndex for FailingRemote {
    fn name(&self) -> &str {
        &self.name
    }

    fn search_recipes(&self, _pattern: &str) -> Result<Vec<RecipeReference>> {
        bail!("connection refused")
    }

    fn get_latest_recipe_reference(
        &self,
        _reference: &RecipeReference,
    ) -> Result<Option<RecipeReference>> {
        bail!("connection refused")
    }

    fn get_recipe_revisions_references(
        &self,
        _reference: &RecipeReference,
    ) -> Result<Vec<RecipeReference>> {
        bail!("connection refused")
    }

    fn get_latest_package_reference(&self, _pref: &PkgReference) -> Result<Option<PkgReference>> {
        bail!("connection refused")
    }

    fn get_package_revisions_references(&self, _pref: &PkgReference) -> Result<Vec<PkgReference>> {
        bail!("connection refused")
    }

    fn search_packages(&self, _rrev: &RecipeReference) -> Result<PackageConfigurations> {
        bail!("connection refused")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::IndexRemote;

    #[test]
    fn test_store_builder_uses_timestamp_as_lru() {
        let store = StoreBuilder::new()
            .recipe("zlib/1.2.13#r1%10")
            .package("zlib/1.2.13#r1:abc#p1%11", &[("os", "Linux")])
            .build();

        let rrev = RecipeReference::parse("zlib/1.2.13#r1").unwrap();
        assert_eq!(store.get_recipe_lru(&rrev), Some(10));
        let pref = PkgReference::parse("zlib/1.2.13#r1:abc#p1").unwrap();
        assert_eq!(store.get_package_lru(&pref), Some(11));
    }

    #[test]
    fn test_recording_remote() {
        let remote = RecordingRemote::new(IndexRemote::from_store("center", zlib_store()));
        let found = remote.search_recipes("zlib/*").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(remote.calls(), vec!["search_recipes"]);
    }

    #[test]
    fn test_failing_remote() {
        let remote = FailingRemote::new("broken");
        assert_eq!(remote.name(), "broken");
        assert!(remote.search_recipes("*").is_err());
    }
}
