//! Reference selection.
//!
//! [`ListApi::select`] turns a [`ListPattern`], an optional configuration
//! query and an optional LRU bound into a [`PackagesList`]:
//!
//! 1. resolve candidate recipe references (search, or build the one the
//!    pattern names)
//! 2. stop there for bare recipe patterns
//! 3. resolve recipe revisions: the latest, or all matching ones oldest
//!    first
//! 4. for package patterns, resolve package ids per recipe revision
//!    (configuration lookup, query, id filter), then package revisions
//!
//! A concrete name that does not exist aborts the selection; a wildcard
//! that matches nothing yields an empty list.

pub mod errors;
pub mod pattern;

use std::time::Duration;

use rayon::prelude::*;
use tracing::debug;

use crate::core::query::{ConfigQuery, PackageConfigurations};
use crate::core::{PackagesList, PkgReference, RecipeReference};
use crate::sources::{CacheBackend, MetadataStore, PackageBackend, RemoteBackend, RemoteIndex};
use crate::util::dates;

pub use errors::{QueryConflict, SelectError};
pub use pattern::{ListPattern, PatternDefaults};

/// Packages resolved for one recipe revision.
struct ResolvedPackages {
    prefs: Vec<PkgReference>,
    configurations: PackageConfigurations,
}

/// Reference lookups and selection over the local cache or a remote.
///
/// A `None` remote means the local cache.
pub struct ListApi<'a> {
    cache: &'a MetadataStore,
}

impl<'a> ListApi<'a> {
    pub fn new(cache: &'a MetadataStore) -> Self {
        ListApi { cache }
    }

    fn with_backend<T>(
        &self,
        remote: Option<&dyn RemoteIndex>,
        f: impl FnOnce(&dyn PackageBackend) -> Result<T, SelectError>,
    ) -> Result<T, SelectError> {
        match remote {
            Some(remote) => f(&RemoteBackend::new(remote)),
            None => f(&CacheBackend::new(self.cache)),
        }
    }

    /// Latest revision of a recipe, `None` if it does not exist.
    pub fn latest_recipe_revision(
        &self,
        reference: &RecipeReference,
        remote: Option<&dyn RemoteIndex>,
    ) -> Result<Option<RecipeReference>, SelectError> {
        assert!(
            reference.revision().is_none(),
            "latest_recipe_revision: `{}` already has a revision",
            reference.repr()
        );
        self.with_backend(remote, |b| {
            b.latest_recipe_revision(reference)
                .map_err(|e| SelectError::backend(b.name(), e))
        })
    }

    /// All revisions of a recipe, newest first.
    pub fn recipe_revisions(
        &self,
        reference: &RecipeReference,
        remote: Option<&dyn RemoteIndex>,
    ) -> Result<Vec<RecipeReference>, SelectError> {
        assert!(
            reference.revision().is_none(),
            "recipe_revisions: `{}` already has a revision",
            reference.repr()
        );
        self.with_backend(remote, |b| {
            b.recipe_revisions(reference)
                .map_err(|e| SelectError::backend(b.name(), e))
        })
    }

    /// Latest revision of a package, `None` if it does not exist.
    pub fn latest_package_revision(
        &self,
        pref: &PkgReference,
        remote: Option<&dyn RemoteIndex>,
    ) -> Result<Option<PkgReference>, SelectError> {
        assert!(
            pref.revision().is_none(),
            "latest_package_revision: `{}` already has a revision",
            pref.repr()
        );
        self.with_backend(remote, |b| {
            b.latest_package_revision(pref)
                .map_err(|e| SelectError::backend(b.name(), e))
        })
    }

    /// All revisions of a package, newest first.
    pub fn package_revisions(
        &self,
        pref: &PkgReference,
        remote: Option<&dyn RemoteIndex>,
    ) -> Result<Vec<PkgReference>, SelectError> {
        assert!(
            pref.reference().revision().is_some(),
            "package_revisions: `{}` needs a recipe revision",
            pref.repr()
        );
        self.with_backend(remote, |b| {
            b.package_revisions(pref)
                .map_err(|e| SelectError::backend(b.name(), e))
        })
    }

    /// Packages of a recipe revision with their configurations.
    ///
    /// On a remote, a `latest` revision is resolved first.
    pub fn packages_configurations(
        &self,
        rrev: &RecipeReference,
        remote: Option<&dyn RemoteIndex>,
    ) -> Result<PackageConfigurations, SelectError> {
        assert!(
            rrev.revision().is_some(),
            "packages_configurations: `{}` needs a revision",
            rrev
        );
        self.with_backend(remote, |b| {
            b.package_configurations(rrev)
                .map_err(|e| SelectError::backend(b.name(), e))
        })
    }

    /// Keep the configurations satisfying `query`.
    pub fn filter_packages_configurations(
        configurations: PackageConfigurations,
        query: &str,
    ) -> Result<PackageConfigurations, SelectError> {
        Ok(crate::core::query::filter_packages(query, configurations)?)
    }

    /// Select everything matching `pattern`.
    pub fn select(
        &self,
        pattern: &ListPattern,
        package_query: Option<&str>,
        remote: Option<&dyn RemoteIndex>,
        lru: Option<Duration>,
    ) -> Result<PackagesList, SelectError> {
        let limit = lru.map(|lru| dates::timelimit(dates::now(), lru));
        self.select_used_before(pattern, package_query, remote, limit)
    }

    /// Like [`select`](Self::select), with the LRU cutoff given as epoch
    /// seconds: only entries last used strictly before `limit` are kept.
    pub fn select_used_before(
        &self,
        pattern: &ListPattern,
        package_query: Option<&str>,
        remote: Option<&dyn RemoteIndex>,
        limit: Option<i64>,
    ) -> Result<PackagesList, SelectError> {
        if package_query.is_some() && pattern.has_exact_package_id() {
            return Err(SelectError::InvalidQueryCombination(
                QueryConflict::PackageQueryWithExactId,
            ));
        }
        if remote.is_some() && limit.is_some() {
            return Err(SelectError::InvalidQueryCombination(
                QueryConflict::LruWithRemote,
            ));
        }
        let query = package_query.map(ConfigQuery::parse).transpose()?;

        self.with_backend(remote, |backend| {
            Selection {
                backend,
                pattern,
                query: query.as_ref(),
                limit,
            }
            .run()
        })
    }
}

/// State of one `select` call.
struct Selection<'s> {
    backend: &'s dyn PackageBackend,
    pattern: &'s ListPattern,
    query: Option<&'s ConfigQuery>,
    limit: Option<i64>,
}

impl Selection<'_> {
    fn backend_err(&self, err: anyhow::Error) -> SelectError {
        SelectError::backend(self.backend.name(), err)
    }

    fn run(&self) -> Result<PackagesList, SelectError> {
        let pattern = self.pattern;
        let mut bundle = PackagesList::new();

        let refs = self.candidate_refs()?;
        debug!(
            pattern = pattern.raw(),
            source = self.backend.name(),
            candidates = refs.len(),
            "resolved candidate recipes"
        );

        if pattern.package_id().is_none() && pattern.rrev().is_none() {
            bundle.add_refs(&refs);
            return Ok(bundle);
        }

        for reference in &refs {
            let mut rrevs = self.recipe_revisions(reference)?;

            if let Some(limit) = self.limit {
                if pattern.package_id().is_none() {
                    rrevs = self.older_than(rrevs, limit, |r| self.backend.recipe_lru(r))?;
                }
            }

            bundle.add_refs(&rrevs);

            if pattern.package_id().is_none() {
                continue;
            }

            let resolved: Vec<Result<ResolvedPackages, SelectError>> = rrevs
                .par_iter()
                .map(|rrev| self.packages(rrev))
                .collect();

            for (rrev, packages) in rrevs.iter().zip(resolved) {
                let packages = packages?;
                bundle.add_prefs(rrev, &packages.prefs);
                bundle.add_configurations(&packages.configurations);
            }
        }

        Ok(bundle)
    }

    /// Step 1: candidate recipe references, older versions first.
    fn candidate_refs(&self) -> Result<Vec<RecipeReference>, SelectError> {
        let Some(search) = self.pattern.search_ref() else {
            return Ok(vec![self.pattern.recipe_reference()?]);
        };

        let found = self
            .backend
            .search_recipes(search)
            .map_err(|e| self.backend_err(e))?;
        let mut refs = self.pattern.filter_refs(found);
        refs.sort();
        refs.dedup();
        self.pattern.check_refs(&refs)?;
        Ok(refs)
    }

    /// Step 3: the revisions of one recipe, oldest first.
    fn recipe_revisions(
        &self,
        reference: &RecipeReference,
    ) -> Result<Vec<RecipeReference>, SelectError> {
        if self.pattern.is_latest_rrev() {
            let latest = self
                .backend
                .latest_recipe_revision(reference)
                .map_err(|e| self.backend_err(e))?;
            return match latest {
                Some(rrev) => Ok(vec![rrev]),
                None => Err(SelectError::ReferenceNotFound(format!(
                    "Recipe '{}' not found",
                    reference
                ))),
            };
        }

        let all = self
            .backend
            .recipe_revisions(reference)
            .map_err(|e| self.backend_err(e))?;
        let mut rrevs = self.pattern.filter_rrevs(all)?;
        rrevs.reverse();
        Ok(rrevs)
    }

    /// Steps 6 to 8 for one recipe revision.
    fn packages(&self, rrev: &RecipeReference) -> Result<ResolvedPackages, SelectError> {
        let pattern = self.pattern;

        let direct = pattern.has_exact_package_id()
            && pattern.prev().is_some_and(|prev| !prev.contains('*'));

        let (mut prefs, configurations) = match pattern.package_id() {
            Some(package_id) if direct => {
                (vec![PkgReference::new(rrev.clone(), package_id)], Vec::new())
            }
            _ => {
                let mut configurations = self
                    .backend
                    .package_configurations(rrev)
                    .map_err(|e| self.backend_err(e))?;
                if let Some(query) = self.query {
                    configurations = query.filter(configurations);
                }
                let prefs = pattern.filter_prefs(configurations.iter().map(|(p, _)| p))?;
                configurations.retain(|(p, _)| prefs.contains(p));
                (prefs, configurations)
            }
        };

        if pattern.prev().is_some() {
            let mut expanded = Vec::new();
            for pref in &prefs {
                if pattern.is_latest_prev() {
                    let latest = self
                        .backend
                        .latest_package_revision(pref)
                        .map_err(|e| self.backend_err(e))?;
                    match latest {
                        Some(prev) => expanded.push(prev),
                        None => {
                            return Err(SelectError::BinaryNotFound(format!(
                                "Binary package not found: '{}'",
                                pref.repr_notime()
                            )))
                        }
                    }
                } else {
                    let all = self
                        .backend
                        .package_revisions(pref)
                        .map_err(|e| self.backend_err(e))?;
                    let mut prevs = pattern.filter_prevs(all)?;
                    prevs.reverse();
                    expanded.extend(prevs);
                }
            }
            prefs = expanded;
        }

        if let Some(limit) = self.limit {
            prefs = self.older_than(prefs, limit, |p| self.backend.package_lru(p))?;
        }

        Ok(ResolvedPackages {
            prefs,
            configurations,
        })
    }

    /// Keep the items last used strictly before `limit`.
    fn older_than<T>(
        &self,
        items: Vec<T>,
        limit: i64,
        lru: impl Fn(&T) -> anyhow::Result<Option<i64>>,
    ) -> Result<Vec<T>, SelectError> {
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            let used = lru(&item).map_err(|e| self.backend_err(e))?;
            if used.is_some_and(|used| used < limit) {
                kept.push(item);
            }
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::IndexRemote;
    use crate::test_support::{zlib_store, FailingRemote, RecordingRemote, StoreBuilder};

    fn rref(text: &str) -> RecipeReference {
        RecipeReference::parse(text).unwrap()
    }

    fn pattern(text: &str) -> ListPattern {
        ListPattern::new(text).unwrap()
    }

    fn revisions(list: &PackagesList) -> Vec<String> {
        list.refs().iter().map(|(r, _)| r.repr_notime()).collect()
    }

    fn package_revisions(list: &PackagesList) -> Vec<String> {
        list.refs()
            .iter()
            .flat_map(|(r, b)| PackagesList::prefs(r, b))
            .map(|(p, _)| p.repr_notime())
            .collect()
    }

    #[test]
    fn test_all_revisions_oldest_first() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let list = api.select(&pattern("zlib/1.2.13#*"), None, None, None).unwrap();
        assert_eq!(
            revisions(&list),
            vec!["zlib/1.2.13#r1", "zlib/1.2.13#r2", "zlib/1.2.13#r3"]
        );
        let timestamps: Vec<_> = list.refs().iter().map(|(r, _)| r.timestamp()).collect();
        assert_eq!(timestamps, vec![Some(10), Some(20), Some(30)]);
    }

    #[test]
    fn test_bare_pattern_lists_recipes_only() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let list = api.select(&pattern("*"), None, None, None).unwrap();
        let recipes: Vec<String> = list.recipes().keys().map(|r| r.to_string()).collect();
        assert_eq!(recipes, vec!["bzip2/1.0.8", "zlib/1.2.11", "zlib/1.2.13"]);
        assert!(list.refs().is_empty());
    }

    #[test]
    fn test_latest_revision_by_default() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let list = api.select(&pattern("zlib/*#latest"), None, None, None).unwrap();
        assert_eq!(revisions(&list), vec!["zlib/1.2.11#o1", "zlib/1.2.13#r3"]);
    }

    #[test]
    fn test_wildcard_without_match_is_empty() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let list = api.select(&pattern("nonexistent/*"), None, None, None).unwrap();
        assert!(list.is_empty());
        let list = api.select(&pattern("zlib/1.2.13#nothing*"), None, None, None).unwrap();
        assert!(list.refs().is_empty());
        let list = api.select(&pattern("zlib/9.9#*"), None, None, None).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_concrete_missing_reference_fails() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        for text in ["zlib/9.9", "zlib/9.9#latest", "zlib/9.9:*", "zlib/1.2.13#r9"] {
            let err = api.select(&pattern(text), None, None, None).unwrap_err();
            assert!(matches!(err, SelectError::ReferenceNotFound(_)), "{}: {}", text, err);
        }
    }

    #[test]
    fn test_concrete_missing_binary_fails() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let err = api
            .select(&pattern("zlib/1.2.13#r2:zzz#latest"), None, None, None)
            .unwrap_err();
        assert!(matches!(err, SelectError::BinaryNotFound(_)), "{}", err);

        let err = api
            .select(&pattern("zlib/1.2.13#r2:zzz"), None, None, None)
            .unwrap_err();
        assert!(matches!(err, SelectError::BinaryNotFound(_)), "{}", err);
    }

    #[test]
    fn test_query_with_exact_package_id_conflicts() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let err = api
            .select(&pattern("zlib/1.2.13:abc"), Some("os=Windows"), None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            SelectError::InvalidQueryCombination(QueryConflict::PackageQueryWithExactId)
        ));
    }

    #[test]
    fn test_lru_with_remote_conflicts() {
        let store = zlib_store();
        let remote = IndexRemote::from_store("center", zlib_store());
        let api = ListApi::new(&store);

        let err = api
            .select(
                &pattern("zlib/*"),
                None,
                Some(&remote),
                Some(Duration::from_secs(3600)),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SelectError::InvalidQueryCombination(QueryConflict::LruWithRemote)
        ));
    }

    #[test]
    fn test_bad_query_fails_before_lookup() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let err = api
            .select(&pattern("zlib/*:*"), Some("os=Windows AND"), None, None)
            .unwrap_err();
        assert!(matches!(err, SelectError::InvalidQuerySyntax(_)));
    }

    #[test]
    fn test_packages_without_revisions() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let list = api.select(&pattern("zlib/1.2.13#r2:*"), None, None, None).unwrap();
        let refs = list.refs();
        let packages = refs[0].1.packages.as_ref().unwrap();
        let ids: Vec<_> = packages.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["abc", "def"]);
        assert!(packages.values().all(|p| p.revisions.is_empty()));
        assert_eq!(
            packages.get(&"abc".to_string()).unwrap().info.as_ref().unwrap().get("os"),
            Some("Linux")
        );
    }

    #[test]
    fn test_package_revisions_oldest_first() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let list = api
            .select(&pattern("zlib/1.2.13#r2:abc#*"), None, None, None)
            .unwrap();
        assert_eq!(
            package_revisions(&list),
            vec!["zlib/1.2.13#r2:abc#p1", "zlib/1.2.13#r2:abc#p2"]
        );

        let list = api
            .select(&pattern("zlib/1.2.13#r2:*#latest"), None, None, None)
            .unwrap();
        assert_eq!(
            package_revisions(&list),
            vec!["zlib/1.2.13#r2:abc#p2", "zlib/1.2.13#r2:def#q1"]
        );
    }

    #[test]
    fn test_query_filters_packages() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let list = api
            .select(&pattern("zlib/*#*:*"), Some("os=Windows OR arch=armv8"), None, None)
            .unwrap();
        let refs = list.refs();
        let selected: Vec<String> = refs
            .iter()
            .flat_map(|(_, b)| b.packages.iter().flat_map(|p| p.keys().cloned()))
            .collect();
        assert_eq!(selected, vec!["def"]);
        // Revisions without matching packages stay, with an empty package map.
        assert!(refs.iter().all(|(_, b)| b.packages.is_some()));
    }

    #[test]
    fn test_lru_filters_recipe_revisions() {
        let now = dates::now();
        let store = StoreBuilder::new()
            .recipe_used("pkg/1.0#old%1", now - 30 * 86400)
            .recipe_used("pkg/1.0#new%2", now)
            .build();
        let api = ListApi::new(&store);

        let list = api
            .select(&pattern("pkg/*#*"), None, None, Some(Duration::from_secs(7 * 86400)))
            .unwrap();
        assert_eq!(revisions(&list), vec!["pkg/1.0#old"]);
    }

    #[test]
    fn test_lru_filters_package_revisions() {
        let now = dates::now();
        let store = StoreBuilder::new()
            .recipe_used("pkg/1.0#r1%1", now)
            .package_used("pkg/1.0#r1:a#p1%2", now - 30 * 86400, &[])
            .package_used("pkg/1.0#r1:b#p1%3", now, &[])
            .build();
        let api = ListApi::new(&store);

        let list = api
            .select(&pattern("pkg/*#*:*#*"), None, None, Some(Duration::from_secs(86400)))
            .unwrap();
        // Recipe revisions are not LRU-filtered when packages are selected.
        assert_eq!(revisions(&list), vec!["pkg/1.0#r1"]);
        assert_eq!(package_revisions(&list), vec!["pkg/1.0#r1:a#p1"]);
    }

    #[test]
    fn test_lru_cutoff_is_exclusive() {
        let store = StoreBuilder::new()
            .recipe_used("pkg/1.0#at%1", 100)
            .recipe_used("pkg/1.0#before%2", 99)
            .build();
        let api = ListApi::new(&store);

        let list = api
            .select_used_before(&pattern("pkg/1.0#*"), None, None, Some(100))
            .unwrap();
        assert_eq!(revisions(&list), vec!["pkg/1.0#before"]);

        let list = api
            .select_used_before(&pattern("pkg/1.0#*"), None, None, Some(101))
            .unwrap();
        assert_eq!(revisions(&list), vec!["pkg/1.0#at", "pkg/1.0#before"]);
    }

    #[test]
    fn test_package_lru_cutoff_is_exclusive() {
        let store = StoreBuilder::new()
            .recipe_used("pkg/1.0#r1%1", 500)
            .package_used("pkg/1.0#r1:a#p1%2", 100, &[])
            .package_used("pkg/1.0#r1:b#p1%3", 99, &[])
            .build();
        let api = ListApi::new(&store);

        let list = api
            .select_used_before(&pattern("pkg/1.0#r1:*#*"), None, None, Some(100))
            .unwrap();
        assert_eq!(package_revisions(&list), vec!["pkg/1.0#r1:b#p1"]);
    }

    #[test]
    fn test_lru_skips_entries_never_used() {
        let store: MetadataStore = serde_json::from_str(
            r#"{
  "recipes": [
    {"reference": "pkg/1.0#unknown%1"},
    {"reference": "pkg/1.0#used%2", "lru": 10}
  ]
}"#,
        )
        .unwrap();
        let api = ListApi::new(&store);

        let list = api
            .select_used_before(&pattern("pkg/1.0#*"), None, None, Some(100))
            .unwrap();
        assert_eq!(revisions(&list), vec!["pkg/1.0#used"]);
    }

    #[test]
    fn test_remote_index_without_revisions_is_rejected() {
        let store = MetadataStore::new();
        let api = ListApi::new(&store);

        let index = serde_json::from_str::<MetadataStore>(
            r#"{"recipes": [{"reference": "zlib/1.0", "lru": 0}], "packages": []}"#,
        );
        assert!(index.is_err());

        // A valid index still selects normally.
        let index: MetadataStore = serde_json::from_str(
            r#"{"recipes": [{"reference": "zlib/1.0#r1%1"}], "packages": []}"#,
        )
        .unwrap();
        let remote = IndexRemote::from_store("center", index);
        let list = api
            .select(&pattern("zlib/1.0:*"), None, Some(&remote), None)
            .unwrap();
        assert_eq!(revisions(&list), vec!["zlib/1.0#r1"]);
    }

    #[test]
    fn test_remote_select_matches_cache() {
        let store = MetadataStore::new();
        let remote = IndexRemote::from_store("center", zlib_store());
        let api = ListApi::new(&store);

        let list = api
            .select(&pattern("zlib/1.2.13#*"), None, Some(&remote), None)
            .unwrap();
        assert_eq!(revisions(&list).len(), 3);
        assert!(api
            .select(&pattern("zlib/*"), None, None, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_exact_pattern_skips_search() {
        let store = MetadataStore::new();
        let remote = RecordingRemote::new(IndexRemote::from_store("center", zlib_store()));
        let api = ListApi::new(&store);

        let list = api
            .select(&pattern("zlib/1.2.13#r2:abc#p1"), None, Some(&remote), None)
            .unwrap();
        assert_eq!(package_revisions(&list), vec!["zlib/1.2.13#r2:abc#p1"]);

        let calls = remote.calls();
        assert!(!calls.iter().any(|c| c == "search_recipes"), "{:?}", calls);
        assert!(!calls.iter().any(|c| c == "search_packages"), "{:?}", calls);
    }

    #[test]
    fn test_wildcard_prev_looks_up_configurations() {
        let store = MetadataStore::new();
        let remote = RecordingRemote::new(IndexRemote::from_store("center", zlib_store()));
        let api = ListApi::new(&store);

        api.select(&pattern("zlib/1.2.13#r2:abc#*"), None, Some(&remote), None)
            .unwrap();
        assert!(remote.calls().iter().any(|c| c == "search_packages"));
    }

    #[test]
    fn test_remote_latest_configurations() {
        let store = MetadataStore::new();
        let remote = IndexRemote::from_store("center", zlib_store());
        let api = ListApi::new(&store);

        let packages = api
            .packages_configurations(&rref("zlib/1.2.13#latest"), Some(&remote))
            .unwrap();
        // r3 is the latest revision and has one package.
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].0.reference().revision(), Some("r3"));
    }

    #[test]
    fn test_backend_failure_surfaces() {
        let store = MetadataStore::new();
        let api = ListApi::new(&store);

        let err = api
            .select(&pattern("zlib/*"), None, Some(&FailingRemote::new("broken")), None)
            .unwrap_err();
        match err {
            SelectError::Backend { source_name, .. } => assert_eq!(source_name, "broken"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_lookup_operations() {
        let store = zlib_store();
        let api = ListApi::new(&store);

        let latest = api
            .latest_recipe_revision(&rref("zlib/1.2.13"), None)
            .unwrap()
            .unwrap();
        assert_eq!(latest.revision(), Some("r3"));
        assert!(api
            .latest_recipe_revision(&rref("zlib/9.9"), None)
            .unwrap()
            .is_none());
        assert_eq!(api.recipe_revisions(&rref("zlib/1.2.13"), None).unwrap().len(), 3);

        let pref = PkgReference::new(rref("zlib/1.2.13#r2"), "abc");
        assert_eq!(
            api.latest_package_revision(&pref, None).unwrap().unwrap().revision(),
            Some("p2")
        );
        assert_eq!(api.package_revisions(&pref, None).unwrap().len(), 2);

        let configurations = api
            .packages_configurations(&rref("zlib/1.2.13#r2"), None)
            .unwrap();
        let filtered =
            ListApi::filter_packages_configurations(configurations, "os=Macos").unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    #[should_panic(expected = "already has a revision")]
    fn test_latest_with_revision_is_a_bug() {
        let store = zlib_store();
        let api = ListApi::new(&store);
        let _ = api.latest_recipe_revision(&rref("zlib/1.2.13#r1"), None);
    }

    #[test]
    #[should_panic(expected = "needs a recipe revision")]
    fn test_package_revisions_without_rrev_is_a_bug() {
        let store = zlib_store();
        let api = ListApi::new(&store);
        let pref = PkgReference::new(rref("zlib/1.2.13"), "abc");
        let _ = api.package_revisions(&pref, None);
    }
}
