//! Implementation of `berth remove`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::core::{MultiPackagesList, PackagesList};
use crate::select::{ListApi, PatternDefaults, QueryConflict, SelectError};
use crate::sources::MetadataStore;
use crate::util::context::{BerthContext, LOCAL_CACHE};

/// Options for removing references from the local cache.
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Selection pattern; revisions default to `*`
    pub pattern: Option<String>,

    /// Package list file to remove instead of a pattern
    pub list_file: Option<PathBuf>,

    /// Configuration query for packages
    pub package_query: Option<String>,

    /// Remote to remove from
    pub remote: Option<String>,

    /// Only references not used within this duration
    pub lru: Option<Duration>,

    /// Report what would be removed without touching the cache
    pub dry_run: bool,
}

impl RemoveOptions {
    fn validate(&self) -> Result<()> {
        match (&self.pattern, &self.list_file) {
            (None, None) => bail!("missing pattern or package list file"),
            (Some(_), Some(_)) => bail!("cannot define both the pattern and the package list file"),
            _ => {}
        }
        if self.package_query.is_some() && self.list_file.is_some() {
            bail!("cannot define package-query and the package list file");
        }
        Ok(())
    }
}

/// What to remove: the selected list under its source label.
fn removal_list(store: &MetadataStore, opts: &RemoveOptions) -> Result<PackagesList> {
    if let Some(path) = &opts.list_file {
        let lists = MultiPackagesList::load(path)?;
        let list = lists.get_or_empty(LOCAL_CACHE);
        if list.refs().is_empty() {
            warn!(path = %path.display(), "package list has no recipe revisions");
        }
        return Ok(list);
    }

    let expression = opts.pattern.as_deref().unwrap_or_default();
    let pattern = super::selection_pattern(expression, PatternDefaults::all_revisions())
        .map_err(SelectError::from)?;
    if pattern.package_id().is_none() && opts.package_query.is_some() {
        return Err(
            SelectError::InvalidQueryCombination(QueryConflict::PackageQueryWithoutPackages).into(),
        );
    }

    debug!(pattern = pattern.raw(), "selecting references to remove");
    let api = ListApi::new(store);
    Ok(api.select(&pattern, opts.package_query.as_deref(), None, opts.lru)?)
}

/// Remove selected recipe revisions and package revisions from the local
/// cache.
///
/// Entries without packages remove the whole recipe revision (and all its
/// packages); otherwise only the listed package revisions go. `confirm` is
/// asked before each removal; declined entries are left out of the result.
/// Returns what was (or, for a dry run, would be) removed.
pub fn remove(
    ctx: &BerthContext,
    opts: &RemoveOptions,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<MultiPackagesList> {
    opts.validate()?;
    if let Some(name) = &opts.remote {
        let remote = ctx.remotes().get(name)?;
        bail!(
            "cannot remove from remote '{}': remote indexes are read-only",
            remote.name
        );
    }

    let path = ctx.metadata_path();
    let mut store = MetadataStore::load(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let selected = removal_list(&store, opts)?;

    let mut removed = PackagesList::new();
    for (rrev, bundle) in selected.refs() {
        if bundle.packages.is_none() {
            let question = format!(
                "Remove the recipe and all the packages of '{}'?",
                rrev.repr_notime()
            );
            if !confirm(&question) {
                continue;
            }
            if !opts.dry_run && !store.remove_recipe(&rrev) {
                debug!(reference = %rrev.repr_notime(), "not in the cache");
            }
            removed.add_refs([&rrev]);
            continue;
        }

        for (pref, _) in PackagesList::prefs(&rrev, bundle) {
            let question = format!("Remove the package '{}'?", pref.repr_notime());
            if !confirm(&question) {
                continue;
            }
            if !opts.dry_run && !store.remove_package(&pref) {
                debug!(reference = %pref.repr_notime(), "not in the cache");
            }
            removed.add_refs([&rrev]);
            removed.add_prefs(&rrev, [&pref]);
        }
    }

    if !opts.dry_run && !removed.is_empty() {
        store.save(&path)?;
        info!(revisions = removed.refs().len(), "removed from the local cache");
    }

    let mut results = MultiPackagesList::new();
    results.add(LOCAL_CACHE, removed);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PkgReference, RecipeReference};
    use crate::test_support::{package_list_json, zlib_store, StoreBuilder};
    use tempfile::TempDir;

    fn context(tmp: &TempDir, store: MetadataStore) -> BerthContext {
        let ctx = BerthContext::with_home(tmp.path());
        store.save(&ctx.metadata_path()).unwrap();
        ctx
    }

    fn pattern(text: &str) -> RemoveOptions {
        RemoveOptions {
            pattern: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn reload(ctx: &BerthContext) -> MetadataStore {
        MetadataStore::load(&ctx.metadata_path()).unwrap()
    }

    fn rref(text: &str) -> RecipeReference {
        RecipeReference::parse(text).unwrap()
    }

    #[test]
    fn test_remove_recipe_revisions() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, zlib_store());

        let results = remove(&ctx, &pattern("zlib/1.2.13"), &mut yes).unwrap();
        let removed = results.get(LOCAL_CACHE).unwrap();
        let revisions: Vec<String> = removed.refs().iter().map(|(r, _)| r.repr_notime()).collect();
        assert_eq!(
            revisions,
            vec!["zlib/1.2.13#r1", "zlib/1.2.13#r2", "zlib/1.2.13#r3"]
        );

        let store = reload(&ctx);
        assert!(store.get_recipe_revisions_references(&rref("zlib/1.2.13")).is_empty());
        assert!(store.get_package_references(&rref("zlib/1.2.13#r2")).is_empty());
        assert_eq!(store.get_recipe_revisions_references(&rref("zlib/1.2.11")).len(), 1);
    }

    #[test]
    fn test_remove_packages_only() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, zlib_store());

        remove(&ctx, &pattern("zlib/1.2.13#r2:abc"), &mut yes).unwrap();

        let store = reload(&ctx);
        assert_eq!(store.get_recipe_revisions_references(&rref("zlib/1.2.13")).len(), 3);
        let left: Vec<String> = store
            .get_package_references(&rref("zlib/1.2.13#r2"))
            .iter()
            .map(|p| p.package_id().to_string())
            .collect();
        assert_eq!(left, vec!["def"]);
    }

    #[test]
    fn test_remove_with_query() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, zlib_store());

        let opts = RemoveOptions {
            package_query: Some("arch=armv8".to_string()),
            ..pattern("zlib/*:*")
        };
        remove(&ctx, &opts, &mut yes).unwrap();

        let store = reload(&ctx);
        let pref = PkgReference::new(rref("zlib/1.2.13#r2"), "def");
        assert!(store.get_latest_package_reference(&pref).is_none());
        assert_eq!(store.package_records().len(), 4);
    }

    #[test]
    fn test_query_needs_package_pattern() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, zlib_store());

        let opts = RemoveOptions {
            package_query: Some("os=Linux".to_string()),
            ..pattern("zlib/*")
        };
        let err = remove(&ctx, &opts, &mut yes).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SelectError>(),
            Some(SelectError::InvalidQueryCombination(
                QueryConflict::PackageQueryWithoutPackages
            ))
        ));
    }

    #[test]
    fn test_dry_run_leaves_store() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, zlib_store());

        let opts = RemoveOptions {
            dry_run: true,
            ..pattern("zlib/*")
        };
        let results = remove(&ctx, &opts, &mut yes).unwrap();
        assert_eq!(results.get(LOCAL_CACHE).unwrap().refs().len(), 4);
        assert_eq!(reload(&ctx), zlib_store());
    }

    #[test]
    fn test_declined_entries_stay() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, zlib_store());

        let mut asked = Vec::new();
        let mut only_r1 = |question: &str| {
            asked.push(question.to_string());
            question.contains("#r1'")
        };
        let results = remove(&ctx, &pattern("zlib/1.2.13"), &mut only_r1).unwrap();

        assert_eq!(asked.len(), 3);
        assert_eq!(results.get(LOCAL_CACHE).unwrap().refs().len(), 1);
        assert_eq!(
            reload(&ctx).get_recipe_revisions_references(&rref("zlib/1.2.13")).len(),
            2
        );
    }

    #[test]
    fn test_remove_from_list_file() {
        let tmp = TempDir::new().unwrap();
        let store = StoreBuilder::new()
            .recipe("zlib/1.2.13#r1%10")
            .recipe("zlib/1.2.13#r2%20")
            .package("zlib/1.2.13#r1:abc#p1%11", &[])
            .package("zlib/1.2.13#r1:abc#p2%12", &[])
            .build();
        let ctx = context(&tmp, store);
        let list_path = tmp.path().join("pkglist.json");
        std::fs::write(&list_path, package_list_json()).unwrap();

        let opts = RemoveOptions {
            list_file: Some(list_path),
            ..Default::default()
        };
        remove(&ctx, &opts, &mut yes).unwrap();

        let store = reload(&ctx);
        // r2 had no packages listed: the whole revision goes.
        let revisions = store.get_recipe_revisions_references(&rref("zlib/1.2.13"));
        assert_eq!(revisions.len(), 1);
        // Only p1 was listed for abc.
        let pref = PkgReference::new(rref("zlib/1.2.13#r1"), "abc");
        let prevs = store.get_package_revisions_references(&pref, false);
        assert_eq!(prevs.len(), 1);
        assert_eq!(prevs[0].revision(), Some("p2"));
    }

    #[test]
    fn test_list_file_for_other_source_removes_nothing() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, zlib_store());
        let list_path = tmp.path().join("pkglist.json");
        std::fs::write(&list_path, r#"{"center": {"zlib/1.2.13": {}}}"#).unwrap();

        let opts = RemoveOptions {
            list_file: Some(list_path),
            ..Default::default()
        };
        let results = remove(&ctx, &opts, &mut yes).unwrap();
        assert!(results.get(LOCAL_CACHE).unwrap().is_empty());
        assert_eq!(reload(&ctx), zlib_store());
    }

    #[test]
    fn test_invalid_argument_combinations() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, zlib_store());

        let err = remove(&ctx, &RemoveOptions::default(), &mut yes).unwrap_err();
        assert_eq!(err.to_string(), "missing pattern or package list file");

        let opts = RemoveOptions {
            list_file: Some(PathBuf::from("list.json")),
            ..pattern("zlib/*")
        };
        let err = remove(&ctx, &opts, &mut yes).unwrap_err();
        assert!(err.to_string().contains("both the pattern and the package list file"));

        let opts = RemoveOptions {
            list_file: Some(PathBuf::from("list.json")),
            package_query: Some("os=Linux".to_string()),
            ..Default::default()
        };
        let err = remove(&ctx, &opts, &mut yes).unwrap_err();
        assert!(err.to_string().contains("package-query"));
    }

    #[test]
    fn test_remote_removal_is_rejected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[[remotes]]\nname = \"center\"\nurl = \"center.json\"\n",
        )
        .unwrap();
        let ctx = context(&tmp, zlib_store());

        let opts = RemoveOptions {
            remote: Some("center".to_string()),
            ..pattern("zlib/*")
        };
        let err = remove(&ctx, &opts, &mut yes).unwrap_err();
        assert!(err.to_string().contains("read-only"));
    }
}
