//! Implementation of `berth cache path`.
//!
//! Layout under the cache folder:
//!
//! ```text
//! <cache>/<name><hash>/e     export
//! <cache>/<name><hash>/es    export_source
//! <cache>/<name><hash>/s     source
//! <cache>/<name><hash>/d     download
//! <cache>/b/<name><hash>/p   package
//! <cache>/b/<name><hash>/b   build
//! <cache>/b/<name><hash>/d   download
//! ```
//!
//! `<hash>` is the first 16 hex digits of the SHA-256 of the reference
//! (with revisions, without timestamps).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use sha2::{Digest, Sha256};

use crate::core::{PkgReference, RecipeReference};
use crate::sources::MetadataStore;
use crate::util::context::BerthContext;

/// A folder of a recipe or package layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFolder {
    Export,
    ExportSource,
    Source,
    Package,
    Build,
}

impl CacheFolder {
    fn for_recipe(self) -> Option<&'static str> {
        match self {
            CacheFolder::Export => Some("e"),
            CacheFolder::ExportSource => Some("es"),
            CacheFolder::Source => Some("s"),
            CacheFolder::Package | CacheFolder::Build => None,
        }
    }

    fn for_package(self) -> Option<&'static str> {
        match self {
            CacheFolder::Package => Some("p"),
            CacheFolder::Build => Some("b"),
            _ => None,
        }
    }
}

impl fmt::Display for CacheFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CacheFolder::Export => "export",
            CacheFolder::ExportSource => "export_source",
            CacheFolder::Source => "source",
            CacheFolder::Package => "package",
            CacheFolder::Build => "build",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CacheFolder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "export" => Ok(CacheFolder::Export),
            "export_source" => Ok(CacheFolder::ExportSource),
            "source" => Ok(CacheFolder::Source),
            "package" => Ok(CacheFolder::Package),
            "build" => Ok(CacheFolder::Build),
            _ => bail!("unknown cache folder '{}'", s),
        }
    }
}

/// Short, stable folder name for a reference.
fn short_path(name: &str, reference: &str) -> String {
    let digest = Sha256::digest(reference.as_bytes());
    let hash = hex::encode(digest);
    format!("{}{}", name, &hash[..16])
}

/// Layout folder of a recipe revision.
pub(crate) fn recipe_layout(ctx: &BerthContext, rrev: &RecipeReference) -> PathBuf {
    ctx.cache_folder().join(short_path(rrev.name(), &rrev.repr_notime()))
}

/// Layout folder of a package revision.
pub(crate) fn package_layout(ctx: &BerthContext, pref: &PkgReference) -> PathBuf {
    ctx.cache_folder()
        .join("b")
        .join(short_path(pref.reference().name(), &pref.repr_notime()))
}

fn resolve_recipe(store: &MetadataStore, reference: RecipeReference) -> Result<RecipeReference> {
    if reference.revision().is_some() && !reference.is_latest_marker() {
        return Ok(reference);
    }
    let reference = reference.without_revision();
    store
        .get_latest_recipe_reference(&reference)
        .ok_or_else(|| anyhow!("Recipe '{}' not found in the local cache", reference))
}

fn resolve_package(store: &MetadataStore, pref: PkgReference) -> Result<PkgReference> {
    let rrev = resolve_recipe(store, pref.reference().clone())?;
    let pref = pref.with_reference(rrev);
    if pref.revision().is_some_and(|rev| rev != crate::core::LATEST) {
        return Ok(pref);
    }
    let pref = pref.with_revision(None::<String>);
    store
        .get_latest_package_reference(&pref)
        .ok_or_else(|| anyhow!("Binary package '{}' not found in the local cache", pref.repr_notime()))
}

/// Path of a cache folder for a recipe or package reference.
///
/// The text is tried as a package reference first. Missing revisions are
/// resolved to the latest ones in the cache.
pub fn cache_path(
    ctx: &BerthContext,
    reference: &str,
    folder: Option<CacheFolder>,
) -> Result<PathBuf> {
    let store = MetadataStore::load(&ctx.metadata_path())
        .with_context(|| format!("failed to read {}", ctx.metadata_path().display()))?;

    if let Ok(pref) = PkgReference::parse(reference) {
        let folder = folder.unwrap_or(CacheFolder::Package);
        let Some(sub) = folder.for_package() else {
            bail!("'--folder {}' requires a recipe reference", folder);
        };
        let pref = resolve_package(&store, pref)?;
        tracing::debug!(reference = %pref.repr_notime(), "package layout");
        return Ok(package_layout(ctx, &pref).join(sub));
    }

    let rref = RecipeReference::parse(reference)?;
    let folder = folder.unwrap_or(CacheFolder::Export);
    let Some(sub) = folder.for_recipe() else {
        bail!("'--folder {}' requires a valid package reference", folder);
    };
    let rref = resolve_recipe(&store, rref)?;
    tracing::debug!(reference = %rref.repr_notime(), "recipe layout");
    Ok(recipe_layout(ctx, &rref).join(sub))
}
