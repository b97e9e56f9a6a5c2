//! Static remote indexes.
//!
//! An index is a single JSON document with the same schema as the cache
//! metadata store, published at a path, a `file://` URL or an
//! `http(s)://` URL. It is fetched once when the remote is opened.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use url::Url;

use crate::core::query::PackageConfigurations;
use crate::core::{PkgReference, RecipeReference};
use crate::sources::metadata::MetadataStore;
use crate::sources::remote::RemoteIndex;
use crate::util::context::RemoteEntry;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where an index document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLocation {
    Http(Url),
    File(PathBuf),
}

impl IndexLocation {
    /// Interpret a configured remote URL. Relative paths resolve against
    /// `base`.
    pub fn parse(location: &str, base: &Path) -> Result<Self> {
        if let Ok(url) = Url::parse(location) {
            match url.scheme() {
                "http" | "https" => return Ok(IndexLocation::Http(url)),
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|_| anyhow!("invalid file URL `{}`", location))?;
                    return Ok(IndexLocation::File(path));
                }
                // Windows drive letters parse as a one-letter scheme.
                scheme if scheme.len() > 1 => {
                    bail!("unsupported remote URL scheme `{}` in `{}`", scheme, location)
                }
                _ => {}
            }
        }

        let path = Path::new(location);
        Ok(IndexLocation::File(if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }))
    }

    fn fetch(&self) -> Result<String> {
        match self {
            IndexLocation::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read remote index: {}", path.display())),
            IndexLocation::Http(url) => {
                tracing::debug!("fetching remote index {}", url);
                let client = reqwest::blocking::Client::builder()
                    .timeout(FETCH_TIMEOUT)
                    .build()
                    .context("failed to create HTTP client")?;
                let response = client
                    .get(url.clone())
                    .send()
                    .with_context(|| format!("failed to fetch remote index from {}", url))?;

                if !response.status().is_success() {
                    bail!(
                        "failed to fetch remote index from {}: HTTP {}",
                        url,
                        response.status()
                    );
                }

                response
                    .text()
                    .with_context(|| format!("failed to read remote index from {}", url))
            }
        }
    }
}

/// A remote backed by a static index document.
#[derive(Debug, Clone)]
pub struct IndexRemote {
    name: String,
    index: MetadataStore,
}

impl IndexRemote {
    /// Fetch and parse the index of a configured remote.
    pub fn open(entry: &RemoteEntry, base: &Path) -> Result<Self> {
        let location = IndexLocation::parse(&entry.url, base)?;
        let text = location.fetch()?;
        let index: MetadataStore = serde_json::from_str(&text)
            .with_context(|| format!("remote '{}' returned an invalid index", entry.name))?;

        tracing::debug!(
            remote = %entry.name,
            recipes = index.recipe_records().len(),
            packages = index.package_records().len(),
            "loaded remote index"
        );

        Ok(IndexRemote {
            name: entry.name.clone(),
            index,
        })
    }

    /// A remote over an already loaded index.
    pub fn from_store(name: impl Into<String>, index: MetadataStore) -> Self {
        IndexRemote {
            name: name.into(),
            index,
        }
    }
}

impl RemoteIndex for IndexRemote {
    fn name(&self) -> &str {
        &self.name
    }

    fn search_recipes(&self, pattern: &str) -> Result<Vec<RecipeReference>> {
        Ok(self.index.search_recipes(pattern))
    }

    fn get_latest_recipe_reference(
        &self,
        reference: &RecipeReference,
    ) -> Result<Option<RecipeReference>> {
        Ok(self.index.get_latest_recipe_reference(reference))
    }

    fn get_recipe_revisions_references(
        &self,
        reference: &RecipeReference,
    ) -> Result<Vec<RecipeReference>> {
        Ok(self.index.get_recipe_revisions_references(reference))
    }

    fn get_latest_package_reference(&self, pref: &PkgReference) -> Result<Option<PkgReference>> {
        Ok(self.index.get_latest_package_reference(pref))
    }

    fn get_package_revisions_references(&self, pref: &PkgReference) -> Result<Vec<PkgReference>> {
        Ok(self.index.get_package_revisions_references(pref, false))
    }

    fn search_packages(&self, rrev: &RecipeReference) -> Result<PackageConfigurations> {
        let prefs = self.index.get_package_references(rrev);
        Ok(self.index.get_packages_binary_info(&prefs))
    }
}
