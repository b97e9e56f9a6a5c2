//! Package references - WHICH binary of a recipe revision.
//!
//! `name/version[@user/channel]#rrev:package_id[#prev[%timestamp]]`

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::recipe_ref::{split_revision, validate_token, ReferenceError};
use crate::core::RecipeReference;

/// A reference to a package binary, scoped to one recipe revision.
#[derive(Clone)]
pub struct PkgReference {
    reference: RecipeReference,
    package_id: String,
    revision: Option<String>,
    timestamp: Option<i64>,
}

impl PkgReference {
    const KIND: &'static str = "package reference";

    /// Create a package reference without a package revision.
    pub fn new(reference: RecipeReference, package_id: impl Into<String>) -> Self {
        PkgReference {
            reference,
            package_id: package_id.into(),
            revision: None,
            timestamp: None,
        }
    }

    /// Parse a package reference. The `:` separator is mandatory, which is
    /// how a package reference is told apart from a recipe reference.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let (recipe, package) = text.split_once(':').ok_or_else(|| {
            ReferenceError::malformed(
                text,
                Self::KIND,
                "expected the form name/version[@user/channel][#rrev]:package_id[#prev]",
            )
        })?;

        let reference = RecipeReference::parse(recipe)?;

        let (package_id, revision, timestamp) = match package.split_once('#') {
            Some((id, rev)) => {
                let (rev, ts) = split_revision(text, Self::KIND, "package revision", rev)?;
                (id, Some(rev), ts)
            }
            None => {
                if package.contains('%') {
                    return Err(ReferenceError::malformed(
                        text,
                        Self::KIND,
                        "a timestamp requires a package revision",
                    ));
                }
                (package, None, None)
            }
        };
        validate_token(text, Self::KIND, "package id", package_id)?;

        Ok(PkgReference {
            reference,
            package_id: package_id.to_string(),
            revision,
            timestamp,
        })
    }

    /// Get the recipe reference this package belongs to.
    pub fn reference(&self) -> &RecipeReference {
        &self.reference
    }

    /// Get the package id.
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    /// Get the package revision, if assigned.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Get the package revision timestamp, if known.
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Copy with the given package revision (and no timestamp).
    pub fn with_revision(&self, revision: Option<impl Into<String>>) -> Self {
        PkgReference {
            revision: revision.map(Into::into),
            timestamp: None,
            ..self.clone()
        }
    }

    /// Copy with the given timestamp.
    pub fn with_timestamp(&self, timestamp: Option<i64>) -> Self {
        PkgReference {
            timestamp,
            ..self.clone()
        }
    }

    /// Copy pointing at another recipe revision.
    pub fn with_reference(&self, reference: RecipeReference) -> Self {
        PkgReference {
            reference,
            ..self.clone()
        }
    }

    /// Full form without timestamps: `ref#rrev:package_id#prev`.
    pub fn repr_notime(&self) -> String {
        let mut out = format!("{}:{}", self.reference.repr_notime(), self.package_id);
        if let Some(rev) = &self.revision {
            out.push('#');
            out.push_str(rev);
        }
        out
    }

    /// Full form including the package revision timestamp.
    pub fn repr(&self) -> String {
        match (&self.revision, self.timestamp) {
            (Some(_), Some(ts)) => format!("{}%{}", self.repr_notime(), ts),
            _ => self.repr_notime(),
        }
    }
}

impl PartialEq for PkgReference {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
            && self.package_id == other.package_id
            && self.revision == other.revision
    }
}

impl Eq for PkgReference {}

impl Hash for PkgReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
        self.package_id.hash(state);
        self.revision.hash(state);
    }
}

impl fmt::Display for PkgReference {
    /// Short form: `name/version[@user/channel]:package_id`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.reference, self.package_id)
    }
}

impl fmt::Debug for PkgReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PkgReference({})", self.repr())
    }
}

impl FromStr for PkgReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PkgReference::parse(s)
    }
}

impl Serialize for PkgReference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.repr())
    }
}

impl<'de> Deserialize<'de> for PkgReference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PkgReference::parse(&s).map_err(serde::de::Error::custom)
    }
}
