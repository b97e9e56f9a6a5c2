//! Recipe references - WHICH recipe (name/version@user/channel#revision).
//!
//! A RecipeReference is an immutable value. Revisions and timestamps are
//! attached by building a new value, never by mutating one in place.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Version;

/// Reserved revision marker meaning "resolve to the current latest revision".
pub const LATEST: &str = "latest";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_+.-]*$").unwrap());
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_+.-]+$").unwrap());
static USER_CHANNEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_+.-]*$").unwrap());
static REVISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap());

/// Error parsing a reference or pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("`{input}` is not a valid {kind}: {reason}")]
    Malformed {
        input: String,
        kind: &'static str,
        reason: String,
    },
}

impl ReferenceError {
    pub(crate) fn malformed(
        input: impl Into<String>,
        kind: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        ReferenceError::Malformed {
            input: input.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Check a revision or package id token.
pub(crate) fn validate_token(
    input: &str,
    kind: &'static str,
    what: &str,
    token: &str,
) -> Result<(), ReferenceError> {
    if REVISION_RE.is_match(token) {
        Ok(())
    } else {
        Err(ReferenceError::malformed(
            input,
            kind,
            format!("invalid {} `{}`", what, token),
        ))
    }
}

/// Parse the `%timestamp` suffix of a revision.
pub(crate) fn parse_timestamp(
    input: &str,
    kind: &'static str,
    raw: &str,
) -> Result<i64, ReferenceError> {
    raw.parse::<i64>().map_err(|_| {
        ReferenceError::malformed(
            input,
            kind,
            format!("timestamp `{}` is not an integer number of seconds", raw),
        )
    })
}

/// Split `revision[%timestamp]` into its parts.
pub(crate) fn split_revision(
    input: &str,
    kind: &'static str,
    what: &str,
    text: &str,
) -> Result<(String, Option<i64>), ReferenceError> {
    let (revision, timestamp) = match text.split_once('%') {
        Some((rev, ts)) => (rev, Some(parse_timestamp(input, kind, ts)?)),
        None => (text, None),
    };
    validate_token(input, kind, what, revision)?;
    Ok((revision.to_string(), timestamp))
}

/// Render an epoch timestamp as ISO-8601 UTC.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => timestamp.to_string(),
    }
}

/// A reference to a recipe, optionally pinned to a revision.
#[derive(Clone)]
pub struct RecipeReference {
    name: String,
    version: Version,
    user: Option<String>,
    channel: Option<String>,
    revision: Option<String>,
    timestamp: Option<i64>,
}

impl RecipeReference {
    const KIND: &'static str = "recipe reference";

    /// Create a reference without a revision.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        user: Option<String>,
        channel: Option<String>,
    ) -> Self {
        RecipeReference {
            name: name.into(),
            version: Version::new(version.into()),
            user,
            channel,
            revision: None,
            timestamp: None,
        }
    }

    /// Parse `name/version[@user[/channel]][#revision[%timestamp]]`.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let malformed = |reason: &str| ReferenceError::malformed(text, Self::KIND, reason);

        let (rest, revision, timestamp) = match text.split_once('#') {
            Some((rest, rev)) => {
                let (rev, ts) = split_revision(text, Self::KIND, "revision", rev)?;
                (rest, Some(rev), ts)
            }
            None => {
                if text.contains('%') {
                    return Err(malformed("a timestamp requires a revision"));
                }
                (text, None, None)
            }
        };

        let (name_version, user, channel) = match rest.split_once('@') {
            Some((nv, uc)) => match uc.split_once('/') {
                Some((u, c)) => (nv, Some(u), Some(c)),
                None => (nv, Some(uc), None),
            },
            None => (rest, None, None),
        };

        let (name, version) = name_version
            .split_once('/')
            .ok_or_else(|| malformed("expected the form name/version[@user[/channel]]"))?;

        if name.is_empty() || version.is_empty() {
            return Err(malformed("name and version are required"));
        }
        if !NAME_RE.is_match(name) {
            return Err(malformed(&format!("invalid name `{}`", name)));
        }
        if !VERSION_RE.is_match(version) {
            return Err(malformed(&format!("invalid version `{}`", version)));
        }
        for part in [user, channel].into_iter().flatten() {
            if !USER_CHANNEL_RE.is_match(part) {
                return Err(malformed(&format!("invalid user/channel `{}`", part)));
            }
        }

        Ok(RecipeReference {
            name: name.to_string(),
            version: Version::new(version),
            user: user.map(str::to_string),
            channel: channel.map(str::to_string),
            revision,
            timestamp,
        })
    }

    /// Get the recipe name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the recipe version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Get the user, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Get the channel, if any.
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Get the recipe revision, if assigned.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Get the revision timestamp (epoch seconds), if known.
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Whether the revision is the reserved `latest` marker.
    pub fn is_latest_marker(&self) -> bool {
        self.revision.as_deref() == Some(LATEST)
    }

    /// Copy of this reference with the given revision (and no timestamp).
    pub fn with_revision(&self, revision: Option<impl Into<String>>) -> Self {
        RecipeReference {
            revision: revision.map(Into::into),
            timestamp: None,
            ..self.clone()
        }
    }

    /// Copy of this reference with the given timestamp.
    pub fn with_timestamp(&self, timestamp: Option<i64>) -> Self {
        RecipeReference {
            timestamp,
            ..self.clone()
        }
    }

    /// Copy of this reference stripped of revision and timestamp.
    pub fn without_revision(&self) -> Self {
        self.with_revision(None::<String>)
    }

    /// Full form including revision but not timestamp.
    pub fn repr_notime(&self) -> String {
        match &self.revision {
            Some(rev) => format!("{}#{}", self, rev),
            None => self.to_string(),
        }
    }

    /// Full form including revision and timestamp.
    pub fn repr(&self) -> String {
        match (&self.revision, self.timestamp) {
            (Some(_), Some(ts)) => format!("{}%{}", self.repr_notime(), ts),
            _ => self.repr_notime(),
        }
    }

    /// Revision form with a human-readable timestamp: `pkg/0.1#r1(1970-01-01T00:02:03Z)`.
    pub fn format_time(&self) -> String {
        match self.timestamp {
            Some(ts) => format!("{}({})", self.repr_notime(), format_timestamp(ts)),
            None => self.repr_notime(),
        }
    }

    /// Compare ignoring revisions when either side has none.
    ///
    /// Only meaningful before resolution, when a reference may still lack a
    /// revision.
    pub fn matches_loose(&self, other: &RecipeReference) -> bool {
        let same_recipe = self.name == other.name
            && self.version == other.version
            && self.user == other.user
            && self.channel == other.channel;
        match (&self.revision, &other.revision) {
            (Some(a), Some(b)) => same_recipe && a == b,
            _ => same_recipe,
        }
    }

    /// Same recipe, ignoring revisions entirely.
    pub fn same_recipe(&self, other: &RecipeReference) -> bool {
        self.without_revision() == other.without_revision()
    }
}

impl PartialEq for RecipeReference {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.user == other.user
            && self.channel == other.channel
            && self.revision == other.revision
    }
}

impl Eq for RecipeReference {}

impl Hash for RecipeReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.user.hash(state);
        self.channel.hash(state);
        self.revision.hash(state);
    }
}

impl PartialOrd for RecipeReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecipeReference {
    /// Older versions first, then alphabetical.
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.user.cmp(&other.user))
            .then_with(|| self.channel.cmp(&other.channel))
            .then_with(|| self.revision.cmp(&other.revision))
    }
}

impl fmt::Display for RecipeReference {
    /// Short form without revision: `name/version[@user[/channel]]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let Some(user) = &self.user {
            write!(f, "@{}", user)?;
            if let Some(channel) = &self.channel {
                write!(f, "/{}", channel)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RecipeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecipeReference({})", self.repr())
    }
}

impl FromStr for RecipeReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecipeReference::parse(s)
    }
}

impl Serialize for RecipeReference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.repr())
    }
}

impl<'de> Deserialize<'de> for RecipeReference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecipeReference::parse(&s).map_err(serde::de::Error::custom)
    }
}
