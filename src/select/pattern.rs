//! Selection patterns over the recipe/package hierarchy.
//!
//! `name/version[@user[/channel]][#rrev][:package_id[#prev]]`, where any
//! segment may contain `*` wildcards.

use glob::{MatchOptions, Pattern};

use crate::core::recipe_ref::{ReferenceError, LATEST};
use crate::core::{PkgReference, RecipeReference};
use crate::select::errors::SelectError;

/// Values used for segments the expression leaves out.
///
/// `list` leaves everything unset, so a bare `zlib/1.2` lists recipe
/// references only. `remove` defaults both revisions to `*`.
#[derive(Debug, Clone, Default)]
pub struct PatternDefaults {
    pub rrev: Option<String>,
    pub package_id: Option<String>,
    pub prev: Option<String>,
    pub only_recipe: bool,
}

impl PatternDefaults {
    /// Defaults that select every revision.
    pub fn all_revisions() -> Self {
        PatternDefaults {
            rrev: Some("*".to_string()),
            package_id: None,
            prev: Some("*".to_string()),
            only_recipe: false,
        }
    }

    pub fn with_package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }

    pub fn with_only_recipe(mut self, only_recipe: bool) -> Self {
        self.only_recipe = only_recipe;
        self
    }
}

/// Split at the first `sep`; an empty right-hand side falls back to `default`.
fn split(s: Option<&str>, sep: char, default: Option<&str>) -> (Option<String>, Option<String>) {
    let default = default.map(str::to_string);
    match s {
        None | Some("") => (None, default),
        Some(s) => match s.split_once(sep) {
            Some((left, "")) => (Some(left.to_string()), default),
            Some((left, right)) => (Some(left.to_string()), Some(right.to_string())),
            None => (Some(s.to_string()), default),
        },
    }
}

fn has_wildcard(s: Option<&str>) -> bool {
    s.is_some_and(|s| s.contains('*'))
}

/// fnmatch-style glob where `*` also crosses `/` and `@`.
pub(crate) fn glob_match(pattern: &str, candidate: &str, case_sensitive: bool) -> bool {
    let options = MatchOptions {
        case_sensitive,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    match Pattern::new(pattern) {
        Ok(p) => p.matches_with(candidate, options),
        Err(_) => pattern == candidate,
    }
}

/// A parsed selection pattern.
#[derive(Debug, Clone)]
pub struct ListPattern {
    raw: String,
    reference: String,
    name: String,
    version: Option<String>,
    user: Option<String>,
    channel: Option<String>,
    rrev: Option<String>,
    package_id: Option<String>,
    prev: Option<String>,
    only_recipe: bool,
}

impl ListPattern {
    const KIND: &'static str = "selection pattern";

    /// Parse a pattern with no defaults.
    pub fn new(expression: &str) -> Result<Self, ReferenceError> {
        Self::parse(expression, PatternDefaults::default())
    }

    /// Parse a pattern, filling omitted segments from `defaults`.
    pub fn parse(expression: &str, defaults: PatternDefaults) -> Result<Self, ReferenceError> {
        let malformed = |reason: &str| ReferenceError::malformed(expression, Self::KIND, reason);

        if expression.trim().is_empty() {
            return Err(malformed("the pattern is empty"));
        }
        if expression.chars().any(char::is_whitespace) {
            return Err(malformed("whitespace is not allowed"));
        }

        let (recipe, package) = split(Some(expression), ':', None);
        let (reference, rrev) = split(recipe.as_deref(), '#', defaults.rrev.as_deref());
        let (name_version, user_channel) = split(reference.as_deref(), '@', None);
        let (name, version) = split(name_version.as_deref(), '/', None);
        let (user, channel) = split(user_channel.as_deref(), '/', None);
        let (mut package_id, prev) = split(package.as_deref(), '#', defaults.prev.as_deref());

        let name = name.ok_or_else(|| malformed("a name is required"))?;
        let reference = reference.unwrap_or_default();

        if defaults.only_recipe {
            if package_id.is_some() {
                return Err(malformed("a package_id cannot be given for a recipe-only selection"));
            }
        } else if package_id.is_none() {
            package_id = defaults.package_id;
        }

        // Revisions without a package segment keep their default only when
        // the package scope was requested.
        let prev = if package_id.is_some() { prev } else { None };

        Ok(ListPattern {
            raw: expression.to_string(),
            reference,
            name,
            version,
            user,
            channel,
            rrev,
            package_id,
            prev,
            only_recipe: defaults.only_recipe,
        })
    }

    /// The pattern as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The recipe part: `name/version[@user[/channel]]`.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn rrev(&self) -> Option<&str> {
        self.rrev.as_deref()
    }

    pub fn package_id(&self) -> Option<&str> {
        self.package_id.as_deref()
    }

    pub fn prev(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    /// True when package ids were ruled out at parse time.
    pub fn only_recipe(&self) -> bool {
        self.only_recipe
    }

    /// True when recipe revisions resolve to the latest one.
    pub fn is_latest_rrev(&self) -> bool {
        self.rrev.as_deref().is_none_or(|r| r == LATEST)
    }

    /// True when package revisions resolve to the latest one.
    pub fn is_latest_prev(&self) -> bool {
        self.prev.as_deref().is_none_or(|p| p == LATEST)
    }

    /// True when no populated segment contains a wildcard.
    pub fn is_exact(&self) -> bool {
        ![
            Some(self.reference.as_str()),
            self.rrev.as_deref(),
            self.package_id.as_deref(),
            self.prev.as_deref(),
        ]
        .into_iter()
        .any(has_wildcard)
    }

    /// Whether the package id segment is a concrete id.
    pub fn has_exact_package_id(&self) -> bool {
        self.package_id.as_deref().is_some_and(|id| !id.contains('*'))
    }

    /// The recipe pattern to search the backend with, or `None` when the
    /// reference is concrete enough to be built directly.
    pub fn search_ref(&self) -> Option<&str> {
        let bare = self.package_id.is_none() && self.rrev.is_none();
        if self.reference.contains('*') || self.version.is_none() || bare {
            Some(&self.reference)
        } else {
            None
        }
    }

    /// Build the single concrete reference named by an exact pattern.
    pub fn recipe_reference(&self) -> Result<RecipeReference, ReferenceError> {
        RecipeReference::parse(&self.reference)
    }

    /// Whether a recipe reference matches the recipe part of the pattern.
    pub fn matches_reference(&self, reference: &RecipeReference) -> bool {
        glob_match(&self.reference, &reference.to_string(), false)
    }

    /// Keep only candidates matching the recipe part of the pattern.
    pub fn filter_refs(&self, refs: Vec<RecipeReference>) -> Vec<RecipeReference> {
        refs.into_iter()
            .filter(|r| self.matches_reference(r))
            .collect()
    }

    /// Fail when a concrete recipe pattern found no candidates.
    pub fn check_refs(&self, refs: &[RecipeReference]) -> Result<(), SelectError> {
        if refs.is_empty() && !self.reference.is_empty() && !self.reference.contains('*') {
            return Err(SelectError::ReferenceNotFound(format!(
                "Recipe '{}' not found",
                self.reference
            )));
        }
        Ok(())
    }

    /// Keep recipe revisions matching the rrev segment.
    pub fn filter_rrevs(
        &self,
        rrevs: Vec<RecipeReference>,
    ) -> Result<Vec<RecipeReference>, SelectError> {
        let rrev = self.rrev.as_deref().unwrap_or("*");
        let rrevs: Vec<_> = rrevs
            .into_iter()
            .filter(|r| r.revision().is_some_and(|rev| glob_match(rrev, rev, true)))
            .collect();

        let chain = format!("{}#{}", self.reference, rrev);
        if rrevs.is_empty() && !chain.contains('*') {
            return Err(SelectError::ReferenceNotFound(format!(
                "Recipe revision '{}' not found",
                chain
            )));
        }
        Ok(rrevs)
    }

    /// Keep packages whose id matches the package_id segment.
    pub fn filter_prefs<'a, I>(&self, prefs: I) -> Result<Vec<PkgReference>, SelectError>
    where
        I: IntoIterator<Item = &'a PkgReference>,
    {
        let package_id = self.package_id.as_deref().unwrap_or("*");
        let prefs: Vec<_> = prefs
            .into_iter()
            .filter(|p| glob_match(package_id, p.package_id(), true))
            .cloned()
            .collect();

        let chain = format!(
            "{}#{}:{}",
            self.reference,
            self.rrev.as_deref().unwrap_or(""),
            package_id
        );
        if prefs.is_empty() && !chain.contains('*') {
            return Err(SelectError::BinaryNotFound(format!(
                "Package ID '{}' not found",
                self.raw
            )));
        }
        Ok(prefs)
    }

    /// Keep package revisions matching the prev segment.
    pub fn filter_prevs(&self, prevs: Vec<PkgReference>) -> Result<Vec<PkgReference>, SelectError> {
        let prev = self.prev.as_deref().unwrap_or("*");
        let prevs: Vec<_> = prevs
            .into_iter()
            .filter(|p| p.revision().is_some_and(|rev| glob_match(prev, rev, true)))
            .collect();

        let chain = format!(
            "{}#{}:{}#{}",
            self.reference,
            self.rrev.as_deref().unwrap_or(""),
            self.package_id.as_deref().unwrap_or(""),
            prev
        );
        if prevs.is_empty() && !chain.contains('*') {
            return Err(SelectError::BinaryNotFound(format!(
                "Package revision '{}' not found",
                self.raw
            )));
        }
        Ok(prevs)
    }
}
