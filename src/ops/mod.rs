//! High-level operations.
//!
//! This module contains the implementation of berth commands.

pub mod cache_clean;
pub mod cache_path;
pub mod list;
pub mod pkglist;
pub mod remove;

use crate::core::ReferenceError;
use crate::select::{ListPattern, PatternDefaults};

pub use cache_clean::{cache_clean, CleanOptions};
pub use cache_path::{cache_path, CacheFolder};
pub use list::{list, ListOptions};
pub use pkglist::merge_lists;
pub use remove::{remove, RemoveOptions};

/// Parse a command-line selection pattern.
///
/// A bare recipe name (`zlib`) selects every version of it (`zlib/*`).
pub fn selection_pattern(
    expression: &str,
    defaults: PatternDefaults,
) -> Result<ListPattern, ReferenceError> {
    let (recipe, rest) = match expression.find([':', '#']) {
        Some(at) => expression.split_at(at),
        None => (expression, ""),
    };
    if recipe.contains(['/', '*', '@']) || recipe.is_empty() {
        return ListPattern::parse(expression, defaults);
    }
    ListPattern::parse(&format!("{}/*{}", recipe, rest), defaults)
}
