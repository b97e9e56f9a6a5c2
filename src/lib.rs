//! berth - reference selection over a package cache
//!
//! This crate provides the library behind the `berth` CLI: recipe and
//! package references, selection patterns, the selection engine over the
//! local cache or a remote index, and the result bundles it produces.

pub mod core;
pub mod ops;
pub mod select;
pub mod sources;
pub mod util;

/// Test utilities and mocks for berth unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides metadata store builders and remote index
/// mocks.
#[cfg(test)]
pub mod test_support;

pub use core::{
    MultiPackagesList, PackageConfiguration, PackagesList, PkgReference, RecipeReference, Version,
};

pub use select::{ListApi, ListPattern, PatternDefaults, SelectError};
pub use util::context::BerthContext;
