//! Core data structures.
//!
//! - References: recipe references and package references, with their
//!   parsing rules, canonical forms and ordering
//! - Versions with numeric-aware ordering
//! - Binary configurations and the query language over them
//! - Result bundles produced by selections

pub mod package_list;
pub mod package_ref;
pub mod query;
pub mod recipe_ref;
pub mod version;

pub use package_list::{MultiPackagesList, PackagesList};
pub use package_ref::PkgReference;
pub use query::{PackageConfiguration, QueryError};
pub use recipe_ref::{RecipeReference, ReferenceError, LATEST};
pub use version::Version;
