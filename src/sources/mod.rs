//! Reference sources.
//!
//! The selection engine reads from a [`PackageBackend`]: either the local
//! cache ([`CacheBackend`] over the [`MetadataStore`]) or a remote index
//! ([`RemoteBackend`] over any [`RemoteIndex`], usually an [`IndexRemote`]).

pub mod backend;
pub mod index;
pub mod metadata;
pub mod remote;

pub use backend::{CacheBackend, PackageBackend};
pub use index::IndexRemote;
pub use metadata::MetadataStore;
pub use remote::{RemoteBackend, RemoteIndex};
