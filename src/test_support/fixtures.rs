//! Test fixtures for common selection scenarios.

use crate::sources::MetadataStore;
use crate::test_support::StoreBuilder;

/// A small cache with three zlib versions' worth of revisions.
///
/// - `bzip2/1.0.8#b1`
/// - `zlib/1.2.11#o1` with package `abc`
/// - `zlib/1.2.13` revisions `r1`, `r2`, `r3` (recorded out of order);
///   `r2` has packages `abc` (`p1`, `p2`) and `def` (`q1`), `r3` has `abc`
pub fn zlib_store() -> MetadataStore {
    StoreBuilder::new()
        .recipe("bzip2/1.0.8#b1%1")
        .recipe("zlib/1.2.11#o1%5")
        .package("zlib/1.2.11#o1:abc#x1%6", &[("os", "Linux"), ("arch", "x86_64")])
        .recipe("zlib/1.2.13#r3%30")
        .recipe("zlib/1.2.13#r1%10")
        .recipe("zlib/1.2.13#r2%20")
        .package("zlib/1.2.13#r2:abc#p1%21", &[("os", "Windows"), ("arch", "x86_64")])
        .package("zlib/1.2.13#r2:abc#p2%22", &[("os", "Linux"), ("arch", "x86_64")])
        .package("zlib/1.2.13#r2:def#q1%23", &[("os", "Macos"), ("arch", "armv8")])
        .package("zlib/1.2.13#r3:abc#p9%31", &[("os", "Linux"), ("arch", "x86_64")])
        .build()
}

/// JSON of a package list file with one local cache entry.
pub fn package_list_json() -> &'static str {
    r#"{
  "Local Cache": {
    "zlib/1.2.13": {
      "revisions": {
        "r1": {
          "timestamp": 10,
          "packages": {
            "abc": { "revisions": { "p1": { "timestamp": 11 } } }
          }
        },
        "r2": { "timestamp": 20 }
      }
    }
  }
}"#
}
