//! Recipe versions - human-assigned, ordered with numeric awareness.
//!
//! Versions are free-form strings. They compare item by item, so `1.3 < 1.22`
//! even though the strings compare the other way around.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One dot-separated component of a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum VersionItem {
    Numeric(u64),
    Text(String),
}

impl VersionItem {
    fn parse(s: &str) -> Self {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse() {
                return VersionItem::Numeric(n);
            }
        }
        VersionItem::Text(s.to_string())
    }

    fn is_zero(&self) -> bool {
        matches!(self, VersionItem::Numeric(0))
    }
}

impl PartialOrd for VersionItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionItem {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (VersionItem::Numeric(a), VersionItem::Numeric(b)) => a.cmp(b),
            (VersionItem::Text(a), VersionItem::Text(b)) => a.cmp(b),
            (VersionItem::Numeric(_), VersionItem::Text(_)) => Ordering::Less,
            (VersionItem::Text(_), VersionItem::Numeric(_)) => Ordering::Greater,
        }
    }
}

/// Split a dotted string into items, dropping insignificant trailing zeros.
fn split_items(s: &str) -> Vec<VersionItem> {
    let mut items: Vec<VersionItem> = s.split('.').map(VersionItem::parse).collect();
    while items.len() > 1 && items.last().is_some_and(VersionItem::is_zero) {
        items.pop();
    }
    items
}

fn cmp_items(a: &[VersionItem], b: &[VersionItem]) -> Ordering {
    let zero = VersionItem::Numeric(0);
    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).unwrap_or(&zero);
        let right = b.get(i).unwrap_or(&zero);
        match left.cmp(right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// A recipe version.
///
/// Keeps the original text for display and a normalized item list for
/// comparison. `1.0` and `1` are equal; `1.0-rc1` sorts before `1.0`;
/// `1.0+b1` sorts after `1.0`.
#[derive(Clone)]
pub struct Version {
    raw: String,
    main: Vec<VersionItem>,
    pre: Option<Vec<VersionItem>>,
    build: Option<Vec<VersionItem>>,
}

impl Version {
    /// Parse a version string. Any string is accepted; character validation
    /// happens at the reference level.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();

        let (rest, build) = match raw.split_once('+') {
            Some((r, b)) => (r, Some(split_items(b))),
            None => (raw.as_str(), None),
        };
        let (main, pre) = match rest.split_once('-') {
            Some((m, p)) => (m, Some(split_items(p))),
            None => (rest, None),
        };

        Version {
            main: split_items(main),
            pre,
            build,
            raw,
        }
    }

    /// Get the version as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.main.hash(state);
        self.pre.hash(state);
        self.build.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_items(&self.main, &other.main)
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => cmp_items(a, b),
            })
            .then_with(|| match (&self.build, &other.build) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (Some(a), Some(b)) => cmp_items(a, b),
            })
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({:?})", self.raw)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Version::new(s)
    }
}
