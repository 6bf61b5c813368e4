use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `<major>.<minor>.<build>.<revision>` followed by one separator and a
/// run of letters, e.g. `25.1.0.8925226.zh`.
static VERSION_PAIR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+\.[0-9]+\.([0-9]+)\.([0-9]+).[a-zA-Z]+").unwrap());

/// The two trailing numeric components of a package version.
///
/// Major and minor are ignored: only `build` and `revision` take part in
/// the published/upstream comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionPair {
    pub build: u64,
    pub revision: u64,
}

impl VersionPair {
    pub fn new(build: u64, revision: u64) -> Self {
        VersionPair { build, revision }
    }

    /// First substring of `text` that looks like a package version.
    pub fn find(text: &str) -> Option<&str> {
        VERSION_PAIR_REGEX.find(text).map(|m| m.as_str())
    }

    /// Extracts `(build, revision)` from the first version-like substring.
    ///
    /// Returns `None` when nothing matches or a component overflows `u64`;
    /// callers treat that as an unknown version.
    pub fn extract(text: &str) -> Option<Self> {
        let captures = VERSION_PAIR_REGEX.captures(text)?;
        let build = captures.get(1)?.as_str().parse().ok()?;
        let revision = captures.get(2)?.as_str().parse().ok()?;
        Some(VersionPair { build, revision })
    }
}

impl fmt::Display for VersionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.build, self.revision)
    }
}

/// Whether the published version already covers the upstream one.
///
/// Strict on `build`, inclusive on `revision`: an equal pair is current.
pub fn should_skip(published: VersionPair, upstream: VersionPair) -> bool {
    published.build > upstream.build
        || (published.build == upstream.build && published.revision >= upstream.revision)
}
