//! Canonical path prefixes.
//!
//! Scope prefixes arrive in whatever shape the application author typed —
//! `"admin"`, `"/admin"`, `"/admin/"` — and all of them must address the same
//! trie branch. `PrefixPath` is the one canonical form: an owned sequence of
//! non-empty segments, no separators. The root scope is the empty sequence.

use std::fmt;

/// A canonicalized path prefix: ordered, non-empty segments.
///
/// Missing leading slashes are tolerated, trailing and doubled slashes are
/// dropped. Equality and ancestry are segment-wise, so `/adm` is *not* an
/// ancestor of `/admin`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct PrefixPath {
    segments: Vec<String>,
}

impl PrefixPath {
    /// The root prefix (`"/"`): zero segments.
    pub(crate) fn root() -> Self {
        Self::default()
    }

    /// Canonicalizes `raw` into a prefix. Never fails: malformed input is
    /// normalized, not rejected.
    pub(crate) fn parse(raw: &str) -> Self {
        Self { segments: split_segments(raw).map(str::to_owned).collect() }
    }

    /// Appends a relative (or absolute — the distinction is erased by
    /// canonicalization) child prefix.
    pub(crate) fn join(&self, child: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split_segments(child).map(str::to_owned));
        Self { segments }
    }

    pub(crate) fn segments(&self) -> &[String] {
        &self.segments
    }

    pub(crate) fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Every prefix of `self` from the root down to `self` itself,
    /// shallowest first.
    pub(crate) fn lineage(&self) -> impl Iterator<Item = PrefixPath> + '_ {
        (0..=self.segments.len()).map(|depth| Self { segments: self.segments[..depth].to_vec() })
    }
}

impl fmt::Display for PrefixPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Splits a raw path into its non-empty segments. `"/"` yields nothing.
pub(crate) fn split_segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_missing_leading_slash() {
        assert_eq!(PrefixPath::parse("api"), PrefixPath::parse("/api"));
        assert_eq!(PrefixPath::parse("api/"), PrefixPath::parse("/api"));
        assert_eq!(PrefixPath::parse("//api//v1/"), PrefixPath::parse("/api/v1"));
    }

    #[test]
    fn root_has_no_segments() {
        assert!(PrefixPath::parse("/").is_root());
        assert!(PrefixPath::parse("").is_root());
        assert_eq!(PrefixPath::root().to_string(), "/");
    }

    #[test]
    fn join_is_canonical() {
        let api = PrefixPath::parse("api");
        assert_eq!(api.join("v1"), PrefixPath::parse("/api/v1"));
        assert_eq!(api.join("/v1/"), PrefixPath::parse("/api/v1"));
    }

    #[test]
    fn lineage_runs_shallowest_first() {
        let p = PrefixPath::parse("/api/v1");
        let lineage: Vec<String> = p.lineage().map(|a| a.to_string()).collect();
        assert_eq!(lineage, ["/", "/api", "/api/v1"]);
    }

    #[test]
    fn ancestry_is_segment_wise() {
        let admin = PrefixPath::parse("/admin");
        assert!(!admin.lineage().any(|a| a == PrefixPath::parse("/adm")));
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(PrefixPath::parse("api/v1").to_string(), "/api/v1");
    }
}
