//! Version ordering, ranges, and lists.
//!
//! A [`Version`] is an opaque, totally ordered value parsed from a spec
//! identifier such as `1.2`, `12.1`, or `2026.1.0`. Unlike SemVer, there is
//! no fixed component count: any `[A-Za-z0-9_][A-Za-z0-9_.-]*` identifier
//! that appears after an `@` is a version.
//!
//! [`VersionRange`] is an inclusive `(lo?, hi?)` bound pair, and
//! [`VersionList`] is a union of versions and ranges — the thing that
//! actually gets attached to a [`crate::spec::Spec`] or [`crate::compiler::Compiler`].

use std::cmp::Ordering;
use std::fmt;

/// A single dot-separated version identifier, ordered component-wise.
///
/// Each component is compared numerically if both sides parse as `u64`,
/// otherwise lexicographically. A version that is a strict prefix of
/// another (`1.2` vs `1.2.0`) is considered *less than* it — trailing
/// components are not implicitly zero, matching the plain segment-count
/// comparison a reader would expect from reading the dotted form left to
/// right.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Version {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
enum Segment {
    Num(u64),
    Str(String),
}

impl Version {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('.')
            .map(|part| match part.parse::<u64>() {
                Ok(n) => Segment::Num(n),
                Err(_) => Segment::Str(part.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            let ord = match (a, b) {
                (Segment::Num(x), Segment::Num(y)) => x.cmp(y),
                (Segment::Num(_), Segment::Str(_)) => Ordering::Greater,
                (Segment::Str(_), Segment::Num(_)) => Ordering::Less,
                (Segment::Str(x), Segment::Str(y)) => x.cmp(y),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.segments.len().cmp(&other.segments.len())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// An inclusive version range with optional open ends.
///
/// `(None, None)` is the fully open range, printed as `:`. `(Some(a), None)`
/// prints as `a:`, `(None, Some(b))` as `:b`, and `(Some(a), Some(b))` as
/// `a:b`. A range with `lo == hi` and both present denotes the same single
/// version as a bare `Version`, but is kept as a range internally — the
/// parser only ever produces a bare `Version` entry for a plain `id` with
/// no colon.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VersionRange {
    pub lo: Option<Version>,
    pub hi: Option<Version>,
}

impl VersionRange {
    pub fn new(lo: Option<Version>, hi: Option<Version>) -> Self {
        Self { lo, hi }
    }

    pub fn open() -> Self {
        Self { lo: None, hi: None }
    }

    fn contains(&self, v: &Version) -> bool {
        self.lo.as_ref().map_or(true, |lo| v >= lo) && self.hi.as_ref().map_or(true, |hi| v <= hi)
    }

    fn overlaps(&self, other: &VersionRange) -> bool {
        let lo_ok = match (&self.lo, &other.hi) {
            (Some(lo), Some(hi)) => lo <= hi,
            _ => true,
        };
        let hi_ok = match (&self.hi, &other.lo) {
            (Some(hi), Some(lo)) => hi >= lo,
            _ => true,
        };
        lo_ok && hi_ok
    }

    fn intersect(&self, other: &VersionRange) -> VersionRange {
        let lo = match (&self.lo, &other.lo) {
            (Some(a), Some(b)) => Some(a.max(b).clone()),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        let hi = match (&self.hi, &other.hi) {
            (Some(a), Some(b)) => Some(a.min(b).clone()),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        VersionRange { lo, hi }
    }

    fn highest(&self) -> Option<&Version> {
        self.hi.as_ref()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.lo, &self.hi) {
            (None, None) => write!(f, ":"),
            (Some(lo), None) => write!(f, "{lo}:"),
            (None, Some(hi)) => write!(f, ":{hi}"),
            (Some(lo), Some(hi)) => write!(f, "{lo}:{hi}"),
        }
    }
}

/// One member of a [`VersionList`]: either a pinned version or a range.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum VersionTerm {
    Exact(Version),
    Range(VersionRange),
}

impl VersionTerm {
    fn overlaps(&self, other: &VersionTerm) -> bool {
        match (self, other) {
            (VersionTerm::Exact(a), VersionTerm::Exact(b)) => a == b,
            (VersionTerm::Exact(a), VersionTerm::Range(r))
            | (VersionTerm::Range(r), VersionTerm::Exact(a)) => r.contains(a),
            (VersionTerm::Range(a), VersionTerm::Range(b)) => a.overlaps(b),
        }
    }

    fn as_range(&self) -> VersionRange {
        match self {
            VersionTerm::Exact(v) => VersionRange::new(Some(v.clone()), Some(v.clone())),
            VersionTerm::Range(r) => r.clone(),
        }
    }

    fn highest(&self) -> Option<&Version> {
        match self {
            VersionTerm::Exact(v) => Some(v),
            VersionTerm::Range(r) => r.highest(),
        }
    }
}

impl fmt::Display for VersionTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionTerm::Exact(v) => write!(f, "{v}"),
            VersionTerm::Range(r) => write!(f, "{r}"),
        }
    }
}

/// A union of version terms (exact versions and/or ranges).
///
/// The fully-open list `:` is the default for a spec with no `@` clause
/// (spec.md §4.2 "open-range default"). Canonical string form is the
/// comma-joined, sorted terms (§3).
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct VersionList {
    terms: Vec<VersionTerm>,
}

impl VersionList {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// The fully-open list, `:`.
    pub fn open() -> Self {
        Self {
            terms: vec![VersionTerm::Range(VersionRange::open())],
        }
    }

    pub fn from_terms(terms: Vec<VersionTerm>) -> Self {
        Self { terms }
    }

    pub fn add(&mut self, term: VersionTerm) {
        self.terms.push(term);
    }

    pub fn terms(&self) -> &[VersionTerm] {
        &self.terms
    }

    /// True iff this list is the universal open range `:`.
    pub fn is_open(&self) -> bool {
        matches!(
            self.terms.as_slice(),
            [VersionTerm::Range(VersionRange { lo: None, hi: None })]
        )
    }

    /// Non-empty intersection with `other`.
    pub fn overlaps(&self, other: &VersionList) -> bool {
        self.terms
            .iter()
            .any(|a| other.terms.iter().any(|b| a.overlaps(b)))
    }

    /// Narrow `self` in place to the intersection with `other`.
    ///
    /// Each term of `self` is intersected against every overlapping term of
    /// `other`; terms with no overlap are dropped. Assumes `overlaps` was
    /// already checked by the caller (spec.md §4.5 step 2 checks overlap
    /// before calling constrain, which calls intersect).
    pub fn intersect(&mut self, other: &VersionList) {
        let mut narrowed = Vec::new();
        for a in &self.terms {
            for b in &other.terms {
                if a.overlaps(b) {
                    let ar = a.as_range();
                    let br = b.as_range();
                    narrowed.push(VersionTerm::Range(ar.intersect(&br)));
                }
            }
        }
        self.terms = narrowed;
    }

    /// Greatest concrete version represented, or `None` if any term is
    /// unbounded above (an open-ended term means the list as a whole has no
    /// definite highest, not that it should be ignored).
    pub fn highest(&self) -> Option<Version> {
        let mut best: Option<&Version> = None;
        for term in &self.terms {
            let v = term.highest()?;
            best = Some(match best {
                Some(b) if b >= v => b,
                _ => v,
            });
        }
        best.cloned()
    }

    /// True iff this list denotes exactly one version.
    pub fn concrete(&self) -> bool {
        matches!(
            self.terms.as_slice(),
            [VersionTerm::Exact(_)]
        ) || matches!(
            self.terms.as_slice(),
            [VersionTerm::Range(VersionRange { lo: Some(a), hi: Some(b) })] if a == b
        )
    }
}

impl fmt::Display for VersionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        sorted.sort();
        write!(f, "{}", sorted.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering_numeric() {
        assert!(Version::parse("1.4") > Version::parse("1.2"));
        assert!(Version::parse("12.1") > Version::parse("2.9"));
    }

    #[test]
    fn version_ordering_prefix() {
        assert!(Version::parse("1.2") < Version::parse("1.2.0"));
    }

    #[test]
    fn open_list_display() {
        assert_eq!(VersionList::open().to_string(), ":");
        assert!(VersionList::open().is_open());
    }

    #[test]
    fn list_overlap_and_intersect() {
        let mut a = VersionList::from_terms(vec![VersionTerm::Range(VersionRange::new(
            Some(Version::parse("1.2")),
            Some(Version::parse("1.4")),
        ))]);
        let b = VersionList::from_terms(vec![VersionTerm::Range(VersionRange::new(
            Some(Version::parse("1.3")),
            None,
        ))]);
        assert!(a.overlaps(&b));
        a.intersect(&b);
        assert_eq!(a.to_string(), "1.3:1.4");
    }

    #[test]
    fn list_concrete() {
        let exact = VersionList::from_terms(vec![VersionTerm::Exact(Version::parse("1.2"))]);
        assert!(exact.concrete());

        let range = VersionList::from_terms(vec![VersionTerm::Range(VersionRange::new(
            Some(Version::parse("1.2")),
            Some(Version::parse("1.4")),
        ))]);
        assert!(!range.concrete());
    }

    #[test]
    fn list_highest_picks_the_greatest_bounded_term() {
        let list = VersionList::from_terms(vec![
            VersionTerm::Exact(Version::parse("1.0")),
            VersionTerm::Range(VersionRange::new(
                Some(Version::parse("1.2")),
                Some(Version::parse("1.4")),
            )),
        ]);
        assert_eq!(list.highest(), Some(Version::parse("1.4")));
    }

    #[test]
    fn list_highest_is_none_when_any_term_is_unbounded_above() {
        let list = VersionList::from_terms(vec![
            VersionTerm::Exact(Version::parse("1.0")),
            VersionTerm::Range(VersionRange::new(Some(Version::parse("1.6")), None)),
        ]);
        // An open-ended term means the union as a whole has no definite
        // highest, so the bounded term doesn't get to stand in for it.
        assert_eq!(list.highest(), None);
    }

    #[test]
    fn canonical_string_sorted_and_joined() {
        let list = VersionList::from_terms(vec![
            VersionTerm::Range(VersionRange::new(
                Some(Version::parse("1.6")),
                Some(Version::parse("1.8")),
            )),
            VersionTerm::Exact(Version::parse("1.0")),
            VersionTerm::Range(VersionRange::new(
                Some(Version::parse("1.2")),
                Some(Version::parse("1.4")),
            )),
        ]);
        assert_eq!(list.to_string(), "1.0,1.2:1.4,1.6:1.8");
    }
}
