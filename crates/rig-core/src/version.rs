//! Version parsing, ordering, and dependency version constraints.
//!
//! Versions follow Maven/Gradle ordering rather than semver:
//! - Segments are split on `.` and `-`
//! - Numeric segments compare as numbers, missing trailing segments count as `0`
//! - Qualifiers order as `alpha` < `beta` < `milestone` < `rc` < `snapshot`
//!   < release < `sp`

use std::cmp::Ordering;
use std::fmt;

/// A parsed version with comparable segments.
#[derive(Debug, Clone)]
pub struct Version {
    pub original: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Qualifier(Qualifier),
    Text(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum Qualifier {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Release,
    Sp,
}

impl Version {
    /// Parse a version, rejecting text that is not shaped like one.
    ///
    /// A version starts with a numeric segment and contains only ASCII
    /// alphanumerics separated by single `.` or `-` characters.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("version is empty".to_string());
        }
        if !text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(format!("'{text}' contains characters not allowed in a version"));
        }
        if text.split(['.', '-']).any(str::is_empty) {
            return Err(format!("'{text}' has an empty version segment"));
        }
        if !text.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(format!("'{text}' must start with a number"));
        }
        Ok(Self {
            original: text.to_string(),
            segments: text.split(['.', '-']).map(classify).collect(),
        })
    }

    pub fn is_snapshot(&self) -> bool {
        self.segments.contains(&Segment::Qualifier(Qualifier::Snapshot))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| compare_segments(self.segments.get(i), other.segments.get(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(s), None) => against_missing(s),
        (None, Some(s)) => against_missing(s).reverse(),
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

/// A missing segment behaves like `0` or a plain release.
fn against_missing(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(n) => n.cmp(&0),
        Segment::Qualifier(q) => q.cmp(&Qualifier::Release),
        Segment::Text(_) => Ordering::Less,
    }
}

fn compare_present(a: &Segment, b: &Segment) -> Ordering {
    use Segment::{Numeric, Qualifier as Q, Text};
    match (a, b) {
        (Numeric(a), Numeric(b)) => a.cmp(b),
        (Q(a), Q(b)) => a.cmp(b),
        (Text(a), Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Numeric(_), _) => Ordering::Greater,
        (_, Numeric(_)) => Ordering::Less,
        (Q(q), Text(_)) => release_or_later(*q),
        (Text(_), Q(q)) => release_or_later(*q).reverse(),
    }
}

fn release_or_later(q: Qualifier) -> Ordering {
    if q >= Qualifier::Release {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

fn classify(token: &str) -> Segment {
    if let Ok(n) = token.parse::<u64>() {
        return Segment::Numeric(n);
    }
    match token.to_lowercase().as_str() {
        "alpha" | "a" => Segment::Qualifier(Qualifier::Alpha),
        "beta" | "b" => Segment::Qualifier(Qualifier::Beta),
        "milestone" | "m" => Segment::Qualifier(Qualifier::Milestone),
        "rc" | "cr" => Segment::Qualifier(Qualifier::Rc),
        "snapshot" => Segment::Qualifier(Qualifier::Snapshot),
        "ga" | "final" | "release" => Segment::Qualifier(Qualifier::Release),
        "sp" => Segment::Qualifier(Qualifier::Sp),
        _ => Segment::Text(token.to_string()),
    }
}

/// A dependency version constraint: a bare version or a Maven range.
///
/// Ranges: `[1.0,2.0)`, `[1.0,)`, `(,2.0]`, `[1.5]` (exact).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// A bare version such as `2.1.4`.
    Exact(Version),
    Range {
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl VersionConstraint {
    /// Parse and sanity-check a constraint.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let s = spec.trim();
        if !s.starts_with('[') && !s.starts_with('(') {
            return Version::parse(s).map(VersionConstraint::Exact);
        }

        let close_inclusive = match s.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(format!("range '{s}' is not closed with ']' or ')'")),
        };
        let open_inclusive = s.starts_with('[');
        let inner = &s[1..s.len() - 1];

        let Some((lower, upper)) = inner.split_once(',') else {
            if !(open_inclusive && close_inclusive) {
                return Err(format!("exact range '{s}' must use square brackets"));
            }
            let v = Version::parse(inner)?;
            return Ok(VersionConstraint::Range {
                lower: Some(Bound {
                    version: v.clone(),
                    inclusive: true,
                }),
                upper: Some(Bound {
                    version: v,
                    inclusive: true,
                }),
            });
        };

        let bound = |text: &str, inclusive: bool| -> Result<Option<Bound>, String> {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            Ok(Some(Bound {
                version: Version::parse(text)?,
                inclusive,
            }))
        };
        let lower = bound(lower, open_inclusive)?;
        let upper = bound(upper, close_inclusive)?;

        if let (Some(lo), Some(hi)) = (&lower, &upper) {
            if lo.version > hi.version {
                return Err(format!(
                    "range '{s}' has lower bound {} above upper bound {}",
                    lo.version, hi.version
                ));
            }
        }
        Ok(VersionConstraint::Range { lower, upper })
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Exact(v) => write!(f, "{v}"),
            VersionConstraint::Range { lower, upper } => {
                match lower {
                    Some(b) if b.inclusive => write!(f, "[{}", b.version)?,
                    Some(b) => write!(f, "({}", b.version)?,
                    None => f.write_str("(")?,
                }
                f.write_str(",")?;
                match upper {
                    Some(b) if b.inclusive => write!(f, "{}]", b.version),
                    Some(b) => write!(f, "{})", b.version),
                    None => f.write_str(")"),
                }
            }
        }
    }
}
