//! Version handling: project versions, file versions and dependency ranges.
//!
//! Project versions may carry a `-*` snapshot suffix which is replaced with
//! the build's snapshot token at load time. Dependency ranges use a
//! bracketed interval grammar with floating (`1.0.0-*`, `1.2.*`) forms, and
//! can be converted to PubGrub ranges for downstream resolution.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use pubgrub::Range;
use semver::{Prerelease, Version};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Suffix marking a project version that takes the build's snapshot token.
pub const SNAPSHOT_SUFFIX: &str = "-*";

/// Error raised while parsing versions or ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("`{input}` is not a valid version")]
    InvalidFormat { input: String },

    #[error("invalid version component `{component}` in `{input}`")]
    InvalidNumber { input: String, component: String },

    #[error("`{value}` is not a valid file version revision")]
    InvalidFileVersion { value: String },

    #[error("invalid version range `{input}`: {reason}")]
    InvalidRange { input: String, reason: String },
}

/// A semantic version with an optional fourth `revision` component.
///
/// `1.2` parses as `1.2.0`; `1.2.3.4` keeps `4` as the revision.
#[derive(Debug, Clone)]
pub struct SemanticVersion {
    version: Version,
    revision: Option<u64>,
}

impl SemanticVersion {
    /// Create a release version with no revision.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            version: Version::new(major, minor, patch),
            revision: None,
        }
    }

    /// The `major.minor.patch[-pre][+build]` part as a semver version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    /// The revision component, 0 when the version has only three parts.
    pub fn revision(&self) -> u64 {
        self.revision.unwrap_or(0)
    }

    /// The prerelease label, empty for releases.
    pub fn prerelease(&self) -> &str {
        self.version.pre.as_str()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }
}

impl Default for SemanticVersion {
    fn default() -> Self {
        SemanticVersion::new(1, 0, 0)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let split_at = input.find(['-', '+']).unwrap_or(input.len());
        let (core, rest) = input.split_at(split_at);

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 4 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let mut numbers = [0u64; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = parse_component(input, part)?;
        }

        let normalized = format!("{}.{}.{}{}", numbers[0], numbers[1], numbers[2], rest);
        let version = Version::parse(&normalized).map_err(|_| VersionError::InvalidFormat {
            input: input.to_string(),
        })?;

        Ok(SemanticVersion {
            version,
            revision: (parts.len() == 4).then_some(numbers[3]),
        })
    }
}

fn parse_component(input: &str, part: &str) -> Result<u64, VersionError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::InvalidNumber {
            input: input.to_string(),
            component: part.to_string(),
        });
    }
    part.parse().map_err(|_| VersionError::InvalidNumber {
        input: input.to_string(),
        component: part.to_string(),
    })
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.version;
        write!(f, "{}.{}.{}", v.major, v.minor, v.patch)?;
        if let Some(revision) = self.revision {
            write!(f, ".{}", revision)?;
        }
        if !v.pre.is_empty() {
            write!(f, "-{}", v.pre)?;
        }
        if !v.build.is_empty() {
            write!(f, "+{}", v.build)?;
        }
        Ok(())
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.version, &other.version);
        (a.major, a.minor, a.patch, self.revision())
            .cmp(&(b.major, b.minor, b.patch, other.revision()))
            .then_with(|| a.pre.cmp(&b.pre))
            .then_with(|| a.build.cmp(&b.build))
    }
}

impl Hash for SemanticVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
        self.revision().hash(state);
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Resolve a raw project version, substituting the snapshot token for a
/// trailing `-*`.
///
/// With an empty or missing token the suffix is dropped entirely, so
/// `2.0.0-*` becomes `2.0.0`; with token `rc1` it becomes `2.0.0-rc1`.
pub fn resolve_version(
    raw: &str,
    snapshot_token: Option<&str>,
) -> Result<SemanticVersion, VersionError> {
    let raw = raw.trim();
    let resolved = match raw.strip_suffix(SNAPSHOT_SUFFIX) {
        Some(prefix) => match snapshot_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => format!("{}-{}", prefix, token),
            None => prefix.to_string(),
        },
        None => raw.to_string(),
    };

    resolved.parse()
}

/// A four-component file version (`major.minor.patch.revision`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub revision: u64,
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.revision
        )
    }
}

impl Serialize for FileVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Build the file version from a project version and an optional revision
/// override.
pub fn resolve_assembly_file_version(
    version: &SemanticVersion,
    override_revision: Option<&str>,
) -> Result<FileVersion, VersionError> {
    let revision = match override_revision.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| VersionError::InvalidFileVersion {
                value: value.to_string(),
            })?,
        None => version.revision(),
    };

    Ok(FileVersion {
        major: version.major(),
        minor: version.minor(),
        patch: version.patch(),
        revision,
    })
}

/// One end of a bounded range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(version: Version) -> Self {
        Bound {
            version,
            inclusive: true,
        }
    }

    pub fn exclusive(version: Version) -> Self {
        Bound {
            version,
            inclusive: false,
        }
    }
}

/// Which part of a floating range may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatBehavior {
    /// `1.0.0-*`, `1.0.0-beta*`
    Prerelease,
    /// `1.2.*`
    Patch,
    /// `1.*`
    Minor,
    /// `*`
    Major,
}

/// A constraint over acceptable versions of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionRange {
    /// Exactly one version: `1.2.0` or `[1.2.0]`.
    Exact(Version),

    /// Interval with optional lower and upper bounds: `[1.0, 2.0)`, `>= 1.0`.
    Bounded {
        min: Option<Bound>,
        max: Option<Bound>,
    },

    /// Floating range; `floor` is the lowest acceptable version.
    Floating {
        floor: Version,
        behavior: FloatBehavior,
    },
}

impl VersionRange {
    /// Range accepting `version` and anything above it.
    pub fn at_least(version: Version) -> Self {
        VersionRange::Bounded {
            min: Some(Bound::inclusive(version)),
            max: None,
        }
    }

    /// Check whether a concrete version satisfies this range.
    pub fn satisfies(&self, version: &Version) -> bool {
        match self {
            VersionRange::Exact(v) => v == version,
            VersionRange::Bounded { min, max } => {
                let above = min.as_ref().map_or(true, |b| {
                    if b.inclusive {
                        *version >= b.version
                    } else {
                        *version > b.version
                    }
                });
                let below = max.as_ref().map_or(true, |b| {
                    if b.inclusive {
                        *version <= b.version
                    } else {
                        *version < b.version
                    }
                });
                above && below
            }
            VersionRange::Floating { floor, .. } => version >= floor,
        }
    }

    /// The lowest version this range can accept, if it has one.
    pub fn min_version(&self) -> Option<&Version> {
        match self {
            VersionRange::Exact(v) => Some(v),
            VersionRange::Bounded { min, .. } => min.as_ref().map(|b| &b.version),
            VersionRange::Floating { floor, .. } => Some(floor),
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, VersionRange::Floating { .. })
    }

    /// Convert to a PubGrub range for dependency resolution.
    pub fn to_pubgrub(&self) -> Range<Version> {
        match self {
            VersionRange::Exact(v) => Range::singleton(v.clone()),
            VersionRange::Bounded { min, max } => {
                let lower = match min {
                    None => Range::full(),
                    Some(b) if b.inclusive => Range::higher_than(b.version.clone()),
                    Some(b) => Range::strictly_higher_than(b.version.clone()),
                };
                let upper = match max {
                    None => Range::full(),
                    Some(b) if b.inclusive => Range::strictly_lower_than(b.version.clone())
                        .union(&Range::singleton(b.version.clone())),
                    Some(b) => Range::strictly_lower_than(b.version.clone()),
                };
                lower.intersection(&upper)
            }
            VersionRange::Floating { floor, .. } => Range::higher_than(floor.clone()),
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(invalid_range(input, "range is empty"));
        }

        if input.starts_with('[') || input.starts_with('(') {
            return parse_interval(input);
        }

        // Longer operators first so `>=` is not read as `>`.
        let operators: [(&str, fn(Version) -> VersionRange); 6] = [
            (">=", |v| VersionRange::Bounded {
                min: Some(Bound::inclusive(v)),
                max: None,
            }),
            ("<=", |v| VersionRange::Bounded {
                min: None,
                max: Some(Bound::inclusive(v)),
            }),
            ("==", VersionRange::Exact),
            (">", |v| VersionRange::Bounded {
                min: Some(Bound::exclusive(v)),
                max: None,
            }),
            ("<", |v| VersionRange::Bounded {
                min: None,
                max: Some(Bound::exclusive(v)),
            }),
            ("=", VersionRange::Exact),
        ];
        for (op, build) in operators {
            if let Some(rest) = input.strip_prefix(op) {
                return Ok(build(parse_range_version(input, rest)?));
            }
        }

        if input.contains('*') {
            return parse_floating(input);
        }

        Ok(VersionRange::Exact(parse_range_version(input, input)?))
    }
}

fn invalid_range(input: &str, reason: impl Into<String>) -> VersionError {
    VersionError::InvalidRange {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Parse a version inside a range; accepts 1-3 numeric components.
fn parse_range_version(input: &str, text: &str) -> Result<Version, VersionError> {
    let parsed: SemanticVersion = text
        .trim()
        .parse()
        .map_err(|e: VersionError| invalid_range(input, e.to_string()))?;
    if parsed.revision.is_some() {
        return Err(invalid_range(
            input,
            "four-part versions are not supported in ranges",
        ));
    }
    Ok(parsed.version)
}

fn parse_interval(input: &str) -> Result<VersionRange, VersionError> {
    if input.len() < 2 {
        return Err(invalid_range(input, "missing closing bracket"));
    }
    let min_inclusive = input.starts_with('[');
    let max_inclusive = match input.as_bytes()[input.len() - 1] {
        b']' => true,
        b')' => false,
        _ => return Err(invalid_range(input, "missing closing bracket")),
    };
    let inner = &input[1..input.len() - 1];

    let Some((lo, hi)) = inner.split_once(',') else {
        if !(min_inclusive && max_inclusive) {
            return Err(invalid_range(
                input,
                "a single-version interval must use `[` and `]`",
            ));
        }
        return Ok(VersionRange::Exact(parse_range_version(input, inner)?));
    };

    if hi.contains(',') {
        return Err(invalid_range(input, "too many bounds"));
    }

    let bound = |text: &str, inclusive: bool| -> Result<Option<Bound>, VersionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(Bound {
            version: parse_range_version(input, text)?,
            inclusive,
        }))
    };
    let min = bound(lo, min_inclusive)?;
    let max = bound(hi, max_inclusive)?;

    match (&min, &max) {
        (None, None) => return Err(invalid_range(input, "interval has no bounds")),
        (Some(min), Some(max)) => match min.version.cmp(&max.version) {
            Ordering::Greater => {
                return Err(invalid_range(input, "lower bound exceeds upper bound"))
            }
            Ordering::Equal if !(min.inclusive && max.inclusive) => {
                return Err(invalid_range(input, "interval is empty"))
            }
            _ => {}
        },
        _ => {}
    }

    Ok(VersionRange::Bounded { min, max })
}

fn parse_floating(input: &str) -> Result<VersionRange, VersionError> {
    if input == "*" {
        return Ok(VersionRange::Floating {
            floor: Version::new(0, 0, 0),
            behavior: FloatBehavior::Major,
        });
    }

    let Some(base) = input.strip_suffix('*') else {
        return Err(invalid_range(input, "`*` must be the last character"));
    };
    if base.contains('*') {
        return Err(invalid_range(input, "only one `*` is allowed"));
    }

    if let Some((core, prefix)) = base.split_once('-') {
        let mut floor = parse_range_version(input, core)?;
        let label = if prefix.is_empty() { "0" } else { prefix };
        floor.pre =
            Prerelease::new(label).map_err(|e| invalid_range(input, e.to_string()))?;
        return Ok(VersionRange::Floating {
            floor,
            behavior: FloatBehavior::Prerelease,
        });
    }

    let Some(core) = base.strip_suffix('.') else {
        return Err(invalid_range(input, "`*` must follow `.` or `-`"));
    };
    let numbers = core
        .split('.')
        .map(|part| parse_component(input, part))
        .collect::<Result<Vec<u64>, _>>()
        .map_err(|e| invalid_range(input, e.to_string()))?;

    match numbers.as_slice() {
        [major] => Ok(VersionRange::Floating {
            floor: Version::new(*major, 0, 0),
            behavior: FloatBehavior::Minor,
        }),
        [major, minor] => Ok(VersionRange::Floating {
            floor: Version::new(*major, *minor, 0),
            behavior: FloatBehavior::Patch,
        }),
        _ => Err(invalid_range(input, "too many components before `*`")),
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Exact(v) => write!(f, "[{}]", v),
            VersionRange::Bounded {
                min: Some(min),
                max: None,
            } if min.inclusive => write!(f, ">= {}", min.version),
            VersionRange::Bounded { min, max } => {
                let open = match min {
                    Some(b) if b.inclusive => '[',
                    _ => '(',
                };
                let close = match max {
                    Some(b) if b.inclusive => ']',
                    _ => ')',
                };
                let lo = min.as_ref().map(|b| b.version.to_string()).unwrap_or_default();
                let hi = max.as_ref().map(|b| b.version.to_string()).unwrap_or_default();
                write!(f, "{}{}, {}{}", open, lo, hi, close)
            }
            VersionRange::Floating { floor, behavior } => match behavior {
                FloatBehavior::Major => write!(f, "*"),
                FloatBehavior::Minor => write!(f, "{}.*", floor.major),
                FloatBehavior::Patch => write!(f, "{}.{}.*", floor.major, floor.minor),
                FloatBehavior::Prerelease => {
                    let label = match floor.pre.as_str() {
                        "0" => "",
                        other => other,
                    };
                    write!(
                        f,
                        "{}.{}.{}-{}*",
                        floor.major, floor.minor, floor.patch, label
                    )
                }
            },
        }
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
