//! Target framework names.
//!
//! Frameworks are written in manifests either in short form (`net45`,
//! `dnxcore50`, `netstandard1.3`, `portable-net45+win8`) or in long form
//! (`.NETFramework,Version=v4.5`). Both canonicalize to a [`FrameworkName`].
//! Unknown identifiers are "unsupported" and canonicalize to `None`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

const NET_FRAMEWORK: &str = ".NETFramework";
const DNX: &str = "DNX";
const DNX_CORE: &str = "DNXCore";
const ASP_NET: &str = "Asp.Net";
const ASP_NET_CORE: &str = "Asp.NetCore";
const NET_CORE: &str = ".NETCore";
const NET_STANDARD: &str = ".NETStandard";
const NET_CORE_APP: &str = ".NETCoreApp";
const NET_PLATFORM: &str = ".NETPlatform";
const UAP: &str = "UAP";
const PORTABLE: &str = ".NETPortable";
const NATIVE: &str = "native";

/// Short identifier -> long identifier.
const KNOWN_IDENTIFIERS: &[(&str, &str)] = &[
    ("net", NET_FRAMEWORK),
    ("dnx", DNX),
    ("dnxcore", DNX_CORE),
    ("aspnet", ASP_NET),
    ("aspnetcore", ASP_NET_CORE),
    ("netcore", NET_CORE),
    ("netstandard", NET_STANDARD),
    ("netcoreapp", NET_CORE_APP),
    ("dotnet", NET_PLATFORM),
    ("uap", UAP),
    ("win", "Windows"),
    ("wp", "WindowsPhone"),
    ("sl", "Silverlight"),
    ("portable", PORTABLE),
    ("native", NATIVE),
];

/// Identifiers whose short names always use dotted versions.
const DOTTED_IDENTIFIERS: &[&str] = &[NET_STANDARD, NET_CORE_APP, NET_PLATFORM, UAP];

type FrameworkVersion = [u32; 4];

/// Upper bound of a cross-identifier compatibility rule.
#[derive(Debug, Clone, Copy)]
enum MaxVersion {
    /// The candidate may be as new as the target itself.
    Target,
    Fixed(FrameworkVersion),
}

/// `target` at `min_target` or newer can consume `candidate` up to `max`.
struct CompatibilityRule {
    target: &'static str,
    min_target: FrameworkVersion,
    candidate: &'static str,
    max: MaxVersion,
}

const fn rule(
    target: &'static str,
    min_target: FrameworkVersion,
    candidate: &'static str,
    max: MaxVersion,
) -> CompatibilityRule {
    CompatibilityRule {
        target,
        min_target,
        candidate,
        max,
    }
}

const COMPATIBILITY_RULES: &[CompatibilityRule] = &[
    rule(DNX, [0, 0, 0, 0], NET_FRAMEWORK, MaxVersion::Target),
    rule(ASP_NET, [0, 0, 0, 0], NET_FRAMEWORK, MaxVersion::Target),
    rule(DNX, [4, 5, 1, 0], NET_STANDARD, MaxVersion::Fixed([1, 2, 0, 0])),
    rule(DNX, [4, 6, 0, 0], NET_STANDARD, MaxVersion::Fixed([1, 3, 0, 0])),
    rule(DNX_CORE, [0, 0, 0, 0], NET_PLATFORM, MaxVersion::Fixed([5, 5, 0, 0])),
    rule(DNX_CORE, [0, 0, 0, 0], NET_STANDARD, MaxVersion::Fixed([1, 5, 0, 0])),
    rule(ASP_NET_CORE, [0, 0, 0, 0], NET_PLATFORM, MaxVersion::Fixed([5, 5, 0, 0])),
    rule(ASP_NET_CORE, [0, 0, 0, 0], NET_STANDARD, MaxVersion::Fixed([1, 5, 0, 0])),
    rule(NET_CORE_APP, [1, 0, 0, 0], NET_STANDARD, MaxVersion::Fixed([1, 6, 0, 0])),
    rule(NET_CORE_APP, [2, 0, 0, 0], NET_STANDARD, MaxVersion::Fixed([2, 0, 0, 0])),
    rule(NET_FRAMEWORK, [4, 5, 0, 0], NET_STANDARD, MaxVersion::Fixed([1, 1, 0, 0])),
    rule(NET_FRAMEWORK, [4, 5, 1, 0], NET_STANDARD, MaxVersion::Fixed([1, 2, 0, 0])),
    rule(NET_FRAMEWORK, [4, 6, 0, 0], NET_STANDARD, MaxVersion::Fixed([1, 3, 0, 0])),
    rule(NET_FRAMEWORK, [4, 6, 1, 0], NET_STANDARD, MaxVersion::Fixed([2, 0, 0, 0])),
    rule(NET_FRAMEWORK, [4, 5, 0, 0], NET_PLATFORM, MaxVersion::Fixed([5, 2, 0, 0])),
    rule(NET_FRAMEWORK, [4, 5, 1, 0], NET_PLATFORM, MaxVersion::Fixed([5, 3, 0, 0])),
    rule(NET_FRAMEWORK, [4, 6, 0, 0], NET_PLATFORM, MaxVersion::Fixed([5, 4, 0, 0])),
    rule(UAP, [10, 0, 0, 0], NET_STANDARD, MaxVersion::Fixed([1, 4, 0, 0])),
    rule(NET_CORE, [5, 0, 0, 0], NET_STANDARD, MaxVersion::Fixed([1, 4, 0, 0])),
];

/// A framework name that could not be canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported target framework `{0}`")]
pub struct UnsupportedFramework(pub String);

/// A canonical target framework identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameworkName {
    identifier: &'static str,
    version: FrameworkVersion,
    profile: Option<String>,
}

impl FrameworkName {
    /// Canonicalize a framework key; `None` means unsupported.
    pub fn canonicalize(name: &str) -> Option<FrameworkName> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if name.contains(',') {
            return parse_long_form(name);
        }

        let lower = name.to_ascii_lowercase();
        if let Some(profile) = lower.strip_prefix("portable-") {
            return Some(FrameworkName {
                identifier: PORTABLE,
                version: [0; 4],
                profile: Some(normalize_profile(PORTABLE, profile)?),
            });
        }

        let id_len = lower
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(lower.len());
        let (short, rest) = lower.split_at(id_len);
        let identifier = lookup_short(short)?;
        if identifier == PORTABLE {
            return None;
        }

        let (version_text, profile) = match rest.split_once('-') {
            Some((version, profile)) if !profile.is_empty() => {
                (version, Some(normalize_profile(identifier, profile)?))
            }
            Some(_) => return None,
            None => (rest, None),
        };

        Some(FrameworkName {
            identifier,
            version: parse_short_version(version_text)?,
            profile,
        })
    }

    /// The long identifier, e.g. `.NETFramework`.
    pub fn identifier(&self) -> &str {
        self.identifier
    }

    /// Version components with trailing zeros trimmed (at least two).
    pub fn version(&self) -> Vec<u32> {
        let mut parts = self.version.to_vec();
        while parts.len() > 2 && parts.last() == Some(&0) {
            parts.pop();
        }
        parts
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn is_portable(&self) -> bool {
        self.identifier == PORTABLE
    }

    /// Frameworks listed in a portable profile (`net45+win8`).
    pub fn portable_members(&self) -> Vec<FrameworkName> {
        match (self.is_portable(), &self.profile) {
            (true, Some(profile)) => profile.split('+').filter_map(Self::canonicalize).collect(),
            _ => Vec::new(),
        }
    }

    /// The short form: `net45`, `dnxcore50`, `netstandard1.3`.
    pub fn short_name(&self) -> String {
        if self.is_portable() {
            return format!("portable-{}", self.profile.as_deref().unwrap_or_default());
        }

        let short = KNOWN_IDENTIFIERS
            .iter()
            .find(|(_, long)| *long == self.identifier)
            .map(|(short, _)| *short)
            .unwrap_or(self.identifier);

        let parts = self.version();
        let mut name = short.to_string();
        if parts.iter().any(|p| *p != 0) {
            let dotted =
                DOTTED_IDENTIFIERS.contains(&self.identifier) || parts.iter().any(|p| *p >= 10);
            let text: Vec<String> = parts.iter().map(u32::to_string).collect();
            name.push_str(&text.join(if dotted { "." } else { "" }));
        }
        if let Some(profile) = &self.profile {
            name.push('-');
            name.push_str(&profile.to_ascii_lowercase());
        }
        name
    }

    /// The preprocessor symbol identifying this framework, e.g. `NET45`.
    pub fn default_define(&self) -> String {
        let short = self.short_name();
        let short = short.strip_prefix("portable-").unwrap_or(&short);
        short
            .to_ascii_uppercase()
            .chars()
            .map(|c| match c {
                '-' | '+' | '.' => '_',
                other => other,
            })
            .collect()
    }

    /// Whether a project targeting `self` can consume `candidate`.
    pub fn is_compatible_with(&self, candidate: &FrameworkName) -> bool {
        if candidate.is_portable() {
            return candidate
                .portable_members()
                .iter()
                .any(|member| self.is_compatible_with(member));
        }

        if self.identifier == candidate.identifier {
            let profile_ok = match (&candidate.profile, &self.profile) {
                (None, _) => true,
                (Some(c), Some(t)) => c.eq_ignore_ascii_case(t),
                (Some(_), None) => false,
            };
            return candidate.version <= self.version && profile_ok;
        }

        COMPATIBILITY_RULES.iter().any(|rule| {
            let max = match rule.max {
                MaxVersion::Target => self.version,
                MaxVersion::Fixed(v) => v,
            };
            rule.target == self.identifier
                && self.version >= rule.min_target
                && rule.candidate == candidate.identifier
                && candidate.version <= max
        })
    }
}

/// The candidates `target` can consume, best first.
///
/// Same-identifier matches come first, then cross-identifier matches, then
/// portable profiles; within each group newer versions win and ties keep
/// candidate order.
pub fn compatible_frameworks<'a, I>(target: &FrameworkName, candidates: I) -> Vec<&'a FrameworkName>
where
    I: IntoIterator<Item = &'a FrameworkName>,
{
    let rank = |candidate: &FrameworkName| {
        if candidate.identifier == target.identifier {
            0
        } else if candidate.is_portable() {
            2
        } else {
            1
        }
    };

    let mut compatible: Vec<&FrameworkName> = candidates
        .into_iter()
        .filter(|candidate| target.is_compatible_with(candidate))
        .collect();

    compatible.sort_by(|a, b| match rank(a).cmp(&rank(b)) {
        Ordering::Equal => b.version.cmp(&a.version),
        other => other,
    });
    compatible
}

fn lookup_short(short: &str) -> Option<&'static str> {
    KNOWN_IDENTIFIERS
        .iter()
        .find(|(s, _)| *s == short)
        .map(|(_, long)| *long)
}

fn lookup_long(long: &str) -> Option<&'static str> {
    KNOWN_IDENTIFIERS
        .iter()
        .find(|(_, l)| l.eq_ignore_ascii_case(long))
        .map(|(_, long)| *long)
}

/// Case-folds a profile. Portable members are canonicalized and sorted so
/// that `net45+win8` and `WIN8+net45` name the same framework.
fn normalize_profile(identifier: &str, profile: &str) -> Option<String> {
    if identifier != PORTABLE {
        return Some(capitalize(&profile.to_ascii_lowercase()));
    }
    if profile.is_empty() {
        return None;
    }

    let mut members = profile
        .split('+')
        .map(|member| FrameworkName::canonicalize(member).map(|name| name.short_name()))
        .collect::<Option<Vec<String>>>()?;
    members.sort();
    members.dedup();
    Some(members.join("+"))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `45` -> 4.5, `451` -> 4.5.1, `1.3` -> 1.3, empty -> 0.0.
fn parse_short_version(text: &str) -> Option<FrameworkVersion> {
    let mut version = [0u32; 4];
    if text.is_empty() {
        return Some(version);
    }

    if text.contains('.') {
        return parse_dotted_version(text);
    }

    if text.len() > 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    for (slot, digit) in version.iter_mut().zip(text.bytes()) {
        *slot = u32::from(digit - b'0');
    }
    Some(version)
}

fn parse_dotted_version(text: &str) -> Option<FrameworkVersion> {
    let mut version = [0u32; 4];
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() > 4 {
        return None;
    }
    for (slot, part) in version.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    Some(version)
}

/// `.NETFramework,Version=v4.5,Profile=Client`
fn parse_long_form(name: &str) -> Option<FrameworkName> {
    let mut parts = name.split(',').map(str::trim);
    let identifier = lookup_long(parts.next()?)?;

    let mut version = None;
    let mut profile = None;
    for part in parts {
        let (key, value) = part.split_once('=')?;
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "version" => {
                let digits = value.strip_prefix(['v', 'V']).unwrap_or(value);
                version = Some(parse_dotted_version(digits)?);
            }
            "profile" if !value.is_empty() => profile = Some(value.to_string()),
            _ => return None,
        }
    }

    let profile = match profile {
        Some(profile) => Some(normalize_profile(identifier, &profile)?),
        None if identifier == PORTABLE => return None,
        None => None,
    };

    // Portable frameworks are identified by their members alone.
    let version = if identifier == PORTABLE { [0; 4] } else { version? };

    Some(FrameworkName {
        identifier,
        version,
        profile,
    })
}

impl FromStr for FrameworkName {
    type Err = UnsupportedFramework;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FrameworkName::canonicalize(s).ok_or_else(|| UnsupportedFramework(s.to_string()))
    }
}

impl fmt::Display for FrameworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version: Vec<String> = self.version().iter().map(u32::to_string).collect();
        write!(f, "{},Version=v{}", self.identifier, version.join("."))?;
        if let Some(profile) = &self.profile {
            write!(f, ",Profile={}", profile)?;
        }
        Ok(())
    }
}

impl Serialize for FrameworkName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
