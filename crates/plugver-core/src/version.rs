//! Version parsing and bump computation.
//!
//! Versions are plain `major.minor.patch` triples. Pre-release and build
//! metadata are not modeled, so parsing rejects them.

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from version operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionError {
    /// The string is not a `major.minor.patch` triple of non-negative integers.
    #[error("invalid version `{input}`: {reason}")]
    Invalid {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Bumping would push a component past `u64::MAX`.
    #[error("cannot apply {level} bump to {version}: component would overflow")]
    Overflow {
        /// The version that could not be bumped.
        version: Version,
        /// The requested bump.
        level: BumpLevel,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Semver bump level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    /// Major release (X.0.0).
    Major,
    /// Minor release (x.Y.0).
    Minor,
    /// Patch release (x.y.Z).
    Patch,
}

impl std::fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

/// Compute the next version by applying a bump level.
///
/// Fails instead of wrapping when the bumped component is already `u64::MAX`.
pub fn next_version(current: &Version, level: BumpLevel) -> VersionResult<Version> {
    let next = match level {
        BumpLevel::Patch => current
            .patch
            .checked_add(1)
            .map(|patch| Version::new(current.major, current.minor, patch)),
        BumpLevel::Minor => current
            .minor
            .checked_add(1)
            .map(|minor| Version::new(current.major, minor, 0)),
        BumpLevel::Major => current
            .major
            .checked_add(1)
            .map(|major| Version::new(major, 0, 0)),
    };
    next.ok_or_else(|| VersionError::Overflow {
        version: current.clone(),
        level,
    })
}

/// Parse a `major.minor.patch` string.
///
/// Splits on `.` and requires exactly three segments of ASCII digits.
pub fn parse_version(s: &str) -> VersionResult<Version> {
    let invalid = |reason| VersionError::Invalid {
        input: s.to_owned(),
        reason,
    };

    let segments: Vec<&str> = s.split('.').collect();
    let [major, minor, patch] = *segments.as_slice() else {
        return Err(invalid("expected three dot-separated components"));
    };

    let component = |segment: &str| -> VersionResult<u64> {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("components must be non-negative integers"));
        }
        segment
            .parse()
            .map_err(|_| invalid("component is out of range"))
    };

    Ok(Version::new(
        component(major)?,
        component(minor)?,
        component(patch)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(next_version(&v, BumpLevel::Patch).unwrap(), Version::new(1, 2, 4));
    }

    #[test]
    fn bump_minor() {
        let v = Version::new(1, 2, 3);
        assert_eq!(next_version(&v, BumpLevel::Minor).unwrap(), Version::new(1, 3, 0));
    }

    #[test]
    fn bump_major() {
        let v = Version::new(1, 2, 3);
        assert_eq!(next_version(&v, BumpLevel::Major).unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn bump_from_zero() {
        let v = Version::new(0, 0, 0);
        assert_eq!(next_version(&v, BumpLevel::Patch).unwrap(), Version::new(0, 0, 1));
        assert_eq!(next_version(&v, BumpLevel::Minor).unwrap(), Version::new(0, 1, 0));
        assert_eq!(next_version(&v, BumpLevel::Major).unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn repeated_bumps_strictly_increase() {
        let mut v = Version::new(1, 4, 0);
        for level in [BumpLevel::Patch, BumpLevel::Patch, BumpLevel::Minor, BumpLevel::Major] {
            let next = next_version(&v, level).unwrap();
            assert!(next > v, "{next} should be greater than {v}");
            v = next;
        }
        assert_eq!(v, Version::new(2, 0, 0));
    }

    #[test]
    fn bump_at_u64_max_is_an_overflow_error() {
        let max = u64::MAX;
        let cases = [
            (Version::new(1, 2, max), BumpLevel::Patch),
            (Version::new(1, max, 3), BumpLevel::Minor),
            (Version::new(max, 2, 3), BumpLevel::Major),
        ];
        for (v, level) in cases {
            let err = next_version(&v, level).unwrap_err();
            assert_eq!(
                err,
                VersionError::Overflow {
                    version: v.clone(),
                    level
                }
            );
            assert!(err.to_string().contains(&max.to_string()), "{err}");
        }
    }

    #[test]
    fn lower_components_at_max_still_bump() {
        let max = u64::MAX;
        assert_eq!(
            next_version(&Version::new(1, max, max), BumpLevel::Major).unwrap(),
            Version::new(2, 0, 0)
        );
        assert_eq!(
            next_version(&Version::new(1, 2, max), BumpLevel::Minor).unwrap(),
            Version::new(1, 3, 0)
        );
    }

    #[test]
    fn parse_plain_triple() {
        assert_eq!(parse_version("1.4.0").unwrap(), Version::new(1, 4, 0));
    }

    #[test]
    fn parse_keeps_leading_zeros_numeric() {
        assert_eq!(parse_version("01.002.3").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn parse_rejects_two_components() {
        assert!(parse_version("1.2").is_err());
    }

    #[test]
    fn parse_rejects_non_numeric_component() {
        let err = parse_version("1.2.x").unwrap_err();
        assert!(err.to_string().contains("1.2.x"));
    }

    #[test]
    fn parse_rejects_prerelease_suffix() {
        assert!(parse_version("1.2.3-beta").is_err());
        assert!(parse_version("1.2.3+build").is_err());
    }

    #[test]
    fn parse_rejects_signs_and_whitespace() {
        assert!(parse_version("+1.2.3").is_err());
        assert!(parse_version("1.2.3 ").is_err());
        assert!(parse_version("").is_err());
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(parse_version("1.2.99999999999999999999999").is_err());
    }

    #[test]
    fn bump_level_display_matches_cli_literal() {
        assert_eq!(BumpLevel::Major.to_string(), "major");
        assert_eq!(BumpLevel::Minor.to_string(), "minor");
        assert_eq!(BumpLevel::Patch.to_string(), "patch");
    }
}
