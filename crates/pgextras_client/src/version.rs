use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ExtrasError, ExtrasResult};

/// First release that renamed `procpid`/`current_query` to `pid`/`query`.
pub const RECENT_VERSION_THRESHOLD: ServerVersion = ServerVersion::new(9, 2, 0);

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
    VERSION_RE.get_or_init(|| {
        Regex::new(r"^PostgreSQL (\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("static regex")
    })
}

/// Server version parsed from the output of `SELECT version()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `"PostgreSQL 9.1.3 on x86_64-pc-linux-gnu, ..."`.
    ///
    /// Two-part (`12.4`) and one-part (`17beta1`) versions are accepted with
    /// the missing components read as zero.
    pub fn parse(version_string: &str) -> ExtrasResult<Self> {
        let caps = version_re().captures(version_string.trim_start()).ok_or_else(|| {
            ExtrasError::Parse(format!(
                "unrecognised server version string: {:?}",
                version_string
            ))
        })?;

        let component = |idx: usize| -> ExtrasResult<u32> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse().map_err(|_| {
                    ExtrasError::Parse(format!("version component out of range: {}", m.as_str()))
                }),
                None => Ok(0),
            }
        };

        Ok(Self::new(component(1)?, component(2)?, component(3)?))
    }

    /// True when the server uses the `pid`/`query` column names.
    pub fn is_recent(&self) -> bool {
        *self >= RECENT_VERSION_THRESHOLD
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_part_version() {
        let v = ServerVersion::parse(
            "PostgreSQL 9.1.3 on x86_64-unknown-linux-gnu, compiled by gcc 4.6.3, 64-bit",
        )
        .unwrap();
        assert_eq!(v, ServerVersion::new(9, 1, 3));
        assert!(!v.is_recent());
    }

    #[test]
    fn test_parse_modern_versions() {
        let v = ServerVersion::parse("PostgreSQL 12.4.0 on x86_64-pc-linux-gnu").unwrap();
        assert!(v.is_recent());

        let v = ServerVersion::parse("PostgreSQL 12.4 on x86_64-pc-linux-gnu").unwrap();
        assert_eq!(v, ServerVersion::new(12, 4, 0));

        let v = ServerVersion::parse(
            "PostgreSQL 16.2 (Debian 16.2-1.pgdg120+2) on x86_64-pc-linux-gnu",
        )
        .unwrap();
        assert_eq!(v, ServerVersion::new(16, 2, 0));
    }

    #[test]
    fn test_threshold_is_inclusive_and_numeric() {
        assert!(ServerVersion::new(9, 2, 0).is_recent());
        assert!(!ServerVersion::new(9, 1, 24).is_recent());
        // 9.10 sorts before 9.2 as text; numerically it is newer.
        assert!(ServerVersion::new(9, 10, 0).is_recent());
        assert!(ServerVersion::new(10, 0, 0).is_recent());
    }

    #[test]
    fn test_parse_rejects_other_servers() {
        let err = ServerVersion::parse("MySQL 8.0.36").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
        assert!(ServerVersion::parse("").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ServerVersion::new(9, 2, 0).to_string(), "9.2.0");
    }
}
