//! Probe output parsing with regex extraction.

use crate::ProbeError;
use regex::Regex;
use semver::Version;
use std::sync::OnceLock;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("Invalid regex pattern"))
}

/// First non-empty line of probe output, trimmed.
pub(crate) fn first_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|l| !l.is_empty())
}

/// Parse a semantic version (major.minor.patch) from probe output.
///
/// Trailing release markers such as `3.13.0rc1` are ignored; only the
/// numeric triple is kept.
pub(crate) fn parse_version(output: &str) -> Result<Version, ProbeError> {
    let caps = version_regex()
        .captures(output)
        .ok_or(ProbeError::MalformedOutput)?;
    let part = |i: usize| -> Result<u64, ProbeError> {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or(ProbeError::MalformedOutput)
    };
    Ok(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Parse a pointer width in bits (`32`, `64`) from probe output.
pub(crate) fn parse_pointer_bits(output: &str) -> Result<u32, ProbeError> {
    first_line(output)
        .and_then(|l| l.parse().ok())
        .ok_or(ProbeError::MalformedOutput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_version() {
        assert_eq!(parse_version("3.11.4").unwrap(), Version::new(3, 11, 4));
    }

    #[test]
    fn test_parse_version_with_newline() {
        assert_eq!(parse_version("2.7.18\r\n").unwrap(), Version::new(2, 7, 18));
    }

    #[test]
    fn test_parse_prerelease_keeps_numeric_triple() {
        assert_eq!(parse_version("3.13.0rc1").unwrap(), Version::new(3, 13, 0));
    }

    #[test]
    fn test_parse_version_incomplete() {
        assert!(matches!(
            parse_version("version 3.11"),
            Err(ProbeError::MalformedOutput)
        ));
    }

    #[test]
    fn test_parse_version_no_match() {
        assert!(matches!(
            parse_version("Traceback (most recent call last)"),
            Err(ProbeError::MalformedOutput)
        ));
    }

    #[test]
    fn test_parse_pointer_bits() {
        assert_eq!(parse_pointer_bits("64\n").unwrap(), 64);
        assert_eq!(parse_pointer_bits("\n  32  \n").unwrap(), 32);
        assert!(parse_pointer_bits("sixty-four").is_err());
        assert!(parse_pointer_bits("").is_err());
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(first_line("\n\n  /opt/env  \nmore"), Some("/opt/env"));
        assert_eq!(first_line("   \n"), None);
    }
}
