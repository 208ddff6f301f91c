//! Environment configuration records produced by probing.

use bitflags::bitflags;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Versions that are never reported, compared on `major.minor`.
pub const EXCLUDED_VERSIONS: &[(u64, u64)] = &[(2, 5), (3, 0)];

/// Whether `version` falls on the exclusion list.
///
/// Unknown versions are never excluded.
///
/// ```rust
/// use semver::Version;
/// use workspace_env_discovery::is_excluded_version;
///
/// assert!(is_excluded_version(Some(&Version::new(3, 0, 1))));
/// assert!(!is_excluded_version(Some(&Version::new(3, 12, 0))));
/// assert!(!is_excluded_version(None));
/// ```
pub fn is_excluded_version(version: Option<&Version>) -> bool {
    version.is_some_and(|v| EXCLUDED_VERSIONS.contains(&(v.major, v.minor)))
}

/// CPU architecture of an environment's executable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[non_exhaustive]
pub enum Architecture {
    /// 32-bit x86.
    #[strum(serialize = "x86")]
    X86,
    /// 64-bit x86.
    #[strum(serialize = "x64")]
    X64,
    /// The probe could not tell.
    #[strum(serialize = "unknown")]
    Unknown,
}

impl Architecture {
    /// Map a pointer width in bits to an architecture.
    pub fn from_pointer_bits(bits: u32) -> Self {
        match bits {
            32 => Self::X86,
            64 => Self::X64,
            _ => Self::Unknown,
        }
    }
}

bitflags! {
    /// Capabilities a UI should withhold for an environment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct UiMode: u32 {
        /// The environment cannot be made the global default.
        const CANNOT_BE_DEFAULT = 0b0001;
        /// The environment cannot be edited by the user.
        const CANNOT_BE_CONFIGURED = 0b0010;
    }
}

/// Immutable description of one discovered environment.
///
/// Two configurations are equal iff every field matches; the discovery
/// cache relies on this to decide whether a record changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentConfiguration {
    /// Stable, namespaced id (`<vendor-tag>:<folder-name>`).
    pub id: String,

    /// Human readable description.
    pub description: String,

    /// Installation prefix reported by the runtime itself.
    pub prefix_path: PathBuf,

    /// Primary executable.
    pub interpreter_path: PathBuf,

    /// Platform companion executable living next to the primary one.
    pub windowed_interpreter_path: Option<PathBuf>,

    /// Environment variable used to extend the module search path.
    pub path_env_var: String,

    /// CPU architecture.
    pub architecture: Architecture,

    /// Runtime version, `None` when the probe could not tell.
    pub version: Option<Version>,

    /// UI capability flags.
    pub ui_mode: UiMode,
}

impl EnvironmentConfiguration {
    /// Whether this configuration must be kept out of published results.
    pub fn is_excluded(&self) -> bool {
        is_excluded_version(self.version.as_ref())
    }
}

/// Render `name` with whatever version and architecture are known.
pub(crate) fn full_description(
    name: &str,
    version: Option<&Version>,
    architecture: Architecture,
) -> String {
    match (version, architecture) {
        (Some(v), Architecture::Unknown) => format!("{name} ({}.{})", v.major, v.minor),
        (Some(v), arch) => format!("{name} ({}.{}, {arch})", v.major, v.minor),
        (None, Architecture::Unknown) => name.to_string(),
        (None, arch) => format!("{name} ({arch})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn make_configuration(version: Option<Version>) -> EnvironmentConfiguration {
        EnvironmentConfiguration {
            id: "Workspace:env".to_string(),
            description: "env".to_string(),
            prefix_path: PathBuf::from("/ws/env"),
            interpreter_path: PathBuf::from("/ws/env/bin/python"),
            windowed_interpreter_path: None,
            path_env_var: "PYTHONPATH".to_string(),
            architecture: Architecture::X64,
            version,
            ui_mode: UiMode::CANNOT_BE_DEFAULT | UiMode::CANNOT_BE_CONFIGURED,
        }
    }

    #[test]
    fn test_excluded_versions() {
        assert!(make_configuration(Some(Version::new(2, 5, 4))).is_excluded());
        assert!(make_configuration(Some(Version::new(3, 0, 0))).is_excluded());
        assert!(!make_configuration(Some(Version::new(2, 7, 18))).is_excluded());
        assert!(!make_configuration(Some(Version::new(3, 11, 2))).is_excluded());
        assert!(!make_configuration(None).is_excluded());
    }

    #[test]
    fn test_structural_equality() {
        let a = make_configuration(Some(Version::new(3, 11, 2)));
        let mut b = a.clone();
        assert_eq!(a, b);

        b.ui_mode = UiMode::empty();
        assert_ne!(a, b);

        let mut c = a.clone();
        c.windowed_interpreter_path = Some(PathBuf::from("/ws/env/bin/pythonw"));
        assert_ne!(a, c);
    }

    #[test]
    fn test_architecture_strings() {
        assert_eq!(Architecture::X64.to_string(), "x64");
        assert_eq!(Architecture::from_str("x86").unwrap(), Architecture::X86);
        assert_eq!(Architecture::from_pointer_bits(64), Architecture::X64);
        assert_eq!(Architecture::from_pointer_bits(16), Architecture::Unknown);
    }

    #[test]
    fn test_ui_mode_flags() {
        assert_eq!(
            UiMode::all(),
            UiMode::CANNOT_BE_DEFAULT | UiMode::CANNOT_BE_CONFIGURED
        );
    }

    #[test]
    fn test_full_description() {
        let v = Version::new(3, 12, 1);
        assert_eq!(full_description("env", Some(&v), Architecture::X64), "env (3.12, x64)");
        assert_eq!(full_description("env", Some(&v), Architecture::Unknown), "env (3.12)");
        assert_eq!(full_description("env", None, Architecture::X86), "env (x86)");
        assert_eq!(full_description("env", None, Architecture::Unknown), "env");
    }

    #[test]
    fn test_serde_round_trip() {
        let config = make_configuration(Some(Version::new(3, 11, 2)));
        let json = serde_json::to_string(&config).unwrap();
        let back: EnvironmentConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
