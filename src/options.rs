//! Discovery options configuration.
//!
//! This module provides [`DiscoveryOptions`] for tuning discovery timing and
//! [`RuntimeLayout`] for describing which executables count as environments.

use std::time::Duration;

/// How a language runtime lays itself out on disk.
///
/// Discovery is driven entirely by these names: candidates are files whose
/// name matches [`executable_name`](Self::executable_name) case-insensitively,
/// and discovered ids are namespaced with [`vendor_tag`](Self::vendor_tag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLayout {
    /// Primary executable file name (e.g. `python.exe`).
    pub executable_name: String,

    /// Platform companion executable expected next to the primary one
    /// (e.g. the windowed `pythonw.exe`). Recorded only if present.
    pub windowed_executable_name: String,

    /// Environment variable used to extend the runtime's module search path.
    pub path_env_var: String,

    /// Namespace prefix for configuration ids (`<vendor_tag>:<folder>`).
    pub vendor_tag: String,

    /// Vendor name reported for discovered records.
    pub vendor_name: String,
}

impl RuntimeLayout {
    /// Layout of a CPython installation or virtual environment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use workspace_env_discovery::RuntimeLayout;
    ///
    /// let layout = RuntimeLayout::python();
    /// assert_eq!(layout.path_env_var, "PYTHONPATH");
    /// assert_eq!(layout.vendor_tag, "Workspace");
    /// ```
    pub fn python() -> Self {
        let (exe, windowed) = if cfg!(windows) {
            ("python.exe", "pythonw.exe")
        } else {
            ("python", "pythonw")
        };
        Self {
            executable_name: exe.to_string(),
            windowed_executable_name: windowed.to_string(),
            path_env_var: "PYTHONPATH".to_string(),
            vendor_tag: "Workspace".to_string(),
            vendor_name: "Workspace environment".to_string(),
        }
    }

    /// Build the stable id for an environment rooted at `folder_name`.
    ///
    /// ```rust
    /// use workspace_env_discovery::RuntimeLayout;
    ///
    /// assert_eq!(RuntimeLayout::python().environment_id("env"), "Workspace:env");
    /// ```
    pub fn environment_id(&self, folder_name: &str) -> String {
        format!("{}:{}", self.vendor_tag, folder_name)
    }
}

impl Default for RuntimeLayout {
    fn default() -> Self {
        Self::python()
    }
}

/// Configuration options for workspace discovery.
///
/// # Default Behavior
///
/// Bursts of new executables are coalesced over one second, each probe
/// subprocess gets five seconds, and factories are asked to watch their
/// environment's files.
///
/// # Example
///
/// ```rust
/// use workspace_env_discovery::DiscoveryOptions;
/// use std::time::Duration;
///
/// let opts = DiscoveryOptions {
///     debounce_delay: Duration::from_millis(250),
///     ..Default::default()
/// };
/// assert_eq!(opts.probe_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Quiet period after the last matching file creation before a rescan.
    ///
    /// Default: 1000 ms
    pub debounce_delay: Duration,

    /// Upper bound for each probe subprocess. A probe that runs longer is
    /// treated as a rejected candidate.
    ///
    /// Default: 5 seconds
    pub probe_timeout: Duration,

    /// Passed through to every created factory.
    ///
    /// Default: `true`
    pub watch_file_system: bool,

    /// Executable naming and id scheme.
    pub runtime: RuntimeLayout,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            debounce_delay: Duration::from_millis(1000),
            probe_timeout: Duration::from_secs(5),
            watch_file_system: true,
            runtime: RuntimeLayout::python(),
        }
    }
}
