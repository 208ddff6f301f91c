//! Out-of-process environment probing.

use crate::configuration::full_description;
use crate::detection::{first_line, parse_pointer_bits, parse_version, run_script};
use crate::{Architecture, EnvironmentConfiguration, ProbeError, RuntimeLayout, UiMode};
use futures::future::BoxFuture;
use semver::Version;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

const PREFIX_SCRIPT: &str = "import sys; print(sys.prefix)";
const POINTER_BITS_SCRIPT: &str = "import struct; print(struct.calcsize('P') * 8)";
const VERSION_SCRIPT: &str = "import sys; print('%d.%d.%d' % sys.version_info[:3])";

/// Turns a candidate executable into a configuration.
///
/// Implementations must reject unusable candidates with `Ok(None)` and keep
/// `Err` for failures the caller has to hear about.
pub trait EnvironmentProbe: Send + Sync {
    /// Probe `executable`.
    fn probe<'a>(
        &'a self,
        executable: &'a Path,
    ) -> BoxFuture<'a, Result<Option<EnvironmentConfiguration>, ProbeError>>;
}

/// Probe that runs the candidate itself to ask for its prefix, pointer
/// width and version.
///
/// # Detection Process
///
/// 1. Reject the candidate if the file does not exist
/// 2. Run `{exe} -c "import sys; print(sys.prefix)"`; reject on failure or
///    if the printed prefix is not an existing directory
/// 3. Ask for pointer width and version concurrently; either may come back
///    unknown without rejecting the candidate
/// 4. Build the configuration, id = `<vendor_tag>:<prefix folder name>`
#[derive(Debug, Clone)]
pub struct InterpreterProbe {
    layout: RuntimeLayout,
    timeout: Duration,
}

impl InterpreterProbe {
    /// Probe for executables laid out as `layout`, giving each subprocess
    /// at most `timeout`.
    pub fn new(layout: RuntimeLayout, timeout: Duration) -> Self {
        Self { layout, timeout }
    }

    async fn prefix(&self, executable: &Path) -> Result<Option<PathBuf>, ProbeError> {
        let output = match run_script(executable, PREFIX_SCRIPT, self.timeout).await {
            Ok(output) => output,
            Err(e) if e.is_soft() => {
                debug!(path = %executable.display(), error = %e, "prefix probe rejected candidate");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let prefix = first_line(&output).map(PathBuf::from);
        Ok(prefix.filter(|p| p.is_dir()))
    }

    async fn architecture(&self, executable: &Path) -> Architecture {
        match run_script(executable, POINTER_BITS_SCRIPT, self.timeout)
            .await
            .and_then(|out| parse_pointer_bits(&out))
        {
            Ok(bits) => Architecture::from_pointer_bits(bits),
            Err(e) => {
                trace!(path = %executable.display(), error = %e, "architecture unknown");
                Architecture::Unknown
            }
        }
    }

    async fn version(&self, executable: &Path) -> Option<Version> {
        match run_script(executable, VERSION_SCRIPT, self.timeout)
            .await
            .and_then(|out| parse_version(&out))
        {
            Ok(version) => Some(version),
            Err(e) => {
                trace!(path = %executable.display(), error = %e, "version unknown");
                None
            }
        }
    }

    async fn probe_inner(
        &self,
        executable: &Path,
    ) -> Result<Option<EnvironmentConfiguration>, ProbeError> {
        if !executable.is_file() {
            return Ok(None);
        }

        let Some(prefix) = self.prefix(executable).await? else {
            return Ok(None);
        };
        let Some(name) = prefix.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(None);
        };

        let (architecture, version) =
            futures::join!(self.architecture(executable), self.version(executable));

        let windowed_interpreter_path = executable
            .parent()
            .map(|dir| dir.join(&self.layout.windowed_executable_name))
            .filter(|p| p.is_file());

        Ok(Some(EnvironmentConfiguration {
            id: self.layout.environment_id(&name),
            description: full_description(&name, version.as_ref(), architecture),
            prefix_path: prefix,
            interpreter_path: executable.to_path_buf(),
            windowed_interpreter_path,
            path_env_var: self.layout.path_env_var.clone(),
            architecture,
            version,
            ui_mode: UiMode::CANNOT_BE_DEFAULT | UiMode::CANNOT_BE_CONFIGURED,
        }))
    }
}

impl Default for InterpreterProbe {
    fn default() -> Self {
        Self::new(RuntimeLayout::python(), Duration::from_secs(5))
    }
}

impl EnvironmentProbe for InterpreterProbe {
    fn probe<'a>(
        &'a self,
        executable: &'a Path,
    ) -> BoxFuture<'a, Result<Option<EnvironmentConfiguration>, ProbeError>> {
        Box::pin(self.probe_inner(executable))
    }
}
