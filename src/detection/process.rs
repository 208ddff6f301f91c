//! Async probe subprocess with timeout.

use crate::ProbeError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Run `executable -c <script>` and capture its standard output.
///
/// The child is killed if it outlives `limit`.
///
/// # Returns
///
/// `Ok(String)` with stdout on a zero exit status, or a [`ProbeError`]:
/// - `NotFound` / `PermissionDenied` / `Io` if the process cannot start
/// - `Timeout` if it takes longer than `limit`
/// - `NonZeroExit` if it exits unsuccessfully
/// - `MalformedOutput` if stdout is not valid UTF-8
pub(crate) async fn run_script(
    executable: &Path,
    script: &str,
    limit: Duration,
) -> Result<String, ProbeError> {
    let mut command = Command::new(executable);
    command
        .arg("-c")
        .arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = timeout(limit, command.output())
        .await
        .map_err(|_| ProbeError::Timeout)??;

    if !output.status.success() {
        return Err(ProbeError::NonZeroExit {
            code: output.status.code(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| ProbeError::MalformedOutput)
}
