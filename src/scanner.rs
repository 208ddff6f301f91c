//! Candidate enumeration for one rescan pass.

use crate::detection::{find_file, is_same_path, normalize_path, subdirectories};
use crate::{RuntimeLayout, Workspace, WorkspaceError};
use std::path::PathBuf;
use tracing::{debug, trace};

/// Extra directory levels searched below each workspace subfolder.
const SUBFOLDER_DEPTH: usize = 1;

/// Enumerates executables that might be environment entry points.
///
/// Two sources are combined:
///
/// 1. every immediate subfolder of the workspace root, searched down to one
///    extra level for the runtime executable (at most one hit per subfolder)
/// 2. the interpreter path configured in the workspace settings, resolved
///    against the root when relative, if it exists and was not already found
#[derive(Debug, Clone)]
pub struct CandidateScanner {
    layout: RuntimeLayout,
}

impl CandidateScanner {
    /// Scanner looking for executables named by `layout`.
    pub fn new(layout: RuntimeLayout) -> Self {
        Self { layout }
    }

    /// Candidates for `workspace`, normalized and free of duplicates.
    ///
    /// A workspace disposed mid-scan yields no candidates.
    pub fn scan(&self, workspace: &dyn Workspace) -> Vec<PathBuf> {
        self.try_scan(workspace).unwrap_or_else(|e| {
            debug!(error = %e, "workspace went away during scan");
            Vec::new()
        })
    }

    /// Like [`scan`](Self::scan), but reports disposal so a rescan can be
    /// abandoned instead of treated as "everything disappeared".
    pub(crate) fn try_scan(
        &self,
        workspace: &dyn Workspace,
    ) -> Result<Vec<PathBuf>, WorkspaceError> {
        let root = workspace.location()?;
        let mut found: Vec<PathBuf> = Vec::new();

        let dirs = subdirectories(&root).unwrap_or_else(|e| {
            debug!(root = %root.display(), error = %e, "cannot list workspace folder");
            Vec::new()
        });
        for dir in dirs {
            if let Some(exe) = find_file(&dir, &self.layout.executable_name, SUBFOLDER_DEPTH) {
                push_unique(&mut found, normalize_path(&exe));
            }
        }

        if let Some(setting) = workspace.interpreter_setting()? {
            let setting = setting.trim();
            if !setting.is_empty() {
                let configured = PathBuf::from(setting);
                let configured = if configured.is_absolute() {
                    configured
                } else {
                    root.join(configured)
                };
                let configured = normalize_path(&configured);
                if configured.is_file() {
                    push_unique(&mut found, configured);
                } else {
                    trace!(path = %configured.display(), "configured interpreter does not exist");
                }
            }
        }

        Ok(found)
    }
}

fn push_unique(found: &mut Vec<PathBuf>, path: PathBuf) {
    if !found.iter().any(|p| is_same_path(p, &path)) {
        found.push(path);
    }
}
