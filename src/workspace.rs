//! Workspace collaborator interfaces.
//!
//! Discovery never reads settings files or tracks the active folder itself.
//! The host implements [`Workspace`] and [`WorkspaceService`] and calls
//! [`WorkspaceDiscovery::active_workspace_changed`] /
//! [`WorkspaceDiscovery::settings_changed`] when its own events fire.
//!
//! [`WorkspaceDiscovery::active_workspace_changed`]: crate::WorkspaceDiscovery::active_workspace_changed
//! [`WorkspaceDiscovery::settings_changed`]: crate::WorkspaceDiscovery::settings_changed

use crate::WorkspaceError;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An open workspace folder.
pub trait Workspace: Send + Sync {
    /// Root directory of the workspace.
    fn location(&self) -> Result<PathBuf, WorkspaceError>;

    /// Interpreter path configured in the workspace settings, verbatim.
    ///
    /// May be relative to [`location`](Self::location).
    fn interpreter_setting(&self) -> Result<Option<String>, WorkspaceError>;
}

/// Source of the currently active workspace.
pub trait WorkspaceService: Send + Sync {
    /// The active workspace, if a folder is open.
    fn current_workspace(&self) -> Option<Arc<dyn Workspace>>;
}

/// In-memory [`Workspace`] over a plain folder.
///
/// ```rust
/// use workspace_env_discovery::{FolderWorkspace, Workspace};
///
/// let ws = FolderWorkspace::new("/src/project");
/// ws.set_interpreter_setting(Some("env/bin/python"));
/// assert_eq!(ws.interpreter_setting().unwrap().as_deref(), Some("env/bin/python"));
///
/// ws.dispose();
/// assert!(ws.location().is_err());
/// ```
#[derive(Debug)]
pub struct FolderWorkspace {
    root: PathBuf,
    interpreter: RwLock<Option<String>>,
    disposed: AtomicBool,
}

impl FolderWorkspace {
    /// Open `root` with no interpreter configured.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            interpreter: RwLock::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Replace the configured interpreter path.
    pub fn set_interpreter_setting(&self, value: Option<&str>) {
        *self.interpreter.write() = value.map(str::to_string);
    }

    /// Tear the workspace down; every later read fails with
    /// [`WorkspaceError::Disposed`].
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    fn check(&self) -> Result<(), WorkspaceError> {
        if self.disposed.load(Ordering::Acquire) {
            Err(WorkspaceError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl Workspace for FolderWorkspace {
    fn location(&self) -> Result<PathBuf, WorkspaceError> {
        self.check()?;
        Ok(self.root.clone())
    }

    fn interpreter_setting(&self) -> Result<Option<String>, WorkspaceError> {
        self.check()?;
        Ok(self.interpreter.read().clone())
    }
}

/// [`WorkspaceService`] holding a single swappable workspace.
#[derive(Default)]
pub struct ActiveWorkspace {
    current: RwLock<Option<Arc<dyn Workspace>>>,
}

impl ActiveWorkspace {
    /// Service with `workspace` already active.
    pub fn new(workspace: Arc<dyn Workspace>) -> Self {
        Self {
            current: RwLock::new(Some(workspace)),
        }
    }

    /// Switch the active workspace.
    pub fn set(&self, workspace: Option<Arc<dyn Workspace>>) {
        *self.current.write() = workspace;
    }
}

impl WorkspaceService for ActiveWorkspace {
    fn current_workspace(&self) -> Option<Arc<dyn Workspace>> {
        self.current.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_workspace_reads() {
        let ws = FolderWorkspace::new("/ws");
        assert_eq!(ws.location().unwrap(), PathBuf::from("/ws"));
        assert_eq!(ws.interpreter_setting().unwrap(), None);
    }

    #[test]
    fn test_disposed_workspace_fails_reads() {
        let ws = FolderWorkspace::new("/ws");
        ws.dispose();
        assert_eq!(ws.location(), Err(WorkspaceError::Disposed));
        assert_eq!(ws.interpreter_setting(), Err(WorkspaceError::Disposed));
    }

    #[test]
    fn test_active_workspace_swap() {
        let service = ActiveWorkspace::default();
        assert!(service.current_workspace().is_none());

        service.set(Some(Arc::new(FolderWorkspace::new("/a"))));
        let ws = service.current_workspace().unwrap();
        assert_eq!(ws.location().unwrap(), PathBuf::from("/a"));

        service.set(None);
        assert!(service.current_workspace().is_none());
    }
}
