//! Rescan orchestration: scan, probe, diff, notify.

use crate::cache::RecordCache;
use crate::debounce::{Debouncer, FolderWatch};
use crate::observers::Observers;
use crate::{
    CandidateScanner, DiscoveryError, DiscoveryOptions, EnvironmentProbe, EnvironmentRecord,
    Workspace, WorkspaceService,
};
use futures::future::join_all;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

/// Everything guarded by the engine lock.
#[derive(Default)]
pub(crate) struct DiscoveryState {
    pub(crate) workspace: Option<Arc<dyn Workspace>>,
    pub(crate) watch: Option<FolderWatch>,
    pub(crate) records: RecordCache,
}

pub(crate) struct DiscoveryEngine {
    pub(crate) options: DiscoveryOptions,
    service: Arc<dyn WorkspaceService>,
    probe: Arc<dyn EnvironmentProbe>,
    scanner: CandidateScanner,
    pub(crate) state: Mutex<DiscoveryState>,
    suppression: AtomicUsize,
    in_flight: tokio::sync::Mutex<()>,
    pub(crate) initialized: tokio::sync::OnceCell<()>,
    pub(crate) changed: Observers,
    pub(crate) started: Observers,
    disposed: AtomicBool,
    runtime: OnceLock<Handle>,
}

impl DiscoveryEngine {
    pub(crate) fn new(
        service: Arc<dyn WorkspaceService>,
        probe: Arc<dyn EnvironmentProbe>,
        options: DiscoveryOptions,
    ) -> Self {
        Self {
            scanner: CandidateScanner::new(options.runtime.clone()),
            options,
            service,
            probe,
            state: Mutex::new(DiscoveryState::default()),
            suppression: AtomicUsize::new(0),
            in_flight: tokio::sync::Mutex::new(()),
            initialized: tokio::sync::OnceCell::new(),
            changed: Observers::default(),
            started: Observers::default(),
            disposed: AtomicBool::new(false),
            runtime: OnceLock::new(),
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Runtime for background rescans requested from outside any runtime.
    pub(crate) fn runtime(&self) -> Option<Handle> {
        self.runtime.get().cloned()
    }

    /// Run the first workspace setup and rescan exactly once.
    ///
    /// The engine counts as initialized even when that first rescan fails.
    /// Only the caller that ran it sees the error; later queries get the
    /// cache as it stands.
    pub(crate) async fn ensure_initialized(self: &Arc<Self>) -> Result<(), DiscoveryError> {
        if self.is_disposed() {
            return Ok(());
        }
        let mut first = None;
        let slot = &mut first;
        self.initialized
            .get_or_init(|| async move {
                self.initialize_workspace();
                *slot = Some(self.rescan().await);
            })
            .await;
        first.unwrap_or(Ok(()))
    }

    /// Swap in the service's current workspace, replacing the watch and
    /// timer of the previous one.
    pub(crate) fn initialize_workspace(self: &Arc<Self>) {
        let mut state = self.state.lock();
        // old handles go before new ones are created
        state.watch = None;
        state.workspace = self.service.current_workspace();

        let root = match state.workspace.as_ref().map(|ws| ws.location()) {
            Some(Ok(root)) => root,
            Some(Err(e)) => {
                debug!(error = %e, "active workspace unusable, not watching");
                return;
            }
            None => return,
        };
        debug!(root = %root.display(), "workspace activated");
        state.watch = Some(self.start_watch(&root));
    }

    fn start_watch(self: &Arc<Self>, root: &Path) -> FolderWatch {
        let engine = Arc::downgrade(self);
        let debouncer = Debouncer::spawn(
            self.options.debounce_delay,
            self.options.runtime.executable_name.clone(),
            move || {
                let engine = engine.clone();
                async move {
                    let Some(engine) = engine.upgrade() else {
                        trace!("debounce fired after teardown, discarded");
                        return;
                    };
                    if let Err(e) = engine.rescan().await {
                        warn!(error = %e, "rescan after new executable failed");
                    }
                }
            },
        );
        FolderWatch::start(root, debouncer)
    }

    /// One full scan-probe-diff-notify pass.
    pub(crate) async fn rescan(&self) -> Result<(), DiscoveryError> {
        if self.is_disposed() {
            return Ok(());
        }
        if self.runtime.get().is_none() {
            if let Ok(handle) = Handle::try_current() {
                let _ = self.runtime.set(handle);
            }
        }
        if self.suppression.load(Ordering::Acquire) > 0 {
            trace!("rescan suppressed");
            return Ok(());
        }

        self.started.notify();

        let _in_flight = self.in_flight.lock().await;
        let workspace = self.state.lock().workspace.clone();

        let Some(found) = self.discover(workspace.as_deref()).await? else {
            debug!("workspace disposed mid-rescan, results dropped");
            return Ok(());
        };

        let count = found.len();
        let changed = self.state.lock().records.merge(found);
        debug!(environments = count, changed, "rescan finished");

        if changed && !self.is_disposed() {
            self.changed.notify();
        }
        Ok(())
    }

    /// Probe every candidate of `workspace`, in candidate order.
    ///
    /// `Ok(None)` means the workspace was disposed while we were looking.
    async fn discover(
        &self,
        workspace: Option<&dyn Workspace>,
    ) -> Result<Option<Vec<EnvironmentRecord>>, DiscoveryError> {
        let Some(workspace) = workspace else {
            return Ok(Some(Vec::new()));
        };
        let Ok(candidates) = self.scanner.try_scan(workspace) else {
            return Ok(None);
        };

        let probes = candidates.iter().map(|exe| async move {
            (exe, self.probe.probe(exe).await)
        });
        let results = join_all(probes).await;

        if workspace.location().is_err() {
            return Ok(None);
        }

        let mut found = Vec::with_capacity(results.len());
        for (exe, result) in results {
            match result {
                Ok(Some(config)) if config.is_excluded() => {
                    debug!(id = %config.id, version = ?config.version, "excluded version skipped");
                }
                Ok(Some(config)) => {
                    found.push(EnvironmentRecord::new(
                        config,
                        self.options.runtime.vendor_name.clone(),
                    ));
                }
                Ok(None) => trace!(path = %exe.display(), "candidate rejected"),
                Err(e) if e.is_soft() => {
                    debug!(path = %exe.display(), error = %e, "candidate skipped")
                }
                Err(source) => {
                    return Err(DiscoveryError::Probe {
                        path: exe.clone(),
                        source,
                    })
                }
            }
        }
        Ok(Some(found))
    }

    pub(crate) fn begin_suppression(&self) {
        let depth = self.suppression.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(depth, "discovery suppressed");
    }

    /// Returns `true` when the outermost scope was released.
    pub(crate) fn end_suppression(&self) -> bool {
        let previous = self.suppression.fetch_sub(1, Ordering::AcqRel);
        trace!(depth = previous - 1, "suppression released");
        previous == 1
    }

    pub(crate) fn file_created(&self, path: &Path) {
        if let Some(watch) = self.state.lock().watch.as_ref() {
            watch.file_created(path);
        }
    }

    /// Terminal teardown; later triggers become no-ops.
    pub(crate) fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let watch = {
            let mut state = self.state.lock();
            state.workspace = None;
            state.watch.take()
        };
        drop(watch);
        self.changed.clear();
        self.started.clear();
        debug!("discovery disposed");
    }
}
