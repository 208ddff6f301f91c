//! Public discovery provider.

use crate::engine::DiscoveryEngine;
use crate::observers::{Callback, SubscriptionId};
use crate::{
    DiscoveryError, DiscoveryOptions, EnvironmentConfiguration, EnvironmentFactory,
    EnvironmentProbe, EnvironmentRecord, FactoryOptions, InterpreterProbe, WorkspaceService,
};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::warn;

/// Keys accepted by [`WorkspaceDiscovery::property`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[non_exhaustive]
pub enum PropertyKey {
    /// Vendor name of the record with the given id.
    Company,
    /// Whether interactive windows for these environments persist. Always
    /// `true`, for any id.
    PersistInteractive,
}

/// Value returned by [`WorkspaceDiscovery::property`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Flag(bool),
}

/// Discovers and caches the environments of the active workspace.
///
/// The handle is cheap to clone; clones share one cache. Nothing happens
/// until the first query or subscription, which sets up the folder watch
/// and runs the initial rescan.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use workspace_env_discovery::{
///     ActiveWorkspace, DiscoveryOptions, FolderWorkspace, WorkspaceDiscovery,
/// };
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let workspace = Arc::new(FolderWorkspace::new("/src/project"));
///     let service = Arc::new(ActiveWorkspace::new(workspace));
///     let discovery = WorkspaceDiscovery::new(service, DiscoveryOptions::default());
///
///     for config in discovery.configurations().await? {
///         println!("{}: {}", config.id, config.interpreter_path.display());
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WorkspaceDiscovery {
    engine: Arc<DiscoveryEngine>,
}

impl WorkspaceDiscovery {
    /// Provider probing candidates with [`InterpreterProbe`].
    pub fn new(service: Arc<dyn WorkspaceService>, options: DiscoveryOptions) -> Self {
        let probe = InterpreterProbe::new(options.runtime.clone(), options.probe_timeout);
        Self::with_probe(service, Arc::new(probe), options)
    }

    /// Provider probing candidates with a custom probe.
    pub fn with_probe(
        service: Arc<dyn WorkspaceService>,
        probe: Arc<dyn EnvironmentProbe>,
        options: DiscoveryOptions,
    ) -> Self {
        Self {
            engine: Arc::new(DiscoveryEngine::new(service, probe, options)),
        }
    }

    /// Snapshot of every discovered configuration, ordered by id.
    pub async fn configurations(&self) -> Result<Vec<EnvironmentConfiguration>, DiscoveryError> {
        self.engine.ensure_initialized().await?;
        Ok(self.engine.state.lock().records.configurations())
    }

    /// The cached record for `id`.
    pub async fn record(
        &self,
        id: &str,
    ) -> Result<Option<Arc<EnvironmentRecord>>, DiscoveryError> {
        self.engine.ensure_initialized().await?;
        Ok(self.engine.state.lock().records.get(id))
    }

    /// The factory for `id`, created on first request.
    ///
    /// Repeated calls return the same instance until the configuration for
    /// `id` changes.
    pub async fn factory(
        &self,
        id: &str,
    ) -> Result<Option<Arc<EnvironmentFactory>>, DiscoveryError> {
        let options = FactoryOptions {
            watch_file_system: self.engine.options.watch_file_system,
        };
        Ok(self
            .record(id)
            .await?
            .map(|record| record.get_or_create_factory(options)))
    }

    /// Call `callback` after every rescan that changed the configuration
    /// list. Subscribing initializes discovery first; that initial rescan is
    /// not reported to this subscriber.
    pub async fn subscribe_changed<F>(&self, callback: F) -> Result<SubscriptionId, DiscoveryError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.engine.ensure_initialized().await?;
        Ok(self.engine.changed.subscribe(Arc::new(callback) as Callback))
    }

    pub fn unsubscribe_changed(&self, id: SubscriptionId) -> bool {
        self.engine.changed.unsubscribe(id)
    }

    /// Call `callback` whenever a rescan actually starts.
    pub fn subscribe_discovery_started<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.engine.started.subscribe(Arc::new(callback) as Callback)
    }

    pub fn unsubscribe_discovery_started(&self, id: SubscriptionId) -> bool {
        self.engine.started.unsubscribe(id)
    }

    /// Look up a provider property. Does not trigger discovery.
    pub fn property(&self, id: &str, key: PropertyKey) -> Option<PropertyValue> {
        match key {
            PropertyKey::Company => self
                .engine
                .state
                .lock()
                .records
                .get(id)
                .map(|record| PropertyValue::Text(record.vendor().to_string())),
            PropertyKey::PersistInteractive => Some(PropertyValue::Flag(true)),
        }
    }

    /// Pause automatic rescans until the returned guard goes away.
    ///
    /// Releasing the outermost guard always runs one rescan, whether or not
    /// anything was skipped in the meantime. A guard dropped outside a
    /// runtime schedules that rescan on the runtime it was created on, or
    /// else the one discovery first ran on. With neither, nothing
    /// has been discovered yet and the rescan is skipped.
    pub fn suppress_discovery(&self) -> SuppressionGuard {
        self.engine.begin_suppression();
        SuppressionGuard {
            engine: Some(Arc::clone(&self.engine)),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Rescan now. Before the first query this performs initialization.
    pub async fn rescan(&self) -> Result<(), DiscoveryError> {
        if !self.engine.initialized.initialized() {
            return self.engine.ensure_initialized().await;
        }
        self.engine.rescan().await
    }

    /// The host's active workspace changed: rebuild the watch and rescan.
    pub async fn active_workspace_changed(&self) -> Result<(), DiscoveryError> {
        if self.engine.is_disposed() {
            return Ok(());
        }
        self.engine.initialize_workspace();
        let _ = self.engine.initialized.set(());
        self.engine.rescan().await
    }

    /// The active workspace's settings changed.
    ///
    /// Ignored until discovery has been initialized.
    pub async fn settings_changed(&self) -> Result<(), DiscoveryError> {
        if self.engine.initialized.initialized() {
            self.engine.rescan().await
        } else {
            Ok(())
        }
    }

    /// Report a file created under the workspace root, for hosts that
    /// deliver their own filesystem events.
    pub fn file_created(&self, path: impl AsRef<Path>) {
        self.engine.file_created(path.as_ref());
    }

    /// Whether the workspace root is currently being watched.
    pub fn is_watching(&self) -> bool {
        self.engine
            .state
            .lock()
            .watch
            .as_ref()
            .is_some_and(|w| w.is_watching())
    }

    /// Stop watching and drop all subscribers. Every later notification is
    /// a no-op.
    pub fn dispose(&self) {
        self.engine.dispose();
    }
}

/// Scope during which automatic discovery is paused.
///
/// Prefer [`release`](Self::release), which waits for the resulting rescan
/// and reports its errors. Dropping the guard releases it too; the rescan
/// then runs in the background on the runtime the guard was created on.
#[must_use = "discovery resumes as soon as the guard is dropped"]
pub struct SuppressionGuard {
    engine: Option<Arc<DiscoveryEngine>>,
    runtime: Option<Handle>,
}

impl SuppressionGuard {
    /// Release the scope, rescanning if it was the outermost one.
    pub async fn release(mut self) -> Result<(), DiscoveryError> {
        match self.engine.take() {
            Some(engine) if engine.end_suppression() => engine.rescan().await,
            _ => Ok(()),
        }
    }
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };
        if !engine.end_suppression() {
            return;
        }
        let runtime = Handle::try_current()
            .ok()
            .or_else(|| self.runtime.take())
            .or_else(|| engine.runtime());
        let Some(runtime) = runtime else {
            warn!("suppression released outside a runtime, rescan skipped");
            return;
        };
        runtime.spawn(async move {
            if let Err(e) = engine.rescan().await {
                warn!(error = %e, "rescan after suppression failed");
            }
        });
    }
}
