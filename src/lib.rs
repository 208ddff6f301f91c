//! # workspace-env-discovery
//!
//! Finds the language environments that live inside a workspace folder,
//! describes them, and keeps that description current.
//!
//! An environment is any folder under the workspace root whose runtime
//! executable (e.g. `python`) sits directly inside it or one level below,
//! plus the interpreter named in the workspace settings. Each candidate is
//! run out-of-process to learn its prefix, architecture and version.
//!
//! ## Features
//!
//! - [`WorkspaceDiscovery`]: lazily initialized, cloneable provider with a
//!   thread-safe cache, change notifications, and one memoized
//!   [`EnvironmentFactory`] per record
//! - automatic rescans when a new runtime executable appears under the
//!   root, debounced over [`DiscoveryOptions::debounce_delay`]
//! - [`SuppressionGuard`] to pause discovery around bulk operations
//! - [`EnvironmentProbe`] seam for custom probing
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workspace_env_discovery::{
//!     ActiveWorkspace, DiscoveryOptions, FolderWorkspace, WorkspaceDiscovery,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let workspace = Arc::new(FolderWorkspace::new("/src/project"));
//!     let discovery = WorkspaceDiscovery::new(
//!         Arc::new(ActiveWorkspace::new(workspace)),
//!         DiscoveryOptions::default(),
//!     );
//!
//!     discovery
//!         .subscribe_changed(|| println!("environments changed"))
//!         .await?;
//!
//!     {
//!         let _paused = discovery.suppress_discovery();
//!         // create several environments without intermediate rescans
//!     }
//!
//!     if let Some(factory) = discovery.factory("Workspace:env").await? {
//!         println!("{:?}", factory.configuration().version);
//!     }
//!     Ok(())
//! }
//! ```

mod cache;
mod configuration;
mod debounce;
mod detection;
mod discovery;
mod engine;
mod error;
mod observers;
mod options;
mod probe;
mod record;
mod scanner;
mod workspace;

pub use configuration::{
    is_excluded_version, Architecture, EnvironmentConfiguration, UiMode, EXCLUDED_VERSIONS,
};
pub use discovery::{PropertyKey, PropertyValue, SuppressionGuard, WorkspaceDiscovery};
pub use error::{DiscoveryError, ProbeError, WorkspaceError};
pub use observers::{Callback, SubscriptionId};
pub use options::{DiscoveryOptions, RuntimeLayout};
pub use probe::{EnvironmentProbe, InterpreterProbe};
pub use record::{EnvironmentFactory, EnvironmentRecord, FactoryOptions};
pub use scanner::CandidateScanner;
pub use workspace::{ActiveWorkspace, FolderWorkspace, Workspace, WorkspaceService};
