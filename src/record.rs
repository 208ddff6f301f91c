//! Cached records and their lazily created factories.

use crate::EnvironmentConfiguration;
use std::sync::{Arc, OnceLock};

/// Options handed to every factory at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FactoryOptions {
    /// Whether the factory should watch its environment's files for changes.
    pub watch_file_system: bool,
}

/// Heavyweight per-environment object consumers work with.
///
/// At most one is alive per record; a record replaced because its
/// configuration changed gets a fresh factory on next request.
#[derive(Debug)]
pub struct EnvironmentFactory {
    configuration: EnvironmentConfiguration,
    options: FactoryOptions,
}

impl EnvironmentFactory {
    /// Create a factory for `configuration`.
    pub fn new(configuration: EnvironmentConfiguration, options: FactoryOptions) -> Self {
        Self {
            configuration,
            options,
        }
    }

    /// Configuration this factory was built from.
    pub fn configuration(&self) -> &EnvironmentConfiguration {
        &self.configuration
    }

    /// Creation options.
    pub fn options(&self) -> FactoryOptions {
        self.options
    }
}

/// A discovered configuration plus vendor metadata and its factory slot.
#[derive(Debug)]
pub struct EnvironmentRecord {
    configuration: EnvironmentConfiguration,
    vendor: String,
    vendor_url: String,
    support_url: String,
    factory: OnceLock<Arc<EnvironmentFactory>>,
}

impl EnvironmentRecord {
    /// Wrap `configuration`. No factory exists until one is requested.
    pub fn new(configuration: EnvironmentConfiguration, vendor: impl Into<String>) -> Self {
        Self {
            configuration,
            vendor: vendor.into(),
            vendor_url: String::new(),
            support_url: String::new(),
            factory: OnceLock::new(),
        }
    }

    /// Set vendor and support URLs.
    pub fn with_urls(
        mut self,
        vendor_url: impl Into<String>,
        support_url: impl Into<String>,
    ) -> Self {
        self.vendor_url = vendor_url.into();
        self.support_url = support_url.into();
        self
    }

    pub fn configuration(&self) -> &EnvironmentConfiguration {
        &self.configuration
    }

    pub fn id(&self) -> &str {
        &self.configuration.id
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn vendor_url(&self) -> &str {
        &self.vendor_url
    }

    pub fn support_url(&self) -> &str {
        &self.support_url
    }

    /// The factory, if one was already created.
    pub fn factory(&self) -> Option<Arc<EnvironmentFactory>> {
        self.factory.get().cloned()
    }

    /// Return the cached factory or build it with `options`.
    ///
    /// Concurrent callers block on this record only; the first one builds
    /// and every caller gets the same instance.
    pub fn get_or_create_factory(&self, options: FactoryOptions) -> Arc<EnvironmentFactory> {
        self.factory
            .get_or_init(|| Arc::new(EnvironmentFactory::new(self.configuration.clone(), options)))
            .clone()
    }
}
