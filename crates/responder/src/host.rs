//! Hosting runtime detection.
//!
//! The pipeline runs inside one of two host runtimes that bootstrap
//! configuration differently:
//!
//! | Variant | Runtime name | Configuration | Base factory |
//! |---------|--------------|---------------|--------------|
//! | [`HostVariant::FullStack`] | `full-stack` | every file loaded eagerly, package defaults merged | [`FullStackResponseFactory`] |
//! | [`HostVariant::Micro`] | `micro` | files loaded on request via [`Host::configure`] | [`MicroResponseFactory`] |
//!
//! The variant is computed once at startup with [`HostVariant::detect`] and
//! then passed to the wiring code; nothing re-checks the host per request.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{ResponderError, ResponderResult};
use crate::repository::ConfigRepository;
use crate::responses::{FullStackResponseFactory, MicroResponseFactory, ResponseFactory};

/// Runtime name reported by full-stack hosts.
pub const FULL_STACK_RUNTIME: &str = "full-stack";

/// Runtime name reported by micro hosts.
pub const MICRO_RUNTIME: &str = "micro";

/// Read access to the running host application, plus the two configuration
/// hooks the provider needs during boot.
pub trait Host: Send + Sync {
    /// Name of the host runtime (e.g. `full-stack`).
    fn runtime(&self) -> &str;

    /// True when the host was started as a console command.
    fn running_in_console(&self) -> bool;

    /// Directory holding the host's configuration files.
    fn config_dir(&self) -> &Path;

    /// The host's configuration.
    fn config(&self) -> &ConfigRepository;

    /// Mutable access to the host's configuration.
    fn config_mut(&mut self) -> &mut ConfigRepository;

    /// Loads the configuration file called `name` into the namespace `name`.
    ///
    /// A missing file is not an error; the namespace simply stays unloaded.
    fn configure(&mut self, name: &str) -> ResponderResult<()> {
        let path = self.config_dir().join(format!("{}.json", name));
        if !path.is_file() {
            debug!(namespace = name, path = %path.display(), "No configuration file to load");
            return Ok(());
        }
        self.config_mut().load_file(name, &path)
    }

    /// Merges `defaults` underneath the namespace `name`.
    fn merge_config_from(&mut self, name: &str, defaults: Value) {
        self.config_mut().merge_from(name, defaults);
    }
}

/// The supported host runtimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostVariant {
    /// Full-stack host (Variant A).
    FullStack,
    /// Micro host (Variant B).
    Micro,
}

impl HostVariant {
    /// Classifies the host.
    ///
    /// Fails with [`ResponderError::UnsupportedEnvironment`] when the runtime
    /// is not recognised; there is no fallback variant.
    pub fn detect(host: &dyn Host) -> ResponderResult<Self> {
        let runtime = host.runtime();
        Self::parse(runtime).ok_or_else(|| ResponderError::UnsupportedEnvironment {
            runtime: runtime.to_string(),
        })
    }

    /// Parses a runtime name, ignoring case and surrounding whitespace.
    pub fn parse(runtime: &str) -> Option<Self> {
        match runtime.trim().to_ascii_lowercase().as_str() {
            "full-stack" | "fullstack" | "full_stack" => Some(HostVariant::FullStack),
            "micro" => Some(HostVariant::Micro),
            _ => None,
        }
    }

    /// Returns the canonical runtime name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostVariant::FullStack => FULL_STACK_RUNTIME,
            HostVariant::Micro => MICRO_RUNTIME,
        }
    }

    /// Builds the undecorated response factory for this variant.
    pub fn base_factory(&self) -> Box<dyn ResponseFactory> {
        match self {
            HostVariant::FullStack => Box::new(FullStackResponseFactory),
            HostVariant::Micro => Box::new(MicroResponseFactory),
        }
    }
}

impl fmt::Display for HostVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host application backed by a configuration directory.
#[derive(Debug, Clone)]
pub struct AppHost {
    runtime: String,
    config_dir: PathBuf,
    console: bool,
    config: ConfigRepository,
}

impl AppHost {
    /// Creates a host with an empty configuration.
    pub fn new(runtime: impl Into<String>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime: runtime.into(),
            config_dir: config_dir.into(),
            console: false,
            config: ConfigRepository::new(),
        }
    }

    /// Creates a full-stack host. Full-stack hosts load every configuration
    /// file in their directory at startup.
    pub fn full_stack(config_dir: impl Into<PathBuf>) -> ResponderResult<Self> {
        let mut host = Self::new(FULL_STACK_RUNTIME, config_dir);
        let loaded = host.config.load_dir(&host.config_dir)?;
        debug!(
            files = loaded,
            dir = %host.config_dir.display(),
            "Full-stack host loaded configuration"
        );
        Ok(host)
    }

    /// Creates a micro host. Micro hosts load nothing until asked.
    pub fn micro(config_dir: impl Into<PathBuf>) -> Self {
        Self::new(MICRO_RUNTIME, config_dir)
    }

    /// Starts the host named by `runtime` the way that runtime starts itself.
    ///
    /// Unknown runtimes still start, with an empty configuration; rejecting
    /// them is the job of [`HostVariant::detect`].
    pub fn boot(runtime: &str, config_dir: impl Into<PathBuf>) -> ResponderResult<Self> {
        match HostVariant::parse(runtime) {
            Some(HostVariant::FullStack) => Self::full_stack(config_dir),
            Some(HostVariant::Micro) => Ok(Self::micro(config_dir)),
            None => Ok(Self::new(runtime, config_dir)),
        }
    }

    /// Marks the host as running a console command.
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }
}

impl Host for AppHost {
    fn runtime(&self) -> &str {
        &self.runtime
    }

    fn running_in_console(&self) -> bool {
        self.console
    }

    fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn config(&self) -> &ConfigRepository {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ConfigRepository {
        &mut self.config
    }
}
