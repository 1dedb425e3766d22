//! Namespaced configuration store.
//!
//! A [`ConfigRepository`] maps namespace names (`responder`, `app`, ...) to
//! JSON documents. Hosts fill it from `*.json` files; packages merge their
//! defaults underneath whatever the host already loaded.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{ResponderError, ResponderResult};

/// Configuration documents keyed by namespace.
#[derive(Debug, Clone, Default)]
pub struct ConfigRepository {
    namespaces: BTreeMap<String, Value>,
}

impl ConfigRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.json` file in `dir`, one namespace per file stem.
    ///
    /// A missing directory loads nothing. Returns the number of files loaded.
    pub fn load_dir(&mut self, dir: &Path) -> ResponderResult<usize> {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Configuration directory not found, nothing loaded");
            return Ok(0);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(namespace) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            self.load_file(namespace, &path)?;
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Loads a single JSON file into `namespace`, replacing what was there.
    pub fn load_file(&mut self, namespace: &str, path: &Path) -> ResponderResult<()> {
        let contents = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents).map_err(|e| {
            ResponderError::config(format!("{} is not valid JSON: {}", path.display(), e))
        })?;

        debug!(namespace, path = %path.display(), "Loaded configuration file");
        self.namespaces.insert(namespace.to_string(), value);
        Ok(())
    }

    /// Replaces the document stored under `namespace`.
    pub fn set(&mut self, namespace: impl Into<String>, value: Value) {
        self.namespaces.insert(namespace.into(), value);
    }

    /// Returns the raw document stored under `namespace`.
    pub fn get_value(&self, namespace: &str) -> Option<&Value> {
        self.namespaces.get(namespace)
    }

    /// Returns true if `namespace` has been loaded.
    pub fn has(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// Merges `defaults` underneath the document stored under `namespace`.
    ///
    /// Top-level keys already present win over the defaults. If the stored
    /// document is not an object it is left untouched.
    pub fn merge_from(&mut self, namespace: &str, defaults: Value) {
        match self.namespaces.get_mut(namespace) {
            None => {
                self.namespaces.insert(namespace.to_string(), defaults);
            }
            Some(Value::Object(existing)) => {
                if let Value::Object(defaults) = defaults {
                    for (key, value) in defaults {
                        existing.entry(key).or_insert(value);
                    }
                }
            }
            Some(_) => {}
        }
    }

    /// Deserializes the document stored under `namespace`.
    pub fn get<T: DeserializeOwned>(&self, namespace: &str) -> ResponderResult<T> {
        let value = self.namespaces.get(namespace).ok_or_else(|| {
            ResponderError::config(format!("configuration namespace '{}' is not loaded", namespace))
        })?;

        serde_json::from_value(value.clone()).map_err(|e| {
            ResponderError::config(format!("configuration namespace '{}': {}", namespace, e))
        })
    }
}
