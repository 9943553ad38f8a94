//! In-memory [`ConfigStore`] for simulation and tests.
//!
//! Values live in a `RefCell<HashMap>`; a missing key reads as
//! `NotFound`, just like a missing control file.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;

use crate::app::ports::{ConfigKey, ConfigStore};
use crate::error::ConfigError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<ConfigKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a value, bypassing validation.
    pub fn insert(&self, key: ConfigKey, value: &str) {
        self.values.borrow_mut().insert(key, value.to_owned());
    }

    pub fn remove(&self, key: ConfigKey) {
        self.values.borrow_mut().remove(&key);
    }

    /// Raw stored text, if any.
    pub fn raw(&self, key: ConfigKey) -> Option<String> {
        self.values.borrow().get(&key).cloned()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: ConfigKey) -> Result<String, ConfigError> {
        self.raw(key).ok_or(ConfigError::Read {
            key,
            kind: io::ErrorKind::NotFound,
        })
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        self.insert(key, value);
        Ok(())
    }
}
