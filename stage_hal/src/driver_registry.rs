//! Name -> factory lookup for motion drivers.
//!
//! Hosts build a [`DriverRegistry`] once at startup, usually with
//! [`DriverRegistry::with_builtin`], and pick the driver named in their
//! configuration. There is no process-global registry.

use crate::drivers::BUILTIN_DRIVERS;
use stage_common::hal::driver::{DriverFactory, HalError, MotionDriver};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of available motion drivers, ordered by name.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Registry without any driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every driver shipped with this crate.
    pub fn with_builtin() -> Self {
        Self {
            drivers: BUILTIN_DRIVERS.iter().copied().collect(),
        }
    }

    /// Add `factory` under `name`.
    ///
    /// # Errors
    /// `HalError::AlreadyRegistered` if `name` is taken; the existing factory stays.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) -> Result<(), HalError> {
        if self.drivers.contains_key(name) {
            return Err(HalError::AlreadyRegistered(name.to_string()));
        }
        self.drivers.insert(name, factory);
        debug!("Driver '{}' registered", name);
        Ok(())
    }

    /// True if a driver called `name` is available.
    pub fn contains(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Construct the driver called `name`.
    ///
    /// # Errors
    /// `HalError::DriverNotFound` for an unknown name.
    pub fn create_driver(&self, name: &str) -> Result<Arc<dyn MotionDriver>, HalError> {
        let Some(factory) = self.drivers.get(name) else {
            return Err(HalError::DriverNotFound(name.to_string()));
        };
        let driver = factory();
        info!("Created driver '{}' ({} {})", name, driver.name(), driver.version());
        Ok(driver)
    }

    /// Registered names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.drivers.keys().copied()
    }
}
