use std::collections::HashMap;
use std::sync::Arc;

use common::driver::Driver;

use crate::drivers::{cloud189::Cloud189Driver, local::LocalDriver};
use crate::resolve::Resolver;

/// Maps driver names to live driver instances.
///
/// Built once at startup and resolved at account-load time, so no other
/// component ever dispatches on a backend-type string.
pub struct DriverRegistry {
    drivers: HashMap<&'static str, Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn empty() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Registry with every built-in driver wired to the shared resolver.
    pub fn with_defaults(resolver: Arc<Resolver>) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(LocalDriver::new(resolver.clone())));
        registry.register(Arc::new(Cloud189Driver::new(resolver)));
        registry
    }

    pub fn register(&mut self, driver: Arc<dyn Driver>) {
        let name = driver.config().name;
        if self.drivers.insert(name, driver).is_some() {
            tracing::warn!(driver = name, "replaced an already-registered driver");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.drivers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
