use std::sync::{Arc, RwLock};

use crate::configuration::Configuration;

/// Holds the currently active configuration snapshot behind a short-lived read/write lock.
///
/// Publishing a new snapshot (`set_configuration`) is a single `Arc` swap under a write lock;
/// readers (`get_configuration`) take a brief read lock just to clone the `Arc` handle, so the
/// evaluator itself never holds a lock while it runs. Callers always observe either the
/// previous snapshot in full or the new one in full, never a partially published one.
#[derive(Default)]
pub struct ConfigurationStore {
    configuration: RwLock<Option<Arc<Configuration>>>,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        ConfigurationStore { configuration: RwLock::new(None) }
    }

    pub fn get_configuration(&self) -> Option<Arc<Configuration>> {
        self.configuration
            .read()
            .expect("configuration lock poisoned")
            .clone()
    }

    pub fn set_configuration(&self, configuration: Configuration) {
        *self.configuration.write().expect("configuration lock poisoned") =
            Some(Arc::new(configuration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = ConfigurationStore::new();
        assert!(store.get_configuration().is_none());
    }

    #[test]
    fn publishes_new_snapshot() {
        let store = ConfigurationStore::new();
        store.set_configuration(Configuration::default());
        assert!(store.get_configuration().is_some());
    }
}
