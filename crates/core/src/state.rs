use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::session::SessionManager;
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};
use crate::store::RecordStore;

/// Storage, record store and session wired together from one config
pub struct AppState {
    pub config: Config,
    pub session: SessionManager,
}

impl AppState {
    pub fn open(config: Config) -> Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = match config.storage.backend {
            StorageBackend::File => {
                let path = config.storage.resolved_path();
                tracing::debug!("Using file storage at {}", path.display());
                Arc::new(FileStorage::new(path))
            }
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let store = RecordStore::new(storage.clone(), &config.store, config.seed.clone());
        let session = SessionManager::open(store, storage, config.store.session_key.clone())?;
        Ok(Self { config, session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_starts_fresh() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        let mut state = AppState::open(config).unwrap();
        assert!(!state.session.is_authenticated());
        assert!(state.session.login("dima260208@bk.ru", "Sempay666").unwrap());
    }

    #[test]
    fn test_custom_keys_are_used() {
        let mut config = Config::default();
        config.store.data_key = "club".to_string();
        config.store.session_key = "me".to_string();
        let storage = Arc::new(MemoryStorage::new());

        let mut state = AppState::with_storage(config, storage.clone()).unwrap();
        assert!(state.session.register("a@x.com", "pw", "Anna").unwrap());
        assert!(storage.get("club").unwrap().is_some());
        assert!(storage.get("me").unwrap().is_some());
        assert!(storage.get("fitness_app_data").unwrap().is_none());
    }
}
