use shared::AppData;
use std::sync::Arc;

use crate::config::{CorruptPolicy, SeedConfig, StoreConfig};
use crate::error::{CoreError, Result};
use crate::storage::KeyValueStorage;

mod seed;

pub use seed::seed_data;

/// The club's whole data set, persisted as one JSON value under a single key.
///
/// Every write replaces the full aggregate; the last writer wins.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn KeyValueStorage>,
    data_key: String,
    on_corrupt: CorruptPolicy,
    seed: SeedConfig,
}

impl RecordStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, config: &StoreConfig, seed: SeedConfig) -> Self {
        Self {
            storage,
            data_key: config.data_key.clone(),
            on_corrupt: config.on_corrupt,
            seed,
        }
    }

    /// Read the aggregate, seeding and persisting it on first access
    pub fn load(&self) -> Result<AppData> {
        let raw = match self.storage.get(&self.data_key)? {
            Some(raw) => raw,
            None => return self.reseed(),
        };

        match serde_json::from_str::<AppData>(&raw) {
            Ok(data) => Ok(data),
            Err(source) => match self.on_corrupt {
                CorruptPolicy::Fail => {
                    tracing::error!("Stored data under {} does not parse: {}", self.data_key, source);
                    Err(CoreError::Corrupt {
                        key: self.data_key.clone(),
                        source,
                    })
                }
                CorruptPolicy::Reseed => {
                    let backup_key = format!("{}.corrupt", self.data_key);
                    self.storage.set(&backup_key, &raw)?;
                    tracing::warn!(
                        "Stored data under {} does not parse ({}), moved to {} and reseeding",
                        self.data_key,
                        source,
                        backup_key
                    );
                    self.reseed()
                }
            },
        }
    }

    /// Overwrite the persisted aggregate
    pub fn save(&self, data: &AppData) -> Result<()> {
        let json = serde_json::to_string(data).map_err(CoreError::Serialize)?;
        self.storage.set(&self.data_key, &json)?;
        Ok(())
    }

    /// Load, apply `f`, and save only if `f` succeeds
    pub(crate) fn modify<T>(&self, f: impl FnOnce(&mut AppData) -> Result<T>) -> Result<T> {
        let mut data = self.load()?;
        let out = f(&mut data)?;
        self.save(&data)?;
        Ok(out)
    }

    fn reseed(&self) -> Result<AppData> {
        let data = seed_data(&self.seed)?;
        self.save(&data)?;
        tracing::info!("Initialized store under {} with seed director {}", self.data_key, self.seed.email);
        Ok(data)
    }
}
