use shared::UserRole;
use thiserror::Error;

use crate::password::PasswordError;
use crate::policy::Capability;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("stored value under {key:?} is not valid: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("role {role} may not access {capability}")]
    Forbidden { role: UserRole, capability: Capability },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
