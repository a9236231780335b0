//! Record store and session layer for the Kinetic club app.
//!
//! [`store::RecordStore`] keeps every collection in one JSON value behind a
//! [`storage::KeyValueStorage`]; [`session::SessionManager`] handles login,
//! registration and logout on top of it. Privileged and client operations
//! live in [`management`], [`profile`] and [`client`], all gated through
//! [`policy`].

pub mod client;
pub mod config;
pub mod error;
pub mod management;
pub mod password;
pub mod policy;
pub mod profile;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{CoreError, Result};
pub use policy::Capability;
pub use session::{SessionManager, SessionState};
pub use state::AppState;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::RecordStore;
