use chrono::Utc;
use shared::{ActivityAction, User, UserRole};
use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::password::{hash_password, is_hashed, verify_password};
use crate::policy::{self, Capability};
use crate::storage::KeyValueStorage;
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticated(User),
}

/// Login/registration state machine over the record store.
///
/// The current user is mirrored into its own storage key so a restart can
/// restore the session without reading the aggregate. A restored snapshot is
/// not re-validated against the store.
pub struct SessionManager {
    store: RecordStore,
    storage: Arc<dyn KeyValueStorage>,
    session_key: String,
    state: SessionState,
}

impl SessionManager {
    /// Build a manager and restore any cached session snapshot
    pub fn open(
        store: RecordStore,
        storage: Arc<dyn KeyValueStorage>,
        session_key: impl Into<String>,
    ) -> Result<Self> {
        let session_key = session_key.into();
        let state = match storage.get(&session_key)? {
            None => SessionState::Anonymous,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    tracing::debug!("Restored session for {}", user.id);
                    SessionState::Authenticated(user)
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable session snapshot: {}", e);
                    storage.remove(&session_key)?;
                    SessionState::Anonymous
                }
            },
        };

        Ok(Self {
            store,
            storage,
            session_key,
            state,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Gate a privileged entry point on the current user's role
    pub fn authorize(&self, capability: Capability) -> Result<&User> {
        policy::authorize(self.current_user(), capability)
    }

    pub fn require_user(&self) -> Result<&User> {
        self.current_user().ok_or(CoreError::NotAuthenticated)
    }

    /// Authenticate by exact email and password.
    ///
    /// The first record matching both wins, so a store edited to hold the
    /// same email twice still logs into the account whose password fits.
    /// Returns `Ok(false)` without touching any state when nothing matches.
    pub fn login(&mut self, email: &str, password: &str) -> Result<bool> {
        let mut data = self.store.load()?;

        let mut matched = None;
        for (idx, user) in data.users.iter().enumerate() {
            if user.email == email && verify_password(password, &user.password_hash)? {
                matched = Some(idx);
                break;
            }
        }
        let Some(user) = matched.and_then(|idx| data.users.get_mut(idx)) else {
            tracing::debug!("Login rejected: no matching credentials");
            return Ok(false);
        };

        let now = Utc::now();
        user.last_activity = now;
        if !is_hashed(&user.password_hash) {
            user.password_hash = hash_password(password)?;
            tracing::info!("Upgraded plaintext credential for {}", user.id);
        }
        let user = user.clone();

        data.push_activity(&user.id, ActivityAction::Login, "Вход в систему", now);
        self.store.save(&data)?;
        self.set_current(user)?;

        if let Some(user) = self.current_user() {
            tracing::info!("User {} logged in ({})", user.id, user.role);
        }
        Ok(true)
    }

    /// Create a client account and log it in.
    ///
    /// The role is always [`UserRole::Client`]; elevated accounts come from the
    /// seed record or privileged management. Returns `Ok(false)` if the email
    /// is taken.
    pub fn register(&mut self, email: &str, password: &str, name: &str) -> Result<bool> {
        let mut data = self.store.load()?;
        if data.email_taken(email) {
            tracing::debug!("Registration rejected: email already registered");
            return Ok(false);
        }

        let now = Utc::now();
        let user = User::new(email, hash_password(password)?, name, UserRole::Client, now);
        data.users.push(user.clone());
        data.push_activity(&user.id, ActivityAction::Register, "Регистрация в системе", now);
        self.store.save(&data)?;

        tracing::info!("User {} registered", user.id);
        self.set_current(user)?;
        Ok(true)
    }

    /// End the session. A no-op when nobody is logged in.
    ///
    /// The snapshot is cleared even if recording the logout fails; that
    /// failure is still returned.
    pub fn logout(&mut self) -> Result<()> {
        let recorded = match &self.state {
            SessionState::Authenticated(user) => {
                let user_id = user.id.clone();
                let result = self.store.modify(|data| {
                    data.push_activity(&user_id, ActivityAction::Logout, "Выход из системы", Utc::now());
                    Ok(())
                });
                tracing::info!("User {} logged out", user_id);
                result
            }
            SessionState::Anonymous => Ok(()),
        };

        self.state = SessionState::Anonymous;
        self.storage.remove(&self.session_key)?;
        recorded
    }

    /// Replace the snapshot if `user` is the one logged in
    pub(crate) fn refresh_current(&mut self, user: &User) -> Result<()> {
        match &self.state {
            SessionState::Authenticated(current) if current.id == user.id => {
                self.set_current(user.clone())
            }
            _ => Ok(()),
        }
    }

    fn set_current(&mut self, user: User) -> Result<()> {
        let json = serde_json::to_string(&user).map_err(CoreError::Serialize)?;
        self.storage.set(&self.session_key, &json)?;
        self.state = SessionState::Authenticated(user);
        Ok(())
    }
}
