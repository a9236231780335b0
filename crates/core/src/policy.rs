//! Role allow-lists for every privileged entry point.
//!
//! Call sites ask [`authorize`] instead of checking roles themselves.

use shared::{User, UserRole};
use std::fmt;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Stats, role changes, status toggles, admin and manager creation
    DirectorPanel,
    /// Application review list
    AdminPanel,
    /// User list, activity and chat history
    Crm,
    ReviewApplications,
    /// Trainer creation and trainer status toggles
    ManageTrainers,
    /// Client roster
    TrainerPanel,
    /// A client's own purchases, applications and chats
    ClientDashboard,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::DirectorPanel => "director panel",
            Capability::AdminPanel => "admin panel",
            Capability::Crm => "crm",
            Capability::ReviewApplications => "application review",
            Capability::ManageTrainers => "trainer management",
            Capability::TrainerPanel => "trainer panel",
            Capability::ClientDashboard => "client dashboard",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn allowed_roles(capability: Capability) -> &'static [UserRole] {
    use UserRole::*;
    match capability {
        Capability::DirectorPanel => &[Director],
        Capability::AdminPanel => &[Director, Admin],
        Capability::Crm => &[Director, Admin, Manager],
        Capability::ReviewApplications => &[Director, Admin, Manager],
        Capability::ManageTrainers => &[Director, Admin, Manager],
        Capability::TrainerPanel => &[Director, Trainer],
        Capability::ClientDashboard => &[Client],
    }
}

pub fn is_allowed(role: UserRole, capability: Capability) -> bool {
    allowed_roles(capability).contains(&role)
}

/// Gate a privileged entry point on the current user's role
pub fn authorize(user: Option<&User>, capability: Capability) -> Result<&User> {
    let user = user.ok_or(CoreError::NotAuthenticated)?;
    if is_allowed(user.role, capability) {
        Ok(user)
    } else {
        tracing::debug!("{} denied {} ({})", user.id, capability, user.role);
        Err(CoreError::Forbidden {
            role: user.role,
            capability,
        })
    }
}

/// Default panel a role lands on after login
pub fn landing(role: UserRole) -> Capability {
    match role {
        UserRole::Director => Capability::DirectorPanel,
        UserRole::Admin => Capability::AdminPanel,
        UserRole::Manager => Capability::Crm,
        UserRole::Trainer => Capability::TrainerPanel,
        UserRole::Client => Capability::ClientDashboard,
    }
}
