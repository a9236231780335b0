//! Privileged operations behind the director, admin and CRM panels.
//!
//! Every function authorizes the session's user first and records one
//! activity entry attributed to that user for each change it makes.

use chrono::Utc;
use serde::Serialize;
use shared::{
    ActivityAction, Application, ApplicationStatus, ChatMessage, ReviewDecision, User,
    UserActivity, UserRole,
};

use crate::error::{CoreError, Result};
use crate::password::hash_password;
use crate::policy::{self, Capability};
use crate::session::SessionManager;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub active_users: usize,
    pub admins: usize,
    pub trainers: usize,
    pub clients: usize,
    pub pending_applications: usize,
    pub total_purchases: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationQueues {
    pub pending: Vec<Application>,
    pub processed: Vec<Application>,
}

/// Which capability creating an account with `role` requires
fn staff_capability(role: UserRole) -> Result<Capability> {
    match role {
        UserRole::Admin | UserRole::Manager => Ok(Capability::DirectorPanel),
        UserRole::Trainer => Ok(Capability::ManageTrainers),
        UserRole::Director | UserRole::Client => Err(CoreError::Validation(format!(
            "cannot create a {} account here",
            role
        ))),
    }
}

/// Provision an admin, manager or trainer account
pub fn create_staff(
    session: &SessionManager,
    email: &str,
    name: &str,
    password: &str,
    role: UserRole,
) -> Result<User> {
    let actor = session.authorize(staff_capability(role)?)?.clone();

    let (email, name) = (email.trim(), name.trim());
    if email.is_empty() || name.is_empty() || password.is_empty() {
        return Err(CoreError::Validation("email, name and password are required".to_string()));
    }
    let password_hash = hash_password(password)?;

    let user = session.store().modify(|data| {
        if data.email_taken(email) {
            return Err(CoreError::Conflict(format!("{} is already registered", email)));
        }
        let now = Utc::now();
        let user = User::new(email, password_hash, name, role, now);
        data.users.push(user.clone());
        data.push_activity(
            &actor.id,
            ActivityAction::CreateStaff,
            format!("Создан {}: {} ({})", role.label(), name, email),
            now,
        );
        Ok(user)
    })?;

    tracing::info!("{} created {} account {}", actor.id, role, user.id);
    Ok(user)
}

/// Block or unblock an account.
///
/// Trainers can be managed from the trainer panel; everyone else needs the
/// director panel. Nobody can change their own status.
pub fn set_user_active(session: &SessionManager, user_id: &str, active: bool) -> Result<User> {
    let actor = session.require_user()?.clone();
    if actor.id == user_id {
        return Err(CoreError::Validation("cannot change your own status".to_string()));
    }

    let user = session.store().modify(|data| {
        let target = data
            .user_by_id_mut(user_id)
            .ok_or_else(|| CoreError::NotFound(format!("user {}", user_id)))?;
        let capability = if target.role == UserRole::Trainer {
            Capability::ManageTrainers
        } else {
            Capability::DirectorPanel
        };
        policy::authorize(Some(&actor), capability)?;

        target.is_active = active;
        let target = target.clone();
        let details = if active { "Разблокирован" } else { "Заблокирован" };
        data.push_activity(
            &actor.id,
            ActivityAction::StatusChange,
            format!("{}: {} ({})", details, target.name, target.email),
            Utc::now(),
        );
        Ok(target)
    })?;

    tracing::info!("{} set {} active={}", actor.id, user.id, active);
    Ok(user)
}

/// Reassign a user's role. Director is never assignable.
pub fn change_user_role(session: &SessionManager, user_id: &str, role: UserRole) -> Result<User> {
    let actor = session.authorize(Capability::DirectorPanel)?.clone();
    if role == UserRole::Director {
        return Err(CoreError::Validation("the director role cannot be assigned".to_string()));
    }
    if actor.id == user_id {
        return Err(CoreError::Validation("cannot change your own role".to_string()));
    }

    let user = session.store().modify(|data| {
        let target = data
            .user_by_id_mut(user_id)
            .ok_or_else(|| CoreError::NotFound(format!("user {}", user_id)))?;
        let previous = target.role;
        target.role = role;
        let target = target.clone();
        data.push_activity(
            &actor.id,
            ActivityAction::RoleChange,
            format!("{} ({}): {} → {}", target.name, target.email, previous, role),
            Utc::now(),
        );
        Ok(target)
    })?;

    tracing::info!("{} changed role of {} to {}", actor.id, user.id, role);
    Ok(user)
}

/// Approve or reject a pending application
pub fn review_application(
    session: &SessionManager,
    application_id: &str,
    decision: ReviewDecision,
) -> Result<Application> {
    let actor = session.authorize(Capability::ReviewApplications)?.clone();

    let application = session.store().modify(|data| {
        let now = Utc::now();
        let app = data
            .application_by_id_mut(application_id)
            .ok_or_else(|| CoreError::NotFound(format!("application {}", application_id)))?;
        if app.status != ApplicationStatus::Pending {
            return Err(CoreError::Conflict(format!(
                "application {} is already {}",
                application_id, app.status
            )));
        }

        app.status = decision.into();
        app.reviewed_by = Some(actor.name.clone());
        app.reviewed_at = Some(now);
        let app = app.clone();
        data.push_activity(
            &actor.id,
            ActivityAction::ApplicationReview,
            format!("Заявка {} ({}): {}", app.id, app.program, app.status),
            now,
        );
        Ok(app)
    })?;

    tracing::info!("{} marked application {} {}", actor.id, application.id, application.status);
    Ok(application)
}

pub fn users(session: &SessionManager) -> Result<Vec<User>> {
    session.authorize(Capability::Crm)?;
    Ok(session.store().load()?.users)
}

/// Client roster for trainers
pub fn clients(session: &SessionManager) -> Result<Vec<User>> {
    session.authorize(Capability::TrainerPanel)?;
    let data = session.store().load()?;
    Ok(data
        .users
        .into_iter()
        .filter(|u| u.role == UserRole::Client)
        .collect())
}

/// Pending and processed applications for the admin panel
pub fn applications(session: &SessionManager) -> Result<ApplicationQueues> {
    session.authorize(Capability::AdminPanel)?;
    let (pending, processed): (Vec<Application>, Vec<Application>) = session
        .store()
        .load()?
        .applications
        .into_iter()
        .partition(|a| a.status == ApplicationStatus::Pending);
    Ok(ApplicationQueues { pending, processed })
}

/// Activity log, newest first
pub fn activity_history(session: &SessionManager, limit: Option<usize>) -> Result<Vec<UserActivity>> {
    session.authorize(Capability::Crm)?;
    let data = session.store().load()?;
    Ok(data
        .activities_newest_first()
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect())
}

/// Chat exchanges across all users, newest first
pub fn chat_history(session: &SessionManager, limit: Option<usize>) -> Result<Vec<ChatMessage>> {
    session.authorize(Capability::Crm)?;
    let mut messages = session.store().load()?.chat_messages;
    messages.reverse();
    messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    messages.truncate(limit.unwrap_or(usize::MAX));
    Ok(messages)
}

pub fn dashboard_stats(session: &SessionManager) -> Result<DashboardStats> {
    session.authorize(Capability::DirectorPanel)?;
    let data = session.store().load()?;
    Ok(DashboardStats {
        total_users: data.users.len(),
        active_users: data.users.iter().filter(|u| u.is_active).count(),
        admins: data.count_role(UserRole::Admin),
        trainers: data.count_role(UserRole::Trainer),
        clients: data.count_role(UserRole::Client),
        pending_applications: data.pending_applications(),
        total_purchases: data.purchases.len(),
        total_revenue: data.purchases.iter().map(|p| p.amount).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SeedConfig, StoreConfig};
    use crate::storage::MemoryStorage;
    use crate::store::RecordStore;
    use std::sync::Arc;

    fn director_session() -> SessionManager {
        let storage = Arc::new(MemoryStorage::new());
        let store = RecordStore::new(storage.clone(), &StoreConfig::default(), SeedConfig::default());
        let mut session = SessionManager::open(store, storage, "current_user").unwrap();
        assert!(session.login("dima260208@bk.ru", "Sempay666").unwrap());
        session
    }

    #[test]
    fn test_staff_capability() {
        assert_eq!(staff_capability(UserRole::Admin).unwrap(), Capability::DirectorPanel);
        assert_eq!(staff_capability(UserRole::Trainer).unwrap(), Capability::ManageTrainers);
        assert!(staff_capability(UserRole::Director).is_err());
        assert!(staff_capability(UserRole::Client).is_err());
    }

    #[test]
    fn test_create_staff_records_actor_activity() {
        let session = director_session();
        let admin = create_staff(&session, "adm@x.com", "Admin", "pw", UserRole::Admin).unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        let data = session.store().load().unwrap();
        assert_eq!(data.users.len(), 2);
        let last = data.user_activities.last().unwrap();
        assert_eq!(last.user_id, "director-1");
        assert_eq!(last.action, ActivityAction::CreateStaff);
        assert!(last.details.contains("adm@x.com"));
    }

    #[test]
    fn test_create_staff_rejects_blank_fields() {
        let session = director_session();
        assert!(matches!(
            create_staff(&session, "  ", "Name", "pw", UserRole::Trainer),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_cannot_change_own_role_or_status() {
        let session = director_session();
        assert!(matches!(
            change_user_role(&session, "director-1", UserRole::Admin),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            set_user_active(&session, "director-1", false),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_targets() {
        let session = director_session();
        assert!(matches!(
            change_user_role(&session, "missing", UserRole::Admin),
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            review_application(&session, "missing", ReviewDecision::Approve),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_dashboard_stats_on_fresh_store() {
        let session = director_session();
        let stats = dashboard_stats(&session).unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.active_users, 1);
        assert_eq!(stats.clients, 0);
        assert_eq!(stats.pending_applications, 0);
        assert_eq!(stats.total_revenue, 0.0);
    }
}
