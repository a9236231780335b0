use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    new_id, ActivityAction, Application, ApplicationStatus, ChatMessage, Purchase, User,
    UserActivity, UserRole,
};

/// Everything the club keeps, persisted as a single JSON document.
///
/// Collections missing from a stored document read as empty. Collections
/// this build does not manage (such as trainer diary entries) are kept in
/// `extra` and written back on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub chat_messages: Vec<ChatMessage>,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub user_activities: Vec<UserActivity>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppData {
    /// Exact, case-sensitive email lookup
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn user_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_id_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn email_taken(&self, email: &str) -> bool {
        self.user_by_email(email).is_some()
    }

    pub fn count_role(&self, role: UserRole) -> usize {
        self.users.iter().filter(|u| u.role == role).count()
    }

    pub fn application_by_id_mut(&mut self, id: &str) -> Option<&mut Application> {
        self.applications.iter_mut().find(|a| a.id == id)
    }

    pub fn pending_applications(&self) -> usize {
        self.applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Pending)
            .count()
    }

    /// Append an activity entry for `user_id`.
    ///
    /// The timestamp never goes below the user's latest entry, so a clock
    /// stepping backwards cannot reorder one user's history.
    pub fn push_activity(
        &mut self,
        user_id: &str,
        action: ActivityAction,
        details: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &UserActivity {
        let floor = self
            .user_activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.timestamp)
            .max();
        let timestamp = match floor {
            Some(last) if last > now => last,
            _ => now,
        };

        let idx = self.user_activities.len();
        self.user_activities.push(UserActivity {
            id: new_id(),
            user_id: user_id.to_string(),
            action,
            details: details.into(),
            timestamp,
        });
        &self.user_activities[idx]
    }

    /// Activity log for display: newest first, insertion order among ties
    pub fn activities_newest_first(&self) -> Vec<&UserActivity> {
        let mut entries: Vec<&UserActivity> = self.user_activities.iter().rev().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    pub fn activities_for<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a UserActivity> + 'a {
        self.user_activities.iter().filter(move |a| a.user_id == user_id)
    }
}
