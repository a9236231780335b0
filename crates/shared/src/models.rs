use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a fresh record identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Record ids written by older builds may be JSON numbers (millisecond
/// timestamps); they are read back as strings.
pub(crate) mod flexible_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => id,
            RawId::Number(n) => n.to_string(),
        })
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Director,
    Admin,
    Manager,
    Trainer,
    Client,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Director,
        UserRole::Admin,
        UserRole::Manager,
        UserRole::Trainer,
        UserRole::Client,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Director => "director",
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Trainer => "trainer",
            UserRole::Client => "client",
        }
    }

    /// Human-readable label shown in the club's UI
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Director => "Директор",
            UserRole::Admin => "Администратор",
            UserRole::Manager => "Менеджер",
            UserRole::Trainer => "Тренер",
            UserRole::Client => "Клиент",
        }
    }

    /// Anything above a regular client
    pub fn is_elevated(&self) -> bool {
        !matches!(self, UserRole::Client)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: String,
    pub email: String,
    /// Argon2 PHC string. Records from older builds may still hold plaintext.
    #[serde(rename = "password")]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_activity: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Fields written by other front ends, carried through unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// Build a fresh, active account record
    pub fn new(
        email: impl Into<String>,
        password_hash: String,
        name: impl Into<String>,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            email: email.into(),
            password_hash,
            name: name.into(),
            role,
            created_at: now,
            last_activity: now,
            is_active: true,
            phone: None,
            bio: None,
            avatar: None,
            preferences: None,
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: String,
    pub language: String,
    pub notifications: NotificationPreferences,
    pub privacy: PrivacyPreferences,
    pub dashboard: DashboardPreferences,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "rainbow".to_string(),
            language: "ru".to_string(),
            notifications: NotificationPreferences::default(),
            privacy: PrivacyPreferences::default(),
            dashboard: DashboardPreferences::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub marketing: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            marketing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacyPreferences {
    pub show_email: bool,
    pub show_phone: bool,
    pub show_last_activity: bool,
}

impl Default for PrivacyPreferences {
    fn default() -> Self {
        Self {
            show_email: true,
            show_phone: false,
            show_last_activity: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardPreferences {
    pub compact_view: bool,
    pub show_stats: bool,
    pub default_view: String,
}

impl Default for DashboardPreferences {
    fn default() -> Self {
        Self {
            compact_view: false,
            show_stats: true,
            default_view: "grid".to_string(),
        }
    }
}

// ============================================================================
// Activity log
// ============================================================================

/// Activity tag. Serialized as a snake_case string; tags this build does not
/// know are kept verbatim in `Other` so they survive a save.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityAction {
    Login,
    Register,
    Logout,
    CreateStaff,
    StatusChange,
    RoleChange,
    ApplicationReview,
    ProfileUpdate,
    PasswordChange,
    Other(String),
}

impl ActivityAction {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityAction::Login => "login",
            ActivityAction::Register => "register",
            ActivityAction::Logout => "logout",
            ActivityAction::CreateStaff => "create_staff",
            ActivityAction::StatusChange => "status_change",
            ActivityAction::RoleChange => "role_change",
            ActivityAction::ApplicationReview => "application_review",
            ActivityAction::ProfileUpdate => "profile_update",
            ActivityAction::PasswordChange => "password_change",
            ActivityAction::Other(tag) => tag,
        }
    }
}

impl From<&str> for ActivityAction {
    fn from(tag: &str) -> Self {
        match tag {
            "login" => ActivityAction::Login,
            "register" => ActivityAction::Register,
            "logout" => ActivityAction::Logout,
            "create_staff" | "create_admin" => ActivityAction::CreateStaff,
            "status_change" => ActivityAction::StatusChange,
            "role_change" => ActivityAction::RoleChange,
            "application_review" => ActivityAction::ApplicationReview,
            "profile_update" => ActivityAction::ProfileUpdate,
            "password_change" => ActivityAction::PasswordChange,
            other => ActivityAction::Other(other.to_string()),
        }
    }
}

impl Serialize for ActivityAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityAction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ActivityAction::from(tag.as_str()))
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub user_id: String,
    pub action: ActivityAction,
    #[serde(default)]
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Chat, purchases, applications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Cancelled,
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub user_id: String,
    pub program: String,
    pub amount: f64,
    pub status: PurchaseStatus,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reviewing a pending application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl From<ReviewDecision> for ApplicationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approve => ApplicationStatus::Approved,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub program: String,
    #[serde(default)]
    pub message: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_with_camel_case_keys() {
        let user = User::new("a@x.com", "hash".to_string(), "Anna", UserRole::Client, Utc::now());
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"password\":\"hash\""));
        assert!(json.contains("\"role\":\"client\""));
        assert!(json.contains("\"isActive\":true"));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"lastActivity\""));
        assert!(!json.contains("\"phone\""));
    }

    #[test]
    fn test_user_reads_legacy_record() {
        // Trainer records were written with a numeric id and no lastActivity
        let json = r#"{"id":1712345678901,"email":"t@x.com","name":"Coach","phone":"+7","password":"pw","role":"trainer","isActive":false,"createdAt":"2024-04-05T10:00:00.000Z"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "1712345678901");
        assert_eq!(user.role, UserRole::Trainer);
        assert!(!user.is_active);
        assert_eq!(user.last_activity, DateTime::<Utc>::default());
        assert_eq!(user.phone.as_deref(), Some("+7"));
    }

    #[test]
    fn test_user_is_active_defaults_to_true() {
        let json = r#"{"id":"u1","email":"a@x.com","password":"pw","name":"A","role":"client","createdAt":"2024-01-01T00:00:00Z","lastActivity":"2024-01-01T00:00:00Z"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_active);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("director".parse::<UserRole>().unwrap(), UserRole::Director);
        assert_eq!(" Trainer ".parse::<UserRole>().unwrap(), UserRole::Trainer);
        assert_eq!(
            "student".parse::<UserRole>(),
            Err(ParseRoleError("student".to_string()))
        );
    }

    #[test]
    fn test_role_elevation() {
        assert!(UserRole::Director.is_elevated());
        assert!(UserRole::Trainer.is_elevated());
        assert!(!UserRole::Client.is_elevated());
    }

    #[test]
    fn test_activity_action_legacy_tags() {
        let action: ActivityAction = serde_json::from_str("\"create_admin\"").unwrap();
        assert_eq!(action, ActivityAction::CreateStaff);

        let action: ActivityAction = serde_json::from_str("\"opened_shop\"").unwrap();
        assert_eq!(action, ActivityAction::Other("opened_shop".to_string()));
        assert_eq!(serde_json::to_string(&action).unwrap(), "\"opened_shop\"");

        assert_eq!(serde_json::to_string(&ActivityAction::Logout).unwrap(), "\"logout\"");
    }

    #[test]
    fn test_preferences_fill_missing_sections() {
        let prefs: Preferences = serde_json::from_str(r#"{"theme":"dark","privacy":{"showPhone":true}}"#).unwrap();
        assert_eq!(prefs.theme, "dark");
        assert_eq!(prefs.language, "ru");
        assert!(prefs.privacy.show_phone);
        assert!(prefs.privacy.show_email);
        assert!(prefs.notifications.push);
        assert!(!prefs.notifications.marketing);
        assert_eq!(prefs.dashboard.default_view, "grid");
    }

    #[test]
    fn test_application_review_fields_are_optional() {
        let json = r#"{"id":"a1","userId":"u1","userName":"Anna","userEmail":"a@x.com","program":"Skate","message":"hi","status":"pending","createdAt":"2024-01-01T00:00:00Z"}"#;
        let app: Application = serde_json::from_str(json).unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert!(app.reviewed_by.is_none());

        let out = serde_json::to_string(&app).unwrap();
        assert!(!out.contains("reviewedBy"));
    }

    #[test]
    fn test_review_decision_maps_to_status() {
        assert_eq!(ApplicationStatus::from(ReviewDecision::Approve), ApplicationStatus::Approved);
        assert_eq!(ApplicationStatus::from(ReviewDecision::Reject), ApplicationStatus::Rejected);
    }
}
