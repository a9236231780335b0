use chrono::Utc;
use shared::{ActivityAction, Preferences, User};

use crate::error::{CoreError, Result};
use crate::password::{hash_password, verify_password};
use crate::session::SessionManager;

/// Profile fields to change; `None` leaves a field as it is and an empty
/// string clears an optional field
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<Preferences>,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Update the logged-in user's profile and refresh the session snapshot
pub fn update_profile(session: &mut SessionManager, update: ProfileUpdate) -> Result<User> {
    let user_id = session.require_user()?.id.clone();
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("name cannot be empty".to_string()));
        }
    }

    let user = session.store().modify(|data| {
        let now = Utc::now();
        let user = data
            .user_by_id_mut(&user_id)
            .ok_or_else(|| CoreError::NotFound(format!("user {}", user_id)))?;

        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            user.phone = non_empty(phone);
        }
        if let Some(bio) = update.bio {
            user.bio = non_empty(bio);
        }
        if let Some(avatar) = update.avatar {
            user.avatar = non_empty(avatar);
        }
        if let Some(preferences) = update.preferences {
            user.preferences = Some(preferences);
        }
        user.updated_at = Some(now);

        let user = user.clone();
        data.push_activity(&user.id, ActivityAction::ProfileUpdate, "Профиль обновлен", now);
        Ok(user)
    })?;

    session.refresh_current(&user)?;
    tracing::info!("User {} updated their profile", user.id);
    Ok(user)
}

/// Change the logged-in user's password.
///
/// The current password is checked against the stored record, not the
/// session snapshot.
pub fn change_password(
    session: &mut SessionManager,
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<()> {
    let user_id = session.require_user()?.id.clone();
    if current.is_empty() || new.is_empty() {
        return Err(CoreError::Validation("all password fields are required".to_string()));
    }
    if new != confirm {
        return Err(CoreError::Validation("passwords do not match".to_string()));
    }

    let user = session.store().modify(|data| {
        let now = Utc::now();
        let user = data
            .user_by_id_mut(&user_id)
            .ok_or_else(|| CoreError::NotFound(format!("user {}", user_id)))?;
        if !verify_password(current, &user.password_hash)? {
            return Err(CoreError::Validation("current password is incorrect".to_string()));
        }

        user.password_hash = hash_password(new)?;
        user.updated_at = Some(now);
        let user = user.clone();
        data.push_activity(&user.id, ActivityAction::PasswordChange, "Пароль изменен", now);
        Ok(user)
    })?;

    session.refresh_current(&user)?;
    tracing::info!("User {} changed their password", user.id);
    Ok(())
}
