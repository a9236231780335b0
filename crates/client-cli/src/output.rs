//! Terminal rendering for store records

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use shared::{Application, ChatMessage, User, UserActivity};

/// User record without the credential, for listings and `--json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub role: shared::UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
}

impl<'a> From<&'a User> for UserView<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: &user.id,
            email: &user.email,
            name: &user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            last_activity: user.last_activity,
            phone: user.phone.as_deref(),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn print_user_line(user: &User) {
    let status = if user.is_active {
        "\x1b[32mactive\x1b[0m"
    } else {
        "\x1b[31mblocked\x1b[0m"
    };
    println!(
        "{:<38} {:<28} {:<24} {:<10} {}",
        user.id, user.email, user.name, user.role.as_str(), status
    );
}

pub fn print_users(users: &[User], json: bool) -> Result<()> {
    if json {
        let views: Vec<UserView<'_>> = users.iter().map(UserView::from).collect();
        return print_json(&views);
    }
    if users.is_empty() {
        println!("\x1b[90mNo users\x1b[0m");
    }
    for user in users {
        print_user_line(user);
    }
    Ok(())
}

pub fn print_activities(entries: &[UserActivity], json: bool) -> Result<()> {
    if json {
        return print_json(entries);
    }
    for entry in entries {
        println!(
            "{}  {:<38} {:<18} {}",
            time(&entry.timestamp),
            entry.user_id,
            entry.action.as_str(),
            entry.details
        );
    }
    Ok(())
}

pub fn print_chats(messages: &[ChatMessage], json: bool) -> Result<()> {
    if json {
        return print_json(messages);
    }
    for chat in messages {
        println!("\x1b[90m{}  {}\x1b[0m", time(&chat.timestamp), chat.user_id);
        println!("  > {}", chat.message);
        println!("  < {}", chat.response);
    }
    Ok(())
}

pub fn print_application(app: &Application) {
    let reviewed = match (&app.reviewed_by, &app.reviewed_at) {
        (Some(by), Some(at)) => format!(" by {} at {}", by, time(at)),
        _ => String::new(),
    };
    println!(
        "{:<38} {:<10} {:<20} {} <{}>{}",
        app.id, app.status.as_str(), app.program, app.user_name, app.user_email, reviewed
    );
    if !app.message.is_empty() {
        println!("  \x1b[90m{}\x1b[0m", app.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::UserRole;

    #[test]
    fn test_user_view_omits_credential() {
        let user = User::new("a@x.com", "$argon2id$secret".to_string(), "Anna", UserRole::Client, Utc::now());
        let json = serde_json::to_value(UserView::from(&user)).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "client");
        assert_eq!(json["isActive"], true);
        assert!(json.get("password").is_none());
        assert!(json.get("phone").is_none());
    }
}
