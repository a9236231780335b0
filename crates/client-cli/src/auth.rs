//! Session commands: register, login, logout, whoami, profile and password

use anyhow::{bail, Result};
use kinetic_core::policy::landing;
use kinetic_core::profile::{self, ProfileUpdate};
use kinetic_core::AppState;

use crate::output;

pub fn register(state: &mut AppState, email: &str, name: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || name.trim().is_empty() || password.is_empty() {
        bail!("Email, name and password are required");
    }
    if !state.session.register(email, password, name)? {
        bail!("User with email {} already exists", email);
    }

    println!("\x1b[1;32m✅ Registered and logged in\x1b[0m");
    whoami(state, false)
}

pub fn login(state: &mut AppState, email: &str, password: &str) -> Result<()> {
    if !state.session.login(email, password)? {
        bail!("Invalid email or password");
    }

    println!("\x1b[1;32m✅ Login successful!\x1b[0m");
    whoami(state, false)
}

pub fn logout(state: &mut AppState) -> Result<()> {
    if !state.session.is_authenticated() {
        println!("\x1b[33m✗ Not logged in\x1b[0m");
        return Ok(());
    }
    state.session.logout()?;
    println!("\x1b[32m✅ Logged out successfully\x1b[0m");
    Ok(())
}

pub fn whoami(state: &AppState, json: bool) -> Result<()> {
    match state.session.current_user() {
        Some(user) if json => output::print_json(&output::UserView::from(user)),
        Some(user) => {
            println!("\x1b[32m✓ Logged in\x1b[0m as {} <{}>", user.name, user.email);
            println!("Role: {} ({})", user.role.label(), user.role);
            println!("Home: {}", landing(user.role));
            println!("\x1b[90mUser ID: {}\x1b[0m", user.id);
            Ok(())
        }
        None => {
            println!("\x1b[33m✗ Not logged in\x1b[0m");
            println!("Run '\x1b[1mkinetic login\x1b[0m' to authenticate");
            Ok(())
        }
    }
}

pub fn update_profile(state: &mut AppState, update: ProfileUpdate) -> Result<()> {
    let user = profile::update_profile(&mut state.session, update)?;
    println!("\x1b[32m✅ Profile updated\x1b[0m");
    output::print_user_line(&user);
    Ok(())
}

pub fn change_password(state: &mut AppState, current: &str, new: &str, confirm: &str) -> Result<()> {
    profile::change_password(&mut state.session, current, new, confirm)?;
    println!("\x1b[32m✅ Password changed\x1b[0m");
    Ok(())
}
