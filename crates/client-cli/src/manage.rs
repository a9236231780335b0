//! Staff commands: CRM listings, application review and account management

use anyhow::Result;
use kinetic_core::management;
use kinetic_core::AppState;
use shared::{ReviewDecision, UserRole};

use crate::output;

pub fn users(state: &AppState, json: bool) -> Result<()> {
    let users = management::users(&state.session)?;
    output::print_users(&users, json)
}

pub fn clients(state: &AppState, json: bool) -> Result<()> {
    let clients = management::clients(&state.session)?;
    output::print_users(&clients, json)
}

pub fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = management::dashboard_stats(&state.session)?;
    if json {
        return output::print_json(&stats);
    }

    println!("\x1b[1;36mClub overview\x1b[0m");
    println!("  Users:                {} ({} active)", stats.total_users, stats.active_users);
    println!("  Admins:               {}", stats.admins);
    println!("  Trainers:             {}", stats.trainers);
    println!("  Clients:              {}", stats.clients);
    println!("  Pending applications: {}", stats.pending_applications);
    println!("  Purchases:            {}", stats.total_purchases);
    println!("  Revenue:              {:.2}", stats.total_revenue);
    Ok(())
}

pub fn activity(state: &AppState, limit: Option<usize>, json: bool) -> Result<()> {
    let entries = management::activity_history(&state.session, limit)?;
    output::print_activities(&entries, json)
}

pub fn chats(state: &AppState, limit: Option<usize>, json: bool) -> Result<()> {
    let messages = management::chat_history(&state.session, limit)?;
    output::print_chats(&messages, json)
}

pub fn applications(state: &AppState, all: bool, json: bool) -> Result<()> {
    let queues = management::applications(&state.session)?;
    if json {
        let processed = if all { queues.processed } else { Vec::new() };
        return output::print_json(&serde_json::json!({
            "pending": queues.pending,
            "processed": processed,
        }));
    }

    println!("\x1b[1mPending ({})\x1b[0m", queues.pending.len());
    for app in &queues.pending {
        output::print_application(app);
    }
    if all {
        println!();
        println!("\x1b[1mProcessed ({})\x1b[0m", queues.processed.len());
        for app in &queues.processed {
            output::print_application(app);
        }
    }
    Ok(())
}

pub fn review(state: &AppState, application_id: &str, decision: ReviewDecision) -> Result<()> {
    let app = management::review_application(&state.session, application_id, decision)?;
    println!("\x1b[32m✅ Application {}\x1b[0m", app.status);
    output::print_application(&app);
    Ok(())
}

pub fn add_staff(state: &AppState, email: &str, name: &str, password: &str, role: UserRole) -> Result<()> {
    let user = management::create_staff(&state.session, email, name, password, role)?;
    println!("\x1b[32m✅ Created {}\x1b[0m", user.role.label());
    output::print_user_line(&user);
    Ok(())
}

pub fn set_role(state: &AppState, user_id: &str, role: UserRole) -> Result<()> {
    let user = management::change_user_role(&state.session, user_id, role)?;
    println!("\x1b[32m✅ Role changed\x1b[0m");
    output::print_user_line(&user);
    Ok(())
}

pub fn set_active(state: &AppState, user_id: &str, active: bool) -> Result<()> {
    let user = management::set_user_active(&state.session, user_id, active)?;
    let verb = if active { "enabled" } else { "disabled" };
    println!("\x1b[32m✅ Account {}\x1b[0m", verb);
    output::print_user_line(&user);
    Ok(())
}
