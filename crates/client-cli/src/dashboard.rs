//! Client commands: applications, assistant chat log, purchases

use anyhow::Result;
use kinetic_core::client;
use kinetic_core::AppState;

use crate::output;

pub fn apply(state: &AppState, program: &str, message: &str) -> Result<()> {
    let app = client::submit_application(&state.session, program, message)?;
    println!("\x1b[32m✅ Application sent\x1b[0m");
    output::print_application(&app);
    Ok(())
}

pub fn chat(state: &AppState, message: &str, response: &str) -> Result<()> {
    let chat = client::record_chat_message(&state.session, message, response)?;
    println!("\x1b[90mSaved message {}\x1b[0m", chat.id);
    Ok(())
}

pub fn buy(state: &AppState, program: &str, amount: f64) -> Result<()> {
    let purchase = client::record_purchase(&state.session, program, amount)?;
    println!(
        "\x1b[32m✅ Purchase recorded\x1b[0m {} for {:.2} ({})",
        purchase.program, purchase.amount, purchase.status
    );
    Ok(())
}

pub fn overview(state: &AppState, json: bool) -> Result<()> {
    let overview = client::my_overview(&state.session)?;
    if json {
        return output::print_json(&serde_json::json!({
            "purchases": overview.purchases,
            "applications": overview.applications,
            "chatMessages": overview.chat_messages,
            "totalSpent": overview.total_spent,
            "completedPurchases": overview.completed_purchases,
            "pendingApplications": overview.pending_applications,
        }));
    }

    println!(
        "Spent {:.2} on {} purchases ({} completed)",
        overview.total_spent,
        overview.purchases.len(),
        overview.completed_purchases
    );
    for purchase in &overview.purchases {
        println!(
            "  {}  {:<20} {:>10.2}  {}",
            output::time(&purchase.date),
            purchase.program,
            purchase.amount,
            purchase.status
        );
    }

    println!("Applications: {} pending", overview.pending_applications);
    for app in &overview.applications {
        output::print_application(app);
    }

    println!("Chat messages: {}", overview.chat_messages.len());
    Ok(())
}
