//! Client dashboard: applications, chat log and purchases of the logged-in client

use chrono::Utc;
use shared::{new_id, Application, ApplicationStatus, ChatMessage, Purchase, PurchaseStatus};

use crate::error::{CoreError, Result};
use crate::policy::Capability;
use crate::session::SessionManager;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientOverview {
    pub purchases: Vec<Purchase>,
    pub applications: Vec<Application>,
    pub chat_messages: Vec<ChatMessage>,
    pub total_spent: f64,
    pub completed_purchases: usize,
    pub pending_applications: usize,
}

/// Ask to enroll in a program; the application waits for review
pub fn submit_application(session: &SessionManager, program: &str, message: &str) -> Result<Application> {
    let user = session.authorize(Capability::ClientDashboard)?.clone();
    let program = program.trim();
    if program.is_empty() {
        return Err(CoreError::Validation("program is required".to_string()));
    }

    let application = Application {
        id: new_id(),
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_email: user.email.clone(),
        program: program.to_string(),
        message: message.trim().to_string(),
        status: ApplicationStatus::Pending,
        created_at: Utc::now(),
        reviewed_by: None,
        reviewed_at: None,
    };
    session.store().modify(|data| {
        data.applications.push(application.clone());
        Ok(())
    })?;

    tracing::info!("User {} applied for {}", user.id, application.program);
    Ok(application)
}

/// Log one question/answer exchange with the club assistant
pub fn record_chat_message(session: &SessionManager, message: &str, response: &str) -> Result<ChatMessage> {
    let user_id = session.authorize(Capability::ClientDashboard)?.id.clone();
    if message.trim().is_empty() {
        return Err(CoreError::Validation("message is required".to_string()));
    }

    let chat = ChatMessage {
        id: new_id(),
        user_id,
        message: message.to_string(),
        response: response.to_string(),
        timestamp: Utc::now(),
    };
    session.store().modify(|data| {
        data.chat_messages.push(chat.clone());
        Ok(())
    })?;
    Ok(chat)
}

pub fn record_purchase(session: &SessionManager, program: &str, amount: f64) -> Result<Purchase> {
    let user_id = session.authorize(Capability::ClientDashboard)?.id.clone();
    if program.trim().is_empty() {
        return Err(CoreError::Validation("program is required".to_string()));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::Validation(format!("invalid amount: {}", amount)));
    }

    let purchase = Purchase {
        id: new_id(),
        user_id,
        program: program.trim().to_string(),
        amount,
        status: PurchaseStatus::Pending,
        date: Utc::now(),
    };
    session.store().modify(|data| {
        data.purchases.push(purchase.clone());
        Ok(())
    })?;

    tracing::info!("User {} purchased {} for {}", purchase.user_id, purchase.program, amount);
    Ok(purchase)
}

/// Everything on the client's own dashboard
pub fn my_overview(session: &SessionManager) -> Result<ClientOverview> {
    let user_id = session.authorize(Capability::ClientDashboard)?.id.clone();
    let data = session.store().load()?;

    let purchases: Vec<Purchase> = data.purchases.into_iter().filter(|p| p.user_id == user_id).collect();
    let applications: Vec<Application> = data
        .applications
        .into_iter()
        .filter(|a| a.user_id == user_id)
        .collect();
    let chat_messages: Vec<ChatMessage> = data
        .chat_messages
        .into_iter()
        .filter(|m| m.user_id == user_id)
        .collect();

    Ok(ClientOverview {
        total_spent: purchases.iter().map(|p| p.amount).sum(),
        completed_purchases: purchases
            .iter()
            .filter(|p| p.status == PurchaseStatus::Completed)
            .count(),
        pending_applications: applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Pending)
            .count(),
        purchases,
        applications,
        chat_messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SeedConfig, StoreConfig};
    use crate::storage::MemoryStorage;
    use crate::store::RecordStore;
    use std::sync::Arc;

    fn session() -> SessionManager {
        let storage = Arc::new(MemoryStorage::new());
        let store = RecordStore::new(storage.clone(), &StoreConfig::default(), SeedConfig::default());
        SessionManager::open(store, storage, "current_user").unwrap()
    }

    #[test]
    fn test_overview_only_shows_own_records() {
        let mut session = session();
        assert!(session.register("a@x.com", "pw", "Anna").unwrap());
        submit_application(&session, "Skateboard", "beginner").unwrap();
        record_purchase(&session, "Skateboard", 3500.0).unwrap();
        session.logout().unwrap();

        assert!(session.register("b@x.com", "pw", "Boris").unwrap());
        record_chat_message(&session, "When is training?", "Tuesdays").unwrap();

        let overview = my_overview(&session).unwrap();
        assert!(overview.purchases.is_empty());
        assert!(overview.applications.is_empty());
        assert_eq!(overview.chat_messages.len(), 1);

        session.logout().unwrap();
        assert!(session.login("a@x.com", "pw").unwrap());
        let overview = my_overview(&session).unwrap();
        assert_eq!(overview.purchases.len(), 1);
        assert_eq!(overview.total_spent, 3500.0);
        assert_eq!(overview.completed_purchases, 0);
        assert_eq!(overview.pending_applications, 1);
        assert_eq!(overview.applications[0].user_name, "Anna");
    }

    #[test]
    fn test_staff_cannot_use_client_dashboard() {
        let mut session = session();
        assert!(session.login("dima260208@bk.ru", "Sempay666").unwrap());
        assert!(matches!(
            submit_application(&session, "Skate", ""),
            Err(CoreError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_purchase() {
        let mut session = session();
        assert!(session.register("a@x.com", "pw", "Anna").unwrap());
        assert!(matches!(
            record_purchase(&session, "Skate", -1.0),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            record_purchase(&session, " ", 10.0),
            Err(CoreError::Validation(_))
        ));
    }
}
