use std::sync::Arc;

use kinetic_core::config::{SeedConfig, StoreConfig};
use kinetic_core::{client, management, profile};
use kinetic_core::{CoreError, MemoryStorage, RecordStore, SessionManager};
use shared::{ActivityAction, ApplicationStatus, ReviewDecision, UserRole};

fn session() -> SessionManager {
    let storage = Arc::new(MemoryStorage::new());
    let store = RecordStore::new(storage.clone(), &StoreConfig::default(), SeedConfig::default());
    SessionManager::open(store, storage, "current_user").unwrap()
}

fn login_director(session: &mut SessionManager) {
    session.logout().unwrap();
    assert!(session.login("dima260208@bk.ru", "Sempay666").unwrap());
}

#[test]
fn test_application_review_flow() -> anyhow::Result<()> {
    let mut session = session();
    assert!(session.register("a@x.com", "pw", "Anna")?);
    let app = client::submit_application(&session, "Скейтборд", "Хочу записаться")?;
    assert_eq!(app.status, ApplicationStatus::Pending);

    login_director(&mut session);
    let queues = management::applications(&session)?;
    assert_eq!(queues.pending.len(), 1);
    assert!(queues.processed.is_empty());

    let reviewed = management::review_application(&session, &app.id, ReviewDecision::Approve)?;
    assert_eq!(reviewed.status, ApplicationStatus::Approved);
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("Дмитрий Болотин"));
    assert!(reviewed.reviewed_at.is_some());

    // Decided applications cannot be reviewed again
    assert!(matches!(
        management::review_application(&session, &app.id, ReviewDecision::Reject),
        Err(CoreError::Conflict(_))
    ));

    let queues = management::applications(&session)?;
    assert!(queues.pending.is_empty());
    assert_eq!(queues.processed.len(), 1);
    Ok(())
}

#[test]
fn test_clients_cannot_reach_privileged_operations() -> anyhow::Result<()> {
    let mut session = session();
    assert!(session.register("a@x.com", "pw", "Anna")?);
    let me = session.current_user().unwrap().id.clone();

    assert!(matches!(management::users(&session), Err(CoreError::Forbidden { .. })));
    assert!(matches!(management::dashboard_stats(&session), Err(CoreError::Forbidden { .. })));
    assert!(matches!(
        management::create_staff(&session, "t@x.com", "T", "pw", UserRole::Trainer),
        Err(CoreError::Forbidden { .. })
    ));
    assert!(matches!(
        management::change_user_role(&session, "director-1", UserRole::Client),
        Err(CoreError::Forbidden { .. })
    ));
    assert!(matches!(
        management::set_user_active(&session, "director-1", false),
        Err(CoreError::Forbidden { .. })
    ));

    // Own record is still a client
    let data = session.store().load()?;
    assert_eq!(data.user_by_id(&me).unwrap().role, UserRole::Client);
    Ok(())
}

#[test]
fn test_director_never_assignable() -> anyhow::Result<()> {
    let mut session = session();
    assert!(session.register("a@x.com", "pw", "Anna")?);
    let anna = session.current_user().unwrap().id.clone();
    login_director(&mut session);

    assert!(matches!(
        management::change_user_role(&session, &anna, UserRole::Director),
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        management::create_staff(&session, "d2@x.com", "D2", "pw", UserRole::Director),
        Err(CoreError::Validation(_))
    ));

    let updated = management::change_user_role(&session, &anna, UserRole::Manager)?;
    assert_eq!(updated.role, UserRole::Manager);
    Ok(())
}

#[test]
fn test_manager_manages_trainers_only() -> anyhow::Result<()> {
    let mut session = session();
    login_director(&mut session);
    management::create_staff(&session, "m@x.com", "Manager", "pw", UserRole::Manager)?;
    let admin = management::create_staff(&session, "adm@x.com", "Admin", "pw", UserRole::Admin)?;

    session.logout()?;
    assert!(session.login("m@x.com", "pw")?);

    let trainer = management::create_staff(&session, "t@x.com", "Trainer", "pw", UserRole::Trainer)?;
    assert_eq!(trainer.role, UserRole::Trainer);
    assert!(matches!(
        management::create_staff(&session, "a2@x.com", "Admin2", "pw", UserRole::Admin),
        Err(CoreError::Forbidden { .. })
    ));

    let blocked = management::set_user_active(&session, &trainer.id, false)?;
    assert!(!blocked.is_active);
    assert!(matches!(
        management::set_user_active(&session, &admin.id, false),
        Err(CoreError::Forbidden { .. })
    ));

    // Managers see the CRM but not the director panel
    assert_eq!(management::users(&session)?.len(), 4);
    assert!(management::dashboard_stats(&session).is_err());
    Ok(())
}

#[test]
fn test_application_list_is_admin_panel_only() -> anyhow::Result<()> {
    let mut session = session();
    assert!(session.register("a@x.com", "pw", "Anna")?);
    let app = client::submit_application(&session, "Ролики", "")?;
    login_director(&mut session);
    management::create_staff(&session, "m@x.com", "Manager", "pw", UserRole::Manager)?;
    management::create_staff(&session, "adm@x.com", "Admin", "pw", UserRole::Admin)?;

    session.logout()?;
    assert!(session.login("m@x.com", "pw")?);
    match management::applications(&session) {
        Err(CoreError::Forbidden { role, .. }) => assert_eq!(role, UserRole::Manager),
        other => panic!("expected Forbidden, got {:?}", other.map(|q| q.pending.len())),
    }
    // Reviewing by id stays open to managers
    let reviewed = management::review_application(&session, &app.id, ReviewDecision::Reject)?;
    assert_eq!(reviewed.status, ApplicationStatus::Rejected);

    session.logout()?;
    assert!(session.login("adm@x.com", "pw")?);
    assert_eq!(management::applications(&session)?.processed.len(), 1);
    Ok(())
}

#[test]
fn test_staff_email_must_be_unique() -> anyhow::Result<()> {
    let mut session = session();
    login_director(&mut session);
    assert!(matches!(
        management::create_staff(&session, "dima260208@bk.ru", "Dup", "pw", UserRole::Admin),
        Err(CoreError::Conflict(_))
    ));
    assert_eq!(session.store().load()?.users.len(), 1);
    Ok(())
}

#[test]
fn test_activity_history_is_newest_first() -> anyhow::Result<()> {
    let mut session = session();
    assert!(session.register("a@x.com", "pw", "Anna")?);
    login_director(&mut session);

    let history = management::activity_history(&session, None)?;
    let actions: Vec<ActivityAction> = history.iter().map(|a| a.action.clone()).collect();
    assert_eq!(
        actions,
        vec![ActivityAction::Login, ActivityAction::Logout, ActivityAction::Register]
    );
    for pair in history.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }

    assert_eq!(management::activity_history(&session, Some(1))?.len(), 1);
    Ok(())
}

#[test]
fn test_dashboard_stats_and_chat_history() -> anyhow::Result<()> {
    let mut session = session();
    assert!(session.register("a@x.com", "pw", "Anna")?);
    client::record_purchase(&session, "Ролики", 2500.0)?;
    client::record_purchase(&session, "Скейт", 1500.0)?;
    client::record_chat_message(&session, "first", "one")?;
    client::record_chat_message(&session, "second", "two")?;
    client::submit_application(&session, "Ролики", "")?;
    login_director(&mut session);
    management::create_staff(&session, "t@x.com", "Trainer", "pw", UserRole::Trainer)?;

    let stats = management::dashboard_stats(&session)?;
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.active_users, 3);
    assert_eq!(stats.trainers, 1);
    assert_eq!(stats.clients, 1);
    assert_eq!(stats.admins, 0);
    assert_eq!(stats.pending_applications, 1);
    assert_eq!(stats.total_purchases, 2);
    assert_eq!(stats.total_revenue, 4000.0);

    let chats = management::chat_history(&session, Some(10))?;
    assert_eq!(chats.len(), 2);
    assert!(chats[0].timestamp >= chats[1].timestamp);
    Ok(())
}

#[test]
fn test_trainer_sees_client_roster() -> anyhow::Result<()> {
    let mut session = session();
    assert!(session.register("a@x.com", "pw", "Anna")?);
    login_director(&mut session);
    management::create_staff(&session, "t@x.com", "Trainer", "pw", UserRole::Trainer)?;
    session.logout()?;
    assert!(session.login("t@x.com", "pw")?);

    let roster = management::clients(&session)?;
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].email, "a@x.com");
    assert!(management::users(&session).is_err());
    Ok(())
}

#[test]
fn test_profile_changes_are_logged() -> anyhow::Result<()> {
    let mut session = session();
    assert!(session.register("a@x.com", "pw", "Anna")?);
    profile::update_profile(
        &mut session,
        profile::ProfileUpdate {
            bio: Some("Катаюсь с 2019".to_string()),
            ..Default::default()
        },
    )?;
    profile::change_password(&mut session, "pw", "pw2", "pw2")?;

    let id = session.current_user().unwrap().id.clone();
    let data = session.store().load()?;
    let actions: Vec<ActivityAction> = data.activities_for(&id).map(|a| a.action.clone()).collect();
    assert_eq!(
        actions,
        vec![
            ActivityAction::Register,
            ActivityAction::ProfileUpdate,
            ActivityAction::PasswordChange
        ]
    );
    assert_eq!(data.user_by_id(&id).unwrap().bio.as_deref(), Some("Катаюсь с 2019"));
    Ok(())
}
