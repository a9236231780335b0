use chrono::Utc;
use shared::{AppData, User, UserRole};

use crate::config::SeedConfig;
use crate::error::Result;
use crate::password::hash_password;

/// First-run aggregate: the configured director and nothing else
pub fn seed_data(seed: &SeedConfig) -> Result<AppData> {
    let mut director = User::new(
        seed.email.as_str(),
        hash_password(&seed.password)?,
        seed.name.as_str(),
        UserRole::Director,
        Utc::now(),
    );
    director.id = seed.id.clone();

    Ok(AppData {
        users: vec![director],
        ..AppData::default()
    })
}
