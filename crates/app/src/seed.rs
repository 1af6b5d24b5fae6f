//! Admin account seeding
//!
//! Creates the configured admin account at startup. Idempotent: an
//! existing account with the same email is left untouched.

use lodgekeep_core::{Result, Role, User};
use tracing::{debug, info};
use uuid::Uuid;

use crate::services::AuthService;
use crate::state::AppState;

/// Seed the configured admin account, returning its id when one is
/// configured.
pub fn seed_admin(state: &AppState) -> Result<Option<Uuid>> {
    let Some(admin) = &state.config.admin else {
        debug!("No admin account configured, skipping seed");
        return Ok(None);
    };

    let db = state.db.lock().unwrap();

    if let Some(existing) = db.users().find_by_email(&admin.email)? {
        debug!(user_id = %existing.id, "Admin account already present");
        return Ok(Some(existing.id));
    }

    let mut user = User::new(
        admin.name.clone(),
        admin.email.clone(),
        AuthService::hash_password(&admin.password)?,
        Role::Admin,
    );
    user.is_email_verified = true;
    db.users().create(&user)?;

    info!(user_id = %user.id, email = %admin.email, "Admin account seeded");
    Ok(Some(user.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminSeed, AppConfig};
    use crate::services::{LocalMediaStore, LogNotifier};
    use lodgekeep_core::Database;
    use std::sync::Arc;

    fn state_with_admin() -> AppState {
        let config = AppConfig {
            admin: Some(AdminSeed {
                name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                password: "changeme123".to_string(),
            }),
            ..AppConfig::default()
        };
        AppState::with_collaborators(
            Database::open_in_memory().unwrap(),
            config,
            Arc::new(LocalMediaStore::new(std::env::temp_dir())),
            Arc::new(LogNotifier),
        )
    }

    #[test]
    fn test_seed_creates_verified_admin() {
        let state = state_with_admin();
        let id = seed_admin(&state).unwrap().unwrap();

        let db = state.db.lock().unwrap();
        let user = db.users().find_by_id(id).unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_email_verified);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let state = state_with_admin();
        let first = seed_admin(&state).unwrap();
        let second = seed_admin(&state).unwrap();
        assert_eq!(first, second);

        let db = state.db.lock().unwrap();
        assert_eq!(db.users().list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_seed_skips_without_config() {
        let state = AppState::with_collaborators(
            Database::open_in_memory().unwrap(),
            AppConfig::default(),
            Arc::new(LocalMediaStore::new(std::env::temp_dir())),
            Arc::new(LogNotifier),
        );
        assert_eq!(seed_admin(&state).unwrap(), None);
    }
}
