//! User administration service

use std::sync::Arc;

use lodgekeep_core::{permissions, Actor, Error, Result, Role, User};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::state::AppState;

pub struct UserService {
    state: Arc<AppState>,
}

impl UserService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// All accounts, newest first (admin only)
    pub fn list(&self, actor: &Actor) -> Result<Vec<User>> {
        permissions::require_admin(actor)?;
        let db = self.state.db.lock().unwrap();
        db.users().list_all()
    }

    /// Single account (admin only)
    pub fn get(&self, actor: &Actor, user_id: Uuid) -> Result<User> {
        permissions::require_admin(actor)?;
        let db = self.state.db.lock().unwrap();
        db.users()
            .find_by_id(user_id)?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Change an account's role (admin only)
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub fn update_role(&self, actor: &Actor, user_id: Uuid, role: Role) -> Result<User> {
        permissions::require_admin(actor)?;
        let db = self.state.db.lock().unwrap();
        let mut user = db
            .users()
            .find_by_id(user_id)?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        user.role = role;
        db.users().update(&user)?;
        info!(user_id = %user.id, role = %role, "Role updated");
        Ok(user)
    }

    /// Delete an account; sessions, codes and listings cascade
    /// (admin only)
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub fn delete(&self, actor: &Actor, user_id: Uuid) -> Result<()> {
        permissions::require_admin(actor)?;
        let db = self.state.db.lock().unwrap();
        db.users()
            .find_by_id(user_id)?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        db.users().delete(user_id)?;
        info!(user_id = %user_id, "User deleted");
        Ok(())
    }
}
