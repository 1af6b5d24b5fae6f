//! User and session storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_enum, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{AuthProviderKind, Role, Session, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_email_verified, \
     auth_provider, social_provider_id, profile_picture, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: parse_enum(&row.get::<_, String>(4)?, Role::from_str, "role")?,
        is_email_verified: row.get::<_, i32>(5)? != 0,
        auth_provider: parse_enum(
            &row.get::<_, String>(6)?,
            AuthProviderKind::from_str,
            "auth provider",
        )?,
        social_provider_id: row.get(7)?,
        profile_picture: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(10)?)?,
    })
}

pub struct UserStore<'a> {
    conn: &'a Connection,
}

impl<'a> UserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new user
    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    pub fn create(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, name, email, password_hash, role, is_email_verified, \
             auth_provider, social_provider_id, profile_picture, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.is_email_verified as i32,
                user.auth_provider.as_str(),
                user.social_provider_id,
                user.profile_picture,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find user by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;

        let user = stmt
            .query_row(params![id.to_string()], user_from_row)
            .optional()?;

        Ok(user)
    }

    /// Find user by email
    #[instrument(skip(self))]
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"))?;

        let user = stmt.query_row(params![email], user_from_row).optional()?;

        Ok(user)
    }

    /// Update a user's mutable fields
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub fn update(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET name = ?1, email = ?2, password_hash = ?3, role = ?4, \
             is_email_verified = ?5, auth_provider = ?6, social_provider_id = ?7, \
             profile_picture = ?8, updated_at = ?9
             WHERE id = ?10",
            params![
                user.name,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.is_email_verified as i32,
                user.auth_provider.as_str(),
                user.social_provider_id,
                user.profile_picture,
                Utc::now().to_rfc3339(),
                user.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Delete a user
    #[instrument(skip(self))]
    pub fn delete(&self, user_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM users WHERE id = ?1",
            params![user_id.to_string()],
        )?;
        Ok(())
    }

    /// List all users, newest first
    pub fn list_all(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))?;

        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Create a session
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub fn create_session(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id.to_string(),
                session.user_id.to_string(),
                session.created_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find valid session
    #[instrument(skip(self))]
    pub fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, created_at, expires_at FROM sessions \
             WHERE id = ?1 AND expires_at > ?2",
        )?;

        let now = Utc::now().to_rfc3339();
        let session = stmt
            .query_row(params![session_id.to_string(), now], |row| {
                Ok(Session {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    user_id: parse_uuid(&row.get::<_, String>(1)?)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?)?,
                    expires_at: parse_datetime(&row.get::<_, String>(3)?)?,
                })
            })
            .optional()?;

        Ok(session)
    }

    /// Delete session
    pub fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sessions WHERE id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(())
    }

    /// Delete all sessions for user
    pub fn delete_user_sessions(&self, user_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sessions WHERE user_id = ?1",
            params![user_id.to_string()],
        )?;
        Ok(())
    }

    /// Clean up expired sessions
    pub fn cleanup_expired_sessions(&self) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn sample_user() -> User {
        User::new(
            "Test Host".to_string(),
            "host@example.com".to_string(),
            "hash".to_string(),
            Role::Host,
        )
    }

    #[test]
    fn test_create_and_find_user() {
        let db = Database::open_in_memory().unwrap();
        let user = sample_user();
        db.users().create(&user).unwrap();

        let found = db.users().find_by_id(user.id).unwrap().unwrap();
        assert_eq!(found.email, "host@example.com");
        assert_eq!(found.role, Role::Host);
        assert!(!found.is_email_verified);

        let by_email = db.users().find_by_email("host@example.com").unwrap();
        assert!(by_email.is_some());
    }

    #[test]
    fn test_email_unique() {
        let db = Database::open_in_memory().unwrap();
        db.users().create(&sample_user()).unwrap();
        assert!(db.users().create(&sample_user()).is_err());
    }

    #[test]
    fn test_update_user() {
        let db = Database::open_in_memory().unwrap();
        let mut user = sample_user();
        db.users().create(&user).unwrap();

        user.is_email_verified = true;
        user.role = Role::Admin;
        db.users().update(&user).unwrap();

        let found = db.users().find_by_id(user.id).unwrap().unwrap();
        assert!(found.is_email_verified);
        assert_eq!(found.role, Role::Admin);
    }

    #[test]
    fn test_session_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let user = sample_user();
        db.users().create(&user).unwrap();

        let session = Session::new(user.id, 24);
        db.users().create_session(&session).unwrap();

        let found = db.users().find_valid_session(session.id).unwrap();
        assert!(found.is_some());

        db.users().delete_user_sessions(user.id).unwrap();
        assert!(db.users().find_valid_session(session.id).unwrap().is_none());
    }

    #[test]
    fn test_expired_session_not_returned() {
        let db = Database::open_in_memory().unwrap();
        let user = sample_user();
        db.users().create(&user).unwrap();

        let mut session = Session::new(user.id, 1);
        session.expires_at = Utc::now() - chrono::Duration::hours(1);
        db.users().create_session(&session).unwrap();

        assert!(db.users().find_valid_session(session.id).unwrap().is_none());
        assert_eq!(db.users().cleanup_expired_sessions().unwrap(), 1);
    }
}
