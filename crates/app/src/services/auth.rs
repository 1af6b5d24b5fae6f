//! Authentication service
//!
//! Signup with OTP email verification, login against argon2 hashes,
//! password reset, and resolution of session tokens into the actor the
//! permission layer consumes. Tokens are opaque: base64 of the session
//! id, nothing encoded beyond that.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use lodgekeep_core::{Actor, Error, Otp, OtpKind, Result, Role, Session, User};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::state::AppState;

pub struct AuthService {
    state: Arc<AppState>,
}

impl AuthService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Hash a password with a fresh salt
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| Error::Authentication("Failed to hash password".to_string()))
    }

    /// Check a password against a stored hash
    pub fn verify_password(hash: &str, password: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Register a new host or user account and issue a verification code
    #[instrument(skip(self, password))]
    pub fn signup(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User> {
        let mut errors = Vec::new();
        if name.trim().is_empty() {
            errors.push("name should not be empty".to_string());
        }
        if !email.contains('@') {
            errors.push("email must be an email".to_string());
        }
        if password.chars().count() < 8 {
            errors.push("password must be longer than or equal to 8 characters".to_string());
        }
        if role == Role::Admin {
            // Admin accounts exist only through seeding
            errors.push("role must be one of: host, user".to_string());
        }
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let db = self.state.db.lock().unwrap();

        if db.users().find_by_email(email)?.is_some() {
            return Err(Error::BusinessRule("Email already exists".to_string()));
        }

        let user = User::new(
            name.to_string(),
            email.to_string(),
            Self::hash_password(password)?,
            role,
        );
        db.users().create(&user)?;

        let otp = Otp::new(
            user.id,
            OtpKind::EmailVerification,
            self.state.config.otp_expiration_minutes,
        );
        db.otps().create(&otp)?;
        self.state
            .notifier
            .send_otp_email(email, &otp.code, OtpKind::EmailVerification)?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Confirm an account with the emailed code
    #[instrument(skip(self, code))]
    pub fn verify_email(&self, email: &str, code: &str) -> Result<()> {
        let db = self.state.db.lock().unwrap();

        let mut user = db
            .users()
            .find_by_email(email)?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        if user.is_email_verified {
            return Err(Error::BusinessRule("Email already verified".to_string()));
        }

        if !db
            .otps()
            .verify(user.id, code, OtpKind::EmailVerification)?
        {
            return Err(Error::BusinessRule("Invalid or expired OTP".to_string()));
        }

        user.is_email_verified = true;
        db.users().update(&user)?;
        db.otps()
            .delete_for_user(user.id, OtpKind::EmailVerification)?;

        self.state
            .notifier
            .send_welcome_email(&user.email, &user.name)?;

        info!(user_id = %user.id, "Email verified");
        Ok(())
    }

    /// Authenticate and open a session. The returned token is what the
    /// transport hands back on subsequent requests.
    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let db = self.state.db.lock().unwrap();

        let user = db
            .users()
            .find_by_email(email)?
            .ok_or_else(|| Error::Authentication("Invalid credentials".to_string()))?;

        if !Self::verify_password(&user.password_hash, password) {
            return Err(Error::Authentication("Invalid credentials".to_string()));
        }

        if !user.is_email_verified {
            return Err(Error::Authentication(
                "Please verify your email first".to_string(),
            ));
        }

        let session = Session::new(user.id, self.state.config.session_ttl_hours);
        db.users().create_session(&session)?;

        info!(user_id = %user.id, "User logged in");
        Ok((user, encode_token(session.id)))
    }

    /// Close the session behind a token; unknown tokens are a no-op
    pub fn logout(&self, token: &str) -> Result<()> {
        let session_id = decode_token(token)?;
        let db = self.state.db.lock().unwrap();
        db.users().delete_session(session_id)?;
        Ok(())
    }

    /// Start a password reset. Succeeds silently for unknown emails so
    /// the endpoint does not reveal which accounts exist.
    #[instrument(skip(self))]
    pub fn forgot_password(&self, email: &str) -> Result<()> {
        let db = self.state.db.lock().unwrap();

        let Some(user) = db.users().find_by_email(email)? else {
            return Ok(());
        };

        let otp = Otp::new(
            user.id,
            OtpKind::PasswordReset,
            self.state.config.otp_expiration_minutes,
        );
        db.otps().create(&otp)?;
        self.state
            .notifier
            .send_otp_email(email, &otp.code, OtpKind::PasswordReset)?;

        Ok(())
    }

    /// Finish a password reset; every open session is invalidated
    #[instrument(skip(self, code, new_password))]
    pub fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        if new_password.chars().count() < 8 {
            return Err(Error::Validation(vec![
                "password must be longer than or equal to 8 characters".to_string(),
            ]));
        }

        let db = self.state.db.lock().unwrap();

        let mut user = db
            .users()
            .find_by_email(email)?
            .ok_or_else(|| Error::BusinessRule("Invalid request".to_string()))?;

        if !db.otps().verify(user.id, code, OtpKind::PasswordReset)? {
            return Err(Error::BusinessRule("Invalid or expired OTP".to_string()));
        }

        user.password_hash = Self::hash_password(new_password)?;
        db.users().update(&user)?;
        db.users().delete_user_sessions(user.id)?;
        db.otps().delete_for_user(user.id, OtpKind::PasswordReset)?;

        info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    /// Resolve a session token into the acting identity
    pub fn actor_from_token(&self, token: &str) -> Result<Actor> {
        let session_id = decode_token(token)?;
        let db = self.state.db.lock().unwrap();

        let session = db
            .users()
            .find_valid_session(session_id)?
            .ok_or_else(|| Error::Authentication("Invalid or expired session".to_string()))?;

        let user = db
            .users()
            .find_by_id(session.user_id)?
            .ok_or_else(|| Error::Authentication("Invalid or expired session".to_string()))?;

        Ok(Actor::new(user.id, user.role))
    }
}

fn encode_token(session_id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(session_id.as_bytes())
}

fn decode_token(token: &str) -> Result<Uuid> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| Error::Authentication("Invalid session token".to_string()))?;
    Uuid::from_slice(&bytes).map_err(|_| Error::Authentication("Invalid session token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::services::{LocalMediaStore, LogNotifier};
    use lodgekeep_core::Database;

    fn test_state() -> Arc<AppState> {
        let db = Database::open_in_memory().unwrap();
        let media_root = std::env::temp_dir().join(format!("lodgekeep-test-{}", Uuid::new_v4()));
        Arc::new(AppState::with_collaborators(
            db,
            AppConfig::default(),
            Arc::new(LocalMediaStore::new(media_root)),
            Arc::new(LogNotifier),
        ))
    }

    #[test]
    fn test_signup_verify_login_flow() {
        let state = test_state();
        let auth = AuthService::new(state.clone());

        let user = auth
            .signup("Alice Host", "alice@example.com", "s3cret-password", Role::Host)
            .unwrap();
        assert!(!user.is_email_verified);

        // Unverified accounts cannot log in yet
        let err = auth.login("alice@example.com", "s3cret-password").unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));

        // Verify using a code planted alongside the signup-issued one
        let otp = Otp::new(user.id, OtpKind::EmailVerification, 5);
        {
            let db = state.db.lock().unwrap();
            db.otps().create(&otp).unwrap();
        }
        auth.verify_email("alice@example.com", &otp.code).unwrap();

        let (logged_in, token) = auth.login("alice@example.com", "s3cret-password").unwrap();
        assert_eq!(logged_in.id, user.id);

        let actor = auth.actor_from_token(&token).unwrap();
        assert_eq!(actor.id, user.id);
        assert_eq!(actor.role, Role::Host);

        auth.logout(&token).unwrap();
        assert!(auth.actor_from_token(&token).is_err());
    }

    #[test]
    fn test_signup_rejects_duplicate_email() {
        let auth = AuthService::new(test_state());
        auth.signup("A", "dup@example.com", "password123", Role::User)
            .unwrap();

        let err = auth
            .signup("B", "dup@example.com", "password123", Role::User)
            .unwrap_err();
        match err {
            Error::BusinessRule(msg) => assert_eq!(msg, "Email already exists"),
            other => panic!("expected business rule error, got {other:?}"),
        }
    }

    #[test]
    fn test_signup_collects_field_errors() {
        let auth = AuthService::new(test_state());
        let err = auth
            .signup("", "not-an-email", "short", Role::Admin)
            .unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert_eq!(messages.len(), 4);
                assert!(messages.contains(&"email must be an email".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        let state = test_state();
        let auth = AuthService::new(state.clone());
        let user = auth
            .signup("Bob", "bob@example.com", "password123", Role::User)
            .unwrap();
        {
            let db = state.db.lock().unwrap();
            let mut verified = db.users().find_by_id(user.id).unwrap().unwrap();
            verified.is_email_verified = true;
            db.users().update(&verified).unwrap();
        }

        let err = auth.login("bob@example.com", "wrong-password").unwrap_err();
        match err {
            Error::Authentication(msg) => assert_eq!(msg, "Invalid credentials"),
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    #[test]
    fn test_reset_password_invalidates_sessions() {
        let state = test_state();
        let auth = AuthService::new(state.clone());
        let user = auth
            .signup("Cara", "cara@example.com", "password123", Role::Host)
            .unwrap();
        {
            let db = state.db.lock().unwrap();
            let mut verified = db.users().find_by_id(user.id).unwrap().unwrap();
            verified.is_email_verified = true;
            db.users().update(&verified).unwrap();
        }

        let (_, token) = auth.login("cara@example.com", "password123").unwrap();
        assert!(auth.actor_from_token(&token).is_ok());

        let otp = Otp::new(user.id, OtpKind::PasswordReset, 5);
        {
            let db = state.db.lock().unwrap();
            db.otps().create(&otp).unwrap();
        }
        auth.reset_password("cara@example.com", &otp.code, "new-password-1")
            .unwrap();

        // Old sessions and old password are both gone
        assert!(auth.actor_from_token(&token).is_err());
        assert!(auth.login("cara@example.com", "password123").is_err());
        assert!(auth.login("cara@example.com", "new-password-1").is_ok());
    }

    #[test]
    fn test_forgot_password_silent_for_unknown_email() {
        let auth = AuthService::new(test_state());
        assert!(auth.forgot_password("nobody@example.com").is_ok());
    }
}
