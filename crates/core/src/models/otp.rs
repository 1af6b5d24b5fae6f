//! One-time codes for email verification and password reset

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the code unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpKind {
    EmailVerification,
    PasswordReset,
}

impl OtpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpKind::EmailVerification => "email_verification",
            OtpKind::PasswordReset => "password_reset",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "email_verification" => Some(OtpKind::EmailVerification),
            "password_reset" => Some(OtpKind::PasswordReset),
            _ => None,
        }
    }
}

/// A single-use verification code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Otp {
    pub id: Uuid,
    pub code: String,
    pub kind: OtpKind,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

impl Otp {
    pub fn new(user_id: Uuid, kind: OtpKind, expiration_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code: generate_code(),
            kind,
            user_id,
            expires_at: now + chrono::Duration::minutes(expiration_minutes),
            is_used: false,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Random 6-digit code, zero-padding excluded by the range
fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}
