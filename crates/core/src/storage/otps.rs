//! One-time code storage operations

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::{Otp, OtpKind};

pub struct OtpStore<'a> {
    conn: &'a Connection,
}

impl<'a> OtpStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Store a new code
    #[instrument(skip(self, otp), fields(user_id = %otp.user_id, kind = ?otp.kind))]
    pub fn create(&self, otp: &Otp) -> Result<()> {
        self.conn.execute(
            "INSERT INTO otps (id, code, kind, user_id, expires_at, is_used, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                otp.id.to_string(),
                otp.code,
                otp.kind.as_str(),
                otp.user_id.to_string(),
                otp.expires_at.to_rfc3339(),
                otp.is_used as i32,
                otp.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Check a code for a user; consumes it on success.
    ///
    /// Returns false for unknown, already-used, or expired codes.
    #[instrument(skip(self, code))]
    pub fn verify(&self, user_id: Uuid, code: &str, kind: OtpKind) -> Result<bool> {
        let mut stmt = self.conn.prepare(
            "SELECT id, expires_at FROM otps \
             WHERE user_id = ?1 AND code = ?2 AND kind = ?3 AND is_used = 0",
        )?;

        let found = stmt
            .query_row(params![user_id.to_string(), code, kind.as_str()], |row| {
                Ok((
                    parse_uuid(&row.get::<_, String>(0)?)?,
                    parse_datetime(&row.get::<_, String>(1)?)?,
                ))
            })
            .optional()?;

        let Some((otp_id, expires_at)) = found else {
            return Ok(false);
        };

        if Utc::now() > expires_at {
            return Ok(false);
        }

        self.conn.execute(
            "UPDATE otps SET is_used = 1 WHERE id = ?1",
            params![otp_id.to_string()],
        )?;
        Ok(true)
    }

    /// Remove all codes of one kind for a user
    pub fn delete_for_user(&self, user_id: Uuid, kind: OtpKind) -> Result<()> {
        self.conn.execute(
            "DELETE FROM otps WHERE user_id = ?1 AND kind = ?2",
            params![user_id.to_string(), kind.as_str()],
        )?;
        Ok(())
    }

    /// Remove expired codes
    pub fn delete_expired(&self) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM otps WHERE expires_at < ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(count as u64)
    }
}
