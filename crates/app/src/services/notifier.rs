//! Outbound notification capability
//!
//! Email delivery is an external collaborator; the bundled
//! implementation records the sends through tracing so development and
//! tests run without an SMTP transport.

use lodgekeep_core::{OtpKind, Result};
use tracing::info;

/// Outbound email capability
pub trait Notifier: Send + Sync {
    /// Deliver a one-time code
    fn send_otp_email(&self, email: &str, code: &str, kind: OtpKind) -> Result<()>;

    /// Welcome a freshly verified account
    fn send_welcome_email(&self, email: &str, name: &str) -> Result<()>;
}

/// Logging notifier for development and tests
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_otp_email(&self, email: &str, code: &str, kind: OtpKind) -> Result<()> {
        info!(email, code, ?kind, "OTP email");
        Ok(())
    }

    fn send_welcome_email(&self, email: &str, name: &str) -> Result<()> {
        info!(email, name, "Welcome email");
        Ok(())
    }
}
