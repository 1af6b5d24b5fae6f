//! Lodgekeep - property-rental listing platform backend
//!
//! Boots configuration, storage, and the service layer. A transport
//! (HTTP router) mounts on top of the services constructed here; none
//! ships with this crate.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodgekeep_app::{config, seed, services, state};

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Lodgekeep");

    let app_config = match config::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match state::AppState::new(app_config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = seed::seed_admin(&app_state) {
        tracing::error!("Admin seeding failed: {}", e);
        std::process::exit(1);
    }

    // Startup housekeeping: stale credentials have no reason to linger
    {
        let db = app_state.db.lock().unwrap();
        match db.users().cleanup_expired_sessions() {
            Ok(count) if count > 0 => tracing::info!(count, "Expired sessions removed"),
            Ok(_) => {}
            Err(e) => tracing::warn!("Session cleanup failed: {}", e),
        }
        match db.otps().delete_expired() {
            Ok(count) if count > 0 => tracing::info!(count, "Expired codes removed"),
            Ok(_) => {}
            Err(e) => tracing::warn!("OTP cleanup failed: {}", e),
        }
    }

    let _auth = services::AuthService::new(app_state.clone());
    let _listings = services::ListingService::new(app_state.clone());
    let _discounts = services::DiscountService::new(app_state.clone());
    let _users = services::UserService::new(app_state.clone());

    tracing::info!(
        discount_policy = ?app_state.discount_policy(),
        "Lodgekeep services ready; mount a transport to serve requests"
    );
}
