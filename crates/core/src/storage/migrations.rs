//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use rusqlite::Connection;
use tracing::{info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Users table
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                is_email_verified INTEGER NOT NULL DEFAULT 0,
                auth_provider TEXT NOT NULL DEFAULT 'email',
                social_provider_id TEXT,
                profile_picture TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Sessions table
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- One-time codes for email verification / password reset
            CREATE TABLE IF NOT EXISTS otps (
                id TEXT PRIMARY KEY,
                code TEXT NOT NULL,
                kind TEXT NOT NULL,
                user_id TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                is_used INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Listings table; step fields stay NULL until their step is applied
            CREATE TABLE IF NOT EXISTS listings (
                id TEXT PRIMARY KEY,
                host_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',

                -- Step 1: property details
                category TEXT,
                place_type TEXT,
                country TEXT,
                street_address TEXT,
                floor TEXT,
                city TEXT,
                state TEXT,
                postal_code TEXT,
                guests INTEGER,
                bedrooms INTEGER,
                beds INTEGER,
                home_precise INTEGER NOT NULL DEFAULT 0,
                bedroom_lock INTEGER NOT NULL DEFAULT 0,
                private_bathroom REAL,
                dedicated_bathroom REAL,
                shared_bathroom REAL,
                bathroom_usage TEXT,

                -- Step 2: amenities, safety & media (tag sets as JSON arrays)
                favorites TEXT,
                amenities TEXT,
                safety_items TEXT,
                title TEXT,
                highlights TEXT,
                description TEXT,

                -- Step 3: booking & pricing
                booking_setting TEXT,
                weekday_price REAL,
                weekday_after_tax_price REAL,
                weekend_price REAL,
                weekend_after_tax_price REAL,

                -- Step 4: safety details & host address
                safety_details TEXT,
                host_country TEXT,
                host_street_address TEXT,
                host_apt_floor TEXT,
                host_city TEXT,
                host_state TEXT,
                host_postal_code TEXT,
                hosting_as_business INTEGER NOT NULL DEFAULT 0,

                step1_completed INTEGER NOT NULL DEFAULT 0,
                step2_completed INTEGER NOT NULL DEFAULT 0,
                step3_completed INTEGER NOT NULL DEFAULT 0,
                step4_completed INTEGER NOT NULL DEFAULT 0,

                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (host_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Photos, owned exclusively by their listing
            CREATE TABLE IF NOT EXISTS listing_photos (
                id TEXT PRIMARY KEY,
                listing_id TEXT NOT NULL,
                public_id TEXT NOT NULL,
                secure_url TEXT NOT NULL,
                display_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (listing_id) REFERENCES listings(id) ON DELETE CASCADE
            );

            -- Discounts: listing_id set for listing-owned rows,
            -- NULL for globally managed rows
            CREATE TABLE IF NOT EXISTS discounts (
                id TEXT PRIMARY KEY,
                listing_id TEXT,
                name TEXT NOT NULL,
                description TEXT,
                discount_percentage REAL NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (listing_id) REFERENCES listings(id) ON DELETE CASCADE
            );

            -- Association table for the referenced-discount policy
            CREATE TABLE IF NOT EXISTS listing_discounts (
                listing_id TEXT NOT NULL,
                discount_id TEXT NOT NULL,
                PRIMARY KEY (listing_id, discount_id),
                FOREIGN KEY (listing_id) REFERENCES listings(id) ON DELETE CASCADE,
                FOREIGN KEY (discount_id) REFERENCES discounts(id) ON DELETE CASCADE
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            -- Session indexes
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);

            -- OTP indexes
            CREATE INDEX IF NOT EXISTS idx_otps_user ON otps(user_id);
            CREATE INDEX IF NOT EXISTS idx_otps_expires ON otps(expires_at);

            -- Listing indexes
            CREATE INDEX IF NOT EXISTS idx_listings_host ON listings(host_id);
            CREATE INDEX IF NOT EXISTS idx_listings_status ON listings(status);
            CREATE INDEX IF NOT EXISTS idx_listings_created ON listings(created_at);

            -- Child collection indexes
            CREATE INDEX IF NOT EXISTS idx_photos_listing ON listing_photos(listing_id);
            CREATE INDEX IF NOT EXISTS idx_discounts_listing ON discounts(listing_id);
            CREATE INDEX IF NOT EXISTS idx_discounts_active ON discounts(is_active);
            CREATE INDEX IF NOT EXISTS idx_listing_discounts_discount
                ON listing_discounts(discount_id);
        "#,
    },
];

/// Initialize the migrations table
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .unwrap_or(None);
    Ok(version.unwrap_or(0))
}

/// Record that a migration was applied
fn record_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Run all pending migrations
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let current_version = get_current_version(conn)?;
    info!(current_version, "Checking for pending migrations");

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                description = migration.description,
                "Applying migration"
            );

            conn.execute_batch(migration.sql)?;
            record_migration(conn, migration)?;

            info!(version = migration.version, "Migration complete");
        }
    }

    let new_version = get_current_version(conn)?;
    if new_version > current_version {
        info!(
            from = current_version,
            to = new_version,
            "Database schema updated"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Get the latest migration version (test helper)
    fn latest_version() -> u32 {
        MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
    }

    #[test]
    fn test_migrations_run() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run twice
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn test_migrations_sequential() {
        // Verify migrations are numbered sequentially
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(
                migration.version as usize,
                i + 1,
                "Migration {} should have version {}",
                migration.description,
                i + 1
            );
        }
    }
}
