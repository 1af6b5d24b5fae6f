//! SQLite storage layer for Lodgekeep

mod discounts;
mod listings;
mod migrations;
mod otps;
mod parse;
mod traits;
mod users;

use std::path::Path;

use rusqlite::Connection;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Discount, Listing, Otp, OtpKind, Photo, Session, User};

pub use discounts::DiscountStore;
pub use listings::ListingStore;
pub use otps::OtpStore;
pub use traits::{DiscountRepository, ListingRepository, OtpRepository, UserRepository};
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get one-time code store
    pub fn otps(&self) -> OtpStore<'_> {
        OtpStore::new(&self.conn)
    }

    /// Get listing store
    pub fn listings(&self) -> ListingStore<'_> {
        ListingStore::new(&self.conn)
    }

    /// Get global discount store
    pub fn discounts(&self) -> DiscountStore<'_> {
        DiscountStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl UserRepository for Database {
    fn create_user(&self, user: &User) -> Result<()> {
        self.users().create(user)
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users().find_by_email(email)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        self.users().update(user)
    }

    fn delete_user(&self, user_id: Uuid) -> Result<()> {
        self.users().delete(user_id)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.users().list_all()
    }

    fn create_session(&self, session: &Session) -> Result<()> {
        self.users().create_session(session)
    }

    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        self.users().find_valid_session(session_id)
    }

    fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.users().delete_session(session_id)
    }

    fn delete_user_sessions(&self, user_id: Uuid) -> Result<()> {
        self.users().delete_user_sessions(user_id)
    }

    fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.users().cleanup_expired_sessions()
    }
}

impl OtpRepository for Database {
    fn create_otp(&self, otp: &Otp) -> Result<()> {
        self.otps().create(otp)
    }

    fn verify_otp(&self, user_id: Uuid, code: &str, kind: OtpKind) -> Result<bool> {
        self.otps().verify(user_id, code, kind)
    }

    fn delete_user_otps(&self, user_id: Uuid, kind: OtpKind) -> Result<()> {
        self.otps().delete_for_user(user_id, kind)
    }

    fn delete_expired_otps(&self) -> Result<u64> {
        self.otps().delete_expired()
    }
}

impl ListingRepository for Database {
    fn create_listing(&self, listing: &Listing) -> Result<()> {
        self.listings().create(listing)
    }

    fn find_listing_by_id(&self, id: Uuid) -> Result<Option<Listing>> {
        self.listings().find_by_id(id)
    }

    fn update_listing(&self, listing: &Listing) -> Result<()> {
        self.listings().update(listing)
    }

    fn delete_listing(&self, listing_id: Uuid) -> Result<()> {
        self.listings().delete(listing_id)
    }

    fn list_listings_for_host(&self, host_id: Uuid) -> Result<Vec<Listing>> {
        self.listings().list_for_host(host_id)
    }

    fn list_published_listings(&self) -> Result<Vec<Listing>> {
        self.listings().list_published()
    }

    fn list_all_listings(&self) -> Result<Vec<Listing>> {
        self.listings().list_all()
    }

    fn photos_for_listing(&self, listing_id: Uuid) -> Result<Vec<Photo>> {
        self.listings().photos(listing_id)
    }

    fn replace_photos(&self, listing_id: Uuid, photos: &[Photo]) -> Result<()> {
        self.listings().replace_photos(listing_id, photos)
    }

    fn owned_discounts(&self, listing_id: Uuid) -> Result<Vec<Discount>> {
        self.listings().owned_discounts(listing_id)
    }

    fn replace_owned_discounts(&self, listing_id: Uuid, discounts: &[Discount]) -> Result<()> {
        self.listings()
            .replace_owned_discounts(listing_id, discounts)
    }

    fn referenced_discounts(&self, listing_id: Uuid) -> Result<Vec<Discount>> {
        self.listings().referenced_discounts(listing_id)
    }

    fn set_discount_refs(&self, listing_id: Uuid, discount_ids: &[Uuid]) -> Result<()> {
        self.listings().set_discount_refs(listing_id, discount_ids)
    }
}

impl DiscountRepository for Database {
    fn create_discount(&self, discount: &Discount) -> Result<()> {
        self.discounts().create(discount)
    }

    fn update_discount(&self, discount: &Discount) -> Result<()> {
        self.discounts().update(discount)
    }

    fn find_discount_by_id(&self, id: Uuid) -> Result<Option<Discount>> {
        self.discounts().find_by_id(id)
    }

    fn list_discounts(&self) -> Result<Vec<Discount>> {
        self.discounts().list_all()
    }

    fn list_active_discounts(&self) -> Result<Vec<Discount>> {
        self.discounts().list_active()
    }

    fn find_discounts_by_ids(&self, ids: &[Uuid], active_only: bool) -> Result<Vec<Discount>> {
        self.discounts().find_by_ids(ids, active_only)
    }

    fn delete_discount(&self, id: Uuid) -> Result<()> {
        self.discounts().delete(id)
    }
}
