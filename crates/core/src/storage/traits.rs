//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, mock, future network backend).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Discount, Listing, Otp, OtpKind, Photo, Session, User};

/// User and session repository operations
pub trait UserRepository {
    /// Create a new user
    fn create_user(&self, user: &User) -> Result<()>;

    /// Find user by ID
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Find user by email
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update a user's mutable fields
    fn update_user(&self, user: &User) -> Result<()>;

    /// Delete a user (sessions and OTPs cascade)
    fn delete_user(&self, user_id: Uuid) -> Result<()>;

    /// List all users
    fn list_users(&self) -> Result<Vec<User>>;

    /// Create a session
    fn create_session(&self, session: &Session) -> Result<()>;

    /// Find a valid (non-expired) session
    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// Delete a session
    fn delete_session(&self, session_id: Uuid) -> Result<()>;

    /// Delete all sessions for a user
    fn delete_user_sessions(&self, user_id: Uuid) -> Result<()>;

    /// Clean up expired sessions
    fn cleanup_expired_sessions(&self) -> Result<u64>;
}

/// One-time code repository operations
pub trait OtpRepository {
    /// Store a new code
    fn create_otp(&self, otp: &Otp) -> Result<()>;

    /// Check a code and consume it on success
    fn verify_otp(&self, user_id: Uuid, code: &str, kind: OtpKind) -> Result<bool>;

    /// Remove all codes of one kind for a user
    fn delete_user_otps(&self, user_id: Uuid, kind: OtpKind) -> Result<()>;

    /// Remove expired codes
    fn delete_expired_otps(&self) -> Result<u64>;
}

/// Listing repository operations, including child collections
pub trait ListingRepository {
    /// Create a new listing
    fn create_listing(&self, listing: &Listing) -> Result<()>;

    /// Find listing by ID
    fn find_listing_by_id(&self, id: Uuid) -> Result<Option<Listing>>;

    /// Write back every scalar field of a listing
    fn update_listing(&self, listing: &Listing) -> Result<()>;

    /// Delete a listing (photos, owned discounts, references cascade)
    fn delete_listing(&self, listing_id: Uuid) -> Result<()>;

    /// All listings of one host, newest first
    fn list_listings_for_host(&self, host_id: Uuid) -> Result<Vec<Listing>>;

    /// All published listings, newest first
    fn list_published_listings(&self) -> Result<Vec<Listing>>;

    /// Every listing regardless of status (admin)
    fn list_all_listings(&self) -> Result<Vec<Listing>>;

    /// Photos of a listing in display order
    fn photos_for_listing(&self, listing_id: Uuid) -> Result<Vec<Photo>>;

    /// Atomically replace the photo set
    fn replace_photos(&self, listing_id: Uuid, photos: &[Photo]) -> Result<()>;

    /// Listing-scoped discounts (owned policy)
    fn owned_discounts(&self, listing_id: Uuid) -> Result<Vec<Discount>>;

    /// Atomically replace the owned discount set
    fn replace_owned_discounts(&self, listing_id: Uuid, discounts: &[Discount]) -> Result<()>;

    /// Discounts referenced by a listing (referenced policy)
    fn referenced_discounts(&self, listing_id: Uuid) -> Result<Vec<Discount>>;

    /// Atomically replace the reference set
    fn set_discount_refs(&self, listing_id: Uuid, discount_ids: &[Uuid]) -> Result<()>;
}

/// Global discount repository operations (referenced policy)
pub trait DiscountRepository {
    /// Create a global discount
    fn create_discount(&self, discount: &Discount) -> Result<()>;

    /// Update a discount
    fn update_discount(&self, discount: &Discount) -> Result<()>;

    /// Find discount by ID
    fn find_discount_by_id(&self, id: Uuid) -> Result<Option<Discount>>;

    /// All global discounts, newest first
    fn list_discounts(&self) -> Result<Vec<Discount>>;

    /// Active global discounts, newest first
    fn list_active_discounts(&self) -> Result<Vec<Discount>>;

    /// Resolve a set of ids, optionally restricted to active rows
    fn find_discounts_by_ids(&self, ids: &[Uuid], active_only: bool) -> Result<Vec<Discount>>;

    /// Delete a discount (listing references cascade)
    fn delete_discount(&self, id: Uuid) -> Result<()>;
}
