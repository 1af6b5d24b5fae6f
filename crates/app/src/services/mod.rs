//! Service layer: the operations a transport would expose

mod auth;
mod discount;
mod listing;
mod media;
mod notifier;
mod users;

pub use auth::AuthService;
pub use discount::{DiscountPatch, DiscountService};
pub use listing::ListingService;
pub use media::{upload_listing_photos, LocalMediaStore, MediaUploader, MAX_UPLOAD_PHOTOS};
pub use notifier::{LogNotifier, Notifier};
pub use users::UserService;
