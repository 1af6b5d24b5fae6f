//! Domain models for the Lodgekeep platform

mod discount;
mod enums;
mod listing;
mod otp;
mod photo;
mod user;

pub use discount::{Discount, DiscountPolicy};
pub use enums::{
    Amenity, BathroomUsage, BookingSetting, FavoriteAmenity, Highlight, PlaceType,
    PropertyCategory, SafetyItem,
};
pub use listing::{Listing, ListingDetails, ListingStatus};
pub use otp::{Otp, OtpKind};
pub use photo::Photo;
pub use user::{AuthProviderKind, Role, Session, User};
