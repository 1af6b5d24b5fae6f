//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use uuid::Uuid;

use crate::models::{Discount, Listing, ListingStatus, Photo};
use crate::steps::MAX_PHOTOS;

/// Validate that a listing's state is internally consistent
pub fn assert_listing_invariants(listing: &Listing) {
    // Published listings must have completed steps 1-3
    debug_assert!(
        listing.status != ListingStatus::Published
            || (listing.step1_completed && listing.step2_completed && listing.step3_completed),
        "Listing {} is published with incomplete steps",
        listing.id
    );

    if let Some(title) = &listing.title {
        debug_assert!(
            title.chars().count() <= 100,
            "Listing {} has over-long title",
            listing.id
        );
    }

    for value in [
        listing.private_bathroom,
        listing.dedicated_bathroom,
        listing.shared_bathroom,
    ]
    .into_iter()
    .flatten()
    {
        debug_assert!(
            value == 0.0 || value == 0.5 || value == 1.0,
            "Listing {} has bathroom share {} outside {{0, 0.5, 1}}",
            listing.id,
            value
        );
    }
}

/// Validate a hydrated photo set against its listing
pub fn assert_photo_set_invariants(listing_id: Uuid, photos: &[Photo]) {
    debug_assert!(
        photos.len() <= MAX_PHOTOS,
        "Listing {} has {} photos, max is {}",
        listing_id,
        photos.len(),
        MAX_PHOTOS
    );

    for (index, photo) in photos.iter().enumerate() {
        debug_assert!(
            photo.listing_id == listing_id,
            "Photo {} belongs to listing {}, expected {}",
            photo.id,
            photo.listing_id,
            listing_id
        );
        debug_assert!(
            photo.order as usize == index,
            "Photo {} has order {}, expected {}",
            photo.id,
            photo.order,
            index
        );
    }
}

/// Validate a discount row
pub fn assert_discount_invariants(discount: &Discount) {
    debug_assert!(
        (0.0..=100.0).contains(&discount.discount_percentage),
        "Discount {} has percentage {} outside [0, 100]",
        discount.id,
        discount.discount_percentage
    );
}
