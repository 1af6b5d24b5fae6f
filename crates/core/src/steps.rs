//! Step application engine
//!
//! Validates and merges per-step payloads into a listing. Payloads are
//! already structurally typed (enum membership is settled at the
//! boundary); this module enforces the remaining field rules, collects
//! every violation before anything is persisted, and builds the
//! replacement child rows for steps that carry collections.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    Amenity, BathroomUsage, BookingSetting, Discount, FavoriteAmenity, Highlight, Listing, Photo,
    PlaceType, PropertyCategory, SafetyItem,
};

/// Hard cap on live photos per listing
pub const MAX_PHOTOS: usize = 5;
/// Title length cap
pub const MAX_TITLE_LEN: usize = 100;
/// Minimum highlights per listing
pub const MIN_HIGHLIGHTS: usize = 2;

/// First-time application vs idempotent re-application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Rejected when the step is already completed
    Complete,
    /// Always allowed, fully replaces prior step data
    Update,
}

/// One of the four wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    One,
    Two,
    Three,
    Four,
}

impl Step {
    pub fn number(&self) -> u8 {
        match self {
            Step::One => 1,
            Step::Two => 2,
            Step::Three => 3,
            Step::Four => 4,
        }
    }

    /// Human-readable name used in publish errors
    pub fn display_name(&self) -> &'static str {
        match self {
            Step::One => "Step 1 (Property Details)",
            Step::Two => "Step 2 (Amenities & Media)",
            Step::Three => "Step 3 (Booking & Pricing)",
            Step::Four => "Step 4 (Discounts)",
        }
    }

    pub fn is_completed(&self, listing: &Listing) -> bool {
        match self {
            Step::One => listing.step1_completed,
            Step::Two => listing.step2_completed,
            Step::Three => listing.step3_completed,
            Step::Four => listing.step4_completed,
        }
    }
}

/// Complete-mode guard: a completed step must be re-entered via update
pub fn ensure_first_application(listing: &Listing, step: Step, mode: ApplyMode) -> Result<()> {
    if mode == ApplyMode::Complete && step.is_completed(listing) {
        return Err(Error::BusinessRule(format!(
            "Step {} already completed. Use update to modify.",
            step.number()
        )));
    }
    Ok(())
}

fn require_text(errors: &mut Vec<String>, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(format!("{field} should not be empty"));
    } else if value.chars().count() > max {
        errors.push(format!(
            "{field} must be shorter than or equal to {max} characters"
        ));
    }
}

fn check_optional_text(errors: &mut Vec<String>, field: &str, value: Option<&str>, max: usize) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.push(format!(
                "{field} must be shorter than or equal to {max} characters"
            ));
        }
    }
}

fn finish(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

/// Bathroom shares come in halves: 0, 0.5 or 1
fn is_bathroom_share(value: f64) -> bool {
    value == 0.0 || value == 0.5 || value == 1.0
}

// ---------------------------------------------------------------------
// Step 1: property details
// ---------------------------------------------------------------------

/// Step 1 payload. Every field is required; re-application overwrites
/// all step-1 scalars unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1PropertyDetails {
    pub category: PropertyCategory,
    pub place_type: PlaceType,
    pub country: String,
    pub street_address: String,
    #[serde(default)]
    pub floor: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub guests: u32,
    pub bedrooms: u32,
    pub beds: u32,
    pub home_precise: bool,
    pub bedroom_lock: bool,
    pub private_bathroom: f64,
    pub dedicated_bathroom: f64,
    pub shared_bathroom: f64,
    pub bathroom_usage: BathroomUsage,
}

impl Step1PropertyDetails {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        require_text(&mut errors, "country", &self.country, 100);
        require_text(&mut errors, "streetAddress", &self.street_address, 255);
        check_optional_text(&mut errors, "floor", self.floor.as_deref(), 50);
        require_text(&mut errors, "city", &self.city, 100);
        require_text(&mut errors, "state", &self.state, 100);
        require_text(&mut errors, "postalCode", &self.postal_code, 20);

        if self.guests == 0 {
            errors.push("guests must be greater than 0".to_string());
        }
        if !is_bathroom_share(self.private_bathroom) {
            errors.push("privateBathroom must be 0, 0.5, or 1".to_string());
        }
        if !is_bathroom_share(self.dedicated_bathroom) {
            errors.push("dedicatedBathroom must be 0, 0.5, or 1".to_string());
        }
        if !is_bathroom_share(self.shared_bathroom) {
            errors.push("sharedBathroom must be 0, 0.5, or 1".to_string());
        }

        finish(errors)
    }

    pub fn apply(&self, listing: &mut Listing) {
        listing.category = Some(self.category);
        listing.place_type = Some(self.place_type);
        listing.country = Some(self.country.clone());
        listing.street_address = Some(self.street_address.clone());
        listing.floor = self.floor.clone();
        listing.city = Some(self.city.clone());
        listing.state = Some(self.state.clone());
        listing.postal_code = Some(self.postal_code.clone());
        listing.guests = Some(self.guests);
        listing.bedrooms = Some(self.bedrooms);
        listing.beds = Some(self.beds);
        listing.home_precise = self.home_precise;
        listing.bedroom_lock = self.bedroom_lock;
        listing.private_bathroom = Some(self.private_bathroom);
        listing.dedicated_bathroom = Some(self.dedicated_bathroom);
        listing.shared_bathroom = Some(self.shared_bathroom);
        listing.bathroom_usage = Some(self.bathroom_usage);
        listing.step1_completed = true;
        listing.touch();
    }
}

// ---------------------------------------------------------------------
// Step 2: amenities, safety & media
// ---------------------------------------------------------------------

/// Uploaded photo reference as returned by the media uploader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInput {
    pub public_id: String,
    pub secure_url: String,
}

/// Step 2 payload. Tag sets default to empty; photos are optional and,
/// when present and non-empty, fully replace the listing's photo set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step2AmenitiesMedia {
    #[serde(default)]
    pub favorites: Vec<FavoriteAmenity>,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default)]
    pub safety_items: Vec<SafetyItem>,
    #[serde(default)]
    pub photos: Option<Vec<PhotoInput>>,
    pub title: String,
    pub highlights: Vec<Highlight>,
    pub description: String,
}

impl Step2AmenitiesMedia {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if let Some(photos) = &self.photos {
            if photos.len() > MAX_PHOTOS {
                errors.push("Maximum 5 photos allowed".to_string());
            }
            for photo in photos {
                require_text(&mut errors, "publicId", &photo.public_id, 255);
                require_text(&mut errors, "secureUrl", &photo.secure_url, 500);
            }
        }

        require_text(&mut errors, "title", &self.title, MAX_TITLE_LEN);
        if self.highlights.len() < MIN_HIGHLIGHTS {
            errors.push("At least 2 highlights are required".to_string());
        }
        if self.description.trim().is_empty() {
            errors.push("description should not be empty".to_string());
        }

        finish(errors)
    }

    pub fn apply(&self, listing: &mut Listing) {
        listing.favorites = self.favorites.clone();
        listing.amenities = self.amenities.clone();
        listing.safety_items = self.safety_items.clone();
        listing.title = Some(self.title.clone());
        listing.highlights = self.highlights.clone();
        listing.description = Some(self.description.clone());
        listing.step2_completed = true;
        listing.touch();
    }

    /// Replacement photo rows, ordered by input position.
    ///
    /// `None` when the payload carries no photos (or an empty list), in
    /// which case the existing photo set stays untouched.
    pub fn photo_rows(&self, listing_id: Uuid) -> Option<Vec<Photo>> {
        let photos = self.photos.as_ref()?;
        if photos.is_empty() {
            return None;
        }
        Some(
            photos
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    Photo::new(listing_id, p.public_id.clone(), p.secure_url.clone(), i as u32)
                })
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------
// Step 3: booking & pricing
// ---------------------------------------------------------------------

/// Step 3 payload. All prices required and non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step3BookingPricing {
    pub booking_setting: BookingSetting,
    pub weekday_price: f64,
    pub weekday_after_tax_price: f64,
    pub weekend_price: f64,
    pub weekend_after_tax_price: f64,
}

impl Step3BookingPricing {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.weekday_price < 0.0 {
            errors.push("weekdayPrice must be 0 or greater".to_string());
        }
        if self.weekend_price < 0.0 {
            errors.push("weekendPrice must be 0 or greater".to_string());
        }
        if self.weekday_after_tax_price < 0.0 {
            errors.push("weekdayAfterTaxPrice must be 0 or greater".to_string());
        }
        if self.weekend_after_tax_price < 0.0 {
            errors.push("weekendAfterTaxPrice must be 0 or greater".to_string());
        }

        finish(errors)
    }

    pub fn apply(&self, listing: &mut Listing) {
        listing.booking_setting = Some(self.booking_setting);
        listing.weekday_price = Some(self.weekday_price);
        listing.weekday_after_tax_price = Some(self.weekday_after_tax_price);
        listing.weekend_price = Some(self.weekend_price);
        listing.weekend_after_tax_price = Some(self.weekend_after_tax_price);
        listing.step3_completed = true;
        listing.touch();
    }
}

// ---------------------------------------------------------------------
// Step 4: discounts
// ---------------------------------------------------------------------

/// Host-authored discount (owned policy)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_percentage: f64,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl DiscountSpec {
    pub fn validate_into(&self, errors: &mut Vec<String>) {
        require_text(errors, "name", &self.name, 100);
        if self.discount_percentage < 0.0 {
            errors.push("discountPercentage must be at least 0".to_string());
        }
        if self.discount_percentage > 100.0 {
            errors.push("discountPercentage cannot exceed 100".to_string());
        }
    }

    /// Owned discount row; active unless explicitly disabled
    pub fn to_discount(&self, listing_id: Uuid) -> Discount {
        Discount::owned(
            listing_id,
            self.name.clone(),
            self.description.clone(),
            self.discount_percentage,
            self.is_active.unwrap_or(true),
        )
    }
}

/// Step 4 payload for the owned-discount policy: safety details, host
/// address, and the full replacement discount list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step4HostDetails {
    pub safety_details: Vec<String>,
    pub host_country: String,
    pub host_street_address: String,
    #[serde(default)]
    pub host_apt_floor: Option<String>,
    pub host_city: String,
    pub host_state: String,
    #[serde(default)]
    pub host_postal_code: Option<String>,
    pub hosting_as_business: bool,
    #[serde(default)]
    pub discounts: Vec<DiscountSpec>,
}

impl Step4HostDetails {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        require_text(&mut errors, "hostCountry", &self.host_country, 100);
        require_text(
            &mut errors,
            "hostStreetAddress",
            &self.host_street_address,
            255,
        );
        check_optional_text(&mut errors, "hostAptFloor", self.host_apt_floor.as_deref(), 100);
        require_text(&mut errors, "hostCity", &self.host_city, 100);
        require_text(&mut errors, "hostState", &self.host_state, 100);
        check_optional_text(
            &mut errors,
            "hostPostalCode",
            self.host_postal_code.as_deref(),
            20,
        );
        for discount in &self.discounts {
            discount.validate_into(&mut errors);
        }

        finish(errors)
    }

    pub fn apply(&self, listing: &mut Listing) {
        listing.safety_details = self.safety_details.clone();
        listing.host_country = Some(self.host_country.clone());
        listing.host_street_address = Some(self.host_street_address.clone());
        listing.host_apt_floor = self.host_apt_floor.clone();
        listing.host_city = Some(self.host_city.clone());
        listing.host_state = Some(self.host_state.clone());
        listing.host_postal_code = self.host_postal_code.clone();
        listing.hosting_as_business = self.hosting_as_business;
        listing.step4_completed = true;
        listing.touch();
    }

    /// Replacement discount rows. Unlike photos, an empty list still
    /// replaces (clears) the existing set.
    pub fn discount_rows(&self, listing_id: Uuid) -> Vec<Discount> {
        self.discounts
            .iter()
            .map(|d| d.to_discount(listing_id))
            .collect()
    }
}

/// Step 4 payload for the referenced-discount policy: a set of global
/// discount ids, validated to exist and be active at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step4DiscountRefs {
    #[serde(default)]
    pub discount_ids: Vec<Uuid>,
}

impl Step4DiscountRefs {
    pub fn apply(&self, listing: &mut Listing) {
        listing.step4_completed = true;
        listing.touch();
    }
}

/// Step 4 input, shaped by the configured [`DiscountPolicy`].
///
/// [`DiscountPolicy`]: crate::models::DiscountPolicy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step4Input {
    Owned(Step4HostDetails),
    Referenced(Step4DiscountRefs),
}

/// Business error for step-4 references that did not resolve to active
/// discounts: names the unresolvable ids verbatim, in request order.
pub fn invalid_discount_ids_error(requested: &[Uuid], found: &[Discount]) -> Error {
    let found_ids: HashSet<Uuid> = found.iter().map(|d| d.id).collect();
    let invalid: Vec<String> = requested
        .iter()
        .filter(|id| !found_ids.contains(id))
        .map(|id| id.to_string())
        .collect();
    Error::BusinessRule(format!(
        "Invalid or inactive discount IDs: {}",
        invalid.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_step1() -> Step1PropertyDetails {
        Step1PropertyDetails {
            category: PropertyCategory::Apartment,
            place_type: PlaceType::Room,
            country: "United States".to_string(),
            street_address: "123 Main St".to_string(),
            floor: None,
            city: "New York".to_string(),
            state: "NY".to_string(),
            postal_code: "10001".to_string(),
            guests: 4,
            bedrooms: 2,
            beds: 3,
            home_precise: true,
            bedroom_lock: true,
            private_bathroom: 1.0,
            dedicated_bathroom: 0.0,
            shared_bathroom: 0.5,
            bathroom_usage: BathroomUsage::OtherGuests,
        }
    }

    fn valid_step2() -> Step2AmenitiesMedia {
        Step2AmenitiesMedia {
            favorites: vec![FavoriteAmenity::Wifi, FavoriteAmenity::Tv],
            amenities: vec![Amenity::Pool],
            safety_items: vec![SafetyItem::SmokeAlarm],
            photos: None,
            title: "Cozy Apartment in Downtown".to_string(),
            highlights: vec![Highlight::Charming, Highlight::Central],
            description: "A beautiful apartment in the heart of the city".to_string(),
        }
    }

    fn valid_step3() -> Step3BookingPricing {
        Step3BookingPricing {
            booking_setting: BookingSetting::InstantBook,
            weekday_price: 100.0,
            weekday_after_tax_price: 110.0,
            weekend_price: 120.0,
            weekend_after_tax_price: 132.0,
        }
    }

    #[test]
    fn test_step1_apply_sets_fields_and_flag() {
        let mut listing = Listing::new(Uuid::new_v4());
        let payload = valid_step1();
        payload.validate().unwrap();
        payload.apply(&mut listing);

        assert!(listing.step1_completed);
        assert_eq!(listing.category, Some(PropertyCategory::Apartment));
        assert_eq!(listing.guests, Some(4));
        assert_eq!(listing.shared_bathroom, Some(0.5));
    }

    #[test]
    fn test_step1_collects_all_violations() {
        let mut payload = valid_step1();
        payload.guests = 0;
        payload.private_bathroom = 2.0;
        payload.country = String::new();

        let err = payload.validate().unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert!(messages.contains(&"guests must be greater than 0".to_string()));
                assert!(messages.contains(&"privateBathroom must be 0, 0.5, or 1".to_string()));
                assert!(messages.contains(&"country should not be empty".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_step2_rejects_more_than_five_photos() {
        let mut payload = valid_step2();
        payload.photos = Some(
            (0..6)
                .map(|i| PhotoInput {
                    public_id: format!("listings/p{i}"),
                    secure_url: format!("https://cdn.example.com/p{i}.jpg"),
                })
                .collect(),
        );

        let err = payload.validate().unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert!(messages.contains(&"Maximum 5 photos allowed".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_step2_requires_two_highlights() {
        let mut payload = valid_step2();
        payload.highlights = vec![Highlight::Charming];

        let err = payload.validate().unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert!(messages.contains(&"At least 2 highlights are required".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_step2_photo_rows_ordered_by_position() {
        let mut payload = valid_step2();
        payload.photos = Some(vec![
            PhotoInput {
                public_id: "listings/a".to_string(),
                secure_url: "https://cdn.example.com/a.jpg".to_string(),
            },
            PhotoInput {
                public_id: "listings/b".to_string(),
                secure_url: "https://cdn.example.com/b.jpg".to_string(),
            },
        ]);

        let listing_id = Uuid::new_v4();
        let rows = payload.photo_rows(listing_id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order, 0);
        assert_eq!(rows[0].public_id, "listings/a");
        assert_eq!(rows[1].order, 1);
        assert!(rows.iter().all(|p| p.listing_id == listing_id));
    }

    #[test]
    fn test_step2_without_photos_leaves_photo_set_alone() {
        let payload = valid_step2();
        assert!(payload.photo_rows(Uuid::new_v4()).is_none());

        let mut payload = valid_step2();
        payload.photos = Some(Vec::new());
        assert!(payload.photo_rows(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_step3_rejects_negative_prices() {
        let mut payload = valid_step3();
        payload.weekday_price = -10.0;

        let err = payload.validate().unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert!(messages.contains(&"weekdayPrice must be 0 or greater".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_step3_apply_feeds_weekend_charge() {
        let mut listing = Listing::new(Uuid::new_v4());
        valid_step3().apply(&mut listing);

        assert!(listing.step3_completed);
        assert_eq!(listing.weekend_charge_percentage(), Some(20.0));
    }

    #[test]
    fn test_complete_mode_guard() {
        let mut listing = Listing::new(Uuid::new_v4());
        ensure_first_application(&listing, Step::Two, ApplyMode::Complete).unwrap();

        valid_step2().apply(&mut listing);
        let err = ensure_first_application(&listing, Step::Two, ApplyMode::Complete).unwrap_err();
        match err {
            Error::BusinessRule(msg) => assert!(msg.contains("already completed")),
            other => panic!("expected business rule error, got {other:?}"),
        }

        // Update mode stays open
        ensure_first_application(&listing, Step::Two, ApplyMode::Update).unwrap();
    }

    #[test]
    fn test_step4_discount_defaults_active() {
        let spec = DiscountSpec {
            name: "Weekly Stay Discount".to_string(),
            description: None,
            discount_percentage: 10.0,
            is_active: None,
        };
        let discount = spec.to_discount(Uuid::new_v4());
        assert!(discount.is_active);
        assert_eq!(discount.discount_percentage, 10.0);
    }

    #[test]
    fn test_step4_discount_percentage_bounds() {
        let mut errors = Vec::new();
        DiscountSpec {
            name: "Bad".to_string(),
            description: None,
            discount_percentage: 120.0,
            is_active: None,
        }
        .validate_into(&mut errors);
        assert!(errors.contains(&"discountPercentage cannot exceed 100".to_string()));
    }

    #[test]
    fn test_invalid_discount_ids_error_lists_missing() {
        let known = Discount::global("Weekly".to_string(), None, 10.0, true);
        let missing = Uuid::new_v4();
        let err = invalid_discount_ids_error(&[known.id, missing], &[known.clone()]);
        match err {
            Error::BusinessRule(msg) => {
                assert!(msg.starts_with("Invalid or inactive discount IDs:"));
                assert!(msg.contains(&missing.to_string()));
                assert!(!msg.contains(&known.id.to_string()));
            }
            other => panic!("expected business rule error, got {other:?}"),
        }
    }
}
