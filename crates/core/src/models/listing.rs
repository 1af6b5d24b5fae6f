//! Listing aggregate - a four-step rental listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{
    Amenity, BathroomUsage, BookingSetting, FavoriteAmenity, Highlight, PlaceType,
    PropertyCategory, SafetyItem,
};
use super::{Discount, Photo};

/// Listing visibility state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    Published,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::Published => "published",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ListingStatus::Draft),
            "published" => Some(ListingStatus::Published),
            _ => None,
        }
    }
}

/// A rental listing assembled over four independently-fillable steps.
///
/// Step fields stay unset until their step is applied; the completion
/// flags record which steps the host has worked through. Photos and
/// discounts live in child tables and are hydrated via
/// [`ListingDetails`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub host_id: Uuid,
    pub status: ListingStatus,

    // Step 1: property details
    pub category: Option<PropertyCategory>,
    pub place_type: Option<PlaceType>,
    pub country: Option<String>,
    pub street_address: Option<String>,
    pub floor: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub guests: Option<u32>,
    pub bedrooms: Option<u32>,
    pub beds: Option<u32>,
    pub home_precise: bool,
    pub bedroom_lock: bool,
    pub private_bathroom: Option<f64>,
    pub dedicated_bathroom: Option<f64>,
    pub shared_bathroom: Option<f64>,
    pub bathroom_usage: Option<BathroomUsage>,

    // Step 2: amenities, safety & media
    pub favorites: Vec<FavoriteAmenity>,
    pub amenities: Vec<Amenity>,
    pub safety_items: Vec<SafetyItem>,
    pub title: Option<String>,
    pub highlights: Vec<Highlight>,
    pub description: Option<String>,

    // Step 3: booking & pricing
    pub booking_setting: Option<BookingSetting>,
    pub weekday_price: Option<f64>,
    pub weekday_after_tax_price: Option<f64>,
    pub weekend_price: Option<f64>,
    pub weekend_after_tax_price: Option<f64>,

    // Step 4: safety details & host address
    pub safety_details: Vec<String>,
    pub host_country: Option<String>,
    pub host_street_address: Option<String>,
    pub host_apt_floor: Option<String>,
    pub host_city: Option<String>,
    pub host_state: Option<String>,
    pub host_postal_code: Option<String>,
    pub hosting_as_business: bool,

    pub step1_completed: bool,
    pub step2_completed: bool,
    pub step3_completed: bool,
    pub step4_completed: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Fresh draft with no step data
    pub fn new(host_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            host_id,
            status: ListingStatus::Draft,
            category: None,
            place_type: None,
            country: None,
            street_address: None,
            floor: None,
            city: None,
            state: None,
            postal_code: None,
            guests: None,
            bedrooms: None,
            beds: None,
            home_precise: false,
            bedroom_lock: false,
            private_bathroom: None,
            dedicated_bathroom: None,
            shared_bathroom: None,
            bathroom_usage: None,
            favorites: Vec::new(),
            amenities: Vec::new(),
            safety_items: Vec::new(),
            title: None,
            highlights: Vec::new(),
            description: None,
            booking_setting: None,
            weekday_price: None,
            weekday_after_tax_price: None,
            weekend_price: None,
            weekend_after_tax_price: None,
            safety_details: Vec::new(),
            host_country: None,
            host_street_address: None,
            host_apt_floor: None,
            host_city: None,
            host_state: None,
            host_postal_code: None,
            hosting_as_business: false,
            step1_completed: false,
            step2_completed: false,
            step3_completed: false,
            step4_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Weekend surcharge relative to the weekday price, in percent.
    ///
    /// Computed on read, never stored. `None` when the weekday price is
    /// unset or zero. May be negative when weekends are cheaper.
    pub fn weekend_charge_percentage(&self) -> Option<f64> {
        match (self.weekday_price, self.weekend_price) {
            (Some(weekday), Some(weekend)) if weekday != 0.0 => {
                Some((weekend - weekday) / weekday * 100.0)
            }
            _ => None,
        }
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Fully-hydrated listing as returned by every read path
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    #[serde(flatten)]
    pub listing: Listing,
    pub photos: Vec<Photo>,
    pub discounts: Vec<Discount>,
    pub weekend_charge_percentage: Option<f64>,
}

impl ListingDetails {
    pub fn new(listing: Listing, photos: Vec<Photo>, discounts: Vec<Discount>) -> Self {
        let weekend_charge_percentage = listing.weekend_charge_percentage();
        Self {
            listing,
            photos,
            discounts,
            weekend_charge_percentage,
        }
    }
}
