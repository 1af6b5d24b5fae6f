//! Closed tag sets used by listing steps
//!
//! Each enum maps to a fixed wire/storage string (snake_case).

use serde::{Deserialize, Serialize};

/// Category of the property (step 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    Apartment,
    House,
    Cabin,
    Villa,
    Farm,
    Guesthouse,
    Boat,
    Tent,
}

impl PropertyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyCategory::Apartment => "apartment",
            PropertyCategory::House => "house",
            PropertyCategory::Cabin => "cabin",
            PropertyCategory::Villa => "villa",
            PropertyCategory::Farm => "farm",
            PropertyCategory::Guesthouse => "guesthouse",
            PropertyCategory::Boat => "boat",
            PropertyCategory::Tent => "tent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "apartment" => Some(PropertyCategory::Apartment),
            "house" => Some(PropertyCategory::House),
            "cabin" => Some(PropertyCategory::Cabin),
            "villa" => Some(PropertyCategory::Villa),
            "farm" => Some(PropertyCategory::Farm),
            "guesthouse" => Some(PropertyCategory::Guesthouse),
            "boat" => Some(PropertyCategory::Boat),
            "tent" => Some(PropertyCategory::Tent),
            _ => None,
        }
    }
}

/// What part of the property guests get (step 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    EntirePlace,
    Room,
    SharedRoom,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::EntirePlace => "entire_place",
            PlaceType::Room => "room",
            PlaceType::SharedRoom => "shared_room",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "entire_place" => Some(PlaceType::EntirePlace),
            "room" => Some(PlaceType::Room),
            "shared_room" => Some(PlaceType::SharedRoom),
            _ => None,
        }
    }
}

/// Who shares the bathroom with guests (step 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BathroomUsage {
    OtherGuests,
    Host,
    NoSharing,
}

impl BathroomUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BathroomUsage::OtherGuests => "other_guests",
            BathroomUsage::Host => "host",
            BathroomUsage::NoSharing => "no_sharing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "other_guests" => Some(BathroomUsage::OtherGuests),
            "host" => Some(BathroomUsage::Host),
            "no_sharing" => Some(BathroomUsage::NoSharing),
            _ => None,
        }
    }
}

/// Headline amenities hosts can call out (step 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteAmenity {
    Wifi,
    Tv,
    Kitchen,
    Washer,
    FreeParking,
    PaidParking,
    AirConditioning,
    Workspace,
}

/// Additional amenities (step 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amenity {
    Pool,
    HotTub,
    Patio,
    BbqGrill,
    OutdoorDining,
    FirePit,
    PoolTable,
    IndoorFireplace,
    Piano,
    ExerciseEquipment,
}

/// Safety items present at the property (step 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyItem {
    SmokeAlarm,
    FirstAid,
    FireExtinguisher,
    CarbonMonoxideAlarm,
}

/// Listing highlights, minimum two per listing (step 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Charming,
    Central,
    Stylish,
    Peaceful,
    Spacious,
    FamilyFriendly,
}

/// How booking requests are handled (step 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSetting {
    InstantBook,
    ReviewRequests,
}

impl BookingSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSetting::InstantBook => "instant_book",
            BookingSetting::ReviewRequests => "review_requests",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "instant_book" => Some(BookingSetting::InstantBook),
            "review_requests" => Some(BookingSetting::ReviewRequests),
            _ => None,
        }
    }
}
