//! Listing photo model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A photo attached to a listing, owned exclusively by it.
///
/// `order` is the 0-based display position and always matches the
/// position in the step-2 input that produced the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub public_id: String,
    pub secure_url: String,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(listing_id: Uuid, public_id: String, secure_url: String, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            public_id,
            secure_url,
            order,
            created_at: Utc::now(),
        }
    }
}
