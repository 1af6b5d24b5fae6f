//! Discount model and association policy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How discounts are associated with listings.
///
/// `Owned`: discounts are listing-scoped rows written by the host in
/// step 4 and cascade-deleted with the listing. `Referenced`: discounts
/// are admin-managed global rows and listings hold a set of references,
/// validated against the active set at every step-4 write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    Owned,
    Referenced,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy::Owned
    }
}

/// A percentage discount.
///
/// `listing_id` is set for listing-owned rows and `None` for globally
/// managed rows referenced through the association table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: Uuid,
    pub listing_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub discount_percentage: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discount {
    /// Listing-scoped discount (owned policy)
    pub fn owned(
        listing_id: Uuid,
        name: String,
        description: Option<String>,
        discount_percentage: f64,
        is_active: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            listing_id: Some(listing_id),
            name,
            description,
            discount_percentage,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Globally managed discount (referenced policy)
    pub fn global(
        name: String,
        description: Option<String>,
        discount_percentage: f64,
        is_active: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            listing_id: None,
            name,
            description,
            discount_percentage,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }
}
