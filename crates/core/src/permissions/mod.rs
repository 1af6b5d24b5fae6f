//! Ownership and visibility rules for listings
//!
//! Admins read everything; hosts read and mutate only what they own;
//! ordinary users see published listings only. Draft existence is never
//! revealed to non-owners: their failures surface as not-found.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Listing, ListingStatus, Role};

/// The authenticated caller, as resolved by the auth layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Decide whether `actor` may read `listing`.
///
/// Existence must already be settled by the caller; a missing listing
/// is not-found before any role check runs.
pub fn authorize_listing_read(actor: &Actor, listing: &Listing) -> Result<()> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Host => {
            if listing.host_id == actor.id {
                Ok(())
            } else {
                Err(Error::Forbidden(
                    "You do not have access to this listing".to_string(),
                ))
            }
        }
        Role::User => {
            if listing.status == ListingStatus::Published {
                Ok(())
            } else {
                // Draft existence stays hidden from non-owners
                Err(Error::NotFound("Listing not found".to_string()))
            }
        }
    }
}

/// Mutations are owner-only.
pub fn ensure_owner(listing: &Listing, host_id: Uuid) -> Result<()> {
    if listing.host_id != host_id {
        return Err(Error::Forbidden(
            "You do not have access to this listing".to_string(),
        ));
    }
    Ok(())
}

/// Gate for admin-only surfaces (user management, global discounts).
pub fn require_admin(actor: &Actor) -> Result<()> {
    if !actor.is_admin() {
        return Err(Error::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}
