//! Listing service
//!
//! Orchestrates the ownership guard, the step application engine, and
//! the listing store for every listing operation. All read paths return
//! the fully-hydrated listing; which discount collection hydrates is
//! decided by the configured association policy.

use std::sync::Arc;

use lodgekeep_core::{
    invariants, lifecycle, permissions, steps, Actor, ApplyMode, Database, DiscountPolicy, Error,
    Listing, ListingDetails, ListingStatus, PhotoInput, Result, Step, Step1PropertyDetails,
    Step2AmenitiesMedia, Step3BookingPricing, Step4Input,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::services::media;
use crate::state::AppState;

pub struct ListingService {
    state: Arc<AppState>,
}

impl ListingService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Create an empty draft for a host
    #[instrument(skip(self))]
    pub fn create_draft(&self, host_id: Uuid) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let listing = Listing::new(host_id);
        db.listings().create(&listing)?;
        info!(listing_id = %listing.id, "Draft listing created");
        self.hydrate(&db, listing)
    }

    /// Get a listing with role-appropriate visibility
    #[instrument(skip(self, actor), fields(actor_id = %actor.id, role = ?actor.role))]
    pub fn get_listing(&self, actor: &Actor, listing_id: Uuid) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let listing = db
            .listings()
            .find_by_id(listing_id)?
            .ok_or_else(|| Error::NotFound("Listing not found".to_string()))?;
        permissions::authorize_listing_read(actor, &listing)?;
        self.hydrate(&db, listing)
    }

    /// Get one of the host's own listings
    pub fn get_host_listing(&self, listing_id: Uuid, host_id: Uuid) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let listing = find_for_host(&db, listing_id, host_id)?;
        self.hydrate(&db, listing)
    }

    /// All listings of a host, drafts included, newest first
    pub fn list_host_listings(&self, host_id: Uuid) -> Result<Vec<ListingDetails>> {
        let db = self.state.db.lock().unwrap();
        db.listings()
            .list_for_host(host_id)?
            .into_iter()
            .map(|listing| self.hydrate(&db, listing))
            .collect()
    }

    /// Every listing on the platform (admin only)
    pub fn list_all_listings(&self, actor: &Actor) -> Result<Vec<ListingDetails>> {
        permissions::require_admin(actor)?;
        let db = self.state.db.lock().unwrap();
        db.listings()
            .list_all()?
            .into_iter()
            .map(|listing| self.hydrate(&db, listing))
            .collect()
    }

    /// Published listings, visible without authentication
    pub fn list_published_listings(&self) -> Result<Vec<ListingDetails>> {
        let db = self.state.db.lock().unwrap();
        db.listings()
            .list_published()?
            .into_iter()
            .map(|listing| self.hydrate(&db, listing))
            .collect()
    }

    /// A single published listing; drafts read as nonexistent
    pub fn get_published_listing(&self, listing_id: Uuid) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let listing = db
            .listings()
            .find_by_id(listing_id)?
            .filter(|l| l.status == ListingStatus::Published)
            .ok_or_else(|| Error::NotFound("Listing not found".to_string()))?;
        self.hydrate(&db, listing)
    }

    pub fn complete_step1(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step1PropertyDetails,
    ) -> Result<ListingDetails> {
        self.apply_step1(listing_id, host_id, payload, ApplyMode::Complete)
    }

    pub fn update_step1(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step1PropertyDetails,
    ) -> Result<ListingDetails> {
        self.apply_step1(listing_id, host_id, payload, ApplyMode::Update)
    }

    #[instrument(skip(self, payload))]
    fn apply_step1(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step1PropertyDetails,
        mode: ApplyMode,
    ) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let mut listing = find_for_host(&db, listing_id, host_id)?;
        steps::ensure_first_application(&listing, Step::One, mode)?;
        payload.validate()?;

        payload.apply(&mut listing);
        db.listings().update(&listing)?;
        self.hydrate(&db, listing)
    }

    pub fn complete_step2(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step2AmenitiesMedia,
    ) -> Result<ListingDetails> {
        self.apply_step2(listing_id, host_id, payload, ApplyMode::Complete)
    }

    pub fn update_step2(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step2AmenitiesMedia,
    ) -> Result<ListingDetails> {
        self.apply_step2(listing_id, host_id, payload, ApplyMode::Update)
    }

    #[instrument(skip(self, payload))]
    fn apply_step2(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step2AmenitiesMedia,
        mode: ApplyMode,
    ) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let mut listing = find_for_host(&db, listing_id, host_id)?;
        steps::ensure_first_application(&listing, Step::Two, mode)?;
        payload.validate()?;

        payload.apply(&mut listing);
        db.listings().update(&listing)?;

        // Absent or empty photo input leaves the existing set untouched
        if let Some(photos) = payload.photo_rows(listing.id) {
            db.listings().replace_photos(listing.id, &photos)?;
        }

        self.hydrate(&db, listing)
    }

    pub fn complete_step3(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step3BookingPricing,
    ) -> Result<ListingDetails> {
        self.apply_step3(listing_id, host_id, payload, ApplyMode::Complete)
    }

    pub fn update_step3(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step3BookingPricing,
    ) -> Result<ListingDetails> {
        self.apply_step3(listing_id, host_id, payload, ApplyMode::Update)
    }

    #[instrument(skip(self, payload))]
    fn apply_step3(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        payload: &Step3BookingPricing,
        mode: ApplyMode,
    ) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let mut listing = find_for_host(&db, listing_id, host_id)?;
        steps::ensure_first_application(&listing, Step::Three, mode)?;
        payload.validate()?;

        payload.apply(&mut listing);
        db.listings().update(&listing)?;
        self.hydrate(&db, listing)
    }

    pub fn complete_step4(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        input: &Step4Input,
    ) -> Result<ListingDetails> {
        self.apply_step4(listing_id, host_id, input, ApplyMode::Complete)
    }

    pub fn update_step4(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        input: &Step4Input,
    ) -> Result<ListingDetails> {
        self.apply_step4(listing_id, host_id, input, ApplyMode::Update)
    }

    #[instrument(skip(self, input))]
    fn apply_step4(
        &self,
        listing_id: Uuid,
        host_id: Uuid,
        input: &Step4Input,
        mode: ApplyMode,
    ) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let mut listing = find_for_host(&db, listing_id, host_id)?;
        steps::ensure_first_application(&listing, Step::Four, mode)?;

        match (self.state.discount_policy(), input) {
            (DiscountPolicy::Owned, Step4Input::Owned(payload)) => {
                payload.validate()?;
                payload.apply(&mut listing);
                db.listings().update(&listing)?;
                db.listings()
                    .replace_owned_discounts(listing.id, &payload.discount_rows(listing.id))?;
            }
            (DiscountPolicy::Referenced, Step4Input::Referenced(payload)) => {
                let mut requested: Vec<Uuid> = Vec::new();
                for id in &payload.discount_ids {
                    if !requested.contains(id) {
                        requested.push(*id);
                    }
                }

                let found = db.discounts().find_by_ids(&requested, true)?;
                if found.len() < requested.len() {
                    return Err(steps::invalid_discount_ids_error(&requested, &found));
                }

                payload.apply(&mut listing);
                db.listings().update(&listing)?;
                let resolved: Vec<Uuid> = found.iter().map(|d| d.id).collect();
                db.listings().set_discount_refs(listing.id, &resolved)?;
            }
            _ => {
                return Err(Error::BusinessRule(
                    "Discount payload does not match the configured discount policy".to_string(),
                ));
            }
        }

        self.hydrate(&db, listing)
    }

    /// Publish a listing once steps 1-3 are complete
    #[instrument(skip(self))]
    pub fn publish(&self, listing_id: Uuid, host_id: Uuid) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let mut listing = find_for_host(&db, listing_id, host_id)?;
        lifecycle::publish(&mut listing)?;
        db.listings().update(&listing)?;
        info!(listing_id = %listing.id, "Listing published");
        self.hydrate(&db, listing)
    }

    /// Convert a listing back to draft
    #[instrument(skip(self))]
    pub fn unpublish(&self, listing_id: Uuid, host_id: Uuid) -> Result<ListingDetails> {
        let db = self.state.db.lock().unwrap();
        let mut listing = find_for_host(&db, listing_id, host_id)?;
        lifecycle::unpublish(&mut listing);
        db.listings().update(&listing)?;
        info!(listing_id = %listing.id, "Listing unpublished");
        self.hydrate(&db, listing)
    }

    /// Delete a listing and its owned children
    #[instrument(skip(self))]
    pub fn delete(&self, listing_id: Uuid, host_id: Uuid) -> Result<()> {
        let db = self.state.db.lock().unwrap();
        find_for_host(&db, listing_id, host_id)?;
        db.listings().delete(listing_id)?;
        info!(listing_id = %listing_id, "Listing deleted");
        Ok(())
    }

    /// Upload photo binaries ahead of a step-2 apply
    pub fn upload_photos(&self, files: &[(String, Vec<u8>)]) -> Result<Vec<PhotoInput>> {
        media::upload_listing_photos(self.state.uploader.as_ref(), files)
    }

    fn hydrate(&self, db: &Database, listing: Listing) -> Result<ListingDetails> {
        let photos = db.listings().photos(listing.id)?;
        let discounts = match self.state.discount_policy() {
            DiscountPolicy::Owned => db.listings().owned_discounts(listing.id)?,
            DiscountPolicy::Referenced => db.listings().referenced_discounts(listing.id)?,
        };

        invariants::assert_listing_invariants(&listing);
        invariants::assert_photo_set_invariants(listing.id, &photos);
        for discount in &discounts {
            invariants::assert_discount_invariants(discount);
        }

        Ok(ListingDetails::new(listing, photos, discounts))
    }
}

/// Existence precedes ownership: a missing listing is not-found, a
/// foreign one is forbidden.
fn find_for_host(db: &Database, listing_id: Uuid, host_id: Uuid) -> Result<Listing> {
    let listing = db
        .listings()
        .find_by_id(listing_id)?
        .ok_or_else(|| Error::NotFound("Listing not found".to_string()))?;
    permissions::ensure_owner(&listing, host_id)?;
    Ok(listing)
}
