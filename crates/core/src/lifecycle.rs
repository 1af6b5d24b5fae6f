//! Publish/unpublish transitions
//!
//! The only states are draft and published. Publishing requires steps
//! 1-3 complete (step 4 is optional); unpublishing is unconditional.
//! Neither transition touches the step-completion flags, so a listing
//! can be unpublished and republished without re-entering step data.

use crate::error::{Error, Result};
use crate::models::{Listing, ListingStatus};
use crate::steps::Step;

/// Steps that must be complete before a listing can go live
const REQUIRED_FOR_PUBLISH: [Step; 3] = [Step::One, Step::Two, Step::Three];

/// Transition to published, enumerating any missing steps by name in
/// fixed step order. Republishing an already-published listing is a
/// no-op success.
pub fn publish(listing: &mut Listing) -> Result<()> {
    let incomplete: Vec<&str> = REQUIRED_FOR_PUBLISH
        .iter()
        .filter(|step| !step.is_completed(listing))
        .map(|step| step.display_name())
        .collect();

    if !incomplete.is_empty() {
        return Err(Error::BusinessRule(format!(
            "Cannot publish listing. Incomplete steps: {}",
            incomplete.join(", ")
        )));
    }

    listing.status = ListingStatus::Published;
    listing.touch();
    Ok(())
}

/// Transition back to draft. Always succeeds; step flags survive.
pub fn unpublish(listing: &mut Listing) {
    listing.status = ListingStatus::Draft;
    listing.touch();
}
