//! Global discount service (referenced policy)
//!
//! Admin-curated discounts with an independent lifecycle. Hosts see
//! the active subset when filling step 4; listings only ever hold
//! references to these rows.

use std::sync::Arc;

use lodgekeep_core::{permissions, Actor, Discount, DiscountSpec, Error, Result};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::state::AppState;

/// Partial update for an existing discount
#[derive(Debug, Clone, Default)]
pub struct DiscountPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub discount_percentage: Option<f64>,
    pub is_active: Option<bool>,
}

pub struct DiscountService {
    state: Arc<AppState>,
}

impl DiscountService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Create a global discount (admin only)
    #[instrument(skip(self, actor, spec), fields(actor_id = %actor.id, name = %spec.name))]
    pub fn create(&self, actor: &Actor, spec: &DiscountSpec) -> Result<Discount> {
        permissions::require_admin(actor)?;

        let mut errors = Vec::new();
        spec.validate_into(&mut errors);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let discount = Discount::global(
            spec.name.clone(),
            spec.description.clone(),
            spec.discount_percentage,
            spec.is_active.unwrap_or(true),
        );

        let db = self.state.db.lock().unwrap();
        db.discounts().create(&discount)?;
        info!(discount_id = %discount.id, "Discount created");
        Ok(discount)
    }

    /// Update an existing discount (admin only)
    #[instrument(skip(self, actor, patch), fields(actor_id = %actor.id))]
    pub fn update(&self, actor: &Actor, id: Uuid, patch: &DiscountPatch) -> Result<Discount> {
        permissions::require_admin(actor)?;

        let db = self.state.db.lock().unwrap();
        let mut discount = db
            .discounts()
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound("Discount not found".to_string()))?;

        if let Some(name) = &patch.name {
            discount.name = name.clone();
        }
        if let Some(description) = &patch.description {
            discount.description = Some(description.clone());
        }
        if let Some(percentage) = patch.discount_percentage {
            discount.discount_percentage = percentage;
        }
        if let Some(is_active) = patch.is_active {
            discount.is_active = is_active;
        }

        let mut errors = Vec::new();
        if discount.name.trim().is_empty() {
            errors.push("name should not be empty".to_string());
        }
        if discount.discount_percentage < 0.0 {
            errors.push("discountPercentage must be at least 0".to_string());
        }
        if discount.discount_percentage > 100.0 {
            errors.push("discountPercentage cannot exceed 100".to_string());
        }
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        db.discounts().update(&discount)?;
        Ok(discount)
    }

    /// All global discounts (admin only)
    pub fn list_all(&self, actor: &Actor) -> Result<Vec<Discount>> {
        permissions::require_admin(actor)?;
        let db = self.state.db.lock().unwrap();
        db.discounts().list_all()
    }

    /// Active discounts, for hosts filling step 4
    pub fn list_active(&self) -> Result<Vec<Discount>> {
        let db = self.state.db.lock().unwrap();
        db.discounts().list_active()
    }

    /// Single discount (admin only)
    pub fn get(&self, actor: &Actor, id: Uuid) -> Result<Discount> {
        permissions::require_admin(actor)?;
        let db = self.state.db.lock().unwrap();
        db.discounts()
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound("Discount not found".to_string()))
    }

    /// Delete a discount (admin only); listing references cascade
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        permissions::require_admin(actor)?;
        let db = self.state.db.lock().unwrap();
        db.discounts()
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound("Discount not found".to_string()))?;
        db.discounts().delete(id)?;
        info!(discount_id = %id, "Discount deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::services::{LocalMediaStore, LogNotifier};
    use lodgekeep_core::{Database, DiscountPolicy, Role};

    fn service() -> DiscountService {
        let config = AppConfig {
            discount_policy: DiscountPolicy::Referenced,
            ..AppConfig::default()
        };
        DiscountService::new(Arc::new(crate::state::AppState::with_collaborators(
            Database::open_in_memory().unwrap(),
            config,
            Arc::new(LocalMediaStore::new(std::env::temp_dir())),
            Arc::new(LogNotifier),
        )))
    }

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), Role::Admin)
    }

    fn spec(name: &str, percentage: f64) -> DiscountSpec {
        DiscountSpec {
            name: name.to_string(),
            description: None,
            discount_percentage: percentage,
            is_active: None,
        }
    }

    #[test]
    fn test_crud_roundtrip() {
        let service = service();
        let actor = admin();

        let created = service.create(&actor, &spec("Weekly", 10.0)).unwrap();
        assert!(created.is_active);
        assert!(created.listing_id.is_none());

        let fetched = service.get(&actor, created.id).unwrap();
        assert_eq!(fetched.name, "Weekly");

        let updated = service
            .update(
                &actor,
                created.id,
                &DiscountPatch {
                    discount_percentage: Some(12.5),
                    is_active: Some(false),
                    ..DiscountPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.discount_percentage, 12.5);
        assert!(!updated.is_active);

        service.delete(&actor, created.id).unwrap();
        assert!(matches!(
            service.get(&actor, created.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_active_filters_for_hosts() {
        let service = service();
        let actor = admin();

        service.create(&actor, &spec("Weekly", 10.0)).unwrap();
        let retired = service.create(&actor, &spec("Retired", 5.0)).unwrap();
        service
            .update(
                &actor,
                retired.id,
                &DiscountPatch {
                    is_active: Some(false),
                    ..DiscountPatch::default()
                },
            )
            .unwrap();

        assert_eq!(service.list_all(&actor).unwrap().len(), 2);

        let active = service.list_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Weekly");
    }

    #[test]
    fn test_admin_gate() {
        let service = service();
        let host = Actor::new(Uuid::new_v4(), Role::Host);

        assert!(matches!(
            service.create(&host, &spec("Weekly", 10.0)),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            service.list_all(&host),
            Err(Error::Forbidden(_))
        ));
        // The active list is open to hosts
        assert!(service.list_active().is_ok());
    }

    #[test]
    fn test_update_validates_result() {
        let service = service();
        let actor = admin();
        let created = service.create(&actor, &spec("Weekly", 10.0)).unwrap();

        let err = service
            .update(
                &actor,
                created.id,
                &DiscountPatch {
                    discount_percentage: Some(150.0),
                    ..DiscountPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
