//! Global discount storage operations (referenced policy)

use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, parse_uuid_opt, OptionalExt};
use crate::error::Result;
use crate::models::Discount;

pub(super) const DISCOUNT_COLUMNS: &str =
    "id, listing_id, name, description, discount_percentage, is_active, created_at, updated_at";

pub(super) fn discount_from_row(row: &Row<'_>) -> rusqlite::Result<Discount> {
    Ok(Discount {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        listing_id: parse_uuid_opt(row.get::<_, Option<String>>(1)?)?,
        name: row.get(2)?,
        description: row.get(3)?,
        discount_percentage: row.get(4)?,
        is_active: row.get::<_, i32>(5)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(7)?)?,
    })
}

pub struct DiscountStore<'a> {
    conn: &'a Connection,
}

impl<'a> DiscountStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a discount row (global or listing-owned)
    #[instrument(skip(self, discount), fields(name = %discount.name))]
    pub fn create(&self, discount: &Discount) -> Result<()> {
        self.conn.execute(
            "INSERT INTO discounts (id, listing_id, name, description, discount_percentage, \
             is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                discount.id.to_string(),
                discount.listing_id.map(|id| id.to_string()),
                discount.name,
                discount.description,
                discount.discount_percentage,
                discount.is_active as i32,
                discount.created_at.to_rfc3339(),
                discount.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Update a discount
    #[instrument(skip(self, discount), fields(discount_id = %discount.id))]
    pub fn update(&self, discount: &Discount) -> Result<()> {
        self.conn.execute(
            "UPDATE discounts SET name = ?1, description = ?2, discount_percentage = ?3, \
             is_active = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                discount.name,
                discount.description,
                discount.discount_percentage,
                discount.is_active as i32,
                Utc::now().to_rfc3339(),
                discount.id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Find discount by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Discount>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = ?1"
        ))?;

        let discount = stmt
            .query_row(params![id.to_string()], discount_from_row)
            .optional()?;

        Ok(discount)
    }

    /// All global discounts, newest first
    pub fn list_all(&self) -> Result<Vec<Discount>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts \
             WHERE listing_id IS NULL ORDER BY created_at DESC"
        ))?;

        let discounts = stmt
            .query_map([], discount_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(discounts)
    }

    /// Active global discounts, newest first
    pub fn list_active(&self) -> Result<Vec<Discount>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts \
             WHERE listing_id IS NULL AND is_active = 1 ORDER BY created_at DESC"
        ))?;

        let discounts = stmt
            .query_map([], discount_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(discounts)
    }

    /// Resolve a set of ids, optionally restricted to active rows
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn find_by_ids(&self, ids: &[Uuid], active_only: bool) -> Result<Vec<Discount>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut sql = format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id IN ({placeholders})"
        );
        if active_only {
            sql.push_str(" AND is_active = 1");
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let discounts = stmt
            .query_map(
                params_from_iter(ids.iter().map(|id| id.to_string())),
                discount_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(discounts)
    }

    /// Delete a discount
    #[instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM discounts WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_create_and_list_global() {
        let db = Database::open_in_memory().unwrap();
        let weekly = Discount::global("Weekly".to_string(), None, 10.0, true);
        let monthly = Discount::global("Monthly".to_string(), None, 25.0, false);
        db.discounts().create(&weekly).unwrap();
        db.discounts().create(&monthly).unwrap();

        assert_eq!(db.discounts().list_all().unwrap().len(), 2);

        let active = db.discounts().list_active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Weekly");
    }

    #[test]
    fn test_find_by_ids_active_only() {
        let db = Database::open_in_memory().unwrap();
        let active = Discount::global("Active".to_string(), None, 10.0, true);
        let inactive = Discount::global("Inactive".to_string(), None, 15.0, false);
        db.discounts().create(&active).unwrap();
        db.discounts().create(&inactive).unwrap();

        let unknown = Uuid::new_v4();
        let found = db
            .discounts()
            .find_by_ids(&[active.id, inactive.id, unknown], true)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, active.id);

        let found_all = db
            .discounts()
            .find_by_ids(&[active.id, inactive.id], false)
            .unwrap();
        assert_eq!(found_all.len(), 2);
    }

    #[test]
    fn test_update_discount() {
        let db = Database::open_in_memory().unwrap();
        let mut discount = Discount::global("Weekly".to_string(), None, 10.0, true);
        db.discounts().create(&discount).unwrap();

        discount.discount_percentage = 12.5;
        discount.is_active = false;
        db.discounts().update(&discount).unwrap();

        let found = db.discounts().find_by_id(discount.id).unwrap().unwrap();
        assert_eq!(found.discount_percentage, 12.5);
        assert!(!found.is_active);
    }

    #[test]
    fn test_delete_discount() {
        let db = Database::open_in_memory().unwrap();
        let discount = Discount::global("Weekly".to_string(), None, 10.0, true);
        db.discounts().create(&discount).unwrap();
        db.discounts().delete(discount.id).unwrap();
        assert!(db.discounts().find_by_id(discount.id).unwrap().is_none());
    }
}
