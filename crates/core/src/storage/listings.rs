//! Listing storage operations
//!
//! Owns the listing rows plus both child collections. Photo and
//! discount replacement runs inside an explicit transaction so readers
//! never observe a half-replaced set.

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::discounts::{discount_from_row, DISCOUNT_COLUMNS};
use super::parse::{parse_datetime, parse_enum, parse_enum_opt, parse_json_vec, parse_uuid};
use super::parse::OptionalExt;
use crate::error::Result;
use crate::models::{
    BathroomUsage, BookingSetting, Discount, Listing, ListingStatus, Photo, PlaceType,
    PropertyCategory,
};

const LISTING_COLUMNS: &str = "id, host_id, status, \
     category, place_type, country, street_address, floor, city, state, postal_code, \
     guests, bedrooms, beds, home_precise, bedroom_lock, \
     private_bathroom, dedicated_bathroom, shared_bathroom, bathroom_usage, \
     favorites, amenities, safety_items, title, highlights, description, \
     booking_setting, weekday_price, weekday_after_tax_price, weekend_price, \
     weekend_after_tax_price, \
     safety_details, host_country, host_street_address, host_apt_floor, host_city, \
     host_state, host_postal_code, hosting_as_business, \
     step1_completed, step2_completed, step3_completed, step4_completed, \
     created_at, updated_at";

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<Listing> {
    Ok(Listing {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        host_id: parse_uuid(&row.get::<_, String>(1)?)?,
        status: parse_enum(&row.get::<_, String>(2)?, ListingStatus::from_str, "status")?,
        category: parse_enum_opt(row.get(3)?, PropertyCategory::from_str, "category")?,
        place_type: parse_enum_opt(row.get(4)?, PlaceType::from_str, "place type")?,
        country: row.get(5)?,
        street_address: row.get(6)?,
        floor: row.get(7)?,
        city: row.get(8)?,
        state: row.get(9)?,
        postal_code: row.get(10)?,
        guests: row.get(11)?,
        bedrooms: row.get(12)?,
        beds: row.get(13)?,
        home_precise: row.get::<_, i32>(14)? != 0,
        bedroom_lock: row.get::<_, i32>(15)? != 0,
        private_bathroom: row.get(16)?,
        dedicated_bathroom: row.get(17)?,
        shared_bathroom: row.get(18)?,
        bathroom_usage: parse_enum_opt(row.get(19)?, BathroomUsage::from_str, "bathroom usage")?,
        favorites: parse_json_vec(row.get(20)?)?,
        amenities: parse_json_vec(row.get(21)?)?,
        safety_items: parse_json_vec(row.get(22)?)?,
        title: row.get(23)?,
        highlights: parse_json_vec(row.get(24)?)?,
        description: row.get(25)?,
        booking_setting: parse_enum_opt(
            row.get(26)?,
            BookingSetting::from_str,
            "booking setting",
        )?,
        weekday_price: row.get(27)?,
        weekday_after_tax_price: row.get(28)?,
        weekend_price: row.get(29)?,
        weekend_after_tax_price: row.get(30)?,
        safety_details: parse_json_vec(row.get(31)?)?,
        host_country: row.get(32)?,
        host_street_address: row.get(33)?,
        host_apt_floor: row.get(34)?,
        host_city: row.get(35)?,
        host_state: row.get(36)?,
        host_postal_code: row.get(37)?,
        hosting_as_business: row.get::<_, i32>(38)? != 0,
        step1_completed: row.get::<_, i32>(39)? != 0,
        step2_completed: row.get::<_, i32>(40)? != 0,
        step3_completed: row.get::<_, i32>(41)? != 0,
        step4_completed: row.get::<_, i32>(42)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(43)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(44)?)?,
    })
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        listing_id: parse_uuid(&row.get::<_, String>(1)?)?,
        public_id: row.get(2)?,
        secure_url: row.get(3)?,
        order: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?)?,
    })
}

/// Tag-set columns, serialized once per write
struct JsonSets {
    favorites: String,
    amenities: String,
    safety_items: String,
    highlights: String,
    safety_details: String,
}

impl JsonSets {
    fn encode(listing: &Listing) -> Result<Self> {
        Ok(Self {
            favorites: serde_json::to_string(&listing.favorites)?,
            amenities: serde_json::to_string(&listing.amenities)?,
            safety_items: serde_json::to_string(&listing.safety_items)?,
            highlights: serde_json::to_string(&listing.highlights)?,
            safety_details: serde_json::to_string(&listing.safety_details)?,
        })
    }
}

/// Positional parameters matching `LISTING_COLUMNS`
macro_rules! listing_params {
    ($listing:expr, $sets:expr) => {
        params![
            $listing.id.to_string(),
            $listing.host_id.to_string(),
            $listing.status.as_str(),
            $listing.category.map(|c| c.as_str()),
            $listing.place_type.map(|p| p.as_str()),
            $listing.country,
            $listing.street_address,
            $listing.floor,
            $listing.city,
            $listing.state,
            $listing.postal_code,
            $listing.guests,
            $listing.bedrooms,
            $listing.beds,
            $listing.home_precise as i32,
            $listing.bedroom_lock as i32,
            $listing.private_bathroom,
            $listing.dedicated_bathroom,
            $listing.shared_bathroom,
            $listing.bathroom_usage.map(|b| b.as_str()),
            $sets.favorites,
            $sets.amenities,
            $sets.safety_items,
            $listing.title,
            $sets.highlights,
            $listing.description,
            $listing.booking_setting.map(|b| b.as_str()),
            $listing.weekday_price,
            $listing.weekday_after_tax_price,
            $listing.weekend_price,
            $listing.weekend_after_tax_price,
            $sets.safety_details,
            $listing.host_country,
            $listing.host_street_address,
            $listing.host_apt_floor,
            $listing.host_city,
            $listing.host_state,
            $listing.host_postal_code,
            $listing.hosting_as_business as i32,
            $listing.step1_completed as i32,
            $listing.step2_completed as i32,
            $listing.step3_completed as i32,
            $listing.step4_completed as i32,
            $listing.created_at.to_rfc3339(),
            $listing.updated_at.to_rfc3339(),
        ]
    };
}

pub struct ListingStore<'a> {
    conn: &'a Connection,
}

impl<'a> ListingStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new listing row
    #[instrument(skip(self, listing), fields(listing_id = %listing.id, host_id = %listing.host_id))]
    pub fn create(&self, listing: &Listing) -> Result<()> {
        let sets = JsonSets::encode(listing)?;
        self.conn.execute(
            &format!(
                "INSERT INTO listings ({LISTING_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                 ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, \
                 ?31, ?32, ?33, ?34, ?35, ?36, ?37, ?38, ?39, ?40, ?41, ?42, ?43, ?44, ?45)"
            ),
            listing_params![listing, sets],
        )?;
        Ok(())
    }

    /// Find listing by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Listing>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?1"
        ))?;

        let listing = stmt
            .query_row(params![id.to_string()], listing_from_row)
            .optional()?;

        Ok(listing)
    }

    /// Write back every scalar field of a listing
    #[instrument(skip(self, listing), fields(listing_id = %listing.id))]
    pub fn update(&self, listing: &Listing) -> Result<()> {
        let sets = JsonSets::encode(listing)?;
        self.conn.execute(
            "UPDATE listings SET status = ?3, \
             category = ?4, place_type = ?5, country = ?6, street_address = ?7, floor = ?8, \
             city = ?9, state = ?10, postal_code = ?11, guests = ?12, bedrooms = ?13, \
             beds = ?14, home_precise = ?15, bedroom_lock = ?16, private_bathroom = ?17, \
             dedicated_bathroom = ?18, shared_bathroom = ?19, bathroom_usage = ?20, \
             favorites = ?21, amenities = ?22, safety_items = ?23, title = ?24, \
             highlights = ?25, description = ?26, booking_setting = ?27, \
             weekday_price = ?28, weekday_after_tax_price = ?29, weekend_price = ?30, \
             weekend_after_tax_price = ?31, safety_details = ?32, host_country = ?33, \
             host_street_address = ?34, host_apt_floor = ?35, host_city = ?36, \
             host_state = ?37, host_postal_code = ?38, hosting_as_business = ?39, \
             step1_completed = ?40, step2_completed = ?41, step3_completed = ?42, \
             step4_completed = ?43, created_at = ?44, updated_at = ?45
             WHERE id = ?1 AND host_id = ?2",
            listing_params![listing, sets],
        )?;
        Ok(())
    }

    /// Delete a listing; photos, owned discounts and references cascade
    #[instrument(skip(self))]
    pub fn delete(&self, listing_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM listings WHERE id = ?1",
            params![listing_id.to_string()],
        )?;
        Ok(())
    }

    /// All listings of one host, newest first
    #[instrument(skip(self))]
    pub fn list_for_host(&self, host_id: Uuid) -> Result<Vec<Listing>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE host_id = ?1 ORDER BY created_at DESC"
        ))?;

        let listings = stmt
            .query_map(params![host_id.to_string()], listing_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(listings)
    }

    /// All published listings, newest first
    pub fn list_published(&self) -> Result<Vec<Listing>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE status = 'published' ORDER BY created_at DESC"
        ))?;

        let listings = stmt
            .query_map([], listing_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(listings)
    }

    /// Every listing regardless of status (admin)
    pub fn list_all(&self) -> Result<Vec<Listing>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC"
        ))?;

        let listings = stmt
            .query_map([], listing_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(listings)
    }

    /// Photos of a listing in display order
    pub fn photos(&self, listing_id: Uuid) -> Result<Vec<Photo>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, listing_id, public_id, secure_url, display_order, created_at \
             FROM listing_photos WHERE listing_id = ?1 ORDER BY display_order",
        )?;

        let photos = stmt
            .query_map(params![listing_id.to_string()], photo_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(photos)
    }

    /// Replace the photo set in one transaction
    #[instrument(skip(self, photos), fields(listing_id = %listing_id, count = photos.len()))]
    pub fn replace_photos(&self, listing_id: Uuid, photos: &[Photo]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM listing_photos WHERE listing_id = ?1",
            params![listing_id.to_string()],
        )?;
        for photo in photos {
            tx.execute(
                "INSERT INTO listing_photos (id, listing_id, public_id, secure_url, \
                 display_order, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    photo.id.to_string(),
                    photo.listing_id.to_string(),
                    photo.public_id,
                    photo.secure_url,
                    photo.order,
                    photo.created_at.to_rfc3339(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Listing-scoped discounts (owned policy)
    pub fn owned_discounts(&self, listing_id: Uuid) -> Result<Vec<Discount>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts \
             WHERE listing_id = ?1 ORDER BY created_at DESC"
        ))?;

        let discounts = stmt
            .query_map(params![listing_id.to_string()], discount_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(discounts)
    }

    /// Replace the owned discount set in one transaction.
    ///
    /// An empty slice clears the set.
    #[instrument(skip(self, discounts), fields(listing_id = %listing_id, count = discounts.len()))]
    pub fn replace_owned_discounts(&self, listing_id: Uuid, discounts: &[Discount]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM discounts WHERE listing_id = ?1",
            params![listing_id.to_string()],
        )?;
        for discount in discounts {
            tx.execute(
                "INSERT INTO discounts (id, listing_id, name, description, \
                 discount_percentage, is_active, created_at, updated_at)
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
        }
        tx.commit()?;
        Ok(())
    }

    /// Discounts referenced by a listing (referenced policy)
    pub fn referenced_discounts(&self, listing_id: Uuid) -> Result<Vec<Discount>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.listing_id, d.name, d.description, d.discount_percentage, \
             d.is_active, d.created_at, d.updated_at
             FROM discounts d
             INNER JOIN listing_discounts ld ON ld.discount_id = d.id
             WHERE ld.listing_id = ?1
             ORDER BY d.created_at DESC",
        )?;

        let discounts = stmt
            .query_map(params![listing_id.to_string()], discount_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(discounts)
    }

    /// Replace the reference set in one transaction
    #[instrument(skip(self, discount_ids), fields(listing_id = %listing_id, count = discount_ids.len()))]
    pub fn set_discount_refs(&self, listing_id: Uuid, discount_ids: &[Uuid]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM listing_discounts WHERE listing_id = ?1",
            params![listing_id.to_string()],
        )?;
        for discount_id in discount_ids {
            tx.execute(
                "INSERT INTO listing_discounts (listing_id, discount_id) VALUES (?1, ?2)",
                params![listing_id.to_string(), discount_id.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};
    use crate::storage::Database;

    fn create_test_host(db: &Database) -> Uuid {
        let user = User::new(
            "Host".to_string(),
            format!("{}@example.com", Uuid::new_v4()),
            "hash".to_string(),
            Role::Host,
        );
        db.users().create(&user).unwrap();
        user.id
    }

    fn photo_set(listing_id: Uuid, names: &[&str]) -> Vec<Photo> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Photo::new(
                    listing_id,
                    format!("listings/{name}"),
                    format!("https://cdn.example.com/{name}.jpg"),
                    i as u32,
                )
            })
            .collect()
    }

    #[test]
    fn test_create_and_find_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let host_id = create_test_host(&db);

        let mut listing = Listing::new(host_id);
        listing.title = Some("Cozy Apartment".to_string());
        listing.favorites = vec![crate::models::FavoriteAmenity::Wifi];
        listing.weekday_price = Some(100.0);
        listing.weekend_price = Some(120.0);
        db.listings().create(&listing).unwrap();

        let found = db.listings().find_by_id(listing.id).unwrap().unwrap();
        assert_eq!(found.host_id, host_id);
        assert_eq!(found.status, ListingStatus::Draft);
        assert_eq!(found.title.as_deref(), Some("Cozy Apartment"));
        assert_eq!(found.favorites, vec![crate::models::FavoriteAmenity::Wifi]);
        assert_eq!(found.weekend_charge_percentage(), Some(20.0));
    }

    #[test]
    fn test_update_persists_step_fields() {
        let db = Database::open_in_memory().unwrap();
        let host_id = create_test_host(&db);

        let mut listing = Listing::new(host_id);
        db.listings().create(&listing).unwrap();

        listing.category = Some(PropertyCategory::Apartment);
        listing.guests = Some(4);
        listing.step1_completed = true;
        listing.status = ListingStatus::Published;
        db.listings().update(&listing).unwrap();

        let found = db.listings().find_by_id(listing.id).unwrap().unwrap();
        assert_eq!(found.category, Some(PropertyCategory::Apartment));
        assert_eq!(found.guests, Some(4));
        assert!(found.step1_completed);
        assert_eq!(found.status, ListingStatus::Published);
    }

    #[test]
    fn test_replace_photos_leaves_exactly_second_set() {
        let db = Database::open_in_memory().unwrap();
        let host_id = create_test_host(&db);
        let listing = Listing::new(host_id);
        db.listings().create(&listing).unwrap();

        let first = photo_set(listing.id, &["a", "b", "c"]);
        db.listings().replace_photos(listing.id, &first).unwrap();
        assert_eq!(db.listings().photos(listing.id).unwrap().len(), 3);

        let second = photo_set(listing.id, &["d", "e"]);
        db.listings().replace_photos(listing.id, &second).unwrap();

        let photos = db.listings().photos(listing.id).unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].public_id, "listings/d");
        assert_eq!(photos[0].order, 0);
        assert_eq!(photos[1].public_id, "listings/e");
        assert_eq!(photos[1].order, 1);
    }

    #[test]
    fn test_replace_owned_discounts() {
        let db = Database::open_in_memory().unwrap();
        let host_id = create_test_host(&db);
        let listing = Listing::new(host_id);
        db.listings().create(&listing).unwrap();

        let first = vec![
            Discount::owned(listing.id, "Weekly".to_string(), None, 10.0, true),
            Discount::owned(listing.id, "Monthly".to_string(), None, 25.0, true),
        ];
        db.listings()
            .replace_owned_discounts(listing.id, &first)
            .unwrap();
        assert_eq!(db.listings().owned_discounts(listing.id).unwrap().len(), 2);

        // Empty replacement clears the set
        db.listings()
            .replace_owned_discounts(listing.id, &[])
            .unwrap();
        assert!(db.listings().owned_discounts(listing.id).unwrap().is_empty());
    }

    #[test]
    fn test_discount_refs_replace() {
        let db = Database::open_in_memory().unwrap();
        let host_id = create_test_host(&db);
        let listing = Listing::new(host_id);
        db.listings().create(&listing).unwrap();

        let weekly = Discount::global("Weekly".to_string(), None, 10.0, true);
        let monthly = Discount::global("Monthly".to_string(), None, 25.0, true);
        db.discounts().create(&weekly).unwrap();
        db.discounts().create(&monthly).unwrap();

        db.listings()
            .set_discount_refs(listing.id, &[weekly.id, monthly.id])
            .unwrap();
        assert_eq!(
            db.listings().referenced_discounts(listing.id).unwrap().len(),
            2
        );

        db.listings()
            .set_discount_refs(listing.id, &[monthly.id])
            .unwrap();
        let refs = db.listings().referenced_discounts(listing.id).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].id, monthly.id);
    }

    #[test]
    fn test_delete_cascades_children() {
        let db = Database::open_in_memory().unwrap();
        let host_id = create_test_host(&db);
        let listing = Listing::new(host_id);
        db.listings().create(&listing).unwrap();

        db.listings()
            .replace_photos(listing.id, &photo_set(listing.id, &["a"]))
            .unwrap();
        db.listings()
            .replace_owned_discounts(
                listing.id,
                &[Discount::owned(listing.id, "W".to_string(), None, 10.0, true)],
            )
            .unwrap();
        let global = Discount::global("G".to_string(), None, 5.0, true);
        db.discounts().create(&global).unwrap();
        db.listings()
            .set_discount_refs(listing.id, &[global.id])
            .unwrap();

        db.listings().delete(listing.id).unwrap();

        assert!(db.listings().find_by_id(listing.id).unwrap().is_none());
        assert!(db.listings().photos(listing.id).unwrap().is_empty());
        assert!(db.listings().owned_discounts(listing.id).unwrap().is_empty());
        assert!(db
            .listings()
            .referenced_discounts(listing.id)
            .unwrap()
            .is_empty());
        // The global discount itself survives
        assert!(db.discounts().find_by_id(global.id).unwrap().is_some());
    }

    #[test]
    fn test_list_published_filters_drafts() {
        let db = Database::open_in_memory().unwrap();
        let host_id = create_test_host(&db);

        let draft = Listing::new(host_id);
        db.listings().create(&draft).unwrap();

        let mut published = Listing::new(host_id);
        published.status = ListingStatus::Published;
        db.listings().create(&published).unwrap();

        let all = db.listings().list_all().unwrap();
        assert_eq!(all.len(), 2);

        let live = db.listings().list_published().unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, published.id);

        let mine = db.listings().list_for_host(host_id).unwrap();
        assert_eq!(mine.len(), 2);
    }
}
