//! The relational shoe read path.
//!
//! [`SqliteCatalog`] is an explicitly constructed, passed-in handle over
//! the externally owned Shoe schema. It executes the lowered query
//! read-only, hydrates the gender-variant and review sub-entities, and
//! applies the in-memory drop ordering the builder deliberately keeps out
//! of the store.

use rusqlite::{params_from_iter, Connection};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use toebox_core::{CatalogError, ShoeGender, ShoeRecord, ShoeReview};

use crate::builder::ShoeQuery;
use crate::conditions::SortOrder;

const SHOE_COLUMNS: &str = "id, brand, model, forefoot_stack_height_mm, heel_stack_height_mm, \
                            drop_mm, fit, wide_option, intended_use, description";

/// Read-only handle over the shoe catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open the catalog database at the given path.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Open(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory catalog.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory().map_err(|e| CatalogError::Open(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create the shoe schema. The schema is owned by the external
    /// persistence layer; this exists for tests and local seeding.
    pub fn init_schema(&self) -> Result<(), CatalogError> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS shoe (
                 id INTEGER PRIMARY KEY,
                 brand TEXT NOT NULL,
                 model TEXT NOT NULL,
                 forefoot_stack_height_mm REAL,
                 heel_stack_height_mm REAL,
                 drop_mm REAL,
                 fit TEXT,
                 wide_option INTEGER NOT NULL DEFAULT 0,
                 intended_use TEXT,
                 description TEXT
             );
             CREATE TABLE IF NOT EXISTS shoe_gender (
                 id INTEGER PRIMARY KEY,
                 shoe_id INTEGER NOT NULL REFERENCES shoe(id),
                 gender TEXT NOT NULL,
                 price REAL,
                 price_rrp REAL,
                 weight_grams REAL,
                 image_id TEXT
             );
             CREATE TABLE IF NOT EXISTS shoe_review (
                 id INTEGER PRIMARY KEY,
                 shoe_id INTEGER NOT NULL REFERENCES shoe(id),
                 fit TEXT,
                 feel TEXT,
                 durability TEXT
             );",
        )
        .map_err(|e| CatalogError::Query(e.to_string()))
    }

    /// Insert a shoe with its sub-entities. Seeding helper.
    pub fn insert_shoe(&self, record: &ShoeRecord) -> Result<i64, CatalogError> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.execute(
            "INSERT INTO shoe (brand, model, forefoot_stack_height_mm, heel_stack_height_mm, \
             drop_mm, fit, wide_option, intended_use, description) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                record.brand,
                record.model,
                record.forefoot_stack_height_mm,
                record.heel_stack_height_mm,
                record.drop_mm,
                record.fit,
                record.wide_option,
                record.intended_use,
                record.description,
            ],
        )
        .map_err(|e| CatalogError::Query(e.to_string()))?;
        let shoe_id = conn.last_insert_rowid();

        for gender in &record.genders {
            conn.execute(
                "INSERT INTO shoe_gender (shoe_id, gender, price, price_rrp, weight_grams, image_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    shoe_id,
                    gender.gender,
                    gender.price,
                    gender.price_rrp,
                    gender.weight_grams,
                    gender.image_id,
                ],
            )
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        }

        for review in &record.reviews {
            conn.execute(
                "INSERT INTO shoe_review (shoe_id, fit, feel, durability) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![shoe_id, review.fit, review.feel, review.durability],
            )
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        }

        Ok(shoe_id)
    }

    /// Execute a lowered query.
    ///
    /// A query with no filter predicates returns an empty result set, not
    /// the whole catalog.
    pub fn execute(&self, query: &ShoeQuery) -> Result<Vec<ShoeRecord>, CatalogError> {
        if !query.has_conditions() {
            debug!("No filter predicates, returning empty result set");
            return Ok(vec![]);
        }

        let order_clause = if query.order_by.is_empty() {
            String::new()
        } else {
            format!(" ORDER BY {}", query.order_by.join(", "))
        };
        let sql = format!(
            "SELECT {SHOE_COLUMNS} FROM shoe WHERE {}{} LIMIT {}",
            query.where_clauses.join(" AND "),
            order_clause,
            query.limit
        );
        debug!("Executing shoe query: {sql}");

        let conn = self.conn.lock().expect("catalog lock poisoned");
        let mut statement = conn
            .prepare(&sql)
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        let mut shoes: Vec<ShoeRecord> = statement
            .query_map(params_from_iter(query.params.iter()), |row| {
                Ok(ShoeRecord {
                    id: row.get(0)?,
                    brand: row.get(1)?,
                    model: row.get(2)?,
                    forefoot_stack_height_mm: row.get(3)?,
                    heel_stack_height_mm: row.get(4)?,
                    drop_mm: row.get(5)?,
                    fit: row.get(6)?,
                    wide_option: row.get(7)?,
                    intended_use: row.get(8)?,
                    description: row.get(9)?,
                    genders: vec![],
                    reviews: vec![],
                })
            })
            .map_err(|e| CatalogError::Query(e.to_string()))?
            .collect::<Result<_, _>>()
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        for shoe in &mut shoes {
            shoe.genders = Self::load_genders(&conn, shoe.id)?;
            shoe.reviews = Self::load_reviews(&conn, shoe.id)?;
        }
        drop(statement);
        drop(conn);

        if let Some(sort) = query.drop_sort {
            apply_drop_sort(&mut shoes, sort);
        }

        debug!("Found {} matching shoes", shoes.len());
        Ok(shoes)
    }

    fn load_genders(conn: &Connection, shoe_id: i64) -> Result<Vec<ShoeGender>, CatalogError> {
        let mut statement = conn
            .prepare(
                "SELECT gender, price, price_rrp, weight_grams, image_id \
                 FROM shoe_gender WHERE shoe_id = ?1",
            )
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        let genders = statement
            .query_map([shoe_id], |row| {
                Ok(ShoeGender {
                    gender: row.get(0)?,
                    price: row.get(1)?,
                    price_rrp: row.get(2)?,
                    weight_grams: row.get(3)?,
                    image_id: row.get(4)?,
                })
            })
            .map_err(|e| CatalogError::Query(e.to_string()))?
            .collect::<Result<_, _>>()
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        Ok(genders)
    }

    fn load_reviews(conn: &Connection, shoe_id: i64) -> Result<Vec<ShoeReview>, CatalogError> {
        let mut statement = conn
            .prepare("SELECT fit, feel, durability FROM shoe_review WHERE shoe_id = ?1")
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        let reviews = statement
            .query_map([shoe_id], |row| {
                Ok(ShoeReview {
                    fit: row.get(0)?,
                    feel: row.get(1)?,
                    durability: row.get(2)?,
                })
            })
            .map_err(|e| CatalogError::Query(e.to_string()))?
            .collect::<Result<_, _>>()
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        Ok(reviews)
    }
}

/// Order records by their drop value in memory; records without a drop
/// value sort last in either direction.
fn apply_drop_sort(shoes: &mut [ShoeRecord], sort: SortOrder) {
    shoes.sort_by(|a, b| match (a.drop_value(), b.drop_value()) {
        (Some(x), Some(y)) => {
            let ordering = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            match sort {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_fallback_query, build_query};
    use crate::conditions::{RangeSpec, ShoeSearchConditions, StringSpec};

    fn shoe(
        brand: &str,
        model: &str,
        forefoot: f64,
        heel: f64,
        intended_use: &str,
    ) -> ShoeRecord {
        ShoeRecord {
            id: 0,
            brand: brand.to_string(),
            model: model.to_string(),
            forefoot_stack_height_mm: Some(forefoot),
            heel_stack_height_mm: Some(heel),
            drop_mm: Some(heel - forefoot),
            fit: Some("standard".to_string()),
            wide_option: false,
            intended_use: Some(intended_use.to_string()),
            description: None,
            genders: vec![],
            reviews: vec![],
        }
    }

    fn seeded_catalog() -> SqliteCatalog {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog.init_schema().unwrap();

        let mut superior = shoe("Altra", "Superior 6", 23.0, 23.0, "trail");
        superior.genders = vec![ShoeGender {
            gender: "Men".to_string(),
            price: Some(130.0),
            price_rrp: Some(130.0),
            weight_grams: Some(269.0),
            image_id: None,
        }];
        superior.reviews = vec![ShoeReview {
            fit: Some("roomy toe box".to_string()),
            feel: Some("firm and connected".to_string()),
            durability: Some("holds up on rock".to_string()),
        }];
        catalog.insert_shoe(&superior).unwrap();

        catalog
            .insert_shoe(&shoe("Altra", "Escalante 4", 24.0, 24.0, "road"))
            .unwrap();
        catalog
            .insert_shoe(&shoe("Altra", "Experience Wild", 26.0, 30.0, "trail"))
            .unwrap();

        let mut torin = shoe("Altra", "Torin 8", 30.0, 30.0, "road");
        torin.genders = vec![ShoeGender {
            gender: "Women".to_string(),
            price: Some(150.0),
            price_rrp: None,
            weight_grams: Some(240.0),
            image_id: None,
        }];
        catalog.insert_shoe(&torin).unwrap();

        catalog
    }

    #[test]
    fn test_empty_conditions_return_empty_set() {
        let catalog = seeded_catalog();
        let query = build_query(&ShoeSearchConditions::default());
        let shoes = catalog.execute(&query).unwrap();
        assert!(shoes.is_empty(), "no filters must not return the catalog");
    }

    #[test]
    fn test_keyword_matches_model() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            keywords: Some(vec!["escalante".to_string()]),
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].model, "Escalante 4");
    }

    #[test]
    fn test_keyword_matches_review_text() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            keywords: Some(vec!["roomy".to_string()]),
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].model, "Superior 6");
    }

    #[test]
    fn test_keyword_matches_gender_variant() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            keywords: Some(vec!["women".to_string()]),
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].model, "Torin 8");
    }

    #[test]
    fn test_keywords_are_conjunctive() {
        let catalog = seeded_catalog();
        // "trail" matches two shoes, "roomy" only one: both must hold
        let conditions = ShoeSearchConditions {
            keywords: Some(vec!["trail".to_string(), "roomy".to_string()]),
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].model, "Superior 6");
    }

    #[test]
    fn test_keyword_limit_cap() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            keywords: Some(vec!["altra".to_string()]),
            limit: Some(3),
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes.len(), 3, "min(3, 5) records");
    }

    #[test]
    fn test_zero_drop_filter() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            drop: RangeSpec::Range {
                min: Some(0.0),
                max: Some(0.0),
                sort: None,
            },
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes.len(), 3);
        assert!(shoes.iter().all(|s| s.drop_value() == Some(0.0)));
    }

    #[test]
    fn test_stack_height_max_filter() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            stack_height_mm: RangeSpec::Range {
                min: None,
                max: Some(24.0),
                sort: None,
            },
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        // Superior (23) and Escalante (24); Experience Wild's forefoot (26)
        // and heel (30) both exceed the bound
        assert_eq!(shoes.len(), 2);
    }

    #[test]
    fn test_stack_height_sort_desc() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            keywords: Some(vec!["altra".to_string()]),
            stack_height_mm: RangeSpec::Range {
                min: None,
                max: None,
                sort: Some(SortOrder::Desc),
            },
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes[0].model, "Torin 8");
        let heights: Vec<f64> = shoes
            .iter()
            .map(|s| s.forefoot_stack_height_mm.unwrap())
            .collect();
        let mut sorted = heights.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(heights, sorted);
    }

    #[test]
    fn test_drop_sort_applied_in_memory() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            keywords: Some(vec!["altra".to_string()]),
            drop: RangeSpec::Range {
                min: None,
                max: None,
                sort: Some(SortOrder::Desc),
            },
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes[0].model, "Experience Wild", "4mm drop ranks first");
    }

    #[test]
    fn test_intended_use_filter() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            intended_use: StringSpec::Value("trail".to_string()),
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes.len(), 2);
        assert!(shoes
            .iter()
            .all(|s| s.intended_use.as_deref() == Some("trail")));
    }

    #[test]
    fn test_gender_filter_traverses_variants() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            gender: StringSpec::Value("women".to_string()),
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].model, "Torin 8");
        assert_eq!(shoes[0].genders[0].gender, "Women");
    }

    #[test]
    fn test_sub_entities_hydrated() {
        let catalog = seeded_catalog();
        let conditions = ShoeSearchConditions {
            keywords: Some(vec!["superior".to_string()]),
            ..Default::default()
        };
        let shoes = catalog.execute(&build_query(&conditions)).unwrap();
        assert_eq!(shoes[0].genders.len(), 1);
        assert_eq!(shoes[0].reviews.len(), 1);
        assert_eq!(shoes[0].reviews[0].fit.as_deref(), Some("roomy toe box"));
    }

    #[test]
    fn test_fallback_query_matches_any_keyword() {
        let catalog = seeded_catalog();
        let keywords = vec!["escalante".to_string(), "torin".to_string()];
        let shoes = catalog.execute(&build_fallback_query(&keywords)).unwrap();
        assert_eq!(shoes.len(), 2);
    }
}
