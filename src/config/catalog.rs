//! Catalog seed loading from config.toml
//!
//! The seed file lists localities, products and teams. On startup the missing entries are
//! inserted by name; entries that already exist are left untouched, so seeding is safe to
//! run on every start.

use crate::{
    core::{
        locality::{self, NewLocality},
        product::{self, NewProduct},
        team::{self, NewTeam},
    },
    entities::{Product, product as product_entity},
    errors::{Error, Result},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Structure of the whole seed file.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Localities to seed
    #[serde(default)]
    pub localities: Vec<LocalityConfig>,
    /// Products to seed
    #[serde(default)]
    pub products: Vec<ProductConfig>,
    /// Teams to seed
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
}

/// A locality entry.
#[derive(Debug, Deserialize, Clone)]
pub struct LocalityConfig {
    /// Unique name
    pub name: String,
    /// Administrative region
    pub region: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
}

/// A product entry.
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Unique name
    pub name: String,
    /// Measurement unit (kg, l, piece...)
    pub unit: String,
    /// Quantity per person per meal
    pub ration: f64,
    /// Size of one packaging unit, in `unit`
    pub package_size: f64,
    /// Packaging label (sack, can, box...)
    pub package_kind: String,
    /// Price per packaging unit
    pub unit_price: f64,
    /// Optional category label
    pub category: Option<String>,
}

/// A team entry, attached to a locality by name.
#[derive(Debug, Deserialize, Clone)]
pub struct TeamConfig {
    /// Unique name
    pub name: String,
    /// Name of the home locality
    pub locality: String,
    /// Base headcount
    pub headcount: u32,
    /// Person in charge
    #[serde(default)]
    pub responsible: String,
}

impl From<ProductConfig> for NewProduct {
    fn from(config: ProductConfig) -> Self {
        Self {
            name: config.name,
            unit: config.unit,
            ration: config.ration,
            package_size: config.package_size,
            package_kind: config.package_kind,
            unit_price: config.unit_price,
            category: config.category,
        }
    }
}

/// What a seeding run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Localities inserted
    pub localities_created: usize,
    /// Products inserted
    pub products_created: usize,
    /// Soft-deleted products re-enabled
    pub products_restored: usize,
    /// Teams inserted
    pub teams_created: usize,
}

/// Loads the seed from a TOML file
///
/// # Errors
/// Returns `Io` if the file cannot be read and `Config` if it cannot be parsed.
pub fn load_catalog_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    parse_catalog_config(&contents)
}

/// Parses seed TOML.
pub fn parse_catalog_config(contents: &str) -> Result<CatalogConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file: {e}"),
    })
}

/// Inserts the seed entries that are not in the database yet.
///
/// A product that exists only as a deleted entry is re-enabled with the seeded definition.
///
/// # Errors
/// Returns `Config` when a team names an unknown locality, and validation errors for invalid
/// entries.
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for entry in &config.localities {
        if locality::get_locality_by_name(db, &entry.name).await?.is_some() {
            debug!("Locality '{}' already exists", entry.name);
            continue;
        }
        locality::create_locality(db, NewLocality {
            name: entry.name.clone(),
            region: entry.region.clone(),
            description: entry.description.clone(),
        })
        .await?;
        summary.localities_created += 1;
    }

    for entry in &config.products {
        if product::get_product_by_name(db, entry.name.trim()).await?.is_some() {
            debug!("Product '{}' already exists", entry.name);
            continue;
        }
        let deleted = Product::find()
            .filter(product_entity::Column::Name.eq(entry.name.trim()))
            .filter(product_entity::Column::IsDeleted.eq(true))
            .one(db)
            .await?;
        if let Some(found) = deleted {
            product::restore_product(db, found, entry.clone().into()).await?;
            summary.products_restored += 1;
        } else {
            product::create_product(db, entry.clone().into()).await?;
            summary.products_created += 1;
        }
    }

    for entry in &config.teams {
        if team::get_team_by_name(db, &entry.name).await?.is_some() {
            debug!("Team '{}' already exists", entry.name);
            continue;
        }
        let home = locality::get_locality_by_name(db, &entry.locality)
            .await?
            .ok_or_else(|| Error::Config {
                message: format!(
                    "Team '{}' refers to unknown locality '{}'",
                    entry.name, entry.locality
                ),
            })?;
        team::create_team(db, NewTeam {
            locality_id: home.id,
            name: entry.name.clone(),
            headcount: entry.headcount,
            responsible: entry.responsible.clone(),
        })
        .await?;
        summary.teams_created += 1;
    }

    info!("Catalog seeded: {:?}", summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    const SEED: &str = r#"
        [[localities]]
        name = "Coast"
        region = "South"
        description = "Field camp near the harbour"

        [[products]]
        name = "Rice"
        unit = "kg"
        ration = 0.2
        package_size = 50.0
        package_kind = "sack"
        unit_price = 25000.0
        category = "Cereals"

        [[products]]
        name = "Salt"
        unit = "kg"
        ration = 0.01
        package_size = 1.0
        package_kind = "bag"
        unit_price = 500.0

        [[teams]]
        name = "Alpha"
        locality = "Coast"
        headcount = 25
        responsible = "R. Tanaka"
    "#;

    #[test]
    fn test_parse_catalog_config() {
        let config = parse_catalog_config(SEED).unwrap();
        assert_eq!(config.localities.len(), 1);
        assert_eq!(config.products.len(), 2);
        assert_eq!(config.products[0].ration, 0.2);
        assert_eq!(config.products[1].category, None);
        assert_eq!(config.teams[0].headcount, 25);
        assert_eq!(config.teams[0].locality, "Coast");
    }

    #[test]
    fn test_parse_catalog_config_rejects_bad_toml() {
        let result = parse_catalog_config("[[products]]\nname = ");
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }

    #[test]
    fn test_load_catalog_config_missing_file() {
        let result = load_catalog_config("does/not/exist/catalog.toml");
        assert!(matches!(result.unwrap_err(), Error::Io(_)));
    }

    #[test]
    fn test_load_catalog_config_from_repository_file() {
        let config = load_catalog_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert!(!config.products.is_empty());
        assert!(config.teams.iter().all(|t| t.headcount > 0));
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_catalog_config(SEED)?;

        let first = seed_catalog(&db, &config).await?;
        assert_eq!(first, SeedSummary {
            localities_created: 1,
            products_created: 2,
            products_restored: 0,
            teams_created: 1,
        });

        let second = seed_catalog(&db, &config).await?;
        assert_eq!(second, SeedSummary::default());
        assert_eq!(product::get_all_active_products(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_restores_deleted_product() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_catalog_config(SEED)?;
        seed_catalog(&db, &config).await?;

        let salt = product::get_product_by_name(&db, "Salt").await?.unwrap();
        product::delete_product(&db, salt.id).await?;
        assert_eq!(product::load_catalog(&db).await?.len(), 1);

        let summary = seed_catalog(&db, &config).await?;
        assert_eq!(summary.products_restored, 1);
        let restored = product::get_product_by_id(&db, salt.id).await?.unwrap();
        assert!(!restored.is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_prefers_active_product() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_catalog_config(SEED)?;
        seed_catalog(&db, &config).await?;

        let old_salt = product::get_product_by_name(&db, "Salt").await?.unwrap();
        product::delete_product(&db, old_salt.id).await?;
        let salt = product::create_product(&db, config.products[1].clone().into()).await?;

        let summary = seed_catalog(&db, &config).await?;
        assert_eq!(summary, SeedSummary::default());

        let active_salt: Vec<_> = product::get_all_active_products(&db)
            .await?
            .into_iter()
            .filter(|p| p.name == "Salt")
            .collect();
        assert_eq!(active_salt.len(), 1);
        assert_eq!(active_salt[0].id, salt.id);
        assert!(product::get_product_by_id(&db, old_salt.id).await?.unwrap().is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_unknown_locality() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_catalog_config(
            r#"
            [[teams]]
            name = "Lost"
            locality = "Nowhere"
            headcount = 3
        "#,
        )?;

        let result = seed_catalog(&db, &config).await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
        Ok(())
    }
}
