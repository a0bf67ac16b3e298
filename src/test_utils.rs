//! Shared test utilities for the provisioning planner.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        locality::{self, NewLocality},
        product::NewProduct,
        team::{self, NewTeam},
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Rice: 0.2 kg per person per meal, 50 kg sacks at 25 000.
#[must_use]
pub fn rice() -> NewProduct {
    NewProduct {
        name: "Rice".to_string(),
        unit: "kg".to_string(),
        ration: 0.2,
        package_size: 50.0,
        package_kind: "sack".to_string(),
        unit_price: 25_000.0,
        category: Some("Cereals".to_string()),
    }
}

/// Coffee: 0.01 kg per person per meal, 1 kg tins at 5 000, no category.
#[must_use]
pub fn coffee() -> NewProduct {
    NewProduct {
        name: "Coffee".to_string(),
        unit: "kg".to_string(),
        ration: 0.01,
        package_size: 1.0,
        package_kind: "tin".to_string(),
        unit_price: 5_000.0,
        category: None,
    }
}

/// Builds an active product model without touching the database.
#[must_use]
pub fn sample_product(
    id: i64,
    name: &str,
    ration: f64,
    package_size: f64,
    unit_price: f64,
    category: Option<&str>,
) -> entities::product::Model {
    let now = chrono::Utc::now().naive_utc();
    entities::product::Model {
        id,
        name: name.to_string(),
        unit: "kg".to_string(),
        ration,
        package_size,
        package_kind: "sack".to_string(),
        unit_price,
        category: category.map(str::to_string),
        is_deleted: false,
        created_at: now,
        updated_at: now,
    }
}

/// Builds a team model without touching the database.
#[must_use]
pub fn sample_team(id: i64, name: &str, headcount: i64) -> entities::team::Model {
    entities::team::Model {
        id,
        locality_id: 1,
        name: name.to_string(),
        headcount,
        responsible: "Lead".to_string(),
    }
}

/// Creates a test locality with a default region and description.
pub async fn create_test_locality(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::locality::Model> {
    locality::create_locality(db, NewLocality {
        name: name.to_string(),
        region: "Test Region".to_string(),
        description: String::new(),
    })
    .await
}

/// Creates a test team in `locality_id`.
pub async fn create_test_team(
    db: &DatabaseConnection,
    locality_id: i64,
    name: &str,
    headcount: u32,
) -> Result<entities::team::Model> {
    team::create_team(db, NewTeam {
        locality_id,
        name: name.to_string(),
        headcount,
        responsible: "Lead".to_string(),
    })
    .await
}

/// Sets up a complete test environment with a locality and one team of 10.
/// Returns (db, team) for common test scenarios.
pub async fn setup_with_team() -> Result<(DatabaseConnection, entities::team::Model)> {
    let db = setup_test_db().await?;
    let locality = create_test_locality(&db, "Test Locality").await?;
    let team = create_test_team(&db, locality.id, "Test Team", 10).await?;
    Ok((db, team))
}
