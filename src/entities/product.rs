//! Product entity - A provision item with its ration, packaging and price.
//!
//! Products are soft-deleted so that menu plans created earlier keep pointing at a
//! stable id; aggregation skips ids that are no longer in the active catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Rice", "Cooking oil")
    pub name: String,
    /// Measurement unit (e.g., "kg", "L", "unit")
    pub unit: String,
    /// Quantity consumed per person per meal, in `unit`
    pub ration: f64,
    /// Size of one packaging unit, in `unit`
    pub package_size: f64,
    /// Packaging label (e.g., "Sack", "Can")
    pub package_kind: String,
    /// Price of one packaging unit
    pub unit_price: f64,
    /// Optional category label (e.g., "Cereals")
    pub category: Option<String>,
    /// Soft delete flag - if true, product is hidden but plans keep the id
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Products are referenced by id only; no foreign keys point at them.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
