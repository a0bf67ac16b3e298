//! Locality entity - A place where teams are stationed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Locality database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "localities")]
pub struct Model {
    /// Unique identifier for the locality
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Administrative region
    pub region: String,
    /// Free-text description
    pub description: String,
}

/// Defines relationships between Locality and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One locality hosts many teams
    #[sea_orm(has_many = "super::team::Entity")]
    Teams,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
