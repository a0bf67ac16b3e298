//! Team entity - A group of people fed from the same provisioning plan.
//!
//! A team owns its daily headcount rows and its monthly menu plans.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Team database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    /// Unique identifier for the team
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Home locality
    pub locality_id: i64,
    /// Display name
    pub name: String,
    /// Base headcount used when a day has no override (always at least 1)
    pub headcount: i64,
    /// Name of the person in charge
    pub responsible: String,
}

/// Defines relationships between Team and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each team belongs to one locality
    #[sea_orm(
        belongs_to = "super::locality::Entity",
        from = "Column::LocalityId",
        to = "super::locality::Column::Id"
    )]
    Locality,
    /// One team has many daily headcount rows
    #[sea_orm(has_many = "super::daily_need::Entity")]
    DailyNeeds,
    /// One team has many monthly menu plans
    #[sea_orm(has_many = "super::menu_plan::Entity")]
    MenuPlans,
}

impl Related<super::locality::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locality.def()
    }
}

impl Related<super::daily_need::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyNeeds.def()
    }
}

impl Related<super::menu_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuPlans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
