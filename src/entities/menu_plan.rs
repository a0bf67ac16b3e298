//! Menu plan entity - Header of a team's weekly menu for one month.
//!
//! Unique on `(team_id, month_key)`. The per-weekday selections live in `menu_selections`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu plan database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_plans")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning team
    pub team_id: i64,
    /// Target month, `YYYY-MM`
    pub month_key: String,
    /// Last write
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `MenuPlan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each plan belongs to one team
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id"
    )]
    Team,
    /// One plan has many selections
    #[sea_orm(has_many = "super::menu_selection::Entity")]
    Selections,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::menu_selection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Selections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
