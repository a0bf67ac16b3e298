//! Daily need entity - Per-meal headcounts of one team on one calendar day.
//!
//! Unique on `(team_id, date_key)`. Provision quantities are derived, not stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Daily need database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_needs")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning team
    pub team_id: i64,
    /// Calendar day, `YYYY-MM-DD`
    pub date_key: String,
    /// Breakfast headcount
    pub breakfast: i64,
    /// Lunch headcount
    pub lunch: i64,
    /// Dinner headcount
    pub dinner: i64,
    /// Sum of the three meal headcounts, kept for display
    pub day_headcount: i64,
    /// Whether the day belongs to a submitted calendar
    pub submitted: bool,
    /// Last time `submitted` was set
    pub submitted_at: Option<DateTimeUtc>,
    /// Last write
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `DailyNeed` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one team
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id"
    )]
    Team,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
