//! Menu selection entity - One product picked for one meal of one weekday.

use super::sea_orm_active_enums::MealSlot;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu selection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_selections")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning plan
    pub plan_id: i64,
    /// Day of week, 0 = Monday .. 6 = Sunday
    pub weekday: i32,
    /// Meal slot
    pub meal: MealSlot,
    /// Selected product; may outlive the product itself
    pub product_id: i64,
}

/// Defines relationships between `MenuSelection` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each selection belongs to one plan
    #[sea_orm(
        belongs_to = "super::menu_plan::Entity",
        from = "Column::PlanId",
        to = "super::menu_plan::Column::Id"
    )]
    MenuPlan,
}

impl Related<super::menu_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuPlan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
