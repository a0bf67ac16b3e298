//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod daily_need;
pub mod locality;
pub mod menu_plan;
pub mod menu_selection;
pub mod modification_request;
pub mod product;
pub mod sea_orm_active_enums;
pub mod team;

// Re-export specific types to avoid conflicts
pub use daily_need::{Column as DailyNeedColumn, Entity as DailyNeed, Model as DailyNeedModel};
pub use locality::{Column as LocalityColumn, Entity as Locality, Model as LocalityModel};
pub use menu_plan::{Column as MenuPlanColumn, Entity as MenuPlan, Model as MenuPlanModel};
pub use menu_selection::{
    Column as MenuSelectionColumn, Entity as MenuSelection, Model as MenuSelectionModel,
};
pub use modification_request::{
    Column as ModificationRequestColumn, Entity as ModificationRequest,
    Model as ModificationRequestModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use sea_orm_active_enums::{MealSlot, RequestStatus};
pub use team::{Column as TeamColumn, Entity as Team, Model as TeamModel};
