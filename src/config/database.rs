//! Database connection and schema creation.
//!
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust models. Unique indexes enforce one daily row per team
//! and day, and one menu plan per team and month.

use crate::entities::{
    DailyNeed, Locality, MenuPlan, MenuSelection, ModificationRequest, Product, Team, daily_need,
    menu_plan,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};

/// Default location of the `SQLite` file.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/provisions.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the default path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Connects to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table and unique index that does not exist yet.
///
/// Parents are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Locality).await?;
    create_table(db, &schema, Team).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, DailyNeed).await?;
    create_table(db, &schema, MenuPlan).await?;
    create_table(db, &schema, MenuSelection).await?;
    create_table(db, &schema, ModificationRequest).await?;

    let daily_need_key = Index::create()
        .name("idx_daily_needs_team_date")
        .table(DailyNeed)
        .col(daily_need::Column::TeamId)
        .col(daily_need::Column::DateKey)
        .unique()
        .if_not_exists()
        .to_owned();
    let menu_plan_key = Index::create()
        .name("idx_menu_plans_team_month")
        .table(MenuPlan)
        .col(menu_plan::Column::TeamId)
        .col(menu_plan::Column::MonthKey)
        .unique()
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&daily_need_key)).await?;
    db.execute(builder.build(&menu_plan_key)).await?;

    Ok(())
}
