//! Team business logic.
//!
//! Deleting a team removes everything it owns: daily headcount rows, menu plans and their
//! selections. Modification requests only reference the team and are left alone.

use crate::{
    entities::{
        DailyNeed, Locality, MenuPlan, MenuSelection, Team, daily_need, menu_plan, menu_selection,
        team,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Fields required to create a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    /// Home locality
    pub locality_id: i64,
    /// Display name
    pub name: String,
    /// Base headcount, at least 1
    pub headcount: u32,
    /// Person in charge
    pub responsible: String,
}

/// Settable team fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamUpdate {
    /// Move the team to another locality
    pub locality_id: Option<i64>,
    /// New name
    pub name: Option<String>,
    /// New base headcount
    pub headcount: Option<u32>,
    /// New person in charge
    pub responsible: Option<String>,
}

fn validate_team(name: &str, headcount: u32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidTeam {
            message: "Team name cannot be empty".to_string(),
        });
    }
    if headcount == 0 {
        return Err(Error::InvalidTeam {
            message: "Base headcount must be at least 1".to_string(),
        });
    }
    Ok(())
}

async fn ensure_locality_exists(db: &DatabaseConnection, locality_id: i64) -> Result<()> {
    Locality::find_by_id(locality_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or(Error::LocalityNotFound { id: locality_id })
}

/// Base headcount of a stored team.
///
/// # Errors
/// Returns `CorruptRecord` when the stored value is not a positive 32-bit count.
pub fn base_headcount(team: &team::Model) -> Result<u32> {
    u32::try_from(team.headcount)
        .ok()
        .filter(|h| *h > 0)
        .ok_or_else(|| Error::CorruptRecord {
            message: format!("team {} has headcount {}", team.id, team.headcount),
        })
}

/// Retrieves all teams ordered by name.
pub async fn get_all_teams(db: &DatabaseConnection) -> Result<Vec<team::Model>> {
    Team::find()
        .order_by_asc(team::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a team by id.
pub async fn get_team_by_id(
    db: &DatabaseConnection,
    team_id: i64,
) -> Result<Option<team::Model>> {
    Team::find_by_id(team_id).one(db).await.map_err(Into::into)
}

/// Finds a team by exact name.
pub async fn get_team_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<team::Model>> {
    Team::find()
        .filter(team::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Teams stationed at a locality.
pub async fn get_teams_for_locality(
    db: &DatabaseConnection,
    locality_id: i64,
) -> Result<Vec<team::Model>> {
    Team::find()
        .filter(team::Column::LocalityId.eq(locality_id))
        .order_by_asc(team::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a team in an existing locality.
///
/// # Errors
/// Returns `InvalidTeam` for an empty name or zero headcount, `LocalityNotFound` when the
/// locality does not exist.
pub async fn create_team(db: &DatabaseConnection, new: NewTeam) -> Result<team::Model> {
    validate_team(&new.name, new.headcount)?;
    ensure_locality_exists(db, new.locality_id).await?;

    let model = team::ActiveModel {
        locality_id: Set(new.locality_id),
        name: Set(new.name.trim().to_string()),
        headcount: Set(i64::from(new.headcount)),
        responsible: Set(new.responsible),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Applies a partial update.
pub async fn update_team(
    db: &DatabaseConnection,
    team_id: i64,
    update: TeamUpdate,
) -> Result<team::Model> {
    let existing = Team::find_by_id(team_id)
        .one(db)
        .await?
        .ok_or(Error::TeamNotFound { id: team_id })?;

    let name = update.name.unwrap_or_else(|| existing.name.clone());
    let headcount = match update.headcount {
        Some(h) => h,
        None => base_headcount(&existing)?,
    };
    validate_team(&name, headcount)?;
    if let Some(locality_id) = update.locality_id {
        ensure_locality_exists(db, locality_id).await?;
    }

    let mut model: team::ActiveModel = existing.into();
    if let Some(locality_id) = update.locality_id {
        model.locality_id = Set(locality_id);
    }
    model.name = Set(name.trim().to_string());
    model.headcount = Set(i64::from(headcount));
    if let Some(responsible) = update.responsible {
        model.responsible = Set(responsible);
    }

    model.update(db).await.map_err(Into::into)
}

/// Deletes a team together with the records it owns, in one transaction.
///
/// # Errors
/// Returns `TeamNotFound` for an unknown id.
pub async fn delete_team(db: &DatabaseConnection, team_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Team::find_by_id(team_id)
        .one(&txn)
        .await?
        .ok_or(Error::TeamNotFound { id: team_id })?;

    let plan_ids: Vec<i64> = MenuPlan::find()
        .filter(menu_plan::Column::TeamId.eq(team_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    if !plan_ids.is_empty() {
        MenuSelection::delete_many()
            .filter(menu_selection::Column::PlanId.is_in(plan_ids.clone()))
            .exec(&txn)
            .await?;
        MenuPlan::delete_many()
            .filter(menu_plan::Column::Id.is_in(plan_ids))
            .exec(&txn)
            .await?;
    }

    let needs = DailyNeed::delete_many()
        .filter(daily_need::Column::TeamId.eq(team_id))
        .exec(&txn)
        .await?;

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted team {} with {} daily need row(s)",
        team_id, needs.rows_affected
    );
    Ok(())
}
