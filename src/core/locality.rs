//! Locality business logic.
//!
//! A locality cannot be deleted while any team is still assigned to it.

use crate::{
    entities::{Locality, Team, locality, team},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Fields required to create a locality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocality {
    /// Display name
    pub name: String,
    /// Administrative region
    pub region: String,
    /// Free-text description
    pub description: String,
}

/// Settable locality fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalityUpdate {
    /// New name
    pub name: Option<String>,
    /// New region
    pub region: Option<String>,
    /// New description
    pub description: Option<String>,
}

/// Retrieves all localities ordered by name.
pub async fn get_all_localities(db: &DatabaseConnection) -> Result<Vec<locality::Model>> {
    Locality::find()
        .order_by_asc(locality::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a locality by id.
pub async fn get_locality_by_id(
    db: &DatabaseConnection,
    locality_id: i64,
) -> Result<Option<locality::Model>> {
    Locality::find_by_id(locality_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a locality by exact name.
pub async fn get_locality_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<locality::Model>> {
    Locality::find()
        .filter(locality::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a locality.
pub async fn create_locality(
    db: &DatabaseConnection,
    new: NewLocality,
) -> Result<locality::Model> {
    if new.name.trim().is_empty() {
        return Err(Error::InvalidTeam {
            message: "Locality name cannot be empty".to_string(),
        });
    }

    let model = locality::ActiveModel {
        name: Set(new.name.trim().to_string()),
        region: Set(new.region),
        description: Set(new.description),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Applies a partial update.
pub async fn update_locality(
    db: &DatabaseConnection,
    locality_id: i64,
    update: LocalityUpdate,
) -> Result<locality::Model> {
    let existing = Locality::find_by_id(locality_id)
        .one(db)
        .await?
        .ok_or(Error::LocalityNotFound { id: locality_id })?;

    let mut model: locality::ActiveModel = existing.into();
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(Error::InvalidTeam {
                message: "Locality name cannot be empty".to_string(),
            });
        }
        model.name = Set(name.trim().to_string());
    }
    if let Some(region) = update.region {
        model.region = Set(region);
    }
    if let Some(description) = update.description {
        model.description = Set(description);
    }

    model.update(db).await.map_err(Into::into)
}

/// Deletes a locality that has no teams.
///
/// # Errors
/// Returns `LocalityNotFound` for an unknown id (including a second delete) and
/// `LocalityInUse` while teams still reference the locality.
pub async fn delete_locality(db: &DatabaseConnection, locality_id: i64) -> Result<()> {
    let existing = Locality::find_by_id(locality_id)
        .one(db)
        .await?
        .ok_or(Error::LocalityNotFound { id: locality_id })?;

    let team_count = Team::find()
        .filter(team::Column::LocalityId.eq(locality_id))
        .count(db)
        .await?;
    if team_count > 0 {
        return Err(Error::LocalityInUse {
            id: locality_id,
            team_count,
        });
    }

    existing.delete(db).await?;
    info!("Deleted locality {}", locality_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_update_locality() -> Result<()> {
        let db = setup_test_db().await?;
        let locality = create_test_locality(&db, "Kaya").await?;
        assert_eq!(locality.name, "Kaya");

        let updated = update_locality(&db, locality.id, LocalityUpdate {
            region: Some("Centre-Nord".to_string()),
            ..Default::default()
        })
        .await?;
        assert_eq!(updated.name, "Kaya");
        assert_eq!(updated.region, "Centre-Nord");

        let found = get_locality_by_name(&db, "Kaya").await?.unwrap();
        assert_eq!(found.id, locality.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_locality_with_teams_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let locality = create_test_locality(&db, "Kaya").await?;
        create_test_team(&db, locality.id, "Alpha", 25).await?;

        let result = delete_locality(&db, locality.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::LocalityInUse { team_count: 1, .. }
        ));
        assert!(get_locality_by_id(&db, locality.id).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_empty_locality_twice() -> Result<()> {
        let db = setup_test_db().await?;
        let locality = create_test_locality(&db, "Dori").await?;

        delete_locality(&db, locality.id).await?;
        assert!(get_all_localities(&db).await?.is_empty());

        let again = delete_locality(&db, locality.id).await;
        assert!(matches!(again.unwrap_err(), Error::LocalityNotFound { .. }));

        Ok(())
    }
}
