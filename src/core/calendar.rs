//! Daily calendar and month submission.
//!
//! Each team records per-meal headcounts day by day. A month is `Submitted` once every
//! existing row of that team and month is flagged submitted, and `Open` otherwise; a month
//! without rows is `Open`. Submission is a per-row batch without a global transaction, so
//! callers get one outcome per row and can simply retry.

use crate::{
    core::{
        calculator,
        period::{MonthKey, date_key, parse_date_key},
        product::{Catalog, load_catalog},
    },
    entities::{DailyNeed as DailyNeedEntity, MealSlot, Team, daily_need},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Headcount for each meal of a day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealHeadcounts {
    /// Breakfast headcount
    pub breakfast: u32,
    /// Lunch headcount
    pub lunch: u32,
    /// Dinner headcount
    pub dinner: u32,
}

impl MealHeadcounts {
    /// Same headcount for every meal.
    #[must_use]
    pub const fn uniform(headcount: u32) -> Self {
        Self {
            breakfast: headcount,
            lunch: headcount,
            dinner: headcount,
        }
    }

    /// Headcount of one meal.
    #[must_use]
    pub const fn get(&self, meal: MealSlot) -> u32 {
        match meal {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Dinner => self.dinner,
        }
    }

    /// Sum of the three meals. Display only; cost math always works per meal.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.breakfast
            .saturating_add(self.lunch)
            .saturating_add(self.dinner)
    }

    /// Reads the headcounts stored in a row.
    ///
    /// # Errors
    /// Returns `CorruptRecord` when a stored value does not fit a headcount.
    pub fn from_model(model: &daily_need::Model) -> Result<Self> {
        let convert = |value: i64| {
            u32::try_from(value).map_err(|_| Error::CorruptRecord {
                message: format!(
                    "daily need {} on {} has headcount {}",
                    model.team_id, model.date_key, value
                ),
            })
        };
        Ok(Self {
            breakfast: convert(model.breakfast)?,
            lunch: convert(model.lunch)?,
            dinner: convert(model.dinner)?,
        })
    }
}

/// Partial headcount update. Meals left as `None` keep their previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadcountUpdate {
    /// New breakfast headcount
    pub breakfast: Option<u32>,
    /// New lunch headcount
    pub lunch: Option<u32>,
    /// New dinner headcount
    pub dinner: Option<u32>,
}

impl HeadcountUpdate {
    /// Sets every meal to the same headcount.
    #[must_use]
    pub const fn all(headcount: u32) -> Self {
        Self {
            breakfast: Some(headcount),
            lunch: Some(headcount),
            dinner: Some(headcount),
        }
    }

    /// Sets one meal, keeping the others as they are in `self`.
    #[must_use]
    pub const fn with(mut self, meal: MealSlot, headcount: u32) -> Self {
        match meal {
            MealSlot::Breakfast => self.breakfast = Some(headcount),
            MealSlot::Lunch => self.lunch = Some(headcount),
            MealSlot::Dinner => self.dinner = Some(headcount),
        }
        self
    }

    /// Merges the update over `current`.
    #[must_use]
    pub fn apply(&self, current: MealHeadcounts) -> MealHeadcounts {
        MealHeadcounts {
            breakfast: self.breakfast.unwrap_or(current.breakfast),
            lunch: self.lunch.unwrap_or(current.lunch),
            dinner: self.dinner.unwrap_or(current.dinner),
        }
    }
}

/// Headcount of a meal and the raw quantity of every catalog product it requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealNeed {
    /// People eating this meal
    pub headcount: u32,
    /// Raw quantity keyed by product id
    pub provisions: BTreeMap<i64, f64>,
}

/// One team's needs for one day, with derived provisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNeed {
    /// Owning team
    pub team_id: i64,
    /// Calendar day
    pub date: NaiveDate,
    /// Breakfast
    pub breakfast: MealNeed,
    /// Lunch
    pub lunch: MealNeed,
    /// Dinner
    pub dinner: MealNeed,
    /// Sum of the meal headcounts, for display
    pub day_headcount: u32,
    /// Whether the day is part of a submitted calendar
    pub submitted: bool,
    /// When it was last submitted
    pub submitted_at: Option<DateTime<Utc>>,
}

impl DailyNeed {
    /// Needs of one meal.
    #[must_use]
    pub const fn meal(&self, meal: MealSlot) -> &MealNeed {
        match meal {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    /// Per-meal headcounts.
    #[must_use]
    pub const fn headcounts(&self) -> MealHeadcounts {
        MealHeadcounts {
            breakfast: self.breakfast.headcount,
            lunch: self.lunch.headcount,
            dinner: self.dinner.headcount,
        }
    }

    /// Rebuilds the derived view of a stored row against the current catalog.
    pub fn from_model(model: &daily_need::Model, catalog: &Catalog) -> Result<Self> {
        let date = parse_date_key(&model.date_key)?;
        let headcounts = MealHeadcounts::from_model(model)?;
        Ok(Self {
            submitted: model.submitted,
            submitted_at: model.submitted_at,
            ..compute_daily_need(model.team_id, date, headcounts, catalog)
        })
    }
}

/// Submission state of a team's month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarState {
    /// Editable; some row is unsubmitted or no row exists
    Open,
    /// Every row is submitted
    Submitted,
}

/// Outcome of writing one row during a batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSubmission {
    /// Day of the row
    pub date_key: String,
    /// Failure message, `None` on success
    pub error: Option<String>,
}

impl RowSubmission {
    /// Whether the row was written
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn meal_need(headcount: u32, catalog: &Catalog) -> MealNeed {
    MealNeed {
        headcount,
        provisions: catalog
            .iter()
            .map(|p| (p.id, calculator::raw_quantity(headcount, p.ration)))
            .collect(),
    }
}

/// Computes every meal's provisions from headcounts against the full catalog.
///
/// The result is unsubmitted; persistence decides what flag to keep.
#[must_use]
pub fn compute_daily_need(
    team_id: i64,
    date: NaiveDate,
    headcounts: MealHeadcounts,
    catalog: &Catalog,
) -> DailyNeed {
    DailyNeed {
        team_id,
        date,
        breakfast: meal_need(headcounts.breakfast, catalog),
        lunch: meal_need(headcounts.lunch, catalog),
        dinner: meal_need(headcounts.dinner, catalog),
        day_headcount: headcounts.total(),
        submitted: false,
        submitted_at: None,
    }
}

/// Whether a month's rows form a submitted calendar. An empty month is never submitted.
#[must_use]
pub fn is_submitted(needs: &[daily_need::Model]) -> bool {
    !needs.is_empty() && needs.iter().all(|n| n.submitted)
}

/// State of a month given its rows.
#[must_use]
pub fn calendar_state(needs: &[daily_need::Model]) -> CalendarState {
    if is_submitted(needs) {
        CalendarState::Submitted
    } else {
        CalendarState::Open
    }
}

/// Marks every row submitted at `now`. Applying it twice leaves the flags unchanged.
#[must_use]
pub fn submit_all(needs: &[daily_need::Model], now: DateTime<Utc>) -> Vec<daily_need::Model> {
    needs
        .iter()
        .map(|n| daily_need::Model {
            submitted: true,
            submitted_at: Some(now),
            ..n.clone()
        })
        .collect()
}

/// Clears the submitted flag on every row, keeping the last submission time.
#[must_use]
pub fn unlock_all(needs: &[daily_need::Model]) -> Vec<daily_need::Model> {
    needs
        .iter()
        .map(|n| daily_need::Model {
            submitted: false,
            ..n.clone()
        })
        .collect()
}

async fn ensure_team_exists(db: &DatabaseConnection, team_id: i64) -> Result<()> {
    Team::find_by_id(team_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or(Error::TeamNotFound { id: team_id })
}

/// Stored row of a team and day.
pub async fn get_daily_need_row(
    db: &DatabaseConnection,
    team_id: i64,
    date: NaiveDate,
) -> Result<Option<daily_need::Model>> {
    DailyNeedEntity::find()
        .filter(daily_need::Column::TeamId.eq(team_id))
        .filter(daily_need::Column::DateKey.eq(date_key(date)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Needs of a team on a day, with provisions computed from the current catalog.
pub async fn get_daily_need(
    db: &DatabaseConnection,
    team_id: i64,
    date: NaiveDate,
) -> Result<Option<DailyNeed>> {
    let Some(row) = get_daily_need_row(db, team_id, date).await? else {
        return Ok(None);
    };
    let catalog = load_catalog(db).await?;
    DailyNeed::from_model(&row, &catalog).map(Some)
}

/// Rows of a team for a month, ordered by day.
pub async fn get_month_rows(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
) -> Result<Vec<daily_need::Model>> {
    DailyNeedEntity::find()
        .filter(daily_need::Column::TeamId.eq(team_id))
        .filter(daily_need::Column::DateKey.starts_with(month.to_string()))
        .order_by_asc(daily_need::Column::DateKey)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Rows of every team for a month.
pub async fn get_all_month_rows(
    db: &DatabaseConnection,
    month: MonthKey,
) -> Result<Vec<daily_need::Model>> {
    DailyNeedEntity::find()
        .filter(daily_need::Column::DateKey.starts_with(month.to_string()))
        .order_by_asc(daily_need::Column::TeamId)
        .order_by_asc(daily_need::Column::DateKey)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Upserts a day's headcounts.
///
/// Meals missing from `update` keep their stored value (zero for a new row). The day total
/// is recomputed and the submitted flag is left as it was.
///
/// # Errors
/// Returns `TeamNotFound` when the team does not exist.
pub async fn set_daily_need(
    db: &DatabaseConnection,
    team_id: i64,
    date: NaiveDate,
    update: HeadcountUpdate,
) -> Result<DailyNeed> {
    ensure_team_exists(db, team_id).await?;
    let catalog = load_catalog(db).await?;
    let row = upsert_row(db, team_id, date, update).await?;
    DailyNeed::from_model(&row, &catalog)
}

async fn upsert_row(
    db: &DatabaseConnection,
    team_id: i64,
    date: NaiveDate,
    update: HeadcountUpdate,
) -> Result<daily_need::Model> {
    let existing = get_daily_need_row(db, team_id, date).await?;
    let current = existing
        .as_ref()
        .map(MealHeadcounts::from_model)
        .transpose()?
        .unwrap_or_default();
    let merged = update.apply(current);
    let now = Utc::now();

    let row = match existing {
        Some(row) => {
            let mut model: daily_need::ActiveModel = row.into();
            model.breakfast = Set(i64::from(merged.breakfast));
            model.lunch = Set(i64::from(merged.lunch));
            model.dinner = Set(i64::from(merged.dinner));
            model.day_headcount = Set(i64::from(merged.total()));
            model.updated_at = Set(now);
            model.update(db).await?
        }
        None => {
            daily_need::ActiveModel {
                team_id: Set(team_id),
                date_key: Set(date_key(date)),
                breakfast: Set(i64::from(merged.breakfast)),
                lunch: Set(i64::from(merged.lunch)),
                dinner: Set(i64::from(merged.dinner)),
                day_headcount: Set(i64::from(merged.total())),
                submitted: Set(false),
                submitted_at: Set(None),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };
    debug!(
        "Stored headcounts {:?} for team {} on {}",
        merged, team_id, row.date_key
    );
    Ok(row)
}

/// Applies the same update to every day of a month.
#[instrument(skip(db))]
pub async fn apply_headcounts_to_month(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
    update: HeadcountUpdate,
) -> Result<Vec<DailyNeed>> {
    ensure_team_exists(db, team_id).await?;
    let catalog = load_catalog(db).await?;

    let mut needs = Vec::new();
    for day in month.days() {
        let row = upsert_row(db, team_id, day, update).await?;
        needs.push(DailyNeed::from_model(&row, &catalog)?);
    }
    info!("Applied {:?} to {} days of {}", update, needs.len(), month);
    Ok(needs)
}

/// Whether a team's month is submitted.
pub async fn is_calendar_submitted(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
) -> Result<bool> {
    Ok(is_submitted(&get_month_rows(db, team_id, month).await?))
}

/// Guard for callers that must not edit a locked month.
///
/// # Errors
/// Returns `StateViolation` when the month is submitted.
pub async fn ensure_calendar_open(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
) -> Result<()> {
    if is_calendar_submitted(db, team_id, month).await? {
        return Err(Error::StateViolation {
            message: format!("calendar {month} of team {team_id} is submitted"),
        });
    }
    Ok(())
}

/// Submits every row of a team's month, one write per row.
///
/// Returns one outcome per row; an empty month yields an empty list. Failed rows are left
/// as they were and a retry is harmless.
#[instrument(skip(db))]
pub async fn submit_calendar(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
) -> Result<Vec<RowSubmission>> {
    let rows = get_month_rows(db, team_id, month).await?;
    let submitted = submit_all(&rows, Utc::now());

    let mut outcomes = Vec::with_capacity(submitted.len());
    for (row, target) in rows.into_iter().zip(submitted) {
        let date_key = row.date_key.clone();
        let mut model: daily_need::ActiveModel = row.into();
        model.submitted = Set(target.submitted);
        model.submitted_at = Set(target.submitted_at);

        let error = match model.update(db).await {
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to submit {} for team {}: {}", date_key, team_id, e);
                Some(e.to_string())
            }
        };
        outcomes.push(RowSubmission { date_key, error });
    }

    info!(
        "Submitted {}/{} rows of {} for team {}",
        outcomes.iter().filter(|o| o.is_ok()).count(),
        outcomes.len(),
        month,
        team_id
    );
    Ok(outcomes)
}

/// Clears the submitted flag on every row of a team's month. Returns the rows touched.
pub async fn unlock_calendar<C>(db: &C, team_id: i64, month: MonthKey) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = DailyNeedEntity::update_many()
        .col_expr(daily_need::Column::Submitted, Expr::value(false))
        .filter(daily_need::Column::TeamId.eq(team_id))
        .filter(daily_need::Column::DateKey.starts_with(month.to_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn row(date_key: &str, submitted: bool) -> daily_need::Model {
        daily_need::Model {
            id: 1,
            team_id: 1,
            date_key: date_key.to_string(),
            breakfast: 10,
            lunch: 10,
            dinner: 10,
            day_headcount: 30,
            submitted,
            submitted_at: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_submitted_edge_cases() {
        assert!(!is_submitted(&[]));
        assert!(is_submitted(&[
            row("2025-12-01", true),
            row("2025-12-02", true)
        ]));
        assert!(!is_submitted(&[
            row("2025-12-01", true),
            row("2025-12-02", false)
        ]));
        assert_eq!(calendar_state(&[]), CalendarState::Open);
    }

    #[test]
    fn test_submit_all_is_idempotent() {
        let rows = vec![row("2025-12-01", false), row("2025-12-02", true)];
        let first = submit_all(&rows, Utc::now());
        let second = submit_all(&first, Utc::now());

        assert!(is_submitted(&first));
        assert!(is_submitted(&second));
        assert!(second.iter().all(|r| r.submitted_at.is_some()));
        assert!(submit_all(&[], Utc::now()).is_empty());

        let unlocked = unlock_all(&second);
        assert!(unlocked.iter().all(|r| !r.submitted));
        assert!(unlocked.iter().all(|r| r.submitted_at.is_some()));
    }

    #[test]
    fn test_headcount_update_merges_unspecified_meals() {
        let current = MealHeadcounts {
            breakfast: 10,
            lunch: 20,
            dinner: 30,
        };
        let merged = HeadcountUpdate::default()
            .with(MealSlot::Lunch, 0)
            .apply(current);
        assert_eq!(merged, MealHeadcounts {
            breakfast: 10,
            lunch: 0,
            dinner: 30,
        });
        assert_eq!(merged.total(), 40);
        assert_eq!(HeadcountUpdate::all(5).apply(current), MealHeadcounts::uniform(5));
    }

    #[test]
    fn test_compute_daily_need_per_meal_provisions() {
        let catalog = Catalog::new(vec![
            sample_product(1, "Rice", 0.2, 50.0, 25_000.0, Some("Cereals")),
            sample_product(2, "Coffee", 0.01, 1.0, 5_000.0, Some("Drinks")),
        ]);
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let need = compute_daily_need(
            7,
            date,
            MealHeadcounts {
                breakfast: 25,
                lunch: 0,
                dinner: 10,
            },
            &catalog,
        );

        assert_eq!(need.day_headcount, 35);
        assert!(!need.submitted);
        assert_eq!(need.breakfast.provisions[&1], 5.0);
        assert_eq!(need.lunch.provisions[&1], 0.0);
        assert_eq!(need.meal(MealSlot::Dinner).provisions[&1], 2.0);
        assert_eq!(need.breakfast.provisions.len(), 2);
    }

    #[tokio::test]
    async fn test_set_daily_need_round_trip_keeps_unspecified_meals() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        crate::core::product::create_product(&db, rice()).await?;
        let date = NaiveDate::from_ymd_opt(2025, 12, 3).unwrap();

        let first = set_daily_need(&db, team.id, date, HeadcountUpdate {
            breakfast: Some(25),
            lunch: Some(20),
            dinner: Some(15),
        })
        .await?;
        assert_eq!(first.day_headcount, 60);

        set_daily_need(
            &db,
            team.id,
            date,
            HeadcountUpdate::default().with(MealSlot::Dinner, 5),
        )
        .await?;

        let read_back = get_daily_need(&db, team.id, date).await?.unwrap();
        assert_eq!(read_back.headcounts(), MealHeadcounts {
            breakfast: 25,
            lunch: 20,
            dinner: 5,
        });
        assert_eq!(read_back.day_headcount, 50);
        assert_eq!(DailyNeedEntity::find().count(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_daily_need_new_row_defaults_to_zero() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        let date = NaiveDate::from_ymd_opt(2025, 12, 4).unwrap();

        let need = set_daily_need(
            &db,
            team.id,
            date,
            HeadcountUpdate::default().with(MealSlot::Lunch, 12),
        )
        .await?;
        assert_eq!(need.headcounts(), MealHeadcounts {
            breakfast: 0,
            lunch: 12,
            dinner: 0,
        });

        let missing_team = set_daily_need(&db, 999, date, HeadcountUpdate::all(1)).await;
        assert!(matches!(
            missing_team.unwrap_err(),
            Error::TeamNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_calendar_locks_month() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        let month: MonthKey = "2025-12".parse()?;

        assert!(!is_calendar_submitted(&db, team.id, month).await?);
        assert!(submit_calendar(&db, team.id, month).await?.is_empty());
        assert!(!is_calendar_submitted(&db, team.id, month).await?);

        for day in 1..=3 {
            let date = NaiveDate::from_ymd_opt(2025, 12, day).unwrap();
            set_daily_need(&db, team.id, date, HeadcountUpdate::all(10)).await?;
        }
        // A row in the next month must stay untouched.
        let january = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        set_daily_need(&db, team.id, january, HeadcountUpdate::all(10)).await?;

        let outcomes = submit_calendar(&db, team.id, month).await?;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(RowSubmission::is_ok));
        assert!(is_calendar_submitted(&db, team.id, month).await?);
        assert!(ensure_calendar_open(&db, team.id, month).await.is_err());

        let next = get_daily_need_row(&db, team.id, january).await?.unwrap();
        assert!(!next.submitted);

        // Retrying is harmless.
        let retry = submit_calendar(&db, team.id, month).await?;
        assert_eq!(retry.len(), 3);
        assert!(is_calendar_submitted(&db, team.id, month).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_calendar_reports_failed_rows() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        let month: MonthKey = "2025-12".parse()?;
        for day in 1..=3 {
            let date = NaiveDate::from_ymd_opt(2025, 12, day).unwrap();
            set_daily_need(&db, team.id, date, HeadcountUpdate::all(10)).await?;
        }

        db.execute_unprepared(
            "CREATE TRIGGER reject_second_day BEFORE UPDATE ON daily_needs \
             WHEN NEW.date_key = '2025-12-02' \
             BEGIN SELECT RAISE(ABORT, 'row is read-only'); END;",
        )
        .await?;

        let outcomes = submit_calendar(&db, team.id, month).await?;
        assert_eq!(outcomes.len(), 3);
        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| o.date_key.as_str())
            .collect();
        assert_eq!(failed, vec!["2025-12-02"]);
        assert!(outcomes[1].error.as_deref().unwrap().contains("read-only"));

        let rows = get_month_rows(&db, team.id, month).await?;
        let flags: Vec<bool> = rows.iter().map(|r| r.submitted).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert!(!is_calendar_submitted(&db, team.id, month).await?);

        // Retrying once the row is writable again completes the batch.
        db.execute_unprepared("DROP TRIGGER reject_second_day;")
            .await?;
        let retry = submit_calendar(&db, team.id, month).await?;
        assert!(retry.iter().all(RowSubmission::is_ok));
        assert!(is_calendar_submitted(&db, team.id, month).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_daily_need_preserves_submitted_flag() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        let month: MonthKey = "2025-12".parse()?;
        let date = month.first_day();

        set_daily_need(&db, team.id, date, HeadcountUpdate::all(10)).await?;
        submit_calendar(&db, team.id, month).await?;

        let edited = set_daily_need(
            &db,
            team.id,
            date,
            HeadcountUpdate::default().with(MealSlot::Breakfast, 8),
        )
        .await?;
        assert!(edited.submitted);
        assert!(edited.submitted_at.is_some());
        assert_eq!(edited.breakfast.headcount, 8);

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_headcounts_to_month_and_unlock() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        let month: MonthKey = "2025-02".parse()?;

        let needs = apply_headcounts_to_month(&db, team.id, month, HeadcountUpdate::all(7)).await?;
        assert_eq!(needs.len(), 28);
        assert!(needs.iter().all(|n| n.day_headcount == 21));

        submit_calendar(&db, team.id, month).await?;
        assert!(is_calendar_submitted(&db, team.id, month).await?);

        let touched = unlock_calendar(&db, team.id, month).await?;
        assert_eq!(touched, 28);
        assert!(!is_calendar_submitted(&db, team.id, month).await?);
        ensure_calendar_open(&db, team.id, month).await?;

        Ok(())
    }
}
