//! Weekly menu planner.
//!
//! A team picks, for each weekday and meal slot, the products served. Applied to a month,
//! the plan is walked day by day and every selected product contributes
//! `effective headcount * ration` for that day and meal. The sums are left un-rounded;
//! packaging is applied later, once, on the monthly total.

use crate::{
    core::{calculator, period::MonthKey, period::weekday_from_index, product::Catalog},
    entities::{MealSlot, MenuPlan, MenuSelection, Team, menu_plan, menu_selection},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, Weekday};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Products served at each meal of one weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMenu {
    /// Breakfast product ids
    pub breakfast: Vec<i64>,
    /// Lunch product ids
    pub lunch: Vec<i64>,
    /// Dinner product ids
    pub dinner: Vec<i64>,
}

impl DayMenu {
    /// Product ids for one meal.
    #[must_use]
    pub fn products(&self, meal: MealSlot) -> &[i64] {
        match meal {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    fn products_mut(&mut self, meal: MealSlot) -> &mut Vec<i64> {
        match meal {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }
}

/// Selections for the seven weekdays, Monday first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyMenu {
    days: [DayMenu; 7],
}

impl WeeklyMenu {
    /// Menu of one weekday.
    #[must_use]
    pub fn day(&self, weekday: Weekday) -> &DayMenu {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    /// Adds a product to a meal; selecting twice has no effect.
    pub fn select(&mut self, weekday: Weekday, meal: MealSlot, product_id: i64) {
        let products = self.days[weekday.num_days_from_monday() as usize].products_mut(meal);
        if !products.contains(&product_id) {
            products.push(product_id);
        }
    }

    /// Removes a product from a meal.
    pub fn deselect(&mut self, weekday: Weekday, meal: MealSlot, product_id: i64) {
        self.days[weekday.num_days_from_monday() as usize]
            .products_mut(meal)
            .retain(|id| *id != product_id);
    }

    /// Flips a product's selection state for a meal.
    pub fn toggle(&mut self, weekday: Weekday, meal: MealSlot, product_id: i64) {
        if self.day(weekday).products(meal).contains(&product_id) {
            self.deselect(weekday, meal, product_id);
        } else {
            self.select(weekday, meal, product_id);
        }
    }

    /// Every `(weekday, meal, product_id)` triple, Monday first.
    pub fn selections(&self) -> impl Iterator<Item = (Weekday, MealSlot, i64)> + '_ {
        crate::core::period::WEEKDAYS
            .iter()
            .zip(self.days.iter())
            .flat_map(|(weekday, day)| {
                MealSlot::ALL.into_iter().flat_map(move |meal| {
                    day.products(meal)
                        .iter()
                        .map(move |product_id| (*weekday, meal, *product_id))
                })
            })
    }

    /// Whether nothing is selected on any day.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections().next().is_none()
    }
}

/// A team's menu for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMenuPlan {
    /// Owning team
    pub team_id: i64,
    /// Target month
    pub month: MonthKey,
    /// Weekday selections
    pub menu: WeeklyMenu,
}

/// Summed raw need of one product for one meal slot over a month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRawNeed {
    /// Product id
    pub product_id: i64,
    /// Meal slot
    pub meal: MealSlot,
    /// Un-rounded quantity summed over every day of the month
    pub raw_quantity: f64,
}

/// Result of applying a weekly menu to a month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuExpansion {
    /// Needs ordered by product id, then meal slot
    pub needs: Vec<MonthlyRawNeed>,
    /// Selected product ids absent from the catalog
    pub missing_products: Vec<i64>,
}

/// Applies a weekly menu to every day of `month`.
///
/// `headcount` gives the effective headcount of a day and meal; callers pass the
/// team's daily override when one exists and its base headcount otherwise.
pub fn expand_menu_to_month(
    menu: &WeeklyMenu,
    month: MonthKey,
    catalog: &Catalog,
    headcount: impl Fn(NaiveDate, MealSlot) -> u32,
) -> MenuExpansion {
    let mut sums: BTreeMap<(i64, MealSlot), f64> = BTreeMap::new();
    let mut missing = BTreeSet::new();

    for day in month.days() {
        let day_menu = menu.day(day.weekday());
        for meal in MealSlot::ALL {
            for &product_id in day_menu.products(meal) {
                let Some(product) = catalog.get(product_id) else {
                    missing.insert(product_id);
                    continue;
                };
                *sums.entry((product_id, meal)).or_default() +=
                    calculator::raw_quantity(headcount(day, meal), product.ration);
            }
        }
    }

    MenuExpansion {
        needs: sums
            .into_iter()
            .map(|((product_id, meal), raw_quantity)| MonthlyRawNeed {
                product_id,
                meal,
                raw_quantity,
            })
            .collect(),
        missing_products: missing.into_iter().collect(),
    }
}

fn menu_from_rows(rows: Vec<menu_selection::Model>) -> WeeklyMenu {
    let mut menu = WeeklyMenu::default();
    for row in rows {
        if let Some(weekday) = weekday_from_index(row.weekday) {
            menu.select(weekday, row.meal, row.product_id);
        } else {
            debug!("Ignoring selection {} with weekday {}", row.id, row.weekday);
        }
    }
    menu
}

async fn load_menu<C>(db: &C, plan_id: i64) -> Result<WeeklyMenu>
where
    C: ConnectionTrait,
{
    let rows = MenuSelection::find()
        .filter(menu_selection::Column::PlanId.eq(plan_id))
        .order_by_asc(menu_selection::Column::Id)
        .all(db)
        .await?;
    Ok(menu_from_rows(rows))
}

async fn find_plan<C>(db: &C, team_id: i64, month: MonthKey) -> Result<Option<menu_plan::Model>>
where
    C: ConnectionTrait,
{
    MenuPlan::find()
        .filter(menu_plan::Column::TeamId.eq(team_id))
        .filter(menu_plan::Column::MonthKey.eq(month.to_string()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates or replaces the menu of a team for a month.
///
/// # Errors
/// Returns `TeamNotFound` when the team does not exist.
pub async fn save_menu_plan(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
    menu: &WeeklyMenu,
) -> Result<menu_plan::Model> {
    let txn = db.begin().await?;

    if Team::find_by_id(team_id).one(&txn).await?.is_none() {
        return Err(Error::TeamNotFound { id: team_id });
    }

    let now = chrono::Utc::now();
    let plan = match find_plan(&txn, team_id, month).await? {
        Some(existing) => {
            MenuSelection::delete_many()
                .filter(menu_selection::Column::PlanId.eq(existing.id))
                .exec(&txn)
                .await?;
            let mut model: menu_plan::ActiveModel = existing.into();
            model.updated_at = Set(now);
            model.update(&txn).await?
        }
        None => {
            menu_plan::ActiveModel {
                team_id: Set(team_id),
                month_key: Set(month.to_string()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let rows: Vec<menu_selection::ActiveModel> = menu
        .selections()
        .map(|(weekday, meal, product_id)| menu_selection::ActiveModel {
            plan_id: Set(plan.id),
            weekday: Set(i32::try_from(weekday.num_days_from_monday()).unwrap_or_default()),
            meal: Set(meal),
            product_id: Set(product_id),
            ..Default::default()
        })
        .collect();
    let selection_count = rows.len();
    if !rows.is_empty() {
        MenuSelection::insert_many(rows).exec(&txn).await?;
    }

    txn.commit().await?;
    info!(
        "Saved menu plan for team {} in {} ({} selections)",
        team_id, month, selection_count
    );
    Ok(plan)
}

/// Loads the menu of a team for a month; `None` when no menu is configured.
pub async fn get_menu_plan(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
) -> Result<Option<WeeklyMenu>> {
    match find_plan(db, team_id, month).await? {
        Some(plan) => Ok(Some(load_menu(db, plan.id).await?)),
        None => Ok(None),
    }
}

/// Loads every team's menu for a month.
pub async fn get_month_menu_plans(
    db: &DatabaseConnection,
    month: MonthKey,
) -> Result<Vec<TeamMenuPlan>> {
    let plans = MenuPlan::find()
        .filter(menu_plan::Column::MonthKey.eq(month.to_string()))
        .order_by_asc(menu_plan::Column::TeamId)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(plans.len());
    for plan in plans {
        result.push(TeamMenuPlan {
            team_id: plan.team_id,
            month,
            menu: load_menu(db, plan.id).await?,
        });
    }
    Ok(result)
}

/// Removes a team's menu for a month. Returns whether a plan existed.
pub async fn delete_menu_plan(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
) -> Result<bool> {
    let txn = db.begin().await?;
    let Some(plan) = find_plan(&txn, team_id, month).await? else {
        return Ok(false);
    };

    MenuSelection::delete_many()
        .filter(menu_selection::Column::PlanId.eq(plan.id))
        .exec(&txn)
        .await?;
    plan.delete(&txn).await?;
    txn.commit().await?;
    Ok(true)
}
