//! Monthly aggregation and reporting.
//!
//! Turns menus, daily headcounts and the catalog into per-team and global provisioning
//! reports. Packaging is rounded once per team, product and meal, and once per team and
//! product on the summed raw need. Global totals add the team figures without re-rounding,
//! since each team's packages are already a purchase commitment.
//!
//! Plans or rows pointing at a team or product that no longer exists are skipped and
//! listed in the report instead of failing it.

use crate::{
    core::{
        calculator::{self, ProvisionLine},
        calendar::{self, MealHeadcounts},
        menu::{self, TeamMenuPlan},
        period::{MonthKey, parse_date_key},
        product::{Catalog, load_catalog},
        team::{base_headcount, get_all_teams},
    },
    entities::{MealSlot, daily_need, team},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt::Write as _,
};
use tracing::{info, instrument, warn};

/// Category label for products without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A reference aggregation could not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkippedReference {
    /// A plan or daily row belongs to an unknown team
    Team {
        /// Missing team id
        team_id: i64,
    },
    /// A team's menu selects a product missing from the catalog
    Product {
        /// Team whose menu holds the selection
        team_id: i64,
        /// Missing product id
        product_id: i64,
    },
    /// A team whose stored headcounts cannot be read
    CorruptTeam {
        /// Team left out of the report
        team_id: i64,
    },
}

/// One product in one team's report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBreakdown {
    /// Product id
    pub product_id: i64,
    /// Product name
    pub name: String,
    /// Measurement unit
    pub unit: String,
    /// Category label, if any
    pub category: Option<String>,
    /// Line per meal slot served with this product
    pub meals: BTreeMap<MealSlot, ProvisionLine>,
    /// Month total, rounded from the summed raw need
    pub total: ProvisionLine,
}

/// A team's provisioning for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    /// Team id
    pub team_id: i64,
    /// Team name
    pub team_name: String,
    /// Reported month
    pub month: MonthKey,
    /// Whether a menu was configured for the month
    pub has_menu: bool,
    /// Products, costliest first
    pub products: Vec<ProductBreakdown>,
    /// Sum of the product totals
    pub total_cost: f64,
    /// Sum of the per-meal costs of every product
    pub meal_costs: BTreeMap<MealSlot, f64>,
    /// Mean effective headcount per meal over the month, display only
    pub average_meal_headcount: f64,
    /// Unresolved references met while aggregating
    pub skipped: Vec<SkippedReference>,
}

/// A product across all teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTotal {
    /// Product id
    pub product_id: i64,
    /// Product name
    pub name: String,
    /// Measurement unit
    pub unit: String,
    /// Packaging label
    pub package_kind: String,
    /// Category label, [`UNCATEGORIZED`] when absent
    pub category: String,
    /// Sum of the team totals
    pub line: ProvisionLine,
    /// Share of the global budget; `None` when the budget is zero
    pub percent_of_budget: Option<f64>,
}

/// Products grouped by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Category label
    pub category: String,
    /// Number of products in the group
    pub product_count: usize,
    /// Summed cost
    pub cost: f64,
    /// Share of the global budget; `None` when the budget is zero
    pub percent_of_budget: Option<f64>,
}

/// Costs of one team per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    /// Team id
    pub team_id: i64,
    /// Team name
    pub team_name: String,
    /// Cost keyed by product id
    pub costs: BTreeMap<i64, f64>,
    /// Row total
    pub total: f64,
}

/// Team by product cost table with its totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostMatrix {
    /// Product ids in column order
    pub product_ids: Vec<i64>,
    /// One row per team
    pub rows: Vec<MatrixRow>,
    /// Column totals keyed by product id
    pub column_totals: BTreeMap<i64, f64>,
    /// Sum of every cell
    pub grand_total: f64,
}

/// Consolidated provisioning for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalReport {
    /// Reported month
    pub month: MonthKey,
    /// One report per team
    pub teams: Vec<TeamReport>,
    /// Products, costliest first
    pub products: Vec<ProductTotal>,
    /// Categories, costliest first
    pub categories: Vec<CategoryTotal>,
    /// Sum of every product cost
    pub budget: f64,
    /// Team by product costs
    pub matrix: CostMatrix,
    /// Every unresolved reference, teams and products alike
    pub skipped: Vec<SkippedReference>,
}

/// Everything aggregation needs for a month, loaded once and owned by the caller.
#[derive(Debug, Clone)]
pub struct MonthSnapshot {
    /// Month of the snapshot
    pub month: MonthKey,
    /// All teams
    pub teams: Vec<team::Model>,
    /// Active products
    pub catalog: Catalog,
    /// Menu plans of the month
    pub plans: Vec<TeamMenuPlan>,
    /// Daily rows of the month
    pub needs: Vec<daily_need::Model>,
}

impl MonthSnapshot {
    /// Loads teams, catalog, plans and daily rows for `month`.
    pub async fn load(db: &DatabaseConnection, month: MonthKey) -> Result<Self> {
        Ok(Self {
            month,
            teams: get_all_teams(db).await?,
            catalog: load_catalog(db).await?,
            plans: menu::get_month_menu_plans(db, month).await?,
            needs: calendar::get_all_month_rows(db, month).await?,
        })
    }

    /// Builds the global report from the snapshot.
    #[must_use]
    pub fn aggregate(&self) -> GlobalReport {
        aggregate_global(&self.teams, &self.catalog, &self.plans, &self.needs, self.month)
    }
}

/// Share of `budget` taken by `cost`, in percent. `None` when the budget is zero.
#[must_use]
pub fn percent_of_budget(cost: f64, budget: f64) -> Option<f64> {
    (budget > 0.0).then(|| cost / budget * 100.0)
}

fn cost_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn headcount_overrides(
    team_id: i64,
    needs: &[daily_need::Model],
    month: MonthKey,
) -> Result<BTreeMap<NaiveDate, MealHeadcounts>> {
    needs
        .iter()
        .filter(|n| n.team_id == team_id && month.contains_key(&n.date_key))
        .map(|n| Ok((parse_date_key(&n.date_key)?, MealHeadcounts::from_model(n)?)))
        .collect()
}

/// Aggregates one team's month.
///
/// A day's headcount comes from its daily row when one exists, explicit zeros included,
/// and from the team's base headcount otherwise. A team without a menu for the month
/// costs nothing.
pub fn aggregate_team(
    team: &team::Model,
    catalog: &Catalog,
    plans: &[TeamMenuPlan],
    needs: &[daily_need::Model],
    month: MonthKey,
) -> Result<TeamReport> {
    let base = base_headcount(team)?;
    let overrides = headcount_overrides(team.id, needs, month)?;
    let effective = |day: NaiveDate, meal: MealSlot| {
        overrides.get(&day).map_or(base, |headcounts| headcounts.get(meal))
    };

    let mut meal_costs: BTreeMap<MealSlot, f64> =
        MealSlot::ALL.into_iter().map(|meal| (meal, 0.0)).collect();
    let mut products = Vec::new();
    let mut skipped = Vec::new();

    let plan = plans
        .iter()
        .find(|plan| plan.team_id == team.id && plan.month == month);
    if let Some(plan) = plan {
        let expansion = menu::expand_menu_to_month(&plan.menu, month, catalog, &effective);
        for &product_id in &expansion.missing_products {
            warn!(
                "Team {} selects product {} which is not in the catalog",
                team.id, product_id
            );
            skipped.push(SkippedReference::Product {
                team_id: team.id,
                product_id,
            });
        }

        let mut grouped: BTreeMap<i64, BTreeMap<MealSlot, f64>> = BTreeMap::new();
        for need in expansion.needs {
            grouped
                .entry(need.product_id)
                .or_default()
                .insert(need.meal, need.raw_quantity);
        }

        for (product_id, raws) in grouped {
            let Some(product) = catalog.get(product_id) else {
                continue;
            };
            let meals: BTreeMap<MealSlot, ProvisionLine> = raws
                .iter()
                .map(|(&meal, &raw)| (meal, calculator::provision_line(raw, product)))
                .collect();
            for (meal, line) in &meals {
                *meal_costs.entry(*meal).or_default() += line.cost;
            }
            products.push(ProductBreakdown {
                product_id,
                name: product.name.clone(),
                unit: product.unit.clone(),
                category: product.category.clone(),
                meals,
                total: calculator::provision_line(raws.values().sum(), product),
            });
        }
    }

    products.sort_by(|a, b| {
        cost_desc(a.total.cost, b.total.cost).then_with(|| a.name.cmp(&b.name))
    });
    let total_cost = products.iter().map(|p| p.total.cost).sum();

    let meal_days = f64::from(month.days_in_month()) * 3.0;
    let headcount_sum: f64 = month
        .days()
        .flat_map(|day| MealSlot::ALL.map(|meal| f64::from(effective(day, meal))))
        .sum();

    Ok(TeamReport {
        team_id: team.id,
        team_name: team.name.clone(),
        month,
        has_menu: plan.is_some(),
        products,
        total_cost,
        meal_costs,
        average_meal_headcount: headcount_sum / meal_days,
        skipped,
    })
}

fn cost_matrix(teams: &[TeamReport], products: &[ProductTotal]) -> CostMatrix {
    let rows: Vec<MatrixRow> = teams
        .iter()
        .map(|team| MatrixRow {
            team_id: team.team_id,
            team_name: team.team_name.clone(),
            costs: team
                .products
                .iter()
                .map(|p| (p.product_id, p.total.cost))
                .collect(),
            total: team.total_cost,
        })
        .collect();

    CostMatrix {
        product_ids: products.iter().map(|p| p.product_id).collect(),
        column_totals: products
            .iter()
            .map(|p| (p.product_id, p.line.cost))
            .collect(),
        grand_total: rows.iter().map(|r| r.total).sum(),
        rows,
    }
}

fn category_totals(products: &[ProductTotal], budget: f64) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for product in products {
        let entry = groups.entry(product.category.as_str()).or_default();
        entry.0 += 1;
        entry.1 += product.line.cost;
    }

    let mut categories: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, (product_count, cost))| CategoryTotal {
            category: category.to_string(),
            product_count,
            cost,
            percent_of_budget: percent_of_budget(cost, budget),
        })
        .collect();
    categories.sort_by(|a, b| cost_desc(a.cost, b.cost).then_with(|| a.category.cmp(&b.category)));
    categories
}

/// Aggregates every team's month and consolidates the totals.
///
/// A team whose base headcount or daily rows cannot be read is left out and reported as
/// [`SkippedReference::CorruptTeam`]; the other teams are still aggregated.
#[must_use]
pub fn aggregate_global(
    teams: &[team::Model],
    catalog: &Catalog,
    plans: &[TeamMenuPlan],
    needs: &[daily_need::Model],
    month: MonthKey,
) -> GlobalReport {
    let known: BTreeSet<i64> = teams.iter().map(|t| t.id).collect();
    let unknown_teams: BTreeSet<i64> = plans
        .iter()
        .filter(|p| p.month == month)
        .map(|p| p.team_id)
        .chain(
            needs
                .iter()
                .filter(|n| month.contains_key(&n.date_key))
                .map(|n| n.team_id),
        )
        .filter(|id| !known.contains(id))
        .collect();
    for team_id in &unknown_teams {
        warn!("Skipping data of unknown team {}", team_id);
    }
    let mut skipped: Vec<SkippedReference> = unknown_teams
        .into_iter()
        .map(|team_id| SkippedReference::Team { team_id })
        .collect();

    let mut reports = Vec::with_capacity(teams.len());
    for team in teams {
        match aggregate_team(team, catalog, plans, needs, month) {
            Ok(report) => {
                skipped.extend_from_slice(&report.skipped);
                reports.push(report);
            }
            Err(e) => {
                warn!("Skipping team {} from the {} report: {}", team.id, month, e);
                skipped.push(SkippedReference::CorruptTeam { team_id: team.id });
            }
        }
    }

    let mut lines: BTreeMap<i64, ProvisionLine> = BTreeMap::new();
    for report in &reports {
        for product in &report.products {
            *lines.entry(product.product_id).or_default() += product.total;
        }
    }
    let budget: f64 = lines.values().map(|line| line.cost).sum();

    let mut products: Vec<ProductTotal> = lines
        .into_iter()
        .filter_map(|(product_id, line)| {
            let product = catalog.get(product_id)?;
            Some(ProductTotal {
                product_id,
                name: product.name.clone(),
                unit: product.unit.clone(),
                package_kind: product.package_kind.clone(),
                category: product
                    .category
                    .clone()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                line,
                percent_of_budget: percent_of_budget(line.cost, budget),
            })
        })
        .collect();
    products.sort_by(|a, b| cost_desc(a.line.cost, b.line.cost).then_with(|| a.name.cmp(&b.name)));

    GlobalReport {
        month,
        categories: category_totals(&products, budget),
        matrix: cost_matrix(&reports, &products),
        teams: reports,
        products,
        budget,
        skipped,
    }
}

/// Loads the month from the database and aggregates it.
#[instrument(skip(db))]
pub async fn generate_month_report(db: &DatabaseConnection, month: MonthKey) -> Result<GlobalReport> {
    let report = MonthSnapshot::load(db, month).await?.aggregate();
    info!(
        "Report {}: {} teams, {} products, budget {}",
        month,
        report.teams.len(),
        report.products.len(),
        format_amount(report.budget)
    );
    Ok(report)
}

/// Rough monthly cost of feeding `total_headcount` people for `days` days.
///
/// Uses `ration * unit_price / package_size` per product, without packaging rounding.
#[must_use]
pub fn estimate_monthly_budget(total_headcount: u32, catalog: &Catalog, days: u32) -> f64 {
    let per_person_day: f64 = catalog.iter().map(calculator::cost_per_ration).sum();
    f64::from(total_headcount) * f64::from(days) * per_person_day
}

/// Amount in thousands, rounded to the nearest unit.
#[must_use]
pub fn round_to_thousands(amount: f64) -> f64 {
    (amount / 1000.0).round()
}

/// Whole amount with space-separated thousands, e.g. `1 234 567`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round();
    // Cast safety: report amounts are far below 2^63.
    #[allow(clippy::cast_possible_truncation)]
    let digits = (rounded.abs() as i64).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped
}

/// Percentage with one decimal; a missing share shows as `0.0%`.
#[must_use]
pub fn format_percent(percent: Option<f64>) -> String {
    format!("{:.1}%", percent.unwrap_or(0.0))
}

/// Text bar of a budget share, like `[████░░░░░░] 40.0%`.
#[must_use]
pub fn format_share_bar(percent: Option<f64>, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = percent.unwrap_or(0.0).clamp(0.0, 100.0);

    // Cast safety: clamped ∈ [0, 100] and length is small.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {}",
        "█".repeat(filled),
        "░".repeat(empty),
        format_percent(percent)
    )
}

/// Plain-text summary of a global report.
#[must_use]
pub fn format_report_summary(report: &GlobalReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Provisioning report {}", report.month);
    let _ = writeln!(out, "Budget: {}", format_amount(report.budget));

    for team in &report.teams {
        let menu = if team.has_menu { "" } else { " (no menu)" };
        let _ = writeln!(
            out,
            "  {}: {} | avg {:.0} per meal{}",
            team.team_name,
            format_amount(team.total_cost),
            team.average_meal_headcount,
            menu
        );
    }

    if !report.products.is_empty() {
        let _ = writeln!(out, "Products:");
    }
    for product in &report.products {
        let _ = writeln!(
            out,
            "  {} {} | {:.2} {} | {} x {} | {}",
            format_share_bar(product.percent_of_budget, None),
            product.name,
            product.line.raw_quantity,
            product.unit,
            product.line.packaging_units,
            product.package_kind,
            format_amount(product.line.cost)
        );
    }

    if !report.categories.is_empty() {
        let _ = writeln!(out, "Categories:");
    }
    for category in &report.categories {
        let _ = writeln!(
            out,
            "  {} ({}): {} | {}",
            category.category,
            category.product_count,
            format_amount(category.cost),
            format_percent(category.percent_of_budget)
        );
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "Skipped references: {}", report.skipped.len());
    }
    out
}
