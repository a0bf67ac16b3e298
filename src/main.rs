use dotenvy::dotenv;
use provision_planner::{
    config::{catalog, database, settings::Settings},
    core::{period::MonthKey, product, report, team},
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Settings
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Invalid configuration: {}", e))?;
    info!("Using database {}", settings.database_url);

    // 4. Database
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog when a seed file is present
    if settings.catalog_path.exists() {
        let seed = catalog::load_catalog_config(&settings.catalog_path)?;
        catalog::seed_catalog(&db, &seed)
            .await
            .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    } else {
        warn!(
            "Catalog file {} not found, skipping seed",
            settings.catalog_path.display()
        );
    }

    // 6. Dashboard estimate and monthly report
    let month: MonthKey = settings.report_month;
    let teams = team::get_all_teams(&db).await?;
    let headcount = teams
        .iter()
        .map(team::base_headcount)
        .try_fold(0_u32, |total, h| h.map(|h| total.saturating_add(h)))?;
    let estimate = report::estimate_monthly_budget(
        headcount,
        &product::load_catalog(&db).await?,
        month.days_in_month(),
    );
    info!(
        "{} teams, {} people, estimated {}k for {}",
        teams.len(),
        headcount,
        report::round_to_thousands(estimate),
        month
    );

    let month_report = report::generate_month_report(&db, month).await?;
    info!("\n{}", report::format_report_summary(&month_report));

    Ok(())
}
