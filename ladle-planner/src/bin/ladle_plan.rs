//! LADLE command-line planner
//!
//! Builds an empty meal plan, fills it from a recipe catalog through the
//! recipe cache, and prints the plan and its shopping list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::Parser;
use ladle_core::{LadleConfig, LadleError, MealPlan, UserPreferences};
use ladle_planner::{
    aggregate, init_tracing, CachedRecipeSource, CatalogRecipeSource, PlanGenerator,
};
use ladle_storage::{InMemoryPlanStore, PlanStore, TtlPolicy, TwoTierCache};

#[derive(Debug, Parser)]
#[command(name = "ladle-plan", version, about = "Generate a meal plan and shopping list")]
struct Cli {
    /// Path to a TOML config file (falls back to LADLE_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recipe catalog: a JSON array of recipes or a saved search page.
    #[arg(long)]
    catalog: PathBuf,

    /// User preferences as JSON.
    #[arg(long)]
    preferences: Option<PathBuf>,

    /// Plan name.
    #[arg(long, default_value = "Weekly Plan")]
    name: String,

    /// First day of the plan (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Number of days; defaults to the configured value.
    #[arg(long)]
    days: Option<u32>,

    /// Print the plan and shopping list as JSON.
    #[arg(long)]
    json: bool,

    /// Empty the recipe cache before planning.
    #[arg(long)]
    clear_cache: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Ladle(#[from] LadleError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = LadleConfig::load(cli.config.clone()).map_err(LadleError::from)?;
    init_tracing(&config.telemetry).map_err(LadleError::from)?;

    let catalog = CatalogRecipeSource::from_json(&read_file(&cli.catalog)?).map_err(|e| {
        CliError::Parse {
            path: cli.catalog.clone(),
            reason: e.to_string(),
        }
    })?;
    tracing::info!(recipes = catalog.len(), "catalog loaded");

    let preferences = match &cli.preferences {
        Some(path) => serde_json::from_str::<UserPreferences>(&read_file(path)?).map_err(|e| {
            CliError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?,
        None => UserPreferences::default(),
    };

    let cache = Arc::new(TwoTierCache::from_settings(&config.cache));
    if cli.clear_cache {
        cache.clear().await;
    }
    let source = Arc::new(CachedRecipeSource::with_ttl(
        catalog,
        Arc::clone(&cache),
        TtlPolicy::from(&config.cache),
    ));

    let plan = MealPlan::new(
        cli.name,
        cli.start.unwrap_or_else(|| Utc::now().date_naive()),
        cli.days.unwrap_or(config.planner.default_days),
        &config.planner.default_meal_types,
    )
    .map_err(LadleError::from)?;
    let plan_id = plan.plan_id;

    let store = Arc::new(InMemoryPlanStore::new());
    store.save(&plan).await.map_err(LadleError::from)?;

    let generator = PlanGenerator::new(source, store.clone());
    let report = generator.generate(plan_id, &preferences).await?;

    let plan = store
        .get(plan_id)
        .await
        .map_err(LadleError::from)?
        .ok_or(LadleError::from(ladle_core::PlanError::NotFound { plan_id }))?;
    let list = aggregate(&plan);

    let stats = cache.stats();
    tracing::debug!(
        memory_hits = stats.memory_hits,
        disk_hits = stats.disk_hits,
        misses = stats.misses,
        disk_errors = stats.disk_errors,
        "cache statistics"
    );

    if cli.json {
        let output = serde_json::json!({ "plan": plan, "shoppingList": list });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} ({} to {})", plan.name, plan.start_date, plan.end_date);
    for day in &plan.days {
        for slot in &day.slots {
            let title = slot.recipe.as_ref().map_or("-", |r| r.title.as_str());
            println!("  {}  {:<9}  {}", day.date, slot.meal_type.as_tag(), title);
        }
    }
    println!(
        "\n{} of {} slots filled\n",
        report.slots_assigned, report.slots_total
    );
    print!("{}", list.export_text());

    Ok(())
}
