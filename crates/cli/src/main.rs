//! brewqa CLI - quality assessment for brewery batches.

mod config;

use std::path::PathBuf;

use anyhow::{bail, Result};
use brewqa_core::{
    Batch, BatchId, CheckParameters, CheckSort, Pagination, QualityCheckId, QualityCheckPatch,
    Recipe, RecipeId, SensorReadings, SortField, SortOrder, Time, User, UserId, UserRole,
};
use brewqa_quality::QualityAssessmentEngine;
use brewqa_storage::{BatchStore, JsonStorage, UserStore};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "brewqa")]
#[command(about = "Quality assessment for brewery batches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding brewqa records
    #[arg(long, env = "BREWQA_DATA_DIR", default_value = ".brewqa", global = true)]
    data_dir: PathBuf,

    /// TOML file with assessment rules
    #[arg(long, env = "BREWQA_CONFIG", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        action: RecipeCommand,
    },
    /// Manage batches
    Batch {
        #[command(subcommand)]
        action: BatchCommand,
    },
    /// Manage inspectors
    Inspector {
        #[command(subcommand)]
        action: InspectorCommand,
    },
    /// Record and manage quality checks
    Check {
        #[command(subcommand)]
        action: CheckCommand,
    },
    /// Show quality metrics for a batch
    Metrics {
        /// Batch ID
        batch: BatchId,
    },
    /// Show pass/fail trends per check type
    Trends {
        /// Only batches of this recipe
        #[arg(long)]
        recipe: Option<RecipeId>,
        /// Only this check type
        #[arg(long = "type")]
        check_type: Option<String>,
        /// Trailing window in days
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show pass/fail statistics
    Stats {
        /// Only batches of this recipe
        #[arg(long)]
        recipe: Option<RecipeId>,
    },
    /// Show the most recent failed checks
    Failed {
        /// How many to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Score sensor readings and record the resulting checks
    Assess {
        /// Batch ID
        batch: BatchId,
        /// Inspector the checks are recorded for
        #[arg(long)]
        inspector: UserId,
        /// Fermentation temperature, °C
        #[arg(long)]
        temperature: Option<f64>,
        /// Specific gravity
        #[arg(long)]
        gravity: Option<f64>,
        /// pH
        #[arg(long)]
        ph: Option<f64>,
        /// Turbidity
        #[arg(long)]
        turbidity: Option<f64>,
        /// Color
        #[arg(long)]
        color: Option<f64>,
    },
    /// Show outstanding inspection items for a batch
    Checklist {
        /// Batch ID
        batch: BatchId,
    },
    /// Create a demo recipe, batch and inspector
    Seed,
}

#[derive(Subcommand)]
enum RecipeCommand {
    /// Add a recipe
    Add {
        /// Recipe name
        name: String,
        /// Beer style
        #[arg(long, default_value = "")]
        style: String,
        /// Target fermentation temperature, °C
        #[arg(long)]
        temp: f64,
        /// Estimated fermentation days
        #[arg(long)]
        days: u32,
    },
    /// List recipes
    List,
}

#[derive(Subcommand)]
enum BatchCommand {
    /// Add a batch
    Add {
        /// Recipe ID
        #[arg(long)]
        recipe: RecipeId,
        /// Batch number
        number: String,
        /// Brew start time (RFC 3339)
        #[arg(long)]
        start: Option<Time>,
        /// Original gravity
        #[arg(long)]
        og: Option<f64>,
    },
    /// Show a batch
    Show {
        /// Batch ID
        id: BatchId,
    },
    /// Record gravity readings
    SetGravity {
        /// Batch ID
        id: BatchId,
        /// Original gravity
        #[arg(long)]
        og: Option<f64>,
        /// Final gravity
        #[arg(long)]
        fg: Option<f64>,
    },
}

#[derive(Subcommand)]
enum InspectorCommand {
    /// Add an inspector
    Add {
        /// Name
        name: String,
        /// Email
        email: String,
        /// Role (inspector, brewer, admin)
        #[arg(long, default_value = "inspector")]
        role: UserRole,
    },
}

#[derive(Subcommand)]
enum CheckCommand {
    /// Record a check
    Add {
        /// Batch ID
        batch: BatchId,
        /// Inspector ID
        #[arg(long)]
        inspector: UserId,
        /// Check type, e.g. visual_inspection
        #[arg(long = "type")]
        check_type: String,
        /// Record the check as failed
        #[arg(long)]
        failed: bool,
        /// Parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List a batch's checks
    List {
        /// Batch ID
        batch: BatchId,
        /// Page number, from 1
        #[arg(long, default_value = "1")]
        page: usize,
        /// Page size
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Sort field (created_at, check_type, passed)
        #[arg(long, default_value = "created_at")]
        sort: SortField,
        /// Sort order (asc, desc)
        #[arg(long, default_value = "desc")]
        order: SortOrder,
    },
    /// Show a check
    Show {
        /// Check ID
        id: QualityCheckId,
    },
    /// Update fields of a check
    Update {
        /// Check ID
        id: QualityCheckId,
        /// New check type
        #[arg(long = "type")]
        check_type: Option<String>,
        /// New result
        #[arg(long)]
        passed: Option<bool>,
        /// New parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a check
    Delete {
        /// Check ID
        id: QualityCheckId,
    },
}

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "brewqa_cli=info,brewqa_quality=info,brewqa_storage=warn";

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let storage = JsonStorage::new(&cli.data_dir).await?;
    let engine = QualityAssessmentEngine::new(storage).with_config(config);

    match cli.command {
        Commands::Recipe { action } => run_recipe(&engine, action).await?,
        Commands::Batch { action } => run_batch(&engine, action).await?,
        Commands::Inspector { action } => match action {
            InspectorCommand::Add { name, email, role } => {
                let user = User::new(name, email, role);
                engine.storage().save_user(&user).await?;
                print_json(&user)?;
            }
        },
        Commands::Check { action } => run_check(&engine, action).await?,
        Commands::Metrics { batch } => match engine.compute_metrics(batch).await? {
            Some(metrics) => print_json(&metrics)?,
            None => print_json(&serde_json::Value::Null)?,
        },
        Commands::Trends { recipe, check_type, days } => {
            let trends = engine.compute_trends(recipe, check_type.as_deref(), days).await?;
            print_json(&trends)?;
        }
        Commands::Stats { recipe } => print_json(&engine.get_statistics(recipe).await?)?,
        Commands::Failed { limit } => print_json(&engine.get_failed_checks(limit).await?)?,
        Commands::Assess {
            batch,
            inspector,
            temperature,
            gravity,
            ph,
            turbidity,
            color,
        } => {
            let readings = SensorReadings {
                temperature,
                gravity,
                ph,
                turbidity,
                color,
            };
            let created = engine.run_automated_assessment(batch, inspector, readings).await?;
            print_json(&created)?;
        }
        Commands::Checklist { batch } => print_json(&engine.generate_checklist(batch).await?)?,
        Commands::Seed => seed(&engine).await?,
    }

    Ok(())
}

type Engine = QualityAssessmentEngine<JsonStorage>;

async fn run_recipe(engine: &Engine, action: RecipeCommand) -> Result<()> {
    match action {
        RecipeCommand::Add { name, style, temp, days } => {
            let recipe = Recipe::new(name, style, temp, days);
            engine.storage().save_recipe(&recipe).await?;
            print_json(&recipe)
        }
        RecipeCommand::List => print_json(&engine.storage().list_recipes().await?),
    }
}

async fn run_batch(engine: &Engine, action: BatchCommand) -> Result<()> {
    match action {
        BatchCommand::Add { recipe, number, start, og } => {
            if engine.storage().load_recipe(recipe).await?.is_none() {
                bail!("recipe not found: {}", recipe);
            }
            let mut batch = Batch::new(recipe, number);
            batch.start_date = start;
            batch.original_gravity = og;
            engine.storage().save_batch(&batch).await?;
            print_json(&batch)
        }
        BatchCommand::Show { id } => match engine.storage().load_batch(id).await? {
            Some(batch) => print_json(&batch),
            None => bail!("batch not found: {}", id),
        },
        BatchCommand::SetGravity { id, og, fg } => {
            let Some(mut batch) = engine.storage().load_batch(id).await? else {
                bail!("batch not found: {}", id);
            };
            if og.is_some() {
                batch.original_gravity = og;
            }
            if fg.is_some() {
                batch.final_gravity = fg;
            }
            engine.storage().save_batch(&batch).await?;
            print_json(&batch)
        }
    }
}

async fn run_check(engine: &Engine, action: CheckCommand) -> Result<()> {
    match action {
        CheckCommand::Add {
            batch,
            inspector,
            check_type,
            failed,
            params,
            notes,
        } => {
            let parameters = match params {
                Some(raw) => parse_parameters(&raw)?,
                None => CheckParameters::empty(),
            };
            let check = engine
                .create_check(batch, inspector, &check_type, !failed, parameters, notes)
                .await?;
            print_json(&check)
        }
        CheckCommand::List {
            batch,
            page,
            limit,
            sort,
            order,
        } => {
            let page = engine
                .list_checks(batch, Pagination::new(page, limit), CheckSort::new(sort, order))
                .await?;
            print_json(&page)
        }
        CheckCommand::Show { id } => print_json(&engine.get_check(id).await?),
        CheckCommand::Update {
            id,
            check_type,
            passed,
            params,
            notes,
        } => {
            let patch = QualityCheckPatch {
                check_type,
                passed,
                parameters: params.as_deref().map(parse_parameters).transpose()?,
                notes,
            };
            if patch.is_empty() {
                bail!("nothing to update");
            }
            print_json(&engine.update_check(id, patch).await?)
        }
        CheckCommand::Delete { id } => {
            engine.delete_check(id).await?;
            info!(check = %id, "deleted");
            Ok(())
        }
    }
}

async fn seed(engine: &Engine) -> Result<()> {
    let recipe = Recipe::new("West Coast IPA", "American IPA", 18.5, 14);
    engine.storage().save_recipe(&recipe).await?;

    let mut batch = Batch::new(recipe.id, "IPA-001");
    batch.start_date = Some(chrono::Utc::now());
    batch.original_gravity = Some(1.062);
    engine.storage().save_batch(&batch).await?;

    let inspector = User::new("Quality Lead", "qa@brewery.example", UserRole::Inspector);
    engine.storage().save_user(&inspector).await?;

    info!(recipe = %recipe.id, batch = %batch.id, inspector = %inspector.id, "seeded demo records");
    print_json(&serde_json::json!({
        "recipe": recipe,
        "batch": batch,
        "inspector": inspector,
    }))
}

/// Parse check parameters. A JSON object with a `kind` tag selects a known
/// shape; any other object is kept as generic key-value parameters.
fn parse_parameters(raw: &str) -> Result<CheckParameters> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value {
        serde_json::Value::Object(map) if map.contains_key("kind") => {
            Ok(serde_json::from_value(serde_json::Value::Object(map))?)
        }
        serde_json::Value::Object(map) => Ok(CheckParameters::Generic(map.into_iter().collect())),
        _ => bail!("parameters must be a JSON object"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_log_filter_is_valid() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_parse_generic_parameters() {
        let params = parse_parameters(r#"{"clarity": "bright", "ph": 4.1}"#).unwrap();
        assert!(matches!(params, CheckParameters::Generic(_)));
        assert_eq!(params.ph(), Some(4.1));
    }

    #[test]
    fn test_parse_tagged_parameters() {
        let params = parse_parameters(r#"{"kind": "ph", "ph": 4.0, "min": 3.8, "max": 4.6}"#).unwrap();
        assert_eq!(params, CheckParameters::Ph { ph: 4.0, min: 3.8, max: 4.6 });
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(parse_parameters("[1, 2]").is_err());
        assert!(parse_parameters("not json").is_err());
    }

    #[test]
    fn test_assess_arguments() {
        let cli = Cli::try_parse_from([
            "brewqa",
            "assess",
            "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "--inspector",
            "01ARZ3NDEKTSV4RRFFQ69G5FAW",
            "--temperature",
            "18.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Assess { temperature, gravity, .. } => {
                assert_eq!(temperature, Some(18.5));
                assert_eq!(gravity, None);
            }
            _ => panic!("expected assess"),
        }
    }
}
