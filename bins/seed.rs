use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::status::StatusSet;
use service::seed::{seed_demo_data, SeedOptions};

/// Seed the database with demo categories, priorities, tasks, subtasks and notes.
#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Load demo data into the taskboard database", long_about = None)]
struct Args {
    /// How many tasks to create
    #[arg(long, default_value_t = 30)]
    tasks: usize,

    /// How many subtasks per task
    #[arg(long, default_value_t = 2)]
    subtasks_per_task: usize,

    /// How many notes per task
    #[arg(long, default_value_t = 2)]
    notes_per_task: usize,

    /// Database URL; overrides config.toml
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Fixed RNG seed for reproducible data
    #[arg(long)]
    rng_seed: Option<u64>,
}

impl Args {
    fn options(&self) -> SeedOptions {
        SeedOptions { tasks: self.tasks, subtasks_per_task: self.subtasks_per_task, notes_per_task: self.notes_per_task }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut cfg = configs::load_file_or_env(&configs::config_path())?;
    if let Some(url) = &args.database_url {
        cfg.database.url = url.clone();
    }
    cfg.normalize_and_validate()?;
    let tz = cfg.app.offset()?;
    let statuses = StatusSet::try_from(&cfg.tasks)?;

    let db = connect_with_config(&DatabaseConfig::from(&cfg.database)).await?;
    migration::Migrator::up(&db, None).await?;

    let mut rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let now = chrono::Utc::now().with_timezone(&tz);
    let report = seed_demo_data(&db, &statuses, args.options(), now, &mut rng).await?;

    info!(?report, "seed finished");
    println!(
        "Seeded {} tasks, {} subtasks/task, {} notes/task.",
        report.tasks, args.subtasks_per_task, args.notes_per_task
    );
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    match run(Args::parse()).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(event = "seed_failed", error = %e, "seeding failed");
            std::process::ExitCode::FAILURE
        }
    }
}
