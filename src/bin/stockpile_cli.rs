use std::{env, sync::Arc};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use stockpile_api::{
    config::{self, AppConfig},
    db::{self, DbPool},
    dto::ItemDraft,
    services::ItemService,
};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckEnv => handle_check_env(cli.json)?,
        Commands::CheckDb => handle_check_db(cli.json).await?,
        Commands::Migrate(args) => handle_migrate(args).await?,
        Commands::Seed => handle_seed(cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "stockpile", about = "Stockpile inventory maintenance CLI", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report how the database URL is configured
    CheckEnv,
    /// Connect to the configured database and ping it
    CheckDb,
    /// Apply pending migrations
    Migrate(MigrateArgs),
    /// Insert the demo dataset, skipping SKUs that already exist
    Seed,
}

#[derive(Args)]
struct MigrateArgs {
    #[arg(long, help = "Roll back the most recent migration instead")]
    down: bool,
}

#[derive(Serialize)]
struct EnvReport {
    source: &'static str,
    configured: bool,
    length: usize,
    scheme: Option<String>,
    masked_url: String,
}

fn env_report(raw: Option<String>, fallback: &str) -> EnvReport {
    let (source, url) = match raw {
        Some(url) => ("environment", url),
        None => ("config", fallback.to_string()),
    };
    EnvReport {
        source,
        configured: !url.is_empty(),
        length: url.len(),
        scheme: url.split_once(':').map(|(scheme, _)| scheme.to_string()),
        masked_url: db::mask_database_url(&url),
    }
}

fn handle_check_env(json: bool) -> Result<()> {
    // Loading the config first also pulls in `.env`.
    let cfg = config::load_config().context("failed to load application config")?;
    let raw = ["DATABASE_URL", "APP__DATABASE_URL"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()));
    let report = env_report(raw, cfg.database_url());

    if json {
        return print_json(&report);
    }

    println!("Database URL source: {}", report.source);
    println!("Configured: {}", report.configured);
    println!("Length: {}", report.length);
    println!(
        "Scheme: {}",
        report.scheme.as_deref().unwrap_or("(none)")
    );
    println!("URL: {}", report.masked_url);
    Ok(())
}

#[derive(Serialize)]
struct DbCheck {
    url: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn handle_check_db(json: bool) -> Result<()> {
    let cfg = load_cli_config()?;
    let url = db::mask_database_url(cfg.database_url());

    let outcome = match db::establish_connection_from_app_config(&cfg).await {
        Ok(pool) => {
            let ping = db::check_connection(&pool).await;
            db::close_pool(pool).await.ok();
            ping
        }
        Err(e) => Err(e),
    };

    let check = DbCheck {
        url,
        ok: outcome.is_ok(),
        error: outcome.as_ref().err().map(ToString::to_string),
    };

    if json {
        print_json(&check)?;
    } else if check.ok {
        println!("Database reachable at {}", check.url);
    } else {
        println!(
            "Database check failed for {}: {}",
            check.url,
            check.error.as_deref().unwrap_or("unknown error")
        );
    }

    outcome.context("database check failed")
}

async fn handle_migrate(args: MigrateArgs) -> Result<()> {
    let cfg = load_cli_config()?;
    let pool = connect(&cfg).await?;

    if args.down {
        db::rollback_last_migration(&pool)
            .await
            .context("failed to roll back migration")?;
        println!("Rolled back the last migration");
    } else {
        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
        println!("Migrations applied");
    }

    db::close_pool(pool).await?;
    Ok(())
}

#[derive(Serialize)]
struct SeedReport {
    created: Vec<String>,
    skipped: Vec<String>,
}

async fn handle_seed(json: bool) -> Result<()> {
    let cfg = load_cli_config()?;
    let pool = Arc::new(connect(&cfg).await?);
    if cfg.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let service = ItemService::new(pool.clone());
    let mut report = SeedReport {
        created: Vec::new(),
        skipped: Vec::new(),
    };

    for draft in demo_items() {
        if service.sku_exists(&draft.sku).await? {
            debug!(target: "stockpile_cli", sku = %draft.sku, "skipping existing item");
            report.skipped.push(draft.sku);
            continue;
        }
        let sku = draft.sku.clone();
        service
            .create(draft)
            .await
            .with_context(|| format!("failed to seed item {}", sku))?;
        report.created.push(sku);
    }

    if json {
        print_json(&report)?;
    } else {
        println!(
            "Seeded {} item(s), skipped {} existing",
            report.created.len(),
            report.skipped.len()
        );
        for sku in &report.created {
            println!("- created {}", sku);
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn demo_item(
    name: &str,
    sku: &str,
    category: &str,
    supplier: Option<&str>,
    location: Option<&str>,
    quantity: i32,
    price: Decimal,
    min_stock_level: i32,
) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        sku: sku.to_string(),
        category_name: Some(category.to_string()),
        supplier_name: supplier.map(String::from),
        location_name: location.map(String::from),
        quantity,
        price,
        min_stock_level,
    }
}

fn demo_items() -> Vec<ItemDraft> {
    vec![
        demo_item(
            "120mm Case Fan",
            "FAN-120",
            "Cooling",
            Some("Acme Components"),
            Some("Shelf A"),
            24,
            dec!(12.99),
            5,
        ),
        demo_item(
            "Thermal Paste 4g",
            "TP-4G",
            "Cooling",
            Some("Acme Components"),
            Some("Shelf A"),
            3,
            dec!(6.50),
            10,
        ),
        demo_item(
            "M3 Standoff Kit",
            "STD-M3",
            "Fasteners",
            Some("BoltWorks"),
            Some("Bin 4"),
            150,
            dec!(0.15),
            50,
        ),
        demo_item(
            "SATA Cable 50cm",
            "SATA-50",
            "Cables",
            None,
            Some("Drawer 2"),
            0,
            dec!(2.25),
            8,
        ),
    ]
}

fn load_cli_config() -> Result<AppConfig> {
    let cfg = config::load_config().context("failed to load application config")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);
    Ok(cfg)
}

async fn connect(cfg: &AppConfig) -> Result<DbPool> {
    db::establish_connection_from_app_config(cfg)
        .await
        .with_context(|| {
            format!(
                "failed to connect to database at {}",
                db::mask_database_url(cfg.database_url())
            )
        })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
