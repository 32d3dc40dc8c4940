use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, connect};
use platform_obs::{ObsConfig, init_tracing};
use products_talent::cv_token::JwtTokenProvider;
use products_talent::seed::seed_demo;
use sea_orm::DatabaseConnection;
use talent_server::{
    config::AppConfig,
    graphql::{GraphqlData, build_schema},
    http::{self, AppState, ServeConfig},
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "talent-server", version, about = "Talent catalog server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Insert demo users, a job, a candidate and candidate sources.
    Seed,
    /// Print the GraphQL SDL.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Roll back the most recent migration.
    Down,
    /// Roll back every migration.
    Reset,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::from_env("talent-server")?)?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Migrate(action) => migrate(action).await,
        Command::Seed => run_seed().await,
        Command::SchemaPrint { output } => schema_print(output),
    }
}

async fn setup_db() -> Result<DatabaseConnection> {
    let settings = DatabaseSettings::default();
    connect(&settings).await.map_err(Into::into)
}

fn graphql_data(db: Arc<DatabaseConnection>, config: &AppConfig) -> GraphqlData {
    GraphqlData {
        db,
        tokens: Arc::new(JwtTokenProvider::new(config.cv_token_secret.clone())),
        public_cv_base_url: config.public_cv_base_url.clone(),
    }
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let db = Arc::new(setup_db().await?);
    ensure_migrations(&db, cmd.allow_dirty).await?;
    let schema = build_schema(graphql_data(db.clone(), &config));
    let state = AppState { db, schema, config };
    http::serve(ServeConfig::new(cmd.bind), state).await
}

async fn ensure_migrations(db: &DatabaseConnection, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(db).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `talent-server migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn migrate(action: MigrateCommand) -> Result<()> {
    let db = setup_db().await?;
    match action {
        MigrateCommand::Up => {
            Migrator::up(&db, None).await?;
            info!("database migrations applied");
        }
        MigrateCommand::Down => {
            Migrator::down(&db, Some(1)).await?;
            info!("most recent migration rolled back");
        }
        MigrateCommand::Reset => {
            Migrator::reset(&db).await?;
            info!("all migrations rolled back");
        }
    }
    Ok(())
}

async fn run_seed() -> Result<()> {
    let db = setup_db().await?;
    let seeded = seed_demo(&db).await?;
    info!(
        candidate_id = seeded.candidate.id,
        candidate_number = %seeded.candidate.candidate_number,
        saved_list_id = seeded.saved_list.id,
        saved_search_id = seeded.saved_search.id,
        "demo data seeded"
    );
    Ok(())
}

fn schema_print(path: Option<PathBuf>) -> Result<()> {
    // The SDL does not depend on live connections.
    let db = Arc::new(sea_orm::DatabaseConnection::Disconnected);
    let config = AppConfig {
        cors_allowed_origins: Vec::new(),
        public_cv_base_url: products_talent::published_doc::DEFAULT_PUBLIC_CV_BASE_URL.into(),
        cv_token_secret: String::new(),
    };
    let sdl = build_schema(graphql_data(db, &config)).sdl();
    match path {
        Some(target) => std::fs::write(&target, sdl)
            .with_context(|| format!("failed to write {}", target.display()))?,
        None => println!("{sdl}"),
    }
    Ok(())
}
