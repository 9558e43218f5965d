use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use miminet::config::ServerConfig;
use miminet::database::{establish_connection, get_database_url, setup_database};
use miminet::server;
use miminet::services::AuthService;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve(ServerConfig),
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    User {
        #[clap(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = "miminet.db")]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long, default_value = "miminet.db")]
        database: String,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    Create {
        #[clap(short, long)]
        nick: String,
        #[clap(short, long)]
        password: String,
        /// 1 and above opens the admin panel
        #[clap(short, long, default_value_t = 0)]
        role: i32,
        #[clap(short, long, default_value = "miminet.db")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Serve(config) => {
            info!("Starting server on port {}", config.port);
            server::start_server(config).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                server::migrate_database(&database, server::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&database, direction).await?;
            }
        },
        Commands::User { command } => match command {
            UserCommands::Create {
                nick,
                password,
                role,
                database,
            } => {
                let db = establish_connection(&get_database_url(Some(&database))).await?;
                setup_database(&db).await?;
                let user = AuthService::new(db).create_user(&nick, &password, role).await?;
                info!("User {} created with id {}", user.nick, user.id);
            }
        },
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
