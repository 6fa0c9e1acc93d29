//! Effectif CLI - personnel and competence administration
//!
//! Talks to the personnel backend, or to a local data directory for teams, users and
//! groupements.

mod commands;
mod config;
mod matrix_draft;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use effectif_auth::{AuthService, FileSessionStorage, Session};
use effectif_client::{ApiClient, ClientConfig};
use effectif_mock_backend::MockBackend;
use effectif_store::LocalStore;

use commands::{
    DataSource, GroupementCommands, MatrixCommands, PersonneCommands, TeamCommands, UserCommands,
};
use config::{ConfigManager, EffectifConfig};
use matrix_draft::MatrixDraft;

/// Effectif - manage personnes, teams, groupements and competences
#[derive(Parser, Debug)]
#[command(name = "effectif")]
#[command(about = "Manage personnes, teams, groupements and competences", long_about = None)]
#[command(version = env!("GIT_TAG"))]
#[command(long_version = concat!(env!("GIT_TAG"), "\nCommit: ", env!("GIT_HASH"), "\nBuilt: ", env!("BUILD_TIME")))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend origin (defaults to the configured URL, then http://localhost:8080)
    #[arg(long, env = "EFFECTIF_API_URL", global = true)]
    api_url: Option<String>,

    /// Use a local data directory for teams, users and groupements
    #[arg(long, env = "EFFECTIF_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in with a matricule
    Login {
        /// Matricule to authenticate
        matricule: String,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the current session and profile
    Whoami,
    /// Manage global configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage teams
    Teams {
        #[command(subcommand)]
        command: TeamCommands,
    },
    /// Manage groupements
    Groupements {
        #[command(subcommand)]
        command: GroupementCommands,
    },
    /// Manage personnes
    Personnes {
        #[command(subcommand)]
        command: PersonneCommands,
    },
    /// Manage users and habilitations
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Edit the competence matrix draft
    Matrix {
        /// Draft file (defaults to ~/.effectif/matrix.json)
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(subcommand)]
        command: MatrixCommands,
    },
    /// Create empty collections in the local data directory
    InitData,
    /// Serve an in-memory backend for local testing
    MockBackend {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: SocketAddr,
        /// Preload sample teams, personnes and users
        #[arg(long)]
        demo: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Set the default backend URL
    SetApiUrl {
        /// Backend origin, e.g. http://localhost:8080
        url: String,
    },
    /// Set the default local data directory
    SetDataDir {
        /// Directory holding teams.json, users.json and groupements.json
        dir: PathBuf,
    },
    /// Show the effective configuration
    Show,
    /// Clear all stored settings
    Clear,
}

/// Settings resolved from flags, environment and the config file
struct AppContext {
    api_url: String,
    data_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl AppContext {
    fn resolve(cli: &Cli, config: &EffectifConfig) -> Self {
        Self {
            api_url: config.resolve_api_url(cli.api_url.clone()),
            data_dir: config.resolve_data_dir(cli.data_dir.clone()),
            timeout: cli.timeout.map(Duration::from_secs),
        }
    }

    fn client(&self) -> Result<ApiClient> {
        let mut config = ClientConfig::new(self.api_url.clone());
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        ApiClient::new(config).context("Failed to create backend client")
    }

    fn source(&self) -> Result<DataSource> {
        match &self.data_dir {
            Some(dir) => {
                let store = LocalStore::open(dir)
                    .context(format!("Failed to open data directory: {:?}", dir))?;
                Ok(DataSource::Local(store))
            }
            None => Ok(DataSource::Remote(self.client()?)),
        }
    }

    fn auth(&self) -> Result<AuthService> {
        let storage = FileSessionStorage::default_location()?;
        let client = self.client()?;
        Ok(AuthService::new(Arc::new(client.users()), Arc::new(storage)))
    }

    /// The stored session; entity commands refuse to run without one
    fn require_session(&self) -> Result<Session> {
        self.auth()?
            .current_session()?
            .context("Not logged in. Run: effectif login <matricule>")
    }
}

/// Setup logging with the specified log level; RUST_LOG takes precedence
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    let ctx = AppContext::resolve(&cli, &config);

    match cli.command {
        Commands::Login { matricule } => handle_login(&ctx, &matricule).await,
        Commands::Logout => handle_logout(&ctx),
        Commands::Whoami => handle_whoami(&ctx).await,
        Commands::Config { command } => handle_config_command(command, &manager, &ctx),
        Commands::Teams { command } => {
            let session = ctx.require_session()?;
            commands::handle_team_command(command, &ctx.source()?, &session).await
        }
        Commands::Groupements { command } => {
            let session = ctx.require_session()?;
            commands::handle_groupement_command(command, &ctx.source()?, &session).await
        }
        Commands::Personnes { command } => {
            let session = ctx.require_session()?;
            commands::handle_personne_command(command, &ctx.source()?, &session).await
        }
        Commands::Users { command } => {
            let session = ctx.require_session()?;
            commands::handle_user_command(command, &ctx.source()?, &session).await
        }
        Commands::Matrix { file, command } => {
            let session = ctx.require_session()?;
            let draft = match file {
                Some(path) => MatrixDraft::new(path),
                None => MatrixDraft::default_location()?,
            };
            commands::handle_matrix_command(command, &draft, &ctx.source()?, &session).await
        }
        Commands::InitData => handle_init_data(&ctx),
        Commands::MockBackend { listen, demo } => handle_mock_backend(listen, demo).await,
    }
}

async fn handle_login(ctx: &AppContext, matricule: &str) -> Result<()> {
    let auth = ctx.auth()?;
    let session = auth.authenticate(matricule).await?;

    println!("✅ Logged in as {}", session.matricule());
    let codes: Vec<&str> = session
        .user()
        .habilitations
        .iter()
        .map(|h| h.code.as_str())
        .collect();
    if codes.is_empty() {
        println!("   No habilitations");
    } else {
        println!("   Habilitations: {}", codes.join(", "));
    }
    Ok(())
}

fn handle_logout(ctx: &AppContext) -> Result<()> {
    let auth = ctx.auth()?;
    match auth.current_session() {
        Ok(Some(session)) => {
            let matricule = session.matricule().to_string();
            auth.logout(session)?;
            println!("✅ Logged out {}", matricule);
        }
        Ok(None) => println!("Not logged in"),
        Err(e) => {
            warn!("Discarding unreadable session: {}", e);
            auth.forget()?;
            println!("✅ Session cleared");
        }
    }
    Ok(())
}

async fn handle_whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.require_session()?;

    println!("Matricule: {}", session.matricule());
    println!("Authenticated at: {}", session.authenticated_at().to_rfc3339());
    for habilitation in &session.user().habilitations {
        match &habilitation.description {
            Some(description) => println!("  {} - {}", habilitation.code, description),
            None => println!("  {}", habilitation.code),
        }
    }

    // Profile details are best effort
    match ctx.client()?.personnes().get_by_key(session.matricule()).await {
        Ok(personne) => {
            println!("Name: {} {}", personne.surname, personne.name);
            if let Some(role) = &personne.role {
                println!("Role: {}", role);
            }
            if let Some(team) = &personne.team {
                println!("Team: {}", team.name.as_deref().unwrap_or(&team.code));
            }
        }
        Err(e) => warn!("Profile unavailable: {}", e),
    }
    Ok(())
}

fn handle_config_command(
    command: ConfigCommands,
    manager: &ConfigManager,
    ctx: &AppContext,
) -> Result<()> {
    match command {
        ConfigCommands::SetApiUrl { url } => {
            manager.set_api_url(url.clone())?;
            println!("✅ Backend URL set to {}", url);
        }
        ConfigCommands::SetDataDir { dir } => {
            manager.set_data_dir(dir.clone())?;
            println!("✅ Data directory set to {:?}", dir);
        }
        ConfigCommands::Show => {
            println!("Config file: {:?}", manager.path());
            println!("Backend URL: {}", ctx.api_url);
            match &ctx.data_dir {
                Some(dir) => println!("Data directory: {:?}", dir),
                None => println!("Data directory: none (backend mode)"),
            }
        }
        ConfigCommands::Clear => {
            manager.clear()?;
            println!("✅ Configuration cleared");
        }
    }
    Ok(())
}

fn handle_init_data(ctx: &AppContext) -> Result<()> {
    let dir = ctx
        .data_dir
        .clone()
        .or_else(LocalStore::default_dir)
        .context("No data directory configured")?;

    let store = LocalStore::open(&dir)?;
    store.init()?;
    println!("✅ Data directory initialized at {:?}", store.data_dir());
    Ok(())
}

async fn handle_mock_backend(listen: SocketAddr, demo: bool) -> Result<()> {
    let backend = if demo {
        MockBackend::with_demo_data()
    } else {
        MockBackend::new()
    };

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .context(format!("Failed to bind {}", listen))?;
    info!("Mock backend ready on http://{}", listen);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        result = backend.serve(listener) => {
            if let Err(e) = result {
                error!("Mock backend error: {}", e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}
