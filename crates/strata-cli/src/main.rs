use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use strata_application::{AiGateway, GatewaySettings, StrategyWorkbench};
use strata_core::i18n::Language;
use strata_core::secret::SecretService;
use strata_core::session::Alternative;
use strata_infrastructure::{
    BuiltinDocumentExtractor, ConfigService, FileKeyValueStore, KvSessionRepository,
    SecretServiceImpl, StrataPaths,
};
use strata_interaction::GeminiClient;

mod commands;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Strata - turn a client briefing into a strategic challenge", long_about = None)]
struct Cli {
    /// Interface and output language (EN or ES). Defaults to the configured language.
    #[arg(long, global = true)]
    lang: Option<Language>,

    /// Session to work on. Defaults to the last active session.
    #[arg(long, global = true)]
    session: Option<String>,

    /// Gemini API key. Overrides secret.json.
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory holding config, secrets, sessions and logs.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Also write logs to a daily file under <data-dir>/logs.
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new session
    New,
    /// List saved sessions, most recent first
    History,
    /// Print the active session
    Show,
    /// Make a saved session the active one
    Resume { id: String },
    /// Delete a saved session
    Delete { id: String },
    /// Set a diagnosis or challenge field by name (e.g. clientName, funnelStage)
    Set { field: String, value: String },
    /// Attach a briefing document (PDF, DOCX, TXT, MD, CSV, JSON)
    Attach { file: PathBuf },
    /// Remove the attached briefing document
    Detach,
    /// Attach screenshots
    AddImage {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove a screenshot by its position (1-based)
    RemoveImage { index: usize },
    /// Deduce the context fields from the briefing
    Analyze,
    /// Formulate the strategic challenge
    Formulate,
    /// Select strategic alternative A, B or C
    Select { alternative: Alternative },
    /// Generate strategic avenues
    Avenues,
    /// Suggest alternative phrasings for a field
    Suggest { field: String },
    /// Export the session as Markdown
    Export {
        /// Output file. Defaults to <CLIENT>_RetoEstrategico_<timestamp>.md
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the help topics
    HelpTopics,
}

impl Command {
    /// Commands that work on the active session.
    fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::New | Command::History | Command::Resume { .. } | Command::Delete { .. } | Command::HelpTopics
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = StrataPaths::new(cli.data_dir.as_deref());
    let _log_guard = init_logging(&paths, cli.log_file)?;

    let config = ConfigService::new(paths.clone()).get_config();
    let language = cli.lang.unwrap_or(config.language);

    let api_key = match cli.api_key.clone() {
        Some(key) => Some(key),
        None => load_api_key(&paths).await,
    };
    let client = GeminiClient::new(
        api_key,
        Duration::from_secs(config.gateway.request_timeout_secs),
    )?;
    if !client.has_api_key() {
        tracing::debug!("No Gemini API key configured; model actions will fail");
    }

    let sessions_dir = match &config.storage.dir {
        Some(dir) => dir.clone(),
        None => paths.sessions_dir()?,
    };
    let repository = KvSessionRepository::new(Arc::new(FileKeyValueStore::new(sessions_dir)));
    let workbench = StrategyWorkbench::new(
        Arc::new(repository),
        AiGateway::new(Arc::new(client), GatewaySettings::from(&config.gateway)),
        Arc::new(BuiltinDocumentExtractor::new()),
        language,
    );

    if cli.command.needs_session() {
        let opened = match &cli.session {
            Some(id) => workbench.load_session(id).await,
            None => workbench.resume().await,
        };
        opened.map_err(|e| commands::failure(&workbench, language, e))?;
    }

    commands::run(&workbench, language, cli.command).await
}

/// Reads the Gemini key from secret.json, creating the template on first run.
async fn load_api_key(paths: &StrataPaths) -> Option<String> {
    if let Err(e) = paths.ensure_secret_file() {
        tracing::warn!("Could not create the secret file: {}", e);
    }

    let service = match SecretServiceImpl::new(paths) {
        Ok(service) => service,
        Err(e) => {
            tracing::warn!("Could not locate the secret file: {}", e);
            return None;
        }
    };
    match service.load_secrets().await {
        Ok(secrets) => secrets.gemini_api_key().map(str::to_string),
        Err(e) => {
            tracing::warn!("Could not read {}: {}", service.file_path().display(), e);
            None
        }
    }
}

/// Logs go to stderr, filtered by `STRATA_LOG` (default `info`), and
/// optionally to a daily file.
fn init_logging(paths: &StrataPaths, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_env("STRATA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = if to_file {
        let dir = paths.logs_dir()?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(log_appender(&dir));
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

fn log_appender(dir: &Path) -> tracing_appender::rolling::RollingFileAppender {
    tracing_appender::rolling::daily(dir, "strata.log")
}
