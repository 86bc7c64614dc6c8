//! `sentinel` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sentinel_app::{
    AppConfig, AppError, DEFAULT_ARCHITECTURE, DEFAULT_MODEL_NAME, DEFAULT_USE_CASE, Session,
    app_version, default_data_dir, default_inputs, init_logging, resolve_api_key,
};
use sentinel_core::EvaluationInputs;
use sentinel_provider::{DEFAULT_ENDPOINT, DEFAULT_PROVIDER_MODEL};
use sentinel_ui::{SortOption, ViewTab};

#[derive(Parser)]
#[command(name = "sentinel", version = app_version())]
#[command(about = "LLM security threat modeling and benchmark evaluation")]
struct Cli {
    /// Directory holding the evaluation history.
    #[arg(long, global = true, env = "SENTINEL_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Provider API key (falls back to GEMINI_API_KEY, then API_KEY).
    #[arg(long, global = true, env = "SENTINEL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Provider model identifier.
    #[arg(long, global = true, env = "SENTINEL_PROVIDER_MODEL", default_value = DEFAULT_PROVIDER_MODEL)]
    provider_model: String,
    /// Provider API base URL (https only).
    #[arg(long, global = true, env = "SENTINEL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Provider request timeout in seconds.
    #[arg(long, global = true, env = "SENTINEL_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a new threat-model evaluation.
    Evaluate {
        /// Target model description.
        #[arg(long, default_value = DEFAULT_MODEL_NAME)]
        model: String,
        /// Deployment architecture.
        #[arg(long, default_value = DEFAULT_ARCHITECTURE)]
        architecture: String,
        /// Intended use case.
        #[arg(long, default_value = DEFAULT_USE_CASE)]
        use_case: String,
        /// Threat ordering.
        #[arg(long, default_value = "severity-desc")]
        sort: SortOption,
        /// Also write the HTML report into this directory.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Inspect past evaluations.
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Write the HTML report for a past evaluation.
    Export {
        /// Evaluation id.
        id: String,
        /// Output directory.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List past evaluations, newest first.
    List,
    /// Show one evaluation.
    Show {
        /// Evaluation id.
        id: String,
        /// View to render.
        #[arg(long, default_value = "overview")]
        tab: ViewTab,
        /// Threat ordering.
        #[arg(long, default_value = "severity-desc")]
        sort: SortOption,
    },
    /// Delete one evaluation.
    Delete {
        /// Evaluation id.
        id: String,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig {
        data_dir: cli.data_dir.unwrap_or_else(default_data_dir),
        api_key: resolve_api_key(cli.api_key, |var| std::env::var(var).ok()),
        provider_model: cli.provider_model,
        endpoint: cli.endpoint,
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    tracing::debug!(data_dir = %config.data_dir.display(), model = %config.provider_model, "configuration resolved");

    match cli.command {
        Command::Evaluate {
            model,
            architecture,
            use_case,
            sort,
            export,
        } => {
            let provider = config.provider()?;
            let mut session = Session::open(
                &config,
                EvaluationInputs::new(model, architecture, use_case),
            );
            session.set_sort(sort);

            let recorded = match session.submit(&provider) {
                Ok(recorded) => recorded,
                Err(error) => {
                    println!("{}", session.render());
                    return Err(error);
                }
            };
            println!("{}", session.render());
            if session.select_tab(ViewTab::Threats) {
                println!("{}", session.render());
            }

            if let (Some(evaluation), Some(dir)) = (recorded, export) {
                let path = session.export(&evaluation.id, &dir)?;
                println!("Report written to {}", path.display());
            }
            Ok(())
        }
        Command::History { command } => {
            let mut session = Session::open(&config, default_inputs());
            match command {
                HistoryCommand::List => {
                    session.select_tab(ViewTab::History);
                    println!("{}", session.render());
                    Ok(())
                }
                HistoryCommand::Show { id, tab, sort } => {
                    if !session.load(&id) {
                        return Err(AppError::NotFound(id));
                    }
                    session.set_sort(sort);
                    session.select_tab(tab);
                    println!("{}", session.render());
                    Ok(())
                }
                HistoryCommand::Delete { id } => {
                    if !session.delete(&id)? {
                        return Err(AppError::NotFound(id));
                    }
                    println!("Deleted {id}");
                    Ok(())
                }
            }
        }
        Command::Export { id, out_dir } => {
            let session = Session::open(&config, default_inputs());
            let path = session.export(&id, &out_dir)?;
            println!("Report written to {}", path.display());
            Ok(())
        }
    }
}
