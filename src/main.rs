//! u-allot CLI.
//!
//! Commands:
//! - `distribute`   Distribute tasks from a request file
//! - `train`        Train and install a model from task records
//! - `delete-model` Remove the installed model
//! - `status`       Show model readiness
//! - `config`       Print the effective configuration

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

use u_allot::config::{AllotConfig, DEFAULT_CONFIG_FILE};
use u_allot::service::{AllotService, ServiceResponse};

#[derive(Parser)]
#[command(
    name = "u-allot",
    about = "Load-aware task allocation with a learned effort classifier",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, env = "U_ALLOT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Distribute tasks: reads {"data": [...], "selectedAssignees": [...]}
    Distribute {
        /// Request JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Train and install a model: reads {"data": [...]}
    Train {
        /// Request JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Delete the installed model
    DeleteModel,

    /// Show model readiness
    Status,

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AllotConfig::load_from(&cli.config)?;
    let service = AllotService::new(config);
    let response = match cli.command {
        Commands::Distribute { input } => service.handle_distribute(read_body(&input)?),
        Commands::Train { input } => service.handle_train(read_body(&input)?),
        Commands::DeleteModel => service.handle_delete_model(),
        Commands::Status => service.handle_status(),
        Commands::Config => {
            print!("{}", service.config().to_toml()?);
            return Ok(());
        }
    };
    print_response(&response)?;

    if !response.is_success() {
        std::process::exit(exit_code(&response));
    }
    Ok(())
}

fn read_body(input: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let body = if input == Path::new("-") {
        serde_json::from_reader(std::io::stdin().lock())?
    } else {
        serde_json::from_reader(std::io::BufReader::new(std::fs::File::open(input)?))?
    };
    Ok(body)
}

fn print_response(response: &ServiceResponse) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    Ok(())
}

/// 75 (EX_TEMPFAIL) for retryable failures, 1 otherwise.
fn exit_code(response: &ServiceResponse) -> i32 {
    if response.status == 503 {
        75
    } else {
        1
    }
}
