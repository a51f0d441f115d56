mod cmd_ask;
mod cmd_chat;
mod cmd_config;
mod cmd_models;
mod connect;
mod terminal;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd_config::ConfigCmd;
use frostline_store::FrostlineConfig;

#[derive(Parser)]
#[command(
    name = "frostline",
    version,
    about = "Ask questions about customer lifetime value in plain language"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session
    Chat {
        /// Summarization model (see `frostline models`)
        #[arg(long)]
        model: Option<String>,
        /// Replay the whole conversation before every answer
        #[arg(long)]
        replay: bool,
    },
    /// Ask a single question and exit
    Ask {
        /// The question, in plain language
        question: String,
        /// Summarization model (see `frostline models`)
        #[arg(long)]
        model: Option<String>,
        /// Print the turn report as JSON instead of the chat transcript
        #[arg(long)]
        json: bool,
    },
    /// List summarization models
    Models,
    /// Read and write settings
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

/// Log to stderr. `FROSTLINE_LOG` wins, then the configured `log_level`,
/// then `warn`.
fn init_logging(config_level: Option<&str>) {
    let filter = EnvFilter::try_from_env("FROSTLINE_LOG")
        .or_else(|_| EnvFilter::try_new(config_level.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = FrostlineConfig::load_or_default(&frostline_store::config_path());
    init_logging(config.log_level.as_deref());
    tracing::debug!("frostline v{}", env!("CARGO_PKG_VERSION"));

    match cli.cmd {
        Command::Chat { model, replay } => cmd_chat::execute(model.as_deref(), replay),
        Command::Ask {
            question,
            model,
            json,
        } => cmd_ask::execute(&question, model.as_deref(), json),
        Command::Models => cmd_models::execute(),
        Command::Config { cmd } => cmd_config::run(cmd),
    }
}
