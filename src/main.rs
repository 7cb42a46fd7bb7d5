use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xrate::cli::convert::ConvertOptions;
use xrate::cli::history::HistoryAction;
use xrate::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        amount: f64,
        /// Currency to convert from (defaults to the configured one)
        #[arg(short, long)]
        from: Option<String>,
        /// Currency to convert to (defaults to the configured one)
        #[arg(short, long)]
        to: Option<String>,
        /// Swap the two currencies before converting
        #[arg(short, long)]
        swap: bool,
        /// Do not record the conversion in history
        #[arg(long)]
        no_history: bool,
    },
    /// Display the rate table for a base currency
    Rates {
        /// Base currency (defaults to the configured one)
        base: Option<String>,
    },
    /// List supported currencies
    Currencies,
    /// Show or edit conversion history
    History {
        #[command(subcommand)]
        action: Option<HistoryCommand>,
    },
    /// Remove all cached exchange rates
    ClearCache,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List past conversions
    List,
    /// Remove one conversion by id
    Remove { id: i64 },
    /// Remove all conversions
    Clear,
}

impl From<Commands> for xrate::AppCommand {
    fn from(cmd: Commands) -> xrate::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                swap,
                no_history,
            } => xrate::AppCommand::Convert(ConvertOptions {
                amount,
                from,
                to,
                swap,
                save_history: !no_history,
            }),
            Commands::Rates { base } => xrate::AppCommand::Rates { base },
            Commands::Currencies => xrate::AppCommand::Currencies,
            Commands::History { action } => xrate::AppCommand::History(match action {
                None | Some(HistoryCommand::List) => HistoryAction::List,
                Some(HistoryCommand::Remove { id }) => HistoryAction::Remove(id),
                Some(HistoryCommand::Clear) => HistoryAction::Clear,
            }),
            Commands::ClearCache => xrate::AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrate::cli::setup::setup(),
        Some(cmd) => xrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
