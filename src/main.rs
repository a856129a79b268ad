use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use mfx::core::log::init_logging;
use mfx::filter::{ALL, FundFilter};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

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
    /// List and filter funds from the catalog
    Funds {
        /// Text to search for in scheme names
        #[arg(short, long, default_value = "")]
        search: String,
        /// AMC label, as listed by `mfx amcs`
        #[arg(long, default_value = ALL)]
        amc: String,
        /// Category, e.g. Equity or Debt
        #[arg(long, default_value = ALL)]
        category: String,
        /// Plan type, e.g. Growth or Dividend
        #[arg(long = "type", default_value = ALL)]
        fund_type: String,
        /// Show at most this many funds
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List AMC labels derived from scheme names
    Amcs {
        /// Group by the first word of the scheme name only
        #[arg(long)]
        first_word: bool,
    },
    /// Show a scheme's metadata and recent NAV history
    Detail {
        scheme_code: u64,
        /// Number of recent NAV samples to show
        #[arg(short, long, default_value_t = 10)]
        days: usize,
    },
    /// Compare two to four schemes side by side
    Compare {
        #[arg(required = true, num_args = 1..)]
        scheme_codes: Vec<u64>,
    },
}

impl Commands {
    fn into_app_command(self) -> Option<mfx::AppCommand> {
        Some(match self {
            Commands::Setup => return None,
            Commands::Funds {
                search,
                amc,
                category,
                fund_type,
                limit,
            } => mfx::AppCommand::Funds {
                filter: FundFilter::new()
                    .search(search)
                    .amc(amc.as_str())
                    .category(category.as_str())
                    .fund_type(fund_type.as_str()),
                limit,
            },
            Commands::Amcs { first_word } => mfx::AppCommand::Amcs { first_word },
            Commands::Detail { scheme_code, days } => {
                mfx::AppCommand::Detail { scheme_code, days }
            }
            Commands::Compare { scheme_codes } => mfx::AppCommand::Compare { scheme_codes },
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => mfx::cli::setup::setup(),
        Some(cmd) => match cmd.into_app_command() {
            Some(app_command) => {
                mfx::run_command(app_command, cli.config_path.as_deref()).await
            }
            None => Ok(()),
        },
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
