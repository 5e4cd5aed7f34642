use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use commands::{config, daemon, history, run};
use moviepicks_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "moviepicks")]
#[command(about = "MoviePicks - Three themed movie recommendations, delivered daily")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick, enrich and send today's movies (one-time run)
    #[command(long_about = "Select today's themed movies from the catalog, skipping anything sent in the no-repeat window, enrich them and send the report. With --dry-run the report is printed instead of sent and history is left untouched.")]
    Run {
        /// Print the report instead of sending it; history is not written
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Evaluate theme and no-repeat window for this day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },
    /// Run as daemon with internal scheduler
    #[command(long_about = "Run MoviePicks in the foreground and send picks on every fire of the cron schedule (six fields with seconds, evaluated in UTC). One run happens at startup unless --no-startup-run is given. Stop with Ctrl-C.")]
    Daemon {
        /// Cron schedule expression (e.g., '0 0 4 * * *' for 04:00 UTC daily)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the run on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Show recently sent movies
    History {
        /// Number of entries to show, newest first
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Inspect or initialize configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks secrets)
    Show,

    /// Write a config.toml with every default spelled out
    Init {
        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },

    /// Store a setting in credentials.toml (environment variables still win)
    #[command(long_about = "Store one of TMDB_API_KEY, ULTRA_INSTANCE_ID, ULTRA_TOKEN, WHATSAPP_TO or OPENAI_API_KEY in credentials.toml. The file is readable by the owner only. A variable of the same name in the environment takes precedence.")]
    SetCredential {
        /// Setting name, e.g. TMDB_API_KEY
        name: String,
        /// Value to store
        value: String,
    },

    /// Remove a setting from credentials.toml
    UnsetCredential {
        /// Setting name, e.g. OPENAI_API_KEY
        name: String,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The daemon writes to a rotating log file; everything else to stderr
    let log_file = match cli.command {
        Commands::Daemon { .. } => Some(PathManager::default().daemon_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Run { dry_run, date } => run::run_picks(dry_run, date, &output).await,
        Commands::Daemon {
            schedule,
            no_startup_run,
        } => daemon::run_daemon(schedule, no_startup_run, &output).await,
        Commands::History { limit } => history::show_history(limit, &output),
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
