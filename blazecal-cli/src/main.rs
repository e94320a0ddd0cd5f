mod commands;
mod render;
mod utils;

use anyhow::Result;
use blazecal_core::{Calendar, Config};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blazecal")]
#[command(about = "Month views, upcoming lists and recurring events for a shared calendar")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month grid and the upcoming list
    Month {
        /// Month to show (YYYY-MM), defaults to the current month
        month: Option<String>,
    },
    /// List occurrences in the coming days
    Upcoming {
        /// Number of days to look ahead (defaults to upcoming_days from config)
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Create an event
    New {
        title: String,

        /// Start date/time (e.g., "2026-01-05T09:00", "2026-01-05", "friday 3pm")
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration (e.g., "30m", "2h", "3days")
        #[arg(short, long)]
        duration: Option<String>,

        /// Repeat as FREQ:N, e.g. WEEKLY:4 for four weekly occurrences
        #[arg(short, long)]
        repeat: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an occurrence, or with --series the whole series
    Delete {
        /// Occurrence ID (`<uid>-YYYYMMDD`) or master uid
        id: String,

        /// Delete every occurrence of the series
        #[arg(long)]
        series: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    let calendar = Calendar::from_config(&config);
    debug!(store = %calendar.transport().describe(), "Using calendar store");

    match cli.command {
        Commands::Month { month } => {
            commands::month::run(&calendar, month.as_deref(), cli.json).await
        }
        Commands::Upcoming { days } => {
            let days = days.unwrap_or(calendar.upcoming_days());
            commands::upcoming::run(&calendar, days, cli.json).await
        }
        Commands::New {
            title,
            start,
            end,
            duration,
            repeat,
            location,
            description,
        } => {
            let args = commands::new::NewArgs {
                title,
                start,
                end,
                duration,
                repeat,
                location,
                description,
            };
            commands::new::run(&calendar, args, cli.json).await
        }
        Commands::Delete { id, series } => {
            commands::delete::run(&calendar, &id, series, cli.json).await
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (warnings only by default).
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
