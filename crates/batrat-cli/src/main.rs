//! CLI for batrat: do bats treat rats as predators?

mod commands;
mod tui;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "batrat")]
#[command(about = "batrat: bat landing behaviour around rat arrivals")]
#[command(version = batrat_core::VERSION)]
struct Cli {
    /// Bat landing dataset (CSV)
    #[arg(long, global = true, default_value = "dataset1.csv")]
    landings: String,

    /// Rat arrival log (CSV)
    #[arg(long, global = true, default_value = "dataset2.csv")]
    arrivals: String,

    /// JSON file overriding analysis thresholds
    #[arg(long, global = true)]
    config: Option<String>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the first rows of a dataset
    Preview {
        #[arg(long, default_value = "landings", value_parser = ["landings", "arrivals"])]
        dataset: String,

        /// Number of rows
        #[arg(long, default_value = "5")]
        rows: usize,
    },

    /// Summary statistics for every column of a dataset
    Describe {
        #[arg(long, default_value = "landings", value_parser = ["landings", "arrivals"])]
        dataset: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Label frequencies of a categorical field, optionally split by a second field
    Counts {
        /// Categorical field to count
        #[arg(default_value = "risk")]
        field: String,

        /// Split counts by this categorical field (e.g. season)
        #[arg(long)]
        by: Option<String>,

        #[arg(long, default_value = "landings", value_parser = ["landings", "arrivals"])]
        dataset: String,
    },

    /// Chi-square test of independence between two categorical landing fields
    Chisq {
        #[arg(default_value = "risk")]
        row: String,

        #[arg(default_value = "reward")]
        col: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Logistic regression of a binary landing outcome on continuous predictors
    Logit {
        #[arg(long, default_value = "risk")]
        outcome: String,

        /// Comma-separated continuous predictors
        #[arg(
            long,
            value_delimiter = ',',
            default_values = ["seconds_after_rat_arrival", "hours_after_sunset"]
        )]
        predictors: Vec<String>,

        /// Print JSON instead of a summary table
        #[arg(long)]
        json: bool,
    },

    /// Text histogram of a continuous field
    Hist {
        field: String,

        #[arg(long, default_value = "landings", value_parser = ["landings", "arrivals"])]
        dataset: String,

        /// Number of bins (default: config, then Sturges' rule)
        #[arg(long)]
        bins: Option<usize>,
    },

    /// Write a Markdown report of the full analysis
    Report {
        /// Output path (stdout when omitted)
        #[arg(long)]
        output: Option<String>,
    },

    /// Interactive explorer (TUI)
    Explore,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = commands::load_config(cli.config.as_deref());
    let session = commands::load_session(&cli.landings, &cli.arrivals);

    match cli.command {
        Commands::Preview { dataset, rows } => {
            commands::preview::run(&session, commands::parse_dataset(&dataset), rows)
        }
        Commands::Describe { dataset, json } => {
            commands::describe::run(&session, commands::parse_dataset(&dataset), json)
        }
        Commands::Counts { field, by, dataset } => commands::counts::run(
            &session,
            commands::parse_dataset(&dataset),
            &field,
            by.as_deref(),
        ),
        Commands::Chisq { row, col, json } => {
            commands::chisq::run(&session, &config, &row, &col, json)
        }
        Commands::Logit {
            outcome,
            predictors,
            json,
        } => {
            let predictors: Vec<&str> = predictors.iter().map(String::as_str).collect();
            commands::logit::run(&session, &config, &outcome, &predictors, json)
        }
        Commands::Hist {
            field,
            dataset,
            bins,
        } => commands::hist::run(
            &session,
            commands::parse_dataset(&dataset),
            &field,
            bins.or(config.histogram_bins),
        ),
        Commands::Report { output } => commands::report::run(&session, &config, output.as_deref()),
        Commands::Explore => commands::explore::run(&session, &config),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
