//! costgrade CLI — the student- and instructor-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "costgrade", version, about = "Logistics-cost grading tool")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides config and COSTGRADE_DATABASE)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for grading results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config, sample roster, and database schema
    Init,

    /// Load students, invoices and answer keys from a roster file
    Seed {
        /// Path to roster .toml
        #[arg(long)]
        roster: PathBuf,
    },

    /// Check a roster file for mistakes without loading it
    Validate {
        /// Path to roster .toml
        #[arg(long)]
        roster: PathBuf,
    },

    /// Show a student's details
    Student {
        /// 10-digit student number
        student_id: String,
    },

    /// List a student's invoices
    Invoices {
        /// 10-digit student number
        student_id: String,

        /// Also show the reference answers
        #[arg(long)]
        with_answers: bool,
    },

    /// Grade and record answers for one invoice
    Submit {
        /// 10-digit student number
        student_id: String,

        /// Invoice number
        #[arg(long)]
        invoice: u32,

        #[arg(long)]
        logistics_cost: Option<f64>,

        #[arg(long)]
        shipping_cost: Option<f64>,

        #[arg(long)]
        customs_duty: Option<f64>,

        #[arg(long)]
        excise_tax: Option<f64>,

        #[arg(long)]
        vat: Option<f64>,

        #[arg(long)]
        total_cost: Option<f64>,

        /// Refuse to grade unless all six fields are given
        #[arg(long)]
        require_all: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a student's recorded submissions and summary
    Submissions {
        /// 10-digit student number
        student_id: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "costgrade=debug"
    } else {
        "costgrade=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = commands::Context {
        config: cli.config,
        database: cli.database,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(&ctx),
        Commands::Seed { roster } => commands::seed::execute(&ctx, roster),
        Commands::Validate { roster } => commands::validate::execute(roster),
        Commands::Student { student_id } => commands::student::execute(&ctx, &student_id),
        Commands::Invoices {
            student_id,
            with_answers,
        } => commands::invoices::execute(&ctx, &student_id, with_answers),
        Commands::Submit {
            student_id,
            invoice,
            logistics_cost,
            shipping_cost,
            customs_duty,
            excise_tax,
            vat,
            total_cost,
            require_all,
            format,
        } => {
            let answers = costgrade_core::model::SubmittedAnswers {
                customs_duty,
                excise_tax,
                vat,
                logistics_cost,
                shipping_cost,
                total_cost,
            };
            commands::submit::execute(&ctx, &student_id, invoice, answers, require_all, format)
        }
        Commands::Submissions { student_id } => {
            commands::submissions::execute(&ctx, &student_id)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
