//! academage CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use academage_core::model::{AgeEncoding, SubjectFamily};

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "academage",
    version,
    about = "Academic age and standardized score calculator"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a raw score to an academic age
    Convert {
        /// Test id or name (see `list-tests`)
        #[arg(long)]
        test: String,

        /// Raw score
        #[arg(long, allow_negative_numbers = true)]
        score: i64,

        /// Also print the years/months rendering
        #[arg(long)]
        display: bool,
    },

    /// Convert a raw component score to a 1-5 standardized score
    Standardize {
        /// Component name (e.g. "Visual Perception")
        #[arg(long)]
        component: String,

        /// Raw score
        #[arg(long, allow_negative_numbers = true)]
        score: i64,
    },

    /// Compute chronological age at the test date
    Age {
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: NaiveDate,

        /// Test date (YYYY-MM-DD)
        #[arg(long)]
        test_date: NaiveDate,

        /// Encoding: months or tenths (default from config)
        #[arg(long)]
        encoding: Option<AgeEncoding>,
    },

    /// Compare an academic age with a chronological age
    Compare {
        /// Academic age as stored (e.g. "6.0", "< 6.0")
        #[arg(long, allow_hyphen_values = true)]
        academic: String,

        /// Chronological age as stored (e.g. "6.11")
        #[arg(long, allow_hyphen_values = true)]
        chronological: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run the full assessment for one student
    Assess {
        /// Test id or name
        #[arg(long)]
        test: String,

        /// Raw score
        #[arg(long, allow_negative_numbers = true)]
        score: i64,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: NaiveDate,

        /// Test date (YYYY-MM-DD)
        #[arg(long)]
        test_date: NaiveDate,

        /// Component raw score as NAME=SCORE (repeatable)
        #[arg(long = "component", value_parser = commands::assess::parse_component)]
        components: Vec<(String, i64)>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Assess every student in a roster file
    Batch {
        /// Path to a .toml roster
        #[arg(long)]
        roster: PathBuf,

        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List the available tests
    ListTests {
        /// Filter to one subject family
        #[arg(long)]
        family: Option<SubjectFamily>,
    },

    /// Validate norm table TOML files
    Validate {
        /// Path to a norm file or directory
        #[arg(long)]
        norms: PathBuf,
    },

    /// Create a starter config, norm file and roster
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("academage=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Convert {
            test,
            score,
            display,
        } => commands::convert::execute(test, score, display, config),
        Commands::Standardize { component, score } => {
            commands::standardize::execute(component, score)
        }
        Commands::Age {
            dob,
            test_date,
            encoding,
        } => commands::age::execute(dob, test_date, encoding, config),
        Commands::Compare {
            academic,
            chronological,
            format,
        } => commands::compare::execute(academic, chronological, format),
        Commands::Assess {
            test,
            score,
            dob,
            test_date,
            components,
            format,
        } => commands::assess::execute(test, score, dob, test_date, components, format, config),
        Commands::Batch {
            roster,
            output,
            format,
        } => commands::batch::execute(roster, output, format, config),
        Commands::ListTests { family } => commands::list_tests::execute(family, config),
        Commands::Validate { norms } => commands::validate::execute(norms),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
