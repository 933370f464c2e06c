//! Command line arguments.

use clap::{Parser, Subcommand, ValueEnum};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable output for local development.
    Pretty,
    /// Line-delimited JSON for log aggregation.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "registrar", about = "Course registration scraper and read API")]
pub struct Args {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = TracingFormat::Pretty)]
    pub tracing: TracingFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a one-shot import for the given semesters, then exit.
    Import {
        /// Semester ids to import, e.g. 202101.
        #[arg(required = true)]
        semester_ids: Vec<String>,
    },
}
