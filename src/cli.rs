use clap::{Parser, Subcommand};

use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "company-jobs", version)]
#[command(about = "Load hh.ru postings for known employers into PostgreSQL")]
pub struct Cli {
    /// Target database name (overrides DB_NAME)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Keyword searched in job titles by the report
    #[arg(short, long, default_value = "driver", global = true)]
    pub keyword: String,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch postings, rebuild the database and print the report (default)
    Run,

    /// Fetch postings and rebuild the database without reporting
    Load,

    /// Print the report for an already loaded database
    Report,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}
