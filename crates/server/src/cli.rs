//! CLI argument parsing.

use clap::{Args, Parser, Subcommand};
use wastewatch_pipeline::AlertRequest;

#[derive(Parser, Debug)]
#[command(name = "wastewatch-server", about = "Monthly food-waste alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP trigger surface.
    Serve {
        /// Log notifications instead of sending them.
        #[arg(long, env = "WASTE_DRY_RUN")]
        dry_run: bool,
    },
    /// Run one alert batch and print the report as JSON.
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Waste threshold; totals strictly above it are fined with a surcharge.
    #[arg(long)]
    pub threshold: String,

    /// Month name (e.g. "March"); the current month when omitted.
    #[arg(long)]
    pub period: Option<String>,

    /// Calendar year; the current year when omitted.
    #[arg(long)]
    pub year: Option<i32>,

    /// Log notifications instead of sending them.
    #[arg(long, env = "WASTE_DRY_RUN")]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn to_request(&self) -> AlertRequest {
        AlertRequest {
            threshold: Some(self.threshold.clone()),
            period: self.period.clone(),
            year: self.year,
        }
    }
}
