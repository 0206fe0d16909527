//! Command-line argument definition.
//!
//! `stromme` with no subcommand behaves like `stromme run`.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::theme::ThemeMode;

/// stromme - sun-following light/dark theme engine for the price dashboard
#[derive(Parser, Debug)]
#[command(name = "stromme")]
#[command(version)]
#[command(about = "Sun-following light/dark theme engine for the electricity price dashboard", long_about = None)]
pub struct Cli {
    /// Load configuration from this file instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Show debug messages
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Keep the theme preference in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Follow the sun and report theme changes until interrupted
    Run,
    /// Show the theme mode, the applied theme and today's sun times
    Status,
    /// Set the theme mode (light, dark or auto)
    Set {
        #[arg(value_name = "MODE")]
        mode: ThemeMode,
    },
    /// Switch to the opposite of the applied theme
    Toggle,
    /// Show sunrise, sunset and day length
    Sun {
        /// Date to calculate for (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

impl Cli {
    /// The subcommand to run, `run` when none was given.
    pub fn action(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD ({e})"))
}
