//! Command-line interface for catchlog.
//!
//! This module provides the CLI structure for the `catchlog` binary. Each
//! wizard page is reachable as a subcommand.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{CatchArgs, CatchCommand, CatchEditArgs, ConfigCommand, TripCommand};

/// catchlog - Log fishing trips offline
///
/// Walks a trip through start, catch log, end and review, keeping every
/// record in a local database.
#[derive(Debug, Parser)]
#[command(name = "catchlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start, end, review and submit trips
    #[command(subcommand)]
    Trip(TripCommand),

    /// Log and correct catches
    #[command(subcommand)]
    Catch(CatchCommand),

    /// List the species offered by the catch form
    Species,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
