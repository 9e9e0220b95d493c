//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::model::{CatchInput, CatchPatch, EndTripInput, StartTripInput};

/// Trip commands, one per wizard page.
#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// Start a new trip, or redo the start page of an open one
    Start {
        /// Trip date (YYYY-MM-DD)
        #[arg(short, long, default_value = "")]
        date: String,

        /// Start time (HH:MM)
        #[arg(short, long, default_value = "")]
        time: String,

        /// Weather at the start
        #[arg(short, long, default_value = "")]
        weather: String,

        /// Reopen this trip instead of creating one
        #[arg(long, value_name = "ID")]
        trip: Option<String>,
    },

    /// List trips
    List {
        /// Include submitted trips
        #[arg(short, long)]
        all: bool,
    },

    /// Show where an unfinished trip was left
    Resume {
        /// Trip id
        id: String,
    },

    /// End a trip
    End {
        /// Trip id
        id: String,

        /// End time (HH:MM)
        #[arg(short, long, default_value = "")]
        time: String,

        /// Weather at the end
        #[arg(short, long, default_value = "")]
        weather: String,
    },

    /// Show a trip summary
    Review {
        /// Trip id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Submit an ended trip
    Submit {
        /// Trip id
        id: String,
    },

    /// Delete a trip and its catches
    Delete {
        /// Trip id
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

impl TripCommand {
    /// The start form as typed, for `trip start`.
    #[must_use]
    pub fn start_input(date: &str, time: &str, weather: &str) -> StartTripInput {
        StartTripInput {
            trip_date: date.to_string(),
            start_time: time.to_string(),
            start_weather: weather.to_string(),
        }
    }

    /// The end form as typed, for `trip end`.
    #[must_use]
    pub fn end_input(time: &str, weather: &str) -> EndTripInput {
        EndTripInput {
            end_time: time.to_string(),
            end_weather: weather.to_string(),
        }
    }
}

/// Catch form fields.
#[derive(Debug, Args)]
pub struct CatchArgs {
    /// Species name
    #[arg(short, long, default_value = "")]
    pub species: String,

    /// Weight in pounds
    #[arg(short, long, default_value = "")]
    pub weight: String,

    /// Length in inches
    #[arg(short, long, default_value = "")]
    pub length: String,

    /// Time of the catch (HH:MM)
    #[arg(short, long, default_value = "")]
    pub time: String,

    /// Latitude in degrees
    #[arg(long = "lat", default_value = "", allow_hyphen_values = true)]
    pub latitude: String,

    /// Longitude in degrees
    #[arg(long = "lon", default_value = "", allow_hyphen_values = true)]
    pub longitude: String,
}

impl From<CatchArgs> for CatchInput {
    fn from(args: CatchArgs) -> Self {
        Self {
            species: args.species,
            weight: args.weight,
            length: args.length,
            time: args.time,
            latitude: args.latitude,
            longitude: args.longitude,
        }
    }
}

/// Fields changed by `catch edit`.
#[derive(Debug, Args)]
pub struct CatchEditArgs {
    /// New species
    #[arg(short, long)]
    pub species: Option<String>,

    /// New weight in pounds
    #[arg(short, long)]
    pub weight: Option<f64>,

    /// New length in inches
    #[arg(short, long)]
    pub length: Option<f64>,

    /// New time (HH:MM)
    #[arg(short, long)]
    pub time: Option<String>,

    /// New latitude
    #[arg(long = "lat", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// New longitude
    #[arg(long = "lon", allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// Remove the stored coordinates
    #[arg(long, conflicts_with_all = ["latitude", "longitude"])]
    pub clear_position: bool,
}

impl From<CatchEditArgs> for CatchPatch {
    fn from(args: CatchEditArgs) -> Self {
        let (latitude, longitude) = if args.clear_position {
            (Some(None), Some(None))
        } else {
            (args.latitude.map(Some), args.longitude.map(Some))
        };
        Self {
            species: args.species,
            weight: args.weight,
            length: args.length,
            latitude,
            longitude,
            time: args.time,
        }
    }
}

/// Catch log commands.
#[derive(Debug, Subcommand)]
pub enum CatchCommand {
    /// Log a catch
    Add {
        /// Trip id
        trip: String,

        /// Catch fields
        #[command(flatten)]
        fields: CatchArgs,
    },

    /// List a trip's catches, most recent first
    List {
        /// Trip id
        trip: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change fields of a logged catch
    Edit {
        /// Trip id
        trip: String,

        /// Catch id
        id: String,

        /// Fields to change
        #[command(flatten)]
        fields: CatchEditArgs,
    },

    /// Remove a catch
    Remove {
        /// Catch id
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Check every catch and move on to ending the trip
    Done {
        /// Trip id
        trip: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_args_into_input() {
        let args = CatchArgs {
            species: "Halibut".to_string(),
            weight: "40".to_string(),
            length: "36".to_string(),
            time: "10:00".to_string(),
            latitude: "-33.5".to_string(),
            longitude: String::new(),
        };
        let input = CatchInput::from(args);
        assert_eq!(input.species, "Halibut");
        assert_eq!(input.latitude, "-33.5");
        assert!(input.longitude.is_empty());
    }

    #[test]
    fn test_edit_args_into_patch() {
        let args = CatchEditArgs {
            species: None,
            weight: Some(3.5),
            length: None,
            time: None,
            latitude: None,
            longitude: Some(-70.25),
            clear_position: false,
        };
        let patch = CatchPatch::from(args);
        assert_eq!(patch.weight, Some(3.5));
        assert_eq!(patch.latitude, None);
        assert_eq!(patch.longitude, Some(Some(-70.25)));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_edit_args_clear_position() {
        let args = CatchEditArgs {
            species: None,
            weight: None,
            length: None,
            time: None,
            latitude: None,
            longitude: None,
            clear_position: true,
        };
        let patch = CatchPatch::from(args);
        assert_eq!(patch.latitude, Some(None));
        assert_eq!(patch.longitude, Some(None));
    }

    #[test]
    fn test_form_inputs() {
        let start = TripCommand::start_input("2024-06-01", "06:00", "");
        assert_eq!(start.trip_date, "2024-06-01");
        assert!(start.start_weather.is_empty());

        let end = TripCommand::end_input("15:00", "Rain");
        assert_eq!(end.end_weather, "Rain");
    }
}
