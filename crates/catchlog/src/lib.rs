//! `catchlog` - An offline fishing trip logbook
//!
//! This library provides the trip wizard (start, catch log, end, review,
//! submit), the validators and statistics behind its pages, and the local
//! document store the records are kept in.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod stats;
pub mod storage;
pub mod validate;
pub mod wizard;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Catch, CatchInput, CatchPatch, Trip, TripStatus, WizardStep};
pub use storage::{DocumentStore, Filter, Storage, StorageStats};
pub use wizard::{FormOutcome, Navigation, Route, Wizard, WriteOutcome};
