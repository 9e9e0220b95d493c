//! Records stored by catchlog: trips and the catches logged within them.

mod catch;
mod trip;

pub use catch::{sort_most_recent_first, Catch, CatchInput, CatchPatch};
pub use trip::{EndTripInput, StartTripInput, Trip, TripStatus, WizardStep};
