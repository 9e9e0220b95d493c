//! The trip wizard.
//!
//! Each page of the flow (`/start`, `/catch`, `/end`, `/review`, `/confirm`)
//! is an operation on [`Wizard`], which owns the document store it was
//! given. Pages hand each other a [`Navigation`] carrying the trip id.
//!
//! Form validation failures come back as data ([`FormOutcome::Invalid`],
//! [`BatchOutcome::Blocked`]); only store failures and lifecycle violations
//! are [`Error`]s.

mod route;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::format::format_to_yyyy_mm_dd;
use crate::model::{
    sort_most_recent_first, Catch, CatchInput, CatchPatch, EndTripInput, StartTripInput, Trip,
    TripStatus, WizardStep,
};
use crate::stats::{aggregate_by_species, trip_statistics, SpeciesSummary, TripStats};
use crate::storage::{Collection, Document, DocumentStore, Filter};
use crate::validate::{
    validate_catch_patch, validate_catch_with, validate_catches_with, validate_end_trip,
    validate_start_trip, BatchErrors, CatchLimits, FieldErrors,
};

pub use route::{Navigation, Route};

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome<T> {
    /// The form was valid and the record stored.
    Saved {
        /// The stored record.
        record: T,
        /// The page to show next.
        next: Navigation,
    },
    /// The form was rejected; nothing was stored.
    Invalid(FieldErrors),
}

impl<T> FormOutcome<T> {
    /// Whether the form was saved.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Result of leaving the catch log.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every catch passed; go on.
    Advanced(Navigation),
    /// Some catches failed, keyed by their position in the catch log.
    Blocked(BatchErrors),
}

/// Result of an in-place edit.
#[derive(Debug)]
pub enum WriteOutcome {
    /// The store accepted the change.
    Persisted,
    /// The change was refused before anything was touched.
    Rejected(FieldErrors),
    /// The store rejected the change and the local copy was restored.
    Reverted {
        /// Why the store rejected it.
        error: Error,
    },
}

impl WriteOutcome {
    /// Whether the change reached the store.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

/// What a page should do on entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PageLoad {
    /// Show an empty form.
    Fresh,
    /// Show this trip.
    Ready(Trip),
    /// The page cannot be shown; go elsewhere.
    Redirect(Navigation),
}

/// The catch log page's local state.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchLog {
    /// The trip being logged.
    pub trip: Trip,
    /// Its catches, most recent first.
    pub catches: Vec<Catch>,
}

impl CatchLog {
    /// The catch with `id`, if shown.
    #[must_use]
    pub fn catch(&self, id: &str) -> Option<&Catch> {
        self.catches.iter().find(|c| c.id == id)
    }
}

/// The review page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// The trip.
    pub trip: Trip,
    /// Its catches, most recent first.
    pub catches: Vec<Catch>,
    /// Per-species totals.
    pub by_species: Vec<SpeciesSummary>,
    /// Whole-trip totals.
    pub stats: TripStats,
}

/// A trip that can be picked up again, with where to pick it up.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumableTrip {
    /// The trip.
    pub trip: Trip,
    /// The page it was left on.
    pub next: Navigation,
}

/// Page controllers over a document store.
#[derive(Debug)]
pub struct Wizard<S> {
    store: S,
    limits: CatchLimits,
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Refuse changes to a trip that was already submitted.
fn ensure_open(trip: &Trip) -> Result<()> {
    if trip.status == TripStatus::Submitted {
        return Err(Error::InvalidTransition {
            from: TripStatus::Submitted.to_string(),
            to: TripStatus::InProgress.to_string(),
        });
    }
    Ok(())
}

impl<S: DocumentStore> Wizard<S> {
    /// Create a wizard over `store`, checking catches against `limits`.
    #[must_use]
    pub fn new(store: S, limits: CatchLimits) -> Self {
        Self { store, limits }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The catch bounds in force.
    #[must_use]
    pub fn limits(&self) -> CatchLimits {
        self.limits
    }

    fn trips(&self) -> Collection<'_, S, Trip> {
        Collection::new(&self.store)
    }

    fn catch_records(&self) -> Collection<'_, S, Catch> {
        Collection::new(&self.store)
    }

    /// Load a trip by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] if there is no such trip, or a store
    /// error.
    pub fn load_trip(&self, trip_id: &str) -> Result<Trip> {
        if let Some(trip) = self.trips().get(trip_id)? {
            return Ok(trip);
        }
        warn!("Trip {} not found", trip_id);
        Err(Error::trip_not_found(trip_id))
    }

    /// Enter a page.
    ///
    /// Trip pages without a trip id, or with an id that no longer exists,
    /// redirect to the trip list.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn open(&self, route: Route, trip_id: Option<&str>) -> Result<PageLoad> {
        let Some(trip_id) = trip_id else {
            if route.needs_trip() {
                debug!("{} opened without a trip", route);
                return Ok(PageLoad::Redirect(Navigation::home()));
            }
            return Ok(PageLoad::Fresh);
        };

        if route == Route::Home {
            return Ok(PageLoad::Fresh);
        }

        match self.load_trip(trip_id) {
            Ok(trip) => Ok(PageLoad::Ready(trip)),
            Err(err) if err.is_not_found() => Ok(PageLoad::Redirect(Navigation::home())),
            Err(err) => Err(err),
        }
    }

    /// Trips not yet submitted, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn resumable_trips(&self) -> Result<Vec<ResumableTrip>> {
        let mut trips: Vec<Trip> = self
            .trips()
            .all()?
            .into_iter()
            .filter(Trip::is_resumable)
            .collect();
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(trips
            .into_iter()
            .map(|trip| ResumableTrip {
                next: Navigation::resume(&trip),
                trip,
            })
            .collect())
    }

    /// Every trip, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn all_trips(&self) -> Result<Vec<Trip>> {
        let mut trips = self.trips().all()?;
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trips)
    }

    /// Save the Start page.
    ///
    /// Creates a trip, or updates `trip_id` when the page was reopened.
    /// The trip moves to in progress and the catch log comes next.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] for an unknown `trip_id`,
    /// [`Error::InvalidTransition`] if the trip was submitted, or a store
    /// error.
    pub fn start_trip(
        &self,
        input: &StartTripInput,
        trip_id: Option<&str>,
    ) -> Result<FormOutcome<Trip>> {
        let existing = trip_id.map(|id| self.load_trip(id)).transpose()?;
        if let Some(trip) = &existing {
            ensure_open(trip)?;
        }

        let errors = validate_start_trip(input);
        if !errors.is_empty() {
            debug!("Start form rejected: {} field(s)", errors.len());
            return Ok(FormOutcome::Invalid(errors));
        }

        let is_new = existing.is_none();
        let mut trip = existing.unwrap_or_default();
        trip.trip_date = optional_text(&format_to_yyyy_mm_dd(&input.trip_date));
        trip.start_time = optional_text(&input.start_time);
        trip.start_weather = optional_text(&input.start_weather);
        let status = trip.status.max(TripStatus::InProgress);
        trip.advance(status, WizardStep::CatchLog)?;

        if is_new {
            self.trips().create(&trip)?;
            info!("Started trip {}", trip.id);
        } else {
            // Nulls clear fields left blank this time.
            let patch = serde_json::json!({
                "tripDate": trip.trip_date,
                "startTime": trip.start_time,
                "startWeather": trip.start_weather,
                "step": trip.step,
                "status": trip.status,
            });
            self.trips().update(&trip.id, &patch)?;
            info!("Updated start of trip {}", trip.id);
        }

        let next = Navigation::to(Route::Catch, trip.id.clone());
        Ok(FormOutcome::Saved { record: trip, next })
    }

    /// A trip's catches, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] if the trip does not exist, or a store
    /// error.
    pub fn catches(&self, trip_id: &str) -> Result<Vec<Catch>> {
        let trip = self.load_trip(trip_id)?;
        self.catches_of(&trip)
    }

    fn catches_of(&self, trip: &Trip) -> Result<Vec<Catch>> {
        let mut catches = self
            .catch_records()
            .find(&Filter::new().eq("tripId", trip.id.as_str()))?;
        sort_most_recent_first(&mut catches);
        Ok(catches)
    }

    /// Load the catch log page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] if the trip does not exist, or a store
    /// error.
    pub fn catch_log(&self, trip_id: &str) -> Result<CatchLog> {
        let trip = self.load_trip(trip_id)?;
        let catches = self.catches_of(&trip)?;
        Ok(CatchLog { trip, catches })
    }

    /// Save the catch form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] if the trip does not exist,
    /// [`Error::InvalidTransition`] if it was submitted, or a store error.
    pub fn add_catch(&self, trip_id: &str, input: &CatchInput) -> Result<FormOutcome<Catch>> {
        let trip = self.load_trip(trip_id)?;
        ensure_open(&trip)?;

        let errors = validate_catch_with(input, &self.limits);
        if !errors.is_empty() {
            debug!("Catch form rejected: {} field(s)", errors.len());
            return Ok(FormOutcome::Invalid(errors));
        }

        let catch = Catch::from_input(&trip.id, input);
        self.catch_records().create(&catch)?;
        info!("Logged {} for trip {}", catch.species, trip.id);

        Ok(FormOutcome::Saved {
            record: catch,
            next: Navigation::to(Route::Catch, trip.id),
        })
    }

    /// Edit a catch in place.
    ///
    /// A patch setting a non-finite number is [`WriteOutcome::Rejected`].
    /// Otherwise the local copy in `log` changes first. If the store then
    /// rejects the write, the local copy is put back and the failure is
    /// reported as [`WriteOutcome::Reverted`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if `catch_id` is not in `log`,
    /// [`Error::InvalidTransition`] if the trip was submitted, or a store
    /// error.
    pub fn edit_catch(
        &self,
        log: &mut CatchLog,
        catch_id: &str,
        patch: &CatchPatch,
    ) -> Result<WriteOutcome> {
        let Some(index) = log.catches.iter().position(|c| c.id == catch_id) else {
            return Err(Error::document_not_found(Catch::COLLECTION, catch_id));
        };
        // The page may be stale; the stored status decides.
        ensure_open(&self.load_trip(&log.trip.id)?)?;

        let errors = validate_catch_patch(patch);
        if !errors.is_empty() {
            debug!("Edit of catch {} rejected: {} field(s)", catch_id, errors.len());
            return Ok(WriteOutcome::Rejected(errors));
        }
        if patch.is_empty() {
            return Ok(WriteOutcome::Persisted);
        }

        let previous = log.catches[index].clone();
        patch.apply_to(&mut log.catches[index]);

        match self.catch_records().update(catch_id, patch) {
            Ok(()) => {
                debug!("Edited catch {}", catch_id);
                Ok(WriteOutcome::Persisted)
            }
            Err(error) => {
                warn!("Edit of catch {} failed, reverting: {}", catch_id, error);
                log.catches[index] = previous;
                Ok(WriteOutcome::Reverted { error })
            }
        }
    }

    /// Delete a catch. Returns `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfirmationRequired`] unless `confirmed`,
    /// [`Error::InvalidTransition`] if the catch's trip was submitted, or a
    /// store error.
    pub fn delete_catch(&self, catch_id: &str, confirmed: bool) -> Result<bool> {
        if !confirmed {
            return Err(Error::ConfirmationRequired {
                action: "deleting a catch",
            });
        }
        let Some(catch) = self.catch_records().get(catch_id)? else {
            return Ok(false);
        };
        // Orphaned catches have no trip to protect.
        if let Some(trip) = self.trips().get(&catch.trip_id)? {
            ensure_open(&trip)?;
        }

        let removed = self.catch_records().remove(catch_id)?;
        if removed {
            info!("Deleted catch {}", catch_id);
        }
        Ok(removed)
    }

    /// Leave the catch log.
    ///
    /// Every stored catch is re-checked, since catches may have been edited
    /// since they were logged. Any failure blocks the move to the End page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] if the trip does not exist,
    /// [`Error::InvalidTransition`] if it was submitted, or a store error.
    pub fn finish_catches(&self, trip_id: &str) -> Result<BatchOutcome> {
        let mut trip = self.load_trip(trip_id)?;
        ensure_open(&trip)?;

        let errors = self.catch_errors(&trip)?;
        if !errors.is_empty() {
            debug!("{} catch(es) need fixing before ending trip {}", errors.len(), trip.id);
            return Ok(BatchOutcome::Blocked(errors));
        }

        trip.reach(WizardStep::End);
        self.trips()
            .update(&trip.id, &serde_json::json!({ "step": trip.step }))?;

        Ok(BatchOutcome::Advanced(Navigation::to(Route::End, trip.id)))
    }

    /// Check every stored catch of `trip`, keyed by catch log position.
    fn catch_errors(&self, trip: &Trip) -> Result<BatchErrors> {
        let inputs: Vec<CatchInput> = self
            .catches_of(trip)?
            .iter()
            .map(Catch::to_input)
            .collect();
        Ok(validate_catches_with(&inputs, &self.limits))
    }

    /// Refuse to move `trip` on while any stored catch fails validation.
    fn ensure_catches_valid(&self, trip: &Trip) -> Result<()> {
        let errors = self.catch_errors(trip)?;
        if errors.is_empty() {
            return Ok(());
        }
        warn!("Trip {} has {} invalid catch(es)", trip.id, errors.len());
        Err(Error::CatchesInvalid {
            trip_id: trip.id.clone(),
            count: errors.len(),
        })
    }

    /// Save the End page. The trip then waits for submission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] if the trip does not exist,
    /// [`Error::InvalidTransition`] if it was submitted,
    /// [`Error::CatchesInvalid`] if a stored catch fails validation, or a
    /// store error.
    pub fn end_trip(&self, trip_id: &str, input: &EndTripInput) -> Result<FormOutcome<Trip>> {
        let mut trip = self.load_trip(trip_id)?;
        ensure_open(&trip)?;
        self.ensure_catches_valid(&trip)?;

        let errors = validate_end_trip(input);
        if !errors.is_empty() {
            debug!("End form rejected: {} field(s)", errors.len());
            return Ok(FormOutcome::Invalid(errors));
        }

        trip.end_time = optional_text(&input.end_time);
        trip.end_weather = optional_text(&input.end_weather);
        trip.advance(TripStatus::NotSubmitted, WizardStep::Review)?;
        let patch = serde_json::json!({
            "endTime": trip.end_time,
            "endWeather": trip.end_weather,
            "step": trip.step,
            "status": trip.status,
        });
        self.trips().update(&trip.id, &patch)?;
        info!("Ended trip {}", trip.id);

        let next = Navigation::to(Route::Review, trip.id.clone());
        Ok(FormOutcome::Saved { record: trip, next })
    }

    /// Load the review page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TripNotFound`] if the trip does not exist, or a store
    /// error.
    pub fn review(&self, trip_id: &str) -> Result<Review> {
        let trip = self.load_trip(trip_id)?;
        let catches = self.catches_of(&trip)?;
        Ok(Review {
            by_species: aggregate_by_species(&catches),
            stats: trip_statistics(&catches),
            trip,
            catches,
        })
    }

    /// Submit an ended trip.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless the trip is waiting for
    /// submission, [`Error::CatchesInvalid`] if a stored catch fails
    /// validation, [`Error::TripNotFound`] if the trip does not exist, or a
    /// store error.
    pub fn submit_trip(&self, trip_id: &str) -> Result<Navigation> {
        let mut trip = self.load_trip(trip_id)?;
        if trip.status != TripStatus::NotSubmitted {
            return Err(Error::InvalidTransition {
                from: trip.status.to_string(),
                to: TripStatus::Submitted.to_string(),
            });
        }
        self.ensure_catches_valid(&trip)?;

        trip.status = trip.status.transition(TripStatus::Submitted)?;
        self.trips()
            .update(&trip.id, &serde_json::json!({ "status": trip.status }))?;
        info!("Submitted trip {}", trip.id);

        Ok(Navigation::to(Route::Confirm, trip.id))
    }

    /// Delete a trip together with its catches. Returns how many catches
    /// were removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfirmationRequired`] unless `confirmed`,
    /// [`Error::TripNotFound`] if the trip does not exist, or a store error.
    pub fn delete_trip(&self, trip_id: &str, confirmed: bool) -> Result<usize> {
        if !confirmed {
            return Err(Error::ConfirmationRequired {
                action: "deleting a trip",
            });
        }
        let trip = self.load_trip(trip_id)?;

        let mut removed = 0;
        for catch in self.catches_of(&trip)? {
            if self.catch_records().remove(&catch.id)? {
                removed += 1;
            }
        }
        self.trips().remove(&trip.id)?;
        info!("Deleted trip {} and {} catch(es)", trip.id, removed);

        Ok(removed)
    }
}
