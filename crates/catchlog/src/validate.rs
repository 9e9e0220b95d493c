//! Form validation.
//!
//! Validators return data, never [`crate::Error`]: a single field yields
//! `Option<String>` (an error message, or `None` when valid), a record yields
//! [`FieldErrors`] containing only the fields that failed, and a list of
//! records yields [`BatchErrors`] containing only the records that failed.

use std::collections::BTreeMap;

use crate::format::parse_date;
use crate::model::{CatchInput, CatchPatch, EndTripInput, StartTripInput};

/// Field name to error message, for the fields that failed.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// List index to that record's errors, for the records that failed.
pub type BatchErrors = BTreeMap<usize, FieldErrors>;

/// Upper bounds applied to catch measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchLimits {
    /// Heaviest accepted catch, in pounds.
    pub max_weight: f64,
    /// Longest accepted catch, in inches.
    pub max_length: f64,
}

impl Default for CatchLimits {
    fn default() -> Self {
        Self {
            max_weight: 1000.0,
            max_length: 500.0,
        }
    }
}

/// Parse a typed number. Blank, non-numeric and non-finite input is `None`.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Fails when `value` is blank. `"0"` counts as present.
#[must_use]
pub fn validate_required(value: &str, name: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{name} is required"))
    } else {
        None
    }
}

/// Check that `value` is a number within bounds.
///
/// A blank value is valid; presence is [`validate_required`]'s job. The upper
/// bound is inclusive. The lower bound is inclusive only when `allow_zero` is
/// set, otherwise the value must be strictly greater than `min`.
#[must_use]
pub fn validate_number_range(
    value: &str,
    min: f64,
    max: f64,
    name: &str,
    allow_zero: bool,
) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    let Some(number) = parse_number(value) else {
        return Some(format!("{name} must be a number"));
    };

    if allow_zero {
        if number < min || number > max {
            return Some(format!("{name} must be between {min} and {max}"));
        }
    } else if number <= min || number > max {
        return Some(format!(
            "{name} must be greater than {min} and at most {max}"
        ));
    }
    None
}

/// Latitude in `[-90, 90]`; blank is valid.
#[must_use]
pub fn validate_latitude(value: &str) -> Option<String> {
    validate_number_range(value, -90.0, 90.0, "Latitude", true)
}

/// Longitude in `[-180, 180]`; blank is valid.
#[must_use]
pub fn validate_longitude(value: &str) -> Option<String> {
    validate_number_range(value, -180.0, 180.0, "Longitude", true)
}

/// Validate one catch against the default limits.
#[must_use]
pub fn validate_catch(input: &CatchInput) -> FieldErrors {
    validate_catch_with(input, &CatchLimits::default())
}

/// Validate one catch.
///
/// Species, weight, length and time are required. Weight and length are
/// range-checked only once present; coordinates only when given.
#[must_use]
pub fn validate_catch_with(input: &CatchInput, limits: &CatchLimits) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(message) = validate_required(&input.species, "Species") {
        errors.insert("species", message);
    }

    let measured = [
        ("weight", "Weight", &input.weight, limits.max_weight),
        ("length", "Length", &input.length, limits.max_length),
    ];
    for (field, name, value, max) in measured {
        let message = validate_required(value, name)
            .or_else(|| validate_number_range(value, 0.0, max, name, false));
        if let Some(message) = message {
            errors.insert(field, message);
        }
    }

    if let Some(message) = validate_required(&input.time, "Time") {
        errors.insert("time", message);
    }
    if let Some(message) = validate_latitude(&input.latitude) {
        errors.insert("latitude", message);
    }
    if let Some(message) = validate_longitude(&input.longitude) {
        errors.insert("longitude", message);
    }

    errors
}

/// Validate a list of catches against the default limits.
#[must_use]
pub fn validate_catches(inputs: &[CatchInput]) -> BatchErrors {
    validate_catches_with(inputs, &CatchLimits::default())
}

/// Validate a list of catches, keyed by position. The wizard may leave the
/// catch step only when the result is empty.
#[must_use]
pub fn validate_catches_with(inputs: &[CatchInput], limits: &CatchLimits) -> BatchErrors {
    inputs
        .iter()
        .enumerate()
        .filter_map(|(index, input)| {
            let errors = validate_catch_with(input, limits);
            (!errors.is_empty()).then_some((index, errors))
        })
        .collect()
}

/// Validate an in-place edit before it is applied.
///
/// Edits are not range-checked (the batch gate does that), but every number
/// set by the patch must be finite: NaN and infinity have no JSON form.
#[must_use]
pub fn validate_catch_patch(patch: &CatchPatch) -> FieldErrors {
    [
        ("weight", "Weight", patch.weight),
        ("length", "Length", patch.length),
        ("latitude", "Latitude", patch.latitude.flatten()),
        ("longitude", "Longitude", patch.longitude.flatten()),
    ]
    .into_iter()
    .filter(|(_, _, value)| value.is_some_and(|v| !v.is_finite()))
    .map(|(field, name, _)| (field, format!("{name} must be a number")))
    .collect()
}

/// Validate the Start page: a real trip date and a start time.
#[must_use]
pub fn validate_start_trip(input: &StartTripInput) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(message) = validate_required(&input.trip_date, "Trip date") {
        errors.insert("tripDate", message);
    } else if parse_date(&input.trip_date).is_none() {
        errors.insert("tripDate", "Trip date must be a valid date".to_string());
    }
    if let Some(message) = validate_required(&input.start_time, "Start time") {
        errors.insert("startTime", message);
    }

    errors
}

/// Validate the End page: an end time.
#[must_use]
pub fn validate_end_trip(input: &EndTripInput) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(message) = validate_required(&input.end_time, "End time") {
        errors.insert("endTime", message);
    }
    errors
}
