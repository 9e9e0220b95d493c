//! Trip records and the wizard state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::Document;

/// The four pages of the trip wizard, in order.
///
/// Stored as the integers 1–4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    /// Trip date, start time and weather.
    Start = 1,
    /// Logging catches.
    CatchLog = 2,
    /// End time and weather.
    End = 3,
    /// Summary before submission.
    Review = 4,
}

impl WizardStep {
    /// All steps in wizard order.
    pub const ALL: [Self; 4] = [Self::Start, Self::CatchLog, Self::End, Self::Review];

    /// The step number, 1 through 4.
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    /// The step after this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::CatchLog),
            Self::CatchLog => Some(Self::End),
            Self::End => Some(Self::Review),
            Self::Review => None,
        }
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|step| step.number() == value)
            .ok_or_else(|| format!("wizard step must be 1-4, got {value}"))
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::CatchLog => "catch log",
            Self::End => "end",
            Self::Review => "review",
        };
        write!(f, "{} ({name})", self.number())
    }
}

/// Lifecycle status of a trip.
///
/// Variants are declared in lifecycle order; a trip only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripStatus {
    /// Created, start form not yet saved. Older records store this as `"none"`.
    #[serde(alias = "none")]
    NotStarted,
    /// Start form saved; catches being logged.
    InProgress,
    /// Trip ended, waiting for submission.
    NotSubmitted,
    /// Submitted.
    Submitted,
}

impl TripStatus {
    /// The stored name of this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::NotSubmitted => "not-submitted",
            Self::Submitted => "submitted",
        }
    }

    /// Move to `to`, which must not be earlier in the lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] for a backward move.
    pub fn transition(self, to: Self) -> Result<Self> {
        if to < self {
            return Err(Error::InvalidTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(to)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fishing trip being logged through the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// Trip date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_date: Option<String>,
    /// Start time, `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// End time, `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Weather when the trip started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_weather: Option<String>,
    /// Weather when the trip ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_weather: Option<String>,
    /// Furthest wizard step reached.
    pub step: WizardStep,
    /// Lifecycle status.
    pub status: TripStatus,
    /// When the trip was created.
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Create a trip at the first wizard step.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trip_date: None,
            start_time: None,
            end_time: None,
            start_weather: None,
            end_weather: None,
            step: WizardStep::Start,
            status: TripStatus::NotStarted,
            created_at: Utc::now(),
        }
    }

    /// Record that `step` was reached. Never lowers the stored step.
    pub fn reach(&mut self, step: WizardStep) {
        self.step = self.step.max(step);
    }

    /// Move to `status` and reach `step` together.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `status` is a backward move;
    /// the trip is left unchanged.
    pub fn advance(&mut self, status: TripStatus, step: WizardStep) -> Result<()> {
        self.status = self.status.transition(status)?;
        self.reach(step);
        Ok(())
    }

    /// Whether the trip can still be picked up in the wizard.
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        self.status != TripStatus::Submitted
    }
}

impl Default for Trip {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for Trip {
    const COLLECTION: &'static str = "trips";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Raw input of the Start page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartTripInput {
    /// Trip date as typed.
    pub trip_date: String,
    /// Start time as typed.
    pub start_time: String,
    /// Start weather as typed.
    pub start_weather: String,
}

/// Raw input of the End page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndTripInput {
    /// End time as typed.
    pub end_time: String,
    /// End weather as typed.
    pub end_weather: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trip_defaults() {
        let trip = Trip::new();
        assert_eq!(trip.step, WizardStep::Start);
        assert_eq!(trip.status, TripStatus::NotStarted);
        assert!(trip.trip_date.is_none());
        assert!(uuid::Uuid::parse_str(&trip.id).is_ok());
    }

    #[test]
    fn test_trip_ids_are_unique() {
        assert_ne!(Trip::new().id, Trip::new().id);
    }

    #[test]
    fn test_reach_is_monotonic() {
        let mut trip = Trip::new();
        trip.reach(WizardStep::End);
        assert_eq!(trip.step, WizardStep::End);

        trip.reach(WizardStep::CatchLog);
        assert_eq!(trip.step, WizardStep::End);
    }

    #[test]
    fn test_status_forward_transitions() {
        let status = TripStatus::NotStarted;
        let status = status.transition(TripStatus::InProgress).unwrap();
        let status = status.transition(TripStatus::NotSubmitted).unwrap();
        let status = status.transition(TripStatus::Submitted).unwrap();
        assert_eq!(status, TripStatus::Submitted);

        assert_eq!(
            TripStatus::InProgress.transition(TripStatus::InProgress).unwrap(),
            TripStatus::InProgress
        );
    }

    #[test]
    fn test_status_backward_transition_rejected() {
        let err = TripStatus::Submitted
            .transition(TripStatus::InProgress)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }

    #[test]
    fn test_advance_leaves_trip_unchanged_on_error() {
        let mut trip = Trip::new();
        trip.advance(TripStatus::Submitted, WizardStep::Review).unwrap();

        let before = trip.clone();
        assert!(trip.advance(TripStatus::InProgress, WizardStep::CatchLog).is_err());
        assert_eq!(trip, before);
    }

    #[test]
    fn test_step_serializes_as_number() {
        let json = serde_json::to_value(WizardStep::End).unwrap();
        assert_eq!(json, serde_json::json!(3));

        let step: WizardStep = serde_json::from_value(serde_json::json!(2)).unwrap();
        assert_eq!(step, WizardStep::CatchLog);

        assert!(serde_json::from_value::<WizardStep>(serde_json::json!(5)).is_err());
    }

    #[test]
    fn test_step_next() {
        assert_eq!(WizardStep::Start.next(), Some(WizardStep::CatchLog));
        assert_eq!(WizardStep::Review.next(), None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(TripStatus::NotSubmitted).unwrap();
        assert_eq!(json, serde_json::json!("not-submitted"));

        let legacy: TripStatus = serde_json::from_value(serde_json::json!("none")).unwrap();
        assert_eq!(legacy, TripStatus::NotStarted);
    }

    #[test]
    fn test_trip_uses_store_field_names() {
        let mut trip = Trip::new();
        trip.trip_date = Some("2024-06-01".to_string());

        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(json["tripDate"], "2024-06-01");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("endTime").is_none());
        assert_eq!(json["step"], 1);
        assert_eq!(json["status"], "not-started");
    }

    #[test]
    fn test_is_resumable() {
        let mut trip = Trip::new();
        assert!(trip.is_resumable());

        trip.status = TripStatus::Submitted;
        assert!(!trip.is_resumable());
    }
}
