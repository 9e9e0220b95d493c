//! Wizard pages and the state passed between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Trip, WizardStep};

/// A page of the trip wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Trip list and entry point.
    #[serde(rename = "/")]
    Home,
    /// Trip date, start time and weather.
    #[serde(rename = "/start")]
    Start,
    /// Catch log.
    #[serde(rename = "/catch")]
    Catch,
    /// End time and weather.
    #[serde(rename = "/end")]
    End,
    /// Summary before submission.
    #[serde(rename = "/review")]
    Review,
    /// Submission confirmation.
    #[serde(rename = "/confirm")]
    Confirm,
}

impl Route {
    /// Every page, in flow order.
    pub const ALL: [Self; 6] = [
        Self::Home,
        Self::Start,
        Self::Catch,
        Self::End,
        Self::Review,
        Self::Confirm,
    ];

    /// The page path.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Start => "/start",
            Self::Catch => "/catch",
            Self::End => "/end",
            Self::Review => "/review",
            Self::Confirm => "/confirm",
        }
    }

    /// Look a page up by path.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// The page that picks a trip up at `step`.
    #[must_use]
    pub fn for_step(step: WizardStep) -> Self {
        match step {
            WizardStep::Start => Self::Start,
            WizardStep::CatchLog => Self::Catch,
            WizardStep::End => Self::End,
            WizardStep::Review => Self::Review,
        }
    }

    /// Whether the page shows an existing trip.
    #[must_use]
    pub fn needs_trip(self) -> bool {
        !matches!(self, Self::Home | Self::Start)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where to go next, carrying the `{tripId}` page state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    /// Destination page.
    pub route: Route,
    /// Trip the destination page should load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
}

impl Navigation {
    /// Back to the trip list.
    #[must_use]
    pub fn home() -> Self {
        Self {
            route: Route::Home,
            trip_id: None,
        }
    }

    /// Go to `route` for a trip.
    #[must_use]
    pub fn to(route: Route, trip_id: impl Into<String>) -> Self {
        Self {
            route,
            trip_id: Some(trip_id.into()),
        }
    }

    /// Pick `trip` up where it was left.
    #[must_use]
    pub fn resume(trip: &Trip) -> Self {
        Self::to(Route::for_step(trip.step), trip.id.clone())
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.trip_id {
            Some(id) => write!(f, "{} (trip {id})", self.route),
            None => write!(f, "{}", self.route),
        }
    }
}
