//! Catch records, the raw catch form, and partial edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Document;
use crate::validate::parse_number;

/// One fish logged within a trip.
///
/// Measurements are optional because stored records may have been edited in
/// place after creation; aggregation treats a missing value as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catch {
    /// Unique identifier.
    pub id: String,
    /// Owning trip.
    pub trip_id: String,
    /// Species name.
    #[serde(default)]
    pub species: String,
    /// Weight in pounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Length in inches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Latitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Time of day, `HH:MM`.
    #[serde(default)]
    pub time: String,
    /// When the catch was logged. Sole sort key.
    pub created_at: DateTime<Utc>,
}

impl Catch {
    /// Build a record from form input that already passed validation.
    #[must_use]
    pub fn from_input(trip_id: impl Into<String>, input: &CatchInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id: trip_id.into(),
            species: input.species.trim().to_string(),
            weight: parse_number(&input.weight),
            length: parse_number(&input.length),
            latitude: parse_number(&input.latitude),
            longitude: parse_number(&input.longitude),
            time: input.time.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    /// The record in form shape, for re-validation.
    #[must_use]
    pub fn to_input(&self) -> CatchInput {
        let text = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        CatchInput {
            species: self.species.clone(),
            weight: text(self.weight),
            length: text(self.length),
            time: self.time.clone(),
            latitude: text(self.latitude),
            longitude: text(self.longitude),
        }
    }
}

impl Document for Catch {
    const COLLECTION: &'static str = "catches";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Sort catches most recent first.
pub fn sort_most_recent_first(catches: &mut [Catch]) {
    catches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Raw input of the catch form; every field as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatchInput {
    /// Species name.
    pub species: String,
    /// Weight in pounds.
    pub weight: String,
    /// Length in inches.
    pub length: String,
    /// Time of day.
    pub time: String,
    /// Optional latitude.
    pub latitude: String,
    /// Optional longitude.
    pub longitude: String,
}

/// A partial catch record for in-place edits.
///
/// Only the fields that are set are serialized, so the store merges the
/// patch into the existing record. Coordinates are doubly optional:
/// `Some(None)` serializes as `null` and clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchPatch {
    /// New species.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    /// New weight in pounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// New length in inches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// New latitude, or `Some(None)` to clear it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub latitude: Option<Option<f64>>,
    /// New longitude, or `Some(None)` to clear it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub longitude: Option<Option<f64>>,
    /// New time of day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// A field that is present in the input, even as `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

impl CatchPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch to a local copy of a record.
    pub fn apply_to(&self, catch: &mut Catch) {
        if let Some(species) = &self.species {
            catch.species.clone_from(species);
        }
        if let Some(time) = &self.time {
            catch.time.clone_from(time);
        }
        catch.weight = self.weight.or(catch.weight);
        catch.length = self.length.or(catch.length);
        if let Some(latitude) = self.latitude {
            catch.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            catch.longitude = longitude;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn input() -> CatchInput {
        CatchInput {
            species: " Halibut ".to_string(),
            weight: "12.5".to_string(),
            length: "30".to_string(),
            time: "06:45".to_string(),
            latitude: String::new(),
            longitude: "-122.4".to_string(),
        }
    }

    #[test]
    fn test_from_input_normalizes_fields() {
        let catch = Catch::from_input("trip-1", &input());

        assert_eq!(catch.trip_id, "trip-1");
        assert_eq!(catch.species, "Halibut");
        assert_eq!(catch.weight, Some(12.5));
        assert_eq!(catch.length, Some(30.0));
        assert_eq!(catch.latitude, None);
        assert_eq!(catch.longitude, Some(-122.4));
        assert_eq!(catch.time, "06:45");
    }

    #[test]
    fn test_to_input_round_trips_values() {
        let catch = Catch::from_input("trip-1", &input());
        let form = catch.to_input();

        assert_eq!(form.species, "Halibut");
        assert_eq!(form.weight, "12.5");
        assert_eq!(form.length, "30");
        assert_eq!(form.latitude, "");
    }

    #[test]
    fn test_sort_most_recent_first() {
        let mut older = Catch::from_input("t", &input());
        older.created_at -= Duration::minutes(5);
        let newer = Catch::from_input("t", &input());

        let mut catches = vec![older.clone(), newer.clone()];
        sort_most_recent_first(&mut catches);

        assert_eq!(catches[0].id, newer.id);
        assert_eq!(catches[1].id, older.id);
    }

    #[test]
    fn test_catch_serializes_store_field_names() {
        let catch = Catch::from_input("trip-9", &input());
        let json = serde_json::to_value(&catch).unwrap();

        assert_eq!(json["tripId"], "trip-9");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("latitude").is_none());
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = CatchPatch {
            weight: Some(20.0),
            ..CatchPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "weight": 20.0 }));
    }

    #[test]
    fn test_patch_apply_to() {
        let mut catch = Catch::from_input("t", &input());
        let patch = CatchPatch {
            species: Some("Salmon".to_string()),
            length: Some(28.0),
            ..CatchPatch::default()
        };
        patch.apply_to(&mut catch);

        assert_eq!(catch.species, "Salmon");
        assert_eq!(catch.length, Some(28.0));
        assert_eq!(catch.weight, Some(12.5));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(CatchPatch::default().is_empty());
        assert!(!CatchPatch {
            time: Some("07:00".to_string()),
            ..CatchPatch::default()
        }
        .is_empty());
    }

    #[test]
    fn test_patch_clears_coordinates() {
        let mut catch = Catch::from_input("t", &input());
        assert_eq!(catch.longitude, Some(-122.4));

        let patch = CatchPatch {
            latitude: Some(Some(47.5)),
            longitude: Some(None),
            ..CatchPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "latitude": 47.5, "longitude": null })
        );
        patch.apply_to(&mut catch);

        assert_eq!(catch.latitude, Some(47.5));
        assert_eq!(catch.longitude, None);
    }

    #[test]
    fn test_patch_deserializes_null_as_clear() {
        let patch: CatchPatch =
            serde_json::from_value(serde_json::json!({ "longitude": null })).unwrap();
        assert_eq!(patch.longitude, Some(None));
        assert_eq!(patch.latitude, None);
    }
}
