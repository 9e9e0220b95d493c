//! Catch aggregation for the review page.
//!
//! Weights and lengths are reported with one decimal place. A missing
//! measurement counts as zero.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::Catch;

/// A measurement shown with exactly one decimal place (`"30.0"`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneDecimal(pub f64);

impl fmt::Display for OneDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl Serialize for OneDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A trip-level figure.
///
/// An empty trip reports a bare `0` rather than `"0.0"`: it displays as `0`
/// and serializes as the number `0`, while measured figures serialize as
/// one-decimal strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Figure {
    /// No catches to measure.
    Zero,
    /// Computed over at least one catch.
    Measured(OneDecimal),
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => f.write_str("0"),
            Self::Measured(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl Serialize for Figure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Zero => serializer.serialize_u8(0),
            Self::Measured(value) => value.serialize(serializer),
        }
    }
}

/// Per-species totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesSummary {
    /// Species name.
    pub species: String,
    /// Number of catches of this species.
    pub count: usize,
    /// Sum of weights.
    pub total_weight: OneDecimal,
    /// Mean length.
    pub avg_length: OneDecimal,
}

/// Whole-trip totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStats {
    /// Number of catches.
    pub total_count: usize,
    /// Sum of weights.
    pub total_weight: Figure,
    /// Mean length.
    pub avg_length: Figure,
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Group catches by species, in first-seen order.
///
/// Catches with a blank species are skipped.
#[must_use]
pub fn aggregate_by_species(catches: &[Catch]) -> Vec<SpeciesSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (usize, f64, f64)> = HashMap::new();

    for catch in catches {
        let species = catch.species.as_str();
        if species.trim().is_empty() {
            continue;
        }
        let entry = totals.entry(species).or_insert_with(|| {
            order.push(species);
            (0, 0.0, 0.0)
        });
        entry.0 += 1;
        entry.1 += catch.weight.unwrap_or(0.0);
        entry.2 += catch.length.unwrap_or(0.0);
    }

    order
        .into_iter()
        .map(|species| {
            let (count, weight, length) = totals[species];
            SpeciesSummary {
                species: species.to_string(),
                count,
                total_weight: OneDecimal(weight),
                avg_length: OneDecimal(mean(length, count)),
            }
        })
        .collect()
}

/// Count, total weight and mean length across a trip's catches.
#[must_use]
pub fn trip_statistics(catches: &[Catch]) -> TripStats {
    if catches.is_empty() {
        return TripStats {
            total_count: 0,
            total_weight: Figure::Zero,
            avg_length: Figure::Zero,
        };
    }

    let weight: f64 = catches.iter().filter_map(|c| c.weight).sum();
    let length: f64 = catches.iter().filter_map(|c| c.length).sum();

    TripStats {
        total_count: catches.len(),
        total_weight: Figure::Measured(OneDecimal(weight)),
        avg_length: Figure::Measured(OneDecimal(mean(length, catches.len()))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn catch(species: &str, weight: Option<f64>, length: Option<f64>) -> Catch {
        Catch {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id: "trip".to_string(),
            species: species.to_string(),
            weight,
            length,
            latitude: None,
            longitude: None,
            time: "08:00".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_aggregate_by_species() {
        let catches = vec![
            catch("Tuna", Some(10.0), Some(20.0)),
            catch("Tuna", Some(20.0), Some(30.0)),
            catch("Cod", Some(5.0), Some(10.0)),
        ];

        let rows = aggregate_by_species(&catches);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].species, "Tuna");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].total_weight.to_string(), "30.0");
        assert_eq!(rows[0].avg_length.to_string(), "25.0");

        assert_eq!(rows[1].species, "Cod");
        assert_eq!(rows[1].count, 1);
        assert_eq!(rows[1].total_weight.to_string(), "5.0");
        assert_eq!(rows[1].avg_length.to_string(), "10.0");
    }

    #[test]
    fn test_aggregate_first_seen_order() {
        let catches = vec![
            catch("Cod", Some(1.0), Some(1.0)),
            catch("Tuna", Some(1.0), Some(1.0)),
            catch("Cod", Some(1.0), Some(1.0)),
        ];
        let names: Vec<_> = aggregate_by_species(&catches)
            .into_iter()
            .map(|row| row.species)
            .collect();
        assert_eq!(names, vec!["Cod", "Tuna"]);
    }

    #[test]
    fn test_aggregate_skips_blank_species_and_defaults_missing() {
        let catches = vec![
            catch("", Some(100.0), Some(100.0)),
            catch("Halibut", None, Some(40.0)),
            catch("Halibut", Some(12.3), None),
        ];

        let rows = aggregate_by_species(&catches);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].total_weight.to_string(), "12.3");
        assert_eq!(rows[0].avg_length.to_string(), "20.0");
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_by_species(&[]).is_empty());
    }

    #[test]
    fn test_species_summary_json() {
        let rows = aggregate_by_species(&[catch("Cod", Some(5.0), Some(10.0))]);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(
            json,
            json!({ "species": "Cod", "count": 1, "totalWeight": "5.0", "avgLength": "10.0" })
        );
    }

    #[test]
    fn test_trip_statistics() {
        let catches = vec![
            catch("", Some(10.0), Some(20.0)),
            catch("", Some(20.0), Some(30.0)),
        ];
        let stats = trip_statistics(&catches);

        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.total_weight.to_string(), "30.0");
        assert_eq!(stats.avg_length.to_string(), "25.0");
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            json!({ "totalCount": 2, "totalWeight": "30.0", "avgLength": "25.0" })
        );
    }

    #[test]
    fn test_trip_statistics_empty_is_bare_zero() {
        let stats = trip_statistics(&[]);

        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.total_weight, Figure::Zero);
        assert_eq!(stats.avg_length.to_string(), "0");
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            json!({ "totalCount": 0, "totalWeight": 0, "avgLength": 0 })
        );
    }
}
