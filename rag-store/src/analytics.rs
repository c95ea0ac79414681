//! Descriptive statistics over the booking dataset.
//!
//! Column names are fixed: `hotel` drives the hotel statistics and `price`
//! the average. A missing column yields `"N/A"` for its statistics instead
//! of an error.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{dataset::BookingStore, errors::RagError};

pub const HOTEL_COLUMN: &str = "hotel";
pub const PRICE_COLUMN: &str = "price";

/// Placeholder emitted for statistics whose source column is absent.
pub const NOT_AVAILABLE: &str = "N/A";

/// A statistic that may be unavailable.
#[derive(Clone, Debug, PartialEq)]
pub enum Stat<T> {
    Value(T),
    NotAvailable,
}

impl<T: Serialize> Serialize for Stat<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stat::Value(v) => v.serialize(serializer),
            Stat::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Aggregate report over the whole dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub total_bookings: usize,
    pub unique_hotels: Stat<usize>,
    /// `null` when the column exists but holds no values.
    pub average_price: Stat<Option<f64>>,
    pub most_popular_hotel: Stat<Value>,
}

/// Builds the report. Pure function of the store contents.
///
/// # Errors
/// `RagError::Computation` when `price` holds non-numeric values or `hotel`
/// holds no values at all (no most frequent value exists).
pub fn build_report(store: &BookingStore) -> Result<AnalyticsReport, RagError> {
    let (unique_hotels, most_popular_hotel) = match store.column_values(HOTEL_COLUMN) {
        Some(values) => {
            let counts = frequencies(values);
            let mode = mode(&counts).ok_or_else(|| {
                RagError::Computation(format!(
                    "cannot compute most popular hotel: column '{HOTEL_COLUMN}' has no values"
                ))
            })?;
            (Stat::Value(counts.len()), Stat::Value(mode.clone()))
        }
        None => (Stat::NotAvailable, Stat::NotAvailable),
    };

    let average_price = match store.column_values(PRICE_COLUMN) {
        Some(values) => Stat::Value(mean(values)?),
        None => Stat::NotAvailable,
    };

    Ok(AnalyticsReport {
        total_bookings: store.len(),
        unique_hotels,
        average_price,
        most_popular_hotel,
    })
}

/// Occurrence counts of non-null values, keyed by their JSON text so that
/// `1` and `"1"` stay distinct.
fn frequencies<'a>(
    values: impl Iterator<Item = &'a Value>,
) -> HashMap<String, (usize, &'a Value)> {
    let mut counts: HashMap<String, (usize, &Value)> = HashMap::new();
    for v in values.filter(|v| !v.is_null()) {
        counts.entry(v.to_string()).or_insert((0, v)).0 += 1;
    }
    counts
}

/// Most frequent value; ties go to the smallest value.
fn mode<'a>(counts: &HashMap<String, (usize, &'a Value)>) -> Option<&'a Value> {
    counts
        .iter()
        .max_by(|(ka, (ca, va)), (kb, (cb, vb))| {
            ca.cmp(cb)
                .then_with(|| compare_values(vb, va))
                .then_with(|| kb.cmp(ka))
        })
        .map(|(_, (_, v))| *v)
}

/// Arithmetic mean of non-null values; booleans count as 0/1.
fn mean<'a>(values: impl Iterator<Item = &'a Value>) -> Result<Option<f64>, RagError> {
    let mut sum = 0.0_f64;
    let mut n = 0_usize;
    for v in values {
        let x = match v {
            Value::Null => continue,
            Value::Number(num) => num.as_f64().unwrap_or(f64::NAN),
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::String(s) => {
                return Err(RagError::Computation(format!(
                    "could not convert string '{s}' in column '{PRICE_COLUMN}' to numeric"
                )));
            }
            other => {
                return Err(RagError::Computation(format!(
                    "could not convert {other} in column '{PRICE_COLUMN}' to numeric"
                )));
            }
        };
        sum += x;
        n += 1;
    }
    Ok((n > 0).then(|| sum / n as f64))
}

/// Total order over cell values: booleans, then numbers, then strings.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn class(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => class(a).cmp(&class(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(csv: &str) -> BookingStore {
        BookingStore::from_reader(csv.as_bytes(), b',')
            .unwrap()
            .unwrap()
    }

    #[test]
    fn counts_unique_and_most_popular() {
        let s = store("hotel,price\nA,100\nA,200\nB,300\n");
        let r = build_report(&s).unwrap();
        assert_eq!(r.total_bookings, 3);
        assert_eq!(r.unique_hotels, Stat::Value(2));
        assert_eq!(r.most_popular_hotel, Stat::Value(json!("A")));
        assert_eq!(r.average_price, Stat::Value(Some(200.0)));
    }

    #[test]
    fn missing_hotel_column_reports_not_available() {
        let s = store("price\n10\n20\n");
        let v = serde_json::to_value(build_report(&s).unwrap()).unwrap();
        assert_eq!(v["unique_hotels"], "N/A");
        assert_eq!(v["most_popular_hotel"], "N/A");
        assert_eq!(v["average_price"], 15.0);
    }

    #[test]
    fn missing_price_column_reports_not_available() {
        let s = store("hotel\nCity Hotel\n");
        let v = serde_json::to_value(build_report(&s).unwrap()).unwrap();
        assert_eq!(v["average_price"], "N/A");
        assert_eq!(v["unique_hotels"], 1);
    }

    #[test]
    fn ties_pick_the_smallest_value() {
        let s = store("hotel\nResort Hotel\nCity Hotel\nResort Hotel\nCity Hotel\n");
        let r = build_report(&s).unwrap();
        assert_eq!(r.most_popular_hotel, Stat::Value(json!("City Hotel")));
    }

    #[test]
    fn nulls_are_ignored() {
        let s = store("hotel,price\nA,\n,10\nB,20\nB,\n");
        let r = build_report(&s).unwrap();
        assert_eq!(r.unique_hotels, Stat::Value(2));
        assert_eq!(r.most_popular_hotel, Stat::Value(json!("B")));
        assert_eq!(r.average_price, Stat::Value(Some(15.0)));
    }

    #[test]
    fn empty_price_column_averages_to_null() {
        let s = store("hotel,price\nA,\n");
        let v = serde_json::to_value(build_report(&s).unwrap()).unwrap();
        assert!(v["average_price"].is_null());
    }

    #[test]
    fn non_numeric_price_is_a_computation_error() {
        let s = store("hotel,price\nA,cheap\n");
        let err = build_report(&s).unwrap_err();
        assert!(matches!(err, RagError::Computation(_)));
        assert!(err.to_string().contains("cheap"));
    }

    #[test]
    fn hotel_column_without_values_has_no_mode() {
        let s = store("hotel,price\n,1\n");
        assert!(matches!(build_report(&s), Err(RagError::Computation(_))));
    }

    #[test]
    fn quoted_numbers_are_still_numbers() {
        let s = store("hotel\n1\n\"1\"\n");
        let r = build_report(&s).unwrap();
        assert_eq!(r.unique_hotels, Stat::Value(1));
        assert_eq!(r.most_popular_hotel, Stat::Value(json!(1)));
    }

    #[test]
    fn report_serialization_is_stable() {
        let s = store("hotel,price\nB,1\nA,2\nC,3\nA,4\n");
        let first = serde_json::to_string(&build_report(&s).unwrap()).unwrap();
        for _ in 0..5 {
            assert_eq!(serde_json::to_string(&build_report(&s).unwrap()).unwrap(), first);
        }
        assert_eq!(
            first,
            r#"{"total_bookings":4,"unique_hotels":3,"average_price":2.5,"most_popular_hotel":"A"}"#
        );
    }
}
