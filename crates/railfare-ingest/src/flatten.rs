//! Flattening of search responses into tabular rows
//!
//! A response lists zero or more journeys under `data.searchJourney`. Each
//! usable journey becomes one [`FlatRow`]; the first leg supplies the train and
//! the economy seat count.
//!
//! Failures are contained per journey: a journey flagged with an error, or one
//! missing a field the row needs, is skipped (the latter with a warning) and the
//! remaining journeys of the response are still flattened.

use crate::response::RawResponse;
use railfare_common::{RailfareError, Result, FLAT_ROW_COLUMNS};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Leg type of commuter trains, which have no seat reservation
pub const COMMUTER_LEG_TYPE: &str = "COMMUTER";

/// Product attribute carrying the economy class seat availability
pub const ECO_SEAT_ATTRIBUTE: &str = "ECO_CLASS_SEAT";

/// Seat count written for commuter legs
pub const NO_SEAT_INFO: i64 = -1;

/// Characters of a journey or response quoted in shape warnings
const LOG_PREFIX_CHARS: usize = 60;

// ============================================================================
// Output row
// ============================================================================

/// One journey as a tabular row; field order is the column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRow {
    pub journey_id: String,
    pub departure_time: String,
    pub departure_station: String,
    pub arrival_station: String,
    pub arrival_time: String,
    pub price: Price,
    pub train_number: String,
    pub train_type: String,
    pub eco_seats_available: i64,
    pub request_date: String,
}

/// Price in minor currency units, rendered in major units
///
/// Rendering keeps one fractional digit for whole amounts and drops a trailing
/// zero otherwise: `10000` -> `100.0`, `12550` -> `125.5`, `12345` -> `123.45`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(pub i64);

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let minor = self.0.unsigned_abs();
        let (whole, cents) = (minor / 100, minor % 100);

        if cents % 10 == 0 {
            write!(f, "{}{}.{}", sign, whole, cents / 10)
        } else {
            write!(f, "{}{}.{:02}", sign, whole, cents)
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Input shape
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Journey {
    id: String,
    departure_time: String,
    departure_station: String,
    arrival_station: String,
    arrival_time: String,
    total_price: i64,
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Leg {
    #[serde(rename = "type")]
    leg_type: String,
    train_number: String,
    train_type: String,
    #[serde(default)]
    product_attributes: Vec<ProductAttribute>,
}

#[derive(Debug, Deserialize)]
struct ProductAttribute {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    attribute: Option<Value>,
    #[serde(default)]
    availability: Option<i64>,
}

impl Leg {
    /// Economy seats left, `-1` for commuter legs
    fn eco_seats_available(&self) -> Result<i64> {
        if self.leg_type == COMMUTER_LEG_TYPE {
            return Ok(NO_SEAT_INFO);
        }

        let attribute = self
            .product_attributes
            .iter()
            .find(|a| {
                a.name.as_deref() == Some(ECO_SEAT_ATTRIBUTE)
                    && a.attribute.as_ref().map_or(true, Value::is_null)
            })
            .ok_or_else(|| {
                RailfareError::shape(format!(
                    "{} leg has no unqualified {} attribute",
                    self.leg_type, ECO_SEAT_ATTRIBUTE
                ))
            })?;

        attribute.availability.ok_or_else(|| {
            RailfareError::shape(format!("{} attribute has no availability", ECO_SEAT_ATTRIBUTE))
        })
    }
}

/// Python-style truthiness of the `error` marker: empty and zero values are no error
fn is_error_marker(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn value_prefix(value: &Value) -> String {
    value.to_string().chars().take(LOG_PREFIX_CHARS).collect()
}

// ============================================================================
// Flattening
// ============================================================================

/// Flatten one journey; `Ok(None)` when the journey is flagged with an error
fn flatten_journey(value: &Value, request_date: &str) -> Result<Option<FlatRow>> {
    if let Some(marker) = value.get("error").filter(|m| is_error_marker(m)) {
        debug!(error = %marker, "Skipping journey flagged with an error");
        return Ok(None);
    }

    let journey = Journey::deserialize(value)?;
    let leg = journey
        .legs
        .first()
        .ok_or_else(|| RailfareError::shape("journey has no legs"))?;
    let eco_seats_available = leg.eco_seats_available()?;

    Ok(Some(FlatRow {
        journey_id: journey.id,
        departure_time: journey.departure_time,
        departure_station: journey.departure_station,
        arrival_station: journey.arrival_station,
        arrival_time: journey.arrival_time,
        price: Price(journey.total_price),
        train_number: leg.train_number.clone(),
        train_type: leg.train_type.clone(),
        eco_seats_available,
        request_date: request_date.to_string(),
    }))
}

/// Expand one response into rows stamped with `request_date`
pub fn flatten(response: &RawResponse, request_date: &str) -> Vec<FlatRow> {
    let Some(journeys) = response.journeys() else {
        warn!(
            response = %response.prefix(LOG_PREFIX_CHARS),
            "Response has no data.searchJourney list"
        );
        return Vec::new();
    };

    journeys
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match flatten_journey(value, request_date) {
            Ok(row) => row,
            Err(e) => {
                warn!(
                    index,
                    error = %e,
                    journey = %value_prefix(value),
                    "Skipping journey"
                );
                None
            },
        })
        .collect()
}

/// Render the tabular file for a whole dump: header, then every row
///
/// Fields are quoted only when they contain a delimiter, quote or line break.
/// The final line has no trailing newline.
pub fn flatten_file(responses: &[RawResponse], request_date: &str) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(FLAT_ROW_COLUMNS)?;

    let mut rows = 0usize;
    for response in responses {
        for row in flatten(response, request_date) {
            writer.serialize(&row)?;
            rows += 1;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RailfareError::Io(e.into_error()))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| RailfareError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    if text.ends_with('\n') {
        text.pop();
    }

    debug!(responses = responses.len(), rows, "Flattened responses");
    Ok(text)
}
