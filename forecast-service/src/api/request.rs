//! Body validation for the prediction routes.

use std::collections::HashMap;

use serde_json::{Map, Value};
use usage_domain::Appliance;

use super::error::ValidationError;
use crate::engine::{ForecastRequest, ForecastTarget, HistoryRange, SliceRequest};

const WORKFLOW_FIELDS: [&str; 4] = ["appliances", "range", "predictionYear", "predictionMonth"];
const LEGACY_FIELDS: [&str; 6] = ["appliance", "hour", "day", "month", "year", "season"];

/// True when a `/predict` JSON body asks for the multi-appliance workflow.
pub fn is_workflow_body(body: &Value) -> bool {
    body.get("appliances").is_some() && body.get("range").is_some()
}

/// Parses raw bytes that claim to be JSON. Blank bodies are reported as empty.
pub fn parse_json_body(bytes: &[u8]) -> Result<Value, ValidationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::EmptyBody);
    }
    serde_json::from_slice(bytes).map_err(|e| ValidationError::Body(e.to_string()))
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    match body {
        Value::Null => Err(ValidationError::EmptyBody),
        Value::Object(map) if map.is_empty() => Err(ValidationError::EmptyBody),
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::NotAnObject),
    }
}

fn require(map: &Map<String, Value>, fields: &[&'static str]) -> Result<(), ValidationError> {
    let missing: Vec<_> = fields
        .iter()
        .copied()
        .filter(|f| !map.contains_key(*f))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

/// Integer given as a JSON number or a numeric string.
fn integer(map: &Map<String, Value>, field: &'static str) -> Result<i64, ValidationError> {
    let parsed = match map.get(field) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or(ValidationError::NotInteger(field))
}

fn bounded<T: TryFrom<i64>>(
    map: &Map<String, Value>,
    field: &'static str,
    min: i64,
    max: i64,
) -> Result<T, ValidationError> {
    let v = integer(map, field)?;
    if v < min || v > max {
        return Err(ValidationError::OutOfRange { field });
    }
    T::try_from(v).map_err(|_| ValidationError::OutOfRange { field })
}

fn text<'a>(map: &'a Map<String, Value>, field: &'static str) -> Option<&'a str> {
    map.get(field).and_then(Value::as_str)
}

pub fn workflow_request(body: &Value) -> Result<ForecastRequest, ValidationError> {
    let map = as_object(body)?;
    require(map, &WORKFLOW_FIELDS)?;

    let appliances = match map.get("appliances") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or(ValidationError::Appliances)?,
        _ => return Err(ValidationError::Appliances),
    };

    let range = text(map, "range")
        .and_then(HistoryRange::parse)
        .ok_or(ValidationError::Range)?;

    let year: i32 = bounded(map, "predictionYear", 1, 9999)?;
    let month = integer(map, "predictionMonth")?;
    if !(1..=12).contains(&month) {
        return Err(ValidationError::MonthOutOfRange);
    }
    let target = ForecastTarget::new(year, month as u8)
        .map_err(|_| ValidationError::OutOfRange { field: "predictionYear" })?;

    Ok(ForecastRequest {
        appliances,
        range,
        target,
    })
}

pub fn slice_request(body: &Value) -> Result<SliceRequest, ValidationError> {
    let map = as_object(body)?;
    require(map, &LEGACY_FIELDS)?;

    let name = text(map, "appliance").unwrap_or_default();
    let appliance = Appliance::from_display_name(name)
        .ok_or_else(|| ValidationError::UnknownAppliance(name.to_string()))?;

    Ok(SliceRequest {
        appliance,
        hour: bounded(map, "hour", 0, 23)?,
        day: bounded(map, "day", 1, 31)?,
        month: bounded(map, "month", 1, 12)?,
        year: bounded(map, "year", i64::from(i32::MIN), i64::from(i32::MAX))?,
        season: text(map, "season").unwrap_or_default().to_string(),
    })
}

/// Form fields arrive as strings; lift them into a JSON object.
pub fn form_to_value(form: HashMap<String, String>) -> Value {
    Value::Object(
        form.into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect(),
    )
}
