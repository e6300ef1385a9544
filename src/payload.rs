//! # Create/Update Payloads
//!
//! Request bodies are read as loose JSON and normalized into [`CarPayload`],
//! where every field is an `Option`. Falsy input (`null`, `false`, `0`,
//! `""`, missing key) becomes `None` here and nowhere else, so the create
//! and update rules below only ever ask "was a usable value provided?".
//!
//! Update keeps the truthy-replacement behaviour clients already rely on:
//! a falsy value never overwrites a stored one, so `{"year": 0}` or
//! `{"make": ""}` leave the record as it was. `mileage` is the exception and
//! replaces whenever a JSON number arrives, including `0`.

use crate::error::{GarageError, GarageResult};
use crate::model::{Car, CarStatus};
use serde_json::{Map, Value};

pub const REQUIRED_FIELDS_MESSAGE: &str = "make, model, year and price are required";

/// A create/update body with falsy values already dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarPayload {
    pub make: Option<String>,
    pub model: Option<String>,
    /// Non-zero; may still be negative
    pub year: Option<i64>,
    /// Non-zero; may still be negative
    pub price: Option<f64>,
    /// Any JSON number, zero included
    pub mileage: Option<i64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    /// Only set for one of the three valid statuses
    pub status: Option<CarStatus>,
}

/// The writable columns of a record, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CarRow {
    pub make: String,
    pub model: String,
    pub year: i64,
    pub price: f64,
    pub mileage: Option<i64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub status: CarStatus,
}

impl CarPayload {
    /// Reads a request body. Anything other than a JSON object carries no
    /// fields at all.
    pub fn from_json(body: &Value) -> Self {
        match body.as_object() {
            Some(obj) => Self::from_map(obj),
            None => Self::default(),
        }
    }

    fn from_map(obj: &Map<String, Value>) -> Self {
        let field = |name: &str| obj.get(name).unwrap_or(&Value::Null);

        Self {
            make: text(field("make")),
            model: text(field("model")),
            year: integer(field("year")).filter(|y| *y != 0),
            price: decimal(field("price")).filter(|p| *p != 0.0),
            mileage: field("mileage").as_number().and_then(number_to_i64),
            fuel_type: text(field("fuel_type")),
            transmission: text(field("transmission")),
            status: field("status").as_str().and_then(|s| s.parse().ok()),
        }
    }

    /// Resolves a create request.
    ///
    /// make, model, year and price must all be present, and year/price
    /// positive. Optional fields are stored as null when falsy, so a
    /// `mileage` of `0` is not recorded on create. Status defaults to
    /// `available`.
    pub fn into_new(self) -> GarageResult<CarRow> {
        let (make, model, year, price) = match (self.make, self.model, self.year, self.price) {
            (Some(make), Some(model), Some(year), Some(price)) => (make, model, year, price),
            _ => return Err(GarageError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())),
        };

        if year < 0 {
            return Err(GarageError::Validation("year must be positive".to_string()));
        }
        if price < 0.0 {
            return Err(GarageError::Validation("price must be positive".to_string()));
        }

        Ok(CarRow {
            make,
            model,
            year,
            price,
            mileage: self.mileage.filter(|m| *m != 0),
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            status: self.status.unwrap_or_default(),
        })
    }

    /// Resolves an update against the stored record.
    ///
    /// Every field falls back to its current value unless the payload
    /// provided a usable one. Negative year/price count as not provided.
    pub fn merge_into(self, existing: &Car) -> CarRow {
        CarRow {
            make: self.make.unwrap_or_else(|| existing.make.clone()),
            model: self.model.unwrap_or_else(|| existing.model.clone()),
            year: self.year.filter(|y| *y > 0).unwrap_or(existing.year),
            price: self.price.filter(|p| *p > 0.0).unwrap_or(existing.price),
            mileage: self.mileage.or(existing.mileage),
            fuel_type: self.fuel_type.or_else(|| existing.fuel_type.clone()),
            transmission: self.transmission.or_else(|| existing.transmission.clone()),
            status: self.status.unwrap_or(existing.status),
        }
    }
}

/// Non-empty string
fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// JSON number or numeric string with no fractional part
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => number_to_i64(n),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// JSON number or numeric string
fn decimal(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// `2020.0` reads as 2020; `2020.9` is not an integer
fn number_to_i64(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| n.as_f64().and_then(integral))
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then(|| f as i64)
}
