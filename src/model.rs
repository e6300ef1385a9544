//! Vehicle record and its status lifecycle.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Columns selected for every record read, in `Car::from_row` order
pub const CAR_COLUMNS: &str =
    "id, make, model, year, price, mileage, fuel_type, transmission, status, created_at";

/// Sale status of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

impl CarStatus {
    pub const ALL: [CarStatus; 3] = [CarStatus::Available, CarStatus::Reserved, CarStatus::Sold];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Reserved => "reserved",
            CarStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match on the three stored values
impl FromStr for CarStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CarStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(())
    }
}

/// One vehicle inventory row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub price: f64,
    pub mileage: Option<i64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub status: CarStatus,
    #[serde(with = "sqlite_timestamp")]
    pub created_at: NaiveDateTime,
}

impl Car {
    /// Maps a row selected with [`CAR_COLUMNS`].
    ///
    /// A status outside the enum (only possible through manual edits of the
    /// file) reads back as `available`, the column default.
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let status: Option<String> = row.get(8)?;
        Ok(Self {
            id: row.get(0)?,
            make: row.get(1)?,
            model: row.get(2)?,
            year: row.get(3)?,
            price: row.get(4)?,
            mileage: row.get(5)?,
            fuel_type: row.get(6)?,
            transmission: row.get(7)?,
            status: status
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            created_at: row.get(9)?,
        })
    }
}

/// `created_at` travels in SQLite's `datetime('now')` text format
mod sqlite_timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parse_is_exact() {
        assert_eq!("sold".parse::<CarStatus>(), Ok(CarStatus::Sold));
        assert_eq!("reserved".parse::<CarStatus>(), Ok(CarStatus::Reserved));
        assert!("Sold".parse::<CarStatus>().is_err());
        assert!("".parse::<CarStatus>().is_err());
        assert_eq!(CarStatus::default(), CarStatus::Available);
    }

    #[test]
    fn test_car_json_shape() {
        let car = Car {
            id: 7,
            make: "Audi".into(),
            model: "A4".into(),
            year: 2020,
            price: 20000.0,
            mileage: None,
            fuel_type: Some("petrol".into()),
            transmission: None,
            status: CarStatus::Reserved,
            created_at: NaiveDateTime::parse_from_str("2024-03-01 09:30:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        };

        let value = serde_json::to_value(&car).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "make": "Audi",
                "model": "A4",
                "year": 2020,
                "price": 20000.0,
                "mileage": null,
                "fuel_type": "petrol",
                "transmission": null,
                "status": "reserved",
                "created_at": "2024-03-01 09:30:00"
            })
        );

        let back: Car = serde_json::from_value(value).unwrap();
        assert_eq!(back, car);
    }
}
