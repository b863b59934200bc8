use std::collections::BTreeMap;

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::UpdateError;

/// One daily value for a respondent and fuel type, as returned by the source.
/// Field names are dashed on the wire and snake case once written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelTypeRecord {
    pub period: Date,
    pub respondent: String,
    #[serde(rename(deserialize = "respondent-name"))]
    pub respondent_name: String,
    pub fueltype: String,
    #[serde(rename(deserialize = "type-name"))]
    pub type_name: String,
    pub timezone: String,
    #[serde(rename(deserialize = "timezone-description"))]
    pub timezone_description: String,
    /// MWh
    #[serde(deserialize_with = "deserialize_int")]
    pub value: i64,
    #[serde(rename(deserialize = "value-units"))]
    pub value_units: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceWarning {
    pub warning: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload of the source for the requested window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEnergyData {
    /// Number of records the source has for the query, may exceed `data.len()`
    /// for a single page.
    #[serde(deserialize_with = "deserialize_count")]
    pub total: usize,
    #[serde(rename = "dateFormat", default)]
    pub date_format: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    pub data: Vec<FuelTypeRecord>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub warnings: Vec<SourceWarning>,
}

/// Where the raw energy mix data comes from.
pub trait EnergyMixSource {
    fn fetch_current_energy_mix(&self) -> Result<RawEnergyData, UpdateError>;
}

/// Turns the raw data into the daily mix.  The `updated` string is stamped
/// into every region so the transform itself stays free of clocks.
pub trait MixTransform {
    fn transform(&self, raw: &RawEnergyData, updated: &str) -> Result<MixOutput, UpdateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MixOutput {
    /// Region records plus the aggregated rows, flat.
    pub records: Vec<FuelTypeRecord>,
    pub snapshot: EnergyMixSnapshot,
}

/// The artifact: one entry per region, keyed by respondent code.
pub type EnergyMixSnapshot = BTreeMap<String, RegionSnapshot>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub latest: Latest,
    pub history: History,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Latest {
    pub date: Date,
    pub updated: String,
    #[serde(flatten)]
    pub groups: BTreeMap<String, SourceShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceShare {
    pub megawatthours: i64,
    pub gigawatthours: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub percent: Decimal,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub total: Vec<TotalPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalPoint {
    pub date: Date,
    pub megawatthours: i64,
    pub gigawatthours: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

impl NumberOrString {
    fn to_i64(&self) -> Result<i64, String> {
        match self {
            NumberOrString::Int(v) => Ok(*v),
            NumberOrString::Float(v) if v.is_finite() => Ok(v.trunc() as i64),
            NumberOrString::Float(v) => Err(format!("Invalid number {}", v)),
            NumberOrString::Str(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(|v| v.trunc() as i64))
                    .map_err(|_| format!("Failed parsing {:?} as a number", s))
            }
        }
    }
}

/// The source sends numbers either as JSON numbers or as strings.
fn deserialize_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?
        .to_i64()
        .map_err(serde::de::Error::custom)
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let v = deserialize_int(deserializer)?;
    usize::try_from(v).map_err(|_| serde::de::Error::custom(format!("Invalid count {}", v)))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::error::Error;

    use super::*;

    #[test]
    fn record_from_wire() -> Result<(), Box<dyn Error>> {
        let record: FuelTypeRecord = serde_json::from_value(json!({
            "period": "2024-10-05",
            "respondent": "CISO",
            "respondent-name": "California Independent System Operator",
            "fueltype": "SUN",
            "type-name": "Solar",
            "timezone": "Central",
            "timezone-description": "Central",
            "value": "154321",
            "value-units": "megawatthours"
        }))?;
        assert_eq!(record.period, date(2024, 10, 5));
        assert_eq!(record.value, 154321);
        assert_eq!(record.type_name, "Solar");

        // written back with snake case keys
        let out = serde_json::to_value(&record)?;
        assert_eq!(out["respondent_name"], "California Independent System Operator");
        assert_eq!(out["value"], 154321);
        Ok(())
    }

    #[test]
    fn numeric_value_and_count() -> Result<(), Box<dyn Error>> {
        let raw: RawEnergyData = serde_json::from_value(json!({
            "total": "1",
            "dateFormat": "YYYY-MM-DD",
            "frequency": "daily",
            "data": [{
                "period": "2024-10-05",
                "respondent": "US48",
                "respondent-name": "United States Lower 48",
                "fueltype": "PS",
                "type-name": "Pumped storage",
                "timezone": "Central",
                "timezone-description": "Central",
                "value": -1234,
                "value-units": "megawatthours"
            }]
        }))?;
        assert_eq!(raw.total, 1);
        assert_eq!(raw.data[0].value, -1234);
        assert!(raw.warnings.is_empty());
        Ok(())
    }

    #[test]
    fn bad_value_is_rejected() {
        let res: Result<FuelTypeRecord, _> = serde_json::from_value(json!({
            "period": "2024-10-05",
            "respondent": "US48",
            "respondent-name": "United States Lower 48",
            "fueltype": "NG",
            "type-name": "Natural Gas",
            "timezone": "Central",
            "timezone-description": "Central",
            "value": "n/a",
            "value-units": "megawatthours"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn latest_groups_are_flattened() -> Result<(), Box<dyn Error>> {
        let mut groups = BTreeMap::new();
        groups.insert(
            "solar".to_string(),
            SourceShare {
                megawatthours: 20,
                gigawatthours: 0,
                percent: dec!(20.00),
                source: "Solar".to_string(),
            },
        );
        let latest = Latest {
            date: date(2024, 10, 5),
            updated: "2024-10-06 09:00:00 CDT".to_string(),
            groups,
        };
        let v = serde_json::to_value(&latest)?;
        assert_eq!(v["date"], "2024-10-05");
        assert_eq!(v["solar"]["percent"], 20.0);
        assert_eq!(v["solar"]["source"], "Solar");
        Ok(())
    }
}
