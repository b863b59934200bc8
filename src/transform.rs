use std::collections::BTreeMap;

use itertools::Itertools;
use jiff::civil::Date;
use log::info;
use rust_decimal::Decimal;

use crate::elec::fuel_type::{
    is_fossil_fuel, is_renewable, is_valid_generation_type, DisplayGroup, FOSSIL_FUELS,
    RENEWABLES, TOTAL,
};
use crate::energy_mix::{
    EnergyMixSnapshot, FuelTypeRecord, History, Latest, MixOutput, MixTransform, RawEnergyData,
    RegionSnapshot, SourceShare, TotalPoint,
};
use crate::error::UpdateError;

/// Daily mix per region: renewables, fossil fuels and total rows are added to
/// the source records, the headline numbers are taken from the latest day in
/// the configured timezone.
#[derive(Debug, Clone)]
pub struct RegionalMixTransform {
    pub regions: Vec<String>,
    /// EIA timezone label, e.g. `Central`
    pub timezone: String,
}

impl RegionalMixTransform {
    pub fn new(regions: Vec<String>, timezone: impl Into<String>) -> RegionalMixTransform {
        RegionalMixTransform {
            regions,
            timezone: timezone.into(),
        }
    }

    fn region_snapshot(
        &self,
        region: &str,
        records: &[FuelTypeRecord],
        updated: &str,
    ) -> Result<RegionSnapshot, UpdateError> {
        let latest_date = latest_period(records).ok_or_else(|| {
            UpdateError::SourceDataInvalid(format!("No records for region {}", region))
        })?;
        let latest_rows: Vec<&FuelTypeRecord> = records
            .iter()
            .filter(|r| r.period == latest_date && r.timezone == self.timezone)
            .collect();
        let total = latest_rows
            .iter()
            .find(|r| r.type_name == TOTAL)
            .map(|r| r.value)
            .ok_or_else(|| {
                UpdateError::SourceDataInvalid(format!(
                    "No total generation for region {} on {} ({} timezone)",
                    region, latest_date, self.timezone
                ))
            })?;

        let mut groups = BTreeMap::new();
        for group in DisplayGroup::ALL {
            let value = checked_sum(
                latest_rows
                    .iter()
                    .filter(|r| group.members().contains(&r.type_name.as_str()))
                    .map(|r| r.value),
            )
            .ok_or_else(|| overflow(group.name(), region, latest_date))?;
            groups.insert(
                group.key(),
                SourceShare {
                    megawatthours: value,
                    gigawatthours: to_gigawatthours(value),
                    percent: percent(value, total),
                    source: group.name().to_string(),
                },
            );
        }

        let history = records
            .iter()
            .filter(|r| r.type_name == TOTAL && r.timezone == self.timezone)
            .sorted_by_key(|r| r.period)
            .dedup_by(|a, b| a.period == b.period)
            .map(|r| TotalPoint {
                date: r.period,
                megawatthours: r.value,
                gigawatthours: to_gigawatthours(r.value),
            })
            .collect();

        Ok(RegionSnapshot {
            latest: Latest {
                date: latest_date,
                updated: updated.to_string(),
                groups,
            },
            history: History { total: history },
        })
    }
}

impl MixTransform for RegionalMixTransform {
    fn transform(&self, raw: &RawEnergyData, updated: &str) -> Result<MixOutput, UpdateError> {
        let mut all_records = Vec::new();
        let mut snapshot = EnergyMixSnapshot::new();
        for region in &self.regions {
            let region_records: Vec<FuelTypeRecord> = raw
                .data
                .iter()
                .filter(|r| &r.respondent == region)
                .cloned()
                .collect();
            if region_records.is_empty() {
                return Err(UpdateError::SourceDataInvalid(format!(
                    "Region {} not found in data, check the API call",
                    region
                )));
            }
            let processed = with_group_totals(region_records)?;
            info!("{} records for region {}", processed.len(), region);
            let region_snapshot = self.region_snapshot(region, &processed, updated)?;
            snapshot.insert(region.clone(), region_snapshot);
            all_records.extend(processed);
        }
        Ok(MixOutput {
            records: all_records,
            snapshot,
        })
    }
}

/// Add the `Renewables`, `Fossil Fuels` and `Total` rows to the records of one
/// region, sorted by period, fuel type and type name.
pub fn with_group_totals(
    records: Vec<FuelTypeRecord>,
) -> Result<Vec<FuelTypeRecord>, UpdateError> {
    let renewables = sum_by_group(&records, RENEWABLES, is_renewable)?;
    let fossil_fuels = sum_by_group(&records, FOSSIL_FUELS, is_fossil_fuel)?;
    let total = sum_by_group(&records, TOTAL, is_valid_generation_type)?;
    let mut out: Vec<FuelTypeRecord> = records
        .into_iter()
        .chain(renewables)
        .chain(fossil_fuels)
        .chain(total)
        .collect();
    out.sort_by(|a, b| {
        (a.period, &a.fueltype, &a.type_name).cmp(&(b.period, &b.fueltype, &b.type_name))
    });
    Ok(out)
}

type GroupKey = (Date, String, String, String, String, String);

/// Sum the values of the matching types for each period, respondent, timezone
/// and unit.  The new rows use `name` as fuel type and type name.
fn sum_by_group(
    records: &[FuelTypeRecord],
    name: &str,
    include: impl Fn(&str) -> bool,
) -> Result<Vec<FuelTypeRecord>, UpdateError> {
    let mut groups: BTreeMap<GroupKey, i64> = BTreeMap::new();
    for r in records.iter().filter(|r| include(&r.type_name)) {
        let key = (
            r.period,
            r.respondent.clone(),
            r.respondent_name.clone(),
            r.timezone.clone(),
            r.timezone_description.clone(),
            r.value_units.clone(),
        );
        let sum = groups.entry(key).or_insert(0);
        *sum = sum
            .checked_add(r.value)
            .ok_or_else(|| overflow(name, &r.respondent, r.period))?;
    }
    Ok(groups
        .into_iter()
        .map(
            |((period, respondent, respondent_name, timezone, timezone_description, value_units),
              value)| FuelTypeRecord {
                period,
                respondent,
                respondent_name,
                fueltype: name.to_string(),
                type_name: name.to_string(),
                timezone,
                timezone_description,
                value,
                value_units,
            },
        )
        .collect())
}

fn checked_sum(mut values: impl Iterator<Item = i64>) -> Option<i64> {
    values.try_fold(0i64, |acc, v| acc.checked_add(v))
}

fn overflow(name: &str, region: &str, day: Date) -> UpdateError {
    UpdateError::SourceDataInvalid(format!(
        "{} generation for region {} on {} is out of range",
        name, region, day
    ))
}

pub fn latest_period(records: &[FuelTypeRecord]) -> Option<Date> {
    records.iter().map(|r| r.period).max()
}

/// Share of `value` in `total` in percent, 2 decimals.  Zero if the total
/// isn't positive.
pub fn percent(value: i64, total: i64) -> Decimal {
    if total <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(value) * Decimal::ONE_HUNDRED / Decimal::from(total)).round_dp(2)
}

/// MWh to GWh, rounded half to even.
pub fn to_gigawatthours(mwh: i64) -> i64 {
    (Decimal::from(mwh) / Decimal::ONE_THOUSAND)
        .round()
        .try_into()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal_macros::dec;
    use std::error::Error;

    use super::*;

    fn record(day: Date, respondent: &str, type_name: &str, value: i64) -> FuelTypeRecord {
        FuelTypeRecord {
            period: day,
            respondent: respondent.to_string(),
            respondent_name: format!("{} name", respondent),
            fueltype: type_name.chars().take(3).collect::<String>().to_uppercase(),
            type_name: type_name.to_string(),
            timezone: "Central".to_string(),
            timezone_description: "Central".to_string(),
            value,
            value_units: "megawatthours".to_string(),
        }
    }

    fn raw(data: Vec<FuelTypeRecord>) -> RawEnergyData {
        RawEnergyData {
            total: data.len(),
            data,
            ..Default::default()
        }
    }

    fn transform() -> RegionalMixTransform {
        RegionalMixTransform::new(vec!["US48".to_string()], "Central")
    }

    #[test]
    fn solar_wind_gas_mix() -> Result<(), Box<dyn Error>> {
        let day = date(2024, 10, 5);
        let data = vec![
            record(day, "US48", "Solar", 20),
            record(day, "US48", "Wind", 30),
            record(day, "US48", "Natural Gas", 50),
        ];
        let out = transform().transform(&raw(data), "2024-10-06 09:00:00 CDT")?;
        let us48 = &out.snapshot["US48"];
        assert_eq!(us48.latest.date, day);
        let groups = &us48.latest.groups;
        assert_eq!(groups["solar"].percent, dec!(20));
        assert_eq!(groups["wind"].percent, dec!(30));
        assert_eq!(groups["natural_gas"].percent, dec!(50));
        assert_eq!(groups["renewables"].megawatthours, 50);
        assert_eq!(groups["nuclear"].percent, Decimal::ZERO);
        let sum = groups["renewables"].percent
            + groups["fossil_fuels"].percent
            + groups["nuclear"].percent;
        assert_eq!(sum, dec!(100));
        assert_eq!(us48.history.total.len(), 1);
        assert_eq!(us48.history.total[0].megawatthours, 100);
        Ok(())
    }

    #[test]
    fn other_types_stay_out_of_the_total() -> Result<(), Box<dyn Error>> {
        let day = date(2024, 10, 5);
        let data = vec![
            record(day, "US48", "Nuclear", 300),
            record(day, "US48", "Coal", 100),
            record(day, "US48", "Other", 1000),
            record(day, "US48", "Battery storage", -50),
        ];
        let out = transform().transform(&raw(data), "now")?;
        let groups = &out.snapshot["US48"].latest.groups;
        assert_eq!(groups["nuclear"].percent, dec!(75));
        assert_eq!(groups["coal"].percent, dec!(25));
        // 4 source rows + fossil + total, no renewables
        assert_eq!(out.records.len(), 6);
        Ok(())
    }

    #[test]
    fn latest_day_and_history() -> Result<(), Box<dyn Error>> {
        let d1 = date(2024, 10, 4);
        let d2 = date(2024, 10, 5);
        let data = vec![
            record(d2, "US48", "Hydro", 1500),
            record(d1, "US48", "Hydro", 2500),
            record(d1, "US48", "Coal", 500),
            record(d2, "US48", "Coal", 1500),
        ];
        let out = transform().transform(&raw(data), "now")?;
        let us48 = &out.snapshot["US48"];
        assert_eq!(us48.latest.date, d2);
        assert_eq!(us48.latest.groups["hydro"].percent, dec!(50));
        let history: Vec<(Date, i64, i64)> = us48
            .history
            .total
            .iter()
            .map(|p| (p.date, p.megawatthours, p.gigawatthours))
            .collect();
        assert_eq!(history, vec![(d1, 3000, 3), (d2, 3000, 3)]);
        Ok(())
    }

    #[test]
    fn missing_region_is_invalid_data() {
        let data = vec![record(date(2024, 10, 5), "CISO", "Solar", 20)];
        let res = transform().transform(&raw(data), "now");
        assert!(matches!(res, Err(UpdateError::SourceDataInvalid(_))));
    }

    #[test]
    fn missing_total_in_timezone_is_invalid_data() {
        let mut r = record(date(2024, 10, 5), "US48", "Solar", 20);
        r.timezone = "Eastern".to_string();
        let res = transform().transform(&raw(vec![r]), "now");
        assert!(matches!(res, Err(UpdateError::SourceDataInvalid(_))));
    }

    #[test]
    fn aggregated_rows_are_sorted() -> Result<(), Box<dyn Error>> {
        let day = date(2024, 10, 5);
        let rows = with_group_totals(vec![
            record(day, "US48", "Wind", 30),
            record(day, "US48", "Coal", 10),
        ])?;
        let names: Vec<&str> = rows.iter().map(|r| r.type_name.as_str()).collect();
        // sorted by fueltype code: COA, Fossil Fuels, Renewables, Total, WIN
        assert_eq!(names, vec!["Coal", "Fossil Fuels", "Renewables", "Total", "Wind"]);
        Ok(())
    }

    #[test]
    fn huge_values_are_invalid_data() {
        let day = date(2024, 10, 5);
        let data = vec![
            record(day, "US48", "Coal", i64::MAX),
            record(day, "US48", "Natural Gas", 1),
        ];
        let res = transform().transform(&raw(data), "now");
        assert!(matches!(res, Err(UpdateError::SourceDataInvalid(_))));
    }

    #[test]
    fn checked_sum_of_values() {
        assert_eq!(checked_sum([1, 2, 3].into_iter()), Some(6));
        assert_eq!(checked_sum([i64::MIN, -1].into_iter()), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(percent(1, 3), dec!(33.33));
        assert_eq!(percent(2, 3), dec!(66.67));
        assert_eq!(percent(5, 0), Decimal::ZERO);
        assert_eq!(to_gigawatthours(2500), 2);
        assert_eq!(to_gigawatthours(3500), 4);
        assert_eq!(to_gigawatthours(1499), 1);
    }
}
