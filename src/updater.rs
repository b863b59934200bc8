use std::path::PathBuf;

use jiff::{tz::TimeZone, Zoned};
use log::info;

use crate::config::{Config, RunMode};
use crate::db::eia::daily_fuel_type::{EiaDailyFuelTypeSource, FixtureSource};
use crate::db::writer::{remove_file_if_exists, to_json_bytes, write_atomic};
use crate::energy_mix::{EnergyMixSnapshot, EnergyMixSource, MixTransform};
use crate::error::UpdateError;
use crate::transform::RegionalMixTransform;

/// Fetch, transform and persist the daily energy mix.
pub struct Updater {
    pub source: Box<dyn EnergyMixSource>,
    pub transform: Box<dyn MixTransform>,
    pub processed_output_file: PathBuf,
    pub raw_output_file: PathBuf,
    /// Timezone of the `updated` stamp
    pub tz: TimeZone,
}

impl Updater {
    /// Wire the updater for the configured mode.  Development runs read the
    /// fixture file instead of calling the API.
    pub fn from_config(config: &Config) -> Result<Updater, UpdateError> {
        let source: Box<dyn EnergyMixSource> = match config.mode {
            RunMode::Normal => Box::new(EiaDailyFuelTypeSource::from_config(config)?),
            RunMode::Development => Box::new(FixtureSource::new(config.dev_fixture.clone())),
        };
        Ok(Updater {
            source,
            transform: Box::new(RegionalMixTransform::new(
                config.regions.clone(),
                config.timezone.clone(),
            )),
            processed_output_file: config.processed_output_file(),
            raw_output_file: config.raw_output_file(),
            tz: config.tz()?,
        })
    }

    /// Run the job at time `now`.  Nothing is written unless the data was
    /// fetched and transformed and both documents serialized.
    pub fn run(&self, now: &Zoned) -> Result<EnergyMixSnapshot, UpdateError> {
        let raw = self.source.fetch_current_energy_mix()?;
        info!("Records returned: {}", raw.total);

        let updated = now
            .with_time_zone(self.tz.clone())
            .strftime("%Y-%m-%d %H:%M:%S %Z")
            .to_string();
        let output = self.transform.transform(&raw, &updated)?;

        let raw_bytes = to_json_bytes(&output.records, &self.raw_output_file)?;
        let processed_bytes = to_json_bytes(&output.snapshot, &self.processed_output_file)?;
        write_atomic(&raw_bytes, &self.raw_output_file)?;
        write_atomic(&processed_bytes, &self.processed_output_file)?;
        info!(
            "Daily energy mix for {} written to {}",
            output.snapshot.keys().cloned().collect::<Vec<_>>().join(", "),
            self.processed_output_file.display()
        );
        Ok(output.snapshot)
    }
}

/// Delete the artifact of the configured mode.  Not an error if it isn't
/// there, and no api key needed.
pub fn clean(config: &Config) -> Result<bool, UpdateError> {
    let path = config.processed_output_file();
    let removed = remove_file_if_exists(&path)?;
    if !removed {
        info!("Nothing to clean, {} not found", path.display());
    }
    Ok(removed)
}
