// Daily net generation by balancing authority and energy source.
// https://www.eia.gov/opendata/browser/electricity/rto/daily-fuel-type-data

use std::{fs, path::PathBuf};

use jiff::{civil::Date, tz::TimeZone, ToSpan, Zoned};
use log::{info, warn};
use reqwest::{
    blocking::Client,
    header::{ACCEPT, USER_AGENT},
    StatusCode,
};
use serde::Deserialize;

use crate::config::Config;
use crate::energy_mix::{EnergyMixSource, RawEnergyData};
use crate::error::UpdateError;

/// The API doesn't return more than 5000 rows per request.
pub const MAX_PAGE_LENGTH: usize = 5000;

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    response: Option<RawEnergyData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Parse a response body.  Works for both the API and the fixture files.
pub fn parse_body(text: &str) -> Result<RawEnergyData, UpdateError> {
    let body: Body = serde_json::from_str(text)
        .map_err(|e| UpdateError::SourceDataInvalid(format!("Failed to parse response: {}", e)))?;
    if let Some(error) = body.error {
        return Err(UpdateError::SourceDataInvalid(format!(
            "Source returned an error: {}",
            error
        )));
    }
    body.response
        .ok_or_else(|| UpdateError::SourceDataInvalid("Missing response object".to_string()))
}

/// Last seven days of daily generation by fuel type for the supported regions.
#[derive(Debug, Clone)]
pub struct EiaDailyFuelTypeSource {
    pub base_url: String,
    pub api_key: String,
    pub regions: Vec<String>,
    /// EIA timezone label, e.g. `Central`
    pub timezone: String,
    pub tz: TimeZone,
    pub page_length: usize,
}

impl EiaDailyFuelTypeSource {
    pub fn from_config(config: &Config) -> Result<EiaDailyFuelTypeSource, UpdateError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| UpdateError::Config("EIA_API_KEY not found in environment".into()))?;
        Ok(EiaDailyFuelTypeSource {
            base_url: config.base_url.clone(),
            api_key,
            regions: config.regions.clone(),
            timezone: config.timezone.clone(),
            tz: config.tz()?,
            page_length: MAX_PAGE_LENGTH,
        })
    }

    /// The seven days leading to `today`, both ends included.
    pub fn window(&self, today: Date) -> Result<(Date, Date), UpdateError> {
        let start = today
            .checked_sub(7.days())
            .map_err(|e| UpdateError::Config(e.to_string()))?;
        Ok((start, today))
    }

    /// Query parameters for one page, api key excluded.
    pub fn query(&self, start: Date, end: Date, offset: usize) -> Vec<(String, String)> {
        let mut query = vec![
            ("frequency".to_string(), "daily".to_string()),
            ("data[0]".to_string(), "value".to_string()),
        ];
        for region in &self.regions {
            query.push(("facets[respondent][]".to_string(), region.clone()));
        }
        query.extend([
            ("facets[timezone][]".to_string(), self.timezone.clone()),
            ("start".to_string(), start.strftime("%Y-%m-%d").to_string()),
            ("end".to_string(), end.strftime("%Y-%m-%d").to_string()),
            ("sort[0][column]".to_string(), "period".to_string()),
            ("sort[0][direction]".to_string(), "desc".to_string()),
            ("offset".to_string(), offset.to_string()),
            ("length".to_string(), self.page_length.to_string()),
        ]);
        query
    }

    fn fetch_page(
        &self,
        client: &Client,
        query: &[(String, String)],
    ) -> Result<RawEnergyData, UpdateError> {
        let response = client
            .get(&self.base_url)
            .header(USER_AGENT, concat!("dailygrid/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            // the url carries the api key
            .map_err(|e| UpdateError::SourceUnavailable(e.without_url().to_string()))?;
        if response.status() != StatusCode::OK {
            return Err(UpdateError::SourceUnavailable(format!(
                "Download failed with status {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .map_err(|e| UpdateError::SourceUnavailable(e.without_url().to_string()))?;
        parse_body(&body)
    }

    /// Get all the pages for the window ending on `today`.
    pub fn fetch(&self, today: Date) -> Result<RawEnergyData, UpdateError> {
        let (start, end) = self.window(today)?;
        info!(
            "Downloading EIA daily fuel type data for {} from {} to {}",
            self.regions.join(", "),
            start,
            end
        );
        let client = Client::new();
        let mut offset = 0;
        let mut out: Option<RawEnergyData> = None;
        loop {
            let page = self.fetch_page(&client, &self.query(start, end, offset))?;
            let n = page.data.len();
            for w in &page.warnings {
                warn!("EIA warning: {} {}", w.warning, w.description.as_deref().unwrap_or(""));
            }
            offset += n;
            let total = page.total;
            out = Some(match out.take() {
                None => page,
                Some(mut acc) => {
                    acc.data.extend(page.data);
                    acc
                }
            });
            if n == 0 || offset >= total {
                break;
            }
            info!("  got {} of {} records, requesting next page", offset, total);
        }
        Ok(out.unwrap_or_default())
    }
}

impl EnergyMixSource for EiaDailyFuelTypeSource {
    fn fetch_current_energy_mix(&self) -> Result<RawEnergyData, UpdateError> {
        let today = Zoned::now().with_time_zone(self.tz.clone()).date();
        self.fetch(today)
    }
}

/// A saved response body, used for development runs.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    pub path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> FixtureSource {
        FixtureSource { path: path.into() }
    }
}

impl EnergyMixSource for FixtureSource {
    fn fetch_current_energy_mix(&self) -> Result<RawEnergyData, UpdateError> {
        info!("Reading energy mix fixture {}", self.path.display());
        let text = fs::read_to_string(&self.path).map_err(|e| {
            UpdateError::SourceUnavailable(format!(
                "Cannot read fixture {}: {}",
                self.path.display(),
                e
            ))
        })?;
        parse_body(&text)
    }
}
