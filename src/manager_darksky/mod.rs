use log::{info, warn};
use ureq::Agent;
use crate::config::DarkSkyConfig;
use crate::errors::UpstreamError;
use crate::models::darksky_forecast::DarkSkyForecast;

/// Blocks the response is trimmed of, only the hourly series is used
const EXCLUDE: &str = "currently,minutely,daily";

/// Struct for fetching hourly forecasts from Dark Sky
pub struct DarkSky {
    agent: Agent,
    url: String,
}

impl DarkSky {
    /// Returns a DarkSky struct ready for fetching forecasts for the configured point
    ///
    /// # Arguments
    ///
    /// * 'config' - api key, location and units
    pub fn new(config: &DarkSkyConfig) -> DarkSky {
        let agent_config = Agent::config_builder()
            .http_status_as_error(true)
            .build();

        let agent = agent_config.into();

        DarkSky { agent, url: forecast_url(config) }
    }

    /// Retrieves the hourly forecast.
    /// An unavailable upstream (network failure, non 2xx status or a broken document)
    /// gives an empty forecast, which later fails the forecast normalization.
    pub fn get_forecast(&self) -> DarkSkyForecast {
        match self.fetch() {
            Ok(forecast) => {
                info!("fetched forecast, {} hourly points", forecast.points().len());
                forecast
            },
            Err(e) => {
                warn!("forecast unavailable, continuing with an empty document: {}", e);
                DarkSkyForecast::default()
            },
        }
    }

    fn fetch(&self) -> Result<DarkSkyForecast, UpstreamError> {
        let json = self.agent
            .get(self.url.as_str())
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(serde_json::from_str(&json)?)
    }
}

/// Builds the forecast request url
///
/// # Arguments
///
/// * 'config' - api key, location and units
fn forecast_url(config: &DarkSkyConfig) -> String {
    format!("{}{}/{},{}?exclude={}&units={}",
            config.base_url, config.api_key, config.lat, config.long, EXCLUDE, config.units)
}
