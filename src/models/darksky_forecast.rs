use serde::Deserialize;
use crate::weather::ForecastPoint;

#[derive(Deserialize, Debug)]
pub struct HourlyData {
    pub time: i64,
    pub temperature: f64,
    #[serde(rename = "cloudCover")]
    pub cloud_cover: Option<f64>,
    #[serde(rename = "precipIntensity")]
    pub precip_intensity: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Hourly {
    #[serde(default)]
    pub data: Vec<HourlyData>,
}

/// Forecast document, an unavailable upstream is represented by the default (empty) document
#[derive(Deserialize, Debug, Default)]
pub struct DarkSkyForecast {
    pub hourly: Option<Hourly>,
}

impl DarkSkyForecast {
    /// Returns the hourly series in upstream order, empty if the document carries none
    pub fn points(&self) -> Vec<ForecastPoint> {
        self.hourly
            .as_ref()
            .map(|h| h.data.iter().map(|d| ForecastPoint {
                time: d.time,
                temperature: d.temperature,
                cloud_cover: d.cloud_cover,
                precipitation_intensity: d.precip_intensity,
            }).collect())
            .unwrap_or_default()
    }
}
