use chrono::{DateTime, Local, TimeZone, Timelike};
use crate::errors::WeatherError;

/// One entry of an hourly forecast series
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    /// Unix seconds, UTC
    pub time: i64,
    pub temperature: f64,
    /// Fraction in [0, 1]
    pub cloud_cover: Option<f64>,
    pub precipitation_intensity: Option<f64>,
}

/// Display ready strings for one lookahead offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRow {
    pub hour_label: String,
    pub temp_label: String,
    pub cloud_label: String,
    pub rain_label: String,
}

/// Normalizes the forecast points at the given lookahead offsets using the device's
/// local calendar for the hour labels
///
/// # Arguments
///
/// * 'series' - hourly forecast series, first entry is the current hour
/// * 'offsets' - indexes into the series, rows are returned in this order
pub fn normalize_weather(series: &[ForecastPoint], offsets: &[usize]) -> Result<Vec<ForecastRow>, WeatherError> {
    normalize_weather_in(series, offsets, &Local)
}

/// Normalizes the forecast points at the given lookahead offsets
///
/// Any offset beyond the end of the series fails the whole normalization, there are
/// no partial results.
///
/// # Arguments
///
/// * 'series' - hourly forecast series
/// * 'offsets' - indexes into the series, rows are returned in this order
/// * 'tz' - time zone used for the hour labels
pub fn normalize_weather_in<Tz: TimeZone>(series: &[ForecastPoint], offsets: &[usize], tz: &Tz)
    -> Result<Vec<ForecastRow>, WeatherError> {

    offsets
        .iter()
        .map(|&offset| {
            let point = series
                .get(offset)
                .ok_or(WeatherError::IndexOutOfRange { offset, len: series.len() })?;

            Ok(ForecastRow {
                hour_label: hour_label(point.time, tz)?,
                temp_label: temp_label(point.temperature),
                cloud_label: cloud_label(point.cloud_cover),
                rain_label: rain_label(point.precipitation_intensity),
            })
        })
        .collect()
}

fn hour_label<Tz: TimeZone>(time: i64, tz: &Tz) -> Result<String, WeatherError> {
    let utc = DateTime::from_timestamp(time, 0).ok_or(WeatherError::Timestamp(time))?;

    Ok(format!("{:02}", utc.with_timezone(tz).hour()))
}

/// Truncates toward zero, 21.9 gives "21" and -3.7 gives "-3"
fn temp_label(temperature: f64) -> String {
    (temperature.trunc() as i64).to_string()
}

/// Zero percent is left out of the display the same way a missing value is
fn cloud_label(cloud_cover: Option<f64>) -> String {
    match cloud_cover.map(|c| (c * 100.0).round() as i64) {
        Some(pct) if pct != 0 => pct.to_string(),
        _ => String::new(),
    }
}

fn rain_label(intensity: Option<f64>) -> String {
    match intensity.map(|r| format!("{:.1}", r)) {
        Some(label) if label != "0.0" && label != "-0.0" => label,
        _ => String::new(),
    }
}
