use std::time::Duration;
use embedded_hal::digital::OutputPin;
use linux_embedded_hal::Delay;
use log::{info, warn};
use crate::alarm::{evaluate, signal};
use crate::config::Config;
use crate::departures::normalize_departures;
use crate::errors::{ConfigError, GpioError, RunError};
use crate::layout::{compose, Layout};
use crate::manager_bom::{scan_for_thunderstorm, Bom, ScrapedSignal};
use crate::manager_darksky::DarkSky;
use crate::manager_gpio::OutputLine;
use crate::manager_ptv::Ptv;
use crate::manager_sensors::{AmbientSensor, SoilProbe};
use crate::renderer::{render, Framebuffer, ImagePanel, Panel};
use crate::weather::normalize_weather;

/// Fetches, normalizes and composes forecast and departures, then flushes the frame
///
/// # Arguments
///
/// * 'config' - the loaded configuration
pub fn run_display(config: &Config) -> Result<(), RunError> {
    let dark_sky_config = config.dark_sky.as_ref().ok_or(ConfigError::Missing("dark_sky"))?;
    let ptv_config = config.ptv.as_ref().ok_or(ConfigError::Missing("ptv"))?;
    let display_config = config.display.as_ref().ok_or(ConfigError::Missing("display"))?;
    let layout = Layout::for_kind(display_config.layout);

    let forecast = DarkSky::new(dark_sky_config).get_forecast();
    let forecast_rows = normalize_weather(&forecast.points(), &dark_sky_config.forecast_steps)?;

    let records = Ptv::new(ptv_config).get_departures();
    let departure_rows = normalize_departures(&records, ptv_config.max_results)?;

    let annotation = match &config.sensors.ambient {
        Some(ambient) => match AmbientSensor::open(ambient).and_then(|mut sensor| sensor.read_sample()) {
            Ok(sample) => Some(sample.annotation()),
            Err(e) => {
                warn!("ambient sensor unavailable, no annotation: {}", e);
                None
            },
        },
        None => None,
    };

    let instructions = compose(&layout, &forecast_rows, &departure_rows, annotation.as_deref())?;

    let mut frame = match &display_config.background {
        Some(path) => Framebuffer::with_background(path, display_config.width, display_config.height)?,
        None => Framebuffer::new(display_config.width, display_config.height),
    };
    render(&mut frame, &layout, &instructions)?;

    ImagePanel::new(display_config).show(&frame)?;
    info!("frame with {} rows and {} of {} departures written to {}",
        forecast_rows.len(),
        departure_rows.len().min(layout.row_count()),
        departure_rows.len(),
        display_config.output_path);

    Ok(())
}

/// Reads the soil probe and signals its alarm mode for the configured duration
///
/// # Arguments
///
/// * 'config' - the loaded configuration
pub fn run_moisture_alarm(config: &Config) -> Result<(), RunError> {
    let alarm_config = config.alarm.as_ref().ok_or(ConfigError::Missing("alarm"))?;
    let soil_config = config.sensors.soil.as_ref().ok_or(ConfigError::Missing("sensors.soil"))?;

    let mut line = OutputLine::acquire(alarm_config.pin)?;
    let reading = SoilProbe::open(soil_config).read_moisture();

    let mode = evaluate(reading,
                        alarm_config.warning_threshold,
                        alarm_config.emergency_threshold,
                        alarm_config.warning_hz,
                        alarm_config.emergency_hz);
    info!("moisture {:?}, alarm mode {} on gpio {}", reading, mode, line.number());

    signal(&mut line, mode, Duration::from_secs(alarm_config.duration_secs), &mut Delay)?;
    line.release()?;

    Ok(())
}

/// Scans the forecast page and sets the storm relay accordingly.
/// The relay keeps its level after the process exits.
///
/// # Arguments
///
/// * 'config' - the loaded configuration
pub fn run_storm_relay(config: &Config) -> Result<(), RunError> {
    let storm_config = config.storm.as_ref().ok_or(ConfigError::Missing("storm"))?;

    let mut line = OutputLine::acquire(storm_config.pin)?;
    let text = Bom::new(storm_config).get_forecast_text();

    let result = match scan_for_thunderstorm(&text) {
        ScrapedSignal::Mentioned => line.set_high(),
        ScrapedSignal::NotMentioned => line.set_low(),
    };
    result.map_err(|e| GpioError(format!("gpio {}: {:?}", storm_config.pin, e)))?;

    line.leave_driven();

    Ok(())
}
