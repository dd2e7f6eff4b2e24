use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::alarm::MAX_FLASH_HZ;
use crate::errors::ConfigError;
use crate::layout::LayoutKind;

#[derive(Deserialize)]
pub struct General {
    pub log_path: Option<String>,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct DarkSkyConfig {
    pub api_key: String,
    pub lat: f64,
    pub long: f64,
    #[serde(default = "default_dark_sky_url")]
    pub base_url: String,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_forecast_steps")]
    pub forecast_steps: Vec<usize>,
}

#[derive(Deserialize)]
pub struct PtvConfig {
    pub dev_id: String,
    pub api_key: String,
    pub stop: String,
    #[serde(default = "default_ptv_url")]
    pub base_url: String,
    #[serde(default)]
    pub route_type: u32,
    #[serde(default = "default_direction_id")]
    pub direction_id: u32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub look_backwards: bool,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    Black,
    White,
}

#[derive(Deserialize)]
pub struct DisplayConfig {
    pub layout: LayoutKind,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    pub output_path: String,
    pub background: Option<String>,
    #[serde(default)]
    pub h_flip: bool,
    #[serde(default)]
    pub v_flip: bool,
    #[serde(default = "default_border")]
    pub border: Border,
}

#[derive(Deserialize)]
pub struct AmbientConfig {
    pub i2c_bus: String,
    #[serde(default = "default_bme_address")]
    pub address: u8,
    pub fallback_address: Option<u8>,
}

#[derive(Deserialize)]
pub struct SoilConfig {
    pub adc_path: String,
    pub full_scale: f64,
}

#[derive(Deserialize, Default)]
pub struct SensorsConfig {
    pub ambient: Option<AmbientConfig>,
    pub soil: Option<SoilConfig>,
}

#[derive(Deserialize)]
pub struct AlarmConfig {
    pub pin: u64,
    pub warning_threshold: f64,
    pub emergency_threshold: f64,
    pub warning_hz: f64,
    pub emergency_hz: f64,
    pub duration_secs: u64,
}

#[derive(Deserialize)]
pub struct StormConfig {
    pub url: String,
    pub pin: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub general: General,
    pub dark_sky: Option<DarkSkyConfig>,
    pub ptv: Option<PtvConfig>,
    pub display: Option<DisplayConfig>,
    #[serde(default)]
    pub sensors: SensorsConfig,
    pub alarm: Option<AlarmConfig>,
    pub storm: Option<StormConfig>,
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;

    parse_config(&toml)
}

/// Parses and validates a configuration document
///
/// # Arguments
///
/// * 'toml' - the configuration document
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;
    validate(&config)?;

    Ok(config)
}

/// Rejects configurations the pipelines can't run with
///
/// # Arguments
///
/// * 'config' - the parsed configuration
fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(dark_sky) = &config.dark_sky {
        if dark_sky.forecast_steps.is_empty() {
            return Err(ConfigError::Invalid("dark_sky.forecast_steps must not be empty".to_string()));
        }
    }

    if let Some(alarm) = &config.alarm {
        if !alarm.warning_threshold.is_finite() || !alarm.emergency_threshold.is_finite() {
            return Err(ConfigError::Invalid("alarm thresholds must be finite numbers".to_string()));
        }
        if alarm.emergency_threshold >= alarm.warning_threshold {
            return Err(ConfigError::Invalid(format!(
                "alarm.emergency_threshold ({}) must be below alarm.warning_threshold ({})",
                alarm.emergency_threshold, alarm.warning_threshold)));
        }
        for (name, hz) in [("warning_hz", alarm.warning_hz), ("emergency_hz", alarm.emergency_hz)] {
            if !(hz > 0.0 && hz <= MAX_FLASH_HZ) {
                return Err(ConfigError::Invalid(format!(
                    "alarm.{} ({}) must be above 0 and at most {} Hz", name, hz, MAX_FLASH_HZ)));
            }
            if alarm.duration_secs as f64 * hz > u32::MAX as f64 {
                return Err(ConfigError::Invalid(format!(
                    "alarm.{} ({}) flashes too many times over {} s", name, hz, alarm.duration_secs)));
            }
        }
    }

    if let Some(soil) = &config.sensors.soil {
        if soil.full_scale <= 0.0 {
            return Err(ConfigError::Invalid("sensors.soil.full_scale must be positive".to_string()));
        }
    }

    Ok(())
}

fn default_dark_sky_url() -> String { "https://api.darksky.net/forecast/".to_string() }
fn default_units() -> String { "si".to_string() }
fn default_forecast_steps() -> Vec<usize> { vec![1, 3, 6] }
fn default_ptv_url() -> String { "http://timetableapi.ptv.vic.gov.au".to_string() }
fn default_direction_id() -> u32 { 1 }
fn default_max_results() -> usize { 4 }
fn default_width() -> u32 { 212 }
fn default_height() -> u32 { 104 }
fn default_border() -> Border { Border::Black }
fn default_bme_address() -> u8 { 0x76 }
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.96 Safari/537.36".to_string()
}
