use std::fs;
use std::thread;
use std::time::Duration;
use bme280_rs::{Bme280, Configuration, Oversampling, SensorMode};
use linux_embedded_hal::{Delay, I2cdev};
use log::{info, warn};
use crate::alarm::SensorReading;
use crate::config::{AmbientConfig, SoilConfig};
use crate::errors::SensorError;

const SAMPLE_ATTEMPTS: usize = 5;
const SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// One ambient reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
}

impl AmbientSample {
    /// The display annotation, e.g. "T: 21.3°C RH: 40% P: 1013hPa"
    pub fn annotation(&self) -> String {
        format!("T: {:.1}°C RH: {}% P: {}hPa",
                self.temperature_c, self.humidity_pct.round() as i32, self.pressure_hpa.round() as i32)
    }
}

/// BME280 temperature, humidity and pressure sensor on an I2C bus
pub struct AmbientSensor {
    bme280: Bme280<I2cdev, Delay>,
}

impl AmbientSensor {
    /// Opens the sensor at its configured address, trying the fallback address if that fails
    ///
    /// # Arguments
    ///
    /// * 'config' - bus device and addresses
    pub fn open(config: &AmbientConfig) -> Result<AmbientSensor, SensorError> {
        match (AmbientSensor::open_at(&config.i2c_bus, config.address), config.fallback_address) {
            (Ok(sensor), _) => Ok(sensor),
            (Err(e), Some(fallback)) => {
                warn!("no sensor at 0x{:02x} ({}), trying 0x{:02x}", config.address, e, fallback);
                AmbientSensor::open_at(&config.i2c_bus, fallback)
            },
            (Err(e), None) => Err(e),
        }
    }

    fn open_at(bus: &str, address: u8) -> Result<AmbientSensor, SensorError> {
        let i2c = I2cdev::new(bus).map_err(|e| SensorError::Bus(format!("{}: {}", bus, e)))?;
        let mut bme280 = Bme280::new_with_address(i2c, address, Delay);

        bme280.init().map_err(|e| SensorError::Device(format!("init: {:?}", e)))?;
        bme280.set_sampling_configuration(
            Configuration::default()
                .with_humidity_oversampling(Oversampling::Oversample2)
                .with_pressure_oversampling(Oversampling::Oversample4)
                .with_temperature_oversampling(Oversampling::Oversample8)
                .with_sensor_mode(SensorMode::Normal),
        ).map_err(|e| SensorError::Device(format!("configure: {:?}", e)))?;

        info!("ambient sensor opened at 0x{:02x} on {}", address, bus);
        Ok(AmbientSensor { bme280 })
    }

    /// Waits for a complete sample, giving up after a few attempts
    pub fn read_sample(&mut self) -> Result<AmbientSample, SensorError> {
        for _ in 0..SAMPLE_ATTEMPTS {
            thread::sleep(SAMPLE_INTERVAL);

            let sample = self.bme280.read_sample()
                .map_err(|e| SensorError::Device(format!("read: {:?}", e)))?;

            if let (Some(temperature_c), Some(humidity_pct), Some(pressure_pa)) =
                (sample.temperature, sample.humidity, sample.pressure) {

                return Ok(AmbientSample { temperature_c, humidity_pct, pressure_hpa: pressure_pa / 100.0 });
            }
        }

        Err(SensorError::NoSample)
    }
}

/// Soil moisture probe behind an ADC exposed through the IIO sysfs interface
pub struct SoilProbe {
    adc_path: String,
    full_scale: f64,
}

impl SoilProbe {
    pub fn open(config: &SoilConfig) -> SoilProbe {
        SoilProbe { adc_path: config.adc_path.clone(), full_scale: config.full_scale }
    }

    /// Reads the probe as a percentage of full scale, any failure is reported in-band
    pub fn read_moisture(&self) -> SensorReading {
        let reading = fs::read_to_string(&self.adc_path)
            .map_err(SensorError::from)
            .and_then(|raw| moisture_from_raw(&raw, self.full_scale));

        match reading {
            Ok(percent) => {
                info!("soil moisture {:.1}%", percent);
                SensorReading::Percent(percent)
            },
            Err(e) => {
                warn!("soil moisture unavailable: {}", e);
                SensorReading::Failure
            },
        }
    }
}

/// Converts a raw ADC value to percent of full scale
///
/// # Arguments
///
/// * 'raw' - the raw value as read from sysfs, surrounding whitespace allowed
/// * 'full_scale' - raw value corresponding to 100%
fn moisture_from_raw(raw: &str, full_scale: f64) -> Result<f64, SensorError> {
    let value: f64 = raw.trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| SensorError::Device(format!("unexpected adc value {:?}", raw.trim())))?;

    Ok(value / full_scale * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn annotation_format() {
        let sample = AmbientSample { temperature_c: 21.34, humidity_pct: 40.4, pressure_hpa: 1013.2 };

        assert_eq!(sample.annotation(), "T: 21.3°C RH: 40% P: 1013hPa");
    }

    #[test]
    fn raw_value_scales_to_percent() {
        assert_eq!(moisture_from_raw("13107\n", 26214.0).unwrap(), 50.0);
        assert_eq!(moisture_from_raw("0", 26214.0).unwrap(), 0.0);
    }

    #[test]
    fn garbage_raw_value_is_an_error() {
        assert!(matches!(moisture_from_raw("n/a", 26214.0), Err(SensorError::Device(_))));
        assert!(matches!(moisture_from_raw("NaN\n", 26214.0), Err(SensorError::Device(_))));
        assert!(matches!(moisture_from_raw("inf", 26214.0), Err(SensorError::Device(_))));
    }

    #[test]
    fn probe_reports_failure_in_band() {
        let missing = SoilProbe { adc_path: "/nonexistent/in_voltage0_raw".to_string(), full_scale: 100.0 };
        assert_eq!(missing.read_moisture(), SensorReading::Failure);

        let path = std::env::temp_dir().join(format!("trainwx-adc-{}", std::process::id()));
        fs::write(&path, "25\n").unwrap();
        let probe = SoilProbe { adc_path: path.to_str().unwrap().to_string(), full_scale: 100.0 };
        let reading = probe.read_moisture();
        fs::remove_file(&path).unwrap();

        assert_eq!(reading, SensorReading::Percent(25.0));
    }
}
