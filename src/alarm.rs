use std::fmt;
use std::fmt::Formatter;
use std::time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use crate::errors::GpioError;

/// Shortest high or low time of a flash
pub const MIN_HALF_PERIOD: Duration = Duration::from_millis(1);
/// Highest flash frequency, one millisecond high then one low
pub const MAX_FLASH_HZ: f64 = 500.0;

/// A sensed scalar, or the marker for a sensor that couldn't be read
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Percent(f64),
    Failure,
}

/// Signal output behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlarmMode {
    Off,
    Warning(f64),
    Emergency(f64),
    /// Sensor failure, a steady signal rather than a flash
    Fault,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for AlarmMode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AlarmMode::Off => write!(f, "Off"),
            AlarmMode::Warning(hz) => write!(f, "Warning ({} Hz)", hz),
            AlarmMode::Emergency(hz) => write!(f, "Emergency ({} Hz)", hz),
            AlarmMode::Fault => write!(f, "Fault (steady)"),
        }
    }
}

/// Maps a reading against two thresholds to an alarm mode.
///
/// Expects emergency_threshold < warning_threshold, that ordering is checked when the
/// configuration is loaded and not here.
///
/// # Arguments
///
/// * 'reading' - the sensed value
/// * 'warning_threshold' - readings below this flash at warning_hz
/// * 'emergency_threshold' - readings below this flash at emergency_hz
/// * 'warning_hz' - flash frequency for warnings
/// * 'emergency_hz' - flash frequency for emergencies
pub fn evaluate(reading: SensorReading, warning_threshold: f64, emergency_threshold: f64, warning_hz: f64, emergency_hz: f64) -> AlarmMode {
    match reading {
        SensorReading::Failure => AlarmMode::Fault,
        SensorReading::Percent(value) if value < emergency_threshold => AlarmMode::Emergency(emergency_hz),
        SensorReading::Percent(value) if value < warning_threshold => AlarmMode::Warning(warning_hz),
        SensorReading::Percent(_) => AlarmMode::Off,
    }
}

/// Drives the output for the given mode, blocking until the full duration has elapsed.
/// Off returns immediately with the output low, all other modes end with the output low.
///
/// # Arguments
///
/// * 'pin' - the indicator output
/// * 'mode' - the mode to signal
/// * 'duration' - how long to signal
/// * 'delay' - blocking delay provider
pub fn signal<P: OutputPin, D: DelayNs>(pin: &mut P, mode: AlarmMode, duration: Duration, delay: &mut D) -> Result<(), GpioError> {
    match mode {
        AlarmMode::Off => set(pin, false),
        AlarmMode::Fault => {
            set(pin, true)?;
            wait(delay, duration);
            set(pin, false)
        },
        AlarmMode::Warning(hz) | AlarmMode::Emergency(hz) => flash(pin, hz, duration, delay),
    }
}

/// Square wave with equal high and low time per period
fn flash<P: OutputPin, D: DelayNs>(pin: &mut P, hz: f64, duration: Duration, delay: &mut D) -> Result<(), GpioError> {
    if !(hz > 0.0) || !hz.is_finite() {
        return Err(GpioError(format!("invalid flash frequency {}", hz)));
    }

    let half_period = Duration::try_from_secs_f64(0.5 / hz)
        .map_err(|e| GpioError(format!("flash frequency {} gives no usable period: {}", hz, e)))?;
    if half_period < MIN_HALF_PERIOD {
        return Err(GpioError(format!("flash frequency {} is above {} Hz", hz, MAX_FLASH_HZ)));
    }
    let periods = u32::try_from((duration.as_secs_f64() * hz).floor() as u64)
        .map_err(|_| GpioError(format!("too many flash periods at {} Hz over {:?}", hz, duration)))?;

    for _ in 0..periods {
        set(pin, true)?;
        wait(delay, half_period);
        set(pin, false)?;
        wait(delay, half_period);
    }

    let flashed = half_period.saturating_mul(2).saturating_mul(periods);
    wait(delay, duration.saturating_sub(flashed));

    Ok(())
}

fn set<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), GpioError> {
    let result = if high { pin.set_high() } else { pin.set_low() };

    result.map_err(|e| GpioError(format!("{:?}", e)))
}

/// Blocks for the duration, split so that each call fits the delay provider's u32 arguments
fn wait<D: DelayNs>(delay: &mut D, duration: Duration) {
    let mut ms = duration.as_millis();
    while ms > 0 {
        let chunk = ms.min(u32::MAX as u128) as u32;
        delay.delay_ms(chunk);
        ms -= chunk as u128;
    }

    let rest_ns = duration.subsec_nanos() % 1_000_000;
    if rest_ns > 0 {
        delay.delay_ns(rest_ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use pretty_assertions::assert_eq;

    struct RecordingPin {
        /// (elapsed ns at change, level)
        changes: Vec<(u64, bool)>,
        clock: std::rc::Rc<std::cell::Cell<u64>>,
    }

    impl ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.changes.push((self.clock.get(), false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.changes.push((self.clock.get(), true));
            Ok(())
        }
    }

    struct FakeDelay {
        clock: std::rc::Rc<std::cell::Cell<u64>>,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.clock.set(self.clock.get() + ns as u64);
        }
    }

    fn rig() -> (RecordingPin, FakeDelay) {
        let clock = std::rc::Rc::new(std::cell::Cell::new(0));
        (RecordingPin { changes: Vec::new(), clock: clock.clone() }, FakeDelay { clock })
    }

    const SECOND: u64 = 1_000_000_000;

    #[test]
    fn thresholds_pick_mode() {
        assert_eq!(evaluate(SensorReading::Percent(30.0), 50.0, 35.0, 1.0, 4.0), AlarmMode::Emergency(4.0));
        assert_eq!(evaluate(SensorReading::Percent(40.0), 50.0, 35.0, 1.0, 4.0), AlarmMode::Warning(1.0));
        assert_eq!(evaluate(SensorReading::Percent(50.0), 50.0, 35.0, 1.0, 4.0), AlarmMode::Off);
        assert_eq!(evaluate(SensorReading::Percent(35.0), 50.0, 35.0, 1.0, 4.0), AlarmMode::Warning(1.0));
        assert_eq!(evaluate(SensorReading::Percent(87.5), 50.0, 35.0, 1.0, 4.0), AlarmMode::Off);
    }

    #[test]
    fn failure_is_fault_regardless_of_thresholds() {
        for (warning, emergency) in [(50.0, 35.0), (0.0, -10.0), (1000.0, 999.0), (-5.0, 5.0)] {
            assert_eq!(evaluate(SensorReading::Failure, warning, emergency, 1.0, 4.0), AlarmMode::Fault);
        }
    }

    #[test]
    fn severity_never_drops_as_reading_decreases() {
        fn severity(mode: AlarmMode) -> u8 {
            match mode {
                AlarmMode::Off => 0,
                AlarmMode::Warning(_) => 1,
                AlarmMode::Emergency(_) => 2,
                AlarmMode::Fault => panic!("no fault expected"),
            }
        }

        let mut last = 0;
        for step in (0..=240).rev() {
            let reading = step as f64 * 0.5 - 10.0;
            let current = severity(evaluate(SensorReading::Percent(reading), 50.0, 35.0, 1.0, 4.0));
            assert!(current >= last, "severity dropped at reading {}", reading);
            last = current;
        }
        assert_eq!(last, 2);
    }

    #[test]
    fn off_drives_low_and_returns_at_once() {
        let (mut pin, mut delay) = rig();
        signal(&mut pin, AlarmMode::Off, Duration::from_secs(60), &mut delay).unwrap();

        assert_eq!(pin.changes, vec![(0, false)]);
        assert_eq!(delay.clock.get(), 0);
    }

    #[test]
    fn fault_holds_high_for_full_duration() {
        let (mut pin, mut delay) = rig();
        signal(&mut pin, AlarmMode::Fault, Duration::from_secs(5), &mut delay).unwrap();

        assert_eq!(pin.changes, vec![(0, true), (5 * SECOND, false)]);
    }

    #[test]
    fn flash_toggles_with_equal_halves() {
        let (mut pin, mut delay) = rig();
        signal(&mut pin, AlarmMode::Warning(2.0), Duration::from_secs(3), &mut delay).unwrap();

        assert_eq!(pin.changes.len(), 12);
        for (i, (at, level)) in pin.changes.iter().enumerate() {
            assert_eq!(*at, i as u64 * SECOND / 4);
            assert_eq!(*level, i % 2 == 0);
        }
        assert_eq!(delay.clock.get(), 3 * SECOND);
    }

    #[test]
    fn flash_waits_out_partial_period() {
        let (mut pin, mut delay) = rig();
        signal(&mut pin, AlarmMode::Emergency(1.0), Duration::from_millis(2500), &mut delay).unwrap();

        assert_eq!(pin.changes.len(), 4);
        assert_eq!(pin.changes.last(), Some(&(SECOND * 3 / 2, false)));
        assert_eq!(delay.clock.get(), 2_500_000_000);
    }

    #[test]
    fn rejects_non_positive_frequency() {
        let (mut pin, mut delay) = rig();

        assert!(signal(&mut pin, AlarmMode::Warning(0.0), Duration::from_secs(1), &mut delay).is_err());
        assert!(signal(&mut pin, AlarmMode::Warning(-2.0), Duration::from_secs(1), &mut delay).is_err());
        assert!(signal(&mut pin, AlarmMode::Warning(f64::NAN), Duration::from_secs(1), &mut delay).is_err());
        assert!(pin.changes.is_empty());
    }

    #[test]
    fn rejects_frequencies_without_usable_period() {
        let (mut pin, mut delay) = rig();

        assert!(signal(&mut pin, AlarmMode::Warning(1e-20), Duration::from_secs(60), &mut delay).is_err());
        assert!(signal(&mut pin, AlarmMode::Emergency(f64::INFINITY), Duration::from_secs(60), &mut delay).is_err());
        assert!(signal(&mut pin, AlarmMode::Emergency(1e8), Duration::from_secs(60), &mut delay).is_err());
        assert!(pin.changes.is_empty());
        assert_eq!(delay.clock.get(), 0);
    }

    #[test]
    fn highest_frequency_still_flashes() {
        let (mut pin, mut delay) = rig();
        signal(&mut pin, AlarmMode::Emergency(MAX_FLASH_HZ), Duration::from_millis(10), &mut delay).unwrap();

        assert_eq!(pin.changes.len(), 10);
        assert_eq!(delay.clock.get(), 10_000_000);
    }
}
