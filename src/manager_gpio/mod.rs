use embedded_hal::digital::{ErrorType, OutputPin};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{SysfsPin, SysfsPinError};
use log::{debug, warn};
use crate::errors::GpioError;

/// An exported sysfs GPIO line configured as an output.
///
/// Dropping the line drives it low and unexports it, unless it was handed over
/// with `leave_driven`.
pub struct OutputLine {
    pin: SysfsPin,
    number: u64,
    released: bool,
}

impl OutputLine {
    /// Claims the line as an output, initially low.
    /// A line left exported by an earlier run is unexported first.
    ///
    /// # Arguments
    ///
    /// * 'number' - sysfs gpio number
    pub fn acquire(number: u64) -> Result<OutputLine, GpioError> {
        let pin = SysfsPin::new(number);

        if pin.is_exported() {
            debug!("gpio {} left exported, cleaning up before use", number);
            pin.unexport()?;
        }
        pin.export()?;
        pin.set_direction(Direction::Low)?;

        Ok(OutputLine { pin, number, released: false })
    }

    /// Drives the line low and gives it back
    pub fn release(mut self) -> Result<(), GpioError> {
        self.shutdown()
    }

    /// Gives up ownership keeping the current level, the line stays exported
    /// until the next acquire cleans it up
    pub fn leave_driven(mut self) {
        debug!("gpio {} left driven", self.number);
        self.released = true;
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    fn shutdown(&mut self) -> Result<(), GpioError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.pin.set_value(0)?;
        self.pin.unexport()?;

        Ok(())
    }
}

impl Drop for OutputLine {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("failed to release gpio {}: {}", self.number, e);
        }
    }
}

impl ErrorType for OutputLine {
    type Error = SysfsPinError;
}

impl OutputPin for OutputLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }
}
