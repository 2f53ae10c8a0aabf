//! GPIO character-device line access.
//!
//! The daemon drives exactly one output line. [`LedLine`] is the seam the
//! event loop is written against; [`CdevLine`] is the hardware
//! implementation over `/dev/gpiochip*`.

use std::path::{Path, PathBuf};

use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use tracing::debug;

/// Consumer label attached to the kernel line request.
pub const CONSUMER: &str = "blinkd";

/// Errors from GPIO line acquisition and I/O.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    #[error("failed to open GPIO chip {chip}: {source}")]
    OpenChip {
        chip: String,
        source: gpio_cdev::Error,
    },

    #[error("failed to request line {line} on {chip} as output: {source}")]
    RequestLine {
        chip: String,
        line: u32,
        source: gpio_cdev::Error,
    },

    #[error("GPIO read failed: {0}")]
    Read(gpio_cdev::Error),

    #[error("GPIO write failed: {0}")]
    Write(gpio_cdev::Error),
}

/// A single output line driving the indicator LED.
pub trait LedLine {
    /// The level last written to the line.
    fn get(&self) -> Result<bool, GpioError>;

    /// Drive the line to the given level.
    fn set(&mut self, level: bool) -> Result<(), GpioError>;
}

/// Resolve a chip name like `"gpiochip0"` to its `/dev` node.
/// Absolute paths pass through untouched.
pub fn chip_device_path(chip: &str) -> PathBuf {
    let path = Path::new(chip);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new("/dev").join(chip)
    }
}

/// An output line requested from the GPIO character device.
///
/// The kernel releases the request when this value is dropped.
#[derive(Debug)]
pub struct CdevLine {
    handle: LineHandle,
}

impl CdevLine {
    /// Request `line` on `chip` as an output line, initially low.
    pub fn open(chip: &str, line: u32) -> Result<Self, GpioError> {
        let device = chip_device_path(chip);
        let mut chip_dev = Chip::new(&device).map_err(|source| GpioError::OpenChip {
            chip: chip.to_string(),
            source,
        })?;
        let handle = chip_dev
            .get_line(line)
            .and_then(|l| l.request(LineRequestFlags::OUTPUT, 0, CONSUMER))
            .map_err(|source| GpioError::RequestLine {
                chip: chip.to_string(),
                line,
                source,
            })?;
        debug!(chip = %device.display(), line, "GPIO line requested");
        Ok(Self { handle })
    }
}

impl LedLine for CdevLine {
    fn get(&self) -> Result<bool, GpioError> {
        Ok(self.handle.get_value().map_err(GpioError::Read)? != 0)
    }

    fn set(&mut self, level: bool) -> Result<(), GpioError> {
        self.handle.set_value(level as u8).map_err(GpioError::Write)
    }
}
