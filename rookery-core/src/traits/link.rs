//! Actuator output link
//!
//! The controller drives six logical output lines. How a line maps onto
//! physical pins (GPIO, a Firmata serial link, mirrored motors) is the
//! link implementation's concern.

use core::fmt;

/// Number of logical output lines
pub const LINE_COUNT: usize = 6;

/// Logical actuator output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// File axis direction
    FileDir,
    /// File axis step pulse
    FileStep,
    /// Rank axis direction
    RankDir,
    /// Rank axis step pulse
    RankStep,
    /// Magnet motor direction (stepped magnets only)
    MagnetDir,
    /// Magnet motor step pulse, or electromagnet enable for binary magnets
    MagnetDrive,
}

impl Line {
    /// All lines in index order
    pub const ALL: [Line; LINE_COUNT] = [
        Line::FileDir,
        Line::FileStep,
        Line::RankDir,
        Line::RankStep,
        Line::MagnetDir,
        Line::MagnetDrive,
    ];

    /// Stable index of this line (0..LINE_COUNT)
    pub const fn index(self) -> usize {
        match self {
            Line::FileDir => 0,
            Line::FileStep => 1,
            Line::RankDir => 2,
            Line::RankStep => 3,
            Line::MagnetDir => 4,
            Line::MagnetDrive => 5,
        }
    }

    /// Check if this line belongs to the magnet
    pub const fn is_magnet(self) -> bool {
        matches!(self, Line::MagnetDir | Line::MagnetDrive)
    }
}

/// Errors reported by an actuator link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// A pin write for this line was rejected
    PinRejected(Line),
    /// The transport to the pin firmware failed
    Transport,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::PinRejected(line) => write!(f, "pin write rejected on {:?}", line),
            LinkError::Transport => f.write_str("actuator link transport failed"),
        }
    }
}

/// Owned handle to the actuator outputs
///
/// A failed write is fatal to the controller; implementations should not
/// retry internally.
pub trait ActuatorLink {
    /// Drive a logical line high or low
    fn write(&mut self, line: Line, high: bool) -> Result<(), LinkError>;

    /// Drive a line high
    fn set_high(&mut self, line: Line) -> Result<(), LinkError> {
        self.write(line, true)
    }

    /// Drive a line low
    fn set_low(&mut self, line: Line) -> Result<(), LinkError> {
        self.write(line, false)
    }
}
