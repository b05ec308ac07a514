//! Direct GPIO actuator link
//!
//! Each logical line drives one pin, or two when a second motor is ganged
//! on the same axis. Inversion is applied per pin.

use embedded_hal::digital::OutputPin;
use rookery_core::traits::{ActuatorLink, Line, LinkError, LINE_COUNT};

/// Output pin with its polarity
pub struct GpioPin<P> {
    pin: P,
    /// If true, logical high = pin LOW
    inverted: bool,
}

impl<P: OutputPin> GpioPin<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    pub fn inverted(pin: P) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }

    fn drive(&mut self, high: bool) -> Result<(), P::Error> {
        if high != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}

struct GpioLine<P> {
    primary: GpioPin<P>,
    mirror: Option<GpioPin<P>>,
}

/// Actuator link over `embedded-hal` output pins
///
/// Lines without pins are accepted and ignored, so a board without a
/// magnet direction line can still be driven.
pub struct GpioLink<P> {
    lines: [Option<GpioLine<P>>; LINE_COUNT],
    enable: Option<GpioPin<P>>,
    levels: [bool; LINE_COUNT],
}

impl<P: OutputPin> Default for GpioLink<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin> GpioLink<P> {
    /// Create a link with no pins assigned
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| None),
            enable: None,
            levels: [false; LINE_COUNT],
        }
    }

    /// Assign the pin for a line, replacing any previous one
    pub fn with_line(mut self, line: Line, pin: GpioPin<P>) -> Self {
        self.lines[line.index()] = Some(GpioLine {
            primary: pin,
            mirror: None,
        });
        self
    }

    /// Assign a line driving two pins in lockstep
    pub fn with_mirrored_line(
        mut self,
        line: Line,
        primary: GpioPin<P>,
        mirror: GpioPin<P>,
    ) -> Self {
        self.lines[line.index()] = Some(GpioLine {
            primary,
            mirror: Some(mirror),
        });
        self
    }

    /// Assign the stepper driver enable pin
    pub fn with_enable(mut self, pin: GpioPin<P>) -> Self {
        self.enable = Some(pin);
        self
    }

    /// Drive every line low and enable the stepper drivers
    pub fn begin(&mut self) -> Result<(), LinkError> {
        for line in Line::ALL {
            self.write(line, false)?;
        }
        if let Some(enable) = self.enable.as_mut() {
            enable.drive(true).map_err(|_| LinkError::Transport)?;
        }
        Ok(())
    }

    /// Disable the stepper drivers so the gantry can be moved by hand
    pub fn release(&mut self) -> Result<(), LinkError> {
        if let Some(enable) = self.enable.as_mut() {
            enable.drive(false).map_err(|_| LinkError::Transport)?;
        }
        Ok(())
    }

    /// Last logical level written to a line
    pub fn level(&self, line: Line) -> bool {
        self.levels[line.index()]
    }
}

impl<P: OutputPin> ActuatorLink for GpioLink<P> {
    fn write(&mut self, line: Line, high: bool) -> Result<(), LinkError> {
        let Some(pins) = self.lines[line.index()].as_mut() else {
            return Ok(());
        };
        pins.primary
            .drive(high)
            .map_err(|_| LinkError::PinRejected(line))?;
        if let Some(mirror) = pins.mirror.as_mut() {
            mirror.drive(high).map_err(|_| LinkError::PinRejected(line))?;
        }
        self.levels[line.index()] = high;
        Ok(())
    }
}
