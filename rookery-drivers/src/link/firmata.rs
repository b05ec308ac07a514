//! Firmata actuator link
//!
//! Drives the pins of a board running StandardFirmata over any byte
//! transport (usually a USB serial port).
//!
//! # Wire format
//!
//! Pins are grouped into 8-pin ports. Every change is sent as a digital
//! port message carrying the complete port state:
//! - `0x90 | port`
//! - bits 0-6 of the port state
//! - bit 7 of the port state
//!
//! Pins are switched to output mode with `0xF4 pin 0x01` when the link
//! starts.

use embedded_io::Write;
use rookery_core::config::{PinConfig, PinMap};
use rookery_core::traits::{ActuatorLink, Line, LinkError};

/// Digital port message command
const DIGITAL_MESSAGE: u8 = 0x90;
/// Set pin mode command
const SET_PIN_MODE: u8 = 0xF4;
/// Digital output pin mode
const PIN_MODE_OUTPUT: u8 = 0x01;

/// Firmata addresses 16 ports of 8 pins
const PORT_COUNT: usize = 16;
/// Highest pin number a port message can address
const MAX_PIN: u8 = (PORT_COUNT * 8 - 1) as u8;

/// Actuator link speaking Firmata digital port messages
pub struct FirmataLink<W> {
    writer: W,
    pins: PinMap,
    /// Last physical state sent for each port
    ports: [u8; PORT_COUNT],
}

impl<W: Write> FirmataLink<W> {
    /// Create a link for the given wiring
    ///
    /// Nothing is sent until [`begin`](Self::begin).
    pub fn new(writer: W, pins: PinMap) -> Self {
        Self {
            writer,
            pins,
            ports: [0; PORT_COUNT],
        }
    }

    /// Set every assigned pin to output, drive all lines low and enable
    /// the stepper drivers
    pub fn begin(&mut self) -> Result<(), LinkError> {
        let map = self.pins;
        for pin in map.all_pins() {
            if pin.pin > MAX_PIN {
                return Err(LinkError::Transport);
            }
            self.send(&[SET_PIN_MODE, pin.pin, PIN_MODE_OUTPUT])?;
        }

        for line in Line::ALL {
            if let Some(pins) = map.get(line) {
                for pin in pins.pins() {
                    Self::set_bit(&mut self.ports, pin, false);
                }
            }
        }
        if let Some(enable) = map.driver_enable {
            Self::set_bit(&mut self.ports, enable, true);
        }

        // Send every used port once so the board matches the cache
        let mut used = [false; PORT_COUNT];
        for pin in map.all_pins() {
            used[usize::from(pin.pin / 8)] = true;
        }
        for (port, _) in used.iter().enumerate().filter(|(_, used)| **used) {
            self.send_port(port)?;
        }
        self.flush()
    }

    /// Release the underlying transport
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Cached physical state of a port
    pub fn port_state(&self, port: usize) -> Option<u8> {
        self.ports.get(port).copied()
    }

    fn set_bit(ports: &mut [u8; PORT_COUNT], pin: PinConfig, high: bool) {
        let port = usize::from(pin.pin / 8);
        let mask = 1u8 << (pin.pin % 8);
        if let Some(state) = ports.get_mut(port) {
            if pin.level(high) {
                *state |= mask;
            } else {
                *state &= !mask;
            }
        }
    }

    fn send_port(&mut self, port: usize) -> Result<(), LinkError> {
        let state = self.ports[port];
        self.send(&[
            DIGITAL_MESSAGE | (port as u8 & 0x0F),
            state & 0x7F,
            state >> 7,
        ])
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.writer
            .write_all(bytes)
            .map_err(|_| LinkError::Transport)
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        self.writer.flush().map_err(|_| LinkError::Transport)
    }
}

impl<W: Write> ActuatorLink for FirmataLink<W> {
    fn write(&mut self, line: Line, high: bool) -> Result<(), LinkError> {
        let Some(pins) = self.pins.get(line).copied() else {
            return Ok(());
        };

        if pins.pins().any(|pin| pin.pin > MAX_PIN) {
            return Err(LinkError::PinRejected(line));
        }

        let before = self.ports;
        for pin in pins.pins() {
            Self::set_bit(&mut self.ports, pin, high);
        }

        let mut sent = false;
        for port in 0..PORT_COUNT {
            if self.ports[port] != before[port] {
                self.send_port(port)?;
                sent = true;
            }
        }
        if sent {
            self.flush()?;
        }
        Ok(())
    }
}
