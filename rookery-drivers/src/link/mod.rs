//! Actuator link implementations

pub mod firmata;
pub mod gpio;

pub use firmata::FirmataLink;
pub use gpio::{GpioLink, GpioPin};
