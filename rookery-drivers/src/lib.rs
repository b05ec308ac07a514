//! Hardware adapters for the Rookery controller
//!
//! Concrete implementations of the rookery-core collaborator traits:
//!
//! - Actuator links over direct GPIO or a Firmata serial connection
//! - A delay adapter for any `embedded-hal` delay provider

#![no_std]
#![deny(unsafe_code)]

pub mod link;
pub mod timer;

pub use link::{FirmataLink, GpioLink};
pub use timer::HalDelay;
