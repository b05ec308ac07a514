//! Axis position model and motion command decoding
//!
//! The engine speaks in tiles; the hardware speaks in step pulses. This
//! module converts between the two and tracks where every axis is and
//! where it is headed.

pub mod axis;
pub mod command;

pub use axis::{Axis, AxisPosition, Direction, PositionModel};
pub use command::{round_steps, CommandAdapter, CommandTag, DecodeError, MotionCommand};
