//! Actuator sequencer
//!
//! Drives the axes one step per tick toward their targets while keeping
//! magnet actuation and gantry translation strictly apart.

pub mod machine;
pub mod pulse;

pub use machine::SequencerState;
pub use pulse::{Sequencer, TickReport};
