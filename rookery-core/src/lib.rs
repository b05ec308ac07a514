//! Board-agnostic move execution controller for the motorized chessboard
//!
//! This crate contains all controller logic that does not depend on a
//! specific board, pin firmware, engine binding or speech backend:
//!
//! - Collaborator traits (engine, actuator link, delay, voice, speech)
//! - Axis position model and motion command decoding
//! - Actuator sequencer state machine
//! - Turn synchronizer and announcement relay
//! - The per-tick scheduling loop tying them together
//! - Board configuration types

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "toml")]
extern crate alloc;

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible in every module
mod fmt;

pub mod announce;
pub mod config;
pub mod controller;
pub mod motion;
pub mod sequencer;
pub mod traits;
pub mod turn;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{Controller, ControllerError, ControllerStats, GameSummary, Phase, TickOutcome};
