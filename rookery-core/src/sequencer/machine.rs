//! Sequencer state machine
//!
//! Which kind of motion a tick performs is a function of the current state
//! and the position model alone.

use crate::motion::PositionModel;

/// Sequencer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerState {
    /// All axes at target
    #[default]
    Idle,
    /// Magnet axis mid-transition; translation waits
    MagnetMoving,
    /// File and/or rank mid-transition; new magnet requests wait
    Translating,
}

impl SequencerState {
    /// Check if no motion is in progress
    pub fn is_idle(&self) -> bool {
        matches!(self, SequencerState::Idle)
    }

    /// Compute the next state for the model
    ///
    /// The magnet always resolves before translation starts, and an active
    /// translation runs to completion before the magnet is serviced.
    pub fn transition(self, model: &PositionModel) -> Self {
        use SequencerState::*;

        match self {
            Idle if model.magnet_pending() => MagnetMoving,
            Idle if model.translation_pending() => Translating,
            Idle => Idle,

            MagnetMoving if model.magnet_pending() => MagnetMoving,
            MagnetMoving => Idle,

            Translating if model.translation_pending() => Translating,
            Translating => Idle,
        }
    }
}
