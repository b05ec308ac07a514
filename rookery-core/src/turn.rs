//! Turn synchronizer
//!
//! Tracks the last side announced to the players and decides when a new
//! turn prompt is due.

use crate::traits::ChessEngine;

/// Whose move it is, as far as the players are told
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnState {
    White,
    Black,
    /// No side to move (startup, game over)
    #[default]
    Neither,
}

impl TurnState {
    /// Map the engine's raw side identifiers
    ///
    /// Any negative `turn` means neither side; otherwise the side is white
    /// exactly when it equals `white_side`.
    pub fn from_engine(turn: i32, white_side: i32) -> Self {
        if turn < 0 {
            TurnState::Neither
        } else if turn == white_side {
            TurnState::White
        } else {
            TurnState::Black
        }
    }

    /// Read the side to move from the engine
    pub fn of<E: ChessEngine>(engine: &E) -> Self {
        Self::from_engine(engine.turn(), engine.white_side())
    }

    /// Spoken prompt for this side, if it has one
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            TurnState::White => Some("It's white's turn!"),
            TurnState::Black => Some("It's black's turn!"),
            TurnState::Neither => None,
        }
    }
}

/// Result of comparing the engine's turn to the last announced one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TurnUpdate {
    pub last_announced: TurnState,
    pub announce: bool,
}

/// Pure turn transition
///
/// A prompt is due when the turn changed to an actual side. A change to
/// `Neither` is recorded silently.
pub fn on_tick(engines_turn: TurnState, last_announced: TurnState) -> TurnUpdate {
    TurnUpdate {
        last_announced: engines_turn,
        announce: engines_turn != last_announced && engines_turn != TurnState::Neither,
    }
}

/// Remembers the last announced side across ticks
#[derive(Debug, Clone, Default)]
pub struct TurnSynchronizer {
    last_announced: TurnState,
}

impl TurnSynchronizer {
    pub const fn new() -> Self {
        Self {
            last_announced: TurnState::Neither,
        }
    }

    pub fn last_announced(&self) -> TurnState {
        self.last_announced
    }

    /// Fold in the engine's current turn
    ///
    /// Returns the prompt to speak, if one is due.
    pub fn reconcile(&mut self, engines_turn: TurnState) -> Option<&'static str> {
        let update = on_tick(engines_turn, self.last_announced);
        if update.last_announced != self.last_announced {
            debug!(
                "Turn {:?} -> {:?}",
                self.last_announced, update.last_announced
            );
        }
        self.last_announced = update.last_announced;
        if update.announce {
            engines_turn.prompt()
        } else {
            None
        }
    }

    /// Forget the last announced side (new game)
    pub fn reset(&mut self) {
        self.last_announced = TurnState::Neither;
    }
}
