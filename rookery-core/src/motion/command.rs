//! Motion command decoding
//!
//! The engine queues four kinds of command. Shift deltas arrive in tiles
//! and are scaled to step pulses here, rounding half away from zero.

use core::fmt;

use super::axis::{Axis, PositionModel};
use crate::config::BoardConfig;
use crate::traits::ChessEngine;

/// Raw command type tag as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandTag {
    ToggleMagnet,
    ShiftFile,
    ShiftRank,
    ShiftFileAndRank,
}

impl TryFrom<i32> for CommandTag {
    type Error = DecodeError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(CommandTag::ToggleMagnet),
            1 => Ok(CommandTag::ShiftFile),
            2 => Ok(CommandTag::ShiftRank),
            3 => Ok(CommandTag::ShiftFileAndRank),
            other => Err(DecodeError::UnknownCommand(other)),
        }
    }
}

/// Decoded motion command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionCommand {
    /// Set the magnet to `value` toggle units
    ToggleMagnet(i32),
    /// Shift the file axis by a tile delta
    ShiftFile(f32),
    /// Shift the rank axis by a tile delta
    ShiftRank(f32),
    /// Shift both axes at once
    ShiftFileAndRank(f32, f32),
}

impl MotionCommand {
    /// Tag of this command
    pub fn tag(&self) -> CommandTag {
        match self {
            MotionCommand::ToggleMagnet(_) => CommandTag::ToggleMagnet,
            MotionCommand::ShiftFile(_) => CommandTag::ShiftFile,
            MotionCommand::ShiftRank(_) => CommandTag::ShiftRank,
            MotionCommand::ShiftFileAndRank(_, _) => CommandTag::ShiftFileAndRank,
        }
    }
}

/// Errors raised while decoding or applying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Unrecognized command tag
    UnknownCommand(i32),
    /// Payload was NaN or infinite
    NonFinitePayload(Axis),
    /// Scaled target does not fit the position type
    Overflow(Axis),
    /// Target lies outside the axis travel range
    OutOfRange { axis: Axis, target: i32 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownCommand(tag) => write!(f, "unknown command tag {}", tag),
            DecodeError::NonFinitePayload(axis) => {
                write!(f, "non-finite payload for {:?} axis", axis)
            }
            DecodeError::Overflow(axis) => write!(f, "target overflow on {:?} axis", axis),
            DecodeError::OutOfRange { axis, target } => {
                write!(f, "target {} outside {:?} travel range", target, axis)
            }
        }
    }
}

/// Scale a tile delta to whole steps, rounding half away from zero
pub fn round_steps(axis: Axis, delta: f32, unit_step: i32) -> Result<i32, DecodeError> {
    let scaled = f64::from(delta) * f64::from(unit_step);
    if !scaled.is_finite() {
        return Err(DecodeError::NonFinitePayload(axis));
    }
    if scaled >= f64::from(i32::MAX) || scaled <= f64::from(i32::MIN) {
        return Err(DecodeError::Overflow(axis));
    }

    // `as` truncates toward zero; the fraction keeps the sign of `scaled`
    let whole = scaled as i32;
    let frac = scaled - f64::from(whole);
    let rounded = if frac >= 0.5 {
        whole + 1
    } else if frac <= -0.5 {
        whole - 1
    } else {
        whole
    };
    Ok(rounded)
}

/// Reads commands off the engine queue and turns them into axis targets
#[derive(Debug, Clone, Default)]
pub struct CommandAdapter {
    decoded: u32,
}

impl CommandAdapter {
    /// Create a new adapter
    pub const fn new() -> Self {
        Self { decoded: 0 }
    }

    /// Number of commands decoded so far
    pub fn decoded(&self) -> u32 {
        self.decoded
    }

    /// Pull the head command from the engine, if one is pending
    ///
    /// All reads for one command happen here, in the order the engine's
    /// dequeue-on-read protocol requires.
    pub fn poll<E: ChessEngine>(
        &mut self,
        engine: &mut E,
    ) -> Result<Option<MotionCommand>, DecodeError> {
        if !engine.has_pending_command() {
            return Ok(None);
        }

        let command = match CommandTag::try_from(engine.command_tag())? {
            CommandTag::ToggleMagnet => MotionCommand::ToggleMagnet(engine.int_payload()),
            CommandTag::ShiftFile => MotionCommand::ShiftFile(engine.float_payload_b()),
            CommandTag::ShiftRank => MotionCommand::ShiftRank(engine.float_payload_b()),
            CommandTag::ShiftFileAndRank => {
                let file = engine.float_payload_a();
                let rank = engine.float_payload_b();
                MotionCommand::ShiftFileAndRank(file, rank)
            }
        };

        self.decoded = self.decoded.wrapping_add(1);
        debug!("Decoded command: {:?}", command);
        Ok(Some(command))
    }

    /// Set axis targets for a command
    ///
    /// Every target is computed and range-checked before any axis is
    /// touched, so a rejected command leaves the model unchanged. Travel
    /// limits are skipped when `enforce_travel` is false (homing).
    pub fn apply(
        &self,
        command: MotionCommand,
        model: &mut PositionModel,
        config: &BoardConfig,
        enforce_travel: bool,
    ) -> Result<(), DecodeError> {
        match command {
            MotionCommand::ToggleMagnet(value) => {
                let Some(target) = config.magnet.target_for(value) else {
                    error!("Rejecting magnet payload {}: target overflow", value);
                    return Err(DecodeError::Overflow(Axis::Magnet));
                };
                model.magnet.target = target;
            }
            MotionCommand::ShiftFile(delta) => {
                let file = self.shifted(Axis::File, delta, model, config, enforce_travel)?;
                model.file.target = file;
            }
            MotionCommand::ShiftRank(delta) => {
                let rank = self.shifted(Axis::Rank, delta, model, config, enforce_travel)?;
                model.rank.target = rank;
            }
            MotionCommand::ShiftFileAndRank(file_delta, rank_delta) => {
                let file = self.shifted(Axis::File, file_delta, model, config, enforce_travel)?;
                let rank = self.shifted(Axis::Rank, rank_delta, model, config, enforce_travel)?;
                model.file.target = file;
                model.rank.target = rank;
            }
        }
        Ok(())
    }

    fn shifted(
        &self,
        axis: Axis,
        delta: f32,
        model: &PositionModel,
        config: &BoardConfig,
        enforce_travel: bool,
    ) -> Result<i32, DecodeError> {
        let Some(axis_config) = config.axis(axis) else {
            return Err(DecodeError::Overflow(axis));
        };
        let steps = round_steps(axis, delta, axis_config.unit_step)?;
        let target = model
            .get(axis)
            .current
            .checked_add(steps)
            .ok_or(DecodeError::Overflow(axis))?;

        if enforce_travel && !axis_config.is_reachable(target) {
            error!("Rejecting {:?} target {}: outside travel", axis, target);
            return Err(DecodeError::OutOfRange { axis, target });
        }
        Ok(target)
    }
}
