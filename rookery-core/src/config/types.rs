//! Board configuration type definitions

use core::fmt;

use crate::motion::Axis;
use crate::traits::Line;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Reference board: pulses per tile on both translation axes
pub const DEFAULT_UNIT_STEP: i32 = 222;

/// Reference board: pulses per magnet motor toggle
pub const DEFAULT_UNIT_TURN: i32 = 30;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Input could not be parsed or deserialized
    Parse,
    /// Encoding buffer too small
    BufferTooSmall,
    /// Config version mismatch
    VersionMismatch,
    /// A value failed validation
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse => f.write_str("configuration could not be parsed"),
            ConfigError::BufferTooSmall => f.write_str("configuration buffer too small"),
            ConfigError::VersionMismatch => f.write_str("configuration version mismatch"),
            ConfigError::Invalid(what) => write!(f, "invalid configuration: {}", what),
        }
    }
}

/// Physical travel limits of a translation axis, in steps from the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TravelRange {
    /// Lowest reachable position
    pub min: i32,
    /// Highest reachable position
    pub max: i32,
}

impl TravelRange {
    /// Create a travel range
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Check if a position is within the range
    pub fn contains(&self, position: i32) -> bool {
        position >= self.min && position <= self.max
    }
}

/// Translation axis configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConfig {
    /// Step pulses per board tile
    pub unit_step: i32,
    /// Travel limits; `None` disables the range check
    #[cfg_attr(feature = "serde", serde(default))]
    pub travel: Option<TravelRange>,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            unit_step: DEFAULT_UNIT_STEP,
            travel: None,
        }
    }
}

impl AxisConfig {
    /// Check if a position is reachable on this axis
    pub fn is_reachable(&self, position: i32) -> bool {
        self.travel.map_or(true, |range| range.contains(position))
    }
}

/// How the piece-holding magnet is actuated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MagnetMode {
    /// A stepper rotates a permanent magnet toward or away from the board
    Stepped,
    /// An electromagnet is switched on or off
    #[default]
    Binary,
}

/// Magnet actuator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MagnetConfig {
    /// Actuation mode
    pub mode: MagnetMode,
    /// Step pulses per toggle unit (stepped mode only)
    pub unit_turn: i32,
    /// Hold time per magnet step pulse in ms (stepped mode)
    pub pulse_ms: u32,
    /// Time for the electromagnet to engage or release in ms (binary mode)
    pub settle_ms: u32,
}

impl Default for MagnetConfig {
    fn default() -> Self {
        Self {
            mode: MagnetMode::Binary,
            unit_turn: DEFAULT_UNIT_TURN,
            pulse_ms: 20,
            settle_ms: 2_000,
        }
    }
}

impl MagnetConfig {
    /// Magnet target for an integer toggle payload
    ///
    /// Binary magnets only know on (1) and off (0). Returns `None` when a
    /// stepped target does not fit the position type.
    pub fn target_for(&self, value: i32) -> Option<i32> {
        match self.mode {
            MagnetMode::Stepped => value.checked_mul(self.unit_turn),
            MagnetMode::Binary => Some(i32::from(value != 0)),
        }
    }
}

/// Pulse and pause timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Translation step pulse width with the magnet released (us)
    pub pulse_us_released: u32,
    /// Translation step pulse width with the magnet engaged (us)
    ///
    /// Longer than the released width so dragged pieces do not slip.
    pub pulse_us_engaged: u32,
    /// Pause after loading a command, before actuation (ms)
    pub command_settle_ms: u32,
    /// Pause after a spoken turn prompt, before listening (ms)
    pub prompt_cooldown_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pulse_us_released: 100,
            pulse_us_engaged: 1_500,
            command_settle_ms: 200,
            prompt_cooldown_ms: 500,
        }
    }
}

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// Digital pin number on the pin firmware
    pub pin: u8,
    /// Pin is active-low (inverted)
    #[cfg_attr(feature = "serde", serde(default))]
    pub inverted: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }

    /// Physical level for a logical level
    pub const fn level(&self, high: bool) -> bool {
        high != self.inverted
    }
}

/// Physical pins behind one logical line
///
/// The mirror drives a second motor ganged on the same axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinePins {
    /// Main pin
    pub primary: PinConfig,
    /// Optional ganged pin
    #[cfg_attr(feature = "serde", serde(default))]
    pub mirror: Option<PinConfig>,
}

impl LinePins {
    /// A line on a single pin
    pub const fn single(pin: PinConfig) -> Self {
        Self {
            primary: pin,
            mirror: None,
        }
    }

    /// A line on two ganged pins
    pub const fn mirrored(primary: PinConfig, mirror: PinConfig) -> Self {
        Self {
            primary,
            mirror: Some(mirror),
        }
    }

    /// Iterate over every physical pin of the line
    pub fn pins(&self) -> impl Iterator<Item = PinConfig> {
        core::iter::once(self.primary).chain(self.mirror)
    }
}

/// Logical line to physical pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinMap {
    pub file_dir: Option<LinePins>,
    pub file_step: Option<LinePins>,
    pub rank_dir: Option<LinePins>,
    pub rank_step: Option<LinePins>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub magnet_dir: Option<LinePins>,
    pub magnet_drive: Option<LinePins>,
    /// Stepper driver enable, driven active once when the link starts
    #[cfg_attr(feature = "serde", serde(default))]
    pub driver_enable: Option<PinConfig>,
}

impl Default for PinMap {
    /// Reference wiring: both file motors ganged, rank on its own motor,
    /// an electromagnet on pin 13 and active-low driver enable on pin 8.
    fn default() -> Self {
        Self {
            file_dir: Some(LinePins::mirrored(PinConfig::new(7), PinConfig::inverted(5))),
            file_step: Some(LinePins::mirrored(PinConfig::new(4), PinConfig::new(2))),
            rank_dir: Some(LinePins::single(PinConfig::new(6))),
            rank_step: Some(LinePins::single(PinConfig::new(3))),
            magnet_dir: None,
            magnet_drive: Some(LinePins::single(PinConfig::new(13))),
            driver_enable: Some(PinConfig::inverted(8)),
        }
    }
}

impl PinMap {
    /// Pins assigned to a logical line
    pub fn get(&self, line: Line) -> Option<&LinePins> {
        match line {
            Line::FileDir => self.file_dir.as_ref(),
            Line::FileStep => self.file_step.as_ref(),
            Line::RankDir => self.rank_dir.as_ref(),
            Line::RankStep => self.rank_step.as_ref(),
            Line::MagnetDir => self.magnet_dir.as_ref(),
            Line::MagnetDrive => self.magnet_drive.as_ref(),
        }
    }

    /// Iterate over every assigned physical pin, including the enable pin
    pub fn all_pins(&self) -> impl Iterator<Item = PinConfig> + '_ {
        Line::ALL
            .into_iter()
            .filter_map(|line| self.get(line))
            .flat_map(LinePins::pins)
            .chain(self.driver_enable)
    }
}

/// Prompting and game lifecycle behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionConfig {
    /// Speak a greeting before the first tick
    pub greet: bool,
    /// Treat the commands queued by `init_board` as homing and re-zero after
    pub home_on_start: bool,
    /// Ask the engine for a return-to-origin before prompting the player
    pub recalibrate_before_prompt: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greet: false,
            home_on_start: false,
            recalibrate_before_prompt: true,
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    pub file: AxisConfig,
    pub rank: AxisConfig,
    pub magnet: MagnetConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub timing: TimingConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pins: PinMap,
    #[cfg_attr(feature = "serde", serde(default))]
    pub session: SessionConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            file: AxisConfig::default(),
            rank: AxisConfig::default(),
            magnet: MagnetConfig::default(),
            timing: TimingConfig::default(),
            pins: PinMap::default(),
            session: SessionConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Translation axis config for file or rank
    ///
    /// Returns `None` for the magnet axis, which has its own config.
    pub fn axis(&self, axis: Axis) -> Option<&AxisConfig> {
        match axis {
            Axis::File => Some(&self.file),
            Axis::Rank => Some(&self.rank),
            Axis::Magnet => None,
        }
    }

    /// Check the configuration for values the controller cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        for axis in [&self.file, &self.rank] {
            if axis.unit_step <= 0 {
                return Err(ConfigError::Invalid("unit_step must be positive"));
            }
            if let Some(range) = axis.travel {
                if range.min > range.max {
                    return Err(ConfigError::Invalid("travel min exceeds max"));
                }
                if !range.contains(0) {
                    return Err(ConfigError::Invalid("travel must include the origin"));
                }
            }
        }
        if self.magnet.mode == MagnetMode::Stepped && self.magnet.unit_turn <= 0 {
            return Err(ConfigError::Invalid("unit_turn must be positive"));
        }
        if self.timing.pulse_us_released == 0 || self.timing.pulse_us_engaged == 0 {
            return Err(ConfigError::Invalid("pulse widths must be non-zero"));
        }
        if self.pins.file_step.is_none() || self.pins.rank_step.is_none() {
            return Err(ConfigError::Invalid("file and rank step lines must be assigned"));
        }
        if self.pins.magnet_drive.is_none() {
            return Err(ConfigError::Invalid("magnet drive line must be assigned"));
        }
        if self.magnet.mode == MagnetMode::Stepped && self.pins.magnet_dir.is_none() {
            return Err(ConfigError::Invalid("stepped magnet needs a direction line"));
        }
        Ok(())
    }
}
