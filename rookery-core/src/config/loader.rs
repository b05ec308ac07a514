//! Configuration loading
//!
//! Hosts load `board.toml` through [`parse_config`]. Boards without a
//! filesystem keep a postcard-encoded copy instead ([`encode_config`] and
//! [`decode_config`]). Every loader validates before returning.

#[cfg(feature = "serde")]
use super::types::{BoardConfig, ConfigError};

/// Maximum serialized config size (binary)
pub const MAX_CONFIG_SIZE: usize = 256;

/// Parse a TOML board configuration
#[cfg(feature = "toml")]
pub fn parse_config(input: &str) -> Result<BoardConfig, ConfigError> {
    let config: BoardConfig = toml::from_str(input).map_err(|_e| {
        warn!("board config TOML rejected");
        ConfigError::Parse
    })?;
    config.validate()?;
    log_config_summary(&config);
    Ok(config)
}

/// Encode a configuration into `buffer`, returning the used prefix
#[cfg(feature = "serde")]
pub fn encode_config<'a>(
    config: &BoardConfig,
    buffer: &'a mut [u8],
) -> Result<&'a mut [u8], ConfigError> {
    postcard::to_slice(config, buffer).map_err(|_| ConfigError::BufferTooSmall)
}

/// Decode and validate a postcard-encoded configuration
#[cfg(feature = "serde")]
pub fn decode_config(bytes: &[u8]) -> Result<BoardConfig, ConfigError> {
    let config: BoardConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Parse)?;
    config.validate()?;
    log_config_summary(&config);
    Ok(config)
}

#[cfg(feature = "serde")]
fn log_config_summary(config: &BoardConfig) {
    info!("Board configuration loaded");
    debug!(
        "  unit steps: file={} rank={}",
        config.file.unit_step,
        config.rank.unit_step
    );
    debug!("  magnet: {:?}", config.magnet.mode);
}
