//! Display configuration
//!
//! Wiring and timing for one panel. Timing values are lower bounds: the
//! controller tolerates any longer delay, so raising them is always safe.

use glcd_hal::ExpanderAddresses;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// I2C addresses of the data and control expanders
    pub addresses: ExpanderAddresses,
    /// Minimum Enable high/low hold time in microseconds
    pub strobe_delay_us: u32,
    /// Minimum hold time of each reset phase in microseconds
    pub reset_pulse_us: u32,
    /// Status polls before a busy controller is reported as timed out
    pub busy_poll_limit: u32,
    /// Sleep between busy polls in microseconds
    pub busy_poll_interval_us: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            addresses: ExpanderAddresses::default(),
            strobe_delay_us: 1,
            reset_pulse_us: 10,
            busy_poll_limit: 1000,
            busy_poll_interval_us: 1,
        }
    }
}

/// Configuration problems
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Expander addressing invalid
    Address(glcd_hal::AddressError),
    /// A delay was configured as zero
    ZeroDelay(&'static str),
    /// Busy poll limit of zero
    ZeroPollLimit,
    /// TOML text could not be parsed
    Parse,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Address(e) => write!(f, "{e}"),
            ConfigError::ZeroDelay(field) => write!(f, "{field} must be at least 1 us"),
            ConfigError::ZeroPollLimit => write!(f, "busy_poll_limit must be at least 1"),
            ConfigError::Parse => write!(f, "invalid TOML configuration"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl DisplayConfig {
    /// Check the configuration for values the driver cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.addresses.validate().map_err(ConfigError::Address)?;
        if self.strobe_delay_us == 0 {
            return Err(ConfigError::ZeroDelay("strobe_delay_us"));
        }
        if self.reset_pulse_us == 0 {
            return Err(ConfigError::ZeroDelay("reset_pulse_us"));
        }
        if self.busy_poll_limit == 0 {
            return Err(ConfigError::ZeroPollLimit);
        }
        Ok(())
    }

    /// Parse and validate a TOML configuration
    ///
    /// ```toml
    /// strobe_delay_us = 2
    /// busy_poll_limit = 500
    ///
    /// [addresses]
    /// data = 0x20
    /// control = 0x21
    /// ```
    ///
    /// Missing keys keep their defaults.
    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DisplayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.addresses, ExpanderAddresses::new(0x20, 0x21));
        assert_eq!(config.busy_poll_limit, 1000);
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = DisplayConfig {
            strobe_delay_us: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDelay("strobe_delay_us"))
        );

        let config = DisplayConfig {
            busy_poll_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollLimit));
    }

    #[test]
    fn test_address_conflict_rejected() {
        let config = DisplayConfig {
            addresses: ExpanderAddresses::new(0x24, 0x24),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Address(_))));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml() {
        let config = DisplayConfig::from_toml(
            r#"
            strobe_delay_us = 2
            busy_poll_limit = 500

            [addresses]
            data = 0x38
            control = 0x39
            "#,
        )
        .unwrap();

        assert_eq!(config.strobe_delay_us, 2);
        assert_eq!(config.busy_poll_limit, 500);
        assert_eq!(config.addresses, ExpanderAddresses::new(0x38, 0x39));
        // Unspecified keys keep defaults
        assert_eq!(config.reset_pulse_us, 10);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml_partial_addresses() {
        let config = DisplayConfig::from_toml(
            r#"
            [addresses]
            data = 0x24
            "#,
        )
        .unwrap();

        assert_eq!(config.addresses, ExpanderAddresses::new(0x24, 0x21));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml_rejects_invalid() {
        assert_eq!(
            DisplayConfig::from_toml("busy_poll_limit = 0"),
            Err(ConfigError::ZeroPollLimit)
        );
        assert_eq!(
            DisplayConfig::from_toml("busy_poll_limit = \"many\""),
            Err(ConfigError::Parse)
        );
    }
}
