use core::fmt;

use crate::clock::Millis;
use crate::measurement::decimals_needed;

pub const DEFAULT_WINDOW_SECS: u32 = 60;
/// Not verified against a real sensor switch yet, tune per installation.
pub const DEFAULT_DEBOUNCE_MS: Millis = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroWindow,
    ZeroDebounce,
    /// The window in milliseconds does not fit the 32-bit clock.
    WindowTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWindow => f.write_str("measurement window must be at least one second"),
            ConfigError::ZeroDebounce => f.write_str("debounce delay must be at least one millisecond"),
            ConfigError::WindowTooLong => f.write_str("measurement window overflows the millisecond clock"),
        }
    }
}

/// Build-time parameters of the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterConfig {
    window_secs: u32,
    debounce_ms: Millis,
}

impl MeterConfig {
    pub const DEFAULT: MeterConfig = MeterConfig {
        window_secs: DEFAULT_WINDOW_SECS,
        debounce_ms: DEFAULT_DEBOUNCE_MS,
    };

    pub const fn new(window_secs: u32, debounce_ms: Millis) -> Result<Self, ConfigError> {
        if window_secs == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        if window_secs > Millis::MAX / 1000 {
            return Err(ConfigError::WindowTooLong);
        }
        Ok(Self {
            window_secs,
            debounce_ms,
        })
    }

    pub const fn window_secs(&self) -> u32 {
        self.window_secs
    }

    pub const fn window_ms(&self) -> Millis {
        self.window_secs * 1000
    }

    pub const fn debounce_ms(&self) -> Millis {
        self.debounce_ms
    }

    /// Half of what the debounce delay could register at most. Rates at or
    /// above this mean the debounce is swallowing real pulses.
    pub fn max_pulses_per_second(&self) -> f32 {
        (1000.0 / self.debounce_ms as f32) * 0.5
    }

    /// Decimals worth printing given the resolution the debounce allows.
    pub fn displayed_decimals(&self) -> usize {
        decimals_needed(1.0 / self.max_pulses_per_second())
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
