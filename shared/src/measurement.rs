use core::fmt;

use libm::{ceilf, fabsf, log10f};

use crate::capture::{PulseCounter, WindowCount};
use crate::clock::Millis;
use crate::config::MeterConfig;

const SEPARATOR: &str = "-----------------------------------------------";

/// Number of decimal places needed to show every number >= `smallest`.
pub fn decimals_needed(smallest: f32) -> usize {
    ceilf(fabsf(log10f(smallest))) as usize
}

pub fn pulses_per_second(pulses: u16, window_secs: u32) -> f32 {
    pulses as f32 / window_secs as f32
}

pub fn pulses_per_minute(pulses: u16, window_secs: u32) -> f32 {
    pulses as f32 * 60.0 / window_secs as f32
}

/// Result of one finished window, rendered as the serial report by its
/// `Display` impl.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub pulses: u16,
    pub per_second: f32,
    pub per_minute: f32,
    pub decimals: usize,
    /// Rate reached the most the debounce delay can resolve.
    pub debounce_too_coarse: bool,
    pub overflowed: bool,
}

impl Measurement {
    pub fn evaluate(count: WindowCount, config: &MeterConfig) -> Self {
        let per_second = pulses_per_second(count.pulses, config.window_secs());
        Self {
            pulses: count.pulses,
            per_second,
            per_minute: pulses_per_minute(count.pulses, config.window_secs()),
            decimals: config.displayed_decimals(),
            debounce_too_coarse: per_second >= config.max_pulses_per_second(),
            overflowed: count.overflowed,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pulses measured: {}", self.pulses)?;
        writeln!(f, "Pulses per second: {:.*}", self.decimals, self.per_second)?;
        writeln!(f, "Pulses per minute: {:.*}", self.decimals, self.per_minute)?;
        if self.debounce_too_coarse {
            writeln!(f, "ERROR: Debounce delay too high for impulse speed!")?;
        }
        if self.overflowed {
            writeln!(f, "ERROR: RPM too high, counter will overflow!!")?;
        }
        writeln!(f, "{SEPARATOR}")
    }
}

/// One measurement window: [`MeasurementCycle::begin`], wait
/// [`MeasurementCycle::window_ms`], then [`MeasurementCycle::finish`].
#[derive(Clone, Copy)]
pub struct MeasurementCycle<'a> {
    counter: &'a PulseCounter,
    config: MeterConfig,
}

impl<'a> MeasurementCycle<'a> {
    pub fn new(counter: &'a PulseCounter, config: MeterConfig) -> Self {
        Self { counter, config }
    }

    pub fn window_ms(&self) -> Millis {
        self.config.window_ms()
    }

    /// Resets the tally and arms capture.
    pub fn begin(&self) {
        self.counter.arm();
    }

    /// Disarms capture and turns the frozen tally into rates.
    pub fn finish(&self) -> Measurement {
        let count = self.counter.disarm();
        Measurement::evaluate(count, &self.config)
    }
}
