#![no_std]

pub mod capture;
pub mod clock;
pub mod config;
pub mod measurement;

pub use capture::{Edge, PulseCounter, WindowCount};
pub use clock::Millis;
pub use config::{ConfigError, MeterConfig};
pub use measurement::{Measurement, MeasurementCycle};
