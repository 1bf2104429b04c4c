use core::convert::Infallible;

use embedded_hal::digital::v2::OutputPin;
use hal::gpio::{GpioPin, Output, PushPull, Unknown};

/// LED flipped on every accepted pulse.
pub struct PulseLed {
    pin: GpioPin<Output<PushPull>, 26>,
}

impl PulseLed {
    pub fn init(pulse_led_pin: GpioPin<Unknown, 26>) -> Self {
        let mut pin = pulse_led_pin.into_push_pull_output();
        // Matches the indicator state of a fresh counter.
        pin.set_low().ok();
        Self { pin }
    }
}

impl OutputPin for PulseLed {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }
}
