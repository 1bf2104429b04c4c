use embassy_time::Instant;
use hal::{
    gpio::{GpioPin, Unknown},
    prelude::_embedded_hal_async_digital_Wait,
};
use windsensor::{clock::wrapping_millis, PulseCounter};

use crate::led_output::PulseLed;

/// Edge handler for the wind sensor contact. Woken by the GPIO interrupt on
/// every falling edge; the contact pulls the line to ground against the
/// internal pull-up.
#[embassy_executor::task]
pub async fn pulse_counter(
    sensor_pin: GpioPin<Unknown, 15>,
    mut led: PulseLed,
    counter: &'static PulseCounter,
) {
    let mut pin = sensor_pin.into_pull_up_input();
    loop {
        if pin.wait_for_falling_edge().await.is_err() {
            continue;
        }
        let now = wrapping_millis(Instant::now().as_millis());
        counter.capture(now, &mut led).ok();
    }
}
