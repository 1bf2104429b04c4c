use embassy_time::{Duration, Timer};
use esp_println::print;
use windsensor::MeasurementCycle;

#[embassy_executor::task]
pub async fn measurement_task(cycle: MeasurementCycle<'static>) {
    let window = Duration::from_millis(cycle.window_ms().into());
    loop {
        cycle.begin();
        Timer::after(window).await;
        let measurement = cycle.finish();
        print!("{measurement}");
    }
}
