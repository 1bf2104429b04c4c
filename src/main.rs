#![no_std]
#![no_main]
#![feature(type_alias_impl_trait)]

// hal code examples in https://github.com/esp-rs/esp-hal/tree/main/esp32-hal
// sensor is an Eltako Windsensor WS: one wire on GPIO15, the other on GND

mod led_output;
mod measurement;
mod pulse_counter;

use esp_backtrace as _;
use esp_println::println;
use hal::{
    clock::ClockControl,
    embassy,
    gpio::IO,
    interrupt,
    peripherals::{self, Peripherals},
    prelude::*,
    timer::TimerGroup,
    Rtc,
};
use led_output::PulseLed;
use measurement::measurement_task;
use static_cell::StaticCell;
use windsensor::{
    config::{DEFAULT_DEBOUNCE_MS, DEFAULT_WINDOW_SECS},
    MeasurementCycle, MeterConfig, PulseCounter,
};

const CONFIG: MeterConfig = match MeterConfig::new(DEFAULT_WINDOW_SECS, DEFAULT_DEBOUNCE_MS) {
    Ok(config) => config,
    Err(_) => panic!("invalid meter configuration"),
};

static PULSE_COUNTER: StaticCell<PulseCounter> = StaticCell::new();

#[entry]
fn entry() -> ! {
    static EXECUTOR: StaticCell<embassy::executor::Executor> = StaticCell::new();
    let executor = EXECUTOR.init(embassy::executor::Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main(spawner)).ok();
    });
}

#[embassy_executor::task]
async fn main(spawner: embassy_executor::Spawner) {
    let peripherals = Peripherals::take();

    let system = peripherals.DPORT.split();
    let clocks = ClockControl::boot_defaults(system.clock_control).freeze();
    let mut peripheral_clock_control = system.peripheral_clock_control;

    let mut rtc = Rtc::new(peripherals.RTC_CNTL);
    rtc.rwdt.disable();

    let timer_group0 = TimerGroup::new(peripherals.TIMG0, &clocks, &mut peripheral_clock_control);
    let mut wdt0 = timer_group0.wdt;
    wdt0.disable();
    embassy::init(&clocks, timer_group0.timer0);

    let io = IO::new(peripherals.GPIO, peripherals.IO_MUX);

    interrupt::enable(peripherals::Interrupt::GPIO, interrupt::Priority::Priority1).unwrap();

    println!(
        "Measuring pulses for {}s per window, debounce {}ms (max {} pulses/s)",
        CONFIG.window_secs(),
        CONFIG.debounce_ms(),
        CONFIG.max_pulses_per_second()
    );

    // Created disarmed so the first window starts from a clean tally.
    let counter: &'static PulseCounter = PULSE_COUNTER.init(PulseCounter::new(CONFIG.debounce_ms()));

    let pulse_led = PulseLed::init(io.pins.gpio26);
    spawner
        .spawn(pulse_counter::pulse_counter(io.pins.gpio15, pulse_led, counter))
        .ok();
    spawner
        .spawn(measurement_task(MeasurementCycle::new(counter, CONFIG)))
        .ok();
}
