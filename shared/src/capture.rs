use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use embedded_hal::digital::v2::{OutputPin, PinState};

use crate::clock::{elapsed_ms, Millis};

/// What happened to a single falling edge on the sensor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Capture is not armed, the edge is dropped.
    Disarmed,
    /// Too close to the previous accepted pulse.
    Bounce,
    /// Counted. Carries the new indicator state.
    Accepted { indicator: bool },
}

/// Tally frozen at the end of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub pulses: u16,
    /// The tally hit `u16::MAX` and further pulses were not counted.
    pub overflowed: bool,
}

/// State shared between the edge handler and the measurement loop.
///
/// The handler only ever calls [`PulseCounter::on_edge`] (or
/// [`PulseCounter::capture`]); the loop brackets each window with
/// [`PulseCounter::arm`] and [`PulseCounter::disarm`]. Reading and resetting
/// the tally only happens while disarmed, so the handler never races them.
pub struct PulseCounter {
    debounce_ms: Millis,
    armed: AtomicBool,
    n_pulses: AtomicU16,
    overflowed: AtomicBool,
    // Unset until the first pulse after boot has been accepted.
    has_pulse: AtomicBool,
    last_pulse_ms: AtomicU32,
    indicator: AtomicBool,
}

impl PulseCounter {
    pub const fn new(debounce_ms: Millis) -> Self {
        Self {
            debounce_ms,
            armed: AtomicBool::new(false),
            n_pulses: AtomicU16::new(0),
            overflowed: AtomicBool::new(false),
            has_pulse: AtomicBool::new(false),
            last_pulse_ms: AtomicU32::new(0),
            indicator: AtomicBool::new(false),
        }
    }

    /// Zeroes the tally and starts counting.
    pub fn arm(&self) {
        self.n_pulses.store(0, Ordering::Relaxed);
        self.overflowed.store(false, Ordering::Relaxed);
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Stops counting and returns the frozen tally.
    pub fn disarm(&self) -> WindowCount {
        self.armed.store(false, Ordering::SeqCst);
        WindowCount {
            pulses: self.n_pulses.load(Ordering::SeqCst),
            overflowed: self.overflowed.load(Ordering::SeqCst),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn indicator(&self) -> bool {
        self.indicator.load(Ordering::Acquire)
    }

    /// Clock reading of the last accepted pulse, if any since boot.
    pub fn last_pulse_ms(&self) -> Option<Millis> {
        if self.has_pulse.load(Ordering::Acquire) {
            Some(self.last_pulse_ms.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Debounces one falling edge seen at `now`. Never blocks.
    pub fn on_edge(&self, now: Millis) -> Edge {
        if !self.armed.load(Ordering::Acquire) {
            return Edge::Disarmed;
        }

        if self.has_pulse.load(Ordering::Relaxed) {
            let last = self.last_pulse_ms.load(Ordering::Relaxed);
            if elapsed_ms(last, now) <= self.debounce_ms {
                return Edge::Bounce;
            }
        }
        self.last_pulse_ms.store(now, Ordering::Release);
        self.has_pulse.store(true, Ordering::Release);

        let counted = self
            .n_pulses
            .fetch_update(Ordering::Release, Ordering::Relaxed, |n| n.checked_add(1));
        if counted.is_err() {
            self.overflowed.store(true, Ordering::Release);
        }

        let indicator = !self.indicator.fetch_xor(true, Ordering::AcqRel);
        Edge::Accepted { indicator }
    }

    /// [`PulseCounter::on_edge`] plus mirroring the indicator onto `led`.
    pub fn capture<P: OutputPin>(&self, now: Millis, led: &mut P) -> Result<Edge, P::Error> {
        let edge = self.on_edge(now);
        if let Edge::Accepted { indicator } = edge {
            led.set_state(PinState::from(indicator))?;
        }
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct MockLed {
        high: bool,
        writes: usize,
    }

    impl OutputPin for MockLed {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    fn armed(debounce_ms: Millis) -> PulseCounter {
        let counter = PulseCounter::new(debounce_ms);
        counter.arm();
        counter
    }

    #[test]
    fn starts_disarmed() {
        let counter = PulseCounter::new(10);
        assert!(!counter.is_armed());
        assert_eq!(counter.on_edge(100), Edge::Disarmed);
        assert_eq!(counter.last_pulse_ms(), None);
        assert!(!counter.indicator());
    }

    #[test]
    fn first_pulse_after_boot_is_accepted() {
        let counter = armed(10);
        assert_eq!(counter.on_edge(0), Edge::Accepted { indicator: true });
        assert_eq!(counter.last_pulse_ms(), Some(0));
    }

    #[test]
    fn bounces_within_debounce_are_dropped() {
        let counter = armed(10);
        assert!(matches!(counter.on_edge(1_000), Edge::Accepted { .. }));
        for now in [1_001, 1_005, 1_009, 1_010] {
            assert_eq!(counter.on_edge(now), Edge::Bounce);
        }
        assert_eq!(counter.last_pulse_ms(), Some(1_000));
        assert_eq!(counter.disarm().pulses, 1);
    }

    #[test]
    fn edges_beyond_debounce_are_all_counted() {
        let counter = armed(10);
        let mut now = 500;
        for _ in 0..50 {
            assert!(matches!(counter.on_edge(now), Edge::Accepted { .. }));
            now += 11;
        }
        assert_eq!(counter.disarm().pulses, 50);
    }

    #[test]
    fn bounce_does_not_extend_the_quiet_period() {
        let counter = armed(10);
        counter.on_edge(0);
        assert_eq!(counter.on_edge(8), Edge::Bounce);
        // Measured from the accepted pulse at 0, not the bounce at 8.
        assert!(matches!(counter.on_edge(11), Edge::Accepted { .. }));
    }

    #[test]
    fn debounce_across_clock_wrap() {
        let counter = armed(10);
        counter.on_edge(Millis::MAX - 3);
        assert_eq!(counter.on_edge(2), Edge::Bounce);
        assert!(matches!(counter.on_edge(8), Edge::Accepted { .. }));
        assert_eq!(counter.disarm().pulses, 2);
    }

    #[test]
    fn disarmed_edges_are_lost() {
        let counter = armed(10);
        counter.on_edge(0);
        let count = counter.disarm();
        assert_eq!(count.pulses, 1);

        assert_eq!(counter.on_edge(100), Edge::Disarmed);
        assert_eq!(counter.last_pulse_ms(), Some(0));

        counter.arm();
        assert_eq!(counter.disarm().pulses, 0);
    }

    #[test]
    fn arm_resets_tally() {
        let counter = armed(10);
        counter.on_edge(0);
        counter.on_edge(20);
        assert_eq!(counter.disarm().pulses, 2);
        counter.arm();
        counter.on_edge(40);
        assert_eq!(counter.disarm().pulses, 1);
    }

    #[test]
    fn tally_saturates_and_flags_overflow() {
        let counter = armed(1);
        let mut now: Millis = 0;
        for _ in 0..u16::MAX {
            counter.on_edge(now);
            now += 2;
        }
        assert_eq!(
            counter.disarm(),
            WindowCount {
                pulses: u16::MAX,
                overflowed: false
            }
        );

        counter.arm();
        counter.n_pulses.store(u16::MAX, Ordering::Relaxed);
        assert!(matches!(counter.on_edge(now), Edge::Accepted { .. }));
        assert_eq!(
            counter.disarm(),
            WindowCount {
                pulses: u16::MAX,
                overflowed: true
            }
        );

        counter.arm();
        assert!(!counter.disarm().overflowed);
    }

    #[test]
    fn capture_mirrors_indicator_on_led() {
        let counter = armed(10);
        let mut led = MockLed::default();

        assert_eq!(counter.capture(0, &mut led), Ok(Edge::Accepted { indicator: true }));
        assert!(led.high);
        assert_eq!(counter.capture(5, &mut led), Ok(Edge::Bounce));
        assert!(led.high);
        assert_eq!(counter.capture(20, &mut led), Ok(Edge::Accepted { indicator: false }));
        assert!(!led.high);
        assert_eq!(led.writes, 2);
        assert_eq!(counter.indicator(), led.high);
    }
}
