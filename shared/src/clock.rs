/// Reading of the free-running millisecond clock. Wraps back to zero after
/// roughly 49.7 days of uptime.
pub type Millis = u32;

/// Truncates a 64-bit uptime to the wrapping 32-bit clock.
pub const fn wrapping_millis(uptime_ms: u64) -> Millis {
    uptime_ms as Millis
}

/// Milliseconds between `last` and `now`, treating `now < last` as a clock
/// wraparound.
pub const fn elapsed_ms(last: Millis, now: Millis) -> Millis {
    if now >= last {
        now - last
    } else {
        (Millis::MAX - last) + now
    }
}
