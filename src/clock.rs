//! Contract for the external wall-clock/tick source.

/// A free-running millisecond counter, analogous to `HAL_GetTick()` in the
/// source firmware. Implementations with a genuinely monotonic source never
/// need to worry about `now_ms` going backwards; the watchdog tolerates it
/// either way.
pub trait MonotonicClock {
    fn now_ms(&self) -> u32;
}
