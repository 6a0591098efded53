//! Link-liveness watchdog.

/// Default silence threshold before `no_comm` is raised, matching the
/// source firmware's hard-coded 10 second timeout.
pub const DEFAULT_THRESHOLD_MS: u32 = 10_000;

/// Tracks the last successfully processed request and raises a "no
/// communication" flag after `threshold_ms` of silence.
pub struct Watchdog {
    threshold_ms: u32,
    last_communication_ms: u32,
    no_comm: bool,
}

impl Watchdog {
    pub fn new(threshold_ms: u32) -> Self {
        Self {
            threshold_ms,
            last_communication_ms: 0,
            no_comm: false,
        }
    }

    pub fn threshold_ms(&self) -> u32 {
        self.threshold_ms
    }

    pub fn set_threshold_ms(&mut self, threshold_ms: u32) {
        self.threshold_ms = threshold_ms;
    }

    pub fn no_comm(&self) -> bool {
        self.no_comm
    }

    /// Call on every accepted, correctly-addressed, CRC-valid frame.
    pub fn on_frame_accepted(&mut self, now_ms: u32) {
        self.last_communication_ms = now_ms;
        self.no_comm = false;
    }

    /// Call once per poll iteration that did not process a frame.
    ///
    /// If `now_ms` is not ahead of the last communication timestamp (clock
    /// wrapped, or a non-monotonic source), no time is considered to have
    /// elapsed rather than underflowing the subtraction.
    pub fn poll(&mut self, now_ms: u32) {
        if self.no_comm {
            return;
        }
        if now_ms < self.last_communication_ms {
            return;
        }
        if now_ms - self.last_communication_ms > self.threshold_ms {
            self.no_comm = true;
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_MS)
    }
}
