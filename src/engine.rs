//! Receive-frame supervisor and top-level engine state machine.
//!
//! The supervisor owns the transport, the registry, the hooks, and the
//! shared frame buffer. It is driven from two places: an interrupt context
//! that posts a completed DMA reception into the [`FrameMailbox`], and a
//! polling context (the application's main loop) that drains the mailbox
//! and runs the request through [`crate::processor`].

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::clock::MonotonicClock;
use crate::config::{BaudRate, EngineConfig, Parity};
use crate::error::ConfigError;
use crate::frame::{verify_crc, BUFFER_SIZE, MIN_REQUEST_LEN};
use crate::hooks::Hooks;
use crate::processor::process_request;
use crate::registry::{AddressSpace, RegisterType, Registry};
use crate::transport::Transport;
use crate::watchdog::Watchdog;

/// Coarse engine state, exposed for diagnostics and tests; the supervisor's
/// actual control flow does not switch on this beyond `poll`.
#[cfg_attr(not(test), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Idle,
    Processing,
    Transmitting,
}

/// Single-slot, lock-free handoff from interrupt context to the polling
/// task, replacing the source firmware's pair of file-scope globals
/// (`flg_modbus_packet_received`, `len_modbus_frame`).
///
/// The ISR calls [`post`](Self::post) once DMA reception is stopped by the
/// idle-line/timeout condition; the poll loop calls [`take`](Self::take) to
/// atomically claim and clear it. At most one frame is ever in flight: a
/// `post` that arrives before the previous one is taken overwrites it,
/// matching the single-buffer design of the original driver.
pub struct FrameMailbox {
    ready: AtomicBool,
    residual: AtomicUsize,
}

impl FrameMailbox {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            residual: AtomicUsize::new(0),
        }
    }

    /// Called from interrupt context once a frame has landed in the shared
    /// buffer. `residual` is the number of bytes DMA did not fill (so the
    /// received length is `BUFFER_SIZE - residual`), mirroring the DMA
    /// controller's remaining-transfer-count register.
    pub fn post(&self, residual: usize) {
        self.residual.store(residual, Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
    }

    /// Called from poll context. Returns the posted residual count and
    /// clears the slot, or `None` if no frame is waiting.
    pub fn take(&self) -> Option<usize> {
        if self.ready.swap(false, Ordering::Acquire) {
            Some(self.residual.load(Ordering::Relaxed))
        } else {
            None
        }
    }
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Ties together the frame buffer, the address-space registry, the
/// transport/hooks/clock collaborators, and the liveness watchdog into one
/// polled protocol engine.
pub struct Engine<'a, T: Transport, H: Hooks, C: MonotonicClock, const N: usize = 16> {
    config: EngineConfig,
    transport: T,
    hooks: H,
    clock: C,
    registry: Registry<'a, N>,
    buffer: [u8; BUFFER_SIZE],
    mailbox: FrameMailbox,
    watchdog: Watchdog,
    state: EngineState,
}

impl<'a, T: Transport, H: Hooks, C: MonotonicClock, const N: usize> Engine<'a, T, H, C, N> {
    pub fn new(config: EngineConfig, transport: T, hooks: H, clock: C) -> Self {
        Self {
            config,
            transport,
            hooks,
            clock,
            registry: Registry::new(),
            buffer: [0u8; BUFFER_SIZE],
            mailbox: FrameMailbox::new(),
            watchdog: Watchdog::default(),
            state: EngineState::Uninitialized,
        }
    }

    /// Arms the first reception and transitions out of `Uninitialized`.
    /// Must be called once before `poll` is called.
    pub fn init(&mut self) {
        self.transport.arm_receive();
        self.watchdog.on_frame_accepted(self.clock.now_ms());
        self.state = EngineState::Idle;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// A handle the interrupt side can post completed receptions to without
    /// needing a `&mut Engine` (the engine itself is only ever touched from
    /// the polling context).
    pub fn mailbox(&self) -> &FrameMailbox {
        &self.mailbox
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn add_address_space(&mut self, space: AddressSpace<'a>) -> Result<(), crate::error::RegistryError> {
        self.registry.add(space)
    }

    pub fn remove_address_space(&mut self, backing: *const u16) -> Result<(), crate::error::RegistryError> {
        self.registry.remove_by_backing(backing)
    }

    /// Drains the mailbox if a frame is waiting and processes it;
    /// otherwise services the watchdog. Call this from the main loop.
    pub fn poll(&mut self) -> EngineState {
        match self.mailbox.take() {
            Some(residual) => {
                let length = BUFFER_SIZE.saturating_sub(residual);
                self.handle_frame(length);
            }
            None => {
                self.watchdog.poll(self.clock.now_ms());
            }
        }
        self.state
    }

    fn handle_frame(&mut self, length: usize) {
        self.state = EngineState::Processing;

        if length < MIN_REQUEST_LEN {
            #[cfg(not(test))]
            defmt::trace!("discarding undersized frame ({} bytes)", length);
            self.transport.arm_receive();
            self.state = EngineState::Idle;
            return;
        }

        if !verify_crc(&self.buffer, length) {
            #[cfg(not(test))]
            defmt::trace!("discarding frame with a bad CRC");
            self.transport.arm_receive();
            self.state = EngineState::Idle;
            return;
        }

        let slave = self.buffer[0];
        if slave != self.config.slave_id && slave != 0 {
            #[cfg(not(test))]
            defmt::trace!("discarding frame addressed to slave {=u8}", slave);
            self.transport.arm_receive();
            self.state = EngineState::Idle;
            return;
        }

        let outcome = process_request(
            &mut self.buffer,
            length,
            &self.config,
            &mut self.registry,
            &mut self.hooks,
        );
        self.watchdog.on_frame_accepted(self.clock.now_ms());

        if outcome.send_reply {
            self.state = EngineState::Transmitting;
            self.hooks.start_sending();
            self.transport.start_transmit(&self.buffer[..outcome.total_len]);
        } else {
            self.transport.arm_receive();
            self.state = EngineState::Idle;
        }
    }

    /// Called once the transport reports transmission complete.
    pub fn on_tx_complete(&mut self) {
        self.hooks.end_sending();
        self.transport.arm_receive();
        self.state = EngineState::Idle;
    }

    /// Reconfigures baud/parity/slave id. Unlike the source firmware, an
    /// invalid combination leaves the engine's current configuration
    /// untouched and returns `Err` rather than silently discarding the
    /// request.
    pub fn set_communication_parameters(
        &mut self,
        slave_id: u8,
        baud_index: u8,
        parity_index: u8,
    ) -> Result<(), ConfigError> {
        let baud = BaudRate::from_index(baud_index)?;
        let parity = Parity::from_index(parity_index)?;
        let config = EngineConfig::new(slave_id, baud, parity)?;

        self.transport.apply_parameters(baud, parity)?;
        self.config = config;
        self.transport.arm_receive();
        Ok(())
    }

    /// Direct read access to the shared buffer, for tests and diagnostics.
    pub fn buffer(&self) -> &[u8; BUFFER_SIZE] {
        &self.buffer
    }

    /// Direct write access to the shared buffer, so a test or an ISR-side
    /// helper can stage a frame before calling `poll`.
    pub fn buffer_mut(&mut self) -> &mut [u8; BUFFER_SIZE] {
        &mut self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegisterType;

    #[derive(Default)]
    struct RecordingTransport {
        armed: u32,
        transmitted: Option<heapless::Vec<u8, 256>>,
    }

    impl Transport for RecordingTransport {
        fn arm_receive(&mut self) {
            self.armed += 1;
        }
        fn start_transmit(&mut self, frame: &[u8]) {
            let mut v = heapless::Vec::new();
            v.extend_from_slice(frame).unwrap();
            self.transmitted = Some(v);
        }
        fn apply_parameters(&mut self, _baud: BaudRate, _parity: Parity) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    struct FixedClock(u32);
    impl MonotonicClock for FixedClock {
        fn now_ms(&self) -> u32 {
            self.0
        }
    }

    fn engine<'a>() -> Engine<'a, RecordingTransport, crate::hooks::NoopHooks, FixedClock, 4> {
        let config = EngineConfig::new(0x11, BaudRate::B19200, Parity::None).unwrap();
        Engine::new(config, RecordingTransport::default(), crate::hooks::NoopHooks, FixedClock(0))
    }

    #[test]
    fn poll_with_nothing_posted_services_the_watchdog_only() {
        let mut engine = engine();
        engine.init();
        let state = engine.poll();
        assert_eq!(state, EngineState::Idle);
    }

    #[test]
    fn undersized_frame_is_discarded_and_receive_rearmed() {
        let mut engine = engine();
        engine.init();
        engine.buffer_mut()[..4].copy_from_slice(&[0x11, 0x03, 0, 0]);
        engine.mailbox().post(BUFFER_SIZE - 4);
        engine.poll();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn bad_crc_is_discarded() {
        let mut engine = engine();
        engine.init();
        let request = [0x11u8, 0x03, 0x00, 0x00, 0x00, 0x02, 0xFF, 0xFF];
        engine.buffer_mut()[..request.len()].copy_from_slice(&request);
        engine.mailbox().post(BUFFER_SIZE - request.len());
        engine.poll();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn wrong_slave_is_discarded() {
        let mut engine = engine();
        engine.init();
        let mut frame = [0x22u8, 0x03, 0x00, 0x00, 0x00, 0x02, 0, 0];
        let len = crate::frame::append_crc(&mut frame, 6);
        engine.buffer_mut()[..len].copy_from_slice(&frame);
        engine.mailbox().post(BUFFER_SIZE - len);
        engine.poll();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn addressed_request_transitions_through_transmitting() {
        let mut backing = [7u16; 2];
        let mut engine = engine();
        engine
            .add_address_space(AddressSpace::new(RegisterType::Holding, 0, &mut backing).unwrap())
            .unwrap();
        engine.init();

        let mut frame = [0x11u8, 0x03, 0x00, 0x00, 0x00, 0x02, 0, 0];
        let len = crate::frame::append_crc(&mut frame, 6);
        engine.buffer_mut()[..len].copy_from_slice(&frame);
        engine.mailbox().post(BUFFER_SIZE - len);

        engine.poll();
        assert_eq!(engine.state(), EngineState::Transmitting);
        let sent = engine.transport.transmitted.as_ref().unwrap();
        assert_eq!(&sent[..7], &[0x11, 0x03, 0x04, 0x00, 0x07, 0x00, 0x07]);
        assert!(crate::frame::verify_crc(sent, sent.len()));

        engine.on_tx_complete();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.transport.armed, 2);
    }

    #[test]
    fn set_communication_parameters_rejects_bad_slave_id_without_mutating_config() {
        let mut engine = engine();
        engine.init();
        let err = engine.set_communication_parameters(0, 1, 0).unwrap_err();
        assert_eq!(err, ConfigError::InvalidSlaveId(0));
        assert_eq!(engine.config.slave_id, 0x11);
    }
}
