//! End-to-end scenarios driving the engine the same way a real UART/DMA
//! pair would: stage bytes into the buffer, post a mailbox entry, poll.

use modbus_rtu_slave::config::{BaudRate, EngineConfig, Parity};
use modbus_rtu_slave::engine::{Engine, EngineState};
use modbus_rtu_slave::frame::{append_crc, BUFFER_SIZE};
use modbus_rtu_slave::hooks::NoopHooks;
use modbus_rtu_slave::registry::{AddressSpace, RegisterType};
use modbus_rtu_slave::clock::MonotonicClock;
use modbus_rtu_slave::transport::Transport;

struct StubTransport {
    armed: u32,
    last_tx: Option<heapless::Vec<u8, 256>>,
}

impl StubTransport {
    fn new() -> Self {
        Self {
            armed: 0,
            last_tx: None,
        }
    }
}

impl Transport for StubTransport {
    fn arm_receive(&mut self) {
        self.armed += 1;
    }
    fn start_transmit(&mut self, frame: &[u8]) {
        let mut v = heapless::Vec::new();
        v.extend_from_slice(frame).unwrap();
        self.last_tx = Some(v);
    }
    fn apply_parameters(
        &mut self,
        _baud: BaudRate,
        _parity: Parity,
    ) -> Result<(), modbus_rtu_slave::error::ConfigError> {
        Ok(())
    }
}

struct ZeroClock;
impl MonotonicClock for ZeroClock {
    fn now_ms(&self) -> u32 {
        0
    }
}

fn new_engine() -> Engine<'static, StubTransport, NoopHooks, ZeroClock, 4> {
    let config = EngineConfig::new(0x11, BaudRate::B19200, Parity::None).unwrap();
    Engine::new(config, StubTransport::new(), NoopHooks, ZeroClock)
}

fn post_request(engine: &mut Engine<'static, StubTransport, NoopHooks, ZeroClock, 4>, request: &[u8]) {
    engine.buffer_mut()[..request.len()].copy_from_slice(request);
    engine.mailbox().post(BUFFER_SIZE - request.len());
}

#[test]
fn read_holding_registers_hit_returns_the_expected_frame() {
    let mut backing = Box::leak(Box::new([0x0001u16, 0x0002, 0x0003]));
    let mut engine = new_engine();
    engine
        .add_address_space(AddressSpace::new(RegisterType::Holding, 0, backing).unwrap())
        .unwrap();
    engine.init();

    let mut request = [0x11u8, 0x03, 0x00, 0x00, 0x00, 0x02, 0, 0];
    let len = append_crc(&mut request, 6);
    post_request(&mut engine, &request[..len]);

    engine.poll();
    assert_eq!(engine.state(), EngineState::Transmitting);
    let buffer = engine.buffer();
    assert_eq!(&buffer[..9], &[0x11, 0x03, 0x04, 0x00, 0x01, 0x00, 0x02, 0x7B, 0x33]);
}

#[test]
fn read_holding_registers_out_of_range_returns_illegal_address_exception() {
    let mut backing = Box::leak(Box::new([0u16; 10]));
    let mut engine = new_engine();
    engine
        .add_address_space(AddressSpace::new(RegisterType::Holding, 0, backing).unwrap())
        .unwrap();
    engine.init();

    let mut request = [0x11u8, 0x03, 0x00, 0x64, 0x00, 0x01, 0, 0];
    let len = append_crc(&mut request, 6);
    post_request(&mut engine, &request[..len]);

    engine.poll();
    let buffer = engine.buffer();
    assert_eq!(buffer[1], 0x83);
    assert_eq!(buffer[2], 0x02);
}

#[test]
fn write_single_register_rejected_by_restrictions_hook() {
    struct RejectAll;
    impl modbus_rtu_slave::hooks::Hooks for RejectAll {
        fn check_restrictions(&mut self, _address: u16, _value: u16) -> bool {
            true
        }
    }

    let mut backing = Box::leak(Box::new([0u16; 10]));
    let config = EngineConfig::new(0x11, BaudRate::B19200, Parity::None).unwrap();
    let mut engine: Engine<'static, StubTransport, RejectAll, ZeroClock, 4> =
        Engine::new(config, StubTransport::new(), RejectAll, ZeroClock);
    engine
        .add_address_space(AddressSpace::new(RegisterType::Holding, 0, backing).unwrap())
        .unwrap();
    engine.init();

    let mut request = [0x11u8, 0x06, 0x00, 0x05, 0xFF, 0xFF, 0, 0];
    let len = append_crc(&mut request, 6);
    engine.buffer_mut()[..len].copy_from_slice(&request[..len]);
    engine.mailbox().post(BUFFER_SIZE - len);

    engine.poll();
    let buffer = engine.buffer();
    assert_eq!(buffer[1], 0x86);
    assert_eq!(buffer[2], 0x03);
}

#[test]
fn write_multiple_registers_commits_all_or_nothing() {
    let mut backing = Box::leak(Box::new([0u16; 4]));
    let mut engine = new_engine();
    engine
        .add_address_space(AddressSpace::new(RegisterType::Holding, 0, backing).unwrap())
        .unwrap();
    engine.init();

    let mut request = [
        0x11u8, 0x10, 0x00, 0x00, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x00, 0x0B, 0, 0,
    ];
    let len = append_crc(&mut request, 11);
    post_request(&mut engine, &request[..len]);

    engine.poll();
    let buffer = engine.buffer();
    assert_eq!(&buffer[..6], &[0x11, 0x10, 0x00, 0x00, 0x00, 0x02]);
}

#[test]
fn bad_crc_is_silently_discarded() {
    let mut engine = new_engine();
    engine.init();

    let request = [0x11u8, 0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00];
    post_request(&mut engine, &request);

    engine.poll();
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn wrong_slave_id_is_discarded_but_broadcast_read_quirk_replies() {
    let mut backing = Box::leak(Box::new([0u16; 4]));
    let mut engine = new_engine();
    engine
        .add_address_space(AddressSpace::new(RegisterType::Holding, 0, backing).unwrap())
        .unwrap();
    engine.init();

    let mut wrong_slave = [0x22u8, 0x03, 0x00, 0x00, 0x00, 0x02, 0, 0];
    let len = append_crc(&mut wrong_slave, 6);
    post_request(&mut engine, &wrong_slave[..len]);
    engine.poll();
    assert_eq!(engine.state(), EngineState::Idle);

    let mut broadcast_quirk = [0x00u8, 0x03, 0x00, 0x00, 0x00, 0x04, 0, 0];
    let len = append_crc(&mut broadcast_quirk, 6);
    post_request(&mut engine, &broadcast_quirk[..len]);
    engine.poll();
    assert_eq!(engine.state(), EngineState::Transmitting);
}

#[test]
fn unknown_function_code_gets_illegal_function_exception() {
    let mut engine = new_engine();
    engine.init();

    let mut request = [0x11u8, 0x2B, 0, 0];
    let len = append_crc(&mut request, 2);
    post_request(&mut engine, &request[..len]);

    engine.poll();
    let buffer = engine.buffer();
    assert_eq!(buffer[0], 0x11);
    assert_eq!(buffer[1], 0xAB);
    assert_eq!(buffer[2], 0x01);
}
