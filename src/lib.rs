#![cfg_attr(not(test), no_std)]

//! A Modbus RTU slave protocol engine for serial links on microcontroller
//! targets: CRC framing, an address-space registry, the standard read/write
//! register functions, a request dispatcher, a receive-frame supervisor
//! driven from interrupt context, and a liveness watchdog.
//!
//! Nothing here owns a UART, a DMA channel, or a clock peripheral; those are
//! supplied by the host application through the [`Transport`],
//! [`MonotonicClock`] and [`Hooks`] traits. No allocation is used anywhere in
//! this crate.

pub mod clock;
pub mod config;
pub mod crc;
pub mod engine;
pub mod error;
pub mod frame;
pub mod handlers;
pub mod hooks;
pub mod processor;
pub mod registry;
pub mod response;
pub mod transport;
pub mod watchdog;

pub use clock::MonotonicClock;
pub use config::{BaudRate, EngineConfig, Parity, MAX_SLAVE_ID, MIN_SLAVE_ID};
pub use engine::{Engine, EngineState, FrameMailbox};
pub use error::{ConfigError, ExceptionCode, RegistryError};
pub use hooks::{Hooks, NoopHooks};
pub use registry::{AddressSpace, RegisterType, Registry};
pub use response::ResponseDescriptor;
pub use transport::Transport;

/// Crate version as `(major, minor, patch)`, in the same triple shape the
/// source firmware's version query returned — useful for a `custom_command`
/// hook that wants to answer a version-query function code the same way.
pub const VERSION: (u8, u8, u8) = (0, 1, 0);
