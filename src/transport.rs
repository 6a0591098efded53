//! Contract for the external serial peripheral driver.
//!
//! This models the UART+DMA driver the engine does not own: baud/parity
//! configuration, DMA-backed reception into the engine's buffer, and
//! DMA-backed transmission. The engine never touches these details itself —
//! it only calls through this trait, the same arm's-length relationship the
//! source firmware had with `HAL_UART_*`.

use crate::config::{BaudRate, Parity};
use crate::error::ConfigError;

pub trait Transport {
    /// Re-arms reception: start a new DMA receive of up to `BUFFER_SIZE`
    /// bytes into the engine's buffer.
    fn arm_receive(&mut self);

    /// Starts an asynchronous DMA transmit of `frame`. Returns immediately;
    /// completion is reported later through `Engine::on_tx_complete`.
    fn start_transmit(&mut self, frame: &[u8]);

    /// Reconfigures the UART for `baud`/`parity`, aborting any transfer in
    /// progress. Re-arming reception afterwards is the caller's
    /// responsibility (the engine does so as part of
    /// `set_communication_parameters`).
    fn apply_parameters(&mut self, baud: BaudRate, parity: Parity) -> Result<(), ConfigError>;
}
