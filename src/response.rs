//! Transient per-request response descriptor.

use crate::error::ExceptionCode;

/// Outcome of a function handler, before it has been turned into wire bytes.
///
/// `send_reply_override` lets a handler force the broadcast/addressed
/// default (e.g. the 0x03 `start=0, count=4` quirk, or a
/// custom function hook that always wants to answer).
#[derive(Debug, Clone, Copy)]
pub struct ResponseDescriptor {
    pub exception: Option<ExceptionCode>,
    pub payload_size: u8,
    pub send_reply_override: Option<bool>,
}

impl ResponseDescriptor {
    pub fn ok(payload_size: u8) -> Self {
        Self {
            exception: None,
            payload_size,
            send_reply_override: None,
        }
    }

    pub fn exception(code: ExceptionCode) -> Self {
        Self {
            exception: Some(code),
            payload_size: 0,
            send_reply_override: None,
        }
    }
}
