//! Service access points: the per-domain marshaling layers on top of the
//! HCI engine.
//!
//! Every command follows the same shape: pack typed parameters into a
//! payload ([`payload::PayloadWriter`]), run one exchange through the
//! correlator, read the status byte at the fixed response offset and, if the
//! device accepted the command, unpack the typed result at fixed offsets
//! ([`payload::PayloadReader`]).

pub mod devmgmt;
pub mod generic;
pub mod lorawan;
pub mod payload;
pub mod radiolink;
pub mod remotectrl;
pub mod rlt;
pub mod sensorapp;

/// Remote outcome of one command: the device's status byte paired with the
/// decoded result, if any.
///
/// A non-zero status is not a local error; it means the exchange worked and
/// the device rejected or qualified the command. `value` is populated only
/// when the response carried a decodable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResponse<T> {
    /// Raw status byte from the response payload (0x00 = ok in every SAP).
    pub status: u8,
    /// Decoded command result, when present.
    pub value: Option<T>,
}

impl<T> DeviceResponse<T> {
    /// Accepted response carrying a decoded value.
    pub fn ok(status: u8, value: T) -> Self {
        DeviceResponse {
            status,
            value: Some(value),
        }
    }

    /// Response without a decodable result (rejection, or a command that
    /// returns nothing beyond its status).
    pub fn status_only(status: u8) -> Self {
        DeviceResponse {
            status,
            value: None,
        }
    }

    /// True when the device accepted the command.
    pub fn is_ok(&self) -> bool {
        self.status == 0x00
    }

    /// Map the decoded value, keeping the status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DeviceResponse<U> {
        DeviceResponse {
            status: self.status,
            value: self.value.map(f),
        }
    }
}
