//! # WiMOD HCI Error Handling
//!
//! This module defines the HciError enum, which represents the different
//! local (host-side) error types that can occur in the wimod-hci crate.
//!
//! Local errors are strictly separated from the remote status byte a WiMOD
//! module places into every response payload: a rejected command is *not* an
//! `HciError`, it is a successful exchange carrying a non-zero status (see
//! [`crate::sap::DeviceResponse`]).

use std::time::Duration;
use thiserror::Error;

/// Represents the different local error types that can occur in the crate.
#[derive(Debug, Error)]
pub enum HciError {
    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// Indicates that a request payload exceeds the module's tx buffer.
    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// Indicates that no matching response arrived within the wait budget.
    #[error("No response from module within {0:?}")]
    NoResponse(Duration),

    /// Indicates a response payload shorter than the decoded layout requires.
    #[error("Response payload too short: need {needed} bytes, got {actual}")]
    ResponseTooShort { needed: usize, actual: usize },

    /// Indicates an invalid hexadecimal string was provided.
    #[error("Invalid hexadecimal string")]
    InvalidHexString,
}

/// Coarse local outcome of one command exchange, for callers that only need
/// the category (status displays, retry policies) rather than the full
/// [`HciError`] detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HciResult {
    /// Request sent and a correctly framed response arrived in time.
    Ok,
    /// Request payload exceeds the tx buffer; nothing was sent.
    PayloadTooLarge,
    /// The serial transport failed while sending or receiving.
    TransmitError,
    /// A response arrived but its payload could not be decoded.
    FramingError,
    /// The wait budget elapsed without a matching response.
    NoResponse,
}

impl HciError {
    /// Maps a local error onto the coarse [`HciResult`] taxonomy.
    pub fn local_result(&self) -> HciResult {
        match self {
            HciError::SerialPortError(_) => HciResult::TransmitError,
            HciError::PayloadTooLarge { .. } => HciResult::PayloadTooLarge,
            HciError::NoResponse(_) => HciResult::NoResponse,
            HciError::ResponseTooShort { .. } => HciResult::FramingError,
            HciError::InvalidHexString => HciResult::FramingError,
        }
    }
}
