//! # Generic command pass-through
//!
//! Escape hatch for firmware commands this crate has no typed wrapper for:
//! the caller supplies the SAP and message identifiers plus a raw payload and
//! gets the raw status and command data back.

use crate::constants::HCI_RSP_CMD_PAYLOAD_POS;
use crate::error::HciError;
use crate::hci::{HciConnection, HciTransport};

/// Raw status byte and command data of a pass-through response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericResponse {
    pub status: u8,
    pub data: Vec<u8>,
}

/// Execute an arbitrary command and return the undecoded response.
pub async fn execute<T: HciTransport>(
    hci: &mut HciConnection<T>,
    sap_id: u8,
    req_id: u8,
    rsp_id: u8,
    payload: &[u8],
) -> Result<GenericResponse, HciError> {
    let rsp = hci.request(sap_id, req_id, rsp_id, payload).await?;
    let status = rsp.status()?;
    let data = rsp
        .payload
        .get(HCI_RSP_CMD_PAYLOAD_POS..)
        .unwrap_or(&[])
        .to_vec();
    Ok(GenericResponse { status, data })
}
