//! # Radio Link Test SAP
//!
//! Start/stop the firmware's built-in link test and decode the periodic
//! status indication with local and peer packet counters.

use crate::constants::*;
use crate::error::HciError;
use crate::hci::{HciConnection, HciMessage, HciTransport};
use crate::sap::payload::{PayloadReader, PayloadWriter};
use crate::sap::DeviceResponse;

/// Link test parameters sent with the start command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RltParameter {
    pub dest_group: u8,
    pub dest_address: u16,
    pub packet_size: u8,
    pub num_packets: u16,
    /// 0 = single shot, 1 = repeated
    pub test_mode: u8,
}

/// Periodic link test status indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RltStatus {
    pub test_status: u8,
    pub local_tx: u16,
    pub local_rx: u16,
    pub peer_tx: u16,
    pub peer_rx: u16,
    pub local_rssi: u16,
    pub peer_rssi: u16,
    pub local_snr: u8,
    pub peer_snr: u8,
}

impl RltStatus {
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        Ok(RltStatus {
            test_status: r.u8()?,
            local_tx: r.u16()?,
            local_rx: r.u16()?,
            peer_tx: r.u16()?,
            peer_rx: r.u16()?,
            local_rssi: r.u16()?,
            peer_rssi: r.u16()?,
            local_snr: r.u8()?,
            peer_snr: r.u8()?,
        })
    }
}

/// Start a radio link test towards a peer module.
pub async fn start<T: HciTransport>(
    hci: &mut HciConnection<T>,
    params: &RltParameter,
) -> Result<DeviceResponse<()>, HciError> {
    let mut w = PayloadWriter::with_capacity(7);
    w.u8(params.dest_group)
        .u16(params.dest_address)
        .u8(params.packet_size)
        .u16(params.num_packets)
        .u8(params.test_mode);
    let rsp = hci
        .request(
            RLT_SAP_ID,
            RLT_MSG_START_REQ,
            RLT_MSG_START_RSP,
            &w.into_vec(),
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Stop a running radio link test.
pub async fn stop<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(RLT_SAP_ID, RLT_MSG_STOP_REQ, RLT_MSG_STOP_RSP, &[])
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_decode() {
        let msg = HciMessage {
            sap_id: RLT_SAP_ID,
            msg_id: RLT_MSG_STATUS_IND,
            payload: vec![
                0x01, // running
                0x00, 0x64, // local tx = 100
                0x00, 0x63, // local rx = 99
                0x00, 0x64, // peer tx
                0x00, 0x62, // peer rx
                0x00, 0x50, // local rssi
                0x00, 0x4E, // peer rssi
                0x07, 0x06, // snr
            ],
        };
        let status = RltStatus::from_msg(&msg).unwrap();
        assert_eq!(status.test_status, 1);
        assert_eq!(status.local_tx, 100);
        assert_eq!(status.peer_rx, 98);
        assert_eq!(status.peer_snr, 6);
    }

    #[test]
    fn test_status_too_short() {
        let msg = HciMessage {
            sap_id: RLT_SAP_ID,
            msg_id: RLT_MSG_STATUS_IND,
            payload: vec![0x01, 0x00],
        };
        assert!(RltStatus::from_msg(&msg).is_err());
    }
}
