//! # RadioLink SAP
//!
//! Peer-to-peer radio messaging of the LR-Base firmwares: unreliable and
//! confirmed transmission plus the receive/transmit indications. Received
//! messages may carry an extended trailer (RSSI, SNR, RX timestamp) gated
//! by bit 0 of the leading format byte.

use crate::constants::*;
use crate::error::HciError;
use crate::hci::{HciConnection, HciMessage, HciTransport};
use crate::sap::payload::{PayloadReader, PayloadWriter};
use crate::sap::DeviceResponse;

/// Reception quality trailer appended to extended-format radio messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxInfo {
    pub rssi: i16,
    pub snr: i8,
    /// RTC timestamp of reception (vendor 32-bit encoding)
    pub rx_time: u32,
}

/// A received peer-to-peer radio message (U-data, C-data or remote ack).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioLinkMsg {
    pub format: u8,
    pub dest_group: u8,
    pub dest_address: u16,
    pub src_group: u8,
    pub src_address: u16,
    pub data: Vec<u8>,
    /// Present when the format byte has the extended bit set.
    pub optional_info: Option<RxInfo>,
}

impl RadioLinkMsg {
    const HEADER_LEN: usize = 7;
    const TRAILER_LEN: usize = 7;

    /// Decodes a U-data, C-data or ack RX indication payload.
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        let format = r.u8()?;
        let dest_group = r.u8()?;
        let dest_address = r.u16()?;
        let src_group = r.u8()?;
        let src_address = r.u16()?;

        let extended = format & RADIOLINK_FORMAT_EXTENDED != 0;
        let (data, optional_info) = if extended {
            let data_len = r
                .remaining()
                .checked_sub(Self::TRAILER_LEN)
                .ok_or(HciError::ResponseTooShort {
                    needed: Self::HEADER_LEN + Self::TRAILER_LEN,
                    actual: msg.payload.len(),
                })?;
            let data = r.bytes(data_len)?.to_vec();
            let info = RxInfo {
                rssi: r.i16()?,
                snr: r.i8()?,
                rx_time: r.u32()?,
            };
            (data, Some(info))
        } else {
            (r.rest().to_vec(), None)
        };

        Ok(RadioLinkMsg {
            format,
            dest_group,
            dest_address,
            src_group,
            src_address,
            data,
            optional_info,
        })
    }
}

/// Transmit confirmation carried by the U-data/C-data/ack TX indications.
///
/// Older firmwares send the bare status byte; the event counter and airtime
/// are decoded when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxIndication {
    pub status: u8,
    pub tx_event_counter: Option<u16>,
    /// RF message airtime in milliseconds
    pub airtime: Option<u32>,
}

impl TxIndication {
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        let status = r.u8()?;
        let tx_event_counter = if r.remaining() >= 2 { Some(r.u16()?) } else { None };
        let airtime = if r.remaining() >= 4 { Some(r.u32()?) } else { None };
        Ok(TxIndication {
            status,
            tx_event_counter,
            airtime,
        })
    }
}

fn encode_radio_msg(dest_group: u8, dest_address: u16, data: &[u8]) -> Result<Vec<u8>, HciError> {
    if data.len() > RADIOLINK_MAX_PAYLOAD {
        return Err(HciError::PayloadTooLarge {
            len: data.len(),
            max: RADIOLINK_MAX_PAYLOAD,
        });
    }
    let mut w = PayloadWriter::with_capacity(3 + data.len());
    w.u8(dest_group).u16(dest_address).bytes(data);
    Ok(w.into_vec())
}

/// Send an unreliable (unacknowledged) radio message.
pub async fn send_udata<T: HciTransport>(
    hci: &mut HciConnection<T>,
    dest_group: u8,
    dest_address: u16,
    data: &[u8],
) -> Result<DeviceResponse<()>, HciError> {
    let payload = encode_radio_msg(dest_group, dest_address, data)?;
    let rsp = hci
        .request(
            RADIOLINK_SAP_ID,
            RADIOLINK_MSG_SEND_UDATA_REQ,
            RADIOLINK_MSG_SEND_UDATA_RSP,
            &payload,
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Send a confirmed radio message; the peer answers with a radio ack.
pub async fn send_cdata<T: HciTransport>(
    hci: &mut HciConnection<T>,
    dest_group: u8,
    dest_address: u16,
    data: &[u8],
) -> Result<DeviceResponse<()>, HciError> {
    let payload = encode_radio_msg(dest_group, dest_address, data)?;
    let rsp = hci
        .request(
            RADIOLINK_SAP_ID,
            RADIOLINK_MSG_SEND_CDATA_REQ,
            RADIOLINK_MSG_SEND_CDATA_RSP,
            &payload,
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Preload the payload piggybacked onto the next outgoing radio ack.
pub async fn set_ack_data<T: HciTransport>(
    hci: &mut HciConnection<T>,
    data: &[u8],
) -> Result<DeviceResponse<()>, HciError> {
    if data.len() > RADIOLINK_MAX_ACK_PAYLOAD {
        return Err(HciError::PayloadTooLarge {
            len: data.len(),
            max: RADIOLINK_MAX_ACK_PAYLOAD,
        });
    }
    let rsp = hci
        .request(
            RADIOLINK_SAP_ID,
            RADIOLINK_MSG_SET_ACK_DATA_REQ,
            RADIOLINK_MSG_SET_ACK_DATA_RSP,
            data,
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}
