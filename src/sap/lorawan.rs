//! # LoRaWAN SAP
//!
//! End-node commands of the LoRaWAN modem firmware: ABP/OTAA activation,
//! uplink transmission and the downlink/join indications. Downlink
//! indications carry an optional radio-info trailer gated by bit 0 of the
//! leading format byte, like the RadioLink SAP but with LoRaWAN-specific
//! fields.

use crate::constants::*;
use crate::error::HciError;
use crate::hci::{HciConnection, HciMessage, HciTransport};
use crate::sap::payload::{PayloadReader, PayloadWriter};
use crate::sap::DeviceResponse;
use bitflags::bitflags;

bitflags! {
    /// Option bits of the LoRaWAN radio stack configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StackOptions: u8 {
        const ADR             = 0x01;
        const DUTY_CYCLE_CTRL = 0x02;
        const DEV_CLASS_C     = 0x04;
        const EXT_PKT_FORMAT  = 0x40;
        const MAC_CMD_IND     = 0x80;
    }
}

/// Radio stack configuration of the LoRaWAN modem firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioStackConfig {
    /// band-specific data rate index
    pub data_rate: u8,
    pub tx_power_level: u8,
    pub options: StackOptions,
    pub power_saving_mode: u8,
    /// retransmissions for confirmed uplinks
    pub retransmissions: u8,
    pub band_index: u8,
    /// reserved uplink header capacity for MAC commands; read-only,
    /// reported by the firmware and ignored on set
    pub mac_cmd_capacity: u8,
}

impl RadioStackConfig {
    /// Length of the set request (the capacity byte is not sent).
    const SET_LEN: usize = 6;

    fn encode(&self, w: &mut PayloadWriter) {
        w.u8(self.data_rate)
            .u8(self.tx_power_level)
            .u8(self.options.bits())
            .u8(self.power_saving_mode)
            .u8(self.retransmissions)
            .u8(self.band_index);
    }

    fn decode(r: &mut PayloadReader<'_>) -> Result<Self, HciError> {
        Ok(RadioStackConfig {
            data_rate: r.u8()?,
            tx_power_level: r.u8()?,
            options: StackOptions::from_bits_retain(r.u8()?),
            power_saving_mode: r.u8()?,
            retransmissions: r.u8()?,
            band_index: r.u8()?,
            mac_cmd_capacity: r.u8()?,
        })
    }
}

/// Radio parameters of a received downlink (extended-format trailer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LorawanRxInfo {
    pub channel_index: u8,
    pub data_rate: u8,
    pub rssi: i8,
    pub snr: i8,
    /// 1 or 2 for the class-A receive windows
    pub rx_slot: u8,
}

impl LorawanRxInfo {
    const LEN: usize = 5;

    fn decode(r: &mut PayloadReader<'_>) -> Result<Self, HciError> {
        Ok(LorawanRxInfo {
            channel_index: r.u8()?,
            data_rate: r.u8()?,
            rssi: r.i8()?,
            snr: r.i8()?,
            rx_slot: r.u8()?,
        })
    }
}

/// A received downlink message (U-data or C-data indication).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LorawanRxData {
    pub format: u8,
    pub port: u8,
    pub data: Vec<u8>,
    pub optional_info: Option<LorawanRxInfo>,
}

impl LorawanRxData {
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        let format = r.u8()?;
        let port = r.u8()?;
        let extended = format & LORAWAN_FORMAT_EXTENDED != 0;
        let (data, optional_info) = if extended {
            let data_len = r.remaining().checked_sub(LorawanRxInfo::LEN).ok_or(
                HciError::ResponseTooShort {
                    needed: 2 + LorawanRxInfo::LEN,
                    actual: msg.payload.len(),
                },
            )?;
            let data = r.bytes(data_len)?.to_vec();
            (data, Some(LorawanRxInfo::decode(&mut r)?))
        } else {
            (r.rest().to_vec(), None)
        };
        Ok(LorawanRxData {
            format,
            port,
            data,
            optional_info,
        })
    }
}

/// Network-ack indication for a confirmed uplink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LorawanAck {
    pub format: u8,
    pub optional_info: Option<LorawanRxInfo>,
}

impl LorawanAck {
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        let format = r.u8()?;
        let optional_info = if format & LORAWAN_FORMAT_EXTENDED != 0 {
            Some(LorawanRxInfo::decode(&mut r)?)
        } else {
            None
        };
        Ok(LorawanAck {
            format,
            optional_info,
        })
    }
}

/// Join-accept indication carrying the assigned device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedNetwork {
    pub status: u8,
    pub device_address: Option<u32>,
}

impl JoinedNetwork {
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        let status = r.u8()?;
        let device_address = if r.remaining() >= 4 { Some(r.u32()?) } else { None };
        Ok(JoinedNetwork {
            status,
            device_address,
        })
    }
}

/// Network state reported by the get-network-status command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStatus {
    /// 0 = inactive, 1 = active (ABP), 2 = active (OTAA), 3 = joining
    pub state: u8,
    pub device_address: Option<u32>,
}

/// ABP session parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbpParameter {
    pub device_address: u32,
    pub network_session_key: [u8; LORAWAN_KEY_LEN],
    pub app_session_key: [u8; LORAWAN_KEY_LEN],
}

/// OTAA join parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinParameter {
    pub app_eui: [u8; LORAWAN_EUI_LEN],
    pub app_key: [u8; LORAWAN_KEY_LEN],
}

/// Activate the device with preshared ABP session parameters.
pub async fn activate_device<T: HciTransport>(
    hci: &mut HciConnection<T>,
    params: &AbpParameter,
) -> Result<DeviceResponse<()>, HciError> {
    let mut w = PayloadWriter::with_capacity(4 + 2 * LORAWAN_KEY_LEN);
    w.u32(params.device_address)
        .bytes(&params.network_session_key)
        .bytes(&params.app_session_key);
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_ACTIVATE_DEVICE_REQ,
            LORAWAN_MSG_ACTIVATE_DEVICE_RSP,
            &w.into_vec(),
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Reactivate a previously activated device; returns the stored address.
pub async fn reactivate_device<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<u32>, HciError> {
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_REACTIVATE_DEVICE_REQ,
            LORAWAN_MSG_REACTIVATE_DEVICE_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != LORAWAN_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let address = r.u32()?;
    Ok(DeviceResponse::ok(status, address))
}

/// Store the OTAA join parameters (AppEUI and AppKey).
pub async fn set_join_parameter<T: HciTransport>(
    hci: &mut HciConnection<T>,
    params: &JoinParameter,
) -> Result<DeviceResponse<()>, HciError> {
    let mut w = PayloadWriter::with_capacity(LORAWAN_EUI_LEN + LORAWAN_KEY_LEN);
    w.bytes(&params.app_eui).bytes(&params.app_key);
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_SET_JOIN_PARAM_REQ,
            LORAWAN_MSG_SET_JOIN_PARAM_RSP,
            &w.into_vec(),
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Write the radio stack configuration (data rate, options, band).
///
/// The firmware answers with a wrong-parameter status if a field is out
/// of range for the configured band; the stored configuration is then
/// left unchanged.
pub async fn set_radio_stack_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
    config: &RadioStackConfig,
) -> Result<DeviceResponse<()>, HciError> {
    let mut w = PayloadWriter::with_capacity(RadioStackConfig::SET_LEN);
    config.encode(&mut w);
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_SET_RSTACK_CONFIG_REQ,
            LORAWAN_MSG_SET_RSTACK_CONFIG_RSP,
            &w.into_vec(),
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Read back the radio stack configuration.
pub async fn get_radio_stack_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<RadioStackConfig>, HciError> {
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_GET_RSTACK_CONFIG_REQ,
            LORAWAN_MSG_GET_RSTACK_CONFIG_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != LORAWAN_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    Ok(DeviceResponse::ok(status, RadioStackConfig::decode(&mut r)?))
}

/// Start an OTAA join; progress arrives via the join indications.
pub async fn join_network<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(LORAWAN_SAP_ID, LORAWAN_MSG_JOIN_NETWORK_REQ, LORAWAN_MSG_JOIN_NETWORK_RSP, &[])
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

fn encode_uplink(port: u8, data: &[u8]) -> Result<Vec<u8>, HciError> {
    if data.len() > HCI_MAX_TX_PAYLOAD - 1 {
        return Err(HciError::PayloadTooLarge {
            len: data.len(),
            max: HCI_MAX_TX_PAYLOAD - 1,
        });
    }
    let mut w = PayloadWriter::with_capacity(1 + data.len());
    w.u8(port).bytes(data);
    Ok(w.into_vec())
}

/// Send an unconfirmed uplink.
pub async fn send_udata<T: HciTransport>(
    hci: &mut HciConnection<T>,
    port: u8,
    data: &[u8],
) -> Result<DeviceResponse<()>, HciError> {
    let payload = encode_uplink(port, data)?;
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_SEND_UDATA_REQ,
            LORAWAN_MSG_SEND_UDATA_RSP,
            &payload,
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Send a confirmed uplink; the network ack arrives as an indication.
pub async fn send_cdata<T: HciTransport>(
    hci: &mut HciConnection<T>,
    port: u8,
    data: &[u8],
) -> Result<DeviceResponse<()>, HciError> {
    let payload = encode_uplink(port, data)?;
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_SEND_CDATA_REQ,
            LORAWAN_MSG_SEND_CDATA_RSP,
            &payload,
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Query the activation state of the device.
pub async fn get_network_status<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<NetworkStatus>, HciError> {
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_GET_NWK_STATUS_REQ,
            LORAWAN_MSG_GET_NWK_STATUS_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != LORAWAN_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let state = r.u8()?;
    let device_address = if r.remaining() >= 4 { Some(r.u32()?) } else { None };
    Ok(DeviceResponse::ok(
        status,
        NetworkStatus {
            state,
            device_address,
        },
    ))
}

/// Deactivate the device; uplinks are rejected until reactivation.
pub async fn deactivate_device<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_DEACTIVATE_DEVICE_REQ,
            LORAWAN_MSG_DEACTIVATE_DEVICE_RSP,
            &[],
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Erase all LoRaWAN parameters and restore factory defaults.
pub async fn factory_reset<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_FACTORY_RESET_REQ,
            LORAWAN_MSG_FACTORY_RESET_RSP,
            &[],
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Overwrite the device EUI.
pub async fn set_device_eui<T: HciTransport>(
    hci: &mut HciConnection<T>,
    eui: &[u8; LORAWAN_EUI_LEN],
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_SET_DEVICE_EUI_REQ,
            LORAWAN_MSG_SET_DEVICE_EUI_RSP,
            eui,
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Read back the device EUI.
pub async fn get_device_eui<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<[u8; LORAWAN_EUI_LEN]>, HciError> {
    let rsp = hci
        .request(
            LORAWAN_SAP_ID,
            LORAWAN_MSG_GET_DEVICE_EUI_REQ,
            LORAWAN_MSG_GET_DEVICE_EUI_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != LORAWAN_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let eui = r.array::<LORAWAN_EUI_LEN>()?;
    Ok(DeviceResponse::ok(status, eui))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ind(msg_id: u8, payload: Vec<u8>) -> HciMessage {
        HciMessage {
            sap_id: LORAWAN_SAP_ID,
            msg_id,
            payload,
        }
    }

    #[test]
    fn test_rx_data_extended() {
        let payload = vec![
            0x01, 0x0A, // format, port 10
            0xCA, 0xFE, // data
            0x02, 0x05, 0xA0, 0x07, 0x01, // trailer, rssi byte 0xA0 = -96
        ];
        let rx = LorawanRxData::from_msg(&ind(LORAWAN_MSG_RECV_UDATA_IND, payload)).unwrap();
        assert_eq!(rx.port, 10);
        assert_eq!(rx.data, vec![0xCA, 0xFE]);
        let info = rx.optional_info.unwrap();
        assert_eq!(info.channel_index, 2);
        assert_eq!(info.data_rate, 5);
        assert_eq!(info.rssi, -96);
        assert_eq!(info.rx_slot, 1);
    }

    #[test]
    fn test_rx_data_plain() {
        let rx = LorawanRxData::from_msg(&ind(
            LORAWAN_MSG_RECV_CDATA_IND,
            vec![0x00, 0x01, 0x11, 0x22, 0x33],
        ))
        .unwrap();
        assert_eq!(rx.port, 1);
        assert_eq!(rx.data, vec![0x11, 0x22, 0x33]);
        assert!(rx.optional_info.is_none());
    }

    #[test]
    fn test_joined_network_decode() {
        let joined = JoinedNetwork::from_msg(&ind(
            LORAWAN_MSG_JOIN_NETWORK_IND,
            vec![0x00, 0x01, 0x02, 0x03, 0x04],
        ))
        .unwrap();
        assert_eq!(joined.status, 0x00);
        assert_eq!(joined.device_address, Some(0x0102_0304));

        let failed = JoinedNetwork::from_msg(&ind(LORAWAN_MSG_JOIN_NETWORK_IND, vec![0x01])).unwrap();
        assert!(failed.device_address.is_none());
    }

    #[test]
    fn test_radio_stack_config_encode_layout() {
        let config = RadioStackConfig {
            data_rate: 3,
            tx_power_level: 14,
            options: StackOptions::ADR | StackOptions::DEV_CLASS_C,
            power_saving_mode: 0,
            retransmissions: 7,
            band_index: 1,
            mac_cmd_capacity: 0,
        };
        let mut w = PayloadWriter::new();
        config.encode(&mut w);
        assert_eq!(w.into_vec(), vec![3, 14, 0x05, 0, 7, 1]);
    }

    #[test]
    fn test_radio_stack_config_decode() {
        let payload = [3, 14, 0x41, 0, 7, 1, 15];
        let mut r = PayloadReader::new(&payload);
        let config = RadioStackConfig::decode(&mut r).unwrap();
        assert_eq!(config.data_rate, 3);
        assert!(config.options.contains(StackOptions::ADR));
        assert!(config.options.contains(StackOptions::EXT_PKT_FORMAT));
        assert_eq!(config.retransmissions, 7);
        assert_eq!(config.mac_cmd_capacity, 15);
    }

    #[test]
    fn test_uplink_size_limit() {
        let oversized = vec![0u8; HCI_MAX_TX_PAYLOAD];
        assert!(matches!(
            encode_uplink(1, &oversized),
            Err(HciError::PayloadTooLarge { .. })
        ));
    }
}
