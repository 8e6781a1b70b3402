//! # SensorApp SAP
//!
//! Configuration of the demo sensor application firmware and decoding of its
//! periodic sensor-data and ack indications. Both indications reuse the
//! extended-trailer convention of the RadioLink SAP.

use crate::constants::*;
use crate::error::HciError;
use crate::hci::{HciConnection, HciMessage, HciTransport};
use crate::sap::payload::{PayloadReader, PayloadWriter};
use crate::sap::radiolink::RxInfo;
use crate::sap::DeviceResponse;

/// Sensor application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorAppConfig {
    pub mode: u8,
    pub options: u8,
    /// seconds between sensor transmissions
    pub sending_period: u32,
    /// seconds without reception before the link is reported lost
    pub link_timeout: u32,
}

/// Periodic measurement broadcast by a sensor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorData {
    pub format: u8,
    pub dest_group: u8,
    pub dest_address: u16,
    pub src_group: u8,
    pub src_address: u16,
    /// supply voltage in millivolts
    pub voltage: u16,
    pub adc_value: u16,
    pub temperature: u8,
    pub digital_inputs: u8,
    pub optional_info: Option<RxInfo>,
}

impl SensorData {
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        let format = r.u8()?;
        let mut data = SensorData {
            format,
            dest_group: r.u8()?,
            dest_address: r.u16()?,
            src_group: r.u8()?,
            src_address: r.u16()?,
            voltage: r.u16()?,
            adc_value: r.u16()?,
            temperature: r.u8()?,
            digital_inputs: r.u8()?,
            optional_info: None,
        };
        if format & SENSORAPP_FORMAT_EXTENDED != 0 {
            data.optional_info = Some(decode_rx_info(&mut r)?);
        }
        Ok(data)
    }
}

/// Ack returned by the sensor receiver, mirroring its digital inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorAck {
    pub format: u8,
    pub dest_group: u8,
    pub dest_address: u16,
    pub src_group: u8,
    pub src_address: u16,
    pub digital_inputs: u8,
    pub optional_info: Option<RxInfo>,
}

impl SensorAck {
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        let format = r.u8()?;
        let mut ack = SensorAck {
            format,
            dest_group: r.u8()?,
            dest_address: r.u16()?,
            src_group: r.u8()?,
            src_address: r.u16()?,
            digital_inputs: r.u8()?,
            optional_info: None,
        };
        if format & SENSORAPP_FORMAT_EXTENDED != 0 {
            ack.optional_info = Some(decode_rx_info(&mut r)?);
        }
        Ok(ack)
    }
}

fn decode_rx_info(r: &mut PayloadReader<'_>) -> Result<RxInfo, HciError> {
    Ok(RxInfo {
        rssi: r.i16()?,
        snr: r.i8()?,
        rx_time: r.u32()?,
    })
}

/// Write the sensor application configuration.
pub async fn set_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
    config: &SensorAppConfig,
) -> Result<DeviceResponse<()>, HciError> {
    let mut w = PayloadWriter::with_capacity(10);
    w.u8(config.mode)
        .u8(config.options)
        .u32(config.sending_period)
        .u32(config.link_timeout);
    let rsp = hci
        .request(
            SENSORAPP_SAP_ID,
            SENSORAPP_MSG_SET_CONFIG_REQ,
            SENSORAPP_MSG_SET_CONFIG_RSP,
            &w.into_vec(),
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Read the sensor application configuration.
pub async fn get_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<SensorAppConfig>, HciError> {
    let rsp = hci
        .request(
            SENSORAPP_SAP_ID,
            SENSORAPP_MSG_GET_CONFIG_REQ,
            SENSORAPP_MSG_GET_CONFIG_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let config = SensorAppConfig {
        mode: r.u8()?,
        options: r.u8()?,
        sending_period: r.u32()?,
        link_timeout: r.u32()?,
    };
    Ok(DeviceResponse::ok(status, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_data_plain() {
        let msg = HciMessage {
            sap_id: SENSORAPP_SAP_ID,
            msg_id: SENSORAPP_MSG_SEND_DATA_IND,
            payload: vec![
                0x00, 0x10, 0x00, 0x01, 0x20, 0x00, 0x02, 0x0C, 0xE4, // 3300 mV
                0x01, 0xFF, 0x19, 0x03,
            ],
        };
        let data = SensorData::from_msg(&msg).unwrap();
        assert_eq!(data.voltage, 3300);
        assert_eq!(data.adc_value, 0x01FF);
        assert_eq!(data.temperature, 0x19);
        assert_eq!(data.digital_inputs, 0x03);
        assert!(data.optional_info.is_none());
    }

    #[test]
    fn test_sensor_ack_extended() {
        let msg = HciMessage {
            sap_id: SENSORAPP_SAP_ID,
            msg_id: SENSORAPP_MSG_ACK_IND,
            payload: vec![
                0x01, 0x10, 0x00, 0x01, 0x20, 0x00, 0x02, 0x01, // header + inputs
                0xFF, 0x9C, 0x05, 0x00, 0x00, 0x10, 0x00, // rssi -100, snr 5, time
            ],
        };
        let ack = SensorAck::from_msg(&msg).unwrap();
        assert_eq!(ack.digital_inputs, 0x01);
        let info = ack.optional_info.unwrap();
        assert_eq!(info.rssi, -100);
        assert_eq!(info.snr, 5);
        assert_eq!(info.rx_time, 0x1000);
    }

    #[test]
    fn test_sensor_data_extended_missing_trailer() {
        let msg = HciMessage {
            sap_id: SENSORAPP_SAP_ID,
            msg_id: SENSORAPP_MSG_SEND_DATA_IND,
            payload: vec![
                0x01, 0x10, 0x00, 0x01, 0x20, 0x00, 0x02, 0x0C, 0xE4, 0x01, 0xFF, 0x19, 0x03,
            ],
        };
        assert!(SensorData::from_msg(&msg).is_err());
    }
}
