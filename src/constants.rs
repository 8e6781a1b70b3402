//! WiMOD HCI Protocol Constants
//!
//! This module defines the constants used by the WiMOD HCI protocol
//! implementation: SLIP framing bytes, SAP identifiers, message identifiers
//! and the per-SAP status codes, aligned with the IMST HCI specifications
//! (LR-Base, LR-Base-Plus and LoRaWAN EndNode Modem).

// ----------------------------------------------------------------------------
// SLIP framing (RFC 1055 byte values, as used by the WiMOD UART transport)
// ----------------------------------------------------------------------------

/// Frame delimiter
pub const SLIP_END: u8 = 0xC0;

/// Escape byte
pub const SLIP_ESC: u8 = 0xDB;

/// Escaped substitute for a literal END inside a frame
pub const SLIP_ESC_END: u8 = 0xDC;

/// Escaped substitute for a literal ESC inside a frame
pub const SLIP_ESC_ESC: u8 = 0xDD;

// ----------------------------------------------------------------------------
// HCI message layout
// ----------------------------------------------------------------------------

/// Offset of the status byte within a response payload
pub const HCI_RSP_STATUS_POS: usize = 0;

/// Offset of the command-specific data within a response payload
pub const HCI_RSP_CMD_PAYLOAD_POS: usize = 1;

/// Maximum payload size of an outgoing HCI request
pub const HCI_MAX_TX_PAYLOAD: usize = 100;

/// Upper bound for an unstuffed inbound frame; larger candidates are garbage
pub const HCI_MAX_RX_FRAME: usize = 512;

/// Serial baudrate used by all WiMOD firmwares
pub const WIMOD_SERIAL_BAUDRATE: u32 = 115_200;

// ----------------------------------------------------------------------------
// Device management SAP (all firmwares)
// ----------------------------------------------------------------------------

pub const DEVMGMT_SAP_ID: u8 = 0x01;

pub const DEVMGMT_MSG_PING_REQ: u8 = 0x01;
pub const DEVMGMT_MSG_PING_RSP: u8 = 0x02;
pub const DEVMGMT_MSG_GET_DEVICE_INFO_REQ: u8 = 0x03;
pub const DEVMGMT_MSG_GET_DEVICE_INFO_RSP: u8 = 0x04;
pub const DEVMGMT_MSG_GET_FW_INFO_REQ: u8 = 0x05;
pub const DEVMGMT_MSG_GET_FW_INFO_RSP: u8 = 0x06;
pub const DEVMGMT_MSG_RESET_REQ: u8 = 0x07;
pub const DEVMGMT_MSG_RESET_RSP: u8 = 0x08;
pub const DEVMGMT_MSG_SET_OPMODE_REQ: u8 = 0x09;
pub const DEVMGMT_MSG_SET_OPMODE_RSP: u8 = 0x0A;
pub const DEVMGMT_MSG_GET_OPMODE_REQ: u8 = 0x0B;
pub const DEVMGMT_MSG_GET_OPMODE_RSP: u8 = 0x0C;
pub const DEVMGMT_MSG_SET_RTC_REQ: u8 = 0x0D;
pub const DEVMGMT_MSG_SET_RTC_RSP: u8 = 0x0E;
pub const DEVMGMT_MSG_GET_RTC_REQ: u8 = 0x0F;
pub const DEVMGMT_MSG_GET_RTC_RSP: u8 = 0x10;
pub const DEVMGMT_MSG_GET_RADIO_CONFIG_REQ: u8 = 0x11;
pub const DEVMGMT_MSG_GET_RADIO_CONFIG_RSP: u8 = 0x12;
pub const DEVMGMT_MSG_SET_RADIO_CONFIG_REQ: u8 = 0x13;
pub const DEVMGMT_MSG_SET_RADIO_CONFIG_RSP: u8 = 0x14;
pub const DEVMGMT_MSG_RESET_RADIO_CONFIG_REQ: u8 = 0x15;
pub const DEVMGMT_MSG_RESET_RADIO_CONFIG_RSP: u8 = 0x16;
pub const DEVMGMT_MSG_GET_SYSTEM_STATUS_REQ: u8 = 0x17;
pub const DEVMGMT_MSG_GET_SYSTEM_STATUS_RSP: u8 = 0x18;
pub const DEVMGMT_MSG_SET_RADIO_MODE_REQ: u8 = 0x19;
pub const DEVMGMT_MSG_SET_RADIO_MODE_RSP: u8 = 0x1A;
pub const DEVMGMT_MSG_POWER_UP_IND: u8 = 0x20;
pub const DEVMGMT_MSG_SET_AES_KEY_REQ: u8 = 0x21;
pub const DEVMGMT_MSG_SET_AES_KEY_RSP: u8 = 0x22;
pub const DEVMGMT_MSG_GET_AES_KEY_REQ: u8 = 0x23;
pub const DEVMGMT_MSG_GET_AES_KEY_RSP: u8 = 0x24;
pub const DEVMGMT_MSG_SET_RTC_ALARM_REQ: u8 = 0x31;
pub const DEVMGMT_MSG_SET_RTC_ALARM_RSP: u8 = 0x32;
pub const DEVMGMT_MSG_CLEAR_RTC_ALARM_REQ: u8 = 0x33;
pub const DEVMGMT_MSG_CLEAR_RTC_ALARM_RSP: u8 = 0x34;
pub const DEVMGMT_MSG_GET_RTC_ALARM_REQ: u8 = 0x35;
pub const DEVMGMT_MSG_GET_RTC_ALARM_RSP: u8 = 0x36;
pub const DEVMGMT_MSG_RTC_ALARM_IND: u8 = 0x38;
pub const DEVMGMT_MSG_SET_HCI_CONFIG_REQ: u8 = 0x41;
pub const DEVMGMT_MSG_SET_HCI_CONFIG_RSP: u8 = 0x42;
pub const DEVMGMT_MSG_GET_HCI_CONFIG_REQ: u8 = 0x43;
pub const DEVMGMT_MSG_GET_HCI_CONFIG_RSP: u8 = 0x44;

pub const DEVMGMT_STATUS_OK: u8 = 0x00;
pub const DEVMGMT_STATUS_ERROR: u8 = 0x01;
pub const DEVMGMT_STATUS_CMD_NOT_SUPPORTED: u8 = 0x02;
pub const DEVMGMT_STATUS_WRONG_PARAMETER: u8 = 0x03;
pub const DEVMGMT_STATUS_WRONG_DEVICE_MODE: u8 = 0x04;
pub const DEVMGMT_STATUS_DEVICE_BUSY: u8 = 0x06;

// ----------------------------------------------------------------------------
// Radio link test SAP (LR-Base / LR-Base-Plus)
// ----------------------------------------------------------------------------

pub const RLT_SAP_ID: u8 = 0x02;

pub const RLT_MSG_START_REQ: u8 = 0x01;
pub const RLT_MSG_START_RSP: u8 = 0x02;
pub const RLT_MSG_STOP_REQ: u8 = 0x03;
pub const RLT_MSG_STOP_RSP: u8 = 0x04;
pub const RLT_MSG_STATUS_IND: u8 = 0x06;

pub const RLT_STATUS_OK: u8 = 0x00;
pub const RLT_STATUS_ERROR: u8 = 0x01;
pub const RLT_STATUS_CMD_NOT_SUPPORTED: u8 = 0x02;
pub const RLT_STATUS_WRONG_PARAMETER: u8 = 0x03;
pub const RLT_STATUS_WRONG_RADIO_MODE: u8 = 0x04;

// ----------------------------------------------------------------------------
// Radio link SAP (LR-Base / LR-Base-Plus)
// ----------------------------------------------------------------------------

pub const RADIOLINK_SAP_ID: u8 = 0x03;

pub const RADIOLINK_MSG_SEND_UDATA_REQ: u8 = 0x01;
pub const RADIOLINK_MSG_SEND_UDATA_RSP: u8 = 0x02;
pub const RADIOLINK_MSG_UDATA_RX_IND: u8 = 0x04;
pub const RADIOLINK_MSG_UDATA_TX_IND: u8 = 0x06;
pub const RADIOLINK_MSG_RAW_DATA_RX_IND: u8 = 0x08;
pub const RADIOLINK_MSG_SEND_CDATA_REQ: u8 = 0x09;
pub const RADIOLINK_MSG_SEND_CDATA_RSP: u8 = 0x0A;
pub const RADIOLINK_MSG_CDATA_RX_IND: u8 = 0x0C;
pub const RADIOLINK_MSG_CDATA_TX_IND: u8 = 0x0E;
pub const RADIOLINK_MSG_ACK_RX_IND: u8 = 0x10;
pub const RADIOLINK_MSG_ACK_TIMEOUT_IND: u8 = 0x12;
pub const RADIOLINK_MSG_ACK_TX_IND: u8 = 0x14;
pub const RADIOLINK_MSG_SET_ACK_DATA_REQ: u8 = 0x15;
pub const RADIOLINK_MSG_SET_ACK_DATA_RSP: u8 = 0x16;

pub const RADIOLINK_STATUS_OK: u8 = 0x00;
pub const RADIOLINK_STATUS_ERROR: u8 = 0x01;
pub const RADIOLINK_STATUS_CMD_NOT_SUPPORTED: u8 = 0x02;
pub const RADIOLINK_STATUS_WRONG_PARAMETER: u8 = 0x03;
pub const RADIOLINK_STATUS_WRONG_RADIO_MODE: u8 = 0x04;
pub const RADIOLINK_STATUS_MEDIA_BUSY: u8 = 0x05;
pub const RADIOLINK_STATUS_BUFFER_FULL: u8 = 0x07;
pub const RADIOLINK_STATUS_LENGTH_ERROR: u8 = 0x08;

/// Bit in the rx format byte: extended HCI output (RSSI/SNR/time trailer)
pub const RADIOLINK_FORMAT_EXTENDED: u8 = 0x01;

/// Maximum user payload of one radio link message
pub const RADIOLINK_MAX_PAYLOAD: usize = 69;

/// Maximum user payload of a piggyback ack
pub const RADIOLINK_MAX_ACK_PAYLOAD: usize = 8;

// ----------------------------------------------------------------------------
// Remote control SAP (LR-Base-Plus)
// ----------------------------------------------------------------------------

pub const REMOTECTRL_SAP_ID: u8 = 0x04;

pub const REMOTECTRL_MSG_BUTTON_PRESSED_IND: u8 = 0x02;

// ----------------------------------------------------------------------------
// Sensor app SAP (LR-Base-Plus)
// ----------------------------------------------------------------------------

pub const SENSORAPP_SAP_ID: u8 = 0x05;

pub const SENSORAPP_MSG_SEND_DATA_IND: u8 = 0x06;
pub const SENSORAPP_MSG_ACK_IND: u8 = 0x08;
pub const SENSORAPP_MSG_SET_CONFIG_REQ: u8 = 0x09;
pub const SENSORAPP_MSG_SET_CONFIG_RSP: u8 = 0x0A;
pub const SENSORAPP_MSG_GET_CONFIG_REQ: u8 = 0x0B;
pub const SENSORAPP_MSG_GET_CONFIG_RSP: u8 = 0x0C;

pub const SENSORAPP_STATUS_OK: u8 = 0x00;
pub const SENSORAPP_STATUS_ERROR: u8 = 0x01;
pub const SENSORAPP_STATUS_WRONG_DEVICE_MODE: u8 = 0x04;

/// Bit in the rx format byte: extended HCI output (RSSI/SNR/time trailer)
pub const SENSORAPP_FORMAT_EXTENDED: u8 = 0x01;

// ----------------------------------------------------------------------------
// LoRaWAN SAP (LoRaWAN EndNode Modem firmware)
// ----------------------------------------------------------------------------

pub const LORAWAN_SAP_ID: u8 = 0x10;

pub const LORAWAN_MSG_ACTIVATE_DEVICE_REQ: u8 = 0x01;
pub const LORAWAN_MSG_ACTIVATE_DEVICE_RSP: u8 = 0x02;
pub const LORAWAN_MSG_SET_JOIN_PARAM_REQ: u8 = 0x05;
pub const LORAWAN_MSG_SET_JOIN_PARAM_RSP: u8 = 0x06;
pub const LORAWAN_MSG_JOIN_NETWORK_REQ: u8 = 0x09;
pub const LORAWAN_MSG_JOIN_NETWORK_RSP: u8 = 0x0A;
pub const LORAWAN_MSG_JOIN_NETWORK_TX_IND: u8 = 0x0B;
pub const LORAWAN_MSG_JOIN_NETWORK_IND: u8 = 0x0C;
pub const LORAWAN_MSG_SEND_UDATA_REQ: u8 = 0x0D;
pub const LORAWAN_MSG_SEND_UDATA_RSP: u8 = 0x0E;
pub const LORAWAN_MSG_SEND_UDATA_TX_IND: u8 = 0x0F;
pub const LORAWAN_MSG_RECV_UDATA_IND: u8 = 0x10;
pub const LORAWAN_MSG_SEND_CDATA_REQ: u8 = 0x11;
pub const LORAWAN_MSG_SEND_CDATA_RSP: u8 = 0x12;
pub const LORAWAN_MSG_SEND_CDATA_TX_IND: u8 = 0x13;
pub const LORAWAN_MSG_RECV_CDATA_IND: u8 = 0x14;
pub const LORAWAN_MSG_RECV_ACK_IND: u8 = 0x15;
pub const LORAWAN_MSG_RECV_NO_DATA_IND: u8 = 0x16;
pub const LORAWAN_MSG_SET_RSTACK_CONFIG_REQ: u8 = 0x19;
pub const LORAWAN_MSG_SET_RSTACK_CONFIG_RSP: u8 = 0x1A;
pub const LORAWAN_MSG_GET_RSTACK_CONFIG_REQ: u8 = 0x1B;
pub const LORAWAN_MSG_GET_RSTACK_CONFIG_RSP: u8 = 0x1C;
pub const LORAWAN_MSG_REACTIVATE_DEVICE_REQ: u8 = 0x1D;
pub const LORAWAN_MSG_REACTIVATE_DEVICE_RSP: u8 = 0x1E;
pub const LORAWAN_MSG_DEACTIVATE_DEVICE_REQ: u8 = 0x21;
pub const LORAWAN_MSG_DEACTIVATE_DEVICE_RSP: u8 = 0x22;
pub const LORAWAN_MSG_FACTORY_RESET_REQ: u8 = 0x23;
pub const LORAWAN_MSG_FACTORY_RESET_RSP: u8 = 0x24;
pub const LORAWAN_MSG_SET_DEVICE_EUI_REQ: u8 = 0x25;
pub const LORAWAN_MSG_SET_DEVICE_EUI_RSP: u8 = 0x26;
pub const LORAWAN_MSG_GET_DEVICE_EUI_REQ: u8 = 0x27;
pub const LORAWAN_MSG_GET_DEVICE_EUI_RSP: u8 = 0x28;
pub const LORAWAN_MSG_GET_NWK_STATUS_REQ: u8 = 0x29;
pub const LORAWAN_MSG_GET_NWK_STATUS_RSP: u8 = 0x2A;

pub const LORAWAN_STATUS_OK: u8 = 0x00;
pub const LORAWAN_STATUS_ERROR: u8 = 0x01;
pub const LORAWAN_STATUS_CMD_NOT_SUPPORTED: u8 = 0x02;
pub const LORAWAN_STATUS_WRONG_PARAMETER: u8 = 0x03;
pub const LORAWAN_STATUS_WRONG_DEVICE_MODE: u8 = 0x04;
pub const LORAWAN_STATUS_DEVICE_NOT_ACTIVATED: u8 = 0x05;
pub const LORAWAN_STATUS_DEVICE_BUSY: u8 = 0x06;
pub const LORAWAN_STATUS_QUEUE_FULL: u8 = 0x07;
pub const LORAWAN_STATUS_LENGTH_ERROR: u8 = 0x08;
pub const LORAWAN_STATUS_NO_FACTORY_SETTINGS: u8 = 0x09;
pub const LORAWAN_STATUS_CHANNEL_BLOCKED: u8 = 0x0A;
pub const LORAWAN_STATUS_CHANNEL_NOT_AVAILABLE: u8 = 0x0B;

/// Bit in the rx format byte: extended HCI output (channel/DR/RSSI/SNR trailer)
pub const LORAWAN_FORMAT_EXTENDED: u8 = 0x01;

/// Length of a device/application EUI in bytes
pub const LORAWAN_EUI_LEN: usize = 8;

/// Length of the LoRaWAN session/application keys in bytes
pub const LORAWAN_KEY_LEN: usize = 16;
