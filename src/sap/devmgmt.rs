//! # Device Management SAP
//!
//! Commands of the DeviceManagement service access point shared by all WiMOD
//! firmwares, plus the radio-configuration and system-status shapes that
//! differ between the LR-Base and LR-Base-Plus personalities.
//!
//! The Plus radio configuration is the protocol's one conditionally-shaped
//! payload: which bandwidth/error-coding bytes are meaningful depends on the
//! modulation selector packed before them. [`ModulationSettings`] models the
//! three branches as a sum type; the non-applicable slots are packed as
//! explicit reserved bytes so the payload length stays fixed.

use crate::constants::*;
use crate::error::HciError;
use crate::hci::{HciConnection, HciTransport};
use crate::sap::payload::{PayloadReader, PayloadWriter};
use crate::sap::DeviceResponse;
use bitflags::bitflags;

/// Basic identification data of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub module_type: u8,
    pub device_address: u32,
    pub group_address: u8,
    pub reserved: u16,
}

/// Firmware identification data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareInfo {
    pub version_minor: u8,
    pub version_major: u8,
    pub build_count: u16,
    pub build_date: String,
    pub firmware_name: String,
}

/// System status shared by the base firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    pub systick_resolution: u8,
    pub systick_counter: u32,
    pub rtc_time: u32,
    pub nvm_status: u16,
    pub battery_status: u16,
    pub extra_status: u16,
}

/// Extended system status of the LR-Base-Plus firmware: the base fields plus
/// the radio packet counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatusPlus {
    pub base: SystemStatus,
    pub rx_packets: u32,
    pub rx_address_match: u32,
    pub rx_crc_error: u32,
    pub tx_packets: u32,
    pub tx_error: u32,
    pub tx_media_busy: u32,
}

/// RTC alarm settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcAlarm {
    /// 0 = single alarm, 1 = daily repeated
    pub options: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// HCI wakeup configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HciConfig {
    pub baudrate_id: u8,
    pub wakeup_chars: u16,
    pub tx_hold_time: u8,
    pub rx_hold_time: u8,
}

bitflags! {
    /// Misc options field of the radio configurations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MiscOptions: u8 {
        const EXTENDED_RF_PACKET = 0x01;
        const RTC_ENABLED        = 0x02;
        const HCI_TX_IND         = 0x04;
        const HCI_POWER_UP_IND   = 0x08;
        const HCI_BUTTON_IND     = 0x10;
        const AES_ENABLED        = 0x20;
        const REMOTE_CTRL        = 0x40;
    }
}

bitflags! {
    /// Per-field rejection bitmask carried by a WRONG_PARAMETER response to
    /// set-radio-config (Plus firmware). The wire format is four bytes;
    /// bytes 1 and 3 are reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WrongParamFlags: u32 {
        const MODULATION       = 1 << 0;
        const FREQUENCY        = 1 << 1;
        const BANDWIDTH        = 1 << 2;
        const SPREADING_FACTOR = 1 << 3;
        const ERROR_CODING     = 1 << 4;
        const POWER_LEVEL      = 1 << 5;
        const RADIO_MODE       = 1 << 16;
        const RX_OPTIONS       = 1 << 17;
        const LBT_THRESHOLD    = 1 << 18;
        const GROUP_ADDRESS    = 1 << 19;
        const DEVICE_ADDRESS   = 1 << 20;
        const POWER_SAVE_MODE  = 1 << 21;
    }
}

/// Modulation-dependent radio parameters of the Plus firmware.
///
/// On the wire this is always four bytes (selector, bandwidth, spreading
/// factor slot, error-coding slot) with reserved zero fillers for the
/// slots a modulation does not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulationSettings {
    LoRa {
        bandwidth: u8,
        spreading_factor: u8,
        error_coding: u8,
    },
    Flrc {
        bandwidth: u8,
        error_coding: u8,
    },
    Fsk {
        bandwidth: u8,
    },
    /// Selector value this crate does not know; settings bytes kept raw.
    Unknown(u8),
}

impl ModulationSettings {
    const SELECTOR_LORA: u8 = 0;
    const SELECTOR_FLRC: u8 = 1;
    const SELECTOR_FSK: u8 = 2;

    fn selector(&self) -> u8 {
        match self {
            ModulationSettings::LoRa { .. } => Self::SELECTOR_LORA,
            ModulationSettings::Flrc { .. } => Self::SELECTOR_FLRC,
            ModulationSettings::Fsk { .. } => Self::SELECTOR_FSK,
            ModulationSettings::Unknown(selector) => *selector,
        }
    }
}

/// Radio configuration of the base LR-Base firmware (fixed shape).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioConfig {
    /// Store in NVM (true) or RAM only (false); encode-only.
    pub store_nvm: bool,
    pub radio_mode: u8,
    pub group_address: u8,
    pub tx_group_address: u8,
    pub device_address: u16,
    pub tx_device_address: u16,
    /// 0 = LoRa, 1 = FSK
    pub modulation: u8,
    /// 24-bit transceiver frequency register, LSB/MID/MSB
    pub rf_freq: [u8; 3],
    pub signal_bandwidth: u8,
    pub spreading_factor: u8,
    pub error_coding: u8,
    pub power_level: u8,
    pub tx_control: u8,
    pub rx_control: u8,
    pub rx_window_time: u16,
    pub led_control: u8,
    pub misc_options: MiscOptions,
}

/// Radio configuration of the LR-Base-Plus firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioConfigPlus {
    /// Store in NVM (true) or RAM only (false); encode-only.
    pub store_nvm: bool,
    pub radio_mode: u8,
    pub group_address: u8,
    pub tx_group_address: u8,
    pub device_address: u16,
    pub tx_device_address: u16,
    pub modulation: ModulationSettings,
    /// 24-bit transceiver frequency register, LSB/MID/MSB
    pub rf_freq: [u8; 3],
    pub power_level: i8,
    pub tx_control: u8,
    pub rx_control: u8,
    pub rx_window_time: u16,
    pub led_control: u8,
    pub misc_options: MiscOptions,
    pub power_saving: bool,
    pub lbt_threshold: i16,
}

impl RadioConfigPlus {
    /// Request payload: 26 bytes, independent of the modulation branch.
    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut w = PayloadWriter::with_capacity(26);
        w.u8(self.store_nvm as u8)
            .u8(self.radio_mode)
            .u8(self.group_address)
            .u8(self.tx_group_address)
            .u16(self.device_address)
            .u16(self.tx_device_address);
        // The modulation selector precedes the frequency on the wire, but
        // the settings slots follow it.
        w.u8(self.modulation.selector());
        w.bytes(&self.rf_freq);
        match self.modulation {
            ModulationSettings::LoRa {
                bandwidth,
                spreading_factor,
                error_coding,
            } => {
                w.u8(bandwidth).u8(spreading_factor).u8(error_coding);
            }
            ModulationSettings::Flrc {
                bandwidth,
                error_coding,
            } => {
                w.u8(bandwidth).reserved(1).u8(error_coding);
            }
            ModulationSettings::Fsk { bandwidth } => {
                w.u8(bandwidth).reserved(2);
            }
            ModulationSettings::Unknown(_) => {
                w.reserved(3);
            }
        }
        w.i8(self.power_level)
            .u8(self.tx_control)
            .u8(self.rx_control)
            .u16(self.rx_window_time)
            .u8(self.led_control)
            .u8(self.misc_options.bits())
            .reserved(1)
            .u8(self.power_saving as u8)
            .i16(self.lbt_threshold);
        w.into_vec()
    }

    pub(crate) fn decode(r: &mut PayloadReader<'_>) -> Result<Self, HciError> {
        let radio_mode = r.u8()?;
        let group_address = r.u8()?;
        let tx_group_address = r.u8()?;
        let device_address = r.u16()?;
        let tx_device_address = r.u16()?;
        let selector = r.u8()?;
        let rf_freq = r.array::<3>()?;
        let bandwidth = r.u8()?;
        let sf_slot = r.u8()?;
        let ec_slot = r.u8()?;
        let modulation = match selector {
            ModulationSettings::SELECTOR_LORA => ModulationSettings::LoRa {
                bandwidth,
                spreading_factor: sf_slot,
                error_coding: ec_slot,
            },
            ModulationSettings::SELECTOR_FLRC => ModulationSettings::Flrc {
                bandwidth,
                error_coding: ec_slot,
            },
            ModulationSettings::SELECTOR_FSK => ModulationSettings::Fsk { bandwidth },
            other => ModulationSettings::Unknown(other),
        };
        let power_level = r.i8()?;
        let tx_control = r.u8()?;
        let rx_control = r.u8()?;
        let rx_window_time = r.u16()?;
        let led_control = r.u8()?;
        let misc_options = MiscOptions::from_bits_retain(r.u8()?);
        r.skip(1)?; // reserved
        let power_saving = r.u8()? != 0;
        let lbt_threshold = r.i16()?;
        Ok(RadioConfigPlus {
            store_nvm: false,
            radio_mode,
            group_address,
            tx_group_address,
            device_address,
            tx_device_address,
            modulation,
            rf_freq,
            power_level,
            tx_control,
            rx_control,
            rx_window_time,
            led_control,
            misc_options,
            power_saving,
            lbt_threshold,
        })
    }
}

impl RadioConfig {
    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut w = PayloadWriter::with_capacity(21);
        w.u8(self.store_nvm as u8)
            .u8(self.radio_mode)
            .u8(self.group_address)
            .u8(self.tx_group_address)
            .u16(self.device_address)
            .u16(self.tx_device_address)
            .u8(self.modulation)
            .bytes(&self.rf_freq)
            .u8(self.signal_bandwidth)
            .u8(self.spreading_factor)
            .u8(self.error_coding)
            .u8(self.power_level)
            .u8(self.tx_control)
            .u8(self.rx_control)
            .u16(self.rx_window_time)
            .u8(self.led_control)
            .u8(self.misc_options.bits());
        w.into_vec()
    }

    pub(crate) fn decode(r: &mut PayloadReader<'_>) -> Result<Self, HciError> {
        Ok(RadioConfig {
            store_nvm: false,
            radio_mode: r.u8()?,
            group_address: r.u8()?,
            tx_group_address: r.u8()?,
            device_address: r.u16()?,
            tx_device_address: r.u16()?,
            modulation: r.u8()?,
            rf_freq: r.array::<3>()?,
            signal_bandwidth: r.u8()?,
            spreading_factor: r.u8()?,
            error_coding: r.u8()?,
            power_level: r.u8()?,
            tx_control: r.u8()?,
            rx_control: r.u8()?,
            rx_window_time: r.u16()?,
            led_control: r.u8()?,
            misc_options: MiscOptions::from_bits_retain(r.u8()?),
        })
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Ping the module.
pub async fn ping<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_REQ, DEVMGMT_MSG_PING_RSP, &[])
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Reset / reboot the module.
pub async fn reset<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_RESET_REQ,
            DEVMGMT_MSG_RESET_RSP,
            &[],
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Get basic module identification data.
pub async fn get_device_info<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<DeviceInfo>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_DEVICE_INFO_REQ,
            DEVMGMT_MSG_GET_DEVICE_INFO_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let info = DeviceInfo {
        module_type: r.u8()?,
        device_address: r.u32()?,
        group_address: r.u8()?,
        reserved: r.u16()?,
    };
    Ok(DeviceResponse::ok(status, info))
}

/// Get firmware version information.
pub async fn get_firmware_info<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<FirmwareInfo>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_FW_INFO_REQ,
            DEVMGMT_MSG_GET_FW_INFO_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let version_minor = r.u8()?;
    let version_major = r.u8()?;
    let build_count = r.u16()?;
    let build_date = ascii_field(r.bytes(10)?);
    let firmware_name = ascii_field(r.rest());
    Ok(DeviceResponse::ok(
        status,
        FirmwareInfo {
            version_minor,
            version_major,
            build_count,
            build_date,
            firmware_name,
        },
    ))
}

/// Get the base-shape system status (LR-Base firmware).
pub async fn get_system_status<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<SystemStatus>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_SYSTEM_STATUS_REQ,
            DEVMGMT_MSG_GET_SYSTEM_STATUS_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let value = decode_system_status(&mut r)?;
    Ok(DeviceResponse::ok(status, value))
}

/// Get the extended system status (LR-Base-Plus firmware).
pub async fn get_system_status_plus<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<SystemStatusPlus>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_SYSTEM_STATUS_REQ,
            DEVMGMT_MSG_GET_SYSTEM_STATUS_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let base = decode_system_status(&mut r)?;
    let value = SystemStatusPlus {
        base,
        rx_packets: r.u32()?,
        rx_address_match: r.u32()?,
        rx_crc_error: r.u32()?,
        tx_packets: r.u32()?,
        tx_error: r.u32()?,
        tx_media_busy: r.u32()?,
    };
    Ok(DeviceResponse::ok(status, value))
}

fn decode_system_status(r: &mut PayloadReader<'_>) -> Result<SystemStatus, HciError> {
    Ok(SystemStatus {
        systick_resolution: r.u8()?,
        systick_counter: r.u32()?,
        rtc_time: r.u32()?,
        nvm_status: r.u16()?,
        battery_status: r.u16()?,
        extra_status: r.u16()?,
    })
}

/// Read the current RTC timestamp (vendor 32-bit encoding).
pub async fn get_rtc<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<u32>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_RTC_REQ,
            DEVMGMT_MSG_GET_RTC_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let time = r.u32()?;
    Ok(DeviceResponse::ok(status, time))
}

/// Set the RTC timestamp (vendor 32-bit encoding).
pub async fn set_rtc<T: HciTransport>(
    hci: &mut HciConnection<T>,
    rtc_time: u32,
) -> Result<DeviceResponse<()>, HciError> {
    let mut w = PayloadWriter::with_capacity(4);
    w.u32(rtc_time);
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_SET_RTC_REQ,
            DEVMGMT_MSG_SET_RTC_RSP,
            &w.into_vec(),
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Get the general operation mode.
pub async fn get_operation_mode<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<u8>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_OPMODE_REQ,
            DEVMGMT_MSG_GET_OPMODE_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let mode = r.u8()?;
    Ok(DeviceResponse::ok(status, mode))
}

/// Set the general operation mode.
pub async fn set_operation_mode<T: HciTransport>(
    hci: &mut HciConnection<T>,
    mode: u8,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_SET_OPMODE_REQ,
            DEVMGMT_MSG_SET_OPMODE_RSP,
            &[mode],
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Set the radio mode (Plus firmware command).
pub async fn set_radio_mode<T: HciTransport>(
    hci: &mut HciConnection<T>,
    radio_mode: u8,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_SET_RADIO_MODE_REQ,
            DEVMGMT_MSG_SET_RADIO_MODE_RSP,
            &[radio_mode],
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Store the 128-bit radio AES key.
pub async fn set_aes_key<T: HciTransport>(
    hci: &mut HciConnection<T>,
    key: &[u8; 16],
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_SET_AES_KEY_REQ,
            DEVMGMT_MSG_SET_AES_KEY_RSP,
            key,
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Read back the 128-bit radio AES key.
pub async fn get_aes_key<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<[u8; 16]>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_AES_KEY_REQ,
            DEVMGMT_MSG_GET_AES_KEY_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let key = r.array::<16>()?;
    Ok(DeviceResponse::ok(status, key))
}

/// Program the RTC alarm.
pub async fn set_rtc_alarm<T: HciTransport>(
    hci: &mut HciConnection<T>,
    alarm: &RtcAlarm,
) -> Result<DeviceResponse<()>, HciError> {
    let payload = [alarm.options, alarm.hour, alarm.minute, alarm.second];
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_SET_RTC_ALARM_REQ,
            DEVMGMT_MSG_SET_RTC_ALARM_RSP,
            &payload,
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Read the programmed RTC alarm.
pub async fn get_rtc_alarm<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<RtcAlarm>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_RTC_ALARM_REQ,
            DEVMGMT_MSG_GET_RTC_ALARM_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let alarm = RtcAlarm {
        options: r.u8()?,
        hour: r.u8()?,
        minute: r.u8()?,
        second: r.u8()?,
    };
    Ok(DeviceResponse::ok(status, alarm))
}

/// Clear a pending RTC alarm.
pub async fn clear_rtc_alarm<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_CLEAR_RTC_ALARM_REQ,
            DEVMGMT_MSG_CLEAR_RTC_ALARM_RSP,
            &[],
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Get the HCI wakeup configuration.
pub async fn get_hci_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<HciConfig>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_HCI_CONFIG_REQ,
            DEVMGMT_MSG_GET_HCI_CONFIG_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let config = HciConfig {
        baudrate_id: r.u8()?,
        wakeup_chars: r.u16()?,
        tx_hold_time: r.u8()?,
        rx_hold_time: r.u8()?,
    };
    Ok(DeviceResponse::ok(status, config))
}

/// Set the HCI wakeup configuration.
pub async fn set_hci_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
    config: &HciConfig,
) -> Result<DeviceResponse<()>, HciError> {
    let mut w = PayloadWriter::with_capacity(5);
    w.u8(config.baudrate_id)
        .u16(config.wakeup_chars)
        .u8(config.tx_hold_time)
        .u8(config.rx_hold_time);
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_SET_HCI_CONFIG_REQ,
            DEVMGMT_MSG_SET_HCI_CONFIG_RSP,
            &w.into_vec(),
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Restore the factory radio configuration.
pub async fn reset_radio_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_RESET_RADIO_CONFIG_REQ,
            DEVMGMT_MSG_RESET_RADIO_CONFIG_RSP,
            &[],
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Get the base-shape radio configuration (LR-Base firmware).
pub async fn get_radio_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<RadioConfig>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_RADIO_CONFIG_REQ,
            DEVMGMT_MSG_GET_RADIO_CONFIG_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let config = RadioConfig::decode(&mut r)?;
    Ok(DeviceResponse::ok(status, config))
}

/// Set the base-shape radio configuration (LR-Base firmware).
pub async fn set_radio_config<T: HciTransport>(
    hci: &mut HciConnection<T>,
    config: &RadioConfig,
) -> Result<DeviceResponse<()>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_SET_RADIO_CONFIG_REQ,
            DEVMGMT_MSG_SET_RADIO_CONFIG_RSP,
            &config.encode(),
        )
        .await?;
    Ok(DeviceResponse::status_only(rsp.status()?))
}

/// Get the Plus-shape radio configuration (LR-Base-Plus firmware).
pub async fn get_radio_config_plus<T: HciTransport>(
    hci: &mut HciConnection<T>,
) -> Result<DeviceResponse<RadioConfigPlus>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_RADIO_CONFIG_REQ,
            DEVMGMT_MSG_GET_RADIO_CONFIG_RSP,
            &[],
        )
        .await?;
    let status = rsp.status()?;
    if status != DEVMGMT_STATUS_OK {
        return Ok(DeviceResponse::status_only(status));
    }
    let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
    let config = RadioConfigPlus::decode(&mut r)?;
    Ok(DeviceResponse::ok(status, config))
}

/// Set the Plus-shape radio configuration (LR-Base-Plus firmware).
///
/// On a WRONG_PARAMETER rejection the response carries a per-field bitmask
/// naming the offending fields; it is returned as the response value.
pub async fn set_radio_config_plus<T: HciTransport>(
    hci: &mut HciConnection<T>,
    config: &RadioConfigPlus,
) -> Result<DeviceResponse<WrongParamFlags>, HciError> {
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_SET_RADIO_CONFIG_REQ,
            DEVMGMT_MSG_SET_RADIO_CONFIG_RSP,
            &config.encode(),
        )
        .await?;
    let status = rsp.status()?;
    if status == DEVMGMT_STATUS_WRONG_PARAMETER && rsp.payload.len() >= HCI_RSP_CMD_PAYLOAD_POS + 4
    {
        let mut r = PayloadReader::at(&rsp.payload, HCI_RSP_CMD_PAYLOAD_POS);
        let mask = r.array::<4>()?;
        let flags = WrongParamFlags::from_bits_retain(u32::from_le_bytes(mask));
        return Ok(DeviceResponse::ok(status, flags));
    }
    Ok(DeviceResponse::status_only(status))
}

fn ascii_field(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plus_config(modulation: ModulationSettings) -> RadioConfigPlus {
        RadioConfigPlus {
            store_nvm: true,
            radio_mode: 0,
            group_address: 0x10,
            tx_group_address: 0x10,
            device_address: 0x1234,
            tx_device_address: 0x4321,
            modulation,
            rf_freq: [0x40, 0x60, 0xB8],
            power_level: 10,
            tx_control: 0,
            rx_control: 1,
            rx_window_time: 200,
            led_control: 0x03,
            misc_options: MiscOptions::EXTENDED_RF_PACKET,
            power_saving: false,
            lbt_threshold: -80,
        }
    }

    #[test]
    fn test_plus_config_length_independent_of_modulation() {
        let lora = sample_plus_config(ModulationSettings::LoRa {
            bandwidth: 2,
            spreading_factor: 7,
            error_coding: 1,
        })
        .encode();
        let flrc = sample_plus_config(ModulationSettings::Flrc {
            bandwidth: 1,
            error_coding: 2,
        })
        .encode();
        let fsk = sample_plus_config(ModulationSettings::Fsk { bandwidth: 3 }).encode();

        assert_eq!(lora.len(), 26);
        assert_eq!(flrc.len(), lora.len());
        assert_eq!(fsk.len(), lora.len());
        // reserved fillers in the non-applicable slots (bytes 13/14 after
        // store flag, addressing, selector and frequency)
        assert_eq!(flrc[13], 0x00);
        assert_eq!(fsk[13], 0x00);
        assert_eq!(fsk[14], 0x00);
    }

    #[test]
    fn test_plus_config_round_trip() {
        let config = sample_plus_config(ModulationSettings::Flrc {
            bandwidth: 4,
            error_coding: 3,
        });
        // A get-response payload has no store flag; skip it.
        let encoded = config.encode();
        let mut r = PayloadReader::at(&encoded, 1);
        let decoded = RadioConfigPlus::decode(&mut r).unwrap();
        assert_eq!(decoded.modulation, config.modulation);
        assert_eq!(decoded.device_address, 0x1234);
        assert_eq!(decoded.lbt_threshold, -80);
        assert_eq!(decoded.misc_options, MiscOptions::EXTENDED_RF_PACKET);
    }

    #[test]
    fn test_base_config_round_trip() {
        let config = RadioConfig {
            store_nvm: false,
            radio_mode: 0,
            group_address: 0x20,
            tx_group_address: 0x20,
            device_address: 0x0001,
            tx_device_address: 0x0002,
            modulation: 0,
            rf_freq: [0x11, 0x22, 0x33],
            signal_bandwidth: 4,
            spreading_factor: 11,
            error_coding: 1,
            power_level: 14,
            tx_control: 0,
            rx_control: 2,
            rx_window_time: 100,
            led_control: 0,
            misc_options: MiscOptions::RTC_ENABLED | MiscOptions::AES_ENABLED,
        };
        let encoded = config.encode();
        let mut r = PayloadReader::at(&encoded, 1);
        let decoded = RadioConfig::decode(&mut r).unwrap();
        assert_eq!(decoded.spreading_factor, 11);
        assert_eq!(
            decoded.misc_options,
            MiscOptions::RTC_ENABLED | MiscOptions::AES_ENABLED
        );
    }

    #[test]
    fn test_unknown_modulation_keeps_length() {
        let encoded = sample_plus_config(ModulationSettings::Unknown(9)).encode();
        assert_eq!(encoded.len(), 26);
        let mut r = PayloadReader::at(&encoded, 1);
        let decoded = RadioConfigPlus::decode(&mut r).unwrap();
        assert_eq!(decoded.modulation, ModulationSettings::Unknown(9));
    }

    #[test]
    fn test_ascii_field_trims_nul() {
        assert_eq!(ascii_field(b"V3.1\0\0\0"), "V3.1");
        assert_eq!(ascii_field(b"LR-BASE"), "LR-BASE");
    }

    #[test]
    fn test_wrong_param_flags_layout() {
        // byte 0 bit 3 = spreading factor, byte 2 bit 0 = radio mode
        let flags = WrongParamFlags::from_bits_retain(u32::from_le_bytes([0x08, 0, 0x01, 0]));
        assert!(flags.contains(WrongParamFlags::SPREADING_FACTOR));
        assert!(flags.contains(WrongParamFlags::RADIO_MODE));
        assert!(!flags.contains(WrongParamFlags::MODULATION));
    }
}
