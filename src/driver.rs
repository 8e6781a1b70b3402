//! # Module drivers
//!
//! High-level façades binding an [`HciConnection`] to one firmware
//! personality. [`WimodLrBase`] speaks the LR-Base / LR-Base-Plus
//! peer-to-peer firmwares, with the [`RadioVariant`] chosen at construction
//! selecting payload shapes and gating variant-specific commands.
//! [`WimodLoRaWan`] speaks the LoRaWAN end-node firmware.
//!
//! A command the selected variant does not support is answered locally with
//! a CMD_NOT_SUPPORTED status and nothing is written to the device.

use crate::constants::*;
use crate::error::{HciError, HciResult};
use crate::hci::{HciConnection, HciTransport, IndicationRegistry};
use crate::sap::devmgmt::{
    self, DeviceInfo, FirmwareInfo, HciConfig, RadioConfig, RadioConfigPlus, RtcAlarm,
    SystemStatus, SystemStatusPlus, WrongParamFlags,
};
use crate::sap::lorawan::{self, AbpParameter, JoinParameter, NetworkStatus, RadioStackConfig};
use crate::sap::radiolink;
use crate::sap::rlt::{self, RltParameter};
use crate::sap::sensorapp::{self, SensorAppConfig};
use crate::sap::DeviceResponse;
use log::debug;

/// Firmware personality of an LR-Base class module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioVariant {
    /// Original LR-Base firmware (SX1272 class radio)
    LrBase,
    /// LR-Base-Plus firmware (SX1280 class radio, extended configuration)
    LrBasePlus,
}

/// Radio configuration in the shape of the selected variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioConfigValue {
    Base(RadioConfig),
    Plus(RadioConfigPlus),
}

/// System status in the shape of the selected variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemStatusValue {
    Base(SystemStatus),
    Plus(SystemStatusPlus),
}

/// Local answer for a command the firmware variant does not implement.
fn unsupported<V>(command: &str, variant: RadioVariant) -> Result<DeviceResponse<V>, HciError> {
    debug!("{} not supported by {:?} firmware, answering locally", command, variant);
    Ok(DeviceResponse::status_only(DEVMGMT_STATUS_CMD_NOT_SUPPORTED))
}

/// Outcome of the most recent command, kept so callers can re-read it
/// after the fact instead of capturing every return value.
#[derive(Debug, Clone, Copy)]
struct LastOutcome {
    result: HciResult,
    status: Option<u8>,
}

impl Default for LastOutcome {
    fn default() -> Self {
        LastOutcome {
            result: HciResult::Ok,
            status: None,
        }
    }
}

impl LastOutcome {
    fn record<V>(
        &mut self,
        result: Result<DeviceResponse<V>, HciError>,
    ) -> Result<DeviceResponse<V>, HciError> {
        match &result {
            Ok(rsp) => {
                self.result = HciResult::Ok;
                self.status = Some(rsp.status);
            }
            Err(err) => {
                self.result = err.local_result();
                self.status = None;
            }
        }
        result
    }
}

/// Driver for LR-Base and LR-Base-Plus modules.
pub struct WimodLrBase<T: HciTransport> {
    hci: HciConnection<T>,
    variant: RadioVariant,
    last: LastOutcome,
}

impl<T: HciTransport> WimodLrBase<T> {
    pub fn new(transport: T, variant: RadioVariant) -> Self {
        WimodLrBase {
            hci: HciConnection::new(transport),
            variant,
            last: LastOutcome::default(),
        }
    }

    pub fn variant(&self) -> RadioVariant {
        self.variant
    }

    /// Local outcome of the most recent command.
    pub fn last_hci_result(&self) -> HciResult {
        self.last.result
    }

    /// Device status byte of the most recent answered command, or `None`
    /// if no command has completed with a response yet.
    pub fn last_response_status(&self) -> Option<u8> {
        self.last.status
    }

    /// Access the underlying connection (timeouts, decode statistics).
    pub fn connection_mut(&mut self) -> &mut HciConnection<T> {
        &mut self.hci
    }

    /// Access the indication callback registry.
    pub fn indications_mut(&mut self) -> &mut IndicationRegistry {
        self.hci.indications_mut()
    }

    /// Drain pending bytes and dispatch any complete indications.
    pub async fn service(&mut self) -> Result<usize, HciError> {
        self.hci.pump().await
    }

    // --- device management -------------------------------------------------

    pub async fn ping(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::ping(&mut self.hci).await)
    }

    pub async fn reset(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::reset(&mut self.hci).await)
    }

    pub async fn device_info(&mut self) -> Result<DeviceResponse<DeviceInfo>, HciError> {
        self.last.record(devmgmt::get_device_info(&mut self.hci).await)
    }

    pub async fn firmware_info(&mut self) -> Result<DeviceResponse<FirmwareInfo>, HciError> {
        self.last.record(devmgmt::get_firmware_info(&mut self.hci).await)
    }

    pub async fn get_rtc(&mut self) -> Result<DeviceResponse<u32>, HciError> {
        self.last.record(devmgmt::get_rtc(&mut self.hci).await)
    }

    pub async fn set_rtc(&mut self, rtc_time: u32) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::set_rtc(&mut self.hci, rtc_time).await)
    }

    pub async fn get_operation_mode(&mut self) -> Result<DeviceResponse<u8>, HciError> {
        self.last.record(devmgmt::get_operation_mode(&mut self.hci).await)
    }

    pub async fn set_operation_mode(&mut self, mode: u8) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::set_operation_mode(&mut self.hci, mode).await)
    }

    pub async fn set_aes_key(&mut self, key: &[u8; 16]) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::set_aes_key(&mut self.hci, key).await)
    }

    pub async fn get_aes_key(&mut self) -> Result<DeviceResponse<[u8; 16]>, HciError> {
        self.last.record(devmgmt::get_aes_key(&mut self.hci).await)
    }

    pub async fn set_rtc_alarm(&mut self, alarm: &RtcAlarm) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::set_rtc_alarm(&mut self.hci, alarm).await)
    }

    pub async fn get_rtc_alarm(&mut self) -> Result<DeviceResponse<RtcAlarm>, HciError> {
        self.last.record(devmgmt::get_rtc_alarm(&mut self.hci).await)
    }

    pub async fn clear_rtc_alarm(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::clear_rtc_alarm(&mut self.hci).await)
    }

    pub async fn get_hci_config(&mut self) -> Result<DeviceResponse<HciConfig>, HciError> {
        self.last.record(devmgmt::get_hci_config(&mut self.hci).await)
    }

    pub async fn set_hci_config(
        &mut self,
        config: &HciConfig,
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::set_hci_config(&mut self.hci, config).await)
    }

    pub async fn reset_radio_config(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::reset_radio_config(&mut self.hci).await)
    }

    /// Read the radio configuration in the shape of the selected variant.
    pub async fn radio_config(&mut self) -> Result<DeviceResponse<RadioConfigValue>, HciError> {
        match self.variant {
            RadioVariant::LrBase => {
                let rsp = self.last.record(devmgmt::get_radio_config(&mut self.hci).await)?;
                Ok(rsp.map(RadioConfigValue::Base))
            }
            RadioVariant::LrBasePlus => {
                let rsp = self.last.record(devmgmt::get_radio_config_plus(&mut self.hci).await)?;
                Ok(rsp.map(RadioConfigValue::Plus))
            }
        }
    }

    /// Write the base-shape radio configuration (LR-Base only).
    pub async fn set_radio_config(
        &mut self,
        config: &RadioConfig,
    ) -> Result<DeviceResponse<()>, HciError> {
        if self.variant != RadioVariant::LrBase {
            return self.last.record(unsupported("set_radio_config", self.variant));
        }
        self.last.record(devmgmt::set_radio_config(&mut self.hci, config).await)
    }

    /// Write the Plus-shape radio configuration (LR-Base-Plus only).
    ///
    /// A WRONG_PARAMETER rejection carries a bitmask naming the offending
    /// fields in the response value.
    pub async fn set_radio_config_plus(
        &mut self,
        config: &RadioConfigPlus,
    ) -> Result<DeviceResponse<WrongParamFlags>, HciError> {
        if self.variant != RadioVariant::LrBasePlus {
            return self.last.record(unsupported("set_radio_config_plus", self.variant));
        }
        self.last.record(devmgmt::set_radio_config_plus(&mut self.hci, config).await)
    }

    /// Read the system status in the shape of the selected variant.
    pub async fn system_status(&mut self) -> Result<DeviceResponse<SystemStatusValue>, HciError> {
        match self.variant {
            RadioVariant::LrBase => {
                let rsp = self.last.record(devmgmt::get_system_status(&mut self.hci).await)?;
                Ok(rsp.map(SystemStatusValue::Base))
            }
            RadioVariant::LrBasePlus => {
                let rsp = self.last.record(devmgmt::get_system_status_plus(&mut self.hci).await)?;
                Ok(rsp.map(SystemStatusValue::Plus))
            }
        }
    }

    /// Select the radio mode (LR-Base-Plus only).
    pub async fn set_radio_mode(&mut self, radio_mode: u8) -> Result<DeviceResponse<()>, HciError> {
        if self.variant != RadioVariant::LrBasePlus {
            return self.last.record(unsupported("set_radio_mode", self.variant));
        }
        self.last.record(devmgmt::set_radio_mode(&mut self.hci, radio_mode).await)
    }

    // --- radio link --------------------------------------------------------

    pub async fn send_udata(
        &mut self,
        dest_group: u8,
        dest_address: u16,
        data: &[u8],
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(radiolink::send_udata(&mut self.hci, dest_group, dest_address, data).await)
    }

    pub async fn send_cdata(
        &mut self,
        dest_group: u8,
        dest_address: u16,
        data: &[u8],
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(radiolink::send_cdata(&mut self.hci, dest_group, dest_address, data).await)
    }

    pub async fn set_ack_data(&mut self, data: &[u8]) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(radiolink::set_ack_data(&mut self.hci, data).await)
    }

    // --- radio link test ---------------------------------------------------

    pub async fn start_link_test(
        &mut self,
        params: &RltParameter,
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(rlt::start(&mut self.hci, params).await)
    }

    pub async fn stop_link_test(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(rlt::stop(&mut self.hci).await)
    }

    // --- sensor application ------------------------------------------------

    pub async fn set_sensor_config(
        &mut self,
        config: &SensorAppConfig,
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(sensorapp::set_config(&mut self.hci, config).await)
    }

    pub async fn get_sensor_config(
        &mut self,
    ) -> Result<DeviceResponse<SensorAppConfig>, HciError> {
        self.last.record(sensorapp::get_config(&mut self.hci).await)
    }
}

/// Driver for LoRaWAN end-node modules.
pub struct WimodLoRaWan<T: HciTransport> {
    hci: HciConnection<T>,
    last: LastOutcome,
}

impl<T: HciTransport> WimodLoRaWan<T> {
    pub fn new(transport: T) -> Self {
        WimodLoRaWan {
            hci: HciConnection::new(transport),
            last: LastOutcome::default(),
        }
    }

    /// Local outcome of the most recent command.
    pub fn last_hci_result(&self) -> HciResult {
        self.last.result
    }

    /// Device status byte of the most recent answered command, or `None`
    /// if no command has completed with a response yet.
    pub fn last_response_status(&self) -> Option<u8> {
        self.last.status
    }

    pub fn connection_mut(&mut self) -> &mut HciConnection<T> {
        &mut self.hci
    }

    pub fn indications_mut(&mut self) -> &mut IndicationRegistry {
        self.hci.indications_mut()
    }

    /// Drain pending bytes and dispatch any complete indications.
    pub async fn service(&mut self) -> Result<usize, HciError> {
        self.hci.pump().await
    }

    pub async fn ping(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::ping(&mut self.hci).await)
    }

    pub async fn reset(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::reset(&mut self.hci).await)
    }

    pub async fn device_info(&mut self) -> Result<DeviceResponse<DeviceInfo>, HciError> {
        self.last.record(devmgmt::get_device_info(&mut self.hci).await)
    }

    pub async fn firmware_info(&mut self) -> Result<DeviceResponse<FirmwareInfo>, HciError> {
        self.last.record(devmgmt::get_firmware_info(&mut self.hci).await)
    }

    pub async fn get_operation_mode(&mut self) -> Result<DeviceResponse<u8>, HciError> {
        self.last.record(devmgmt::get_operation_mode(&mut self.hci).await)
    }

    pub async fn set_operation_mode(&mut self, mode: u8) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::set_operation_mode(&mut self.hci, mode).await)
    }

    pub async fn get_rtc(&mut self) -> Result<DeviceResponse<u32>, HciError> {
        self.last.record(devmgmt::get_rtc(&mut self.hci).await)
    }

    pub async fn set_rtc(&mut self, rtc_time: u32) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(devmgmt::set_rtc(&mut self.hci, rtc_time).await)
    }

    pub async fn activate_device(
        &mut self,
        params: &AbpParameter,
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::activate_device(&mut self.hci, params).await)
    }

    pub async fn reactivate_device(&mut self) -> Result<DeviceResponse<u32>, HciError> {
        self.last.record(lorawan::reactivate_device(&mut self.hci).await)
    }

    pub async fn set_join_parameter(
        &mut self,
        params: &JoinParameter,
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::set_join_parameter(&mut self.hci, params).await)
    }

    pub async fn join_network(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::join_network(&mut self.hci).await)
    }

    pub async fn send_udata(
        &mut self,
        port: u8,
        data: &[u8],
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::send_udata(&mut self.hci, port, data).await)
    }

    pub async fn send_cdata(
        &mut self,
        port: u8,
        data: &[u8],
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::send_cdata(&mut self.hci, port, data).await)
    }

    pub async fn set_radio_stack_config(
        &mut self,
        config: &RadioStackConfig,
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::set_radio_stack_config(&mut self.hci, config).await)
    }

    pub async fn get_radio_stack_config(
        &mut self,
    ) -> Result<DeviceResponse<RadioStackConfig>, HciError> {
        self.last.record(lorawan::get_radio_stack_config(&mut self.hci).await)
    }

    pub async fn network_status(&mut self) -> Result<DeviceResponse<NetworkStatus>, HciError> {
        self.last.record(lorawan::get_network_status(&mut self.hci).await)
    }

    pub async fn deactivate_device(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::deactivate_device(&mut self.hci).await)
    }

    pub async fn factory_reset(&mut self) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::factory_reset(&mut self.hci).await)
    }

    pub async fn set_device_eui(
        &mut self,
        eui: &[u8; LORAWAN_EUI_LEN],
    ) -> Result<DeviceResponse<()>, HciError> {
        self.last.record(lorawan::set_device_eui(&mut self.hci, eui).await)
    }

    pub async fn get_device_eui(
        &mut self,
    ) -> Result<DeviceResponse<[u8; LORAWAN_EUI_LEN]>, HciError> {
        self.last.record(lorawan::get_device_eui(&mut self.hci).await)
    }
}
