//! # HCI Command/Response Correlation
//!
//! This module owns the single-outstanding-request state machine of the
//! driver. [`HciConnection::execute`] sends one request frame and waits,
//! bounded by a timeout, for the frame whose (SAP id, message id) pair
//! matches the expected response; every other inbound frame is handed to the
//! indication dispatcher while the wait continues.
//!
//! There is no internal worker thread: the application must call
//! [`HciConnection::pump`] periodically so that indications are delivered
//! between explicit command calls.

use crate::constants::*;
use crate::error::HciError;
use crate::hci::frame::{encode_frame, DecodeStats, FrameDecoder, HciMessage};
use crate::hci::transport::HciTransport;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::Instant;

/// Default wait budget for one command exchange.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_millis(500);

/// Delay between transport polls while a command is waiting.
const POLL_BACKOFF: Duration = Duration::from_millis(1);

/// Describes one request/response exchange.
#[derive(Debug, Clone, Copy)]
pub struct HciCommand<'a> {
    pub sap_id: u8,
    pub req_id: u8,
    pub rsp_id: u8,
    pub payload: &'a [u8],
    pub timeout: Duration,
}

/// Handler invoked with the raw message of an unsolicited frame. Decoding is
/// the handler's job, via the SAP layer's `from_msg` routines.
pub type IndicationCallback = Box<dyn FnMut(&HciMessage) + Send>;

/// Protocol-level anomalies surfaced outside the command result path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// A frame arrived for a SAP id no dispatcher knows; usually a framing
    /// desynchronisation or a firmware mismatch.
    UnknownSapId(u8),
}

pub type StackErrorCallback = Box<dyn FnMut(StackError) + Send>;

/// Fixed table of optional indication handlers, one slot per
/// (SAP, message id) event. Set during setup, invoked synchronously from the
/// dispatch path; entries left unset drop their event silently.
#[derive(Default)]
pub struct IndicationRegistry {
    power_up: Option<IndicationCallback>,
    rtc_alarm: Option<IndicationCallback>,
    udata_rx: Option<IndicationCallback>,
    udata_tx: Option<IndicationCallback>,
    raw_data_rx: Option<IndicationCallback>,
    cdata_rx: Option<IndicationCallback>,
    cdata_tx: Option<IndicationCallback>,
    ack_rx: Option<IndicationCallback>,
    ack_timeout: Option<IndicationCallback>,
    ack_tx: Option<IndicationCallback>,
    rlt_status: Option<IndicationCallback>,
    sensor_data: Option<IndicationCallback>,
    sensor_ack: Option<IndicationCallback>,
    button_pressed: Option<IndicationCallback>,
    join_tx: Option<IndicationCallback>,
    joined_network: Option<IndicationCallback>,
    lorawan_udata_rx: Option<IndicationCallback>,
    lorawan_udata_tx: Option<IndicationCallback>,
    lorawan_cdata_rx: Option<IndicationCallback>,
    lorawan_cdata_tx: Option<IndicationCallback>,
    lorawan_ack_rx: Option<IndicationCallback>,
    lorawan_no_data: Option<IndicationCallback>,
    stack_error: Option<StackErrorCallback>,
}

macro_rules! registry_setters {
    ($($setter:ident => $slot:ident),* $(,)?) => {
        $(
            pub fn $setter(&mut self, cb: impl FnMut(&HciMessage) + Send + 'static) {
                self.$slot = Some(Box::new(cb));
            }
        )*
    };
}

impl IndicationRegistry {
    registry_setters! {
        on_power_up => power_up,
        on_rtc_alarm => rtc_alarm,
        on_udata_rx => udata_rx,
        on_udata_tx => udata_tx,
        on_raw_data_rx => raw_data_rx,
        on_cdata_rx => cdata_rx,
        on_cdata_tx => cdata_tx,
        on_ack_rx => ack_rx,
        on_ack_timeout => ack_timeout,
        on_ack_tx => ack_tx,
        on_rlt_status => rlt_status,
        on_sensor_data => sensor_data,
        on_sensor_ack => sensor_ack,
        on_button_pressed => button_pressed,
        on_join_tx => join_tx,
        on_joined_network => joined_network,
        on_lorawan_udata_rx => lorawan_udata_rx,
        on_lorawan_udata_tx => lorawan_udata_tx,
        on_lorawan_cdata_rx => lorawan_cdata_rx,
        on_lorawan_cdata_tx => lorawan_cdata_tx,
        on_lorawan_ack_rx => lorawan_ack_rx,
        on_lorawan_no_data => lorawan_no_data,
    }

    pub fn on_stack_error(&mut self, cb: impl FnMut(StackError) + Send + 'static) {
        self.stack_error = Some(Box::new(cb));
    }

    /// Routes one unsolicited message to its registered handler.
    ///
    /// A recognised SAP with an unrecognised message id is dropped silently
    /// (forward compatibility with firmware additions); an unrecognised SAP
    /// id fires the stack-error handler.
    pub(crate) fn dispatch(&mut self, msg: &HciMessage) {
        match msg.sap_id {
            DEVMGMT_SAP_ID => match msg.msg_id {
                DEVMGMT_MSG_POWER_UP_IND => fire(&mut self.power_up, msg),
                DEVMGMT_MSG_RTC_ALARM_IND => fire(&mut self.rtc_alarm, msg),
                _ => {}
            },
            RLT_SAP_ID => match msg.msg_id {
                RLT_MSG_STATUS_IND => fire(&mut self.rlt_status, msg),
                _ => {}
            },
            RADIOLINK_SAP_ID => match msg.msg_id {
                RADIOLINK_MSG_UDATA_RX_IND => fire(&mut self.udata_rx, msg),
                RADIOLINK_MSG_UDATA_TX_IND => fire(&mut self.udata_tx, msg),
                RADIOLINK_MSG_RAW_DATA_RX_IND => fire(&mut self.raw_data_rx, msg),
                RADIOLINK_MSG_CDATA_RX_IND => fire(&mut self.cdata_rx, msg),
                RADIOLINK_MSG_CDATA_TX_IND => fire(&mut self.cdata_tx, msg),
                RADIOLINK_MSG_ACK_RX_IND => fire(&mut self.ack_rx, msg),
                RADIOLINK_MSG_ACK_TIMEOUT_IND => fire(&mut self.ack_timeout, msg),
                RADIOLINK_MSG_ACK_TX_IND => fire(&mut self.ack_tx, msg),
                _ => {}
            },
            REMOTECTRL_SAP_ID => match msg.msg_id {
                REMOTECTRL_MSG_BUTTON_PRESSED_IND => fire(&mut self.button_pressed, msg),
                _ => {}
            },
            SENSORAPP_SAP_ID => match msg.msg_id {
                SENSORAPP_MSG_SEND_DATA_IND => fire(&mut self.sensor_data, msg),
                SENSORAPP_MSG_ACK_IND => fire(&mut self.sensor_ack, msg),
                _ => {}
            },
            LORAWAN_SAP_ID => match msg.msg_id {
                LORAWAN_MSG_JOIN_NETWORK_TX_IND => fire(&mut self.join_tx, msg),
                LORAWAN_MSG_JOIN_NETWORK_IND => fire(&mut self.joined_network, msg),
                LORAWAN_MSG_RECV_UDATA_IND => fire(&mut self.lorawan_udata_rx, msg),
                LORAWAN_MSG_SEND_UDATA_TX_IND => fire(&mut self.lorawan_udata_tx, msg),
                LORAWAN_MSG_RECV_CDATA_IND => fire(&mut self.lorawan_cdata_rx, msg),
                LORAWAN_MSG_SEND_CDATA_TX_IND => fire(&mut self.lorawan_cdata_tx, msg),
                LORAWAN_MSG_RECV_ACK_IND => fire(&mut self.lorawan_ack_rx, msg),
                LORAWAN_MSG_RECV_NO_DATA_IND => fire(&mut self.lorawan_no_data, msg),
                _ => {}
            },
            unknown => {
                warn!("indication for unknown SAP id 0x{unknown:02X}");
                if let Some(cb) = &mut self.stack_error {
                    cb(StackError::UnknownSapId(unknown));
                }
            }
        }
    }
}

fn fire(slot: &mut Option<IndicationCallback>, msg: &HciMessage) {
    if let Some(cb) = slot {
        cb(msg);
    }
}

/// One HCI session over a transport: frame decoder state, indication
/// registry and the command correlator.
pub struct HciConnection<T: HciTransport> {
    transport: T,
    decoder: FrameDecoder,
    indications: IndicationRegistry,
    default_timeout: Duration,
}

impl<T: HciTransport> HciConnection<T> {
    pub fn new(transport: T) -> Self {
        HciConnection {
            transport,
            decoder: FrameDecoder::new(),
            indications: IndicationRegistry::default(),
            default_timeout: DEFAULT_CMD_TIMEOUT,
        }
    }

    /// Wait budget used by [`HciConnection::request`].
    pub fn set_default_timeout(&mut self, timeout: Duration) {
        self.default_timeout = timeout;
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Access to the indication handler table.
    pub fn indications_mut(&mut self) -> &mut IndicationRegistry {
        &mut self.indications
    }

    pub fn decode_stats(&self) -> DecodeStats {
        self.decoder.stats()
    }

    /// Sends one request and waits for its matching response.
    ///
    /// Non-matching frames received while waiting are dispatched as
    /// indications; corrupted frames are dropped by the decoder and do not
    /// abort the wait. Returns [`HciError::NoResponse`] when the budget
    /// elapses.
    pub async fn execute(&mut self, cmd: HciCommand<'_>) -> Result<HciMessage, HciError> {
        // Flush anything still sitting in the transport. A response that
        // arrived after its command timed out is dispatched here and falls
        // out as an unrecognised indication instead of being matched to the
        // wrong request.
        self.pump().await?;

        let wire = encode_frame(cmd.sap_id, cmd.req_id, cmd.payload)?;
        self.transport.write_all(&wire).await?;
        debug!(
            "request sap=0x{:02X} msg=0x{:02X}, awaiting rsp=0x{:02X}",
            cmd.sap_id, cmd.req_id, cmd.rsp_id
        );

        let deadline = Instant::now() + cmd.timeout;
        loop {
            match self.transport.read_byte().await? {
                Some(byte) => {
                    if let Some(msg) = self.decoder.feed(byte) {
                        if msg.sap_id == cmd.sap_id && msg.msg_id == cmd.rsp_id {
                            return Ok(msg);
                        }
                        self.indications.dispatch(&msg);
                    }
                }
                None => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    tokio::time::sleep(POLL_BACKOFF).await;
                }
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        debug!(
            "no response for sap=0x{:02X} msg=0x{:02X} within {:?}",
            cmd.sap_id, cmd.req_id, cmd.timeout
        );
        Err(HciError::NoResponse(cmd.timeout))
    }

    /// Convenience wrapper around [`HciConnection::execute`] using the
    /// connection's default wait budget.
    pub async fn request(
        &mut self,
        sap_id: u8,
        req_id: u8,
        rsp_id: u8,
        payload: &[u8],
    ) -> Result<HciMessage, HciError> {
        let timeout = self.default_timeout;
        self.execute(HciCommand {
            sap_id,
            req_id,
            rsp_id,
            payload,
            timeout,
        })
        .await
    }

    /// Processes all currently available transport bytes and delivers any
    /// completed indications. Returns the number of dispatched messages.
    ///
    /// The application should call this periodically between commands;
    /// nothing else reads the transport in the background.
    pub async fn pump(&mut self) -> Result<usize, HciError> {
        let mut delivered = 0;
        while let Some(byte) = self.transport.read_byte().await? {
            if let Some(msg) = self.decoder.feed(byte) {
                self.indications.dispatch(&msg);
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
