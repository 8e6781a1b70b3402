//! # WiMOD Serial Transport
//!
//! This module provides the byte-stream transport boundary of the HCI
//! engine: an abstract duplex stream with polling reads, plus the concrete
//! implementation over a serial port (tokio-serial, 115200 8N1 as required
//! by all WiMOD firmwares).

use crate::constants::WIMOD_SERIAL_BAUDRATE;
use crate::error::HciError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialPortBuilderExt;

/// Abstract duplex byte stream the HCI engine runs on.
///
/// `read_byte` must poll: return `Ok(None)` promptly when no byte is
/// available instead of blocking, so the correlator can keep checking its
/// wait budget and deliver interleaved indications.
#[async_trait]
pub trait HciTransport: Send {
    /// Writes a complete wire frame.
    async fn write_all(&mut self, data: &[u8]) -> Result<(), HciError>;

    /// Polls for a single received byte.
    async fn read_byte(&mut self) -> Result<Option<u8>, HciError>;
}

/// Configuration for the serial connection.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baudrate: u32,
    /// Upper bound for one read poll; keeps `read_byte` non-blocking.
    pub poll_interval: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baudrate: WIMOD_SERIAL_BAUDRATE,
            poll_interval: Duration::from_millis(2),
        }
    }
}

/// Serial port transport for a WiMOD module.
pub struct SerialTransport {
    port: tokio_serial::SerialStream,
    config: SerialConfig,
    rx_pending: VecDeque<u8>,
}

impl SerialTransport {
    /// Opens the serial port with default settings (115200 8N1).
    pub fn open(port_name: &str) -> Result<SerialTransport, HciError> {
        Self::open_with_config(port_name, SerialConfig::default())
    }

    /// Opens the serial port with a custom configuration.
    pub fn open_with_config(
        port_name: &str,
        config: SerialConfig,
    ) -> Result<SerialTransport, HciError> {
        let port = tokio_serial::new(port_name, config.baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .open_native_async()
            .map_err(|e| HciError::SerialPortError(e.to_string()))?;

        Ok(SerialTransport {
            port,
            config,
            rx_pending: VecDeque::new(),
        })
    }
}

#[async_trait]
impl HciTransport for SerialTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), HciError> {
        self.port
            .write_all(data)
            .await
            .map_err(|e| HciError::SerialPortError(e.to_string()))?;
        self.port
            .flush()
            .await
            .map_err(|e| HciError::SerialPortError(e.to_string()))
    }

    async fn read_byte(&mut self) -> Result<Option<u8>, HciError> {
        if let Some(byte) = self.rx_pending.pop_front() {
            return Ok(Some(byte));
        }

        let mut buf = [0u8; 64];
        match tokio::time::timeout(self.config.poll_interval, self.port.read(&mut buf)).await {
            Err(_) => Ok(None), // poll window elapsed, nothing received
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(n)) => {
                self.rx_pending.extend(&buf[1..n]);
                Ok(Some(buf[0]))
            }
            Ok(Err(e)) => Err(HciError::SerialPortError(e.to_string())),
        }
    }
}
