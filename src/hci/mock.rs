//! Mock transport implementation for testing
//!
//! This module provides a mock byte-stream transport that can be used to
//! test the HCI engine and the SAP command layers without requiring actual
//! hardware. Handles are cheap clones sharing the same buffers, so a test
//! can keep one handle while the driver owns another.

use crate::error::HciError;
use crate::hci::frame::encode_frame;
use crate::hci::transport::HciTransport;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock transport that simulates bidirectional communication.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Data written by the driver (outgoing)
    tx_buffer: Arc<Mutex<Vec<u8>>>,
    /// Data to be read by the driver (incoming)
    rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Simulated write error
    fail_next_write: Arc<Mutex<Option<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues raw bytes to be read by the driver.
    pub fn queue_rx_bytes(&self, data: &[u8]) {
        self.rx_buffer.lock().unwrap().extend(data);
    }

    /// Queues a well-formed wire frame carrying the given message.
    pub fn queue_rx_frame(&self, sap_id: u8, msg_id: u8, payload: &[u8]) {
        let wire = encode_frame(sap_id, msg_id, payload).expect("mock frame payload too large");
        self.queue_rx_bytes(&wire);
    }

    /// Returns everything the driver has written so far.
    pub fn tx_data(&self) -> Vec<u8> {
        self.tx_buffer.lock().unwrap().clone()
    }

    /// Clears both buffers.
    pub fn clear(&self) {
        self.tx_buffer.lock().unwrap().clear();
        self.rx_buffer.lock().unwrap().clear();
    }

    /// Makes the next write fail with the given error text.
    pub fn set_next_write_error(&self, message: &str) {
        *self.fail_next_write.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl HciTransport for MockTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), HciError> {
        if let Some(message) = self.fail_next_write.lock().unwrap().take() {
            return Err(HciError::SerialPortError(message));
        }
        self.tx_buffer.lock().unwrap().extend_from_slice(data);
        Ok(())
    }

    async fn read_byte(&mut self) -> Result<Option<u8>, HciError> {
        Ok(self.rx_buffer.lock().unwrap().pop_front())
    }
}
