//! # WiMOD HCI Frame Codec
//!
//! This module turns outgoing HCI messages into SLIP-delimited, byte-stuffed
//! wire frames with an appended CRC-16/X.25 check value, and reassembles
//! inbound frames from a continuous, error-prone byte stream.
//!
//! The decoder is fed one transport byte at a time and yields a complete,
//! integrity-checked [`HciMessage`] whenever a frame terminator is seen. A
//! truncated or corrupted frame is dropped silently (counted in
//! [`DecodeStats`]) and the decoder resynchronises on the next delimiter; a
//! partial frame is never surfaced.

use crate::constants::{
    HCI_MAX_RX_FRAME, HCI_MAX_TX_PAYLOAD, HCI_RSP_STATUS_POS, SLIP_END, SLIP_ESC, SLIP_ESC_END,
    SLIP_ESC_ESC,
};
use crate::error::HciError;
use crate::hci::crc::{crc16, crc16_check};
use log::{trace, warn};

/// One complete, delimited, integrity-checked unit of the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HciMessage {
    /// Service access point (domain) identifier.
    pub sap_id: u8,
    /// Message identifier within the SAP.
    pub msg_id: u8,
    /// Payload bytes, check value already stripped.
    pub payload: Vec<u8>,
}

impl HciMessage {
    /// Returns the status byte a response payload carries at offset 0.
    pub fn status(&self) -> Result<u8, HciError> {
        self.payload
            .get(HCI_RSP_STATUS_POS)
            .copied()
            .ok_or(HciError::ResponseTooShort {
                needed: HCI_RSP_STATUS_POS + 1,
                actual: self.payload.len(),
            })
    }
}

/// Encodes an outgoing message into a ready-to-send wire frame.
///
/// Layout before stuffing: `[sap_id, msg_id, payload…, crc_lsb, crc_msb]`.
/// The frame is wrapped in END delimiters; payload bytes equal to END or ESC
/// are escaped so they cannot appear literally inside the frame.
pub fn encode_frame(sap_id: u8, msg_id: u8, payload: &[u8]) -> Result<Vec<u8>, HciError> {
    if payload.len() > HCI_MAX_TX_PAYLOAD {
        return Err(HciError::PayloadTooLarge {
            len: payload.len(),
            max: HCI_MAX_TX_PAYLOAD,
        });
    }

    let mut body = Vec::with_capacity(payload.len() + 4);
    body.push(sap_id);
    body.push(msg_id);
    body.extend_from_slice(payload);
    let crc = crc16(&body);
    body.push((crc & 0xFF) as u8);
    body.push((crc >> 8) as u8);

    // Leading END flushes line noise on the receiver side.
    let mut wire = Vec::with_capacity(body.len() + 8);
    wire.push(SLIP_END);
    for &byte in &body {
        match byte {
            SLIP_END => {
                wire.push(SLIP_ESC);
                wire.push(SLIP_ESC_END);
            }
            SLIP_ESC => {
                wire.push(SLIP_ESC);
                wire.push(SLIP_ESC_ESC);
            }
            other => wire.push(other),
        }
    }
    wire.push(SLIP_END);

    trace!(
        "encoded frame sap=0x{sap_id:02X} msg=0x{msg_id:02X} len={}",
        wire.len()
    );
    Ok(wire)
}

/// Counters kept by the [`FrameDecoder`] for monitoring.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecodeStats {
    pub frames_decoded: u64,
    pub crc_errors: u64,
    pub malformed: u64,
}

/// Incremental SLIP frame decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    escaped: bool,
    discard: bool,
    stats: DecodeStats,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one transport byte; yields a complete message when a frame
    /// terminator closes a valid frame.
    pub fn feed(&mut self, byte: u8) -> Option<HciMessage> {
        match byte {
            SLIP_END => self.finish_frame(),
            SLIP_ESC => {
                if self.escaped {
                    // ESC ESC is a protocol violation
                    self.discard = true;
                }
                self.escaped = true;
                None
            }
            other => {
                let value = if self.escaped {
                    self.escaped = false;
                    match other {
                        SLIP_ESC_END => SLIP_END,
                        SLIP_ESC_ESC => SLIP_ESC,
                        _ => {
                            self.discard = true;
                            other
                        }
                    }
                } else {
                    other
                };
                if self.buf.len() >= HCI_MAX_RX_FRAME {
                    self.discard = true;
                } else {
                    self.buf.push(value);
                }
                None
            }
        }
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    fn finish_frame(&mut self) -> Option<HciMessage> {
        // A stray escape right before the terminator invalidates the frame.
        let bad = self.discard || self.escaped;
        let body = std::mem::take(&mut self.buf);
        self.escaped = false;
        self.discard = false;

        if body.is_empty() {
            // Back-to-back delimiters between frames
            return None;
        }
        if bad || body.len() < 4 {
            self.stats.malformed += 1;
            warn!("discarding malformed frame ({} bytes)", body.len());
            return None;
        }
        if !crc16_check(&body) {
            self.stats.crc_errors += 1;
            warn!("discarding frame with bad check value ({} bytes)", body.len());
            return None;
        }

        self.stats.frames_decoded += 1;
        let payload = body[2..body.len() - 2].to_vec();
        Some(HciMessage {
            sap_id: body[0],
            msg_id: body[1],
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> Vec<HciMessage> {
        bytes.iter().filter_map(|&b| decoder.feed(b)).collect()
    }

    #[test]
    fn test_round_trip_plain_payload() {
        let wire = encode_frame(0x01, 0x02, &[0x00, 0x11, 0x22]).unwrap();
        let mut decoder = FrameDecoder::new();
        let msgs = decode_all(&mut decoder, &wire);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].sap_id, 0x01);
        assert_eq!(msgs[0].msg_id, 0x02);
        assert_eq!(msgs[0].payload, vec![0x00, 0x11, 0x22]);
    }

    #[test]
    fn test_round_trip_reserved_bytes() {
        let payload = [SLIP_END, SLIP_ESC, SLIP_ESC_END, SLIP_ESC_ESC, SLIP_END];
        let wire = encode_frame(0x03, 0x04, &payload).unwrap();
        let mut decoder = FrameDecoder::new();
        let msgs = decode_all(&mut decoder, &wire);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].payload, payload);
    }

    #[test]
    fn test_no_literal_delimiter_inside_frame() {
        let wire = encode_frame(0x01, 0x01, &[SLIP_END, SLIP_ESC]).unwrap();
        // Only the two wrapping delimiters may be literal ENDs.
        let ends = wire.iter().filter(|&&b| b == SLIP_END).count();
        assert_eq!(ends, 2);
        assert_eq!(wire.first(), Some(&SLIP_END));
        assert_eq!(wire.last(), Some(&SLIP_END));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let payload = vec![0u8; HCI_MAX_TX_PAYLOAD + 1];
        assert!(matches!(
            encode_frame(0x01, 0x01, &payload),
            Err(HciError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_corrupt_frame_then_valid_frame_resyncs() {
        let mut wire = encode_frame(0x01, 0x02, &[0xAA]).unwrap();
        wire[2] ^= 0xFF; // clobber the sap id, CRC check must fail
        wire.extend(encode_frame(0x01, 0x02, &[0xBB]).unwrap());

        let mut decoder = FrameDecoder::new();
        let msgs = decode_all(&mut decoder, &wire);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].payload, vec![0xBB]);
        assert_eq!(decoder.stats().crc_errors, 1);
        assert_eq!(decoder.stats().frames_decoded, 1);
    }

    #[test]
    fn test_stray_escape_at_end_discarded() {
        let mut decoder = FrameDecoder::new();
        let mut bytes = vec![SLIP_END, 0x01, 0x02, 0x03, SLIP_ESC, SLIP_END];
        bytes.extend(encode_frame(0x05, 0x06, &[]).unwrap());
        let msgs = decode_all(&mut decoder, &bytes);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].sap_id, 0x05);
        assert_eq!(decoder.stats().malformed, 1);
    }

    #[test]
    fn test_undersized_body_discarded() {
        let mut decoder = FrameDecoder::new();
        let msgs = decode_all(&mut decoder, &[SLIP_END, 0x01, 0x02, SLIP_END]);
        assert!(msgs.is_empty());
        assert_eq!(decoder.stats().malformed, 1);
    }

    #[test]
    fn test_status_accessor() {
        let msg = HciMessage {
            sap_id: 0x01,
            msg_id: 0x02,
            payload: vec![0x04],
        };
        assert_eq!(msg.status().unwrap(), 0x04);

        let empty = HciMessage {
            sap_id: 0x01,
            msg_id: 0x02,
            payload: vec![],
        };
        assert!(matches!(
            empty.status(),
            Err(HciError::ResponseTooShort { .. })
        ));
    }
}
