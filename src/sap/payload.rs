//! Generic payload packing/unpacking.
//!
//! All multi-byte HCI fields are wire-encoded most-significant-byte first.
//! The near-duplicate per-command encode/decode bodies across the SAPs all
//! go through these two helpers: [`PayloadWriter`] lays fields out in call
//! order, [`PayloadReader`] pulls them back out with explicit length checks
//! so a short response can never be dereferenced past its end.

use crate::error::HciError;
use bytes::{BufMut, BytesMut};

/// Sequential big-endian payload builder.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: BytesMut,
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self::with_capacity(32)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PayloadWriter {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    pub fn i8(&mut self, value: i8) -> &mut Self {
        self.buf.put_i8(value);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.put_u16(value);
        self
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.buf.put_i16(value);
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32(value);
        self
    }

    pub fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.put_slice(value);
        self
    }

    /// Explicit filler for a conditional field's non-applicable branch, so
    /// the payload length stays a function of the command.
    pub fn reserved(&mut self, count: usize) -> &mut Self {
        self.buf.put_bytes(0x00, count);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Sequential big-endian payload reader with bounds checking.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        PayloadReader { data, pos: 0 }
    }

    /// Starts reading at `offset`, e.g. just past the response status byte.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        PayloadReader { data, pos: offset }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], HciError> {
        let end = self.pos + count;
        if end > self.data.len() {
            return Err(HciError::ResponseTooShort {
                needed: end,
                actual: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, HciError> {
        Ok(self.take(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8, HciError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn u16(&mut self) -> Result<u16, HciError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn i16(&mut self) -> Result<i16, HciError> {
        Ok(self.u16()? as i16)
    }

    pub fn u32(&mut self) -> Result<u32, HciError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn bytes(&mut self, count: usize) -> Result<&'a [u8], HciError> {
        self.take(count)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], HciError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, count: usize) -> Result<(), HciError> {
        self.take(count).map(|_| ())
    }

    /// Everything not yet consumed.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos.min(self.data.len())..];
        self.pos = self.data.len();
        slice
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_big_endian_layout() {
        let mut w = PayloadWriter::new();
        w.u8(0x01).u16(0x2345).u32(0x6789ABCD).reserved(2);
        assert_eq!(
            w.into_vec(),
            vec![0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0x00, 0x00]
        );
    }

    #[test]
    fn test_reader_round_trip() {
        let data = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD];
        let mut r = PayloadReader::new(&data);
        assert_eq!(r.u8().unwrap(), 0x01);
        assert_eq!(r.u16().unwrap(), 0x2345);
        assert_eq!(r.u32().unwrap(), 0x6789ABCD);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_reader_bounds_check() {
        let data = [0x01, 0x02];
        let mut r = PayloadReader::new(&data);
        assert_eq!(r.u8().unwrap(), 0x01);
        let err = r.u32().unwrap_err();
        assert!(matches!(
            err,
            HciError::ResponseTooShort {
                needed: 5,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_reader_signed_values() {
        let data = [0xFF, 0x85, 0xFB];
        let mut r = PayloadReader::new(&data);
        assert_eq!(r.i16().unwrap(), -123);
        assert_eq!(r.i8().unwrap(), -5);
    }

    #[test]
    fn test_reader_rest() {
        let data = [0x00, 0x01, 0x02, 0x03];
        let mut r = PayloadReader::at(&data, 1);
        assert_eq!(r.rest(), &[0x01, 0x02, 0x03]);
        assert_eq!(r.remaining(), 0);
    }
}
