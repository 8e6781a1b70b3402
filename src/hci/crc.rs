//! CRC-16/X.25 as used by the WiMOD HCI framing sublayer.
//!
//! Reflected polynomial 0x8408, initial value 0xFFFF, final complement. The
//! 16-bit check value is appended LSB first to `[sap_id, msg_id, payload…]`
//! before SLIP stuffing.

const CRC16_INIT: u16 = 0xFFFF;
const CRC16_POLY: u16 = 0x8408;

/// Magic remainder left in the (uncomplemented) register after running the
/// algorithm over a message including its appended check value.
const CRC16_GOOD_VALUE: u16 = 0xF0B8;

/// Calculates the CRC-16/X.25 check value over `data`.
pub fn crc16(data: &[u8]) -> u16 {
    !crc16_raw(data)
}

/// Verifies a message that carries its check value in the last two bytes.
pub fn crc16_check(data_with_crc: &[u8]) -> bool {
    if data_with_crc.len() < 2 {
        return false;
    }
    crc16_raw(data_with_crc) == CRC16_GOOD_VALUE
}

fn crc16_raw(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_check_value() {
        // CRC-16/X.25 reference vector
        assert_eq!(crc16(b"123456789"), 0x906E);
    }

    #[test]
    fn test_crc16_round_trip() {
        let mut msg = vec![0x01, 0x01, 0xAA, 0x55];
        let crc = crc16(&msg);
        msg.push((crc & 0xFF) as u8);
        msg.push((crc >> 8) as u8);
        assert!(crc16_check(&msg));
    }

    #[test]
    fn test_crc16_detects_corruption() {
        let mut msg = vec![0x01, 0x02, 0x00];
        let crc = crc16(&msg);
        msg.push((crc & 0xFF) as u8);
        msg.push((crc >> 8) as u8);
        msg[2] ^= 0x01;
        assert!(!crc16_check(&msg));
    }

    #[test]
    fn test_crc16_too_short() {
        assert!(!crc16_check(&[0x42]));
        assert!(!crc16_check(&[]));
    }
}
