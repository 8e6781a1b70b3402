//! Wire-level tests of the SLIP frame codec against hand-built byte
//! sequences, plus a property check that framing survives arbitrary
//! payloads.

use proptest::prelude::*;
use wimod_hci::constants::*;
use wimod_hci::hci::{encode_frame, FrameDecoder, HciMessage};

fn decode_all(decoder: &mut FrameDecoder, data: &[u8]) -> Vec<HciMessage> {
    data.iter().filter_map(|&b| decoder.feed(b)).collect()
}

#[test]
fn test_encoded_frame_is_end_delimited() {
    let frame = encode_frame(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_REQ, &[]).unwrap();
    assert_eq!(*frame.first().unwrap(), SLIP_END);
    assert_eq!(*frame.last().unwrap(), SLIP_END);
    // sap, msg, crc16 stuffed between the delimiters
    assert!(frame.len() >= 6);
}

#[test]
fn test_reserved_bytes_are_escaped() {
    let frame = encode_frame(0x03, 0x01, &[SLIP_END, SLIP_ESC]).unwrap();
    let body = &frame[1..frame.len() - 1];
    assert!(!body.contains(&SLIP_END));
    assert!(body.windows(2).any(|w| w == [SLIP_ESC, SLIP_ESC_END]));
    assert!(body.windows(2).any(|w| w == [SLIP_ESC, SLIP_ESC_ESC]));
}

#[test]
fn test_decoder_survives_garbage_between_frames() {
    let mut decoder = FrameDecoder::new();
    let good = encode_frame(RADIOLINK_SAP_ID, RADIOLINK_MSG_UDATA_RX_IND, &[1, 2, 3]).unwrap();

    let mut stream = vec![0x55, 0xAA, SLIP_END, 0x01, 0x02, SLIP_END]; // noise + bad frame
    stream.extend_from_slice(&good);

    let frames = decode_all(&mut decoder, &stream);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].payload, vec![1, 2, 3]);
    assert!(decoder.stats().crc_errors + decoder.stats().malformed > 0);
}

#[test]
fn test_corrupted_byte_drops_only_that_frame() {
    let mut decoder = FrameDecoder::new();
    let mut corrupt = encode_frame(0x01, 0x02, &[0x00, 0x11]).unwrap();
    // flip a payload bit so the checksum fails
    let mid = corrupt.len() / 2;
    corrupt[mid] ^= 0x40;
    let good = encode_frame(0x01, 0x02, &[0x00, 0x22]).unwrap();

    let mut stream = corrupt;
    stream.extend_from_slice(&good);
    let frames = decode_all(&mut decoder, &stream);

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].payload, vec![0x00, 0x22]);
}

#[test]
fn test_oversized_payload_rejected_locally() {
    let payload = vec![0u8; HCI_MAX_TX_PAYLOAD + 1];
    assert!(encode_frame(0x01, 0x01, &payload).is_err());
}

proptest! {
    #[test]
    fn prop_frame_round_trip(
        sap_id in any::<u8>(),
        msg_id in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 0..=HCI_MAX_TX_PAYLOAD),
    ) {
        let encoded = encode_frame(sap_id, msg_id, &payload).unwrap();
        let mut decoder = FrameDecoder::new();
        let frames = decode_all(&mut decoder, &encoded);
        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(frames[0].sap_id, sap_id);
        prop_assert_eq!(frames[0].msg_id, msg_id);
        prop_assert_eq!(&frames[0].payload, &payload);
        prop_assert_eq!(decoder.stats().crc_errors, 0);
    }

    #[test]
    fn prop_two_frames_back_to_back(
        a in proptest::collection::vec(any::<u8>(), 0..32),
        b in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut stream = encode_frame(0x01, 0x04, &a).unwrap();
        stream.extend_from_slice(&encode_frame(0x03, 0x04, &b).unwrap());
        let mut decoder = FrameDecoder::new();
        let frames = decode_all(&mut decoder, &stream);
        prop_assert_eq!(frames.len(), 2);
        prop_assert_eq!(&frames[0].payload, &a);
        prop_assert_eq!(&frames[1].payload, &b);
    }
}
