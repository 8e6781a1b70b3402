//! Correlator behavior over a mock transport: response matching with
//! interleaved indications, timeouts, stale-response handling and the
//! unknown-SAP error path.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use wimod_hci::constants::*;
use wimod_hci::error::HciError;
use wimod_hci::hci::mock::MockTransport;
use wimod_hci::hci::{FrameDecoder, HciConnection, StackError};

fn connection(transport: &MockTransport) -> HciConnection<MockTransport> {
    let mut hci = HciConnection::new(transport.clone());
    hci.set_default_timeout(Duration::from_millis(50));
    hci
}

#[tokio::test]
async fn test_ping_exchange_on_the_wire() {
    let transport = MockTransport::default();
    transport.queue_rx_frame(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_RSP, &[DEVMGMT_STATUS_OK]);
    let mut hci = connection(&transport);

    let rsp = hci
        .request(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_REQ, DEVMGMT_MSG_PING_RSP, &[])
        .await
        .unwrap();
    assert_eq!(rsp.status().unwrap(), DEVMGMT_STATUS_OK);

    // exactly one request frame was written: sap 0x01, msg 0x01, no payload
    let mut decoder = FrameDecoder::new();
    let sent: Vec<_> = transport
        .tx_data()
        .into_iter()
        .filter_map(|b| decoder.feed(b))
        .collect();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].sap_id, DEVMGMT_SAP_ID);
    assert_eq!(sent[0].msg_id, DEVMGMT_MSG_PING_REQ);
    assert!(sent[0].payload.is_empty());
}

#[tokio::test]
async fn test_indication_interleaved_with_response() {
    let transport = MockTransport::default();
    // the radio delivers an indication first, then the awaited response
    transport.queue_rx_frame(
        RADIOLINK_SAP_ID,
        RADIOLINK_MSG_UDATA_RX_IND,
        &[0x00, 0x10, 0x00, 0x01, 0x20, 0x00, 0x02, 0xAB],
    );
    transport.queue_rx_frame(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_RSP, &[DEVMGMT_STATUS_OK]);

    let mut hci = connection(&transport);
    let seen = Arc::new(Mutex::new(0u32));
    let counter = seen.clone();
    hci.indications_mut().on_udata_rx(move |_| {
        *counter.lock().unwrap() += 1;
    });

    let rsp = hci
        .request(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_REQ, DEVMGMT_MSG_PING_RSP, &[])
        .await
        .unwrap();
    assert_eq!(rsp.status().unwrap(), DEVMGMT_STATUS_OK);
    assert_eq!(*seen.lock().unwrap(), 1);

    // nothing left to dispatch
    hci.pump().await.unwrap();
    assert_eq!(*seen.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_timeout_when_device_is_silent() {
    let transport = MockTransport::default();
    let mut hci = connection(&transport);

    let err = hci
        .request(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_REQ, DEVMGMT_MSG_PING_RSP, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, HciError::NoResponse(_)));
}

#[tokio::test]
async fn test_stale_response_does_not_satisfy_next_command() {
    let transport = MockTransport::default();
    let mut hci = connection(&transport);

    // first command times out, its response arrives too late
    let err = hci
        .request(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_REQ, DEVMGMT_MSG_PING_RSP, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, HciError::NoResponse(_)));
    transport.queue_rx_frame(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_RSP, &[DEVMGMT_STATUS_OK]);

    // the next, different command must see only its own response
    transport.queue_rx_frame(
        DEVMGMT_SAP_ID,
        DEVMGMT_MSG_GET_RTC_RSP,
        &[DEVMGMT_STATUS_OK, 0x01, 0x02, 0x03, 0x04],
    );
    let rsp = hci
        .request(
            DEVMGMT_SAP_ID,
            DEVMGMT_MSG_GET_RTC_REQ,
            DEVMGMT_MSG_GET_RTC_RSP,
            &[],
        )
        .await
        .unwrap();
    assert_eq!(rsp.msg_id, DEVMGMT_MSG_GET_RTC_RSP);
    assert_eq!(rsp.payload[1..], [0x01, 0x02, 0x03, 0x04]);
}

#[tokio::test]
async fn test_unknown_sap_reported_as_stack_error() {
    let transport = MockTransport::default();
    transport.queue_rx_frame(0x7F, 0x01, &[0x00]);

    let mut hci = connection(&transport);
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    hci.indications_mut().on_stack_error(move |e| {
        sink.lock().unwrap().push(e);
    });

    hci.pump().await.unwrap();
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], StackError::UnknownSapId(0x7F)));
}

#[tokio::test]
async fn test_unregistered_indication_is_dropped_silently() {
    let transport = MockTransport::default();
    transport.queue_rx_frame(RADIOLINK_SAP_ID, RADIOLINK_MSG_ACK_TIMEOUT_IND, &[]);
    let mut hci = connection(&transport);
    // no callbacks registered; pump must consume the frame without error
    hci.pump().await.unwrap();
    assert_eq!(hci.decode_stats().frames_decoded, 1);
}

#[tokio::test]
async fn test_write_failure_surfaces_as_serial_error() {
    let transport = MockTransport::default();
    transport.set_next_write_error("port gone");
    let mut hci = connection(&transport);

    let err = hci
        .request(DEVMGMT_SAP_ID, DEVMGMT_MSG_PING_REQ, DEVMGMT_MSG_PING_RSP, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, HciError::SerialPortError(_)));
}
