//! # RemoteControl SAP
//!
//! The remote control firmware only ever emits one message: a button-pressed
//! indication from a paired remote.

use crate::error::HciError;
use crate::hci::HciMessage;
use crate::sap::payload::PayloadReader;

/// Button-pressed indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPressed {
    pub dest_group: u8,
    pub dest_address: u16,
    pub src_group: u8,
    pub src_address: u16,
    /// one bit per pressed button
    pub buttons: u8,
}

impl ButtonPressed {
    pub fn from_msg(msg: &HciMessage) -> Result<Self, HciError> {
        let mut r = PayloadReader::new(&msg.payload);
        Ok(ButtonPressed {
            dest_group: r.u8()?,
            dest_address: r.u16()?,
            src_group: r.u8()?,
            src_address: r.u16()?,
            buttons: r.u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{REMOTECTRL_MSG_BUTTON_PRESSED_IND, REMOTECTRL_SAP_ID};

    #[test]
    fn test_button_decode() {
        let msg = HciMessage {
            sap_id: REMOTECTRL_SAP_ID,
            msg_id: REMOTECTRL_MSG_BUTTON_PRESSED_IND,
            payload: vec![0x10, 0x00, 0x01, 0x20, 0x00, 0x02, 0x05],
        };
        let ind = ButtonPressed::from_msg(&msg).unwrap();
        assert_eq!(ind.src_address, 0x0002);
        assert_eq!(ind.buttons, 0b0000_0101);
    }
}
