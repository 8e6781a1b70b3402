//! Transport framing and command correlation: the shared nucleus every
//! service access point builds on.

pub mod crc;
pub mod frame;
pub mod mock;
pub mod protocol;
pub mod transport;

pub use frame::{encode_frame, DecodeStats, FrameDecoder, HciMessage};
pub use protocol::{
    HciCommand, HciConnection, IndicationRegistry, StackError, DEFAULT_CMD_TIMEOUT,
};
pub use transport::{HciTransport, SerialConfig, SerialTransport};
