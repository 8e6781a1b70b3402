//! # wimod-hci
//!
//! Host-side driver for IMST WiMOD radio modules (iM880/iM282 family)
//! attached over UART. Implements the vendor HCI: SLIP-framed messages with
//! a CRC-16/X.25 trailer, addressed to per-domain service access points, and
//! split into request/response command pairs plus unsolicited indications.
//!
//! ## Layers
//!
//! - [`hci`]: frame codec (SLIP + CRC), transport trait, single-outstanding
//!   command correlator and indication dispatch
//! - [`sap`]: typed marshaling per service access point (device management,
//!   radio link, link test, sensor app, LoRaWAN, raw pass-through)
//! - [`driver`]: per-firmware façades, [`WimodLrBase`] with the
//!   [`RadioVariant`] overlay and [`WimodLoRaWan`]
//!
//! ## Example
//!
//! ```no_run
//! use wimod_hci::{RadioVariant, WimodLrBase};
//! use wimod_hci::hci::SerialTransport;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = SerialTransport::open("/dev/ttyUSB0")?;
//!     let mut module = WimodLrBase::new(transport, RadioVariant::LrBasePlus);
//!
//!     let pong = module.ping().await?;
//!     println!("ping accepted: {}", pong.is_ok());
//!
//!     module.indications_mut().on_udata_rx(|msg| {
//!         println!("radio rx: {} bytes", msg.payload.len());
//!     });
//!     // drain and dispatch pending indications
//!     module.service().await?;
//!     Ok(())
//! }
//! ```
//!
//! All multi-byte integers on the wire are big-endian; addresses of the
//! peer-to-peer firmwares are 8-bit group plus 16-bit device address.

pub mod constants;
pub mod driver;
pub mod error;
pub mod hci;
pub mod logging;
pub mod sap;
pub mod util;

pub use driver::{RadioConfigValue, RadioVariant, SystemStatusValue, WimodLoRaWan, WimodLrBase};
pub use error::{HciError, HciResult};
pub use hci::{HciConnection, HciMessage, HciTransport, SerialConfig, SerialTransport};
pub use sap::DeviceResponse;

/// Open a serial port and wrap it in an LR-Base driver.
pub fn connect_lr_base(
    port: &str,
    variant: RadioVariant,
) -> Result<WimodLrBase<SerialTransport>, HciError> {
    let transport = SerialTransport::open(port)?;
    Ok(WimodLrBase::new(transport, variant))
}

/// Open a serial port and wrap it in a LoRaWAN driver.
pub fn connect_lorawan(port: &str) -> Result<WimodLoRaWan<SerialTransport>, HciError> {
    let transport = SerialTransport::open(port)?;
    Ok(WimodLoRaWan::new(transport))
}
