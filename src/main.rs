//! Command line utility for WiMOD modules: identification, RTC access and
//! simple radio transmit/listen, mainly for bench bring-up.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;
use wimod_hci::logging::init_logger;
use wimod_hci::sap::radiolink::RadioLinkMsg;
use wimod_hci::util::hex as hexutil;
use wimod_hci::{connect_lr_base, RadioVariant};

#[derive(Parser)]
#[command(name = "wimod-hci", version, about = "WiMOD radio module HCI tool")]
struct Cli {
    /// Serial port the module is attached to
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Firmware variant of the module
    #[arg(long, value_enum, default_value_t = Variant::Plus)]
    variant: Variant,

    /// Command timeout in milliseconds
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    Base,
    Plus,
}

impl From<Variant> for RadioVariant {
    fn from(v: Variant) -> RadioVariant {
        match v {
            Variant::Base => RadioVariant::LrBase,
            Variant::Plus => RadioVariant::LrBasePlus,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Ping the module
    Ping,
    /// Print module identification
    DeviceInfo,
    /// Print firmware name and version
    FirmwareInfo,
    /// Reboot the module
    Reset,
    /// Read the module RTC
    GetRtc,
    /// Set the module RTC
    SetRtc {
        /// vendor 32-bit RTC encoding
        time: u32,
    },
    /// Send an unreliable radio message
    Send {
        #[arg(long, default_value_t = 0x10)]
        group: u8,
        #[arg(long)]
        address: u16,
        /// payload as hex, e.g. CAFE01
        data: String,
        /// request a radio ack from the peer
        #[arg(long)]
        confirmed: bool,
    },
    /// Print received radio messages for a while
    Listen {
        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },
}

fn status_name(status: u8) -> &'static str {
    match status {
        0x00 => "ok",
        0x01 => "error",
        0x02 => "command not supported",
        0x03 => "wrong parameter",
        0x04 => "wrong device mode",
        0x06 => "device busy",
        _ => "unknown status",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();

    let mut module = connect_lr_base(&cli.port, cli.variant.into())
        .with_context(|| format!("failed to open {}", cli.port))?;
    module
        .connection_mut()
        .set_default_timeout(Duration::from_millis(cli.timeout_ms));

    match cli.command {
        Command::Ping => {
            let rsp = module.ping().await?;
            println!("ping: {}", status_name(rsp.status));
        }
        Command::DeviceInfo => {
            let rsp = module.device_info().await?;
            match rsp.value {
                Some(info) => {
                    println!("module type:    0x{:02X}", info.module_type);
                    println!("device address: 0x{:08X}", info.device_address);
                    println!("group address:  0x{:02X}", info.group_address);
                }
                None => bail!("device rejected request: {}", status_name(rsp.status)),
            }
        }
        Command::FirmwareInfo => {
            let rsp = module.firmware_info().await?;
            match rsp.value {
                Some(info) => {
                    println!(
                        "{} V{}.{} build {} ({})",
                        info.firmware_name,
                        info.version_major,
                        info.version_minor,
                        info.build_count,
                        info.build_date
                    );
                }
                None => bail!("device rejected request: {}", status_name(rsp.status)),
            }
        }
        Command::Reset => {
            let rsp = module.reset().await?;
            println!("reset: {}", status_name(rsp.status));
        }
        Command::GetRtc => {
            let rsp = module.get_rtc().await?;
            match rsp.value {
                Some(time) => println!("rtc: 0x{:08X}", time),
                None => bail!("device rejected request: {}", status_name(rsp.status)),
            }
        }
        Command::SetRtc { time } => {
            let rsp = module.set_rtc(time).await?;
            println!("set rtc: {}", status_name(rsp.status));
        }
        Command::Send {
            group,
            address,
            data,
            confirmed,
        } => {
            let payload = hexutil::decode(&data).context("invalid hex payload")?;
            let rsp = if confirmed {
                module.send_cdata(group, address, &payload).await?
            } else {
                module.send_udata(group, address, &payload).await?
            };
            println!("send: {}", status_name(rsp.status));
        }
        Command::Listen { seconds } => {
            let print_rx = |label: &'static str| {
                move |msg: &wimod_hci::HciMessage| match RadioLinkMsg::from_msg(msg) {
                    Ok(rx) => {
                        let rssi = rx
                            .optional_info
                            .map(|i| format!(" rssi {} dBm", i.rssi))
                            .unwrap_or_default();
                        println!(
                            "{} from {:02X}:{:04X}: {}{}",
                            label,
                            rx.src_group,
                            rx.src_address,
                            hexutil::format_bytes(&rx.data),
                            rssi
                        );
                    }
                    Err(e) => eprintln!("bad {} indication: {}", label, e),
                }
            };
            module.indications_mut().on_udata_rx(print_rx("u-data"));
            module.indications_mut().on_cdata_rx(print_rx("c-data"));

            let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);
            while tokio::time::Instant::now() < deadline {
                module.service().await?;
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }
    }

    Ok(())
}
