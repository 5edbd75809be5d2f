use ccidw::ccid::HexDump;
use ccidw::config::{DescriptorPolicy, ScanConfig, SessionConfig, MAX_ATR_LEN, MAX_REPLY_LEN};
use ccidw::device::{ProductID, VendorID};
use ccidw::libusb::context::{Context, LogLevel};
use ccidw::selector::{self, ScanOutcome};
use ccidw::Error;
use clap::Parser;
use clap_num::maybe_hex;
use log::{error, info, warn};
use std::process::ExitCode;
use std::time::Duration;

/// Power up the card in a CCID reader, read its ATR, send one APDU and power it down again.
#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    /// Vendor id of the reader (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = maybe_hex::<u16>, default_value = "0x0a89")]
    vendor: u16,

    /// Only use readers with this product id.
    #[arg(short, long, value_parser = maybe_hex::<u16>)]
    product: Option<u16>,

    /// Interface number to claim.
    #[arg(short, long, default_value_t = 0, conflicts_with = "detected_interface")]
    interface: u8,

    /// Claim the interface found by the endpoint scan instead of --interface.
    #[arg(long)]
    detected_interface: bool,

    /// CCID slot to address.
    #[arg(long, default_value_t = 0)]
    slot: u8,

    /// Timeout for every bulk transfer, in milliseconds.
    #[arg(short, long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// APDU to send, as hex (spaces allowed). Defaults to SELECT MF.
    #[arg(short, long, value_parser = parse_hex)]
    apdu: Option<Apdu>,

    /// Keep scanning when a device's descriptor cannot be read.
    #[arg(long)]
    skip_unreadable: bool,

    /// Accept replies whose sequence number does not match the command.
    #[arg(long)]
    no_sequence_check: bool,

    /// More output. Twice also turns on libusb's own debug log.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Debug)]
struct Apdu(Vec<u8>);

fn parse_hex(s: &str) -> Result<Apdu, String> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(digits).map(Apdu).map_err(|e| e.to_string())
}

impl Args {
    fn scan_config(&self) -> ScanConfig {
        let mut session = SessionConfig {
            claim_interface: if self.detected_interface {
                None
            } else {
                Some(self.interface)
            },
            slot: self.slot,
            timeout: Duration::from_millis(self.timeout),
            max_atr_len: MAX_ATR_LEN,
            max_reply_len: MAX_REPLY_LEN,
            verify_sequence: !self.no_sequence_check,
            ..SessionConfig::default()
        };
        if let Some(apdu) = &self.apdu {
            session.apdu = apdu.0.clone();
        }
        ScanConfig {
            vendor_id: VendorID(self.vendor),
            product_id: self.product.map(ProductID),
            descriptor_policy: if self.skip_unreadable {
                DescriptorPolicy::SkipDevice
            } else {
                DescriptorPolicy::AbortScan
            },
            session,
        }
    }
}

fn run(args: &Args) -> Result<ScanOutcome, Error> {
    let context = Context::new().map_err(Error::Init)?;
    if args.verbose > 1 {
        context.set_debug_level(LogLevel::Debug);
    }
    // The context outlives the scan and is torn down once, here.
    selector::scan(&context, &args.scan_config())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose > 0 { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(ScanOutcome::NoMatchingDevice) => {
            info!("Reader not found!");
            ExitCode::SUCCESS
        }
        Ok(ScanOutcome::Matched(reports)) => {
            let mut failed = false;
            for report in &reports {
                match &report.session {
                    Ok(session) => {
                        info!("{}: ATR {}", report.descriptor, HexDump(session.atr.payload()));
                        info!(
                            "{}: reply {}",
                            report.descriptor,
                            HexDump(session.reply.payload())
                        );
                        if let Err(e) = &session.release {
                            warn!("{}: {}", report.descriptor, e);
                        }
                    }
                    Err(e) => {
                        error!("{}: {}", report.descriptor, e);
                        failed = true;
                    }
                }
            }
            info!("Complete");
            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
