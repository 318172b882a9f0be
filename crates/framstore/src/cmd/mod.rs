use std::path::PathBuf;

use clap::{Args, Subcommand};
use framstore_record::Address;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod device;
pub mod dump;
pub mod read;
pub mod shell;
pub mod version;
pub mod write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive prompt: type text to store it, `read` to read it back, `quit` to exit.
    Shell,
    /// Write one string record at the configured address.
    Write(WriteArgs),
    /// Read the string record at the configured address.
    Read,
    /// Hex-dump a raw device region.
    Dump(DumpArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Shell => shell::run(device),
        Command::Write(args) => write::run(args, device, format),
        Command::Read => read::run(device, format),
        Command::Dump(args) => dump::run(args, device, format),
        Command::Version(args) => version::run(args),
    }
}

/// Device and record settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Device image file backing the simulated FRAM.
    #[arg(
        long,
        value_name = "PATH",
        env = "FRAMSTORE_IMAGE",
        default_value = "framstore.img",
        global = true
    )]
    pub image: PathBuf,
    /// Device capacity in bytes.
    #[arg(long, value_name = "BYTES", default_value = "131072", global = true)]
    pub capacity: usize,
    /// Record base address (decimal or 0x-prefixed hex).
    #[arg(
        long,
        value_name = "ADDR",
        env = "FRAMSTORE_ADDRESS",
        default_value = "0x20",
        global = true
    )]
    pub address: Address,
    /// Payload ceiling in bytes (clamped to 65535).
    #[arg(long, value_name = "BYTES", default_value = "65535", global = true)]
    pub max_payload: usize,
    /// Pause after each block write (e.g. 1ms, 500us).
    #[arg(long, value_name = "DURATION", default_value = "1ms", global = true)]
    pub write_settle: String,
    /// Pause after each block read (e.g. 1us).
    #[arg(long, value_name = "DURATION", default_value = "1us", global = true)]
    pub read_settle: String,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Text to store.
    pub text: String,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Start of the region. Default: the configured record address.
    #[arg(long = "at", value_name = "ADDR")]
    pub at: Option<Address>,
    /// Number of bytes to dump.
    #[arg(long, short = 'n', default_value = "32")]
    pub len: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
