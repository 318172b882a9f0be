use std::io;

use crate::cmd::device::open_store;
use crate::cmd::{DeviceArgs, WriteArgs};
use crate::exit::{io_error, record_error, CliResult, SUCCESS};
use crate::output::{print_write, OutputFormat};

pub fn run(args: WriteArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut store = open_store(device)?;

    store
        .write_string(device.address, &args.text)
        .map_err(|err| record_error("write failed", err))?;

    print_write(&mut io::stdout().lock(), device.address, args.text.len(), format)
        .map_err(|err| io_error("failed writing output", err))?;
    Ok(SUCCESS)
}
