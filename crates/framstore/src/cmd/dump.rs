use std::io;

use crate::cmd::device::open_store;
use crate::cmd::{DeviceArgs, DumpArgs};
use crate::exit::{block_error, io_error, CliResult, SUCCESS};
use crate::output::{print_dump, OutputFormat};

pub fn run(args: DumpArgs, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut store = open_store(device)?;
    let address = args.at.unwrap_or(device.address);

    let data = store
        .block_store_mut()
        .read_block(address, args.len)
        .map_err(|err| block_error("dump failed", err))?;

    print_dump(&mut io::stdout().lock(), address, &data, format)
        .map_err(|err| io_error("failed writing output", err))?;
    Ok(SUCCESS)
}
