use std::io;

use crate::cmd::device::open_store;
use crate::cmd::DeviceArgs;
use crate::exit::{io_error, record_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut store = open_store(device)?;

    let text = store.read_string(device.address).map_err(|err| {
        record_error(&format!("no valid data at {}", device.address), err)
    })?;

    print_record(&mut io::stdout().lock(), device.address, &text, format)
        .map_err(|err| io_error("failed writing output", err))?;
    Ok(SUCCESS)
}
