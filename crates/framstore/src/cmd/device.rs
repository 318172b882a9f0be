use std::time::Duration;

use framstore_record::{BlockConfig, RecordConfig, RecordStore};
use framstore_transport::FileFram;
use tracing::debug;

use crate::cmd::DeviceArgs;
use crate::exit::{transport_error, CliError, CliResult, USAGE};

/// Open the image-backed device and layer a record store over it.
pub fn open_store(args: &DeviceArgs) -> CliResult<RecordStore<FileFram>> {
    if args.capacity == 0 {
        return Err(CliError::new(USAGE, "capacity must be greater than zero"));
    }
    let block = BlockConfig {
        write_settle: parse_duration(&args.write_settle)?,
        read_settle: parse_duration(&args.read_settle)?,
    };
    let record = RecordConfig {
        max_payload: args.max_payload,
    };

    let fram = FileFram::open(&args.image, args.capacity).map_err(|err| {
        transport_error(&format!("failed opening {}", args.image.display()), err)
    })?;
    debug!(
        image = %fram.storage().path().display(),
        capacity = fram.capacity(),
        "device ready"
    );

    Ok(RecordStore::with_config(fram, block, record))
}

/// Parse `500us`, `1ms`, `2s` or a bare number of milliseconds. Zero is allowed.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("us") {
        (num, "us")
    } else if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "ms")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "us" => Ok(Duration::from_micros(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5us").unwrap(), Duration::from_micros(5));
        assert_eq!(parse_duration("1ms").unwrap(), Duration::from_millis(1));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_millis(3));
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("-1ms").is_err());
    }
}
