use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use framstore_record::Address;
use serde::Serialize;

const DUMP_ROW_WIDTH: usize = 16;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct RecordOutput<'a> {
    address: String,
    length: usize,
    text: &'a str,
}

#[derive(Serialize)]
struct WriteOutput {
    address: String,
    length: usize,
    written: bool,
}

#[derive(Serialize)]
struct DumpOutput {
    address: String,
    length: usize,
    hex: String,
    record_length: Option<u16>,
}

pub fn print_record<W: Write>(
    out: &mut W,
    address: Address,
    text: &str,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let record = RecordOutput {
                address: address.to_string(),
                length: text.len(),
                text,
            };
            writeln!(out, "{}", to_json(&record))
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ADDRESS", "LENGTH", "TEXT"])
                .add_row(vec![
                    address.to_string(),
                    text.len().to_string(),
                    text.to_string(),
                ]);
            writeln!(out, "{table}")
        }
        OutputFormat::Pretty => {
            writeln!(out, "address={address} length={} text='{text}'", text.len())
        }
        OutputFormat::Raw => {
            out.write_all(text.as_bytes())?;
            out.flush()
        }
    }
}

pub fn print_write<W: Write>(
    out: &mut W,
    address: Address,
    length: usize,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let written = WriteOutput {
                address: address.to_string(),
                length,
                written: true,
            };
            writeln!(out, "{}", to_json(&written))
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            writeln!(out, "wrote {length} bytes at {address}")
        }
        OutputFormat::Raw => writeln!(out, "{length}"),
    }
}

/// Hex view of a raw region. `record_length` is the big-endian prefix the
/// first two bytes would decode to, shown to help spot torn records.
pub fn print_dump<W: Write>(
    out: &mut W,
    address: Address,
    data: &[u8],
    format: OutputFormat,
) -> io::Result<()> {
    let record_length = framstore_record::decode_length_prefix(data.get(..2).unwrap_or_default());
    match format {
        OutputFormat::Json => {
            let dump = DumpOutput {
                address: address.to_string(),
                length: data.len(),
                hex: hex(data),
                record_length,
            };
            writeln!(out, "{}", to_json(&dump))
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ADDRESS", "HEX", "ASCII"]);
            for (row, chunk) in data.chunks(DUMP_ROW_WIDTH).enumerate() {
                table.add_row(vec![
                    row_address(address, row),
                    hex(chunk),
                    ascii(chunk),
                ]);
            }
            writeln!(out, "{table}")?;
            if let Some(len) = record_length {
                writeln!(out, "length prefix: {len}")?;
            }
            Ok(())
        }
        OutputFormat::Pretty => {
            for (row, chunk) in data.chunks(DUMP_ROW_WIDTH).enumerate() {
                writeln!(
                    out,
                    "{}  {:<47}  |{}|",
                    row_address(address, row),
                    hex(chunk),
                    ascii(chunk)
                )?;
            }
            Ok(())
        }
        OutputFormat::Raw => {
            out.write_all(data)?;
            out.flush()
        }
    }
}

fn row_address(base: Address, row: usize) -> String {
    format!("0x{:06X}", u64::from(base.get()) + (row * DUMP_ROW_WIDTH) as u64)
}

fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn ascii(data: &[u8]) -> String {
    data.iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '.'
            }
        })
        .collect()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
