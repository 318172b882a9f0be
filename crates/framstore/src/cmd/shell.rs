use std::io::{self, BufRead, Write};

use framstore_record::{Address, RecordStore};
use framstore_transport::BusTransport;
use tracing::info;

use crate::cmd::device::open_store;
use crate::cmd::DeviceArgs;
use crate::exit::{io_error, CliResult, SUCCESS};

const PROMPT: &str = "enter text to write ('read' to read back, 'quit' to exit): ";

/// What the user asked for on one input line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Read,
    Write(&'a str),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        if line.eq_ignore_ascii_case("quit") {
            Input::Quit
        } else if line.eq_ignore_ascii_case("read") {
            Input::Read
        } else {
            Input::Write(line)
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub writes: usize,
    pub reads: usize,
    pub failures: usize,
}

pub fn run(device: &DeviceArgs) -> CliResult<i32> {
    let mut store = open_store(device)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = run_session(&mut store, device.address, stdin.lock(), stdout.lock())
        .map_err(|err| io_error("console I/O failed", err))?;

    info!(
        writes = summary.writes,
        reads = summary.reads,
        failures = summary.failures,
        "session ended"
    );
    Ok(SUCCESS)
}

/// Drive the prompt loop until `quit` or end of input.
///
/// Record failures are reported on `output` and the loop keeps going; only
/// console I/O errors end the session early.
pub fn run_session<T, R, W>(
    store: &mut RecordStore<T>,
    address: Address,
    mut input: R,
    mut output: W,
) -> io::Result<SessionSummary>
where
    T: BusTransport,
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();
    let mut line = String::new();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let text = line.strip_suffix('\n').unwrap_or(&line);
        let text = text.strip_suffix('\r').unwrap_or(text);

        match Input::parse(text) {
            Input::Quit => break,
            Input::Read => {
                summary.reads += 1;
                match store.read_string(address) {
                    Ok(stored) => writeln!(output, "read from {address}: '{stored}'")?,
                    Err(err) => {
                        summary.failures += 1;
                        writeln!(output, "no valid data at {address}: {err}")?;
                    }
                }
            }
            Input::Write(text) => {
                summary.writes += 1;
                match store.write_string(address, text) {
                    Ok(()) => writeln!(
                        output,
                        "wrote {} bytes at {address}",
                        text.len()
                    )?,
                    Err(err) => {
                        summary.failures += 1;
                        writeln!(output, "write failed: {err}")?;
                    }
                }
            }
        }
    }

    writeln!(output, "bye")?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use framstore_record::{BlockConfig, RecordConfig};
    use framstore_transport::MemoryFram;

    use super::*;

    fn store(max_payload: usize) -> RecordStore<MemoryFram> {
        RecordStore::with_config(
            MemoryFram::new(4096),
            BlockConfig {
                write_settle: Duration::ZERO,
                read_settle: Duration::ZERO,
            },
            RecordConfig { max_payload },
        )
    }

    fn session(store: &mut RecordStore<MemoryFram>, script: &str) -> (SessionSummary, String) {
        let mut out = Vec::new();
        let summary = run_session(
            store,
            Address::new(0x20).unwrap(),
            Cursor::new(script.as_bytes().to_vec()),
            &mut out,
        )
        .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_reserved_tokens_case_insensitively() {
        assert_eq!(Input::parse("QUIT"), Input::Quit);
        assert_eq!(Input::parse("Read"), Input::Read);
        assert_eq!(Input::parse(" read"), Input::Write(" read"));
        assert_eq!(Input::parse("hello"), Input::Write("hello"));
    }

    #[test]
    fn write_then_read_back() {
        let mut store = store(64);
        let (summary, out) = session(&mut store, "hello\nread\nquit\n");

        assert_eq!(
            summary,
            SessionSummary {
                writes: 1,
                reads: 1,
                failures: 0
            }
        );
        assert!(out.contains("wrote 5 bytes at 0x000020"));
        assert!(out.contains("read from 0x000020: 'hello'"));
        assert!(out.trim_end().ends_with("bye"));
    }

    #[test]
    fn failures_are_reported_and_loop_continues() {
        let mut store = store(4);
        let (summary, out) = session(&mut store, "read\ntoo long\nok\r\nread\n");

        assert_eq!(summary.failures, 2);
        assert!(out.contains("no valid data at 0x000020"));
        assert!(out.contains("write failed: payload too long (8 bytes, max 4)"));
        assert!(out.contains("read from 0x000020: 'ok'"));
    }

    #[test]
    fn end_of_input_acts_as_quit() {
        let mut store = store(64);
        let (summary, out) = session(&mut store, "");
        assert_eq!(summary, SessionSummary::default());
        assert!(out.starts_with(PROMPT));
        assert!(out.trim_end().ends_with("bye"));
    }

    #[test]
    fn lines_after_quit_are_ignored() {
        let mut store = store(64);
        let (summary, _) = session(&mut store, "quit\nnever written\n");
        assert_eq!(summary.writes, 0);
    }
}
