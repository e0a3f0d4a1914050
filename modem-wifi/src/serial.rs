//! Serial line implementation of [`ModemTransport`].

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, trace};

use crate::config::SerialConfig;
use crate::errors::Result;
use crate::transport::{ModemTransport, ResponseOutcome, RSP_ERROR};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const READ_CHUNK_LEN: usize = 256;
const RSP_CME_ERROR: &str = "+CME ERROR";

/// A byte stream to the modem that can tell how much input is waiting.
pub trait SerialLink: Read + Write {
    fn bytes_available(&self) -> io::Result<usize>;

    /// Drops everything received but not read yet.
    fn discard_input(&mut self) -> io::Result<()>;
}

impl SerialLink for Box<dyn SerialPort> {
    fn bytes_available(&self) -> io::Result<usize> {
        let n = self.bytes_to_read()?;
        Ok(n as usize)
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

/// [`ModemTransport`] over a serial line.
///
/// Bytes pulled from the port while looking for a response are kept, so scan
/// records that arrive together with the acknowledgement are not lost.
pub struct SerialTransport<P = Box<dyn SerialPort>> {
    port: P,
    pending: VecDeque<u8>,
    response_timeout: Duration,
    read_timeout: Duration,
    epoch: Instant,
}

impl SerialTransport {
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!(device = %config.device, baud_rate = config.baud_rate, "opening modem port");
        let port = serialport::new(config.device.as_str(), config.baud_rate)
            .timeout(config.read_timeout)
            .open()?;

        Ok(Self::new(port, config.response_timeout, config.read_timeout))
    }
}

impl<P: SerialLink> SerialTransport<P> {
    pub fn new(port: P, response_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            port,
            pending: VecDeque::new(),
            response_timeout,
            read_timeout,
            epoch: Instant::now(),
        }
    }

    pub fn get_ref(&self) -> &P {
        &self.port
    }

    /// Pulls whatever the port has into `pending`. Returns `false` if nothing
    /// arrived.
    fn fill(&mut self) -> io::Result<bool> {
        let mut chunk = [0u8; READ_CHUNK_LEN];
        match self.port.read(&mut chunk) {
            Ok(0) => Ok(false),
            Ok(n) => {
                self.pending.extend(&chunk[..n]);
                Ok(true)
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut
                        | io::ErrorKind::WouldBlock
                        | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// The first complete line in `pending`, without its line ending, and the
    /// number of bytes it occupies including the `\n`.
    fn peek_line(&self) -> Option<(String, usize)> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let bytes: Vec<u8> = self.pending.iter().take(end).copied().collect();
        let line = String::from_utf8_lossy(&bytes)
            .trim_end_matches('\r')
            .to_string();
        Some((line, end + 1))
    }
}

impl<P: SerialLink> ModemTransport for SerialTransport<P> {
    fn send_command(&mut self, parts: &[&str]) -> io::Result<()> {
        // Leftovers of the previous exchange (a trailing OK, unread scan
        // lines) must not be taken as the answer to this command.
        if !self.pending.is_empty() {
            trace!(bytes = self.pending.len(), "discarding stale modem output");
            self.pending.clear();
        }
        self.port.discard_input()?;

        let command = parts.concat();
        debug!(%command, "sending AT command");
        self.port.write_all(command.as_bytes())?;
        self.port.write_all(b"\r\n")?;
        self.port.flush()
    }

    fn wait_response(&mut self, expected: &[&str]) -> io::Result<ResponseOutcome> {
        let deadline = Instant::now() + self.response_timeout;
        loop {
            while let Some((line, consumed)) = self.peek_line() {
                trace!(%line, "modem line");
                if let Some(index) = expected.iter().position(|p| line.starts_with(p)) {
                    // The rest of the matched line stays readable.
                    self.pending.drain(..expected[index].len());
                    debug!(prefix = expected[index], "matched response");
                    return Ok(match index {
                        0 => ResponseOutcome::MatchedFirst,
                        i => ResponseOutcome::MatchedOther(i),
                    });
                }
                self.pending.drain(..consumed);
                if line.starts_with(RSP_ERROR) || line.starts_with(RSP_CME_ERROR) {
                    debug!(%line, "modem reported an error");
                    return Ok(ResponseOutcome::Error);
                }
            }

            if Instant::now() >= deadline {
                debug!(?expected, "no matching response");
                return Ok(ResponseOutcome::Timeout);
            }
            if !self.fill()? {
                thread::sleep(POLL_INTERVAL);
            }
        }
    }

    fn available(&mut self) -> io::Result<usize> {
        Ok(self.pending.len() + self.port.bytes_available()?)
    }

    fn read_line_into(&mut self, buf: &mut [u8], delimiter: u8) -> io::Result<usize> {
        let deadline = Instant::now() + self.read_timeout;
        let mut len = 0;
        while len < buf.len() {
            match self.pending.pop_front() {
                Some(b) if b == delimiter => break,
                Some(b) => {
                    buf[len] = b;
                    len += 1;
                }
                None => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    if !self.fill()? {
                        thread::sleep(POLL_INTERVAL);
                    }
                }
            }
        }
        Ok(len)
    }

    fn parse_int_clear(&mut self) -> io::Result<i64> {
        let (line, consumed) = match self.peek_line() {
            Some(found) => found,
            None => {
                let bytes: Vec<u8> = self.pending.iter().copied().collect();
                (String::from_utf8_lossy(&bytes).into_owned(), self.pending.len())
            }
        };
        self.pending.drain(..consumed);

        let text = line.trim_start();
        let end = text
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
            .map_or(text.len(), |(i, _)| i);
        text[..end].parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no integer in response {line:?}"),
            )
        })
    }

    fn millis(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
