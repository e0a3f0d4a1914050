//! The modem channel as seen by the command layer.
//!
//! Implementations own the serial link. Only one caller may drive a
//! transport at a time; nothing here locks or guards against re-entrant use.

use std::io;

pub const RSP_OK: &str = "OK";
pub const RSP_ERROR: &str = "ERROR";

/// How a wait for a response line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// A line started with the first expected prefix.
    MatchedFirst,
    /// A line started with the expected prefix at this index (never 0).
    MatchedOther(usize),
    Timeout,
    /// The modem answered with an error line that was not expected.
    Error,
}

pub trait ModemTransport {
    /// Writes the concatenated `parts` followed by `\r\n`.
    fn send_command(&mut self, parts: &[&str]) -> io::Result<()>;

    /// Consumes lines until one starts with an entry of `expected`, or the
    /// transport's response window runs out.
    fn wait_response(&mut self, expected: &[&str]) -> io::Result<ResponseOutcome>;

    /// Number of bytes that can be read without blocking.
    fn available(&mut self) -> io::Result<usize>;

    /// Reads into `buf` until `delimiter` or until `buf` is full. The
    /// delimiter is consumed but not stored. Returns the stored length.
    fn read_line_into(&mut self, buf: &mut [u8], delimiter: u8) -> io::Result<usize>;

    /// Parses the integer that follows the last matched prefix and drops the
    /// rest of that line. Only meaningful right after a successful
    /// [`wait_response`](Self::wait_response).
    fn parse_int_clear(&mut self) -> io::Result<i64>;

    /// Monotonic time in milliseconds.
    fn millis(&self) -> u64;
}
