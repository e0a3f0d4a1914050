#![allow(dead_code)]
use std::cell::Cell;
use std::collections::VecDeque;
use std::io;

use orb_modem_wifi::{ModemTransport, ResponseOutcome};

/// Transport that replays canned modem behaviour and records what the
/// command layer did with it.
pub struct ScriptedTransport {
    outcomes: VecDeque<ResponseOutcome>,
    int_value: Option<i64>,
    stream: VecDeque<u8>,
    now: Cell<u64>,
    ms_per_read: u64,
    pub sent: Vec<String>,
    pub waited_for: Vec<Vec<String>>,
    pub line_reads: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            outcomes: VecDeque::new(),
            int_value: None,
            stream: VecDeque::new(),
            now: Cell::new(0),
            ms_per_read: 1,
            sent: Vec::new(),
            waited_for: Vec::new(),
            line_reads: 0,
        }
    }

    pub fn respond(mut self, outcome: ResponseOutcome) -> Self {
        self.outcomes.push_back(outcome);
        self
    }

    pub fn with_int(mut self, value: i64) -> Self {
        self.int_value = Some(value);
        self
    }

    /// Queues `line` followed by `\r\n`.
    pub fn with_line(mut self, line: &str) -> Self {
        self.stream.extend(line.as_bytes());
        self.stream.extend(b"\r\n");
        self
    }

    pub fn with_lines(self, lines: &[&str]) -> Self {
        lines.iter().fold(self, |t, line| t.with_line(line))
    }

    /// Simulated time each line read takes.
    pub fn ms_per_read(mut self, ms: u64) -> Self {
        self.ms_per_read = ms;
        self
    }

    pub fn remaining(&self) -> usize {
        self.stream.len()
    }
}

impl ModemTransport for ScriptedTransport {
    fn send_command(&mut self, parts: &[&str]) -> io::Result<()> {
        self.sent.push(parts.concat());
        Ok(())
    }

    fn wait_response(&mut self, expected: &[&str]) -> io::Result<ResponseOutcome> {
        self.waited_for
            .push(expected.iter().map(|s| s.to_string()).collect());
        Ok(self.outcomes.pop_front().unwrap_or(ResponseOutcome::Timeout))
    }

    fn available(&mut self) -> io::Result<usize> {
        Ok(self.stream.len())
    }

    fn read_line_into(&mut self, buf: &mut [u8], delimiter: u8) -> io::Result<usize> {
        self.line_reads += 1;
        self.now.set(self.now.get() + self.ms_per_read);
        let mut len = 0;
        while len < buf.len() {
            match self.stream.pop_front() {
                Some(b) if b == delimiter => break,
                Some(b) => {
                    buf[len] = b;
                    len += 1;
                }
                None => break,
            }
        }
        Ok(len)
    }

    fn parse_int_clear(&mut self) -> io::Result<i64> {
        self.int_value
            .take()
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))
    }

    fn millis(&self) -> u64 {
        self.now.get()
    }
}
