//! Parsing of the access point lines printed by `AT+CWSTASCAN`.
//!
//! A line looks like `50:FA:84:AF:C8:B9,11,-61`: BSSID, channel and an
//! optional signal level. Parsing works on the raw bytes read from the modem
//! and never allocates.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Length of a textual BSSID: six hex octets and five separators.
const BSSID_TEXT_LEN: usize = 17;
const BSSID_SEPARATOR: u8 = b':';
const FIELD_SEPARATOR: u8 = b',';

/// Hardware address of an access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Bssid(pub [u8; 6]);

impl Bssid {
    fn parse(text: &[u8]) -> Result<Self, ParseRecordError> {
        if text.len() != BSSID_TEXT_LEN {
            return Err(ParseRecordError::BssidLength(text.len()));
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            let start = i * 3;
            if i > 0 && text[start - 1] != BSSID_SEPARATOR {
                return Err(ParseRecordError::BssidSeparator(start - 1));
            }
            hex::decode_to_slice(&text[start..start + 2], std::slice::from_mut(octet))
                .map_err(|_| ParseRecordError::BssidHex(i))?;
        }

        Ok(Self(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl Serialize for Bssid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One access point reported by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NetworkRecord {
    pub bssid: Bssid,
    pub channel: u8,
    /// Signal level in dBm, `0` when the modem did not report one.
    pub signal: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseRecordError {
    #[error("no field separator after the BSSID")]
    MissingComma,
    #[error("BSSID is {0} characters long, expected 17")]
    BssidLength(usize),
    #[error("expected ':' at BSSID offset {0}")]
    BssidSeparator(usize),
    #[error("BSSID octet {0} is not a hex byte")]
    BssidHex(usize),
    #[error("channel is not an integer in 0..=255")]
    Channel,
    #[error("signal is not an integer in -128..=127")]
    Signal,
    #[error("unexpected data after the last field")]
    TrailingData,
}

impl NetworkRecord {
    /// Parses one scan line. Trailing `\r` / `\n` are accepted; anything
    /// else around the fields is rejected rather than clamped or skipped.
    ///
    /// Numeric fields need at least one digit, so `..,,-61` and `..,11,` fail
    /// instead of reading as 0. The channel takes no sign and the signal only
    /// a leading `-` or `+`; leading whitespace fails both.
    pub fn parse(line: &[u8]) -> Result<Self, ParseRecordError> {
        let first = line
            .iter()
            .position(|&b| b == FIELD_SEPARATOR)
            .ok_or(ParseRecordError::MissingComma)?;
        let bssid = Bssid::parse(&line[..first])?;

        let rest = &line[first + 1..];
        let (channel, signal) = match rest.iter().position(|&b| b == FIELD_SEPARATOR) {
            None => (strip_line_ending(rest), None),
            Some(second) => (&rest[..second], Some(strip_line_ending(&rest[second + 1..]))),
        };

        let channel = parse_unsigned(channel)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or(ParseRecordError::Channel)?;
        let signal = match signal {
            None => 0,
            Some(field) => {
                if field.contains(&FIELD_SEPARATOR) {
                    return Err(ParseRecordError::TrailingData);
                }
                parse_signed(field)
                    .and_then(|v| i8::try_from(v).ok())
                    .ok_or(ParseRecordError::Signal)?
            }
        };

        Ok(Self {
            bssid,
            channel,
            signal,
        })
    }
}

impl FromStr for NetworkRecord {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

impl fmt::Display for NetworkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.bssid, self.channel, self.signal)
    }
}

fn strip_line_ending(mut field: &[u8]) -> &[u8] {
    while let [head @ .., b'\r' | b'\n'] = field {
        field = head;
    }
    field
}

/// Decimal digits only. Values that overflow `u32` are reported as `None`.
fn parse_unsigned(field: &[u8]) -> Option<u32> {
    if field.is_empty() {
        return None;
    }
    field.iter().try_fold(0u32, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })
}

fn parse_signed(field: &[u8]) -> Option<i64> {
    let (negative, digits) = match field {
        [b'-', digits @ ..] => (true, digits),
        [b'+', digits @ ..] => (false, digits),
        digits => (false, digits),
    };
    let magnitude = i64::from(parse_unsigned(digits)?);
    Some(if negative { -magnitude } else { magnitude })
}
