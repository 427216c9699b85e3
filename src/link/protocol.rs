//! Control literals and sensor payload parsing.

use crate::error::ReadingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outbound control message understood by the sensor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMessage {
    Start,
    Stop,
}

impl ControlMessage {
    /// Exact text sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMessage::Start => "Start Communication",
            ControlMessage::Stop => "Stop Communication",
        }
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlMessage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(ControlMessage::Start),
            "stop" => Ok(ControlMessage::Stop),
            other => Err(format!("unknown control message '{}', use start or stop", other)),
        }
    }
}

/// Light intensity reported by the sensor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reading(pub u32);

impl Reading {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Extract a reading from a sensor payload.
///
/// Only the last whitespace-delimited token matters, so `"light: 542"`
/// and `"542\n"` both give 542.
pub fn parse_reading(payload: &[u8]) -> Result<Reading, ReadingError> {
    let text = std::str::from_utf8(payload).map_err(|_| ReadingError::NotUtf8)?;
    let token = text.split_whitespace().last().ok_or(ReadingError::Empty)?;

    token
        .parse::<u32>()
        .map(Reading)
        .map_err(|_| ReadingError::NotANumber(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_literals() {
        assert_eq!(ControlMessage::Start.as_str(), "Start Communication");
        assert_eq!(ControlMessage::Stop.to_string(), "Stop Communication");
    }

    #[test]
    fn test_control_message_from_cli() {
        assert_eq!("START".parse::<ControlMessage>(), Ok(ControlMessage::Start));
        assert_eq!("stop".parse::<ControlMessage>(), Ok(ControlMessage::Stop));
        assert!("pause".parse::<ControlMessage>().is_err());
    }

    #[test]
    fn test_last_token_wins() {
        assert_eq!(parse_reading(b"light: 542"), Ok(Reading(542)));
        assert_eq!(parse_reading(b"850"), Ok(Reading(850)));
        assert_eq!(parse_reading(b"  sensor 3 value\t12\r\n"), Ok(Reading(12)));
    }

    #[test]
    fn test_malformed_payloads() {
        assert_eq!(parse_reading(b""), Err(ReadingError::Empty));
        assert_eq!(parse_reading(b" \n "), Err(ReadingError::Empty));
        assert_eq!(parse_reading(&[0xff, 0xfe]), Err(ReadingError::NotUtf8));
        assert_eq!(
            parse_reading(b"light: bright"),
            Err(ReadingError::NotANumber("bright".to_string()))
        );
        // readings are non-negative
        assert!(parse_reading(b"light: -4").is_err());
        assert!(parse_reading(b"99999999999").is_err());
    }
}
