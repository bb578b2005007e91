use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Hour ranges
// ---------------------------------------------------------------------------

/// A working window expressed as whole hours of the day (0-23). `start >= end`
/// encodes a shift that ends on the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl HourRange {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Window with both hours checked against 0-23.
    pub fn checked(start: u8, end: u8) -> Result<Self, HourOutOfRange> {
        for hour in [start, end] {
            if hour > 23 {
                return Err(HourOutOfRange(hour));
            }
        }
        Ok(Self { start, end })
    }

    /// Whether the window ends on the next calendar day. Equal hours are a
    /// full 24h shift and end there too.
    pub fn crosses_midnight(&self) -> bool {
        self.start >= self.end
    }

    /// Length of the window in hours. Equal start and end counts as a full
    /// day.
    pub fn duration(&self) -> u8 {
        duration_hours(self.start, self.end)
    }
}

/// Midnight-aware duration: `end - start` when `start < end`, otherwise
/// `(24 - start) + end`. Hours are expected in 0-23; anything larger
/// saturates instead of wrapping.
pub fn duration_hours(start: u8, end: u8) -> u8 {
    if start < end {
        end - start
    } else {
        24u8.saturating_sub(start).saturating_add(end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("hour {0} is outside 0-23")]
pub struct HourOutOfRange(pub u8);

// ---------------------------------------------------------------------------
// Shift tokens
// ---------------------------------------------------------------------------

/// The fixed vocabulary of shift codes the auto-fill engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftToken {
    #[serde(rename = "8-14")]
    Early,
    #[serde(rename = "8-15")]
    EarlyLong,
    #[serde(rename = "8-16")]
    Day,
    #[serde(rename = "8-20")]
    Long,
    #[serde(rename = "14-20")]
    Late,
    #[serde(rename = "20-8")]
    Night,
    /// Day off ("W"). Has no hour mapping.
    #[serde(rename = "W")]
    DayOff,
}

impl ShiftToken {
    pub const ALL: [ShiftToken; 7] = [
        ShiftToken::Early,
        ShiftToken::EarlyLong,
        ShiftToken::Day,
        ShiftToken::Long,
        ShiftToken::Late,
        ShiftToken::Night,
        ShiftToken::DayOff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftToken::Early => "8-14",
            ShiftToken::EarlyLong => "8-15",
            ShiftToken::Day => "8-16",
            ShiftToken::Long => "8-20",
            ShiftToken::Late => "14-20",
            ShiftToken::Night => "20-8",
            ShiftToken::DayOff => "W",
        }
    }

    /// Hour window for working tokens; `None` for a day off.
    pub fn hours(&self) -> Option<HourRange> {
        match self {
            ShiftToken::Early => Some(HourRange::new(8, 14)),
            ShiftToken::EarlyLong => Some(HourRange::new(8, 15)),
            ShiftToken::Day => Some(HourRange::new(8, 16)),
            ShiftToken::Long => Some(HourRange::new(8, 20)),
            ShiftToken::Late => Some(HourRange::new(14, 20)),
            ShiftToken::Night => Some(HourRange::new(20, 8)),
            ShiftToken::DayOff => None,
        }
    }

    pub fn is_night(&self) -> bool {
        matches!(self, ShiftToken::Night)
    }

    pub fn is_day_off(&self) -> bool {
        matches!(self, ShiftToken::DayOff)
    }

    pub fn duration(&self) -> u8 {
        self.hours().map(|h| h.duration()).unwrap_or(0)
    }
}

impl fmt::Display for ShiftToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized shift token '{0}'")]
pub struct UnknownToken(pub String);

impl FromStr for ShiftToken {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShiftToken::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| UnknownToken(s.to_string()))
    }
}

/// Look up the hour window of a raw token string. Unknown tokens and the
/// day-off token both yield `None` and must be treated as non-working.
pub fn hour_range(token: &str) -> Option<HourRange> {
    token.parse::<ShiftToken>().ok().and_then(|t| t.hours())
}

pub fn is_night_token(token: &str) -> bool {
    token.trim() == ShiftToken::Night.as_str()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_lookup_table() {
        assert_eq!(hour_range("8-14"), Some(HourRange::new(8, 14)));
        assert_eq!(hour_range("8-15"), Some(HourRange::new(8, 15)));
        assert_eq!(hour_range("8-16"), Some(HourRange::new(8, 16)));
        assert_eq!(hour_range("8-20"), Some(HourRange::new(8, 20)));
        assert_eq!(hour_range("14-20"), Some(HourRange::new(14, 20)));
        assert_eq!(hour_range("20-8"), Some(HourRange::new(20, 8)));
    }

    #[test]
    fn test_non_working_tokens_have_no_mapping() {
        assert_eq!(hour_range("W"), None);
        assert_eq!(hour_range("9-17"), None);
        assert_eq!(hour_range(""), None);
    }

    #[test]
    fn test_only_twenty_to_eight_is_night() {
        assert!(is_night_token("20-8"));
        assert!(!is_night_token("14-20"));
        assert!(!is_night_token("8-20"));
        assert!(ShiftToken::Night.is_night());
        assert!(!ShiftToken::Long.is_night());
    }

    #[test]
    fn test_duration_handles_midnight() {
        assert_eq!(duration_hours(8, 16), 8);
        assert_eq!(duration_hours(20, 8), 12);
        assert_eq!(duration_hours(22, 6), 8);
        assert_eq!(ShiftToken::Night.duration(), 12);
        assert_eq!(ShiftToken::Late.duration(), 6);
        assert_eq!(ShiftToken::DayOff.duration(), 0);
        assert!(HourRange::new(20, 8).crosses_midnight());
        assert!(!HourRange::new(8, 20).crosses_midnight());
    }

    #[test]
    fn test_equal_hours_span_a_full_day() {
        let range = HourRange::new(8, 8);
        assert_eq!(range.duration(), 24);
        assert!(range.crosses_midnight());
    }

    #[test]
    fn test_out_of_range_hours() {
        assert_eq!(HourRange::checked(8, 16), Ok(HourRange::new(8, 16)));
        assert_eq!(HourRange::checked(25, 8), Err(HourOutOfRange(25)));
        assert_eq!(HourRange::checked(8, 24), Err(HourOutOfRange(24)));
        // No underflow for a stray start hour.
        assert_eq!(duration_hours(30, 4), 4);
    }

    #[test]
    fn test_token_string_round_trip() {
        for token in ShiftToken::ALL {
            assert_eq!(token.as_str().parse::<ShiftToken>(), Ok(token));
        }
        assert!("nope".parse::<ShiftToken>().is_err());
        let json = serde_json::to_string(&ShiftToken::Night).unwrap();
        assert_eq!(json, r#""20-8""#);
    }
}
