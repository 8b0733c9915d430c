use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use super::ReservationError;

const STORAGE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// シフトコードの最大長
pub const SHIFT_MAX_LEN: usize = 20;

/// 予約日
///
/// Stored and exchanged as `YYYY-MM-DD`, so the lexical order of the stored
/// text is the calendar order.
#[serde_as]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, From, Deref,
)]
pub struct BookingDate(#[serde_as(as = "DisplayFromStr")] NaiveDate);

impl BookingDate {
    /// `DD/MM/YYYY`, the form shown on the schedule page.
    pub fn to_display_string(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }

    pub fn is_before(&self, day: NaiveDate) -> bool {
        self.0 < day
    }
}

impl FromStr for BookingDate {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // %Y also takes signs, extra digits and unpadded fields; only the
        // canonical form keeps the text order equal to the calendar order.
        match NaiveDate::parse_from_str(trimmed, STORAGE_FORMAT) {
            Ok(date) if date.format(STORAGE_FORMAT).to_string() == trimmed => Ok(BookingDate(date)),
            _ => Err(ReservationError::InvalidDate(s.to_owned())),
        }
    }
}

impl fmt::Display for BookingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(STORAGE_FORMAT))
    }
}

/// シフト（時間帯）コード
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref)]
pub struct ShiftCode(String);

impl ShiftCode {
    pub fn parse(value: &str) -> Result<Self, ReservationError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ReservationError::ShiftRequired);
        }
        if value.chars().count() > SHIFT_MAX_LEN {
            return Err(ReservationError::ShiftTooLong);
        }
        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 部屋番号
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref,
)]
pub struct RoomNumber(i64);

/// 予約枠。日付・シフト・部屋の組は全予約で一意
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: BookingDate,
    pub shift: ShiftCode,
    pub room: RoomNumber,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "room {}, shift {}, date {}",
            self.room, self.shift, self.date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_date_round_trips_storage_form() {
        let date: BookingDate = "2099-01-01".parse().unwrap();
        assert_eq!(date.to_string(), "2099-01-01");
        assert_eq!(date.to_display_string(), "01/01/2099");
    }

    #[test]
    fn test_booking_date_rejects_other_formats() {
        for input in ["01/01/2099", "2099-13-01", "2099-02-30", "", "tomorrow"] {
            assert!(
                matches!(
                    input.parse::<BookingDate>(),
                    Err(ReservationError::InvalidDate(ref raw)) if raw == input
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_booking_date_requires_four_digit_year_and_padding() {
        for input in ["+10000-01-01", "-0001-01-01", "10000-01-01", "2099-1-1", "2099-01-1"] {
            assert_eq!(
                input.parse::<BookingDate>(),
                Err(ReservationError::InvalidDate(input.to_owned())),
                "{input} should be rejected"
            );
        }
        assert_eq!(
            "0999-12-31".parse::<BookingDate>().unwrap().to_string(),
            "0999-12-31"
        );
    }

    #[test]
    fn test_booking_date_order_matches_calendar() {
        let earlier: BookingDate = "2099-01-31".parse().unwrap();
        let later: BookingDate = "2099-02-01".parse().unwrap();
        assert!(earlier < later);
        assert!(earlier.is_before(*later));
        assert!(!later.is_before(*later));
    }

    #[test]
    fn test_booking_date_serializes_as_text() {
        let date: BookingDate = "2099-03-04".parse().unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2099-03-04\"");
    }

    #[test]
    fn test_shift_code() {
        assert_eq!(ShiftCode::parse("  morning ").unwrap().as_str(), "morning");
        assert!(matches!(
            ShiftCode::parse("   "),
            Err(ReservationError::ShiftRequired)
        ));
        assert!(matches!(
            ShiftCode::parse(&"x".repeat(SHIFT_MAX_LEN + 1)),
            Err(ReservationError::ShiftTooLong)
        ));
    }

    #[test]
    fn test_slot_display() {
        let slot = Slot {
            date: "2099-01-01".parse().unwrap(),
            shift: ShiftCode::parse("morning").unwrap(),
            room: RoomNumber::from(101),
        };
        assert_eq!(slot.to_string(), "room 101, shift morning, date 2099-01-01");
    }
}
