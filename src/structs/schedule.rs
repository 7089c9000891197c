use serde::{
    de::{self, Unexpected, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::collections::BTreeMap;
use std::fmt;

/// One member's state for one day. The calendar UI sends shifts as JSON
/// numbers and "off" as a string, so the wire format keeps that shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftSlot {
    First,
    Second,
    Third,
    Off,
}

/// Mapping of member name to slot for a single date.
pub type DayAssignment = BTreeMap<String, ShiftSlot>;

/// Full month keyed by ISO date strings (YYYY-MM-DD), ordered by date.
pub type MonthSchedule = BTreeMap<String, DayAssignment>;

impl ShiftSlot {
    pub fn as_number(&self) -> Option<u8> {
        match self {
            ShiftSlot::First => Some(1),
            ShiftSlot::Second => Some(2),
            ShiftSlot::Third => Some(3),
            ShiftSlot::Off => None,
        }
    }

    /// Value stored in the shifts.shift_type column.
    pub fn as_db_value(&self) -> &'static str {
        match self {
            ShiftSlot::First => "1",
            ShiftSlot::Second => "2",
            ShiftSlot::Third => "3",
            ShiftSlot::Off => "off",
        }
    }

    /// Lenient parse for values coming back from storage. Anything that is
    /// not 1/2/3/off is treated as unknown rather than an error.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "1" => Some(ShiftSlot::First),
            "2" => Some(ShiftSlot::Second),
            "3" => Some(ShiftSlot::Third),
            "off" => Some(ShiftSlot::Off),
            _ => None,
        }
    }
}

impl Serialize for ShiftSlot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_number() {
            Some(n) => serializer.serialize_u8(n),
            None => serializer.serialize_str("off"),
        }
    }
}

struct ShiftSlotVisitor;

impl<'de> Visitor<'de> for ShiftSlotVisitor {
    type Value = ShiftSlot;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a shift number 1-3 or the string \"off\"")
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value {
            1 => Ok(ShiftSlot::First),
            2 => Ok(ShiftSlot::Second),
            3 => Ok(ShiftSlot::Third),
            _ => Err(E::invalid_value(Unexpected::Unsigned(value), &self)),
        }
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value < 0 {
            return Err(E::invalid_value(Unexpected::Signed(value), &self));
        }
        self.visit_u64(value as u64)
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        ShiftSlot::parse_loose(value).ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
    }
}

impl<'de> Deserialize<'de> for ShiftSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ShiftSlotVisitor)
    }
}

#[derive(Deserialize)]
pub struct GenerateScheduleRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
pub struct SaveScheduleRequest {
    pub schedule: BTreeMap<String, DayAssignment>,
}

#[derive(Serialize)]
pub struct SaveScheduleResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_shifts_as_numbers_and_off_as_string() {
        let mut day = DayAssignment::new();
        day.insert("Alice".to_string(), ShiftSlot::First);
        day.insert("Bob".to_string(), ShiftSlot::Off);

        let json = serde_json::to_string(&day).unwrap();
        assert_eq!(json, r#"{"Alice":1,"Bob":"off"}"#);
    }

    #[test]
    fn deserializes_numeric_and_string_forms() {
        let day: DayAssignment =
            serde_json::from_str(r#"{"Alice":1,"Bob":"off","Eve":"2"}"#).unwrap();
        assert_eq!(day["Alice"], ShiftSlot::First);
        assert_eq!(day["Bob"], ShiftSlot::Off);
        assert_eq!(day["Eve"], ShiftSlot::Second);
    }

    #[test]
    fn rejects_out_of_range_slot() {
        assert!(serde_json::from_str::<ShiftSlot>("4").is_err());
        assert!(serde_json::from_str::<ShiftSlot>(r#""night""#).is_err());
    }

    #[test]
    fn parse_loose_accepts_untrimmed_mixed_case() {
        assert_eq!(ShiftSlot::parse_loose(" OFF "), Some(ShiftSlot::Off));
        assert_eq!(ShiftSlot::parse_loose("3"), Some(ShiftSlot::Third));
        assert_eq!(ShiftSlot::parse_loose("night"), None);
    }
}
