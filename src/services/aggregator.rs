use crate::structs::schedule::{DayAssignment, MonthSchedule};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

// Display layers key days as M/D/YYYY while storage uses ISO; everything
// downstream of this module only ever sees the ISO form.
fn slash_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap())
}

/// Canonicalize a raw date key to YYYY-MM-DD. Keys that match neither the
/// slash form nor ISO pass through unchanged; validation happens elsewhere.
pub fn normalize_key(raw: &str) -> String {
    if let Some(caps) = slash_key_pattern().captures(raw.trim()) {
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);
        return format!("{:04}-{:02}-{:02}", year, month, day);
    }
    raw.to_string()
}

/// Key-wise normalization of a whole schedule map.
pub fn normalize_schedule(raw: BTreeMap<String, DayAssignment>) -> MonthSchedule {
    raw.into_iter()
        .map(|(key, day)| (normalize_key(&key), day))
        .collect()
}

/// Overwrite days of `existing` with days from `incoming`. A day present in
/// `incoming` replaces the stored day wholesale, never a per-member union;
/// saving a month is an all-or-nothing unit in the UI.
pub fn merge(mut existing: MonthSchedule, incoming: MonthSchedule) -> MonthSchedule {
    for (key, day) in incoming {
        existing.insert(key, day);
    }
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::schedule::ShiftSlot;

    #[test]
    fn normalizes_slash_keys_to_iso() {
        assert_eq!(normalize_key("1/5/2024"), "2024-01-05");
        assert_eq!(normalize_key("12/31/2023"), "2023-12-31");
    }

    #[test]
    fn iso_keys_are_untouched() {
        assert_eq!(normalize_key("2024-01-05"), "2024-01-05");
        // normalization is idempotent
        assert_eq!(normalize_key(&normalize_key("1/5/2024")), "2024-01-05");
    }

    #[test]
    fn unrecognized_keys_pass_through() {
        assert_eq!(normalize_key("not-a-date"), "not-a-date");
        assert_eq!(normalize_key("2024/01/05"), "2024/01/05");
    }

    #[test]
    fn merge_replaces_whole_days() {
        let mut existing_day = DayAssignment::new();
        existing_day.insert("Alice".to_string(), ShiftSlot::First);
        let mut existing = MonthSchedule::new();
        existing.insert("2024-01-01".to_string(), existing_day);

        let mut incoming_day = DayAssignment::new();
        incoming_day.insert("Bob".to_string(), ShiftSlot::Second);
        let mut incoming = MonthSchedule::new();
        incoming.insert("2024-01-01".to_string(), incoming_day);

        let merged = merge(existing, incoming);
        let day = &merged["2024-01-01"];
        assert_eq!(day.len(), 1);
        assert_eq!(day["Bob"], ShiftSlot::Second);
        assert!(!day.contains_key("Alice"));
    }

    #[test]
    fn merge_keeps_untouched_days() {
        let mut existing_day = DayAssignment::new();
        existing_day.insert("Alice".to_string(), ShiftSlot::Third);
        let mut existing = MonthSchedule::new();
        existing.insert("2024-01-01".to_string(), existing_day);

        let merged = merge(existing, MonthSchedule::new());
        assert_eq!(merged["2024-01-01"]["Alice"], ShiftSlot::Third);
    }

    #[test]
    fn normalize_schedule_rewrites_only_matching_keys() {
        let mut raw = BTreeMap::new();
        raw.insert("1/5/2024".to_string(), DayAssignment::new());
        raw.insert("2024-01-06".to_string(), DayAssignment::new());
        raw.insert("garbage".to_string(), DayAssignment::new());

        let normalized = normalize_schedule(raw);
        assert!(normalized.contains_key("2024-01-05"));
        assert!(normalized.contains_key("2024-01-06"));
        assert!(normalized.contains_key("garbage"));
        assert_eq!(normalized.len(), 3);
    }
}
