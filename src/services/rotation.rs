use crate::errors::AppError;
use crate::structs::members::MemberGroup;
use crate::structs::schedule::{DayAssignment, MonthSchedule, ShiftSlot};
use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Hard cap on occupants per work shift per day.
const PER_SHIFT: usize = 2;

/// Generate a full month of assignments with a fresh thread-local RNG.
///
/// `prior_day` is the assignment of the day immediately before the month,
/// if one exists, so that rotation carries over month boundaries.
pub fn generate_month(
    roster: &[MemberGroup],
    year: i32,
    month: u32,
    prior_day: Option<&DayAssignment>,
) -> Result<MonthSchedule, AppError> {
    generate_month_with(roster, year, month, prior_day, &mut rand::thread_rng())
}

/// Same as [`generate_month`] but with an injected RNG for seeded tests.
pub fn generate_month_with<R: Rng>(
    roster: &[MemberGroup],
    year: i32,
    month: u32,
    prior_day: Option<&DayAssignment>,
    rng: &mut R,
) -> Result<MonthSchedule, AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(AppError::InvalidMonth { year, month })?;
    let days = month_days(first);

    // Members whose group is exactly "backend" are never scheduled.
    // "backend+" stays eligible but is constrained per shift below.
    let eligible: Vec<&MemberGroup> = roster
        .iter()
        .filter(|m| m.canonical_group() != "backend")
        .collect();

    let mut schedule = MonthSchedule::new();

    if eligible.is_empty() {
        for day in &days {
            schedule.insert(iso_key(day), DayAssignment::new());
        }
        return Ok(schedule);
    }

    // Rotation state entering each day: the slot recorded on the most
    // recent prior day. Missing entry = unknown, which rotates to shift 1.
    let mut last_slot: HashMap<&str, ShiftSlot> = HashMap::new();
    if let Some(prior) = prior_day {
        for member in &eligible {
            if let Some(slot) = prior.get(&member.name) {
                last_slot.insert(member.name.as_str(), *slot);
            }
        }
    }

    for (day_idx, day) in days.iter().enumerate() {
        let mut pool = eligible.clone();
        pool.shuffle(rng);

        // Deal everyone into the four cyclic buckets. Each person lands on
        // the successor of their last slot unless that bucket is already at
        // the balanced quota; overflow walks the cycle starting at a
        // day-keyed offset so the same bucket never soaks it up every day.
        let quota = pool.len().div_ceil(4);
        let mut buckets: [Vec<&MemberGroup>; 4] = Default::default();
        for member in pool {
            let start = slot_index(next_slot(last_slot.get(member.name.as_str()).copied()));
            let target = if buckets[start].len() < quota {
                start
            } else {
                (0..4)
                    .map(|k| (start + day_idx + k) % 4)
                    .find(|&idx| buckets[idx].len() < quota)
                    .unwrap_or(start)
            };
            buckets[target].push(member);
        }

        let [mut shift1, mut shift2, mut shift3, mut off] = buckets;

        apply_shift_policies(&mut shift1, &mut off, true, rng);
        apply_shift_policies(&mut shift2, &mut off, false, rng);
        apply_shift_policies(&mut shift3, &mut off, false, rng);

        backfill_from_off(&mut shift1, &mut off);
        backfill_from_off(&mut shift2, &mut off);
        backfill_from_off(&mut shift3, &mut off);

        let mut assignment = DayAssignment::new();
        for (slot, bucket) in [
            (ShiftSlot::First, &shift1),
            (ShiftSlot::Second, &shift2),
            (ShiftSlot::Third, &shift3),
            (ShiftSlot::Off, &off),
        ] {
            for member in bucket {
                assignment.insert(member.name.clone(), slot);
                last_slot.insert(member.name.as_str(), slot);
            }
        }
        schedule.insert(iso_key(day), assignment);
    }

    Ok(schedule)
}

/// Group rules for one work shift. Evicted members land in the off bucket.
///
/// Shift 1: no "backend+" at all, at most one "south".
/// Shifts 2 and 3: at most one "backend+".
/// Any shift: "backend+" may not be the sole occupant, and at most
/// PER_SHIFT members stay on.
fn apply_shift_policies<'a, R: Rng>(
    shift: &mut Vec<&'a MemberGroup>,
    off: &mut Vec<&'a MemberGroup>,
    first_shift: bool,
    rng: &mut R,
) {
    if first_shift {
        let (kept, evicted): (Vec<_>, Vec<_>) =
            shift.drain(..).partition(|m| !is_backend_plus(m));
        *shift = kept;
        off.extend(evicted);
        keep_at_most_one(shift, off, rng, is_south);
    } else {
        keep_at_most_one(shift, off, rng, is_backend_plus);
    }

    if shift.len() == 1 && is_backend_plus(shift[0]) {
        off.extend(shift.pop());
    }

    if shift.len() > PER_SHIFT {
        off.append(&mut shift.split_off(PER_SHIFT));
    }
}

/// Keep one randomly chosen member matching `matches`, move the rest off.
fn keep_at_most_one<'a, R: Rng>(
    shift: &mut Vec<&'a MemberGroup>,
    off: &mut Vec<&'a MemberGroup>,
    rng: &mut R,
    matches: fn(&MemberGroup) -> bool,
) {
    let hits: Vec<usize> = shift
        .iter()
        .enumerate()
        .filter(|(_, m)| matches(m))
        .map(|(idx, _)| idx)
        .collect();
    if hits.len() <= 1 {
        return;
    }

    let keep = hits[rng.gen_range(0..hits.len())];
    for &idx in hits.iter().rev() {
        if idx != keep {
            off.push(shift.remove(idx));
        }
    }
}

/// Pull the first available off member into an empty work shift. The
/// backfilled member is alone on the shift, so "backend+" is skipped.
fn backfill_from_off<'a>(shift: &mut Vec<&'a MemberGroup>, off: &mut Vec<&'a MemberGroup>) {
    if !shift.is_empty() {
        return;
    }
    if let Some(pos) = off.iter().position(|m| !is_backend_plus(m)) {
        shift.push(off.remove(pos));
    }
}

fn is_backend_plus(member: &MemberGroup) -> bool {
    member.canonical_group() == "backend+"
}

fn is_south(member: &MemberGroup) -> bool {
    member.canonical_group() == "south"
}

/// Cyclic rotation 1 -> 2 -> 3 -> off -> 1; unknown starts at shift 1.
fn next_slot(last: Option<ShiftSlot>) -> ShiftSlot {
    match last {
        None => ShiftSlot::First,
        Some(ShiftSlot::First) => ShiftSlot::Second,
        Some(ShiftSlot::Second) => ShiftSlot::Third,
        Some(ShiftSlot::Third) => ShiftSlot::Off,
        Some(ShiftSlot::Off) => ShiftSlot::First,
    }
}

fn slot_index(slot: ShiftSlot) -> usize {
    match slot {
        ShiftSlot::First => 0,
        ShiftSlot::Second => 1,
        ShiftSlot::Third => 2,
        ShiftSlot::Off => 3,
    }
}

fn iso_key(day: &NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// All calendar days of the month starting at `first`, in order.
pub fn month_days(first: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut cursor = first;
    while cursor.month() == first.month() && cursor.year() == first.year() {
        days.push(cursor);
        cursor = match cursor.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn member(name: &str, group: Option<&str>) -> MemberGroup {
        MemberGroup {
            name: name.to_string(),
            group: group.map(|g| g.to_string()),
        }
    }

    fn mixed_roster() -> Vec<MemberGroup> {
        vec![
            member("Alice", Some("NORTH")),
            member("Bob", Some("NORTH")),
            member("Carol", Some("SOUTH")),
            member("Dave", Some("SOUTH")),
            member("Erin", Some("south")),
            member("Frank", Some("BACKEND+")),
            member("Grace", Some("backend+")),
            member("Heidi", Some("BACKEND")),
            member("Ivan", None),
        ]
    }

    fn groups_by_name(roster: &[MemberGroup]) -> HashMap<String, String> {
        roster
            .iter()
            .map(|m| (m.name.clone(), m.canonical_group()))
            .collect()
    }

    fn shift_members(day: &DayAssignment, slot: ShiftSlot) -> Vec<&str> {
        day.iter()
            .filter(|(_, s)| **s == slot)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    #[test]
    fn next_slot_follows_the_cycle() {
        assert_eq!(next_slot(None), ShiftSlot::First);
        assert_eq!(next_slot(Some(ShiftSlot::First)), ShiftSlot::Second);
        assert_eq!(next_slot(Some(ShiftSlot::Second)), ShiftSlot::Third);
        assert_eq!(next_slot(Some(ShiftSlot::Third)), ShiftSlot::Off);
        assert_eq!(next_slot(Some(ShiftSlot::Off)), ShiftSlot::First);
    }

    #[test]
    fn covers_every_day_of_a_leap_february() {
        let roster = mixed_roster();
        let mut rng = StdRng::seed_from_u64(7);
        let schedule = generate_month_with(&roster, 2024, 2, None, &mut rng).unwrap();

        assert_eq!(schedule.len(), 29);
        assert!(schedule.contains_key("2024-02-01"));
        assert!(schedule.contains_key("2024-02-29"));
    }

    #[test]
    fn empty_roster_yields_empty_days_not_an_error() {
        let schedule = generate_month(&[], 2024, 1, None).unwrap();
        assert_eq!(schedule.len(), 31);
        assert!(schedule.values().all(|day| day.is_empty()));
    }

    #[test]
    fn rejects_invalid_month() {
        let err = generate_month(&mixed_roster(), 2024, 13, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidMonth { .. }));
    }

    #[test]
    fn backend_members_are_never_scheduled() {
        // Scenario: Alice (NORTH) and Bob (BACKEND), January 2024.
        let roster = vec![member("Alice", Some("NORTH")), member("Bob", Some("BACKEND"))];
        let mut rng = StdRng::seed_from_u64(11);
        let schedule = generate_month_with(&roster, 2024, 1, None, &mut rng).unwrap();

        assert_eq!(schedule.len(), 31);
        for day in schedule.values() {
            assert!(!day.contains_key("Bob"));
            assert!(day.contains_key("Alice"));
        }
    }

    #[test]
    fn group_policies_hold_for_every_day_and_seed() {
        let roster = mixed_roster();
        let groups = groups_by_name(&roster);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let schedule = generate_month_with(&roster, 2024, 3, None, &mut rng).unwrap();
            assert_eq!(schedule.len(), 31);

            for (key, day) in &schedule {
                // every eligible member gets an explicit slot each day
                assert_eq!(day.len(), 8, "day {} incomplete", key);

                for slot in [ShiftSlot::First, ShiftSlot::Second, ShiftSlot::Third] {
                    let on_shift = shift_members(day, slot);
                    assert!(on_shift.len() <= PER_SHIFT, "cap exceeded on {}", key);

                    let mut backend_plus = 0;
                    let mut south = 0;
                    for name in &on_shift {
                        match groups[*name].as_str() {
                            "backend+" => backend_plus += 1,
                            "south" => south += 1,
                            _ => {}
                        }
                    }
                    if slot == ShiftSlot::First {
                        assert_eq!(backend_plus, 0, "backend+ on shift 1 on {}", key);
                        assert!(south <= 1, "two south members on shift 1 on {}", key);
                    } else {
                        assert!(backend_plus <= 1, "multiple backend+ on {}", key);
                    }
                    if on_shift.len() == 1 {
                        assert_ne!(
                            groups[on_shift[0]], "backend+",
                            "lone backend+ occupant on {}",
                            key
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn empty_shift_means_off_bucket_had_nobody_available() {
        let roster = mixed_roster();
        let groups = groups_by_name(&roster);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let schedule = generate_month_with(&roster, 2024, 5, None, &mut rng).unwrap();

            for (key, day) in &schedule {
                let any_empty = [ShiftSlot::First, ShiftSlot::Second, ShiftSlot::Third]
                    .iter()
                    .any(|slot| shift_members(day, *slot).is_empty());
                if any_empty {
                    let mut spare_off = false;
                    for name in shift_members(day, ShiftSlot::Off) {
                        if groups[name] != "backend+" {
                            spare_off = true;
                        }
                    }
                    assert!(!spare_off, "shift left empty despite available member on {}", key);
                }
            }
        }
    }

    #[test]
    fn all_backend_plus_roster_never_fills_shift_one() {
        // Scenario: four backend+ members and nobody else.
        let roster = vec![
            member("P1", Some("BACKEND+")),
            member("P2", Some("BACKEND+")),
            member("P3", Some("BACKEND+")),
            member("P4", Some("BACKEND+")),
        ];

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let schedule = generate_month_with(&roster, 2024, 4, None, &mut rng).unwrap();

            for (key, day) in &schedule {
                assert_eq!(day.len(), 4);
                assert!(
                    shift_members(day, ShiftSlot::First).is_empty(),
                    "backend+ reached shift 1 on {}",
                    key
                );
                for slot in [ShiftSlot::Second, ShiftSlot::Third] {
                    let on_shift = shift_members(day, slot);
                    assert!(on_shift.len() <= PER_SHIFT);
                    assert_ne!(on_shift.len(), 1, "lone backend+ occupant on {}", key);
                }
            }
        }
    }

    #[test]
    fn prior_day_seeds_the_rotation() {
        let roster = vec![member("Alice", Some("NORTH"))];

        // Alice worked shift 1 on the last day of the previous month, so the
        // first generated day must rotate her to shift 2.
        let mut prior = DayAssignment::new();
        prior.insert("Alice".to_string(), ShiftSlot::First);
        let mut rng = StdRng::seed_from_u64(3);
        let schedule = generate_month_with(&roster, 2024, 6, Some(&prior), &mut rng).unwrap();
        assert_eq!(schedule["2024-06-01"]["Alice"], ShiftSlot::Second);

        // An explicit off rotates back to shift 1.
        let mut prior = DayAssignment::new();
        prior.insert("Alice".to_string(), ShiftSlot::Off);
        let mut rng = StdRng::seed_from_u64(3);
        let schedule = generate_month_with(&roster, 2024, 6, Some(&prior), &mut rng).unwrap();
        assert_eq!(schedule["2024-06-01"]["Alice"], ShiftSlot::First);

        // No record at all defaults to shift 1.
        let mut rng = StdRng::seed_from_u64(3);
        let schedule = generate_month_with(&roster, 2024, 6, None, &mut rng).unwrap();
        assert_eq!(schedule["2024-06-01"]["Alice"], ShiftSlot::First);
    }

    #[test]
    fn malformed_group_tags_behave_like_no_group() {
        let roster = vec![member("Alice", Some("  weird tag  ")), member("Bob", None)];
        let mut rng = StdRng::seed_from_u64(5);
        let schedule = generate_month_with(&roster, 2024, 7, None, &mut rng).unwrap();

        for day in schedule.values() {
            assert!(day.contains_key("Alice"));
            assert!(day.contains_key("Bob"));
        }
    }
}
