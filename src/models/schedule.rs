//! Schedule (solution) model.
//!
//! A schedule is a set of hour-long entries keyed by `(time_slot,
//! location_id)`. Besides the primary map it maintains the secondary
//! indexes the search queries on every step (teachers and class-groups
//! per slot, teachers and days per lesson), so inserts and removals keep
//! every exclusivity invariant checkable in constant time.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use super::{ClassGroupKey, TimeSlot, Weekday};
use crate::error::ScheduleConflict;

/// One occupied (slot, location): a teacher teaching a lesson to a class-group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Scheduled lesson.
    pub lesson_id: String,
    /// Teaching teacher.
    pub teacher_id: String,
    /// Occupied location.
    pub location_id: String,
    /// Occupied hour.
    pub time_slot: TimeSlot,
    /// Attending class-group (denormalized from the lesson).
    pub class_group: ClassGroupKey,
}

impl ScheduleEntry {
    /// Creates a new entry.
    pub fn new(
        lesson_id: impl Into<String>,
        teacher_id: impl Into<String>,
        location_id: impl Into<String>,
        time_slot: TimeSlot,
        class_group: ClassGroupKey,
    ) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            teacher_id: teacher_id.into(),
            location_id: location_id.into(),
            time_slot,
            class_group,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SlotOccupancy {
    locations: BTreeMap<String, ScheduleEntry>,
    teachers: HashSet<String>,
    /// class-group -> (lesson id, entry count); dual lessons hold two entries.
    class_groups: HashMap<ClassGroupKey, (String, usize)>,
}

/// A weekly timetable.
///
/// Invariants enforced by [`Schedule::insert`]:
/// - one entry per `(time_slot, location_id)`;
/// - one entry per `(time_slot, teacher_id)`;
/// - one lesson per `(time_slot, class_group)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ScheduleEntry>", into = "Vec<ScheduleEntry>")]
pub struct Schedule {
    by_slot: BTreeMap<TimeSlot, SlotOccupancy>,
    lesson_teachers: HashMap<String, HashMap<String, usize>>,
    lesson_days: HashMap<String, HashMap<Weekday, usize>>,
    len: usize,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, rejecting it if any exclusivity invariant would break.
    pub fn insert(&mut self, entry: ScheduleEntry) -> Result<(), ScheduleConflict> {
        if let Some(occ) = self.by_slot.get(&entry.time_slot) {
            if let Some(existing) = occ.locations.get(&entry.location_id) {
                return Err(ScheduleConflict::LocationTaken {
                    location_id: entry.location_id,
                    slot: entry.time_slot,
                    lesson_id: existing.lesson_id.clone(),
                });
            }
            if occ.teachers.contains(&entry.teacher_id) {
                return Err(ScheduleConflict::TeacherBusy {
                    teacher_id: entry.teacher_id,
                    slot: entry.time_slot,
                });
            }
            if let Some((lesson_id, _)) = occ.class_groups.get(&entry.class_group) {
                if *lesson_id != entry.lesson_id {
                    return Err(ScheduleConflict::ClassGroupBusy {
                        class_group: entry.class_group,
                        slot: entry.time_slot,
                        lesson_id: lesson_id.clone(),
                    });
                }
            }
        }

        *self
            .lesson_teachers
            .entry(entry.lesson_id.clone())
            .or_default()
            .entry(entry.teacher_id.clone())
            .or_insert(0) += 1;
        *self
            .lesson_days
            .entry(entry.lesson_id.clone())
            .or_default()
            .entry(entry.time_slot.day)
            .or_insert(0) += 1;

        let occ = self.by_slot.entry(entry.time_slot).or_default();
        occ.teachers.insert(entry.teacher_id.clone());
        occ.class_groups
            .entry(entry.class_group.clone())
            .or_insert_with(|| (entry.lesson_id.clone(), 0))
            .1 += 1;
        occ.locations.insert(entry.location_id.clone(), entry);
        self.len += 1;
        Ok(())
    }

    /// Removes the entry at `(slot, location_id)`, undoing every index update.
    pub fn remove(&mut self, slot: &TimeSlot, location_id: &str) -> Option<ScheduleEntry> {
        let (entry, now_empty) = {
            let occ = self.by_slot.get_mut(slot)?;
            let entry = occ.locations.remove(location_id)?;
            occ.teachers.remove(&entry.teacher_id);
            if let Some(group) = occ.class_groups.get_mut(&entry.class_group) {
                group.1 -= 1;
                if group.1 == 0 {
                    occ.class_groups.remove(&entry.class_group);
                }
            }
            (entry, occ.locations.is_empty())
        };
        if now_empty {
            self.by_slot.remove(slot);
        }

        release(&mut self.lesson_teachers, &entry.lesson_id, &entry.teacher_id);
        release(&mut self.lesson_days, &entry.lesson_id, &entry.time_slot.day);
        self.len -= 1;
        Some(entry)
    }

    /// The entry at `(slot, location_id)`.
    pub fn get(&self, slot: &TimeSlot, location_id: &str) -> Option<&ScheduleEntry> {
        self.by_slot
            .get(slot)
            .and_then(|occ| occ.locations.get(location_id))
    }

    /// All entries, ordered by slot then location id.
    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.by_slot
            .values()
            .flat_map(|occ| occ.locations.values())
    }

    /// Entries in one slot.
    pub fn entries_at(&self, slot: &TimeSlot) -> impl Iterator<Item = &ScheduleEntry> {
        self.by_slot
            .get(slot)
            .into_iter()
            .flat_map(|occ| occ.locations.values())
    }

    /// Entries of a lesson.
    pub fn entries_for_lesson<'a>(
        &'a self,
        lesson_id: &'a str,
    ) -> impl Iterator<Item = &'a ScheduleEntry> + 'a {
        self.entries().filter(move |e| e.lesson_id == lesson_id)
    }

    /// Entries taught by a teacher.
    pub fn entries_for_teacher<'a>(
        &'a self,
        teacher_id: &'a str,
    ) -> impl Iterator<Item = &'a ScheduleEntry> + 'a {
        self.entries().filter(move |e| e.teacher_id == teacher_id)
    }

    /// Entries attended by a class-group.
    pub fn entries_for_class_group<'a>(
        &'a self,
        class_group: &'a ClassGroupKey,
    ) -> impl Iterator<Item = &'a ScheduleEntry> + 'a {
        self.entries().filter(move |e| &e.class_group == class_group)
    }

    /// Whether `location_id` is free at `slot`.
    #[inline]
    pub fn is_location_free(&self, slot: &TimeSlot, location_id: &str) -> bool {
        self.get(slot, location_id).is_none()
    }

    /// Whether `teacher_id` already teaches at `slot`.
    #[inline]
    pub fn is_teacher_busy(&self, slot: &TimeSlot, teacher_id: &str) -> bool {
        self.by_slot
            .get(slot)
            .is_some_and(|occ| occ.teachers.contains(teacher_id))
    }

    /// The lesson a class-group attends at `slot`, if any.
    #[inline]
    pub fn class_group_lesson_at(&self, slot: &TimeSlot, class_group: &ClassGroupKey) -> Option<&str> {
        self.by_slot
            .get(slot)
            .and_then(|occ| occ.class_groups.get(class_group))
            .map(|(lesson_id, _)| lesson_id.as_str())
    }

    /// Distinct teachers used by a lesson so far.
    pub fn lesson_teacher_ids(&self, lesson_id: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .lesson_teachers
            .get(lesson_id)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Whether a lesson already uses `teacher_id`.
    pub fn lesson_uses_teacher(&self, lesson_id: &str, teacher_id: &str) -> bool {
        self.lesson_teachers
            .get(lesson_id)
            .is_some_and(|m| m.contains_key(teacher_id))
    }

    /// Number of distinct teachers used by a lesson so far.
    pub fn lesson_teacher_count(&self, lesson_id: &str) -> usize {
        self.lesson_teachers.get(lesson_id).map_or(0, HashMap::len)
    }

    /// Days on which a lesson already has entries, in calendar order.
    pub fn lesson_days(&self, lesson_id: &str) -> Vec<Weekday> {
        let mut days: Vec<Weekday> = self
            .lesson_days
            .get(lesson_id)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        days.sort_unstable();
        days
    }

    /// Whether a lesson already has an entry on `day`.
    pub fn lesson_uses_day(&self, lesson_id: &str, day: Weekday) -> bool {
        self.lesson_days
            .get(lesson_id)
            .is_some_and(|m| m.contains_key(&day))
    }

    /// Whether a lesson has any entry.
    pub fn has_lesson(&self, lesson_id: &str) -> bool {
        self.lesson_teachers.contains_key(lesson_id)
    }

    /// Wall-clock hours placed for a lesson (distinct slots; dual hours count once).
    pub fn hours_for_lesson(&self, lesson_id: &str) -> usize {
        self.by_slot
            .values()
            .filter(|occ| occ.locations.values().any(|e| e.lesson_id == lesson_id))
            .count()
    }

    /// Occupied slots, sorted.
    pub fn occupied_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.by_slot.keys()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the schedule has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn release<K: Eq + Hash>(map: &mut HashMap<String, HashMap<K, usize>>, lesson_id: &str, key: &K) {
    let Some(counts) = map.get_mut(lesson_id) else {
        return;
    };
    if let Some(count) = counts.get_mut(key) {
        *count -= 1;
        if *count == 0 {
            counts.remove(key);
        }
    }
    if counts.is_empty() {
        map.remove(lesson_id);
    }
}

impl TryFrom<Vec<ScheduleEntry>> for Schedule {
    type Error = ScheduleConflict;

    fn try_from(entries: Vec<ScheduleEntry>) -> Result<Self, Self::Error> {
        let mut schedule = Schedule::new();
        for entry in entries {
            schedule.insert(entry)?;
        }
        Ok(schedule)
    }
}

impl From<Schedule> for Vec<ScheduleEntry> {
    fn from(schedule: Schedule) -> Self {
        schedule
            .by_slot
            .into_values()
            .flat_map(|occ| occ.locations.into_values())
            .collect()
    }
}

/// A property violated by a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (lesson, teacher, location, or class-group).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A teacher teaches two entries in one hour.
    TeacherDoubleBooked,
    /// Two lessons of one class-group share an hour.
    ClassGroupDoubleBooked,
    /// A teacher teaches in a slot they marked unavailable.
    TeacherUnavailable,
    /// A lesson runs in a location of the wrong type.
    UnsuitableLocation,
    /// A lesson is spread over more distinct teachers than allowed.
    TooManyTeachers,
    /// A lesson's placed hours differ from its weekly hours.
    IncompleteLesson,
    /// Both halves of a long split lesson are on one day.
    SplitSameDay,
    /// A dual-resource hour does not have exactly two entries.
    DualPairMismatch,
    /// An entry references an unknown lesson, teacher or location.
    UnknownReference,
    /// An entry sits outside the usable week.
    InvalidSlot,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let severity = match violation_type {
            ViolationType::TeacherDoubleBooked | ViolationType::ClassGroupDoubleBooked => 100,
            ViolationType::UnknownReference | ViolationType::InvalidSlot => 95,
            ViolationType::TeacherUnavailable | ViolationType::UnsuitableLocation => 90,
            ViolationType::IncompleteLesson | ViolationType::DualPairMismatch => 80,
            ViolationType::TooManyTeachers | ViolationType::SplitSameDay => 60,
        };
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> ClassGroupKey {
        ClassGroupKey::new("mech", 11)
    }

    fn mon(hour: u8) -> TimeSlot {
        TimeSlot::new(Weekday::Monday, hour)
    }

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.insert(ScheduleEntry::new("L1", "T1", "R1", mon(1), group())).unwrap();
        s.insert(ScheduleEntry::new("L1", "T1", "R1", mon(2), group())).unwrap();
        s.insert(ScheduleEntry::new("L2", "T2", "R2", mon(1), ClassGroupKey::new("mech", 12)))
            .unwrap();
        s
    }

    #[test]
    fn test_insert_and_query() {
        let s = sample_schedule();
        assert_eq!(s.len(), 3);
        assert!(!s.is_location_free(&mon(1), "R1"));
        assert!(s.is_location_free(&mon(3), "R1"));
        assert!(s.is_teacher_busy(&mon(2), "T1"));
        assert!(!s.is_teacher_busy(&mon(2), "T2"));
        assert_eq!(s.class_group_lesson_at(&mon(1), &group()), Some("L1"));
        assert_eq!(s.lesson_teacher_ids("L1"), vec!["T1"]);
        assert_eq!(s.lesson_days("L1"), vec![Weekday::Monday]);
        assert_eq!(s.hours_for_lesson("L1"), 2);
        assert_eq!(s.entries_for_teacher("T2").count(), 1);
        assert_eq!(s.entries_at(&mon(1)).count(), 2);

        let g = group();
        let slots: Vec<TimeSlot> = s.entries_for_class_group(&g).map(|e| e.time_slot).collect();
        assert_eq!(slots, vec![mon(1), mon(2)]);
        let mech = ClassGroupKey::new("mech", 12);
        assert_eq!(s.entries_for_class_group(&mech).count(), 1);
        assert_eq!(s.entries_for_class_group(&ClassGroupKey::new("none", 1)).count(), 0);
    }

    #[test]
    fn test_insert_rejects_location_conflict() {
        let mut s = sample_schedule();
        let err = s
            .insert(ScheduleEntry::new("L3", "T3", "R1", mon(1), ClassGroupKey::new("x", 9)))
            .unwrap_err();
        assert!(matches!(err, ScheduleConflict::LocationTaken { .. }));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_insert_rejects_teacher_conflict() {
        let mut s = sample_schedule();
        let err = s
            .insert(ScheduleEntry::new("L3", "T1", "R9", mon(1), ClassGroupKey::new("x", 9)))
            .unwrap_err();
        assert!(matches!(err, ScheduleConflict::TeacherBusy { .. }));
    }

    #[test]
    fn test_insert_rejects_class_group_conflict_but_allows_dual_pair() {
        let mut s = sample_schedule();
        let err = s
            .insert(ScheduleEntry::new("L3", "T3", "R3", mon(1), group()))
            .unwrap_err();
        assert!(matches!(err, ScheduleConflict::ClassGroupBusy { .. }));

        // Second group of the same lesson in the same hour is fine.
        s.insert(ScheduleEntry::new("L1", "T3", "R3", mon(1), group())).unwrap();
        assert_eq!(s.lesson_teacher_count("L1"), 2);
        assert_eq!(s.hours_for_lesson("L1"), 2);
    }

    #[test]
    fn test_remove_restores_exact_state() {
        let before = sample_schedule();
        let mut s = before.clone();
        s.insert(ScheduleEntry::new("L1", "T3", "R3", mon(1), group())).unwrap();
        s.insert(ScheduleEntry::new("L9", "T9", "R9", TimeSlot::new(Weekday::Friday, 5), group()))
            .unwrap();
        assert_ne!(s, before);

        s.remove(&TimeSlot::new(Weekday::Friday, 5), "R9").unwrap();
        s.remove(&mon(1), "R3").unwrap();
        assert_eq!(s, before);
        assert!(s.remove(&mon(7), "R1").is_none());
    }

    #[test]
    fn test_remove_updates_indexes() {
        let mut s = sample_schedule();
        s.remove(&mon(1), "R1").unwrap();
        s.remove(&mon(2), "R1").unwrap();
        assert!(!s.has_lesson("L1"));
        assert!(s.lesson_days("L1").is_empty());
        assert_eq!(s.class_group_lesson_at(&mon(1), &group()), None);
        assert!(!s.is_teacher_busy(&mon(1), "T1"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_serializes_as_entry_list() {
        let s = sample_schedule();
        let json = serde_json::to_string(&s).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));

        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);

        let clash = serde_json::json!([
            {"lesson_id": "A", "teacher_id": "T1", "location_id": "R1",
             "time_slot": {"day": "Monday", "hour": 1},
             "class_group": {"branch_id": "x", "grade_level": 9}},
            {"lesson_id": "B", "teacher_id": "T2", "location_id": "R1",
             "time_slot": {"day": "Monday", "hour": 1},
             "class_group": {"branch_id": "y", "grade_level": 9}}
        ]);
        assert!(serde_json::from_value::<Schedule>(clash).is_err());
    }

    #[test]
    fn test_violation_severity() {
        let v = Violation::new(ViolationType::TeacherDoubleBooked, "T1", "twice at Mon#1");
        assert_eq!(v.severity, 100);
        assert_eq!(v.entity_id, "T1");
        let v = Violation::new(ViolationType::SplitSameDay, "L1", "same day");
        assert_eq!(v.severity, 60);
    }
}
