//! Timetable quality metrics (KPIs).
//!
//! Computes descriptive indicators from a finished timetable and its input.
//! None of them affect the search; they help compare runs with different
//! seeds.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Teacher hours | Entries taught per teacher |
//! | Location utilization | Occupied slots / usable slots, per location |
//! | Avg Utilization | Mean location utilization |
//! | Idle gaps | Free hours between a class-group's first and last lesson of a day |
//! | Days used | Distinct weekdays with lessons, per class-group |
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 2: the
//! school timetabling problem and its soft objectives

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::SchedulerInput;
use crate::models::{ClassGroupKey, Schedule, Weekday};

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Entries taught per teacher (dual hours count for both teachers).
    pub teacher_hours: HashMap<String, usize>,
    /// Per-location utilization (0.0..1.0).
    pub utilization_by_location: HashMap<String, f64>,
    /// Average location utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Total idle hours inside each class-group's school days.
    pub idle_gaps_by_class_group: HashMap<ClassGroupKey, u32>,
    /// Sum of all class-group idle gaps.
    pub total_idle_gaps: u32,
    /// Distinct weekdays with lessons, per class-group.
    pub days_used_by_class_group: HashMap<ClassGroupKey, usize>,
}

impl TimetableKpi {
    /// Computes KPIs from a timetable and its input.
    ///
    /// Locations with no usable slots report zero utilization.
    pub fn calculate(schedule: &Schedule, input: &SchedulerInput) -> Self {
        let mut teacher_hours: HashMap<String, usize> = input
            .teachers
            .iter()
            .map(|t| (t.id.clone(), 0))
            .collect();
        let mut location_hours: HashMap<&str, usize> = HashMap::new();
        let mut group_hours: HashMap<&ClassGroupKey, BTreeMap<Weekday, BTreeSet<u8>>> =
            HashMap::new();

        for entry in schedule.entries() {
            *teacher_hours.entry(entry.teacher_id.clone()).or_insert(0) += 1;
            *location_hours.entry(entry.location_id.as_str()).or_insert(0) += 1;
            group_hours
                .entry(&entry.class_group)
                .or_default()
                .entry(entry.time_slot.day)
                .or_default()
                .insert(entry.time_slot.hour);
        }

        let usable = input.time_slots.iter().collect::<BTreeSet<_>>().len();
        let utilization_by_location: HashMap<String, f64> = input
            .locations
            .iter()
            .map(|location| {
                let used = location_hours.get(location.id.as_str()).copied().unwrap_or(0);
                let ratio = if usable == 0 {
                    0.0
                } else {
                    used as f64 / usable as f64
                };
                (location.id.clone(), ratio)
            })
            .collect();
        let avg_utilization = if utilization_by_location.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_location.values().sum();
            sum / utilization_by_location.len() as f64
        };

        let mut idle_gaps_by_class_group = HashMap::new();
        let mut days_used_by_class_group = HashMap::new();
        for (group, days) in group_hours {
            let gaps: u32 = days.values().map(day_gaps).sum();
            idle_gaps_by_class_group.insert(group.clone(), gaps);
            days_used_by_class_group.insert(group.clone(), days.len());
        }
        let total_idle_gaps = idle_gaps_by_class_group.values().sum();

        Self {
            teacher_hours,
            utilization_by_location,
            avg_utilization,
            idle_gaps_by_class_group,
            total_idle_gaps,
            days_used_by_class_group,
        }
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_idle_gaps: u32, min_utilization: f64) -> bool {
        self.total_idle_gaps <= max_idle_gaps && self.avg_utilization >= min_utilization
    }
}

/// Free hours strictly between the first and last occupied hour.
fn day_gaps(hours: &BTreeSet<u8>) -> u32 {
    match (hours.first(), hours.last()) {
        (Some(&first), Some(&last)) => {
            u32::from(last - first) + 1 - hours.len() as u32
        }
        _ => 0,
    }
}
