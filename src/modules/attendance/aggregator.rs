//! Attendance roll-ups.
//!
//! Pure functions over rows that were already filtered by student and/or
//! class. Nothing here touches the database.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use sams_models::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, ClassAttendanceSummary, ClassId,
    RosterEntry, StudentProfile,
};

/// Two-decimal rounding; exact halves go to the even neighbour.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Percentage of `present` out of `total`, 0 when there is nothing to count.
pub fn percentage(present: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(present as f64 / total as f64 * 100.0)
}

/// Tallies statuses.
pub fn summarize<I>(statuses: I) -> AttendanceSummary
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let (present, absent) = statuses
        .into_iter()
        .fold((0i64, 0i64), |(p, a), status| match status {
            AttendanceStatus::Present => (p + 1, a),
            AttendanceStatus::Absent => (p, a + 1),
        });
    let total = present + absent;

    AttendanceSummary {
        present,
        absent,
        total,
        percentage: percentage(present, total),
    }
}

pub fn summarize_records(records: &[AttendanceRecord]) -> AttendanceSummary {
    summarize(records.iter().map(|r| r.status))
}

/// One student's rows grouped by class, in the order each class first
/// appears. Rows without a class are left out.
pub fn summarize_by_class(records: &[AttendanceRecord]) -> Vec<ClassAttendanceSummary> {
    let mut order: Vec<ClassId> = Vec::new();
    let mut groups: HashMap<ClassId, (sams_models::ClassRef, Vec<AttendanceStatus>)> =
        HashMap::new();

    for record in records {
        let Some(class) = record.class() else {
            continue;
        };
        groups
            .entry(class.id)
            .or_insert_with(|| {
                order.push(class.id);
                (class, Vec::new())
            })
            .1
            .push(record.status);
    }

    order
        .into_iter()
        .filter_map(|id| groups.remove(&id))
        .map(|(class, statuses)| ClassAttendanceSummary {
            class,
            summary: summarize(statuses),
        })
        .collect()
}

/// Number of distinct dates on which the class recorded any attendance.
pub fn classes_held<'a, I>(dates: I) -> i64
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    dates.into_iter().collect::<BTreeSet<_>>().len() as i64
}

/// Roster summary for one class. `records` are all of the class's rows;
/// every student in `students` gets an entry, zero-filled when they have
/// no rows.
pub fn roster_summary(
    students: &[StudentProfile],
    records: &[AttendanceRecord],
) -> Vec<RosterEntry> {
    let total_classes = classes_held(records.iter().map(|r| &r.date));

    let mut by_student: HashMap<_, Vec<AttendanceStatus>> = HashMap::new();
    for record in records {
        by_student
            .entry(record.student_id)
            .or_default()
            .push(record.status);
    }

    students
        .iter()
        .map(|student| {
            let summary = summarize(by_student.remove(&student.id).unwrap_or_default());
            RosterEntry {
                student: student.clone(),
                below_threshold: summary.is_below_threshold(),
                summary,
                total_classes,
            }
        })
        .collect()
}

/// Renders a percentage the way reports print it: whole numbers keep one
/// decimal place (`100.0`), others show at most two (`66.67`, `12.5`).
pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sams_models::{AttendanceId, ClassRef, Email, StudentId, UserId};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn record(
        student: StudentId,
        class: Option<&ClassRef>,
        day: u32,
        status: AttendanceStatus,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: AttendanceId::new(),
            student_id: student,
            class_id: class.map(|c| c.id),
            class_code: class.map(|c| c.code.clone()),
            class_title: class.map(|c| c.title.clone()),
            date: date(day),
            status,
            remarks: None,
        }
    }

    fn class(code: &str) -> ClassRef {
        ClassRef {
            id: ClassId::new(),
            code: code.to_string(),
            title: format!("{} title", code),
        }
    }

    fn profile(roll: &str) -> StudentProfile {
        StudentProfile {
            id: StudentId::new(),
            user_id: UserId::new(),
            roll_no: roll.to_string(),
            full_name: format!("Student {}", roll),
            email: Email::new_unchecked(format!("{}@school.edu", roll)),
            parent_id: None,
        }
    }

    use AttendanceStatus::{Absent, Present};

    #[test]
    fn test_zero_total_is_zero_percent() {
        let summary = summarize(Vec::new());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percentage, 0.0);
    }

    #[test]
    fn test_two_present_one_absent() {
        let summary = summarize([Present, Present, Absent]);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.percentage, 66.67);
    }

    #[test]
    fn test_counts_always_add_up() {
        let statuses = [Present, Absent, Absent, Present, Present, Absent, Present];
        for n in 0..=statuses.len() {
            let s = summarize(statuses[..n].iter().copied());
            assert_eq!(s.present + s.absent, s.total);
            assert!((0.0..=100.0).contains(&s.percentage));
        }
    }

    #[test]
    fn test_rounding() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(1, 8), 12.5);
        assert_eq!(percentage(3, 4), 75.0);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_exact_halves_round_to_even() {
        assert_eq!(percentage(1, 32), 3.12);
        assert_eq!(percentage(5, 32), 15.62);
        assert_eq!(percentage(1, 160), 0.62);
        assert_eq!(percentage(3, 32), 9.38);
    }

    #[test]
    fn test_by_class_keeps_first_seen_order_and_skips_classless_rows() {
        let s = StudentId::new();
        let physics = class("PHY");
        let maths = class("MTH");
        let records = vec![
            record(s, Some(&physics), 3, Present),
            record(s, None, 3, Absent),
            record(s, Some(&maths), 2, Absent),
            record(s, Some(&physics), 1, Absent),
        ];

        let summaries = summarize_by_class(&records);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].class.code, "PHY");
        assert_eq!(summaries[0].summary.total, 2);
        assert_eq!(summaries[0].summary.percentage, 50.0);
        assert_eq!(summaries[1].class.code, "MTH");
        assert_eq!(summaries[1].summary.percentage, 0.0);
    }

    #[test]
    fn test_classes_held_counts_distinct_dates() {
        let dates = [date(1), date(1), date(2), date(5)];
        assert_eq!(classes_held(dates.iter()), 3);
        assert_eq!(classes_held(std::iter::empty::<&NaiveDate>()), 0);
    }

    #[test]
    fn test_roster_total_classes_independent_of_student() {
        let c = class("CS");
        let a = profile("A");
        let b = profile("B");
        let newcomer = profile("C");
        let records = vec![
            record(a.id, Some(&c), 1, Present),
            record(a.id, Some(&c), 2, Present),
            record(b.id, Some(&c), 1, Absent),
            record(a.id, Some(&c), 3, Absent),
            record(b.id, Some(&c), 3, Present),
        ];

        let roster = roster_summary(&[a.clone(), b.clone(), newcomer.clone()], &records);
        assert_eq!(roster.len(), 3);

        assert_eq!(roster[0].student.id, a.id);
        assert_eq!(roster[0].summary.total, 3);
        assert_eq!(roster[0].summary.percentage, 66.67);
        assert!(roster[0].below_threshold);

        assert_eq!(roster[1].summary.total, 2);
        assert_eq!(roster[1].summary.percentage, 50.0);

        assert_eq!(roster[2].summary.total, 0);
        assert!(roster.iter().all(|e| e.total_classes == 3));
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(100.0), "100.0");
        assert_eq!(format_percentage(0.0), "0.0");
        assert_eq!(format_percentage(66.67), "66.67");
        assert_eq!(format_percentage(12.5), "12.5");
    }
}
