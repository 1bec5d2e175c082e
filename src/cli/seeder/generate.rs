//! Fake data generation. Pure and parallel; nothing here touches the
//! database.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use sams_core::Role;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::models::{ClassSeed, SlotSeed, StudentSeed, UserSeed};

const SUBJECTS: [(&str, &str); 8] = [
    ("MTH", "Mathematics"),
    ("PHY", "Physics"),
    ("CHM", "Chemistry"),
    ("BIO", "Biology"),
    ("CSE", "Computer Science"),
    ("ENG", "English Literature"),
    ("HIS", "History"),
    ("ECO", "Economics"),
];

/// Seeded accounts share this domain so `clear-seed` can find them.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";

/// Hourly slots from 08:00 to 16:00.
pub fn time_slots() -> Vec<SlotSeed> {
    (8..16)
        .filter_map(|hour| {
            Some(SlotSeed {
                start_time: NaiveTime::from_hms_opt(hour, 0, 0)?,
                end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0)?,
            })
        })
        .collect()
}

fn email_part(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn fake_user(role: Role, idx: usize) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let email = format!(
        "{}.{}+{}{}@{}",
        email_part(&first_name),
        email_part(&last_name),
        role.as_str().to_lowercase(),
        idx,
        SEED_EMAIL_DOMAIN
    );
    let department = (role == Role::Teacher).then(|| SUBJECTS[idx % SUBJECTS.len()].1.to_string());

    UserSeed {
        full_name: format!("{} {}", first_name, last_name),
        email,
        role,
        department,
    }
}

pub fn users(role: Role, count: usize) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| fake_user(role, idx))
        .collect()
}

/// Classes spread over the teachers and slots round-robin.
pub fn classes(teacher_ids: &[Uuid], slot_ids: &[Uuid], per_teacher: usize) -> Vec<ClassSeed> {
    if slot_ids.is_empty() {
        return Vec::new();
    }

    teacher_ids
        .iter()
        .flat_map(|&teacher_id| std::iter::repeat_n(teacher_id, per_teacher))
        .enumerate()
        .map(|(idx, teacher_id)| {
            let (prefix, subject) = SUBJECTS[idx % SUBJECTS.len()];
            ClassSeed {
                code: format!("{}{}", prefix, 101 + idx),
                title: subject.to_string(),
                time_slot_id: slot_ids[idx % slot_ids.len()],
                teacher_id,
            }
        })
        .collect()
}

pub fn students(user_ids: &[Uuid], parent_ids: &[Uuid], year: i32) -> Vec<StudentSeed> {
    user_ids
        .iter()
        .enumerate()
        .filter_map(|(idx, &user_id)| {
            Some(StudentSeed {
                user_id,
                roll_no: format!("R{}{:04}", year, idx + 1),
                parent_id: *parent_ids.get(idx / 2)?,
            })
        })
        .collect()
}

/// Each student joins `per_student` distinct classes picked at random.
pub fn enrollments(student_ids: &[Uuid], class_ids: &[Uuid], per_student: usize) -> Vec<(Uuid, Uuid)> {
    student_ids
        .par_iter()
        .flat_map_iter(|&student_id| {
            let mut rng = rand::thread_rng();
            class_ids
                .choose_multiple(&mut rng, per_student.min(class_ids.len()))
                .map(|&class_id| (student_id, class_id))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The last `count` weekdays strictly before `today`, oldest first.
pub fn school_days(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = today;
    while days.len() < count {
        let Some(previous) = day.pred_opt() else {
            break;
        };
        day = previous;
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
    }
    days.reverse();
    days
}

/// One `(student, class, date, status, marked_by)` row per enrollment and
/// day. Each student gets a presence rate between 50% and 98%, so some fall
/// under the alert threshold.
pub fn attendance(
    enrollments: &[(Uuid, Uuid)],
    class_teachers: &HashMap<Uuid, Uuid>,
    days: &[NaiveDate],
) -> Vec<(Uuid, Uuid, NaiveDate, i16, Uuid)> {
    let rates: HashMap<Uuid, f64> = enrollments
        .iter()
        .map(|(student_id, _)| *student_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .map(|student_id| (student_id, rand::thread_rng().gen_range(0.5..0.98)))
        .collect();

    enrollments
        .par_iter()
        .filter_map(|(student_id, class_id)| {
            let teacher_id = *class_teachers.get(class_id)?;
            let rate = *rates.get(student_id)?;
            let mut rng = rand::thread_rng();
            Some(
                days.iter()
                    .map(|&date| {
                        let status = i16::from(rng.gen_bool(rate));
                        (*student_id, *class_id, date, status, teacher_id)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .flatten_iter()
        .collect()
}
