use chrono::NaiveTime;
use sams_core::Role;
use uuid::Uuid;

/// How much demo data to create.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub teachers: usize,
    pub classes_per_teacher: usize,
    pub students: usize,
    /// Each student joins this many classes, or every class if fewer exist.
    pub classes_per_student: usize,
    /// Weekdays of attendance to back-fill, ending yesterday.
    pub days: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            teachers: 4,
            classes_per_teacher: 2,
            students: 40,
            classes_per_student: 4,
            days: 20,
        }
    }
}

impl SeedConfig {
    pub fn total_classes(&self) -> usize {
        self.teachers * self.classes_per_teacher
    }

    /// Two children per parent.
    pub fn total_parents(&self) -> usize {
        self.students.div_ceil(2)
    }
}

pub struct UserSeed {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
}

pub struct ClassSeed {
    pub code: String,
    pub title: String,
    pub time_slot_id: Uuid,
    pub teacher_id: Uuid,
}

pub struct StudentSeed {
    pub user_id: Uuid,
    pub roll_no: String,
    pub parent_id: Uuid,
}

pub struct SlotSeed {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub time_slots: usize,
    pub users: usize,
    pub classes: usize,
    pub enrollments: usize,
    pub attendance_rows: usize,
}
