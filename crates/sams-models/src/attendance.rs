//! Attendance records and the forms that create and edit them.

use crate::classes::ClassRef;
use crate::ids::{AttendanceId, ClassId, StudentId, UserId};
use chrono::NaiveDate;
use sams_core::serde::deserialize_optional_uuid;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Wire format for attendance dates in paths and forms.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored as a SMALLINT: present = 1, absent = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[repr(i16)]
pub enum AttendanceStatus {
    Absent = 0,
    Present = 1,
}

impl AttendanceStatus {
    pub fn is_present(self) -> bool {
        self == AttendanceStatus::Present
    }

    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }

    /// Accepts the values an HTML form or a query string may carry.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "present" | "p" => Some(AttendanceStatus::Present),
            "0" | "absent" | "a" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

impl Serialize for AttendanceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        })
    }
}

struct StatusVisitor;

impl Visitor<'_> for StatusVisitor {
    type Value = AttendanceStatus;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an attendance status: 1, 0, \"present\" or \"absent\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        AttendanceStatus::parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        match v {
            1 => Ok(AttendanceStatus::Present),
            0 => Ok(AttendanceStatus::Absent),
            _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        match v {
            1 => Ok(AttendanceStatus::Present),
            0 => Ok(AttendanceStatus::Absent),
            _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
        }
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(if v {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        })
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StatusVisitor)
    }
}

/// One student's mark for one class on one date.
///
/// Unique per (student, class, date). Edits change `status` and
/// `marked_by` only.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Attendance {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub class_id: Option<ClassId>,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "present")]
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub remarks: Option<String>,
}

/// Attendance joined with the class it belongs to, newest first when listed.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub class_id: Option<ClassId>,
    pub class_code: Option<String>,
    pub class_title: Option<String>,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "present")]
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

impl AttendanceRecord {
    /// `None` for rows whose class reference was never set.
    pub fn class(&self) -> Option<ClassRef> {
        match (self.class_id, &self.class_code, &self.class_title) {
            (Some(id), Some(code), Some(title)) => Some(ClassRef {
                id,
                code: code.clone(),
                title: title.clone(),
            }),
            _ => None,
        }
    }
}

/// A single mark submitted while taking attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceMark {
    pub student_id: StudentId,
    pub status: AttendanceStatus,
}

/// Which button the teacher pressed on the dashboard.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SelectionAction {
    #[default]
    #[serde(alias = "select_class")]
    TakeAttendance,
    #[serde(alias = "show_summary")]
    ShowSummary,
}

/// Teacher dashboard selection: which class and date to take attendance for.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct AttendanceSelectionForm {
    pub class_id: ClassId,
    /// Unused when only the summary is requested.
    #[serde(default)]
    #[schema(example = "2024-03-15")]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub time_slot_id: Option<Uuid>,
    #[serde(default)]
    pub action: SelectionAction,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct EditAttendanceForm {
    pub record_id: AttendanceId,
    #[schema(value_type = String, example = "1")]
    pub status: AttendanceStatus,
}

/// Parses a `YYYY-MM-DD` date; `None` on any other shape.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
