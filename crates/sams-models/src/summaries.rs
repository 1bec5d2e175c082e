//! Attendance roll-ups produced by the aggregator.

use crate::classes::ClassRef;
use crate::students::StudentProfile;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Parents are alerted when a student's percentage drops below this.
pub const LOW_ATTENDANCE_THRESHOLD: f64 = 75.0;

/// `present + absent == total`; `percentage` is rounded to two decimals
/// and is 0 when `total` is 0.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, ToSchema)]
pub struct AttendanceSummary {
    pub present: i64,
    pub absent: i64,
    pub total: i64,
    pub percentage: f64,
}

impl AttendanceSummary {
    pub fn is_below_threshold(&self) -> bool {
        self.percentage < LOW_ATTENDANCE_THRESHOLD
    }
}

/// One student's attendance in one class.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ClassAttendanceSummary {
    pub class: ClassRef,
    #[serde(flatten)]
    pub summary: AttendanceSummary,
}

/// One line of a class roster summary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct RosterEntry {
    pub student: StudentProfile,
    #[serde(flatten)]
    pub summary: AttendanceSummary,
    /// Distinct dates on which the class recorded any attendance.
    pub total_classes: i64,
    pub below_threshold: bool,
}
