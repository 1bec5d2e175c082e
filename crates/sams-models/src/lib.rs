//! # SAMS Models
//!
//! Domain entities, forms and summaries shared by the web server and CLI.
//!
//! - [`users`]: accounts and roles
//! - [`classes`]: classes and time slots
//! - [`students`]: student profiles and parent links
//! - [`attendance`]: attendance records, status and forms
//! - [`summaries`]: aggregated attendance figures
//! - [`notifications`]: parent alert audit records
//! - [`auth`]: login and password-reset forms

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod ids;
pub mod notifications;
pub mod students;
pub mod summaries;
pub mod users;
pub mod value_types;

pub use attendance::{
    Attendance, AttendanceMark, AttendanceRecord, AttendanceSelectionForm, AttendanceStatus,
    EditAttendanceForm, SelectionAction,
};
pub use auth::{ForgotPasswordForm, LoginForm, ResetPasswordForm, VerifyOtpForm};
pub use classes::{Class, ClassListing, ClassRef, CreateClassDto, CreateTimeSlotDto, TimeSlot};
pub use ids::{AttendanceId, ClassId, NotificationId, StudentId, TimeSlotId, UserId};
pub use notifications::{Notification, NotificationView, NotifyParentForm};
pub use students::{CreateStudentDto, ParentContact, Student, StudentProfile};
pub use summaries::{
    AttendanceSummary, ClassAttendanceSummary, LOW_ATTENDANCE_THRESHOLD, RosterEntry,
};
pub use users::{CreateUserDto, User, UserCredentials};
pub use value_types::Email;
