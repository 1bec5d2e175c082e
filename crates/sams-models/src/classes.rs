//! Classes and the time slots they meet in.

use crate::ids::{ClassId, TimeSlotId, UserId};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// A recurring meeting time. Overlaps are not checked.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "10:00:00")]
    pub end_time: NaiveTime,
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Class {
    pub id: ClassId,
    pub code: String,
    pub title: String,
    pub semester: String,
    pub year: Option<i32>,
    pub time_slot_id: TimeSlotId,
    /// Only this teacher may take or edit attendance for the class.
    pub teacher_id: Option<UserId>,
}

impl Class {
    pub fn is_taught_by(&self, user_id: UserId) -> bool {
        self.teacher_id == Some(user_id)
    }

    pub fn to_ref(&self) -> ClassRef {
        ClassRef {
            id: self.id,
            code: self.code.clone(),
            title: self.title.clone(),
        }
    }
}

/// Class joined with its time slot, for dashboards.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct ClassListing {
    pub id: ClassId,
    pub code: String,
    pub title: String,
    pub semester: String,
    pub year: Option<i32>,
    pub time_slot_id: TimeSlotId,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
}

/// The identifying part of a class, carried alongside summaries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ClassRef {
    pub id: ClassId,
    pub code: String,
    pub title: String,
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.title)
    }
}

fn validate_slot_order(dto: &CreateTimeSlotDto) -> Result<(), ValidationError> {
    if dto.end_time <= dto.start_time {
        return Err(ValidationError::new("slot_order")
            .with_message("End time must be after start time".into()));
    }
    Ok(())
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
#[validate(schema(function = "validate_slot_order"))]
pub struct CreateTimeSlotDto {
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 20))]
    pub semester: String,
    pub year: Option<i32>,
    pub time_slot_id: TimeSlotId,
    pub teacher_id: Option<UserId>,
}
