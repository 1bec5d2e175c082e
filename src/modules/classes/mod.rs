//! Classes, their time slots and enrollments.

pub mod service;
