//! Taking, summarizing and correcting attendance.

pub mod aggregator;
pub mod controller;
pub mod router;
pub mod service;
