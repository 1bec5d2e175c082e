//! Role-specific landing pages.

pub mod controller;
pub mod router;
