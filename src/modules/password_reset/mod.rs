//! Forgotten-password recovery by emailed one-time code.

pub mod controller;
pub mod router;
pub mod service;
