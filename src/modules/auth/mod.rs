//! Session login and logout.

pub mod controller;
pub mod router;
pub mod service;
