//! Student profiles, rosters and parent links.

pub mod service;
