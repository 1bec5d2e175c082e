//! Accounts. There is no sign-up page; accounts come from the CLI and the
//! seeder.

pub mod service;
