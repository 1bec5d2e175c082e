//! Utility modules shared by the page handlers.
//!
//! - [`document`]: text-at-coordinates canvas and the PDF writer behind it
//! - [`email`]: the [`Mailer`](email::Mailer) seam and its SMTP implementation
//! - [`errors`]: page errors that become a flash message and a redirect
//! - [`flash`]: one-shot messages carried in a cookie
//! - [`render`]: the page renderer seam

pub mod document;
pub mod email;
pub mod errors;
pub mod flash;
pub mod render;
