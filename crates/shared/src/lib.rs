//! Types shared between the HTTP client and the desktop front end.

pub mod domain;
pub mod error;
pub mod protocol;
