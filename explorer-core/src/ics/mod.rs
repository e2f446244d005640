//! VTODO file generation and parsing.
//!
//! Mirrored tasks are stored as one VTODO per .ics file (RFC 5545). A task
//! with a due date carries exactly one display alarm at that instant.

mod generate;
mod parse;

pub use generate::generate_todo;
pub use parse::{ParsedTodo, parse_todo};

/// Compact UTC form used for DUE, COMPLETED and absolute triggers.
pub(crate) const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
