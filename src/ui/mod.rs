//! User interface module - terminal output for the CLI.

pub mod formatter;

pub use formatter::{display_error, display_info, display_status, display_version, format_info};
