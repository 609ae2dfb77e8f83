//! User interface module - run summary and status output.
//!
//! All functions live in `formatter`; this module only re-exports them.

pub mod formatter;

pub use formatter::{
    describe_context, display_boundary_warning, display_error, display_status, display_success,
    display_summary, format_or_none, summary_sections,
};
