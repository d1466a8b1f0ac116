//! Check the syntax of reStructuredText documents and of the code blocks in them.
//!
//! [`check_source`] checks one document held in memory. [`file_processor::check_files`]
//! checks files on disk, resolving configuration for each of them.

pub mod checkers;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod exit_codes;
pub mod file_processor;
pub mod ignore;
pub mod line_offset;
pub mod output;
pub mod rst;
pub mod text;
pub mod visitor;

pub use diagnostic::Diagnostic;
pub use document::{CheckError, CheckOptions, check_source};
pub use crate::ignore::IgnoreSet;
