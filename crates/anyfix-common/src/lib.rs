//! Common types and utilities for the anyfix rewriter.
//!
//! This crate provides foundational types used across all anyfix crates:
//! - Diagnostic records and the TypeScript diagnostic codes the reference host reports
//! - Centralized limits and thresholds
//! - Line maps for turning byte offsets into line/column positions
//! - JavaScript number formatting for numeric literal types

pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, diagnostic_codes, format_message, messages_introduced,
};

pub mod limits;

pub mod position;
pub use position::{LineMap, Position, Span};

pub mod numeric;
pub use numeric::js_number_to_string;
