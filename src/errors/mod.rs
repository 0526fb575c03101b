//! Error types and error handling for the compiler.
//!
//! This module defines the error types used by the semantic passes. It includes:
//!
//! - Error structures carrying the source line
//! - Specific error variants for type, control-flow and unsupported-construct failures
//! - Error formatting and the diagnostic report writer
//! - Helpful error messages and suggestions

pub mod errors;
