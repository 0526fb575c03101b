//! Type checking and semantic analysis module.
//!
//! This module types the AST in place. While walking it:
//!
//! - Every expression receives a concrete type
//! - `unspec` placeholders (input reads, generic pointers) are resolved from context
//! - Declarations register symbols and report them through a `SymbolListener`
//! - Function signatures, arguments and return values are validated
//!
//! Errors are recorded per statement so that one failure does not hide the
//! ones that follow it.

pub mod type_checker;
