//! Symbols and scoped symbol tables.
//!
//! This module holds the bindings shared by the type checker and the code
//! generator:
//!
//! - `Symbol` records name, type, qualifier, frame offset and constant value
//! - `SymbolTable` keeps a stack of scopes over an arena of symbols
//!
//! Scopes refer to symbols through `SymbolId` handles, so a symbol can be
//! updated (for instance with its frame offset) after it has been bound.

pub mod symbol_table;
pub mod symbols;
