//! Code generation module for the compiler.
//!
//! This module turns a typed AST into postfix stack-machine instructions. It handles:
//!
//! - Frame sizing of function bodies
//! - Compilation of expressions, l-values and statements
//! - Static data for globals and string literals
//! - Calls to the runtime intrinsics (`printi`, `readd`, ...)

pub mod compiler;
pub mod expr;
pub mod frame;
pub mod postfix;
pub mod stmt;

#[cfg(test)]
mod tests;
