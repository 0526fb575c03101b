//! Utility macros for the compiler.
//!
//! This module defines helper macros used by the code generator:
//!
//! - `CHECK_TYPES!` - Re-runs the type checker on a node, skipping it on failure
//! - `THROW_ERROR!` - Records an error and abandons the current node
//!
//! Both return from the enclosing generator function, which returns `()`.

/// Runs a type check through `Compiler::check` and returns from the
/// enclosing function if it failed.
///
/// # Arguments
///
/// * `$compiler` - The compiler
/// * `$check` - A closure taking the type checker
///
/// # Example
///
/// ```ignore
/// CHECK_TYPES!(compiler, |checker| checker.check_expr(expr));
/// ```
#[macro_export]
macro_rules! CHECK_TYPES {
    ($compiler:expr, $check:expr) => {
        if !$compiler.check($check) {
            return;
        }
    };
}

/// Records an error at a position and returns from the enclosing function.
///
/// # Arguments
///
/// * `$compiler` - The compiler
/// * `$error` - The ErrorImpl variant
/// * `$position` - The source position
#[macro_export]
macro_rules! THROW_ERROR {
    ($compiler:expr, $error:expr, $position:expr) => {{
        $compiler.report($crate::errors::errors::Error::new($error, $position));
        return;
    }};
}
