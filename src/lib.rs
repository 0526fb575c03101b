#![allow(clippy::module_inception)]

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod macros;
pub mod symbols;
pub mod type_checker;

/// Source line a node or diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position(pub u32);

impl Position {
    pub fn null() -> Self {
        Position(0)
    }

    pub fn line(&self) -> u32 {
        self.0
    }
}
