/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Expression, l-value, statement and program nodes
/// - expressions: Operators and payloads of the composite expressions
/// - statements: Payloads of the composite statements
/// - types: The type model shared by every pass
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
