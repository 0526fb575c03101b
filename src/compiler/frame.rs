use crate::ast::{
    ast::{Stmt, StmtKind},
    statements::BlockStmt,
};

/// Computes the bytes of local storage a function body needs.
///
/// Every declaration in the body, its nested blocks, branches and loop
/// bodies is counted. Function definitions are expressions and are not
/// entered, so their locals belong to their own frame.
#[derive(Debug, Default)]
pub struct FrameSizeCalculator {
    localsize: usize,
}

impl FrameSizeCalculator {
    pub fn new() -> Self {
        FrameSizeCalculator::default()
    }

    pub fn calculate(mut self, body: &BlockStmt) -> usize {
        self.visit_block(body);
        self.localsize
    }

    fn visit_block(&mut self, block: &BlockStmt) {
        for declaration in &block.declarations {
            self.localsize += declaration.ty.size();
        }
        for instruction in &block.instructions {
            self.visit_stmt(instruction);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Declaration(declaration) => self.localsize += declaration.ty.size(),
            StmtKind::Block(block) => self.visit_block(block),
            StmtKind::If(if_stmt) => self.visit_block(&if_stmt.block),
            StmtKind::IfElse(if_else) => {
                self.visit_block(&if_else.then_block);
                self.visit_block(&if_else.else_block);
            }
            StmtKind::Loop(loop_stmt) => self.visit_stmt(&loop_stmt.body),
            StmtKind::Evaluation(_)
            | StmtKind::Stop(_)
            | StmtKind::Next(_)
            | StmtKind::Return(_)
            | StmtKind::Print(_) => {}
        }
    }
}
