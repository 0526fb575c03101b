//! Main compiler module.
//!
//! This module contains the core Compiler structure and the compilation
//! pipeline from a typed AST to stack-machine instructions. It owns the
//! code generation context: labels, frame offsets, loop targets and the
//! intrinsics the program calls.

use std::collections::BTreeSet;

use crate::{
    ast::{
        ast::Program,
        expressions::FunctionExpr,
        types::Type,
    },
    errors::errors::Error,
    symbols::{
        symbol_table::{SymbolId, SymbolTable},
        symbols::{Qualifier, Symbol},
    },
    type_checker::type_checker::{type_check, TypeChecker, FUNCTION_SYMBOL},
};

use super::{
    frame::FrameSizeCalculator,
    postfix::{Emitter, Instruction, SymbolKind},
    stmt::{gen_block, gen_declaration},
};

/// Label of the program entry point.
pub const ENTRY_LABEL: &str = "_main";
/// Offset of the first parameter, above the saved frame pointer and return address.
pub const ARGUMENTS_OFFSET: i32 = 8;

pub const PRINT_INT: &str = "printi";
pub const PRINT_STRING: &str = "prints";
pub const PRINT_DOUBLE: &str = "printd";
pub const PRINT_NEWLINE: &str = "println";
pub const READ_INT: &str = "readi";
pub const READ_DOUBLE: &str = "readd";

/// The code generation context.
///
/// The compiler owns its own symbol table: symbols are registered again
/// by the type checker as the walk reaches each declaration, and reported
/// back through `new_symbol` so their frame offsets can be assigned.
pub struct Compiler<'a> {
    /// Where generated instructions go
    pub emitter: &'a mut dyn Emitter,
    pub symtab: SymbolTable,
    /// Last symbol registered by a declaration check
    pub new_symbol: Option<SymbolId>,

    /// Labels of the functions being generated, innermost last
    pub function_labels: Vec<String>,
    /// Return labels of the functions being generated, innermost last
    pub return_labels: Vec<String>,
    /// (start, end) labels of the enclosing loops, innermost last
    pub loop_labels: Vec<(String, String)>,
    /// Frame offset cursor
    pub offset: i32,
    /// Set while parameter declarations are processed
    pub declaring_arguments: bool,
    /// Intrinsics called so far
    pub external_functions: BTreeSet<String>,

    pub errors: Vec<Error>,
    label: u32,
}

impl<'a> Compiler<'a> {
    /// Creates a new Compiler instance.
    ///
    /// # Arguments
    ///
    /// * `emitter` - Sink receiving the generated instructions
    ///
    /// # Returns
    ///
    /// A compiler positioned outside any function, with an empty global scope.
    pub fn new(emitter: &'a mut dyn Emitter) -> Self {
        Compiler {
            emitter,
            symtab: SymbolTable::new(),
            new_symbol: None,
            function_labels: Vec::new(),
            return_labels: Vec::new(),
            loop_labels: Vec::new(),
            offset: 0,
            declaring_arguments: false,
            external_functions: BTreeSet::new(),
            errors: Vec::new(),
            label: 0,
        }
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.emitter.emit(instruction);
    }

    /// Returns a fresh label (`_L1`, `_L2`, ...).
    pub fn mklbl(&mut self) -> String {
        self.label += 1;
        format!("_L{}", self.label)
    }

    pub fn in_function(&self) -> bool {
        !self.function_labels.is_empty()
    }

    pub fn report(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Runs a fresh type checker over part of the tree.
    ///
    /// # Arguments
    ///
    /// * `check` - The check to run, given a checker bound to this compiler's symbol table
    ///
    /// # Returns
    ///
    /// `true` when the check passed. Failures are recorded in `errors`.
    pub fn check<F>(&mut self, check: F) -> bool
    where
        F: FnOnce(&mut TypeChecker<'_>) -> Result<(), Error>,
    {
        self.new_symbol = None;

        let mut type_checker = TypeChecker::new(&mut self.symtab, &mut self.new_symbol);
        let result = check(&mut type_checker);

        let mut errors = type_checker.into_errors();
        if let Err(error) = result {
            errors.push(error);
        }

        let passed = errors.is_empty();
        self.errors.extend(errors);
        passed
    }

    /// Switches back to the segment of the code being generated.
    pub fn resume_segment(&mut self) {
        let segment = match self.function_labels.last() {
            Some(label) if label == ENTRY_LABEL => Instruction::Text(None),
            Some(label) => Instruction::Text(Some(label.clone())),
            None => Instruction::Data,
        };
        self.emit(segment);
    }

    /// Calls a runtime intrinsic and records it for the extern declarations.
    pub fn call_intrinsic(&mut self, name: &str) {
        self.external_functions.insert(name.to_string());
        self.emit(Instruction::Call(name.to_string()));
    }

    pub fn finish(self) -> Result<(), Vec<Error>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Type checks a program and, if it is well typed, generates its code.
///
/// # Arguments
///
/// * `program` - The program to compile; its nodes are typed in place
/// * `emitter` - Sink receiving the generated instructions
///
/// # Returns
///
/// Every error found. Code is only generated when type checking succeeded.
pub fn compile(program: &mut Program, emitter: &mut dyn Emitter) -> Result<(), Vec<Error>> {
    let (_, errors) = type_check(program);
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut compiler = Compiler::new(emitter);
    gen_program(&mut compiler, program);
    compiler.finish()
}

/// Generates the global declarations, the entry point and the intrinsic externs.
pub fn gen_program(compiler: &mut Compiler, program: &mut Program) {
    for declaration in &mut program.declarations {
        gen_declaration(compiler, declaration);
    }

    if let Some(main) = &mut program.main {
        compiler.emit(Instruction::Text(None));
        compiler.emit(Instruction::Align);
        compiler.emit(Instruction::Global(
            ENTRY_LABEL.to_string(),
            SymbolKind::Function,
        ));
        compiler.emit(Instruction::Label(ENTRY_LABEL.to_string()));

        compiler.function_labels.push(ENTRY_LABEL.to_string());
        compiler.symtab.enter_frame();
        compiler.symtab.push();
        compiler.symtab.insert(Symbol::new(
            FUNCTION_SYMBOL,
            Type::functional(vec![], Type::Int),
            Qualifier::Private,
        ));

        let frame_size = FrameSizeCalculator::new().calculate(main);
        compiler.emit(Instruction::Enter(frame_size));

        let return_label = compiler.mklbl();
        compiler.return_labels.push(return_label.clone());
        compiler.offset = 0;

        gen_block(compiler, main);

        compiler.emit(Instruction::Align);
        compiler.emit(Instruction::Label(return_label));
        compiler.emit(Instruction::Leave);
        compiler.emit(Instruction::Ret);

        compiler.return_labels.pop();
        compiler.symtab.pop();
        compiler.symtab.leave_frame();
        compiler.function_labels.pop();
    }

    for name in std::mem::take(&mut compiler.external_functions) {
        compiler.emit(Instruction::Extern(name));
    }
}

/// Generates a function body in its own text segment.
///
/// The caller is responsible for resuming its segment afterwards.
///
/// # Returns
///
/// The label of the function's first instruction.
pub fn gen_function(compiler: &mut Compiler, function: &mut FunctionExpr) -> String {
    let label = compiler.mklbl();
    compiler.function_labels.push(label.clone());
    compiler.symtab.enter_frame();
    compiler.symtab.push();
    compiler.symtab.insert(Symbol::new(
        FUNCTION_SYMBOL,
        function.function_type(),
        Qualifier::Private,
    ));

    let previous_offset = compiler.offset;
    compiler.offset = ARGUMENTS_OFFSET;
    compiler.declaring_arguments = true;
    for argument in &mut function.arguments {
        gen_declaration(compiler, argument);
    }
    compiler.declaring_arguments = false;

    compiler.emit(Instruction::Text(Some(label.clone())));
    compiler.emit(Instruction::Align);
    compiler.emit(Instruction::Label(label.clone()));

    let return_label = compiler.mklbl();
    compiler.return_labels.push(return_label.clone());

    let frame_size = FrameSizeCalculator::new().calculate(&function.block);
    compiler.emit(Instruction::Enter(frame_size));

    compiler.offset = 0;
    let enclosing_loops = std::mem::take(&mut compiler.loop_labels);
    gen_block(compiler, &mut function.block);
    compiler.loop_labels = enclosing_loops;
    compiler.offset = previous_offset;

    compiler.emit(Instruction::Align);
    compiler.emit(Instruction::Label(return_label));
    compiler.emit(Instruction::Leave);
    compiler.emit(Instruction::Ret);

    compiler.return_labels.pop();
    compiler.symtab.pop();
    compiler.symtab.leave_frame();
    compiler.function_labels.pop();

    label
}
