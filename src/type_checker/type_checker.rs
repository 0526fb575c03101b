use crate::{
    ast::{
        ast::{Expr, ExprKind, LValue, LValueKind, Program, Stmt, StmtKind},
        expressions::{AssignmentExpr, BinaryExpr, BinaryOperator, CallExpr, FunctionExpr},
        statements::{BlockStmt, DeclarationStmt, PrintStmt},
        types::{deep_compare, Type},
    },
    errors::errors::{Error, ErrorImpl},
    symbols::{
        symbol_table::{SymbolId, SymbolTable},
        symbols::{Qualifier, Symbol},
    },
    Position,
};

/// Name under which the function being defined is bound inside its own body.
pub const FUNCTION_SYMBOL: &str = "@";

/// Receives every symbol the checker registers for a declaration.
pub trait SymbolListener {
    fn new_symbol(&mut self, symbol: SymbolId);
}

/// Keeps the most recent symbol only.
impl SymbolListener for Option<SymbolId> {
    fn new_symbol(&mut self, symbol: SymbolId) {
        *self = Some(symbol);
    }
}

impl SymbolListener for Vec<SymbolId> {
    fn new_symbol(&mut self, symbol: SymbolId) {
        self.push(symbol);
    }
}

pub struct TypeChecker<'a> {
    symtab: &'a mut SymbolTable,
    listener: &'a mut dyn SymbolListener,
    errors: Vec<Error>,
}

/// Symbols produced by a whole-program check.
#[derive(Debug)]
pub struct Analysis {
    pub symtab: SymbolTable,
    pub declared: Vec<SymbolId>,
}

impl Analysis {
    /// The last symbol declared under `name`, in any scope.
    pub fn find_declared(&self, name: &str) -> Option<&Symbol> {
        self.declared
            .iter()
            .rev()
            .map(|id| self.symtab.get(*id))
            .find(|symbol| symbol.name == name)
    }
}

/// Types a whole program, collecting every error instead of stopping at the first one.
pub fn type_check(program: &mut Program) -> (Analysis, Vec<Error>) {
    let mut symtab = SymbolTable::new();
    let mut declared: Vec<SymbolId> = Vec::new();

    let errors = {
        let mut type_checker = TypeChecker::new(&mut symtab, &mut declared);
        type_checker.check_program(program);
        type_checker.into_errors()
    };

    (Analysis { symtab, declared }, errors)
}

/// Gives an `unspec` expression the numeric type its context expects.
fn infer(expr: &mut Expr, expected: &Type) -> bool {
    if expected.is_numeric() {
        expr.ty = expected.clone();
        true
    } else {
        false
    }
}

/// Functions have no access to the frames of the functions around them.
pub fn enclosing_frame_access(variable: &str) -> ErrorImpl {
    ErrorImpl::UnsupportedConstruct {
        construct: format!("access to '{}' of an enclosing function", variable),
    }
}

fn expect_integer(operand: &mut Expr, error: impl FnOnce(String) -> ErrorImpl) -> Result<(), Error> {
    if operand.ty.is_unspec() {
        operand.ty = Type::Int;
    }
    if !operand.ty.is_int() {
        return Err(Error::new(error(operand.ty.to_string()), operand.position));
    }
    Ok(())
}

impl<'a> TypeChecker<'a> {
    pub fn new(symtab: &'a mut SymbolTable, listener: &'a mut dyn SymbolListener) -> Self {
        TypeChecker {
            symtab,
            listener,
            errors: Vec::new(),
        }
    }

    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }

    pub fn check_program(&mut self, program: &mut Program) {
        for declaration in &mut program.declarations {
            if let Err(error) = self.check_declaration(declaration) {
                self.errors.push(error);
            }
        }

        if let Some(main) = &mut program.main {
            self.symtab.enter_frame();
            self.symtab.push();
            self.symtab.insert(Symbol::new(
                FUNCTION_SYMBOL,
                Type::functional(vec![], Type::Int),
                Qualifier::Private,
            ));
            self.check_block(main);
            self.symtab.pop();
            self.symtab.leave_frame();
        }
    }

    /// Checks a block in its own scope. Each failing declaration or
    /// instruction is recorded and skipped.
    pub fn check_block(&mut self, block: &mut BlockStmt) {
        self.symtab.push();

        for declaration in &mut block.declarations {
            if let Err(error) = self.check_declaration(declaration) {
                self.errors.push(error);
            }
        }
        for instruction in &mut block.instructions {
            if let Err(error) = self.check_stmt(instruction) {
                self.errors.push(error);
            }
        }

        self.symtab.pop();
    }

    pub fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Error> {
        let position = stmt.position;

        match &mut stmt.kind {
            StmtKind::Evaluation(argument) => self.check_evaluation(argument),
            StmtKind::Declaration(declaration) => self.check_declaration(declaration),
            StmtKind::Block(block) => {
                self.check_block(block);
                Ok(())
            }
            StmtKind::If(if_stmt) => {
                self.check_condition(&mut if_stmt.condition, "if")?;
                self.check_block(&mut if_stmt.block);
                Ok(())
            }
            StmtKind::IfElse(if_else) => {
                self.check_condition(&mut if_else.condition, "if")?;
                self.check_block(&mut if_else.then_block);
                self.check_block(&mut if_else.else_block);
                Ok(())
            }
            StmtKind::Loop(loop_stmt) => {
                self.check_condition(&mut loop_stmt.condition, "loop")?;
                self.symtab.push();
                let result = self.check_stmt(&mut loop_stmt.body);
                self.symtab.pop();
                result
            }
            StmtKind::Stop(_) | StmtKind::Next(_) => Ok(()),
            StmtKind::Return(value) => self.check_return(value.as_mut(), position),
            StmtKind::Print(print) => self.check_print(print),
        }
    }

    pub fn check_evaluation(&mut self, argument: &mut Expr) -> Result<(), Error> {
        self.check_expr(argument)?;

        if argument.ty.is_unspec() {
            argument.ty = Type::Int;
        } else if matches!(argument.ty.referenced(), Some(Type::Unspec)) {
            argument.ty = Type::pointer(Type::Int);
        }
        Ok(())
    }

    pub fn check_condition(&mut self, condition: &mut Expr, construct: &str) -> Result<(), Error> {
        self.check_expr(condition)?;
        expect_integer(condition, |received| ErrorImpl::InvalidCondition {
            construct: construct.to_string(),
            received,
        })
    }

    pub fn check_print(&mut self, print: &mut PrintStmt) -> Result<(), Error> {
        for argument in &mut print.arguments {
            self.check_expr(argument)?;

            if argument.ty.is_unspec() {
                argument.ty = Type::Int;
            }
            if !matches!(argument.ty, Type::Int | Type::String | Type::Double) {
                return Err(Error::new(
                    ErrorImpl::InvalidPrintArgument {
                        received: argument.ty.to_string(),
                    },
                    argument.position,
                ));
            }
        }
        Ok(())
    }

    pub fn check_return(&mut self, value: Option<&mut Expr>, position: Position) -> Result<(), Error> {
        let function = self
            .symtab
            .find(FUNCTION_SYMBOL)
            .ok_or_else(|| Error::new(ErrorImpl::ReturnOutsideFunction, position))?;
        let output = self
            .symtab
            .get(function)
            .ty
            .output()
            .cloned()
            .unwrap_or(Type::Void);

        let value = match value {
            None if output.is_void() => return Ok(()),
            None => {
                return Err(Error::new(
                    ErrorImpl::ReturnValueMissing {
                        expected: output.to_string(),
                    },
                    position,
                ))
            }
            Some(_) if output.is_void() => {
                return Err(Error::new(ErrorImpl::ReturnValueInVoidFunction, position))
            }
            Some(value) => value,
        };

        self.check_expr(value)?;

        let incompatible = |received: &Type| {
            Error::new(
                ErrorImpl::IncompatibleReturn {
                    expected: output.to_string(),
                    received: received.to_string(),
                },
                position,
            )
        };

        if value.ty.is_unspec() {
            if !infer(value, &output) {
                return Err(incompatible(&value.ty));
            }
        } else if output.is_pointer() && value.ty.is_generic_pointer() {
            value.ty = output.clone();
        }

        if !deep_compare(&value.ty, &output, true) {
            return Err(incompatible(&value.ty));
        }
        Ok(())
    }

    pub fn check_declaration(&mut self, declaration: &mut DeclarationStmt) -> Result<(), Error> {
        let position = declaration.position;
        let variable = declaration.identifier.clone();

        let ty = match &declaration.declared_type {
            None => {
                let initializer = declaration.initializer.as_mut().ok_or_else(|| {
                    Error::new(
                        ErrorImpl::ExpectedExplicitValue {
                            variable: variable.clone(),
                        },
                        position,
                    )
                })?;
                self.check_expr(initializer)?;

                if initializer.ty.is_void() {
                    return Err(Error::new(ErrorImpl::VoidDeclaration { variable }, position));
                }
                if initializer.ty.is_unspec() {
                    initializer.ty = Type::Int;
                } else if matches!(initializer.ty.referenced(), Some(Type::Unspec)) {
                    initializer.ty = Type::pointer(Type::Int);
                }
                initializer.ty.clone()
            }
            Some(declared) => {
                if declared.is_void() {
                    return Err(Error::new(ErrorImpl::VoidDeclaration { variable }, position));
                }

                if let Some(initializer) = declaration.initializer.as_mut() {
                    self.check_expr(initializer)?;

                    let conflicting = |received: &Type| {
                        Error::new(
                            ErrorImpl::ConflictingInitializer {
                                variable: variable.clone(),
                                expected: declared.to_string(),
                                received: received.to_string(),
                            },
                            position,
                        )
                    };

                    if initializer.ty.is_unspec() {
                        if !infer(initializer, declared) {
                            return Err(conflicting(&initializer.ty));
                        }
                    } else if declared.is_pointer() && initializer.ty.is_generic_pointer() {
                        initializer.ty = declared.clone();
                    }

                    if !deep_compare(&initializer.ty, declared, true) {
                        return Err(conflicting(&initializer.ty));
                    }
                }
                declared.clone()
            }
        };

        declaration.ty = ty.clone();

        let mut symbol = Symbol::new(&declaration.identifier, ty, declaration.qualifier);
        if let Some(Expr {
            kind: ExprKind::Integer(value),
            ..
        }) = &declaration.initializer
        {
            symbol = symbol.with_value(i64::from(*value));
        }

        let id = match self.symtab.insert(symbol.clone()) {
            Some(id) => id,
            None => self.redeclare(symbol, position)?,
        };
        self.listener.new_symbol(id);
        Ok(())
    }

    /// A name may be bound twice in one scope only when the first binding
    /// is a forward or external declaration of exactly the same type.
    fn redeclare(&mut self, symbol: Symbol, position: Position) -> Result<SymbolId, Error> {
        let name = symbol.name.clone();
        let conflict = || {
            Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: name.clone(),
                },
                position,
            )
        };

        let replaceable = match self.symtab.find_local(&symbol.name) {
            Some(previous) => {
                let previous = self.symtab.get(previous);
                previous.is_declaration_only() && deep_compare(&previous.ty, &symbol.ty, false)
            }
            None => false,
        };
        if !replaceable {
            return Err(conflict());
        }

        self.symtab.replace(symbol).ok_or_else(conflict)
    }

    pub fn check_expr(&mut self, expr: &mut Expr) -> Result<(), Error> {
        if !expr.ty.is_unspec() && !matches!(expr.kind, ExprKind::Function(_)) {
            return Ok(());
        }
        let position = expr.position;

        let ty = match &mut expr.kind {
            ExprKind::Integer(_) => Type::Int,
            ExprKind::Double(_) => Type::Double,
            ExprKind::String(_) => Type::String,
            ExprKind::Nullptr => Type::pointer(Type::Unspec),
            ExprKind::Unary(unary) => {
                self.check_expr(&mut unary.argument)?;
                let operator = unary.operator.to_string();
                expect_integer(&mut unary.argument, |received| ErrorImpl::WrongUnaryOperand {
                    operator,
                    received,
                })?;
                Type::Int
            }
            ExprKind::Binary(binary) => self.check_binary(binary, position)?,
            ExprKind::RValue(lvalue) => {
                self.check_lvalue(lvalue)?;
                lvalue.ty.clone()
            }
            ExprKind::Assignment(assignment) => self.check_assignment(assignment, position)?,
            ExprKind::AddressOf(lvalue) => {
                self.check_lvalue(lvalue)?;
                if matches!(lvalue.ty.referenced(), Some(Type::Void)) {
                    lvalue.ty.clone()
                } else {
                    Type::pointer(lvalue.ty.clone())
                }
            }
            ExprKind::Call(call) => self.check_call(call, position)?,
            ExprKind::Function(function) => {
                self.check_function(function)?;
                function.function_type()
            }
            ExprKind::Read => Type::Unspec,
            ExprKind::StackAlloc(argument) => {
                self.check_expr(argument)?;
                expect_integer(argument, |received| ErrorImpl::InvalidAllocationSize {
                    received,
                })?;
                Type::pointer(Type::Unspec)
            }
            ExprKind::Sizeof(argument) => {
                self.check_expr(argument)?;
                if argument.ty.is_unspec() {
                    argument.ty = Type::Int;
                }
                Type::Int
            }
        };

        expr.ty = ty;
        Ok(())
    }

    fn check_binary(&mut self, binary: &mut BinaryExpr, position: Position) -> Result<Type, Error> {
        self.check_expr(&mut binary.left)?;
        self.check_expr(&mut binary.right)?;

        if binary.operator.is_arithmetic() {
            return self.check_arithmetic(binary, position);
        }

        let operator = binary.operator.to_string();
        expect_integer(&mut binary.left, |received| ErrorImpl::WrongBinaryOperand {
            side: "left".to_string(),
            operator: operator.clone(),
            received,
        })?;
        expect_integer(&mut binary.right, |received| ErrorImpl::WrongBinaryOperand {
            side: "right".to_string(),
            operator: operator.clone(),
            received,
        })?;
        Ok(Type::Int)
    }

    /// `+ - * /` with int/double promotion and pointer arithmetic.
    fn check_arithmetic(&mut self, binary: &mut BinaryExpr, position: Position) -> Result<Type, Error> {
        let left = &mut binary.left;
        let right = &mut binary.right;

        if left.ty.is_unspec() {
            left.ty = if right.ty.is_double() { Type::Double } else { Type::Int };
        }
        if right.ty.is_unspec() {
            right.ty = if left.ty.is_double() { Type::Double } else { Type::Int };
        }

        let ty = match (binary.operator, &left.ty, &right.ty) {
            (_, Type::Int, Type::Int) => Type::Int,
            (_, l, r) if l.is_numeric() && r.is_numeric() => Type::Double,
            (BinaryOperator::Add | BinaryOperator::Sub, Type::Pointer(_), Type::Int) => {
                left.ty.clone()
            }
            (BinaryOperator::Add, Type::Int, Type::Pointer(_)) => right.ty.clone(),
            (BinaryOperator::Sub, Type::Pointer(l), Type::Pointer(r)) if l == r => Type::Int,
            (operator, l, r) => {
                return Err(Error::new(
                    ErrorImpl::IncompatibleOperands {
                        operator: operator.to_string(),
                        left: l.to_string(),
                        right: r.to_string(),
                    },
                    position,
                ))
            }
        };
        Ok(ty)
    }

    pub fn check_lvalue(&mut self, lvalue: &mut LValue) -> Result<(), Error> {
        let position = lvalue.position;

        match &mut lvalue.kind {
            LValueKind::Variable(name) => {
                if !lvalue.ty.is_unspec() {
                    return Ok(());
                }
                let symbol = self.symtab.lookup(name).ok_or_else(|| {
                    Error::new(
                        ErrorImpl::VariableNotDeclared {
                            variable: name.clone(),
                        },
                        position,
                    )
                })?;
                if !symbol.is_global() && symbol.frame != self.symtab.frame() {
                    return Err(Error::new(enclosing_frame_access(name), position));
                }
                lvalue.ty = symbol.ty.clone();
            }
            LValueKind::Index(index) => {
                self.check_expr(&mut index.base)?;

                let mut referenced = match index.base.ty.referenced() {
                    Some(referenced) => referenced.clone(),
                    None => {
                        return Err(Error::new(
                            ErrorImpl::InvalidIndexBase {
                                received: index.base.ty.to_string(),
                            },
                            index.base.position,
                        ))
                    }
                };
                if referenced.is_unspec() {
                    referenced = Type::Int;
                    index.base.ty = Type::pointer(Type::Int);
                }

                self.check_expr(&mut index.index)?;
                expect_integer(&mut index.index, |received| ErrorImpl::InvalidIndex {
                    received,
                })?;

                lvalue.ty = referenced;
            }
        }
        Ok(())
    }

    fn check_assignment(
        &mut self,
        assignment: &mut AssignmentExpr,
        position: Position,
    ) -> Result<Type, Error> {
        self.check_lvalue(&mut assignment.lvalue)?;
        self.check_expr(&mut assignment.rvalue)?;

        let lvalue = &mut assignment.lvalue;
        let rvalue = &mut assignment.rvalue;
        let mismatch = |expected: &Type, received: &Type| {
            Error::new(
                ErrorImpl::TypeMatchError {
                    expected: expected.to_string(),
                    received: received.to_string(),
                },
                position,
            )
        };

        if lvalue.ty.is_unspec() && rvalue.ty.is_unspec() {
            lvalue.ty = Type::Int;
            rvalue.ty = Type::Int;
        } else if lvalue.ty.is_unspec() {
            lvalue.ty = rvalue.ty.clone();
        } else if rvalue.ty.is_unspec() {
            if !infer(rvalue, &lvalue.ty) {
                return Err(mismatch(&lvalue.ty, &rvalue.ty));
            }
        } else if lvalue.ty.is_pointer() && rvalue.ty.is_generic_pointer() {
            rvalue.ty = lvalue.ty.clone();
        }

        if !deep_compare(&rvalue.ty, &lvalue.ty, true) {
            return Err(mismatch(&lvalue.ty, &rvalue.ty));
        }
        Ok(lvalue.ty.clone())
    }

    fn check_call(&mut self, call: &mut CallExpr, position: Position) -> Result<Type, Error> {
        let function_type = match &mut call.callee {
            Some(callee) => {
                self.check_expr(callee)?;
                callee.ty.clone()
            }
            None => {
                let function = self.symtab.find(FUNCTION_SYMBOL).ok_or_else(|| {
                    Error::new(ErrorImpl::RecursiveCallOutsideFunction, position)
                })?;
                self.symtab.get(function).ty.clone()
            }
        };

        let (inputs, output) = match &function_type {
            Type::Functional { inputs, output } => (inputs.clone(), (**output).clone()),
            other => {
                return Err(Error::new(
                    ErrorImpl::NotAFunction {
                        received: other.to_string(),
                    },
                    position,
                ))
            }
        };

        if inputs.len() != call.arguments.len() {
            return Err(Error::new(
                ErrorImpl::UnexpectedArguments {
                    expected: inputs.len(),
                    received: call.arguments.len(),
                },
                position,
            ));
        }

        for (argument, parameter) in call.arguments.iter_mut().zip(inputs.iter()) {
            self.check_expr(argument)?;

            if argument.ty.is_unspec() {
                infer(argument, parameter);
            } else if parameter.is_pointer() && argument.ty.is_generic_pointer() {
                argument.ty = parameter.clone();
            }

            if !deep_compare(&argument.ty, parameter, true) {
                return Err(Error::new(
                    ErrorImpl::ArgumentTypeMatchError {
                        expected: parameter.to_string(),
                        received: argument.ty.to_string(),
                    },
                    argument.position,
                ));
            }
        }

        Ok(output)
    }

    fn check_function(&mut self, function: &mut FunctionExpr) -> Result<(), Error> {
        self.symtab.enter_frame();
        self.symtab.push();
        self.symtab.insert(Symbol::new(
            FUNCTION_SYMBOL,
            function.function_type(),
            Qualifier::Private,
        ));

        let result = function
            .arguments
            .iter_mut()
            .try_for_each(|argument| self.check_declaration(argument));
        if result.is_ok() {
            self.check_block(&mut function.block);
        }

        self.symtab.pop();
        self.symtab.leave_frame();
        result
    }
}
