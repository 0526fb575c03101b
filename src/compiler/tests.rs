//! Unit tests for the code generator.

use crate::{
    ast::{
        ast::{Expr, LValue, Program, Stmt},
        expressions::{BinaryOperator, UnaryOperator},
        statements::{BlockStmt, DeclarationStmt},
        types::Type,
    },
    compiler::{
        compiler::compile,
        frame::FrameSizeCalculator,
        postfix::{listing, Instruction as I, SymbolKind},
    },
    errors::errors::Error,
    symbols::symbols::Qualifier,
};

fn compile_ok(program: &mut Program) -> Vec<I> {
    let mut code: Vec<I> = Vec::new();
    if let Err(errors) = compile(program, &mut code) {
        panic!("unexpected errors: {:?}", errors);
    }
    code
}

fn compile_err(program: &mut Program) -> Vec<Error> {
    let mut code: Vec<I> = Vec::new();
    match compile(program, &mut code) {
        Ok(()) => panic!("expected errors, got {:?}", code),
        Err(errors) => errors,
    }
}

fn main_program(declarations: Vec<DeclarationStmt>, instructions: Vec<Stmt>) -> Program {
    Program::new(vec![], Some(BlockStmt::new(declarations, instructions, 1)))
}

/// Entry point wrapping `body`, with `_L1` as return label.
fn entry(frame: usize, body: Vec<I>) -> Vec<I> {
    let mut code = vec![
        I::Text(None),
        I::Align,
        I::Global("_main".to_string(), SymbolKind::Function),
        I::Label("_main".to_string()),
        I::Enter(frame),
    ];
    code.extend(body);
    code.extend([I::Align, I::Label("_L1".to_string()), I::Leave, I::Ret]);
    code
}

fn label(name: &str) -> String {
    name.to_string()
}

#[test]
fn test_frame_size_counts_nested_declarations() {
    let nested_function = Expr::function(
        vec![],
        Type::Void,
        BlockStmt::new(vec![DeclarationStmt::typed(Type::Double, "hidden", None, 3)], vec![], 3),
        3,
    );
    let body = BlockStmt::new(
        vec![
            DeclarationStmt::typed(Type::Int, "a", None, 1),
            DeclarationStmt::typed(Type::Double, "b", None, 1),
        ],
        vec![
            Stmt::if_then(
                Expr::integer(1, 2),
                BlockStmt::new(vec![DeclarationStmt::typed(Type::Int, "c", None, 2)], vec![], 2),
                2,
            ),
            Stmt::loop_while(
                Expr::integer(1, 3),
                Stmt::block(BlockStmt::new(
                    vec![DeclarationStmt::typed(Type::Double, "d", None, 3)],
                    vec![],
                    3,
                )),
                3,
            ),
            Stmt::declaration(DeclarationStmt::typed(Type::pointer(Type::Int), "p", None, 4)),
            Stmt::evaluation(nested_function, 5),
        ],
        1,
    );

    assert_eq!(FrameSizeCalculator::new().calculate(&body), 28);
}

#[test]
fn test_listing_indents_everything_but_labels() {
    let code = vec![
        I::Label(label("_main")),
        I::Enter(0),
        I::Double(2.5),
        I::SString("hi".to_string()),
    ];

    assert_eq!(
        listing(&code),
        "_main:\n\tENTER 0\n\tDOUBLE 2.5\n\tSSTRING \"hi\"\n"
    );
}

#[test]
fn test_empty_main() {
    let mut program = main_program(vec![], vec![]);

    assert_eq!(compile_ok(&mut program), entry(0, vec![]));
}

#[test]
fn test_local_declaration_and_assignment() {
    let mut program = main_program(
        vec![DeclarationStmt::typed(Type::Int, "a", Some(Expr::integer(2, 1)), 1)],
        vec![Stmt::evaluation(
            Expr::assignment(
                LValue::variable("a", 2),
                Expr::binary(BinaryOperator::Add, Expr::variable("a", 2), Expr::integer(1, 2), 2),
                2,
            ),
            2,
        )],
    );

    assert_eq!(
        compile_ok(&mut program),
        entry(
            4,
            vec![
                I::Int(2),
                I::Local(-4),
                I::StInt,
                I::Local(-4),
                I::LdInt,
                I::Int(1),
                I::Add,
                I::Dup32,
                I::Local(-4),
                I::StInt,
                I::Trash(4),
            ]
        )
    );
}

#[test]
fn test_print_uses_intrinsics_in_order() {
    let mut program = main_program(
        vec![],
        vec![Stmt::print(
            vec![Expr::integer(1, 1), Expr::string("hi", 1), Expr::double(2.5, 1)],
            true,
            1,
        )],
    );

    let mut expected = entry(
        0,
        vec![
            I::Int(1),
            I::Call(label("printi")),
            I::Trash(4),
            I::Rodata,
            I::Align,
            I::Label(label("_L2")),
            I::SString("hi".to_string()),
            I::Text(None),
            I::Addr(label("_L2")),
            I::Call(label("prints")),
            I::Trash(4),
            I::Double(2.5),
            I::Call(label("printd")),
            I::Trash(8),
            I::Call(label("println")),
        ],
    );
    expected.extend(
        ["printd", "printi", "println", "prints"].map(|name| I::Extern(label(name))),
    );

    assert_eq!(compile_ok(&mut program), expected);
}

#[test]
fn test_double_arithmetic_promotes_int_operand() {
    let mut program = main_program(
        vec![DeclarationStmt::typed(Type::Double, "d", Some(Expr::integer(1, 1)), 1)],
        vec![Stmt::print(
            vec![Expr::binary(
                BinaryOperator::Add,
                Expr::variable("d", 2),
                Expr::integer(1, 2),
                2,
            )],
            false,
            2,
        )],
    );

    let mut expected = entry(
        8,
        vec![
            I::Int(1),
            I::I2D,
            I::Local(-8),
            I::StDouble,
            I::Local(-8),
            I::LdDouble,
            I::Int(1),
            I::I2D,
            I::DAdd,
            I::Call(label("printd")),
            I::Trash(8),
        ],
    );
    expected.push(I::Extern(label("printd")));

    assert_eq!(compile_ok(&mut program), expected);
}

#[test]
fn test_short_circuit_and() {
    let mut program = main_program(
        vec![],
        vec![Stmt::print(
            vec![Expr::binary(BinaryOperator::And, Expr::integer(1, 1), Expr::integer(0, 1), 1)],
            false,
            1,
        )],
    );

    let mut expected = entry(
        0,
        vec![
            I::Int(1),
            I::Dup32,
            I::Jz(label("_L2")),
            I::Int(0),
            I::And,
            I::Align,
            I::Label(label("_L2")),
            I::Call(label("printi")),
            I::Trash(4),
        ],
    );
    expected.push(I::Extern(label("printi")));

    assert_eq!(compile_ok(&mut program), expected);
}

#[test]
fn test_short_circuit_or() {
    let mut program = main_program(
        vec![],
        vec![Stmt::print(
            vec![Expr::binary(BinaryOperator::Or, Expr::integer(0, 1), Expr::integer(1, 1), 1)],
            false,
            1,
        )],
    );

    let mut expected = entry(
        0,
        vec![
            I::Int(0),
            I::Dup32,
            I::Jnz(label("_L2")),
            I::Int(1),
            I::Or,
            I::Align,
            I::Label(label("_L2")),
            I::Call(label("printi")),
            I::Trash(4),
        ],
    );
    expected.push(I::Extern(label("printi")));

    assert_eq!(compile_ok(&mut program), expected);
}

#[test]
fn test_int_plus_pointer_scales_left_operand() {
    let mut program = main_program(
        vec![DeclarationStmt::typed(Type::pointer(Type::Double), "p", None, 1)],
        vec![Stmt::evaluation(
            Expr::assignment(
                LValue::variable("p", 2),
                Expr::binary(BinaryOperator::Add, Expr::integer(1, 2), Expr::variable("p", 2), 2),
                2,
            ),
            2,
        )],
    );

    assert_eq!(
        compile_ok(&mut program),
        entry(
            4,
            vec![
                I::Int(1),
                I::Int(8),
                I::Mul,
                I::Local(-4),
                I::LdInt,
                I::Add,
                I::Dup32,
                I::Local(-4),
                I::StInt,
                I::Trash(4),
            ]
        )
    );
}

#[test]
fn test_address_of_pushes_the_lvalue_address() {
    let mut program = Program::new(
        vec![DeclarationStmt::typed(Type::Int, "g", None, 1)],
        Some(BlockStmt::new(
            vec![DeclarationStmt::typed(Type::Double, "d", None, 2)],
            vec![
                Stmt::evaluation(Expr::address_of(LValue::variable("d", 3), 3), 3),
                Stmt::evaluation(Expr::address_of(LValue::variable("g", 4), 4), 4),
            ],
            2,
        )),
    );

    let mut expected = vec![I::Bss, I::Align, I::Label(label("g")), I::SAlloc(4)];
    expected.extend(entry(
        8,
        vec![I::Local(-8), I::Trash(4), I::Addr(label("g")), I::Trash(4)],
    ));

    assert_eq!(compile_ok(&mut program), expected);
}

#[test]
fn test_sizeof_does_not_evaluate_its_operand() {
    let mut program = main_program(
        vec![DeclarationStmt::typed(Type::Double, "d", None, 1)],
        vec![Stmt::print(
            vec![Expr::sizeof(
                Expr::assignment(LValue::variable("d", 2), Expr::read(2), 2),
                2,
            )],
            false,
            2,
        )],
    );

    let mut expected = entry(
        8,
        vec![I::Int(8), I::Call(label("printi")), I::Trash(4)],
    );
    expected.push(I::Extern(label("printi")));

    assert_eq!(compile_ok(&mut program), expected);
}

#[test]
fn test_loop_stop_and_next_targets() {
    let mut program = main_program(
        vec![],
        vec![Stmt::loop_while(
            Expr::integer(1, 1),
            Stmt::block(BlockStmt::new(vec![], vec![Stmt::stop(1, 2), Stmt::next(1, 3)], 1)),
            1,
        )],
    );

    assert_eq!(
        compile_ok(&mut program),
        entry(
            0,
            vec![
                I::Label(label("_L2")),
                I::Int(1),
                I::Jz(label("_L3")),
                I::Jmp(label("_L3")),
                I::Jmp(label("_L2")),
                I::Jmp(label("_L2")),
                I::Label(label("_L3")),
            ]
        )
    );
}

#[test]
fn test_stop_outside_loop() {
    let mut program = main_program(vec![], vec![Stmt::stop(1, 4)]);

    let errors = compile_err(&mut program);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "InstructionOutsideLoop");
    assert_eq!(errors[0].get_position().line(), 4);
}

#[test]
fn test_next_level_beyond_nesting() {
    let mut program = main_program(
        vec![],
        vec![Stmt::loop_while(Expr::integer(1, 1), Stmt::next(2, 2), 1)],
    );

    let errors = compile_err(&mut program);

    assert_eq!(errors[0].get_error_name(), "InvalidLoopLevel");
    assert_eq!(errors[0].to_string(), "2: invalid next level 2");
}

#[test]
fn test_loop_level_zero_is_rejected() {
    let mut program = main_program(
        vec![],
        vec![Stmt::loop_while(
            Expr::integer(1, 1),
            Stmt::block(BlockStmt::new(vec![], vec![Stmt::stop(0, 2), Stmt::next(0, 3)], 1)),
            1,
        )],
    );

    let errors = compile_err(&mut program);

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].get_error_name(), "InvalidLoopLevel");
    assert_eq!(errors[0].to_string(), "2: invalid stop level 0");
    assert_eq!(errors[1].to_string(), "3: invalid next level 0");
}

#[test]
fn test_type_errors_prevent_code_generation() {
    let mut program = main_program(vec![], vec![Stmt::print(vec![Expr::variable("x", 3)], true, 3)]);
    let mut code: Vec<I> = Vec::new();

    let errors = compile(&mut program, &mut code).unwrap_err();

    assert_eq!(errors[0].get_error_name(), "VariableNotDeclared");
    assert!(code.is_empty());
}

#[test]
fn test_global_storage() {
    let mut program = Program::new(
        vec![
            DeclarationStmt::typed(Type::Int, "g", Some(Expr::integer(3, 1)), 1),
            DeclarationStmt::typed(Type::Double, "d", Some(Expr::integer(1, 2)), 2)
                .with_qualifier(Qualifier::Public),
            DeclarationStmt::typed(Type::Int, "z", None, 3),
            DeclarationStmt::typed(Type::Int, "e", None, 4).with_qualifier(Qualifier::External),
            DeclarationStmt::typed(Type::Int, "f", None, 5).with_qualifier(Qualifier::Forward),
            DeclarationStmt::typed(Type::String, "s", Some(Expr::string("hi", 6)), 6),
        ],
        None,
    );

    assert_eq!(
        compile_ok(&mut program),
        vec![
            I::Data,
            I::Align,
            I::Label(label("g")),
            I::SInt(3),
            I::Global(label("d"), SymbolKind::Object),
            I::Data,
            I::Align,
            I::Label(label("d")),
            I::SDouble(1.0),
            I::Bss,
            I::Align,
            I::Label(label("z")),
            I::SAlloc(4),
            I::Extern(label("e")),
            I::Rodata,
            I::Align,
            I::Label(label("_L1")),
            I::SString("hi".to_string()),
            I::Data,
            I::Align,
            I::Label(label("s")),
            I::SAddr(label("_L1")),
        ]
    );
}

#[test]
fn test_global_signed_literals_are_folded() {
    let mut program = Program::new(
        vec![
            DeclarationStmt::typed(
                Type::Int,
                "x",
                Some(Expr::unary(UnaryOperator::Negation, Expr::integer(1, 1), 1)),
                1,
            ),
            DeclarationStmt::typed(
                Type::Double,
                "d",
                Some(Expr::unary(UnaryOperator::Negation, Expr::integer(3, 2), 2)),
                2,
            ),
            DeclarationStmt::typed(
                Type::Int,
                "k",
                Some(Expr::unary(UnaryOperator::Identity, Expr::integer(4, 3), 3)),
                3,
            ),
        ],
        None,
    );

    assert_eq!(
        compile_ok(&mut program),
        vec![
            I::Data,
            I::Align,
            I::Label(label("x")),
            I::SInt(-1),
            I::Data,
            I::Align,
            I::Label(label("d")),
            I::SDouble(-3.0),
            I::Data,
            I::Align,
            I::Label(label("k")),
            I::SInt(4),
        ]
    );
}

#[test]
fn test_global_logical_not_is_not_folded() {
    let mut program = Program::new(
        vec![DeclarationStmt::typed(
            Type::Int,
            "n",
            Some(Expr::unary(UnaryOperator::Not, Expr::integer(0, 1), 1)),
            1,
        )],
        None,
    );

    let errors = compile_err(&mut program);

    assert_eq!(errors[0].get_error_name(), "UnsupportedConstruct");
}

#[test]
fn test_non_constant_global_initializer() {
    let mut program = Program::new(
        vec![
            DeclarationStmt::typed(Type::Int, "a", Some(Expr::integer(1, 1)), 1),
            DeclarationStmt::var(
                "b",
                Expr::binary(BinaryOperator::Add, Expr::variable("a", 2), Expr::integer(1, 2), 2),
                2,
            ),
        ],
        None,
    );

    let errors = compile_err(&mut program);

    assert_eq!(errors[0].get_error_name(), "UnsupportedConstruct");
    assert_eq!(errors[0].get_position().line(), 2);
}

#[test]
fn test_function_call_converts_int_argument() {
    let identity = Expr::function(
        vec![DeclarationStmt::typed(Type::Double, "x", None, 1)],
        Type::Double,
        BlockStmt::new(vec![], vec![Stmt::return_value(Some(Expr::variable("x", 2)), 2)], 1),
        1,
    );
    let mut program = Program::new(
        vec![DeclarationStmt::typed(
            Type::functional(vec![Type::Double], Type::Double),
            "f",
            Some(identity),
            1,
        )],
        Some(BlockStmt::new(
            vec![],
            vec![Stmt::print(
                vec![Expr::call(Expr::variable("f", 4), vec![Expr::integer(1, 4)], 4)],
                false,
                4,
            )],
            3,
        )),
    );

    let code = compile_ok(&mut program);

    assert_eq!(
        code,
        vec![
            I::Text(Some(label("_L1"))),
            I::Align,
            I::Label(label("_L1")),
            I::Enter(0),
            I::Local(8),
            I::LdDouble,
            I::StFVal64,
            I::Jmp(label("_L2")),
            I::Align,
            I::Label(label("_L2")),
            I::Leave,
            I::Ret,
            I::Data,
            I::Align,
            I::Label(label("f")),
            I::SAddr(label("_L1")),
            I::Text(None),
            I::Align,
            I::Global(label("_main"), SymbolKind::Function),
            I::Label(label("_main")),
            I::Enter(0),
            I::Int(1),
            I::I2D,
            I::Addr(label("f")),
            I::LdInt,
            I::Branch,
            I::Trash(8),
            I::LdFVal64,
            I::Call(label("printd")),
            I::Trash(8),
            I::Align,
            I::Label(label("_L3")),
            I::Leave,
            I::Ret,
            I::Extern(label("printd")),
        ]
    );
}

#[test]
fn test_function_locals_and_arguments() {
    let function = Expr::function(
        vec![
            DeclarationStmt::typed(Type::Double, "x", None, 1),
            DeclarationStmt::typed(Type::Int, "y", None, 1),
        ],
        Type::Int,
        BlockStmt::new(
            vec![DeclarationStmt::typed(Type::Int, "z", Some(Expr::variable("y", 2)), 2)],
            vec![Stmt::return_value(Some(Expr::variable("z", 3)), 3)],
            1,
        ),
        1,
    );
    let mut program = Program::new(
        vec![DeclarationStmt::var("f", function, 1).with_qualifier(Qualifier::Public)],
        None,
    );

    let code = compile_ok(&mut program);

    assert_eq!(code[0], I::Global(label("f"), SymbolKind::Object));
    assert_eq!(
        code[1..9],
        [
            I::Text(Some(label("_L1"))),
            I::Align,
            I::Label(label("_L1")),
            I::Enter(4),
            I::Local(16),
            I::LdInt,
            I::Local(-4),
            I::StInt,
        ]
    );
    assert_eq!(code[9..12], [I::Local(-4), I::LdInt, I::StFVal32]);
}

#[test]
fn test_nested_function_cannot_read_enclosing_local() {
    let reads_y = Expr::function(
        vec![],
        Type::Int,
        BlockStmt::new(vec![], vec![Stmt::return_value(Some(Expr::variable("y", 3)), 3)], 2),
        2,
    );
    let mut program = main_program(
        vec![
            DeclarationStmt::typed(Type::Int, "y", Some(Expr::integer(7, 1)), 1),
            DeclarationStmt::var("g", reads_y, 2),
        ],
        vec![Stmt::print(vec![Expr::call(Expr::variable("g", 4), vec![], 4)], true, 4)],
    );
    let mut code: Vec<I> = Vec::new();

    let errors = compile(&mut program, &mut code).unwrap_err();

    assert!(code.is_empty());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].get_error_name(), "UnsupportedConstruct");
    assert_eq!(
        errors[0].to_string(),
        "3: unsupported construct: access to 'y' of an enclosing function"
    );
}

#[test]
fn test_recursive_call_branches_to_enclosing_function() {
    let function = Expr::function(
        vec![DeclarationStmt::typed(Type::Int, "n", None, 1)],
        Type::Int,
        BlockStmt::new(
            vec![],
            vec![Stmt::return_value(
                Some(Expr::recursive_call(vec![Expr::variable("n", 2)], 2)),
                2,
            )],
            1,
        ),
        1,
    );
    let mut program = Program::new(vec![DeclarationStmt::var("count", function, 1)], None);

    let code = compile_ok(&mut program);

    assert_eq!(
        code[4..11],
        [
            I::Local(8),
            I::LdInt,
            I::Addr(label("_L1")),
            I::Branch,
            I::Trash(4),
            I::LdFVal32,
            I::StFVal32,
        ]
    );
}

#[test]
fn test_external_function_is_called_by_name() {
    let mut program = Program::new(
        vec![DeclarationStmt::typed(
            Type::functional(vec![Type::Int], Type::Int),
            "square",
            None,
            1,
        )
        .with_qualifier(Qualifier::External)],
        Some(BlockStmt::new(
            vec![],
            vec![Stmt::print(
                vec![Expr::call(Expr::variable("square", 2), vec![Expr::integer(2, 2)], 2)],
                false,
                2,
            )],
            2,
        )),
    );

    let code = compile_ok(&mut program);

    assert_eq!(code[0], I::Extern(label("square")));
    assert!(code
        .windows(4)
        .any(|window| window
            == [I::Int(2), I::Call(label("square")), I::Trash(4), I::LdFVal32]));
}

#[test]
fn test_stack_alloc_and_indexing() {
    let mut program = main_program(
        vec![DeclarationStmt::var("p", Expr::stack_alloc(Expr::integer(3, 1), 1), 1)],
        vec![
            Stmt::print(
                vec![Expr::rvalue(
                    LValue::index(Expr::variable("p", 2), Expr::integer(1, 2), 2),
                    2,
                )],
                false,
                2,
            ),
            Stmt::print(
                vec![Expr::binary(
                    BinaryOperator::Sub,
                    Expr::variable("p", 3),
                    Expr::variable("p", 3),
                    3,
                )],
                false,
                3,
            ),
        ],
    );

    let mut expected = entry(
        4,
        vec![
            I::Int(3),
            I::Int(4),
            I::Mul,
            I::Alloc,
            I::Sp,
            I::Local(-4),
            I::StInt,
            I::Local(-4),
            I::LdInt,
            I::Int(1),
            I::Int(4),
            I::Mul,
            I::Add,
            I::LdInt,
            I::Call(label("printi")),
            I::Trash(4),
            I::Local(-4),
            I::LdInt,
            I::Local(-4),
            I::LdInt,
            I::Sub,
            I::Int(4),
            I::Div,
            I::Call(label("printi")),
            I::Trash(4),
        ],
    );
    expected.push(I::Extern(label("printi")));

    assert_eq!(compile_ok(&mut program), expected);
}

#[test]
fn test_read_into_int() {
    let mut program = main_program(
        vec![DeclarationStmt::typed(Type::Int, "a", Some(Expr::read(1)), 1)],
        vec![],
    );

    let mut expected = entry(
        4,
        vec![
            I::Call(label("readi")),
            I::LdFVal32,
            I::Local(-4),
            I::StInt,
        ],
    );
    expected.push(I::Extern(label("readi")));

    assert_eq!(compile_ok(&mut program), expected);
}
