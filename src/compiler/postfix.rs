//! Stack-machine instruction set.
//!
//! The code generator pushes `Instruction` values into an `Emitter`. How they
//! are finally spelled in an assembly file is up to the emitter; `listing`
//! renders a readable form used for inspection and tests.

use std::fmt::Display;

/// Kind of a symbol exported with `GLOBAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Object,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // Segments and directives
    /// Text segment; named segments hold the body of one function.
    Text(Option<String>),
    Data,
    Rodata,
    Bss,
    Align,
    Label(String),
    Global(String, SymbolKind),
    Extern(String),

    // Static data
    SInt(i32),
    SDouble(f64),
    SString(String),
    SAddr(String),
    SAlloc(usize),

    // Values and addresses
    Int(i32),
    Double(f64),
    Addr(String),
    Local(i32),
    LdInt,
    LdDouble,
    StInt,
    StDouble,
    Dup32,
    Dup64,
    Trash(usize),

    // Arithmetic and logic
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    DAdd,
    DSub,
    DMul,
    DDiv,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    I2D,

    // Control flow
    Jmp(String),
    Jz(String),
    Jnz(String),
    Enter(usize),
    Leave,
    Ret,
    Call(String),
    Branch,
    StFVal32,
    StFVal64,
    LdFVal32,
    LdFVal64,

    // Dynamic stack allocation
    Alloc,
    Sp,
}

/// Sink for generated instructions.
pub trait Emitter {
    fn emit(&mut self, instruction: Instruction);
}

impl Emitter for Vec<Instruction> {
    fn emit(&mut self, instruction: Instruction) {
        self.push(instruction);
    }
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "FUNC"),
            SymbolKind::Object => write!(f, "OBJ"),
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Text(None) => write!(f, "TEXT"),
            Instruction::Text(Some(label)) => write!(f, "TEXT {}", label),
            Instruction::Data => write!(f, "DATA"),
            Instruction::Rodata => write!(f, "RODATA"),
            Instruction::Bss => write!(f, "BSS"),
            Instruction::Align => write!(f, "ALIGN"),
            Instruction::Label(label) => write!(f, "{}:", label),
            Instruction::Global(name, kind) => write!(f, "GLOBAL {} {}", name, kind),
            Instruction::Extern(name) => write!(f, "EXTERN {}", name),
            Instruction::SInt(value) => write!(f, "SINT {}", value),
            Instruction::SDouble(value) => write!(f, "SDOUBLE {:?}", value),
            Instruction::SString(value) => write!(f, "SSTRING {:?}", value),
            Instruction::SAddr(label) => write!(f, "SADDR {}", label),
            Instruction::SAlloc(bytes) => write!(f, "SALLOC {}", bytes),
            Instruction::Int(value) => write!(f, "INT {}", value),
            Instruction::Double(value) => write!(f, "DOUBLE {:?}", value),
            Instruction::Addr(label) => write!(f, "ADDR {}", label),
            Instruction::Local(offset) => write!(f, "LOCAL {}", offset),
            Instruction::LdInt => write!(f, "LDINT"),
            Instruction::LdDouble => write!(f, "LDDOUBLE"),
            Instruction::StInt => write!(f, "STINT"),
            Instruction::StDouble => write!(f, "STDOUBLE"),
            Instruction::Dup32 => write!(f, "DUP32"),
            Instruction::Dup64 => write!(f, "DUP64"),
            Instruction::Trash(bytes) => write!(f, "TRASH {}", bytes),
            Instruction::Neg => write!(f, "NEG"),
            Instruction::Add => write!(f, "ADD"),
            Instruction::Sub => write!(f, "SUB"),
            Instruction::Mul => write!(f, "MUL"),
            Instruction::Div => write!(f, "DIV"),
            Instruction::Mod => write!(f, "MOD"),
            Instruction::DAdd => write!(f, "DADD"),
            Instruction::DSub => write!(f, "DSUB"),
            Instruction::DMul => write!(f, "DMUL"),
            Instruction::DDiv => write!(f, "DDIV"),
            Instruction::Lt => write!(f, "LT"),
            Instruction::Le => write!(f, "LE"),
            Instruction::Gt => write!(f, "GT"),
            Instruction::Ge => write!(f, "GE"),
            Instruction::Eq => write!(f, "EQ"),
            Instruction::Ne => write!(f, "NE"),
            Instruction::And => write!(f, "AND"),
            Instruction::Or => write!(f, "OR"),
            Instruction::I2D => write!(f, "I2D"),
            Instruction::Jmp(label) => write!(f, "JMP {}", label),
            Instruction::Jz(label) => write!(f, "JZ {}", label),
            Instruction::Jnz(label) => write!(f, "JNZ {}", label),
            Instruction::Enter(bytes) => write!(f, "ENTER {}", bytes),
            Instruction::Leave => write!(f, "LEAVE"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Call(name) => write!(f, "CALL {}", name),
            Instruction::Branch => write!(f, "BRANCH"),
            Instruction::StFVal32 => write!(f, "STFVAL32"),
            Instruction::StFVal64 => write!(f, "STFVAL64"),
            Instruction::LdFVal32 => write!(f, "LDFVAL32"),
            Instruction::LdFVal64 => write!(f, "LDFVAL64"),
            Instruction::Alloc => write!(f, "ALLOC"),
            Instruction::Sp => write!(f, "SP"),
        }
    }
}

/// One instruction per line, labels flush left and everything else indented.
pub fn listing(instructions: &[Instruction]) -> String {
    instructions
        .iter()
        .map(|instruction| match instruction {
            Instruction::Label(_) => format!("{}\n", instruction),
            _ => format!("\t{}\n", instruction),
        })
        .collect()
}
