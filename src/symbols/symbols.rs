use crate::ast::types::Type;

/// Linkage of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qualifier {
    /// Declared here, defined later in the same unit.
    Forward,
    /// Defined in another unit.
    External,
    /// Visible to other units.
    Public,
    #[default]
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub qualifier: Qualifier,
    /// Frame offset; 0 for globals, positive for parameters, negative for locals.
    pub offset: i32,
    pub value: Option<i64>,
    /// Nesting depth of the function that owns the symbol, 0 for globals.
    pub frame: usize,
}

impl Symbol {
    pub fn new(name: &str, ty: Type, qualifier: Qualifier) -> Self {
        Symbol {
            name: name.to_string(),
            ty,
            qualifier,
            offset: 0,
            value: None,
            frame: 0,
        }
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn is_global(&self) -> bool {
        self.frame == 0
    }

    /// A declaration that does not define storage in this unit.
    pub fn is_declaration_only(&self) -> bool {
        matches!(self.qualifier, Qualifier::Forward | Qualifier::External)
    }
}
