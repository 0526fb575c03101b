use std::collections::HashMap;

use super::symbols::Symbol;

/// Handle to a symbol stored in a `SymbolTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

/// Stack of scopes mapping names to symbols.
///
/// The table starts with one (global) scope. Symbols are never removed from
/// the arena, so handles stay valid after their scope is popped.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<HashMap<String, SymbolId>>,
    frame: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: Vec::new(),
            scopes: vec![HashMap::new()],
            frame: 0,
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Closes the innermost scope. The global scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Starts a function body: symbols bound from now on belong to its frame.
    pub fn enter_frame(&mut self) {
        self.frame += 1;
    }

    pub fn leave_frame(&mut self) {
        self.frame = self.frame.saturating_sub(1);
    }

    /// Nesting depth of the function being processed, 0 outside any function.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Binds `symbol` in the innermost scope, `None` if the name is already bound there.
    pub fn insert(&mut self, mut symbol: Symbol) -> Option<SymbolId> {
        symbol.frame = self.frame;
        let scope = self.scopes.last_mut()?;
        if scope.contains_key(&symbol.name) {
            return None;
        }

        let id = SymbolId(self.symbols.len());
        scope.insert(symbol.name.clone(), id);
        self.symbols.push(symbol);
        Some(id)
    }

    /// Rebinds the name in the innermost scope that contains it.
    pub fn replace(&mut self, mut symbol: Symbol) -> Option<SymbolId> {
        symbol.frame = self.frame;
        let id = SymbolId(self.symbols.len());
        let scope = self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.contains_key(&symbol.name))?;

        scope.insert(symbol.name.clone(), id);
        self.symbols.push(symbol);
        Some(id)
    }

    /// Looks the name up from the innermost scope outwards.
    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Looks the name up in the innermost scope only.
    pub fn find_local(&self, name: &str) -> Option<SymbolId> {
        self.scopes.last()?.get(name).copied()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0]
    }

    /// Shorthand for `find` followed by `get`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.find(name).map(|id| self.get(id))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
