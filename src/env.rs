use std::collections::HashMap;

use crate::{types::TypeKind, util::intern::Symbol};

/// The scope chain of the type checker, realized as a stack of name tables.
///
/// Index 0 is the global scope, which lives for the whole compilation and
/// can never be popped. Lookup walks innermost-to-outermost; a binding in a
/// child scope shadows, and never mutates, its parents.
pub struct TypeEnv {
    scopes: Vec<HashMap<Symbol, TypeKind>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoppedRootScope;

impl TypeEnv {
    pub fn new() -> TypeEnv {
        TypeEnv {
            scopes: vec![HashMap::new()],
        }
    }

    /// Looks `name` up along the scope chain. Returns [`TypeKind::Unknown`]
    /// when the chain is exhausted.
    pub fn get(&self, name: Symbol) -> TypeKind {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
            .unwrap_or(TypeKind::Unknown)
    }

    /// Binds `name` in the current scope. Rebinding an existing name shadows
    /// the old type (the checker allows redeclaration).
    pub fn set(&mut self, name: Symbol, kind: TypeKind) {
        self.scopes
            .last_mut()
            .expect("the global scope always exists")
            .insert(name, kind);
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) -> Result<(), PoppedRootScope> {
        if self.scopes.len() <= 1 {
            return Err(PoppedRootScope);
        }
        self.scopes.pop();
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        TypeEnv::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::intern::Interner;
    use pretty_assertions::assert_eq;

    #[test]
    fn bindings_do_not_leak_upward() {
        let mut i = Interner::with_capacity(4);
        let x = i.intern("x");

        let mut env = TypeEnv::new();
        env.push_scope();
        env.set(x, TypeKind::Int);
        assert_eq!(env.get(x), TypeKind::Int);
        env.pop_scope().unwrap();
        assert_eq!(env.get(x), TypeKind::Unknown);
    }

    #[test]
    fn inner_scopes_shadow_outer_ones() {
        let mut i = Interner::with_capacity(4);
        let x = i.intern("x");

        let mut env = TypeEnv::new();
        env.set(x, TypeKind::Int);
        env.push_scope();
        assert_eq!(env.get(x), TypeKind::Int);
        env.set(x, TypeKind::Float);
        assert_eq!(env.get(x), TypeKind::Float);
        env.pop_scope().unwrap();
        assert_eq!(env.get(x), TypeKind::Int);
    }

    #[test]
    fn popping_the_root_scope_fails() {
        let mut env = TypeEnv::new();
        assert_eq!(env.pop_scope(), Err(PoppedRootScope));
        env.push_scope();
        assert_eq!(env.pop_scope(), Ok(()));
        assert_eq!(env.pop_scope(), Err(PoppedRootScope));
    }
}
