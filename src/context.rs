use std::collections::HashMap;

use crate::{
    env::PoppedRootScope,
    ir::{FuncId, Function, InstrKind, Module, Ty, ValueId},
    util::intern::Symbol,
};

/// What a name resolves to during lowering.
#[derive(Copy, Clone, Debug)]
pub enum Slot {
    /// A stack slot introduced by an assignment or a parameter spill.
    Local { ptr: ValueId, ty: Ty },
    Func(FuncId),
}

/// Carries the module being built and the lexical scope stack.
///
/// Scope index 0 is the permanent root scope, holding the installed runtime
/// functions and every user-defined function.
pub struct CodeGenContext {
    pub module: Module,
    scopes: Vec<HashMap<Symbol, Slot>>,
    current: Option<FuncId>,
}

impl CodeGenContext {
    pub fn new() -> CodeGenContext {
        CodeGenContext {
            module: Module::new(),
            scopes: vec![HashMap::new()],
            current: None,
        }
    }

    pub fn define(&mut self, name: Symbol, slot: Slot) {
        // UNWRAP: The root scope is never popped.
        self.scopes.last_mut().unwrap().insert(name, slot);
    }

    /// Binds a name in the root scope regardless of the current nesting.
    pub fn define_in_root(&mut self, name: Symbol, slot: Slot) {
        self.scopes[0].insert(name, slot);
    }

    pub fn lookup(&self, name: Symbol) -> Option<Slot> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .copied()
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

    /// Makes the given function the emission target and opens its scope.
    pub fn enter_function(&mut self, id: FuncId) -> Option<FuncId> {
        self.push_scope();
        self.current.replace(id)
    }

    pub fn exit_function(&mut self, previous: Option<FuncId>) -> Result<(), PoppedRootScope> {
        self.pop_scope()?;
        self.current = previous;
        Ok(())
    }

    pub fn current_function(&self) -> Option<FuncId> {
        self.current
    }

    pub fn func(&self) -> &Function {
        // UNWRAP: Lowering only emits inside `enter_function`.
        self.module.function(self.current.unwrap())
    }

    pub fn func_mut(&mut self) -> &mut Function {
        // UNWRAP: Lowering only emits inside `enter_function`.
        self.module.function_mut(self.current.unwrap())
    }

    /// Appends an instruction to the current function.
    pub fn emit(&mut self, kind: InstrKind, ty: Ty) -> ValueId {
        self.func_mut().push(kind, ty)
    }

    /// Reserves a stack slot at the top of the current function.
    pub fn emit_alloca(&mut self, slot_ty: Ty) -> ValueId {
        self.func_mut().push_alloca(slot_ty)
    }
}

impl Default for CodeGenContext {
    fn default() -> CodeGenContext {
        CodeGenContext::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ir::Ty, util::intern::Interner};

    #[test]
    fn inner_definitions_shadow_and_unwind() {
        let mut interner = Interner::with_capacity(4);
        let x = interner.intern("x");

        let mut ctx = CodeGenContext::new();
        let f = ctx
            .module
            .add_function(Function::new("f", vec![], Ty::Void));
        let previous = ctx.enter_function(f);

        let outer = ctx.emit_alloca(Ty::I64);
        ctx.define_in_root(x, Slot::Local { ptr: outer, ty: Ty::I64 });

        ctx.push_scope();
        let inner = ctx.emit_alloca(Ty::F32);
        ctx.define(x, Slot::Local { ptr: inner, ty: Ty::F32 });
        assert!(matches!(ctx.lookup(x), Some(Slot::Local { ty: Ty::F32, .. })));
        ctx.pop_scope().unwrap();

        assert!(matches!(ctx.lookup(x), Some(Slot::Local { ty: Ty::I64, .. })));
        ctx.exit_function(previous).unwrap();
    }

    #[test]
    fn the_root_scope_cannot_be_popped() {
        let mut ctx = CodeGenContext::new();
        assert_eq!(ctx.pop_scope(), Err(PoppedRootScope));
    }
}
