//! IR-to-IR rewrite passes.
//!
//! A [`Pipeline`] verifies the module before running and re-verifies after
//! every pass, so a pass which breaks an invariant is named in the error.

use std::collections::HashMap;

use crate::{
    ir::{BinOp, Function, InstrKind, Module, Terminator, ValueId, VerifyError},
    value::FLOAT_DIV_EPSILON,
};

pub trait Pass {
    fn name(&self) -> &'static str;
    fn run(&self, module: &mut Module);
}

#[derive(Clone, Debug, PartialEq)]
pub struct PassError {
    pub pass: &'static str,
    pub error: VerifyError,
}

#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn empty() -> Pipeline {
        Pipeline::default()
    }

    /// Constant folding followed by a dead code sweep.
    pub fn standard() -> Pipeline {
        Pipeline {
            passes: vec![Box::new(ConstantFolding), Box::new(DeadCodeElimination)],
        }
    }

    pub fn with(mut self, pass: impl Pass + 'static) -> Pipeline {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn run(&self, module: &mut Module) -> Result<(), PassError> {
        module.verify().map_err(|error| PassError {
            pass: "input",
            error,
        })?;
        for pass in &self.passes {
            pass.run(module);
            module.verify().map_err(|error| PassError {
                pass: pass.name(),
                error,
            })?;
        }
        Ok(())
    }
}

//
// Constant folding
//

pub struct ConstantFolding;

#[derive(Copy, Clone, Debug)]
enum Const {
    Int(i64),
    Float(f32),
    Bool(bool),
}

impl Pass for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn run(&self, module: &mut Module) {
        for function in &mut module.functions {
            fold_function(function);
        }
    }
}

fn fold_function(function: &mut Function) {
    let mut consts: HashMap<ValueId, Const> = HashMap::new();
    for instr in &mut function.body {
        if let Some(folded) = fold_instr(&instr.kind, &consts) {
            instr.kind = match folded {
                Const::Int(i) => InstrKind::ConstInt(i),
                Const::Float(x) => InstrKind::ConstFloat(x),
                Const::Bool(b) => InstrKind::ConstBool(b),
            };
        }
        let known = match instr.kind {
            InstrKind::ConstInt(i) => Some(Const::Int(i)),
            InstrKind::ConstFloat(x) => Some(Const::Float(x)),
            InstrKind::ConstBool(b) => Some(Const::Bool(b)),
            _ => None,
        };
        if let Some(known) = known {
            consts.insert(instr.value, known);
        }
    }
}

fn fold_instr(kind: &InstrKind, consts: &HashMap<ValueId, Const>) -> Option<Const> {
    let folded = match kind {
        InstrKind::Bin { op, lhs, rhs } => {
            let (lhs, rhs) = (consts.get(lhs)?, consts.get(rhs)?);
            match (op, lhs, rhs) {
                (BinOp::Add, Const::Int(a), Const::Int(b)) => Const::Int(a.wrapping_add(*b)),
                (BinOp::Sub, Const::Int(a), Const::Int(b)) => Const::Int(a.wrapping_sub(*b)),
                (BinOp::Mul, Const::Int(a), Const::Int(b)) => Const::Int(a.wrapping_mul(*b)),
                // A zero divisor is left for the runtime to report.
                (BinOp::SDiv, Const::Int(a), Const::Int(b)) if *b != 0 => {
                    Const::Int(a.wrapping_div(*b))
                }
                (BinOp::FAdd, Const::Float(a), Const::Float(b)) => Const::Float(a + b),
                (BinOp::FSub, Const::Float(a), Const::Float(b)) => Const::Float(a - b),
                (BinOp::FMul, Const::Float(a), Const::Float(b)) => Const::Float(a * b),
                (BinOp::FDiv, Const::Float(a), Const::Float(b))
                    if b.abs() >= FLOAT_DIV_EPSILON =>
                {
                    Const::Float(a / b)
                }
                _ => return None,
            }
        }
        InstrKind::FNeg(v) => match consts.get(v)? {
            Const::Float(x) => Const::Float(-x),
            _ => return None,
        },
        InstrKind::Not(v) => match consts.get(v)? {
            Const::Bool(b) => Const::Bool(!b),
            _ => return None,
        },
        InstrKind::SiToFp(v) => match consts.get(v)? {
            #[allow(clippy::cast_precision_loss)]
            Const::Int(i) => Const::Float(*i as f32),
            _ => return None,
        },
        _ => return None,
    };
    Some(folded)
}

//
// Dead code elimination
//

pub struct DeadCodeElimination;

impl Pass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }

    fn run(&self, module: &mut Module) {
        for function in &mut module.functions {
            forward_loads(function);
            sweep_function(function);
        }
    }
}

/// Replaces a load with the value of the latest store to the same slot.
///
/// Sound because slot addresses never escape: allocas are only ever loaded
/// from and stored to directly, so a call cannot alias them.
fn forward_loads(function: &mut Function) {
    let mut last_store: HashMap<ValueId, ValueId> = HashMap::new();
    let mut subst: HashMap<ValueId, ValueId> = HashMap::new();

    let mut kept = Vec::with_capacity(function.body.len());
    for mut instr in function.body.drain(..) {
        rewrite_operands(&mut instr.kind, &subst);
        match instr.kind {
            InstrKind::Store { value, ptr } => {
                last_store.insert(ptr, value);
                kept.push(instr);
            }
            InstrKind::Load { ptr, .. } => match last_store.get(&ptr) {
                Some(&stored) => {
                    subst.insert(instr.value, stored);
                }
                None => kept.push(instr),
            },
            _ => kept.push(instr),
        }
    }
    function.body = kept;

    if let Some(Terminator::Ret(Some(v))) = &mut function.terminator {
        if let Some(&forwarded) = subst.get(v) {
            *v = forwarded;
        }
    }
}

fn rewrite_operands(kind: &mut InstrKind, subst: &HashMap<ValueId, ValueId>) {
    let rewrite = |v: &mut ValueId| {
        if let Some(&forwarded) = subst.get(v) {
            *v = forwarded;
        }
    };
    match kind {
        InstrKind::Load { ptr, .. } => rewrite(ptr),
        InstrKind::Store { value, ptr } => {
            rewrite(value);
            rewrite(ptr);
        }
        InstrKind::Bin { lhs, rhs, .. } => {
            rewrite(lhs);
            rewrite(rhs);
        }
        InstrKind::FNeg(v) | InstrKind::Not(v) | InstrKind::SiToFp(v) => rewrite(v),
        InstrKind::Call { args, .. } => args.iter_mut().for_each(rewrite),
        InstrKind::ConstInt(_)
        | InstrKind::ConstFloat(_)
        | InstrKind::ConstBool(_)
        | InstrKind::GlobalAddr(_)
        | InstrKind::Alloca(_) => {}
    }
}

/// Removes side-effect-free instructions whose value is never used.
/// Iterates to a fixpoint so that chains of dead values disappear.
fn sweep_function(function: &mut Function) {
    loop {
        let mut used = vec![false; function.value_tys.len()];
        let mut mark = |value: ValueId| used[value.0 as usize] = true;

        for instr in &function.body {
            match &instr.kind {
                InstrKind::Load { ptr, .. } => mark(*ptr),
                InstrKind::Store { value, ptr } => {
                    mark(*value);
                    mark(*ptr);
                }
                InstrKind::Bin { lhs, rhs, .. } => {
                    mark(*lhs);
                    mark(*rhs);
                }
                InstrKind::FNeg(v) | InstrKind::Not(v) | InstrKind::SiToFp(v) => mark(*v),
                InstrKind::Call { args, .. } => args.iter().copied().for_each(&mut mark),
                InstrKind::ConstInt(_)
                | InstrKind::ConstFloat(_)
                | InstrKind::ConstBool(_)
                | InstrKind::GlobalAddr(_)
                | InstrKind::Alloca(_) => {}
            }
        }
        if let Some(Terminator::Ret(Some(v))) = &function.terminator {
            mark(*v);
        }

        let before = function.body.len();
        function.body.retain(|instr| {
            let effectful = matches!(
                instr.kind,
                InstrKind::Store { .. } | InstrKind::Call { .. }
            );
            effectful || used[instr.value.0 as usize]
        });
        if function.body.len() == before {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{codegen, parser, util::intern::Interner};

    fn optimized(src: &str) -> Module {
        let mut interner = Interner::with_capacity(32);
        let mut tokens = Vec::new();
        let stmts = parser::parse_program(src, &mut tokens, &mut interner).unwrap();
        let mut module = codegen::compile(&stmts, &mut interner).unwrap();
        Pipeline::standard().run(&mut module).unwrap();
        module
    }

    #[test]
    fn folds_constant_arithmetic_down_to_the_return() {
        let module = optimized("return 2 + 3\n");
        let rendered = module.to_string();
        assert!(rendered.contains(indoc! {"
            define i64 @main() {
              %2 = const_int 5
              ret %2
            }
        "}));
    }

    #[test]
    fn sweeps_unused_expression_statements() {
        let module = optimized("x = 1\n2 + 3\n");
        let main = module.get_function("main").unwrap();
        let body = &module.function(main).body;
        // alloca + const + store + final exit code; the unused addition and
        // its operands are gone.
        assert_eq!(body.len(), 4);
        assert!(!body
            .iter()
            .any(|i| matches!(i.kind, InstrKind::Bin { .. })));
    }

    #[test]
    fn a_folded_main_returns_its_constant() {
        let module = optimized("def main() -> int:\n    x: int = 2 + 3\n    return x\n");
        let main = module.get_function("main").unwrap();
        let main = module.function(main);

        let Some(Terminator::Ret(Some(ret))) = main.terminator else {
            panic!("main must return a value");
        };
        assert!(main
            .body
            .iter()
            .any(|i| i.value == ret && i.kind == InstrKind::ConstInt(5)));
    }

    #[test]
    fn zero_divisors_are_not_folded() {
        let module = optimized("x = 4 / (2 - 2)\n");
        let main = module.get_function("main").unwrap();
        let body = &module.function(main).body;
        assert!(body
            .iter()
            .any(|i| matches!(i.kind, InstrKind::Bin { op: BinOp::SDiv, .. })));
    }

    #[test]
    fn the_pipeline_names_the_failing_stage() {
        use crate::ir::{Function, Ty, VerifyErrorKind};

        let mut module = Module::new();
        let mut f = Function::new("f", vec![], Ty::Void);
        let _ = f.push(InstrKind::ConstInt(1), Ty::I64);
        // No terminator.
        module.add_function(f);

        let error = Pipeline::standard().run(&mut module).unwrap_err();
        assert_eq!(error.pass, "input");
        assert_eq!(error.error.kind, VerifyErrorKind::MissingTerminator);
    }
}
