use crate::{
    ast::{BinaryOperator, Expr, ExprKind, LogicalOperator, Stmt, StmtKind, UnaryOperator},
    context::{CodeGenContext, Slot},
    ir::{BinOp, Function, InstrKind, Module, Terminator, Ty, ValueId},
    stdlib,
    token::{Span, Spanned},
    util::intern::{Interner, Symbol},
    value::Value,
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Lowers a checked program into an IR module.
///
/// Top-level statements become the body of a synthesized `main` returning
/// the process exit code; every `def` becomes its own function.
pub fn compile(stmts: &[Stmt], ident_interner: &mut Interner) -> Result<Module> {
    let mut generator = Generator::new(ident_interner);
    generator.lower_program(stmts)?;
    Ok(generator.finish())
}

/// The result of lowering an expression. `None` literals and calls to
/// `void` functions produce no value.
enum Lowered {
    Value { id: ValueId, ty: Ty },
    Void,
}

impl Lowered {
    fn expect_value(self, span: Span) -> Result<(ValueId, Ty)> {
        match self {
            Lowered::Value { id, ty } => Ok((id, ty)),
            Lowered::Void => Err(span.wrap(Error::VoidOperand)),
        }
    }
}

struct Generator<'ident> {
    ctx: CodeGenContext,
    ident_interner: &'ident mut Interner,
    /// True only while lowering top-level script statements into the
    /// synthesized entry function, never inside a `def` body. A user-written
    /// `main` gets no special treatment.
    top_level: bool,
}

impl<'ident> Generator<'ident> {
    fn new(ident_interner: &'ident mut Interner) -> Generator<'ident> {
        let mut ctx = CodeGenContext::new();
        // UNWRAP: The default runtime is always registered.
        stdlib::install(stdlib::DEFAULT, &mut ctx, ident_interner).unwrap();
        Generator {
            ctx,
            ident_interner,
            top_level: false,
        }
    }

    fn finish(self) -> Module {
        self.ctx.module
    }

    fn lower_program(&mut self, stmts: &[Stmt]) -> Result<()> {
        // A program consisting solely of definitions, one of them `main`,
        // provides its own entry. Otherwise the top-level script becomes a
        // synthesized `main` (and a user `main` next to script code would
        // collide with it).
        let has_user_main = stmts.iter().any(|stmt| {
            matches!(&stmt.kind, StmtKind::Function { name, .. }
                if self.ident_interner.get(name.name) == "main")
        });
        let only_definitions = stmts
            .iter()
            .all(|stmt| matches!(stmt.kind, StmtKind::Function { .. }));
        if has_user_main && only_definitions {
            for stmt in stmts {
                self.lower_stmt(stmt)?;
            }
            return Ok(());
        }

        let main = self
            .ctx
            .module
            .add_function(Function::new("main", vec![], Ty::I64));
        let previous = self.ctx.enter_function(main);

        self.top_level = true;
        let result = self.lower_block(stmts);
        self.top_level = false;

        if result.is_ok() && self.ctx.func().terminator.is_none() {
            let zero = self.ctx.emit(InstrKind::ConstInt(0), Ty::I64);
            self.ctx.func_mut().terminator = Some(Terminator::Ret(Some(zero)));
        }

        // UNWRAP: Balanced with the `enter_function` above.
        self.ctx.exit_function(previous).unwrap();
        result
    }

    /// Lowers statements in order. Statements after a `return` are
    /// unreachable and dropped.
    fn lower_block(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            if self.ctx.func().terminator.is_some() {
                break;
            }
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Function {
                name,
                params,
                return_ty,
                body,
            } => self.lower_function(stmt, name.name, params, return_ty.as_ref(), body),
            StmtKind::Return(value) => self.lower_return(stmt, value.as_ref()),
            StmtKind::Assign {
                name,
                annotation,
                value,
            } => self.lower_assign(stmt, name.name, annotation.as_ref(), value),
            StmtKind::Expr(expr) => {
                let _ = self.lower_expr(expr)?;
                Ok(())
            }
        }
    }

    fn lower_function(
        &mut self,
        stmt: &Stmt,
        name: Symbol,
        params: &[crate::ast::Param],
        return_ty: Option<&crate::ast::TypeName>,
        body: &[Stmt],
    ) -> Result<()> {
        let name_str = self.ident_interner.get(name).to_owned();
        if self.ctx.module.get_function(&name_str).is_some() {
            return Err(stmt.span.wrap(Error::Redefinition(name)));
        }

        let param_tys = params
            .iter()
            .map(|param| self.resolve_annotation(&param.ty))
            .collect::<Result<Vec<_>>>()?;
        let ret = match return_ty {
            Some(ty) => self.resolve_annotation(ty)?,
            None => Ty::Void,
        };

        let id = self
            .ctx
            .module
            .add_function(Function::new(name_str, param_tys.clone(), ret));
        self.ctx.define_in_root(name, Slot::Func(id));

        let previous = self.ctx.enter_function(id);
        let was_top_level = std::mem::replace(&mut self.top_level, false);
        let result = self.lower_function_body(stmt, params, &param_tys, ret, body);
        self.top_level = was_top_level;
        // UNWRAP: Balanced with the `enter_function` above.
        self.ctx.exit_function(previous).unwrap();
        result
    }

    fn lower_function_body(
        &mut self,
        stmt: &Stmt,
        params: &[crate::ast::Param],
        param_tys: &[Ty],
        ret: Ty,
        body: &[Stmt],
    ) -> Result<()> {
        // Spill every parameter into a stack slot so that assignments to
        // parameter names behave like any other local.
        for (i, (param, &ty)) in params.iter().zip(param_tys).enumerate() {
            let incoming = self.ctx.func().param_value(i);
            let ptr = self.ctx.emit_alloca(ty);
            self.ctx.emit(
                InstrKind::Store {
                    value: incoming,
                    ptr,
                },
                Ty::Void,
            );
            self.ctx.define(param.name.name, Slot::Local { ptr, ty });
        }

        self.lower_block(body)?;

        if self.ctx.func().terminator.is_none() {
            let terminator = match ret {
                Ty::Void => Terminator::Ret(None),
                Ty::I64 => {
                    let zero = self.ctx.emit(InstrKind::ConstInt(0), Ty::I64);
                    Terminator::Ret(Some(zero))
                }
                Ty::F32 => {
                    let zero = self.ctx.emit(InstrKind::ConstFloat(0.0), Ty::F32);
                    Terminator::Ret(Some(zero))
                }
                Ty::I1 => {
                    let fals = self.ctx.emit(InstrKind::ConstBool(false), Ty::I1);
                    Terminator::Ret(Some(fals))
                }
                // There is no sensible default for a string.
                Ty::Ptr => {
                    let name = self.intern_func_name();
                    return Err(stmt.span.wrap(Error::MissingReturn(name)));
                }
            };
            self.ctx.func_mut().terminator = Some(terminator);
        }
        Ok(())
    }

    fn lower_return(&mut self, stmt: &Stmt, value: Option<&Expr>) -> Result<()> {
        let expected = self.ctx.func().ret;
        let lowered = match value {
            Some(expr) => self.lower_expr(expr)?,
            None => Lowered::Void,
        };

        let terminator = match (lowered, expected) {
            (Lowered::Void, Ty::Void) => Terminator::Ret(None),
            // A bare `return` at the top level exits with status zero.
            (Lowered::Void, Ty::I64) if self.at_top_level() => {
                let zero = self.ctx.emit(InstrKind::ConstInt(0), Ty::I64);
                Terminator::Ret(Some(zero))
            }
            (Lowered::Void, _) => {
                return Err(stmt.span.wrap(Error::ReturnType {
                    expected,
                    found: Ty::Void,
                }));
            }
            (Lowered::Value { id, ty }, _) => {
                let id = if expected == Ty::F32 && ty == Ty::I64 {
                    self.ctx.emit(InstrKind::SiToFp(id), Ty::F32)
                } else if ty != expected {
                    return Err(stmt.span.wrap(Error::ReturnType {
                        expected,
                        found: ty,
                    }));
                } else {
                    id
                };
                Terminator::Ret(Some(id))
            }
        };
        self.ctx.func_mut().terminator = Some(terminator);
        Ok(())
    }

    fn lower_assign(
        &mut self,
        stmt: &Stmt,
        name: Symbol,
        annotation: Option<&crate::ast::TypeName>,
        value: &Expr,
    ) -> Result<()> {
        let (id, ty) = self.lower_expr(value)?.expect_value(value.span)?;
        if ty == Ty::Void {
            return Err(stmt.span.wrap(Error::VoidAssignment));
        }

        let slot_ty = match annotation {
            Some(annotation) => self.resolve_annotation(annotation)?,
            None => ty,
        };

        // Reuse an existing slot when the types line up; otherwise a fresh
        // slot shadows the old binding.
        let ptr = match self.ctx.lookup(name) {
            Some(Slot::Local { ptr, ty: existing })
                if existing == slot_ty && storable(slot_ty, ty) =>
            {
                ptr
            }
            _ => {
                if !storable(slot_ty, ty) {
                    return Err(stmt.span.wrap(Error::StoreType {
                        slot: slot_ty,
                        found: ty,
                    }));
                }
                let ptr = self.ctx.emit_alloca(slot_ty);
                self.ctx.define(name, Slot::Local { ptr, ty: slot_ty });
                ptr
            }
        };

        let id = if slot_ty == Ty::F32 && ty == Ty::I64 {
            self.ctx.emit(InstrKind::SiToFp(id), Ty::F32)
        } else {
            id
        };
        self.ctx.emit(InstrKind::Store { value: id, ptr }, Ty::Void);
        Ok(())
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<Lowered> {
        use ExprKind::*;
        let lowered = match &expr.kind {
            Int(i) => {
                let id = self.ctx.emit(InstrKind::ConstInt(i64::from(*i)), Ty::I64);
                Lowered::Value { id, ty: Ty::I64 }
            }
            Float(x) => {
                let id = self.ctx.emit(InstrKind::ConstFloat(*x), Ty::F32);
                Lowered::Value { id, ty: Ty::F32 }
            }
            Bool(b) => {
                let id = self.ctx.emit(InstrKind::ConstBool(*b), Ty::I1);
                Lowered::Value { id, ty: Ty::I1 }
            }
            Str(s) => {
                let mut data = s.as_bytes().to_vec();
                data.push(0);
                let global = self.ctx.module.add_global(data);
                let id = self.ctx.emit(InstrKind::GlobalAddr(global), Ty::Ptr);
                Lowered::Value { id, ty: Ty::Ptr }
            }
            None => Lowered::Void,
            Dummy => return Err(expr.span.wrap(Error::VoidOperand)),
            Group(inner) => self.lower_expr(inner)?,
            Variable(ident) => match self.ctx.lookup(ident.name) {
                Some(Slot::Local { ptr, ty }) => {
                    let id = self.ctx.emit(InstrKind::Load { ty, ptr }, ty);
                    Lowered::Value { id, ty }
                }
                Some(Slot::Func(_)) => {
                    return Err(expr.span.wrap(Error::NotAValue(ident.name)));
                }
                Option::None => {
                    return Err(expr.span.wrap(Error::UndefinedVariable(ident.name)));
                }
            },
            Unary { op, expr: operand } => self.lower_unary(expr.span, *op, operand)?,
            Binary { op, lhs, rhs } => self.lower_binary(expr.span, *op, lhs, rhs)?,
            Logical { op, .. } => {
                return Err(expr.span.wrap(Error::UnsupportedLogical(*op)));
            }
            Call { callee, args } => self.lower_call(expr.span, callee, args)?,
        };
        Ok(lowered)
    }

    fn lower_unary(&mut self, span: Span, op: UnaryOperator, operand: &Expr) -> Result<Lowered> {
        let (id, ty) = self.lower_expr(operand)?.expect_value(operand.span)?;
        let (id, ty) = match op {
            // Negation is carried out in float arithmetic; integer operands
            // are converted first.
            UnaryOperator::Neg => {
                let id = if ty == Ty::I64 {
                    self.ctx.emit(InstrKind::SiToFp(id), Ty::F32)
                } else if ty == Ty::F32 {
                    id
                } else {
                    return Err(span.wrap(Error::InvalidUnaryOperand { op, found: ty }));
                };
                (self.ctx.emit(InstrKind::FNeg(id), Ty::F32), Ty::F32)
            }
            UnaryOperator::Pos => {
                if !matches!(ty, Ty::I64 | Ty::F32) {
                    return Err(span.wrap(Error::InvalidUnaryOperand { op, found: ty }));
                }
                (id, ty)
            }
            UnaryOperator::Not => {
                if ty != Ty::I1 {
                    return Err(span.wrap(Error::InvalidUnaryOperand { op, found: ty }));
                }
                (self.ctx.emit(InstrKind::Not(id), Ty::I1), Ty::I1)
            }
        };
        Ok(Lowered::Value { id, ty })
    }

    fn lower_binary(
        &mut self,
        span: Span,
        op: BinaryOperator,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<Lowered> {
        use BinaryOperator::*;
        if op.is_comparison() || op == Pow {
            return Err(span.wrap(Error::UnsupportedBinary(op)));
        }
        if op == Div && divisor_is_zero(rhs) {
            return Err(rhs.span.wrap(Error::DivisionByZero));
        }

        let (lhs_id, lhs_ty) = self.lower_expr(lhs)?.expect_value(lhs.span)?;
        let (rhs_id, rhs_ty) = self.lower_expr(rhs)?.expect_value(rhs.span)?;

        // Numeric promotion: one converted operand makes both floats.
        let (lhs_id, rhs_id, ty) = match (lhs_ty, rhs_ty) {
            (Ty::I64, Ty::I64) => (lhs_id, rhs_id, Ty::I64),
            (Ty::F32, Ty::F32) => (lhs_id, rhs_id, Ty::F32),
            (Ty::I64, Ty::F32) => {
                let lhs_id = self.ctx.emit(InstrKind::SiToFp(lhs_id), Ty::F32);
                (lhs_id, rhs_id, Ty::F32)
            }
            (Ty::F32, Ty::I64) => {
                let rhs_id = self.ctx.emit(InstrKind::SiToFp(rhs_id), Ty::F32);
                (lhs_id, rhs_id, Ty::F32)
            }
            _ => {
                return Err(span.wrap(Error::InvalidBinaryOperands {
                    op,
                    lhs: lhs_ty,
                    rhs: rhs_ty,
                }));
            }
        };

        let bin_op = match (op, ty) {
            (Add, Ty::I64) => BinOp::Add,
            (Sub, Ty::I64) => BinOp::Sub,
            (Mul, Ty::I64) => BinOp::Mul,
            (Div, Ty::I64) => BinOp::SDiv,
            (Add, Ty::F32) => BinOp::FAdd,
            (Sub, Ty::F32) => BinOp::FSub,
            (Mul, Ty::F32) => BinOp::FMul,
            (Div, Ty::F32) => BinOp::FDiv,
            // Comparisons and `**` were rejected above.
            _ => unreachable!(),
        };
        let id = self.ctx.emit(
            InstrKind::Bin {
                op: bin_op,
                lhs: lhs_id,
                rhs: rhs_id,
            },
            ty,
        );
        Ok(Lowered::Value { id, ty })
    }

    fn lower_call(&mut self, span: Span, callee: &crate::ast::Ident, args: &[Expr]) -> Result<Lowered> {
        let func = match self.ctx.lookup(callee.name) {
            Some(Slot::Func(id)) => id,
            Some(Slot::Local { .. }) => {
                return Err(callee.span.wrap(Error::NotCallable(callee.name)));
            }
            None => {
                return Err(callee.span.wrap(Error::UnknownFunction(callee.name)));
            }
        };

        let (param_tys, variadic, ret) = {
            let f = self.ctx.module.function(func);
            (f.params.clone(), f.variadic, f.ret)
        };
        let arity_ok = if variadic {
            param_tys.len() <= args.len()
        } else {
            param_tys.len() == args.len()
        };
        if !arity_ok {
            return Err(span.wrap(Error::WrongArity {
                name: callee.name,
                expected: param_tys.len(),
                found: args.len(),
            }));
        }

        let mut arg_ids = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let (id, ty) = self.lower_expr(arg)?.expect_value(arg.span)?;
            let id = match param_tys.get(i) {
                Some(&expected) if expected == Ty::F32 && ty == Ty::I64 => {
                    self.ctx.emit(InstrKind::SiToFp(id), Ty::F32)
                }
                Some(&expected) if expected != ty => {
                    return Err(arg.span.wrap(Error::ArgumentType {
                        expected,
                        found: ty,
                    }));
                }
                _ => id,
            };
            arg_ids.push(id);
        }

        let id = self.ctx.emit(
            InstrKind::Call {
                func,
                args: arg_ids,
            },
            ret,
        );
        if ret == Ty::Void {
            Ok(Lowered::Void)
        } else {
            Ok(Lowered::Value { id, ty: ret })
        }
    }

    fn resolve_annotation(&self, annotation: &crate::ast::TypeName) -> Result<Ty> {
        let ty = match self.ident_interner.get(annotation.name) {
            "int" => Ty::I64,
            "float" => Ty::F32,
            "str" | "string" => Ty::Ptr,
            "bool" => Ty::I1,
            "None" => Ty::Void,
            _ => {
                return Err(annotation.span.wrap(Error::UnknownTypeName(annotation.name)));
            }
        };
        Ok(ty)
    }

    fn at_top_level(&self) -> bool {
        self.top_level
    }

    fn intern_func_name(&mut self) -> Symbol {
        let name = self.ctx.func().name.clone();
        self.ident_interner.intern(&name)
    }
}

/// Whether a value of type `found` may be stored into a slot of `slot` type
/// (possibly through an int-to-float conversion).
fn storable(slot: Ty, found: Ty) -> bool {
    slot == found || (slot == Ty::F32 && found == Ty::I64)
}

/// A divisor which is a literal zero (through any grouping), including
/// floats within the runtime's near-zero guard.
fn divisor_is_zero(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Int(n) => Value::Int(*n).is_zero_divisor(),
        ExprKind::Float(x) => Value::Float(*x).is_zero_divisor(),
        ExprKind::Group(inner) => divisor_is_zero(inner),
        _ => false,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    UndefinedVariable(Symbol),
    /// A function name used where a value is expected.
    NotAValue(Symbol),
    /// A local used as a callee.
    NotCallable(Symbol),
    UnknownFunction(Symbol),
    UnknownTypeName(Symbol),
    Redefinition(Symbol),
    WrongArity {
        name: Symbol,
        expected: usize,
        found: usize,
    },
    ArgumentType {
        expected: Ty,
        found: Ty,
    },
    VoidOperand,
    VoidAssignment,
    StoreType {
        slot: Ty,
        found: Ty,
    },
    ReturnType {
        expected: Ty,
        found: Ty,
    },
    MissingReturn(Symbol),
    DivisionByZero,
    InvalidUnaryOperand {
        op: UnaryOperator,
        found: Ty,
    },
    InvalidBinaryOperands {
        op: BinaryOperator,
        lhs: Ty,
        rhs: Ty,
    },
    UnsupportedBinary(BinaryOperator),
    UnsupportedLogical(LogicalOperator),
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{parser, type_checker};

    fn lower(src: &str) -> Module {
        let mut interner = Interner::with_capacity(32);
        let mut tokens = Vec::new();
        let stmts = parser::parse_program(src, &mut tokens, &mut interner).unwrap();
        type_checker::check(&stmts, &mut interner).unwrap();
        let module = compile(&stmts, &mut interner).unwrap();
        assert_eq!(module.verify(), Ok(()));
        module
    }

    fn lower_err(src: &str) -> Spanned<Error> {
        let mut interner = Interner::with_capacity(32);
        let mut tokens = Vec::new();
        let stmts = parser::parse_program(src, &mut tokens, &mut interner).unwrap();
        compile(&stmts, &mut interner).unwrap_err()
    }

    fn main_body(module: &Module) -> &[crate::ir::Instr] {
        let id = module.get_function("main").unwrap();
        &module.function(id).body
    }

    #[test]
    fn top_level_code_becomes_main_with_exit_zero() {
        let module = lower("x = 1\n");
        assert_eq!(
            module.to_string(),
            indoc! {r#"
                @.str.0 = constant c"%s\0A\00"
                declare i64 @printf(ptr, ...)

                define void @print(ptr %0) {
                  %1 = global_addr @.str.0
                  %2 = call i64 @printf(%1, %0)
                  ret
                }

                define i64 @main() {
                  %1 = alloca i64
                  %0 = const_int 1
                  store %0, %1
                  %3 = const_int 0
                  ret %3
                }
            "#}
        );
    }

    #[test]
    fn reassignment_reuses_the_slot() {
        let module = lower("x = 1\nx = 2\n");
        let body = main_body(&module);
        let allocas = body
            .iter()
            .filter(|i| matches!(i.kind, InstrKind::Alloca(_)))
            .count();
        let stores = body
            .iter()
            .filter(|i| matches!(i.kind, InstrKind::Store { .. }))
            .count();
        assert_eq!((allocas, stores), (1, 2));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        let module = lower("x = 1 + 2.5\n");
        let body = main_body(&module);
        assert!(body.iter().any(|i| matches!(i.kind, InstrKind::SiToFp(_))));
        assert!(body
            .iter()
            .any(|i| matches!(i.kind, InstrKind::Bin { op: BinOp::FAdd, .. })));
    }

    #[test]
    fn division_by_a_constant_zero_is_rejected() {
        let error = lower_err("x = 1 / 0\n");
        assert_eq!(error.inner, Error::DivisionByZero);
        assert_eq!(error.span, Span::new_of_bounds(8..9));

        let error = lower_err("x = 1.0 / (0.000000001)\n");
        assert_eq!(error.inner, Error::DivisionByZero);
    }

    #[test]
    fn string_literals_become_interned_globals() {
        let module = lower("print('hi')\nprint('hi')\n");
        // One for the runtime's format string, one for the literal.
        assert_eq!(module.globals.len(), 2);
        assert_eq!(module.globals[1].data, b"hi\0");
    }

    #[test]
    fn functions_spill_parameters_once() {
        let module = lower("def add(a: int, b: int) -> int:\n    return a + b\n");
        let id = module.get_function("add").unwrap();
        let add = module.function(id);
        assert_eq!(
            format!("define {} @{}(...)", add.ret, add.name),
            "define i64 @add(...)"
        );
        let rendered = module.to_string();
        assert!(rendered.contains(indoc! {"
            define i64 @add(i64 %0, i64 %1) {
              %2 = alloca i64
              %4 = alloca i64
              store %0, %2
              store %1, %4
              %6 = load i64, %2
              %7 = load i64, %4
              %8 = add %6, %7
              ret %8
            }
        "}));
    }

    #[test]
    fn missing_returns_are_synthesized() {
        let module = lower("def f() -> int:\n    1\n");
        let id = module.get_function("f").unwrap();
        let f = module.function(id);
        assert!(matches!(f.terminator, Some(Terminator::Ret(Some(_)))));
    }

    #[test]
    fn a_string_function_must_return() {
        let error = lower_err("def f() -> str:\n    1\n");
        assert!(matches!(error.inner, Error::MissingReturn(_)));
    }

    #[test]
    fn negation_goes_through_float_arithmetic() {
        let module = lower("x = -(2)\n");
        let body = main_body(&module);
        assert!(body.iter().any(|i| matches!(i.kind, InstrKind::SiToFp(_))));
        assert!(body.iter().any(|i| matches!(i.kind, InstrKind::FNeg(_))));
    }

    #[test]
    fn comparisons_and_power_do_not_lower() {
        let error = lower_err("x = 2 ** 3\n");
        assert_eq!(error.inner, Error::UnsupportedBinary(BinaryOperator::Pow));

        let error = lower_err("x = True and False\n");
        assert_eq!(
            error.inner,
            Error::UnsupportedLogical(LogicalOperator::And)
        );
    }

    #[test]
    fn a_program_of_definitions_provides_its_own_main() {
        let module = lower("def main() -> int:\n    return 4\n");
        let id = module.get_function("main").unwrap();
        assert_eq!(module.function(id).ret, Ty::I64);
        assert_eq!(
            module
                .functions
                .iter()
                .filter(|f| f.name == "main")
                .count(),
            1
        );
    }

    #[test]
    fn a_user_main_next_to_script_code_is_a_redefinition() {
        let error = lower_err("def main() -> int:\n    return 4\nx = 1\n");
        assert!(matches!(error.inner, Error::Redefinition(_)));
    }

    #[test]
    fn a_bare_return_in_a_user_main_is_not_an_exit() {
        // Only the synthesized script entry turns `return` into `ret 0`; a
        // user-written `main` is held to its annotation like any function.
        let error = lower_err("def main() -> int:\n    return\n");
        assert_eq!(
            error.inner,
            Error::ReturnType {
                expected: Ty::I64,
                found: Ty::Void,
            }
        );
    }

    #[test]
    fn top_level_return_sets_the_exit_code() {
        let module = lower("return 5\nx = 1\n");
        let body = main_body(&module);
        // The statement after the return is unreachable and dropped.
        assert_eq!(body.len(), 1);
        assert!(matches!(body[0].kind, InstrKind::ConstInt(5)));
    }
}
