use std::collections::HashMap;

use crate::{
    ast::{BinaryOperator, Expr, ExprKind, LogicalOperator, Stmt, StmtKind, UnaryOperator},
    env::TypeEnv,
    token::Spanned,
    types::TypeKind,
    util::intern::{Interner, Symbol},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Checks the given program, accumulating one error per failing top-level
/// statement.
pub fn check(stmts: &[Stmt], ident_interner: &mut Interner) -> Result<(), Vec<Spanned<Error>>> {
    let mut checker = Checker::new(ident_interner);
    let mut errors = Vec::new();
    for stmt in stmts {
        if let Err(error) = checker.check_stmt(stmt) {
            errors.push(error);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Signature {
    params: Vec<TypeKind>,
    ret: TypeKind,
}

pub struct Checker<'ident> {
    ident_interner: &'ident Interner,
    env: TypeEnv,
    signatures: HashMap<Symbol, Signature>,
    /// The declared return type of the function being checked, if any.
    current_return: Option<TypeKind>,
}

impl<'ident> Checker<'ident> {
    pub fn new(ident_interner: &'ident mut Interner) -> Checker<'ident> {
        let print = ident_interner.intern("print");
        let mut signatures = HashMap::new();
        signatures.insert(
            print,
            Signature {
                params: vec![TypeKind::Str],
                ret: TypeKind::None,
            },
        );
        Checker {
            ident_interner,
            env: TypeEnv::new(),
            signatures,
            current_return: None,
        }
    }

    pub fn check_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Function {
                name,
                params,
                return_ty,
                body,
            } => {
                let param_tys = params
                    .iter()
                    .map(|param| self.resolve_annotation(&param.ty))
                    .collect::<Result<Vec<_>>>()?;
                let ret = match return_ty {
                    Some(ty) => self.resolve_annotation(ty)?,
                    None => TypeKind::None,
                };

                // Registered before the body is checked so that recursive
                // calls resolve.
                self.signatures.insert(
                    name.name,
                    Signature {
                        params: param_tys.clone(),
                        ret,
                    },
                );

                self.env.push_scope();
                for (param, ty) in params.iter().zip(param_tys) {
                    self.env.set(param.name.name, ty);
                }
                let saved_return = self.current_return.replace(ret);

                let result = body.iter().try_for_each(|stmt| self.check_stmt(stmt));

                self.current_return = saved_return;
                let popped = self.env.pop_scope();
                debug_assert!(popped.is_ok());
                result
            }
            StmtKind::Return(value) => {
                let found = match value {
                    Some(expr) => self.check_expr(expr)?,
                    None => TypeKind::None,
                };
                if let Some(expected) = self.current_return {
                    if !annotation_accepts(expected, found) {
                        return Err(stmt.span.wrap(Error::ReturnType { expected, found }));
                    }
                }
                Ok(())
            }
            StmtKind::Assign {
                name,
                annotation,
                value,
            } => {
                let inferred = self.check_expr(value)?;
                let bound = match annotation {
                    Some(ty) => {
                        let annotated = self.resolve_annotation(ty)?;
                        if !annotation_accepts(annotated, inferred) {
                            return Err(stmt.span.wrap(Error::AnnotationMismatch {
                                annotation: annotated,
                                inferred,
                            }));
                        }
                        annotated
                    }
                    None => inferred,
                };
                self.env.set(name.name, bound);
                Ok(())
            }
            StmtKind::Expr(expr) => {
                self.check_expr(expr)?;
                Ok(())
            }
        }
    }

    pub fn check_expr(&mut self, expr: &Expr) -> Result<TypeKind> {
        use ExprKind::*;
        match &expr.kind {
            Int(_) => Ok(TypeKind::Int),
            Float(_) => Ok(TypeKind::Float),
            Str(_) => Ok(TypeKind::Str),
            Bool(_) => Ok(TypeKind::Bool),
            None => Ok(TypeKind::None),
            Dummy => Ok(TypeKind::Unknown),
            Group(inner) => self.check_expr(inner),
            Variable(ident) => {
                let ty = self.env.get(ident.name);
                if ty == TypeKind::Unknown {
                    return Err(expr.span.wrap(Error::UndeclaredVariable(ident.name)));
                }
                Ok(ty)
            }
            Unary { op, expr: operand } => {
                let ty = self.check_expr(operand)?;
                let ok = match op {
                    UnaryOperator::Neg | UnaryOperator::Pos => ty.is_numeric(),
                    UnaryOperator::Not => ty == TypeKind::Bool,
                };
                if !ok {
                    return Err(expr
                        .span
                        .wrap(Error::InvalidUnary { op: *op, operand: ty }));
                }
                Ok(ty)
            }
            Binary { op, lhs, rhs } => {
                let lt = self.check_expr(lhs)?;
                let rt = self.check_expr(rhs)?;
                Self::binary_result(*op, lt, rt).ok_or_else(|| {
                    expr.span.wrap(Error::InvalidBinary {
                        op: *op,
                        lhs: lt,
                        rhs: rt,
                    })
                })
            }
            Logical { op, lhs, rhs } => {
                let lt = self.check_expr(lhs)?;
                let rt = self.check_expr(rhs)?;
                if lt != TypeKind::Bool || rt != TypeKind::Bool {
                    return Err(expr.span.wrap(Error::InvalidLogical {
                        op: *op,
                        lhs: lt,
                        rhs: rt,
                    }));
                }
                Ok(TypeKind::Bool)
            }
            Call { callee, args } => {
                let Some(signature) = self.signatures.get(&callee.name).cloned() else {
                    return Err(callee.span.wrap(Error::UnknownFunction(callee.name)));
                };
                if args.len() != signature.params.len() {
                    return Err(expr.span.wrap(Error::WrongArity {
                        name: callee.name,
                        expected: signature.params.len(),
                        found: args.len(),
                    }));
                }
                for (arg, &expected) in args.iter().zip(&signature.params) {
                    let found = self.check_expr(arg)?;
                    if !annotation_accepts(expected, found) {
                        return Err(arg.span.wrap(Error::ArgumentType { expected, found }));
                    }
                }
                Ok(signature.ret)
            }
        }
    }

    /// Yields the resulting type of a well-typed binary operation, or `None`.
    fn binary_result(op: BinaryOperator, lhs: TypeKind, rhs: TypeKind) -> Option<TypeKind> {
        use BinaryOperator::{Add, Mul};
        use TypeKind::{Int, Str};
        if op.is_comparison() {
            let comparable = (lhs.is_numeric() && rhs.is_numeric()) || lhs == rhs;
            return comparable.then_some(TypeKind::Bool);
        }
        match (op, lhs, rhs) {
            // String concatenation and repetition.
            (Add, Str, Str) => Some(Str),
            (Mul, Str, Int) => Some(Str),
            // Mixed int/float operands promote to float.
            _ if lhs.is_numeric() && rhs.is_numeric() => lhs.unify(rhs),
            _ => None,
        }
    }

    fn resolve_annotation(&self, ty: &crate::ast::TypeName) -> Result<TypeKind> {
        let name = self.ident_interner.get(ty.name);
        TypeKind::of_annotation(name).ok_or_else(|| ty.span.wrap(Error::UnknownTypeName(ty.name)))
    }
}

/// Whether a value of type `found` may be bound where `annotated` is
/// declared. An `int` value may flow into a `float` slot (the lowering
/// inserts the conversion); everything else must match exactly.
fn annotation_accepts(annotated: TypeKind, found: TypeKind) -> bool {
    annotated == found || (annotated == TypeKind::Float && found == TypeKind::Int)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    UndeclaredVariable(Symbol),
    UnknownFunction(Symbol),
    UnknownTypeName(Symbol),
    AnnotationMismatch {
        annotation: TypeKind,
        inferred: TypeKind,
    },
    ReturnType {
        expected: TypeKind,
        found: TypeKind,
    },
    WrongArity {
        name: Symbol,
        expected: usize,
        found: usize,
    },
    ArgumentType {
        expected: TypeKind,
        found: TypeKind,
    },
    InvalidBinary {
        op: BinaryOperator,
        lhs: TypeKind,
        rhs: TypeKind,
    },
    InvalidUnary {
        op: UnaryOperator,
        operand: TypeKind,
    },
    InvalidLogical {
        op: LogicalOperator,
        lhs: TypeKind,
        rhs: TypeKind,
    },
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use checker;

        fn test_numeric_promotion_types() {
            let program = "x = 1 + 2.5\n";
            let expected_errors = &[];
        }

        fn test_undeclared_variable() {
            let program = "x = y + 1\n";
            let expected_errors = &["4..5: undeclared variable `y`"];
        }

        fn test_annotation_must_agree() {
            let program = "x: int = 1.5\n";
            let expected_errors =
                &["0..12: annotated type `int` does not match inferred type `float`"];
        }

        fn test_int_may_flow_into_float_slot() {
            let program = "x: float = 1\n";
            let expected_errors = &[];
        }

        fn test_unknown_annotation_name() {
            let program = "x: number = 1\n";
            let expected_errors = &["3..9: unknown type name `number`"];
        }

        fn test_scopes_do_not_leak() {
            let program = "def f() -> int:\n    y = 1\n    return y\nx = y\n";
            let expected_errors = &["43..44: undeclared variable `y`"];
        }

        fn test_return_type_is_checked() {
            let program = "def f() -> int:\n    return 'no'\n";
            let expected_errors =
                &["20..31: return type `int` does not match returned value of type `str`"];
        }

        fn test_call_arity() {
            let program = "def f(a: int) -> int:\n    return a\nf(1, 2)\n";
            let expected_errors = &["35..42: function `f` expects 1 argument(s), but got 2"];
        }

        fn test_not_requires_bool() {
            let program = "x = not 1\n";
            let expected_errors = &["4..9: invalid operand of type `int` for unary operator Not"];
        }

        fn test_string_repeat_types() {
            let program = "x = 'ab' * 3\n";
            let expected_errors = &[];
        }
    );
}
