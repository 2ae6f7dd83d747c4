use crate::{
    codegen, parser,
    token::{Spanned, TokenKind},
    type_checker,
    util::fmt::Show,
};

impl Show for Spanned<parser::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, _: &super::Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use parser::Error::*;
        match error {
            UnexpectedTokenInExpr { token } => {
                write!(f, "unexpected token {token:?} in expression")
            }
            Unexpected { actual, expected } => {
                write!(f, "expected token {expected:?}, but got {actual:?}")
            }
            UnexpectedAny { actual, expected } => {
                write!(f, "expected one of {expected:?}, but got {actual:?}")
            }
            UnexpectedOperator { actual } => write!(f, "unexpected operator {actual:?}"),
            ExpectedStatementEnd { actual } => {
                write!(f, "expected end of statement, but got {actual:?}")
            }
            InvalidCallee => write!(f, "only a bare identifier can be called"),
            EmptyBlock => write!(f, "empty block"),
            IntLiteral(crate::lexer::extract::LitError::Malformed) => {
                write!(f, "malformed integer literal")
            }
            IntLiteral(crate::lexer::extract::LitError::OutOfRange) => {
                write!(f, "integer literal out of range")
            }
            FloatLiteral(crate::lexer::extract::LitError::Malformed) => {
                write!(f, "malformed float literal")
            }
            FloatLiteral(crate::lexer::extract::LitError::OutOfRange) => {
                write!(f, "float literal out of range")
            }
            Lexer(TokenKind::ErrorUnexpectedChar) => write!(f, "unexpected character"),
            Lexer(TokenKind::ErrorUnterminatedString) => write!(f, "unterminated string"),
            Lexer(TokenKind::ErrorIndent) => write!(f, "inconsistent indentation"),
            Lexer(TokenKind::ErrorMalformedNumber) => write!(f, "malformed number"),
            Lexer(_) => unreachable!("not error token"),
        }
    }
}

impl Show for Spanned<type_checker::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &super::Context<'_>) -> std::fmt::Result {
        let i = ctx.ident_interner;
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use type_checker::Error::*;
        match error {
            UndeclaredVariable(name) => {
                write!(f, "undeclared variable `{}`", i.get(*name))
            }
            UnknownFunction(name) => write!(f, "unknown function `{}`", i.get(*name)),
            UnknownTypeName(name) => write!(f, "unknown type name `{}`", i.get(*name)),
            AnnotationMismatch {
                annotation,
                inferred,
            } => {
                write!(
                    f,
                    "annotated type `{annotation}` does not match inferred type `{inferred}`"
                )
            }
            ReturnType { expected, found } => {
                write!(
                    f,
                    "return type `{expected}` does not match returned value of type `{found}`"
                )
            }
            WrongArity {
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "function `{}` expects {expected} argument(s), but got {found}",
                    i.get(*name)
                )
            }
            ArgumentType { expected, found } => {
                write!(f, "argument of type `{found}` where `{expected}` is expected")
            }
            InvalidBinary { op, lhs, rhs } => {
                write!(
                    f,
                    "invalid operands of types `{lhs}` and `{rhs}` for binary operator {op:?}"
                )
            }
            InvalidUnary { op, operand } => {
                write!(f, "invalid operand of type `{operand}` for unary operator {op:?}")
            }
            InvalidLogical { op, lhs, rhs } => {
                write!(
                    f,
                    "invalid operands of types `{lhs}` and `{rhs}` for logical operator {op:?}"
                )
            }
        }
    }
}

impl Show for Spanned<codegen::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &super::Context<'_>) -> std::fmt::Result {
        let i = ctx.ident_interner;
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }

        use codegen::Error::*;
        match error {
            UndefinedVariable(name) => write!(f, "undefined variable `{}`", i.get(*name)),
            NotAValue(name) => write!(f, "`{}` is a function, not a value", i.get(*name)),
            NotCallable(name) => write!(f, "`{}` is not callable", i.get(*name)),
            UnknownFunction(name) => write!(f, "unknown function `{}`", i.get(*name)),
            UnknownTypeName(name) => write!(f, "unknown type name `{}`", i.get(*name)),
            Redefinition(name) => write!(f, "function `{}` is already defined", i.get(*name)),
            WrongArity {
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "function `{}` expects {expected} argument(s), but got {found}",
                    i.get(*name)
                )
            }
            ArgumentType { expected, found } => {
                write!(f, "argument of type `{found}` where `{expected}` is expected")
            }
            VoidOperand => write!(f, "expression produces no value"),
            VoidAssignment => write!(f, "cannot assign a value-less expression"),
            StoreType { slot, found } => {
                write!(f, "cannot store a `{found}` into a `{slot}` slot")
            }
            ReturnType { expected, found } => {
                write!(f, "returns `{found}`, but the function is declared `{expected}`")
            }
            MissingReturn(name) => {
                write!(f, "function `{}` is missing a return", i.get(*name))
            }
            DivisionByZero => write!(f, "division by zero"),
            InvalidUnaryOperand { op, found } => {
                write!(f, "invalid operand of type `{found}` for unary operator {op:?}")
            }
            InvalidBinaryOperands { op, lhs, rhs } => {
                write!(
                    f,
                    "invalid operands of types `{lhs}` and `{rhs}` for binary operator {op:?}"
                )
            }
            UnsupportedBinary(op) => {
                write!(f, "operator {op:?} is not supported by the code generator")
            }
            UnsupportedLogical(op) => {
                write!(f, "operator {op:?} is not supported by the code generator")
            }
        }
    }
}
