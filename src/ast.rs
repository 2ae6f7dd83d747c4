// program ::= (NEWLINE | stmt)* EOF
// stmt ::= 'def' ID '(' [param (',' param)*] ')' ['->' type] ':' block
//        | 'return' [expr] end
//        | ID [':' type] '=' expr end
//        | expr end
// block ::= NEWLINE INDENT stmt+ DEDENT
// param ::= ID ':' type
// end ::= NEWLINE | DEDENT | EOF
//
// expr ::= or_test
// or_test ::= and_test ('or' and_test)*
// and_test ::= not_test ('and' not_test)*
// not_test ::= 'not' not_test | comparison
// comparison ::= arith (('==' | '!=' | '<' | '<=' | '>' | '>=') arith)*
// arith ::= term (('+' | '-') term)*
// term ::= factor (('*' | '/') factor)*
// factor ::= ('+' | '-') factor | power
// power ::= call ['**' factor]
// call ::= atom | ID '(' [expr (',' expr)*] ')'
// atom ::= 'True' | 'False' | 'None' | INT | FLOAT | STRING | ID
//        | '(' expr ')'
//
// Note that only a bare identifier may be called; calls on arbitrary
// expressions are rejected by the grammar on purpose.

use crate::{token::Span, util::intern::Symbol};

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum StmtKind {
    Function {
        name: Ident,
        params: Vec<Param>,
        /// Absent annotation means the function returns nothing.
        return_ty: Option<TypeName>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Assign {
        name: Ident,
        annotation: Option<TypeName>,
        value: Expr,
    },
    Expr(Expr),
}

#[derive(Debug, PartialEq)]
pub struct Param {
    pub name: Ident,
    /// Parameter annotations are required by the grammar.
    pub ty: TypeName,
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn dummy(span: Span) -> Expr {
        Expr {
            kind: ExprKind::Dummy,
            span,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `and`/`or`. Parsed and type-checked, but never lowered.
    Logical {
        op: LogicalOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },
    Group(Box<Expr>),
    Variable(Ident),
    Int(i32),
    Float(f32),
    Str(Box<str>),
    Bool(bool),
    None,
    /// Error placeholder produced while recovering from a parse error.
    Dummy,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl BinaryOperator {
    pub fn is_comparison(self) -> bool {
        use BinaryOperator::*;
        matches!(self, Eq | Neq | Lt | Leq | Gt | Geq)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Pos,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeName {
    pub name: Symbol,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: Symbol,
    pub span: Span,
}

impl From<Ident> for Symbol {
    fn from(value: Ident) -> Self {
        value.name
    }
}

impl From<&Ident> for Symbol {
    fn from(value: &Ident) -> Self {
        value.name
    }
}
