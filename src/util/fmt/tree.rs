use std::io::Write;

use crate::{
    ast::{Expr, ExprKind, Stmt, StmtKind},
    util::intern::Interner,
};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(idents: &Interner, program: &[Stmt]) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, idents, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string(idents: &Interner, expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, idents, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(
    w: &mut impl Write,
    idents: &Interner,
    program: &[Stmt],
) -> std::io::Result<()> {
    for stmt in program {
        print_stmt(w, idents, 0, stmt)?;
    }
    Ok(())
}

fn print_stmt(w: &mut impl Write, idents: &Interner, i: usize, stmt: &Stmt) -> std::io::Result<()> {
    let span = stmt.span;
    match &stmt.kind {
        StmtKind::Function {
            name,
            params,
            return_ty,
            body,
        } => {
            sp(w, i)?;
            write!(w, "function {}(", idents.get(name.name))?;
            for (idx, param) in params.iter().enumerate() {
                if idx > 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{}: {}", idents.get(param.name.name), idents.get(param.ty.name))?;
            }
            write!(w, ")")?;
            if let Some(ty) = return_ty {
                write!(w, " -> {}", idents.get(ty.name))?;
            }
            writeln!(w, " ({span})")?;
            for stmt in body {
                print_stmt(w, idents, i + 1, stmt)?;
            }
        }
        StmtKind::Return(value) => {
            sp(w, i)?;
            writeln!(w, "return ({span})")?;
            if let Some(value) = value {
                print_expr(w, idents, i + 1, value)?;
            }
        }
        StmtKind::Assign {
            name,
            annotation,
            value,
        } => {
            sp(w, i)?;
            write!(w, "assign {}", idents.get(name.name))?;
            if let Some(ty) = annotation {
                write!(w, ": {}", idents.get(ty.name))?;
            }
            writeln!(w, " ({span})")?;
            print_expr(w, idents, i + 1, value)?;
        }
        // A bare expression statement prints as the expression itself.
        StmtKind::Expr(expr) => print_expr(w, idents, i, expr)?,
    }
    Ok(())
}

pub fn print_expr(w: &mut impl Write, idents: &Interner, i: usize, expr: &Expr) -> std::io::Result<()> {
    sp(w, i)?;
    let span = expr.span;
    match &expr.kind {
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span})")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
        ExprKind::Logical { op, lhs, rhs } => {
            writeln!(w, "logical {op:?} ({span})")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
        ExprKind::Unary { op, expr: inner } => {
            writeln!(w, "unary {op:?} ({span})")?;
            print_expr(w, idents, i + 1, inner)?;
        }
        ExprKind::Call { callee, args } => {
            writeln!(w, "call {} ({span})", idents.get(callee.name))?;
            for arg in args {
                print_expr(w, idents, i + 1, arg)?;
            }
        }
        ExprKind::Group(inner) => {
            writeln!(w, "group ({span})")?;
            print_expr(w, idents, i + 1, inner)?;
        }
        ExprKind::Variable(ident) => {
            writeln!(w, "variable {} ({span})", idents.get(ident.name))?;
        }
        ExprKind::Int(val) => writeln!(w, "int {val} ({span})")?,
        ExprKind::Float(val) => writeln!(w, "float {val} ({span})")?,
        ExprKind::Str(val) => writeln!(w, "string {val:?} ({span})")?,
        ExprKind::Bool(val) => writeln!(w, "bool {val} ({span})")?,
        ExprKind::None => writeln!(w, "none ({span})")?,
        ExprKind::Dummy => writeln!(w, "dummy ({span})")?,
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
