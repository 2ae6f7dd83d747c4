use std::fmt;

/// The closed set of semantic types tracked by the type checker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Int,
    Float,
    Str,
    Bool,
    None,
    /// An undeclared name. Produced by scope lookup misses; never a valid
    /// inference result.
    Unknown,
}

impl TypeKind {
    /// Resolves a source-level type annotation name. `string` is accepted as
    /// an alias of `str`.
    pub fn of_annotation(name: &str) -> Option<TypeKind> {
        let kind = match name {
            "int" => TypeKind::Int,
            "float" => TypeKind::Float,
            "str" | "string" => TypeKind::Str,
            "bool" => TypeKind::Bool,
            "None" => TypeKind::None,
            _ => return None,
        };
        Some(kind)
    }

    /// Unifies the operand kinds of a binary arithmetic operation.
    ///
    /// Identical kinds unify to that kind; a mixed int/float pair promotes
    /// to float; anything else is undefined.
    pub fn unify(self, other: TypeKind) -> Option<TypeKind> {
        // No glob import here: a bare `None` must stay `Option::None`, not
        // `TypeKind::None`.
        use TypeKind::{Float, Int, Unknown};
        match (self, other) {
            (Unknown, _) | (_, Unknown) => None,
            (a, b) if a == b => Some(a),
            (Int, Float) | (Float, Int) => Some(Float),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, TypeKind::Int | TypeKind::Float)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::Str => "str",
            TypeKind::Bool => "bool",
            TypeKind::None => "None",
            TypeKind::Unknown => "<unknown>",
        };
        f.write_str(name)
    }
}
