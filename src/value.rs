use std::fmt;

/// The constant value carried through checking and lowering: a tagged union
/// with value-semantics arithmetic folds.
///
/// Operations are only defined for matching or numerically-promotable
/// operand pairs; a mixed int/float pair promotes to float. Division by
/// zero (or by a near-zero float) is a [`ValueError::Domain`], never a silent
/// infinity or NaN.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Str(Box<str>),
    Bool(bool),
    None,
}

/// Float divisors closer to zero than this are treated as zero.
pub const FLOAT_DIV_EPSILON: f32 = 1e-7;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueError {
    /// Division by zero or by a near-zero float.
    Domain,
    /// The operation is not defined for these operand tags.
    InvalidOperands {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    /// The unary operation is not defined for this operand tag.
    InvalidOperand { op: &'static str, operand: &'static str },
}

impl Value {
    pub fn tag(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::None => "None",
        }
    }

    pub fn add(self, rhs: Value) -> Result<Value, ValueError> {
        use Value::*;
        match (self, rhs) {
            (Int(a), Int(b)) => Ok(Int(a.wrapping_add(b))),
            (Float(a), Float(b)) => Ok(Float(a + b)),
            (Int(a), Float(b)) => Ok(Float(a as f32 + b)),
            (Float(a), Int(b)) => Ok(Float(a + b as f32)),
            (Str(a), Str(b)) => Ok(Str(format!("{a}{b}").into_boxed_str())),
            (lhs, rhs) => Err(invalid("+", &lhs, &rhs)),
        }
    }

    pub fn sub(self, rhs: Value) -> Result<Value, ValueError> {
        use Value::*;
        match (self, rhs) {
            (Int(a), Int(b)) => Ok(Int(a.wrapping_sub(b))),
            (Float(a), Float(b)) => Ok(Float(a - b)),
            (Int(a), Float(b)) => Ok(Float(a as f32 - b)),
            (Float(a), Int(b)) => Ok(Float(a - b as f32)),
            (lhs, rhs) => Err(invalid("-", &lhs, &rhs)),
        }
    }

    pub fn mul(self, rhs: Value) -> Result<Value, ValueError> {
        use Value::*;
        match (self, rhs) {
            (Int(a), Int(b)) => Ok(Int(a.wrapping_mul(b))),
            (Float(a), Float(b)) => Ok(Float(a * b)),
            (Int(a), Float(b)) => Ok(Float(a as f32 * b)),
            (Float(a), Int(b)) => Ok(Float(a * b as f32)),
            // String repetition: 'ab' * 3
            (Str(a), Int(n)) => {
                let n = usize::try_from(n).unwrap_or(0);
                Ok(Str(a.repeat(n).into_boxed_str()))
            }
            (lhs, rhs) => Err(invalid("*", &lhs, &rhs)),
        }
    }

    pub fn div(self, rhs: Value) -> Result<Value, ValueError> {
        use Value::*;
        if rhs.is_zero_divisor() {
            return Err(ValueError::Domain);
        }
        match (self, rhs) {
            (Int(a), Int(b)) => Ok(Int(a.wrapping_div(b))),
            (Float(a), Float(b)) => Ok(Float(a / b)),
            (Int(a), Float(b)) => Ok(Float(a as f32 / b)),
            (Float(a), Int(b)) => Ok(Float(a / b as f32)),
            (lhs, rhs) => Err(invalid("/", &lhs, &rhs)),
        }
    }

    pub fn neg(self) -> Result<Value, ValueError> {
        match self {
            Value::Int(a) => Ok(Value::Int(a.wrapping_neg())),
            Value::Float(a) => Ok(Value::Float(-a)),
            operand => Err(ValueError::InvalidOperand {
                op: "-",
                operand: operand.tag(),
            }),
        }
    }

    pub fn not(self) -> Result<Value, ValueError> {
        match self {
            Value::Bool(a) => Ok(Value::Bool(!a)),
            operand => Err(ValueError::InvalidOperand {
                op: "not",
                operand: operand.tag(),
            }),
        }
    }

    /// Whether this value, used as a divisor, divides by zero.
    pub fn is_zero_divisor(&self) -> bool {
        match self {
            Value::Int(n) => *n == 0,
            Value::Float(x) => x.abs() < FLOAT_DIV_EPSILON,
            _ => false,
        }
    }
}

fn invalid(op: &'static str, lhs: &Value, rhs: &Value) -> ValueError {
    ValueError::InvalidOperands {
        op,
        lhs: lhs.tag(),
        rhs: rhs.tag(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::None => f.write_str("None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_promotion() {
        assert_eq!(Value::Int(1).add(Value::Int(2)), Ok(Value::Int(3)));
        assert_eq!(Value::Int(1).add(Value::Float(0.5)), Ok(Value::Float(1.5)));
        assert_eq!(Value::Float(1.0).mul(Value::Int(4)), Ok(Value::Float(4.0)));
        assert_eq!(Value::Int(7).div(Value::Int(2)), Ok(Value::Int(3)));
    }

    #[test]
    fn string_concat_and_repeat() {
        let concat = Value::Str("ab".into()).add(Value::Str("cd".into()));
        assert_eq!(concat, Ok(Value::Str("abcd".into())));
        let repeat = Value::Str("ab".into()).mul(Value::Int(3));
        assert_eq!(repeat, Ok(Value::Str("ababab".into())));
    }

    #[test]
    fn division_by_zero_is_a_domain_error() {
        assert_eq!(Value::Int(1).div(Value::Int(0)), Err(ValueError::Domain));
        assert_eq!(
            Value::Float(1.0).div(Value::Float(0.0)),
            Err(ValueError::Domain)
        );
        // Near-zero float divisors count as zero.
        assert_eq!(
            Value::Float(1.0).div(Value::Float(1e-9)),
            Err(ValueError::Domain)
        );
        assert_eq!(
            Value::Float(1.0).div(Value::Float(0.5)),
            Ok(Value::Float(2.0))
        );
    }

    #[test]
    fn invalid_operand_pairs() {
        let err = Value::Str("a".into()).add(Value::Int(1));
        assert_eq!(
            err,
            Err(ValueError::InvalidOperands {
                op: "+",
                lhs: "str",
                rhs: "int",
            })
        );
        assert_eq!(
            Value::Int(1).not(),
            Err(ValueError::InvalidOperand {
                op: "not",
                operand: "int",
            })
        );
        assert_eq!(Value::Bool(true).not(), Ok(Value::Bool(false)));
        assert_eq!(Value::Float(2.0).neg(), Ok(Value::Float(-2.0)));
    }
}
