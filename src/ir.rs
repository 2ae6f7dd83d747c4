//! A small SSA-ish intermediate representation.
//!
//! Functions are straight-line: a single entry block of instructions closed
//! by a `ret` terminator. Parameters occupy the first value ids of a
//! function; every instruction defines exactly one value (void-producing
//! instructions, such as `store`, still carry an id so the numbering stays
//! dense).

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    I64,
    F32,
    I1,
    Ptr,
    Void,
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ty::I64 => "i64",
            Ty::F32 => "f32",
            Ty::I1 => "i1",
            Ty::Ptr => "ptr",
            Ty::Void => "void",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FuncId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlobalId(pub usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

#[derive(Debug, Default)]
pub struct Module {
    pub globals: Vec<Global>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new() -> Module {
        Module::default()
    }

    /// Interns a NUL-terminated byte constant, reusing an existing global
    /// with the same contents.
    pub fn add_global(&mut self, data: Vec<u8>) -> GlobalId {
        if let Some(i) = self.globals.iter().position(|g| g.data == data) {
            return GlobalId(i);
        }
        let id = GlobalId(self.globals.len());
        self.globals.push(Global {
            name: format!(".str.{}", id.0),
            data,
        });
        id
    }

    pub fn add_function(&mut self, function: Function) -> FuncId {
        let id = FuncId(self.functions.len());
        self.functions.push(function);
        id
    }

    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.functions
            .iter()
            .position(|f| f.name == name)
            .map(FuncId)
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.0]
    }
}

#[derive(Debug)]
pub struct Global {
    pub name: String,
    /// Raw bytes, including the trailing NUL.
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub variadic: bool,
    /// Empty for external declarations.
    pub body: Vec<Instr>,
    pub terminator: Option<Terminator>,
    /// The type of every value, indexed by [`ValueId`]. The first
    /// `params.len()` entries are the parameters.
    pub value_tys: Vec<Ty>,
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<Ty>, ret: Ty) -> Function {
        let value_tys = params.clone();
        Function {
            name: name.into(),
            params,
            ret,
            variadic: false,
            body: Vec::new(),
            terminator: None,
            value_tys,
        }
    }

    pub fn declaration(
        name: impl Into<String>,
        params: Vec<Ty>,
        ret: Ty,
        variadic: bool,
    ) -> Function {
        Function {
            variadic,
            ..Function::new(name, params, ret)
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.body.is_empty() && self.terminator.is_none()
    }

    pub fn param_value(&self, index: usize) -> ValueId {
        debug_assert!(index < self.params.len());
        ValueId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn ty_of(&self, value: ValueId) -> Ty {
        self.value_tys[value.0 as usize]
    }

    /// Appends an instruction to the body, assigning it a fresh value id of
    /// the given result type.
    pub fn push(&mut self, kind: InstrKind, ty: Ty) -> ValueId {
        let value = ValueId(u32::try_from(self.value_tys.len()).unwrap_or(u32::MAX));
        self.value_tys.push(ty);
        self.body.push(Instr { value, kind });
        value
    }

    /// Inserts an instruction before all non-`alloca` instructions, keeping
    /// stack slots grouped at the top of the function.
    pub fn push_alloca(&mut self, slot_ty: Ty) -> ValueId {
        let value = ValueId(u32::try_from(self.value_tys.len()).unwrap_or(u32::MAX));
        self.value_tys.push(Ty::Ptr);
        let at = self
            .body
            .iter()
            .position(|i| !matches!(i.kind, InstrKind::Alloca(_)))
            .unwrap_or(self.body.len());
        self.body.insert(
            at,
            Instr {
                value,
                kind: InstrKind::Alloca(slot_ty),
            },
        );
        value
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instr {
    pub value: ValueId,
    pub kind: InstrKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InstrKind {
    ConstInt(i64),
    ConstFloat(f32),
    ConstBool(bool),
    GlobalAddr(GlobalId),
    Alloca(Ty),
    Load {
        ty: Ty,
        ptr: ValueId,
    },
    Store {
        value: ValueId,
        ptr: ValueId,
    },
    Bin {
        op: BinOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    FNeg(ValueId),
    Not(ValueId),
    /// Signed integer to float conversion.
    SiToFp(ValueId),
    Call {
        func: FuncId,
        args: Vec<ValueId>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

impl BinOp {
    pub fn is_float(self) -> bool {
        matches!(self, BinOp::FAdd | BinOp::FSub | BinOp::FMul | BinOp::FDiv)
    }

    fn name(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::SDiv => "sdiv",
            BinOp::FAdd => "fadd",
            BinOp::FSub => "fsub",
            BinOp::FMul => "fmul",
            BinOp::FDiv => "fdiv",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Terminator {
    Ret(Option<ValueId>),
}

//
// Verifier
//

#[derive(Clone, Debug, PartialEq)]
pub struct VerifyError {
    pub function: String,
    pub kind: VerifyErrorKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VerifyErrorKind {
    MissingTerminator,
    UseBeforeDef(ValueId),
    ResultTypeMismatch {
        value: ValueId,
        recorded: Ty,
        computed: Ty,
    },
    OperandType {
        value: ValueId,
        expected: Ty,
        found: Ty,
    },
    ReturnType {
        expected: Ty,
        found: Option<Ty>,
    },
    CallArity {
        callee: String,
        expected: usize,
        found: usize,
    },
    UnknownFunction(FuncId),
    UnknownGlobal(GlobalId),
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use VerifyErrorKind::*;
        write!(f, "in function `{}`: ", self.function)?;
        match &self.kind {
            MissingTerminator => write!(f, "missing terminator"),
            UseBeforeDef(v) => write!(f, "%{} is used before being defined", v.0),
            ResultTypeMismatch {
                value,
                recorded,
                computed,
            } => write!(
                f,
                "%{} is recorded as {recorded} but computes {computed}",
                value.0
            ),
            OperandType {
                value,
                expected,
                found,
            } => write!(f, "operand %{} should be {expected}, found {found}", value.0),
            ReturnType { expected, found } => match found {
                Some(found) => write!(f, "returns {found}, declared {expected}"),
                None => write!(f, "bare `ret` in a function declared {expected}"),
            },
            CallArity {
                callee,
                expected,
                found,
            } => write!(
                f,
                "call to `{callee}` passes {found} argument(s), expected {expected}"
            ),
            UnknownFunction(id) => write!(f, "call references unknown function #{}", id.0),
            UnknownGlobal(id) => write!(f, "reference to unknown global #{}", id.0),
        }
    }
}

impl Module {
    /// Checks the structural and type invariants of every defined function.
    pub fn verify(&self) -> Result<(), VerifyError> {
        for function in &self.functions {
            if function.is_declaration() {
                continue;
            }
            FunctionVerifier::new(self, function).run()?;
        }
        Ok(())
    }
}

struct FunctionVerifier<'m> {
    module: &'m Module,
    function: &'m Function,
    defined: Vec<bool>,
}

impl<'m> FunctionVerifier<'m> {
    fn new(module: &'m Module, function: &'m Function) -> FunctionVerifier<'m> {
        let mut defined = vec![false; function.value_tys.len()];
        for slot in defined.iter_mut().take(function.params.len()) {
            *slot = true;
        }
        FunctionVerifier {
            module,
            function,
            defined,
        }
    }

    fn run(mut self) -> Result<(), VerifyError> {
        for instr in &self.function.body {
            let computed = self.check_instr(instr)?;
            let recorded = self.function.ty_of(instr.value);
            if recorded != computed {
                return Err(self.error(VerifyErrorKind::ResultTypeMismatch {
                    value: instr.value,
                    recorded,
                    computed,
                }));
            }
            self.defined[instr.value.0 as usize] = true;
        }

        let Some(terminator) = &self.function.terminator else {
            return Err(self.error(VerifyErrorKind::MissingTerminator));
        };
        let Terminator::Ret(value) = terminator;
        let expected = self.function.ret;
        match value {
            Some(v) => {
                self.operand(*v)?;
                let found = self.function.ty_of(*v);
                if found != expected {
                    return Err(self.error(VerifyErrorKind::ReturnType {
                        expected,
                        found: Some(found),
                    }));
                }
            }
            None => {
                if expected != Ty::Void {
                    return Err(self.error(VerifyErrorKind::ReturnType {
                        expected,
                        found: None,
                    }));
                }
            }
        }
        Ok(())
    }

    /// Checks a single instruction, yielding its result type.
    fn check_instr(&self, instr: &Instr) -> Result<Ty, VerifyError> {
        use InstrKind::*;
        match &instr.kind {
            ConstInt(_) => Ok(Ty::I64),
            ConstFloat(_) => Ok(Ty::F32),
            ConstBool(_) => Ok(Ty::I1),
            GlobalAddr(id) => {
                if self.module.globals.len() <= id.0 {
                    return Err(self.error(VerifyErrorKind::UnknownGlobal(*id)));
                }
                Ok(Ty::Ptr)
            }
            Alloca(_) => Ok(Ty::Ptr),
            Load { ty, ptr } => {
                self.expect(*ptr, Ty::Ptr)?;
                Ok(*ty)
            }
            Store { value, ptr } => {
                self.operand(*value)?;
                self.expect(*ptr, Ty::Ptr)?;
                Ok(Ty::Void)
            }
            Bin { op, lhs, rhs } => {
                let ty = if op.is_float() { Ty::F32 } else { Ty::I64 };
                self.expect(*lhs, ty)?;
                self.expect(*rhs, ty)?;
                Ok(ty)
            }
            FNeg(v) => {
                self.expect(*v, Ty::F32)?;
                Ok(Ty::F32)
            }
            Not(v) => {
                self.expect(*v, Ty::I1)?;
                Ok(Ty::I1)
            }
            SiToFp(v) => {
                self.expect(*v, Ty::I64)?;
                Ok(Ty::F32)
            }
            Call { func, args } => {
                if self.module.functions.len() <= func.0 {
                    return Err(self.error(VerifyErrorKind::UnknownFunction(*func)));
                }
                let callee = self.module.function(*func);
                let arity_ok = if callee.variadic {
                    callee.params.len() <= args.len()
                } else {
                    callee.params.len() == args.len()
                };
                if !arity_ok {
                    return Err(self.error(VerifyErrorKind::CallArity {
                        callee: callee.name.clone(),
                        expected: callee.params.len(),
                        found: args.len(),
                    }));
                }
                for (arg, expected) in args.iter().zip(&callee.params) {
                    self.expect(*arg, *expected)?;
                }
                // Trailing variadic arguments only need to be defined.
                for arg in &args[callee.params.len()..] {
                    self.operand(*arg)?;
                }
                Ok(callee.ret)
            }
        }
    }

    fn operand(&self, value: ValueId) -> Result<(), VerifyError> {
        match self.defined.get(value.0 as usize) {
            Some(true) => Ok(()),
            _ => Err(self.error(VerifyErrorKind::UseBeforeDef(value))),
        }
    }

    fn expect(&self, value: ValueId, expected: Ty) -> Result<(), VerifyError> {
        self.operand(value)?;
        let found = self.function.ty_of(value);
        if found == expected {
            Ok(())
        } else {
            Err(self.error(VerifyErrorKind::OperandType {
                value,
                expected,
                found,
            }))
        }
    }

    fn error(&self, kind: VerifyErrorKind) -> VerifyError {
        VerifyError {
            function: self.function.name.clone(),
            kind,
        }
    }
}

//
// Textual form
//

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for global in &self.globals {
            first = false;
            writeln!(f, "@{} = constant {}", global.name, Bytes(&global.data))?;
        }
        for function in &self.functions {
            // Declarations print contiguously with the globals; a blank line
            // only separates `define` bodies.
            if !first && !function.is_declaration() {
                writeln!(f)?;
            }
            first = false;
            self.fmt_function(f, function)?;
        }
        Ok(())
    }
}

impl Module {
    fn fmt_function(&self, f: &mut fmt::Formatter<'_>, function: &Function) -> fmt::Result {
        if function.is_declaration() {
            write!(f, "declare {} @{}(", function.ret, function.name)?;
            Self::fmt_params(f, function, false)?;
            return writeln!(f, ")");
        }

        write!(f, "define {} @{}(", function.ret, function.name)?;
        Self::fmt_params(f, function, true)?;
        writeln!(f, ") {{")?;
        for instr in &function.body {
            self.fmt_instr(f, instr)?;
        }
        match &function.terminator {
            Some(Terminator::Ret(Some(v))) => writeln!(f, "  ret %{}", v.0)?,
            Some(Terminator::Ret(None)) => writeln!(f, "  ret")?,
            None => writeln!(f, "  <missing terminator>")?,
        }
        writeln!(f, "}}")
    }

    fn fmt_params(f: &mut fmt::Formatter<'_>, function: &Function, named: bool) -> fmt::Result {
        for (i, ty) in function.params.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            if named {
                write!(f, "{ty} %{i}")?;
            } else {
                write!(f, "{ty}")?;
            }
        }
        if function.variadic {
            if !function.params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        Ok(())
    }

    fn fmt_instr(&self, f: &mut fmt::Formatter<'_>, instr: &Instr) -> fmt::Result {
        use InstrKind::*;
        let v = instr.value.0;
        match &instr.kind {
            ConstInt(i) => writeln!(f, "  %{v} = const_int {i}"),
            ConstFloat(x) => writeln!(f, "  %{v} = const_float {x}"),
            ConstBool(b) => writeln!(f, "  %{v} = const_bool {b}"),
            GlobalAddr(id) => writeln!(f, "  %{v} = global_addr @{}", self.globals[id.0].name),
            Alloca(ty) => writeln!(f, "  %{v} = alloca {ty}"),
            Load { ty, ptr } => writeln!(f, "  %{v} = load {ty}, %{}", ptr.0),
            Store { value, ptr } => writeln!(f, "  store %{}, %{}", value.0, ptr.0),
            Bin { op, lhs, rhs } => {
                writeln!(f, "  %{v} = {} %{}, %{}", op.name(), lhs.0, rhs.0)
            }
            FNeg(x) => writeln!(f, "  %{v} = fneg %{}", x.0),
            Not(x) => writeln!(f, "  %{v} = not %{}", x.0),
            SiToFp(x) => writeln!(f, "  %{v} = sitofp %{}", x.0),
            Call { func, args } => {
                let callee = self.function(*func);
                if callee.ret == Ty::Void {
                    write!(f, "  call void @{}(", callee.name)?;
                } else {
                    write!(f, "  %{v} = call {} @{}(", callee.ret, callee.name)?;
                }
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "%{}", arg.0)?;
                }
                writeln!(f, ")")
            }
        }
    }
}

/// Prints a byte constant in `c"..."` form, escaping non-printable bytes as
/// two-digit hex.
struct Bytes<'a>(&'a [u8]);

impl fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("c\"")?;
        for &b in self.0 {
            match b {
                b'"' | b'\\' => write!(f, "\\{:02X}", b)?,
                0x20..=0x7E => write!(f, "{}", b as char)?,
                _ => write!(f, "\\{b:02X}")?,
            }
        }
        f.write_str("\"")
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Module {
        let mut m = Module::new();
        let hello = m.add_global(b"hi\n\0".to_vec());

        let printf = m.add_function(Function::declaration(
            "printf",
            vec![Ty::Ptr],
            Ty::I64,
            true,
        ));

        let mut main = Function::new("main", vec![], Ty::I64);
        let s = main.push(InstrKind::GlobalAddr(hello), Ty::Ptr);
        let _ = main.push(
            InstrKind::Call {
                func: printf,
                args: vec![s],
            },
            Ty::I64,
        );
        let five = main.push(InstrKind::ConstInt(5), Ty::I64);
        main.terminator = Some(Terminator::Ret(Some(five)));
        m.add_function(main);
        m
    }

    #[test]
    fn verifies_and_prints_a_simple_module() {
        let m = sample();
        assert_eq!(m.verify(), Ok(()));
        assert_eq!(
            m.to_string(),
            indoc! {r#"
                @.str.0 = constant c"hi\0A\00"
                declare i64 @printf(ptr, ...)

                define i64 @main() {
                  %0 = global_addr @.str.0
                  %1 = call i64 @printf(%0)
                  %2 = const_int 5
                  ret %2
                }
            "#}
        );
    }

    #[test]
    fn globals_are_interned() {
        let mut m = Module::new();
        let a = m.add_global(b"x\0".to_vec());
        let b = m.add_global(b"x\0".to_vec());
        assert_eq!(a, b);
        assert_eq!(m.globals.len(), 1);
    }

    #[test]
    fn missing_terminator_is_rejected() {
        let mut m = sample();
        m.functions[1].terminator = None;
        let err = m.verify().unwrap_err();
        assert_eq!(err.kind, VerifyErrorKind::MissingTerminator);
        assert_eq!(err.function, "main");
    }

    #[test]
    fn return_type_is_checked() {
        let mut m = sample();
        let f = &mut m.functions[1];
        let x = f.push(InstrKind::ConstFloat(1.0), Ty::F32);
        f.terminator = Some(Terminator::Ret(Some(x)));
        let err = m.verify().unwrap_err();
        assert_eq!(
            err.kind,
            VerifyErrorKind::ReturnType {
                expected: Ty::I64,
                found: Some(Ty::F32),
            }
        );
    }

    #[test]
    fn binary_operands_must_share_the_type() {
        let mut f = Function::new("f", vec![], Ty::I64);
        let a = f.push(InstrKind::ConstInt(1), Ty::I64);
        let b = f.push(InstrKind::ConstFloat(1.0), Ty::F32);
        let r = f.push(InstrKind::Bin { op: BinOp::Add, lhs: a, rhs: b }, Ty::I64);
        f.terminator = Some(Terminator::Ret(Some(r)));
        let mut m = Module::new();
        m.add_function(f);
        let err = m.verify().unwrap_err();
        assert_eq!(
            err.kind,
            VerifyErrorKind::OperandType {
                value: b,
                expected: Ty::I64,
                found: Ty::F32,
            }
        );
    }

    #[test]
    fn allocas_group_at_the_top() {
        let mut f = Function::new("f", vec![], Ty::Void);
        let c = f.push(InstrKind::ConstInt(1), Ty::I64);
        let slot = f.push_alloca(Ty::I64);
        let _ = f.push(InstrKind::Store { value: c, ptr: slot }, Ty::Void);
        f.terminator = Some(Terminator::Ret(None));
        assert!(matches!(f.body[0].kind, InstrKind::Alloca(_)));
        let mut m = Module::new();
        m.add_function(f);
        assert_eq!(m.verify(), Ok(()));
    }
}
