//! Runtime support functions installed into the root scope before lowering.

use phf::phf_map;

use crate::{
    context::{CodeGenContext, Slot},
    ir::{Function, InstrKind, Terminator, Ty},
    util::intern::Interner,
};

type Installer = fn(&mut CodeGenContext, &mut Interner);

/// The runtime installed by default.
pub const DEFAULT: &str = "core";

static RUNTIMES: phf::Map<&'static str, Installer> = phf_map! {
    "core" => install_core,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownRuntime(pub String);

pub fn install(
    name: &str,
    ctx: &mut CodeGenContext,
    ident_interner: &mut Interner,
) -> Result<(), UnknownRuntime> {
    let Some(installer) = RUNTIMES.get(name) else {
        return Err(UnknownRuntime(name.into()));
    };
    installer(ctx, ident_interner);
    Ok(())
}

/// Installs `printf` (external, variadic) and `print`, which appends a
/// newline by routing through a shared `"%s\n"` format global.
fn install_core(ctx: &mut CodeGenContext, ident_interner: &mut Interner) {
    let printf = ctx.module.add_function(Function::declaration(
        "printf",
        vec![Ty::Ptr],
        Ty::I64,
        true,
    ));
    ctx.define_in_root(ident_interner.intern("printf"), Slot::Func(printf));

    let newline_fmt = ctx.module.add_global(b"%s\n\0".to_vec());
    let mut print = Function::new("print", vec![Ty::Ptr], Ty::Void);
    let arg = print.param_value(0);
    let fmt = print.push(InstrKind::GlobalAddr(newline_fmt), Ty::Ptr);
    let _ = print.push(
        InstrKind::Call {
            func: printf,
            args: vec![fmt, arg],
        },
        Ty::I64,
    );
    print.terminator = Some(Terminator::Ret(None));
    let print = ctx.module.add_function(print);
    ctx.define_in_root(ident_interner.intern("print"), Slot::Func(print));
}
