//! Ownership and type checking.
//!
//! Consumes the untyped program and produces a typed one, enforcing the
//! move/borrow discipline, the managed allocation boundary, and resource
//! rules along the way. The first violation aborts the check.

mod checker;
mod errors;
mod globals;
mod ownership;

pub use errors::{BorrowConflictReason, CheckError, CheckErrorKind, DefKind};
pub use globals::GlobalContext;
pub use ownership::{LocalContext, VarInfo, VarState};

use crate::context::{CheckedContext, ParsedContext};
use crate::typed::{TypedProgram, TypedResourceDef, TypedStructDef};

use checker::Checker;

pub fn check(ctx: ParsedContext) -> Result<CheckedContext, CheckError> {
    let globals = GlobalContext::build(&ctx.program)?;

    match globals.funcs.get("main") {
        None => return Err(CheckErrorKind::MainMissing.into()),
        Some(main) if !main.params.is_empty() => {
            return Err(CheckErrorKind::MainHasParameters(main.span).into());
        }
        Some(_) => {}
    }

    let mut checker = Checker::new(&globals);
    checker.collect_defs(&ctx.program)?;

    let mut structs = Vec::new();
    for def in &ctx.program.structs {
        structs.push(TypedStructDef {
            name: def.name.clone(),
            fields: checker.typed_fields(&def.name).to_vec(),
        });
    }

    let mut resources = Vec::new();
    for def in &ctx.program.resources {
        let fields = checker.typed_fields(&def.name).to_vec();
        let cleanup = checker.check_cleanup(def, &fields)?;
        resources.push(TypedResourceDef {
            name: def.name.clone(),
            fields,
            cleanup,
        });
    }

    let mut funcs = Vec::new();
    for def in &ctx.program.funcs {
        funcs.push(checker.check_function(def)?);
    }

    let program = TypedProgram {
        structs,
        resources,
        funcs,
    };
    Ok(ctx.with_typed_program(globals, program))
}

#[cfg(test)]
#[path = "../tests/t_check.rs"]
mod t_check;

#[cfg(test)]
#[path = "../tests/t_managed.rs"]
mod t_managed;
