use crate::ast::Program;
use crate::check::GlobalContext;
use crate::typed::TypedProgram;

// -----------------------------------------------------------------------------
// Parsed Context
// -----------------------------------------------------------------------------

/// Output of the parser: the untyped program, ready for checking.
#[derive(Clone)]
pub struct ParsedContext {
    pub program: Program,
}

impl ParsedContext {
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    pub fn with_typed_program(
        self,
        globals: GlobalContext,
        program: TypedProgram,
    ) -> CheckedContext {
        CheckedContext { globals, program }
    }
}

// -----------------------------------------------------------------------------
// Checked Context
// -----------------------------------------------------------------------------

/// Output of the checker: the typed program plus the global definition
/// tables, which stay read-only from here on. This is everything the
/// emitter consumes.
#[derive(Clone)]
pub struct CheckedContext {
    pub globals: GlobalContext,
    pub program: TypedProgram,
}
