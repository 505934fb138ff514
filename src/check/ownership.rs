//! Ownership engine: per-variable state tracking across scopes.
//!
//! Each scope holds a full copy of the bindings visible at its entry, so
//! state transitions inside a block never leak into the parent (block
//! scoping is deliberately non-flow-sensitive). A per-scope set of locally
//! declared names distinguishes shadowing an outer binding (allowed) from
//! redeclaring within one block (rejected).
//!
//! Borrows themselves do not change state: `BorrowedRead` / `BorrowedWrite`
//! only enter the table through parameter introduction, and borrow events
//! are validated against the current state without persisting.

use std::collections::{HashMap, HashSet};

use crate::check::errors::{BorrowConflictReason, CheckError, CheckErrorKind};
use crate::diag::Span;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarState {
    Owned,
    Moved,
    BorrowedRead,
    BorrowedWrite,
}

#[derive(Debug, Clone)]
pub struct VarInfo {
    pub ty: Type,
    pub state: VarState,
    pub is_mutable: bool,
    pub def_site: Span,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    vars: HashMap<String, VarInfo>,
    declared: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct LocalContext {
    scopes: Vec<Scope>,
}

impl LocalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a block: the new scope starts as a copy of the bindings visible
    /// at this point, with an empty locally-declared set.
    pub fn enter_scope(&mut self) {
        let vars = self
            .scopes
            .last()
            .map(|scope| scope.vars.clone())
            .unwrap_or_default();
        self.scopes.push(Scope {
            vars,
            declared: HashSet::new(),
        });
    }

    pub fn leave_scope(&mut self) {
        self.scopes.pop();
    }

    fn scope(&self) -> &Scope {
        self.scopes.last().expect("no current scope")
    }

    fn scope_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("no current scope")
    }

    pub fn get(&self, name: &str) -> Option<&VarInfo> {
        self.scope().vars.get(name)
    }

    /// Introduce a binding. Shadowing an inherited binding is fine; a second
    /// declaration within the same block is not.
    pub fn declare(&mut self, name: &str, info: VarInfo) -> Result<(), CheckError> {
        let def_site = info.def_site;
        let scope = self.scope_mut();
        if scope.declared.contains(name) {
            return Err(CheckErrorKind::DuplicateLocalBinding(name.to_string(), def_site).into());
        }
        scope.declared.insert(name.to_string());
        scope.vars.insert(name.to_string(), info);
        Ok(())
    }

    /// Observe a variable's value. Any read of a moved variable is an error;
    /// reads never change state.
    pub fn read(&self, name: &str, span: Span) -> Result<&VarInfo, CheckError> {
        let info = self
            .get(name)
            .ok_or_else(|| CheckErrorKind::UndefinedVariable(name.to_string(), span))?;
        if info.state == VarState::Moved {
            return Err(CheckErrorKind::UseOfMovedValue(name.to_string(), span).into());
        }
        Ok(info)
    }

    /// Transfer ownership out of a variable. Only `Owned` values can move;
    /// the variable is `Moved` afterwards. Callers only invoke this for
    /// move-kind values (copy-kind values are duplicated, never moved).
    pub fn move_out(&mut self, name: &str, span: Span) -> Result<(), CheckError> {
        let info = self
            .scope_mut()
            .vars
            .get_mut(name)
            .ok_or_else(|| CheckErrorKind::UndefinedVariable(name.to_string(), span))?;
        match info.state {
            VarState::Owned => {
                info.state = VarState::Moved;
                Ok(())
            }
            VarState::Moved => {
                Err(CheckErrorKind::MoveAlreadyMoved(name.to_string(), span).into())
            }
            VarState::BorrowedRead | VarState::BorrowedWrite => {
                Err(CheckErrorKind::MoveFromBorrowed(name.to_string(), span).into())
            }
        }
    }

    /// Validate an immutable borrow (`ref` argument) of a variable.
    pub fn borrow_shared(&self, name: &str, span: Span) -> Result<(), CheckError> {
        let info = self
            .get(name)
            .ok_or_else(|| CheckErrorKind::UndefinedVariable(name.to_string(), span))?;
        match info.state {
            VarState::Owned | VarState::BorrowedRead => Ok(()),
            VarState::Moved => Err(CheckErrorKind::BorrowConflict(
                name.to_string(),
                BorrowConflictReason::ValueMoved,
                span,
            )
            .into()),
            VarState::BorrowedWrite => Err(CheckErrorKind::BorrowConflict(
                name.to_string(),
                BorrowConflictReason::AlreadyMutablyBorrowed,
                span,
            )
            .into()),
        }
    }

    /// Validate a mutable borrow (`inout` argument) of a variable. The
    /// binding must be mutable, owned, and unborrowed.
    pub fn borrow_mut(&self, name: &str, span: Span) -> Result<(), CheckError> {
        let info = self
            .get(name)
            .ok_or_else(|| CheckErrorKind::UndefinedVariable(name.to_string(), span))?;
        if !info.is_mutable {
            return Err(CheckErrorKind::MutableBorrowOfImmutable(name.to_string(), span).into());
        }
        match info.state {
            VarState::Owned => Ok(()),
            VarState::Moved => Err(CheckErrorKind::BorrowConflict(
                name.to_string(),
                BorrowConflictReason::ValueMoved,
                span,
            )
            .into()),
            VarState::BorrowedRead => Err(CheckErrorKind::BorrowConflict(
                name.to_string(),
                BorrowConflictReason::AlreadyBorrowed,
                span,
            )
            .into()),
            VarState::BorrowedWrite => Err(CheckErrorKind::BorrowConflict(
                name.to_string(),
                BorrowConflictReason::AlreadyMutablyBorrowed,
                span,
            )
            .into()),
        }
    }
}

#[cfg(test)]
#[path = "../tests/t_ownership.rs"]
mod tests;
