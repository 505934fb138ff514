use indexmap::IndexMap;

use crate::ast::{FuncDef, Program, ResourceDef, StructDef, TypeExpr, TypeExprKind};
use crate::check::errors::{CheckError, CheckErrorKind, DefKind};
use crate::types::Type;

/// The three name-indexed lookups over top-level definitions. Built once,
/// read-only afterwards. Field and parameter types are deliberately left
/// unresolved here; the resolver methods below run when a type is used, so
/// errors carry the use site.
#[derive(Debug, Clone, Default)]
pub struct GlobalContext {
    pub structs: IndexMap<String, StructDef>,
    pub resources: IndexMap<String, ResourceDef>,
    pub funcs: IndexMap<String, FuncDef>,
}

impl GlobalContext {
    /// Index the program's top-level definitions. Duplicates within one
    /// namespace are rejected, reporting the second occurrence.
    pub fn build(program: &Program) -> Result<GlobalContext, CheckError> {
        let mut globals = GlobalContext::default();

        for def in &program.structs {
            if globals.structs.contains_key(&def.name) {
                return Err(CheckErrorKind::DuplicateDefinition(
                    DefKind::Struct,
                    def.name.clone(),
                    def.span,
                )
                .into());
            }
            globals.structs.insert(def.name.clone(), def.clone());
        }

        for def in &program.resources {
            if globals.resources.contains_key(&def.name) {
                return Err(CheckErrorKind::DuplicateDefinition(
                    DefKind::Resource,
                    def.name.clone(),
                    def.span,
                )
                .into());
            }
            globals.resources.insert(def.name.clone(), def.clone());
        }

        for def in &program.funcs {
            if globals.funcs.contains_key(&def.name) {
                return Err(CheckErrorKind::DuplicateDefinition(
                    DefKind::Function,
                    def.name.clone(),
                    def.span,
                )
                .into());
            }
            globals.funcs.insert(def.name.clone(), def.clone());
        }

        Ok(globals)
    }

    pub fn is_user_type(&self, name: &str) -> bool {
        self.structs.contains_key(name) || self.resources.contains_key(name)
    }

    pub fn is_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// True iff `ty` names a declared struct or resource.
    pub fn is_named_user_type(&self, ty: &Type) -> bool {
        ty.named().is_some_and(|name| self.is_user_type(name))
    }

    /// Validate a surface type and resolve it to a semantic type.
    ///
    /// Primitives are always valid; a named type must be declared; a managed
    /// type must wrap a valid non-managed pointee. Resources are legal here
    /// even under `managed`: the resource ban applies to construction sites,
    /// not to type positions.
    pub fn resolve_type(&self, ty: &TypeExpr) -> Result<Type, CheckError> {
        match &ty.kind {
            TypeExprKind::Int => Ok(Type::Int),
            TypeExprKind::Bool => Ok(Type::Bool),
            TypeExprKind::Unit => Ok(Type::Unit),
            TypeExprKind::Named(name) => {
                if self.is_user_type(name) {
                    Ok(Type::Named(name.clone()))
                } else {
                    Err(CheckErrorKind::UnknownType(name.clone(), ty.span).into())
                }
            }
            TypeExprKind::Managed(inner) => {
                if let TypeExprKind::Managed(_) = inner.kind {
                    let rendered = format!("managed {}", self.resolve_type(inner)?);
                    return Err(CheckErrorKind::UnknownType(rendered, ty.span).into());
                }
                Ok(Type::managed(self.resolve_type(inner)?))
            }
        }
    }
}
