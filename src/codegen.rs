//! C++ emission from the typed program.
//!
//! Linear values become stack values, managed constructions become
//! placement-new into the conservative collector's heap (`GC_malloc`), and
//! resources become structs with a destructor holding the cleanup block.
//! Field accesses through a managed handle use `->`, direct accesses `.`.

use std::collections::HashMap;

use crate::ast::{BinOp, ParamMode, UnaryOp};
use crate::context::CheckedContext;
use crate::typed::*;
use crate::types::Type;

pub struct Codegen<'a> {
    program: &'a TypedProgram,
    /// Declared fields per user type, in declaration order; literals are
    /// emitted in this order since C++ brace initialization is positional.
    fields: HashMap<String, Vec<TypedFieldDef>>,
}

impl<'a> Codegen<'a> {
    pub fn new(ctx: &'a CheckedContext) -> Self {
        let mut fields = HashMap::new();
        for def in &ctx.program.structs {
            fields.insert(def.name.clone(), def.fields.clone());
        }
        for def in &ctx.program.resources {
            fields.insert(def.name.clone(), def.fields.clone());
        }
        Codegen {
            program: &ctx.program,
            fields,
        }
    }

    pub fn generate(&self) -> String {
        let mut out = String::new();
        out.push_str("#include <cstdint>\n");
        out.push_str("#include <cstdio>\n");
        out.push_str("#include <new>\n");
        out.push_str("#include \"gc.h\"\n");

        for def in &self.program.structs {
            out.push('\n');
            out.push_str(&self.gen_struct(&def.name, &def.fields, None));
        }
        for def in &self.program.resources {
            out.push('\n');
            out.push_str(&self.gen_struct(&def.name, &def.fields, Some(def)));
        }

        // Prototypes first so definition order never matters.
        let mut protos = String::new();
        for func in &self.program.funcs {
            if func.name != "main" {
                protos.push_str(&format!("{};\n", self.gen_func_sig(func)));
            }
        }
        if !protos.is_empty() {
            out.push('\n');
            out.push_str(&protos);
        }

        for func in &self.program.funcs {
            out.push('\n');
            out.push_str(&self.gen_func(func));
        }
        out
    }

    fn gen_struct(
        &self,
        name: &str,
        fields: &[TypedFieldDef],
        resource: Option<&TypedResourceDef>,
    ) -> String {
        let mut out = String::new();
        out.push_str(&format!("struct {} {{\n", name));
        for field in fields {
            out.push_str(&format!("  {} {};\n", cpp_type(&field.ty), field.name));
        }
        if let Some(def) = resource {
            // Deterministic cleanup runs in the destructor; the cleanup
            // block's bindings are the members themselves.
            out.push_str(&format!("  ~{}() {{\n", name));
            if let Some(cleanup) = &def.cleanup {
                for stmt in &cleanup.stmts {
                    self.gen_stmt(&mut out, stmt, 2, false);
                }
            }
            out.push_str("  }\n");
        }
        out.push_str("};\n");
        out
    }

    fn gen_func_sig(&self, func: &TypedFuncDef) -> String {
        let params = func
            .params
            .iter()
            .map(|param| match param.mode {
                ParamMode::Move { .. } => format!("{} {}", cpp_type(&param.ty), param.name),
                ParamMode::Ref => format!("const {}& {}", cpp_type(&param.ty), param.name),
                ParamMode::Inout => format!("{}& {}", cpp_type(&param.ty), param.name),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}({})", cpp_type(&func.return_type), func.name, params)
    }

    fn gen_func(&self, func: &TypedFuncDef) -> String {
        let mut out = String::new();
        let is_main = func.name == "main";
        if is_main {
            out.push_str("int main() {\n");
            out.push_str("  GC_init();\n");
        } else {
            out.push_str(&format!("{} {{\n", self.gen_func_sig(func)));
        }
        for stmt in &func.body.stmts {
            self.gen_stmt(&mut out, stmt, 1, is_main);
        }
        if is_main {
            out.push_str("  return 0;\n");
        }
        out.push_str("}\n");
        out
    }

    fn gen_stmt(&self, out: &mut String, stmt: &TypedStmt, indent: usize, in_main: bool) {
        let pad = "  ".repeat(indent);
        match &stmt.kind {
            TypedStmtKind::Let {
                name,
                ty,
                value,
                ..
            } => {
                if *ty == Type::Unit {
                    out.push_str(&format!("{}{};\n", pad, self.gen_expr(value)));
                } else {
                    out.push_str(&format!(
                        "{}{} {} = {};\n",
                        pad,
                        cpp_type(ty),
                        name,
                        self.gen_expr(value)
                    ));
                }
            }
            TypedStmtKind::Assign { target, value } => {
                // Assigning through a lifted field stores the handle's
                // pointee back into the inline slot.
                let (lhs, deref_rhs) = match &target.kind {
                    TypedExprKind::Field {
                        object,
                        field,
                        raw_ty,
                        via_handle,
                    } if target.ty != *raw_ty => {
                        (self.gen_field_access(object, field, *via_handle), true)
                    }
                    _ => (self.gen_expr(target), false),
                };
                let rhs = self.gen_expr(value);
                let rhs = if deref_rhs {
                    format!("*({})", rhs)
                } else {
                    rhs
                };
                out.push_str(&format!("{}{} = {};\n", pad, lhs, rhs));
            }
            TypedStmtKind::Return { value } => {
                match value {
                    Some(value) if value.ty != Type::Unit => {
                        out.push_str(&format!("{}return {};\n", pad, self.gen_expr(value)));
                    }
                    Some(value) => {
                        // Unit-typed operand: evaluate for effect, then return.
                        out.push_str(&format!("{}{};\n", pad, self.gen_expr(value)));
                        out.push_str(&format!(
                            "{}return{};\n",
                            pad,
                            if in_main { " 0" } else { "" }
                        ));
                    }
                    None => {
                        out.push_str(&format!(
                            "{}return{};\n",
                            pad,
                            if in_main { " 0" } else { "" }
                        ));
                    }
                }
            }
            TypedStmtKind::Expr { expr } => {
                out.push_str(&format!("{}{};\n", pad, self.gen_expr(expr)));
            }
            TypedStmtKind::Block { block } => {
                out.push_str(&format!("{}{{\n", pad));
                for stmt in &block.stmts {
                    self.gen_stmt(out, stmt, indent + 1, in_main);
                }
                out.push_str(&format!("{}}}\n", pad));
            }
        }
    }

    fn gen_expr(&self, expr: &TypedExpr) -> String {
        match &expr.kind {
            TypedExprKind::IntLit(value) => value.to_string(),
            TypedExprKind::BoolLit(value) => value.to_string(),
            TypedExprKind::Var(name) => name.clone(),
            TypedExprKind::Unary { op, operand } => {
                let op = match op {
                    UnaryOp::Neg => "-",
                };
                format!("({}{})", op, self.gen_expr(operand))
            }
            TypedExprKind::Binary { op, left, right } => {
                format!(
                    "({} {} {})",
                    self.gen_expr(left),
                    cpp_bin_op(*op),
                    self.gen_expr(right)
                )
            }
            TypedExprKind::StructLit {
                name,
                alloc,
                fields,
            } => {
                let init = self.gen_struct_init(name, fields);
                match alloc {
                    AllocKind::Linear => init,
                    // The whole aggregate is one allocation; nested
                    // constructions land inline (see gen_struct_init).
                    AllocKind::Managed => {
                        format!("new (GC_malloc(sizeof({}))) {}", name, init)
                    }
                }
            }
            TypedExprKind::Field {
                object,
                field,
                raw_ty,
                via_handle,
            } => {
                let access = self.gen_field_access(object, field, *via_handle);
                // A lifted access produces a handle to the field, which
                // lives inside the managed allocation: take its address.
                if expr.ty != *raw_ty {
                    format!("(&{})", access)
                } else {
                    access
                }
            }
            TypedExprKind::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.gen_expr(arg))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", name, args)
            }
            TypedExprKind::Println { format, args } => self.gen_println(format, args),
        }
    }

    /// Brace initialization in declared field order. Inside a managed
    /// construction a field declared with an inline user type may carry a
    /// handle-typed value: a nested construction lands inline (the
    /// enclosing allocation already reserves its slot), and any other
    /// handle is dereferenced to copy its pointee into the slot.
    fn gen_struct_init(&self, name: &str, inits: &[(String, TypedExpr)]) -> String {
        let parts = self.fields[name]
            .iter()
            .filter_map(|decl| {
                let (_, value) = inits.iter().find(|(n, _)| n == &decl.name)?;
                Some(if value.ty == decl.ty {
                    self.gen_expr(value)
                } else {
                    match &value.kind {
                        TypedExprKind::StructLit {
                            name: nested,
                            fields,
                            ..
                        } => self.gen_struct_init(nested, fields),
                        _ => format!("*({})", self.gen_expr(value)),
                    }
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}{{{}}}", name, parts)
    }

    fn gen_field_access(&self, object: &TypedExpr, field: &str, via_handle: bool) -> String {
        let accessor = if via_handle { "->" } else { "." };
        let object_code = self.gen_expr(object);
        // Parenthesize anything that does not already bind tighter than
        // member access.
        let needs_parens = !matches!(
            object.kind,
            TypedExprKind::Var(_) | TypedExprKind::Field { .. } | TypedExprKind::Call { .. }
        );
        if needs_parens {
            format!("({}){}{}", object_code, accessor, field)
        } else {
            format!("{}{}{}", object_code, accessor, field)
        }
    }

    /// Translate a `println` into `printf`: each `{}` placeholder is mapped
    /// per the corresponding argument's type, and a newline is appended.
    fn gen_println(&self, format: &str, args: &[TypedExpr]) -> String {
        let mut fmt = String::new();
        let mut call_args = Vec::new();
        let mut next_arg = 0;

        let mut chars = format.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '{' && chars.peek() == Some(&'}') && next_arg < args.len() {
                chars.next();
                let arg = &args[next_arg];
                next_arg += 1;
                match &arg.ty {
                    Type::Int => {
                        fmt.push_str("%lld");
                        call_args.push(format!("(long long)({})", self.gen_expr(arg)));
                    }
                    Type::Bool => {
                        fmt.push_str("%s");
                        call_args.push(format!("({}) ? \"true\" : \"false\"", self.gen_expr(arg)));
                    }
                    Type::Managed(_) => {
                        fmt.push_str("%p");
                        call_args.push(format!("(void*)({})", self.gen_expr(arg)));
                    }
                    other => {
                        // Not printable by value; show the type name instead.
                        push_escaped(&mut fmt, &format!("<{}>", other));
                    }
                }
            } else {
                push_escaped_char(&mut fmt, ch);
            }
        }
        fmt.push_str("\\n");

        if call_args.is_empty() {
            format!("printf(\"{}\")", fmt)
        } else {
            format!("printf(\"{}\", {})", fmt, call_args.join(", "))
        }
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        push_escaped_char(out, ch);
    }
}

fn push_escaped_char(out: &mut String, ch: char) {
    match ch {
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\\' => out.push_str("\\\\"),
        '"' => out.push_str("\\\""),
        '%' => out.push_str("%%"),
        _ => out.push(ch),
    }
}

pub fn cpp_type(ty: &Type) -> String {
    match ty {
        Type::Int => "int64_t".to_string(),
        Type::Bool => "bool".to_string(),
        Type::Unit => "void".to_string(),
        Type::Named(name) => name.clone(),
        Type::Managed(inner) => format!("{}*", cpp_type(inner)),
    }
}

fn cpp_bin_op(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Lt => "<",
        BinOp::LtEq => "<=",
        BinOp::Gt => ">",
        BinOp::GtEq => ">=",
        BinOp::Eq => "==",
        BinOp::NotEq => "!=",
    }
}

#[cfg(test)]
#[path = "tests/t_codegen.rs"]
mod tests;
