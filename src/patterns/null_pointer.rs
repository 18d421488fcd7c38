// Detect dereferences of pointers that start out null
// A binding initialized from ptr::null()/null_mut() and later dereferenced is reported.
// A dereference sitting under an `if !p.is_null()` guard is still reported, at low severity,
// so the pattern stays visible next to its unguarded variant.

use std::collections::HashSet;
use std::path::Path;

use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};
use crate::patterns::local_binding;

const NULL_CONSTRUCTORS: &[&str] = &["null", "null_mut"];

pub struct NullPointer;

impl AnalysisPass for NullPointer {
    fn name(&self) -> &str {
        "null_pointer"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut visitor = NullVisitor {
            findings: Vec::new(),
            path,
            null_bindings: HashSet::new(),
            guarded: Vec::new(),
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

struct NullVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
    /// Bindings initialized to null in the current function.
    null_bindings: HashSet<String>,
    /// Names proven non-null by enclosing `if !p.is_null()` guards.
    guarded: Vec<String>,
}

impl<'ast> Visit<'ast> for NullVisitor<'_> {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        let saved = std::mem::take(&mut self.null_bindings);
        syn::visit::visit_item_fn(self, node);
        self.null_bindings = saved;
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        let saved = std::mem::take(&mut self.null_bindings);
        syn::visit::visit_impl_item_fn(self, node);
        self.null_bindings = saved;
    }

    fn visit_local(&mut self, node: &'ast syn::Local) {
        if let (Some(name), Some(init)) = (local_binding(&node.pat), &node.init) {
            if is_null_constructor(&init.expr) {
                self.null_bindings.insert(name);
            } else {
                self.null_bindings.remove(&name);
            }
        }
        syn::visit::visit_local(self, node);
    }

    fn visit_expr_if(&mut self, node: &'ast syn::ExprIf) {
        self.visit_expr(&node.cond);
        match non_null_guard(&node.cond) {
            Some(name) => {
                self.guarded.push(name);
                self.visit_block(&node.then_branch);
                self.guarded.pop();
            }
            None => self.visit_block(&node.then_branch),
        }
        if let Some((_, else_branch)) = &node.else_branch {
            self.visit_expr(else_branch);
        }
    }

    fn visit_expr_unary(&mut self, node: &'ast syn::ExprUnary) {
        if matches!(node.op, syn::UnOp::Deref(_)) {
            if let syn::Expr::Path(p) = node.expr.as_ref() {
                if let Some(ident) = p.path.get_ident() {
                    let name = ident.to_string();
                    if self.null_bindings.contains(&name) {
                        let is_guarded = self.guarded.contains(&name);
                        let (severity, message) = if is_guarded {
                            (
                                Severity::Low,
                                format!("`{}` is initialized to null; this dereference relies on its `is_null` guard.", name),
                            )
                        } else {
                            (
                                Severity::High,
                                format!("Dereference of `{}`, which is initialized to null and never checked.", name),
                            )
                        };
                        self.findings.push(
                            Finding::at(ident.span(), self.path, "memory", "null_pointer", severity)
                                .message(message)
                                .snippet(format!("*{}", name))
                                .fix("Check `is_null()` before every dereference, or use `Option<NonNull<T>>`."),
                        );
                    }
                }
            }
        }
        syn::visit::visit_expr_unary(self, node);
    }
}

/// `ptr::null_mut()`, `std::ptr::null()`, `null_mut::<T>()`.
fn is_null_constructor(expr: &syn::Expr) -> bool {
    match expr {
        syn::Expr::Call(call) => crate::patterns::call_name(call)
            .is_some_and(|n| NULL_CONSTRUCTORS.contains(&n.as_str())),
        syn::Expr::Cast(c) => is_null_constructor(&c.expr),
        syn::Expr::Paren(p) => is_null_constructor(&p.expr),
        _ => false,
    }
}

/// `!p.is_null()` -> Some("p").
fn non_null_guard(cond: &syn::Expr) -> Option<String> {
    let syn::Expr::Unary(unary) = cond else {
        return None;
    };
    if !matches!(unary.op, syn::UnOp::Not(_)) {
        return None;
    }
    match unary.expr.as_ref() {
        syn::Expr::MethodCall(mc) if mc.method == "is_null" => crate::patterns::root_ident(&mc.receiver),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(code: &str) -> Vec<Finding> {
        let file = syn::parse_file(code).expect("failed to parse");
        let pass = NullPointer;
        pass.check_file(&file, Path::new("test.rs"))
    }

    #[test]
    fn guarded_dereference_is_low_severity() {
        let findings = check(
            r#"
            fn null_pointer() {
                let ptr: *mut i32 = ptr::null_mut();
                if !ptr.is_null() {
                    unsafe { *ptr = 42; }
                }
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }

    #[test]
    fn unguarded_dereference_is_high_severity() {
        let findings = check(
            r#"
            fn f() {
                let p = std::ptr::null::<u8>();
                let v = unsafe { *p };
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn reassigned_binding_is_not_tracked() {
        let findings = check(
            r#"
            fn f(x: &mut i32) {
                let p = ptr::null_mut();
                let p = x as *mut i32;
                unsafe { *p = 1; }
            }
            "#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn ignores_non_null_pointers() {
        let findings = check("fn f(p: *const u8) -> u8 { unsafe { *p } }");
        assert!(findings.is_empty());
    }

    #[test]
    fn null_binding_stays_inside_its_method() {
        let findings = check(
            r#"
            struct S;
            impl S {
                fn a(&self) {
                    let p: *mut i32 = ptr::null_mut();
                    let _ = p;
                }
                fn b(&self, p: *mut i32) {
                    unsafe { *p = 1; }
                }
            }
            "#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn detects_null_dereference_in_method() {
        let findings = check(
            r#"
            impl S {
                fn a(&self) {
                    let p: *mut i32 = ptr::null_mut();
                    unsafe { *p = 1; }
                }
            }
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }
}
