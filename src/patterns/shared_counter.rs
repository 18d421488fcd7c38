// Detect unsynchronized writes to `static mut` items
// Any function may run on any thread; a plain or compound assignment to a
// `static mut` is a data race as soon as two of them do.

use std::collections::HashSet;
use std::path::Path;

use syn::visit::Visit;

use crate::driver::{AnalysisPass, Finding, Severity};

const MUTATING_METHODS: &[&str] = &["push", "insert", "clear"];

pub struct SharedCounter;

impl AnalysisPass for SharedCounter {
    fn name(&self) -> &str {
        "shared_counter"
    }

    fn check_file(&self, file: &syn::File, path: &Path) -> Vec<Finding> {
        let mut statics = StaticCollector::default();
        statics.visit_file(file);
        if statics.names.is_empty() {
            return Vec::new();
        }

        let mut visitor = WriteVisitor {
            findings: Vec::new(),
            path,
            statics: &statics.names,
            fn_depth: 0,
        };
        visitor.visit_file(file);
        visitor.findings
    }
}

#[derive(Default)]
struct StaticCollector {
    names: HashSet<String>,
}

impl<'ast> Visit<'ast> for StaticCollector {
    fn visit_item_static(&mut self, node: &'ast syn::ItemStatic) {
        if matches!(node.mutability, syn::StaticMutability::Mut(_)) {
            self.names.insert(node.ident.to_string());
        }
        syn::visit::visit_item_static(self, node);
    }
}

struct WriteVisitor<'a> {
    findings: Vec<Finding>,
    path: &'a Path,
    statics: &'a HashSet<String>,
    fn_depth: usize,
}

impl WriteVisitor<'_> {
    fn check_target(&mut self, target: &syn::Expr, op: &str) {
        if self.fn_depth == 0 {
            return;
        }
        let syn::Expr::Path(p) = target else {
            return;
        };
        let Some(ident) = p.path.segments.last().map(|s| &s.ident) else {
            return;
        };
        let name = ident.to_string();
        if self.statics.contains(&name) {
            self.findings.push(
                Finding::at(ident.span(), self.path, "memory", "shared_counter", Severity::High)
                    .message(format!(
                        "Unsynchronized `{}` on `static mut {}`; concurrent callers race.",
                        op, name
                    ))
                    .snippet(format!("{} {} ..", name, op))
                    .fix("Use an atomic (`AtomicI32::fetch_add`) or guard the value with a `Mutex`."),
            );
        }
    }
}

impl<'ast> Visit<'ast> for WriteVisitor<'_> {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.fn_depth += 1;
        syn::visit::visit_item_fn(self, node);
        self.fn_depth -= 1;
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.fn_depth += 1;
        syn::visit::visit_impl_item_fn(self, node);
        self.fn_depth -= 1;
    }

    fn visit_expr_assign(&mut self, node: &'ast syn::ExprAssign) {
        self.check_target(&node.left, "=");
        syn::visit::visit_expr_assign(self, node);
    }

    fn visit_expr_binary(&mut self, node: &'ast syn::ExprBinary) {
        if let Some(op) = compound_op(&node.op) {
            self.check_target(&node.left, op);
        }
        syn::visit::visit_expr_binary(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        // `COUNTER.push(..)` and friends mutate through a `&mut` to the static.
        if MUTATING_METHODS.iter().any(|m| node.method == *m) {
            self.check_target(&node.receiver, &format!(".{}()", node.method));
        }
        syn::visit::visit_expr_method_call(self, node);
    }
}

fn compound_op(op: &syn::BinOp) -> Option<&'static str> {
    use syn::BinOp::*;
    match op {
        AddAssign(_) => Some("+="),
        SubAssign(_) => Some("-="),
        MulAssign(_) => Some("*="),
        DivAssign(_) => Some("/="),
        RemAssign(_) => Some("%="),
        BitXorAssign(_) => Some("^="),
        BitAndAssign(_) => Some("&="),
        BitOrAssign(_) => Some("|="),
        ShlAssign(_) => Some("<<="),
        ShrAssign(_) => Some(">>="),
        _ => None,
    }
}
